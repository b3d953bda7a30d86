//! Plain geometry for drop-target math, plus the grid metrics used to lay
//! item cards out in rows.

use serde::{Deserialize, Serialize};

use crate::common::config::GridSettings;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self { Self { x, y } }

    /// Squared distance; enough for nearest-point comparisons.
    pub fn dist_sq(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self { Self { width, height } }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { origin: Point::new(x, y), size: Size::new(width, height) }
    }

    pub fn min(&self) -> Point { self.origin }

    pub fn max(&self) -> Point {
        Point::new(self.origin.x + self.size.width, self.origin.y + self.size.height)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.min().x..=self.max().x).contains(&point.x)
            && (self.min().y..=self.max().y).contains(&point.y)
    }
}

/// Card grid dimensions. Rows are centered: the leftover width after packing
/// as many cards as fit is split evenly into left padding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridMetrics {
    pub card_width: f64,
    pub gap: f64,
}

impl GridMetrics {
    pub fn new(card_width: f64, gap: f64) -> Self { Self { card_width, gap } }

    pub fn from_settings(settings: &GridSettings) -> Self {
        Self::new(settings.card_width, settings.gap)
    }

    /// How many cards fit in `available_width`, never fewer than one.
    pub fn cards_per_row(&self, available_width: f64) -> usize {
        let fit = ((available_width + self.gap) / (self.card_width + self.gap)).floor();
        (fit as usize).max(1)
    }

    /// Width of a full row of `count` cards including the gaps between them.
    pub fn row_width(&self, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        count as f64 * self.card_width + (count - 1) as f64 * self.gap
    }

    pub fn padding_left(&self, available_width: f64) -> f64 {
        let row = self.row_width(self.cards_per_row(available_width));
        ((available_width - row) / 2.0).floor().max(0.0)
    }

    /// Row-major card rects for `count` cards packed into `available_width`.
    pub fn layout_rects(&self, count: usize, available_width: f64, card_height: f64) -> Vec<Rect> {
        let per_row = self.cards_per_row(available_width);
        let padding = self.padding_left(available_width);
        (0..count)
            .map(|i| {
                let col = i % per_row;
                let row = i / per_row;
                Rect::new(
                    padding + col as f64 * (self.card_width + self.gap),
                    row as f64 * (card_height + self.gap),
                    self.card_width,
                    card_height,
                )
            })
            .collect()
    }
}
