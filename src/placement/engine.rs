//! Drop-target resolution.
//!
//! While an item is being dragged, every pointer position resolves to one
//! [`Placement`]: move up a level, move into a folder, or reorder within the
//! current container. Targets are checked in precedence order; hits inside
//! the surface that are not an explicit target fall through to reorder
//! against the slot snapshot taken when the drag started, and a pointer over
//! no target at all resolves to no placement.

use serde::{Deserialize, Serialize};

use crate::model::{AccountId, FolderId, ItemRef};
use crate::placement::geometry::{Point, Rect};

/// How the current container is presented. Grids advance horizontally, lists
/// vertically; past-center detection follows that axis.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewLayout {
    #[default]
    Grid,
    List,
}

/// What the pointer is currently over, as reported by the host surface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HitTarget {
    /// The card leading back out of the current folder.
    Back,
    Folder(FolderId),
    Account(AccountId),
    /// Empty container area.
    Surface,
}

/// The action a drop at the current pointer position would perform.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Placement {
    /// Move the item out of the current folder into its parent container.
    MoveToParent,
    MoveInto(FolderId),
    /// Reorder within the current container, inserting at this index of the
    /// dragged item's kind.
    ReorderTo(usize),
    #[default]
    None,
}

/// Slot geometry frozen at drag start: the on-screen rects of the dragged
/// item's kind, the dragged item's index among them, and the layout axis.
/// Re-captured only when the surface scrolls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlotSnapshot {
    rects: Vec<Rect>,
    origin_index: Option<usize>,
    layout: ViewLayout,
}

impl SlotSnapshot {
    pub fn new(rects: Vec<Rect>, origin_index: Option<usize>, layout: ViewLayout) -> Self {
        Self { rects, origin_index, layout }
    }

    pub fn rects(&self) -> &[Rect] { &self.rects }

    pub fn origin_index(&self) -> Option<usize> { self.origin_index }

    pub fn layout(&self) -> ViewLayout { self.layout }
}

/// Resolve the placement for a drag of `item` with the pointer at `pointer`.
///
/// The back card wins over everything, a folder target wins over reorder
/// unless the item is that folder itself. Account hovers and empty surface
/// area reorder against the snapshot; a pointer over nothing at all resolves
/// to no placement.
pub fn compute_placement(
    item: &ItemRef,
    snapshot: &SlotSnapshot,
    hit: Option<HitTarget>,
    pointer: Point,
) -> Placement {
    match hit {
        None => return Placement::None,
        Some(HitTarget::Back) => return Placement::MoveToParent,
        Some(HitTarget::Folder(id)) => {
            if !matches!(item, ItemRef::Folder(own) if *own == id) {
                return Placement::MoveInto(id);
            }
        }
        Some(HitTarget::Account(_)) | Some(HitTarget::Surface) => {}
    }
    reorder_placement(snapshot, pointer)
}

fn reorder_placement(snapshot: &SlotSnapshot, pointer: Point) -> Placement {
    let Some(origin_index) = snapshot.origin_index else {
        return Placement::None;
    };
    let rects = &snapshot.rects;
    if rects.is_empty() {
        return Placement::None;
    }

    let mut nearest = 0;
    let mut best = f64::INFINITY;
    for (i, rect) in rects.iter().enumerate() {
        let d = pointer.dist_sq(rect.center());
        if d < best {
            best = d;
            nearest = i;
        }
    }

    // Strictly past the slot center means the drop lands after it.
    let center = rects[nearest].center();
    let past_center = match snapshot.layout {
        ViewLayout::Grid => pointer.x > center.x,
        ViewLayout::List => pointer.y > center.y,
    };
    let mut drop = nearest + usize::from(past_center);

    // The dragged item leaves its slot first, shifting later slots down one.
    if drop > origin_index {
        drop -= 1;
    }
    Placement::ReorderTo(drop.min(rects.len() - 1))
}
