//! Pointer gesture tracking for drag and drop.
//!
//! A press on an item arms a pending drag; it becomes a real drag once the
//! pointer travels past the configured threshold (Manhattan distance, so
//! diagonal jitter counts the same as straight). From then on every pointer
//! move resolves a [`Placement`], and release commits it through the
//! organizer. A press that never crosses the threshold stays a plain click
//! and touches nothing.
//!
//! The slot snapshot is frozen at drag start and refreshed only when the
//! host surface scrolls, so card animations during the drag cannot shift the
//! drop math under the pointer.

use std::mem;

use crate::common::config::DragSettings;
use crate::model::{AccountId, FolderId, ItemKind, ItemRef, Platform};
use crate::organizer::{BlobStore, Organizer};
use crate::placement::engine::{
    HitTarget, Placement, SlotSnapshot, ViewLayout, compute_placement,
};
use crate::placement::geometry::{Point, Rect};

/// The surface a drag happens on. The controller reads the container being
/// shown and drives the drag preview through this trait; the host decides
/// what those mean visually.
pub trait DragHost {
    /// Folder whose contents are on screen, `None` at a platform root.
    fn current_folder(&self) -> Option<FolderId>;
    fn active_platform(&self) -> Platform;
    /// Folder items of the current container, in display order.
    fn folder_items(&self) -> Vec<FolderId>;
    /// Account items of the current container, in display order.
    fn account_items(&self) -> Vec<AccountId>;
    fn view_layout(&self) -> ViewLayout;
    /// On-screen rects for the items of `kind`, in display order.
    fn slot_rects(&self, kind: ItemKind) -> Vec<Rect>;
    /// What is under the pointer. Empty container area is
    /// [`HitTarget::Surface`]; `None` means nothing of the surface is there
    /// at all.
    fn hit_test(&self, at: Point) -> Option<HitTarget>;

    fn show_preview(&mut self, item: &ItemRef, at: Point);
    fn move_preview(&mut self, at: Point);
    fn clear_preview(&mut self);
    /// Re-read the store and redraw. Fired once after every completed drag.
    fn refresh(&mut self);
}

#[derive(Clone, Debug)]
enum DragPhase {
    Idle,
    /// Pressed on an item, threshold not crossed yet.
    Pending { item: ItemRef, origin: Point },
    Dragging { item: ItemRef, snapshot: SlotSnapshot },
}

/// Tracks one pointer through press, drag, and release.
#[derive(Debug)]
pub struct GestureController {
    phase: DragPhase,
    placement: Placement,
    last_pointer: Point,
    eat_next_click: bool,
    config: DragSettings,
}

impl GestureController {
    pub fn new(config: DragSettings) -> Self {
        Self {
            phase: DragPhase::Idle,
            placement: Placement::None,
            last_pointer: Point::default(),
            eat_next_click: false,
            config,
        }
    }

    pub fn is_dragging(&self) -> bool { matches!(self.phase, DragPhase::Dragging { .. }) }

    pub fn dragging_item(&self) -> Option<&ItemRef> {
        match &self.phase {
            DragPhase::Dragging { item, .. } => Some(item),
            _ => None,
        }
    }

    /// Placement the current pointer position resolves to.
    pub fn placement(&self) -> &Placement { &self.placement }

    /// Folder the drag is hovering over, when the placement is a move-into.
    pub fn over_folder(&self) -> Option<&FolderId> {
        match &self.placement {
            Placement::MoveInto(id) => Some(id),
            _ => None,
        }
    }

    pub fn over_back(&self) -> bool { matches!(self.placement, Placement::MoveToParent) }

    /// Slot index the drag would reorder to, when the placement is a reorder.
    pub fn preview_index(&self) -> Option<usize> {
        match self.placement {
            Placement::ReorderTo(index) => Some(index),
            _ => None,
        }
    }

    pub fn on_pointer_down<H: DragHost>(&mut self, host: &H, at: Point) {
        self.last_pointer = at;
        self.placement = Placement::None;
        self.phase = match host.hit_test(at) {
            Some(HitTarget::Account(id)) => {
                DragPhase::Pending { item: ItemRef::Account(id), origin: at }
            }
            Some(HitTarget::Folder(id)) => {
                DragPhase::Pending { item: ItemRef::Folder(id), origin: at }
            }
            _ => DragPhase::Idle,
        };
    }

    pub fn on_pointer_move<H: DragHost>(&mut self, host: &mut H, at: Point) {
        self.last_pointer = at;
        match &self.phase {
            DragPhase::Idle => {}
            DragPhase::Pending { item, origin } => {
                let moved = (at.x - origin.x).abs() + (at.y - origin.y).abs();
                if moved > self.config.threshold {
                    let item = item.clone();
                    let snapshot = capture_snapshot(host, &item);
                    host.show_preview(&item, at);
                    self.phase = DragPhase::Dragging { item, snapshot };
                    self.drag_update(host, at);
                }
            }
            DragPhase::Dragging { .. } => self.drag_update(host, at),
        }
    }

    /// The surface scrolled under the pointer: slot geometry is stale, so
    /// re-capture it and re-resolve at the last known pointer position.
    pub fn on_scroll<H: DragHost>(&mut self, host: &mut H) {
        let item = match &self.phase {
            DragPhase::Dragging { item, .. } => item.clone(),
            _ => return,
        };
        let snapshot = capture_snapshot(host, &item);
        self.phase = DragPhase::Dragging { item, snapshot };
        self.drag_update(host, self.last_pointer);
    }

    /// Release the pointer. Commits the resolved placement, then refreshes
    /// the host and arms the click guard so the click generated by the same
    /// release cannot activate an item.
    pub fn on_pointer_up<H: DragHost, S: BlobStore>(
        &mut self,
        host: &mut H,
        organizer: &mut Organizer<S>,
    ) {
        let phase = mem::replace(&mut self.phase, DragPhase::Idle);
        let placement = mem::replace(&mut self.placement, Placement::None);
        let DragPhase::Dragging { item, .. } = phase else { return };

        self.commit(host, organizer, &item, placement);
        host.refresh();
        host.clear_preview();
        self.eat_next_click = true;
    }

    /// Returns true when the click following a drag should be swallowed.
    /// Consumes the guard either way.
    pub fn on_click_capture(&mut self) -> bool {
        let eat = self.eat_next_click;
        self.eat_next_click = false;
        eat
    }

    /// Drop the click guard without a click, for hosts that deliver no click
    /// event after a release outside their surface.
    pub fn disarm_click_guard(&mut self) { self.eat_next_click = false; }

    fn drag_update<H: DragHost>(&mut self, host: &mut H, at: Point) {
        host.move_preview(at);
        let DragPhase::Dragging { item, snapshot } = &self.phase else { return };
        self.placement = compute_placement(item, snapshot, host.hit_test(at), at);
    }

    fn commit<H: DragHost, S: BlobStore>(
        &self,
        host: &H,
        organizer: &mut Organizer<S>,
        item: &ItemRef,
        placement: Placement,
    ) {
        let platform = host.active_platform();
        match placement {
            Placement::MoveToParent => {
                // Meaningless at a platform root; there is nowhere further up.
                let Some(current) = host.current_folder() else { return };
                let parent = organizer.get_folder(&current).and_then(|f| f.parent_id.clone());
                organizer.move_item(item, parent.as_ref(), &platform, None);
            }
            Placement::MoveInto(dest) => {
                organizer.move_item(item, Some(&dest), &platform, None);
            }
            Placement::ReorderTo(index) => {
                let mut folders = host.folder_items();
                let mut accounts = host.account_items();
                match item {
                    ItemRef::Folder(id) => {
                        folders.retain(|f| f != id);
                        folders.insert(index.min(folders.len()), id.clone());
                    }
                    ItemRef::Account(id) => {
                        accounts.retain(|a| a != id);
                        accounts.insert(index.min(accounts.len()), id.clone());
                    }
                }
                let items = folders
                    .into_iter()
                    .map(ItemRef::Folder)
                    .chain(accounts.into_iter().map(ItemRef::Account))
                    .collect();
                organizer.reorder_items(host.current_folder().as_ref(), &platform, items);
            }
            Placement::None => {}
        }
    }
}

impl Default for GestureController {
    fn default() -> Self { Self::new(DragSettings::default()) }
}

fn capture_snapshot<H: DragHost>(host: &H, item: &ItemRef) -> SlotSnapshot {
    let rects = host.slot_rects(item.kind());
    let origin_index = match item {
        ItemRef::Folder(id) => host.folder_items().iter().position(|f| f == id),
        ItemRef::Account(id) => host.account_items().iter().position(|a| a == id),
    };
    SlotSnapshot::new(rects, origin_index, host.view_layout())
}
