//! Folder organization for multi-platform account switching.
//!
//! Accounts are grouped into nestable folders per platform; each container
//! keeps an explicit display order. The [`organizer`] applies mutations and
//! persists after each one, [`placement`] turns pointer gestures into those
//! mutations.

pub mod common;
pub mod model;
pub mod organizer;
pub mod placement;
