//! The organizer owns the folder store and applies every mutation to it,
//! flushing through a [`BlobStore`] after each one.

pub mod engine;
pub mod persist;

pub use engine::Organizer;
pub use persist::{BlobStore, FileBlobStore, MemoryBlobStore, PersistError, STORE_KEY};

#[cfg(test)]
mod tests;
