pub mod folder;
pub mod ids;

pub use folder::{CURRENT_VERSION, Folder, FolderStore};
pub use ids::{AccountId, ContainerKey, FolderId, ItemKind, ItemRef, Platform};
