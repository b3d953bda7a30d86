//! Mutation engine over the folder store.
//!
//! Every operation is total: bad arguments degrade to a logged no-op, never
//! an error. Operations that change the store flush it through the blob store
//! before returning; guard-rejected calls flush nothing.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use tracing::{debug, warn};

use crate::common::collections::HashSet;
use crate::common::log::trace_misc;
use crate::model::{
    AccountId, CURRENT_VERSION, ContainerKey, Folder, FolderId, FolderStore, ItemRef, Platform,
};
use crate::organizer::persist::{BlobStore, STORE_KEY};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub struct Organizer<S> {
    store: FolderStore,
    blob: S,
}

impl<S: BlobStore> Organizer<S> {
    /// Read and sanitize the persisted store. A missing or unreadable blob
    /// starts empty; repairs are not written back until the next mutation.
    pub fn load(blob: S) -> Self {
        let store = match blob.get(STORE_KEY) {
            Ok(Some(raw)) => FolderStore::from_blob(&raw),
            Ok(None) => FolderStore::empty(),
            Err(err) => {
                warn!("failed to read folder store: {err}");
                FolderStore::empty()
            }
        };
        Self { store, blob }
    }

    #[inline]
    pub fn store(&self) -> &FolderStore { &self.store }

    #[inline]
    pub fn blob(&self) -> &S { &self.blob }

    pub fn get_folder(&self, id: &FolderId) -> Option<&Folder> { self.store.folder(id) }

    /// Folders from the root down to `id`, inclusive. Empty at a root or for
    /// unknown ids.
    pub fn folder_path(&self, id: Option<&FolderId>) -> Vec<&Folder> {
        let mut path = Vec::new();
        let mut seen = HashSet::default();
        let mut cur = id.and_then(|id| self.store.folder(id));
        while let Some(folder) = cur {
            if !seen.insert(folder.id.clone()) {
                break;
            }
            path.push(folder);
            cur = folder.parent_id.as_ref().and_then(|pid| self.store.folder(pid));
        }
        path.reverse();
        path
    }

    pub fn items_in_folder(&self, folder: Option<&FolderId>, platform: &Platform) -> &[ItemRef] {
        self.store.items(&ContainerKey::resolve(folder, platform))
    }

    /// Create a folder under `parent`, or at the platform root when `parent`
    /// is absent, unknown, or on another platform. Returns the new record.
    pub fn create_folder(
        &mut self,
        platform: &Platform,
        name: &str,
        parent: Option<&FolderId>,
    ) -> Folder {
        let parent_id = match parent {
            Some(pid) => match self.store.folder(pid) {
                Some(folder) if folder.platform == *platform => Some(pid.clone()),
                Some(_) => {
                    debug!("parent folder '{pid}' is on another platform, creating at root");
                    None
                }
                None => {
                    debug!("parent folder '{pid}' does not exist, creating at root");
                    None
                }
            },
            None => None,
        };

        let folder = Folder {
            id: mint_id(),
            name: name.to_string(),
            parent_id,
            platform: platform.clone(),
        };
        self.store.folders.push(folder.clone());
        self.store
            .item_order
            .entry(folder.parent_container())
            .or_default()
            .push(ItemRef::Folder(folder.id.clone()));
        self.store.item_order.insert(ContainerKey::folder(&folder.id), Vec::new());
        self.flush();
        folder
    }

    pub fn rename_folder(&mut self, id: &FolderId, name: &str) {
        match self.store.folder_mut(id) {
            Some(folder) => {
                folder.name = name.to_string();
                self.flush();
            }
            None => debug!("cannot rename unknown folder '{id}'"),
        }
    }

    /// Move `item` into `dest` (or the platform root) at `index`, clamped to
    /// the destination length; `None` appends. The item is pulled out of
    /// whichever of the platform's containers currently holds it, and is
    /// inserted even when no container did.
    pub fn move_item(
        &mut self,
        item: &ItemRef,
        dest: Option<&FolderId>,
        platform: &Platform,
        index: Option<usize>,
    ) {
        if let Some(dest_id) = dest {
            match self.store.folder(dest_id) {
                Some(folder) if folder.platform == *platform => {}
                Some(_) => {
                    debug!("move target '{dest_id}' is on another platform");
                    return;
                }
                None => {
                    debug!("move target folder '{dest_id}' does not exist");
                    return;
                }
            }
        }

        if let ItemRef::Folder(id) = item {
            match self.store.folder(id) {
                Some(folder) if folder.platform == *platform => {}
                Some(_) => {
                    debug!("folder '{id}' is on another platform");
                    return;
                }
                None => {
                    debug!("cannot move unknown folder '{id}'");
                    return;
                }
            }
            if let Some(dest_id) = dest {
                if id == dest_id || self.is_descendant(dest_id, id) {
                    debug!("cannot move folder '{id}' into itself");
                    return;
                }
            }
        }

        self.remove_from_platform(item, platform);
        if let ItemRef::Folder(id) = item {
            if let Some(folder) = self.store.folder_mut(id) {
                folder.parent_id = dest.cloned();
            }
        }

        let list = self.store.item_order.entry(ContainerKey::resolve(dest, platform)).or_default();
        match index {
            Some(index) => list.insert(index.min(list.len()), item.clone()),
            None => list.push(item.clone()),
        }
        self.flush();
    }

    /// Replace a container's list wholesale. The caller supplies the complete
    /// new order.
    pub fn reorder_items(
        &mut self,
        folder: Option<&FolderId>,
        platform: &Platform,
        items: Vec<ItemRef>,
    ) {
        if let Some(id) = folder {
            if self.store.folder(id).is_none() {
                debug!("cannot reorder unknown folder '{id}'");
                return;
            }
        }
        self.store.item_order.insert(ContainerKey::resolve(folder, platform), items);
        self.flush();
    }

    /// Delete a folder and dissolve its whole subtree into its parent
    /// container: the folder's items take its place in the parent list, and
    /// every descendant folder is unwrapped in turn with its items appended
    /// at the end.
    pub fn delete_folder(&mut self, id: &FolderId) {
        let Some(folder) = self.store.folder(id) else {
            debug!("cannot delete unknown folder '{id}'");
            return;
        };
        let parent_key = folder.parent_container();

        let lifted = self.store.item_order.remove(&ContainerKey::folder(id)).unwrap_or_default();
        let parent_list = self.store.item_order.entry(parent_key.clone()).or_default();
        match parent_list.iter().position(|item| matches!(item, ItemRef::Folder(fid) if fid == id))
        {
            Some(pos) => {
                let mut tail = parent_list.split_off(pos);
                tail.remove(0);
                parent_list.extend(lifted);
                parent_list.append(&mut tail);
            }
            None => parent_list.extend(lifted),
        }
        self.store.folders.retain(|f| f.id != *id);

        let children: Vec<FolderId> = self
            .store
            .folders
            .iter()
            .filter(|f| f.parent_id.as_ref() == Some(id))
            .map(|f| f.id.clone())
            .collect();
        for child in &children {
            self.dissolve_into(child, &parent_key);
        }
        self.flush();
    }

    /// Reconcile a platform's containers against the accounts that actually
    /// exist: stale account refs are dropped everywhere, unplaced accounts
    /// are appended to the platform root.
    pub fn sync_accounts(&mut self, platform: &Platform, accounts: &[AccountId]) {
        let live: HashSet<&AccountId> = accounts.iter().collect();
        let keys: Vec<ContainerKey> = self
            .store
            .item_order
            .keys()
            .filter(|key| self.container_platform(key) == Some(platform))
            .cloned()
            .collect();

        let mut present: HashSet<AccountId> = HashSet::default();
        for key in &keys {
            for item in self.store.items(key) {
                if let ItemRef::Account(id) = item {
                    present.insert(id.clone());
                }
            }
        }

        for key in &keys {
            if let Some(list) = self.store.item_order.get_mut(key) {
                list.retain(|item| match item {
                    ItemRef::Account(id) => live.contains(id),
                    ItemRef::Folder(_) => true,
                });
            }
        }

        let root_list = self.store.item_order.entry(ContainerKey::root(platform)).or_default();
        for id in accounts {
            if present.insert(id.clone()) {
                root_list.push(ItemRef::Account(id.clone()));
            }
        }
        self.flush();
    }

    /// Render a platform's folder hierarchy for inspection.
    pub fn draw_tree(&self, platform: &Platform) -> String {
        let tree = self.get_ascii_tree(&ContainerKey::root(platform));
        let mut out = String::new();
        ascii_tree::write_tree(&mut out, &tree).unwrap();
        out
    }

    fn get_ascii_tree(&self, key: &ContainerKey) -> ascii_tree::Tree {
        let desc = match key {
            ContainerKey::Root(platform) => format!("root ({platform})"),
            ContainerKey::Folder(id) => match self.store.folder(id) {
                Some(folder) => format!("{} ({})", folder.name, folder.id),
                None => format!("({id})"),
            },
        };
        let items = self.store.items(key);
        if items.is_empty() {
            return ascii_tree::Tree::Leaf(vec![desc]);
        }
        let children = items
            .iter()
            .map(|item| match item {
                ItemRef::Account(id) => ascii_tree::Tree::Leaf(vec![format!("account {id}")]),
                ItemRef::Folder(id) => self.get_ascii_tree(&ContainerKey::folder(id)),
            })
            .collect();
        ascii_tree::Tree::Node(desc, children)
    }

    fn dissolve_into(&mut self, id: &FolderId, dest: &ContainerKey) {
        let lifted = self.store.item_order.remove(&ContainerKey::folder(id)).unwrap_or_default();
        if let Some(list) = self.store.item_order.get_mut(dest) {
            list.retain(|item| !matches!(item, ItemRef::Folder(fid) if fid == id));
            list.extend(lifted);
        }
        self.store.folders.retain(|f| f.id != *id);

        let children: Vec<FolderId> = self
            .store
            .folders
            .iter()
            .filter(|f| f.parent_id.as_ref() == Some(id))
            .map(|f| f.id.clone())
            .collect();
        for child in &children {
            self.dissolve_into(child, dest);
        }
    }

    fn is_descendant(&self, folder: &FolderId, ancestor: &FolderId) -> bool {
        let mut seen = HashSet::default();
        let mut cur = self.store.folder(folder);
        while let Some(f) = cur {
            let Some(parent_id) = &f.parent_id else { return false };
            if parent_id == ancestor {
                return true;
            }
            if !seen.insert(parent_id.clone()) {
                return false;
            }
            cur = self.store.folder(parent_id);
        }
        false
    }

    fn container_platform<'a>(&'a self, key: &'a ContainerKey) -> Option<&'a Platform> {
        match key {
            ContainerKey::Root(platform) => Some(platform),
            ContainerKey::Folder(id) => self.store.folder(id).map(|f| &f.platform),
        }
    }

    fn remove_from_platform(&mut self, item: &ItemRef, platform: &Platform) {
        let keys: Vec<ContainerKey> = self
            .store
            .item_order
            .keys()
            .filter(|key| self.container_platform(key) == Some(platform))
            .cloned()
            .collect();
        for key in keys {
            if let Some(list) = self.store.item_order.get_mut(&key) {
                list.retain(|existing| existing != item);
            }
        }
    }

    fn flush(&mut self) {
        self.store.version = CURRENT_VERSION;
        let blob = match self.store.to_blob() {
            Ok(blob) => blob,
            Err(err) => {
                warn!("failed to serialize folder store: {err}");
                return;
            }
        };
        if let Err(err) = trace_misc("writing folder store", || self.blob.set(STORE_KEY, &blob)) {
            warn!("failed to persist folder store: {err}");
        }
    }
}

/// Mint a folder id: the current epoch milliseconds in base36 plus four
/// random base36 characters.
fn mint_id() -> FolderId {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let mut id = to_base36(millis);
    let mut rng = rand::rng();
    for _ in 0..4 {
        id.push(BASE36[rng.random_range(0..BASE36.len())] as char);
    }
    FolderId::new(id)
}

fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}
