//! Folder records and the persisted store payload.
//!
//! The persisted blob is a single JSON document: `{version, folders,
//! itemOrder}`. Everything read from it is untrusted; [`FolderStore::from_blob`]
//! repairs or drops malformed pieces instead of failing, so loading never
//! errors and always yields a store that satisfies the structural rules
//! checked by [`FolderStore::validate`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::common::collections::{HashMap, HashSet};
use crate::model::ids::{AccountId, ContainerKey, FolderId, ItemRef, Platform, ROOT_KEY_PREFIX};

/// Schema version written with every flush.
pub const CURRENT_VERSION: u32 = 1;

/// One folder record. The id is immutable once minted; `parent_id` is `None`
/// for root-level folders. A folder never changes platform.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub parent_id: Option<FolderId>,
    pub platform: Platform,
}

impl Folder {
    /// The container holding this folder's own reference: the parent folder's
    /// list, or the platform root for top-level folders.
    pub fn parent_container(&self) -> ContainerKey {
        ContainerKey::resolve(self.parent_id.as_ref(), &self.platform)
    }
}

/// The whole persisted payload: folder records plus one ordered item list per
/// container key.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderStore {
    pub version: u32,
    pub folders: Vec<Folder>,
    pub item_order: BTreeMap<ContainerKey, Vec<ItemRef>>,
}

impl Default for FolderStore {
    fn default() -> Self { Self::empty() }
}

impl FolderStore {
    pub fn empty() -> Self {
        Self {
            version: CURRENT_VERSION,
            folders: Vec::new(),
            item_order: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn folder(&self, id: &FolderId) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == *id)
    }

    #[inline]
    pub fn folder_mut(&mut self, id: &FolderId) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| f.id == *id)
    }

    #[inline]
    pub fn items(&self, key: &ContainerKey) -> &[ItemRef] {
        self.item_order.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Parse and sanitize a persisted blob. Unreadable input degrades to an
    /// empty store; readable input keeps whatever passes sanitization.
    pub fn from_blob(raw: &str) -> FolderStore {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::sanitize(&value),
            Err(err) => {
                warn!("unreadable folder store, starting empty: {err}");
                FolderStore::empty()
            }
        }
    }

    pub fn to_blob(&self) -> serde_json::Result<String> { serde_json::to_string(self) }

    fn sanitize(value: &Value) -> FolderStore {
        let mut store = FolderStore::empty();

        // Folder records: well-typed fields only, first occurrence of an id
        // wins.
        let mut seen_ids = HashSet::default();
        if let Some(folders) = value.get("folders").and_then(Value::as_array) {
            for raw in folders {
                let Some(folder) = sanitize_folder(raw) else { continue };
                if !seen_ids.insert(folder.id.clone()) {
                    continue;
                }
                store.folders.push(folder);
            }
        }

        repair_parent_links(&mut store.folders);

        // Order lists: keep root containers and containers of surviving
        // folders, drop everything else.
        if let Some(entries) = value.get("itemOrder").and_then(Value::as_object) {
            for (key, entry) in entries {
                let Some(key) = sanitize_container_key(key) else { continue };
                if let ContainerKey::Folder(id) = &key {
                    if !seen_ids.contains(id) {
                        continue;
                    }
                }
                let Some(list) = entry.as_array() else { continue };
                let refs = list.iter().filter_map(sanitize_item_ref).collect();
                store.item_order.insert(key, refs);
            }
        }

        canonicalize_folder_refs(&mut store);
        dedupe_account_refs(&mut store);

        // Every folder owns exactly one child list, even when empty.
        let ids: Vec<FolderId> = store.folders.iter().map(|f| f.id.clone()).collect();
        for id in ids {
            store.item_order.entry(ContainerKey::Folder(id)).or_default();
        }

        store
    }

    /// Check the structural rules every committed store must satisfy and
    /// report each violation found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.version != CURRENT_VERSION {
            issues.push(format!(
                "version is {}, expected {}",
                self.version, CURRENT_VERSION
            ));
        }

        let mut seen = HashSet::default();
        for folder in &self.folders {
            if !seen.insert(folder.id.clone()) {
                issues.push(format!("duplicate folder id '{}'", folder.id));
            }
        }

        for folder in &self.folders {
            if let Some(parent_id) = &folder.parent_id {
                match self.folder(parent_id) {
                    None => issues.push(format!(
                        "folder '{}' has missing parent '{}'",
                        folder.id, parent_id
                    )),
                    Some(parent) if parent.platform != folder.platform => issues.push(format!(
                        "folder '{}' has parent '{}' on another platform",
                        folder.id, parent_id
                    )),
                    Some(_) => {}
                }
            }
            if self.has_cyclic_ancestry(folder) {
                issues.push(format!("folder '{}' is its own ancestor", folder.id));
            }
            if !self.item_order.contains_key(&ContainerKey::folder(&folder.id)) {
                issues.push(format!("folder '{}' has no order list of its own", folder.id));
            }
        }

        let mut ref_counts: HashMap<FolderId, usize> = HashMap::default();
        for (key, list) in &self.item_order {
            if let ContainerKey::Folder(id) = key {
                if self.folder(id).is_none() {
                    issues.push(format!("order list keyed by unknown folder '{id}'"));
                }
            }
            for item in list {
                if let ItemRef::Folder(id) = item {
                    match self.folder(id) {
                        None => issues.push(format!(
                            "dangling folder reference '{id}' in container '{key}'"
                        )),
                        Some(folder) if folder.parent_container() != *key => issues.push(
                            format!("folder '{id}' is referenced outside its parent container"),
                        ),
                        Some(_) => {}
                    }
                    *ref_counts.entry(id.clone()).or_default() += 1;
                }
            }
        }
        for folder in &self.folders {
            let count = ref_counts.get(&folder.id).copied().unwrap_or(0);
            if count != 1 {
                issues.push(format!(
                    "folder '{}' is referenced {} times, expected exactly once",
                    folder.id, count
                ));
            }
        }

        let mut placed: BTreeMap<(Platform, AccountId), usize> = BTreeMap::new();
        for (key, list) in &self.item_order {
            let platform = match key {
                ContainerKey::Root(platform) => Some(platform.clone()),
                ContainerKey::Folder(id) => self.folder(id).map(|f| f.platform.clone()),
            };
            let Some(platform) = platform else { continue };
            for item in list {
                if let ItemRef::Account(id) = item {
                    *placed.entry((platform.clone(), id.clone())).or_default() += 1;
                }
            }
        }
        for ((platform, id), count) in &placed {
            if *count > 1 {
                issues.push(format!(
                    "account '{id}' appears {count} times under platform '{platform}'"
                ));
            }
        }

        issues
    }

    fn has_cyclic_ancestry(&self, start: &Folder) -> bool {
        let mut seen = HashSet::default();
        seen.insert(start.id.clone());
        let mut cur = start;
        while let Some(parent_id) = &cur.parent_id {
            if !seen.insert(parent_id.clone()) {
                return true;
            }
            match self.folder(parent_id) {
                Some(parent) => cur = parent,
                None => break,
            }
        }
        false
    }
}

fn sanitize_folder(value: &Value) -> Option<Folder> {
    let raw = value.as_object()?;
    let id = raw.get("id").and_then(Value::as_str).map(str::trim).unwrap_or("");
    let name = raw.get("name").and_then(Value::as_str).map(str::trim).unwrap_or("");
    let platform = raw.get("platform").and_then(Value::as_str).map(str::trim).unwrap_or("");
    if id.is_empty() || name.is_empty() || platform.is_empty() {
        return None;
    }
    // An id shaped like a root key would collide with the synthesized root
    // containers.
    if id.starts_with(ROOT_KEY_PREFIX) {
        return None;
    }
    let parent_id = raw
        .get("parentId")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(FolderId::new);
    Some(Folder {
        id: FolderId::new(id),
        name: name.to_string(),
        parent_id,
        platform: Platform::new(platform),
    })
}

fn sanitize_item_ref(value: &Value) -> Option<ItemRef> {
    let raw = value.as_object()?;
    let id = raw.get("id").and_then(Value::as_str).map(str::trim).unwrap_or("");
    if id.is_empty() {
        return None;
    }
    match raw.get("type").and_then(Value::as_str) {
        Some("account") => Some(ItemRef::account(id)),
        Some("folder") => Some(ItemRef::folder(id)),
        _ => None,
    }
}

fn sanitize_container_key(raw: &str) -> Option<ContainerKey> {
    match raw.trim().parse::<ContainerKey>() {
        Ok(ContainerKey::Root(platform)) => {
            let trimmed = platform.as_str().trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(ContainerKey::Root(Platform::new(trimmed)))
            }
        }
        Ok(key) => Some(key),
        Err(_) => None,
    }
}

fn repair_parent_links(folders: &mut [Folder]) {
    // Missing and cross-platform parents are cut, making the folder
    // root-level instead of orphaned.
    for i in 0..folders.len() {
        let Some(parent_id) = folders[i].parent_id.clone() else { continue };
        let platform = folders[i].platform.clone();
        let ok = folders.iter().any(|f| f.id == parent_id && f.platform == platform);
        if !ok {
            folders[i].parent_id = None;
        }
    }

    // A folder must never be its own ancestor; cut the link that closes a
    // cycle.
    let index: HashMap<FolderId, usize> =
        folders.iter().enumerate().map(|(i, f)| (f.id.clone(), i)).collect();
    for start in 0..folders.len() {
        let mut seen = HashSet::default();
        seen.insert(folders[start].id.clone());
        let mut cur = start;
        while let Some(parent_id) = folders[cur].parent_id.clone() {
            if !seen.insert(parent_id.clone()) {
                folders[cur].parent_id = None;
                break;
            }
            match index.get(&parent_id) {
                Some(&next) => cur = next,
                None => break,
            }
        }
    }
}

fn canonicalize_folder_refs(store: &mut FolderStore) {
    // A folder appears exactly once, in its parent's container: drop refs
    // that point nowhere or sit in the wrong list, then append any folder the
    // lists lost entirely.
    let expected: HashMap<FolderId, ContainerKey> = store
        .folders
        .iter()
        .map(|f| (f.id.clone(), f.parent_container()))
        .collect();

    let mut placed = HashSet::default();
    for (key, list) in store.item_order.iter_mut() {
        list.retain(|item| match item {
            ItemRef::Folder(id) => {
                expected.get(id).is_some_and(|k| k == key) && placed.insert(id.clone())
            }
            ItemRef::Account(_) => true,
        });
    }

    for folder in &store.folders {
        if placed.contains(&folder.id) {
            continue;
        }
        store
            .item_order
            .entry(folder.parent_container())
            .or_default()
            .push(ItemRef::Folder(folder.id.clone()));
    }
}

fn dedupe_account_refs(store: &mut FolderStore) {
    // Within one platform an account id may appear only once across all of
    // that platform's containers.
    let mut platforms: HashMap<ContainerKey, Platform> = HashMap::default();
    for key in store.item_order.keys() {
        let platform = match key {
            ContainerKey::Root(platform) => Some(platform.clone()),
            ContainerKey::Folder(id) => {
                store.folders.iter().find(|f| f.id == *id).map(|f| f.platform.clone())
            }
        };
        if let Some(platform) = platform {
            platforms.insert(key.clone(), platform);
        }
    }

    let mut placed: HashSet<(Platform, AccountId)> = HashSet::default();
    for (key, list) in store.item_order.iter_mut() {
        let Some(platform) = platforms.get(key) else { continue };
        list.retain(|item| match item {
            ItemRef::Account(id) => placed.insert((platform.clone(), id.clone())),
            ItemRef::Folder(_) => true,
        });
    }
}
