//! Identifier types shared by the store and the placement layer.
//!
//! All ids are opaque strings owned by this crate's store (folders) or by the
//! external account source (accounts). Platforms namespace everything: an
//! account id is only meaningful within one platform.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of the synthesized per-platform root container key.
pub const ROOT_KEY_PREFIX: &str = "root:";

/// An account-platform namespace (e.g. "steam").
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Platform(String);

impl Platform {
    pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }

    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// An externally-owned account id. The store references these but never
/// mints or retires them.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Id of a folder record. Globally unique and immutable once minted.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct FolderId(String);

impl FolderId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// The two kinds of item a container can hold.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Account,
    Folder,
}

/// A typed reference to an item in a container's order list.
///
/// Wire shape is `{"type": "account", "id": "..."}`, matching the persisted
/// blob format.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ItemRef {
    Account(AccountId),
    Folder(FolderId),
}

impl ItemRef {
    pub fn account(id: impl Into<String>) -> Self { Self::Account(AccountId::new(id)) }

    pub fn folder(id: impl Into<String>) -> Self { Self::Folder(FolderId::new(id)) }

    #[inline]
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemRef::Account(_) => ItemKind::Account,
            ItemRef::Folder(_) => ItemKind::Folder,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        match self {
            ItemRef::Account(id) => id.as_str(),
            ItemRef::Folder(id) => id.as_str(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerKeyError {
    #[error("container key is empty")]
    Empty,
    #[error("root container key is missing a platform")]
    MissingPlatform,
}

/// Identifies one ordered item list: either a folder's own children or the
/// synthesized root container of a platform.
///
/// Serialized as a plain string (`root:<platform>` or the folder id) so it
/// can key a JSON object.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ContainerKey {
    Root(Platform),
    Folder(FolderId),
}

impl ContainerKey {
    pub fn root(platform: &Platform) -> Self { Self::Root(platform.clone()) }

    pub fn folder(id: &FolderId) -> Self { Self::Folder(id.clone()) }

    /// The container a `folderId | null` argument addresses: the folder's own
    /// list when present, the platform root otherwise.
    pub fn resolve(folder_id: Option<&FolderId>, platform: &Platform) -> Self {
        match folder_id {
            Some(id) => Self::folder(id),
            None => Self::root(platform),
        }
    }
}

impl fmt::Display for ContainerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKey::Root(platform) => write!(f, "{ROOT_KEY_PREFIX}{platform}"),
            ContainerKey::Folder(id) => f.write_str(id.as_str()),
        }
    }
}

impl FromStr for ContainerKey {
    type Err = ContainerKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ContainerKeyError::Empty);
        }
        match s.strip_prefix(ROOT_KEY_PREFIX) {
            Some("") => Err(ContainerKeyError::MissingPlatform),
            Some(platform) => Ok(ContainerKey::Root(Platform::new(platform))),
            None => Ok(ContainerKey::Folder(FolderId::new(s))),
        }
    }
}

impl serde::ser::Serialize for ContainerKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::de::Deserialize<'de> for ContainerKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        struct ContainerKeyVisitor;
        impl serde::de::Visitor<'_> for ContainerKeyVisitor {
            type Value = ContainerKey;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a container key string (`root:<platform>` or a folder id)")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                ContainerKey::from_str(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(ContainerKeyVisitor)
    }
}
