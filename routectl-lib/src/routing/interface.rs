use serde::Serialize;

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::Arc;

use super::Error;
use super::route_ops::RouteOps;

/// Opaque, OS assigned identifier of a network adapter.
///
/// Stable for the adapter's lifetime within one boot, unlike the numeric
/// index which may be handed out again once an adapter disappears.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct InterfaceId(pub u64);

impl Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Network adapter as seen at query time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Interface {
    pub index: u32,
    pub id: InterfaceId,
    /// User visible name, e.g. `eth0`. Not guaranteed unique.
    pub alias: String,
    pub description: String,
}

/// Point-in-time index over the adapter set.
///
/// Built once per operation and dropped with it. Interfaces are reachable by
/// id, by numeric index and by lowercased alias.
#[derive(Debug, Default)]
pub struct Directory {
    interfaces: Vec<Arc<Interface>>,
    by_id: HashMap<InterfaceId, Arc<Interface>>,
    by_index: HashMap<u32, Arc<Interface>>,
    by_alias: HashMap<String, Arc<Interface>>,
}

impl Directory {
    /// Snapshots the current adapter set through `ops`.
    pub async fn build<R: RouteOps>(ops: &R) -> Result<Self, Error> {
        let adapters = ops.list_adapters().await.map_err(Error::DirectoryQueryFailed)?;
        let directory = Self::from_interfaces(adapters);
        tracing::debug!(count = directory.interfaces.len(), "interface directory built");
        Ok(directory)
    }

    pub fn from_interfaces(adapters: Vec<Interface>) -> Self {
        let mut directory = Directory {
            interfaces: Vec::with_capacity(adapters.len()),
            by_id: HashMap::with_capacity(adapters.len()),
            by_index: HashMap::with_capacity(adapters.len()),
            by_alias: HashMap::with_capacity(adapters.len()),
        };

        for adapter in adapters {
            let iface = Arc::new(adapter);
            directory.by_id.insert(iface.id, iface.clone());
            directory.by_index.insert(iface.index, iface.clone());
            // first adapter wins on alias collisions, later ones stay reachable by id and index
            match directory.by_alias.get(&iface.alias.to_lowercase()) {
                Some(existing) => {
                    tracing::debug!(
                        alias = %iface.alias,
                        shadowed_index = iface.index,
                        kept_index = existing.index,
                        "duplicate interface alias"
                    );
                }
                None => {
                    directory.by_alias.insert(iface.alias.to_lowercase(), iface.clone());
                }
            }
            directory.interfaces.push(iface);
        }
        directory
    }

    /// Resolves an identifier that is either a numeric index or an alias.
    ///
    /// Numeric tokens are tried against the index map first; anything that
    /// does not resolve there falls back to a case-insensitive alias lookup.
    pub fn find_interface(&self, identifier: &str) -> Result<Arc<Interface>, Error> {
        // plain decimal only, so "+3" or " 3" are taken as aliases
        let by_index = Some(identifier)
            .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|id| id.parse::<u32>().ok())
            .and_then(|i| self.by_index.get(&i));
        if let Some(iface) = by_index {
            return Ok(iface.clone());
        }

        self.by_alias
            .get(&identifier.to_lowercase())
            .cloned()
            .ok_or_else(|| Error::InterfaceNotFound(identifier.to_string()))
    }

    pub fn by_id(&self, id: InterfaceId) -> Option<&Arc<Interface>> {
        self.by_id.get(&id)
    }

    pub fn by_index(&self, index: u32) -> Option<&Arc<Interface>> {
        self.by_index.get(&index)
    }

    /// Interfaces in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Interface>> {
        self.interfaces.iter()
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}
