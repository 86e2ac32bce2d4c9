use std::sync::Arc;

use super::Error;
use super::filter::{Filter, matches_all};
use super::interface::{Directory, Interface};
use super::route::Route;
use super::route_ops::RouteOps;

/// Entry point for querying and mutating the routing table.
///
/// Holds no state besides the backend: every operation snapshots the adapter
/// set and the routing table again.
///
/// Generic over `R: RouteOps` so tests can inject mock route operations.
#[derive(Clone)]
pub struct RouteTable<R: RouteOps> {
    pub(super) ops: R,
}

impl<R: RouteOps> RouteTable<R> {
    pub fn new(ops: R) -> Self {
        Self { ops }
    }

    /// Fresh snapshot of the adapter set.
    pub async fn directory(&self) -> Result<Directory, Error> {
        Directory::build(&self.ops).await
    }

    /// Resolves an index or (case-insensitive) alias against a fresh snapshot.
    pub async fn find_interface(&self, identifier: &str) -> Result<Arc<Interface>, Error> {
        self.directory().await?.find_interface(identifier)
    }

    /// Lists routes matching every filter, in OS enumeration order.
    ///
    /// Rows whose interface is not in the current directory are skipped; the
    /// adapter is most likely being torn down concurrently.
    pub async fn get_routes(&self, filters: &[Filter]) -> Result<Vec<Route>, Error> {
        let directory = self.directory().await?;
        let raw_routes = self.ops.list_routes().await.map_err(Error::RouteQueryFailed)?;
        let total = raw_routes.len();

        let mut skipped = 0;
        let mut routes = Vec::with_capacity(total);
        for raw in raw_routes {
            let Some(iface) = directory.by_id(raw.interface) else {
                tracing::trace!(destination = %raw.destination, interface = %raw.interface, "skipping route on unknown interface");
                skipped += 1;
                continue;
            };
            let route = Route::enrich(raw, iface.clone());
            if matches_all(filters, &route) {
                routes.push(route);
            }
        }

        tracing::debug!(total, skipped, matched = routes.len(), filters = filters.len(), "routes aggregated");
        Ok(routes)
    }
}
