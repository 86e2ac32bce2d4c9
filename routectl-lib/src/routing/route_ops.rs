//! Platform-agnostic routing table abstraction.
//!
//! Defines the [`RouteOps`] trait the engine is written against.
//!
//! Platform-specific implementations:
//! - Linux: [`NetlinkRouteOps`](super::route_ops_linux::NetlinkRouteOps) via rtnetlink

use async_trait::async_trait;

use super::OsError;
use super::interface::{Interface, InterfaceId};
use super::route::{RawRoute, RouteSpec};

/// Abstraction over the OS adapter enumeration and routing table.
///
/// Implementors must be cheaply cloneable and classify their failures:
/// [`OsError::AlreadyExists`] and [`OsError::NotFound`] are reported as such,
/// never folded into a generic error.
#[async_trait]
pub trait RouteOps: Send + Sync + Clone {
    /// All adapters with index, id, alias and description.
    async fn list_adapters(&self) -> Result<Vec<Interface>, OsError>;

    /// All routing table rows, IPv4 and IPv6.
    async fn list_routes(&self) -> Result<Vec<RawRoute>, OsError>;

    /// Resolve a numeric index to the adapter's stable id.
    /// [`OsError::NotFound`] if no adapter currently has that index.
    async fn interface_id(&self, index: u32) -> Result<InterfaceId, OsError>;

    /// Add a route. [`OsError::AlreadyExists`] if the destination, next hop
    /// and interface tuple is already present.
    async fn route_add(&self, route: &RouteSpec, metric: u32) -> Result<(), OsError>;

    /// Delete the route matching destination, next hop and interface exactly.
    /// [`OsError::NotFound`] if there is no such row.
    async fn route_del(&self, route: &RouteSpec) -> Result<(), OsError>;
}
