use ipnetwork::IpNetwork;
use serde::Serialize;

use std::net::IpAddr;
use std::sync::Arc;

use super::interface::{Interface, InterfaceId};

/// Routing table row as reported by the OS, before it is joined with
/// interface metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRoute {
    pub destination: IpNetwork,
    /// Unspecified address for on-link routes.
    pub next_hop: IpAddr,
    pub interface: InterfaceId,
    pub metric: u32,
    pub protocol: u8,
    pub origin: u8,
    pub table: Option<u32>,
}

/// Routing table entry joined with the interface that owns it.
///
/// `interface` is shared with the [`Directory`](super::Directory) of the
/// query that produced the route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub destination: IpNetwork,
    pub next_hop: IpAddr,
    pub interface: Arc<Interface>,
    /// Lower is more preferred.
    pub metric: u32,
    /// Opaque tags copied verbatim from the OS record.
    pub protocol: u8,
    pub origin: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<u32>,
}

impl Route {
    pub(crate) fn enrich(raw: RawRoute, interface: Arc<Interface>) -> Self {
        Route {
            destination: raw.destination,
            next_hop: raw.next_hop,
            interface,
            metric: raw.metric,
            protocol: raw.protocol,
            origin: raw.origin,
            table: raw.table,
        }
    }

    /// Key addressing exactly this row for a delete.
    pub fn spec(&self) -> RouteSpec {
        RouteSpec {
            interface: self.interface.id,
            destination: self.destination,
            next_hop: self.next_hop,
            metric: Some(self.metric),
            table: self.table,
        }
    }

    pub fn is_on_link(&self) -> bool {
        self.next_hop.is_unspecified()
    }
}

/// Route key decoupled from the backend wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSpec {
    pub interface: InterfaceId,
    pub destination: IpNetwork,
    pub next_hop: IpAddr,
    /// Pins a delete to the row with this metric. The same destination, next
    /// hop and interface can be present at several metrics.
    pub metric: Option<u32>,
    /// `None` addresses the backend's default table.
    pub table: Option<u32>,
}
