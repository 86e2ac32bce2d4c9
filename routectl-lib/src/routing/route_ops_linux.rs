//! Linux route operations using rtnetlink.
//!
//! [`NetlinkRouteOps`] implements [`RouteOps`] by converting the domain types
//! into typed netlink messages via `rtnetlink::Handle`. Interface ids are the
//! kernel ifindex, which is allocated monotonically and not handed out again
//! within a boot.

use async_trait::async_trait;
use futures::TryStreamExt;
use ipnetwork::IpNetwork;
use rtnetlink::packet_route::AddressFamily;
use rtnetlink::packet_route::link::{LinkAttribute, LinkMessage};
use rtnetlink::packet_route::route::{
    RouteAddress, RouteAttribute, RouteMessage, RouteProtocol, RouteScope, RouteType,
};

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use super::OsError;
use super::interface::{Interface, InterfaceId};
use super::route::{RawRoute, RouteSpec};
use super::route_ops::RouteOps;

/// Production [`RouteOps`] for Linux backed by an `rtnetlink::Handle`.
#[derive(Clone)]
pub struct NetlinkRouteOps {
    handle: rtnetlink::Handle,
}

impl NetlinkRouteOps {
    /// Opens a netlink connection and spawns its driver task on the current
    /// tokio runtime. The task terminates once every handle is dropped.
    pub fn connect() -> Result<Self, OsError> {
        let (conn, handle, _) = rtnetlink::new_connection()?;
        tokio::task::spawn(conn);
        Ok(Self { handle })
    }

    fn link_message_to_interface(msg: &LinkMessage) -> Option<Interface> {
        let alias = msg.attributes.iter().find_map(|a| match a {
            LinkAttribute::IfName(n) => Some(n.clone()),
            _ => None,
        })?;
        let description = msg
            .attributes
            .iter()
            .find_map(|a| match a {
                LinkAttribute::IfAlias(d) => Some(d.clone()),
                _ => None,
            })
            .unwrap_or_default();

        Some(Interface {
            index: msg.header.index,
            id: InterfaceId(u64::from(msg.header.index)),
            alias,
            description,
        })
    }

    fn route_message_to_raw(msg: &RouteMessage) -> Option<RawRoute> {
        // multipath routes carry their interfaces in nested attributes and are not supported
        let if_index = msg.attributes.iter().find_map(|a| match a {
            RouteAttribute::Oif(idx) => Some(*idx),
            _ => None,
        })?;

        let unspecified = match msg.header.address_family {
            AddressFamily::Inet => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            AddressFamily::Inet6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            _ => return None,
        };

        let destination = msg
            .attributes
            .iter()
            .find_map(|a| match a {
                RouteAttribute::Destination(addr) => route_address(addr),
                _ => None,
            })
            .unwrap_or(unspecified);

        let next_hop = msg
            .attributes
            .iter()
            .find_map(|a| match a {
                RouteAttribute::Gateway(addr) => route_address(addr),
                _ => None,
            })
            .unwrap_or(unspecified);

        let metric = msg
            .attributes
            .iter()
            .find_map(|a| match a {
                RouteAttribute::Priority(p) => Some(*p),
                _ => None,
            })
            .unwrap_or(0);

        let table = msg
            .attributes
            .iter()
            .find_map(|a| match a {
                RouteAttribute::Table(id) => Some(*id),
                _ => None,
            })
            .unwrap_or(u32::from(msg.header.table));

        let destination = match IpNetwork::new(destination, msg.header.destination_prefix_length) {
            Ok(net) => net,
            Err(e) => {
                tracing::debug!(%e, "skipping route with invalid destination prefix");
                return None;
            }
        };

        Some(RawRoute {
            destination,
            next_hop,
            interface: InterfaceId(u64::from(if_index)),
            metric,
            protocol: u8::from(msg.header.protocol),
            origin: u8::from(msg.header.kind),
            table: Some(table),
        })
    }

    fn build_route_message(spec: &RouteSpec, metric: Option<u32>) -> Result<RouteMessage, OsError> {
        let if_index = u32::try_from(spec.interface.0)
            .map_err(|_| OsError::General(format!("interface id {} is not a kernel ifindex", spec.interface)))?;

        let mut msg = match (spec.destination, spec.next_hop) {
            (IpNetwork::V4(dest), IpAddr::V4(gw)) => {
                let mut builder = rtnetlink::RouteMessageBuilder::<Ipv4Addr>::default()
                    .destination_prefix(dest.ip(), dest.prefix())
                    .output_interface(if_index);
                if !gw.is_unspecified() {
                    builder = builder.gateway(gw);
                }
                if let Some(p) = metric {
                    builder = builder.priority(p);
                }
                if let Some(id) = spec.table {
                    builder = builder.table_id(id);
                }
                builder.build()
            }
            (IpNetwork::V6(dest), IpAddr::V6(gw)) => {
                let mut builder = rtnetlink::RouteMessageBuilder::<Ipv6Addr>::default()
                    .destination_prefix(dest.ip(), dest.prefix())
                    .output_interface(if_index);
                if !gw.is_unspecified() {
                    builder = builder.gateway(gw);
                }
                if let Some(p) = metric {
                    builder = builder.priority(p);
                }
                if let Some(id) = spec.table {
                    builder = builder.table_id(id);
                }
                builder.build()
            }
            (dest, gw) => {
                return Err(OsError::General(format!(
                    "address family of next hop {gw} does not match destination {dest}"
                )));
            }
        };

        // same defaults as `ip route add ... dev X` without a gateway
        if spec.next_hop.is_unspecified() {
            msg.header.scope = RouteScope::Link;
        }
        Ok(msg)
    }

    async fn dump_routes(&self, request: RouteMessage) -> Result<Vec<RawRoute>, OsError> {
        let routes: Vec<_> = self
            .handle
            .route()
            .get(request)
            .execute()
            .try_collect()
            .await
            .map_err(classify)?;
        Ok(routes.iter().filter_map(Self::route_message_to_raw).collect())
    }
}

fn route_address(addr: &RouteAddress) -> Option<IpAddr> {
    match addr {
        RouteAddress::Inet(ip) => Some(IpAddr::V4(*ip)),
        RouteAddress::Inet6(ip) => Some(IpAddr::V6(*ip)),
        _ => None,
    }
}

/// Maps kernel errno values onto the classified [`OsError`] variants.
fn classify(err: rtnetlink::Error) -> OsError {
    match err {
        rtnetlink::Error::NetlinkError(msg) => {
            let io = msg.to_io();
            match io.raw_os_error() {
                Some(libc::EEXIST) => OsError::AlreadyExists,
                Some(libc::ESRCH) | Some(libc::ENOENT) | Some(libc::ENODEV) => OsError::NotFound,
                _ => OsError::IO(io),
            }
        }
        other => OsError::General(other.to_string()),
    }
}

#[async_trait]
impl RouteOps for NetlinkRouteOps {
    async fn list_adapters(&self) -> Result<Vec<Interface>, OsError> {
        let links: Vec<_> = self
            .handle
            .link()
            .get()
            .execute()
            .try_collect()
            .await
            .map_err(classify)?;

        Ok(links.iter().filter_map(Self::link_message_to_interface).collect())
    }

    async fn list_routes(&self) -> Result<Vec<RawRoute>, OsError> {
        let mut routes = self
            .dump_routes(rtnetlink::RouteMessageBuilder::<Ipv4Addr>::default().build())
            .await?;
        routes.extend(
            self.dump_routes(rtnetlink::RouteMessageBuilder::<Ipv6Addr>::default().build())
                .await?,
        );
        Ok(routes)
    }

    async fn interface_id(&self, index: u32) -> Result<InterfaceId, OsError> {
        let link = self
            .handle
            .link()
            .get()
            .match_index(index)
            .execute()
            .try_next()
            .await
            .map_err(classify)?;

        link.map(|l| InterfaceId(u64::from(l.header.index)))
            .ok_or(OsError::NotFound)
    }

    async fn route_add(&self, route: &RouteSpec, metric: u32) -> Result<(), OsError> {
        let msg = Self::build_route_message(route, Some(metric))?;
        self.handle.route().add(msg).execute().await.map_err(classify)
    }

    async fn route_del(&self, route: &RouteSpec) -> Result<(), OsError> {
        let mut msg = Self::build_route_message(route, route.metric)?;
        // match like `ip route del`: any protocol, scope and type
        msg.header.protocol = RouteProtocol::Unspec;
        msg.header.scope = RouteScope::NoWhere;
        msg.header.kind = RouteType::Unspec;
        self.handle.route().del(msg).execute().await.map_err(classify)
    }
}
