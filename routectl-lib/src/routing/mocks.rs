//! Stateful mock for the routing trait abstraction.
//!
//! The mock tracks actual state (adapters and routes that exist) rather than
//! just verifying call sequences. This lets tests assert on the routing
//! table's _state_ after an operation, not just which calls happened.
//!
//! Uses `Arc<Mutex<_>>` for interior mutability in async contexts.

#![cfg(test)]

use async_trait::async_trait;
use ipnetwork::IpNetwork;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::OsError;
use super::interface::{Interface, InterfaceId};
use super::route::{RawRoute, RouteSpec};
use super::route_ops::RouteOps;

/// Adapter whose id mirrors its index.
pub fn iface(index: u32, alias: &str) -> Interface {
    Interface {
        index,
        id: InterfaceId(u64::from(index)),
        alias: alias.to_string(),
        description: format!("{alias} adapter"),
    }
}

pub fn raw_route(destination: &str, next_hop: &str, if_index: u32, metric: u32) -> RawRoute {
    RawRoute {
        destination: destination.parse().unwrap(),
        next_hop: next_hop.parse().unwrap(),
        interface: InterfaceId(u64::from(if_index)),
        metric,
        protocol: 4,
        origin: 1,
        table: None,
    }
}

#[derive(Debug, Default)]
pub struct RouteOpsState {
    pub adapters: Vec<Interface>,
    pub routes: Vec<RawRoute>,
    /// Map of operation name -> error message. If set, the operation will fail.
    pub fail_on: HashMap<String, String>,
    /// Destinations whose deletion fails with a generic error.
    pub fail_delete: Vec<IpNetwork>,
    /// Destinations removed by "someone else" right before our delete arrives.
    pub vanish: Vec<IpNetwork>,
    /// Map of operation name -> number of invocations.
    pub calls: HashMap<String, usize>,
}

impl RouteOpsState {
    fn check_fail(&mut self, op: &str) -> Result<(), OsError> {
        *self.calls.entry(op.to_string()).or_default() += 1;
        if let Some(msg) = self.fail_on.get(op) {
            Err(OsError::General(msg.clone()))
        } else {
            Ok(())
        }
    }
}

fn same_route(r: &RawRoute, spec: &RouteSpec) -> bool {
    r.destination == spec.destination
        && r.next_hop == spec.next_hop
        && r.interface == spec.interface
        && spec.metric.is_none_or(|m| r.metric == m)
        && (spec.table.is_none() || r.table == spec.table)
}

#[derive(Clone)]
pub struct MockRouteOps {
    pub state: Arc<Mutex<RouteOpsState>>,
}

impl MockRouteOps {
    pub fn with_state(state: RouteOpsState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn fail(&self, op: &str, msg: &str) {
        self.state.lock().unwrap().fail_on.insert(op.into(), msg.into());
    }

    pub fn fail_delete_of(&self, destination: IpNetwork) {
        self.state.lock().unwrap().fail_delete.push(destination);
    }

    pub fn vanish_on_delete(&self, destination: IpNetwork) {
        self.state.lock().unwrap().vanish.push(destination);
    }

    pub fn calls(&self, op: &str) -> usize {
        self.state.lock().unwrap().calls.get(op).copied().unwrap_or(0)
    }
}

#[async_trait]
impl RouteOps for MockRouteOps {
    async fn list_adapters(&self) -> Result<Vec<Interface>, OsError> {
        let mut s = self.state.lock().unwrap();
        s.check_fail("list_adapters")?;
        Ok(s.adapters.clone())
    }

    async fn list_routes(&self) -> Result<Vec<RawRoute>, OsError> {
        let mut s = self.state.lock().unwrap();
        s.check_fail("list_routes")?;
        Ok(s.routes.clone())
    }

    async fn interface_id(&self, index: u32) -> Result<InterfaceId, OsError> {
        let mut s = self.state.lock().unwrap();
        s.check_fail("interface_id")?;
        s.adapters
            .iter()
            .find(|i| i.index == index)
            .map(|i| i.id)
            .ok_or(OsError::NotFound)
    }

    async fn route_add(&self, route: &RouteSpec, metric: u32) -> Result<(), OsError> {
        let mut s = self.state.lock().unwrap();
        s.check_fail("route_add")?;

        if s.routes.iter().any(|r| same_route(r, route)) {
            return Err(OsError::AlreadyExists);
        }
        s.routes.push(RawRoute {
            destination: route.destination,
            next_hop: route.next_hop,
            interface: route.interface,
            metric,
            protocol: 4,
            origin: 1,
            table: route.table,
        });
        Ok(())
    }

    async fn route_del(&self, route: &RouteSpec) -> Result<(), OsError> {
        let mut s = self.state.lock().unwrap();
        s.check_fail("route_del")?;

        if s.fail_delete.contains(&route.destination) {
            return Err(OsError::General(format!("simulated delete failure: {}", route.destination)));
        }
        if s.vanish.contains(&route.destination) {
            s.routes.retain(|r| r.destination != route.destination);
        }

        let position = s.routes.iter().position(|r| same_route(r, route)).ok_or(OsError::NotFound)?;
        s.routes.remove(position);
        Ok(())
    }
}
