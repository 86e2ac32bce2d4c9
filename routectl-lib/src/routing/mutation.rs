//! Single route add/delete and filter driven batch delete.

use ipnetwork::IpNetwork;

use std::net::IpAddr;

use super::options::{BatchReport, DeleteOptions, ErrorPolicy};
use super::route::RouteSpec;
use super::route_ops::RouteOps;
use super::table::RouteTable;
use super::{Error, OsError};

impl<R: RouteOps> RouteTable<R> {
    /// Adds a route through the interface currently holding `if_index`.
    ///
    /// The route lives in the kernel table only and does not survive a reboot.
    pub async fn add_route(
        &self,
        destination: IpNetwork,
        next_hop: IpAddr,
        if_index: u32,
        metric: u32,
    ) -> Result<(), Error> {
        let spec = self.resolve_spec(destination, next_hop, if_index).await?;
        self.ops.route_add(&spec, metric).await.map_err(|e| match e {
            OsError::AlreadyExists => Error::RouteAlreadyExists { destination, next_hop },
            source => Error::RouteAddFailed { destination, source },
        })?;
        tracing::info!(%destination, %next_hop, if_index, metric, "route added");
        Ok(())
    }

    /// Deletes the route matching destination, next hop and interface exactly.
    pub async fn delete_route(&self, destination: IpNetwork, next_hop: IpAddr, if_index: u32) -> Result<(), Error> {
        let spec = self.resolve_spec(destination, next_hop, if_index).await?;
        self.delete_spec(&spec).await?;
        tracing::info!(%destination, %next_hop, if_index, "route deleted");
        Ok(())
    }

    /// Deletes every route matching all of `options.filters`.
    ///
    /// A listing failure is fatal and nothing is deleted. Per-route failures
    /// are collected into the report, or returned as the fatal error under
    /// [`ErrorPolicy::StopOnFirstError`]. There is no rollback: routes deleted
    /// before an abort stay deleted.
    ///
    /// An empty filter set matches every route; callers must guard against it.
    pub async fn delete_routes(&self, options: &DeleteOptions) -> Result<BatchReport, Error> {
        let routes = self.get_routes(&options.filters).await?;

        let mut report = BatchReport {
            matched: routes.len(),
            ..Default::default()
        };
        if routes.is_empty() {
            tracing::debug!("no routes matched for deletion");
            return Ok(report);
        }

        for route in routes {
            match self.delete_spec(&route.spec()).await {
                Ok(()) => {
                    tracing::debug!(destination = %route.destination, next_hop = %route.next_hop, iface = %route.interface.alias, "route deleted");
                    report.deleted += 1;
                }
                Err(e) => {
                    let wrapped = Error::BatchDelete {
                        destination: route.destination,
                        alias: route.interface.alias.clone(),
                        source: Box::new(e),
                    };
                    if options.on_error == ErrorPolicy::StopOnFirstError {
                        tracing::error!(error = %wrapped, deleted = report.deleted, "aborting batch delete");
                        return Err(wrapped);
                    }
                    tracing::warn!(error = %wrapped, "failed to delete route, continuing anyway");
                    report.failures.push(wrapped);
                }
            }
        }

        tracing::info!(
            matched = report.matched,
            deleted = report.deleted,
            failed = report.failures.len(),
            "batch delete finished"
        );
        Ok(report)
    }

    async fn resolve_spec(&self, destination: IpNetwork, next_hop: IpAddr, if_index: u32) -> Result<RouteSpec, Error> {
        let interface = self.ops.interface_id(if_index).await.map_err(|e| match e {
            OsError::NotFound => Error::InterfaceNotFound(if_index.to_string()),
            source => Error::DirectoryQueryFailed(source),
        })?;
        Ok(RouteSpec {
            interface,
            destination,
            next_hop,
            metric: None,
            table: None,
        })
    }

    async fn delete_spec(&self, spec: &RouteSpec) -> Result<(), Error> {
        self.ops.route_del(spec).await.map_err(|e| match e {
            OsError::NotFound => Error::RouteNotFound {
                destination: spec.destination,
                next_hop: spec.next_hop,
            },
            source => Error::RouteDeleteFailed {
                destination: spec.destination,
                source,
            },
        })
    }
}
