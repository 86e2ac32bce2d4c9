//! Aggregated view of the host routing table.
//!
//! Raw rows from the kernel are joined with interface metadata
//! ([`Directory`]) into [`Route`] records, filtered with [`Filter`]s and
//! mutated through [`RouteTable`]. All OS access goes through the
//! [`RouteOps`] trait so the engine can run against a stateful mock in tests.

use ipnetwork::IpNetwork;
use thiserror::Error;

mod filter;
mod interface;
mod mutation;
mod options;
mod route;
mod route_ops;
mod table;

#[cfg(target_os = "linux")]
mod route_ops_linux;

#[cfg(test)]
pub(crate) mod mocks;

pub use filter::{Filter, matches_all};
pub use interface::{Directory, Interface, InterfaceId};
pub use options::{BatchReport, DeleteOption, DeleteOptions, ErrorPolicy};
pub use route::{RawRoute, Route, RouteSpec};
pub use route_ops::RouteOps;
pub use table::RouteTable;

#[cfg(target_os = "linux")]
pub use route_ops_linux::NetlinkRouteOps;

/// Errors reported by a [`RouteOps`] backend, classified so the engine can
/// tell "already exists" and "not found" apart from everything else.
#[derive(Debug, Error)]
pub enum OsError {
    #[error("object already exists")]
    AlreadyExists,
    #[error("object not found")]
    NotFound,
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("{0}")]
    General(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to query network adapters: {0}")]
    DirectoryQueryFailed(#[source] OsError),
    #[error("failed to query routing table: {0}")]
    RouteQueryFailed(#[source] OsError),
    #[error("interface '{0}' not found")]
    InterfaceNotFound(String),
    #[error("route to {destination} via {next_hop} already exists")]
    RouteAlreadyExists {
        destination: IpNetwork,
        next_hop: std::net::IpAddr,
    },
    #[error("failed to create route to {destination}: {source}")]
    RouteAddFailed {
        destination: IpNetwork,
        #[source]
        source: OsError,
    },
    #[error("route to {destination} via {next_hop} not found")]
    RouteNotFound {
        destination: IpNetwork,
        next_hop: std::net::IpAddr,
    },
    #[error("failed to delete route to {destination}: {source}")]
    RouteDeleteFailed {
        destination: IpNetwork,
        #[source]
        source: OsError,
    },
    #[error("invalid option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },
    #[error("failed to delete route (dest: {destination}, iface: {alias}): {source}")]
    BatchDelete {
        destination: IpNetwork,
        alias: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Innermost classified error, looking through [`Error::BatchDelete`] wrapping.
    pub fn kind(&self) -> &Error {
        match self {
            Error::BatchDelete { source, .. } => source.kind(),
            other => other,
        }
    }
}
