pub mod config;
pub mod logging;
pub mod routing;

pub use routing::{
    BatchReport, DeleteOption, DeleteOptions, Directory, Error, ErrorPolicy, Filter, Interface, InterfaceId, Route,
    RouteOps, RouteTable,
};
