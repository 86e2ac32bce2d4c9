use routectl_lib::{Interface, InterfaceId, Route};
use std::sync::Arc;

/// Creates a test interface whose id mirrors its index
pub fn create_test_interface(index: u32, alias: &str) -> Arc<Interface> {
    Arc::new(Interface {
        index,
        id: InterfaceId(u64::from(index)),
        alias: alias.to_string(),
        description: format!("{alias} test adapter"),
    })
}

/// Creates a test route on the given interface
pub fn create_test_route(destination: &str, next_hop: &str, interface: Arc<Interface>, metric: u32) -> Route {
    Route {
        destination: destination.parse().expect("valid prefix"),
        next_hop: next_hop.parse().expect("valid address"),
        interface,
        metric,
        protocol: 3,
        origin: 1,
        table: Some(254),
    }
}
