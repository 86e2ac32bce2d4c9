use ipnetwork::IpNetwork;
use serde::Serialize;

use std::fmt::{self, Display};

use super::route::Route;

/// Predicate over an enriched [`Route`].
///
/// Filters compose with logical AND only, see [`matches_all`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    /// Exact prefix match (address and length), not a containment test.
    DestinationPrefix(IpNetwork),
    InterfaceIndex(u32),
    /// Case-insensitive.
    InterfaceAlias(String),
    Metric(u32),
}

impl Filter {
    pub fn matches(&self, route: &Route) -> bool {
        match self {
            Filter::DestinationPrefix(prefix) => route.destination == *prefix,
            Filter::InterfaceIndex(index) => route.interface.index == *index,
            Filter::InterfaceAlias(alias) => route.interface.alias.to_lowercase() == alias.to_lowercase(),
            Filter::Metric(metric) => route.metric == *metric,
        }
    }
}

/// True if `route` satisfies every filter. An empty set matches everything.
pub fn matches_all(filters: &[Filter], route: &Route) -> bool {
    filters.iter().all(|f| f.matches(route))
}

impl Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::DestinationPrefix(prefix) => write!(f, "destination={prefix}"),
            Filter::InterfaceIndex(index) => write!(f, "if-index={index}"),
            Filter::InterfaceAlias(alias) => write!(f, "if-alias={alias}"),
            Filter::Metric(metric) => write!(f, "metric={metric}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::mocks::{iface, raw_route};
    use rstest::rstest;
    use std::sync::Arc;

    fn route() -> Route {
        let raw = raw_route("10.1.0.0/16", "192.168.1.1", 3, 25);
        Route::enrich(raw, Arc::new(iface(3, "Ethernet")))
    }

    #[rstest]
    #[case(Filter::DestinationPrefix("10.1.0.0/16".parse().unwrap()), true)]
    #[case(Filter::DestinationPrefix("10.0.0.0/8".parse().unwrap()), false)]
    #[case(Filter::DestinationPrefix("10.1.0.0/24".parse().unwrap()), false)]
    #[case(Filter::InterfaceIndex(3), true)]
    #[case(Filter::InterfaceIndex(4), false)]
    #[case(Filter::InterfaceAlias("ethernet".into()), true)]
    #[case(Filter::InterfaceAlias("ETHERNET".into()), true)]
    #[case(Filter::InterfaceAlias("Ethernet 2".into()), false)]
    #[case(Filter::Metric(25), true)]
    #[case(Filter::Metric(0), false)]
    fn single_filter_matches(#[case] filter: Filter, #[case] expected: bool) {
        assert_eq!(filter.matches(&route()), expected);
    }

    #[test]
    fn empty_filter_set_matches_everything() {
        assert!(matches_all(&[], &route()));
    }

    #[test]
    fn filters_compose_with_and() {
        let r = route();
        let both = [Filter::InterfaceIndex(3), Filter::Metric(25)];
        assert!(matches_all(&both, &r));

        let one_off = [Filter::InterfaceIndex(3), Filter::Metric(26)];
        assert!(!matches_all(&one_off, &r));
    }

    #[test]
    fn display_renders_option_syntax() {
        let filter = Filter::DestinationPrefix("fd00::/64".parse().unwrap());
        assert_eq!(filter.to_string(), "destination=fd00::/64");
        assert_eq!(Filter::InterfaceAlias("wg0".into()).to_string(), "if-alias=wg0");
    }
}
