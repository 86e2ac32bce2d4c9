mod common;

use routectl_lib::routing::matches_all;
use routectl_lib::{DeleteOptions, Directory, Error, ErrorPolicy, Filter};

use common::{create_test_interface, create_test_route};

#[test]
fn parsed_options_select_the_expected_routes() -> anyhow::Result<()> {
    let eth = create_test_interface(2, "Ethernet");
    let wg = create_test_interface(5, "wg0");
    let routes = vec![
        create_test_route("0.0.0.0/0", "192.168.1.1", eth.clone(), 100),
        create_test_route("10.128.0.0/9", "0.0.0.0", wg.clone(), 0),
        create_test_route("10.0.0.0/8", "192.168.1.1", eth.clone(), 100),
        create_test_route("fd00::/8", "::", wg.clone(), 0),
    ];

    let options = DeleteOptions::parse(["if-alias=WG0", "metric=0", "on-error=stop"])?;
    assert_eq!(options.on_error, ErrorPolicy::StopOnFirstError);

    let selected: Vec<String> = routes
        .iter()
        .filter(|r| matches_all(&options.filters, r))
        .map(|r| r.destination.to_string())
        .collect();
    assert_eq!(selected, vec!["10.128.0.0/9", "fd00::/8"]);
    Ok(())
}

#[test]
fn destination_filter_is_not_a_containment_test() -> anyhow::Result<()> {
    let eth = create_test_interface(2, "Ethernet");
    let route = create_test_route("10.1.0.0/16", "192.168.1.1", eth, 0);

    assert!(!Filter::DestinationPrefix("10.0.0.0/8".parse()?).matches(&route));
    assert!(Filter::DestinationPrefix("10.1.0.0/16".parse()?).matches(&route));
    Ok(())
}

#[test]
fn unknown_option_is_rejected() {
    let res = DeleteOptions::parse(["if-index=2", "--force"]);
    assert!(matches!(res, Err(Error::InvalidOption { option, .. }) if option == "--force"));
}

#[test]
fn directory_resolves_identifiers() -> anyhow::Result<()> {
    let directory = Directory::from_interfaces(vec![
        (*create_test_interface(1, "lo")).clone(),
        (*create_test_interface(12, "Wi-Fi")).clone(),
    ]);

    assert_eq!(directory.find_interface("12")?.alias, "Wi-Fi");
    assert_eq!(directory.find_interface("wi-fi")?.index, 12);
    assert!(matches!(directory.find_interface("3"), Err(Error::InterfaceNotFound(_))));
    Ok(())
}

#[test]
fn routes_serialize_with_interface_metadata() -> anyhow::Result<()> {
    let wg = create_test_interface(5, "wg0");
    let route = create_test_route("10.128.0.0/9", "0.0.0.0", wg, 0);

    let json = serde_json::to_value(&route)?;
    assert_eq!(json["destination"], "10.128.0.0/9");
    assert_eq!(json["next_hop"], "0.0.0.0");
    assert_eq!(json["interface"]["alias"], "wg0");
    assert_eq!(json["interface"]["index"], 5);
    assert_eq!(json["table"], 254);
    Ok(())
}
