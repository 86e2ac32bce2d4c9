use comfy_table::Table;

use std::sync::Arc;

use routectl_lib::{Interface, Route};

fn plain_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::NOTHING);
    table.set_header(header);
    table
}

pub fn routes_table(routes: &[Route]) -> Table {
    let mut table = plain_table(vec!["DESTINATION", "NEXT_HOP", "METRIC", "IFACE_INDEX", "IFACE_ALIAS"]);
    for r in routes {
        table.add_row(vec![
            r.destination.to_string(),
            r.next_hop.to_string(),
            r.metric.to_string(),
            r.interface.index.to_string(),
            r.interface.alias.clone(),
        ]);
    }
    table
}

pub fn interfaces_table<'a>(interfaces: impl Iterator<Item = &'a Arc<Interface>>) -> Table {
    let mut table = plain_table(vec!["INDEX", "ID", "ALIAS", "DESCRIPTION"]);
    for i in interfaces {
        table.add_row(vec![
            i.index.to_string(),
            i.id.to_string(),
            i.alias.clone(),
            i.description.clone(),
        ]);
    }
    table
}
