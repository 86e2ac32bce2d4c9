use clap::{Args, Parser, Subcommand};
use ipnetwork::IpNetwork;

use std::net::IpAddr;
use std::path::PathBuf;

use routectl_lib::{DeleteOption, Filter, config, logging};

/// routectl - inspect, add and remove routes of the host routing table
#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// General configuration file
    #[arg(
        short,
        long,
        global = true,
        env = config::ENV_VAR,
        default_value = config::DEFAULT_PATH
    )]
    pub config_path: PathBuf,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, env = logging::ENV_VAR_LOG_FILE)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Get and filter routes
    #[command()]
    Get {
        #[command(flatten)]
        filters: FilterArgs,
        /// Format output as json
        #[arg(long)]
        json: bool,
    },

    /// Add a new, non-persistent route
    #[command()]
    Add {
        /// Destination prefix for the new route (e.g. 10.0.0.0/8)
        #[arg(short, long)]
        destination: IpNetwork,
        /// Next hop address for the new route (e.g. 192.168.1.1), unspecified for on-link
        #[arg(short, long)]
        next_hop: IpAddr,
        /// Interface index for the new route
        #[arg(short, long)]
        if_index: u32,
        /// Metric for the new route (lower is more preferred)
        #[arg(short, long)]
        metric: Option<u32>,
    },

    /// Delete a single route by exact destination, next hop and interface index
    #[command()]
    DeleteOne {
        /// Destination prefix of the route to delete (e.g. 10.0.0.0/8)
        #[arg(short, long)]
        destination: IpNetwork,
        /// Next hop address of the route to delete (e.g. 192.168.1.1)
        #[arg(short, long)]
        next_hop: IpAddr,
        /// Interface index of the route to delete
        #[arg(short, long)]
        if_index: u32,
    },

    /// Delete every route matching the given filters
    #[command()]
    Delete {
        #[command(flatten)]
        filters: FilterArgs,
        /// Additional option in key=value form (destination, if-index, if-alias, metric, on-error)
        #[arg(long = "match", value_name = "KEY=VALUE")]
        matches: Vec<DeleteOption>,
        /// Named option set from the configuration file
        #[arg(short, long)]
        profile: Option<String>,
        /// Stop the operation on the first error
        #[arg(long)]
        stop_on_error: bool,
    },

    /// List network interfaces or resolve one by index or alias
    #[command()]
    Interfaces {
        /// Interface index or alias (case-insensitive)
        identifier: Option<String>,
        /// Format output as json
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Filter by destination prefix (e.g. 192.168.1.0/24)
    #[arg(short, long)]
    pub destination: Option<IpNetwork>,
    /// Filter by interface index
    #[arg(short, long)]
    pub if_index: Option<u32>,
    /// Filter by interface alias (case-insensitive)
    #[arg(short = 'a', long)]
    pub if_alias: Option<String>,
    /// Filter by route metric
    #[arg(short, long)]
    pub metric: Option<u32>,
}

impl FilterArgs {
    pub fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(prefix) = self.destination {
            filters.push(Filter::DestinationPrefix(prefix));
        }
        if let Some(index) = self.if_index {
            filters.push(Filter::InterfaceIndex(index));
        }
        if let Some(alias) = &self.if_alias {
            filters.push(Filter::InterfaceAlias(alias.clone()));
        }
        if let Some(metric) = self.metric {
            filters.push(Filter::Metric(metric));
        }
        filters
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
