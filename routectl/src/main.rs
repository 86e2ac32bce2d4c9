use exitcode::{self, ExitCode};

use std::path::Path;
use std::process;

use routectl_lib::config::{self, Config};
use routectl_lib::{DeleteOptions, Error, ErrorPolicy, RouteOps, RouteTable, logging};

mod cli;
mod output;

// Avoid musl's default allocator due to degraded performance
// https://nickb.dev/blog/default-musl-allocator-considered-harmful-to-performance
#[cfg(target_os = "linux")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn exit_code(err: &Error) -> ExitCode {
    match err.kind() {
        Error::DirectoryQueryFailed(_) | Error::RouteQueryFailed(_) => exitcode::OSERR,
        Error::InterfaceNotFound(_) | Error::RouteNotFound { .. } => exitcode::NOINPUT,
        Error::RouteAlreadyExists { .. } => exitcode::CANTCREAT,
        Error::RouteAddFailed { .. } | Error::RouteDeleteFailed { .. } => exitcode::OSERR,
        Error::InvalidOption { .. } => exitcode::USAGE,
        Error::BatchDelete { .. } => exitcode::SOFTWARE,
    }
}

fn report(err: Error) -> ExitCode {
    tracing::error!(error = %err, "command failed");
    eprintln!("Error: {err}");
    exit_code(&err)
}

async fn load_config(path: &Path) -> Result<Config, ExitCode> {
    match config::read(path).await {
        Ok(config) => Ok(config),
        Err(config::Error::NoFile) if path == Path::new(config::DEFAULT_PATH) => {
            tracing::debug!("no configuration file, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "error reading configuration");
            eprintln!("Error reading configuration {}: {e}", path.display());
            Err(exitcode::CONFIG)
        }
    }
}

fn delete_options(
    config: &Config,
    filters: Vec<routectl_lib::Filter>,
    matches: Vec<routectl_lib::DeleteOption>,
    profile: Option<String>,
    stop_on_error: bool,
) -> Result<DeleteOptions, ExitCode> {
    let mut options = match profile {
        Some(name) => config.profile(&name).map_err(|e| {
            eprintln!("Error: {e}");
            match e {
                config::Error::UnknownProfile(_) => exitcode::USAGE,
                _ => exitcode::CONFIG,
            }
        })?,
        None => DeleteOptions {
            on_error: config.default_on_error,
            ..Default::default()
        },
    };
    options.filters.extend(filters);
    options.extend(matches);
    if stop_on_error {
        options.on_error = ErrorPolicy::StopOnFirstError;
    }

    if options.filters.is_empty() {
        eprintln!(
            "at least one filter (--destination, --if-index, --if-alias, --metric, --match, --profile) must be provided for deletion"
        );
        return Err(exitcode::USAGE);
    }
    Ok(options)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), ExitCode> {
    let serialized = serde_json::to_string_pretty(value).map_err(|err| {
        tracing::error!(error = ?err, "failed to serialize output");
        exitcode::SOFTWARE
    })?;
    println!("{serialized}");
    Ok(())
}

async fn run<R: RouteOps>(table: RouteTable<R>, command: cli::Command, config: Config) -> Result<(), ExitCode> {
    match command {
        cli::Command::Get { filters, json } => {
            let routes = table.get_routes(&filters.filters()).await.map_err(report)?;
            if json {
                return print_json(&routes);
            }
            if routes.is_empty() {
                println!("No routes found matching the criteria.");
                return Ok(());
            }
            println!("{}", output::routes_table(&routes));
            Ok(())
        }
        cli::Command::Add {
            destination,
            next_hop,
            if_index,
            metric,
        } => {
            let metric = metric.unwrap_or(config.default_metric);
            table
                .add_route(destination, next_hop, if_index, metric)
                .await
                .map_err(report)
        }
        cli::Command::DeleteOne {
            destination,
            next_hop,
            if_index,
        } => table.delete_route(destination, next_hop, if_index).await.map_err(report),
        cli::Command::Delete {
            filters,
            matches,
            profile,
            stop_on_error,
        } => {
            let options = delete_options(&config, filters.filters(), matches, profile, stop_on_error)?;
            let batch = table.delete_routes(&options).await.map_err(|e| {
                eprintln!("A fatal error occurred during deletion:");
                report(e)
            })?;

            for failure in batch.failures.iter() {
                eprintln!("Error: {failure}");
            }
            match batch.failures.first() {
                None => Ok(()),
                Some(first) => {
                    eprintln!(
                        "{} of {} matching routes could not be deleted",
                        batch.failures.len(),
                        batch.matched
                    );
                    Err(exit_code(first))
                }
            }
        }
        cli::Command::Interfaces { identifier, json } => match identifier {
            Some(ident) => {
                let iface = table.find_interface(&ident).await.map_err(report)?;
                if json {
                    return print_json(&iface);
                }
                println!("{}", output::interfaces_table(std::iter::once(&iface)));
                Ok(())
            }
            None => {
                let directory = table.directory().await.map_err(report)?;
                if json {
                    let interfaces: Vec<_> = directory.iter().collect();
                    return print_json(&interfaces);
                }
                if directory.is_empty() {
                    println!("No interfaces found.");
                    return Ok(());
                }
                println!("{}", output::interfaces_table(directory.iter()));
                Ok(())
            }
        },
    }
}

#[cfg(target_os = "linux")]
async fn daemonless(args: cli::Cli) -> Result<(), ExitCode> {
    let config = load_config(&args.config_path).await?;
    let ops = routectl_lib::routing::NetlinkRouteOps::connect().map_err(|err| {
        tracing::error!(error = ?err, "unable to open netlink connection");
        eprintln!("Error opening netlink connection: {err}");
        exitcode::OSERR
    })?;
    run(RouteTable::new(ops), args.command, config).await
}

#[cfg(not(target_os = "linux"))]
async fn daemonless(_args: cli::Cli) -> Result<(), ExitCode> {
    eprintln!("routing table access is only supported on Linux");
    Err(exitcode::UNAVAILABLE)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = cli::parse();

    match &args.log_file {
        Some(path) => {
            if let Err(e) = logging::setup_log_file(path) {
                eprintln!("Error opening log file {}: {e}", path.display());
                process::exit(exitcode::CANTCREAT);
            }
        }
        None => logging::setup_stderr(),
    }
    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        "starting {}",
        env!("CARGO_PKG_NAME")
    );

    match daemonless(args).await {
        Ok(()) => (),
        Err(code) => process::exit(code),
    }
}
