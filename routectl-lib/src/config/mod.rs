use thiserror::Error;

use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

use crate::routing::{self, DeleteOption, DeleteOptions, ErrorPolicy};

mod v1;

pub const DEFAULT_PATH: &str = "/etc/routectl/config.toml";
pub const ENV_VAR: &str = "ROUTECTL_CONFIG_PATH";

#[derive(Debug, Default, PartialEq)]
pub struct Config {
    /// Metric used by `add` when none is given.
    pub default_metric: u32,
    /// Error policy a batch delete starts from before options are applied.
    pub default_on_error: ErrorPolicy,
    /// Named batch delete option sets, kept as text until used.
    pub profiles: HashMap<String, Vec<String>>,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration file not found")]
    NoFile,
    #[error("Unable to determine configuration version")]
    VersionNotFound,
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Deserialization error: {0}")]
    TomlDeserialization(#[from] toml::de::Error),
    #[error("Unsupported config version: {0}")]
    VersionMismatch(i64),
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),
    #[error("Invalid profile '{name}': {source}")]
    InvalidProfile {
        name: String,
        #[source]
        source: routing::Error,
    },
}

impl Config {
    /// Builds the batch delete options of a named profile on top of the
    /// configured default error policy.
    pub fn profile(&self, name: &str) -> Result<DeleteOptions, Error> {
        let entries = self
            .profiles
            .get(name)
            .ok_or_else(|| Error::UnknownProfile(name.to_string()))?;
        let mut options = DeleteOptions {
            on_error: self.default_on_error,
            ..Default::default()
        };
        // an explicit on-error entry in the profile wins over the default
        for entry in entries {
            let option = entry.parse::<DeleteOption>().map_err(|source| Error::InvalidProfile {
                name: name.to_string(),
                source,
            })?;
            options.push(option);
        }
        Ok(options)
    }
}

pub async fn read(path: &Path) -> Result<Config, Error> {
    let content = fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NoFile
        } else {
            Error::IO(e)
        }
    })?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<Config, Error> {
    let table = content.parse::<toml::Table>()?;
    let version = table
        .get("version")
        .and_then(|v| v.as_integer())
        .ok_or(Error::VersionNotFound)?;

    match version {
        1 => {
            let res = toml::from_str::<v1::Config>(content)?;
            let wrong_keys = v1::wrong_keys(&table);
            for key in wrong_keys.iter() {
                tracing::warn!(%key, "ignoring unsupported key in configuration file");
            }
            Ok(res.into())
        }
        _ => Err(Error::VersionMismatch(version)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Filter;

    #[tokio::test]
    async fn missing_file_is_reported_as_no_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let res = read(&dir.path().join("missing.toml")).await;
        assert!(matches!(res, Err(Error::NoFile)));
    }

    #[tokio::test]
    async fn reads_config_from_disk() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "version = 1\n[defaults]\nmetric = 5\n")?;

        let config = read(&path).await?;
        assert_eq!(config.default_metric, 5);
        Ok(())
    }

    #[test]
    fn version_is_required() {
        assert!(matches!(parse("[defaults]\nmetric = 1\n"), Err(Error::VersionNotFound)));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        assert!(matches!(parse("version = 7\n"), Err(Error::VersionMismatch(7))));
    }

    #[test]
    fn profile_inherits_default_policy() -> anyhow::Result<()> {
        let config = parse(
            r#####"
version = 1
[defaults]
stop_on_error = true

[profiles]
vpn = ["if-alias=wg0", "destination=10.128.0.0/9"]
"#####,
        )?;

        let options = config.profile("vpn")?;
        assert_eq!(options.on_error, ErrorPolicy::StopOnFirstError);
        assert_eq!(
            options.filters,
            vec![
                Filter::InterfaceAlias("wg0".into()),
                Filter::DestinationPrefix("10.128.0.0/9".parse()?),
            ]
        );
        Ok(())
    }

    #[test]
    fn profile_policy_overrides_default() -> anyhow::Result<()> {
        let config = parse(
            r#####"
version = 1
[defaults]
stop_on_error = true

[profiles]
lenient = ["metric=100", "on-error=continue"]
"#####,
        )?;

        let options = config.profile("lenient")?;
        assert_eq!(options.on_error, ErrorPolicy::ContinueCollectingErrors);
        Ok(())
    }

    #[test]
    fn bad_profile_entry_is_invalid_option() -> anyhow::Result<()> {
        let config = parse(
            r#####"
version = 1
[profiles]
broken = ["if-alias=wg0", "gateway=10.0.0.1"]
"#####,
        )?;

        let res = config.profile("broken");
        assert!(matches!(
            res,
            Err(Error::InvalidProfile { source: routing::Error::InvalidOption { .. }, .. })
        ));
        assert!(matches!(config.profile("nope"), Err(Error::UnknownProfile(_))));
        Ok(())
    }
}
