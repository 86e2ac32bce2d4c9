use serde::{Deserialize, Serialize};

use std::collections::HashMap;

use crate::config;
use crate::routing::ErrorPolicy;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub version: u8,
    pub(super) defaults: Option<Defaults>,
    pub(super) profiles: Option<HashMap<String, Vec<String>>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(super) struct Defaults {
    metric: Option<u32>,
    stop_on_error: Option<bool>,
}

pub fn wrong_keys(table: &toml::Table) -> Vec<String> {
    let mut wrong_keys = Vec::new();
    for (key, value) in table.iter() {
        // version plain key
        if key == "version" {
            continue;
        }
        // defaults simple struct
        if key == "defaults" {
            if let Some(defaults) = value.as_table() {
                for (k, _v) in defaults.iter() {
                    if k == "metric" || k == "stop_on_error" {
                        continue;
                    }
                    wrong_keys.push(format!("defaults.{k}"));
                }
            }
            continue;
        }
        // profiles are free form names
        if key == "profiles" {
            continue;
        }
        wrong_keys.push(key.clone());
    }
    wrong_keys
}

impl From<Config> for config::Config {
    fn from(value: Config) -> Self {
        let defaults = value.defaults.unwrap_or(Defaults {
            metric: None,
            stop_on_error: None,
        });
        let default_on_error = match defaults.stop_on_error {
            Some(true) => ErrorPolicy::StopOnFirstError,
            _ => ErrorPolicy::ContinueCollectingErrors,
        };
        config::Config {
            default_metric: defaults.metric.unwrap_or(0),
            default_on_error,
            profiles: value.profiles.unwrap_or_default(),
        }
    }
}
