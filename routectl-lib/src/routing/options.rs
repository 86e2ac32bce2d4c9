use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use std::fmt::{self, Display};
use std::str::FromStr;

use super::Error;
use super::filter::Filter;

/// Behavior of a batch delete when a single route fails to delete.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Keep going and report every failure at the end.
    #[default]
    #[serde(alias = "continue")]
    ContinueCollectingErrors,
    /// Abort on the first failure. Routes deleted so far stay deleted.
    #[serde(alias = "stop")]
    StopOnFirstError,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "continue" | "continue-collecting-errors" => Ok(ErrorPolicy::ContinueCollectingErrors),
            "stop" | "stop-on-first-error" => Ok(ErrorPolicy::StopOnFirstError),
            other => Err(format!("unknown error policy '{other}', expected 'continue' or 'stop'")),
        }
    }
}

impl Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::ContinueCollectingErrors => write!(f, "continue"),
            ErrorPolicy::StopOnFirstError => write!(f, "stop"),
        }
    }
}

/// One textual batch delete option in `key=value` form.
///
/// Recognized keys: `destination`, `if-index`, `if-alias`, `metric` and
/// `on-error`. Underscores are accepted in place of dashes.
#[derive(Clone, Debug, PartialEq)]
pub enum DeleteOption {
    Filter(Filter),
    OnError(ErrorPolicy),
}

impl FromStr for DeleteOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| Error::invalid_option(s, "expected key=value"))?;
        let value = value.trim();
        let invalid = |reason: String| Error::invalid_option(s, reason);

        match key.trim().replace('_', "-").to_lowercase().as_str() {
            "destination" | "dest" => value
                .parse::<IpNetwork>()
                .map(|p| DeleteOption::Filter(Filter::DestinationPrefix(p)))
                .map_err(|e| invalid(format!("invalid destination prefix: {e}"))),
            "if-index" => value
                .parse::<u32>()
                .map(|i| DeleteOption::Filter(Filter::InterfaceIndex(i)))
                .map_err(|e| invalid(format!("invalid interface index: {e}"))),
            "if-alias" if value.is_empty() => Err(invalid("empty interface alias".to_string())),
            "if-alias" => Ok(DeleteOption::Filter(Filter::InterfaceAlias(value.to_string()))),
            "metric" => value
                .parse::<u32>()
                .map(|m| DeleteOption::Filter(Filter::Metric(m)))
                .map_err(|e| invalid(format!("invalid metric: {e}"))),
            "on-error" => value.parse::<ErrorPolicy>().map(DeleteOption::OnError).map_err(invalid),
            other => Err(invalid(format!("unsupported option '{other}'"))),
        }
    }
}

impl From<Filter> for DeleteOption {
    fn from(filter: Filter) -> Self {
        DeleteOption::Filter(filter)
    }
}

impl From<ErrorPolicy> for DeleteOption {
    fn from(policy: ErrorPolicy) -> Self {
        DeleteOption::OnError(policy)
    }
}

/// Typed configuration of a batch delete.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeleteOptions {
    pub filters: Vec<Filter>,
    pub on_error: ErrorPolicy,
}

impl DeleteOptions {
    pub fn new(filters: Vec<Filter>, on_error: ErrorPolicy) -> Self {
        Self { filters, on_error }
    }

    /// Parses textual options, failing on the first one that is neither a
    /// filter nor an error policy.
    pub fn parse<I, S>(options: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        options
            .into_iter()
            .map(|o| o.as_ref().parse::<DeleteOption>())
            .collect()
    }

    pub fn push(&mut self, option: DeleteOption) {
        match option {
            DeleteOption::Filter(filter) => self.filters.push(filter),
            // the last policy given wins
            DeleteOption::OnError(policy) => self.on_error = policy,
        }
    }
}

impl FromIterator<DeleteOption> for DeleteOptions {
    fn from_iter<T: IntoIterator<Item = DeleteOption>>(iter: T) -> Self {
        let mut options = DeleteOptions::default();
        for option in iter {
            options.push(option);
        }
        options
    }
}

impl Extend<DeleteOption> for DeleteOptions {
    fn extend<T: IntoIterator<Item = DeleteOption>>(&mut self, iter: T) {
        for option in iter {
            self.push(option);
        }
    }
}

/// Outcome of a batch delete that ran to completion.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub matched: usize,
    pub deleted: usize,
    /// Per-route failures collected under [`ErrorPolicy::ContinueCollectingErrors`].
    pub failures: Vec<Error>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
