//! Status collection: one bounded query, rows translated through the catalog.
//!
//! The database is reached through the [`StatusSource`] trait so the
//! translation logic can be exercised without a server. The MySQL
//! implementation lives in [`crate::mysql`].

use crate::{Result, catalog::MetricCatalog, error::RelayError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Which server-side view the status counters are read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusView {
    /// `SHOW GLOBAL STATUS`; works on every MySQL and MariaDB version.
    #[default]
    ShowStatus,
    /// `performance_schema.global_status` (MySQL 5.7+).
    PerformanceSchema,
    /// `information_schema.GLOBAL_STATUS` (MariaDB, MySQL 5.6 and older).
    ///
    /// These servers report names in upper case, so rows are matched to the
    /// catalog ignoring case.
    InformationSchema,
}

impl StatusView {
    fn query_prefix(self) -> &'static str {
        match self {
            Self::ShowStatus => "SHOW GLOBAL STATUS WHERE `Variable_name` IN (",
            Self::PerformanceSchema => {
                "SELECT VARIABLE_NAME, VARIABLE_VALUE FROM performance_schema.global_status WHERE VARIABLE_NAME IN ("
            }
            Self::InformationSchema => {
                "SELECT VARIABLE_NAME, VARIABLE_VALUE FROM information_schema.GLOBAL_STATUS WHERE VARIABLE_NAME IN ("
            }
        }
    }

    /// Whether returned names may differ in case from the catalog spelling.
    pub const fn folds_name_case(self) -> bool {
        matches!(self, Self::InformationSchema)
    }

    /// Name accepted on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShowStatus => "show-status",
            Self::PerformanceSchema => "performance-schema",
            Self::InformationSchema => "information-schema",
        }
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusView {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "show-status" | "show" => Ok(Self::ShowStatus),
            "performance-schema" | "performance_schema" => Ok(Self::PerformanceSchema),
            "information-schema" | "information_schema" => Ok(Self::InformationSchema),
            other => Err(RelayError::configuration(format!(
                "unknown status source '{}' (expected show-status, performance-schema or information-schema)",
                other
            ))),
        }
    }
}

/// One `(name, value)` pair as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    /// Status variable name, as spelled by the server
    pub name: String,
    /// Raw value text
    pub value: String,
}

impl StatusRow {
    /// Creates a row.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Executes a status query and returns its rows.
///
/// Implementations must run the statement exactly once and fail the whole
/// call if any row cannot be decoded; a partial result is never returned.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Runs `query` and returns every `(name, value)` row.
    ///
    /// # Errors
    /// Returns `Connection` or `Collection` errors from the database.
    async fn fetch_status(&self, query: &str) -> Result<Vec<StatusRow>>;
}

/// Metric key to raw value, as collected in one cycle.
///
/// Iteration is in lexicographic key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    values: BTreeMap<String, String>,
}

impl StatusSnapshot {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value collected for a metric key.
    pub fn get(&self, metric_key: &str) -> Option<&str> {
        self.values.get(metric_key).map(String::as_str)
    }

    /// Number of collected metrics.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(metric_key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, metric_key: String, value: String) {
        self.values.insert(metric_key, value);
    }
}

impl IntoIterator for StatusSnapshot {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl FromIterator<(String, String)> for StatusSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Quotes a status variable name as a MySQL string literal.
pub fn quote_literal(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len().saturating_add(2));
    quoted.push('\'');
    for ch in name.chars() {
        match ch {
            '\'' => quoted.push_str("''"),
            '\\' => quoted.push_str("\\\\"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('\'');
    quoted
}

/// Builds the single status query covering every catalog source name.
pub fn build_status_query(catalog: &MetricCatalog, view: StatusView) -> String {
    let mut query = String::with_capacity(1024);
    query.push_str(view.query_prefix());

    let mut first = true;
    for name in catalog.source_names() {
        if !first {
            query.push(',');
        }
        first = false;
        query.push_str(&quote_literal(name));
    }

    query.push(')');
    query
}

/// Runs one status query and translates the rows into a snapshot.
///
/// Rows whose name is not in the catalog are dropped. Names are matched
/// exactly, or ignoring case for views where
/// [`StatusView::folds_name_case`] holds. Any source failure aborts
/// collection; no partial snapshot is returned.
///
/// # Errors
/// Returns a configuration error for an empty catalog, otherwise whatever
/// the source reports.
pub async fn collect<S>(
    source: &S,
    catalog: &MetricCatalog,
    view: StatusView,
) -> Result<StatusSnapshot>
where
    S: StatusSource + ?Sized,
{
    if catalog.is_empty() {
        return Err(RelayError::configuration(
            "metric catalog is empty; nothing to collect",
        ));
    }

    let query = build_status_query(catalog, view);
    debug!("Status query: {}", query);

    let rows = source.fetch_status(&query).await?;
    let returned = rows.len();

    let mut snapshot = StatusSnapshot::new();
    for row in rows {
        let metric_key = if view.folds_name_case() {
            catalog.lookup_ignore_case(&row.name)
        } else {
            catalog.lookup(&row.name)
        };
        match metric_key {
            Some(metric_key) => snapshot.insert(metric_key.to_string(), row.value),
            None => debug!("Dropping status row '{}' not present in catalog", row.name),
        }
    }

    if snapshot.is_empty() && returned > 0 {
        warn!(
            "None of the {} rows returned by {} matched the catalog",
            returned, view
        );
    }

    info!(
        "Collected {} of {} catalog counters ({} rows returned)",
        snapshot.len(),
        catalog.len(),
        returned
    );

    Ok(snapshot)
}
