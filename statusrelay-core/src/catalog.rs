//! Mapping from MySQL status variable names to Zabbix item keys.
//!
//! The catalog drives both halves of collection: its source names form the
//! IN-list of the status query, and each returned row is translated through
//! it into a metric key. It is built once at startup and passed by reference,
//! so tests can substitute a smaller catalog.

use crate::{Result, error::RelayError};
use std::collections::BTreeMap;

/// Built-in MySQL status counters and the Zabbix keys they are reported under.
const MYSQL_STATUS_KEYS: &[(&str, &str)] = &[
    ("Bytes_received", "mysql.bytes[received]"),
    ("Bytes_sent", "mysql.bytes[sent]"),
    ("Com_select", "mysql.query[select]"),
    ("Com_insert", "mysql.query[insert]"),
    ("Com_update", "mysql.query[update]"),
    ("Com_delete", "mysql.query[delete]"),
    ("Com_replace", "mysql.query[replace]"),
    ("Com_begin", "mysql.query[begin]"),
    ("Com_commit", "mysql.query[commit]"),
    ("Com_rollback", "mysql.query[rollback]"),
    ("Select_full_join", "mysql.select[full_join]"),
    ("Select_full_range_join", "mysql.select[full_range_join]"),
    ("Select_range", "mysql.select[range]"),
    ("Select_range_check", "mysql.select[range_check]"),
    ("Select_scan", "mysql.select[scan]"),
    ("Innodb_buffer_pool_pages_data", "mysql.innodb.buffer[data]"),
    ("Innodb_buffer_pool_pages_free", "mysql.innodb.buffer[free]"),
    ("Innodb_buffer_pool_pages_dirty", "mysql.innodb.buffer[dirty]"),
    ("Innodb_buffer_pool_pages_misc", "mysql.innodb.buffer[misc]"),
    ("Innodb_data_reads", "mysql.innodb.data[read]"),
    ("Innodb_data_writes", "mysql.innodb.data[write]"),
    ("Innodb_data_fsyncs", "mysql.innodb.data[fsync]"),
    ("Innodb_log_writes", "mysql.innodb.log[write]"),
    ("Innodb_os_log_fsyncs", "mysql.innodb.log[fsync]"),
    ("Threads_cached", "mysql.thread[cached]"),
    ("Threads_connected", "mysql.thread[connected]"),
    ("Threads_created", "mysql.thread[created]"),
    ("Threads_running", "mysql.thread[running]"),
    ("Questions", "mysql.query[questions]"),
    ("Slow_queries", "mysql.query[slow_queries]"),
    ("Memory_used", "mysql.memory"),
    ("Threadpool_idle_threads", "mysql.thread[pool_idle]"),
    ("Threadpool_threads", "mysql.thread[pool_threads]"),
];

/// Immutable source-name to metric-key table.
///
/// Lookups are case-sensitive exact matches, except through
/// [`MetricCatalog::lookup_ignore_case`]. Entries iterate in lexicographic
/// order of source name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricCatalog {
    entries: BTreeMap<String, String>,
}

impl MetricCatalog {
    /// The built-in MySQL catalog.
    pub fn mysql_default() -> Self {
        Self {
            entries: MYSQL_STATUS_KEYS
                .iter()
                .map(|(source, key)| ((*source).to_string(), (*key).to_string()))
                .collect(),
        }
    }

    /// Builds a catalog from arbitrary `(source_name, metric_key)` pairs.
    ///
    /// # Errors
    /// Returns a configuration error if any name or key is empty, or if a
    /// source name appears more than once.
    pub fn from_entries<I, S, K>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, K)>,
        S: Into<String>,
        K: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (source, key) in entries {
            let source = source.into();
            let key = key.into();
            if source.is_empty() || key.is_empty() {
                return Err(RelayError::configuration(
                    "catalog entries must have a non-empty source name and metric key",
                ));
            }
            if map.contains_key(&source) {
                return Err(RelayError::configuration(format!(
                    "duplicate catalog source name '{}'",
                    source
                )));
            }
            map.insert(source, key);
        }
        Ok(Self { entries: map })
    }

    /// Metric key for a status variable, if the catalog knows it.
    pub fn lookup(&self, source_name: &str) -> Option<&str> {
        self.entries.get(source_name).map(String::as_str)
    }

    /// Like [`lookup`](Self::lookup), but matches the source name ignoring
    /// ASCII case.
    ///
    /// An exact match wins; otherwise the first case-insensitive match in
    /// source-name order is used.
    pub fn lookup_ignore_case(&self, source_name: &str) -> Option<&str> {
        self.lookup(source_name).or_else(|| {
            self.entries
                .iter()
                .find(|(source, _)| source.eq_ignore_ascii_case(source_name))
                .map(|(_, key)| key.as_str())
        })
    }

    /// All source names, each exactly once.
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All `(source_name, metric_key)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(source, key)| (source.as_str(), key.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::mysql_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_catalog_has_every_entry() {
        let catalog = MetricCatalog::mysql_default();
        assert_eq!(catalog.len(), MYSQL_STATUS_KEYS.len());
        assert_eq!(catalog.len(), 33);
    }

    #[test]
    fn test_default_catalog_keys_are_unique() {
        let catalog = MetricCatalog::mysql_default();
        let keys: HashSet<&str> = catalog.entries().map(|(_, key)| key).collect();
        assert_eq!(keys.len(), catalog.len());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let catalog = MetricCatalog::mysql_default();
        assert_eq!(
            catalog.lookup("Threads_connected"),
            Some("mysql.thread[connected]")
        );
        assert_eq!(catalog.lookup("THREADS_CONNECTED"), None);
        assert_eq!(catalog.lookup("threads_connected"), None);
        assert_eq!(catalog.lookup("Memory_used"), Some("mysql.memory"));
    }

    #[test]
    fn test_lookup_ignore_case_maps_to_catalog_key() {
        let catalog = MetricCatalog::mysql_default();
        assert_eq!(
            catalog.lookup_ignore_case("THREADS_CONNECTED"),
            Some("mysql.thread[connected]")
        );
        assert_eq!(
            catalog.lookup_ignore_case("innodb_buffer_pool_pages_free"),
            Some("mysql.innodb.buffer[free]")
        );
        assert_eq!(catalog.lookup_ignore_case("UPTIME_SINCE_FLUSH_STATUS"), None);
    }

    #[test]
    fn test_lookup_ignore_case_prefers_exact_match() {
        let catalog =
            MetricCatalog::from_entries([("Questions", "exact"), ("QUESTIONS", "upper")]).unwrap();
        assert_eq!(catalog.lookup_ignore_case("QUESTIONS"), Some("upper"));
        assert_eq!(catalog.lookup_ignore_case("Questions"), Some("exact"));
        // "QUESTIONS" sorts first in source-name order.
        assert_eq!(catalog.lookup_ignore_case("questions"), Some("upper"));
    }

    #[test]
    fn test_from_entries_rejects_duplicates() {
        let result = MetricCatalog::from_entries([
            ("Questions", "mysql.query[questions]"),
            ("Questions", "mysql.questions"),
        ]);
        assert!(matches!(result, Err(RelayError::Configuration { .. })));
    }

    #[test]
    fn test_from_entries_rejects_empty_names() {
        assert!(MetricCatalog::from_entries([("", "mysql.memory")]).is_err());
        assert!(MetricCatalog::from_entries([("Memory_used", "")]).is_err());
    }

    #[test]
    fn test_source_names_sorted() {
        let catalog =
            MetricCatalog::from_entries([("Uptime", "mysql.uptime"), ("Aborted_clients", "a")])
                .unwrap();
        let names: Vec<&str> = catalog.source_names().collect();
        assert_eq!(names, vec!["Aborted_clients", "Uptime"]);
    }
}
