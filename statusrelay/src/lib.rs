//! Command-line surface of the status relay.
//!
//! This module exposes the argument definitions and the settings resolution
//! for testing; the cycle itself is driven from `main.rs`.

use clap::{Args, Parser};
use statusrelay_core::{
    DatabaseConfig, Result, SenderConfig, StatusSnapshot, StatusView,
    config::load_client_options, security::Credentials,
};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

/// CLI argument structure
#[derive(Debug, Parser)]
#[command(name = "statusrelay")]
#[command(about = "Relay MySQL global status counters to a Zabbix server")]
#[command(version)]
#[command(long_about = "
statusrelay - one-shot MySQL status sender for Zabbix

Reads a fixed set of global status counters from a MySQL or MariaDB server
and submits them to a Zabbix server or proxy as trapper items, then exits.

EXAMPLES:
  statusrelay --my-user monitor -z zabbix.internal -s db1
  statusrelay --defaults-extra-file /etc/zabbix/.my.cnf -s db1
  statusrelay --debug --my-host 10.0.0.5
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub mysql: MysqlArgs,

    #[command(flatten)]
    pub zabbix: ZabbixArgs,

    /// Server view the counters are read from
    #[arg(
        long,
        default_value = "show-status",
        help = "Status source: show-status, performance-schema or information-schema"
    )]
    pub status_source: StatusView,

    /// Print collected values instead of sending them
    #[arg(long, help = "Print collected key/value pairs instead of sending them")]
    pub debug: bool,
}

/// MySQL connection flags
#[derive(Debug, Args)]
pub struct MysqlArgs {
    /// MySQL host
    #[arg(long = "my-host", default_value = "127.0.0.1")]
    pub host: String,

    /// MySQL port
    #[arg(long = "my-port", default_value_t = 3306)]
    pub port: u16,

    /// MySQL user
    #[arg(long = "my-user", default_value = "root")]
    pub user: String,

    /// MySQL password
    #[arg(
        long = "my-pass",
        env = "MYSQL_PWD",
        hide_env_values = true,
        default_value = ""
    )]
    pub password: String,

    /// MySQL option file whose [client] section overrides the flags above
    #[arg(long = "defaults-extra-file", value_name = "FILE")]
    pub defaults_extra_file: Option<PathBuf>,
}

/// Zabbix destination flags
#[derive(Debug, Args)]
pub struct ZabbixArgs {
    /// Zabbix server or proxy address
    #[arg(short = 'z', long = "zabbix-server", default_value = "127.0.0.1")]
    pub server: String,

    /// Zabbix trapper port
    #[arg(short = 'p', long = "zabbix-port", id = "zabbix_port", default_value_t = 10051)]
    pub port: u16,

    /// Host name the metrics are attributed to in Zabbix
    #[arg(short = 's', long = "host-name", default_value = "localhost")]
    pub host_name: String,
}

/// Flags shared by both endpoints
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Seconds allowed for connecting to MySQL, and for each connect or I/O
    /// step against the Zabbix server
    #[arg(
        long,
        default_value_t = 10,
        help = "Seconds to wait on MySQL and on each Zabbix connect/read/write"
    )]
    pub timeout: u64,

    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all log output except errors")]
    pub quiet: bool,
}

impl Cli {
    /// Resolves database settings from the flags and the optional option file.
    ///
    /// # Errors
    /// Returns a configuration error if the option file cannot be read or the
    /// resulting settings are invalid.
    pub fn database_settings(&self) -> Result<(DatabaseConfig, Credentials)> {
        let mut config = DatabaseConfig::new(self.mysql.host.clone())
            .with_port(self.mysql.port)
            .with_connect_timeout(self.timeout());
        let mut credentials = Credentials::new(
            self.mysql.user.clone(),
            Some(self.mysql.password.clone()),
        );

        if let Some(path) = &self.mysql.defaults_extra_file {
            load_client_options(path)?.apply(&mut config, &mut credentials);
        }

        config.validate()?;
        Ok((config, credentials))
    }

    /// Resolves the Zabbix destination.
    ///
    /// # Errors
    /// Returns a configuration error for an empty server, zero port, or an
    /// empty host name.
    pub fn sender_settings(&self) -> Result<SenderConfig> {
        if self.zabbix.host_name.is_empty() {
            return Err(statusrelay_core::RelayError::configuration(
                "host name cannot be empty",
            ));
        }
        let config = SenderConfig::new(self.zabbix.server.clone(), self.zabbix.port)
            .with_timeout(self.timeout());
        config.validate()?;
        Ok(config)
    }

    const fn timeout(&self) -> Duration {
        Duration::from_secs(self.global.timeout)
    }
}

/// Renders a snapshot as `key: value` lines for `--debug`.
pub fn format_snapshot(snapshot: &StatusSnapshot) -> String {
    let mut out = String::new();
    for (key, value) in snapshot.iter() {
        let _ = writeln!(out, "{}: {}", key, value);
    }
    out
}
