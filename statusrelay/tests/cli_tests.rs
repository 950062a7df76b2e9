//! CLI parsing and settings resolution tests.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::uninlined_format_args)]

use clap::Parser;
use statusrelay::{Cli, format_snapshot};
use statusrelay_core::{RelayError, StatusSnapshot, StatusView};
use std::io::Write;
use tempfile::NamedTempFile;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["statusrelay"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("arguments should parse")
}

fn option_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_defaults() {
    let cli = parse(&[]);

    assert_eq!(cli.mysql.host, "127.0.0.1");
    assert_eq!(cli.mysql.port, 3306);
    assert_eq!(cli.mysql.user, "root");
    assert!(cli.mysql.defaults_extra_file.is_none());
    assert_eq!(cli.zabbix.server, "127.0.0.1");
    assert_eq!(cli.zabbix.port, 10051);
    assert_eq!(cli.zabbix.host_name, "localhost");
    assert_eq!(cli.status_source, StatusView::ShowStatus);
    assert!(!cli.debug);
    assert_eq!(cli.global.verbose, 0);
    assert_eq!(cli.global.timeout, 10);
}

#[test]
fn test_short_zabbix_flags() {
    let cli = parse(&["-z", "zbx.internal", "-p", "10052", "-s", "db1", "-vv"]);

    assert_eq!(cli.zabbix.server, "zbx.internal");
    assert_eq!(cli.zabbix.port, 10052);
    assert_eq!(cli.zabbix.host_name, "db1");
    assert_eq!(cli.global.verbose, 2);

    let sender = cli.sender_settings().unwrap();
    assert_eq!(sender.address(), "zbx.internal:10052");
}

#[test]
fn test_status_source_flag() {
    let cli = parse(&["--status-source", "performance-schema", "--debug"]);
    assert_eq!(cli.status_source, StatusView::PerformanceSchema);
    assert!(cli.debug);

    let result = Cli::try_parse_from(["statusrelay", "--status-source", "sys"]);
    assert!(result.is_err());
}

#[test]
fn test_invalid_port_rejected_by_parser() {
    assert!(Cli::try_parse_from(["statusrelay", "--my-port", "99999"]).is_err());
    assert!(Cli::try_parse_from(["statusrelay", "-p", "zabbix"]).is_err());
}

#[test]
fn test_database_settings_from_flags() {
    let cli = parse(&[
        "--my-host",
        "10.0.0.5",
        "--my-port",
        "3307",
        "--my-user",
        "monitor",
        "--my-pass",
        "flagpass",
    ]);

    let (config, creds) = cli.database_settings().unwrap();

    assert_eq!(config.host, "10.0.0.5");
    assert_eq!(config.port, 3307);
    assert_eq!(creds.username(), "monitor");
    assert_eq!(creds.password(), Some("flagpass"));
}

#[test]
fn test_option_file_overrides_flags() {
    let file = option_file(
        "[client]\nhost = db1.internal\nuser = monitor\npassword = filepass\n",
    );
    let path = file.path().to_str().unwrap();
    let cli = parse(&[
        "--my-host",
        "10.0.0.5",
        "--my-port",
        "3307",
        "--my-user",
        "root",
        "--my-pass",
        "flagpass",
        "--defaults-extra-file",
        path,
    ]);

    let (config, creds) = cli.database_settings().unwrap();

    assert_eq!(config.host, "db1.internal");
    // Absent from the file, so the flag value stays.
    assert_eq!(config.port, 3307);
    assert_eq!(creds.username(), "monitor");
    assert_eq!(creds.password(), Some("filepass"));
}

#[test]
fn test_unreadable_option_file_is_configuration_error() {
    let cli = parse(&["--defaults-extra-file", "/nonexistent/statusrelay.cnf"]);

    let err = cli.database_settings().unwrap_err();

    assert!(matches!(err, RelayError::Configuration { .. }), "{:?}", err);
}

#[test]
fn test_timeout_applies_to_both_endpoints() {
    let cli = parse(&["--timeout", "3"]);

    let (db, _) = cli.database_settings().unwrap();
    let sender = cli.sender_settings().unwrap();

    assert_eq!(db.connect_timeout, std::time::Duration::from_secs(3));
    assert_eq!(sender.connect_timeout, std::time::Duration::from_secs(3));
    assert_eq!(sender.io_timeout, std::time::Duration::from_secs(3));
    assert!(Cli::try_parse_from(["statusrelay", "--connect-timeout", "3"]).is_err());
}

#[test]
fn test_zero_timeout_is_rejected() {
    let cli = parse(&["--timeout", "0"]);
    assert!(cli.database_settings().is_err());
    assert!(cli.sender_settings().is_err());
}

#[test]
fn test_empty_host_name_is_rejected() {
    let cli = parse(&["-s", ""]);
    assert!(cli.sender_settings().is_err());
}

#[test]
fn test_format_snapshot_sorted_lines() {
    let snapshot: StatusSnapshot = [
        ("mysql.thread[running]".to_string(), "2".to_string()),
        ("mysql.bytes[sent]".to_string(), "512".to_string()),
    ]
    .into_iter()
    .collect();

    assert_eq!(
        format_snapshot(&snapshot),
        "mysql.bytes[sent]: 512\nmysql.thread[running]: 2\n"
    );
    assert_eq!(format_snapshot(&StatusSnapshot::new()), "");
}
