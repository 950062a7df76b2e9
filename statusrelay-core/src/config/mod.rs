//! Configuration for the two network endpoints of a relay cycle.
//!
//! - `DatabaseConfig`: MySQL server address and session settings
//! - `SenderConfig`: Zabbix server address and timeouts
//! - `option_file`: the `[client]` section of a MySQL option file
//!
//! Passwords are never stored here; they travel in
//! [`crate::security::Credentials`].

mod database;
pub mod option_file;
mod sender;

pub use database::DatabaseConfig;
pub use option_file::{ClientOptions, load_client_options, parse_client_options};
pub use sender::SenderConfig;
