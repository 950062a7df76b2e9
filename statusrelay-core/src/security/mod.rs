//! Credential handling.
//!
//! Database credentials live only in [`Credentials`], whose memory is zeroed
//! on drop and whose `Debug` output never shows the password. Configuration
//! structs carry host and port only.

mod credentials;

pub use credentials::Credentials;
