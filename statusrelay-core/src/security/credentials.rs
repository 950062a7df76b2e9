//! Secure credential container with automatic memory zeroing.

use zeroize::{Zeroize, Zeroizing};

/// Database username and optional password, zeroed when dropped.
///
/// # Example
///
/// ```rust
/// use statusrelay_core::security::Credentials;
///
/// let creds = Credentials::new("monitor".to_string(), Some("secret".to_string()));
/// assert_eq!(creds.username(), "monitor");
/// assert!(creds.has_password());
/// assert!(!format!("{:?}", creds).contains("secret"));
/// ```
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<Option<String>>,
}

impl Credentials {
    /// Creates new credentials with automatic memory zeroing.
    ///
    /// An empty password is stored as no password.
    pub fn new(username: String, password: Option<String>) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password.filter(|p| !p.is_empty())),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The password, for handing to the database driver only.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Checks if password is present without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Replaces the username.
    pub fn set_username(&mut self, username: String) {
        self.username = Zeroizing::new(username);
    }

    /// Replaces the password; an empty string clears it.
    pub fn set_password(&mut self, password: Option<String>) {
        self.password = Zeroizing::new(password.filter(|p| !p.is_empty()));
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username())
            .field("password", &self.has_password().then_some("****"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = Credentials::new("testuser".to_string(), Some("testpass".to_string()));
        assert_eq!(creds.username(), "testuser");
        assert_eq!(creds.password(), Some("testpass"));
        assert!(creds.has_password());
    }

    #[test]
    fn test_credentials_empty_password_is_none() {
        let creds = Credentials::new("root".to_string(), Some(String::new()));
        assert!(!creds.has_password());
        assert_eq!(creds.password(), None);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("root".to_string(), Some("hunter2".to_string()));
        let debug = format!("{:?}", creds);
        assert!(debug.contains("root"));
        assert!(debug.contains("****"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_credentials_setters() {
        let mut creds = Credentials::new("root".to_string(), None);
        creds.set_username("monitor".to_string());
        creds.set_password(Some("s3cr3t".to_string()));
        assert_eq!(creds.username(), "monitor");
        assert_eq!(creds.password(), Some("s3cr3t"));

        creds.set_password(Some(String::new()));
        assert!(!creds.has_password());
    }
}
