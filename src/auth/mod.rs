//! Credentials: password hashing, password strength policy and pre-auth.
//!
//! # Example Usage
//!
//! ```rust
//! use dirprov::auth::{hash_password, verify_password, PasswordPolicy};
//!
//! let stored = hash_password("test123");
//! assert!(verify_password("test123", &stored));
//! assert!(PasswordPolicy::default().check("test123").is_ok());
//! ```

mod password;
mod policy;
mod preauth;

pub use password::{hash_password, verify_password, SSHA256_PREFIX};
pub use policy::PasswordPolicy;
pub use preauth::{compute_pre_auth, generate_pre_auth_key, PreAuthRequest};

/// Protocol an authentication request arrived over, recorded in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthProtocol {
    #[default]
    Soap,
    Imap,
    Pop3,
    Http,
    Test,
}

impl std::fmt::Display for AuthProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuthProtocol::Soap => "soap",
            AuthProtocol::Imap => "imap",
            AuthProtocol::Pop3 => "pop3",
            AuthProtocol::Http => "http",
            AuthProtocol::Test => "test",
        };
        f.write_str(name)
    }
}
