// Challenge-response handshake primitives
//
// auth1 -> nonce, auth2 carries md5(nonce + password) as lowercase hex.
// The account-manager request uses a separate digest of the password
// salted with the lowercased user name.

use md5::{Digest, Md5};
use secrecy::{ExposeSecret, SecretString};

/// Handshake progress for one connection.
///
/// Transitions: `Unauthenticated -> NonceReceived -> Authenticated`, or
/// `-> Failed` from either non-terminal state. `Authenticated` and
/// `Failed` are terminal for the life of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    NonceReceived,
    Authenticated,
    Failed,
}

impl AuthState {
    pub fn is_authenticated(self) -> bool {
        self == Self::Authenticated
    }

    /// Whether a handshake may still be started.
    pub fn can_begin(self) -> bool {
        self == Self::Unauthenticated
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NonceReceived => "nonce-received",
            Self::Authenticated => "authenticated",
            Self::Failed => "failed",
        })
    }
}

fn md5_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Md5::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// Digest sent in `<nonce_hash>`: lowercase hex md5 of `nonce + password`.
pub fn nonce_hash(nonce: &str, password: &SecretString) -> String {
    md5_hex(&[nonce.as_bytes(), password.expose_secret().as_bytes()])
}

/// Digest sent in the account-manager `<password_hash>`: lowercase hex md5
/// of `password + lowercase(user)`.
pub fn password_hash(password: &SecretString, user: &str) -> String {
    md5_hex(&[
        password.expose_secret().as_bytes(),
        user.to_lowercase().as_bytes(),
    ])
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn nonce_hash_is_md5_of_concatenation() {
        // md5("abc") = 900150983cd24fb0d6963f7d28e17f72
        let pw = SecretString::from("c");
        assert_eq!(nonce_hash("ab", &pw), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn nonce_hash_with_empty_password() {
        // md5("") = d41d8cd98f00b204e9800998ecf8427e
        let pw = SecretString::from("");
        assert_eq!(nonce_hash("", &pw), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn password_hash_lowercases_user() {
        let pw = SecretString::from("a");
        assert_eq!(password_hash(&pw, "BC"), nonce_hash("a", &SecretString::from("bc")));
        assert_eq!(password_hash(&pw, "BC"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn state_transitions() {
        assert!(AuthState::default().can_begin());
        assert!(!AuthState::NonceReceived.can_begin());
        assert!(AuthState::Authenticated.is_authenticated());
        assert!(!AuthState::Failed.can_begin());
        assert_eq!(AuthState::NonceReceived.to_string(), "nonce-received");
    }
}
