/*!
 * # Authentication
 *
 * Two credential families guard the service:
 *
 * - Session tokens (HS256 JWT issued by the auth provider) for the internal API.
 *   They name the user and the team currently selected in the dashboard.
 * - Team-scoped API keys for the external `/api/v1` surface. Only the SHA-256
 *   digest of a key is stored; the plaintext is shown once, at creation.
 */

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};

pub mod context;
pub mod external;
pub mod session;

pub use context::{SessionUser, TeamScope};
pub use external::{with_rate_limit_headers, ExternalContext};
pub use session::{issue_session_token, AuthError, Identity, IdentityResolver, JwtIdentityResolver};

/// Random characters after the configured prefix
const API_KEY_SECRET_LEN: usize = 40;
/// Characters of the key kept in clear for display
const API_KEY_DISPLAY_LEN: usize = 8;

/// A freshly generated API key, before it is persisted
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    pub plaintext: String,
    pub display_prefix: String,
    pub hash: String,
}

/// Generates a new secret of the form `<prefix><40 alphanumerics>`.
pub fn generate_api_key(prefix: &str) -> GeneratedApiKey {
    let secret: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(API_KEY_SECRET_LEN)
        .map(char::from)
        .collect();
    let plaintext = format!("{}{}", prefix, secret);
    let display_prefix = plaintext
        .chars()
        .take(prefix.len() + API_KEY_DISPLAY_LEN)
        .collect();
    let hash = hash_api_key(&plaintext);

    GeneratedApiKey {
        plaintext,
        display_prefix,
        hash,
    }
}

/// Lowercase hex SHA-256 digest of an API key
pub fn hash_api_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_carries_prefix_and_matching_hash() {
        let key = generate_api_key("mes_");
        assert!(key.plaintext.starts_with("mes_"));
        assert_eq!(key.plaintext.len(), 4 + API_KEY_SECRET_LEN);
        assert_eq!(key.display_prefix.len(), 4 + API_KEY_DISPLAY_LEN);
        assert!(key.plaintext.starts_with(&key.display_prefix));
        assert_eq!(key.hash, hash_api_key(&key.plaintext));
        assert_eq!(key.hash.len(), 64);
    }

    #[test]
    fn keys_are_unique() {
        assert_ne!(generate_api_key("mes_").plaintext, generate_api_key("mes_").plaintext);
    }

    #[test]
    fn hash_is_stable_sha256_hex() {
        assert_eq!(
            hash_api_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
