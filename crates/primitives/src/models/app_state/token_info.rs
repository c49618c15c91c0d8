use eyre::{eyre, Report};
use secrecy::SecretString;
use std::env;
use std::time::Duration;

/// Ed25519 keypair bytes as the service consumes them: seed || public key.
pub const PRIVATE_KEY_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct TokenInfo {
    /// Hex-encoded 64-byte Ed25519 private key. Decoded and checked here so a
    /// malformed key kills the process at startup, not at the first login.
    pub private_key: SecretString,
    /// Process-level secret keying the password HMAC.
    pub password_secret: SecretString,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenInfo {
    pub fn new() -> Result<Self, Report> {
        let private_key =
            env::var("TOKEN_PRIVATE_KEY").map_err(|_| eyre!("TOKEN_PRIVATE_KEY must be set"))?;
        Self::validate_private_key(&private_key)?;

        let password_secret =
            env::var("PASSWORD_SECRET").map_err(|_| eyre!("PASSWORD_SECRET must be set"))?;
        if password_secret.len() < 32 {
            return Err(eyre!("PASSWORD_SECRET must be at least 32 characters"));
        }

        let access_minutes: u64 = env::var("TOKEN_ACCESS_TTL_MIN")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .map_err(|e| eyre!("Invalid TOKEN_ACCESS_TTL_MIN: {}", e))?;
        let refresh_minutes: u64 = env::var("TOKEN_REFRESH_TTL_MIN")
            .unwrap_or_else(|_| "43200".into())
            .parse()
            .map_err(|e| eyre!("Invalid TOKEN_REFRESH_TTL_MIN: {}", e))?;

        Ok(Self {
            private_key: SecretString::from(private_key),
            password_secret: SecretString::from(password_secret),
            access_ttl: Duration::from_secs(access_minutes * 60),
            refresh_ttl: Duration::from_secs(refresh_minutes * 60),
        })
    }

    pub fn validate_private_key(hex_key: &str) -> Result<(), Report> {
        let bytes = hex::decode(hex_key).map_err(|e| eyre!("TOKEN_PRIVATE_KEY is not hex: {}", e))?;
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(eyre!(
                "TOKEN_PRIVATE_KEY must be {} bytes ({} hex chars), got {} bytes",
                PRIVATE_KEY_LEN,
                PRIVATE_KEY_LEN * 2,
                bytes.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_or_non_hex_keys() {
        assert!(TokenInfo::validate_private_key("not-hex").is_err());
        assert!(TokenInfo::validate_private_key("ab".repeat(32).as_str()).is_err());
        assert!(TokenInfo::validate_private_key("ab".repeat(64).as_str()).is_ok());
    }
}
