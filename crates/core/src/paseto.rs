use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use eyre::{eyre, Report};

use payvault_primitives::error::ApiError;

/// PASETO v2.public: Ed25519-signed, unencrypted tokens. Only the claims
/// codec lives here; claim semantics are in [`crate::security`].
const HEADER: &str = "v2.public.";
const SIGNATURE_LEN: usize = 64;
const KEYPAIR_LEN: usize = 64;

/// The process keypair. The public half is recomputed from the private key,
/// never configured separately.
#[derive(Clone)]
pub struct TokenKeys {
    signing: SigningKey,
    verifying: VerifyingKey,
}

impl TokenKeys {
    /// Parses a hex-encoded 64-byte Ed25519 private key (seed || public).
    pub fn from_hex(hex_key: &str) -> Result<Self, Report> {
        let bytes = hex::decode(hex_key).map_err(|e| eyre!("private key is not hex: {}", e))?;
        let keypair: [u8; KEYPAIR_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| eyre!("private key must be {} bytes, got {}", KEYPAIR_LEN, bytes.len()))?;

        let signing = SigningKey::from_keypair_bytes(&keypair)
            .map_err(|e| eyre!("invalid Ed25519 keypair: {}", e))?;
        let verifying = signing.verifying_key();

        Ok(Self { signing, verifying })
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.verifying.as_bytes())
    }

    /// Signs a claims object into a `v2.public` token.
    pub fn sign(&self, claims: &serde_json::Value) -> Result<String, ApiError> {
        let message = serde_json::to_vec(claims)
            .map_err(|e| ApiError::Token(format!("failed to encode claims: {}", e)))?;

        let pre_auth = pae(&[HEADER.as_bytes(), &message, b""]);
        let signature = self.signing.sign(&pre_auth);

        let mut body = message;
        body.extend_from_slice(&signature.to_bytes());

        Ok(format!("{}{}", HEADER, URL_SAFE_NO_PAD.encode(body)))
    }

    /// Verifies a `v2.public` token and returns its claims object. Every
    /// failure collapses to the same opaque error.
    pub fn verify(&self, token: &str) -> Result<serde_json::Value, ApiError> {
        let invalid = || ApiError::Unauthenticated("invalid token".into());

        let encoded = token.strip_prefix(HEADER).ok_or_else(invalid)?;
        let body = URL_SAFE_NO_PAD.decode(encoded).map_err(|_| invalid())?;
        if body.len() < SIGNATURE_LEN {
            return Err(invalid());
        }

        let (message, sig_bytes) = body.split_at(body.len() - SIGNATURE_LEN);
        let signature = Signature::from_slice(sig_bytes).map_err(|_| invalid())?;

        let pre_auth = pae(&[HEADER.as_bytes(), message, b""]);
        self.verifying
            .verify(&pre_auth, &signature)
            .map_err(|_| invalid())?;

        serde_json::from_slice(message).map_err(|_| invalid())
    }
}

/// Pre-authentication encoding (PAE) from the PASETO spec: unambiguous
/// length-prefixed concatenation of the signed pieces.
fn pae(pieces: &[&[u8]]) -> Vec<u8> {
    let mut out = le64(pieces.len() as u64).to_vec();
    for piece in pieces {
        out.extend_from_slice(&le64(piece.len() as u64));
        out.extend_from_slice(piece);
    }
    out
}

fn le64(value: u64) -> [u8; 8] {
    // PAE clears the MSB of the last byte; lengths never reach 2^63.
    (value & !(1 << 63)).to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_keys() -> TokenKeys {
        let seed = [7u8; 32];
        let signing = SigningKey::from_bytes(&seed);
        TokenKeys::from_hex(&hex::encode(signing.to_keypair_bytes())).unwrap()
    }

    #[test]
    fn pae_encodes_lengths_little_endian() {
        let encoded = pae(&[b"v2.public.", b"{}", b""]);
        assert_eq!(&encoded[..8], &3u64.to_le_bytes());
        assert_eq!(&encoded[8..16], &10u64.to_le_bytes());
        assert_eq!(&encoded[16..26], b"v2.public.");
    }

    #[test]
    fn sign_verify_round_trip() {
        let keys = test_keys();
        let claims = json!({ "sub": 42, "exp": 4102444800i64 });
        let token = keys.sign(&claims).unwrap();
        assert!(token.starts_with("v2.public."));
        assert_eq!(keys.verify(&token).unwrap(), claims);
    }

    #[test]
    fn foreign_key_fails_verification() {
        let keys = test_keys();
        let other = {
            let signing = SigningKey::from_bytes(&[9u8; 32]);
            TokenKeys::from_hex(&hex::encode(signing.to_keypair_bytes())).unwrap()
        };
        let token = keys.sign(&json!({ "sub": 1 })).unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let keys = test_keys();
        let token = keys.sign(&json!({ "sub": 1 })).unwrap();

        let body = URL_SAFE_NO_PAD.decode(token.strip_prefix(HEADER).unwrap()).unwrap();
        let mut forged = body.clone();
        forged[0] ^= 0x01;
        let forged_token = format!("{}{}", HEADER, URL_SAFE_NO_PAD.encode(forged));
        assert!(keys.verify(&forged_token).is_err());
    }

    #[test]
    fn malformed_tokens_rejected() {
        let keys = test_keys();
        assert!(keys.verify("v1.public.abc").is_err());
        assert!(keys.verify("v2.public.!!!").is_err());
        assert!(keys.verify("v2.public.").is_err());
    }

    #[test]
    fn rejects_wrong_length_keys() {
        assert!(TokenKeys::from_hex("abcd").is_err());
        assert!(TokenKeys::from_hex("zz").is_err());
    }
}
