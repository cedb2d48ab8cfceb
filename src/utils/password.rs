use hmac::Hmac;
use pbkdf2::password_hash::Output;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use rand::Rng;
use base64::{Engine, engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD}};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const ITERATIONS: u32 = 260000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Invalid hash format")]
    InvalidFormat,

    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid iterations")]
    InvalidIterations,

    #[error("Failed to decode {0}")]
    Decode(&'static str),

    #[error("PBKDF2 failure: {0}")]
    Derive(String),
}

/// Hash un mot de passe: PBKDF2-HMAC-SHA256, 260000 itérations, salt de 16 bytes
/// Format: pbkdf2:sha256:iterations$salt$hash (base64 URL-safe sans padding)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, ITERATIONS, &mut key)
        .map_err(|e| PasswordError::Derive(e.to_string()))?;

    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    let hash_b64 = URL_SAFE_NO_PAD.encode(key);

    Ok(format!("pbkdf2:sha256:{}${}${}", ITERATIONS, salt_b64, hash_b64))
}

/// Vérifie un mot de passe contre un hash stocké
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 3 {
        return Err(PasswordError::InvalidFormat);
    }

    let header_parts: Vec<&str> = parts[0].split(':').collect();
    if header_parts.len() != 3 || header_parts[0] != "pbkdf2" {
        return Err(PasswordError::InvalidFormat);
    }
    if header_parts[1] != "sha256" {
        return Err(PasswordError::UnsupportedAlgorithm(header_parts[1].to_string()));
    }

    let iterations = header_parts[2]
        .parse::<u32>()
        .map_err(|_| PasswordError::InvalidIterations)?;
    if iterations == 0 {
        return Err(PasswordError::InvalidIterations);
    }

    let salt = decode_b64(parts[1]).ok_or(PasswordError::Decode("salt"))?;
    let expected_hash = decode_b64(parts[2]).ok_or(PasswordError::Decode("hash"))?;

    let mut computed = vec![0u8; expected_hash.len()];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed)
        .map_err(|e| PasswordError::Derive(e.to_string()))?;

    // Output compare en temps constant
    let computed = Output::new(&computed).map_err(|_| PasswordError::Decode("hash"))?;
    let expected = Output::new(&expected_hash).map_err(|_| PasswordError::Decode("hash"))?;

    Ok(computed == expected)
}

/// Accepte base64 URL-safe sans padding (format produit ici) ou base64 standard
fn decode_b64(input: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(input)
        .or_else(|_| STANDARD.decode(input))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("s3cret").unwrap();

        assert!(hash.starts_with("pbkdf2:sha256:260000$"));
        assert!(verify_password("s3cret", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash() {
        assert_eq!(verify_password("x", "not-a-hash"), Err(PasswordError::InvalidFormat));
        assert_eq!(
            verify_password("x", "pbkdf2:sha256:abc$c2FsdA$aGFzaA"),
            Err(PasswordError::InvalidIterations)
        );
        assert!(matches!(
            verify_password("x", "pbkdf2:md5:1000$c2FsdA$aGFzaA"),
            Err(PasswordError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_truncated_hash_is_rejected() {
        // 4 bytes: trop court pour une sortie PBKDF2 exploitable
        assert_eq!(
            verify_password("x", "pbkdf2:sha256:1000$c2FsdA$aGFzaA"),
            Err(PasswordError::Decode("hash"))
        );
    }
}
