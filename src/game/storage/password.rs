use hmac::Hmac;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use subtle::ConstantTimeEq;

const PBKDF2_ITERATIONS: u32 = 10_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 64;

/// Salted iterated password hash stored inside the character record.
/// Salt and hash are hex strings so the record stays a plain JSON object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PasswordHash {
    pub salt: String,
    pub hash: String,
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; HASH_LEN] {
    let mut output = [0u8; HASH_LEN];
    pbkdf2::pbkdf2::<Hmac<Sha512>>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut output);
    output
}

impl PasswordHash {
    pub fn derive(password: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let hash = derive_key(password, &salt);
        Self {
            salt: hex::encode(salt),
            hash: hex::encode(hash),
        }
    }

    /// Constant-time comparison; corrupt hex in a stored record verifies
    /// false rather than erroring.
    pub fn verify(&self, password: &str) -> bool {
        let Ok(salt) = hex::decode(&self.salt) else {
            return false;
        };
        let Ok(expected) = hex::decode(&self.hash) else {
            return false;
        };
        let derived = derive_key(password, &salt);
        derived.ct_eq(expected.as_slice()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_round_trip() {
        let hash = PasswordHash::derive("hunter2");
        assert!(hash.verify("hunter2"));
        assert!(!hash.verify("hunter3"));
        assert!(!hash.verify(""));
    }

    #[test]
    fn test_salts_are_unique() {
        let first = PasswordHash::derive("same");
        let second = PasswordHash::derive("same");
        assert_ne!(first.salt, second.salt);
        assert_ne!(first.hash, second.hash);
    }

    #[test]
    fn test_corrupt_hex_verifies_false() {
        let hash = PasswordHash {
            salt: "not hex".to_string(),
            hash: "zz".to_string(),
        };
        assert!(!hash.verify("anything"));
    }
}
