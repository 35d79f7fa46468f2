//! PBKDF2-HMAC-SHA256 password hashing
//!
//! Encoded form: `pbkdf2_sha256$<iterations>$<salt hex>$<hash hex>`.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Algorithm tag at the start of every encoded hash
pub const ALGORITHM: &str = "pbkdf2_sha256";

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Hashes and verifies account passwords
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    /// Hash `password` under a fresh random salt
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let derived = derive(password.as_bytes(), &salt, self.iterations);
        format!(
            "{}${}${}${}",
            ALGORITHM,
            self.iterations,
            hex::encode(salt),
            hex::encode(derived)
        )
    }

    /// Check `password` against an encoded hash
    ///
    /// The iteration count comes from the encoded value, so hashes made under
    /// an older setting keep verifying.
    pub fn verify(&self, password: &str, encoded: &str) -> bool {
        let mut parts = encoded.split('$');
        let (Some(algorithm), Some(iterations), Some(salt), Some(expected), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return false;
        };
        if algorithm != ALGORITHM {
            return false;
        }

        let (Ok(iterations), Ok(salt), Ok(expected)) = (
            iterations.parse::<u32>(),
            hex::decode(salt),
            hex::decode(expected),
        ) else {
            return false;
        };
        if iterations == 0 || expected.len() != HASH_LEN {
            return false;
        }

        let derived = derive(password.as_bytes(), &salt, iterations);
        derived[..].ct_eq(&expected[..]).into()
    }
}

fn derive(password: &[u8], salt: &[u8], iterations: u32) -> [u8; HASH_LEN] {
    let mut output = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut output);
    output
}
