use pbkdf2::pbkdf2_hmac;
use rand::{RngCore, rngs::OsRng};
use sha2::{Sha256, Sha384, Sha512};
use unicode_normalization::UnicodeNormalization;

use crate::constants::{DUMMY_PASSWORD_DIGEST, PBKDF2_HASH, PBKDF2_ITERATIONS};
use crate::error::{AppError, Result};

/// Separator between the fields of a stored digest
const DIGEST_SEPARATOR: &str = "::";

// =============================================================================
// Identifiers
// =============================================================================

/// Fresh 128-bit value from the OS RNG
pub fn random_128bit() -> [u8; 16] {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// 32 lowercase hex characters, used for user, collection, sub-collection
/// and flashcard ids as well as session tokens
///
/// Uniqueness is probabilistic; collisions are never checked.
pub fn random_id() -> String {
    hex::encode(random_128bit())
}

// =============================================================================
// Password Digests
// =============================================================================

/// Derive PBKDF2-HMAC bits for the named hash function
///
/// The password is NFC-normalized first, so composed and decomposed
/// spellings of the same text derive the same bits. The output length is the
/// hash function's own output length.
fn derive_bits(password: &str, salt: &[u8], hash: &str, iterations: u32) -> Result<Vec<u8>> {
    let password = password.nfc().collect::<String>();
    let password = password.as_bytes();
    let bits = match hash {
        "SHA-256" => {
            let mut out = vec![0u8; 32];
            pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out);
            out
        }
        "SHA-384" => {
            let mut out = vec![0u8; 48];
            pbkdf2_hmac::<Sha384>(password, salt, iterations, &mut out);
            out
        }
        "SHA-512" => {
            let mut out = vec![0u8; 64];
            pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut out);
            out
        }
        other => {
            return Err(AppError::Digest(format!(
                "Unsupported hash function: {other}"
            )));
        }
    };
    Ok(bits)
}

/// Hash a password with a fresh 128-bit salt
///
/// # Returns
/// `"<digestHex>::<saltHex>::<hashName>::<iterations>"`, which carries
/// everything [`verify_password`] needs.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = random_128bit();
    let bits = derive_bits(password, &salt, PBKDF2_HASH, PBKDF2_ITERATIONS)?;

    Ok([
        hex::encode(bits),
        hex::encode(salt),
        PBKDF2_HASH.to_string(),
        PBKDF2_ITERATIONS.to_string(),
    ]
    .join(DIGEST_SEPARATOR))
}

/// Verify a password against a stored digest
///
/// An empty digest (no such user) is replaced by [`DUMMY_PASSWORD_DIGEST`]
/// so the derivation still runs and the answer is still `false`.
pub fn verify_password(password: &str, digest: &str) -> Result<bool> {
    let digest = if digest.is_empty() {
        DUMMY_PASSWORD_DIGEST
    } else {
        digest
    };

    let parts: Vec<&str> = digest.split(DIGEST_SEPARATOR).collect();
    let [expected, salt, hash, iterations] = parts.as_slice() else {
        return Err(AppError::Digest("Malformed password digest".to_string()));
    };

    let salt = hex::decode(salt)
        .map_err(|e| AppError::Digest(format!("Invalid digest salt: {e}")))?;
    let iterations: u32 = iterations
        .parse()
        .map_err(|e| AppError::Digest(format!("Invalid digest iterations: {e}")))?;

    let bits = derive_bits(password, &salt, hash, iterations)?;

    Ok(constant_time_eq(
        hex::encode(bits).as_bytes(),
        expected.as_bytes(),
    ))
}

/// Compare two byte strings without stopping at the first difference.
///
/// Runs over the longer input, so a length mismatch costs as much as a
/// content mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut diff = a.len() ^ b.len();
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= usize::from(x ^ y);
    }
    diff == 0
}
