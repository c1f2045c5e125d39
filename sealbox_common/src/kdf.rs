use sealbox_types::byte_array::{ByteArray16, ByteArray32};

use crate::cipher::CipherAlgo;
use crate::error::KeyDerivationError;

/// PBKDF2-HMAC-SHA256 iteration count. Fixed so that the same passphrase and
/// salt always derive the same material, on every run and on every machine.
pub const PBKDF2_ROUNDS: u32 = 10_000;

pub const IV_LEN: usize = 16;

const MAC_KEY_INFO: &[u8] = b"sealbox/keyed-digest";

/// Cipher key and IV derived from a passphrase and salt.
///
/// Derivation is deterministic, so decryption re-derives the material from
/// the same inputs instead of storing it anywhere. The salt is caller
/// supplied and usually shared out of band; reusing one salt for many
/// messages makes the derived keys guessable together, prefer a fresh salt
/// per context.
///
/// `key` holds exactly `algo.key_len()` bytes; the cipher constructors rely
/// on that length, so build values with [`derive_key_material`] instead of
/// by hand.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub algo: CipherAlgo,
    pub key: Vec<u8>,
    pub iv: ByteArray16,
}

// Key material must not leak into logs
impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algo", &self.algo)
            .field("key", &"<redacted>")
            .field("iv", &"<redacted>")
            .finish()
    }
}

fn derive_bytes(
    passphrase: &str,
    salt: &[u8],
    out: &mut [u8],
) -> Result<(), KeyDerivationError> {
    if passphrase.is_empty() {
        return Err(KeyDerivationError::EmptyPassphrase);
    }
    if salt.is_empty() {
        return Err(KeyDerivationError::EmptySalt);
    }
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(passphrase.as_bytes(), salt, PBKDF2_ROUNDS, out);
    Ok(())
}

/// ikm - input key material, must be a high-entropy secret (not a password)
/// info - descriptive label for domain separation (constant)
fn expand_subkey(ikm: &[u8], info: &[u8]) -> [u8; 32] {
    let hk = hkdf::Hkdf::<sha2::Sha256>::new(None, ikm);
    let mut okm = [0u8; 32];
    hk.expand(info, &mut okm).expect("must not fail");
    okm
}

/// Derives the cipher key and IV for `algo` from a passphrase and salt.
///
/// A single PBKDF2-HMAC-SHA256 block of `key_len + 16` bytes is produced
/// with [`PBKDF2_ROUNDS`] rounds; the key is the first `key_len` bytes and
/// the IV the 16 bytes after it.
pub fn derive_key_material(
    algo: CipherAlgo,
    passphrase: &str,
    salt: &[u8],
) -> Result<KeyMaterial, KeyDerivationError> {
    let key_len = algo.key_len();
    let mut block = vec![0u8; key_len + IV_LEN];
    derive_bytes(passphrase, salt, &mut block)?;
    let key = block[..key_len].to_vec();
    let iv = ByteArray16::try_from(&block[key_len..]).expect("must not fail");
    Ok(KeyMaterial { algo, key, iv })
}

/// Derives the keyed digest key from a passphrase and salt.
///
/// The 48-byte PBKDF2 master block is expanded through HKDF-SHA256 under a
/// constant label, so the digest key never shares bytes with any cipher key
/// derived from the same passphrase.
pub fn derive_mac_key(
    passphrase: &str,
    salt: &[u8],
) -> Result<ByteArray32, KeyDerivationError> {
    let mut master = [0u8; 48];
    derive_bytes(passphrase, salt, &mut master)?;
    Ok(ByteArray32::from(expand_subkey(&master, MAC_KEY_INFO)))
}
