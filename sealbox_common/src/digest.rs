use std::io::Read;
use std::path::Path;

use hmac::{Hmac, Mac};

use sealbox_types::byte_array::ByteArray32;

use crate::error::KeyDerivationError;
use crate::kdf;

const IO_CHUNK: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgo {
    Sha256,
    Sha512,
}

impl Default for DigestAlgo {
    fn default() -> Self {
        DigestAlgo::Sha256
    }
}

impl std::fmt::Display for DigestAlgo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DigestAlgo::Sha256 => write!(f, "sha256"),
            DigestAlgo::Sha512 => write!(f, "sha512"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown digest algorithm: {0}")]
pub struct UnknownDigestError(String);

impl std::str::FromStr for DigestAlgo {
    type Err = UnknownDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(DigestAlgo::Sha256),
            "sha512" => Ok(DigestAlgo::Sha512),
            _ => Err(UnknownDigestError(s.to_owned())),
        }
    }
}

/// Raw digest output, hex-encoded for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(pub Vec<u8>);

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("key derivation error: {0}")]
    Kdf(#[from] KeyDerivationError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn digest_reader<R: Read>(algo: DigestAlgo, src: R) -> Result<Digest, std::io::Error> {
    match algo {
        DigestAlgo::Sha256 => hash_reader::<sha2::Sha256, _>(src),
        DigestAlgo::Sha512 => hash_reader::<sha2::Sha512, _>(src),
    }
}

pub fn digest_file(algo: DigestAlgo, path: &Path) -> Result<Digest, std::io::Error> {
    let reader = std::io::BufReader::new(std::fs::File::open(path)?);
    let digest = digest_reader(algo, reader)?;
    log::debug!("{algo} of {path:?}: {digest}");
    Ok(digest)
}

fn hash_reader<D: sha2::Digest, R: Read>(mut src: R) -> Result<Digest, std::io::Error> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; IO_CHUNK];
    loop {
        let read = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        hasher.update(&buf[..read]);
    }
    Ok(Digest(hasher.finalize().to_vec()))
}

/// HMAC-SHA256 over the source under a key derived from the passphrase
/// and salt. Unlike a plain digest the tag can't be recomputed (or a
/// swapped file re-tagged) without the passphrase.
pub fn keyed_digest_reader<R: Read>(
    passphrase: &str,
    salt: &[u8],
    mut src: R,
) -> Result<ByteArray32, DigestError> {
    let mac_key = kdf::derive_mac_key(passphrase, salt)?;
    let mut mac = Hmac::<sha2::Sha256>::new_from_slice(&mac_key.0).expect("must not fail");
    let mut buf = vec![0u8; IO_CHUNK];
    loop {
        let read = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        mac.update(&buf[..read]);
    }
    let tag: [u8; 32] = mac.finalize().into_bytes().into();
    Ok(ByteArray32::from(tag))
}

pub fn keyed_digest_file(
    passphrase: &str,
    salt: &[u8],
    path: &Path,
) -> Result<ByteArray32, DigestError> {
    let reader = std::io::BufReader::new(std::fs::File::open(path)?);
    keyed_digest_reader(passphrase, salt, reader)
}
