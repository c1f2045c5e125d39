use std::path::{Path, PathBuf};

use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, SecretKey, SECP256K1};
use serde::{Deserialize, Serialize};

use sealbox_types::str_encoded::StrEncoded;

use crate::digest::{digest_file, DigestAlgo};
use crate::fs_helpers;

#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("signature error: {0}")]
    Secp(#[from] secp256k1::Error),
    #[error("invalid signature file: {0}")]
    InvalidSignatureFile(#[from] serde_json::Error),
}

/// Detached ECDSA signature over the SHA-256 digest of a file, stored as
/// JSON next to the file it signs.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignatureFile {
    pub public_key: StrEncoded<PublicKey>,
    pub signature: StrEncoded<Signature>,
}

pub fn generate_keypair() -> (SecretKey, PublicKey) {
    let secret_key = SecretKey::new(&mut rand::thread_rng());
    let public_key = secret_key.public_key(SECP256K1);
    (secret_key, public_key)
}

pub fn save_secret_key(path: &Path, secret_key: &SecretKey) -> Result<(), std::io::Error> {
    let encoded = format!("{}\n", secret_key.display_secret());
    fs_helpers::write_atomically(path, encoded.as_bytes())
}

pub fn load_secret_key(path: &Path) -> Result<SecretKey, SignError> {
    let encoded = std::fs::read_to_string(path)?;
    Ok(encoded.trim().parse()?)
}

fn file_message(path: &Path) -> Result<Message, SignError> {
    let digest = digest_file(DigestAlgo::Sha256, path)?;
    let digest = <[u8; 32]>::try_from(digest.as_ref()).expect("must not fail");
    Ok(Message::from_digest(digest))
}

pub fn sign_file(secret_key: &SecretKey, path: &Path) -> Result<SignatureFile, SignError> {
    let message = file_message(path)?;
    let signature = SECP256K1.sign_ecdsa(&message, secret_key);
    log::debug!("signed {path:?}");
    Ok(SignatureFile {
        public_key: secret_key.public_key(SECP256K1).into(),
        signature: signature.into(),
    })
}

/// Returns false if the signature does not match the file or the key, and
/// an error only when the file can't be read or the inputs are malformed.
pub fn verify_file(signature_file: &SignatureFile, path: &Path) -> Result<bool, SignError> {
    let message = file_message(path)?;
    let res = SECP256K1.verify_ecdsa(
        &message,
        signature_file.signature.as_ref(),
        signature_file.public_key.as_ref(),
    );
    match res {
        Ok(()) => Ok(true),
        Err(secp256k1::Error::IncorrectSignature) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Default signature file name, `<file>.sig` next to the signed file.
pub fn signature_path(path: &Path) -> PathBuf {
    let mut file_name = path.as_os_str().to_owned();
    file_name.push(".sig");
    file_name.into()
}

pub fn write_signature_file(
    path: &Path,
    signature_file: &SignatureFile,
) -> Result<(), SignError> {
    let data = serde_json::to_string(signature_file)?;
    fs_helpers::write_atomically(path, data.as_bytes())?;
    Ok(())
}

pub fn read_signature_file(path: &Path) -> Result<SignatureFile, SignError> {
    let data = std::fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}
