use std::path::Path;

use anyhow::ensure;
use sealbox_common::cipher::aes_cbc;
use sealbox_common::digest::{self, DigestAlgo};
use sealbox_common::signing;
use sealbox_types::byte_array::ByteArray16;

use crate::settings::Settings;

pub fn encrypt(settings: &Settings, src: &Path, dst: &Path) -> Result<(), anyhow::Error> {
    let material = settings.key_material()?;
    let written = aes_cbc::encrypt_file(&material, src, dst)?;
    log::info!("encrypted {src:?} -> {dst:?}, {written} bytes");
    Ok(())
}

pub fn decrypt(settings: &Settings, src: &Path, dst: &Path) -> Result<(), anyhow::Error> {
    let material = settings.key_material()?;
    let written = aes_cbc::decrypt_file(&material, src, dst)?;
    log::info!("decrypted {src:?} -> {dst:?}, {written} bytes");
    Ok(())
}

pub fn digest(
    settings: &Settings,
    file: &Path,
    algo: DigestAlgo,
    keyed: bool,
) -> Result<(), anyhow::Error> {
    if keyed {
        ensure!(
            algo == DigestAlgo::Sha256,
            "keyed digests always use HMAC-SHA256, --algo does not apply"
        );
        let tag = digest::keyed_digest_file(settings.passphrase()?, settings.salt()?, file)?;
        println!("{tag}");
    } else {
        let digest = digest::digest_file(algo, file)?;
        println!("{digest}");
    }
    Ok(())
}

pub fn keygen(key_file: &Path) -> Result<(), anyhow::Error> {
    let (secret_key, public_key) = signing::generate_keypair();
    signing::save_secret_key(key_file, &secret_key)?;
    log::info!("new signing key saved to {key_file:?}");
    println!("{public_key}");
    Ok(())
}

pub fn sign(file: &Path, key: &Path, sig: Option<&Path>) -> Result<(), anyhow::Error> {
    let secret_key = signing::load_secret_key(key)?;
    let signature_file = signing::sign_file(&secret_key, file)?;

    let sig_path = match sig {
        Some(sig) => sig.to_owned(),
        None => signing::signature_path(file),
    };
    signing::write_signature_file(&sig_path, &signature_file)?;
    log::info!("signed {file:?}, signature saved to {sig_path:?}");
    println!("{}", signature_file.signature);
    Ok(())
}

pub fn verify(file: &Path, sig: Option<&Path>) -> Result<(), anyhow::Error> {
    let sig_path = match sig {
        Some(sig) => sig.to_owned(),
        None => signing::signature_path(file),
    };
    let signature_file = signing::read_signature_file(&sig_path)?;

    if signing::verify_file(&signature_file, file)? {
        println!("OK");
        Ok(())
    } else {
        println!("FAILED");
        std::process::exit(1);
    }
}

pub fn gen_salt() -> Result<(), anyhow::Error> {
    let salt = rand::random::<ByteArray16>();
    println!("{salt}");
    Ok(())
}
