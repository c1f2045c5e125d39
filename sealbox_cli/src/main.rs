use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sealbox_common::cipher::CipherAlgo;
use sealbox_common::digest::DigestAlgo;

mod commands;
mod logs;
mod settings;

/// Password-based file encryption, digests and signatures.
#[derive(Parser)]
#[clap(version, about)]
struct Cli {
    /// Path to the config file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    /// Passphrase for key derivation, overrides the config file
    #[clap(long, global = true)]
    passphrase: Option<String>,

    /// Key derivation salt, taken as literal bytes, overrides the config file
    #[clap(long, global = true)]
    salt: Option<String>,

    /// Cipher for encrypt and decrypt, aes256-cbc or aes128-cbc
    #[clap(long, global = true)]
    cipher: Option<CipherAlgo>,

    /// Write logs to this directory instead of stderr
    #[clap(long, global = true)]
    log_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encrypt a file with a key derived from the passphrase and salt
    Encrypt { src: PathBuf, dst: PathBuf },

    /// Decrypt a file encrypted with the same passphrase and salt
    Decrypt { src: PathBuf, dst: PathBuf },

    /// Print a file digest
    Digest {
        file: PathBuf,

        /// Digest algorithm, sha256 or sha512
        #[clap(long, default_value = "sha256")]
        algo: DigestAlgo,

        /// Keyed digest (HMAC-SHA256) under the passphrase and salt
        #[clap(long)]
        keyed: bool,
    },

    /// Generate a new signing key and print its public key
    Keygen { key_file: PathBuf },

    /// Sign a file with a key created by keygen
    Sign {
        file: PathBuf,

        /// Signing key file
        #[clap(long)]
        key: PathBuf,

        /// Signature file path, <file>.sig by default
        #[clap(long)]
        sig: Option<PathBuf>,
    },

    /// Check a file against a detached signature
    Verify {
        file: PathBuf,

        /// Signature file path, <file>.sig by default
        #[clap(long)]
        sig: Option<PathBuf>,
    },

    /// Print a fresh random salt
    GenSalt,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    logs::init(cli.log_dir.as_deref());

    sealbox_common::panic_handler::install_panic_handler();

    let mut settings = settings::load_settings(cli.config.as_deref())?;
    settings.override_with(cli.passphrase, cli.salt, cli.cipher);

    match cli.command {
        Command::Encrypt { src, dst } => commands::encrypt(&settings, &src, &dst),
        Command::Decrypt { src, dst } => commands::decrypt(&settings, &src, &dst),
        Command::Digest { file, algo, keyed } => commands::digest(&settings, &file, algo, keyed),
        Command::Keygen { key_file } => commands::keygen(&key_file),
        Command::Sign { file, key, sig } => commands::sign(&file, &key, sig.as_deref()),
        Command::Verify { file, sig } => commands::verify(&file, sig.as_deref()),
        Command::GenSalt => commands::gen_salt(),
    }
}
