#[derive(Debug, thiserror::Error)]
pub enum KeyDerivationError {
    #[error("passphrase must not be empty")]
    EmptyPassphrase,
    #[error("salt must not be empty")]
    EmptySalt,
}

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("padding check failed, wrong key or corrupted data")]
    Padding,
    #[error("truncated ciphertext: {len} bytes, expected a positive multiple of the block length")]
    Truncated { len: u64 },
}
