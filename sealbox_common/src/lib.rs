pub mod cipher;
pub mod digest;
pub mod error;
pub mod fs_helpers;
pub mod kdf;
pub mod panic_handler;
pub mod signing;
