use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use aes::cipher::generic_array::typenum::Unsigned;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockCipher, BlockDecrypt, BlockEncrypt, NewBlockCipher};
use aes::{Aes128, Aes256};
use block_modes::block_padding::{Padding, Pkcs7};
use block_modes::{BlockMode, Cbc};

use crate::cipher::{Cipher, CipherAlgo};
use crate::error::TransformError;
use crate::fs_helpers;
use crate::kdf::KeyMaterial;

pub const BLOCK_LEN: usize = 16;

// Streaming buffer size, must be a multiple of the block length
const IO_CHUNK: usize = 64 * 1024;

/// In-memory AES-CBC transform under derived key material.
///
/// Every call runs a fresh transform with the stored key and IV, so
/// encrypting the same bytes twice produces the same ciphertext.
pub struct AesCbc {
    material: KeyMaterial,
}

impl AesCbc {
    pub fn new(material: KeyMaterial) -> Self {
        AesCbc { material }
    }
}

impl Cipher for AesCbc {
    type Error = TransformError;

    fn encrypt(&mut self, data: &[u8]) -> Vec<u8> {
        match self.material.algo {
            CipherAlgo::Aes256Cbc => new_mode::<Aes256>(&self.material).encrypt_vec(data),
            CipherAlgo::Aes128Cbc => new_mode::<Aes128>(&self.material).encrypt_vec(data),
        }
    }

    fn decrypt(&mut self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        if data.is_empty() || data.len() % BLOCK_LEN != 0 {
            return Err(TransformError::Truncated {
                len: data.len() as u64,
            });
        }
        let res = match self.material.algo {
            CipherAlgo::Aes256Cbc => new_mode::<Aes256>(&self.material).decrypt_vec(data),
            CipherAlgo::Aes128Cbc => new_mode::<Aes128>(&self.material).decrypt_vec(data),
        };
        res.map_err(|_| TransformError::Padding)
    }
}

fn new_mode<C>(material: &KeyMaterial) -> Cbc<C, Pkcs7>
where
    C: BlockCipher + BlockEncrypt + BlockDecrypt + NewBlockCipher,
{
    // Key and IV lengths are enforced by derive_key_material
    Cbc::new_from_slices(&material.key, &material.iv.0).expect("must not fail")
}

/// Encrypts everything from `src` into `dst` and flushes it. Returns the
/// number of ciphertext bytes written, always a positive multiple of the
/// block length.
pub fn encrypt_stream<R: Read, W: Write>(
    material: &KeyMaterial,
    src: R,
    dst: W,
) -> Result<u64, TransformError> {
    match material.algo {
        CipherAlgo::Aes256Cbc => encrypt_stream_impl::<Aes256, _, _>(material, src, dst),
        CipherAlgo::Aes128Cbc => encrypt_stream_impl::<Aes128, _, _>(material, src, dst),
    }
}

/// Decrypts everything from `src` into `dst` and flushes it. Returns the
/// number of plaintext bytes written.
///
/// The final block is held back until the source is exhausted so that the
/// padding can be validated; nothing is ever written past the real
/// plaintext length.
pub fn decrypt_stream<R: Read, W: Write>(
    material: &KeyMaterial,
    src: R,
    dst: W,
) -> Result<u64, TransformError> {
    match material.algo {
        CipherAlgo::Aes256Cbc => decrypt_stream_impl::<Aes256, _, _>(material, src, dst),
        CipherAlgo::Aes128Cbc => decrypt_stream_impl::<Aes128, _, _>(material, src, dst),
    }
}

fn encrypt_stream_impl<C, R, W>(
    material: &KeyMaterial,
    mut src: R,
    mut dst: W,
) -> Result<u64, TransformError>
where
    C: BlockCipher + BlockEncrypt + BlockDecrypt + NewBlockCipher,
    R: Read,
    W: Write,
{
    let block_len = C::BlockSize::USIZE;
    let mut mode = new_mode::<C>(material);

    let mut buf = vec![0u8; IO_CHUNK];
    let mut filled = 0;
    let mut written = 0u64;

    loop {
        let read = match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        filled += read;

        let whole = filled - filled % block_len;
        if whole == 0 {
            continue;
        }
        encrypt_buffer(&mut mode, &mut buf[..whole]);
        dst.write_all(&buf[..whole])?;
        written += whole as u64;

        buf.copy_within(whole..filled, 0);
        filled -= whole;
    }

    // Pad the trailing partial block; an empty input still produces one
    // padding-only block
    let mut tail = vec![0u8; block_len];
    tail[..filled].copy_from_slice(&buf[..filled]);
    let padded = Pkcs7::pad(&mut tail, filled, block_len).expect("must not fail");
    encrypt_buffer(&mut mode, padded);
    dst.write_all(padded)?;
    written += block_len as u64;

    dst.flush()?;
    Ok(written)
}

fn decrypt_stream_impl<C, R, W>(
    material: &KeyMaterial,
    mut src: R,
    mut dst: W,
) -> Result<u64, TransformError>
where
    C: BlockCipher + BlockEncrypt + BlockDecrypt + NewBlockCipher,
    R: Read,
    W: Write,
{
    let block_len = C::BlockSize::USIZE;
    let mut mode = new_mode::<C>(material);

    let mut buf = vec![0u8; IO_CHUNK];
    let mut filled = 0;
    let mut consumed = 0u64;
    let mut held: Option<Vec<u8>> = None;
    let mut written = 0u64;

    loop {
        let read = match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        filled += read;
        consumed += read as u64;

        let whole = filled - filled % block_len;
        if whole == 0 {
            continue;
        }
        decrypt_buffer(&mut mode, &mut buf[..whole]);
        if let Some(prev) = held.take() {
            dst.write_all(&prev)?;
            written += prev.len() as u64;
        }
        dst.write_all(&buf[..whole - block_len])?;
        written += (whole - block_len) as u64;
        held = Some(buf[whole - block_len..whole].to_vec());

        buf.copy_within(whole..filled, 0);
        filled -= whole;
    }

    if filled != 0 {
        return Err(TransformError::Truncated { len: consumed });
    }
    let last = match held {
        Some(last) => last,
        None => return Err(TransformError::Truncated { len: consumed }),
    };
    let plain = Pkcs7::unpad(&last).map_err(|_| TransformError::Padding)?;
    dst.write_all(plain)?;
    written += plain.len() as u64;

    dst.flush()?;
    Ok(written)
}

fn encrypt_buffer<C, P>(mode: &mut Cbc<C, P>, data: &mut [u8])
where
    C: BlockCipher + BlockEncrypt + BlockDecrypt,
    P: Padding,
{
    for chunk in data.chunks_exact_mut(C::BlockSize::USIZE) {
        let block = GenericArray::from_mut_slice(chunk);
        mode.encrypt_blocks(std::slice::from_mut(block));
    }
}

fn decrypt_buffer<C, P>(mode: &mut Cbc<C, P>, data: &mut [u8])
where
    C: BlockCipher + BlockEncrypt + BlockDecrypt,
    P: Padding,
{
    for chunk in data.chunks_exact_mut(C::BlockSize::USIZE) {
        let block = GenericArray::from_mut_slice(chunk);
        mode.decrypt_blocks(std::slice::from_mut(block));
    }
}

/// Encrypts `src` into `dst`, writing through a temporary file so a failed
/// run never leaves a partial file under the destination name.
pub fn encrypt_file(
    material: &KeyMaterial,
    src: &Path,
    dst: &Path,
) -> Result<u64, TransformError> {
    let written = transform_file(src, dst, |reader, writer| {
        encrypt_stream(material, reader, writer)
    })?;
    log::debug!("encrypted {src:?} -> {dst:?}, {written} bytes");
    Ok(written)
}

/// Decrypts `src` into `dst` with the same temporary file discipline as
/// [`encrypt_file`].
pub fn decrypt_file(
    material: &KeyMaterial,
    src: &Path,
    dst: &Path,
) -> Result<u64, TransformError> {
    let written = transform_file(src, dst, |reader, writer| {
        decrypt_stream(material, reader, writer)
    })?;
    log::debug!("decrypted {src:?} -> {dst:?}, {written} bytes");
    Ok(written)
}

fn transform_file<F>(src: &Path, dst: &Path, transform: F) -> Result<u64, TransformError>
where
    F: FnOnce(BufReader<File>, BufWriter<File>) -> Result<u64, TransformError>,
{
    let reader = BufReader::new(File::open(src)?);
    let dst_tmp = fs_helpers::tmp_path(dst);
    let writer = BufWriter::new(File::create(&dst_tmp)?);

    match transform(reader, writer) {
        Ok(written) => {
            if let Err(err) = std::fs::rename(&dst_tmp, dst) {
                let _ = std::fs::remove_file(&dst_tmp);
                return Err(err.into());
            }
            Ok(written)
        }
        Err(err) => {
            let _ = std::fs::remove_file(&dst_tmp);
            Err(err)
        }
    }
}
