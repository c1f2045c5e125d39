use std::io::Cursor;

use hex_literal::hex;

use super::aes_cbc::{self, AesCbc};
use super::*;
use crate::error::TransformError;
use crate::kdf::{derive_key_material, KeyMaterial};

const PLAINTEXT: &[u8] = b"Encrypt me...";
const PLAINTEXT_LONG: &[u8] = b"The quick brown fox jumps over the lazy ";

// AES-256-CBC under the key material from kdf::tests::aes256_vector
const CIPHERTEXT: [u8; 16] = hex!("844ee9952f71076bb30955fc5585eef6");
const CIPHERTEXT_LONG: [u8; 48] = hex!(
    "ba12a688a9c3b7438dff7574310e5ff163bc368381b25ece0379992cbda73f81d5b00c4d46ec5de70a0ef3957a70d17e"
);

fn material() -> KeyMaterial {
    derive_key_material(CipherAlgo::Aes256Cbc, "SecretPassword", b"SecretSalt").unwrap()
}

fn material_128() -> KeyMaterial {
    derive_key_material(CipherAlgo::Aes128Cbc, "SecretPassword", b"SecretSalt").unwrap()
}

struct OneByteReader<R>(R);

impl<R: std::io::Read> std::io::Read for OneByteReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.0.read(&mut buf[..1])
    }
}

struct FailingReader {
    data: Cursor<Vec<u8>>,
    interrupts_left: u32,
    fail_at_end: bool,
}

impl std::io::Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.interrupts_left > 0 {
            self.interrupts_left -= 1;
            return Err(std::io::ErrorKind::Interrupted.into());
        }
        let read = self.data.read(buf)?;
        if read == 0 && self.fail_at_end {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "broken source"));
        }
        Ok(read)
    }
}

#[test]
fn aes256_vector() {
    let mut cipher = AesCbc::new(material());
    assert_eq!(cipher.encrypt(PLAINTEXT), CIPHERTEXT);
    assert_eq!(cipher.decrypt(&CIPHERTEXT).unwrap(), PLAINTEXT);

    assert_eq!(cipher.encrypt(PLAINTEXT_LONG), CIPHERTEXT_LONG);
    assert_eq!(cipher.decrypt(&CIPHERTEXT_LONG).unwrap(), PLAINTEXT_LONG);
}

#[test]
fn aes128_vector() {
    let mut cipher = AesCbc::new(material_128());
    let ciphertext = cipher.encrypt(PLAINTEXT);
    assert_eq!(ciphertext, hex!("eb82d4be94fe47ba5349043c89628b37"));
    assert_eq!(cipher.decrypt(&ciphertext).unwrap(), PLAINTEXT);
}

#[test]
fn empty_plaintext() {
    let mut cipher = AesCbc::new(material());
    let ciphertext = cipher.encrypt(b"");
    // Padding always adds a full block, even for empty input
    assert_eq!(ciphertext, hex!("8b22e1db39f221a63bea773ec56110f2"));
    assert_eq!(cipher.decrypt(&ciphertext).unwrap(), b"");
}

#[test]
fn aligned_plaintext() {
    let mut cipher = AesCbc::new(material());
    let ciphertext = cipher.encrypt(b"sixteen byte msg");
    assert_eq!(
        ciphertext,
        hex!("a986df16b8eb678373d07b070b22e249d1193aef26df625444c9ce802ce35177")
    );
    assert_eq!(cipher.decrypt(&ciphertext).unwrap(), b"sixteen byte msg");
}

#[test]
fn round_trip() {
    let mut cipher = AesCbc::new(material());
    for len in [0, 1, 15, 16, 17, 31, 32, 1000] {
        let plaintext = (0..len).map(|i| (i % 251) as u8).collect::<Vec<_>>();
        let ciphertext = cipher.encrypt(&plaintext);
        assert_eq!(ciphertext.len(), (len / 16 + 1) * 16);
        assert_eq!(cipher.decrypt(&ciphertext).unwrap(), plaintext);
    }
}

#[test]
fn plaintext_avalanche() {
    let mut cipher = AesCbc::new(material());
    let base = cipher.encrypt(PLAINTEXT);
    let changed = cipher.encrypt(b"Encrypt me..,");
    assert_ne!(base, changed);
}

#[test]
fn passphrase_avalanche() {
    let other =
        derive_key_material(CipherAlgo::Aes256Cbc, "SecretPassword2", b"SecretSalt").unwrap();
    let ciphertext = AesCbc::new(other).encrypt(PLAINTEXT);
    assert_ne!(ciphertext, CIPHERTEXT);
}

#[test]
fn wrong_passphrase() {
    let wrong =
        derive_key_material(CipherAlgo::Aes256Cbc, "WrongPassword", b"SecretSalt").unwrap();
    let mut cipher = AesCbc::new(wrong);
    assert!(matches!(
        cipher.decrypt(&CIPHERTEXT),
        Err(TransformError::Padding)
    ));
    assert!(matches!(
        cipher.decrypt(&CIPHERTEXT_LONG),
        Err(TransformError::Padding)
    ));
}

#[test]
fn wrong_salt() {
    let wrong =
        derive_key_material(CipherAlgo::Aes256Cbc, "SecretPassword", b"SecretSalt2").unwrap();
    let mut cipher = AesCbc::new(wrong);
    assert!(matches!(
        cipher.decrypt(&CIPHERTEXT),
        Err(TransformError::Padding)
    ));
}

#[test]
fn corrupted_final_block() {
    let mut cipher = AesCbc::new(material());
    for pos in 32..48 {
        let mut corrupted = CIPHERTEXT_LONG;
        corrupted[pos] ^= 0x01;
        assert!(
            matches!(cipher.decrypt(&corrupted), Err(TransformError::Padding)),
            "flip at {pos} was not detected"
        );
    }
}

#[test]
fn corrupted_padding_chain() {
    // Flips in the second half of the next-to-last block land in the
    // padding bytes of the recovered final block
    let mut cipher = AesCbc::new(material());
    for pos in 24..32 {
        let mut corrupted = CIPHERTEXT_LONG;
        corrupted[pos] ^= 0x01;
        assert!(
            matches!(cipher.decrypt(&corrupted), Err(TransformError::Padding)),
            "flip at {pos} was not detected"
        );
    }
}

#[test]
fn corrupted_data_block() {
    // Without a MAC, flips that never touch the recovered padding decrypt
    // "successfully" to corrupted plaintext
    let mut cipher = AesCbc::new(material());
    let mut corrupted = CIPHERTEXT_LONG;
    corrupted[16] ^= 0x01;
    let plaintext = cipher.decrypt(&corrupted).unwrap();
    assert_eq!(plaintext.len(), PLAINTEXT_LONG.len());
    assert_ne!(plaintext, PLAINTEXT_LONG);
}

#[test]
fn truncated_ciphertext() {
    let mut cipher = AesCbc::new(material());
    assert!(matches!(
        cipher.decrypt(b""),
        Err(TransformError::Truncated { len: 0 })
    ));
    assert!(matches!(
        cipher.decrypt(&CIPHERTEXT_LONG[..17]),
        Err(TransformError::Truncated { len: 17 })
    ));
    assert!(matches!(
        cipher.decrypt(&CIPHERTEXT_LONG[..47]),
        Err(TransformError::Truncated { len: 47 })
    ));
    // Cutting whole blocks moves the padding check onto a data block
    assert!(matches!(
        cipher.decrypt(&CIPHERTEXT_LONG[..32]),
        Err(TransformError::Padding)
    ));
}

#[test]
fn stream_matches_one_shot() {
    let plaintext = (0..200_000).map(|i| (i % 251) as u8).collect::<Vec<_>>();
    let one_shot = AesCbc::new(material()).encrypt(&plaintext);

    let mut streamed = Vec::new();
    let written =
        aes_cbc::encrypt_stream(&material(), Cursor::new(&plaintext), &mut streamed).unwrap();
    assert_eq!(written, streamed.len() as u64);
    assert_eq!(streamed, one_shot);

    let mut recovered = Vec::new();
    let written =
        aes_cbc::decrypt_stream(&material(), Cursor::new(&streamed), &mut recovered).unwrap();
    assert_eq!(written, recovered.len() as u64);
    assert_eq!(recovered, plaintext);
}

#[test]
fn stream_partial_reads() {
    let plaintext = (0..4096).map(|i| (i % 13) as u8).collect::<Vec<_>>();
    let one_shot = AesCbc::new(material()).encrypt(&plaintext);

    let mut streamed = Vec::new();
    aes_cbc::encrypt_stream(
        &material(),
        OneByteReader(Cursor::new(&plaintext)),
        &mut streamed,
    )
    .unwrap();
    assert_eq!(streamed, one_shot);

    let mut recovered = Vec::new();
    aes_cbc::decrypt_stream(
        &material(),
        OneByteReader(Cursor::new(&streamed)),
        &mut recovered,
    )
    .unwrap();
    assert_eq!(recovered, plaintext);
}

#[test]
fn stream_interrupted_reads() {
    let mut streamed = Vec::new();
    aes_cbc::encrypt_stream(
        &material(),
        FailingReader {
            data: Cursor::new(PLAINTEXT.to_vec()),
            interrupts_left: 3,
            fail_at_end: false,
        },
        &mut streamed,
    )
    .unwrap();
    assert_eq!(streamed, CIPHERTEXT);
}

#[test]
fn stream_io_error() {
    let res = aes_cbc::encrypt_stream(
        &material(),
        FailingReader {
            data: Cursor::new(PLAINTEXT.to_vec()),
            interrupts_left: 0,
            fail_at_end: true,
        },
        &mut Vec::new(),
    );
    assert!(matches!(res, Err(TransformError::Io(_))));
}

#[test]
fn stream_empty_input() {
    let mut streamed = Vec::new();
    let written =
        aes_cbc::encrypt_stream(&material(), Cursor::new(Vec::new()), &mut streamed).unwrap();
    assert_eq!(written, 16);
    assert_eq!(streamed, hex!("8b22e1db39f221a63bea773ec56110f2"));

    let mut recovered = Vec::new();
    let written =
        aes_cbc::decrypt_stream(&material(), Cursor::new(&streamed), &mut recovered).unwrap();
    assert_eq!(written, 0);
    assert!(recovered.is_empty());
}

#[test]
fn stream_truncated_input() {
    let res = aes_cbc::decrypt_stream(
        &material(),
        Cursor::new(&CIPHERTEXT_LONG[..17]),
        &mut Vec::new(),
    );
    assert!(matches!(res, Err(TransformError::Truncated { len: 17 })));

    let res = aes_cbc::decrypt_stream(&material(), Cursor::new(Vec::new()), &mut Vec::new());
    assert!(matches!(res, Err(TransformError::Truncated { len: 0 })));
}

#[test]
fn file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("input.txt");
    let encrypted = dir.path().join("input.enc");
    let recovered = dir.path().join("output.txt");

    let plaintext = (0..100_000).map(|i| (i % 7) as u8).collect::<Vec<_>>();
    std::fs::write(&src, &plaintext).unwrap();

    let written = aes_cbc::encrypt_file(&material(), &src, &encrypted).unwrap();
    assert_eq!(written, std::fs::metadata(&encrypted).unwrap().len());
    assert!(!crate::fs_helpers::tmp_path(&encrypted).exists());

    aes_cbc::decrypt_file(&material(), &encrypted, &recovered).unwrap();
    assert_eq!(std::fs::read(&recovered).unwrap(), plaintext);
}

#[test]
fn file_vector() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("OrgText.txt");
    let encrypted = dir.path().join("Encrypted.enc");
    let decrypted = dir.path().join("Decrypted.txt");

    std::fs::write(&src, PLAINTEXT).unwrap();
    aes_cbc::encrypt_file(&material(), &src, &encrypted).unwrap();
    assert_eq!(std::fs::read(&encrypted).unwrap(), CIPHERTEXT);

    aes_cbc::decrypt_file(&material(), &encrypted, &decrypted).unwrap();
    assert_eq!(std::fs::read(&decrypted).unwrap(), PLAINTEXT);
}

#[test]
fn file_decrypt_failure_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("garbage.enc");
    let dst = dir.path().join("output.txt");

    std::fs::write(&src, b"not a whole block").unwrap();
    let res = aes_cbc::decrypt_file(&material(), &src, &dst);
    assert!(matches!(res, Err(TransformError::Truncated { .. })));
    assert!(!dst.exists());
    assert!(!crate::fs_helpers::tmp_path(&dst).exists());
}

#[test]
fn file_missing_source() {
    let dir = tempfile::tempdir().unwrap();
    let res = aes_cbc::encrypt_file(
        &material(),
        &dir.path().join("no-such-file"),
        &dir.path().join("out.enc"),
    );
    assert!(matches!(res, Err(TransformError::Io(_))));
}

#[test]
fn cipher_algo_strings() {
    assert_eq!(CipherAlgo::Aes256Cbc.to_string(), "aes256-cbc");
    assert_eq!("aes128-cbc".parse::<CipherAlgo>().unwrap(), CipherAlgo::Aes128Cbc);
    assert!("des".parse::<CipherAlgo>().is_err());
    assert_eq!(CipherAlgo::default(), CipherAlgo::Aes256Cbc);
}
