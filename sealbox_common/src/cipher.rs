pub trait Cipher {
    type Error: std::error::Error + 'static;

    fn encrypt(&mut self, data: &[u8]) -> Vec<u8>;

    fn decrypt(&mut self, data: &[u8]) -> Result<Vec<u8>, Self::Error>;
}

pub mod aes_cbc;

/// Block cipher selection. All supported ciphers use 16-byte blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherAlgo {
    Aes256Cbc,
    Aes128Cbc,
}

impl CipherAlgo {
    pub fn key_len(&self) -> usize {
        match self {
            CipherAlgo::Aes256Cbc => 32,
            CipherAlgo::Aes128Cbc => 16,
        }
    }
}

impl Default for CipherAlgo {
    fn default() -> Self {
        CipherAlgo::Aes256Cbc
    }
}

impl std::fmt::Display for CipherAlgo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            CipherAlgo::Aes256Cbc => "aes256-cbc",
            CipherAlgo::Aes128Cbc => "aes128-cbc",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown cipher: {0}")]
pub struct UnknownCipherError(String);

impl std::str::FromStr for CipherAlgo {
    type Err = UnknownCipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aes256-cbc" => Ok(CipherAlgo::Aes256Cbc),
            "aes128-cbc" => Ok(CipherAlgo::Aes128Cbc),
            _ => Err(UnknownCipherError(s.to_owned())),
        }
    }
}

impl<'de> serde::Deserialize<'de> for CipherAlgo {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests;
