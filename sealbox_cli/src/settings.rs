use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use sealbox_common::cipher::CipherAlgo;
use sealbox_common::kdf::{self, KeyMaterial};

#[derive(Default, Deserialize)]
pub struct Settings {
    pub passphrase: Option<String>,

    pub salt: Option<String>,

    #[serde(default)]
    pub cipher: CipherAlgo,
}

/// Loads settings from the config file (if set) with `APP_*` environment
/// variables merged on top.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings, anyhow::Error> {
    let mut conf = config::Config::new();
    if let Some(path) = config_path {
        let path = path.to_str().context("invalid config path")?;
        conf.merge(config::File::with_name(path))?;
    }
    conf.merge(config::Environment::with_prefix("app").separator("_"))?;
    let settings = conf.try_into::<Settings>()?;
    Ok(settings)
}

impl Settings {
    pub fn override_with(
        &mut self,
        passphrase: Option<String>,
        salt: Option<String>,
        cipher: Option<CipherAlgo>,
    ) {
        if passphrase.is_some() {
            self.passphrase = passphrase;
        }
        if salt.is_some() {
            self.salt = salt;
        }
        if let Some(cipher) = cipher {
            self.cipher = cipher;
        }
    }

    pub fn passphrase(&self) -> Result<&str, anyhow::Error> {
        self.passphrase.as_deref().context(
            "passphrase is not set, pass --passphrase, set APP_PASSPHRASE or add it to the config file",
        )
    }

    pub fn salt(&self) -> Result<&[u8], anyhow::Error> {
        let salt = self
            .salt
            .as_deref()
            .context("salt is not set, pass --salt, set APP_SALT or add it to the config file")?;
        Ok(salt.as_bytes())
    }

    pub fn key_material(&self) -> Result<KeyMaterial, anyhow::Error> {
        let material = kdf::derive_key_material(self.cipher, self.passphrase()?, self.salt()?)?;
        Ok(material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_load() {
        assert!(serde_json::from_str::<Settings>("{}").is_ok());
    }

    #[test]
    fn test_overrides() {
        let mut settings = Settings::default();
        settings.override_with(Some("pass".to_owned()), None, Some(CipherAlgo::Aes128Cbc));
        assert_eq!(settings.passphrase.as_deref(), Some("pass"));
        assert!(settings.salt.is_none());
        assert_eq!(settings.cipher, CipherAlgo::Aes128Cbc);

        settings.override_with(None, Some("salt".to_owned()), None);
        assert_eq!(settings.passphrase.as_deref(), Some("pass"));
        assert_eq!(settings.salt.as_deref(), Some("salt"));
        assert_eq!(settings.cipher, CipherAlgo::Aes128Cbc);
    }

    #[test]
    fn test_config_merge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "passphrase = \"SecretPassword\"\ncipher = \"aes128-cbc\"\n")
            .unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.passphrase.as_deref(), Some("SecretPassword"));
        assert!(settings.salt.is_none());
        assert_eq!(settings.cipher, CipherAlgo::Aes128Cbc);

        // Environment wins over the file, keys it does not set stay file-loaded
        std::env::set_var("APP_PASSPHRASE", "FromEnv");
        let settings = load_settings(Some(&path)).unwrap();
        std::env::remove_var("APP_PASSPHRASE");
        assert_eq!(settings.passphrase.as_deref(), Some("FromEnv"));
        assert!(settings.salt.is_none());
        assert_eq!(settings.cipher, CipherAlgo::Aes128Cbc);
    }

    #[test]
    fn test_missing_values() {
        let settings = Settings::default();
        assert!(settings.passphrase().is_err());
        assert!(settings.key_material().is_err());
    }

    #[test]
    fn test_key_material() {
        let mut settings = Settings::default();
        settings.override_with(
            Some("SecretPassword".to_owned()),
            Some("SecretSalt".to_owned()),
            None,
        );
        let material = settings.key_material().unwrap();
        assert_eq!(material.algo, CipherAlgo::Aes256Cbc);
        assert_eq!(material.key.len(), 32);
    }
}
