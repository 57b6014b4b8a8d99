use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_kits_dir")]
    pub kits_dir: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir(), kits_dir: default_kits_dir(), extension: default_extension() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { format: default_log_format() } }
}

fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_kits_dir() -> String { "kits".to_string() }
fn default_extension() -> String { "yml".to_string() }
fn default_log_format() -> String { "compact".to_string() }

/// Path of the config file: `CONFIG_PATH` or `config.toml`.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Load and validate `path`, using defaults only when the file does not exist.
    ///
    /// The flag is `true` when defaults were used. Unreadable, unparsable or
    /// invalid files are errors.
    pub fn load_or_default_from(path: &str) -> Result<(Self, bool)> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if e.downcast_ref::<std::io::Error>().is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound) => {
                return Ok((Self::default(), true));
            }
            Err(e) => return Err(e.context(format!("loading config {path}"))),
        };
        cfg.normalize_and_validate().map_err(|e| e.context(format!("invalid config {path}")))?;
        Ok((cfg, false))
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.storage.normalize()?;
        self.logging.normalize();
        Ok(())
    }
}

impl StorageConfig {
    /// Directory holding one file per owner.
    pub fn kits_path(&self) -> PathBuf {
        self.data_dir.join(&self.kits_dir)
    }

    fn normalize(&mut self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            self.data_dir = default_data_dir();
        }

        let kits_dir = self.kits_dir.trim();
        if kits_dir.is_empty() {
            self.kits_dir = default_kits_dir();
        } else {
            let p = Path::new(kits_dir);
            if p.is_absolute() || p.components().any(|c| matches!(c, Component::ParentDir)) {
                return Err(anyhow!("storage.kits_dir must be a relative path inside data_dir: {kits_dir}"));
            }
            self.kits_dir = kits_dir.to_string();
        }

        let ext = self.extension.trim().trim_start_matches('.');
        if ext.is_empty() {
            return Err(anyhow!("storage.extension must not be empty"));
        }
        if ext.contains(|c| c == '/' || c == '\\') {
            return Err(anyhow!("storage.extension must not contain path separators: {ext}"));
        }
        self.extension = ext.to_string();
        Ok(())
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        let f = self.format.trim().to_ascii_lowercase();
        self.format = if f.is_empty() { default_log_format() } else { f };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() -> Result<()> {
        let mut cfg: AppConfig = toml::from_str("")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.storage.kits_path(), PathBuf::from("data").join("kits"));
        assert_eq!(cfg.storage.extension, "yml");
        assert_eq!(cfg.logging.format, "compact");
        Ok(())
    }

    #[test]
    fn extension_leading_dot_is_stripped() -> Result<()> {
        let mut cfg: AppConfig = toml::from_str("[storage]\nextension = \".yaml\"\n")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.storage.extension, "yaml");
        Ok(())
    }

    #[test]
    fn rejects_escaping_kits_dir() -> Result<()> {
        let mut cfg: AppConfig = toml::from_str("[storage]\nkits_dir = \"../elsewhere\"\n")?;
        assert!(cfg.normalize_and_validate().is_err());
        Ok(())
    }

    #[test]
    fn rejects_blank_extension() -> Result<()> {
        let mut cfg: AppConfig = toml::from_str("[storage]\nextension = \" . \"\n")?;
        assert!(cfg.normalize_and_validate().is_err());
        Ok(())
    }

    #[test]
    fn missing_file_falls_back_to_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("absent.toml");
        let (cfg, defaulted) = AppConfig::load_or_default_from(path.to_str().ok_or_else(|| anyhow!("non-utf8 path"))?)?;
        assert!(defaulted);
        assert_eq!(cfg.storage.kits_path(), PathBuf::from("data").join("kits"));
        Ok(())
    }

    #[test]
    fn invalid_or_unparsable_file_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let escaping = dir.path().join("escaping.toml");
        std::fs::write(&escaping, "[storage]\ndata_dir = \"/srv/plugin\"\nkits_dir = \"../escape\"\n")?;
        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[storage\ndata_dir = \n")?;

        for path in [&escaping, &broken] {
            let path = path.to_str().ok_or_else(|| anyhow!("non-utf8 path"))?;
            assert!(AppConfig::load_or_default_from(path).is_err(), "{path} should be rejected");
        }
        Ok(())
    }

    #[test]
    fn load_from_file_reads_sections() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\ndata_dir = \"plugins/CustomKitDuels\"\n\n[logging]\nformat = \"JSON\"\n",
        )?;
        let mut cfg = load_from_file(path.to_str().ok_or_else(|| anyhow!("non-utf8 path"))?)?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.storage.kits_path(), PathBuf::from("plugins/CustomKitDuels/kits"));
        assert_eq!(cfg.logging.format, "json");
        Ok(())
    }
}
