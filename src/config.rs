use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

/// Relay used when the config file does not name one.
pub const DEFAULT_CONTACT_ENDPOINT: &str = "https://formspree.io/f/YOUR_FORM_ID";

/// On-disk settings. Deliberately no API key field: the completion
/// credential lives only in memory for the session.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub contact_endpoint: Option<String>,
    pub studio_email: Option<String>,
    pub instagram: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            contact_endpoint: None,
            studio_email: Some("mustafabarood06@gmail.com".to_string()),
            instagram: Some("@shot_by_mustafa".to_string()),
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn contact_endpoint(&self) -> &str {
        self.contact_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_CONTACT_ENDPOINT)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("studio-assistant").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::new();
        config.contact_endpoint = Some("https://formspree.io/f/abc123".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(
            loaded.contact_endpoint.as_deref(),
            Some("https://formspree.io/f/abc123")
        );
        assert_eq!(loaded.studio_email, config.studio_email);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config.contact_endpoint, None);
        assert_eq!(config.contact_endpoint(), DEFAULT_CONTACT_ENDPOINT);
    }

    #[test]
    fn config_never_serializes_a_credential() {
        let json = serde_json::to_value(Config::new()).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert!(keys.iter().all(|k| !k.to_lowercase().contains("key")));
        assert!(keys.iter().all(|k| !k.to_lowercase().contains("credential")));
    }
}
