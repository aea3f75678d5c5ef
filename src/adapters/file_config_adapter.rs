//! INI file configuration adapter.
//!
//! Section and key names are case-insensitive. Values are trimmed and a
//! trailing `; comment` or `# comment` is dropped before parsing.

use crate::domain::error::RsrsError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct FileConfigAdapter {
    ini: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RsrsError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| RsrsError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { ini })
    }

    pub fn from_string(content: &str) -> Result<Self, RsrsError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| RsrsError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { ini })
    }

    fn value(&self, section: &str, key: &str) -> Option<String> {
        let raw = self.ini.get(section, key)?;
        let value = match raw.find([';', '#']) {
            Some(idx) if idx > 0 && raw[..idx].ends_with(char::is_whitespace) => &raw[..idx],
            _ => raw.as_str(),
        };
        Some(value.trim().to_string())
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.value(section, key)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.value(section, key)
            .and_then(|v| Self::parse_bool(&v))
            .unwrap_or(default)
    }
}
