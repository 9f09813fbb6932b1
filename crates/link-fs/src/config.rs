//! Config files whose format follows their extension

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, NormalizedPath, Result, io};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
}

impl Format {
    fn of(path: &NormalizedPath) -> Result<Self> {
        let extension = path.extension().unwrap_or("").to_ascii_lowercase();
        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }

    fn name(self) -> String {
        match self {
            Self::Toml => "TOML".into(),
            Self::Json => "JSON".into(),
        }
    }
}

/// Loads and saves serde values as `.toml` or `.json` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let format = Format::of(path)?;
        let content = io::read_text(path)?;
        let parsed = match format {
            Format::Toml => toml::from_str(&content).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| Error::ConfigParse {
            path: path.to_native(),
            format: format.name(),
            message,
        })
    }

    /// Like [`load`](Self::load), but a missing file is `Ok(None)`.
    pub fn load_optional<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<Option<T>> {
        if !path.to_native().is_file() {
            tracing::debug!(path = %path, "No config file");
            return Ok(None);
        }
        self.load(path).map(Some)
    }

    /// Serialize `value` and replace the file in one rename.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let format = Format::of(path)?;
        let rendered = match format {
            Format::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
            Format::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
        };
        let content = rendered.map_err(|message| Error::ConfigSerialize {
            path: path.to_native(),
            format: format.name(),
            message,
        })?;
        io::write_atomic(path, content.as_bytes())
    }
}
