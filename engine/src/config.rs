use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use color_eyre::{
    Result,
    eyre::{WrapErr as _, eyre},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    error::GenerateError,
    gemini::gemini_api::{DEFAULT_ENDPOINT, DEFAULT_MODEL},
};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
const SETTINGS_FILE: &str = "gemini_imagen.ron";

/// Credential for the generation service. Read once at startup and handed to
/// the client explicitly.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn from_env() -> Result<Self, GenerateError> {
        Self::from_value(std::env::var(API_KEY_VAR).ok())
    }

    /// An unset and an empty variable are treated the same.
    pub fn from_value(value: Option<String>) -> Result<Self, GenerateError> {
        match value {
            Some(key) if !key.trim().is_empty() => Ok(Self(key)),
            _ => Err(GenerateError::MissingCredential),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub model: String,
    pub endpoint: String,
    /// Send the requested size as `imageConfig.imageSize`. Only enable for
    /// models that accept an image config.
    pub send_image_size: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            send_image_size: false,
        }
    }
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(dirs::config_local_dir()
        .ok_or(eyre!("Couldn't get config dir"))?
        .join(SETTINGS_FILE))
}

/// Loads settings from `path`, or from the default location when no path is
/// given. Only the default location may be absent.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => load_ron_file(path),
        None => {
            let path = settings_path()?;
            if !path.exists() {
                Ok(Settings::default())
            } else {
                load_ron_file(&path)
            }
        }
    }
}

pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let src = fs::read_to_string(path)
        .wrap_err_with(|| format!("Couldn't read {}", path.display()))?;
    ron::from_str(&src).wrap_err_with(|| format!("Invalid settings in {}", path.display()))
}
