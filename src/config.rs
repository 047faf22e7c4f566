//! Application configuration
//!
//! Defaults reproduce the stock catalog repository and room. A JSON file can
//! override any subset of fields, and `ROOM_ARRANGER_*` environment variables
//! are applied last.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value {value:?} for {key}")]
    Env { key: String, value: String },
}

/// Where the model catalog lives
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogSource {
    pub user: String,
    pub repo: String,
    pub branch: String,
    pub folder: String,
    pub api_base: String,
    pub raw_base: String,
    /// Local folder with model files; used instead of GitHub when set
    pub local_folder: Option<PathBuf>,
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self {
            user: "Tossengames".to_string(),
            repo: "3DRoom".to_string(),
            branch: "main".to_string(),
            folder: "models".to_string(),
            api_base: "https://api.github.com".to_string(),
            raw_base: "https://raw.githubusercontent.com".to_string(),
            local_folder: None,
        }
    }
}

impl CatalogSource {
    /// Download location of a model file when the listing did not provide one
    pub fn raw_url(&self, file: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}/{}",
            self.raw_base.trim_end_matches('/'),
            self.user,
            self.repo,
            self.branch,
            self.folder,
            file
        )
    }
}

/// Room dimensions in meters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoomDimensions {
    pub width: f32,
    pub length: f32,
    pub height: f32,
}

impl RoomDimensions {
    pub const DEFAULT: RoomDimensions = RoomDimensions {
        width: 10.0,
        length: 8.0,
        height: 3.0,
    };

    /// Builds dimensions from user input, falling back per field to the defaults
    /// when a value is missing, zero, negative or not a number.
    pub fn from_input(width: Option<f32>, length: Option<f32>, height: Option<f32>) -> Self {
        fn pick(value: Option<f32>, fallback: f32) -> f32 {
            match value {
                Some(v) if v.is_finite() && v > 0.0 => v,
                _ => fallback,
            }
        }

        Self {
            width: pick(width, Self::DEFAULT.width),
            length: pick(length, Self::DEFAULT.length),
            height: pick(height, Self::DEFAULT.height),
        }
    }

    /// Parses the three text fields of the room panel
    pub fn parse(width: &str, length: &str, height: &str) -> Self {
        let parse = |text: &str| text.trim().parse::<f32>().ok();
        Self::from_input(parse(width), parse(length), parse(height))
    }

    pub fn largest_side(&self) -> f32 {
        self.width.max(self.length)
    }
}

impl Default for RoomDimensions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Room Arranger 3D".to_string(),
            width: 1280,
            height: 800,
            vsync: true,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogSource,
    pub room: RoomDimensions,
    pub window: WindowConfig,
    /// Always show the touch stepper sheet, even before the first touch
    pub touch_controls: bool,
}

impl AppConfig {
    /// Reads a JSON config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Loads the optional config file, then applies environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(std::env::vars())?;
        Ok(config)
    }

    /// Applies `ROOM_ARRANGER_*` overrides from `(key, value)` pairs
    pub fn apply_overrides<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix("ROOM_ARRANGER_") else {
                continue;
            };
            match name {
                "GITHUB_USER" => self.catalog.user = value,
                "GITHUB_REPO" => self.catalog.repo = value,
                "GITHUB_BRANCH" => self.catalog.branch = value,
                "MODELS_FOLDER" => self.catalog.folder = value,
                "API_BASE" => self.catalog.api_base = value,
                "LOCAL_MODELS" => self.catalog.local_folder = Some(PathBuf::from(value)),
                "TOUCH_CONTROLS" => {
                    self.touch_controls = parse_flag(&value).ok_or(ConfigError::Env {
                        key: key.clone(),
                        value: value.clone(),
                    })?
                }
                _ => log::warn!("Ignoring unknown setting {}", key),
            }
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
