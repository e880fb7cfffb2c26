use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use directories_next::{BaseDirs, UserDirs};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::sketch::DEFAULT_FRAME_RATE;

pub const RUNTIME_SETTINGS_VERSION: &str = "1";

/// Host-level settings persisted between runs: where assets live and the
/// defaults applied when a sketch config leaves a field unset.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub version: String,
    pub assets_dir: String,
    pub default_frame_rate: f32,
    pub default_width: u32,
    pub default_height: u32,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            version: RUNTIME_SETTINGS_VERSION.to_string(),
            assets_dir: default_assets_dir(),
            default_frame_rate: DEFAULT_FRAME_RATE,
            default_width: 640,
            default_height: 480,
        }
    }
}

pub fn config_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|base| base.config_dir().join("Easel"))
}

/// Assets resolve under the user's documents directory by default, with the
/// home directory and finally the working directory as fallbacks.
pub fn default_assets_dir() -> String {
    let primary = UserDirs::new().and_then(|ud| {
        ud.document_dir().map(|p| p.to_path_buf().join("Easel"))
    });

    let fallback = BaseDirs::new()
        .map(|bd| bd.home_dir().to_path_buf().join("Easel").join("Assets"));

    primary
        .or(fallback)
        .unwrap_or_else(|| {
            warn!("could not determine an assets directory; using ./assets");
            PathBuf::from("assets")
        })
        .to_string_lossy()
        .into_owned()
}

fn settings_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("runtime_settings.json"))
}

pub fn load_settings_if_exists() -> Result<Option<RuntimeSettings>, String> {
    let Some(path) = settings_path() else {
        return Ok(None);
    };

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(format!(
                "failed to read '{}': {}",
                path.display(),
                err
            ));
        }
    };

    let settings = serde_json::from_str(&raw).map_err(|err| {
        format!("invalid settings in '{}': {}", path.display(), err)
    })?;

    Ok(Some(settings))
}

pub fn save_settings(settings: &RuntimeSettings) -> Result<(), String> {
    let Some(path) = settings_path() else {
        return Err("could not determine a config directory".to_string());
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            format!("failed to create '{}': {}", parent.display(), err)
        })?;
    }

    let raw = serde_json::to_string_pretty(settings)
        .map_err(|err| format!("failed to serialize settings: {}", err))?;

    fs::write(&path, raw)
        .map_err(|err| format!("failed to write '{}': {}", path.display(), err))
}
