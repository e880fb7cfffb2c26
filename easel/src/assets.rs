use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::runtime::events::{RuntimeCommand, RuntimeCommandSender};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AssetKind {
    Text,
    Data,
    Markup,
    Image,
}

/// A loaded asset. Markup is delivered raw; interpreting it is the caller's
/// concern, the runtime only coordinates completion.
#[derive(Clone, Debug, PartialEq)]
pub enum Asset {
    Text(String),
    Data(Arc<serde_json::Value>),
    Markup(String),
    Image(ImageAsset),
}

/// RGBA8 pixels, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageAsset {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct LoadToken(pub u64);

/// A single in-flight load. `gated` marks requests issued during the preload
/// phase; only those count against the preload gate when they complete.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadRequest {
    pub token: LoadToken,
    pub kind: AssetKind,
    pub path: String,
    pub gated: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadOutcome {
    pub request: LoadRequest,
    pub result: Result<Asset, String>,
}

/// Asset-loading collaborator. Implementations start a load and later
/// deliver a `RuntimeCommand::LoadFinished` on the runtime's command queue;
/// they never hand the asset back synchronously. A loader that never
/// delivers an outcome for a gated request leaves the preload gate closed
/// forever, which is the specified stall behavior.
pub trait AssetLoader {
    fn begin_load(&mut self, request: &LoadRequest);
}

/// Filesystem-backed loader. Reads and decodes eagerly, but delivers the
/// outcome through the command queue so completion is always observed after
/// the issuing callback has returned.
pub struct FileLoader {
    assets_dir: PathBuf,
    commands: RuntimeCommandSender,
}

impl FileLoader {
    pub fn new(
        assets_dir: impl Into<PathBuf>,
        commands: RuntimeCommandSender,
    ) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            commands,
        }
    }

    /// Paths resolve as given when they point at an existing file, otherwise
    /// relative to the configured assets directory.
    fn resolve(&self, path: &str) -> PathBuf {
        let direct = PathBuf::from(path);
        if direct.is_file() {
            return direct;
        }

        self.assets_dir.join(path)
    }

    fn load(&self, request: &LoadRequest) -> Result<Asset, String> {
        let path = self.resolve(&request.path);

        match request.kind {
            AssetKind::Text => read_text(&path).map(Asset::Text),
            AssetKind::Markup => read_text(&path).map(Asset::Markup),
            AssetKind::Data => {
                let raw = read_text(&path)?;
                let value: serde_json::Value = serde_json::from_str(&raw)
                    .map_err(|err| {
                        format!("invalid data in '{}': {}", path.display(), err)
                    })?;
                Ok(Asset::Data(Arc::new(value)))
            }
            AssetKind::Image => read_image(&path).map(Asset::Image),
        }
    }
}

impl AssetLoader for FileLoader {
    fn begin_load(&mut self, request: &LoadRequest) {
        debug!("loading {:?} asset '{}'", request.kind, request.path);

        let outcome = LoadOutcome {
            request: request.clone(),
            result: self.load(request),
        };

        let _ = self.commands.send(RuntimeCommand::LoadFinished(outcome));
    }
}

fn read_text(path: &Path) -> Result<String, String> {
    fs::read_to_string(path)
        .map_err(|err| format!("failed to read '{}': {}", path.display(), err))
}

fn read_image(path: &Path) -> Result<ImageAsset, String> {
    let image = image::open(path).map_err(|err| {
        format!("failed to decode image '{}': {}", path.display(), err)
    })?;

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(ImageAsset {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}
