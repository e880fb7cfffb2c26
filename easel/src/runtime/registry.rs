use log::warn;

use crate::core::util::HashMap;
use crate::sketch::{SketchBinding, SketchConfig};

type SketchFactory = Box<dyn Fn() -> SketchBinding>;

pub struct SketchEntry {
    pub config: &'static SketchConfig,
    pub factory: SketchFactory,
}

/// Named sketch definitions a host can select from. Registration order is
/// preserved; the first-registered sketch is the fallback selection.
#[derive(Default)]
pub struct SketchRegistry {
    entries: HashMap<String, SketchEntry>,
    ordered_names: Vec<String>,
}

impl SketchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(
        &mut self,
        config: &'static SketchConfig,
        factory: F,
    ) -> Result<(), String>
    where
        F: Fn() -> SketchBinding + 'static,
    {
        let name = config.name.to_string();
        if self.entries.contains_key(&name) {
            return Err(format!("duplicate sketch registration: {}", name));
        }

        self.ordered_names.push(name.clone());
        self.entries.insert(
            name,
            SketchEntry {
                config,
                factory: Box::new(factory),
            },
        );

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SketchEntry> {
        self.entries.get(name)
    }

    pub fn sketch_names(&self) -> &[String] {
        &self.ordered_names
    }

    pub fn first_sketch_name(&self) -> Option<&str> {
        self.ordered_names.first().map(String::as_str)
    }

    /// Picks the requested sketch, falling back to the first registered one
    /// when the request is absent or unknown.
    pub fn resolve(&self, requested: Option<&str>) -> Result<String, String> {
        if let Some(requested) = requested {
            if self.entries.contains_key(requested) {
                return Ok(requested.to_string());
            }

            warn!(
                "requested sketch '{}' does not exist; falling back",
                requested
            );
        }

        self.first_sketch_name()
            .map(ToOwned::to_owned)
            .ok_or_else(|| "sketch registry is empty".to_string())
    }

    pub fn instantiate(
        &self,
        name: &str,
    ) -> Result<(&'static SketchConfig, SketchBinding), String> {
        let Some(entry) = self.entries.get(name) else {
            return Err(format!("sketch '{}' is not registered", name));
        };

        Ok((entry.config, (entry.factory)()))
    }
}
