use easel::prelude::*;
use easel::runtime::storage;

mod sketches;
use sketches::{orbit, pulse};

fn main() {
    init_logger();
    bootstrap_settings();

    let mut registry = SketchRegistry::new();

    let registered = registry
        .register(&pulse::SKETCH_CONFIG, pulse::init)
        .and_then(|_| registry.register(&orbit::SKETCH_CONFIG, orbit::init));

    if let Err(err) = registered {
        eprintln!("easel sketch registry failed: {}", err);
        std::process::exit(1);
    }

    let initial_sketch = std::env::args().nth(1);
    if let Err(err) = run_sketch(&registry, initial_sketch.as_deref()) {
        eprintln!("easel runtime failed: {}", err);
        std::process::exit(1);
    }
}

fn run_sketch(
    registry: &SketchRegistry,
    requested: Option<&str>,
) -> Result<(), String> {
    let name = registry.resolve(requested)?;
    let (config, binding) = registry.instantiate(&name)?;

    info!("starting sketch '{}'", config.display_name);

    let mut runtime = SketchRuntime::new(config, binding)?;
    runtime.run()
}

fn bootstrap_settings() {
    if let Ok(None) = storage::load_settings_if_exists() {
        if let Err(err) = storage::save_settings(&RuntimeSettings::default())
        {
            warn!("could not persist default settings: {}", err);
        }
    }
}
