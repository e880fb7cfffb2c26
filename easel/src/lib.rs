pub mod assets;
#[path = "runtime/context.rs"]
pub mod context;
pub mod core;
pub mod input;
pub mod prelude;
pub mod runtime;
pub mod sketch;
pub mod surface;

pub use runtime::app::SketchRuntime;
