pub use crate::assets::{
    Asset, AssetKind, AssetLoader, FileLoader, ImageAsset, LoadOutcome,
    LoadRequest, LoadToken,
};
pub use crate::context::{Context, props};
pub use crate::core::logging::init_logger;
pub use crate::core::logging::{debug, error, info, trace, warn};
pub use crate::input::{InputEvent, InputKind, PointerButton};
pub use crate::runtime::LifecyclePhase;
pub use crate::runtime::app::{PreloadScope, SketchRuntime};
pub use crate::runtime::barrier::{GateEvent, PreloadGate};
pub use crate::runtime::events::{
    RuntimeCommand, RuntimeCommandReceiver, RuntimeCommandSender,
    RuntimeEvent, RuntimeEventReceiver, RuntimeEventSender, command_channel,
    event_channel,
};
pub use crate::runtime::frame_clock::{FrameClock, interval_for};
pub use crate::runtime::registry::SketchRegistry;
pub use crate::runtime::scope::{BehaviorHandle, ScopeValue};
pub use crate::runtime::storage::RuntimeSettings;
pub use crate::sketch::{
    Behavior, DEFAULT_FRAME_RATE, Mode, SketchBinding, SketchConfig,
};
pub use crate::surface::{
    RasterSurface, RasterSurfaceFactory, Rgba, Surface, SurfaceFactory,
    Transform2D, write_png,
};
