pub mod app;
pub mod barrier;
pub mod events;
pub mod frame_clock;
pub mod registry;
pub mod scheduler;
pub mod scope;
pub mod storage;

/// Phases a sketch moves through from construction to its animation loop.
///
/// `Looping` is not terminal in the sense of ending work; it persists for
/// the life of the hosting process. There is no stopped phase: disabling
/// looping freezes the draw driver while frame counting and all instance
/// state remain live.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LifecyclePhase {
    Constructing,
    AwaitingHostReady,
    Preloading,
    SettingUp,
    Looping,
}
