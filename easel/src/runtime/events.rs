use std::sync::mpsc;
use std::sync::mpsc::{Receiver, Sender};

use super::LifecyclePhase;
use crate::assets::{AssetKind, LoadOutcome};
use crate::input::InputEvent;

#[derive(Clone, Debug, PartialEq)]
pub enum RuntimeCommand {
    BeginLoad(AssetKind, String),
    CreateSurface(u32, u32),
    HostReady,
    Input(InputEvent),
    InvokeBehavior(String),
    LoadFinished(LoadOutcome),
    Quit,
    Redraw,
    SetLooping(bool),
    SetTargetFrameRate(f32),
}

#[derive(Clone, Debug, PartialEq)]
pub enum RuntimeEvent {
    DrawCompleted(u64),
    DrawSkipped,
    FrameAdvanced(u64),
    PhaseChanged(LifecyclePhase),
    PreloadReleased,
    SetupComplete,
    Stopped,
}

pub type RuntimeCommandSender = Sender<RuntimeCommand>;
pub type RuntimeCommandReceiver = Receiver<RuntimeCommand>;
pub type RuntimeEventSender = Sender<RuntimeEvent>;
pub type RuntimeEventReceiver = Receiver<RuntimeEvent>;

pub fn command_channel() -> (RuntimeCommandSender, RuntimeCommandReceiver) {
    mpsc::channel()
}

pub fn event_channel() -> (RuntimeEventSender, RuntimeEventReceiver) {
    mpsc::channel()
}
