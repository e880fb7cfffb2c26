use std::time::Instant;

use indexmap::IndexMap;
use log::warn;

use crate::assets::{Asset, AssetKind};
use crate::runtime::events::{RuntimeCommand, RuntimeCommandSender};
use crate::runtime::scope::{self, ScopeValue};
use crate::sketch::Mode;

/// Mirrored property names. User code written against the ambient scope
/// reads these exact keys, so they are part of the public surface.
pub mod props {
    pub const FRAME_COUNT: &str = "frame_count";
    pub const TARGET_FRAME_RATE: &str = "target_frame_rate";
    pub const MEASURED_FRAME_RATE: &str = "measured_frame_rate";
    pub const AVERAGE_FRAME_RATE: &str = "average_frame_rate";
    pub const LOOPING: &str = "looping";
    pub const PRELOAD_PENDING: &str = "preload_pending";
    pub const MODE: &str = "mode";
}

/// The sketch instance's user-visible state, handed to every lifecycle
/// callback and input handler. All mutation funnels through setters that
/// mirror onto the ambient scope in global mode; writing fields directly
/// would leave global-mode readers behind, so none are exposed.
pub struct Context {
    mode: Mode,
    frame_count: u64,
    target_frame_rate: f32,
    measured_frame_rate: f32,
    average_frame_rate: f32,
    looping: bool,
    preload_pending: u32,
    redraw_requested: bool,
    start_time: Instant,
    assets: IndexMap<String, Asset>,
    custom: IndexMap<String, ScopeValue>,
    commands: RuntimeCommandSender,
}

impl Context {
    pub fn new(
        mode: Mode,
        target_frame_rate: f32,
        commands: RuntimeCommandSender,
    ) -> Self {
        Self {
            mode,
            frame_count: 0,
            target_frame_rate: target_frame_rate.max(1.0),
            measured_frame_rate: 0.0,
            average_frame_rate: 0.0,
            looping: true,
            preload_pending: 0,
            redraw_requested: false,
            start_time: Instant::now(),
            assets: IndexMap::new(),
            custom: IndexMap::new(),
            commands,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn target_frame_rate(&self) -> f32 {
        self.target_frame_rate
    }

    pub fn measured_frame_rate(&self) -> f32 {
        self.measured_frame_rate
    }

    pub fn average_frame_rate(&self) -> f32 {
        self.average_frame_rate
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn preload_pending(&self) -> u32 {
        self.preload_pending
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.start_time.elapsed().as_secs_f32()
    }

    /// Rates below 1 fps are clamped; the scheduler reads the target fresh
    /// on every rescheduling decision, so changes land within one cycle.
    pub fn set_target_frame_rate(&mut self, fps: f32) {
        self.target_frame_rate = fps.max(1.0);
        self.mirror(
            props::TARGET_FRAME_RATE,
            ScopeValue::Float(self.target_frame_rate as f64),
        );
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        self.mirror(props::LOOPING, ScopeValue::Bool(looping));
    }

    /// Requests exactly one draw tick; honored at the next scheduling
    /// decision even while looping is disabled.
    pub fn redraw(&mut self) {
        self.redraw_requested = true;
    }

    pub fn redraw_pending(&self) -> bool {
        self.redraw_requested
    }

    pub(crate) fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    pub(crate) fn set_frame_count(&mut self, count: u64) {
        self.frame_count = count;
        self.mirror(props::FRAME_COUNT, ScopeValue::UInt(count));
    }

    pub(crate) fn set_measured_frame_rate(&mut self, fps: f32) {
        self.measured_frame_rate = fps;
        self.mirror(
            props::MEASURED_FRAME_RATE,
            ScopeValue::Float(fps as f64),
        );
    }

    pub(crate) fn set_average_frame_rate(&mut self, fps: f32) {
        self.average_frame_rate = fps;
        self.mirror(props::AVERAGE_FRAME_RATE, ScopeValue::Float(fps as f64));
    }

    pub(crate) fn set_preload_pending(&mut self, pending: u32) {
        self.preload_pending = pending;
        self.mirror(
            props::PRELOAD_PENDING,
            ScopeValue::UInt(pending as u64),
        );
    }

    /// Named mutation with global-mode visibility preserved; the path
    /// collaborator code is expected to use for shared instance state.
    /// Core-owned derived values and the mode are rejected here.
    pub fn set_property(&mut self, name: &str, value: ScopeValue) {
        match name {
            props::FRAME_COUNT => match value {
                ScopeValue::UInt(count) => self.set_frame_count(count),
                other => {
                    warn!("frame_count expects an unsigned value: {:?}", other)
                }
            },
            props::TARGET_FRAME_RATE => match value {
                ScopeValue::Float(fps) => {
                    self.set_target_frame_rate(fps as f32)
                }
                ScopeValue::UInt(fps) => {
                    self.set_target_frame_rate(fps as f32)
                }
                other => {
                    warn!("target_frame_rate expects a number: {:?}", other)
                }
            },
            props::LOOPING => match value {
                ScopeValue::Bool(looping) => self.set_looping(looping),
                other => warn!("looping expects a bool: {:?}", other),
            },
            props::PRELOAD_PENDING => match value {
                ScopeValue::UInt(pending) => {
                    self.set_preload_pending(pending as u32)
                }
                other => {
                    warn!("preload_pending expects an unsigned value: {:?}", other)
                }
            },
            props::MEASURED_FRAME_RATE | props::AVERAGE_FRAME_RATE => {
                warn!("'{}' is derived state owned by the scheduler", name);
            }
            props::MODE => {
                warn!("mode is fixed at construction");
            }
            _ => {
                self.custom.insert(name.to_string(), value.clone());
                self.mirror(name, value);
            }
        }
    }

    pub fn property(&self, name: &str) -> Option<&ScopeValue> {
        self.custom.get(name)
    }

    pub fn asset(&self, path: &str) -> Option<&Asset> {
        self.assets.get(path)
    }

    pub fn assets(&self) -> &IndexMap<String, Asset> {
        &self.assets
    }

    pub(crate) fn store_asset(&mut self, path: String, asset: Asset) {
        self.assets.insert(path, asset);
    }

    /// Asset loads issued outside the preload phase. These never touch the
    /// preload gate; completions land in the asset store on a later tick.
    pub fn load_text(&self, path: impl Into<String>) {
        self.request_load(AssetKind::Text, path.into());
    }

    pub fn load_data(&self, path: impl Into<String>) {
        self.request_load(AssetKind::Data, path.into());
    }

    pub fn load_markup(&self, path: impl Into<String>) {
        self.request_load(AssetKind::Markup, path.into());
    }

    pub fn load_image(&self, path: impl Into<String>) {
        self.request_load(AssetKind::Image, path.into());
    }

    fn request_load(&self, kind: AssetKind, path: String) {
        let _ = self.commands.send(RuntimeCommand::BeginLoad(kind, path));
    }

    /// Replaces the active surface wholesale at the next command pump.
    pub fn request_surface(&self, width: u32, height: u32) {
        let _ = self
            .commands
            .send(RuntimeCommand::CreateSurface(width, height));
    }

    pub fn quit(&self) {
        let _ = self.commands.send(RuntimeCommand::Quit);
    }

    fn mirror(&self, name: &str, value: ScopeValue) {
        if self.mode == Mode::Global {
            scope::set(name, value);
        }
    }
}
