use std::collections::VecDeque;
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use log::{debug, error, info, trace, warn};

use super::LifecyclePhase;
use super::barrier::{GateEvent, PreloadGate};
use super::events::{
    RuntimeCommand, RuntimeCommandReceiver, RuntimeCommandSender,
    RuntimeEvent, RuntimeEventSender, command_channel,
};
use super::frame_clock::{FrameClock, interval_for};
use super::scheduler::{Scheduler, TimerHandle, TimerStats};
use super::scope::{self, BehaviorHandle, ScopeValue};
use super::storage::{self, RuntimeSettings};
use crate::assets::{
    AssetKind, AssetLoader, FileLoader, LoadOutcome, LoadRequest, LoadToken,
};
use crate::context::{Context, props};
use crate::input::InputEvent;
use crate::sketch::{
    Behavior, DEFAULT_FRAME_RATE, SketchBinding, SketchConfig,
};
use crate::surface::{RasterSurfaceFactory, Surface, SurfaceFactory};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum TimerTask {
    CounterTick,
    DrawTick,
}

/// Wraps the asset-loading operations handed to the user preload callback.
/// Each call counts against the preload gate at issue time; the wrappers
/// exist only for the duration of the callback, so loads issued later (from
/// draw or an input handler) go through the plain context path and cannot
/// re-arm the gate.
pub struct PreloadScope<'a> {
    gate: &'a mut PreloadGate,
    ctx: &'a mut Context,
    loader: &'a mut dyn AssetLoader,
    next_token: &'a mut u64,
}

impl PreloadScope<'_> {
    pub fn context(&self) -> &Context {
        self.ctx
    }

    pub fn load_text(&mut self, path: impl Into<String>) -> LoadToken {
        self.issue(AssetKind::Text, path.into())
    }

    pub fn load_data(&mut self, path: impl Into<String>) -> LoadToken {
        self.issue(AssetKind::Data, path.into())
    }

    pub fn load_markup(&mut self, path: impl Into<String>) -> LoadToken {
        self.issue(AssetKind::Markup, path.into())
    }

    pub fn load_image(&mut self, path: impl Into<String>) -> LoadToken {
        self.issue(AssetKind::Image, path.into())
    }

    fn issue(&mut self, kind: AssetKind, path: String) -> LoadToken {
        let token = LoadToken(*self.next_token);
        *self.next_token += 1;

        self.gate.increment();
        self.ctx.set_preload_pending(self.gate.pending());

        let request = LoadRequest {
            token,
            kind,
            path,
            gated: true,
        };
        self.loader.begin_load(&request);
        token
    }
}

/// The sketch runtime: owns the instance state, the active surface, and the
/// two scheduler activities, and walks the lifecycle from construction to
/// the animation loop.
pub struct SketchRuntime {
    config: &'static SketchConfig,
    phase: LifecyclePhase,
    width: u32,
    height: u32,
    ctx: Context,
    behavior: Behavior,
    forward_input: bool,
    surface: Option<Box<dyn Surface>>,
    surface_factory: Box<dyn SurfaceFactory>,
    loader: Box<dyn AssetLoader>,
    gate: PreloadGate,
    clock: FrameClock,
    scheduler: Scheduler<TimerTask>,
    counter_timer: Option<TimerHandle>,
    draw_timer: Option<TimerHandle>,
    next_load_token: u64,
    queued: VecDeque<RuntimeCommand>,
    command_tx: RuntimeCommandSender,
    command_rx: RuntimeCommandReceiver,
    event_tx: Option<RuntimeEventSender>,
    shutdown: bool,
}

impl SketchRuntime {
    /// Builds a runtime with the default collaborators: a CPU raster
    /// surface and a filesystem loader rooted at the configured assets dir.
    pub fn new(
        config: &'static SketchConfig,
        binding: SketchBinding,
    ) -> Result<Self, String> {
        let settings = storage::load_settings_if_exists()
            .unwrap_or_else(|err| {
                warn!("ignoring persisted settings: {}", err);
                None
            })
            .unwrap_or_default();

        let (command_tx, command_rx) = command_channel();
        let loader =
            FileLoader::new(settings.assets_dir.clone(), command_tx.clone());

        Ok(Self::with_collaborators(
            config,
            settings,
            binding,
            Box::new(RasterSurfaceFactory),
            Box::new(loader),
            command_tx,
            command_rx,
            None,
        ))
    }

    /// Full dependency injection for hosts and tests.
    #[allow(clippy::too_many_arguments)]
    pub fn with_collaborators(
        config: &'static SketchConfig,
        settings: RuntimeSettings,
        binding: SketchBinding,
        surface_factory: Box<dyn SurfaceFactory>,
        loader: Box<dyn AssetLoader>,
        command_tx: RuntimeCommandSender,
        command_rx: RuntimeCommandReceiver,
        event_tx: Option<RuntimeEventSender>,
    ) -> Self {
        let fps = if config.fps > 0.0 {
            config.fps
        } else {
            settings.default_frame_rate
        };
        let width = if config.w > 0 {
            config.w
        } else {
            settings.default_width
        };
        let height = if config.h > 0 {
            config.h
        } else {
            settings.default_height
        };

        let mode = binding.mode();
        let ctx = Context::new(mode, fps, command_tx.clone());

        let mut runtime = Self {
            config,
            phase: LifecyclePhase::Constructing,
            width,
            height,
            ctx,
            behavior: Behavior::default(),
            forward_input: false,
            surface: None,
            surface_factory,
            loader,
            gate: PreloadGate::new(),
            clock: FrameClock::new(),
            scheduler: Scheduler::new(),
            counter_timer: None,
            draw_timer: None,
            next_load_token: 0,
            queued: VecDeque::new(),
            command_tx,
            command_rx,
            event_tx,
            shutdown: false,
        };

        runtime.bind_mode(binding);
        runtime.set_phase(LifecyclePhase::AwaitingHostReady);
        runtime
    }

    pub fn config(&self) -> &'static SketchConfig {
        self.config
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn surface(&self) -> Option<&dyn Surface> {
        self.surface.as_deref()
    }

    pub fn average_fps(&self) -> f32 {
        self.clock.average_fps()
    }

    /// Sender for host-side wiring: input forwarding, readiness signals,
    /// remote control.
    pub fn command_sender(&self) -> RuntimeCommandSender {
        self.command_tx.clone()
    }

    pub fn timer_stats(&self) -> TimerStats {
        self.scheduler.stats()
    }

    pub fn live_timer_count(&self) -> usize {
        self.scheduler.live_count()
    }

    fn bind_mode(&mut self, binding: SketchBinding) {
        match binding {
            SketchBinding::Global(behavior) => {
                self.behavior = behavior;
                self.forward_input = false;
                scope::install(self.export_table());
                info!("sketch '{}' bound in global mode", self.config.name);
            }
            SketchBinding::Instance(init) => {
                let mut behavior = Behavior::new();
                init(&mut behavior);
                self.behavior = behavior;
                self.forward_input = true;
                info!("sketch '{}' bound in instance mode", self.config.name);
            }
        }
    }

    /// The one-time global-mode projection: constants, the instance's data
    /// attributes as of now, and bound handles for the behaviors present.
    /// A point-in-time snapshot; nothing added later is exported.
    fn export_table(&self) -> IndexMap<String, ScopeValue> {
        let mut table = IndexMap::new();

        table.insert(
            "sketch_name".to_string(),
            ScopeValue::Text(self.config.name.to_string()),
        );
        table.insert(
            "width".to_string(),
            ScopeValue::UInt(self.width as u64),
        );
        table.insert(
            "height".to_string(),
            ScopeValue::UInt(self.height as u64),
        );
        table.insert(
            "default_frame_rate".to_string(),
            ScopeValue::Float(DEFAULT_FRAME_RATE as f64),
        );

        table.insert(
            props::MODE.to_string(),
            ScopeValue::Text("global".to_string()),
        );
        table.insert(
            props::FRAME_COUNT.to_string(),
            ScopeValue::UInt(self.ctx.frame_count()),
        );
        table.insert(
            props::TARGET_FRAME_RATE.to_string(),
            ScopeValue::Float(self.ctx.target_frame_rate() as f64),
        );
        table.insert(
            props::MEASURED_FRAME_RATE.to_string(),
            ScopeValue::Float(self.ctx.measured_frame_rate() as f64),
        );
        table.insert(
            props::LOOPING.to_string(),
            ScopeValue::Bool(self.ctx.looping()),
        );
        table.insert(
            props::PRELOAD_PENDING.to_string(),
            ScopeValue::UInt(self.ctx.preload_pending() as u64),
        );

        for name in self.behavior.behavior_names() {
            table.insert(
                name.to_string(),
                ScopeValue::Behavior(BehaviorHandle::new(
                    name,
                    self.command_tx.clone(),
                )),
            );
        }

        table
    }

    /// One-shot readiness notification from the host. Creates the default
    /// surface unconditionally, then enters preload or setup.
    pub fn host_ready(&mut self, now: Instant) {
        if self.phase != LifecyclePhase::AwaitingHostReady {
            warn!("host ready signal ignored in phase {:?}", self.phase);
            return;
        }

        self.create_surface(self.width, self.height, true);

        if self.behavior.has_preload() {
            self.run_preload(now);
        } else {
            self.begin_setup(now);
        }
    }

    /// Replaces the active surface wholesale; the old surface is discarded.
    pub fn create_surface(
        &mut self,
        width: u32,
        height: u32,
        replace_existing: bool,
    ) {
        if self.surface.is_some() && !replace_existing {
            warn!("surface already exists; create_surface ignored");
            return;
        }

        let mut surface = self.surface_factory.create_surface(width, height);
        surface.apply_default_styles();
        self.surface = Some(surface);
        debug!("created {}x{} surface", width, height);
    }

    fn run_preload(&mut self, now: Instant) {
        self.set_phase(LifecyclePhase::Preloading);
        self.gate = PreloadGate::new();
        self.ctx.set_preload_pending(0);

        let Some(mut preload) = self.behavior.on_preload.take() else {
            self.begin_setup(now);
            return;
        };

        {
            let mut preload_scope = PreloadScope {
                gate: &mut self.gate,
                ctx: &mut self.ctx,
                loader: self.loader.as_mut(),
                next_token: &mut self.next_load_token,
            };
            preload(&mut preload_scope);
        }

        // Zero-request preloads never decrement, so the gate is checked
        // again now that the synchronous callback has returned.
        if self.gate.release_if_idle() {
            self.emit(RuntimeEvent::PreloadReleased);
            self.begin_setup(now);
        }
    }

    fn begin_setup(&mut self, now: Instant) {
        self.set_phase(LifecyclePhase::SettingUp);
        self.invoke_setup();
        self.emit(RuntimeEvent::SetupComplete);

        self.set_phase(LifecyclePhase::Looping);
        self.clock.reset();
        self.arm_counter_ticker(now);
        self.arm_draw_driver(now);
    }

    fn invoke_setup(&mut self) {
        let Some(setup) = self.behavior.on_setup.as_mut() else {
            return;
        };
        let Some(surface) = self.surface.as_deref_mut() else {
            warn!("setup skipped: no surface");
            return;
        };

        setup(&mut self.ctx, surface);
    }

    fn invoke_draw(&mut self) {
        let Some(draw) = self.behavior.on_draw.as_mut() else {
            return;
        };
        let Some(surface) = self.surface.as_deref_mut() else {
            return;
        };

        draw(&mut self.ctx, surface);
    }

    fn arm_counter_ticker(&mut self, now: Instant) {
        if let Some(handle) = self.counter_timer.take() {
            self.scheduler.cancel(handle);
        }

        let interval = interval_for(self.ctx.target_frame_rate());
        self.counter_timer =
            Some(self.scheduler.arm(now + interval, TimerTask::CounterTick));
    }

    fn arm_draw_driver(&mut self, now: Instant) {
        if let Some(handle) = self.draw_timer.take() {
            self.scheduler.cancel(handle);
        }

        let interval = interval_for(self.ctx.target_frame_rate());
        self.draw_timer =
            Some(self.scheduler.arm(now + interval, TimerTask::DrawTick));
    }

    /// Advances the runtime to `now`: drains queued commands, fires due
    /// timers, and revives the draw driver if user code re-enabled it.
    pub fn pump(&mut self, now: Instant) {
        self.process_commands(now);

        while let Some((handle, task)) = self.scheduler.pop_due(now) {
            match task {
                TimerTask::CounterTick => {
                    if self.counter_timer == Some(handle) {
                        self.counter_timer = None;
                    }
                    self.on_counter_tick(now);
                }
                TimerTask::DrawTick => {
                    if self.draw_timer == Some(handle) {
                        self.draw_timer = None;
                    }
                    self.on_draw_tick(now);
                }
            }
        }

        self.ensure_draw_scheduled(now);
    }

    fn on_counter_tick(&mut self, now: Instant) {
        let count = self.ctx.frame_count() + 1;
        self.ctx.set_frame_count(count);
        self.emit(RuntimeEvent::FrameAdvanced(count));

        self.arm_counter_ticker(now);
    }

    fn on_draw_tick(&mut self, now: Instant) {
        let redraw_once = self.ctx.take_redraw_request();
        if !self.ctx.looping() && !redraw_once {
            self.emit(RuntimeEvent::DrawSkipped);
            return;
        }

        self.clock.record_draw(now);
        self.ctx.set_measured_frame_rate(self.clock.measured_fps());
        self.ctx.set_average_frame_rate(self.clock.average_fps());

        // Reschedule before any user code runs: a panicking draw must not
        // take future scheduling down with it, and a draw that disables
        // looping has its decision honored at the next tick.
        if self.ctx.looping() {
            self.arm_draw_driver(now);
        }

        self.invoke_draw();

        if let Some(surface) = self.surface.as_deref_mut() {
            surface.reset_transform();
        }

        self.emit(RuntimeEvent::DrawCompleted(self.ctx.frame_count()));
    }

    fn ensure_draw_scheduled(&mut self, now: Instant) {
        if self.phase != LifecyclePhase::Looping || self.draw_timer.is_some() {
            return;
        }

        if self.ctx.looping() || self.ctx.redraw_pending() {
            self.arm_draw_driver(now);
        }
    }

    fn process_commands(&mut self, now: Instant) {
        while let Ok(command) = self.command_rx.try_recv() {
            self.queued.push_back(command);
        }

        while let Some(command) = self.queued.pop_front() {
            self.dispatch_command(command, now);
        }
    }

    fn dispatch_command(&mut self, command: RuntimeCommand, now: Instant) {
        match command {
            RuntimeCommand::BeginLoad(kind, path) => {
                let token = LoadToken(self.next_load_token);
                self.next_load_token += 1;

                let request = LoadRequest {
                    token,
                    kind,
                    path,
                    gated: false,
                };
                self.loader.begin_load(&request);
            }
            RuntimeCommand::CreateSurface(width, height) => {
                self.create_surface(width, height, true);
            }
            RuntimeCommand::HostReady => self.host_ready(now),
            RuntimeCommand::Input(event) => self.dispatch_input(event),
            RuntimeCommand::InvokeBehavior(name) => {
                self.dispatch_behavior(&name);
            }
            RuntimeCommand::LoadFinished(outcome) => {
                self.on_load_finished(outcome, now);
            }
            RuntimeCommand::Quit => self.shutdown = true,
            RuntimeCommand::Redraw => self.ctx.redraw(),
            RuntimeCommand::SetLooping(looping) => {
                self.ctx.set_looping(looping);
            }
            RuntimeCommand::SetTargetFrameRate(fps) => {
                self.ctx.set_target_frame_rate(fps);
                if self.phase == LifecyclePhase::Looping {
                    self.arm_counter_ticker(now);
                }
            }
        }
    }

    fn on_load_finished(&mut self, outcome: LoadOutcome, now: Instant) {
        let LoadOutcome { request, result } = outcome;

        match result {
            Ok(asset) => {
                trace!("asset '{}' loaded", request.path);
                self.ctx.store_asset(request.path, asset);
            }
            Err(err) => error!("asset load failed: {}", err),
        }

        if !request.gated {
            return;
        }

        let released = self.gate.decrement() == GateEvent::Released;
        self.ctx.set_preload_pending(self.gate.pending());

        if released {
            if self.phase == LifecyclePhase::Preloading {
                self.emit(RuntimeEvent::PreloadReleased);
                self.begin_setup(now);
            } else {
                warn!("preload gate released outside the preload phase");
            }
        }
    }

    fn dispatch_input(&mut self, event: InputEvent) {
        if !self.forward_input {
            trace!("input ignored in global mode: {:?}", event.kind());
            return;
        }

        // Undefined handlers are silently skipped.
        let Some(handler) = self.behavior.handlers.get_mut(&event.kind())
        else {
            return;
        };
        let Some(surface) = self.surface.as_deref_mut() else {
            trace!("input before surface creation dropped");
            return;
        };

        handler(&mut self.ctx, surface, &event);
    }

    fn dispatch_behavior(&mut self, name: &str) {
        match name {
            "setup" => self.invoke_setup(),
            "draw" => self.ctx.redraw(),
            "preload" => {
                warn!("preload runs only during startup; invocation ignored");
            }
            other => warn!("unknown behavior '{}' invoked", other),
        }
    }

    fn set_phase(&mut self, phase: LifecyclePhase) {
        self.phase = phase;
        debug!("lifecycle phase -> {:?}", phase);
        self.emit(RuntimeEvent::PhaseChanged(phase));
    }

    fn emit(&self, event: RuntimeEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }

    /// Blocking realtime driver. The embedding process counts as a ready
    /// host, so the lifecycle proceeds immediately; afterwards the loop
    /// sleeps to the next timer deadline, waking early for commands.
    pub fn run(&mut self) -> Result<(), String> {
        if self.phase == LifecyclePhase::AwaitingHostReady {
            self.host_ready(Instant::now());
        }

        info!("sketch '{}' running", self.config.name);

        loop {
            self.pump(Instant::now());

            if self.shutdown {
                self.emit(RuntimeEvent::Stopped);
                info!("sketch '{}' stopped", self.config.name);
                return Ok(());
            }

            self.wait_for_work();
        }
    }

    fn wait_for_work(&mut self) {
        let timeout = match self.scheduler.next_deadline() {
            Some(deadline) => {
                deadline.saturating_duration_since(Instant::now())
            }
            // Host readiness and preload stalls wait indefinitely; poll
            // the command queue in coarse slices while doing so.
            None => Duration::from_millis(250),
        };

        if timeout.is_zero() {
            return;
        }

        match self.command_rx.recv_timeout(timeout) {
            Ok(command) => self.queued.push_back(command),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(timeout);
            }
        }
    }
}
