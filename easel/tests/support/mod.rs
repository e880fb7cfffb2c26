#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use easel::prelude::*;

#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub created: u32,
    pub resets: u32,
    pub default_styles: u32,
}

/// Surface double that records the calls the runtime is contractually
/// obliged to make.
pub struct TestSurface {
    width: u32,
    height: u32,
    transform: Transform2D,
    pixels: Vec<u8>,
    log: Rc<RefCell<SurfaceLog>>,
}

impl Surface for TestSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn transform(&self) -> Transform2D {
        self.transform
    }

    fn set_transform(&mut self, transform: Transform2D) {
        self.transform = transform;
    }

    fn reset_transform(&mut self) {
        self.log.borrow_mut().resets += 1;
        self.transform = Transform2D::IDENTITY;
    }

    fn apply_default_styles(&mut self) {
        self.log.borrow_mut().default_styles += 1;
        self.transform = Transform2D::IDENTITY;
    }

    fn set_fill(&mut self, _color: Rgba) {}

    fn clear(&mut self, _color: Rgba) {}

    fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32) {}

    fn pixel(&self, _x: u32, _y: u32) -> Option<Rgba> {
        None
    }

    fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

pub struct SpyFactory {
    pub log: Rc<RefCell<SurfaceLog>>,
}

impl SurfaceFactory for SpyFactory {
    fn create_surface(&mut self, width: u32, height: u32) -> Box<dyn Surface> {
        self.log.borrow_mut().created += 1;
        Box::new(TestSurface {
            width,
            height,
            transform: Transform2D::IDENTITY,
            pixels: Vec::new(),
            log: self.log.clone(),
        })
    }
}

/// Loader double: records every request and completes nothing on its own.
/// Tests deliver completions by sending `LoadFinished` commands, which is
/// exactly how asynchronous loaders hand results back.
pub struct RecordingLoader {
    pub requests: Rc<RefCell<Vec<LoadRequest>>>,
}

impl AssetLoader for RecordingLoader {
    fn begin_load(&mut self, request: &LoadRequest) {
        self.requests.borrow_mut().push(request.clone());
    }
}

pub struct Harness {
    pub runtime: SketchRuntime,
    pub commands: RuntimeCommandSender,
    pub events: RuntimeEventReceiver,
    pub surface_log: Rc<RefCell<SurfaceLog>>,
    pub load_requests: Rc<RefCell<Vec<LoadRequest>>>,
    pub start: Instant,
    pumped_to: u64,
}

impl Harness {
    pub fn new(
        config: &'static SketchConfig,
        binding: SketchBinding,
    ) -> Self {
        let (command_tx, command_rx) = command_channel();
        let (event_tx, event_rx) = event_channel();
        let surface_log = Rc::new(RefCell::new(SurfaceLog::default()));
        let load_requests = Rc::new(RefCell::new(Vec::new()));

        let runtime = SketchRuntime::with_collaborators(
            config,
            RuntimeSettings::default(),
            binding,
            Box::new(SpyFactory {
                log: surface_log.clone(),
            }),
            Box::new(RecordingLoader {
                requests: load_requests.clone(),
            }),
            command_tx.clone(),
            command_rx,
            Some(event_tx),
        );

        Self {
            runtime,
            commands: command_tx,
            events: event_rx,
            surface_log,
            load_requests,
            start: Instant::now(),
            pumped_to: 0,
        }
    }

    pub fn at(&self, ms: u64) -> Instant {
        self.start + Duration::from_millis(ms)
    }

    /// Pumps the runtime at every whole millisecond through `until_ms`,
    /// continuing from wherever the previous call stopped.
    pub fn pump_until(&mut self, until_ms: u64) {
        for ms in self.pumped_to..=until_ms {
            self.runtime.pump(self.at(ms));
        }
        self.pumped_to = self.pumped_to.max(until_ms + 1);
    }

    /// Delivers the completion for the index-th recorded load request.
    pub fn complete_load(&self, index: usize, result: Result<Asset, String>) {
        let request = self.load_requests.borrow()[index].clone();
        self.commands
            .send(RuntimeCommand::LoadFinished(LoadOutcome {
                request,
                result,
            }))
            .expect("runtime command channel open");
    }

    pub fn drain_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// The duplicate-armament invariant: at most one live timer per
    /// activity, and the stats ledger balances against the live set.
    pub fn assert_timer_invariant(&self) {
        let stats = self.runtime.timer_stats();
        assert!(
            self.runtime.live_timer_count() <= 2,
            "more than two live timers: {:?}",
            stats
        );
        assert_eq!(
            stats.live() as usize,
            self.runtime.live_timer_count(),
            "timer ledger out of balance: {:?}",
            stats
        );
    }
}
