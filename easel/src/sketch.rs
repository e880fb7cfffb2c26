use crate::context::Context;
use crate::core::util::HashMap;
use crate::input::{InputEvent, InputKind};
use crate::runtime::app::PreloadScope;
use crate::surface::Surface;

pub const DEFAULT_FRAME_RATE: f32 = 60.0;

/// Execution mode, fixed at construction for the life of the instance.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    Instance,
    Global,
}

pub struct SketchConfig {
    pub name: &'static str,
    pub display_name: &'static str,
    pub fps: f32,
    pub w: u32,
    pub h: u32,
}

pub type LifecycleFn = Box<dyn FnMut(&mut Context, &mut dyn Surface)>;
pub type PreloadFn = Box<dyn FnMut(&mut PreloadScope)>;
pub type InputHandlerFn =
    Box<dyn FnMut(&mut Context, &mut dyn Surface, &InputEvent)>;
pub type InstanceInit = Box<dyn FnOnce(&mut Behavior)>;

/// The typed callback registry for one sketch: the lifecycle hooks plus any
/// input handlers, resolved once at binding time. Every hook is optional;
/// an empty behavior set still yields a running loop.
#[derive(Default)]
pub struct Behavior {
    pub(crate) on_preload: Option<PreloadFn>,
    pub(crate) on_setup: Option<LifecycleFn>,
    pub(crate) on_draw: Option<LifecycleFn>,
    pub(crate) handlers: HashMap<InputKind, InputHandlerFn>,
}

impl Behavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preload(
        mut self,
        f: impl FnMut(&mut PreloadScope) + 'static,
    ) -> Self {
        self.set_preload(f);
        self
    }

    pub fn setup(
        mut self,
        f: impl FnMut(&mut Context, &mut dyn Surface) + 'static,
    ) -> Self {
        self.set_setup(f);
        self
    }

    pub fn draw(
        mut self,
        f: impl FnMut(&mut Context, &mut dyn Surface) + 'static,
    ) -> Self {
        self.set_draw(f);
        self
    }

    pub fn on(
        mut self,
        kind: InputKind,
        f: impl FnMut(&mut Context, &mut dyn Surface, &InputEvent) + 'static,
    ) -> Self {
        self.set_handler(kind, f);
        self
    }

    pub fn set_preload(&mut self, f: impl FnMut(&mut PreloadScope) + 'static) {
        self.on_preload = Some(Box::new(f));
    }

    pub fn set_setup(
        &mut self,
        f: impl FnMut(&mut Context, &mut dyn Surface) + 'static,
    ) {
        self.on_setup = Some(Box::new(f));
    }

    pub fn set_draw(
        &mut self,
        f: impl FnMut(&mut Context, &mut dyn Surface) + 'static,
    ) {
        self.on_draw = Some(Box::new(f));
    }

    pub fn set_handler(
        &mut self,
        kind: InputKind,
        f: impl FnMut(&mut Context, &mut dyn Surface, &InputEvent) + 'static,
    ) {
        self.handlers.insert(kind, Box::new(f));
    }

    pub fn has_preload(&self) -> bool {
        self.on_preload.is_some()
    }

    /// Names of the callback-like attributes present, in projection order.
    pub fn behavior_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.on_preload.is_some() {
            names.push("preload");
        }
        if self.on_setup.is_some() {
            names.push("setup");
        }
        if self.on_draw.is_some() {
            names.push("draw");
        }
        names
    }
}

/// How a sketch supplies its behavior. A callback-bearing closure selects
/// instance mode; supplying the behavior set directly selects global mode.
pub enum SketchBinding {
    Global(Behavior),
    Instance(InstanceInit),
}

impl SketchBinding {
    pub fn global(behavior: Behavior) -> Self {
        Self::Global(behavior)
    }

    pub fn instance(init: impl FnOnce(&mut Behavior) + 'static) -> Self {
        Self::Instance(Box::new(init))
    }

    pub fn mode(&self) -> Mode {
        match self {
            SketchBinding::Global(_) => Mode::Global,
            SketchBinding::Instance(_) => Mode::Instance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behavior_names_follow_projection_order() {
        let behavior = Behavior::new()
            .draw(|_, _| {})
            .preload(|_| {})
            .setup(|_, _| {});

        assert_eq!(behavior.behavior_names(), vec!["preload", "setup", "draw"]);
    }

    #[test]
    fn empty_behavior_projects_nothing() {
        let behavior = Behavior::new();
        assert!(behavior.behavior_names().is_empty());
        assert!(!behavior.has_preload());
    }

    #[test]
    fn binding_variant_selects_mode() {
        assert_eq!(
            SketchBinding::global(Behavior::new()).mode(),
            Mode::Global
        );
        assert_eq!(SketchBinding::instance(|_| {}).mode(), Mode::Instance);
    }
}
