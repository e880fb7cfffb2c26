/// Input-event categories the runtime forwards to instance handlers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum InputKind {
    PointerMoved,
    PointerDown,
    PointerUp,
    PointerClicked,
    Wheel,
    KeyDown,
    KeyUp,
    KeyPressed,
    TouchStart,
    TouchMoved,
    TouchEnd,
}

impl InputKind {
    pub const ALL: [InputKind; 11] = [
        InputKind::PointerMoved,
        InputKind::PointerDown,
        InputKind::PointerUp,
        InputKind::PointerClicked,
        InputKind::Wheel,
        InputKind::KeyDown,
        InputKind::KeyUp,
        InputKind::KeyPressed,
        InputKind::TouchStart,
        InputKind::TouchMoved,
        InputKind::TouchEnd,
    ];

    /// Conventional handler name, matching the attribute a sketch defines.
    pub fn handler_name(&self) -> &'static str {
        match self {
            InputKind::PointerMoved => "on_pointer_moved",
            InputKind::PointerDown => "on_pointer_down",
            InputKind::PointerUp => "on_pointer_up",
            InputKind::PointerClicked => "on_pointer_clicked",
            InputKind::Wheel => "on_wheel",
            InputKind::KeyDown => "on_key_down",
            InputKind::KeyUp => "on_key_up",
            InputKind::KeyPressed => "on_key_pressed",
            InputKind::TouchStart => "on_touch_start",
            InputKind::TouchMoved => "on_touch_moved",
            InputKind::TouchEnd => "on_touch_end",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// A host input event already normalized by the embedding environment.
/// The runtime does not interpret these; it only routes them.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerMoved { x: f32, y: f32 },
    PointerDown { x: f32, y: f32, button: PointerButton },
    PointerUp { x: f32, y: f32, button: PointerButton },
    PointerClicked { x: f32, y: f32 },
    Wheel { delta_x: f32, delta_y: f32 },
    KeyDown { key: String },
    KeyUp { key: String },
    KeyPressed { key: String },
    TouchStart { id: u64, x: f32, y: f32 },
    TouchMoved { id: u64, x: f32, y: f32 },
    TouchEnd { id: u64 },
}

impl InputEvent {
    pub fn kind(&self) -> InputKind {
        match self {
            InputEvent::PointerMoved { .. } => InputKind::PointerMoved,
            InputEvent::PointerDown { .. } => InputKind::PointerDown,
            InputEvent::PointerUp { .. } => InputKind::PointerUp,
            InputEvent::PointerClicked { .. } => InputKind::PointerClicked,
            InputEvent::Wheel { .. } => InputKind::Wheel,
            InputEvent::KeyDown { .. } => InputKind::KeyDown,
            InputEvent::KeyUp { .. } => InputKind::KeyUp,
            InputEvent::KeyPressed { .. } => InputKind::KeyPressed,
            InputEvent::TouchStart { .. } => InputKind::TouchStart,
            InputEvent::TouchMoved { .. } => InputKind::TouchMoved,
            InputEvent::TouchEnd { .. } => InputKind::TouchEnd,
        }
    }
}
