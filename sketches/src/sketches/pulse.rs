use easel::prelude::*;

pub static SKETCH_CONFIG: SketchConfig = SketchConfig {
    name: "pulse",
    display_name: "Pulse",
    fps: 60.0,
    w: 640,
    h: 360,
};

/// Global-mode sketch: the behavior set is supplied directly, so frame
/// state is mirrored onto the ambient scope while it runs.
pub fn init() -> SketchBinding {
    SketchBinding::global(
        Behavior::new()
            .setup(|ctx, surface| {
                ctx.set_target_frame_rate(30.0);
                surface.clear(Rgba::BLACK);
            })
            .draw(|ctx, surface| {
                let phase = (ctx.frame_count() % 60) as f32 / 59.0;
                let level = (phase * 255.0) as u8;
                surface.clear(Rgba::gray(level / 3));

                surface.set_fill(Rgba::gray(255 - level));
                surface.translate(320.0, 180.0);
                let half = 40.0 + phase * 80.0;
                surface.fill_rect(-half, -half, half * 2.0, half * 2.0);
            }),
    )
}
