use easel::prelude::*;

pub static SKETCH_CONFIG: SketchConfig = SketchConfig {
    name: "orbit",
    display_name: "Orbit",
    fps: 60.0,
    w: 640,
    h: 360,
};

/// Instance-mode sketch: preloads its tuning file, animates a satellite,
/// and toggles the loop on pointer presses.
pub fn init() -> SketchBinding {
    SketchBinding::instance(|behavior| {
        behavior.set_preload(|scope| {
            scope.load_data("sketches/assets/orbit.json");
        });

        behavior.set_setup(|ctx, surface| {
            surface.clear(Rgba::BLACK);

            if let Some(Asset::Data(tuning)) =
                ctx.asset("sketches/assets/orbit.json")
            {
                if let Some(fps) = tuning["fps"].as_f64() {
                    ctx.set_target_frame_rate(fps as f32);
                }
            }
        });

        behavior.set_draw(|ctx, surface| {
            let t = ctx.frame_count() as f32 / 60.0;
            surface.clear(Rgba::gray(12));

            surface.translate(
                320.0 + t.cos() * 120.0,
                180.0 + t.sin() * 120.0,
            );
            surface.set_fill(Rgba::WHITE);

            let jitter = rand::random::<f32>() * 2.0;
            let size = 8.0 + jitter * 2.0;
            surface.fill_rect(-size / 2.0, -size / 2.0, size, size);

            if ctx.frame_count() >= 3600 {
                info!("orbit finished after {} frames", ctx.frame_count());
                ctx.quit();
            }
        });

        behavior.set_handler(InputKind::PointerDown, |ctx, _surface, _event| {
            let looping = ctx.looping();
            ctx.set_looping(!looping);
        });
    })
}
