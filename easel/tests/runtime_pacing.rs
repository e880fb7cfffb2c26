mod support;

use std::cell::RefCell;
use std::rc::Rc;

use easel::prelude::*;
use support::Harness;

static PACING_CONFIG: SketchConfig = SketchConfig {
    name: "pacing_sketch",
    display_name: "Pacing Sketch",
    fps: 60.0,
    w: 32,
    h: 32,
};

fn counting_binding(
    draws: Rc<RefCell<Vec<u64>>>,
    setup: impl FnMut(&mut Context, &mut dyn Surface) + 'static,
) -> SketchBinding {
    let mut setup = Some(setup);
    SketchBinding::instance(move |behavior| {
        if let Some(setup) = setup.take() {
            behavior.set_setup(setup);
        }
        let draws = draws.clone();
        behavior.set_draw(move |ctx, _surface| {
            draws.borrow_mut().push(ctx.frame_count());
        });
    })
}

#[test]
fn target_rate_set_in_setup_governs_the_first_interval() {
    let draws = Rc::new(RefCell::new(Vec::new()));
    let binding = counting_binding(draws.clone(), |ctx, _surface| {
        ctx.set_target_frame_rate(30.0);
    });

    let mut harness = Harness::new(&PACING_CONFIG, binding);
    harness.runtime.host_ready(harness.at(0));

    // At 60 fps a draw would land by 17ms; at 30 fps nothing fires yet.
    harness.pump_until(20);
    assert!(draws.borrow().is_empty());

    harness.pump_until(34);
    assert_eq!(draws.borrow().len(), 1);

    harness.pump_until(100);
    assert_eq!(draws.borrow().len(), 2);
    assert_eq!(harness.runtime.context().frame_count(), 2);
}

#[test]
fn rate_change_applies_on_the_next_rescheduling_decision() {
    let draws = Rc::new(RefCell::new(Vec::new()));
    let binding = counting_binding(draws.clone(), |_ctx, _surface| {});

    let mut harness = Harness::new(&PACING_CONFIG, binding);
    harness.runtime.host_ready(harness.at(0));
    harness.pump_until(17);
    assert_eq!(draws.borrow().len(), 1);

    harness.runtime.context_mut().set_target_frame_rate(10.0);

    // The next draw was already armed at the 60 fps interval; the one
    // after it uses the slower rate.
    harness.pump_until(34);
    assert_eq!(draws.borrow().len(), 2);
    harness.pump_until(100);
    assert_eq!(draws.borrow().len(), 2);
    harness.pump_until(134);
    assert_eq!(draws.borrow().len(), 3);

    harness.assert_timer_invariant();
}

#[test]
fn disabling_looping_from_draw_stops_draws_but_not_the_counter() {
    let draws = Rc::new(RefCell::new(0u32));
    let draws_in = draws.clone();

    let binding = SketchBinding::instance(move |behavior| {
        let draws = draws_in.clone();
        behavior.set_draw(move |ctx, _surface| {
            *draws.borrow_mut() += 1;
            ctx.set_looping(false);
        });
    });

    let mut harness = Harness::new(&PACING_CONFIG, binding);
    harness.runtime.host_ready(harness.at(0));
    harness.pump_until(500);

    assert_eq!(*draws.borrow(), 1);
    // The counter ticker is untouched by the frozen draw driver.
    assert!(harness.runtime.context().frame_count() >= 25);
    let events = harness.drain_events();
    assert!(events.contains(&RuntimeEvent::DrawSkipped));
}

#[test]
fn redraw_requests_exactly_one_tick_while_frozen() {
    let draws = Rc::new(RefCell::new(0u32));
    let draws_in = draws.clone();

    let binding = SketchBinding::instance(move |behavior| {
        let draws = draws_in.clone();
        behavior.set_draw(move |ctx, _surface| {
            *draws.borrow_mut() += 1;
            ctx.set_looping(false);
        });
    });

    let mut harness = Harness::new(&PACING_CONFIG, binding);
    harness.runtime.host_ready(harness.at(0));
    harness.pump_until(200);
    assert_eq!(*draws.borrow(), 1);

    harness.commands.send(RuntimeCommand::Redraw).unwrap();
    for ms in 201..400 {
        harness.runtime.pump(harness.at(ms));
    }
    assert_eq!(*draws.borrow(), 2);

    // Still frozen afterwards.
    for ms in 400..600 {
        harness.runtime.pump(harness.at(ms));
    }
    assert_eq!(*draws.borrow(), 2);
}

#[test]
fn looping_can_be_revived_after_a_freeze() {
    let draws = Rc::new(RefCell::new(0u32));
    let draws_in = draws.clone();

    let binding = SketchBinding::instance(move |behavior| {
        let draws = draws_in.clone();
        behavior.set_draw(move |_ctx, _surface| {
            *draws.borrow_mut() += 1;
        });
    });

    let mut harness = Harness::new(&PACING_CONFIG, binding);
    harness.runtime.host_ready(harness.at(0));

    harness.commands.send(RuntimeCommand::SetLooping(false)).unwrap();
    harness.pump_until(200);
    let frozen_draws = *draws.borrow();

    harness.commands.send(RuntimeCommand::SetLooping(true)).unwrap();
    for ms in 201..400 {
        harness.runtime.pump(harness.at(ms));
    }

    assert!(*draws.borrow() > frozen_draws);
    harness.assert_timer_invariant();
}

#[test]
fn counter_rearm_never_duplicates_timers() {
    let draws = Rc::new(RefCell::new(Vec::new()));
    let binding = counting_binding(draws, |_ctx, _surface| {});

    let mut harness = Harness::new(&PACING_CONFIG, binding);
    harness.runtime.host_ready(harness.at(0));

    // Hammer the external re-arm path while ticking.
    for ms in 0..300u64 {
        if ms % 10 == 0 {
            let fps = if ms % 20 == 0 { 120.0 } else { 24.0 };
            harness
                .commands
                .send(RuntimeCommand::SetTargetFrameRate(fps))
                .unwrap();
        }
        harness.runtime.pump(harness.at(ms));
        harness.assert_timer_invariant();
    }

    let stats = harness.runtime.timer_stats();
    assert!(stats.cancelled > 0, "re-arms should cancel: {:?}", stats);
}

#[test]
fn frame_count_never_resets_across_rate_changes() {
    let draws = Rc::new(RefCell::new(Vec::new()));
    let binding = counting_binding(draws, |_ctx, _surface| {});

    let mut harness = Harness::new(&PACING_CONFIG, binding);
    harness.runtime.host_ready(harness.at(0));

    let mut last_count = 0;
    for ms in 0..500u64 {
        if ms == 100 {
            harness
                .commands
                .send(RuntimeCommand::SetTargetFrameRate(120.0))
                .unwrap();
        }
        if ms == 300 {
            harness
                .commands
                .send(RuntimeCommand::SetTargetFrameRate(15.0))
                .unwrap();
        }
        harness.runtime.pump(harness.at(ms));

        let count = harness.runtime.context().frame_count();
        assert!(count >= last_count, "frame_count went backwards");
        last_count = count;
    }

    assert!(last_count > 0);
}
