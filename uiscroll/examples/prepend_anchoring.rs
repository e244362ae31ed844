// Example: prepend items above the viewport while the host applies its own scroll anchoring.
use uiscroll::{
    Direction, ManualScheduler, MemoryRoutines, ScrollOrigin, Settings, UserSettings, Viewport,
};

fn main() {
    let settings = Settings::merge(UserSettings::new().with_item_size(Some(25))).unwrap();
    let (routines, content) = MemoryRoutines::container(250.0);
    let mut v = Viewport::new(content, settings, routines, ManualScheduler::new()).unwrap();
    v.reset(0.0);
    let host = *v.host_element();

    // The user scrolled a little; the workflow then renders 4 items above the window and
    // shrinks the backward padding accordingly.
    v.set_position(300.0);
    v.set_padding_size(Direction::Backward, 200.0);
    v.disable_scroll_for_one_loop();

    // Stay at 300 now, land on 400 once layout has settled.
    v.set_position_safe(300.0, 400.0, |v, outcome| {
        println!(
            "fulfilled: requested={} written={} compensation={} state={:?}",
            outcome.requested,
            outcome.position,
            outcome.compensation,
            v.scroll_state()
        );
    });

    // The browser's scroll anchoring nudges the offset before the next frame.
    v.routines_mut().shift_scroll(host, -15.0);
    assert_eq!(v.on_scroll(), ScrollOrigin::Synthetic);

    for frame in v.scheduler_mut().take_frames() {
        v.run_frame(frame);
    }
    for task in v.scheduler_mut().take_tasks() {
        v.run_task(task);
    }

    assert_eq!(v.on_scroll(), ScrollOrigin::Synthetic);
    println!(
        "scroll={} disabled={} next event={:?}",
        v.scroll_position(),
        v.is_scroll_disabled(),
        v.on_scroll()
    );
}
