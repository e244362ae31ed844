use uiscroll::{ManualScheduler, MemoryRoutines, Settings, UserSettings, Viewport};

fn main() {
    let settings = Settings::merge(
        UserSettings::new()
            .with_start_index(21)
            .with_index_bounds(Some(1), Some(1_000))
            .with_item_size(Some(20)),
    )
    .unwrap();

    let (routines, content) = MemoryRoutines::container(400.0);
    let mut v = Viewport::new(content, settings, routines, ManualScheduler::new()).unwrap();
    v.reset(0.0);

    println!(
        "offset={} backward={} forward={} scroll={} buffer={}",
        v.offset(),
        v.paddings().backward.size(),
        v.paddings().forward.size(),
        v.scroll_position(),
        v.buffer_padding()
    );
}
