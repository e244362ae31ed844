use crate::*;

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

type TestViewport = Viewport<MemoryRoutines, ManualScheduler>;

fn settings(user: UserSettings) -> Settings {
    Settings::merge(user).unwrap()
}

fn container(user: UserSettings, viewport_size: f64) -> (TestViewport, NodeId) {
    let (routines, content) = MemoryRoutines::container(viewport_size);
    let v = Viewport::new(content, settings(user), routines, ManualScheduler::new()).unwrap();
    (v, content)
}

fn window(user: UserSettings, viewport_size: f64) -> (TestViewport, NodeId) {
    let (routines, content) = MemoryRoutines::window(viewport_size);
    let user = user.with_window_viewport(true);
    let v = Viewport::new(content, settings(user), routines, ManualScheduler::new()).unwrap();
    (v, content)
}

fn host(v: &TestViewport) -> NodeId {
    *v.host_element()
}

fn fire_frames(v: &mut TestViewport) -> usize {
    let frames = v.scheduler_mut().take_frames();
    frames.into_iter().filter(|&f| v.run_frame(f)).count()
}

fn fire_tasks(v: &mut TestViewport) -> usize {
    let tasks = v.scheduler_mut().take_tasks();
    tasks.into_iter().filter(|&t| v.run_task(t)).count()
}

fn record_outcome() -> (
    Rc<RefCell<Vec<SyntheticOutcome>>>,
    impl FnOnce(&mut TestViewport, SyntheticOutcome) + 'static,
) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    (log, move |_: &mut TestViewport, outcome: SyntheticOutcome| {
        sink.borrow_mut().push(outcome)
    })
}

// 10 items before the window at 25px each.
fn bounded_user() -> UserSettings {
    UserSettings::new()
        .with_start_index(11)
        .with_index_bounds(Some(1), None)
        .with_item_size(Some(25))
}

#[test]
fn reset_positions_scroll_at_backward_padding() {
    let (mut v, _) = container(bounded_user(), 100.0);
    v.reset(0.0);

    assert_eq!(v.paddings().backward.size(), 250.0);
    assert_eq!(v.scroll_position(), 250.0);
    assert_eq!(v.state().bwd_average_size_items_count, 10.0);
    assert_eq!(v.start_delta(), 0.0);
    assert_eq!(v.scroll_state(), ScrollStateSnapshot::default());
}

#[test]
fn reset_without_item_size_estimates_zero() {
    for item_size in [None, Some(0)] {
        let user = bounded_user().with_item_size(item_size);
        let (mut v, _) = container(user, 100.0);
        v.reset(0.0);
        assert_eq!(v.state().bwd_average_size_items_count, 0.0);
        assert_eq!(v.paddings().backward.size(), 0.0);
        assert_eq!(v.scroll_position(), 0.0);
    }
}

#[test]
fn reset_is_idempotent() {
    let (mut v, content) = container(bounded_user(), 100.0);
    let h = host(&v);
    v.routines_mut().node_mut(content).offset = 500.0;
    v.routines_mut().node_mut(h).offset = 300.0;

    v.reset(0.0);
    let first = (
        v.offset(),
        v.paddings().backward.size(),
        v.paddings().forward.size(),
        v.scroll_position(),
        v.state().bwd_average_size_items_count,
    );
    let writes = v.routines().scroll_writes();

    v.reset(v.scroll_position());
    let second = (
        v.offset(),
        v.paddings().backward.size(),
        v.paddings().forward.size(),
        v.scroll_position(),
        v.state().bwd_average_size_items_count,
    );
    assert_eq!(first, second);
    // The offset already matches, so the second reset does not touch the host.
    assert_eq!(v.routines().scroll_writes(), writes);
}

#[test]
fn reset_sizes_forward_padding_from_max_index() {
    let user = bounded_user().with_index_bounds(Some(1), Some(20));
    let (mut v, content) = container(user, 100.0);
    v.routines_mut().node_mut(content).offset = 40.0;
    v.reset(0.0);
    // (20 - 11 + 1) * 25 minus the 40px offset.
    assert_eq!(v.paddings().forward.size(), 210.0);

    let (mut v, _) = container(UserSettings::new(), 100.0);
    v.reset(0.0);
    assert_eq!(v.paddings().forward.size(), 100.0);
    assert_eq!(v.paddings().backward.size(), 0.0);
}

#[test]
fn reset_handles_extreme_index_bounds() {
    let user = UserSettings::new()
        .with_start_index(0)
        .with_index_bounds(None, Some(i64::MAX))
        .with_item_size(Some(1));
    let (mut v, _) = container(user, 100.0);
    v.reset(0.0);
    assert!(v.paddings().forward.size() > 0.0);
    assert_eq!(v.paddings().backward.size(), 0.0);

    let user = UserSettings::new()
        .with_start_index(1)
        .with_index_bounds(Some(i64::MIN), None)
        .with_item_size(Some(1));
    let (mut v, _) = container(user, 100.0);
    v.reset(0.0);
    let backward = v.paddings().backward.size();
    assert!(backward.is_finite() && backward > 0.0);
    assert_eq!(v.state().bwd_average_size_items_count, backward);
    assert_eq!(v.paddings().forward.size(), 100.0);
}

#[test]
fn reset_keeps_caller_position_as_previous() {
    let (mut v, _) = container(bounded_user(), 100.0);
    v.reset(77.0);
    assert_eq!(v.scroll_position(), 250.0);
    assert_eq!(v.previous_position(), 77.0);

    // No write needed this time.
    v.reset(33.0);
    assert_eq!(v.scroll_position(), 250.0);
    assert_eq!(v.previous_position(), 33.0);
}

#[test]
fn reset_writes_padding_sizes_to_host_elements() {
    let (mut v, _) = container(bounded_user(), 100.0);
    v.reset(0.0);
    let backward = *v.paddings().backward.element();
    let forward = *v.paddings().forward.element();
    assert_eq!(v.routines().node(backward).size, 250.0);
    assert_eq!(v.routines().node(forward).size, 100.0);
}

#[test]
fn reset_reevaluates_scroll_anchoring() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    v.reset(0.0);
    assert!(v.scroll_anchoring());

    let h = host(&v);
    v.routines_mut().node_mut(h).anchoring_off = true;
    v.reset(0.0);
    assert!(!v.scroll_anchoring());
}

#[test]
fn set_position_same_value_skips_host_write() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    assert_eq!(v.set_position(40.0), 40.0);
    let writes = v.routines().scroll_writes();

    assert_eq!(v.set_position(40.0), 40.0);
    assert_eq!(v.routines().scroll_writes(), writes);
}

#[test]
fn set_position_returns_what_the_host_applied() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    let h = host(&v);
    v.routines_mut().node_mut(h).max_scroll = Some(300.0);

    assert_eq!(v.set_position(120.0), 120.0);
    assert_eq!(v.set_position(500.0), 300.0);
    assert_eq!(v.previous_position(), 120.0);

    v.set_scroll_position(10.0);
    assert_eq!(v.scroll_position(), 10.0);
    assert_eq!(v.previous_position(), 300.0);
}

#[test]
fn synthetic_correction_without_anchoring_lands_on_target() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    let (log, done) = record_outcome();

    v.set_position_safe(100.0, 150.0, done);
    assert_eq!(v.scroll_position(), 100.0);
    let snap = v.scroll_state();
    assert!(snap.is_in_flight());
    assert_eq!(snap.synthetic_position, Some(150.0));
    assert!(!snap.synthetic_fulfill);
    assert_eq!(snap.effective_position(v.scroll_position()), 150.0);
    assert!(log.borrow().is_empty());

    assert_eq!(fire_frames(&mut v), 1);
    assert_eq!(v.scroll_position(), 150.0);
    assert!(v.scroll_state().synthetic_fulfill);
    assert_eq!(v.scroll_state().pending_frame, None);

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].requested, 150.0);
    assert_eq!(log[0].position, 150.0);
    assert_eq!(log[0].compensation, 0.0);
    assert_eq!(log[0].actual, 150.0);
}

#[test]
fn synthetic_correction_compensates_anchoring_drift() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    let h = host(&v);
    let seen = Rc::new(Cell::new(None));
    let seen_in_done = Rc::clone(&seen);

    v.set_position_safe(100.0, 150.0, move |v, outcome| {
        seen_in_done.set(Some((v.scroll_state(), outcome)));
    });
    // Native anchoring moved the offset back by 20px before the frame.
    v.routines_mut().shift_scroll(h, -20.0);
    assert_eq!(v.scroll_position(), 80.0);

    fire_frames(&mut v);
    assert_eq!(v.scroll_position(), 130.0);

    let (snap, outcome) = seen.get().unwrap();
    assert_eq!(snap.synthetic_position, Some(130.0));
    assert!(snap.synthetic_fulfill);
    assert_eq!(outcome.position, 130.0);
    assert_eq!(outcome.compensation, 20.0);
}

#[test]
fn synthetic_correction_ignores_forward_drift() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    let h = host(&v);
    let (log, done) = record_outcome();

    v.set_position_safe(100.0, 150.0, done);
    v.routines_mut().shift_scroll(h, 20.0);
    fire_frames(&mut v);

    assert_eq!(v.scroll_position(), 150.0);
    assert_eq!(v.scroll_state().synthetic_position, Some(150.0));
    assert_eq!(log.borrow()[0].compensation, 0.0);
}

#[test]
fn synthetic_correction_last_call_wins() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    let (first_log, first_done) = record_outcome();
    let (second_log, second_done) = record_outcome();

    v.set_position_safe(100.0, 150.0, first_done);
    let first_frame = v.scheduler().pending_frames()[0];
    v.set_position_safe(200.0, 260.0, second_done);

    assert_eq!(v.scheduler().cancelled_frames(), &[first_frame]);
    assert_eq!(v.scheduler().pending_frames().len(), 1);
    assert_eq!(v.scroll_state().synthetic_position, Some(260.0));

    // A host that could not cancel still delivers the old frame; it must be ignored.
    assert!(!v.run_frame(first_frame));
    assert_eq!(fire_frames(&mut v), 1);

    assert!(first_log.borrow().is_empty());
    assert_eq!(second_log.borrow().len(), 1);
    assert_eq!(v.scroll_position(), 260.0);
}

#[test]
fn synthetic_completion_runs_at_most_once() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    let (log, done) = record_outcome();
    v.set_position_safe(10.0, 30.0, done);
    let frame = v.scheduler().pending_frames()[0];

    assert!(v.run_frame(frame));
    assert!(!v.run_frame(frame));
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn synthetic_completion_can_drive_the_viewport() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    v.set_position_safe(10.0, 30.0, |v, outcome| {
        v.set_position(outcome.position + 5.0);
        v.disable_scroll_for_one_loop();
    });
    fire_frames(&mut v);
    assert_eq!(v.scroll_position(), 35.0);
    assert!(v.is_scroll_disabled());
}

#[test]
fn cancel_synthetic_drops_completion() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    let (log, done) = record_outcome();
    v.set_position_safe(100.0, 150.0, done);
    let frame = v.scheduler().pending_frames()[0];

    assert!(v.cancel_synthetic());
    assert!(!v.cancel_synthetic());
    assert_eq!(v.scroll_state(), ScrollStateSnapshot::default());
    assert_eq!(v.scheduler().cancelled_frames(), &[frame]);
    assert!(!v.run_frame(frame));
    assert!(log.borrow().is_empty());
    assert_eq!(v.scroll_position(), 100.0);
}

#[test]
fn reset_cancels_pending_correction() {
    let (mut v, _) = container(bounded_user(), 100.0);
    let (log, done) = record_outcome();
    v.set_position_safe(100.0, 150.0, done);
    let frame = v.scheduler().pending_frames()[0];

    v.reset(100.0);
    assert_eq!(v.scroll_state(), ScrollStateSnapshot::default());
    assert!(!v.run_frame(frame));
    assert!(log.borrow().is_empty());
    assert_eq!(v.scroll_position(), 250.0);
}

#[test]
fn scroll_events_during_synthetic_correction_are_not_user_input() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    assert_eq!(v.on_scroll(), ScrollOrigin::User);

    v.set_position_safe(100.0, 150.0, |_, _| {});
    assert_eq!(v.on_scroll(), ScrollOrigin::Synthetic);

    fire_frames(&mut v);
    // The event produced by the final write.
    assert_eq!(v.on_scroll(), ScrollOrigin::Synthetic);
    assert_eq!(v.scroll_state().synthetic_position, None);
    assert_eq!(v.on_scroll(), ScrollOrigin::User);
}

#[test]
fn user_scroll_after_fulfillment_is_user_input() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    v.set_position_safe(100.0, 150.0, |_, _| {});
    fire_frames(&mut v);

    v.set_position(170.0);
    assert_eq!(v.on_scroll(), ScrollOrigin::User);
    assert_eq!(v.scroll_state().synthetic_position, None);
}

#[test]
fn offset_in_bounded_container_is_relative_to_host() {
    let (mut v, content) = container(UserSettings::new(), 100.0);
    let h = host(&v);
    v.routines_mut().node_mut(content).offset = 500.0;
    v.routines_mut().node_mut(h).offset = 300.0;
    v.set_offset();
    assert_eq!(v.offset(), 200.0);
}

#[test]
fn offset_in_window_mode_is_document_offset() {
    let (mut v, content) = window(UserSettings::new(), 100.0);
    let h = host(&v);
    v.routines_mut().node_mut(content).offset = 500.0;
    v.routines_mut().node_mut(h).offset = 300.0;
    v.set_offset();
    assert_eq!(v.offset(), 500.0);
}

#[test]
fn window_anchoring_off_requires_body_and_host() {
    let (mut v, _) = window(UserSettings::new(), 100.0);
    let h = host(&v);
    let body = v.routines().document_body(v.element()).unwrap();

    for (body_off, host_off, expected) in [
        (false, false, false),
        (true, false, false),
        (false, true, false),
        (true, true, true),
    ] {
        v.routines_mut().node_mut(body).anchoring_off = body_off;
        v.routines_mut().node_mut(h).anchoring_off = host_off;
        assert_eq!(v.is_anchoring_off(), expected, "body={body_off} host={host_off}");
    }
}

#[test]
fn container_anchoring_off_depends_on_host_only() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    let h = host(&v);
    let body = v.routines_mut().add_node(MemoryNode {
        anchoring_off: true,
        ..MemoryNode::default()
    });
    v.routines_mut().set_body(body);

    assert!(!v.is_anchoring_off());
    v.routines_mut().node_mut(h).anchoring_off = true;
    assert!(v.is_anchoring_off());
    v.routines_mut().node_mut(body).anchoring_off = false;
    assert!(v.is_anchoring_off());
}

#[test]
fn disable_scroll_for_one_loop_restores_overflow() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    let h = host(&v);

    v.disable_scroll_for_one_loop();
    assert!(v.is_scroll_disabled());
    assert_eq!(v.routines().node(h).overflow, OVERFLOW_HIDDEN);

    // Re-entrant call: no second task, no premature restore.
    v.disable_scroll_for_one_loop();
    assert_eq!(v.scheduler().pending_tasks().len(), 1);

    assert_eq!(fire_tasks(&mut v), 1);
    assert!(!v.is_scroll_disabled());
    assert_eq!(v.routines().node(h).overflow, "auto");
}

#[test]
fn disable_scroll_is_noop_when_overflow_already_hidden() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    let h = host(&v);
    v.routines_mut().set_overflow(&h, OVERFLOW_HIDDEN);

    v.disable_scroll_for_one_loop();
    assert!(!v.is_scroll_disabled());
    assert!(v.scheduler().pending_tasks().is_empty());
    assert!(!v.run_task(TaskHandle(42)));
}

#[test]
fn geometry_queries_delegate_to_routines() {
    let (mut v, content) = container(UserSettings::new().with_padding(0.25), 200.0);
    let h = host(&v);
    v.routines_mut().node_mut(h).edge_start = 10.0;
    v.routines_mut().node_mut(content).size = 1200.0;
    v.routines_mut().node_mut(content).edge_start = -40.0;

    assert_eq!(v.size(), 200.0);
    assert_eq!(v.scrollable_size(), 1200.0);
    assert_eq!(v.buffer_padding(), 50.0);

    assert_eq!(v.edge(Direction::Backward, false), 10.0);
    assert_eq!(v.edge(Direction::Forward, false), 210.0);
    assert_eq!(v.edge(Direction::Backward, true), 210.0);
    assert_eq!(v.edge(Direction::Forward, true), 10.0);

    assert_eq!(v.element_edge(&content, Direction::Backward, false), -40.0);
    assert_eq!(v.element_edge(&content, Direction::Forward, false), 1160.0);
}

#[test]
fn padding_sizes_are_never_negative() {
    let (mut v, _) = container(UserSettings::new(), 100.0);
    v.set_padding_size(Direction::Forward, -30.0);
    v.set_padding_size(Direction::Backward, f64::NAN);
    assert_eq!(v.paddings().forward.size(), 0.0);
    assert_eq!(v.paddings().backward.size(), 0.0);

    v.set_padding_size(Direction::Backward, 75.0);
    let backward = v.paddings().by_direction(Direction::Forward, true);
    assert_eq!(backward.direction(), Direction::Backward);
    assert_eq!(backward.size(), 75.0);
    assert_eq!(v.routines().node(*backward.element()).size, 75.0);
}

#[test]
fn viewport_new_reports_missing_elements() {
    let mut routines = MemoryRoutines::new();
    let orphan = routines.add_node(MemoryNode::default());
    let err = Viewport::new(orphan, Settings::default(), routines, ManualScheduler::new())
        .unwrap_err();
    assert_eq!(err, ViewportError::MissingHost);

    let mut routines = MemoryRoutines::new();
    let host = routines.add_node(MemoryNode::default());
    let content = routines.add_node(MemoryNode {
        parent: Some(host),
        ..MemoryNode::default()
    });
    let err = Viewport::new(
        content,
        Settings::default(),
        routines.clone(),
        ManualScheduler::new(),
    )
    .unwrap_err();
    assert_eq!(err, ViewportError::MissingPadding(Direction::Backward));

    routines.set_scrolling_element(host);
    let window = settings(UserSettings::new().with_window_viewport(true));
    let err = Viewport::new(content, window, routines, ManualScheduler::new()).unwrap_err();
    assert_eq!(err, ViewportError::MissingBody);
}

#[test]
fn settings_defaults() {
    let s = Settings::default();
    assert_eq!(s, Settings::merge(UserSettings::default()).unwrap());
    assert_eq!(s.start_index(), 1);
    assert_eq!(s.min_index(), None);
    assert_eq!(s.max_index(), None);
    assert_eq!(s.item_size(), None);
    assert_eq!(s.buffer_size(), 5);
    assert_eq!(s.padding(), 0.5);
    assert!(!s.infinite());
    assert!(!s.horizontal());
    assert!(!s.window_viewport());
}

#[test]
fn settings_merge_overrides_only_given_keys() {
    let user = UserSettings::from_entries([
        ("start_index", SettingValue::Int(90)),
        ("buffer_size", SettingValue::Int(15)),
        ("item_size", SettingValue::Int(25)),
        ("padding", SettingValue::Float(1.5)),
        ("window_viewport", SettingValue::Bool(true)),
    ])
    .unwrap();
    let s = Settings::merge(user).unwrap();
    assert_eq!(s.start_index(), 90);
    assert_eq!(s.buffer_size(), 15);
    assert_eq!(s.item_size(), Some(25));
    assert_eq!(s.known_item_size(), Some(25.0));
    assert_eq!(s.padding(), 1.5);
    assert!(s.window_viewport());
    assert!(!s.horizontal());
}

#[test]
fn settings_reject_unknown_keys_and_bad_types() {
    let mut user = UserSettings::new();
    assert_eq!(
        user.set("bufferSizee", SettingValue::Int(1)),
        Err(SettingsError::UnknownKey {
            key: "bufferSizee".into()
        })
    );
    assert!(matches!(
        user.set("infinite", SettingValue::Int(1)),
        Err(SettingsError::InvalidType { key: "infinite", .. })
    ));
    assert!(matches!(
        user.set("start_index", SettingValue::Float(1.5)),
        Err(SettingsError::InvalidType { key: "start_index", .. })
    ));
    assert!(matches!(
        user.set("item_size", SettingValue::Int(-3)),
        Err(SettingsError::InvalidValue { key: "item_size", .. })
    ));
    assert_eq!(user, UserSettings::default());

    user.set("item_size", SettingValue::Int(20)).unwrap();
    user.set("item_size", SettingValue::Null).unwrap();
    assert_eq!(user.item_size, None);
    for key in SETTING_KEYS {
        assert!(!matches!(
            user.clone().set(key, SettingValue::Null),
            Err(SettingsError::UnknownKey { .. })
        ));
    }
}

#[test]
fn settings_validate_merged_values() {
    let bad_padding = UserSettings::new().with_padding(0.0);
    assert!(matches!(
        Settings::merge(bad_padding),
        Err(SettingsError::InvalidValue { key: "padding", .. })
    ));
    let nan_padding = UserSettings::new().with_padding(f64::NAN);
    assert!(Settings::merge(nan_padding).is_err());

    let no_buffer = UserSettings::new().with_buffer_size(0);
    assert!(matches!(
        Settings::merge(no_buffer),
        Err(SettingsError::InvalidValue { key: "buffer_size", .. })
    ));

    let inverted = UserSettings::new().with_index_bounds(Some(10), Some(1));
    assert_eq!(
        Settings::merge(inverted),
        Err(SettingsError::InvalidRange { min: 10, max: 1 })
    );
}

#[cfg(feature = "serde")]
#[test]
fn user_settings_json_rejects_unknown_keys() {
    let json = r#"{"start_index": 5, "item_size": null}"#;
    let user: UserSettings = serde_json::from_str(json).unwrap();
    assert_eq!(user, UserSettings::new().with_start_index(5));

    let err = serde_json::from_str::<UserSettings>(r#"{"bufferSizee": 1}"#).unwrap_err();
    assert!(err.to_string().contains("unknown field"));
}

#[cfg(feature = "serde")]
#[test]
fn settings_json_is_validated() {
    assert!(serde_json::from_str::<Settings>(r#"{"padding": 0}"#).is_err());
    assert!(serde_json::from_str::<Settings>(r#"{"min_index": 10, "max_index": 1}"#).is_err());
    assert!(serde_json::from_str::<Settings>(r#"{"unknown": true}"#).is_err());

    let s: Settings = serde_json::from_str(r#"{"buffer_size": 12}"#).unwrap();
    assert_eq!(s.buffer_size(), 12);
    assert_eq!(s.padding(), DEFAULT_PADDING);
}

#[cfg(feature = "serde")]
#[test]
fn settings_json_round_trip() {
    let s = settings(
        UserSettings::new()
            .with_start_index(90)
            .with_index_bounds(Some(-5), Some(200))
            .with_item_size(Some(25))
            .with_padding(1.5)
            .with_horizontal(true),
    );
    let json = serde_json::to_string(&s).unwrap();
    let back: Settings = serde_json::from_str(&json).unwrap();
    assert_eq!(back, s);
}
