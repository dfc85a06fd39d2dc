use chrono::{Duration, NaiveDate, NaiveDateTime};
use gaptime::face::{Hand, Ring};
use gaptime::logger::Log;
use gaptime::schedule::InvertWindow;
use gaptime::{Effect, Engine, InvertPolicy, OutboundRequest, Outbox, Settings, UpdateBatch};
use mockall::mock;
use proptest::prelude::*;

mock! {
    pub Companion {}
    impl Outbox for Companion {
        fn send(&mut self, request: &OutboundRequest) -> anyhow::Result<()>;
    }
}

fn at(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

fn companion_expecting(requests: usize) -> MockCompanion {
    let mut companion = MockCompanion::new();
    companion
        .expect_send()
        .withf(|request| *request == OutboundRequest::RequestRefresh)
        .times(requests)
        .returning(|_| Ok(()));
    companion
}

/// Tick once per minute over `[from, to]`.
fn tick_minutes(
    engine: &mut Engine,
    companion: &mut MockCompanion,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Vec<Effect> {
    let mut effects = Vec::new();
    let mut now = from;
    while now <= to {
        effects.extend(engine.tick(now, companion));
        now += Duration::minutes(1);
    }
    effects
}

#[test]
fn test_fixed_window_inverts_between_eight_and_five() {
    let mut engine = Engine::new(Settings::default());
    let batch = UpdateBatch::from_json(
        r#"{"invertPolicy":"time","windowStartHour":8,"windowStartMinute":0,"windowEndHour":17,"windowEndMinute":0}"#,
    )
    .unwrap();
    engine.apply_update(&batch, at(1, 7, 0, 0));

    let mut companion = companion_expecting(0);
    engine.tick(at(1, 7, 59, 0), &mut companion);
    assert!(!engine.is_inverted());

    let effects = engine.tick(at(1, 8, 0, 0), &mut companion);
    assert!(effects.contains(&Effect::SetInverted(true)));

    let effects = engine.tick(at(1, 16, 59, 0), &mut companion);
    assert!(!effects.iter().any(|e| matches!(e, Effect::SetInverted(_))));
    assert!(engine.is_inverted());

    let effects = engine.tick(at(1, 17, 0, 0), &mut companion);
    assert!(effects.contains(&Effect::SetInverted(false)));
}

#[test]
fn test_sun_window_is_requested_then_followed() {
    let mut engine = Engine::new(Settings {
        invert_policy: InvertPolicy::SunriseWindow,
        ..Settings::default()
    });

    // First tick re-anchors the window
    let mut companion = companion_expecting(1);
    engine.tick(at(1, 5, 3, 0), &mut companion);
    companion.checkpoint();

    let reply = UpdateBatch::new()
        .with("windowStartHour", 6u8)
        .with("windowStartMinute", 10u8)
        .with("windowEndHour", 19u8)
        .with("windowEndMinute", 45u8)
        .with("refreshAck", 1i64);
    engine.apply_update(&reply, at(1, 5, 3, 30));
    assert_eq!(engine.scheduler().refresh().last_refresh_minute, Some(303));

    let mut companion = companion_expecting(0);
    let effects = tick_minutes(&mut engine, &mut companion, at(1, 5, 4, 0), at(1, 6, 0, 0));
    assert!(!effects.contains(&Effect::SetInverted(true)));

    let effects = tick_minutes(&mut engine, &mut companion, at(1, 6, 1, 0), at(1, 6, 10, 0));
    assert!(effects.contains(&Effect::SetInverted(true)));
}

#[test]
fn test_refresh_throttle_over_an_hour() {
    let mut engine = Engine::new(Settings {
        invert_policy: InvertPolicy::SunsetWindow,
        invert_window: InvertWindow::between((18, 30), (23, 59)),
        ..Settings::default()
    });

    let mut companion = companion_expecting(1);
    engine.tick(at(1, 10, 0, 0), &mut companion);
    companion.checkpoint();

    engine.apply_update(
        &UpdateBatch::from_json(r#"{"refreshAck":1}"#).unwrap(),
        at(1, 10, 0, 5),
    );

    // 10:20 and 10:40 are boundaries but the bounds are still fresh; 11:00 is not
    let mut companion = companion_expecting(1);
    tick_minutes(&mut engine, &mut companion, at(1, 10, 1, 0), at(1, 11, 0, 0));
    companion.checkpoint();

    // Unanswered: every later boundary asks again
    let mut companion = companion_expecting(2);
    tick_minutes(&mut engine, &mut companion, at(1, 11, 1, 0), at(1, 11, 40, 0));
}

#[test]
fn test_midnight_requests_new_bounds_for_sun_policies_only() {
    let mut sun = Engine::new(Settings {
        invert_policy: InvertPolicy::SunsetWindow,
        ..Settings::default()
    });
    let mut fixed = Engine::new(Settings {
        invert_policy: InvertPolicy::FixedWindow,
        invert_window: InvertWindow::between((8, 0), (17, 0)),
        ..Settings::default()
    });

    let mut companion = companion_expecting(1);
    sun.tick(at(1, 23, 59, 59), &mut companion);
    companion.checkpoint();
    sun.apply_update(
        &UpdateBatch::from_json(r#"{"refreshAck":1}"#).unwrap(),
        at(1, 23, 59, 59),
    );

    let mut companion = companion_expecting(1);
    sun.tick(at(2, 0, 0, 0), &mut companion);

    let mut companion = companion_expecting(0);
    fixed.tick(at(1, 23, 59, 59), &mut companion);
    fixed.tick(at(2, 0, 0, 0), &mut companion);
}

#[test]
fn test_unanswered_midnight_request_is_retried() {
    let mut engine = Engine::new(Settings {
        invert_policy: InvertPolicy::SunriseWindow,
        ..Settings::default()
    });

    let mut companion = companion_expecting(1);
    engine.tick(at(1, 23, 0, 0), &mut companion);
    companion.checkpoint();
    engine.apply_update(
        &UpdateBatch::from_json(r#"{"refreshAck":1}"#).unwrap(),
        at(1, 23, 0, 0),
    );

    // 23:20 and 23:40 are fresh; midnight asks once and gets no answer
    let mut companion = companion_expecting(1);
    tick_minutes(&mut engine, &mut companion, at(1, 23, 1, 0), at(2, 0, 0, 0));
    companion.checkpoint();

    let mut companion = companion_expecting(1);
    tick_minutes(&mut engine, &mut companion, at(2, 0, 1, 0), at(2, 0, 20, 0));
    companion.checkpoint();

    // Answered this time: quiet until an hour later
    engine.apply_update(
        &UpdateBatch::from_json(r#"{"refreshAck":1}"#).unwrap(),
        at(2, 0, 20, 5),
    );
    let mut companion = companion_expecting(0);
    tick_minutes(&mut engine, &mut companion, at(2, 0, 21, 0), at(2, 1, 19, 0));
}

#[test]
fn test_undeliverable_request_keeps_the_face_running() {
    let mut engine = Engine::new(Settings {
        invert_policy: InvertPolicy::SunriseWindow,
        ..Settings::default()
    });
    let mut companion = MockCompanion::new();
    companion
        .expect_send()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("no companion connected")));

    let effects = engine.tick(at(1, 12, 0, 0), &mut companion);
    assert_eq!(effects.len(), 3);
    assert!(!engine.scheduler().refresh().is_valid());
}

#[test]
fn test_hand_order_assignment_moves_hands_between_rings() {
    let mut engine = Engine::new(Settings::default());
    let mut companion = companion_expecting(0);
    engine.tick(at(1, 10, 8, 30), &mut companion);

    let effects = engine.apply_update(
        &UpdateBatch::from_json(r#"{"handOrder":"HMS"}"#).unwrap(),
        at(1, 10, 8, 30),
    );
    assert_eq!(
        effects,
        vec![
            Effect::Redraw(Ring::Outer),
            Effect::Redraw(Ring::Middle),
            Effect::Redraw(Ring::Inner)
        ]
    );

    let layout = engine.layout();
    let hands: Vec<Hand> = layout.iter().flatten().map(|shown| shown.hand).collect();
    assert_eq!(hands, vec![Hand::Hour, Hand::Minute, Hand::Second]);

    // Only the inner ring carries seconds now
    let effects = engine.tick(at(1, 10, 8, 31), &mut companion);
    assert_eq!(effects, vec![Effect::Redraw(Ring::Inner)]);
}

#[test]
fn test_legacy_batch_keys_are_understood() {
    let mut engine = Engine::new(Settings::default());
    let batch = UpdateBatch::from_json(
        r#"{"KEY_INVERT":"time","KEY_INVERT_START":"21:30","KEY_INVERT_END":"23:15","KEY_TEXT_TIME":1}"#,
    )
    .unwrap();
    let effects = engine.apply_update(&batch, at(1, 12, 0, 0));

    assert_eq!(effects, vec![Effect::SetTextClockVisible(true)]);
    let settings = engine.settings();
    assert_eq!(settings.invert_policy, InvertPolicy::FixedWindow);
    assert_eq!(settings.invert_window, InvertWindow::between((21, 30), (23, 15)));
}

fn entry_strategy() -> impl Strategy<Value = (String, serde_json::Value)> {
    let key = prop::sample::select(vec![
        "invertPolicy",
        "textClockVisible",
        "handOrder",
        "windowStartHour",
        "windowStartMinute",
        "windowEndHour",
        "windowEndMinute",
        "refreshAck",
        "invertStart",
        "bogus",
    ]);
    let value = prop_oneof![
        any::<bool>().prop_map(serde_json::Value::from),
        (0i64..100).prop_map(serde_json::Value::from),
        prop::sample::select(vec!["on", "off", "time", "sunrise", "sunset", "HMS", "S", "07:45"])
            .prop_map(serde_json::Value::from),
    ];
    (key.prop_map(String::from), value)
}

proptest! {
    #[test]
    fn prop_applying_a_batch_twice_changes_nothing_more(
        entries in prop::collection::vec(entry_strategy(), 0..8),
        minute in 0u32..1440,
    ) {
        let object: serde_json::Map<String, serde_json::Value> = entries.into_iter().collect();
        let batch = UpdateBatch::from_json(&serde_json::Value::Object(object).to_string()).unwrap();
        let now = at(5, minute / 60, minute % 60, 0);
        Log::set_enabled(false);

        let mut engine = Engine::new(Settings::default());
        engine.apply_update(&batch, now);
        let once = engine.settings();

        let effects = engine.apply_update(&batch, now);
        prop_assert_eq!(engine.settings(), once);
        prop_assert!(!effects.iter().any(|e| matches!(e, Effect::SetInverted(_))));
    }
}
