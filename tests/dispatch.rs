//! Dispatch behavior: ranked ordering, stop propagation, failure
//! isolation and FIFO interleaving.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use eventmatch::{Deferral, HandlerError, HandlerRef, Name, Observer, Off, Pattern};

type Log = Arc<Mutex<Vec<&'static str>>>;

fn observer_with_queue() -> (Observer, Deferral) {
    let queue = Deferral::new();
    let obj = Observer::builder()
        .scheduler(Arc::new(queue.clone()))
        .build();
    (obj, queue)
}

fn recording(log: &Log, label: &'static str) -> HandlerRef {
    let log = Arc::clone(log);
    HandlerRef::from_fn(move |_event, _args| {
        log.lock().unwrap().push(label);
        Ok(())
    })
}

fn stopping(log: &Log, label: &'static str) -> HandlerRef {
    let log = Arc::clone(log);
    HandlerRef::from_fn(move |event, _args| {
        log.lock().unwrap().push(label);
        event.stop();
        Ok(())
    })
}

fn pattern(value: Value) -> Pattern {
    Pattern::from_json(&value).unwrap()
}

fn name(value: Value) -> Name {
    Name::from_json(&value).unwrap()
}

#[tokio::test]
async fn test_specificity_orders_map_matches() {
    let (obj, queue) = observer_with_queue();
    let log: Log = Arc::default();

    obj.on(pattern(json!({})), recording(&log, "empty"));
    obj.on(pattern(json!({"a": 1})), recording(&log, "a1"));
    obj.on(pattern(json!({"a": 1, "b": 2})), recording(&log, "a1b2"));
    obj.on(pattern(json!({"a": 1, "c": 3})), recording(&log, "a1c3"));
    obj.on(
        pattern(json!({"a": 1, "c": 3, "d": 4})),
        recording(&log, "a1c3d4"),
    );
    obj.on(pattern(json!({"a": 2})), recording(&log, "a2"));

    obj.trigger(name(json!({"a": 1, "b": 2, "c": 3, "d": 4, "e": 5})));
    queue.flush().await;

    assert_eq!(
        *log.lock().unwrap(),
        vec!["a1c3d4", "a1b2", "a1c3", "a1", "empty"]
    );
}

#[tokio::test]
async fn test_stop_halts_lower_ranked_matches() {
    let (obj, queue) = observer_with_queue();
    let log: Log = Arc::default();

    obj.on(pattern(json!({})), recording(&log, "empty"));
    obj.on(pattern(json!({"a": 1})), recording(&log, "a1"));
    obj.on(pattern(json!({"a": 1, "b": 2})), stopping(&log, "a1b2"));
    obj.on(
        pattern(json!({"a": 1, "c": 3, "d": 4})),
        recording(&log, "a1c3d4"),
    );

    obj.trigger(name(json!({"a": 1, "b": 2, "c": 3, "d": 4, "e": 5})));
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["a1c3d4", "a1b2"]);
}

#[tokio::test]
async fn test_stop_token_is_per_trigger_call() {
    let (obj, queue) = observer_with_queue();
    let log: Log = Arc::default();

    obj.on("event", stopping(&log, "first"));
    obj.on("event", recording(&log, "second"));

    obj.trigger("event");
    obj.trigger("event");
    queue.flush().await;

    // Each call stops only its own remaining matches; a later call is
    // unaffected by the earlier call's stop.
    assert_eq!(*log.lock().unwrap(), vec!["first", "first"]);
}

#[tokio::test]
async fn test_error_is_forwarded_to_hook_and_isolated() {
    let queue = Deferral::new();
    let failures: Arc<Mutex<Vec<HandlerError>>> = Arc::default();
    let sink = Arc::clone(&failures);
    let obj = Observer::builder()
        .scheduler(Arc::new(queue.clone()))
        .error_hook(move |err| sink.lock().unwrap().push(err))
        .build();
    let log: Log = Arc::default();

    obj.on(
        "event",
        HandlerRef::from_fn(|_, _| Err(HandlerError::failed("boom"))),
    );
    obj.on("event", recording(&log, "second"));

    obj.trigger("event");
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["second"]);
    let failures = failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert!(!failures[0].is_panic());
    assert!(failures[0].as_message().contains("boom"));
}

#[tokio::test]
async fn test_panic_is_caught_and_reported() {
    let queue = Deferral::new();
    let failures: Arc<Mutex<Vec<HandlerError>>> = Arc::default();
    let sink = Arc::clone(&failures);
    let obj = Observer::builder()
        .scheduler(Arc::new(queue.clone()))
        .error_hook(move |err| sink.lock().unwrap().push(err))
        .build();
    let log: Log = Arc::default();

    obj.on("event", HandlerRef::from_fn(|_, _| panic!("kaboom")));
    obj.on("event", recording(&log, "survivor"));

    obj.trigger("event");
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["survivor"]);
    let failures = failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].is_panic());
    assert!(failures[0].as_message().contains("kaboom"));
}

#[tokio::test]
async fn test_failure_without_hook_does_not_abort_siblings() {
    let (obj, queue) = observer_with_queue();
    let log: Log = Arc::default();

    obj.on(
        "event",
        HandlerRef::from_fn(|_, _| Err(HandlerError::failed("dropped"))),
    );
    obj.on("event", recording(&log, "second"));

    obj.trigger("event");
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["second"]);
}

#[tokio::test]
async fn test_fifo_interleaving_across_observers_sharing_a_queue() {
    let queue = Deferral::new();
    let a = Observer::builder()
        .scheduler(Arc::new(queue.clone()))
        .build();
    let b = Observer::builder()
        .scheduler(Arc::new(queue.clone()))
        .build();
    let log: Log = Arc::default();

    a.on("x", recording(&log, "a"));
    b.on("y", recording(&log, "b"));

    a.trigger("x");
    b.trigger("y");
    a.trigger("x");
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "a"]);
}

#[tokio::test]
async fn test_removal_after_snapshot_does_not_affect_inflight_dispatch() {
    let (obj, queue) = observer_with_queue();
    let log: Log = Arc::default();

    obj.on("event", recording(&log, "c1"));

    obj.trigger("event");
    obj.off(Off::new().with_pattern("event"));
    queue.flush().await;

    // The snapshot taken by `trigger` still runs; the next trigger
    // matches nothing.
    obj.trigger("event");
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["c1"]);
}

#[tokio::test]
async fn test_delimited_names_match_prefixes() {
    let queue = Deferral::new();
    let obj = Observer::builder()
        .scheduler(Arc::new(queue.clone()))
        .delimiter(":")
        .build();
    let log: Log = Arc::default();

    obj.on("a:b", recording(&log, "a:b"));
    obj.on("a", recording(&log, "a"));
    obj.on("a:b:d", recording(&log, "a:b:d"));

    obj.trigger("a:b:c");
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["a:b", "a"]);
}

#[tokio::test]
async fn test_trigger_args_and_event_metadata() {
    let (obj, queue) = observer_with_queue();
    let log: Log = Arc::default();

    let sink = Arc::clone(&log);
    obj.on(
        "event",
        HandlerRef::from_fn(move |event, args| {
            assert_eq!(event.name(), &Name::token("event"));
            assert_eq!(event.matched(), &Pattern::token("event"));
            assert_eq!(event.specificity(), 1);
            assert_eq!(args, &[json!(7), json!("payload")][..]);
            sink.lock().unwrap().push("seen");
            Ok(())
        }),
    );

    obj.trigger_with("event", vec![json!(7), json!("payload")]);
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["seen"]);
}

#[tokio::test]
async fn test_each_trigger_dispatches_independently() {
    let (obj, queue) = observer_with_queue();
    let log: Log = Arc::default();

    obj.on("event", recording(&log, "hit"));

    obj.trigger("event");
    obj.trigger("event");
    obj.trigger("events");
    obj.trigger("event");
    queue.flush().await;

    assert_eq!(log.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_handler_may_trigger_recursively() {
    let (obj, queue) = observer_with_queue();
    let log: Log = Arc::default();

    let chained = obj.clone();
    let sink = Arc::clone(&log);
    obj.on(
        "first",
        HandlerRef::from_fn(move |_, _| {
            sink.lock().unwrap().push("first");
            chained.trigger("second");
            Ok(())
        }),
    );
    obj.on("second", recording(&log, "second"));

    obj.trigger("first");
    queue.flush().await; // runs "first", which enqueues "second"
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
}
