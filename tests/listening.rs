//! Inversion-of-control listening: `listen_to`/`listen_to_once`
//! delivery and `stop_listening` teardown bookkeeping.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use eventmatch::{ContextId, Deferral, HandlerRef, Name, Observer, Off, Pattern};

type Log = Arc<Mutex<Vec<&'static str>>>;

fn pair_with_queue() -> (Observer, Observer, Deferral) {
    let queue = Deferral::new();
    let a = Observer::builder()
        .scheduler(Arc::new(queue.clone()))
        .build();
    let b = Observer::builder()
        .scheduler(Arc::new(queue.clone()))
        .build();
    (a, b, queue)
}

fn recording(log: &Log, label: &'static str) -> HandlerRef {
    let log = Arc::clone(log);
    HandlerRef::from_fn(move |_event, _args| {
        log.lock().unwrap().push(label);
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
async fn test_listen_to_receives_source_events() {
    let (a, b, queue) = pair_with_queue();
    let log: Log = Arc::default();

    a.listen_to(&b, "event", recording(&log, "hit"));

    b.trigger("event");
    b.trigger("event");
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["hit", "hit"]);
    assert_eq!(a.listening_count(), 1);
}

#[tokio::test]
async fn test_listen_to_with_map_pattern() {
    let (a, b, queue) = pair_with_queue();
    let log: Log = Arc::default();

    a.listen_to(&b, pattern(json!({"a": 1})), recording(&log, "hit"));

    b.trigger(name(json!({"a": 1})));
    b.trigger(name(json!({"a": 1, "b": 2})));
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["hit", "hit"]);
}

#[tokio::test]
async fn test_listen_to_once_fires_once() {
    let (a, b, queue) = pair_with_queue();
    let log: Log = Arc::default();

    a.listen_to_once(&b, "event", recording(&log, "once"));

    b.trigger("event");
    b.trigger("event");
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["once"]);
}

#[tokio::test]
async fn test_stop_listening_everything() {
    let (a, b, queue) = pair_with_queue();
    let log: Log = Arc::default();

    a.listen_to(&b, "event", recording(&log, "kept"));
    b.trigger("event");

    a.listen_to(&b, "event", recording(&log, "torn"));
    a.stop_listening(None, Off::all());

    b.trigger("event");
    queue.flush().await;

    // The pre-teardown trigger still delivers from its snapshot.
    assert_eq!(*log.lock().unwrap(), vec!["kept"]);
    assert_eq!(a.listening_count(), 0);
    assert_eq!(b.subscription_count(), 0);
}

#[tokio::test]
async fn test_stop_listening_to_one_source() {
    let (a, b, queue) = pair_with_queue();
    let c = Observer::builder()
        .scheduler(Arc::new(queue.clone()))
        .build();
    let log: Log = Arc::default();

    a.listen_to(&b, "event", recording(&log, "b"));
    a.listen_to(&c, "event", recording(&log, "c"));

    a.stop_listening(Some(&b), Off::all());

    b.trigger("event");
    c.trigger("event");
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["c"]);
    assert_eq!(a.listening_count(), 1);
}

#[tokio::test]
async fn test_stop_listening_to_one_event() {
    let (a, b, queue) = pair_with_queue();
    let log: Log = Arc::default();

    a.listen_to(&b, "eventA", recording(&log, "a"));
    a.listen_to(&b, "eventB", recording(&log, "b"));

    a.stop_listening(Some(&b), Off::new().with_pattern("eventB"));

    b.trigger("eventA");
    b.trigger("eventB");
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["a"]);
    // One subscription is still placed on b, so b stays tracked.
    assert_eq!(a.listening_count(), 1);
}

#[tokio::test]
async fn test_stop_listening_does_not_remove_direct_subscriptions() {
    let (a, b, queue) = pair_with_queue();
    let log: Log = Arc::default();

    a.listen_to(&b, "event", recording(&log, "ioc"));
    b.on("event", recording(&log, "direct"));

    a.stop_listening(None, Off::all());

    b.trigger("event");
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["direct"]);
}

#[tokio::test]
async fn test_listen_to_self() {
    let queue = Deferral::new();
    let a = Observer::builder()
        .scheduler(Arc::new(queue.clone()))
        .build();
    let log: Log = Arc::default();

    let me = a.clone();
    a.listen_to(&me, "event", recording(&log, "self"));

    a.trigger("event");
    a.trigger("event");
    queue.flush().await;

    a.stop_listening(Some(&me), Off::all());
    a.trigger("event");
    queue.flush().await;

    assert_eq!(*log.lock().unwrap(), vec!["self", "self"]);
    assert_eq!(a.listening_count(), 0);
}

#[tokio::test]
async fn test_teardown_cleans_tracking_references() {
    let (a, b, queue) = pair_with_queue();
    let log: Log = Arc::default();

    a.listen_to(&b, "eventA", recording(&log, "a"));
    b.trigger("eventA");

    a.listen_to(&b, "eventB", recording(&log, "b"));

    a.stop_listening(Some(&b), Off::new().with_pattern("eventB"));
    assert_eq!(a.listening_count(), 1, "eventA still placed on b");

    a.stop_listening(Some(&b), Off::new().with_pattern("eventA"));
    assert_eq!(a.listening_count(), 0);
    assert_eq!(b.subscription_count(), 0);

    queue.flush().await;
    assert_eq!(*log.lock().unwrap(), vec!["a"]);
}

#[tokio::test]
async fn test_stop_listening_without_tracking_is_noop() {
    let (a, b, _queue) = pair_with_queue();

    a.stop_listening(None, Off::all());
    a.stop_listening(Some(&b), Off::all());

    assert_eq!(a.listening_count(), 0);
}

#[tokio::test]
async fn test_dead_sources_are_pruned_on_teardown() {
    let (a, b, _queue) = pair_with_queue();

    a.listen_to(&b, "event", HandlerRef::from_fn(|_, _| Ok(())));
    drop(b);

    a.stop_listening(None, Off::all());
    assert_eq!(a.listening_count(), 0);
}

#[tokio::test]
async fn test_event_context_distinguishes_registrations() {
    let (a, b, queue) = pair_with_queue();
    let contexts: Arc<Mutex<Vec<ContextId>>> = Arc::default();

    let sink = Arc::clone(&contexts);
    let shared = HandlerRef::from_fn(move |event, _args| {
        sink.lock().unwrap().push(event.context());
        Ok(())
    });

    a.listen_to(&b, "event", shared.clone());
    b.on("event", shared);

    b.trigger("event");
    queue.flush().await;

    // Same handler, two registrations: the IoC entry resolves to the
    // listener, the direct entry to the source itself.
    assert_eq!(*contexts.lock().unwrap(), vec![a.context_id(), b.context_id()]);
}
