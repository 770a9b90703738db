use async_trait::async_trait;
use lugar_core::{NumberOrText, RawBusinessRecord, RawLocation, RecordId};
use tokio::sync::oneshot;

use super::*;

type Reply = Result<Vec<RawBusinessRecord>, DiscoveryError>;

/// Source whose calls stay pending until the test resolves them by index.
struct ScriptedSource {
    calls: watch::Sender<usize>,
    pending: Mutex<Vec<(SourceQuery, Option<oneshot::Sender<Reply>>)>>,
}

impl ScriptedSource {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: watch::channel(0).0,
            pending: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        *self.calls.borrow()
    }

    async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.calls.subscribe();
        rx.wait_for(|count| *count >= n).await.unwrap();
    }

    fn query(&self, index: usize) -> SourceQuery {
        self.pending.lock()[index].0.clone()
    }

    /// Returns `false` when the call's future has already been dropped.
    fn resolve(&self, index: usize, reply: Reply) -> bool {
        let sender = self.pending.lock()[index].1.take().unwrap();
        sender.send(reply).is_ok()
    }
}

#[async_trait]
impl BusinessSource for ScriptedSource {
    async fn fetch(&self, query: &SourceQuery, _token: &CycleToken) -> Reply {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().push((query.clone(), Some(tx)));
        self.calls.send_modify(|count| *count += 1);
        rx.await
            .unwrap_or_else(|_| Err(DiscoveryError::Source("reply dropped".into())))
    }
}

fn record(id: i64, name: &str) -> RawBusinessRecord {
    RawBusinessRecord {
        id: RecordId::Int(id),
        name: name.to_owned(),
        category: None,
        rating: Some(NumberOrText::Number(4.0)),
        address: None,
        phone: None,
        website: None,
        cover_image: None,
        location: Some(RawLocation {
            lat: Some(NumberOrText::Number(37.39)),
            lng: Some(NumberOrText::Number(-5.99)),
        }),
        is_verified: false,
        price_level: None,
        is_open: true,
        features: Vec::new(),
        review_count: None,
        distance: None,
    }
}

fn search(text: &str) -> SourceQuery {
    SourceQuery {
        search: Some(text.to_owned()),
        category: None,
    }
}

fn controller(source: &Arc<ScriptedSource>, debounce_ms: u64) -> FetchController {
    FetchController::new(
        Arc::clone(source) as Arc<dyn BusinessSource>,
        Arc::new(CategoryStyles::builtin()),
        Duration::from_millis(debounce_ms),
    )
}

fn names(state: &FetchState) -> Vec<&str> {
    state.data.iter().map(|e| e.name.as_str()).collect()
}

#[tokio::test]
async fn starts_idle() {
    let source = ScriptedSource::new();
    let controller = controller(&source, 0);
    let state = controller.state();
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert!(state.data.is_empty());
    assert!(state.last_updated.is_none());
}

#[tokio::test]
async fn successful_cycle_publishes_adapted_data() {
    let source = ScriptedSource::new();
    let controller = controller(&source, 0);

    controller.trigger(search("tapas"));
    assert!(controller.state().loading);
    source.wait_for_calls(1).await;
    assert_eq!(source.query(0), search("tapas"));

    let mut invalid = record(2, "Sin coordenadas");
    invalid.location = None;
    assert!(source.resolve(0, Ok(vec![record(1, "Bodega"), invalid])));

    let state = controller.settled().await;
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(names(&state), vec!["Bodega"]);
    assert!(state.last_updated.is_some());
    assert_eq!(state.revision, 1);
}

#[tokio::test]
async fn later_trigger_wins_even_when_earlier_response_arrives_last() {
    let source = ScriptedSource::new();
    let controller = controller(&source, 0);

    controller.trigger(search("a"));
    source.wait_for_calls(1).await;
    controller.trigger(search("b"));
    source.wait_for_calls(2).await;

    assert!(source.resolve(1, Ok(vec![record(2, "B")])));
    let state = controller.settled().await;
    assert_eq!(names(&state), vec!["B"]);

    // A's future was aborted when B was issued; a late reply goes nowhere.
    let _ = source.resolve(0, Ok(vec![record(1, "A")]));
    tokio::task::yield_now().await;
    assert_eq!(names(&controller.state()), vec!["B"]);
    assert_eq!(controller.state().revision, 1);
}

#[tokio::test]
async fn superseded_cycle_is_not_reported_as_error() {
    let source = ScriptedSource::new();
    let controller = controller(&source, 0);

    controller.trigger(search("a"));
    source.wait_for_calls(1).await;
    controller.trigger(search("b"));
    source.wait_for_calls(2).await;

    // still loading: B is outstanding, A's cancellation changed nothing
    let state = controller.state();
    assert!(state.loading);
    assert!(state.error.is_none());

    source.resolve(1, Ok(Vec::new()));
    let state = controller.settled().await;
    assert!(state.error.is_none());
    assert!(state.data.is_empty());
}

#[tokio::test]
async fn stale_generation_cannot_commit() {
    let source = ScriptedSource::new();
    let controller = controller(&source, 0);
    let inner = Arc::clone(&controller.inner);

    let first = inner.begin();
    let second = inner.begin();
    assert!(!inner.commit(first, Ok(Vec::new())));
    assert!(!inner.commit(first, Err(DiscoveryError::Source("late".into()))));
    let state = controller.state();
    assert!(state.loading);
    assert!(state.error.is_none());

    assert!(inner.commit(second, Ok(Vec::new())));
    assert!(!controller.state().loading);
}

#[tokio::test]
async fn failure_sets_error_and_keeps_last_good_data() {
    let source = ScriptedSource::new();
    let controller = controller(&source, 0);

    controller.trigger(search("a"));
    source.wait_for_calls(1).await;
    source.resolve(0, Ok(vec![record(1, "Primero")]));
    let first = controller.settled().await;

    controller.refetch();
    source.wait_for_calls(2).await;
    assert_eq!(source.query(1), search("a"));
    source.resolve(1, Err(DiscoveryError::Source("servicio caído".into())));

    let state = controller.settled().await;
    assert_eq!(state.error.as_deref(), Some("servicio caído"));
    assert_eq!(names(&state), vec!["Primero"]);
    assert_eq!(state.last_updated, first.last_updated);
    assert_eq!(state.revision, 1);
}

#[tokio::test]
async fn success_after_failure_clears_error() {
    let source = ScriptedSource::new();
    let controller = controller(&source, 0);

    controller.trigger(search("a"));
    source.wait_for_calls(1).await;
    source.resolve(0, Err(DiscoveryError::Source("boom".into())));
    assert!(controller.settled().await.error.is_some());

    controller.refetch();
    source.wait_for_calls(2).await;
    source.resolve(1, Ok(Vec::new()));
    let state = controller.settled().await;
    assert!(state.error.is_none());
    assert!(state.data.is_empty(), "empty success is not an error");
}

#[tokio::test]
async fn cancel_clears_loading_without_touching_data_or_error() {
    let source = ScriptedSource::new();
    let controller = controller(&source, 0);

    controller.trigger(search("a"));
    source.wait_for_calls(1).await;
    controller.cancel();

    let state = controller.state();
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert!(state.data.is_empty());

    // whether or not the abort has landed yet, the reply must not be published
    let _ = source.resolve(0, Ok(vec![record(1, "Tarde")]));
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
    let state = controller.state();
    assert!(!state.loading);
    assert!(state.data.is_empty());
    assert_eq!(state.revision, 0);
}

#[tokio::test(start_paused = true)]
async fn debounced_burst_makes_one_call_with_last_query() {
    let source = ScriptedSource::new();
    let controller = controller(&source, 300);

    controller.trigger(search("p"));
    assert!(controller.state().loading, "loading before the delay elapses");
    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.trigger(search("pa"));
    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.trigger(search("pan"));
    assert_eq!(source.call_count(), 0);

    source.wait_for_calls(1).await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(source.call_count(), 1);
    assert_eq!(source.query(0), search("pan"));

    source.resolve(0, Ok(vec![record(1, "Panadería")]));
    let state = controller.settled().await;
    assert_eq!(names(&state), vec!["Panadería"]);
}

#[tokio::test(start_paused = true)]
async fn refetch_bypasses_debounce_delay() {
    let source = ScriptedSource::new();
    let controller = controller(&source, 10_000);

    controller.refetch();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(source.call_count(), 1);
}

#[tokio::test]
async fn concurrent_refetches_resolve_to_the_last_one() {
    let source = ScriptedSource::new();
    let controller = controller(&source, 0);

    controller.refetch();
    source.wait_for_calls(1).await;
    controller.refetch();
    source.wait_for_calls(2).await;

    let _ = source.resolve(0, Ok(vec![record(1, "Viejo")]));
    source.resolve(1, Ok(vec![record(2, "Nuevo")]));
    assert_eq!(names(&controller.settled().await), vec!["Nuevo"]);
}

#[tokio::test]
async fn origin_is_used_for_distance() {
    let source = ScriptedSource::new();
    let controller = controller(&source, 0);
    controller.set_origin(Some(Coordinates::new(37.39, -5.99)));

    controller.trigger(SourceQuery::default());
    source.wait_for_calls(1).await;
    source.resolve(0, Ok(vec![record(1, "Aquí mismo")]));
    let state = controller.settled().await;
    assert_eq!(state.data[0].distance_km, 0.0);
}

#[tokio::test]
async fn subscribers_see_loading_then_result() {
    let source = ScriptedSource::new();
    let controller = controller(&source, 0);
    let mut rx = controller.subscribe();

    controller.trigger(search("x"));
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().loading);

    source.wait_for_calls(1).await;
    source.resolve(0, Ok(vec![record(1, "X")]));
    rx.changed().await.unwrap();
    let state = rx.borrow_and_update().clone();
    assert!(!state.loading);
    assert_eq!(names(&state), vec!["X"]);
}
