use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use axum::routing::get;
use futures::future::BoxFuture;
use ignite::bootstrap::{
    App, AppBuilder, BootstrapEngine, BootstrapFailure, Bootstrapped, ComponentDescriptor,
    StaticDiscovery, discover,
};
use ignite::di::{ContainerBuilder, Inject};
use ignite::ConfigService;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tower::ServiceExt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Default)]
struct Journal(Mutex<Vec<String>>);

impl Journal {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

fn configure_step(
    journal: Arc<Journal>,
    entry: &'static str,
) -> impl Fn(&mut AppBuilder) -> anyhow::Result<()> + Send + Sync + 'static {
    move |_: &mut AppBuilder| {
        journal.push(entry);
        Ok(())
    }
}

fn decorate_step(
    journal: Arc<Journal>,
    entry: &'static str,
) -> impl Fn(&mut App) -> anyhow::Result<()> + Send + Sync + 'static {
    move |_: &mut App| {
        journal.push(entry);
        Ok(())
    }
}

fn decorate_async_step(
    journal: Arc<Journal>,
    entry: &'static str,
    result: Result<(), &'static str>,
) -> impl Fn(&mut App) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync + 'static {
    move |_: &mut App| {
        journal.push(entry);
        Box::pin(async move { result.map_err(anyhow::Error::msg) })
    }
}

async fn bootstrap(discovery: StaticDiscovery) -> Bootstrapped {
    BootstrapEngine::new()
        .discovery(discovery)
        .run(AppBuilder::default())
        .await
        .expect("bootstrap should succeed")
}

#[tokio::test]
async fn distinct_priorities_order_both_phases() {
    let journal = Arc::new(Journal::default());
    let discovery = StaticDiscovery::new()
        .register_with_priority(
            ComponentDescriptor::new("Y")
                .method("ConfigureBuilder", configure_step(journal.clone(), "configure:Y"))
                .method("DecorateApp", decorate_step(journal.clone(), "decorate:Y")),
            20,
        )
        .register_with_priority(
            ComponentDescriptor::new("X")
                .method("ConfigureBuilder", configure_step(journal.clone(), "configure:X"))
                .method("DecorateApp", decorate_step(journal.clone(), "decorate:X")),
            10,
        );

    let Bootstrapped { report, .. } = bootstrap(discovery).await;

    assert_eq!(
        journal.entries(),
        vec!["configure:X", "configure:Y", "decorate:X", "decorate:Y"]
    );
    assert_eq!(report.configure.invoked, vec!["X", "Y"]);
    assert_eq!(report.decorate.invoked, report.configure.invoked);
}

#[tokio::test]
async fn equal_priorities_keep_registration_order() {
    let journal = Arc::new(Journal::default());
    let discovery = StaticDiscovery::new()
        .register(ComponentDescriptor::new("Second").method(
            "ConfiguresBuilder",
            configure_step(journal.clone(), "Second"),
        ))
        .register_with_priority(
            ComponentDescriptor::new("First")
                .method("ConfigureBuilder", configure_step(journal.clone(), "First")),
            5,
        )
        .register(ComponentDescriptor::new("Third").method(
            "ConfigureBuilder",
            configure_step(journal.clone(), "Third"),
        ));

    let Bootstrapped { report, .. } = bootstrap(discovery).await;

    assert_eq!(journal.entries(), vec!["First", "Second", "Third"]);
    let priorities: Vec<i32> = report.scheduled.iter().map(|c| c.priority).collect();
    assert_eq!(priorities, vec![5, 1000, 1000]);
}

#[tokio::test]
async fn async_hook_wins_over_sync_hook_in_same_phase() {
    let journal = Arc::new(Journal::default());
    let discovery = StaticDiscovery::new().register(
        ComponentDescriptor::new("Cache")
            .method("DecorateApp", decorate_step(journal.clone(), "sync"))
            .method("DecorateAppAsync", decorate_async_step(journal.clone(), "async", Ok(()))),
    );

    let Bootstrapped { background, .. } = bootstrap(discovery).await;
    let settled = background.join().await.unwrap();

    assert_eq!(journal.entries(), vec!["async"]);
    assert_eq!(settled.launched, 1);
    assert_eq!(settled.completed, 1);
}

/// Counts events logged at exactly one level.
struct LevelCounter(Level, Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for LevelCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == self.0 {
            self.1.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn component_without_hook_aliases_warns_once() {
    let journal = Arc::new(Journal::default());
    let warnings = Arc::new(AtomicUsize::new(0));
    let subscriber =
        tracing_subscriber::registry().with(LevelCounter(Level::WARN, warnings.clone()));

    let discovered = tracing::subscriber::with_default(subscriber, || {
        discover(Box::new(StaticDiscovery::new().register(
            ComponentDescriptor::new("Idle")
                .method("Configure", configure_step(journal.clone(), "never"))
                .method("Bootstrap", configure_step(journal.clone(), "never")),
        )))
    });

    assert_eq!(warnings.load(Ordering::SeqCst), 1);
    assert!(discovered.components.is_empty());
    assert_eq!(discovered.failures.len(), 1);
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn dropped_component_is_never_invoked() {
    let journal = Arc::new(Journal::default());
    let discovery = StaticDiscovery::new()
        .register(
            ComponentDescriptor::new("Idle")
                .method("Setup", configure_step(journal.clone(), "never")),
        )
        .register(
            ComponentDescriptor::new("Active")
                .method("ConfigureBuilder", configure_step(journal.clone(), "active")),
        );

    let Bootstrapped { report, background, .. } = bootstrap(discovery).await;
    background.join().await.unwrap();

    assert_eq!(journal.entries(), vec!["active"]);
    assert_eq!(report.discovery_failures.len(), 1);
    assert_eq!(report.discovery_failures[0].component(), "Idle");
}

#[tokio::test]
async fn readiness_stays_false_while_async_work_is_pending() {
    let release = Arc::new(Notify::new());
    let gate = release.clone();
    let discovery = StaticDiscovery::new().register(ComponentDescriptor::new("Warmup").method(
        "DecorateAppAsync",
        move |_: &mut App| -> BoxFuture<'static, anyhow::Result<()>> {
            let gate = gate.clone();
            Box::pin(async move {
                gate.notified().await;
                Ok(())
            })
        },
    ));

    let Bootstrapped { app, background, .. } = bootstrap(discovery).await;
    let readiness = app.readiness().clone();

    assert!(!readiness.is_ready());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!readiness.is_ready());
    assert!(!background.is_finished());

    release.notify_one();
    let settled = background.join().await.unwrap();
    assert!(readiness.is_ready());
    assert!(settled.failures.is_empty());
}

#[tokio::test]
async fn failing_tasks_do_not_block_readiness() {
    let errors = Arc::new(AtomicUsize::new(0));
    // The test runtime is single-threaded, so spawned hooks and the drain log here.
    let _guard = tracing::subscriber::set_default(
        tracing_subscriber::registry().with(LevelCounter(Level::ERROR, errors.clone())),
    );

    let journal = Arc::new(Journal::default());
    let mut discovery = StaticDiscovery::new();
    let outcomes = [Ok(()), Err("cache down"), Ok(()), Err("index missing"), Ok(())];
    let names = ["A", "B", "C", "D", "E"];
    for (name, result) in names.into_iter().zip(outcomes) {
        discovery = discovery.register(
            ComponentDescriptor::new(name)
                .method("DecorateAppAsync", decorate_async_step(journal.clone(), name, result)),
        );
    }

    let Bootstrapped { app, report, background } = bootstrap(discovery).await;
    let settled = background.join().await.unwrap();

    assert!(app.readiness().is_ready());
    assert_eq!(report.launched(), 5);
    assert_eq!(settled.launched, 5);
    assert_eq!(settled.completed, 3);

    let mut failed: Vec<&str> = settled.failures.iter().map(|f| f.component()).collect();
    failed.sort();
    assert_eq!(failed, vec!["B", "D"]);
    assert!(settled
        .failures
        .iter()
        .all(|f| matches!(f, BootstrapFailure::Aggregation { .. })));
    assert_eq!(errors.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn async_decorate_failure_is_logged_not_fatal() {
    let journal = Arc::new(Journal::default());
    let discovery = StaticDiscovery::new().register(ComponentDescriptor::new("Z").method(
        "DecoratesAppAsync",
        decorate_async_step(journal.clone(), "Z", Err("remote unavailable")),
    ));

    let Bootstrapped { app, background, .. } = bootstrap(discovery).await;
    let settled = background.join().await.unwrap();

    assert!(app.readiness().is_ready());
    assert_eq!(settled.failures.len(), 1);
    let failure = &settled.failures[0];
    assert_eq!(failure.component(), "Z");
    assert!(failure.to_string().contains("remote unavailable"));
}

struct KeyRing {
    id: &'static str,
}

struct Missing;

#[tokio::test]
async fn configure_services_feed_decorate_hooks() {
    let journal = Arc::new(Journal::default());
    let seen = journal.clone();
    let skipped = journal.clone();
    let discovery = StaticDiscovery::new()
        .register_with_priority(
            ComponentDescriptor::new("Keys").method(
                "ConfigureBuilder",
                |builder: &mut AppBuilder| -> anyhow::Result<()> {
                    builder.container_mut().register(KeyRing { id: "k1" });
                    Ok(())
                },
            ),
            1,
        )
        .register_with_priority(
            ComponentDescriptor::new("Publisher").method(
                "DecorateApp",
                move |_: &mut App, keys: Arc<KeyRing>| -> anyhow::Result<()> {
                    seen.push(keys.id);
                    Ok(())
                },
            ),
            2,
        )
        .register_with_priority(
            ComponentDescriptor::new("NeedsMissing").method(
                "DecorateApp",
                move |_: &mut App, _: Arc<Missing>| -> anyhow::Result<()> {
                    skipped.push("unreachable");
                    Ok(())
                },
            ),
            3,
        );

    let Bootstrapped { report, .. } = bootstrap(discovery).await;

    assert_eq!(journal.entries(), vec!["k1"]);
    let failures: Vec<&BootstrapFailure> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0],
        BootstrapFailure::Resolution { component, .. } if component == "NeedsMissing"
    ));
}

struct Greeting(String);

async fn greet(Inject(greeting): Inject<Greeting>) -> String {
    greeting.0.clone()
}

async fn status_of(router: &Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn http_surface_tracks_readiness() {
    let release = Arc::new(Notify::new());
    let gate = release.clone();

    let mut config = ConfigService::new();
    config.set("App:Name", "scenario-app");
    let container = ContainerBuilder::new()
        .register(Greeting("hi there".to_string()))
        .build();

    let discovery = StaticDiscovery::new()
        .register(ComponentDescriptor::new("Routes").method(
            "ConfigureBuilder",
            |builder: &mut AppBuilder| -> anyhow::Result<()> {
                builder.merge(Router::new().route("/greet", get(greet)));
                Ok(())
            },
        ))
        .register(ComponentDescriptor::new("Slow").method(
            "ConfigureBuilderAsync",
            move |_: &mut AppBuilder| -> BoxFuture<'static, anyhow::Result<()>> {
                let gate = gate.clone();
                Box::pin(async move {
                    gate.notified().await;
                    Ok(())
                })
            },
        ));

    let Bootstrapped { app, background, .. } = BootstrapEngine::new()
        .discovery(discovery)
        .run(AppBuilder::with_container(config, container))
        .await
        .unwrap();
    let router = app.into_router();

    assert_eq!(status_of(&router, "/health").await.0, StatusCode::OK);
    assert_eq!(status_of(&router, "/ready").await.0, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(status_of(&router, "/greet").await.0, StatusCode::SERVICE_UNAVAILABLE);

    let (_, info) = status_of(&router, "/info").await;
    let info: serde_json::Value = serde_json::from_str(&info).unwrap();
    assert_eq!(info["data"]["ready"], false);
    assert_eq!(info["data"]["app"]["name"], "scenario-app");

    release.notify_one();
    background.join().await.unwrap();

    assert_eq!(status_of(&router, "/ready").await.0, StatusCode::OK);
    assert_eq!(
        status_of(&router, "/greet").await,
        (StatusCode::OK, "hi there".to_string())
    );
}
