#![allow(dead_code)]

use axum_test::TestServer;
use recipe_edge::config::Config;
use recipe_edge::domain::summary::{RequestSummary, RequestSummarySink};
use recipe_edge::infrastructure::users::InMemoryUserDirectory;
use recipe_edge::routes::{app_router, route_table};
use recipe_edge::state::AppState;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

pub const HASHED_JS: &str = "app.a1b2c3d4e5f6a1b2c3d4.js";
pub const HASHED_PNG: &str = "0123456789abcdef0123456789abcdef.png";
pub const PLAIN_JS: &str = "app.js";

/// Summary sink that keeps every summary for later inspection.
#[derive(Clone, Default)]
pub struct RecordingSink(Arc<Mutex<Vec<RequestSummary>>>);

impl RecordingSink {
    pub fn summaries(&self) -> Vec<RequestSummary> {
        self.0.lock().unwrap().clone()
    }
}

impl RequestSummarySink for RecordingSink {
    fn emit(&self, summary: &RequestSummary) {
        self.0.lock().unwrap().push(summary.clone());
    }
}

/// A `tracing` event, with every field rendered as a string.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub fields: HashMap<String, String>,
}

/// Layer recording events emitted while its guard is installed.
#[derive(Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<CapturedEvent>>>);

impl CapturedEvents {
    /// Makes this layer the current thread's subscriber until the guard drops.
    ///
    /// `#[tokio::test]` runs on a single thread, so this covers the server too.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn with_field(&self, name: &str, value: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.fields.get(name).is_some_and(|v| v == value))
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: visitor.0,
        });
    }
}

#[derive(Default)]
struct FieldVisitor(HashMap<String, String>);

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0
            .insert(field.name().to_string(), format!("{:?}", value));
    }
}

/// A running application with its collaborators exposed.
pub struct TestApp {
    pub server: TestServer,
    pub summaries: RecordingSink,
    pub users: Arc<InMemoryUserDirectory>,
    pub static_dir: TempDir,
}

/// Creates a static directory holding one hashed and one plain file of each kind.
pub fn create_static_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(HASHED_JS), "console.log('hashed');").unwrap();
    std::fs::write(dir.path().join(PLAIN_JS), "console.log('plain');").unwrap();
    std::fs::write(dir.path().join(HASHED_PNG), [0x89, b'P', b'N', b'G']).unwrap();
    dir
}

/// Starts the full router against a fresh static directory.
///
/// `configure` adjusts the default configuration; `static_root` is set
/// afterwards to the temporary directory.
pub fn spawn_app(configure: impl FnOnce(&mut Config)) -> TestApp {
    let static_dir = create_static_dir();

    let mut config = Config::default();
    configure(&mut config);
    config.static_root = static_dir.path().to_path_buf();

    let summaries = RecordingSink::default();
    let users = Arc::new(InMemoryUserDirectory::new());
    let state = AppState::with_collaborators(
        config,
        route_table(),
        Arc::new(summaries.clone()),
        users.clone(),
    )
    .unwrap();

    let server = TestServer::new(app_router(state)).unwrap();

    TestApp {
        server,
        summaries,
        users,
        static_dir,
    }
}
