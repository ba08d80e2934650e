use std::{collections::HashSet, sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request},
};
use folio::{
    application::{
        blog::{BlogLoader, BlogSource, ParseError, PostEntries},
        catalog::{ContentCatalog, LoadError, TableSource},
        contact::{ContactMessage, ContactService, EmailSender, SendError},
        session::SessionStore,
    },
    domain::navigation::{FormKind, NavigationState, Page},
    infra::{
        assets::FsAssetStore,
        http::{HttpState, build_router},
    },
    presentation::pages::PageRenderer,
};
use metrics_util::debugging::DebuggingRecorder;
use time::macros::date;
use tower::ServiceExt;
use uuid::Uuid;

struct Tables;

impl TableSource for Tables {
    fn describe(&self) -> String {
        "tables".to_string()
    }

    fn load(&self) -> Result<toml::Table, LoadError> {
        // The second project has no description and is skipped.
        toml::from_str(
            "[[projects]]\ntitle = \"Kept\"\ndescription = \"ok\"\n\n[[projects]]\ntitle = \"Skipped\"\n",
        )
        .map_err(|err| LoadError::malformed("tables", err.to_string()))
    }
}

struct OneBrokenPost;

impl BlogSource for OneBrokenPost {
    fn describe(&self) -> String {
        "posts".to_string()
    }

    fn entries(&self) -> Result<PostEntries<'_>, LoadError> {
        Ok(Box::new(std::iter::once(Err(ParseError::new(
            "broken.md",
            "missing front matter",
        )))))
    }
}

struct Flaky;

#[async_trait]
impl EmailSender for Flaky {
    async fn send(&self, message: &ContactMessage) -> Result<(), SendError> {
        if message.name == "fail" {
            Err(SendError::transport("relay refused"))
        } else {
            Ok(())
        }
    }
}

fn contact_state(name: &str) -> NavigationState {
    let mut state = NavigationState {
        page: Page::Form(FormKind::Contact),
        ..NavigationState::default()
    };
    state.form_draft.set("name", name);
    state.form_draft.set("email", "someone@example.com");
    state.form_draft.set("message", "hello");
    state
}

#[tokio::test]
async fn runtime_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    // Catalog warnings.
    let loader = BlogLoader::with_load_date("/assets/blog", date!(2026 - 10 - 19));
    let catalog = ContentCatalog::load(&Tables, &OneBrokenPost, &loader).expect("catalog loads");
    assert_eq!(catalog.warnings().len(), 2);

    // Contact delivery outcomes.
    let contact = ContactService::new(Arc::new(Flaky), Duration::from_secs(1));
    contact.submit(contact_state("ok")).await;
    contact.submit(contact_state("fail")).await;

    // Session eviction.
    let sessions = SessionStore::new(1);
    drop(sessions.enter(Uuid::new_v4()).await);
    drop(sessions.enter(Uuid::new_v4()).await);
    assert_eq!(sessions.len(), 1);

    // Request latency.
    let assets_dir = tempfile::tempdir().expect("temp dir");
    let router = build_router(HttpState {
        catalog: Arc::new(catalog),
        sessions: Arc::new(sessions),
        contact: Arc::new(contact),
        pages: Arc::new(PageRenderer::new("/assets", "")),
        assets: Arc::new(FsAssetStore::new(assets_dir.path())),
    });
    let request = Request::builder()
        .method(Method::GET)
        .uri("/")
        .body(Body::empty())
        .expect("request should build");
    router.oneshot(request).await.expect("router should respond");

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "folio_catalog_warnings_total",
        "folio_catalog_items",
        "folio_contact_sent_total",
        "folio_contact_failed_total",
        "folio_sessions_evicted_total",
        "folio_http_request_ms",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
