use std::{mem, sync::Arc};

use axum::{
    Form, Router,
    extract::{Path, RawQuery, State},
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;

use crate::{
    application::{
        catalog::ContentCatalog,
        contact::{ContactService, FIELD_EMAIL, FIELD_MESSAGE, FIELD_NAME},
        error::ErrorReport,
        filter::FilterCriteria,
        pages::{BACK_PATH, RETURN_HOME_PATH},
        router::{route, transition},
        session::{SessionGuard, SessionStore},
    },
    domain::{
        content::ContentKind,
        navigation::{DetailFacet, FormKind, NavAction, NavTarget, NavigationState, Page},
    },
    infra::assets::AssetStore,
    presentation::pages::PageRenderer,
};

use super::{
    middleware::trace_requests,
    session::VisitorSession,
};

#[derive(Clone)]
pub struct HttpState {
    pub catalog: Arc<ContentCatalog>,
    pub sessions: Arc<SessionStore>,
    pub contact: Arc<ContactService>,
    pub pages: Arc<PageRenderer>,
    pub assets: Arc<dyn AssetStore>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/projects", get(projects))
        .route("/projects/{id}", get(project_detail))
        .route("/projects/{id}/case-study", get(project_case_study))
        .route("/skills", get(skills))
        .route("/about", get(about))
        .route("/experience", get(experience))
        .route("/blog", get(blog))
        .route("/blog/{id}", get(post_detail))
        .route("/contact", get(contact_form).post(submit_contact))
        .route(BACK_PATH, get(back))
        .route(RETURN_HOME_PATH, get(return_home))
        .route("/assets/{*path}", get(serve_asset))
        .route("/_health", get(health))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(trace_requests))
}

/// Apply `action` to the visitor's state, persist it and render the result.
async fn navigate(
    state: &HttpState,
    session: VisitorSession,
    action: NavAction,
    criteria: &FilterCriteria,
) -> Response {
    let mut current = state.sessions.enter(session.id).await;
    let next = transition(mem::take(&mut *current), action, &state.catalog);
    render_and_store(state, session, current, next, criteria)
}

fn render_and_store(
    state: &HttpState,
    session: VisitorSession,
    mut current: SessionGuard,
    next: NavigationState,
    criteria: &FilterCriteria,
) -> Response {
    let spec = route(&next, &state.catalog, criteria);
    *current = next;
    drop(current);
    session.attach(state.pages.render(&spec))
}

async fn select(
    state: &HttpState,
    session: VisitorSession,
    target: NavTarget,
    query: Option<String>,
) -> Response {
    let criteria = FilterCriteria::from_query(query.as_deref());
    navigate(state, session, NavAction::Select(target), &criteria).await
}

async fn open_detail(
    state: &HttpState,
    session: VisitorSession,
    kind: ContentKind,
    id: String,
    facet: DetailFacet,
) -> Response {
    navigate(
        state,
        session,
        NavAction::OpenDetail { kind, id, facet },
        &FilterCriteria::default(),
    )
    .await
}

async fn home(State(state): State<HttpState>, session: VisitorSession) -> Response {
    select(&state, session, NavTarget::Home, None).await
}

async fn projects(
    State(state): State<HttpState>,
    session: VisitorSession,
    RawQuery(query): RawQuery,
) -> Response {
    select(&state, session, NavTarget::Projects, query).await
}

async fn skills(
    State(state): State<HttpState>,
    session: VisitorSession,
    RawQuery(query): RawQuery,
) -> Response {
    select(&state, session, NavTarget::Skills, query).await
}

async fn about(
    State(state): State<HttpState>,
    session: VisitorSession,
    RawQuery(query): RawQuery,
) -> Response {
    select(&state, session, NavTarget::About, query).await
}

async fn experience(
    State(state): State<HttpState>,
    session: VisitorSession,
    RawQuery(query): RawQuery,
) -> Response {
    select(&state, session, NavTarget::Experience, query).await
}

async fn blog(
    State(state): State<HttpState>,
    session: VisitorSession,
    RawQuery(query): RawQuery,
) -> Response {
    select(&state, session, NavTarget::Blog, query).await
}

async fn project_detail(
    State(state): State<HttpState>,
    session: VisitorSession,
    Path(id): Path<String>,
) -> Response {
    open_detail(&state, session, ContentKind::Project, id, DetailFacet::Overview).await
}

async fn project_case_study(
    State(state): State<HttpState>,
    session: VisitorSession,
    Path(id): Path<String>,
) -> Response {
    open_detail(&state, session, ContentKind::Project, id, DetailFacet::CaseStudy).await
}

async fn post_detail(
    State(state): State<HttpState>,
    session: VisitorSession,
    Path(id): Path<String>,
) -> Response {
    open_detail(&state, session, ContentKind::BlogPost, id, DetailFacet::Overview).await
}

async fn contact_form(State(state): State<HttpState>, session: VisitorSession) -> Response {
    select(&state, session, NavTarget::Contact, None).await
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContactForm {
    name: String,
    email: String,
    message: String,
}

async fn submit_contact(
    State(state): State<HttpState>,
    session: VisitorSession,
    Form(form): Form<ContactForm>,
) -> Response {
    let mut guard = state.sessions.enter(session.id).await;
    let mut current = mem::take(&mut *guard);
    if current.page != Page::Form(FormKind::Contact) {
        current = transition(
            current,
            NavAction::Select(NavTarget::Contact),
            &state.catalog,
        );
    }

    let edits = [
        (FIELD_NAME, form.name),
        (FIELD_EMAIL, form.email),
        (FIELD_MESSAGE, form.message),
    ];
    for (field, value) in edits {
        current = transition(
            current,
            NavAction::EditDraft {
                field: field.to_string(),
                value,
            },
            &state.catalog,
        );
    }

    // The session stays locked while the message is in flight.
    let (next, _outcome) = state.contact.submit(current).await;
    render_and_store(&state, session, guard, next, &FilterCriteria::default())
}

/// Navigation actions that change state and then redirect to the resulting page.
async fn act_and_redirect(
    state: &HttpState,
    session: VisitorSession,
    action: NavAction,
) -> Response {
    let mut current = state.sessions.enter(session.id).await;
    let next = transition(mem::take(&mut *current), action, &state.catalog);
    let location = next.page.path();
    *current = next;
    drop(current);
    session.attach(Redirect::to(&location).into_response())
}

async fn back(State(state): State<HttpState>, session: VisitorSession) -> Response {
    act_and_redirect(&state, session, NavAction::Back).await
}

async fn return_home(State(state): State<HttpState>, session: VisitorSession) -> Response {
    act_and_redirect(&state, session, NavAction::ReturnHome).await
}

async fn serve_asset(State(state): State<HttpState>, Path(path): Path<String>) -> Response {
    state.assets.load(&path).await.into_response()
}

async fn health(State(state): State<HttpState>) -> Response {
    let notices = state.catalog.notices();
    if notices.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
    ErrorReport::from_message(
        "infra::http::public::health",
        StatusCode::SERVICE_UNAVAILABLE,
        notices.join("; "),
    )
    .attach(&mut response);
    response
}

async fn not_found(State(state): State<HttpState>, uri: Uri) -> Response {
    let requested = uri.path().trim_matches('/');
    let page = NavigationState {
        page: Page::NotFound {
            requested: (!requested.is_empty()).then(|| requested.to_string()),
        },
        ..NavigationState::default()
    };
    let spec = route(&page, &state.catalog, &FilterCriteria::default());
    state.pages.render(&spec)
}
