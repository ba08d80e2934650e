use crate::application::error::{ErrorReport, HttpError};
use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        HttpError::from_error(
            "presentation::views::render_template",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Page could not be rendered",
            &err,
        )
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Attach a not-found report so the response logger records why.
pub fn mark_not_found(mut response: Response, requested: Option<&str>) -> Response {
    *response.status_mut() = StatusCode::NOT_FOUND;
    let detail = match requested {
        Some(path) => format!("`{path}` not found"),
        None => "Resource not found".to_string(),
    };
    ErrorReport::from_message(
        "presentation::views::mark_not_found",
        StatusCode::NOT_FOUND,
        detail,
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub notices: Vec<String>,
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub notices: Vec<String>,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            notices: chrome.notices,
            content,
        }
    }
}

#[derive(Clone)]
pub struct ActionView {
    pub label: String,
    pub href: String,
}

#[derive(Clone)]
pub struct CardView {
    pub title: String,
    pub href: Option<String>,
    pub link_label: String,
    pub excerpt: String,
    pub meta: Vec<String>,
    pub badges: Vec<String>,
    pub thumbnail: Option<String>,
}

pub struct HomeView {
    pub name: String,
    pub headline: String,
    pub summary_html: String,
    pub image: Option<String>,
    pub expertise: Vec<String>,
    pub featured: Vec<CardView>,
    pub recent_posts: Vec<CardView>,
    pub actions: Vec<ActionView>,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub view: LayoutContext<HomeView>,
}

#[derive(Clone)]
pub struct FilterOptionView {
    pub value: String,
    pub label: String,
    pub is_active: bool,
}

pub struct ListingView {
    pub heading: String,
    pub intro_html: Option<String>,
    pub cards: Vec<CardView>,
    pub shown: usize,
    pub total: usize,
    pub has_results: bool,
    pub is_filtered: bool,
    pub form_action: String,
    pub search_text: String,
    pub tags: Vec<FilterOptionView>,
    pub categories: Vec<FilterOptionView>,
    pub show_tags: bool,
    pub show_categories: bool,
}

#[derive(Template)]
#[template(path = "listing.html")]
pub struct ListingTemplate {
    pub view: LayoutContext<ListingView>,
}

/// An embedded chart or code listing declared in a post's front matter.
#[derive(Clone)]
pub struct DirectiveView {
    pub is_code: bool,
    pub label: String,
    pub source: String,
    pub caption: Option<String>,
}

pub struct DetailView {
    pub kicker: String,
    pub title: String,
    pub meta: Vec<String>,
    pub badges: Vec<String>,
    pub thumbnail: Option<String>,
    pub repository: Option<String>,
    pub published: Option<String>,
    pub body_html: String,
    pub interactive: bool,
    pub directives: Vec<DirectiveView>,
    pub actions: Vec<ActionView>,
}

#[derive(Template)]
#[template(path = "detail.html")]
pub struct DetailTemplate {
    pub view: LayoutContext<DetailView>,
}

#[derive(Clone)]
pub struct ContactMethodView {
    pub label: String,
    pub value: String,
    pub href: Option<String>,
}

pub struct ContactView {
    pub name: String,
    pub email: String,
    pub message: String,
    pub sent: bool,
    pub errors: Vec<String>,
    pub failure: Option<String>,
    pub methods: Vec<ContactMethodView>,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub view: LayoutContext<ContactView>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub actions: Vec<ActionView>,
}

impl ErrorPageView {
    pub fn not_found(requested: Option<&str>, actions: Vec<ActionView>) -> Self {
        let message = match requested {
            Some(id) => format!(
                "Nothing called \u{201c}{id}\u{201d} exists here. Try returning to the homepage to continue exploring."
            ),
            None => "The page you requested does not exist. Try returning to the homepage to continue exploring.".to_string(),
        };
        Self {
            title: "Page Not Found".to_string(),
            message,
            actions,
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
