//! Page routing: state transitions for visitor actions and the mapping from
//! navigation state to a render description.

use std::sync::Arc;

use tracing::debug;

use crate::{
    application::{
        catalog::ContentCatalog,
        filter::{FilterCriteria, apply},
        pages::{
            ActionLink, ContactSpec, DetailSpec, HomeSpec, ListingEntry, ListingSpec,
            NotFoundSpec, PageSpec, RenderSpec, nav_links,
        },
    },
    domain::{
        content::{ContentItem, ContentKind},
        navigation::{
            DetailFacet, FormKind, NavAction, NavTarget, NavigationState, PRESERVED_DRAFT_FIELDS,
            Page,
        },
    },
};

const HOME_FEATURED_LIMIT: usize = 3;
const HOME_RECENT_POSTS: usize = 3;

/// Apply one visitor action to the navigation state.
pub fn transition(
    mut state: NavigationState,
    action: NavAction,
    catalog: &ContentCatalog,
) -> NavigationState {
    debug!(target: "folio::router", ?action, from = ?state.page, "navigation transition");

    match action {
        NavAction::Select(target) => {
            let page = target.page();
            if page == state.page {
                return state;
            }
            leave_page(state, page)
        }
        NavAction::OpenDetail { kind, id, facet } => {
            let page = resolve_detail(catalog, kind, &id, facet);
            if page == state.page {
                return state;
            }
            leave_page(state, page)
        }
        NavAction::Back => {
            let page = match state.page {
                Page::Detail { kind, .. } => Page::Listing(kind),
                _ => Page::Home,
            };
            NavigationState {
                page,
                ..NavigationState::default()
            }
        }
        NavAction::ReturnHome => NavigationState::default(),
        NavAction::EditDraft { field, value } => {
            state.form_draft.set(field, value);
            state.submitted = false;
            state
        }
    }
}

fn leave_page(mut state: NavigationState, page: Page) -> NavigationState {
    state.form_draft.retain_only(&PRESERVED_DRAFT_FIELDS);
    state.submitted = false;
    state.feedback = None;
    state.page = page;
    state
}

fn resolve_detail(
    catalog: &ContentCatalog,
    kind: ContentKind,
    id: &str,
    facet: DetailFacet,
) -> Page {
    let found = kind
        .has_detail_page()
        .then(|| catalog.get_kind(kind, id).ok())
        .flatten()
        .filter(|item| facet == DetailFacet::Overview || item.has_case_study());

    match found {
        Some(item) => Page::Detail {
            kind,
            id: item.id.clone(),
            facet,
        },
        None => Page::NotFound {
            requested: Some(id.to_string()),
        },
    }
}

/// Describe what to draw for `state`. Total over every page.
pub fn route(
    state: &NavigationState,
    catalog: &ContentCatalog,
    criteria: &FilterCriteria,
) -> RenderSpec {
    let profile = catalog.profile();
    let page = match &state.page {
        Page::Home => home_spec(catalog),
        Page::Listing(kind) => listing_spec(catalog, *kind, criteria),
        Page::Detail { kind, id, facet } => detail_spec(catalog, *kind, id.as_str(), *facet),
        Page::Form(FormKind::Contact) => PageSpec::Contact(ContactSpec {
            draft: state.form_draft.clone(),
            submitted: state.submitted,
            feedback: state.feedback.clone(),
            methods: profile.contact_methods.clone(),
        }),
        Page::NotFound { requested } => not_found_spec(requested.clone()),
    };

    let active = match &page {
        PageSpec::NotFound(_) => None,
        _ => state.page.nav_target(),
    };

    RenderSpec {
        title: page_title(&page, &profile.name),
        site_name: profile.name.clone(),
        nav: nav_links(active),
        page,
        notices: catalog.notices().to_vec(),
    }
}

fn page_title(page: &PageSpec, site_name: &str) -> String {
    let heading = match page {
        PageSpec::Home(_) => return site_name.to_string(),
        PageSpec::Listing(listing) => listing.heading.to_string(),
        PageSpec::Detail(detail) => match detail.facet {
            DetailFacet::Overview => detail.item.title.clone(),
            DetailFacet::CaseStudy => format!("{}: case study", detail.item.title),
        },
        PageSpec::Contact(_) => NavTarget::Contact.label().to_string(),
        PageSpec::NotFound(_) => "Page not found".to_string(),
    };
    format!("{heading} · {site_name}")
}

fn entry(item: &Arc<ContentItem>) -> ListingEntry {
    let open = item.kind().has_detail_page().then(|| {
        let label = match item.kind() {
            ContentKind::BlogPost => "Read post",
            _ => "View details",
        };
        ActionLink::open_detail(label, item, DetailFacet::Overview)
    });
    ListingEntry {
        item: Arc::clone(item),
        open,
    }
}

fn home_spec(catalog: &ContentCatalog) -> PageSpec {
    let featured_projects = catalog
        .all(ContentKind::Project)
        .iter()
        .take(HOME_FEATURED_LIMIT)
        .map(entry)
        .collect();
    let recent_posts = catalog
        .all(ContentKind::BlogPost)
        .iter()
        .take(HOME_RECENT_POSTS)
        .map(entry)
        .collect();

    PageSpec::Home(HomeSpec {
        profile: Arc::clone(catalog.profile()),
        featured_projects,
        recent_posts,
        actions: vec![
            ActionLink::select("View projects", NavTarget::Projects),
            ActionLink::select("Get in touch", NavTarget::Contact),
        ],
    })
}

fn listing_heading(kind: ContentKind) -> &'static str {
    NavTarget::for_kind(kind)
        .map(NavTarget::label)
        .unwrap_or_else(|| kind.label())
}

fn listing_spec(
    catalog: &ContentCatalog,
    kind: ContentKind,
    criteria: &FilterCriteria,
) -> PageSpec {
    let items = catalog.all(kind);
    let filtered = apply(items, criteria);
    let intro = match kind {
        ContentKind::Certification => {
            let bio = &catalog.profile().bio;
            (!bio.trim().is_empty()).then(|| bio.clone())
        }
        _ => None,
    };

    PageSpec::Listing(ListingSpec {
        kind,
        heading: listing_heading(kind),
        intro,
        entries: filtered.iter().map(entry).collect(),
        total: items.len(),
        criteria: criteria.clone(),
        tag_options: catalog.tag_options(kind),
        category_options: catalog.category_options(kind),
    })
}

fn detail_spec(
    catalog: &ContentCatalog,
    kind: ContentKind,
    id: &str,
    facet: DetailFacet,
) -> PageSpec {
    let item = match catalog.get_kind(kind, id) {
        Ok(item) if facet == DetailFacet::Overview || item.has_case_study() => Arc::clone(item),
        _ => return not_found_spec(Some(id.to_string())),
    };

    let back_label = format!("Back to {}", listing_heading(kind).to_lowercase());
    let mut actions = vec![ActionLink::back(back_label)];
    if item.has_case_study() {
        let toggle = match facet {
            DetailFacet::Overview => {
                ActionLink::open_detail("Read the case study", &item, DetailFacet::CaseStudy)
            }
            DetailFacet::CaseStudy => {
                ActionLink::open_detail("Project overview", &item, DetailFacet::Overview)
            }
        };
        actions.push(toggle);
    }
    actions.push(ActionLink::return_home());

    PageSpec::Detail(DetailSpec {
        item,
        facet,
        actions,
    })
}

fn not_found_spec(requested: Option<String>) -> PageSpec {
    PageSpec::NotFound(NotFoundSpec {
        requested,
        actions: vec![ActionLink::return_home()],
    })
}
