//! Render descriptions produced by the router and consumed by the views.

use std::sync::Arc;

use crate::{
    application::filter::FilterCriteria,
    domain::{
        content::{ContactMethod, ContentItem, ContentKind, Profile},
        navigation::{DetailFacet, FormDraft, FormFeedback, NavAction, NavTarget, Page},
    },
};

pub const BACK_PATH: &str = "/back";
pub const RETURN_HOME_PATH: &str = "/home";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub target: NavTarget,
    pub label: &'static str,
    pub href: &'static str,
    pub active: bool,
}

/// A navigation action offered by a page, with the URL that triggers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLink {
    pub label: String,
    pub href: String,
    pub action: NavAction,
}

impl ActionLink {
    pub fn open_detail(label: impl Into<String>, item: &ContentItem, facet: DetailFacet) -> Self {
        let page = Page::Detail {
            kind: item.kind(),
            id: item.id.clone(),
            facet,
        };
        Self {
            label: label.into(),
            href: page.path(),
            action: NavAction::OpenDetail {
                kind: item.kind(),
                id: item.id.to_string(),
                facet,
            },
        }
    }

    pub fn select(label: impl Into<String>, target: NavTarget) -> Self {
        Self {
            label: label.into(),
            href: target.path().to_string(),
            action: NavAction::Select(target),
        }
    }

    pub fn back(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: BACK_PATH.to_string(),
            action: NavAction::Back,
        }
    }

    pub fn return_home() -> Self {
        Self {
            label: "Return home".to_string(),
            href: RETURN_HOME_PATH.to_string(),
            action: NavAction::ReturnHome,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HomeSpec {
    pub profile: Arc<Profile>,
    pub featured_projects: Vec<ListingEntry>,
    pub recent_posts: Vec<ListingEntry>,
    pub actions: Vec<ActionLink>,
}

#[derive(Debug, Clone)]
pub struct ListingEntry {
    pub item: Arc<ContentItem>,
    pub open: Option<ActionLink>,
}

#[derive(Debug, Clone)]
pub struct ListingSpec {
    pub kind: ContentKind,
    pub heading: &'static str,
    pub intro: Option<String>,
    pub entries: Vec<ListingEntry>,
    pub total: usize,
    pub criteria: FilterCriteria,
    pub tag_options: Vec<String>,
    pub category_options: Vec<String>,
}

impl ListingSpec {
    pub fn is_filtered(&self) -> bool {
        !self.criteria.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DetailSpec {
    pub item: Arc<ContentItem>,
    pub facet: DetailFacet,
    pub actions: Vec<ActionLink>,
}

#[derive(Debug, Clone)]
pub struct ContactSpec {
    pub draft: FormDraft,
    pub submitted: bool,
    pub feedback: Option<FormFeedback>,
    pub methods: Vec<ContactMethod>,
}

#[derive(Debug, Clone)]
pub struct NotFoundSpec {
    pub requested: Option<String>,
    pub actions: Vec<ActionLink>,
}

#[derive(Debug, Clone)]
pub enum PageSpec {
    Home(HomeSpec),
    Listing(ListingSpec),
    Detail(DetailSpec),
    Contact(ContactSpec),
    NotFound(NotFoundSpec),
}

/// Everything needed to draw one page.
#[derive(Debug, Clone)]
pub struct RenderSpec {
    pub title: String,
    pub site_name: String,
    pub nav: Vec<NavLink>,
    pub page: PageSpec,
    pub notices: Vec<String>,
}

impl RenderSpec {
    pub fn is_not_found(&self) -> bool {
        matches!(self.page, PageSpec::NotFound(_))
    }

    pub fn active_nav(&self) -> Option<NavTarget> {
        self.nav.iter().find(|link| link.active).map(|link| link.target)
    }
}

pub fn nav_links(active: Option<NavTarget>) -> Vec<NavLink> {
    NavTarget::ALL
        .into_iter()
        .map(|target| NavLink {
            target,
            label: target.label(),
            href: target.path(),
            active: Some(target) == active,
        })
        .collect()
}
