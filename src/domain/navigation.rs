//! Navigation state: the current page plus the contact form draft.

use std::collections::BTreeMap;

use super::content::{ContentId, ContentKind};

/// Draft fields kept when the visitor navigates away from the form.
pub const PRESERVED_DRAFT_FIELDS: [&str; 2] = ["name", "email"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailFacet {
    Overview,
    CaseStudy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Contact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Home,
    Listing(ContentKind),
    Detail {
        kind: ContentKind,
        id: ContentId,
        facet: DetailFacet,
    },
    Form(FormKind),
    NotFound {
        requested: Option<String>,
    },
}

impl Page {
    /// Sidebar entry that should be highlighted while this page is shown.
    pub fn nav_target(&self) -> Option<NavTarget> {
        match self {
            Page::Home => Some(NavTarget::Home),
            Page::Listing(kind) | Page::Detail { kind, .. } => NavTarget::for_kind(*kind),
            Page::Form(FormKind::Contact) => Some(NavTarget::Contact),
            Page::NotFound { .. } => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Page::Home => "/".to_string(),
            Page::Listing(kind) => NavTarget::for_kind(*kind)
                .map(|target| target.path().to_string())
                .unwrap_or_else(|| "/".to_string()),
            Page::Detail { kind, id, facet } => {
                let base = NavTarget::for_kind(*kind)
                    .map(NavTarget::path)
                    .unwrap_or("");
                match facet {
                    DetailFacet::Overview => format!("{base}/{id}"),
                    DetailFacet::CaseStudy => format!("{base}/{id}/case-study"),
                }
            }
            Page::Form(FormKind::Contact) => NavTarget::Contact.path().to_string(),
            Page::NotFound { requested } => match requested {
                Some(value) => format!("/{}", value.trim_start_matches('/')),
                None => "/".to_string(),
            },
        }
    }
}

/// Entries of the persistent sidebar navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavTarget {
    Home,
    Projects,
    Skills,
    About,
    Experience,
    Blog,
    Contact,
}

impl NavTarget {
    pub const ALL: [NavTarget; 7] = [
        NavTarget::Home,
        NavTarget::Projects,
        NavTarget::Skills,
        NavTarget::About,
        NavTarget::Experience,
        NavTarget::Blog,
        NavTarget::Contact,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NavTarget::Home => "Home",
            NavTarget::Projects => "Projects",
            NavTarget::Skills => "Skills",
            NavTarget::About => "About",
            NavTarget::Experience => "Experience",
            NavTarget::Blog => "Blog",
            NavTarget::Contact => "Contact",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            NavTarget::Home => "/",
            NavTarget::Projects => "/projects",
            NavTarget::Skills => "/skills",
            NavTarget::About => "/about",
            NavTarget::Experience => "/experience",
            NavTarget::Blog => "/blog",
            NavTarget::Contact => "/contact",
        }
    }

    pub fn page(self) -> Page {
        match self {
            NavTarget::Home => Page::Home,
            NavTarget::Projects => Page::Listing(ContentKind::Project),
            NavTarget::Skills => Page::Listing(ContentKind::SkillCategory),
            NavTarget::About => Page::Listing(ContentKind::Certification),
            NavTarget::Experience => Page::Listing(ContentKind::TimelineEntry),
            NavTarget::Blog => Page::Listing(ContentKind::BlogPost),
            NavTarget::Contact => Page::Form(FormKind::Contact),
        }
    }

    pub fn for_kind(kind: ContentKind) -> Option<NavTarget> {
        match kind {
            ContentKind::Project => Some(NavTarget::Projects),
            ContentKind::SkillCategory => Some(NavTarget::Skills),
            ContentKind::Certification => Some(NavTarget::About),
            ContentKind::TimelineEntry => Some(NavTarget::Experience),
            ContentKind::BlogPost => Some(NavTarget::Blog),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    fields: BTreeMap<String, String>,
}

impl FormDraft {
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.values().all(|value| value.is_empty())
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Drop every field except the ones listed in `keep`.
    pub fn retain_only(&mut self, keep: &[&str]) {
        self.fields.retain(|field, _| keep.contains(&field.as_str()));
    }
}

/// Outcome of the last form submission, shown once and cleared on navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormFeedback {
    Sent,
    Invalid(Vec<String>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub page: Page,
    pub form_draft: FormDraft,
    pub submitted: bool,
    pub feedback: Option<FormFeedback>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            page: Page::Home,
            form_draft: FormDraft::default(),
            submitted: false,
            feedback: None,
        }
    }
}

/// Explicit visitor interactions understood by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    Select(NavTarget),
    OpenDetail {
        kind: ContentKind,
        id: String,
        facet: DetailFacet,
    },
    Back,
    ReturnHome,
    EditDraft {
        field: String,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_targets_round_trip_through_pages() {
        for target in NavTarget::ALL {
            assert_eq!(target.page().nav_target(), Some(target));
        }
    }

    #[test]
    fn detail_paths_nest_under_listing() {
        let page = Page::Detail {
            kind: ContentKind::Project,
            id: ContentId::new("churn"),
            facet: DetailFacet::CaseStudy,
        };
        assert_eq!(page.path(), "/projects/churn/case-study");
        assert_eq!(page.nav_target(), Some(NavTarget::Projects));
    }

    #[test]
    fn draft_retains_listed_fields_only() {
        let mut draft = FormDraft::default();
        draft.set("name", "Ada");
        draft.set("email", "ada@example.com");
        draft.set("message", "Hello");

        draft.retain_only(&PRESERVED_DRAFT_FIELDS);

        assert_eq!(draft.get("name"), "Ada");
        assert_eq!(draft.get("email"), "ada@example.com");
        assert_eq!(draft.get("message"), "");
    }
}
