//! Content records shown by the portfolio pages.

use std::{borrow::Borrow, cmp::Ordering, collections::BTreeSet, fmt};

use serde::Serialize;
use time::{Date, format_description::FormatItem, macros::format_description};

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
pub const ISO_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ContentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Project,
    SkillCategory,
    Certification,
    BlogPost,
    TimelineEntry,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::Project,
        ContentKind::SkillCategory,
        ContentKind::Certification,
        ContentKind::BlogPost,
        ContentKind::TimelineEntry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Project => "project",
            ContentKind::SkillCategory => "skill_category",
            ContentKind::Certification => "certification",
            ContentKind::BlogPost => "blog_post",
            ContentKind::TimelineEntry => "timeline_entry",
        }
    }

    /// Human label used in headings and "not found" messages.
    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Project => "Project",
            ContentKind::SkillCategory => "Skill category",
            ContentKind::Certification => "Certification",
            ContentKind::BlogPost => "Blog post",
            ContentKind::TimelineEntry => "Timeline entry",
        }
    }

    /// Only projects and posts have a page of their own.
    pub fn has_detail_page(self) -> bool {
        matches!(self, ContentKind::Project | ContentKind::BlogPost)
    }
}

/// Ordering key assigned at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Position in the static table the item was declared in.
    Declared(usize),
    /// Publication date; `estimated` dates were filled in by the loader.
    Published { date: Date, estimated: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Plot {
        chart: String,
        source: String,
        caption: Option<String>,
    },
    Code {
        language: String,
        source: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDetail {
    pub year: Option<i32>,
    pub thumbnail: Option<String>,
    pub repository: Option<String>,
    pub case_study: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificationDetail {
    pub issuer: String,
    pub year: Option<i32>,
    pub credential_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineDetail {
    pub organization: String,
    pub start: String,
    pub end: Option<String>,
}

impl TimelineDetail {
    pub fn period(&self) -> String {
        let end = self.end.as_deref().unwrap_or("Present");
        format!("{} – {end}", self.start)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogDetail {
    pub published: Date,
    pub date_is_fallback: bool,
    pub interactive: bool,
    pub directives: Vec<Directive>,
    pub origin: String,
}

impl BlogDetail {
    pub fn published_label(&self) -> String {
        let label = self
            .published
            .format(HUMAN_DATE_FORMAT)
            .unwrap_or_else(|_| self.published.to_string());
        if self.date_is_fallback {
            format!("{label} (undated)")
        } else {
            label
        }
    }

    pub fn iso_date(&self) -> String {
        self.published
            .format(ISO_DATE_FORMAT)
            .unwrap_or_else(|_| self.published.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemDetail {
    Project(ProjectDetail),
    SkillCategory { skills: Vec<String> },
    Certification(CertificationDetail),
    BlogPost(BlogDetail),
    TimelineEntry(TimelineDetail),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub id: ContentId,
    pub title: String,
    pub tags: BTreeSet<String>,
    pub body: String,
    pub category: Option<String>,
    pub sort_key: SortKey,
    pub detail: ItemDetail,
}

impl ContentItem {
    pub fn kind(&self) -> ContentKind {
        match self.detail {
            ItemDetail::Project(_) => ContentKind::Project,
            ItemDetail::SkillCategory { .. } => ContentKind::SkillCategory,
            ItemDetail::Certification(_) => ContentKind::Certification,
            ItemDetail::BlogPost(_) => ContentKind::BlogPost,
            ItemDetail::TimelineEntry(_) => ContentKind::TimelineEntry,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn project(&self) -> Option<&ProjectDetail> {
        match &self.detail {
            ItemDetail::Project(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn blog(&self) -> Option<&BlogDetail> {
        match &self.detail {
            ItemDetail::BlogPost(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn has_case_study(&self) -> bool {
        self.project()
            .is_some_and(|project| project.case_study.is_some())
    }
}

/// Catalog order: declared position first, then newest publication first with
/// estimated dates last; ties fall back to ascending id.
pub fn catalog_order(lhs: &ContentItem, rhs: &ContentItem) -> Ordering {
    let by_key = match (lhs.sort_key, rhs.sort_key) {
        (SortKey::Declared(a), SortKey::Declared(b)) => a.cmp(&b),
        (
            SortKey::Published {
                date: a,
                estimated: a_est,
            },
            SortKey::Published {
                date: b,
                estimated: b_est,
            },
        ) => a_est.cmp(&b_est).then_with(|| b.cmp(&a)),
        (SortKey::Declared(_), SortKey::Published { .. }) => Ordering::Less,
        (SortKey::Published { .. }, SortKey::Declared(_)) => Ordering::Greater,
    };
    by_key.then_with(|| lhs.id.cmp(&rhs.id))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactMethod {
    pub label: String,
    pub value: String,
    pub href: Option<String>,
}

/// Site owner details shown on the home and about pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub headline: String,
    pub summary: String,
    pub bio: String,
    pub expertise: Vec<String>,
    pub image: Option<String>,
    pub contact_methods: Vec<ContactMethod>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Portfolio".to_string(),
            headline: String::new(),
            summary: String::new(),
            bio: String::new(),
            expertise: Vec::new(),
            image: None,
            contact_methods: Vec::new(),
        }
    }
}
