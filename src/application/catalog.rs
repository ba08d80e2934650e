//! Immutable content catalog loaded once at start-up.
//!
//! Two backing sources feed the catalog: a TOML file holding the static
//! tables (profile, projects, skills, certifications, timeline) and a
//! [`BlogSource`] yielding Markdown posts. A source that cannot be read at all
//! is a [`LoadError`]; a single malformed entry is skipped and recorded as a
//! [`CatalogWarning`].

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    sync::Arc,
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    application::blog::{BlogLoader, BlogSource},
    domain::{
        content::{
            CertificationDetail, ContactMethod, ContentId, ContentItem, ContentKind, ItemDetail,
            Profile, ProjectDetail, SortKey, TimelineDetail, catalog_order,
        },
        error::DomainError,
        slug::{derive_slug, is_valid_slug},
    },
};

const SOURCE: &str = "folio::catalog";
pub const METRIC_CATALOG_WARNINGS: &str = "folio_catalog_warnings_total";
pub const METRIC_CATALOG_ITEMS: &str = "folio_catalog_items";
pub const ALL_CATEGORIES: &str = "All";

/// Errors that make a whole backing source unusable.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {origin}: {error}")]
    Io {
        origin: String,
        #[source]
        error: std::io::Error,
    },
    #[error("{origin} could not be parsed: {message}")]
    Malformed { origin: String, message: String },
}

impl LoadError {
    pub fn io(origin: impl Into<String>, error: std::io::Error) -> Self {
        Self::Io {
            origin: origin.into(),
            error,
        }
    }

    pub fn malformed(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            origin: origin.into(),
            message: message.into(),
        }
    }
}

/// A skipped or defaulted entry, kept so operators can see what was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogWarning {
    pub origin: String,
    pub message: String,
}

/// Supplier of the static tables.
pub trait TableSource: Send + Sync {
    fn describe(&self) -> String;
    fn load(&self) -> Result<toml::Table, LoadError>;
}

#[derive(Debug)]
pub struct ContentCatalog {
    by_kind: HashMap<ContentKind, Vec<Arc<ContentItem>>>,
    index: HashMap<ContentId, Arc<ContentItem>>,
    profile: Arc<Profile>,
    warnings: Vec<CatalogWarning>,
    notices: Vec<String>,
}

impl ContentCatalog {
    /// Load every source, failing when either one is unreadable.
    pub fn load(
        tables: &dyn TableSource,
        blog: &dyn BlogSource,
        loader: &BlogLoader,
    ) -> Result<Self, LoadError> {
        let mut builder = CatalogBuilder::default();
        let table = tables.load()?;
        builder.ingest_tables(&tables.describe(), table);
        builder.ingest_posts(blog, loader)?;
        Ok(builder.finish())
    }

    /// Load every source, turning an unreadable source into an empty one plus
    /// a visible notice.
    pub fn load_degraded(
        tables: &dyn TableSource,
        blog: &dyn BlogSource,
        loader: &BlogLoader,
    ) -> Self {
        let mut builder = CatalogBuilder::default();

        match tables.load() {
            Ok(table) => builder.ingest_tables(&tables.describe(), table),
            Err(err) => builder.notice(&err),
        }

        if let Err(err) = builder.ingest_posts(blog, loader) {
            builder.notice(&err);
        }

        builder.finish()
    }

    /// Items of one kind in catalog order.
    pub fn all(&self, kind: ContentKind) -> &[Arc<ContentItem>] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, id: &str) -> Result<&Arc<ContentItem>, DomainError> {
        self.index
            .get(id)
            .ok_or_else(|| DomainError::not_found(None, id))
    }

    /// Look up an item and check that it is of the expected kind.
    pub fn get_kind(&self, kind: ContentKind, id: &str) -> Result<&Arc<ContentItem>, DomainError> {
        match self.index.get(id) {
            Some(item) if item.kind() == kind => Ok(item),
            _ => Err(DomainError::not_found(Some(kind), id)),
        }
    }

    pub fn profile(&self) -> &Arc<Profile> {
        &self.profile
    }

    pub fn warnings(&self) -> &[CatalogWarning] {
        &self.warnings
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Distinct tags used by items of `kind`, sorted.
    pub fn tag_options(&self, kind: ContentKind) -> Vec<String> {
        let tags: BTreeSet<&str> = self
            .all(kind)
            .iter()
            .flat_map(|item| item.tags.iter().map(String::as_str))
            .collect();
        tags.into_iter().map(str::to_string).collect()
    }

    /// Distinct categories of `kind`, led by the catch-all entry.
    pub fn category_options(&self, kind: ContentKind) -> Vec<String> {
        let categories: BTreeSet<&str> = self
            .all(kind)
            .iter()
            .filter_map(|item| item.category.as_deref())
            .collect();
        std::iter::once(ALL_CATEGORIES.to_string())
            .chain(categories.into_iter().map(str::to_string))
            .collect()
    }
}

#[derive(Default)]
struct CatalogBuilder {
    profile: Option<Profile>,
    items: Vec<ContentItem>,
    seen: HashSet<ContentId>,
    warnings: Vec<CatalogWarning>,
    notices: Vec<String>,
}

impl CatalogBuilder {
    fn warn(&mut self, origin: &str, message: impl Into<String>) {
        let message = message.into();
        warn!(target: SOURCE, origin = origin, message = %message, "skipped content entry");
        metrics::counter!(METRIC_CATALOG_WARNINGS).increment(1);
        self.warnings.push(CatalogWarning {
            origin: origin.to_string(),
            message,
        });
    }

    fn notice(&mut self, err: &LoadError) {
        warn!(target: SOURCE, error = %err, "content source unavailable");
        self.notices.push(format!("Some content is unavailable: {err}"));
    }

    fn push(&mut self, origin: &str, item: ContentItem) {
        if !self.seen.insert(item.id.clone()) {
            let err = DomainError::invariant(format!(
                "duplicate id `{}` ({}) ignored",
                item.id,
                item.kind().label()
            ));
            self.warn(origin, err.to_string());
            return;
        }
        self.items.push(item);
    }

    fn ingest_tables(&mut self, origin: &str, mut table: toml::Table) {
        if let Some(value) = table.remove("profile") {
            match value.try_into::<RawProfile>() {
                Ok(raw) => self.profile = Some(raw.into_profile()),
                Err(err) => self.warn(origin, format!("profile: {err}")),
            }
        }

        self.ingest_section::<RawProject>(origin, &mut table, "projects");
        self.ingest_section::<RawSkillCategory>(origin, &mut table, "skills");
        self.ingest_section::<RawCertification>(origin, &mut table, "certifications");
        self.ingest_section::<RawTimelineEntry>(origin, &mut table, "timeline");

        for key in table.keys() {
            self.warn(origin, format!("unknown section `{key}` ignored"));
        }
    }

    fn ingest_section<R>(&mut self, origin: &str, table: &mut toml::Table, section: &str)
    where
        R: TableRecord + for<'de> Deserialize<'de>,
    {
        let Some(value) = table.remove(section) else {
            return;
        };
        let toml::Value::Array(entries) = value else {
            self.warn(origin, format!("`{section}` must be an array of tables"));
            return;
        };

        for (position, entry) in entries.into_iter().enumerate() {
            let record = entry
                .try_into::<R>()
                .map_err(|err| DomainError::validation(err.to_string()))
                .and_then(|raw| raw.into_item(position));
            match record {
                Ok(item) => self.push(origin, item),
                Err(err) => self.warn(origin, format!("{section}[{position}]: {err}")),
            }
        }
    }

    fn ingest_posts(&mut self, blog: &dyn BlogSource, loader: &BlogLoader) -> Result<(), LoadError> {
        let origin = blog.describe();
        for entry in blog.entries()? {
            let raw = match entry {
                Ok(raw) => raw,
                Err(err) => {
                    self.warn(&err.origin, err.reason);
                    continue;
                }
            };
            match loader.load_post(raw) {
                Ok(loaded) => {
                    for message in loaded.warnings {
                        self.warn(&loaded.origin, message);
                    }
                    self.push(&loaded.origin, loaded.item);
                }
                Err(err) => self.warn(&err.origin, err.reason),
            }
        }
        debug!(target: SOURCE, origin = %origin, "blog source ingested");
        Ok(())
    }

    fn finish(self) -> ContentCatalog {
        let mut by_kind: HashMap<ContentKind, Vec<Arc<ContentItem>>> = HashMap::new();
        let mut index = HashMap::new();

        for item in self.items {
            let item = Arc::new(item);
            index.insert(item.id.clone(), Arc::clone(&item));
            by_kind.entry(item.kind()).or_default().push(item);
        }

        for items in by_kind.values_mut() {
            items.sort_by(|lhs, rhs| catalog_order(lhs, rhs));
        }

        metrics::gauge!(METRIC_CATALOG_ITEMS).set(index.len() as f64);
        info!(
            target: SOURCE,
            items = index.len(),
            warnings = self.warnings.len(),
            notices = self.notices.len(),
            "content catalog loaded"
        );

        ContentCatalog {
            by_kind,
            index,
            profile: Arc::new(self.profile.unwrap_or_default()),
            warnings: self.warnings,
            notices: self.notices,
        }
    }
}

trait TableRecord {
    fn into_item(self, position: usize) -> Result<ContentItem, DomainError>;
}

/// Tags may be written as a list or as one comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagList {
    List(Vec<String>),
    Joined(String),
}

impl Default for TagList {
    fn default() -> Self {
        TagList::List(Vec::new())
    }
}

impl TagList {
    fn into_set(self) -> BTreeSet<String> {
        let raw = match self {
            TagList::List(values) => values,
            TagList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

fn resolve_id(explicit: Option<String>, title: &str) -> Result<ContentId, DomainError> {
    match explicit {
        Some(id) if is_valid_slug(&id) => Ok(ContentId::new(id)),
        Some(id) => Err(DomainError::validation(format!(
            "id `{id}` must contain only lowercase letters, digits, `-` or `_`"
        ))),
        None => derive_slug(title)
            .map(ContentId::new)
            .map_err(|err| DomainError::validation(err.to_string())),
    }
}

fn require_title(title: String) -> Result<String, DomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("title must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

#[derive(Debug, Deserialize)]
struct RawProject {
    id: Option<String>,
    title: String,
    description: String,
    #[serde(default, alias = "technologies")]
    tags: TagList,
    category: Option<String>,
    year: Option<i32>,
    thumbnail: Option<String>,
    repository: Option<String>,
    case_study: Option<String>,
}

impl TableRecord for RawProject {
    fn into_item(self, position: usize) -> Result<ContentItem, DomainError> {
        let title = require_title(self.title)?;
        Ok(ContentItem {
            id: resolve_id(self.id, &title)?,
            title,
            tags: self.tags.into_set(),
            body: self.description,
            category: non_blank(self.category),
            sort_key: SortKey::Declared(position),
            detail: ItemDetail::Project(ProjectDetail {
                year: self.year,
                thumbnail: non_blank(self.thumbnail),
                repository: non_blank(self.repository),
                case_study: non_blank(self.case_study),
            }),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawSkillCategory {
    id: Option<String>,
    #[serde(alias = "category")]
    title: String,
    skills: Vec<String>,
    #[serde(default)]
    description: String,
}

impl TableRecord for RawSkillCategory {
    fn into_item(self, position: usize) -> Result<ContentItem, DomainError> {
        let title = require_title(self.title)?;
        let skills: Vec<String> = self
            .skills
            .into_iter()
            .map(|skill| skill.trim().to_string())
            .filter(|skill| !skill.is_empty())
            .collect();
        Ok(ContentItem {
            id: resolve_id(self.id, &title)?,
            tags: skills.iter().cloned().collect(),
            category: Some(title.clone()),
            title,
            body: self.description,
            sort_key: SortKey::Declared(position),
            detail: ItemDetail::SkillCategory { skills },
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawCertification {
    id: Option<String>,
    title: String,
    issuer: String,
    year: Option<i32>,
    credential_url: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: TagList,
}

impl TableRecord for RawCertification {
    fn into_item(self, position: usize) -> Result<ContentItem, DomainError> {
        let title = require_title(self.title)?;
        Ok(ContentItem {
            id: resolve_id(self.id, &title)?,
            title,
            tags: self.tags.into_set(),
            body: self.description,
            category: None,
            sort_key: SortKey::Declared(position),
            detail: ItemDetail::Certification(CertificationDetail {
                issuer: self.issuer.trim().to_string(),
                year: self.year,
                credential_url: non_blank(self.credential_url),
            }),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawTimelineEntry {
    id: Option<String>,
    #[serde(alias = "role")]
    title: String,
    organization: String,
    start: String,
    end: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: TagList,
}

impl TableRecord for RawTimelineEntry {
    fn into_item(self, position: usize) -> Result<ContentItem, DomainError> {
        let title = require_title(self.title)?;
        let id_seed = format!("{title} {}", self.organization);
        Ok(ContentItem {
            id: resolve_id(self.id, &id_seed)?,
            title,
            tags: self.tags.into_set(),
            body: self.description,
            category: None,
            sort_key: SortKey::Declared(position),
            detail: ItemDetail::TimelineEntry(TimelineDetail {
                organization: self.organization.trim().to_string(),
                start: self.start.trim().to_string(),
                end: non_blank(self.end),
            }),
        })
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawProfile {
    name: Option<String>,
    headline: String,
    summary: String,
    bio: String,
    expertise: Vec<String>,
    image: Option<String>,
    contact: Vec<RawContactMethod>,
}

#[derive(Debug, Deserialize)]
struct RawContactMethod {
    label: String,
    value: String,
    href: Option<String>,
}

impl RawProfile {
    fn into_profile(self) -> Profile {
        let defaults = Profile::default();
        Profile {
            name: non_blank(self.name).unwrap_or(defaults.name),
            headline: self.headline,
            summary: self.summary,
            bio: self.bio,
            expertise: self.expertise,
            image: non_blank(self.image),
            contact_methods: self
                .contact
                .into_iter()
                .map(|method| ContactMethod {
                    label: method.label,
                    value: method.value,
                    href: non_blank(method.href),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::blog::{ParseError, RawPost};

    struct InlineTables(&'static str);

    impl TableSource for InlineTables {
        fn describe(&self) -> String {
            "inline.toml".to_string()
        }

        fn load(&self) -> Result<toml::Table, LoadError> {
            toml::from_str(self.0).map_err(|err| LoadError::malformed("inline.toml", err.to_string()))
        }
    }

    struct NoPosts;

    impl BlogSource for NoPosts {
        fn describe(&self) -> String {
            "blog".to_string()
        }

        fn entries(
            &self,
        ) -> Result<Box<dyn Iterator<Item = Result<RawPost, ParseError>> + '_>, LoadError> {
            Ok(Box::new(std::iter::empty()))
        }
    }

    struct BrokenBlog;

    impl BlogSource for BrokenBlog {
        fn describe(&self) -> String {
            "missing-blog".to_string()
        }

        fn entries(
            &self,
        ) -> Result<Box<dyn Iterator<Item = Result<RawPost, ParseError>> + '_>, LoadError> {
            Err(LoadError::io(
                "missing-blog",
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
            ))
        }
    }

    const TABLES: &str = r#"
[profile]
name = "John Doe"
headline = "Data Scientist"

[[projects]]
title = "Customer Churn Prediction"
description = "Predict churn for a telecom."
technologies = "Python, scikit-learn"
year = 2023

[[projects]]
id = "sales"
title = "Sales Forecasting"
description = "Time series forecasting."
technologies = ["Python", "Statsmodels"]
year = 2022

[[projects]]
title = "Broken"

[[skills]]
category = "Programming Languages"
skills = ["Python", "SQL"]
"#;

    fn loader() -> BlogLoader {
        BlogLoader::new("/assets/blog")
    }

    #[test]
    fn static_tables_keep_declared_order() {
        let catalog =
            ContentCatalog::load(&InlineTables(TABLES), &NoPosts, &loader()).expect("catalog");

        let ids: Vec<_> = catalog
            .all(ContentKind::Project)
            .iter()
            .map(|item| item.id.as_str())
            .collect();
        assert_eq!(ids, ["customer-churn-prediction", "sales"]);
        assert_eq!(catalog.profile().name, "John Doe");
    }

    #[test]
    fn malformed_entries_become_warnings() {
        let catalog =
            ContentCatalog::load(&InlineTables(TABLES), &NoPosts, &loader()).expect("catalog");

        assert_eq!(catalog.warnings().len(), 1);
        assert!(catalog.warnings()[0].message.starts_with("projects[2]"));
    }

    #[test]
    fn comma_separated_technologies_become_tags() {
        let catalog =
            ContentCatalog::load(&InlineTables(TABLES), &NoPosts, &loader()).expect("catalog");
        let churn = catalog
            .get("customer-churn-prediction")
            .expect("churn project");

        assert!(churn.has_tag("Python"));
        assert!(churn.has_tag("scikit-learn"));
        assert_eq!(
            catalog.tag_options(ContentKind::Project),
            ["Python", "Statsmodels", "scikit-learn"]
        );
    }

    #[test]
    fn get_reports_missing_ids() {
        let catalog =
            ContentCatalog::load(&InlineTables(TABLES), &NoPosts, &loader()).expect("catalog");

        assert!(matches!(
            catalog.get("nope"),
            Err(DomainError::NotFound { .. })
        ));
        assert!(catalog.get_kind(ContentKind::BlogPost, "sales").is_err());
        assert!(catalog.get_kind(ContentKind::Project, "sales").is_ok());
    }

    #[test]
    fn duplicate_ids_keep_first_entry() {
        let tables = r#"
[[projects]]
id = "dup"
title = "First"
description = "one"

[[certifications]]
id = "dup"
title = "Second"
issuer = "Somebody"
"#;
        let catalog = ContentCatalog::load(&InlineTables(tables), &NoPosts, &loader())
            .expect("catalog");

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("dup").expect("dup").title, "First");
        assert_eq!(catalog.warnings().len(), 1);
    }

    #[test]
    fn unparseable_tables_fail_strict_load() {
        let result = ContentCatalog::load(&InlineTables("[[projects"), &NoPosts, &loader());
        assert!(matches!(result, Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn degraded_load_keeps_the_healthy_source() {
        let catalog = ContentCatalog::load_degraded(&InlineTables(TABLES), &BrokenBlog, &loader());

        assert_eq!(catalog.all(ContentKind::Project).len(), 2);
        assert!(catalog.all(ContentKind::BlogPost).is_empty());
        assert_eq!(catalog.notices().len(), 1);
        assert!(catalog.notices()[0].contains("missing-blog"));
    }

    #[test]
    fn category_options_start_with_all() {
        let catalog =
            ContentCatalog::load(&InlineTables(TABLES), &NoPosts, &loader()).expect("catalog");
        assert_eq!(
            catalog.category_options(ContentKind::SkillCategory),
            ["All", "Programming Languages"]
        );
    }
}
