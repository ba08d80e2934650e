//! Blog post loading.
//!
//! A [`BlogSource`] yields raw posts (front matter already split from the
//! body); [`BlogLoader`] turns each one into a catalog item, filling in
//! defaults and collecting warnings for anything it had to repair.

mod assets;

pub use assets::{is_relative_reference, normalize_asset_paths};

use serde::Deserialize;
use thiserror::Error;
use time::{Date, Month, OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::debug;

use crate::{
    application::catalog::LoadError,
    domain::{
        content::{
            BlogDetail, ContentId, ContentItem, Directive, ISO_DATE_FORMAT, ItemDetail, SortKey,
        },
        slug::{derive_slug, is_valid_slug},
    },
};

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_CATEGORY: &str = "General";

/// A post as read from storage, before any validation.
#[derive(Debug, Clone)]
pub struct RawPost {
    pub origin: String,
    pub metadata: toml::Table,
    pub body: String,
}

/// A single post that could not be turned into a catalog item.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{origin}: {reason}")]
pub struct ParseError {
    pub origin: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            reason: reason.into(),
        }
    }
}

pub type PostEntries<'a> = Box<dyn Iterator<Item = Result<RawPost, ParseError>> + 'a>;

/// Supplier of raw blog posts. Entries are produced lazily so one unreadable
/// file never hides the rest.
pub trait BlogSource: Send + Sync {
    fn describe(&self) -> String;
    fn entries(&self) -> Result<PostEntries<'_>, LoadError>;
}

#[derive(Debug, Clone)]
pub struct LoadedPost {
    pub origin: String,
    pub item: ContentItem,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FrontMatter {
    title: Option<String>,
    date: Option<toml::Value>,
    slug: Option<String>,
    category: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    interactive: bool,
    plot: Option<toml::Value>,
    code: Option<toml::Value>,
}

#[derive(Debug, Clone)]
pub struct BlogLoader {
    asset_root: String,
    load_date: Date,
}

impl BlogLoader {
    /// Loader whose fallback date is today's date (UTC).
    pub fn new(asset_root: impl Into<String>) -> Self {
        Self::with_load_date(asset_root, OffsetDateTime::now_utc().date())
    }

    /// Loader with a fixed fallback date.
    pub fn with_load_date(asset_root: impl Into<String>, load_date: Date) -> Self {
        Self {
            asset_root: asset_root.into(),
            load_date,
        }
    }

    pub fn load_date(&self) -> Date {
        self.load_date
    }

    pub fn load_post(&self, raw: RawPost) -> Result<LoadedPost, ParseError> {
        let RawPost {
            origin,
            metadata,
            body,
        } = raw;

        let front: FrontMatter = toml::Value::Table(metadata)
            .try_into()
            .map_err(|err: toml::de::Error| ParseError::new(&origin, err.to_string().trim()))?;

        let mut warnings = Vec::new();

        let title = match front.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => {
                warnings.push(format!("missing title, using `{DEFAULT_TITLE}`"));
                DEFAULT_TITLE.to_string()
            }
        };

        let id = post_id(&origin, front.slug.as_deref())?;

        let (published, date_is_fallback) = match front.date.as_ref().and_then(parse_date) {
            Some(date) => (date, false),
            None => {
                let reason = match &front.date {
                    Some(value) => format!("unrecognized date `{value}`"),
                    None => "missing date".to_string(),
                };
                warnings.push(format!("{reason}, using load date"));
                (self.load_date, true)
            }
        };

        let category = front
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string();

        let mut directives = Vec::new();
        if let Some(value) = front.plot {
            collect_directives(value, "plot", parse_plot, &mut directives, &mut warnings);
        }
        if let Some(value) = front.code {
            collect_directives(value, "code", parse_code, &mut directives, &mut warnings);
        }

        let body = normalize_asset_paths(&body, &self.asset_root);

        debug!(
            target: "folio::blog",
            origin = %origin,
            id = %id,
            directives = directives.len(),
            "loaded blog post"
        );

        let item = ContentItem {
            id,
            title,
            tags: front
                .tags
                .into_iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            body,
            category: Some(category),
            sort_key: SortKey::Published {
                date: published,
                estimated: date_is_fallback,
            },
            detail: ItemDetail::BlogPost(BlogDetail {
                published,
                date_is_fallback,
                interactive: front.interactive,
                directives,
                origin: origin.clone(),
            }),
        };

        Ok(LoadedPost {
            origin,
            item,
            warnings,
        })
    }
}

fn post_id(origin: &str, explicit: Option<&str>) -> Result<ContentId, ParseError> {
    if let Some(slug) = explicit.map(str::trim).filter(|slug| !slug.is_empty()) {
        if !is_valid_slug(slug) {
            return Err(ParseError::new(origin, format!("invalid slug `{slug}`")));
        }
        return Ok(ContentId::new(slug));
    }

    let stem = std::path::Path::new(origin)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(origin);
    derive_slug(stem)
        .map(ContentId::new)
        .map_err(|err| ParseError::new(origin, err.to_string()))
}

fn parse_date(value: &toml::Value) -> Option<Date> {
    match value {
        toml::Value::String(text) => {
            let text = text.trim();
            Date::parse(text, ISO_DATE_FORMAT)
                .ok()
                .or_else(|| OffsetDateTime::parse(text, &Rfc3339).ok().map(|dt| dt.date()))
        }
        toml::Value::Datetime(datetime) => {
            let date = datetime.date?;
            let month = Month::try_from(date.month).ok()?;
            Date::from_calendar_date(i32::from(date.year), month, date.day).ok()
        }
        _ => None,
    }
}

/// Accept either a single table or an array of tables under `name`.
fn collect_directives(
    value: toml::Value,
    name: &str,
    parse: fn(&toml::Table) -> Result<Directive, String>,
    directives: &mut Vec<Directive>,
    warnings: &mut Vec<String>,
) {
    let tables = match value {
        toml::Value::Table(table) => vec![table],
        toml::Value::Array(values) => values
            .into_iter()
            .filter_map(|value| match value {
                toml::Value::Table(table) => Some(table),
                other => {
                    warnings.push(format!(
                        "`{name}` directive must be a table, found {}",
                        other.type_str()
                    ));
                    None
                }
            })
            .collect(),
        other => {
            warnings.push(format!(
                "`{name}` directive must be a table, found {}",
                other.type_str()
            ));
            return;
        }
    };

    for table in &tables {
        match parse(table) {
            Ok(directive) => directives.push(directive),
            Err(reason) => warnings.push(format!("`{name}` directive dropped: {reason}")),
        }
    }
}

fn required<'a>(table: &'a toml::Table, field: &str) -> Result<&'a str, String> {
    table
        .get(field)
        .and_then(toml::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| format!("missing `{field}`"))
}

fn parse_plot(table: &toml::Table) -> Result<Directive, String> {
    Ok(Directive::Plot {
        chart: required(table, "chart")?.to_string(),
        source: required(table, "source")?.to_string(),
        caption: table
            .get("caption")
            .and_then(toml::Value::as_str)
            .map(str::to_string),
    })
}

fn parse_code(table: &toml::Table) -> Result<Directive, String> {
    Ok(Directive::Code {
        language: required(table, "language")?.to_string(),
        source: required(table, "source")?.to_string(),
    })
}
