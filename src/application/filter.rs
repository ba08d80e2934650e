//! Tag, free-text and category filtering over catalog slices.

use std::{borrow::Borrow, collections::BTreeSet};

use url::form_urlencoded;

use crate::{application::catalog::ALL_CATEGORIES, domain::content::ContentItem};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub tags: BTreeSet<String>,
    pub search_text: String,
    pub category: String,
}

impl FilterCriteria {
    /// Build criteria from a raw query string, accepting repeated `tag` keys.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut criteria = Self::default();
        let Some(query) = query else {
            return criteria;
        };

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            match key.as_ref() {
                "tag" | "tags" => criteria.tags.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|tag| !tag.is_empty())
                        .map(str::to_string),
                ),
                "q" => criteria.search_text = value.to_string(),
                "category" => criteria.category = value.to_string(),
                _ => {}
            }
        }

        criteria
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.search_text.is_empty() && !self.restricts_category()
    }

    fn restricts_category(&self) -> bool {
        !self.category.is_empty() && !self.category.eq_ignore_ascii_case(ALL_CATEGORIES)
    }

    pub fn matches(&self, item: &ContentItem) -> bool {
        let tags_ok = self.tags.is_empty() || self.tags.iter().any(|tag| item.has_tag(tag));

        let search_ok = self.search_text.is_empty() || {
            let needle = self.search_text.to_lowercase();
            item.title.to_lowercase().contains(&needle) || item.body.to_lowercase().contains(&needle)
        };

        let category_ok =
            !self.restricts_category() || item.category.as_deref() == Some(self.category.as_str());

        tags_ok && search_ok && category_ok
    }
}

/// Keep the items matching `criteria`, preserving their order.
pub fn apply<T>(items: &[T], criteria: &FilterCriteria) -> Vec<T>
where
    T: Borrow<ContentItem> + Clone,
{
    if criteria.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| criteria.matches((*item).borrow()))
        .cloned()
        .collect()
}
