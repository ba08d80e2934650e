use std::collections::BTreeSet;

use folio::{
    application::{
        blog::{BlogLoader, BlogSource, ParseError, PostEntries, RawPost},
        catalog::{ContentCatalog, LoadError, TableSource},
        filter::{FilterCriteria, apply},
        pages::PageSpec,
        router::{route, transition},
    },
    domain::{
        content::{ContentId, ContentKind},
        navigation::{DetailFacet, FormKind, NavAction, NavTarget, NavigationState, Page},
    },
};
use time::macros::date;

struct Tables;

impl TableSource for Tables {
    fn describe(&self) -> String {
        "tables".to_string()
    }

    fn load(&self) -> Result<toml::Table, LoadError> {
        toml::from_str(
            r#"
[profile]
name = "Grace Hopper"
bio = "Compiler pioneer."

[[projects]]
id = "cobol"
title = "COBOL"
description = "A business language."
tags = ["compilers", "languages"]
category = "Languages"
case_study = "How COBOL came to be."

[[projects]]
id = "a0"
title = "A-0 System"
description = "An early compiler."
tags = ["compilers"]
category = "Tools"

[[projects]]
id = "mark1"
title = "Harvard Mark I"
description = "Programming an electromechanical computer."
tags = ["hardware"]
category = "Tools"

[[certifications]]
title = "Rear Admiral"
issuer = "US Navy"
"#,
        )
        .map_err(|err| LoadError::malformed("tables", err.to_string()))
    }
}

struct Posts;

impl BlogSource for Posts {
    fn describe(&self) -> String {
        "posts".to_string()
    }

    fn entries(&self) -> Result<PostEntries<'_>, LoadError> {
        let post = |origin: &str, title: &str, tags: &[&str]| -> Result<RawPost, ParseError> {
            let mut metadata = toml::Table::new();
            metadata.insert("title".into(), toml::Value::String(title.to_string()));
            metadata.insert("date".into(), toml::Value::String("2024-05-01".to_string()));
            metadata.insert(
                "tags".into(),
                toml::Value::Array(
                    tags.iter()
                        .map(|tag| toml::Value::String(tag.to_string()))
                        .collect(),
                ),
            );
            Ok(RawPost {
                origin: origin.to_string(),
                metadata,
                body: format!("About {title}."),
            })
        };
        Ok(Box::new(
            vec![
                post("bug.md", "The First Bug", &["history"]),
                post("nano.md", "Nanoseconds", &["teaching", "history"]),
            ]
            .into_iter(),
        ))
    }
}

fn catalog() -> ContentCatalog {
    let loader = BlogLoader::with_load_date("/assets/blog", date!(2026 - 10 - 19));
    ContentCatalog::load(&Tables, &Posts, &loader).expect("catalog loads")
}

fn open(kind: ContentKind, id: &str) -> NavAction {
    NavAction::OpenDetail {
        kind,
        id: id.to_string(),
        facet: DetailFacet::Overview,
    }
}

#[test]
fn empty_criteria_is_the_identity() {
    let catalog = catalog();
    for kind in ContentKind::ALL {
        let items = catalog.all(kind);
        let filtered = apply(items, &FilterCriteria::default());
        assert_eq!(filtered, items.to_vec(), "{kind:?}");
    }
}

#[test]
fn tag_filter_has_no_false_negatives_or_positives() {
    let catalog = catalog();
    let items = catalog.all(ContentKind::Project);
    let criteria = FilterCriteria {
        tags: BTreeSet::from(["compilers".to_string()]),
        ..FilterCriteria::default()
    };

    let filtered = apply(items, &criteria);

    for item in items {
        let kept = filtered.iter().any(|kept| kept.id == item.id);
        assert_eq!(kept, item.has_tag("compilers"), "{}", item.id);
    }
}

#[test]
fn query_strings_drive_listing_filters() {
    let catalog = catalog();
    let state = transition(
        NavigationState::default(),
        NavAction::Select(NavTarget::Projects),
        &catalog,
    );
    let criteria = FilterCriteria::from_query(Some("q=compiler&category=tools"));
    let spec = route(&state, &catalog, &criteria);

    let PageSpec::Listing(listing) = spec.page else {
        panic!("expected listing");
    };
    // Category comparison is exact; only "All" is case-insensitive.
    assert!(listing.entries.is_empty());
    assert_eq!(listing.total, 3);

    let criteria = FilterCriteria::from_query(Some("q=compiler&category=Tools"));
    let PageSpec::Listing(listing) = route(&state, &catalog, &criteria).page else {
        panic!("expected listing");
    };
    let ids: Vec<_> = listing
        .entries
        .iter()
        .map(|entry| entry.item.id.to_string())
        .collect();
    assert_eq!(ids, ["a0"]);
}

#[test]
fn missing_detail_routes_to_not_found() {
    let catalog = catalog();
    let state = transition(
        NavigationState::default(),
        open(ContentKind::Project, "does-not-exist"),
        &catalog,
    );

    assert_eq!(
        state.page,
        Page::NotFound {
            requested: Some("does-not-exist".to_string())
        }
    );
    let spec = route(&state, &catalog, &FilterCriteria::default());
    assert!(spec.is_not_found());
    assert_eq!(spec.active_nav(), None);
}

#[test]
fn detail_of_the_wrong_kind_is_not_found() {
    let catalog = catalog();
    let state = transition(
        NavigationState::default(),
        open(ContentKind::BlogPost, "cobol"),
        &catalog,
    );
    assert!(matches!(state.page, Page::NotFound { .. }));
}

#[test]
fn case_study_requires_one_to_exist() {
    let catalog = catalog();
    let case_study = |id: &str| NavAction::OpenDetail {
        kind: ContentKind::Project,
        id: id.to_string(),
        facet: DetailFacet::CaseStudy,
    };

    let state = transition(NavigationState::default(), case_study("cobol"), &catalog);
    assert!(matches!(
        state.page,
        Page::Detail {
            facet: DetailFacet::CaseStudy,
            ..
        }
    ));

    let state = transition(NavigationState::default(), case_study("a0"), &catalog);
    assert!(matches!(state.page, Page::NotFound { .. }));
}

#[test]
fn identity_fields_survive_leaving_the_form() {
    let catalog = catalog();
    let mut state = transition(
        NavigationState::default(),
        NavAction::Select(NavTarget::Contact),
        &catalog,
    );
    for (field, value) in [("name", "Ada"), ("email", "ada@example.com"), ("message", "Hi")] {
        state = transition(
            state,
            NavAction::EditDraft {
                field: field.to_string(),
                value: value.to_string(),
            },
            &catalog,
        );
    }

    let state = transition(state, NavAction::Select(NavTarget::Blog), &catalog);
    let state = transition(state, NavAction::Select(NavTarget::Contact), &catalog);

    assert_eq!(state.page, Page::Form(FormKind::Contact));
    assert_eq!(state.form_draft.get("name"), "Ada");
    assert_eq!(state.form_draft.get("email"), "ada@example.com");
    assert_eq!(state.form_draft.get("message"), "");
}

#[test]
fn back_and_return_home_reset_state() {
    let catalog = catalog();
    let state = transition(
        NavigationState::default(),
        open(ContentKind::BlogPost, "nano"),
        &catalog,
    );
    let state = transition(state, NavAction::Back, &catalog);
    assert_eq!(state.page, Page::Listing(ContentKind::BlogPost));

    let state = transition(state, NavAction::Back, &catalog);
    assert_eq!(state, NavigationState::default());

    let mut state = transition(state, NavAction::Select(NavTarget::Contact), &catalog);
    state.form_draft.set("name", "Ada");
    let state = transition(state, NavAction::ReturnHome, &catalog);
    assert_eq!(state, NavigationState::default());
}

#[test]
fn every_page_routes_to_a_spec() {
    let catalog = catalog();
    let mut pages: Vec<Page> = NavTarget::ALL.iter().map(|target| target.page()).collect();
    pages.push(Page::Detail {
        kind: ContentKind::Project,
        id: ContentId::new("cobol"),
        facet: DetailFacet::Overview,
    });
    pages.push(Page::NotFound { requested: None });

    for page in pages {
        let state = NavigationState {
            page: page.clone(),
            ..NavigationState::default()
        };
        let spec = route(&state, &catalog, &FilterCriteria::default());
        assert_eq!(spec.site_name, "Grace Hopper");
        assert_eq!(spec.nav.len(), NavTarget::ALL.len());
        assert_eq!(
            spec.nav.iter().filter(|link| link.active).count(),
            usize::from(!matches!(page, Page::NotFound { .. })),
            "{page:?}"
        );
    }
}
