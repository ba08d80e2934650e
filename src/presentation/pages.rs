//! Turns router output into HTML responses.

use axum::{http::StatusCode, response::Response};

use crate::{
    application::{
        blog::is_relative_reference,
        pages::{
            ActionLink, ContactSpec, DetailSpec, HomeSpec, ListingEntry, ListingSpec, NavLink,
            NotFoundSpec, PageSpec, RenderSpec,
        },
        render::MarkdownRenderer,
    },
    domain::{
        content::{ContentItem, Directive, ItemDetail},
        navigation::{DetailFacet, FormFeedback, NavTarget},
    },
};

use super::views::{
    ActionView, BrandView, CardView, ContactMethodView, ContactTemplate, ContactView,
    DetailTemplate, DetailView, DirectiveView, ErrorPageView, ErrorTemplate, FilterOptionView,
    FooterView, HomeTemplate, HomeView, LayoutChrome, LayoutContext, ListingTemplate, ListingView,
    NavigationLinkView, NavigationView, PageMetaView, mark_not_found, render_template_response,
};

const EXCERPT_CHARS: usize = 180;

pub struct PageRenderer {
    markdown: MarkdownRenderer,
    asset_prefix: String,
    footer_copy: String,
}

impl PageRenderer {
    pub fn new(asset_prefix: impl Into<String>, footer_copy: impl Into<String>) -> Self {
        Self {
            markdown: MarkdownRenderer::new(),
            asset_prefix: asset_prefix.into().trim_end_matches('/').to_string(),
            footer_copy: footer_copy.into(),
        }
    }

    pub fn render(&self, spec: &RenderSpec) -> Response {
        let chrome = self.chrome(spec);
        match &spec.page {
            PageSpec::Home(home) => render_template_response(
                HomeTemplate {
                    view: LayoutContext::new(chrome, self.home_view(home)),
                },
                StatusCode::OK,
            ),
            PageSpec::Listing(listing) => render_template_response(
                ListingTemplate {
                    view: LayoutContext::new(chrome, self.listing_view(listing)),
                },
                StatusCode::OK,
            ),
            PageSpec::Detail(detail) => render_template_response(
                DetailTemplate {
                    view: LayoutContext::new(chrome, self.detail_view(detail)),
                },
                StatusCode::OK,
            ),
            PageSpec::Contact(contact) => render_template_response(
                ContactTemplate {
                    view: LayoutContext::new(chrome, contact_view(contact)),
                },
                StatusCode::OK,
            ),
            PageSpec::NotFound(not_found) => self.not_found(chrome, not_found),
        }
    }

    fn not_found(&self, chrome: LayoutChrome, spec: &NotFoundSpec) -> Response {
        let content = ErrorPageView::not_found(spec.requested.as_deref(), actions(&spec.actions));
        let response = render_template_response(
            ErrorTemplate {
                view: LayoutContext::new(chrome, content),
            },
            StatusCode::NOT_FOUND,
        );
        mark_not_found(response, spec.requested.as_deref())
    }

    fn chrome(&self, spec: &RenderSpec) -> LayoutChrome {
        LayoutChrome {
            brand: BrandView {
                title: spec.site_name.clone(),
                href: NavTarget::Home.path().to_string(),
            },
            navigation: NavigationView {
                entries: spec.nav.iter().map(nav_link).collect(),
            },
            footer: FooterView {
                copy: self.footer_copy.clone(),
            },
            meta: PageMetaView {
                title: spec.title.clone(),
                description: format!("Portfolio of {}", spec.site_name),
            },
            notices: spec.notices.clone(),
        }
    }

    /// Resolve a content-relative image reference against the asset route.
    fn asset_url(&self, reference: &str) -> String {
        if is_relative_reference(reference) {
            format!(
                "{}/{}",
                self.asset_prefix,
                reference.trim_start_matches("./")
            )
        } else {
            reference.to_string()
        }
    }

    fn home_view(&self, spec: &HomeSpec) -> HomeView {
        let profile = &spec.profile;
        HomeView {
            name: profile.name.clone(),
            headline: profile.headline.clone(),
            summary_html: self.markdown.render(&profile.summary),
            image: profile.image.as_deref().map(|image| self.asset_url(image)),
            expertise: profile.expertise.clone(),
            featured: spec
                .featured_projects
                .iter()
                .map(|entry| self.card(entry))
                .collect(),
            recent_posts: spec.recent_posts.iter().map(|entry| self.card(entry)).collect(),
            actions: actions(&spec.actions),
        }
    }

    fn listing_view(&self, spec: &ListingSpec) -> ListingView {
        let form_action = NavTarget::for_kind(spec.kind)
            .map(NavTarget::path)
            .unwrap_or("/")
            .to_string();

        let tags = spec
            .tag_options
            .iter()
            .map(|tag| FilterOptionView {
                value: tag.clone(),
                label: tag.clone(),
                is_active: spec.criteria.tags.contains(tag),
            })
            .collect::<Vec<_>>();

        let selected_category = if spec.criteria.category.is_empty() {
            crate::application::catalog::ALL_CATEGORIES
        } else {
            spec.criteria.category.as_str()
        };
        let categories = spec
            .category_options
            .iter()
            .map(|category| FilterOptionView {
                value: category.clone(),
                label: category.clone(),
                is_active: category.eq_ignore_ascii_case(selected_category),
            })
            .collect::<Vec<_>>();

        ListingView {
            heading: spec.heading.to_string(),
            intro_html: spec.intro.as_deref().map(|intro| self.markdown.render(intro)),
            cards: spec.entries.iter().map(|entry| self.card(entry)).collect(),
            shown: spec.entries.len(),
            total: spec.total,
            has_results: !spec.entries.is_empty(),
            is_filtered: spec.is_filtered(),
            form_action,
            search_text: spec.criteria.search_text.clone(),
            show_tags: !tags.is_empty(),
            show_categories: categories.len() > 2,
            tags,
            categories,
        }
    }

    fn card(&self, entry: &ListingEntry) -> CardView {
        let item = &entry.item;
        let (meta, thumbnail) = item_meta(item);
        let badges = match &item.detail {
            ItemDetail::SkillCategory { skills } => skills.clone(),
            _ => item.tags.iter().cloned().collect(),
        };
        CardView {
            title: item.title.clone(),
            href: entry.open.as_ref().map(|link| link.href.clone()),
            link_label: entry
                .open
                .as_ref()
                .map(|link| link.label.clone())
                .unwrap_or_default(),
            excerpt: excerpt(&item.body),
            meta,
            badges,
            thumbnail: thumbnail.map(|image| self.asset_url(&image)),
        }
    }

    fn detail_view(&self, spec: &DetailSpec) -> DetailView {
        let item = &spec.item;
        let (meta, thumbnail) = item_meta(item);

        let body = match (&item.detail, spec.facet) {
            (ItemDetail::Project(project), DetailFacet::CaseStudy) => {
                project.case_study.as_deref().unwrap_or_default()
            }
            _ => item.body.as_str(),
        };

        let (interactive, directives) = match &item.detail {
            ItemDetail::BlogPost(blog) => (
                blog.interactive,
                blog.directives.iter().map(directive_view).collect(),
            ),
            _ => (false, Vec::new()),
        };

        let kicker = match spec.facet {
            DetailFacet::Overview => item.kind().label().to_string(),
            DetailFacet::CaseStudy => "Case study".to_string(),
        };

        DetailView {
            kicker,
            title: item.title.clone(),
            meta,
            badges: item.tags.iter().cloned().collect(),
            thumbnail: thumbnail.map(|image| self.asset_url(&image)),
            repository: item.project().and_then(|project| project.repository.clone()),
            published: item.blog().map(|blog| blog.iso_date()),
            body_html: self.markdown.render(body),
            interactive,
            directives,
            actions: actions(&spec.actions),
        }
    }
}

fn nav_link(link: &NavLink) -> NavigationLinkView {
    NavigationLinkView {
        label: link.label.to_string(),
        href: link.href.to_string(),
        is_active: link.active,
    }
}

fn actions(links: &[ActionLink]) -> Vec<ActionView> {
    links
        .iter()
        .map(|link| ActionView {
            label: link.label.clone(),
            href: link.href.clone(),
        })
        .collect()
}

fn item_meta(item: &ContentItem) -> (Vec<String>, Option<String>) {
    let mut meta = Vec::new();
    let mut thumbnail = None;
    match &item.detail {
        ItemDetail::Project(project) => {
            if let Some(year) = project.year {
                meta.push(year.to_string());
            }
            if let Some(category) = &item.category {
                meta.push(category.clone());
            }
            thumbnail = project.thumbnail.clone();
        }
        ItemDetail::SkillCategory { skills } => {
            meta.push(format!("{} skills", skills.len()));
        }
        ItemDetail::Certification(cert) => {
            meta.push(cert.issuer.clone());
            if let Some(year) = cert.year {
                meta.push(year.to_string());
            }
        }
        ItemDetail::BlogPost(blog) => {
            meta.push(blog.published_label());
            if let Some(category) = &item.category {
                meta.push(category.clone());
            }
        }
        ItemDetail::TimelineEntry(entry) => {
            meta.push(entry.organization.clone());
            meta.push(entry.period());
        }
    }
    (meta, thumbnail)
}

fn directive_view(directive: &Directive) -> DirectiveView {
    match directive {
        Directive::Plot {
            chart,
            source,
            caption,
        } => DirectiveView {
            is_code: false,
            label: chart.clone(),
            source: source.clone(),
            caption: caption.clone(),
        },
        Directive::Code { language, source } => DirectiveView {
            is_code: true,
            label: language.clone(),
            source: source.clone(),
            caption: None,
        },
    }
}

fn contact_view(spec: &ContactSpec) -> ContactView {
    let (errors, failure) = match &spec.feedback {
        Some(FormFeedback::Invalid(errors)) => (errors.clone(), None),
        Some(FormFeedback::Failed(message)) => (Vec::new(), Some(message.clone())),
        Some(FormFeedback::Sent) | None => (Vec::new(), None),
    };
    ContactView {
        name: spec.draft.get("name").to_string(),
        email: spec.draft.get("email").to_string(),
        message: spec.draft.get("message").to_string(),
        sent: spec.submitted,
        errors,
        failure,
        methods: spec
            .methods
            .iter()
            .map(|method| ContactMethodView {
                label: method.label.clone(),
                value: method.value.clone(),
                href: method.href.clone(),
            })
            .collect(),
    }
}

/// First prose paragraph of a Markdown body, shortened for cards.
pub fn excerpt(body: &str) -> String {
    let paragraph = body
        .split("\n\n")
        .map(str::trim)
        .find(|block| {
            !block.is_empty()
                && !block.starts_with('#')
                && !block.starts_with("```")
                && !block.starts_with("![")
                && !block.starts_with('<')
        })
        .unwrap_or_default();

    let flattened = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= EXCERPT_CHARS {
        return flattened;
    }
    let cut: String = flattened.chars().take(EXCERPT_CHARS).collect();
    match cut.rfind(' ') {
        Some(space) => format!("{}…", &cut[..space]),
        None => format!("{cut}…"),
    }
}
