//! Markdown rendering for post bodies, project descriptions and case studies.

use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;
use comrak::{markdown_to_html, options::Options};

/// Comrak pipeline followed by Ammonia sanitisation.
pub struct MarkdownRenderer {
    options: Options<'static>,
    sanitizer: AmmoniaBuilder<'static>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            options: default_options(),
            sanitizer: build_sanitizer(),
        }
    }

    pub fn render(&self, markdown: &str) -> String {
        let html = markdown_to_html(markdown, &self.options);
        self.sanitizer.clean(&html).to_string()
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn default_options() -> Options<'static> {
    let mut options = Options::default();

    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.footnotes = true;
    ext.description_lists = true;

    let render = &mut options.render;
    render.github_pre_lang = true;
    render.r#unsafe = true;

    options
}

fn build_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let generic: HashSet<&'static str> =
        HashSet::from(["class", "id", "title", "lang", "aria-hidden", "aria-label", "role"]);
    builder.generic_attributes(generic);

    builder.add_tags(&["figure", "figcaption", "input", "section"]);
    builder.add_tag_attributes("code", &["class", "data-language"]);
    builder.add_tag_attributes("pre", &["class", "lang", "data-language"]);
    builder.add_tag_attributes("img", &["alt", "title", "width", "height", "loading"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled"]);
    builder.add_tag_attributes("th", &["align"]);
    builder.add_tag_attributes("td", &["align"]);

    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_tables_and_code_languages() {
        let html = MarkdownRenderer::new()
            .render("| a |\n|---|\n| 1 |\n\n```python\nx = 1\n```\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("lang=\"python\""));
    }

    #[test]
    fn strips_scripts() {
        let html = MarkdownRenderer::new().render("Hello <script>alert(1)</script>");
        assert!(html.contains("Hello"));
        assert!(!html.contains("<script"));
    }
}
