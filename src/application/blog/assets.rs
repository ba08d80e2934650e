use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::warn;

static MARKDOWN_TARGET: Lazy<Option<Regex>> =
    Lazy::new(|| compile(r"(?P<lead>!?\[[^\]]*\]\()(?P<target>[^)\s]+)"));
static HTML_ATTRIBUTE: Lazy<Option<Regex>> =
    Lazy::new(|| compile(r#"(?P<lead>\b(?:src|href)\s*=\s*")(?P<target>[^"]+)"#));

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!(target: "folio::blog", error = %err, "asset pattern failed to compile");
            None
        }
    }
}

/// Whether a link target points at a file next to the post.
pub fn is_relative_reference(target: &str) -> bool {
    let lowered = target.to_ascii_lowercase();
    !(target.is_empty()
        || target.starts_with('/')
        || target.starts_with('#')
        || target.starts_with('?')
        || lowered.contains("://")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:"))
}

/// Rewrite relative link and image targets so they resolve under
/// `asset_root`. Fenced code blocks are copied verbatim.
pub fn normalize_asset_paths(body: &str, asset_root: &str) -> String {
    let root = asset_root.trim_end_matches('/');
    let mut output = String::with_capacity(body.len());
    let mut fence: Option<&str> = None;

    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_start();
        match fence {
            Some(marker) => {
                if trimmed.starts_with(marker) {
                    fence = None;
                }
                output.push_str(line);
            }
            None if trimmed.starts_with("```") || trimmed.starts_with("~~~") => {
                fence = Some(&trimmed[..3]);
                output.push_str(line);
            }
            None => output.push_str(&rewrite_line(line, root)),
        }
    }

    output
}

fn rewrite_line<'a>(line: &'a str, root: &str) -> Cow<'a, str> {
    let mut current = Cow::Borrowed(line);
    for pattern in [&MARKDOWN_TARGET, &HTML_ATTRIBUTE] {
        let Some(regex) = Lazy::force(pattern) else {
            continue;
        };
        if !regex.is_match(&current) {
            continue;
        }
        let replaced = regex
            .replace_all(&current, |caps: &Captures<'_>| {
                let target = &caps["target"];
                if is_relative_reference(target) {
                    let cleaned = target.trim_start_matches("./");
                    format!("{}{root}/{cleaned}", &caps["lead"])
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();
        current = Cow::Owned(replaced);
    }
    current
}
