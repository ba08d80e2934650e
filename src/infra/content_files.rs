//! Filesystem-backed content sources.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::application::{
    blog::{BlogSource, ParseError, PostEntries, RawPost},
    catalog::{LoadError, TableSource},
};

const FRONT_MATTER_FENCE: &str = "+++";
const POST_EXTENSION: &str = "md";

/// The TOML file holding the profile and the static tables.
#[derive(Debug, Clone)]
pub struct TomlTableFile {
    path: PathBuf,
}

impl TomlTableFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for TomlTableFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<toml::Table, LoadError> {
        let origin = self.describe();
        let text = fs::read_to_string(&self.path).map_err(|err| LoadError::io(&origin, err))?;
        toml::from_str(&text).map_err(|err| LoadError::malformed(origin, err.to_string().trim()))
    }
}

/// A flat directory of Markdown posts with `+++` delimited TOML front matter.
#[derive(Debug, Clone)]
pub struct DirectoryBlogSource {
    dir: PathBuf,
}

impl DirectoryBlogSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl BlogSource for DirectoryBlogSource {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn entries(&self) -> Result<PostEntries<'_>, LoadError> {
        let origin = self.describe();
        let listing = fs::read_dir(&self.dir).map_err(|err| LoadError::io(&origin, err))?;

        let mut paths = Vec::new();
        for entry in listing {
            let path = entry.map_err(|err| LoadError::io(&origin, err))?.path();
            if is_post(&path) {
                paths.push(path);
            } else {
                debug!(target: "folio::content", path = %path.display(), "ignoring non-post file");
            }
        }
        paths.sort();

        Ok(Box::new(paths.into_iter().map(|path| read_post(&path))))
    }
}

fn is_post(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(POST_EXTENSION))
}

fn read_post(path: &Path) -> Result<RawPost, ParseError> {
    let origin = path.display().to_string();
    let text = fs::read_to_string(path)
        .map_err(|err| ParseError::new(&origin, format!("unreadable: {err}")))?;
    parse_post(origin, &text)
}

/// Split a post into its front matter table and Markdown body.
pub fn parse_post(origin: String, text: &str) -> Result<RawPost, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some((front, body)) = split_front_matter(text) else {
        return Err(ParseError::new(
            origin,
            format!("missing `{FRONT_MATTER_FENCE}` front matter header"),
        ));
    };

    let metadata = match front {
        Ok(front) => toml::from_str::<toml::Table>(front).map_err(|err| {
            ParseError::new(&origin, format!("invalid front matter: {}", err.to_string().trim()))
        })?,
        Err(()) => {
            return Err(ParseError::new(origin, "front matter is never closed"));
        }
    };

    Ok(RawPost {
        origin,
        metadata,
        body: body.trim_start_matches(['\r', '\n']).to_string(),
    })
}

/// `None` when the text does not open with a fence; `Err` when the fence is
/// never closed.
fn split_front_matter(text: &str) -> Option<(Result<&str, ()>, &str)> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != FRONT_MATTER_FENCE {
        return None;
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == FRONT_MATTER_FENCE {
            let front = &text[start..offset];
            let body = &text[offset + line.len()..];
            return Some((Ok(front), body));
        }
        offset += line.len();
    }
    Some((Err(()), ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_front_matter_from_body() {
        let post = parse_post(
            "a.md".to_string(),
            "+++\ntitle = \"Hello\"\ntags = [\"ml\"]\n+++\n\n# Heading\n\nBody text.\n",
        )
        .expect("valid post");

        assert_eq!(
            post.metadata.get("title").and_then(|v| v.as_str()),
            Some("Hello")
        );
        assert_eq!(post.body, "# Heading\n\nBody text.\n");
    }

    #[test]
    fn files_without_front_matter_are_rejected() {
        let err = parse_post("b.md".to_string(), "Just prose.\n").expect_err("no header");
        assert!(err.reason.contains("front matter header"));
    }

    #[test]
    fn empty_front_matter_is_allowed() {
        let post = parse_post("f.md".to_string(), "+++\n+++\nBody\n").expect("valid post");
        assert!(post.metadata.is_empty());
        assert_eq!(post.body, "Body\n");
    }

    #[test]
    fn unclosed_front_matter_is_rejected() {
        let err = parse_post("c.md".to_string(), "+++\ntitle = \"x\"\nbody").expect_err("unclosed");
        assert_eq!(err.origin, "c.md");
        assert!(err.reason.contains("never closed"));
    }

    #[test]
    fn malformed_front_matter_is_rejected() {
        let err = parse_post("d.md".to_string(), "+++\ntitle = \n+++\nbody").expect_err("bad toml");
        assert!(err.reason.starts_with("invalid front matter"));
    }

    #[test]
    fn crlf_fences_are_accepted() {
        let post = parse_post("e.md".to_string(), "+++\r\ntitle = \"Win\"\r\n+++\r\nBody\r\n")
            .expect("valid post");
        assert_eq!(
            post.metadata.get("title").and_then(|v| v.as_str()),
            Some("Win")
        );
        assert_eq!(post.body, "Body\r\n");
    }
}
