//! Splitting content files into front matter and body
//!
//! The split is a single forward pass over the lines of the file. Line
//! endings are preserved so that header and body text are exact slices of
//! the input.

use crate::core::metadata::Metadata;
use crate::core::types::TypeConfig;
use crate::error::Result;
use log::warn;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ScanningStart,
    InHeader,
    InBody,
}

/// Header and body text of a file, before the header is parsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    pub header: String,
    pub body: String,
    /// True when an opening delimiter was never closed
    pub unterminated: bool,
}

/// Split raw text according to a type rule.
///
/// Without a rule the whole text is body.
pub fn split(content: &str, typeconfig: Option<&TypeConfig>) -> Split {
    let Some(typeconfig) = typeconfig else {
        return Split {
            body: content.to_string(),
            ..Split::default()
        };
    };

    let mut out = Split::default();
    let mut state = State::ScanningStart;

    for line in content.split_inclusive('\n') {
        match state {
            State::ScanningStart => {
                if line.trim() == typeconfig.header_open() {
                    state = State::InHeader;
                } else {
                    state = State::InBody;
                    out.body.push_str(line);
                }
            }
            State::InHeader => {
                if line.trim() == typeconfig.header_close() {
                    state = State::InBody;
                } else {
                    out.header.push_str(line);
                }
            }
            State::InBody => out.body.push_str(line),
        }
    }

    out.unterminated = state == State::InHeader;
    out
}

/// Split a file and parse its front matter into [`Metadata`].
///
/// `path` is only used for error messages and diagnostics.
pub fn parse(
    content: &str,
    typeconfig: Option<&TypeConfig>,
    path: &Path,
) -> Result<(Metadata, String)> {
    let split = split(content, typeconfig);
    if split.unterminated {
        warn!(
            "{}: front matter is never closed, the whole file is treated as header",
            path.display()
        );
    }
    let metadata = Metadata::from_yaml_str(&split.header, path)?;
    Ok((metadata, split.body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GendokuError;
    use pretty_assertions::assert_eq;

    fn dashes() -> TypeConfig {
        TypeConfig::new([".md"], "---", "---")
    }

    #[test]
    fn test_split_with_front_matter() {
        let content = "---\ntitle: Hello\ntags: [a, b]\n---\n# Heading\n\nText\n";
        let split = split(content, Some(&dashes()));
        assert_eq!(split.header, "title: Hello\ntags: [a, b]\n");
        assert_eq!(split.body, "# Heading\n\nText\n");
        assert!(!split.unterminated);
    }

    #[test]
    fn test_split_is_lossless() {
        let header = "a: 1\nb:\n  - x\n";
        let body = "line one\n---\nline three";
        let content = format!("---\n{header}---\n{body}");
        let split = split(&content, Some(&dashes()));
        assert_eq!(format!("---\n{}---\n{}", split.header, split.body), content);
    }

    #[test]
    fn test_no_type_config_keeps_whole_file() {
        let content = "---\ntitle: Hello\n---\nBody";
        let (metadata, body) = parse(content, None, Path::new("a.txt")).unwrap();
        assert!(metadata.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_no_opening_delimiter() {
        let content = "Just text\n---\nmore\n";
        let split = split(content, Some(&dashes()));
        assert_eq!(split.header, "");
        assert_eq!(split.body, content);
    }

    #[test]
    fn test_delimiters_are_trimmed() {
        let content = "---  \r\ntitle: x\r\n  ---\r\nbody\r\n";
        let split = split(content, Some(&dashes()));
        assert_eq!(split.header, "title: x\r\n");
        assert_eq!(split.body, "body\r\n");
    }

    #[test]
    fn test_distinct_open_and_close() {
        let toml_like = TypeConfig::new([".txt"], "+++", "+++");
        let content = "+++\nkey: v\n---\n+++\nbody";
        let split = split(content, Some(&toml_like));
        assert_eq!(split.header, "key: v\n---\n");
        assert_eq!(split.body, "body");
    }

    #[test]
    fn test_unterminated_header_swallows_file() {
        let content = "---\ntitle: Hello\nbody: text\n";
        let (metadata, body) = parse(content, Some(&dashes()), Path::new("x.md")).unwrap();
        assert_eq!(body, "");
        assert_eq!(metadata.get_str("body"), Some("text"));
    }

    #[test]
    fn test_empty_header() {
        let (metadata, body) = parse("---\n---\nBody\n", Some(&dashes()), Path::new("e.md")).unwrap();
        assert!(metadata.is_empty());
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_empty_file() {
        let (metadata, body) = parse("", Some(&dashes()), Path::new("e.md")).unwrap();
        assert!(metadata.is_empty());
        assert_eq!(body, "");
    }

    #[test]
    fn test_malformed_header_fails() {
        let content = "---\ntitle: \"unterminated\nauthor: { name\n---\nBody";
        let err = parse(content, Some(&dashes()), Path::new("bad.md")).unwrap_err();
        assert!(matches!(err, GendokuError::MetadataParse { .. }));
    }
}
