//! Template variable substitution
//!
//! Documents reference variables as `#name#`, where `name` is made of ASCII
//! letters, digits and underscores. Known names are replaced by their value
//! verbatim; unknown placeholders are left as written.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

static PLACEHOLDER: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn placeholder() -> Result<&'static Regex, TemplateError> {
    PLACEHOLDER
        .get_or_init(|| Regex::new(r"#([A-Za-z0-9_]+)#"))
        .as_ref()
        .map_err(|e| TemplateError::Pattern(e.clone()))
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("placeholder pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

/// Text transform that substitutes template variables
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    variables: BTreeMap<String, String>,
}

impl TemplateFilter {
    pub const fn new(variables: BTreeMap<String, String>) -> Self {
        Self { variables }
    }

    /// Filter with a single variable
    pub fn with_variable(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(BTreeMap::from([(name.into(), value.into())]))
    }

    /// Substitute every known `#name#` placeholder in `text`
    pub fn apply(&self, text: &str) -> Result<String, TemplateError> {
        Ok(placeholder()?
            .replace_all(text, |caps: &Captures<'_>| {
                self.variables
                    .get(&caps[1])
                    .map_or_else(|| caps[0].to_string(), Clone::clone)
            })
            .into_owned())
    }

    /// Substitute placeholders in a raw document
    pub fn apply_bytes(&self, document: &[u8]) -> Result<String, TemplateError> {
        self.apply(std::str::from_utf8(document)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_known_variable() {
        let filter = TemplateFilter::with_variable("js_callbacks", "cb123");
        let rendered = filter.apply("<script>var cbs = '#js_callbacks#';</script>").unwrap();
        assert_eq!(rendered, "<script>var cbs = 'cb123';</script>");
    }

    #[test]
    fn test_unknown_placeholder_untouched() {
        let filter = TemplateFilter::with_variable("js_callbacks", "cb123");
        assert_eq!(filter.apply("#other# and #js_callbacks#").unwrap(), "#other# and cb123");
    }

    #[test]
    fn test_text_without_placeholders_unchanged() {
        let filter = TemplateFilter::with_variable("js_callbacks", "cb123");
        let text = "color: #fff; a # b #not a name!#";
        assert_eq!(filter.apply(text).unwrap(), text);
    }

    #[test]
    fn test_every_occurrence_replaced() {
        let filter = TemplateFilter::with_variable("x", "1");
        assert_eq!(filter.apply("#x#-#x#-#x#").unwrap(), "1-1-1");
    }

    #[test]
    fn test_value_inserted_verbatim() {
        let filter = TemplateFilter::with_variable("js_callbacks", "$1 #x# \\n");
        assert_eq!(filter.apply("[#js_callbacks#]").unwrap(), "[$1 #x# \\n]");
    }

    #[test]
    fn test_placeholder_pattern_compiles() {
        let re = placeholder().unwrap();
        assert!(re.is_match("#js_callbacks#"));
        assert!(!re.is_match("# spaced #"));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let filter = TemplateFilter::default();
        assert!(matches!(
            filter.apply_bytes(&[0x3c, 0xff, 0xfe]),
            Err(TemplateError::InvalidUtf8(_))
        ));
        assert_eq!(filter.apply_bytes(b"plain").unwrap(), "plain");
    }
}
