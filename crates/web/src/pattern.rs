//! Compiles route patterns into anchored regular expressions.
//!
//! A pattern is literal text with embedded placeholders:
//!
//! ```text
//! '<' name (':' regexp)? '>'
//! ```
//!
//! A placeholder without a regexp matches one or more characters other than
//! the separator (`/` for paths, `.` for hosts). A placeholder with an empty
//! name matches without capturing anything.

use regex::Regex;

use crate::RouteError;

const PLACEHOLDER: &str = r"<([A-Za-z0-9_]*)(:[^>]*)?>";

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    names: Vec<String>,
}

impl Pattern {
    /// Compiles `pattern`.
    ///
    /// With `add_slash`, the trailing separator of the pattern becomes
    /// optional, so the caller can tell a path that lacks it apart from one
    /// that carries it.
    pub fn compile(pattern: &str, add_slash: bool, separator: char) -> Result<Self, RouteError> {
        let placeholder = Regex::new(PLACEHOLDER).map_err(|e| RouteError::invalid_regex(PLACEHOLDER, e))?;
        let default_expr = format!("[^{}]+", regex::escape(separator.encode_utf8(&mut [0; 4])));

        let mut expr = String::with_capacity(pattern.len() * 2);
        let mut names = Vec::new();
        let mut last = 0;

        expr.push('^');
        for caps in placeholder.captures_iter(pattern) {
            let Some(whole) = caps.get(0) else { continue };
            expr.push_str(&regex::escape(&pattern[last..whole.start()]));

            let name = caps.get(1).map_or("", |m| m.as_str());
            let sub = caps.get(2).map_or(default_expr.as_str(), |m| &m.as_str()[1..]);

            if name.is_empty() {
                expr.push_str(&format!("(?:{sub})"));
            } else {
                expr.push_str(&format!("(?P<{}>{sub})", group_name(names.len())));
                names.push(name.to_string());
            }
            last = whole.end();
        }
        expr.push_str(&regex::escape(&pattern[last..]));
        if add_slash {
            expr.push('?');
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| RouteError::invalid_regex(pattern, e))?;
        Ok(Self { source: pattern.to_string(), regex, names })
    }

    /// The pattern as registered.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Declared parameter names, in order of appearance.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Matches `text`, returning one raw value per declared name.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Vec<&'t str>> {
        let caps = self.regex.captures(text)?;
        let values = (0..self.names.len())
            .map(|i| caps.name(&group_name(i)).map_or("", |m| m.as_str()))
            .collect();
        Some(values)
    }
}

fn group_name(index: usize) -> String {
    format!("__p{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_text_is_escaped() {
        let pattern = Pattern::compile("/a.b/c+d", false, '/').unwrap();
        assert!(pattern.is_match("/a.b/c+d"));
        assert!(!pattern.is_match("/aXb/c+d"));
        assert!(!pattern.is_match("/a.b/ccd"));
        assert!(pattern.names().is_empty());
    }

    #[test]
    fn default_placeholder_stops_at_separator() {
        let pattern = Pattern::compile("/user/<id>", false, '/').unwrap();
        assert_eq!(pattern.names(), ["id"]);
        assert_eq!(pattern.captures("/user/42"), Some(vec!["42"]));
        assert_eq!(pattern.captures("/user/42/edit"), None);
        assert_eq!(pattern.captures("/user/"), None);
    }

    #[test]
    fn host_separator() {
        let pattern = Pattern::compile("<sub>.example.com", false, '.').unwrap();
        assert_eq!(pattern.captures("api.example.com"), Some(vec!["api"]));
        assert_eq!(pattern.captures("a.b.example.com"), None);
        assert_eq!(pattern.captures("api.exampleXcom"), None);
    }

    #[test]
    fn explicit_subexpression() {
        let pattern = Pattern::compile("/user/<id:[0-9]+>", false, '/').unwrap();
        assert_eq!(pattern.captures("/user/42"), Some(vec!["42"]));
        assert_eq!(pattern.captures("/user/abc"), None);

        let pattern = Pattern::compile("/static/<path:.*>", false, '/').unwrap();
        assert_eq!(pattern.captures("/static/css/site.css"), Some(vec!["css/site.css"]));
    }

    #[test]
    fn unnamed_placeholder_does_not_capture() {
        let pattern = Pattern::compile("/<>/<name>/<:(x|y)>", false, '/').unwrap();
        assert_eq!(pattern.names(), ["name"]);
        assert_eq!(pattern.captures("/any/bob/y"), Some(vec!["bob"]));
        assert_eq!(pattern.captures("/any/bob/z"), None);
    }

    #[test]
    fn groups_inside_subexpressions_keep_parameter_order() {
        let pattern = Pattern::compile("/<kind:(a|b)c>/<id>", false, '/').unwrap();
        assert_eq!(pattern.captures("/bc/7"), Some(vec!["bc", "7"]));
    }

    #[test]
    fn alternation_stays_anchored() {
        let pattern = Pattern::compile("/x/<v:a|b>", false, '/').unwrap();
        assert!(pattern.is_match("/x/a"));
        assert!(pattern.is_match("/x/b"));
        assert!(!pattern.is_match("b"));
    }

    #[test]
    fn add_slash_makes_trailing_separator_optional() {
        let pattern = Pattern::compile("/files/", true, '/').unwrap();
        assert!(pattern.is_match("/files/"));
        assert!(pattern.is_match("/files"));
        assert!(!pattern.is_match("/files/x"));

        let pattern = Pattern::compile("/files/", false, '/').unwrap();
        assert!(!pattern.is_match("/files"));
    }

    #[test]
    fn invalid_subexpression() {
        let err = Pattern::compile("/user/<id:[0-9>", false, '/').unwrap_err();
        assert!(matches!(err, RouteError::InvalidRegex { .. }));
    }
}
