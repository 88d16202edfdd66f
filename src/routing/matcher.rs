//! Path pattern matching.
//!
//! # Responsibilities
//! - Match a request path against a route pattern
//! - Strip a matched wildcard prefix for forwarding
//!
//! # Design Decisions
//! - Patterns are literal except `*`, which matches any run of characters
//!   (empty, and across `/`)
//! - Matches are anchored at both ends: the whole path must match
//! - Path matching is case-sensitive
//! - No regex: patterns are compiled to literal segments at startup

/// A compiled route pattern such as `/api/*` or `/static/*.css`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    /// Literal pieces between `*`s. One piece means no wildcard.
    segments: Vec<String>,
}

impl PathPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        let raw = pattern.into();
        let segments = raw.split('*').map(str::to_string).collect();
        Self { raw, segments }
    }

    /// The pattern as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments.len() > 1
    }

    /// Returns true if the whole of `path` matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let (first, rest) = match self.segments.split_first() {
            Some(split) => split,
            None => return path.is_empty(),
        };
        let (last, middle) = match rest.split_last() {
            Some(split) => split,
            None => return path == first,
        };

        if path.len() < first.len() + last.len()
            || !path.starts_with(first.as_str())
            || !path.ends_with(last.as_str())
        {
            return false;
        }

        // Leftmost placement of each inner literal is optimal once both ends are pinned.
        let mut window = &path[first.len()..path.len() - last.len()];
        for literal in middle {
            match window.find(literal.as_str()) {
                Some(pos) => window = &window[pos + literal.len()..],
                None => return false,
            }
        }
        true
    }

    /// Remove this pattern's prefix from `path`.
    ///
    /// The prefix is the pattern with its first `/*` removed, so `/prefix/*`
    /// strips `/prefix`. Patterns without a wildcard leave the path alone. An
    /// empty result becomes `/`.
    pub fn strip_prefix(&self, path: &str) -> String {
        if !self.has_wildcard() {
            return path.to_string();
        }

        let prefix = self.raw.replacen("/*", "", 1);
        match path.strip_prefix(prefix.as_str()) {
            Some("") => "/".to_string(),
            Some(rest) => rest.to_string(),
            None => path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_suffix() {
        let pattern = PathPattern::new("/api/*");
        assert!(pattern.matches("/api/users"));
        assert!(pattern.matches("/api/"));
        assert!(pattern.matches("/api/v1/users/42"));
        assert!(!pattern.matches("/apiextra"));
        assert!(!pattern.matches("/api"));
        assert!(!pattern.matches("/v1/api/users"));
    }

    #[test]
    fn test_literal_is_exact() {
        let pattern = PathPattern::new("/api/v2");
        assert!(pattern.matches("/api/v2"));
        assert!(!pattern.matches("/api/v2/"));
        assert!(!pattern.matches("/api/v2/users"));
        assert!(!pattern.matches("/API/v2"));
    }

    #[test]
    fn test_inner_wildcards() {
        let pattern = PathPattern::new("/static/*.css");
        assert!(pattern.matches("/static/site.css"));
        assert!(pattern.matches("/static/a/b.css"));
        assert!(!pattern.matches("/static/site.js"));

        let pattern = PathPattern::new("/*/users/*");
        assert!(pattern.matches("/v1/users/7"));
        assert!(pattern.matches("//users/"));
        assert!(!pattern.matches("/v1/groups/7"));
    }

    #[test]
    fn test_ends_do_not_overlap() {
        let pattern = PathPattern::new("/a*a/");
        assert!(!pattern.matches("/a/"));
        assert!(pattern.matches("/aa/"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let pattern = PathPattern::new("/file.txt");
        assert!(pattern.matches("/file.txt"));
        assert!(!pattern.matches("/fileXtxt"));
    }

    #[test]
    fn test_catch_all() {
        let pattern = PathPattern::new("/*");
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/anything/at/all"));
        assert!(!pattern.matches(""));
    }

    #[test]
    fn test_strip_prefix() {
        let pattern = PathPattern::new("/prefix/*");
        assert_eq!(pattern.strip_prefix("/prefix/users"), "/users");
        assert_eq!(pattern.strip_prefix("/prefix"), "/");
        assert_eq!(pattern.strip_prefix("/prefix/"), "/");
        assert_eq!(pattern.strip_prefix("/other"), "/other");

        let literal = PathPattern::new("/api/v2");
        assert_eq!(literal.strip_prefix("/api/v2"), "/api/v2");

        let catch_all = PathPattern::new("/*");
        assert_eq!(catch_all.strip_prefix("/users"), "/users");
    }
}
