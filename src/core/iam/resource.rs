//! Hierarchical resource matching
//!
//! Resources are dot-delimited (`master.siswa`); a colon is also accepted as a
//! segment delimiter (`jurnal:guru`). A rule on a resource covers the resource
//! itself and every descendant:
//! - `*` - Matches any resource
//! - `master` - Matches `master`, `master.siswa`, `master:export`
//! - `master` does NOT match `masterdata` (a delimiter is required)

use super::rule::WILDCARD;

/// Segment delimiters accepted between resource levels
pub const DELIMITERS: [char; 2] = ['.', ':'];

/// Matcher for hierarchical resource identifiers
pub struct ResourceMatcher;

impl ResourceMatcher {
    /// Check if a rule resource covers a requested resource
    ///
    /// # Examples
    /// ```
    /// use school_rbac::core::iam::ResourceMatcher;
    ///
    /// assert!(ResourceMatcher::matches("master", "master.siswa"));
    /// assert!(ResourceMatcher::matches("*", "anything.at.all"));
    /// assert!(!ResourceMatcher::matches("master", "masterdata"));
    /// ```
    pub fn matches(rule: &str, resource: &str) -> bool {
        if resource.is_empty() || rule.is_empty() {
            return false;
        }

        if rule == WILDCARD || rule == resource {
            return true;
        }

        // Descendant: resource = rule + delimiter + rest
        match resource.strip_prefix(rule) {
            Some(rest) => rest.starts_with(&DELIMITERS[..]),
            None => false,
        }
    }
}

/// A resource identifier parsed into its segments
///
/// Used where comparisons have to be made level by level rather than on the
/// raw string, e.g. to rank how specific a matching rule is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath<'a> {
    segments: Vec<&'a str>,
}

impl<'a> ResourcePath<'a> {
    /// Split a resource on `.` and `:`. The wildcard parses to zero segments.
    pub fn parse(resource: &'a str) -> Self {
        if resource == WILDCARD {
            return ResourcePath {
                segments: Vec::new(),
            };
        }
        ResourcePath {
            segments: resource.split(&DELIMITERS[..]).collect(),
        }
    }

    /// Segments of this path
    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    /// Number of levels; `*` has depth 0
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// True for the wildcard resource
    pub fn is_wildcard(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment-wise ancestor-or-self check
    pub fn covers(&self, other: &ResourcePath<'_>) -> bool {
        let blank = |p: &ResourcePath<'_>| p.segments.iter().any(|s| s.is_empty());
        if blank(self) || blank(other) {
            return false;
        }
        if self.is_wildcard() {
            return true;
        }
        self.segments.len() <= other.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(ResourceMatcher::matches("jurnal", "jurnal"));
        assert!(!ResourceMatcher::matches("jurnal", "absensi"));
    }

    #[test]
    fn test_wildcard() {
        assert!(ResourceMatcher::matches("*", "jurnal"));
        assert!(ResourceMatcher::matches("*", "anything.at.all"));
        assert!(ResourceMatcher::matches("*", "*"));
    }

    #[test]
    fn test_descendants() {
        assert!(ResourceMatcher::matches("master", "master.siswa"));
        assert!(ResourceMatcher::matches("master", "master.siswa.detail"));
        assert!(ResourceMatcher::matches("master.siswa", "master.siswa.detail"));
        assert!(ResourceMatcher::matches("jurnal", "jurnal:guru"));
    }

    #[test]
    fn test_false_prefix() {
        assert!(!ResourceMatcher::matches("master", "masterdata"));
        assert!(!ResourceMatcher::matches("master", "master_data"));
        assert!(!ResourceMatcher::matches("master.siswa", "master.siswa_lama"));
    }

    #[test]
    fn test_ancestor_not_covered() {
        assert!(!ResourceMatcher::matches("master.siswa", "master"));
        assert!(!ResourceMatcher::matches("master.siswa", "master.guru"));
    }

    #[test]
    fn test_empty_never_matches() {
        assert!(!ResourceMatcher::matches("", ""));
        assert!(!ResourceMatcher::matches("", "master"));
        assert!(!ResourceMatcher::matches("*", ""));
        assert!(!ResourceMatcher::matches("master", ""));
    }

    #[test]
    fn test_literal_star_in_request_not_special() {
        // only the rule side treats `*` as a wildcard
        assert!(!ResourceMatcher::matches("master", "*"));
    }

    #[test]
    fn test_resource_path_segments() {
        let path = ResourcePath::parse("pengaturan_data.wali_kelas");
        assert_eq!(path.segments(), &["pengaturan_data", "wali_kelas"]);
        assert_eq!(path.depth(), 2);

        let mixed = ResourcePath::parse("jurnal:guru.detail");
        assert_eq!(mixed.segments(), &["jurnal", "guru", "detail"]);

        assert!(ResourcePath::parse("*").is_wildcard());
        assert_eq!(ResourcePath::parse("*").depth(), 0);
    }

    #[test]
    fn test_resource_path_covers() {
        let master = ResourcePath::parse("master");
        let siswa = ResourcePath::parse("master.siswa");
        let masterdata = ResourcePath::parse("masterdata");

        assert!(master.covers(&siswa));
        assert!(master.covers(&master));
        assert!(!siswa.covers(&master));
        assert!(!master.covers(&masterdata));
        assert!(ResourcePath::parse("*").covers(&masterdata));
    }

    #[test]
    fn test_matchers_agree() {
        let cases = [
            ("master", "master.siswa"),
            ("master", "masterdata"),
            ("master.siswa", "master"),
            ("jurnal", "jurnal:guru"),
            ("nilai", "nilai"),
            ("*", "absensi.rekap"),
        ];
        for (rule, resource) in cases {
            assert_eq!(
                ResourceMatcher::matches(rule, resource),
                ResourcePath::parse(rule).covers(&ResourcePath::parse(resource)),
                "matchers disagree on {} vs {}",
                rule,
                resource
            );
        }
    }
}
