//! Glob matching of changed files against a control's path scope.
//!
//! Paths are compared without their leading `/`. `*` crosses directory
//! separators. A pattern ending in `/` matches any path that has a run of
//! directory segments matching it, at the root or nested. A pattern without
//! `/` also matches against the file's base name. A pattern starting with `/`
//! is anchored at the repository root: it never matches by base name, and as
//! a directory pattern it only matches leading directories.
//!
//! Inclusion and exclusion are independent set memberships: a file is
//! covered when some inclusion pattern matches and no exclusion pattern
//! does, whatever order the patterns were written in.

use glob::{MatchOptions, Pattern};

use super::types::{PathPattern, PathSpec};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// How a compiled pattern is applied to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// Trailing `/`: matches directory segments.
    Directory,
    /// Contains `/` or starts with one: matches the whole relative path.
    Path,
    /// No `/`: matches the whole relative path or the base name.
    Name,
}

#[derive(Debug)]
struct CompiledPattern {
    raw: String,
    /// `None` when the glob failed to compile; such a pattern never matches.
    glob: Option<Pattern>,
    anchor: Anchor,
    /// Written with a leading `/`.
    rooted: bool,
}

impl CompiledPattern {
    fn compile(pattern: &PathPattern) -> Self {
        let rooted = pattern.pattern.starts_with('/');
        let trimmed = pattern.pattern.trim_start_matches('/');
        let (body, anchor) = match trimmed.strip_suffix('/') {
            Some(dir) => (dir, Anchor::Directory),
            None if rooted || trimmed.contains('/') => (trimmed, Anchor::Path),
            None => (trimmed, Anchor::Name),
        };
        let glob = match Pattern::new(body) {
            Ok(g) => Some(g),
            Err(e) => {
                log::warn!(
                    "ignoring unparsable path pattern {:?}: {e}",
                    pattern.as_written()
                );
                None
            }
        };
        Self {
            raw: pattern.as_written(),
            glob,
            anchor,
            rooted,
        }
    }

    fn matches(&self, path: &str) -> bool {
        let Some(ref glob) = self.glob else {
            return false;
        };
        let relative = path.trim_start_matches('/');
        match self.anchor {
            Anchor::Path => glob.matches_with(relative, MATCH_OPTIONS),
            Anchor::Name => {
                glob.matches_with(relative, MATCH_OPTIONS)
                    || relative
                        .rsplit('/')
                        .next()
                        .is_some_and(|name| glob.matches_with(name, MATCH_OPTIONS))
            }
            Anchor::Directory => {
                let segments: Vec<&str> = relative.split('/').collect();
                // The last segment is the file name, never a directory.
                let dirs = &segments[..segments.len().saturating_sub(1)];
                let starts = if self.rooted { dirs.len().min(1) } else { dirs.len() };
                (0..starts).any(|start| {
                    (start + 1..=dirs.len()).any(|end| {
                        glob.matches_with(&dirs[start..end].join("/"), MATCH_OPTIONS)
                    })
                })
            }
        }
    }
}

/// A path scope compiled once and reused across every changed file.
#[derive(Debug)]
pub struct PathMatcher {
    all_files: bool,
    include: Vec<CompiledPattern>,
    exclude: Vec<CompiledPattern>,
}

impl PathMatcher {
    pub fn new(spec: &PathSpec) -> Self {
        Self {
            all_files: matches!(spec, PathSpec::AllFiles),
            include: spec.inclusions().map(CompiledPattern::compile).collect(),
            exclude: spec.exclusions().map(CompiledPattern::compile).collect(),
        }
    }

    /// Whether a single path is in scope.
    pub fn covers(&self, path: &str) -> bool {
        if self.all_files {
            return true;
        }
        let Some(included_by) = self.include.iter().find(|p| p.matches(path)) else {
            log::debug!("{path}: no inclusion pattern matches");
            return false;
        };
        if let Some(excluded_by) = self.exclude.iter().find(|p| p.matches(path)) {
            log::debug!("{path}: excluded by {}", excluded_by.raw);
            return false;
        }
        log::debug!("{path}: included by {}", included_by.raw);
        true
    }

    /// Whether any of the changed files is in scope.
    ///
    /// No changed files means the control is inactive.
    pub fn any_covered<S: AsRef<str>>(&self, changed_files: &[S]) -> bool {
        changed_files.iter().any(|f| self.covers(f.as_ref()))
    }
}

/// Decide whether a control with the given scope applies to the changed files.
pub fn is_active<S: AsRef<str>>(spec: &PathSpec, changed_files: &[S]) -> bool {
    PathMatcher::new(spec).any_covered(changed_files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(patterns: &[&str], files: &[&str]) -> bool {
        is_active(&PathSpec::from_patterns(patterns), files)
    }

    #[test]
    fn all_files_needs_at_least_one_file() {
        let none: [&str; 0] = [];
        assert!(is_active(&PathSpec::AllFiles, &["/lib/mission_control.rb"]));
        assert!(!is_active(&PathSpec::AllFiles, &none));
    }

    #[test]
    fn excluded_file_is_not_covered() {
        assert!(active(&["*", "!README.md"], &["/lib/mission_control.rb"]));
        assert!(!active(&["*", "!README.md"], &["/README.md"]));
    }

    #[test]
    fn excluded_directory_at_root() {
        assert!(!active(&["*", "!specs/"], &["/specs/mission_control_spec.rb"]));
        assert!(active(&["*", "!specs/"], &["/lib/mission_control.rb"]));
    }

    #[test]
    fn excluded_directory_nested() {
        assert!(!active(&["*", "!specs/"], &["/app/specs/models/control_spec.rb"]));
    }

    #[test]
    fn directory_pattern_does_not_match_file_name() {
        assert!(active(&["*", "!specs/"], &["/lib/specs"]));
    }

    #[test]
    fn pattern_order_does_not_matter() {
        assert!(!active(&["!specs/", "*"], &["/specs/a.rb"]));
        assert!(!active(&["!README.md", "*"], &["/README.md"]));
    }

    #[test]
    fn one_covered_file_is_enough() {
        assert!(active(&["*", "!README.md"], &["/README.md", "/src/main.rs"]));
    }

    #[test]
    fn name_pattern_matches_nested_base_name() {
        assert!(!active(&["*", "!README.md"], &["/docs/README.md"]));
    }

    #[test]
    fn slash_pattern_is_anchored_to_root() {
        assert!(active(&["lib/*"], &["/lib/models/control.rb"]));
        assert!(!active(&["lib/*"], &["/app/lib/control.rb"]));
    }

    #[test]
    fn leading_slash_anchors_file_at_root() {
        assert!(!active(&["*", "!/README.md"], &["/README.md"]));
        assert!(active(&["*", "!/README.md"], &["/docs/README.md"]));
    }

    #[test]
    fn leading_slash_anchors_directory_at_root() {
        assert!(!active(&["*", "!/specs/"], &["/specs/a_spec.rb"]));
        assert!(active(&["*", "!/specs/"], &["/app/specs/a_spec.rb"]));
        assert!(active(&["/app/"], &["/app/models/control.rb"]));
        assert!(!active(&["/app/"], &["/lib/app/control.rb"]));
    }

    #[test]
    fn extension_glob() {
        assert!(active(&["*.rb"], &["/lib/models/control.rb"]));
        assert!(!active(&["*.rb"], &["/package.json"]));
    }

    #[test]
    fn only_exclusions_cover_nothing() {
        assert!(!active(&["!docs/"], &["/src/main.rs"]));
    }

    #[test]
    fn unparsable_pattern_never_matches() {
        assert!(!active(&["[unclosed"], &["/[unclosed"]));
        // A broken exclusion does not exclude anything.
        assert!(active(&["*", "![unclosed"], &["/src/main.rs"]));
    }

    #[test]
    fn duplicate_files_are_harmless() {
        assert!(!active(&["*", "!README.md"], &["/README.md", "/README.md"]));
    }
}
