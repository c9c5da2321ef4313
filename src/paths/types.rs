//! Normalized path-scope types produced from policy rows.

/// The literal value that stands for "every file".
pub const WILDCARD: &str = "*";

/// A single scope pattern with its negation prefix already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    /// Glob text without the leading `!`.
    pub pattern: String,
    /// `true` when the source pattern started with `!` (exclusion).
    pub negated: bool,
}

impl PathPattern {
    /// Split a raw policy pattern into its glob text and negation flag.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('!') {
            Some(rest) => Self {
                pattern: rest.to_string(),
                negated: true,
            },
            None => Self {
                pattern: raw.to_string(),
                negated: false,
            },
        }
    }

    /// The pattern as written in the policy file.
    pub fn as_written(&self) -> String {
        if self.negated {
            format!("!{}", self.pattern)
        } else {
            self.pattern.clone()
        }
    }

    fn is_wildcard(&self) -> bool {
        !self.negated && self.pattern == WILDCARD
    }
}

/// The file-path scope of a control.
///
/// Normalized once when the control is built, so matching never has to
/// re-interpret the string/list shape of the policy file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PathSpec {
    /// Every changed file is in scope.
    #[default]
    AllFiles,
    /// Inclusion and exclusion patterns, in policy-file order.
    Patterns(Vec<PathPattern>),
}

impl PathSpec {
    /// Build a spec from raw policy patterns.
    ///
    /// A list made only of bare `*` entries collapses to [`PathSpec::AllFiles`].
    pub fn from_patterns<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<PathPattern> = raw
            .into_iter()
            .map(|p| PathPattern::parse(p.as_ref()))
            .collect();
        if !patterns.is_empty() && patterns.iter().all(PathPattern::is_wildcard) {
            PathSpec::AllFiles
        } else {
            PathSpec::Patterns(patterns)
        }
    }

    /// Inclusion patterns (no `!` prefix).
    pub fn inclusions(&self) -> impl Iterator<Item = &PathPattern> {
        self.patterns().iter().filter(|p| !p.negated)
    }

    /// Exclusion patterns, prefix stripped.
    pub fn exclusions(&self) -> impl Iterator<Item = &PathPattern> {
        self.patterns().iter().filter(|p| p.negated)
    }

    fn patterns(&self) -> &[PathPattern] {
        match self {
            PathSpec::AllFiles => &[],
            PathSpec::Patterns(p) => p.as_slice(),
        }
    }
}
