//! Policy file decoding.
//!
//! The policy file is a YAML mapping of control name to an optional body:
//!
//! ```yaml
//! Code Review:
//!   users: [cboyle, jperalta]
//!   paths: '*'
//!   count: 2
//! QA Review:
//!   paths: ['*', '!specs/']
//! ```
//!
//! `users` and `paths` accept a string or a list of strings and default to
//! the wildcard; `count` defaults to 1. Keys other than these are ignored.

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::eval::UserSpec;
use crate::paths::PathSpec;

/// Default location of the policy file in the repository.
pub const DEFAULT_POLICY_PATH: &str = ".mission-control.yml";

/// Approvals required when a control does not say.
pub const DEFAULT_COUNT: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawControl {
    users: Option<OneOrMany>,
    paths: Option<OneOrMany>,
    count: Option<u32>,
}

/// One validated row of the policy file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlConfig {
    pub name: String,
    pub users: UserSpec,
    pub paths: PathSpec,
    pub count: u32,
}

impl ControlConfig {
    fn from_raw(name: String, raw: RawControl) -> Self {
        Self {
            name,
            users: raw
                .users
                .map(|u| UserSpec::from_users(u.into_vec()))
                .unwrap_or_default(),
            paths: raw
                .paths
                .map(|p| PathSpec::from_patterns(p.into_vec()))
                .unwrap_or_default(),
            count: raw.count.unwrap_or(DEFAULT_COUNT),
        }
    }
}

/// Decode policy file contents into controls, preserving file order.
pub fn parse(contents: &[u8]) -> Result<Vec<ControlConfig>> {
    let text = std::str::from_utf8(contents)
        .map_err(|e| Error::ConfigMalformed(format!("not valid UTF-8: {e}")))?;
    // A file with no YAML document at all (blank or only comments) has no controls.
    let Some(document) = serde_yaml::Deserializer::from_str(text).next() else {
        return Ok(Vec::new());
    };
    let doc = Value::deserialize(document).map_err(|e| Error::ConfigMalformed(e.to_string()))?;

    let mapping = match doc {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(m) => m,
        other => {
            return Err(Error::ConfigMalformed(format!(
                "expected a mapping of control names, found {}",
                kind(&other)
            )));
        }
    };

    let mut controls = Vec::with_capacity(mapping.len());
    for (key, body) in mapping {
        let name = match key {
            Value::String(name) => name,
            other => {
                return Err(Error::ConfigMalformed(format!(
                    "control names must be strings, found {}",
                    kind(&other)
                )));
            }
        };
        let raw = match body {
            Value::Null => RawControl::default(),
            body => serde_yaml::from_value(body)
                .map_err(|e| Error::ConfigMalformed(format!("control {name:?}: {e}")))?,
        };
        controls.push(ControlConfig::from_raw(name, raw));
    }
    Ok(controls)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::PathPattern;

    #[test]
    fn defaults_apply_to_empty_body() {
        let controls = parse(b"Code Review:\n").unwrap();
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].name, "Code Review");
        assert_eq!(controls[0].users, UserSpec::AllUsers);
        assert_eq!(controls[0].paths, PathSpec::AllFiles);
        assert_eq!(controls[0].count, 1);
    }

    #[test]
    fn single_strings_and_lists() {
        let yaml = r#"
Code Review:
  users: aterris
  paths: ['*', '!README.md']
  count: 0
"#;
        let c = &parse(yaml.as_bytes()).unwrap()[0];
        assert_eq!(c.users, UserSpec::Listed(vec!["aterris".into()]));
        assert_eq!(
            c.paths,
            PathSpec::Patterns(vec![
                PathPattern::parse("*"),
                PathPattern::parse("!README.md"),
            ])
        );
        assert_eq!(c.count, 0);
    }

    #[test]
    fn file_order_is_preserved() {
        let yaml = "Zeta: {}\nAlpha: {}\nMid: {}\n";
        let names: Vec<String> = parse(yaml.as_bytes())
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let controls = parse(b"QA:\n  count: 2\n  channel: qa\n").unwrap();
        assert_eq!(controls[0].count, 2);
    }

    #[test]
    fn empty_document_has_no_controls() {
        assert!(parse(b"").unwrap().is_empty());
        assert!(parse(b"# nothing yet\n").unwrap().is_empty());
        assert!(parse(b"---\n...\n").unwrap().is_empty());
        assert!(parse(b"---\n~\n").unwrap().is_empty());
    }

    #[test]
    fn malformed_shapes_are_rejected() {
        for yaml in [
            "- a\n- b\n",
            "QA:\n  count: two\n",
            "QA:\n  count: -1\n",
            "QA:\n  users: {a: b}\n",
            "QA: true\n",
            "1: {}\n",
            "QA: {count: [\n",
        ] {
            let err = parse(yaml.as_bytes()).unwrap_err();
            assert!(matches!(err, Error::ConfigMalformed(_)), "yaml: {yaml}");
        }
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        assert!(matches!(
            parse(&[0xff, 0xfe]).unwrap_err(),
            Error::ConfigMalformed(_)
        ));
    }
}
