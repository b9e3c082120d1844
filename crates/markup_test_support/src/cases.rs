//! Before/after case files.
//!
//! ```toml
//! [[case]]
//! name = "retitle"
//! identity = ["id"]
//! before = "<a id='1'>x</a>"
//! after = "<a id='1'>y</a>"
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiffCase {
    pub name: String,
    pub before: String,
    pub after: String,
    /// Identity attributes for the match policy; empty matches elements by name only.
    #[serde(default)]
    pub identity: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CaseFile {
    #[serde(default)]
    case: Vec<DiffCase>,
}

pub fn parse_cases(content: &str) -> Result<Vec<DiffCase>, String> {
    let file: CaseFile = toml::from_str(content).map_err(|err| err.to_string())?;
    let mut seen = std::collections::HashSet::new();
    for case in &file.case {
        if !seen.insert(case.name.as_str()) {
            return Err(format!("duplicate case name `{}`", case.name));
        }
    }
    Ok(file.case)
}

/// Loads a case file, panicking with the path on any error.
pub fn load_cases(path: &Path) -> Vec<DiffCase> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read case file {path:?}: {err}"));
    let cases =
        parse_cases(&content).unwrap_or_else(|err| panic!("invalid case file {path:?}: {err}"));
    assert!(!cases.is_empty(), "case file {path:?} has no cases");
    cases
}
