//! Markdown agent files.
//!
//! A microagent file has YAML front-matter followed by the guidance body:
//! ```text
//! ---
//! name: backend
//! triggers:
//!   - django
//!   - api
//! ---
//!
//! # Backend
//! ...
//! ```
//! `keywords` is accepted as an alias of `triggers`.

use crate::agent::domain::AgentSpec;
use serde::{Deserialize, Serialize};

const DELIMITER: &str = "---";

/// Error when parsing a markdown agent file.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("No YAML front-matter found (expected --- delimiters)")]
    NoFrontmatter,
    #[error("Invalid YAML front-matter: {0}")]
    InvalidYaml(String),
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Microagent '{0}' has no triggers; always-loaded repository microagents are not supported")]
    Untriggered(String),
}

#[derive(Debug, Deserialize)]
struct Frontmatter {
    name: Option<String>,
    #[serde(default, alias = "keywords")]
    triggers: Vec<String>,
    description: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Serialize)]
struct FrontmatterOut<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    triggers: &'a [String],
}

/// Split content into (front-matter, body).
fn extract_frontmatter(content: &str) -> Result<(&str, &str), ParseError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');
    let first = lines.next().ok_or(ParseError::NoFrontmatter)?;
    if first.trim_end() != DELIMITER {
        return Err(ParseError::NoFrontmatter);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let yaml = &content[yaml_start..offset];
            let body = &content[offset + line.len()..];
            return Ok((yaml, body));
        }
        offset += line.len();
    }
    Err(ParseError::NoFrontmatter)
}

/// Parse markdown agent content.
///
/// `fallback_name` (usually the file stem) is used when the front-matter has
/// no `name`. Leading blank lines of the body are dropped; the rest of the
/// body is kept verbatim as the payload.
pub fn parse_agent_markdown(
    content: &str,
    fallback_name: Option<&str>,
) -> Result<AgentSpec, ParseError> {
    let (yaml, body) = extract_frontmatter(content)?;

    if yaml.trim().is_empty() {
        return Err(ParseError::MissingField("triggers".into()));
    }
    let fm: Frontmatter =
        serde_yaml::from_str(yaml).map_err(|e| ParseError::InvalidYaml(e.to_string()))?;

    let name = fm
        .name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| fallback_name.map(String::from))
        .ok_or_else(|| ParseError::MissingField("name".into()))?;

    if fm.triggers.is_empty() {
        if fm.kind.as_deref().is_some_and(|k| k.eq_ignore_ascii_case("repo")) {
            return Err(ParseError::Untriggered(name));
        }
        return Err(ParseError::MissingField("triggers".into()));
    }

    let payload = body.trim_start_matches(['\r', '\n']).to_string();
    let mut spec = AgentSpec::new(name, fm.triggers, payload);
    spec.description = fm.description;
    Ok(spec)
}

/// Render a spec back into a markdown agent file.
pub fn render_agent_markdown(spec: &AgentSpec) -> Result<String, ParseError> {
    let front = FrontmatterOut {
        name: &spec.id,
        description: spec.description.as_deref(),
        triggers: &spec.triggers,
    };
    let yaml = serde_yaml::to_string(&front).map_err(|e| ParseError::InvalidYaml(e.to_string()))?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n\n{}", spec.payload))
}
