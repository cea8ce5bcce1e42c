//! Directory-backed agent source: `*.md` front-matter files and `*.toml`
//! agent files, scanned recursively in path order.
//!
//! A TOML agent may keep its guidance in a separate file via `payload_path`.
//! Files referenced that way belong to their TOML agent and are not scanned
//! as agents themselves.

use super::contract::{AgentOrigin, AgentSource, LoadedAgent};
use super::markdown::{parse_agent_markdown, ParseError};
use crate::agent::domain::{validate_agent_spec, AgentSpec};
use crate::error::{MicroagentError, Result};
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// TOML agent file shape.
#[derive(Debug, Deserialize)]
struct TomlAgentFile {
    id: Option<String>,
    #[serde(default, alias = "keywords")]
    triggers: Vec<String>,
    payload: Option<String>,
    payload_path: Option<String>,
    description: Option<String>,
}

/// Payload file content as of its last read.
#[derive(Debug)]
struct CachedPayload {
    modified: SystemTime,
    content: String,
}

pub struct DirectorySource {
    label: String,
    root: PathBuf,
    /// Keyed by canonical path; holds only the payloads of the latest scan.
    payloads: Mutex<HashMap<PathBuf, CachedPayload>>,
}

impl DirectorySource {
    pub fn new(label: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            root: root.into(),
            payloads: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn agent_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                MicroagentError::source_error(&self.root, format!("Failed to scan directory: {}", e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_readme = path
                .file_stem()
                .and_then(OsStr::to_str)
                .is_some_and(|stem| stem.eq_ignore_ascii_case("readme"));
            if is_readme {
                continue;
            }
            match path.extension().and_then(OsStr::to_str) {
                Some("md") | Some("toml") => files.push(path.to_path_buf()),
                _ => {}
            }
        }
        Ok(files)
    }

    fn load_markdown(&self, path: &Path) -> Result<AgentSpec> {
        let content = read_agent_file(path)?;
        let stem = path.file_stem().and_then(OsStr::to_str);
        let spec = parse_agent_markdown(&content, stem).map_err(|e| match e {
            ParseError::Untriggered(name) => MicroagentError::InvalidAgent(format!(
                "'{}' in {} has no triggers",
                name,
                path.display()
            )),
            other => MicroagentError::source_error(path, other.to_string()),
        })?;
        finish_spec(path, spec)
    }

    /// Parse a TOML agent, recording its canonical payload file in `payload_files`.
    fn load_toml(&self, path: &Path, payload_files: &mut HashSet<PathBuf>) -> Result<AgentSpec> {
        let content = read_agent_file(path)?;
        let file: TomlAgentFile = toml::from_str(&content)
            .map_err(|e| MicroagentError::source_error(path, format!("Invalid TOML: {}", e)))?;

        let id = file
            .id
            .or_else(|| path.file_stem().and_then(OsStr::to_str).map(String::from))
            .ok_or_else(|| MicroagentError::source_error(path, "Missing required field: id"))?;

        let payload = match (file.payload, file.payload_path) {
            (Some(_), Some(_)) => {
                return Err(MicroagentError::source_error(
                    path,
                    "payload and payload_path are mutually exclusive",
                ))
            }
            (Some(inline), None) => inline,
            (None, Some(payload_path)) => {
                let resolved = resolve_payload_path(&payload_path, path)?;
                payload_files.insert(resolved.clone());
                self.read_payload(&resolved)?
            }
            (None, None) => String::new(),
        };

        let mut spec = AgentSpec::new(id, file.triggers, payload);
        spec.description = file.description;
        finish_spec(path, spec)
    }

    /// Read a payload file, reusing the cached copy while its mtime is unchanged.
    fn read_payload(&self, path: &Path) -> Result<String> {
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| {
                MicroagentError::source_error(path, format!("Failed to read payload file: {}", e))
            })?;

        let mut payloads = self.payloads.lock();
        if let Some(cached) = payloads.get(path).filter(|c| c.modified == modified) {
            return Ok(cached.content.clone());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            MicroagentError::source_error(path, format!("Failed to read payload file: {}", e))
        })?;
        if content.trim().is_empty() {
            return Err(MicroagentError::source_error(path, "Payload file is empty"));
        }
        payloads.insert(
            path.to_path_buf(),
            CachedPayload {
                modified,
                content: content.clone(),
            },
        );
        Ok(content)
    }
}

fn read_agent_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        MicroagentError::source_error(path, format!("Failed to read agent file: {}", e))
    })
}

fn finish_spec(path: &Path, spec: AgentSpec) -> Result<AgentSpec> {
    validate_agent_spec(&spec)?;
    if let Some(stem) = path.file_stem().and_then(OsStr::to_str) {
        if spec.id != stem {
            tracing::debug!(
                "Agent id differs from filename in {}: filename={}, id={}",
                path.display(),
                stem,
                spec.id
            );
        }
    }
    Ok(spec)
}

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(OsStr::to_str) == Some("toml")
}

/// Canonical form used to compare payload references with scanned files.
fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Resolve `payload_path` of the TOML agent at `agent_file`.
///
/// Absolute paths are used as-is, `~/` expands to the home directory, and
/// anything else (including `./`) is relative to the agent file's directory.
fn resolve_payload_path(raw: &str, agent_file: &Path) -> Result<PathBuf> {
    let resolved = if Path::new(raw).is_absolute() {
        PathBuf::from(raw)
    } else if let Some(rest) = raw.strip_prefix("~/") {
        let base_dirs = directories::BaseDirs::new().ok_or_else(|| {
            MicroagentError::source_error(agent_file, "Cannot expand ~: no home directory")
        })?;
        base_dirs.home_dir().join(rest)
    } else {
        agent_file
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(raw)
    };
    Ok(canonical(&resolved))
}

impl AgentSource for DirectorySource {
    fn name(&self) -> &str {
        &self.label
    }

    fn entries(&self) -> Result<Vec<Result<LoadedAgent>>> {
        if !self.root.exists() {
            tracing::debug!(source = %self.label, "Agent directory {} does not exist", self.root.display());
            self.payloads.lock().clear();
            return Ok(Vec::new());
        }

        let files = self.agent_files()?;
        tracing::debug!(source = %self.label, files = files.len(), "Scanned agent directory");

        // TOML agents first, so their payload files are known before markdown is parsed.
        let mut toml_agents: HashMap<PathBuf, Result<AgentSpec>> = HashMap::new();
        let mut payload_files: HashSet<PathBuf> = HashSet::new();
        for path in files.iter().filter(|p| is_toml(p)) {
            let loaded = self.load_toml(path, &mut payload_files);
            toml_agents.insert(path.clone(), loaded);
        }
        self.payloads
            .lock()
            .retain(|path, _| payload_files.contains(path));

        let mut entries = Vec::with_capacity(files.len());
        for path in files {
            let spec = match toml_agents.remove(&path) {
                Some(loaded) => loaded,
                None if payload_files.contains(&canonical(&path)) => {
                    tracing::debug!(source = %self.label, "Skipping payload file {}", path.display());
                    continue;
                }
                None => self.load_markdown(&path),
            };
            entries.push(spec.map(|spec| LoadedAgent {
                spec,
                origin: AgentOrigin::File(path),
            }));
        }
        Ok(entries)
    }

    fn watch_root(&self) -> Option<&Path> {
        Some(&self.root)
    }
}
