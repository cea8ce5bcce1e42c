//! CLI Tooling
//!
//! Command-line interface over the registry and dispatcher. Every command
//! works against the agents loaded for one workspace.

use crate::agent::commands::{
    AgentListResult, AgentShowResult, AgentValidateResult, DispatchCommandResult, InitResult,
};
use crate::agent::repository::{render_agent_markdown, sources_from_config};
use crate::agent::{AgentCommandService, AgentRegistry};
use crate::config::{xdg, ConfigLoader, MicroagentsConfig};
use crate::error::{MicroagentError, Result};
use crate::views::ContextView;
use crate::watch::{RegistryReloader, RegistryWatcher};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Microagents CLI - keyword-triggered guidance selection
#[derive(Parser, Debug)]
#[command(name = "microagents")]
#[command(about = "Select microagent guidance documents by the keywords in a prompt")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Additional agent directory (repeatable)
    #[arg(long = "agents-dir")]
    pub agents_dirs: Vec<PathBuf>,

    /// Do not load the built-in agents
    #[arg(long)]
    pub no_builtin: bool,

    /// Enable verbose logging (same as --log-level debug)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show which agents a prompt triggers
    Dispatch {
        /// The prompt text
        prompt: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Print the selected guidance instead of the match list
        #[arg(long)]
        render: bool,
        /// Render at most this many agents
        #[arg(long)]
        max_agents: Option<usize>,
    },
    /// List registered agents
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show one agent
    Show {
        /// Agent id
        agent_id: String,
        /// Output format (text, json, or markdown)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Validate every agent file in every source
    Validate {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Write the built-in agents into the user agents directory
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,

        /// List what would be written without writing
        #[arg(long)]
        list: bool,
    },
    /// Read prompts from stdin, one per line, and print matches
    Interactive {
        /// Reload agents when their files change
        #[arg(long)]
        watch: bool,
        /// Debounce window in milliseconds (defaults to [watch] debounce_ms)
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
}

/// CLI context: configuration plus the registry loaded from it.
pub struct CliContext {
    workspace_root: PathBuf,
    config: MicroagentsConfig,
    reloader: Arc<RegistryReloader>,
    color: bool,
}

impl CliContext {
    /// Load configuration for a workspace: explicit file, or the layered defaults.
    pub fn load_config(
        workspace_root: &Path,
        config_path: Option<&Path>,
    ) -> Result<MicroagentsConfig> {
        Ok(match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(workspace_root)?,
        })
    }

    /// Create a new CLI context
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self> {
        let config = Self::load_config(&workspace_root, config_path.as_deref())?;
        Self::from_config(workspace_root, config)
    }

    /// Create a context from an already-loaded configuration.
    pub fn from_config(workspace_root: PathBuf, config: MicroagentsConfig) -> Result<Self> {
        let workspace_root = xdg::canonical_workspace(&workspace_root)?;
        let sources = sources_from_config(&config.sources, &workspace_root)?;
        let registry = Arc::new(AgentRegistry::new());
        let reloader = Arc::new(RegistryReloader::new(sources, registry));
        let count = reloader.reload()?;
        info!(workspace = %workspace_root.display(), agents = count, "Loaded agents");

        Ok(Self {
            workspace_root,
            config,
            reloader,
            color: false,
        })
    }

    /// Enable ANSI highlighting in text output.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        self.reloader.registry()
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String> {
        info!(command = command_name(command), "Executing command");
        match command {
            Commands::Dispatch {
                prompt,
                format,
                render,
                max_agents,
            } => self.handle_dispatch(prompt, format, *render, *max_agents),
            Commands::List { format } => self.handle_list(format),
            Commands::Show { agent_id, format } => self.handle_show(agent_id, format),
            Commands::Validate { format } => self.handle_validate(format),
            Commands::Init { force, list } => self.handle_init(*force, *list),
            Commands::Interactive { watch, debounce_ms } => {
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                let processed = self.run_interactive(
                    stdin.lock(),
                    &mut stdout.lock(),
                    *watch,
                    *debounce_ms,
                )?;
                Ok(format!("Processed {} prompt(s).", processed))
            }
        }
    }

    fn handle_dispatch(
        &self,
        prompt: &str,
        format: &str,
        render: bool,
        max_agents: Option<usize>,
    ) -> Result<String> {
        let view = ContextView::from(&self.config.dispatch).with_max_agents(max_agents);
        let snapshot = self.registry().snapshot();
        let view = (render || format == "json").then_some(&view);
        let result = AgentCommandService::dispatch(&snapshot, prompt, view)?;
        match format {
            "json" => to_json(&result),
            _ if render => Ok(result.context.unwrap_or_default()),
            _ => Ok(self.format_dispatch_text(&result)),
        }
    }

    fn handle_list(&self, format: &str) -> Result<String> {
        let result = AgentCommandService::list(self.registry());
        match format {
            "json" => to_json(&result.agents),
            _ => Ok(format_list_text(&result)),
        }
    }

    fn handle_show(&self, agent_id: &str, format: &str) -> Result<String> {
        if format == "markdown" {
            let spec = self.registry().get(agent_id)?.to_spec();
            return render_agent_markdown(&spec)
                .map_err(|e| MicroagentError::ConfigError(e.to_string()));
        }
        let result = AgentCommandService::show(self.registry(), agent_id)?;
        match format {
            "json" => to_json(&result),
            _ => Ok(format_show_text(&result)),
        }
    }

    fn handle_validate(&self, format: &str) -> Result<String> {
        let result = AgentCommandService::validate(self.reloader.sources())?;
        match format {
            "json" => {
                let entries: Vec<serde_json::Value> = result
                    .results
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "subject": r.subject,
                            "source": r.source,
                            "valid": r.is_valid(),
                            "checks": r.checks.iter().map(|(name, passed)| {
                                serde_json::json!({ "check": name, "passed": passed })
                            }).collect::<Vec<_>>(),
                            "errors": r.errors,
                        })
                    })
                    .collect();
                to_json(&serde_json::json!({
                    "valid": result.is_valid(),
                    "entries": entries,
                }))
            }
            _ => Ok(format_validate_text(&result)),
        }
    }

    fn handle_init(&self, force: bool, list: bool) -> Result<String> {
        let agents_dir = if list {
            xdg::user_agents_dir()?
        } else {
            xdg::ensure_user_agents_dir()?
        };
        let result = AgentCommandService::init(&agents_dir, force, list)?;
        if !list {
            let count = self.reloader.reload()?;
            info!(agents = count, "Reloaded agents after init");
        }
        Ok(format_init_text(&result, list))
    }

    /// Read prompts line by line and write matches for each.
    ///
    /// Blank lines are skipped. Returns the number of prompts processed.
    pub fn run_interactive<R: BufRead, W: Write>(
        &self,
        input: R,
        output: &mut W,
        watch: bool,
        debounce_ms: Option<u64>,
    ) -> Result<usize> {
        let watcher = if watch {
            let debounce =
                Duration::from_millis(debounce_ms.unwrap_or(self.config.watch.debounce_ms));
            Some(RegistryWatcher::start(Arc::clone(&self.reloader), debounce)?)
        } else {
            None
        };

        let mut processed = 0;
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let snapshot = self.registry().snapshot();
            let result = AgentCommandService::dispatch(&snapshot, &line, None)?;
            writeln!(output, "{}", self.format_dispatch_text(&result))?;
            output.flush()?;
            processed += 1;
        }

        if let Some(watcher) = watcher {
            watcher.stop();
        }
        Ok(processed)
    }

    fn format_dispatch_text(&self, result: &DispatchCommandResult) -> String {
        if result.matches.is_empty() {
            return "No agents matched.".to_string();
        }
        result
            .matches
            .iter()
            .map(|m| {
                let triggers = m.matched_triggers.join(", ");
                if self.color {
                    format!("{}: {}", m.agent_id.bold().green(), triggers)
                } else {
                    format!("{}: {}", m.agent_id, triggers)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Dispatch { .. } => "dispatch",
        Commands::List { .. } => "list",
        Commands::Show { .. } => "show",
        Commands::Validate { .. } => "validate",
        Commands::Init { .. } => "init",
        Commands::Interactive { .. } => "interactive",
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| MicroagentError::ConfigError(format!("Failed to serialize output: {}", e)))
}

fn format_list_text(result: &AgentListResult) -> String {
    if result.agents.is_empty() {
        return "No agents registered.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Agent", "Triggers", "Description", "Payload chars"]);
    for agent in &result.agents {
        table.add_row(vec![
            agent.id.clone(),
            agent.triggers.join(", "),
            agent.description.clone().unwrap_or_else(|| "-".to_string()),
            agent.payload_chars.to_string(),
        ]);
    }
    table.to_string()
}

fn format_show_text(result: &AgentShowResult) -> String {
    let mut output = format!("Agent: {}\n", result.id);
    if let Some(description) = &result.description {
        output.push_str(&format!("Description: {}\n", description));
    }
    output.push_str(&format!("Triggers: {}\n", result.triggers.join(", ")));
    if !result.payload.is_empty() {
        output.push('\n');
        output.push_str(result.payload.trim_end());
    }
    output
}

fn format_validate_text(result: &AgentValidateResult) -> String {
    if result.results.is_empty() {
        return "No agents found to validate.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Source", "Agent", "Status", "Details"]);
    for r in &result.results {
        let status = if r.is_valid() { "ok" } else { "invalid" };
        let mut details: Vec<String> = r
            .checks
            .iter()
            .filter(|(_, passed)| !passed)
            .map(|(name, _)| format!("failed: {}", name))
            .collect();
        details.extend(r.errors.iter().cloned());
        table.add_row(vec![
            r.source.clone(),
            r.subject.clone(),
            status.to_string(),
            details.join("; "),
        ]);
    }
    format!(
        "{}\n{}/{} entries valid",
        table,
        result.valid_count(),
        result.results.len()
    )
}

fn format_init_text(result: &InitResult, preview: bool) -> String {
    let mut output = if preview {
        format!("Initialization preview ({}):\n", result.agents_dir.display())
    } else {
        format!("Initialized agents in {}:\n", result.agents_dir.display())
    };
    for entry in &result.entries {
        let status = match (preview, entry.exists, entry.written) {
            (true, true, _) => "exists",
            (true, false, _) => "would create",
            (false, _, true) if entry.exists => "overwritten",
            (false, _, true) => "created",
            (false, _, false) => "skipped (exists)",
        };
        output.push_str(&format!("  - {} [{}]\n", entry.agent_id, status));
    }
    output
}
