use std::fs;

use clap::{CommandFactory, Parser};
use microagents::config::MicroagentsConfig;
use microagents::tooling::cli::{Cli, CliContext, Commands};
use microagents::MicroagentError;
use tempfile::TempDir;

use crate::integration::support::{with_xdg_env, workspace, write_agent};

fn isolated_context(temp_dir: &TempDir) -> CliContext {
    let root = workspace(temp_dir);
    write_agent(
        &root.join(".microagents").join("agents"),
        "deploy.md",
        "deploy",
        &["deploy", "release"],
        "Ship it carefully.",
    );
    let mut config = MicroagentsConfig::default();
    config.sources.include_user = false;
    CliContext::from_config(root, config).unwrap()
}

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["microagents", "dispatch", "write tests"],
        vec!["microagents", "dispatch", "write tests", "--format", "json"],
        vec!["microagents", "dispatch", "x", "--render", "--max-agents", "2"],
        vec!["microagents", "list"],
        vec!["microagents", "list", "--format", "json"],
        vec!["microagents", "show", "qa", "--format", "markdown"],
        vec!["microagents", "validate"],
        vec!["microagents", "init", "--list"],
        vec!["microagents", "init", "--force"],
        vec!["microagents", "interactive", "--watch", "--debounce-ms", "50"],
        vec!["microagents", "--no-builtin", "--agents-dir", "a", "list"],
        vec!["microagents", "--log-level", "debug", "--log-format", "json", "list"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_missing_arguments() {
    assert!(Cli::try_parse_from(["microagents"]).is_err());
    assert!(Cli::try_parse_from(["microagents", "dispatch"]).is_err());
    assert!(Cli::try_parse_from(["microagents", "show"]).is_err());
    assert!(Cli::try_parse_from(["microagents", "dispatch", "x", "--max-agents", "many"]).is_err());
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn dispatch_json_contract_has_required_fields() {
    let temp_dir = TempDir::new().unwrap();
    let cli = isolated_context(&temp_dir);

    let output = cli
        .execute(&Commands::Dispatch {
            prompt: "Deploy the Django backend and write tests".to_string(),
            format: "json".to_string(),
            render: false,
            max_agents: None,
        })
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert!(parsed.get("prompt").and_then(|v| v.as_str()).is_some());
    assert!(parsed.get("context").and_then(|v| v.as_str()).is_some());
    let ids: Vec<&str> = parsed["matches"]
        .as_array()
        .expect("matches array should exist")
        .iter()
        .map(|m| m["agent_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["backend", "qa", "deploy"]);
    assert_eq!(parsed["matches"][2]["matched_triggers"][0], "deploy");
}

#[test]
fn dispatch_render_respects_max_agents() {
    let temp_dir = TempDir::new().unwrap();
    let cli = isolated_context(&temp_dir);

    let output = cli
        .execute(&Commands::Dispatch {
            prompt: "release the react frontend".to_string(),
            format: "text".to_string(),
            render: true,
            max_agents: Some(1),
        })
        .unwrap();

    assert!(output.starts_with("<!-- microagent: frontend (triggers: react, frontend) -->"));
    assert!(!output.contains("Ship it carefully."));
}

#[test]
fn dispatch_text_and_errors() {
    let temp_dir = TempDir::new().unwrap();
    let cli = isolated_context(&temp_dir);

    let output = cli
        .execute(&Commands::Dispatch {
            prompt: "nothing relevant here".to_string(),
            format: "text".to_string(),
            render: false,
            max_agents: None,
        })
        .unwrap();
    assert_eq!(output, "No agents matched.");

    let err = cli
        .execute(&Commands::Dispatch {
            prompt: "   ".to_string(),
            format: "text".to_string(),
            render: false,
            max_agents: None,
        })
        .unwrap_err();
    assert!(matches!(err, MicroagentError::EmptyPrompt));
}

#[test]
fn list_and_show_json_contracts() {
    let temp_dir = TempDir::new().unwrap();
    let cli = isolated_context(&temp_dir);

    let output = cli
        .execute(&Commands::List {
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let agents = parsed.as_array().expect("list output should be an array");
    assert_eq!(agents.len(), 6);
    assert_eq!(agents[5]["id"], "deploy");
    assert!(agents[5]["triggers"].as_array().is_some());

    let output = cli
        .execute(&Commands::Show {
            agent_id: "deploy".to_string(),
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["payload"], "Ship it carefully.\n");

    let markdown = cli
        .execute(&Commands::Show {
            agent_id: "deploy".to_string(),
            format: "markdown".to_string(),
        })
        .unwrap();
    assert!(markdown.starts_with("---\n"));
    assert!(markdown.contains("Ship it carefully."));

    assert!(matches!(
        cli.execute(&Commands::Show {
            agent_id: "ghost".to_string(),
            format: "text".to_string(),
        }),
        Err(MicroagentError::NotFound(_))
    ));
}

#[test]
fn validate_json_contract_reports_broken_files() {
    let temp_dir = TempDir::new().unwrap();
    let cli = isolated_context(&temp_dir);
    fs::write(
        cli.workspace_root()
            .join(".microagents")
            .join("agents")
            .join("broken.md"),
        "no front-matter here",
    )
    .unwrap();

    let output = cli
        .execute(&Commands::Validate {
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["valid"], false);
    let entries = parsed["entries"].as_array().unwrap();
    assert!(entries.iter().any(|e| e["valid"] == false));
    assert!(entries
        .iter()
        .all(|e| e.get("checks").and_then(|v| v.as_array()).is_some()));
}

#[test]
fn init_writes_builtins_into_user_dir_and_reloads() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let root = workspace(&temp_dir);
        let mut config = MicroagentsConfig::default();
        config.sources.include_builtin = false;
        let cli = CliContext::from_config(root, config).unwrap();
        assert!(cli.registry().is_empty());

        let preview = cli
            .execute(&Commands::Init {
                force: false,
                list: true,
            })
            .unwrap();
        assert!(preview.contains("would create"));
        assert!(cli.registry().is_empty());

        let output = cli
            .execute(&Commands::Init {
                force: false,
                list: false,
            })
            .unwrap();
        assert!(output.contains("qa [created]"));
        assert!(temp_dir
            .path()
            .join("config/microagents/agents/qa.md")
            .exists());
        assert_eq!(cli.registry().len(), 5);
    });
}

#[test]
fn interactive_processes_each_non_blank_line() {
    let temp_dir = TempDir::new().unwrap();
    let cli = isolated_context(&temp_dir);

    let input = b"write tests\n\n   \nbuild a react component\n";
    let mut output = Vec::new();
    let processed = cli
        .run_interactive(&input[..], &mut output, false, None)
        .unwrap();

    assert_eq!(processed, 2);
    let text = String::from_utf8(output).unwrap();
    assert_eq!(text, "qa: test\nfrontend: react, component\n");
}

#[test]
fn config_layers_apply_in_precedence_order() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let global = temp_dir.path().join("config/microagents/config.toml");
        fs::create_dir_all(global.parent().unwrap()).unwrap();
        fs::write(
            &global,
            "[dispatch]\nmax_agents = 5\ninclude_header = false\n\n[watch]\ndebounce_ms = 10\n",
        )
        .unwrap();

        let root = workspace(&temp_dir);
        fs::create_dir_all(root.join(".microagents")).unwrap();
        fs::write(
            root.join(".microagents/config.toml"),
            "[dispatch]\nmax_agents = 3\n",
        )
        .unwrap();

        std::env::set_var("MICROAGENTS__WATCH__DEBOUNCE_MS", "75");
        let loaded = CliContext::load_config(&root, None);
        std::env::remove_var("MICROAGENTS__WATCH__DEBOUNCE_MS");

        let config = loaded.unwrap();
        assert_eq!(config.dispatch.max_agents, Some(3));
        assert!(!config.dispatch.include_header);
        assert_eq!(config.watch.debounce_ms, 75);
    });
}
