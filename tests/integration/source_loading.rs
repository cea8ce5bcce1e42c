use std::fs;

use microagents::agent::repository::{collect_agents, sources_from_config};
use microagents::agent::{
    collect_specs, validate_sources, AgentOrigin, AgentSource, DirectorySource, EmbeddedSource,
};
use microagents::config::SourcesConfig;
use microagents::AgentRegistry;
use tempfile::TempDir;

use crate::integration::support::write_agent;

#[test]
fn later_layer_shadows_earlier_agent_in_place() {
    let temp_dir = TempDir::new().unwrap();
    let override_dir = temp_dir.path().join("override");
    let path = write_agent(&override_dir, "backend.md", "backend", &["flask"], "Flask guidance");

    let sources: Vec<Box<dyn AgentSource>> = vec![
        Box::new(EmbeddedSource::new()),
        Box::new(DirectorySource::new("override", &override_dir)),
    ];
    let agents = collect_agents(&sources).unwrap();

    let ids: Vec<&str> = agents.iter().map(|a| a.spec.id.as_str()).collect();
    assert_eq!(ids, vec!["startup", "architect", "backend", "frontend", "qa"]);
    let backend = &agents[2];
    assert_eq!(backend.origin, AgentOrigin::File(path));
    assert_eq!(backend.spec.triggers, vec!["flask"]);

    let registry = AgentRegistry::from_specs(collect_specs(&sources).unwrap()).unwrap();
    assert!(registry.dispatch("django models").unwrap().iter().all(|m| m.agent_id != "backend"));
    assert_eq!(registry.dispatch("a flask app").unwrap()[0].agent_id, "backend");
}

#[test]
fn markdown_and_toml_agents_load_in_path_order() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("agents");
    write_agent(&dir, "b-docs.md", "docs", &["readme", "docs"], "Docs guidance");
    fs::write(dir.join("guide.md"), "Payload from file\n").unwrap();
    fs::write(
        dir.join("a-ops.toml"),
        "id = \"ops\"\ntriggers = [\"deploy\", \"ci\"]\npayload_path = \"guide.md\"\n",
    )
    .unwrap();

    let source = DirectorySource::new("dir", &dir);
    let entries = source.entries().unwrap();
    // guide.md is the payload of a-ops.toml, not an agent of its own
    assert_eq!(entries.len(), 2);

    let specs: Vec<_> = entries.into_iter().map(|e| e.unwrap().spec).collect();
    assert_eq!(specs[0].id, "ops");
    assert_eq!(specs[0].payload, "Payload from file\n");
    assert_eq!(specs[1].id, "docs");
}

#[test]
fn broken_files_are_skipped_on_load_but_reported_by_validate() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("agents");
    write_agent(&dir, "qa.md", "qa", &["test"], "QA");
    fs::write(dir.join("broken.md"), "---\nname: broken\n---\nno triggers").unwrap();

    let sources: Vec<Box<dyn AgentSource>> = vec![Box::new(DirectorySource::new("dir", &dir))];
    let specs = collect_specs(&sources).unwrap();
    assert_eq!(specs.len(), 1);

    let results = validate_sources(&sources).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results.iter().filter(|r| r.is_valid()).count(), 1);
    let broken = results.iter().find(|r| !r.is_valid()).unwrap();
    assert!(!broken.errors.is_empty());
}

#[test]
fn config_controls_which_layers_load() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    write_agent(
        &workspace.join(".microagents").join("agents"),
        "local.md",
        "local",
        &["local"],
        "Local",
    );
    write_agent(&workspace.join("extra"), "extra.md", "extra", &["extra"], "Extra");

    let config = SourcesConfig {
        include_builtin: false,
        include_user: false,
        include_workspace: true,
        directories: vec!["extra".into()],
    };
    let sources = sources_from_config(&config, &workspace).unwrap();
    assert_eq!(sources.len(), 2);

    let ids: Vec<String> = collect_specs(&sources)
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec!["local", "extra"]);
}

#[test]
fn missing_directories_contribute_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let source = DirectorySource::new("missing", temp_dir.path().join("nope"));
    assert!(source.entries().unwrap().is_empty());
}
