use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use microagents::agent::{AgentSource, DirectorySource};
use microagents::watch::{RegistryReloader, RegistryWatcher};
use microagents::AgentRegistry;
use tempfile::TempDir;

use crate::integration::support::write_agent;

fn wait_for<F: Fn() -> bool>(timeout: Duration, condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(25));
    }
    condition()
}

#[test]
fn watcher_reloads_after_agent_file_changes() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("agents");
    write_agent(&dir, "qa.md", "qa", &["test"], "QA");

    let registry = Arc::new(AgentRegistry::new());
    let sources: Vec<Box<dyn AgentSource>> = vec![Box::new(DirectorySource::new("dir", &dir))];
    let reloader = Arc::new(RegistryReloader::new(sources, Arc::clone(&registry)));
    reloader.reload().unwrap();
    assert_eq!(registry.len(), 1);

    let watcher = RegistryWatcher::start(Arc::clone(&reloader), Duration::from_millis(50)).unwrap();
    assert_eq!(watcher.roots().len(), 1);

    write_agent(&dir, "ops.md", "ops", &["deploy"], "Ops");
    assert!(
        wait_for(Duration::from_secs(10), || registry.contains("ops")),
        "registry should pick up the new agent"
    );
    assert_eq!(registry.dispatch("deploy the tests").unwrap().len(), 2);

    watcher.stop();
}

#[test]
fn watcher_without_existing_roots_starts_and_stops() {
    let temp_dir = TempDir::new().unwrap();
    let sources: Vec<Box<dyn AgentSource>> = vec![Box::new(DirectorySource::new(
        "missing",
        temp_dir.path().join("missing"),
    ))];
    let reloader = Arc::new(RegistryReloader::new(sources, Arc::new(AgentRegistry::new())));

    let watcher = RegistryWatcher::start(reloader, Duration::from_millis(20)).unwrap();
    assert!(watcher.roots().is_empty());
    drop(watcher);
}
