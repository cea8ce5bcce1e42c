//! Registry reload and file watching.
//!
//! [`RegistryReloader`] rebuilds the registry from its sources and swaps it in
//! with `AgentRegistry::replace`. [`RegistryWatcher`] drives the reloader from
//! filesystem events on every directory source, debounced so an editor's
//! burst of writes causes one reload.

use crate::agent::repository::{collect_specs, AgentSource};
use crate::agent::AgentRegistry;
use crate::error::{MicroagentError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Rebuilds a shared registry from a fixed list of sources.
pub struct RegistryReloader {
    sources: Vec<Box<dyn AgentSource>>,
    registry: Arc<AgentRegistry>,
}

impl RegistryReloader {
    pub fn new(sources: Vec<Box<dyn AgentSource>>, registry: Arc<AgentRegistry>) -> Self {
        Self { sources, registry }
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn sources(&self) -> &[Box<dyn AgentSource>] {
        &self.sources
    }

    /// Reload all sources and replace the registry. Returns the agent count.
    ///
    /// On failure the registry keeps serving its previous contents.
    pub fn reload(&self) -> Result<usize> {
        let specs = collect_specs(&self.sources)?;
        match self.registry.replace(specs) {
            Ok(()) => Ok(self.registry.len()),
            Err(e) => {
                warn!("Reload rejected, keeping previous registry: {}", e);
                Err(e)
            }
        }
    }

    /// Existing directories backing the sources.
    fn watch_roots(&self) -> Vec<PathBuf> {
        self.sources
            .iter()
            .filter_map(|source| source.watch_root())
            .filter(|root| root.is_dir())
            .map(PathBuf::from)
            .collect()
    }
}

/// Background watcher that reloads the registry when agent files change.
pub struct RegistryWatcher {
    running: Arc<AtomicBool>,
    watcher: Option<RecommendedWatcher>,
    handle: Option<JoinHandle<()>>,
    roots: Vec<PathBuf>,
}

impl RegistryWatcher {
    /// Start watching every existing source directory.
    ///
    /// Directories that do not exist yet are not watched.
    pub fn start(reloader: Arc<RegistryReloader>, debounce: Duration) -> Result<Self> {
        let roots = reloader.watch_roots();
        let (tx, rx) = mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            // The receiver is gone once the watcher is shutting down.
            let _ = tx.send(res);
        })
        .map_err(|e| MicroagentError::ConfigError(format!("Failed to create watcher: {}", e)))?;

        for root in &roots {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(|e| {
                    MicroagentError::ConfigError(format!(
                        "Failed to watch directory {}: {}",
                        root.display(),
                        e
                    ))
                })?;
            info!(directory = %root.display(), "Watching agent directory");
        }

        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let handle = std::thread::Builder::new()
            .name("microagents-watch".to_string())
            .spawn(move || run_loop(reloader, rx, thread_running, debounce))?;

        Ok(Self {
            running,
            watcher: Some(watcher),
            handle: Some(handle),
            roots,
        })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Stop watching and wait for the background thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // Dropping the watcher closes the channel and wakes the loop.
        self.watcher.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Watch thread panicked");
            }
        }
    }
}

impl Drop for RegistryWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn is_relevant(event: &Event) -> bool {
    !matches!(event.kind, EventKind::Access(_))
}

fn run_loop(
    reloader: Arc<RegistryReloader>,
    rx: mpsc::Receiver<notify::Result<Event>>,
    running: Arc<AtomicBool>,
    debounce: Duration,
) {
    let mut pending_since: Option<Instant> = None;

    while running.load(Ordering::SeqCst) {
        // Idle: block until the next event or until the watcher is dropped.
        let received = match pending_since {
            Some(since) => rx.recv_timeout(debounce.saturating_sub(since.elapsed())),
            None => rx.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Ok(event)) => {
                if is_relevant(&event) {
                    debug!(paths = ?event.paths, kind = ?event.kind, "Agent files changed");
                    pending_since = Some(Instant::now());
                }
            }
            Ok(Err(e)) => warn!("Watch error: {}", e),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        if pending_since.is_some_and(|since| since.elapsed() >= debounce) {
            pending_since = None;
            match reloader.reload() {
                Ok(count) => info!(agents = count, "Reloaded agents"),
                Err(e) => error!("Failed to reload agents: {}", e),
            }
        }
    }
    debug!("Watch loop stopped");
}
