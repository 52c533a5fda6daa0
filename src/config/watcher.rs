//! Hot reload of render settings.
//!
//! Only `[render]` is applied to a running process. Changes to other sections
//! are reported and wait for a restart. A `--pretty` flag given on the command
//! line keeps precedence over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::{DumpConfig, RenderConfig};

/// Watches the configuration file and publishes changed render settings.
pub struct ConfigWatcher {
    path: PathBuf,
    policy: ReloadPolicy,
    update_tx: mpsc::UnboundedSender<RenderConfig>,
}

impl ConfigWatcher {
    /// `current` is the render settings in effect, overrides applied. Returns
    /// the watcher and a receiver for new render settings.
    pub fn new(
        path: &Path,
        current: &RenderConfig,
        pretty_override: Option<bool>,
    ) -> (Self, mpsc::UnboundedReceiver<RenderConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                policy: ReloadPolicy::new(current.clone(), pretty_override),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Updates stop when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            mut policy,
            update_tx,
        } = self;
        let watched = path.clone();

        // Baseline for detecting edits to sections that need a restart.
        policy.file = load_config(&path).ok();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => match load_config(&path) {
                    Ok(next) => {
                        if let Some(render) = policy.apply(next) {
                            tracing::info!(path = %path.display(), pretty = render.pretty, "Render settings reloaded");
                            let _ = update_tx.send(render);
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to reload config: {}. Keeping current settings.", e);
                    }
                },
                Ok(_) => {}
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %watched.display(), "Config watcher started");
        Ok(watcher)
    }
}

/// Decides what a reloaded file changes in the running process.
struct ReloadPolicy {
    render: RenderConfig,
    pretty_override: Option<bool>,
    /// Last file contents seen, before overrides.
    file: Option<DumpConfig>,
}

impl ReloadPolicy {
    fn new(render: RenderConfig, pretty_override: Option<bool>) -> Self {
        Self {
            render,
            pretty_override,
            file: None,
        }
    }

    /// New render settings to publish, or `None` when they did not change.
    fn apply(&mut self, next: DumpConfig) -> Option<RenderConfig> {
        if let Some(previous) = &self.file {
            let restart_sections = [
                ("tap", next.tap != previous.tap),
                ("output", next.output != previous.output),
                ("observability", next.observability != previous.observability),
            ];
            for (section, changed) in restart_sections {
                if changed {
                    tracing::warn!(section, "Config section changed; takes effect after restart");
                }
            }
        }

        let mut render = next.render.clone();
        if let Some(pretty) = self.pretty_override {
            render.pretty = pretty;
        }
        self.file = Some(next);

        if render == self.render {
            return None;
        }
        self.render = render;
        Some(self.render.clone())
    }
}
