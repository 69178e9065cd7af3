//! Filesystem watcher driving dev-mode rebuilds.
//!
//! # Responsibilities
//! - Watch the routes directory recursively
//! - Filter events through exclude patterns, with includes overriding
//! - Forward relevant changes to the dev loop, which debounces and restarts
//!
//! # Design Decisions
//! - Watch errors are logged, never fatal: a running server outlives a
//!   broken watch
//! - Pattern filtering happens on the watcher thread so the dev loop only
//!   ever wakes for changes it cares about

use std::path::{Path, PathBuf};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Exclude patterns applied when the operator supplies none of their own:
/// dotfiles and build output never trigger a restart.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/.*",
    "**/.*/**",
    "**/target/**",
    "**/vendor/**",
    "**/dist/**",
    "**/build/**",
];

/// Include/exclude patterns for watch-triggered rebuilds.
pub struct WatchFilter {
    include: Vec<glob::Pattern>,
    exclude: Vec<glob::Pattern>,
}

impl WatchFilter {
    /// Compiles the pattern lists. The defaults are always appended to the
    /// excludes; an include pattern overrides any exclude it overlaps.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, glob::PatternError> {
        let include = include
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let exclude = exclude
            .iter()
            .map(String::as_str)
            .chain(DEFAULT_EXCLUDES.iter().copied())
            .map(glob::Pattern::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { include, exclude })
    }

    /// Whether a change at `path` (relative to the watch root) is relevant.
    pub fn is_relevant(&self, path: &Path) -> bool {
        if self.include.iter().any(|p| p.matches_path(path)) {
            return true;
        }
        !self.exclude.iter().any(|p| p.matches_path(path))
    }
}

/// Watches a directory tree and forwards relevant change notifications.
pub struct ChangeWatcher {
    root: PathBuf,
    filter: WatchFilter,
    tx: mpsc::UnboundedSender<()>,
}

impl ChangeWatcher {
    /// Creates a watcher for `root`. Returns the watcher and the channel the
    /// dev loop listens on.
    pub fn new(root: &Path, filter: WatchFilter) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                root: root.to_path_buf(),
                filter,
                tx,
            },
            rx,
        )
    }

    /// Starts watching in notify's background thread.
    ///
    /// The returned watcher must be kept alive for the watch to stay active.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let root = self.root.clone();
        let filter = self.filter;
        let tx = self.tx;

        let mut watcher =
            RecommendedWatcher::new(
                move |res: notify::Result<Event>| match res {
                    Ok(event) => {
                        let relevant = event.paths.iter().any(|path| {
                            let relative = path.strip_prefix(&root).unwrap_or(path);
                            filter.is_relevant(relative)
                        });
                        if relevant {
                            let _ = tx.send(());
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "Watch error"),
                },
                notify::Config::default(),
            )?;

        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        tracing::info!(path = %self.root.display(), "Route watcher started");
        Ok(watcher)
    }
}
