//! Route discovery: deriving a table from a directory tree.
//!
//! # Responsibilities
//! - Walk the routes directory recursively
//! - Turn directory names into path segments (`$name` → `:name` parameter)
//! - Bind verb-named files through the handler loader
//! - Report each binding to the observer, in traversal order
//!
//! # Design Decisions
//! - Entries are taken in the order the filesystem reports them, never
//!   re-sorted: that order decides match precedence and log order
//! - Files that are not verb bindings are skipped silently; a missing root
//!   is an error distinct from other I/O failures so callers can give an
//!   actionable message
//! - Merging a subdirectory's bindings unions verb maps per path key, so
//!   handlers discovered under the same derived path coexist

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::http::method::Verb;
use crate::observability::RouterObserver;
use crate::routing::handler::{HandlerLoader, LoadError, RouteSource};
use crate::routing::table::RouteTable;

/// Error building the route table.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The routes root does not exist. Fatal at startup; on a dev-mode
    /// rebuild it only prevents activating the new table.
    #[error("routes directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load handler for {}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
}

/// File extensions treated as route sources when nothing else is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["rs"];

/// Builds a route table from a directory tree.
///
/// `generation` flows through to the handler loader; bump it per build so
/// caching loaders observe on-disk edits.
pub fn build_route_table(
    root: &Path,
    loader: &dyn HandlerLoader,
    observer: &dyn RouterObserver,
    extensions: &[String],
    generation: u64,
) -> Result<RouteTable, DiscoveryError> {
    let mut table = RouteTable::new(generation);
    walk(
        root,
        root,
        "",
        loader,
        observer,
        extensions,
        generation,
        &mut table,
    )?;
    Ok(table)
}

#[allow(clippy::too_many_arguments)]
fn walk(
    root: &Path,
    dir: &Path,
    base: &str,
    loader: &dyn HandlerLoader,
    observer: &dyn RouterObserver,
    extensions: &[String],
    generation: u64,
    table: &mut RouteTable,
) -> Result<(), DiscoveryError> {
    let entries = std::fs::read_dir(dir).map_err(|source| {
        if dir == root && source.kind() == io::ErrorKind::NotFound {
            DiscoveryError::RootNotFound(root.to_path_buf())
        } else {
            DiscoveryError::Io {
                path: dir.to_path_buf(),
                source,
            }
        }
    })?;

    // Entries are consumed in the order the filesystem reports them; this
    // order is load-bearing for match precedence.
    for entry in entries {
        let entry = entry.map_err(|source| DiscoveryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue,
        };
        let path = entry.path();
        let file_type = entry.file_type().map_err(|source| DiscoveryError::Io {
            path: path.clone(),
            source,
        })?;

        if file_type.is_dir() {
            let segment = match name.strip_prefix('$') {
                Some(param) => format!(":{param}"),
                None => name,
            };
            let child_base = format!("{base}/{segment}");
            walk(
                root,
                &path,
                &child_base,
                loader,
                observer,
                extensions,
                generation,
                table,
            )?;
        } else if file_type.is_file() {
            let Some(verb) = verb_binding(&name, extensions) else {
                continue;
            };

            let relative = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_path_buf();
            let source = RouteSource {
                path: path.clone(),
                relative,
            };
            let handler =
                loader
                    .load(&source, generation)
                    .map_err(|source| DiscoveryError::Load {
                        path: path.clone(),
                        source,
                    })?;

            let pattern = if base.is_empty() { "/" } else { base };
            table.bind(pattern, verb, handler);
            observer.on_route_discovered(verb, pattern);
        }
    }

    Ok(())
}

/// Returns the verb a file name binds, if its stem is a verb token and its
/// extension is recognized.
fn verb_binding(file_name: &str, extensions: &[String]) -> Option<Verb> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if !extensions.iter().any(|e| e == ext) {
        return None;
    }
    Verb::from_stem(stem)
}
