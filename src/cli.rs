//! Command-line surface.
//!
//! Glue, not core: flags are parsed here, merged over the optional config
//! file, and handed to the routing/dispatch bootstrap together with the
//! caller's [`HandlerLoader`]. Embedding applications get the same
//! `start`/`dev`/`routes` commands by calling [`run`] with their registry;
//! the shipped binary passes a [`StubLoader`](crate::routing::StubLoader)
//! and serves the tree in preview mode.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::{self, ServerConfig, TlsConfig};
use crate::http::method::Verb;
use crate::http::server::HttpServer;
use crate::http::tls::load_tls_config;
use crate::lifecycle::Shutdown;
use crate::observability::{RouterObserver, TracingObserver};
use crate::routing::discover::build_route_table;
use crate::routing::handler::HandlerLoader;
use crate::routing::watcher::{ChangeWatcher, WatchFilter};

type CliError = Box<dyn std::error::Error>;

#[derive(Parser)]
#[command(name = "treeroute", version)]
#[command(about = "File-tree HTTP routing: serve and inspect verb-file route directories")]
pub struct Cli {
    /// Path to a treeroute.toml config file.
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the server
    Start(ServeArgs),
    /// Start with file watching and automatic route rebuilds
    Dev(DevArgs),
    /// Discover the route tree and list it without serving
    Routes(RoutesArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Routes directory
    #[arg(long)]
    pub routes: Option<PathBuf>,

    /// Path to the TLS certificate file (PEM)
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Path to the TLS private key file (PEM)
    #[arg(long)]
    pub tls_key: Option<PathBuf>,
}

#[derive(Args)]
pub struct DevArgs {
    #[command(flatten)]
    pub serve: ServeArgs,

    /// Glob patterns that rebuild even when an exclude matches
    #[arg(short = 'i', long)]
    pub include: Vec<String>,

    /// Glob patterns that never trigger a rebuild
    #[arg(short = 'e', long)]
    pub exclude: Vec<String>,
}

#[derive(Args)]
pub struct RoutesArgs {
    /// Routes directory
    #[arg(long)]
    pub routes: Option<PathBuf>,
}

/// Runs a parsed command against the caller's handler loader.
pub async fn run(cli: Cli, loader: Arc<dyn HandlerLoader>) -> Result<(), CliError> {
    let mut config = config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Start(args) => {
            apply_serve_args(&mut config, &args)?;
            start(config, loader).await
        }
        Commands::Dev(args) => {
            apply_serve_args(&mut config, &args.serve)?;
            config.dev.include.extend(args.include);
            config.dev.exclude.extend(args.exclude);
            dev(config, loader).await
        }
        Commands::Routes(args) => {
            if let Some(dir) = args.routes {
                config.routes.dir = dir;
            }
            list_routes(&config, loader.as_ref())
        }
    }
}

fn apply_serve_args(config: &mut ServerConfig, args: &ServeArgs) -> Result<(), CliError> {
    if let Some(port) = args.port {
        config.listener.port = port;
    }
    if let Some(routes) = &args.routes {
        config.routes.dir = routes.clone();
    }
    match (&args.tls_cert, &args.tls_key) {
        (Some(cert), Some(key)) => {
            config.tls = Some(TlsConfig {
                cert_path: cert.clone(),
                key_path: key.clone(),
            });
        }
        (None, None) => {}
        _ => return Err("--tls-cert and --tls-key must be provided together".into()),
    }
    Ok(())
}

/// Waits for Ctrl-C.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}

async fn start(config: ServerConfig, loader: Arc<dyn HandlerLoader>) -> Result<(), CliError> {
    let observer: Arc<dyn RouterObserver> = Arc::new(TracingObserver);

    tracing::info!(dir = %config.routes.dir.display(), "Discovering routes");
    let table = build_route_table(
        &config.routes.dir,
        loader.as_ref(),
        observer.as_ref(),
        &config.routes.extensions,
        1,
    )?;
    if table.is_empty() {
        tracing::warn!("No routes found");
    }

    let addr = config.listener.socket_addr();
    let server = HttpServer::new(table, observer);

    match &config.tls {
        Some(tls) => {
            let rustls = load_tls_config(&tls.cert_path, &tls.key_path).await?;
            server.run_tls(addr, rustls, shutdown_signal()).await?;
        }
        None => {
            // A bind failure is fatal: the server cannot serve.
            let listener = TcpListener::bind(addr).await?;
            server.run(listener, shutdown_signal()).await?;
        }
    }

    Ok(())
}

async fn dev(config: ServerConfig, loader: Arc<dyn HandlerLoader>) -> Result<(), CliError> {
    let observer: Arc<dyn RouterObserver> = Arc::new(TracingObserver);
    let addr = config.listener.socket_addr();
    let debounce = Duration::from_millis(config.dev.debounce_ms);
    let drain_grace = Duration::from_millis(config.dev.drain_ms);

    let mut generation: u64 = 1;
    tracing::info!(dir = %config.routes.dir.display(), "Discovering routes");
    let initial = build_route_table(
        &config.routes.dir,
        loader.as_ref(),
        observer.as_ref(),
        &config.routes.extensions,
        generation,
    )?;
    if initial.is_empty() {
        tracing::warn!("No routes found");
    }

    let filter = WatchFilter::new(&config.dev.include, &config.dev.exclude)?;
    let (watcher, mut changes) = ChangeWatcher::new(&config.routes.dir, filter);
    let _watcher = watcher.run()?;

    let mut next_table = Some(initial);

    loop {
        let table = match next_table.take() {
            Some(table) => table,
            None => return Ok(()),
        };

        let server = HttpServer::new(table, Arc::clone(&observer));
        let listener = TcpListener::bind(addr).await?;
        let restart = Shutdown::new();
        let signal = restart.signal();
        let mut serve_task: JoinHandle<std::io::Result<()>> =
            tokio::spawn(async move { server.run(listener, signal).await });

        'serving: loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                    restart.trigger();
                    drain(&mut serve_task, drain_grace).await;
                    return Ok(());
                }
                changed = changes.recv() => {
                    if changed.is_none() {
                        tracing::error!("Route watcher stopped; automatic rebuilds disabled");
                        shutdown_signal().await;
                        restart.trigger();
                        drain(&mut serve_task, drain_grace).await;
                        return Ok(());
                    }

                    // Debounce: absorb events until the tree is quiet.
                    loop {
                        match tokio::time::timeout(debounce, changes.recv()).await {
                            Ok(Some(())) => continue,
                            Ok(None) | Err(_) => break,
                        }
                    }

                    tracing::info!("Changes detected, rebuilding routes");
                    generation += 1;
                    match build_route_table(
                        &config.routes.dir,
                        loader.as_ref(),
                        observer.as_ref(),
                        &config.routes.extensions,
                        generation,
                    ) {
                        Ok(rebuilt) => {
                            if rebuilt.is_empty() {
                                tracing::warn!("No routes found");
                            }
                            next_table = Some(rebuilt);
                            // Tear the old listener down before re-binding.
                            restart.trigger();
                            drain(&mut serve_task, drain_grace).await;
                            break 'serving;
                        }
                        Err(e) => {
                            tracing::error!(
                                error = %e,
                                "Route rebuild failed; keeping previous routes"
                            );
                        }
                    }
                }
            }
        }
    }
}

/// Waits for the serving task within the grace period, then aborts it.
async fn drain(task: &mut JoinHandle<std::io::Result<()>>, grace: Duration) {
    match tokio::time::timeout(grace, &mut *task).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "Server task ended with error"),
        Ok(Err(e)) => tracing::error!(error = %e, "Server task panicked"),
        Err(_) => {
            tracing::warn!("Drain grace period elapsed; aborting server task");
            task.abort();
        }
    }
}

/// Records discoveries in traversal order, which is also match order.
struct Listing(Mutex<Vec<(Verb, String)>>);

impl RouterObserver for Listing {
    fn on_route_discovered(&self, verb: Verb, pattern: &str) {
        self.0
            .lock()
            .expect("listing poisoned")
            .push((verb, pattern.to_string()));
    }
}

fn list_routes(config: &ServerConfig, loader: &dyn HandlerLoader) -> Result<(), CliError> {
    let listing = Listing(Mutex::new(Vec::new()));
    build_route_table(
        &config.routes.dir,
        loader,
        &listing,
        &config.routes.extensions,
        1,
    )?;

    let discovered = listing.0.lock().expect("listing poisoned");
    if discovered.is_empty() {
        println!("No routes found in {}", config.routes.dir.display());
        return Ok(());
    }

    println!("Discovered routes ({}):", config.routes.dir.display());
    for (verb, pattern) in discovered.iter() {
        println!("  {:<7} {}", verb.as_upper(), pattern);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_flags_must_come_in_pairs() {
        let mut config = ServerConfig::default();
        let args = ServeArgs {
            port: None,
            routes: None,
            tls_cert: Some(PathBuf::from("cert.pem")),
            tls_key: None,
        };
        assert!(apply_serve_args(&mut config, &args).is_err());
    }

    #[test]
    fn serve_args_override_config() {
        let mut config = ServerConfig::default();
        let args = ServeArgs {
            port: Some(8123),
            routes: Some(PathBuf::from("api")),
            tls_cert: None,
            tls_key: None,
        };
        apply_serve_args(&mut config, &args).unwrap();
        assert_eq!(config.listener.port, 8123);
        assert_eq!(config.routes.dir, PathBuf::from("api"));
    }

    #[test]
    fn cli_parses_dev_patterns() {
        let cli = Cli::try_parse_from([
            "treeroute", "dev", "-p", "4000", "--routes", "src/routes", "-i", "**/keep/**",
            "-e", "**/*.tmp",
        ])
        .unwrap();
        match cli.command {
            Commands::Dev(args) => {
                assert_eq!(args.serve.port, Some(4000));
                assert_eq!(args.include, vec!["**/keep/**".to_string()]);
                assert_eq!(args.exclude, vec!["**/*.tmp".to_string()]);
            }
            _ => panic!("expected dev command"),
        }
    }
}
