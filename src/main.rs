//! region-nav command line host.
//!
//! Builds the region tree declared in a config file, navigates each route
//! given on the command line from the root region, and prints the executed
//! routes plus the resulting tree.
//!
//! ```text
//! region-nav --config app.toml /  second?id=42  ./tabbed/doc1
//! region-nav --config app.toml --check
//! region-nav --config app.toml --watch doc0
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;

use region_nav::config::load_config;
use region_nav::config::watcher::ConfigWatcher;
use region_nav::observability::logging;
use region_nav::{NavigationHost, RegionId, RouteRegistry};

#[derive(Parser)]
#[command(name = "region-nav")]
#[command(about = "Navigate routes through a configured region tree", long_about = None)]
struct Cli {
    /// Config file (TOML).
    #[arg(short, long)]
    config: PathBuf,

    /// Validate the config and exit.
    #[arg(long)]
    check: bool,

    /// Print navigation metrics (Prometheus text format) at the end.
    #[arg(long)]
    metrics: bool,

    /// Keep running and re-navigate the routes whenever the route map changes.
    #[arg(long)]
    watch: bool,

    /// Routes to navigate, in order.
    routes: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}: {err}", cli.config.display());
            return Ok(ExitCode::FAILURE);
        }
    };
    if cli.check {
        println!("{}: ok ({} routes)", cli.config.display(), config.routes.len());
        return Ok(ExitCode::SUCCESS);
    }

    logging::init(&config.observability)?;
    let metrics = if cli.metrics {
        Some(PrometheusBuilder::new().install_recorder()?)
    } else {
        None
    };

    let host = NavigationHost::from_config(&config)?;
    let Some(root) = host.tree().root() else {
        eprintln!("{}: no [region] declared", cli.config.display());
        return Ok(ExitCode::FAILURE);
    };
    tracing::info!(regions = host.tree().len(), "Region tree mounted");

    let mut ok = navigate_all(&host, root, &cli.routes).await;

    if cli.watch {
        let (watcher, mut updates) = ConfigWatcher::new(&cli.config);
        let _watcher = watcher.run()?;
        loop {
            tokio::select! {
                update = updates.recv() => {
                    let Some(config) = update else { break };
                    host.resolver().replace(RouteRegistry::from_config(&config.routes));
                    ok = navigate_all(&host, root, &cli.routes).await;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted, stopping watch");
                    break;
                }
            }
        }
    }

    if let Some(handle) = metrics {
        print!("{}", handle.render());
    }

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Navigate each route in order, print the outcomes and the resulting tree.
async fn navigate_all(host: &NavigationHost, root: RegionId, routes: &[String]) -> bool {
    let mut ok = true;
    for route in routes {
        match host.navigate(route.as_str()).await {
            Ok(Some(response)) => println!("{route} -> {}", response.route),
            Ok(None) => println!("{route} -> (no region handled the route)"),
            Err(err) => {
                ok = false;
                println!("{route} -> error: {err}");
            }
        }
    }

    print!("{}", host.tree().describe(root));
    println!("route: {}", host.tree().route_of(root));
    ok
}
