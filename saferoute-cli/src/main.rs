//! saferoute - pedestrian safety routing from the command line

mod cli;
mod config;
mod data;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use geojson::FeatureCollection;
use saferoute_core::{
    CompactGraph, NodeId, NodeLocator, PathResult, RouteMetrics, WeightKind, graph_to_geojson,
    route_to_geojson, shortest_path, to_geojson_string,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, Endpoint, RouteKind};
use crate::config::CliConfig;

#[derive(Debug, Serialize)]
struct RouteReport {
    kind: WeightKind,
    #[serde(flatten)]
    result: PathResult,
    metrics: Option<RouteMetrics>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("saferoute=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(&cli.config)?.with_overrides(cli.graph, cli.businesses);
    let graph = data::load_graph(&config, cli.departure.as_deref())?;

    match cli.command {
        Commands::Route {
            from,
            to,
            kind,
            geojson,
        } => route(&graph, from, to, kind, geojson),
        Commands::Summary { preview } => print_json(&graph.summary(preview)),
        Commands::Geojson { output } => {
            let text = to_geojson_string(&graph_to_geojson(&graph)?)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Wrote {} edges to {}", graph.edge_count(), path.display());
                    Ok(())
                }
                None => print_line(&text),
            }
        }
    }
}

fn resolve(
    graph: &CompactGraph,
    locator: &mut Option<NodeLocator>,
    endpoint: Endpoint,
) -> Option<NodeId> {
    match endpoint {
        Endpoint::Node(id) => Some(id),
        Endpoint::Coordinates { lon, lat } => {
            let node = locator
                .get_or_insert_with(|| NodeLocator::new(graph))
                .nearest(lon, lat);
            if let Some(node) = node {
                tracing::info!("Snapped {lon},{lat} to node {node}");
            }
            node
        }
    }
}

fn route(
    graph: &CompactGraph,
    from: Endpoint,
    to: Endpoint,
    kind: RouteKind,
    geojson: bool,
) -> Result<()> {
    let mut locator = None;
    let (Some(start), Some(goal)) = (
        resolve(graph, &mut locator, from),
        resolve(graph, &mut locator, to),
    ) else {
        anyhow::bail!("Cannot snap a coordinate to an empty graph");
    };

    let results: Vec<(WeightKind, PathResult)> = kind
        .weight_kinds()
        .iter()
        .map(|&kind| (kind, shortest_path(graph, start, goal, kind)))
        .collect();

    if geojson {
        let features = results
            .iter()
            .filter_map(|(kind, result)| result.path().map(|path| (*kind, path)))
            .map(|(kind, path)| route_to_geojson(graph, path, kind))
            .collect::<Result<Vec<_>, _>>()?;
        let collection = FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        };
        return print_line(&to_geojson_string(&collection)?);
    }

    let reports: Vec<RouteReport> = results
        .into_iter()
        .map(|(kind, result)| {
            let metrics = result.path().map(|path| RouteMetrics::from_path(graph, path));
            if metrics.is_none() {
                tracing::warn!("No {} route from {start} to {goal}", kind.as_str());
            }
            RouteReport {
                kind,
                result,
                metrics,
            }
        })
        .collect();
    print_json(&reports)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    print_line(&text)
}

fn print_line(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}").context("Failed to write to stdout")
}
