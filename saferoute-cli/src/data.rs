//! Loads the input files and runs the scoring pipeline

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};
use saferoute_core::model::validate_businesses;
use saferoute_core::{
    AttributedGraph, Business, CompactGraph, DepartureTime, build_compact_graph, rescore,
    score_graph,
};
use serde::de::DeserializeOwned;

use crate::config::CliConfig;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Reads, scores and packs the street graph, rescoring for `departure` if given
pub fn load_graph(config: &CliConfig, departure: Option<&str>) -> Result<CompactGraph> {
    let Some(graph_path) = config.data.graph.as_deref() else {
        bail!("No street graph given, pass --graph or set [data].graph");
    };
    let mut input: AttributedGraph = read_json(graph_path)?;
    tracing::info!(
        "Read {} nodes and {} edges from {}",
        input.node_count(),
        input.edge_count(),
        graph_path.display()
    );

    let businesses = match config.data.businesses.as_deref() {
        Some(path) => {
            let raw: Vec<Business> = read_json(path)?;
            validate_businesses(raw)
        }
        None => {
            tracing::info!("No business list, business proximity is unknown");
            Vec::new()
        }
    };

    let summary = score_graph(&mut input, &businesses, &config.scoring);
    tracing::debug!("{summary:?}");
    let mut graph = build_compact_graph(&input, &config.scoring)
        .context("Failed to build the compact graph")?;

    if let Some(raw) = departure {
        match DepartureTime::parse(raw, &config.scoring.business_timezone) {
            Ok(at) => {
                rescore(&mut graph, &businesses, at);
            }
            Err(e) => tracing::warn!("{e}, keeping the unrescored weights"),
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use saferoute_core::{StreetEdge, StreetNode};

    use super::*;

    fn write_json<T: serde::Serialize>(dir: &Path, name: &str, value: &T) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
        path
    }

    fn sample(dir: &Path) -> CliConfig {
        let mut input = AttributedGraph::new();
        input
            .add_node(StreetNode::new(1, -78.6400, 35.7800))
            .add_node(StreetNode::new(2, -78.6400, 35.7810))
            .add_edge(StreetEdge::new(1, 2, 111.0).with_highway("residential"));
        let businesses = vec![
            Business::new(35.7805, -78.6400, "Corner Cafe"),
            Business::new(135.0, -78.6400, "Nowhere"),
        ];

        let mut config = CliConfig::default();
        config.data.graph = Some(write_json(dir, "graph.json", &input));
        config.data.businesses = Some(write_json(dir, "businesses.json", &businesses));
        config
    }

    #[test]
    fn loads_scores_and_builds() {
        let dir = tempfile::tempdir().unwrap();
        let graph = load_graph(&sample(dir.path()), None).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.scores().business_count, vec![1]);
    }

    #[test]
    fn bad_departure_skips_rescoring() {
        let dir = tempfile::tempdir().unwrap();
        let config = sample(dir.path());
        let plain = load_graph(&config, None).unwrap();
        let graph = load_graph(&config, Some("teatime")).unwrap();
        assert_eq!(graph.scores(), plain.scores());
    }

    #[test]
    fn missing_graph_is_an_error() {
        assert!(load_graph(&CliConfig::default(), None).is_err());
        let config = CliConfig::default().with_overrides(Some(PathBuf::from("/nonexistent.json")), None);
        assert!(load_graph(&config, None).is_err());
    }
}
