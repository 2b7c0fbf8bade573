//! Command line definitions

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use saferoute_core::{NodeId, WeightKind};

/// Fastest and safest walking routes over a scored street graph
#[derive(Parser, Debug)]
#[command(name = "saferoute", version)]
#[command(after_help = "\
Examples:
  saferoute route --from 101 --to 202
  saferoute route --from -78.6400,35.7800 --to -78.6382,35.7871 --kind safest --geojson
  saferoute --departure 2024-03-14T23:00 route --from 101 --to 202
  saferoute summary --preview 5
  saferoute geojson -o graph.geojson")]
pub struct Cli {
    /// TOML config; missing file means defaults
    #[arg(long, short = 'c', global = true, default_value = "saferoute.toml")]
    pub config: PathBuf,

    /// Attributed street graph JSON (overrides [data].graph)
    #[arg(long, global = true)]
    pub graph: Option<PathBuf>,

    /// Business list JSON (overrides [data].businesses)
    #[arg(long, global = true)]
    pub businesses: Option<PathBuf>,

    /// Rescore for this departure time (RFC 3339, or naive local time)
    #[arg(long, global = true)]
    pub departure: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Route between two node ids or lon,lat pairs
    Route {
        #[arg(long, allow_hyphen_values = true)]
        from: Endpoint,

        #[arg(long, allow_hyphen_values = true)]
        to: Endpoint,

        #[arg(long, value_enum, default_value_t = RouteKind::Both)]
        kind: RouteKind,

        /// Print a GeoJSON FeatureCollection instead of metrics
        #[arg(long)]
        geojson: bool,
    },

    /// Node/edge counts, mean danger and a few sample edges
    Summary {
        #[arg(long, default_value_t = 10)]
        preview: usize,
    },

    /// Every scored edge as GeoJSON
    Geojson {
        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Fastest,
    Safest,
    Both,
}

impl RouteKind {
    pub fn weight_kinds(self) -> &'static [WeightKind] {
        match self {
            Self::Fastest => &[WeightKind::Fastest],
            Self::Safest => &[WeightKind::Safest],
            Self::Both => &[WeightKind::Fastest, WeightKind::Safest],
        }
    }
}

/// A route endpoint: a node id, or coordinates snapped to the nearest node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    Node(NodeId),
    Coordinates { lon: f64, lat: f64 },
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((lon, lat)) = s.split_once(',') else {
            return s
                .parse()
                .map(Endpoint::Node)
                .map_err(|_| format!("'{s}' is neither a node id nor lon,lat"));
        };
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| format!("'{lon}' is not a valid longitude"))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("'{lat}' is not a valid latitude"))?;
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(format!("{lon},{lat} is out of range"));
        }
        Ok(Endpoint::Coordinates { lon, lat })
    }
}
