use geo::{Coord, LineString};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use super::{RouteMetrics, RoutePath, WeightKind};
use crate::Error;
use crate::model::CompactGraph;

/// Renders a route as one `LineString` feature.
///
/// Edge polylines are concatenated, skipping the first point of an edge
/// when it repeats the last point of the previous one.
pub fn route_to_geojson(
    graph: &CompactGraph,
    path: &RoutePath,
    kind: WeightKind,
) -> Result<Feature, Error> {
    let mut coords: Vec<Coord<f64>> = Vec::new();
    for &edge in &path.edges {
        for coord in graph.edge_coords(edge) {
            if coords.last() != Some(&coord) {
                coords.push(coord);
            }
        }
    }
    // A single-node route still renders as a (degenerate) line
    if coords.is_empty()
        && let Some(&node) = path.nodes.first()
        && let Some(idx) = graph.node_index(node)
    {
        let point = graph.node_point(idx);
        coords = vec![point.0, point.0];
    }

    let metrics = RouteMetrics::from_path(graph, path);
    let geometry = Geometry::new(GeoJsonValue::from(&LineString::new(coords)));
    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "type": kind.as_str(),
            "length": metrics.distance_m,
            "travel_time": metrics.travel_time_s,
            "safety_score": metrics.safety_score,
            "cost": path.cost,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

/// Every edge with its scoring columns, for map display
pub fn graph_to_geojson(graph: &CompactGraph) -> Result<FeatureCollection, Error> {
    let topology = graph.topology();
    let scores = graph.scores();

    let features = (0..graph.edge_count())
        .map(|edge| {
            let key = graph.edge_key(edge);
            let geometry = Geometry::new(GeoJsonValue::from(&graph.edge_geometry(edge)));
            let value = json!({
                "type": "Feature",
                "geometry": geometry,
                "properties": {
                    "u": key.source,
                    "v": key.target,
                    "key": key.key,
                    "length": topology.length[edge],
                    "travel_time": topology.travel_time[edge],
                    "speed_kph": topology.speed_kph[edge],
                    "highway": topology.road_class[edge],
                    "pedestrian_friendliness": topology.road_class[edge].pedestrian_friendliness(),
                    "land_cover": topology.land_cover[edge].label(),
                    "is_footpath": topology.is_footpath[edge],
                    "light_count": topology.light_count[edge],
                    "darkness_score": topology.darkness[edge],
                    "sidewalk_score": topology.sidewalk[edge],
                    "business_score": scores.business[edge],
                    "business_count": scores.business_count[edge],
                    "land_risk": topology.land_risk[edge],
                    "speed_risk": topology.speed_risk[edge],
                    "danger_score": scores.danger[edge],
                    "safety_score": 100.0 - scores.danger[edge],
                    "weight_fastest": scores.weight_fastest[edge],
                    "weight_safest": scores.weight_safest[edge],
                }
            });
            serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    })
}

/// Serializes a feature collection to a JSON string
pub fn to_geojson_string(collection: &FeatureCollection) -> Result<String, Error> {
    serde_json::to_string(collection).map_err(|e| Error::GeoJsonError(e.to_string()))
}
