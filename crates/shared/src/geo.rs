use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::Value;

/// One administrative region's boundary, in (longitude, latitude) degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFeature {
    pub geometry_id: String,
    pub polygons: MultiPolygon<f64>,
}

impl RegionFeature {
    pub fn new(geometry_id: &str, polygons: MultiPolygon<f64>) -> Self {
        RegionFeature {
            geometry_id: geometry_id.to_string(),
            polygons,
        }
    }

    /// Iterate every ring (exteriors and holes) of every polygon.
    pub fn rings(&self) -> impl Iterator<Item = &LineString<f64>> {
        self.polygons
            .0
            .iter()
            .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors().iter()))
    }
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<FeatureProperties>,
    #[serde(default)]
    geometry: Option<Value>,
}

#[derive(Deserialize, Default)]
struct FeatureProperties {
    #[serde(rename = "NAME_1")]
    name_1: Option<String>,
    name: Option<String>,
}

/// Parse a GeoJSON FeatureCollection into region features.
///
/// Individual features that lack an id or carry unsupported geometry are
/// skipped; only a malformed document is an error.
pub fn parse_feature_collection(json: &str) -> Result<Vec<RegionFeature>, String> {
    let collection: FeatureCollection = serde_json::from_str(json)
        .map_err(|e| format!("Failed to parse region geometry: {}", e))?;

    let mut features = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let props = feature.properties.unwrap_or_default();
        let Some(geometry_id) = props.name_1.or(props.name) else {
            tracing::warn!(index, "Skipping region feature without a name");
            continue;
        };
        let Some(geometry) = feature.geometry else {
            tracing::warn!(geometry_id = %geometry_id, "Skipping region feature without geometry");
            continue;
        };
        match parse_geometry(&geometry) {
            Some(polygons) => features.push(RegionFeature {
                geometry_id,
                polygons,
            }),
            None => {
                tracing::warn!(geometry_id = %geometry_id, "Skipping region feature with unsupported geometry");
            }
        }
    }

    tracing::debug!(features = features.len(), "Parsed region geometry");
    Ok(features)
}

fn parse_geometry(geometry: &Value) -> Option<MultiPolygon<f64>> {
    let coordinates = geometry.get("coordinates")?;
    match geometry.get("type")?.as_str()? {
        "Polygon" => Some(MultiPolygon(vec![parse_polygon(coordinates)?])),
        "MultiPolygon" => {
            let polygons = coordinates
                .as_array()?
                .iter()
                .map(parse_polygon)
                .collect::<Option<Vec<_>>>()?;
            Some(MultiPolygon(polygons))
        }
        _ => None,
    }
}

fn parse_polygon(rings: &Value) -> Option<Polygon<f64>> {
    let mut rings = rings
        .as_array()?
        .iter()
        .map(parse_ring)
        .collect::<Option<Vec<_>>>()?
        .into_iter();
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

fn parse_ring(points: &Value) -> Option<LineString<f64>> {
    points
        .as_array()?
        .iter()
        .map(|p| {
            let p = p.as_array()?;
            Some(Coord {
                x: p.first()?.as_f64()?,
                y: p.get(1)?.as_f64()?,
            })
        })
        .collect::<Option<Vec<_>>>()
        .map(LineString::new)
}

/// Longitude/latitude extent of the whole dataset as (min_lon, min_lat, max_lon, max_lat).
pub fn dataset_bounds(features: &[RegionFeature]) -> Option<(f64, f64, f64, f64)> {
    let mut coords = features
        .iter()
        .flat_map(|f| f.rings())
        .flat_map(|ring| ring.0.iter());
    let first = coords.next()?;
    Some(coords.fold(
        (first.x, first.y, first.x, first.y),
        |(min_x, min_y, max_x, max_y), c| {
            (min_x.min(c.x), min_y.min(c.y), max_x.max(c.x), max_y.max(c.y))
        },
    ))
}
