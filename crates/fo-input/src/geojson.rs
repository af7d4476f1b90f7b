//! Zone boundaries from an Uber Movement GeoJSON file.
//!
//! The file is a `FeatureCollection` with one feature per zone.  The zone
//! key is the `MOVEMENT_ID` property (a string or a number), and the
//! geometry is a `Polygon` or a `MultiPolygon` whose positions are
//! `[longitude, latitude]` pairs.
//!
//! ```json
//! {"type": "FeatureCollection", "features": [
//!   {"type": "Feature",
//!    "properties": {"MOVEMENT_ID": "1"},
//!    "geometry": {"type": "Polygon",
//!                 "coordinates": [[[4.89, 52.37], [4.90, 52.37], [4.90, 52.38]]]}}
//! ]}
//! ```
//!
//! Every position of every ring is kept as a boundary point; the zone
//! centroid is their mean (see [`ZoneTable::from_polygons`]).

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use fo_core::GeoPoint;

use crate::{InputError, InputResult, ZoneTable};

// ── Document model ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: Properties,
    geometry:   Geometry,
}

#[derive(Deserialize)]
struct Properties {
    #[serde(rename = "MOVEMENT_ID", alias = "movement_id")]
    movement_id: MovementId,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MovementId {
    Number(u32),
    Text(String),
}

#[derive(Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum Geometry {
    Polygon(Vec<Vec<Vec<f64>>>),
    MultiPolygon(Vec<Vec<Vec<Vec<f64>>>>),
}

impl MovementId {
    fn key(&self) -> InputResult<u32> {
        match self {
            MovementId::Number(n) => Ok(*n),
            MovementId::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| InputError::Parse(format!("MOVEMENT_ID {s:?} is not a zone key"))),
        }
    }
}

impl Geometry {
    fn rings(&self) -> Box<dyn Iterator<Item = &Vec<Vec<f64>>> + '_> {
        match self {
            Geometry::Polygon(rings) => Box::new(rings.iter()),
            Geometry::MultiPolygon(polys) => Box::new(polys.iter().flatten()),
        }
    }
}

fn position(key: u32, pos: &[f64]) -> InputResult<GeoPoint> {
    match *pos {
        [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Ok(GeoPoint::new(lat, lon)),
        _ => Err(InputError::Parse(format!("zone {key} has an invalid position {pos:?}"))),
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Boundary points of every zone in a GeoJSON document, keyed by zone key.
///
/// Features sharing a `MOVEMENT_ID` contribute to the same zone.
pub fn read_zone_boundaries<R: Read>(reader: R) -> InputResult<HashMap<u32, Vec<GeoPoint>>> {
    let doc: FeatureCollection =
        serde_json::from_reader(reader).map_err(|e| InputError::Parse(e.to_string()))?;

    let mut boundaries: HashMap<u32, Vec<GeoPoint>> = HashMap::new();
    for feature in &doc.features {
        let key = feature.properties.movement_id.key()?;
        let points = boundaries.entry(key).or_default();
        for ring in feature.geometry.rings() {
            for pos in ring {
                points.push(position(key, pos)?);
            }
        }
    }
    Ok(boundaries)
}

/// Load the zone table from a GeoJSON boundary file.
pub fn load_zones_geojson(path: &Path) -> InputResult<ZoneTable> {
    let file = std::fs::File::open(path).map_err(InputError::Io)?;
    load_zones_geojson_reader(file)
}

/// Like [`load_zones_geojson`] but accepts any `Read` source.
pub fn load_zones_geojson_reader<R: Read>(reader: R) -> InputResult<ZoneTable> {
    ZoneTable::from_polygons(&read_zone_boundaries(reader)?)
}
