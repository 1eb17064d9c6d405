//! Geometry adapter: AOI `location` field to polygon / WKT / geo-shape.
//!
//! AOI documents store their footprint in one of two shapes:
//! - a GeoJSON-like object `{"type": "polygon", "coordinates": [[[x, y], ...]]}`
//! - a bare coordinate list, either one ring `[[x, y], ...]` or a ring list
//!   `[[[x, y], ...], ...]`
//!
//! Either may arrive JSON-encoded inside a string. The input is classified
//! once into [`GeometryInput`] (full shape first, coordinate list as the
//! fallback) and then resolved into a [`Polygon`].

use serde::Deserialize;
use serde_json::{json, Value};

use crate::ReconcileError;

/// Coordinates as they appear on the wire: one ring, or a list of rings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CoordinateList {
    Ring(Vec<Vec<f64>>),
    Rings(Vec<Vec<Vec<f64>>>),
}

/// GeoJSON-like object carrying a `coordinates` member.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Shape {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub coordinates: CoordinateList,
}

/// The two accepted geometry encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryInput {
    FullShape(Shape),
    CoordinateList(CoordinateList),
}

impl GeometryInput {
    /// Classify a raw `location` value.
    pub fn from_value(raw: &Value) -> Result<Self, ReconcileError> {
        if let Value::String(s) = raw {
            let decoded = decode_geometry_string(s)?;
            // One level of string encoding only.
            if decoded.is_string() {
                return Err(ReconcileError::InvalidGeometry(
                    "geometry string decodes to another string".to_string(),
                ));
            }
            return Self::from_value(&decoded);
        }

        if let Ok(shape) = Shape::deserialize(raw) {
            return Ok(GeometryInput::FullShape(shape));
        }

        CoordinateList::deserialize(raw)
            .map(GeometryInput::CoordinateList)
            .map_err(|_| ReconcileError::InvalidGeometry(format!("unrecognised geometry: {raw}")))
    }

    /// Resolve into a validated polygon.
    pub fn to_polygon(&self) -> Result<Polygon, ReconcileError> {
        let coords = match self {
            GeometryInput::FullShape(shape) => {
                if let Some(kind) = &shape.kind {
                    if !kind.eq_ignore_ascii_case("polygon") {
                        return Err(ReconcileError::InvalidGeometry(format!(
                            "unsupported geometry type '{kind}'"
                        )));
                    }
                }
                &shape.coordinates
            }
            GeometryInput::CoordinateList(list) => list,
        };

        match coords {
            CoordinateList::Ring(ring) => Polygon::from_rings(std::slice::from_ref(ring)),
            CoordinateList::Rings(rings) => Polygon::from_rings(rings),
        }
    }
}

/// JSON first; some AOI documents were written with single-quoted keys and
/// strings (`{'type': 'polygon', ...}`), so that form is read as a fallback.
fn decode_geometry_string(s: &str) -> Result<Value, ReconcileError> {
    match serde_json::from_str(s) {
        Ok(v) => Ok(v),
        Err(json_err) => serde_json::from_str(&s.replace('\'', "\"")).map_err(|_| {
            ReconcileError::InvalidGeometry(format!("unable to parse geometry string: {json_err}"))
        }),
    }
}

/// Closed-ring polygon: one exterior ring plus optional holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Vec<(f64, f64)>,
    pub interiors: Vec<Vec<(f64, f64)>>,
}

impl Polygon {
    /// Parse and validate straight from an AOI `location` value.
    pub fn from_location(raw: &Value) -> Result<Self, ReconcileError> {
        GeometryInput::from_value(raw)?.to_polygon()
    }

    fn from_rings(rings: &[Vec<Vec<f64>>]) -> Result<Self, ReconcileError> {
        let (first, rest) = rings
            .split_first()
            .ok_or_else(|| ReconcileError::InvalidGeometry("polygon has no rings".to_string()))?;

        let exterior = close_ring(first)?;
        let interiors = rest.iter().map(|r| close_ring(r)).collect::<Result<_, _>>()?;
        Ok(Self {
            exterior,
            interiors,
        })
    }

    /// `MULTIPOLYGON (((x y, ...), (hole ...)))` for catalog footprint clauses.
    pub fn to_wkt(&self) -> String {
        let rings: Vec<String> = std::iter::once(&self.exterior)
            .chain(self.interiors.iter())
            .map(|ring| {
                let pts: Vec<String> = ring.iter().map(|(x, y)| format!("{x} {y}")).collect();
                format!("({})", pts.join(", "))
            })
            .collect();
        format!("MULTIPOLYGON (({}))", rings.join(", "))
    }

    /// GeoJSON polygon object for index `geo_shape` filters.
    pub fn to_geo_shape(&self) -> Value {
        let ring_json = |ring: &Vec<(f64, f64)>| -> Value {
            Value::Array(ring.iter().map(|(x, y)| json!([x, y])).collect())
        };
        let rings: Vec<Value> = std::iter::once(&self.exterior)
            .chain(self.interiors.iter())
            .map(ring_json)
            .collect();
        json!({ "type": "polygon", "coordinates": rings })
    }
}

fn close_ring(raw: &[Vec<f64>]) -> Result<Vec<(f64, f64)>, ReconcileError> {
    let mut ring: Vec<(f64, f64)> = Vec::with_capacity(raw.len() + 1);
    for pos in raw {
        match pos.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => ring.push((*x, *y)),
            _ => {
                return Err(ReconcileError::InvalidGeometry(format!(
                    "invalid position {pos:?}"
                )))
            }
        }
    }

    let is_closed = ring.len() > 1 && ring.first() == ring.last();
    let distinct = if is_closed { ring.len() - 1 } else { ring.len() };
    if distinct < 3 {
        return Err(ReconcileError::InvalidGeometry(format!(
            "ring needs at least 3 positions, got {distinct}"
        )));
    }
    if !is_closed {
        ring.push(ring[0]);
    }
    Ok(ring)
}
