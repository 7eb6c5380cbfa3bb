//! Reading and writing building footprints as GeoJSON.
//!
//! Only the subset of GeoJSON that vector building layers use is supported: a
//! `FeatureCollection` whose features carry `Polygon` or `MultiPolygon` geometries. Every
//! polygon becomes a footprint, and the footprints of one feature stay together so that a
//! `MultiPolygon` is written back as one. Features with any other geometry are skipped.

use crate::{close_ring, Error, Result};
use log::*;
use pano_core::nalgebra::Point2;
use pano_core::BuildingFootprint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// The footprints of one GeoJSON feature together with its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct FootprintFeature {
    /// One footprint per polygon, in the order of the feature's geometry.
    pub footprints: Vec<BuildingFootprint>,
    pub properties: Value,
    /// Whether the feature is written as a `MultiPolygon`. Features holding anything but
    /// exactly one footprint always are.
    pub multi: bool,
}

impl FootprintFeature {
    /// A `Polygon` feature without properties.
    pub fn new(footprint: BuildingFootprint) -> Self {
        Self {
            footprints: vec![footprint],
            properties: Value::Null,
            multi: false,
        }
    }

    /// A `MultiPolygon` feature without properties.
    pub fn multi(footprints: Vec<BuildingFootprint>) -> Self {
        Self {
            footprints,
            properties: Value::Null,
            multi: true,
        }
    }
}

type Coordinates = Vec<Vec<f64>>;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Coordinates>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Coordinates>>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum Feature {
    Feature {
        geometry: Option<Geometry>,
        #[serde(default)]
        properties: Value,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum Document {
    FeatureCollection { features: Vec<Feature> },
}

fn ring_from_coordinates(coordinates: &[Vec<f64>]) -> Result<Vec<Point2<f64>>> {
    coordinates
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Point2::new(*x, *y)),
            other => Err(Error::InvalidCoordinate(other.len())),
        })
        .collect()
}

fn ring_to_coordinates(ring: &[Point2<f64>]) -> Coordinates {
    close_ring(ring).iter().map(|p| vec![p.x, p.y]).collect()
}

fn footprint_from_rings(rings: &[Coordinates]) -> Result<Option<BuildingFootprint>> {
    let mut rings = rings.iter().map(|ring| ring_from_coordinates(ring));
    let exterior = match rings.next() {
        Some(exterior) => exterior?,
        None => return Ok(None),
    };
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Some(BuildingFootprint::new(exterior).with_interiors(interiors)))
}

fn footprint_to_rings(footprint: &BuildingFootprint) -> Vec<Coordinates> {
    footprint.rings().map(ring_to_coordinates).collect()
}

/// Reads the polygon features of a GeoJSON `FeatureCollection`.
pub fn read_footprints(reader: impl Read) -> Result<Vec<FootprintFeature>> {
    let Document::FeatureCollection { features } = serde_json::from_reader(reader)?;
    let mut footprint_features = Vec::with_capacity(features.len());
    let mut skipped = 0usize;
    for Feature::Feature {
        geometry,
        properties,
    } in features
    {
        let (polygons, multi) = match geometry {
            Some(Geometry::Polygon { coordinates }) => (vec![coordinates], false),
            Some(Geometry::MultiPolygon { coordinates }) => (coordinates, true),
            Some(Geometry::Unsupported) | None => {
                skipped += 1;
                continue;
            }
        };
        let mut footprints = Vec::with_capacity(polygons.len());
        for rings in &polygons {
            footprints.extend(footprint_from_rings(rings)?);
        }
        if footprints.is_empty() {
            skipped += 1;
            continue;
        }
        footprint_features.push(FootprintFeature {
            footprints,
            properties,
            multi,
        });
    }
    if skipped > 0 {
        warn!("skipped {} features without polygon geometry", skipped);
    }
    info!(
        "read {} building footprints from {} features",
        footprint_features
            .iter()
            .map(|feature| feature.footprints.len())
            .sum::<usize>(),
        footprint_features.len()
    );
    Ok(footprint_features)
}

/// Writes footprint features as a GeoJSON `FeatureCollection` with closed rings.
pub fn write_footprints(writer: impl Write, features: &[FootprintFeature]) -> Result<()> {
    let features = features
        .iter()
        .map(|feature| {
            let geometry = match feature.footprints.as_slice() {
                [footprint] if !feature.multi => Geometry::Polygon {
                    coordinates: footprint_to_rings(footprint),
                },
                footprints => Geometry::MultiPolygon {
                    coordinates: footprints.iter().map(footprint_to_rings).collect(),
                },
            };
            Feature::Feature {
                geometry: Some(geometry),
                properties: feature.properties.clone(),
            }
        })
        .collect();
    serde_json::to_writer(writer, &Document::FeatureCollection { features })?;
    Ok(())
}

/// Reads footprints from a GeoJSON file.
pub fn load_footprints(path: impl AsRef<Path>) -> Result<Vec<FootprintFeature>> {
    read_footprints(BufReader::new(File::open(path)?))
}

/// Writes footprints to a GeoJSON file, replacing it if it exists.
pub fn save_footprints(path: impl AsRef<Path>, features: &[FootprintFeature]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_footprints(&mut writer, features)?;
    writer.flush()?;
    Ok(())
}
