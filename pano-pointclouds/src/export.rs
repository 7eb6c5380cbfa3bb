//! Writers for the per-capture point files, PLY clouds and the batch status report.

use crate::Result;
use pano_core::nalgebra::Point2;
use pano_core::{Rgb, WorldPoint};
use ply_rs::{
    ply::{
        Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
        ScalarType,
    },
    writer::Writer,
};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Color given to uncolored points in PLY output.
const UNCOLORED: Rgb = Rgb([255, 255, 255]);

/// A point from the depth map path, keyed by its pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthMapRecord {
    #[serde(rename = "Pixel_X")]
    pub pixel_x: u32,
    #[serde(rename = "Pixel_Y")]
    pub pixel_y: u32,
    #[serde(rename = "Depth_Value")]
    pub depth: f64,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z")]
    pub z: f64,
}

impl From<&WorldPoint> for DepthMapRecord {
    fn from(point: &WorldPoint) -> Self {
        Self {
            pixel_x: point.pixel.w,
            pixel_y: point.pixel.h,
            depth: point.depth.get(),
            x: point.point.x,
            y: point.point.y,
            z: point.point.z,
        }
    }
}

/// A colored point from the ray casting path, keyed by its capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayCastRecord {
    #[serde(rename = "FID")]
    pub fid: u64,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z")]
    pub z: f64,
    #[serde(rename = "R")]
    pub r: Option<u8>,
    #[serde(rename = "G")]
    pub g: Option<u8>,
    #[serde(rename = "B")]
    pub b: Option<u8>,
    #[serde(rename = "Depth")]
    pub depth: f64,
}

impl RayCastRecord {
    pub fn new(fid: u64, point: &WorldPoint) -> Self {
        let [r, g, b] = match point.color {
            Some(Rgb([r, g, b])) => [Some(r), Some(g), Some(b)],
            None => [None; 3],
        };
        Self {
            fid,
            x: point.point.x,
            y: point.point.y,
            z: point.point.z,
            r,
            g,
            b,
            depth: point.depth.get(),
        }
    }
}

/// Outcome of one capture in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Done,
    Missing,
}

/// A row of the batch status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureStatus {
    #[serde(rename = "FID")]
    pub fid: u64,
    pub status: Status,
    pub num_points: Option<usize>,
}

impl CaptureStatus {
    pub fn done(fid: u64, num_points: usize) -> Self {
        Self {
            fid,
            status: Status::Done,
            num_points: Some(num_points),
        }
    }

    pub fn missing(fid: u64) -> Self {
        Self {
            fid,
            status: Status::Missing,
            num_points: None,
        }
    }
}

fn write_records<T>(writer: impl Write, records: impl IntoIterator<Item = T>) -> Result<()>
where
    T: Serialize,
{
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes depth map points as `Pixel_X,Pixel_Y,Depth_Value,X,Y,Z` rows.
pub fn write_depth_map_csv(writer: impl Write, points: &[WorldPoint]) -> Result<()> {
    write_records(writer, points.iter().map(DepthMapRecord::from))
}

/// Writes ray cast points of capture `fid` as `FID,X,Y,Z,R,G,B,Depth` rows.
pub fn write_ray_cast_csv(writer: impl Write, fid: u64, points: &[WorldPoint]) -> Result<()> {
    write_records(writer, points.iter().map(|point| RayCastRecord::new(fid, point)))
}

/// Writes the batch status report as `FID,status,num_points` rows.
pub fn write_status_csv(writer: impl Write, statuses: &[CaptureStatus]) -> Result<()> {
    write_records(writer, statuses)
}

#[derive(Debug, Deserialize)]
struct PlanarRow {
    #[serde(rename = "X")]
    x: f64,
    #[serde(rename = "Y")]
    y: f64,
}

/// Reads the ground-plane coordinates of a point file written by either path.
///
/// Only the `X` and `Y` columns are used, which is all footprint refinement needs.
pub fn read_planar_points(reader: impl Read) -> Result<Vec<Point2<f64>>> {
    csv::Reader::from_reader(reader)
        .deserialize::<PlanarRow>()
        .map(|row| {
            let PlanarRow { x, y } = row?;
            Ok(Point2::new(x, y))
        })
        .collect()
}

/// Writes points as an ASCII PLY cloud with a `vertex` element of `x y z red green blue`.
///
/// Points without color are written white.
pub fn write_ply(mut writer: impl Write, points: &[WorldPoint]) -> Result<()> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    ply.header
        .comments
        .push("Exported from pano-pointclouds".to_string());

    let mut point_element = ElementDef::new("vertex".to_string());
    for axis in ["x", "y", "z"] {
        point_element.properties.add(PropertyDef::new(
            axis.to_string(),
            PropertyType::Scalar(ScalarType::Double),
        ));
    }
    for channel in ["red", "green", "blue"] {
        point_element.properties.add(PropertyDef::new(
            channel.to_string(),
            PropertyType::Scalar(ScalarType::UChar),
        ));
    }
    ply.header.elements.add(point_element);

    let vertices = points
        .iter()
        .map(|point| {
            let Rgb([r, g, b]) = point.color.unwrap_or(UNCOLORED);
            let mut vertex = DefaultElement::new();
            vertex.insert("x".to_string(), Property::Double(point.point.x));
            vertex.insert("y".to_string(), Property::Double(point.point.y));
            vertex.insert("z".to_string(), Property::Double(point.point.z));
            vertex.insert("red".to_string(), Property::UChar(r));
            vertex.insert("green".to_string(), Property::UChar(g));
            vertex.insert("blue".to_string(), Property::UChar(b));
            vertex
        })
        .collect();
    ply.payload.insert("vertex".to_string(), vertices);

    Writer::new().write_ply(&mut writer, &mut ply)?;
    Ok(())
}
