//! Parallel processing of whole directories of captures.
//!
//! Every capture of the pose table is an independent unit of work. Workers share nothing but
//! read-only inputs (the layout, and for ray casting the footprint index) and each writes only
//! its own output file. A capture that fails for any reason is logged and reported as
//! [`Status::Missing`](crate::export::Status::Missing) without affecting the others.

use crate::export::{self, CaptureStatus};
use crate::{
    masked_pixels, CaptureRecord, DepthMapLookup, DepthRaster, Error, PointCloudAssembler,
    Result,
};
use log::*;
use pano_core::WorldPoint;
use pano_equirect::{PanoramaFrame, DEFAULT_YAW_OFFSET};
use pano_geom::{FootprintIndex, RayCastAgainstFootprints};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Where the inputs of a batch are found and where its outputs go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLayout {
    /// Color panoramas, `{fid}.jpg`.
    pub panoramas: PathBuf,
    /// Semantic masks, `{fid}.png`.
    pub masks: PathBuf,
    /// Depth rasters, `{fid}.png`.
    pub depth_maps: PathBuf,
    /// Output directory, created when missing.
    pub output: PathBuf,
}

impl BatchLayout {
    pub fn panorama_path(&self, fid: u64) -> PathBuf {
        self.panoramas.join(format!("{}.jpg", fid))
    }

    pub fn mask_path(&self, fid: u64) -> PathBuf {
        self.masks.join(format!("{}.png", fid))
    }

    pub fn depth_map_path(&self, fid: u64) -> PathBuf {
        self.depth_maps.join(format!("{}.png", fid))
    }

    pub fn depth_map_output(&self, fid: u64) -> PathBuf {
        self.output.join(format!("{}_XYZ_originDepthMap.csv", fid))
    }

    pub fn ray_cast_output(&self, fid: u64) -> PathBuf {
        self.output.join(format!("{}.csv", fid))
    }

    pub fn ply_output(&self, fid: u64) -> PathBuf {
        self.output.join(format!("{}.ply", fid))
    }

    pub fn status_output(&self) -> PathBuf {
        self.output.join("status.csv")
    }
}

/// Options shared by every capture of a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchOptions {
    /// The panorama column facing the camera's forward direction.
    pub yaw_offset: f64,
    /// Also write a `{fid}.ply` cloud next to each point file.
    pub ply: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            yaw_offset: DEFAULT_YAW_OFFSET,
            ply: false,
        }
    }
}

fn require(paths: &[&Path]) -> Result<()> {
    match paths.iter().find(|path| !path.exists()) {
        Some(path) => Err(Error::MissingInput {
            path: path.to_path_buf(),
        }),
        None => Ok(()),
    }
}

fn save(path: &Path, write: impl FnOnce(&mut BufWriter<File>) -> Result<()>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer)?;
    writer.flush()?;
    Ok(())
}

fn save_ply(
    layout: &BatchLayout,
    options: &BatchOptions,
    fid: u64,
    points: &[WorldPoint],
) -> Result<()> {
    if options.ply {
        save(&layout.ply_output(fid), |writer| export::write_ply(writer, points))?;
    }
    Ok(())
}

fn report(fid: u64, outcome: Result<usize>) -> CaptureStatus {
    match outcome {
        Ok(num_points) => {
            info!("capture {} done with {} points", fid, num_points);
            CaptureStatus::done(fid, num_points)
        }
        Err(Error::MissingInput { path }) => {
            warn!("capture {} skipped, missing {}", fid, path.display());
            CaptureStatus::missing(fid)
        }
        Err(e) => {
            error!("capture {} failed: {}", fid, e);
            CaptureStatus::missing(fid)
        }
    }
}

fn finish(statuses: &[CaptureStatus]) {
    let done = statuses
        .iter()
        .filter(|status| status.status == export::Status::Done)
        .count();
    info!("{} of {} captures done", done, statuses.len());
}

fn depth_map_capture(
    layout: &BatchLayout,
    options: &BatchOptions,
    record: &CaptureRecord,
) -> Result<usize> {
    let mask_path = layout.mask_path(record.fid);
    let depth_path = layout.depth_map_path(record.fid);
    require(&[mask_path.as_path(), depth_path.as_path()])?;

    let mask = image::open(&mask_path)?.into_rgb8();
    let raster = DepthRaster::from_dynamic(&image::open(&depth_path)?)?;
    let frame = PanoramaFrame::new(mask.width(), mask.height(), options.yaw_offset)?;
    let assembler = PointCloudAssembler::new(frame, DepthMapLookup::new(raster));
    let (points, stats) = assembler.assemble(&record.pose, masked_pixels(&mask));
    if stats.dropped() > 0 {
        debug!(
            "capture {} dropped {} of {} masked pixels",
            record.fid,
            stats.dropped(),
            stats.masked
        );
    }

    save(&layout.depth_map_output(record.fid), |writer| {
        export::write_depth_map_csv(writer, &points)
    })?;
    save_ply(layout, options, record.fid, &points)?;
    Ok(points.len())
}

fn ray_cast_capture(
    layout: &BatchLayout,
    options: &BatchOptions,
    index: &FootprintIndex,
    record: &CaptureRecord,
) -> Result<usize> {
    let panorama_path = layout.panorama_path(record.fid);
    let mask_path = layout.mask_path(record.fid);
    require(&[panorama_path.as_path(), mask_path.as_path()])?;

    let panorama = image::open(&panorama_path)?.into_rgb8();
    let mask = image::open(&mask_path)?.into_rgb8();
    let frame = PanoramaFrame::new(panorama.width(), panorama.height(), options.yaw_offset)?;
    let resolver = RayCastAgainstFootprints::new(frame, index);
    let assembler = PointCloudAssembler::new(frame, resolver).with_colors(&panorama);
    let (points, stats) = assembler.assemble(&record.pose, masked_pixels(&mask));
    if stats.dropped() > 0 {
        debug!(
            "capture {} dropped {} of {} masked pixels",
            record.fid,
            stats.dropped(),
            stats.masked
        );
    }

    save(&layout.ray_cast_output(record.fid), |writer| {
        export::write_ray_cast_csv(writer, record.fid, &points)
    })?;
    save_ply(layout, options, record.fid, &points)?;
    Ok(points.len())
}

/// Builds a point cloud for every capture from its depth raster.
///
/// Requires `{fid}.png` in both the mask and depth map directories. Writes
/// `{fid}_XYZ_originDepthMap.csv` for each capture. The statuses come back in the order of
/// `captures`.
pub fn run_depth_map_batch(
    layout: &BatchLayout,
    captures: &[CaptureRecord],
    options: &BatchOptions,
) -> Result<Vec<CaptureStatus>> {
    fs::create_dir_all(&layout.output)?;
    info!("processing {} captures from depth maps", captures.len());
    let statuses: Vec<CaptureStatus> = captures
        .par_iter()
        .map(|record| report(record.fid, depth_map_capture(layout, options, record)))
        .collect();
    finish(&statuses);
    Ok(statuses)
}

/// Builds a colored point cloud for every capture by casting rays against footprints.
///
/// Requires `{fid}.jpg` in the panorama directory and `{fid}.png` in the mask directory.
/// Writes `{fid}.csv` for each capture. The index is only read, so all workers share it.
/// The statuses come back in the order of `captures`.
pub fn run_ray_cast_batch(
    layout: &BatchLayout,
    captures: &[CaptureRecord],
    index: &FootprintIndex,
    options: &BatchOptions,
) -> Result<Vec<CaptureStatus>> {
    fs::create_dir_all(&layout.output)?;
    if index.is_empty() {
        warn!("footprint index is empty, no pixel will get a depth estimate");
    }
    info!(
        "processing {} captures against {} footprint segments",
        captures.len(),
        index.len()
    );
    let statuses: Vec<CaptureStatus> = captures
        .par_iter()
        .map(|record| report(record.fid, ray_cast_capture(layout, options, index, record)))
        .collect();
    finish(&statuses);
    Ok(statuses)
}

/// Writes the status report of a batch to `status.csv` in the output directory.
pub fn save_status(layout: &BatchLayout, statuses: &[CaptureStatus]) -> Result<()> {
    save(&layout.status_output(), |writer| {
        export::write_status_csv(writer, statuses)
    })
}
