use log::*;
use pano_core::CAMERA_HEIGHT;
use pano_equirect::DEFAULT_YAW_OFFSET;
use pano_geom::geojson::{load_footprints, save_footprints, FootprintFeature};
use pano_geom::FootprintIndex;
use pano_pointclouds::batch::{
    run_depth_map_batch, run_ray_cast_batch, save_status, BatchLayout, BatchOptions,
};
use pano_pointclouds::export::CaptureStatus;
use pano_pointclouds::{load_pose_table, read_planar_points, PoseTable};
use pano_snake::{refine_footprints, PointCloud2, SnakeSettings};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)]
    PointClouds(#[from] pano_pointclouds::Error),
    #[error(transparent)]
    Geometry(#[from] pano_geom::Error),
    #[error("unable to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, StructOpt)]
struct BatchOpt {
    /// The pose table, a CSV with the columns `FID`, `x`, `y` and `north_angle`.
    #[structopt(short, long, parse(from_os_str))]
    poses: PathBuf,
    /// Directory of `{fid}.png` semantic masks, pure white marks the pixels to reconstruct.
    #[structopt(short, long, parse(from_os_str))]
    masks: PathBuf,
    /// Directory the point files and `status.csv` are written to.
    #[structopt(short, long, parse(from_os_str))]
    output: PathBuf,
    /// The panorama column looking along the camera's forward direction.
    #[structopt(long, default_value = "1536")]
    yaw_offset: f64,
    /// The height of the camera above the ground reference.
    #[structopt(long, default_value = "2.15")]
    camera_height: f64,
    /// Also write a PLY cloud for every capture.
    #[structopt(long)]
    ply: bool,
}

impl BatchOpt {
    fn pose_table(&self) -> Result<PoseTable, Error> {
        let mut table = load_pose_table(&self.poses)?;
        if self.camera_height != CAMERA_HEIGHT {
            info!("using camera height {}", self.camera_height);
            for record in &mut table.captures {
                record.pose = record.pose.with_height(self.camera_height);
            }
        }
        Ok(table)
    }

    fn options(&self) -> BatchOptions {
        if self.yaw_offset != DEFAULT_YAW_OFFSET {
            info!("using yaw offset {}", self.yaw_offset);
        }
        BatchOptions {
            yaw_offset: self.yaw_offset,
            ply: self.ply,
        }
    }
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "panoproj",
    about = "Builds point clouds from street-level panoramas and refines building footprints"
)]
enum Opt {
    /// Reconstructs every capture from its depth raster.
    DepthMap {
        #[structopt(flatten)]
        batch: BatchOpt,
        /// Directory of `{fid}.png` 16-bit depth rasters (raw value / 256 is the depth).
        #[structopt(short, long, parse(from_os_str))]
        depth_maps: PathBuf,
    },
    /// Reconstructs every capture by casting rays against building footprints.
    RayCast {
        #[structopt(flatten)]
        batch: BatchOpt,
        /// Directory of `{fid}.jpg` color panoramas.
        #[structopt(short = "i", long, parse(from_os_str))]
        panoramas: PathBuf,
        /// GeoJSON building footprints in the coordinate system of the poses.
        #[structopt(short, long, parse(from_os_str))]
        footprints: PathBuf,
    },
    /// Refines building footprints against reconstructed point files.
    Refine {
        /// GeoJSON building footprints to refine.
        #[structopt(short, long, parse(from_os_str))]
        footprints: PathBuf,
        /// The file where solver settings are specified.
        ///
        /// This is in the format of `pano_snake::SnakeSettings`. Missing fields take defaults.
        #[structopt(short, long, default_value = "snake-settings.json")]
        settings: PathBuf,
        /// Points farther than this from a building's bounding box are ignored for it.
        #[structopt(long, default_value = "5.0")]
        margin: f64,
        /// Where to write the refined GeoJSON footprints.
        #[structopt(short, long, parse(from_os_str))]
        output: PathBuf,
        /// Point files written by `ray-cast` or `depth-map`.
        #[structopt(parse(from_os_str))]
        clouds: Vec<PathBuf>,
    },
}

/// Writes the status report, listing captures whose pose rows were rejected as missing.
fn finish(
    layout: &BatchLayout,
    table: &PoseTable,
    mut statuses: Vec<CaptureStatus>,
) -> Result<(), Error> {
    statuses.extend(table.rejected_statuses());
    save_status(layout, &statuses)?;
    info!("wrote {}", layout.status_output().display());
    Ok(())
}

fn depth_map(batch: BatchOpt, depth_maps: PathBuf) -> Result<(), Error> {
    let table = batch.pose_table()?;
    let layout = BatchLayout {
        panoramas: PathBuf::new(),
        masks: batch.masks.clone(),
        depth_maps,
        output: batch.output.clone(),
    };
    let statuses = run_depth_map_batch(&layout, &table.captures, &batch.options())?;
    finish(&layout, &table, statuses)
}

fn ray_cast(batch: BatchOpt, panoramas: PathBuf, footprints: &Path) -> Result<(), Error> {
    let table = batch.pose_table()?;
    let footprints: Vec<_> = load_footprints(footprints)?
        .into_iter()
        .flat_map(|feature| feature.footprints)
        .collect();
    let index = FootprintIndex::new(&footprints);
    info!(
        "indexed {} footprints with {} boundary segments",
        footprints.len(),
        index.len()
    );
    let layout = BatchLayout {
        panoramas,
        masks: batch.masks.clone(),
        depth_maps: PathBuf::new(),
        output: batch.output.clone(),
    };
    let statuses = run_ray_cast_batch(&layout, &table.captures, &index, &batch.options())?;
    finish(&layout, &table, statuses)
}

fn load_settings(path: &Path) -> SnakeSettings {
    let settings = File::open(path)
        .ok()
        .and_then(|file| serde_json::from_reader(BufReader::new(file)).ok());
    if settings.is_some() {
        info!("loaded settings from {}", path.display());
    } else {
        info!("used default settings");
    }
    settings.unwrap_or_default()
}

fn load_cloud(paths: &[PathBuf]) -> Result<PointCloud2, Error> {
    let mut points = vec![];
    for path in paths {
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        let before = points.len();
        points.extend(read_planar_points(BufReader::new(file))?);
        debug!("read {} points from {}", points.len() - before, path.display());
    }
    info!("loaded {} points from {} files", points.len(), paths.len());
    Ok(PointCloud2::new(points))
}

fn refine(
    footprints: &Path,
    settings: &Path,
    margin: f64,
    output: &Path,
    clouds: &[PathBuf],
) -> Result<(), Error> {
    let settings = load_settings(settings);
    let features = load_footprints(footprints)?;
    let cloud = load_cloud(clouds)?;
    let initial: Vec<_> = features
        .iter()
        .flat_map(|feature| feature.footprints.iter().cloned())
        .collect();
    let mut refined = refine_footprints(&initial, &cloud, &settings, margin).into_iter();

    let mut failed = 0usize;
    let features: Vec<FootprintFeature> = features
        .into_iter()
        .map(|feature| {
            let footprints = feature
                .footprints
                .into_iter()
                .zip(refined.by_ref())
                .map(|(footprint, refined)| {
                    refined.unwrap_or_else(|_| {
                        failed += 1;
                        footprint
                    })
                })
                .collect();
            FootprintFeature {
                footprints,
                ..feature
            }
        })
        .collect();
    if failed > 0 {
        warn!("{} footprints were written unrefined", failed);
    }
    save_footprints(output, &features)?;
    info!("wrote {} features to {}", features.len(), output.display());
    Ok(())
}

fn main() {
    pretty_env_logger::init_timed();
    let outcome = match Opt::from_args() {
        Opt::DepthMap { batch, depth_maps } => depth_map(batch, depth_maps),
        Opt::RayCast {
            batch,
            panoramas,
            footprints,
        } => ray_cast(batch, panoramas, &footprints),
        Opt::Refine {
            footprints,
            settings,
            margin,
            output,
            clouds,
        } => refine(&footprints, &settings, margin, &output, &clouds),
    };
    if let Err(e) = outcome {
        error!("{}", e);
        std::process::exit(1);
    }
}
