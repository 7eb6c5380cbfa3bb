use crate::{active_contour, Error, PointCloud2, Result, SnakeSettings};
use log::*;
use pano_core::BuildingFootprint;
use pano_geom::close_ring;
use rayon::prelude::*;

fn refine_one(
    building: usize,
    footprint: &BuildingFootprint,
    cloud: &PointCloud2,
    settings: &SnakeSettings,
    margin: f64,
) -> Result<BuildingFootprint> {
    let (min, max) = footprint
        .bounding_box()
        .ok_or(Error::Geometry(pano_geom::Error::DegenerateRing))?;
    let nearby = cloud.around(min, max, margin);
    let interiors = footprint
        .interiors
        .iter()
        .map(|ring| close_ring(ring))
        .collect();
    if nearby.is_empty() {
        info!("building {} has no points nearby, kept as is", building);
        let exterior = close_ring(&footprint.exterior);
        return Ok(BuildingFootprint::new(exterior).with_interiors(interiors));
    }
    let refined = active_contour(&footprint.exterior, &nearby, settings)?;
    info!(
        "building {} refined against {} points with {} control points",
        building,
        nearby.len(),
        refined.exterior.len() - 1
    );
    Ok(refined.with_interiors(interiors))
}

/// Refines every footprint against the cloud, one solver per building in parallel.
///
/// Each building only sees the cloud points within `margin` of its bounding box. The exterior
/// ring is refined and holes are kept as they are. Buildings with no points nearby come back
/// unchanged but closed. The results are in the order of `footprints`, and a building that
/// cannot be refined (an empty or zero length exterior) reports its error without affecting
/// the others.
pub fn refine_footprints(
    footprints: &[BuildingFootprint],
    cloud: &PointCloud2,
    settings: &SnakeSettings,
    margin: f64,
) -> Vec<Result<BuildingFootprint>> {
    info!(
        "refining {} footprints against {} points",
        footprints.len(),
        cloud.len()
    );
    footprints
        .par_iter()
        .enumerate()
        .map(|(building, footprint)| {
            let refined = refine_one(building, footprint, cloud, settings, margin);
            if let Err(e) = &refined {
                warn!("building {} not refined: {}", building, e);
            }
            refined
        })
        .collect()
}
