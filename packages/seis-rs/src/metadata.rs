use crate::error::{Result, SeisError};
use crate::inventory::{Inventory, StationIndex};
use crate::projection::UtmProjection;
use crate::types::{StationKey, Stream};
use serde::Serialize;
use std::collections::BTreeSet;

/// Copy station longitude, latitude and elevation into every trace header
pub fn add_location(index: &StationIndex, stream: &mut Stream) -> Result<()> {
    for trace in stream.iter_mut() {
        let station = index.get(&trace.stats.station_key())?;
        trace.stats.longitude = Some(station.longitude);
        trace.stats.latitude = Some(station.latitude);
        trace.stats.elevation = Some(station.elevation);
    }
    Ok(())
}

/// Set epicentral distance, azimuth and back-azimuth from projected coordinates
///
/// `epicenter` is (longitude, latitude) in degrees. Traces must already carry
/// coordinates, see [`add_location`].
pub fn add_azimuth_distance(
    stream: &mut Stream,
    epicenter: (f64, f64),
    projection: &UtmProjection,
) -> Result<()> {
    let (ex, ey) = projection.project(epicenter.0, epicenter.1);

    for trace in stream.iter_mut() {
        let (lon, lat) = match (trace.stats.longitude, trace.stats.latitude) {
            (Some(lon), Some(lat)) => (lon, lat),
            _ => {
                return Err(SeisError::InvalidParameter(format!(
                    "trace {} has no station coordinates",
                    trace.stats.id()
                )))
            }
        };
        let (sx, sy) = projection.project(lon, lat);
        let dx = sx - ex;
        let dy = sy - ey;

        let azimuth = dx.atan2(dy).to_degrees().rem_euclid(360.0);
        trace.stats.distance = Some(dx.hypot(dy));
        trace.stats.azimuth = Some(azimuth);
        trace.stats.back_azimuth = Some((azimuth + 180.0).rem_euclid(360.0));
    }
    Ok(())
}

/// Inventory stations with and without traces in a stream
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StationCoverage {
    /// In the inventory, no traces
    pub missing: Vec<StationKey>,
    /// Present in the stream
    pub found: Vec<StationKey>,
}

pub fn missing(inventory: &Inventory, stream: &Stream) -> StationCoverage {
    let recorded: BTreeSet<StationKey> = stream.iter().map(|tr| tr.stats.station_key()).collect();
    let missing: BTreeSet<StationKey> = inventory
        .stations()
        .map(|(key, _)| key)
        .filter(|key| !recorded.contains(key))
        .collect();

    log::info!(
        "{} inventory stations without traces, {} stations recorded",
        missing.len(),
        recorded.len()
    );
    StationCoverage {
        missing: missing.into_iter().collect(),
        found: recorded.into_iter().collect(),
    }
}
