use crate::error::Result;
use crate::inventory::Inventory;
use crate::subset::stream_by_station;
use crate::types::{seconds_between, Stream, Trace};

/// Rotate each station's channels onto east, north and up
///
/// Channel orientation comes from the inventory. All of a station's traces are
/// placed on a common time axis spanning the earliest start to the latest end,
/// zero-padded where a trace has no samples. Stations whose traces cannot be
/// aligned on that axis are skipped.
pub fn to_enz(inventory: &Inventory, stream: &Stream) -> Result<Stream> {
    let mut rotated = Stream::default();

    for (key, station) in stream_by_station(stream) {
        let Some(first) = station.traces.first() else {
            continue;
        };
        let delta = first.stats.delta;

        let start_min = station
            .iter()
            .map(|tr| tr.stats.starttime)
            .min()
            .unwrap_or(first.stats.starttime);
        let end_max = station
            .iter()
            .map(|tr| tr.endtime())
            .max()
            .unwrap_or(first.stats.starttime);
        let npts = 1 + (seconds_between(start_min, end_max) / delta).round() as usize;

        let mut east = vec![0.0; npts];
        let mut north = vec![0.0; npts];
        let mut up = vec![0.0; npts];
        let mut aligned = true;

        for tr in &station {
            let channel = inventory.channel(&key, &tr.stats.channel)?;
            let offset = (seconds_between(start_min, tr.stats.starttime) / delta).round() as usize;
            if (tr.stats.delta - delta).abs() > delta * 1e-6 || offset + tr.npts() > npts {
                log::warn!("Mismatch in shape for channels of station {}", key);
                aligned = false;
                break;
            }

            let (sin_az, cos_az) = channel.azimuth.to_radians().sin_cos();
            let (sin_dip, cos_dip) = channel.dip.to_radians().sin_cos();
            for (i, x) in tr.data.iter().enumerate() {
                east[offset + i] += sin_az * cos_dip * x;
                north[offset + i] += cos_az * cos_dip * x;
                up[offset + i] += -sin_dip * x;
            }
        }
        if !aligned {
            continue;
        }

        for (component, data) in [('E', east), ('N', north), ('Z', up)] {
            let mut stats = first.stats.clone();
            stats.starttime = start_min;
            stats.channel = first.stats.channel_with_component(component);
            rotated.push(Trace::new(stats, data));
        }
    }

    Ok(rotated)
}

fn horizontal<'a>(station: &'a Stream, names: [char; 2]) -> Option<&'a Trace> {
    station
        .iter()
        .find(|tr| tr.stats.component().is_some_and(|c| names.contains(&c)))
}

/// Rotate horizontal east/north pairs to radial/transverse using each trace's back-azimuth
///
/// `R = -E sin(baz) - N cos(baz)`, `T = -E cos(baz) + N sin(baz)`. Vertical and
/// other non-horizontal traces pass through unchanged. Stations missing a
/// horizontal pair, a back-azimuth or a common time axis are skipped.
pub fn rotate_ne_rt(stream: &Stream) -> Result<Stream> {
    let mut rotated = Stream::default();

    for (key, station) in stream_by_station(stream) {
        let (Some(e), Some(n)) = (horizontal(&station, ['E', '1']), horizontal(&station, ['N', '2']))
        else {
            log::warn!("Station {} lacks a horizontal pair, skipped", key);
            continue;
        };
        let Some(baz) = e.stats.back_azimuth.or(n.stats.back_azimuth) else {
            log::warn!("Station {} has no back-azimuth, skipped", key);
            continue;
        };
        if e.npts() != n.npts() || e.stats.starttime != n.stats.starttime {
            log::warn!("Horizontal channels of station {} are not aligned, skipped", key);
            continue;
        }

        let (sin_b, cos_b) = baz.to_radians().sin_cos();
        let radial: Vec<f64> = e
            .data
            .iter()
            .zip(&n.data)
            .map(|(x, y)| -x * sin_b - y * cos_b)
            .collect();
        let transverse: Vec<f64> = e
            .data
            .iter()
            .zip(&n.data)
            .map(|(x, y)| -x * cos_b + y * sin_b)
            .collect();

        for tr in &station {
            let is_horizontal = tr
                .stats
                .component()
                .is_some_and(|c| matches!(c, 'E' | 'N' | '1' | '2'));
            if !is_horizontal {
                rotated.push(tr.clone());
            }
        }
        for (component, data) in [('R', radial), ('T', transverse)] {
            let mut stats = e.stats.clone();
            stats.channel = e.stats.channel_with_component(component);
            rotated.push(Trace::new(stats, data));
        }
    }

    Ok(rotated)
}
