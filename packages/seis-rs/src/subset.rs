use crate::error::{Result, SeisError};
use crate::types::{StationKey, Stream, Trace};
use std::collections::BTreeMap;

/// Split a stream into per-station streams, keeping trace order within each
pub fn stream_by_station(stream: &Stream) -> BTreeMap<StationKey, Stream> {
    let mut stations: BTreeMap<StationKey, Stream> = BTreeMap::new();
    for trace in stream {
        stations
            .entry(trace.stats.station_key())
            .or_default()
            .push(trace.clone());
    }
    stations
}

/// Per-station streams, dropping stations without exactly `expected` traces
pub fn group_complete_stations(stream: &Stream, expected: usize) -> BTreeMap<StationKey, Stream> {
    let mut stations = stream_by_station(stream);
    stations.retain(|key, traces| {
        if traces.len() == expected {
            true
        } else {
            log::warn!(
                "Skipping station '{}' with {} traces, expected {}",
                key,
                traces.len(),
                expected
            );
            false
        }
    });
    stations
}

/// Traces whose azimuth lies in `[minimum, maximum]`
///
/// A range with `maximum < minimum` wraps through north. Traces without an
/// azimuth are dropped.
pub fn select_azimuth(stream: &Stream, minimum: f64, maximum: f64) -> Stream {
    stream
        .iter()
        .filter(|tr| match tr.stats.azimuth {
            Some(az) if maximum > minimum => az >= minimum && az <= maximum,
            Some(az) => az >= minimum || az <= maximum,
            None => false,
        })
        .cloned()
        .collect()
}

/// Traces of one component; E, N and Z also match the numbered 1, 2 and 3
pub fn select_component(stream: &Stream, component: char) -> Result<Stream> {
    let accepted: &[char] = match component.to_ascii_uppercase() {
        'E' | '1' => &['E', '1'],
        'N' | '2' => &['N', '2'],
        'Z' | '3' => &['Z', '3'],
        'R' => &['R'],
        'T' => &['T'],
        other => {
            return Err(SeisError::InvalidParameter(format!(
                "Unknown component '{}'",
                other
            )))
        }
    };
    Ok(stream
        .iter()
        .filter(|tr| tr.stats.component().is_some_and(|c| accepted.contains(&c)))
        .cloned()
        .collect())
}

/// Match observed traces to synthetics by network, station and component
///
/// Observed traces with zero or several candidates are left out.
pub fn pair_observed_synthetic<'a>(
    observed: &'a Stream,
    synthetic: &'a Stream,
) -> Vec<(&'a Trace, &'a Trace)> {
    if observed.len() != synthetic.len() {
        log::warn!(
            "Number of observed traces ({}) does not match number of synthetic traces ({})",
            observed.len(),
            synthetic.len()
        );
    }

    let mut pairs = Vec::new();
    for obs in observed {
        let candidates: Vec<&Trace> = synthetic
            .iter()
            .filter(|syn| {
                syn.stats.network == obs.stats.network
                    && syn.stats.station == obs.stats.station
                    && syn.stats.component() == obs.stats.component()
            })
            .collect();
        match candidates.as_slice() {
            [syn] => pairs.push((obs, *syn)),
            _ => log::warn!(
                "No unique synthetic for trace {} ({} candidates)",
                obs.stats.id(),
                candidates.len()
            ),
        }
    }
    pairs
}
