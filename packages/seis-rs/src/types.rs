use crate::error::{Result, SeisError};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite "NET.STA" station identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StationKey {
    pub network: String,
    pub station: String,
}

impl StationKey {
    pub fn new(network: impl Into<String>, station: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            station: station.into(),
        }
    }

    /// Parse a "NET.STA" string
    pub fn parse(key: &str) -> Result<Self> {
        match key.split_once('.') {
            Some((network, station)) if !network.is_empty() && !station.is_empty() => {
                Ok(Self::new(network, station))
            }
            _ => Err(SeisError::ParseError(format!(
                "Invalid station key '{}': expected NET.STA",
                key
            ))),
        }
    }
}

impl fmt::Display for StationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.network, self.station)
    }
}

/// Per-trace header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStats {
    pub network: String,
    pub station: String,
    #[serde(default)]
    pub location: String,
    pub channel: String,
    pub starttime: DateTime<Utc>,
    /// Sample interval in seconds
    pub delta: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    /// Source-to-station azimuth in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_azimuth: Option<f64>,
    /// Epicentral distance in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snr: Option<f64>,
}

impl TraceStats {
    pub fn new(
        network: impl Into<String>,
        station: impl Into<String>,
        channel: impl Into<String>,
        starttime: DateTime<Utc>,
        delta: f64,
    ) -> Self {
        Self {
            network: network.into(),
            station: station.into(),
            location: String::new(),
            channel: channel.into(),
            starttime,
            delta,
            longitude: None,
            latitude: None,
            elevation: None,
            azimuth: None,
            back_azimuth: None,
            distance: None,
            snr: None,
        }
    }

    pub fn sampling_rate(&self) -> f64 {
        1.0 / self.delta
    }

    pub fn station_key(&self) -> StationKey {
        StationKey::new(self.network.clone(), self.station.clone())
    }

    /// Last character of the channel code (E, N, Z, 1, 2, ...)
    pub fn component(&self) -> Option<char> {
        self.channel.chars().last()
    }

    /// Channel code with its component character replaced
    pub fn channel_with_component(&self, component: char) -> String {
        let mut chars: Vec<char> = self.channel.chars().collect();
        chars.pop();
        chars.push(component);
        chars.into_iter().collect()
    }

    /// "NET.STA.LOC.CHA"
    pub fn id(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.network, self.station, self.location, self.channel
        )
    }
}

/// One channel of a seismic record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub stats: TraceStats,
    pub data: Vec<f64>,
}

impl Trace {
    pub fn new(stats: TraceStats, data: Vec<f64>) -> Self {
        Self { stats, data }
    }

    pub fn npts(&self) -> usize {
        self.data.len()
    }

    pub fn sampling_rate(&self) -> f64 {
        self.stats.sampling_rate()
    }

    /// Time of the last sample
    pub fn endtime(&self) -> DateTime<Utc> {
        let span = self.npts().saturating_sub(1) as f64 * self.stats.delta;
        offset_time(self.stats.starttime, span)
    }

    /// Sample times in seconds relative to the start time
    pub fn times(&self) -> Vec<f64> {
        (0..self.npts())
            .map(|i| i as f64 * self.stats.delta)
            .collect()
    }

    /// Copy of this trace's header carrying different samples
    pub fn with_data(&self, data: Vec<f64>) -> Self {
        Self {
            stats: self.stats.clone(),
            data,
        }
    }

    /// Reject empty, non-finite or badly sampled records
    pub fn validate(&self) -> Result<()> {
        if self.data.is_empty() {
            return Err(SeisError::EmptySignal);
        }
        if !(self.stats.delta.is_finite() && self.stats.delta > 0.0) {
            return Err(SeisError::InvalidParameter(format!(
                "Trace {} has invalid sample interval {}",
                self.stats.id(),
                self.stats.delta
            )));
        }
        if let Some(pos) = self.data.iter().position(|v| !v.is_finite()) {
            return Err(SeisError::InvalidParameter(format!(
                "Trace {} has a non-finite sample at index {}",
                self.stats.id(),
                pos
            )));
        }
        Ok(())
    }
}

/// Ordered record collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub traces: Vec<Trace>,
}

impl Stream {
    pub fn new(traces: Vec<Trace>) -> Self {
        Self { traces }
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn push(&mut self, trace: Trace) {
        self.traces.push(trace);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trace> {
        self.traces.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Trace> {
        self.traces.iter_mut()
    }

    /// Traces matching a network/station pair and, optionally, a component
    pub fn select(&self, key: &StationKey, component: Option<char>) -> Stream {
        self.traces
            .iter()
            .filter(|tr| tr.stats.network == key.network && tr.stats.station == key.station)
            .filter(|tr| component.map_or(true, |c| tr.stats.component() == Some(c)))
            .cloned()
            .collect()
    }
}

impl FromIterator<Trace> for Stream {
    fn from_iter<I: IntoIterator<Item = Trace>>(iter: I) -> Self {
        Self {
            traces: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Stream {
    type Item = Trace;
    type IntoIter = std::vec::IntoIter<Trace>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.into_iter()
    }
}

impl<'a> IntoIterator for &'a Stream {
    type Item = &'a Trace;
    type IntoIter = std::slice::Iter<'a, Trace>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.iter()
    }
}

/// Shift a timestamp by a (possibly fractional, possibly negative) number of seconds
pub fn offset_time(time: DateTime<Utc>, seconds: f64) -> DateTime<Utc> {
    time + Duration::nanoseconds((seconds * 1.0e9).round() as i64)
}

/// Signed number of seconds from `earlier` to `later`
pub fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let span = later - earlier;
    match span.num_nanoseconds() {
        Some(ns) => ns as f64 * 1.0e-9,
        None => span.num_milliseconds() as f64 * 1.0e-3,
    }
}

/// Parse an RFC 3339 timestamp, or a zone-less ISO timestamp taken as UTC
pub fn parse_utc(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(SeisError::ParseError(format!(
        "Cannot parse '{}' as a UTC timestamp",
        value
    )))
}
