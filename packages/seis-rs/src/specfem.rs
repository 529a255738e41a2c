//! SPECFEM3D ASCII input and output files
//!
//! - `STATIONS`: `STA NET LAT LON ELEV BURIAL` per line
//! - seismograms: `STA.NET.<channel>.<sem?>` two-column (time, value) text
//! - `CMTSOLUTION`: point-source moment tensor description

use crate::error::{Result, SeisError};
use crate::event::Event;
use crate::inventory::{Inventory, Station};
use crate::momenttensor::mw;
use crate::parser::read_columns;
use crate::types::{offset_time, Stream, Trace, TraceStats};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const COMPONENTS: [char; 3] = ['E', 'N', 'Z'];

/// Quantity stored in a seismogram file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Displacement,
    Velocity,
    Acceleration,
}

impl DataType {
    /// Accepts any name starting with `disp`, `vel` or `acc`
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        if lower.starts_with("disp") {
            Ok(Self::Displacement)
        } else if lower.starts_with("vel") {
            Ok(Self::Velocity)
        } else if lower.starts_with("acc") {
            Ok(Self::Acceleration)
        } else {
            Err(SeisError::UnknownDataType(name.to_string()))
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Displacement => "semd",
            Self::Velocity => "semv",
            Self::Acceleration => "sema",
        }
    }
}

impl FromStr for DataType {
    type Err = SeisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// One line of a STATIONS file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationEntry {
    pub station: String,
    pub network: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub burial: f64,
}

fn parse_field(field: &str, name: &str, line_no: usize) -> Result<f64> {
    field.parse::<f64>().map_err(|_| {
        SeisError::ParseError(format!(
            "line {}: invalid {} '{}'",
            line_no, name, field
        ))
    })
}

/// Parse STATIONS file content
pub fn parse_stations(content: &str) -> Result<Vec<StationEntry>> {
    let mut entries = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(SeisError::ParseError(format!(
                "Unrecognized format for stations file, line {}: '{}'",
                i + 1,
                line.trim()
            )));
        }
        entries.push(StationEntry {
            station: fields[0].to_string(),
            network: fields[1].to_string(),
            latitude: parse_field(fields[2], "latitude", i + 1)?,
            longitude: parse_field(fields[3], "longitude", i + 1)?,
            elevation: parse_field(fields[4], "elevation", i + 1)?,
            burial: parse_field(fields[5], "burial", i + 1)?,
        });
    }
    Ok(entries)
}

pub fn read_stations(path: &Path) -> Result<Vec<StationEntry>> {
    if !path.exists() {
        return Err(SeisError::FileNotFound(path.display().to_string()));
    }
    parse_stations(&fs::read_to_string(path)?)
}

/// Inventory holding the stations of a STATIONS file
pub fn stations_to_inventory(entries: &[StationEntry]) -> Inventory {
    let mut inventory = Inventory::default();
    for entry in entries {
        inventory.insert(
            &entry.network,
            Station::new(
                entry.station.clone(),
                entry.latitude,
                entry.longitude,
                entry.elevation,
            ),
        );
    }
    inventory
}

/// Path of one seismogram file
pub fn seismogram_path(
    data_dir: &Path,
    entry: &StationEntry,
    channel: &str,
    data_type: DataType,
) -> std::path::PathBuf {
    data_dir.join(format!(
        "{}.{}.{}.{}",
        entry.station,
        entry.network,
        channel,
        data_type.suffix()
    ))
}

/// Read the E, N and Z seismograms of every station into one stream
///
/// Trace start is `origin_time` plus the first time column value.
pub fn to_stream(
    stations: &[StationEntry],
    data_dir: &Path,
    origin_time: DateTime<Utc>,
    channel_code: &str,
    data_type: DataType,
) -> Result<Stream> {
    crate::profile_scope!("specfem::to_stream");
    let mut stream = Stream::default();

    for entry in stations {
        for component in COMPONENTS {
            let channel = format!("{}{}", channel_code, component);
            let path = seismogram_path(data_dir, entry, &channel, data_type);
            let table = read_columns(&path)?;
            let (Some(t), Some(data)) = (table.column(0), table.column(1)) else {
                return Err(SeisError::ParseError(format!(
                    "{}: expected two columns, found {}",
                    path.display(),
                    table.cols
                )));
            };
            if t.len() < 2 {
                return Err(SeisError::ParseError(format!(
                    "{}: need at least two samples",
                    path.display()
                )));
            }

            let mut stats = TraceStats::new(
                entry.network.clone(),
                entry.station.clone(),
                channel,
                offset_time(origin_time, t[0]),
                t[1] - t[0],
            );
            stats.longitude = Some(entry.longitude);
            stats.latitude = Some(entry.latitude);
            stats.elevation = Some(entry.elevation);
            stream.push(Trace::new(stats, data));
        }
    }

    log::info!(
        "Read {} traces for {} stations from {}",
        stream.len(),
        stations.len(),
        data_dir.display()
    );
    Ok(stream)
}

/// Write a STATIONS file for every station in the inventory (burial 0)
pub fn write_stations(inventory: &Inventory, path: &Path) -> Result<()> {
    let mut out = String::new();
    for net in &inventory.networks {
        for sta in &net.stations {
            out.push_str(&format!(
                "{} {} {:.4} {:.4} {:.1} {:.1}\n",
                sta.code, net.code, sta.latitude, sta.longitude, sta.elevation, 0.0
            ));
        }
    }
    fs::write(path, out)?;
    Ok(())
}

/// Identifiers selecting the origin and moment tensor written to CMTSOLUTION
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmtOptions {
    #[serde(default = "default_origin_id")]
    pub origin_id: String,
    #[serde(default = "default_mechanism_id")]
    pub mechanism_id: String,
    /// Seconds
    #[serde(default)]
    pub half_duration: f64,
}

fn default_origin_id() -> String {
    "smi:nc.anss.org/origin/HYP2000".to_string()
}
fn default_mechanism_id() -> String {
    "smi:nc.anss.org/momentTensor/TMTS".to_string()
}

impl Default for CmtOptions {
    fn default() -> Self {
        Self {
            origin_id: default_origin_id(),
            mechanism_id: default_mechanism_id(),
            half_duration: 0.0,
        }
    }
}

/// C `%{width}.{precision}e` formatting: two-digit signed exponent, right aligned
fn format_exp(value: f64, precision: usize, width: usize) -> String {
    let raw = format!("{:.*e}", precision, value);
    let formatted = match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let exp: i32 = exponent.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => raw,
    };
    format!("{:>width$}", formatted, width = width)
}

/// CMTSOLUTION text for an event
pub fn format_cmt(event: &Event, options: &CmtOptions) -> Result<String> {
    let name = event.name();
    let origin = event.find_origin(&options.origin_id)?;
    let mt = event.find_moment_tensor(&options.mechanism_id)?;
    let magnitude = mw(mt.scalar_moment);
    let time = origin.time;
    let seconds = time.second() as f64 + time.nanosecond() as f64 * 1.0e-9;
    let depth_km = origin.depth / 1000.0;

    let mut out = String::new();
    out.push_str(&format!(
        "PDE {:5}{:3}{:3}{:3}{:3}{:6.2} {:.4} {:.4} {:.2} {:.2} {:.2} {}\n",
        time.year(),
        time.month(),
        time.day(),
        time.hour(),
        time.minute(),
        seconds,
        origin.latitude,
        origin.longitude,
        depth_km,
        magnitude,
        magnitude,
        name
    ));
    out.push_str(&format!("event name: {}\n", name));
    out.push_str(&format!("time shift: {:.1}\n", 0.0));
    out.push_str(&format!("half duration: {:.1}\n", options.half_duration));
    out.push_str(&format!("latitude: {:.5}\n", origin.latitude));
    out.push_str(&format!("longitude: {:.5}\n", origin.longitude));
    out.push_str(&format!("depth: {:.3}\n", depth_km));

    // N-m to dyne-cm
    let scale = 1.0e7;
    let t = &mt.tensor;
    for (label, value) in [
        ("Mrr", t.m_rr),
        ("Mtt", t.m_tt),
        ("Mpp", t.m_pp),
        ("Mrt", t.m_rt),
        ("Mrp", t.m_rp),
        ("Mtp", t.m_tp),
    ] {
        out.push_str(&format!("{}: {}\n", label, format_exp(value * scale, 4, 12)));
    }
    Ok(out)
}

pub fn write_cmt(event: &Event, options: &CmtOptions, path: &Path) -> Result<()> {
    fs::write(path, format_cmt(event, options)?)?;
    Ok(())
}
