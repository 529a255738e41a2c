//! HypoDD / tomoDD relocation output (`.reloc`) reader

use crate::error::{Result, SeisError};
use crate::event::{Catalog, Event, Magnitude, Origin};
use crate::types::offset_time;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

pub const ORIGIN_METHOD_ID: &str = "smi:hardebeck.usgs.gov/origin/TOMODD";
const FIELD_COUNT: usize = 24;

fn field<T: std::str::FromStr>(fields: &[&str], index: usize, line_no: usize) -> Result<T> {
    fields[index].parse::<T>().map_err(|_| {
        SeisError::ParseError(format!(
            "line {}: cannot parse field {} ('{}')",
            line_no,
            index + 1,
            fields[index]
        ))
    })
}

/// Seconds field: decimal seconds, or hundredths of a second when written without a point
fn parse_seconds(raw: &str, line_no: usize) -> Result<f64> {
    let value: f64 = raw.parse().map_err(|_| {
        SeisError::ParseError(format!("line {}: invalid seconds '{}'", line_no, raw))
    })?;
    Ok(if raw.contains('.') { value } else { value / 100.0 })
}

fn parse_line(line: &str, line_no: usize) -> Result<Event> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELD_COUNT {
        return Err(SeisError::ParseError(format!(
            "Unrecognized format for HypoDD/tomoDD file, line {} has {} fields: '{}'",
            line_no,
            fields.len(),
            line.trim()
        )));
    }

    let id = fields[0];
    let latitude: f64 = field(&fields, 1, line_no)?;
    let longitude: f64 = field(&fields, 2, line_no)?;
    let depth_km: f64 = field(&fields, 3, line_no)?;

    let year: i32 = field(&fields, 10, line_no)?;
    let month: u32 = field(&fields, 11, line_no)?;
    let day: u32 = field(&fields, 12, line_no)?;
    let hour: u32 = field(&fields, 13, line_no)?;
    let minute: u32 = field(&fields, 14, line_no)?;
    let seconds = parse_seconds(fields[15], line_no)?;
    let magnitude: f64 = field(&fields, 16, line_no)?;

    let minute_start = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .ok_or_else(|| {
            SeisError::ParseError(format!(
                "line {}: invalid date {}-{}-{} {}:{}",
                line_no, year, month, day, hour, minute
            ))
        })?
        .and_utc();

    let mut event = Event::new(format!("smi:hardebeck.usgs.gov/event/{}", id));
    event.origins.push(Origin {
        time: offset_time(minute_start, seconds),
        latitude,
        longitude,
        depth: depth_km * 1000.0,
        depth_type: Some("from location".to_string()),
        method_id: Some(ORIGIN_METHOD_ID.to_string()),
        origin_type: Some("hypocenter".to_string()),
    });
    event.magnitudes.push(Magnitude {
        mag: magnitude,
        magnitude_type: None,
    });
    Ok(event)
}

/// Parse relocation lines into a catalog, one event per line
pub fn parse_catalog(content: &str) -> Result<Catalog> {
    let events = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_line(line, i + 1))
        .collect::<Result<Vec<_>>>()?;
    Ok(Catalog { events })
}

pub fn to_catalog(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        return Err(SeisError::FileNotFound(path.display().to_string()));
    }
    let catalog = parse_catalog(&fs::read_to_string(path)?)?;
    log::info!("Read {} events from {}", catalog.events.len(), path.display());
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_utc;

    const LINE: &str = "72282711 38.21517 -122.31233 11.120 -1.2 3.4 5.6 0.010 0.012 0.030 2014 8 24 10 20 44.07 6.02 10 12 30 28 0.120 0.250 1";

    #[test]
    fn test_parse_reloc_line() {
        let catalog = parse_catalog(LINE).unwrap();
        assert_eq!(catalog.events.len(), 1);
        let event = &catalog.events[0];
        assert_eq!(event.name(), "event72282711");

        let origin = event.find_origin(ORIGIN_METHOD_ID).unwrap();
        assert_eq!(origin.time, parse_utc("2014-08-24T10:20:44.07Z").unwrap());
        assert!((origin.depth - 11_120.0).abs() < 1e-6);
        assert_eq!(origin.origin_type.as_deref(), Some("hypocenter"));
        assert_eq!(event.preferred_magnitude().map(|m| m.mag), Some(6.02));
    }

    #[test]
    fn test_hundredths_seconds() {
        let line = LINE.replace("44.07", "4407");
        let catalog = parse_catalog(&line).unwrap();
        let origin = &catalog.events[0].origins[0];
        assert_eq!(origin.time, parse_utc("2014-08-24T10:20:44.07Z").unwrap());
    }

    #[test]
    fn test_bad_lines() {
        assert!(parse_catalog("1 2 3").is_err());
        let line = LINE.replace(" 8 24 ", " 13 24 ");
        assert!(parse_catalog(&line).is_err());
        assert!(parse_catalog("\n\n").unwrap().events.is_empty());
    }
}
