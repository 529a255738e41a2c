//! CISN ad-hoc channel list filtering

use crate::error::{Result, SeisError};
use crate::inventory::Inventory;
use crate::types::StationKey;
use std::collections::BTreeSet;

/// COSMOS station type codes at or above this value are instrumented structures
pub const STRUCTURE_COSMOS_CODE: u32 = 5;

/// Stations of the ad-hoc list installed in structures
///
/// Lines hold `STA NET CHA LOC COSMOS LAT LON ELEV DESCRIPTION...`; blank and
/// `#` lines are ignored.
pub fn structure_stations(adhoc: &str) -> Result<BTreeSet<StationKey>> {
    let mut structures = BTreeSet::new();
    for (i, line) in adhoc.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() < 9 {
            return Err(SeisError::ParseError(format!(
                "Could not split ad-hoc line {}: '{}'",
                i + 1,
                trimmed
            )));
        }
        let cosmos: u32 = fields[4].parse().map_err(|_| {
            SeisError::ParseError(format!(
                "line {}: invalid COSMOS code '{}'",
                i + 1,
                fields[4]
            ))
        })?;
        if cosmos >= STRUCTURE_COSMOS_CODE {
            structures.insert(StationKey::new(fields[1], fields[0]));
        }
    }
    Ok(structures)
}

/// Drop structure stations listed in `adhoc` from the inventory; returns the count removed
pub fn remove_structures(inventory: &mut Inventory, adhoc: &str) -> Result<usize> {
    let structures = structure_stations(adhoc)?;
    let removed = inventory.retain_stations(|key, _| !structures.contains(key));
    log::info!("Removed {} structure stations from inventory", removed);
    Ok(removed)
}
