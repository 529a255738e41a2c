use crate::error::{Result, SeisError};
use crate::types::StationKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One recording channel of a station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub code: String,
    #[serde(default)]
    pub location: String,
    /// Degrees clockwise from north
    #[serde(default)]
    pub azimuth: f64,
    /// Degrees down from horizontal
    #[serde(default)]
    pub dip: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<f64>,
}

impl Channel {
    pub fn new(code: impl Into<String>, azimuth: f64, dip: f64) -> Self {
        Self {
            code: code.into(),
            location: String::new(),
            azimuth,
            dip,
            sample_rate: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level
    #[serde(default)]
    pub elevation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

impl Station {
    pub fn new(code: impl Into<String>, latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            code: code.into(),
            latitude,
            longitude,
            elevation,
            site_name: None,
            channels: Vec::new(),
        }
    }

    pub fn channel(&self, code: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.code == code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub stations: Vec<Station>,
}

impl Network {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: None,
            stations: Vec::new(),
        }
    }
}

/// Station metadata grouped by network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub networks: Vec<Network>,
}

impl Inventory {
    pub fn new(networks: Vec<Network>) -> Self {
        Self { networks }
    }

    /// All stations with their composite keys, in inventory order
    pub fn stations(&self) -> impl Iterator<Item = (StationKey, &Station)> {
        self.networks.iter().flat_map(|net| {
            net.stations
                .iter()
                .map(move |sta| (StationKey::new(net.code.clone(), sta.code.clone()), sta))
        })
    }

    pub fn station(&self, key: &StationKey) -> Option<&Station> {
        self.networks
            .iter()
            .filter(|net| net.code == key.network)
            .flat_map(|net| net.stations.iter())
            .find(|sta| sta.code == key.station)
    }

    /// Channel metadata for a "NET.STA" key and channel code
    pub fn channel(&self, key: &StationKey, channel: &str) -> Result<&Channel> {
        let station = self
            .station(key)
            .ok_or_else(|| SeisError::StationNotFound(key.to_string()))?;
        station
            .channel(channel)
            .ok_or_else(|| SeisError::ChannelNotFound(format!("{}.{}", key, channel)))
    }

    /// Add a station, creating its network if needed
    pub fn insert(&mut self, network: &str, station: Station) {
        match self.networks.iter_mut().find(|net| net.code == network) {
            Some(net) => net.stations.push(station),
            None => {
                let mut net = Network::new(network);
                net.stations.push(station);
                self.networks.push(net);
            }
        }
    }

    /// Keep only the stations for which `keep` returns true; returns the number removed
    pub fn retain_stations<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&StationKey, &Station) -> bool,
    {
        let mut removed = 0;
        for net in &mut self.networks {
            let before = net.stations.len();
            let code = net.code.clone();
            net.stations
                .retain(|sta| keep(&StationKey::new(code.clone(), sta.code.clone()), sta));
            removed += before - net.stations.len();
        }
        removed
    }

    pub fn station_count(&self) -> usize {
        self.networks.iter().map(|net| net.stations.len()).sum()
    }

    pub fn index(&self) -> StationIndex {
        StationIndex::from_inventory(self)
    }
}

/// Lookup table from "NET.STA" to station metadata
///
/// Built once per inventory and passed to the operations that need it.
#[derive(Debug, Clone, Default)]
pub struct StationIndex {
    stations: BTreeMap<StationKey, Station>,
}

impl StationIndex {
    pub fn from_inventory(inventory: &Inventory) -> Self {
        let stations = inventory
            .stations()
            .map(|(key, sta)| (key, sta.clone()))
            .collect();
        Self { stations }
    }

    pub fn get(&self, key: &StationKey) -> Result<&Station> {
        self.stations
            .get(key)
            .ok_or_else(|| SeisError::StationNotFound(key.to_string()))
    }

    pub fn contains(&self, key: &StationKey) -> bool {
        self.stations.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &StationKey> {
        self.stations.keys()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
