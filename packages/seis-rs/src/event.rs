//! Earthquake catalog model and lookups

use crate::error::{Result, SeisError};
use crate::momenttensor::extract_dc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters below sea level
    pub depth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Magnitude {
    pub mag: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitude_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodalPlane {
    pub strike: f64,
    pub dip: f64,
    pub rake: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodalPlanes {
    pub nodal_plane_1: NodalPlane,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodal_plane_2: Option<NodalPlane>,
}

/// Moment tensor components in Newton-meters, spherical (r, theta, phi) basis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    pub m_rr: f64,
    pub m_tt: f64,
    pub m_pp: f64,
    pub m_rt: f64,
    pub m_rp: f64,
    pub m_tp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentTensor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    /// Newton-meters
    pub scalar_moment: f64,
    pub tensor: Tensor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocalMechanism {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodal_planes: Option<NodalPlanes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moment_tensor: Option<MomentTensor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub resource_id: String,
    #[serde(default)]
    pub origins: Vec<Origin>,
    #[serde(default)]
    pub magnitudes: Vec<Magnitude>,
    #[serde(default)]
    pub focal_mechanisms: Vec<FocalMechanism>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Event {
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            origins: Vec::new(),
            magnitudes: Vec::new(),
            focal_mechanisms: Vec::new(),
        }
    }

    /// Short name from the last two path segments of the resource id, lowercased
    ///
    /// `smi:nc.anss.org/event/NC72282711` becomes `eventnc72282711`.
    pub fn name(&self) -> String {
        let segments: Vec<&str> = self.resource_id.split('/').collect();
        let start = segments.len().saturating_sub(2);
        segments[start..].concat().to_lowercase()
    }

    pub fn find_origin(&self, method_id: &str) -> Result<&Origin> {
        self.origins
            .iter()
            .find(|o| o.method_id.as_deref() == Some(method_id))
            .ok_or_else(|| SeisError::OriginNotFound(method_id.to_string()))
    }

    pub fn find_focal_mechanism(&self, method_id: &str) -> Result<&FocalMechanism> {
        self.focal_mechanisms
            .iter()
            .find(|fm| fm.method_id.as_deref() == Some(method_id))
            .ok_or_else(|| SeisError::FocalMechanismNotFound(method_id.to_string()))
    }

    /// Moment tensor of the focal mechanism solved by `method_id`
    pub fn find_moment_tensor(&self, method_id: &str) -> Result<&MomentTensor> {
        self.focal_mechanisms
            .iter()
            .filter(|fm| fm.method_id.as_deref() == Some(method_id))
            .find_map(|fm| fm.moment_tensor.as_ref())
            .ok_or_else(|| {
                SeisError::MomentTensorNotFound(format!(
                    "no moment tensor for method '{}' in event {}",
                    method_id, self.resource_id
                ))
            })
    }

    /// First focal mechanism carrying a moment tensor
    pub fn moment_tensor(&self) -> Result<&FocalMechanism> {
        self.focal_mechanisms
            .iter()
            .find(|fm| fm.moment_tensor.is_some())
            .ok_or_else(|| {
                SeisError::MomentTensorNotFound(format!("no moment tensor in event {}", self.resource_id))
            })
    }

    /// First focal mechanism with nodal planes
    pub fn first_motion(&self) -> Result<&FocalMechanism> {
        self.focal_mechanisms
            .iter()
            .find(|fm| fm.nodal_planes.is_some())
            .ok_or_else(|| {
                SeisError::FocalMechanismNotFound(format!(
                    "nodal planes in event {}",
                    self.resource_id
                ))
            })
    }

    /// Append the double-couple part of the first moment tensor as a new mechanism
    ///
    /// Returns false when the event has no moment tensor.
    pub fn add_dc_only(&mut self) -> Result<bool> {
        let Ok(source) = self.moment_tensor() else {
            return Ok(false);
        };
        let Some(mt) = source.moment_tensor.as_ref() else {
            return Ok(false);
        };

        let dc = MomentTensor {
            resource_id: mt.resource_id.as_ref().map(|id| format!("{}/DC", id)),
            scalar_moment: mt.scalar_moment,
            tensor: extract_dc(mt, false)?,
        };
        let mechanism = FocalMechanism {
            method_id: source.method_id.as_ref().map(|id| format!("{}/DC", id)),
            nodal_planes: source.nodal_planes,
            moment_tensor: Some(dc),
        };
        self.focal_mechanisms.push(mechanism);
        Ok(true)
    }

    pub fn preferred_magnitude(&self) -> Option<&Magnitude> {
        self.magnitudes.first()
    }
}
