// Core data structures for circuit data files

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::TrackPoint;

/// A circuit as stored in `tracks/<key>.json`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Track {
    /// Human-readable track name (e.g., "Circuit de Monaco")
    pub name: String,
    /// Closed polyline of the circuit, the last point joins the first
    pub coordinates: Vec<TrackPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<TrackLength>,
    /// Official number of turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turns: Option<u32>,
}

impl Track {
    pub fn new(name: String, coordinates: Vec<TrackPoint>) -> Self {
        Self {
            name,
            coordinates,
            country: None,
            length: None,
            turns: None,
        }
    }

    pub fn point_count(&self) -> usize {
        self.coordinates.len()
    }
}

/// Lap length, either in kilometres or as free text such as "5.793 km"
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum TrackLength {
    Km(f64),
    Text(String),
}

impl fmt::Display for TrackLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackLength::Km(km) => write!(f, "{:.3} km", km),
            TrackLength::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Entry of the track index
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TrackIndexEntry {
    /// File stem under `tracks/`
    pub key: String,
    pub name: String,
}

/// Contents of `tracks-index.json`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackIndex {
    pub total_tracks: usize,
    pub tracks: Vec<TrackIndexEntry>,
}

impl TrackIndex {
    pub fn contains(&self, key: &str) -> bool {
        self.tracks.iter().any(|t| t.key == key)
    }
}
