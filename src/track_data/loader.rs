// On-demand loading of track data files

use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::TrackVizError;
use crate::track_data::types::{Track, TrackIndex, TrackIndexEntry};

const INDEX_FILE_NAME: &str = "tracks-index.json";
const TRACKS_DIR_NAME: &str = "tracks";

/// Read access to tracks that are already in memory
pub trait TrackSource {
    /// Loaded track for `key`, or `TrackNotLoaded`
    fn track(&self, key: &str) -> Result<&Track, TrackVizError>;

    fn is_loaded(&self, key: &str) -> bool;
}

/// Memory usage of a [`TrackLoader`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackLoaderStats {
    pub loaded_tracks: usize,
    /// Serialized size of all loaded tracks
    pub total_size_kb: f64,
    /// Tracks listed in the index, 0 before `init`
    pub available_tracks: usize,
}

/// Loads tracks from a data directory laid out as
/// `tracks-index.json` plus one `tracks/<key>.json` per circuit.
///
/// Each track file is read at most once and kept until `clear_cache`.
pub struct TrackLoader {
    data_dir: PathBuf,
    index: Option<TrackIndex>,
    tracks: HashMap<String, Track>,
}

impl TrackLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            index: None,
            tracks: HashMap::new(),
        }
    }

    /// Read and cache the track index
    pub fn init(&mut self) -> Result<&TrackIndex, TrackVizError> {
        let index_path = self.data_dir.join(INDEX_FILE_NAME);
        if self.index.is_none() {
            let index = Self::read_index(&index_path)?;
            info!("Track loader initialized with {} tracks", index.total_tracks);
            if index.total_tracks != index.tracks.len() {
                warn!(
                    "Track index reports {} tracks but lists {}",
                    index.total_tracks,
                    index.tracks.len()
                );
            }
            self.index = Some(index);
        }

        self.index
            .as_ref()
            .ok_or_else(|| TrackVizError::TrackIndexMissing {
                path: index_path.display().to_string(),
            })
    }

    /// Tracks listed in the index
    pub fn track_list(&mut self) -> Result<&[TrackIndexEntry], TrackVizError> {
        Ok(&self.init()?.tracks)
    }

    /// Load a track by key, reading its file only on first use
    pub fn load_track(&mut self, key: &str) -> Result<&Track, TrackVizError> {
        if !self.tracks.contains_key(key) {
            let track = self.read_track(key)?;
            let size_kb = serialized_size(&track) as f64 / 1024.0;
            info!("Loaded {} ({:.1} KB)", track.name, size_kb);
            self.tracks.insert(key.to_string(), track);
        }
        self.get_track(key)
    }

    /// Load a track that the index lists.
    ///
    /// Keys missing from the index are rejected before any track file is
    /// read, so a typo is reported as such rather than as a missing file.
    pub fn load_listed_track(&mut self, key: &str) -> Result<&Track, TrackVizError> {
        let index = self.init()?;
        if !index.contains(key) {
            return Err(TrackVizError::InvalidUserInput {
                field: "track".to_string(),
                reason: format!(
                    "'{}' is not one of the {} indexed tracks",
                    key,
                    index.tracks.len()
                ),
            });
        }
        self.load_track(key)
    }

    /// Load several tracks, stopping at the first failure
    pub fn preload_tracks<I, K>(&mut self, keys: I) -> Result<(), TrackVizError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.load_track(key.as_ref())?;
        }
        Ok(())
    }

    /// Load every track listed in the index
    pub fn load_all_tracks(&mut self) -> Result<(), TrackVizError> {
        let keys: Vec<String> = self.track_list()?.iter().map(|t| t.key.clone()).collect();
        self.preload_tracks(keys)
    }

    pub fn get_track(&self, key: &str) -> Result<&Track, TrackVizError> {
        self.tracks
            .get(key)
            .ok_or_else(|| TrackVizError::TrackNotLoaded {
                key: key.to_string(),
            })
    }

    pub fn is_loaded(&self, key: &str) -> bool {
        self.tracks.contains_key(key)
    }

    /// Keys of the tracks in memory, sorted
    pub fn loaded_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.tracks.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Drop all loaded tracks. The index stays cached.
    pub fn clear_cache(&mut self) {
        self.tracks.clear();
        info!("Track cache cleared");
    }

    pub fn stats(&self) -> TrackLoaderStats {
        let total_size: usize = self.tracks.values().map(serialized_size).sum();
        TrackLoaderStats {
            loaded_tracks: self.tracks.len(),
            total_size_kb: total_size as f64 / 1024.0,
            available_tracks: self.index.as_ref().map_or(0, |i| i.total_tracks),
        }
    }

    fn read_index(path: &Path) -> Result<TrackIndex, TrackVizError> {
        if !path.exists() {
            return Err(TrackVizError::TrackIndexMissing {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| TrackVizError::TrackIoError {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| TrackVizError::TrackParseError {
            path: path.display().to_string(),
            source: e,
        })
    }

    fn read_track(&self, key: &str) -> Result<Track, TrackVizError> {
        validate_key(key)?;

        let file_path = self
            .data_dir
            .join(TRACKS_DIR_NAME)
            .join(format!("{}.json", key));
        if !file_path.exists() {
            debug!("Track file does not exist: {:?}", file_path);
            return Err(TrackVizError::TrackNotFound {
                key: key.to_string(),
            });
        }

        let content = fs::read_to_string(&file_path).map_err(|e| TrackVizError::TrackIoError {
            path: file_path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| TrackVizError::TrackParseError {
            path: file_path.display().to_string(),
            source: e,
        })
    }
}

impl TrackSource for TrackLoader {
    fn track(&self, key: &str) -> Result<&Track, TrackVizError> {
        self.get_track(key)
    }

    fn is_loaded(&self, key: &str) -> bool {
        TrackLoader::is_loaded(self, key)
    }
}

/// Track keys name a file directly under `tracks/`
fn validate_key(key: &str) -> Result<(), TrackVizError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(TrackVizError::InvalidUserInput {
            field: "track key".to_string(),
            reason: format!("'{}' may only contain letters, digits, '-' and '_'", key),
        })
    }
}

fn serialized_size(track: &Track) -> usize {
    serde_json::to_string(track).map_or(0, |json| json.len())
}
