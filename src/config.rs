use std::fs::File;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::TrackVizError;
use crate::telemetry::synthesizer::SynthesisConfig;
use crate::track_analysis::{CornerConfig, CurvatureConfig};
use crate::track_map::TrackMapConfig;

const CONFIG_DIR_NAME: &str = "trackviz";
const CONFIG_FILE_NAME: &str = "config.json";

/// Tunable thresholds for every stage of the analysis pipeline.
///
/// Missing sections in a config file fall back to their defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct TrackVizConfig {
    pub curvature: CurvatureConfig,
    pub corners: CornerConfig,
    pub synthesis: SynthesisConfig,
    pub track_map: TrackMapConfig,
}

impl TrackVizConfig {
    /// Default location of the config file in the user's config directory
    pub fn default_path() -> Result<PathBuf, TrackVizError> {
        Ok(dirs::config_dir()
            .ok_or(TrackVizError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Load the config from the user's config directory, if one was saved
    pub fn from_local_file() -> Result<Option<Self>, TrackVizError> {
        let config_path = Self::default_path()?;
        if config_path.exists() {
            Self::from_path(&config_path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, TrackVizError> {
        debug!("Loading config from {:?}", path);
        let file = File::open(path).map_err(|e| TrackVizError::ConfigIOError { source: e })?;
        serde_json::from_reader(file).map_err(|e| TrackVizError::ConfigSerializeError { source: e })
    }

    /// Save the config to the user's config directory
    pub fn save(&self) -> Result<(), TrackVizError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), TrackVizError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| TrackVizError::ConfigIOError { source: e })?;
            }
        }

        let file = File::create(path).map_err(|e| TrackVizError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| TrackVizError::ConfigSerializeError { source: e })
    }
}
