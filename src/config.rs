//! Configuration management for the hand motion analysis tools

use crate::{
    constants::{
        DEFAULT_COORDINATE_DIR, DEFAULT_FONT_SIZE, DEFAULT_GRID_DIVISIONS, DEFAULT_LINE_COLOR, DEFAULT_MAX_MINUTES,
        DEFAULT_METADATA_FILE, DEFAULT_PLOT_MARGIN, DEFAULT_PREVIEW_FILE, DEFAULT_SERIES_HEIGHT,
        DEFAULT_SERIES_WIDTH, DEFAULT_TRAJECTORY_SIZE,
    },
    signal::AnglePolicy,
    Error, Result,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input data locations
    pub data: DataConfig,

    /// Output locations
    pub output: OutputConfig,

    /// Plot appearance
    pub render: RenderConfig,

    /// Signal computation options
    pub analysis: AnalysisConfig,

    /// Interactive session options
    pub interactive: InteractiveConfig,
}

/// Input data locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the metadata file and `<clip>.npy` arrays
    pub coordinate_dir: PathBuf,

    /// Metadata file name, relative to `coordinate_dir`
    pub metadata_file: PathBuf,
}

/// Output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory; images go to `<output_dir>/<method>/`
    pub output_dir: PathBuf,
}

/// Plot appearance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Side of the square trajectory canvas
    pub trajectory_size: u32,

    /// Time-series canvas width
    pub series_width: u32,

    /// Time-series canvas height
    pub series_height: u32,

    /// Blank border around the plot area
    pub margin: u32,

    /// Grid cells per axis (0 disables the grid)
    pub grid_divisions: u32,

    /// Series colour as RGB
    pub line_color: [u8; 3],

    /// Text height in pixels for the title, axis labels and ticks (0 disables text)
    pub font_size: f32,
}

/// Signal computation options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Cosine handling for angles: `raw` or `clamped`
    pub angle_policy: AnglePolicy,
}

/// Label shown in the clip selector and the clip id it stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipAlias {
    pub label: String,
    pub id: String,
}

/// Interactive session options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveConfig {
    /// Upper bound of the minutes inputs
    pub max_minutes: u32,

    /// Clip selector entries; metadata ids are listed when empty
    pub clips: Vec<ClipAlias>,

    /// Keep loaded coordinate arrays in memory between requests
    pub cache_coordinates: bool,

    /// File name of the preview image, written under the output directory
    pub preview_file: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            coordinate_dir: PathBuf::from(DEFAULT_COORDINATE_DIR),
            metadata_file: PathBuf::from(DEFAULT_METADATA_FILE),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            trajectory_size: DEFAULT_TRAJECTORY_SIZE,
            series_width: DEFAULT_SERIES_WIDTH,
            series_height: DEFAULT_SERIES_HEIGHT,
            margin: DEFAULT_PLOT_MARGIN,
            grid_divisions: DEFAULT_GRID_DIVISIONS,
            line_color: DEFAULT_LINE_COLOR,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        let alias = |label: &str, id: &str| ClipAlias {
            label: label.to_string(),
            id: id.to_string(),
        };
        Self {
            max_minutes: DEFAULT_MAX_MINUTES,
            clips: vec![
                alias("Hand 1", "hand_1"),
                alias("Hand 2", "hand_2"),
                alias("Sync 1", "sync_1"),
                alias("Sync 2", "sync_2"),
                alias("Sync 3", "sync_3"),
            ],
            cache_coordinates: true,
            preview_file: PathBuf::from(DEFAULT_PREVIEW_FILE),
        }
    }
}

impl DataConfig {
    /// Full path of the metadata file
    #[must_use]
    pub fn metadata_path(&self) -> PathBuf {
        self.coordinate_dir.join(&self.metadata_file)
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Load the given file, falling back to defaults when it is absent or unreadable
    #[must_use]
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        info!("Loading configuration from: {}", path.display());
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Apply command-line directory overrides
    #[must_use]
    pub fn with_dirs(mut self, coordinate_dir: Option<PathBuf>, output_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = coordinate_dir {
            self.data.coordinate_dir = dir;
        }
        if let Some(dir) = output_dir {
            self.output.output_dir = dir;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let render = &self.render;
        let min_side = 2 * render.margin + 1;
        if render.trajectory_size < min_side {
            return Err(Error::ConfigError(format!(
                "Trajectory size must be at least {min_side} pixels for a margin of {}",
                render.margin
            )));
        }
        if render.series_width < min_side || render.series_height < min_side {
            return Err(Error::ConfigError(format!(
                "Series canvas must be at least {min_side}x{min_side} pixels for a margin of {}",
                render.margin
            )));
        }

        if !render.font_size.is_finite() || render.font_size < 0.0 {
            return Err(Error::ConfigError(format!(
                "Font size must be a non-negative number, got {}",
                render.font_size
            )));
        }

        if self.interactive.preview_file.as_os_str().is_empty() {
            return Err(Error::ConfigError("Preview file name must not be empty".to_string()));
        }
        for alias in &self.interactive.clips {
            if alias.label.trim().is_empty() || alias.id.trim().is_empty() {
                return Err(Error::ConfigError(
                    "Clip aliases need a non-empty label and id".to_string(),
                ));
            }
        }

        if self.data.coordinate_dir.as_os_str().is_empty() {
            return Err(Error::ConfigError("Coordinate directory must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Hand Motion Analysis Configuration

# Input data
data:
  coordinate_dir: "coordinates"
  metadata_file: "meta.json"

# Output images go to <output_dir>/<method>/
output:
  output_dir: "."

# Plot appearance
render:
  trajectory_size: 960
  series_width: 1500
  series_height: 400
  margin: 40
  grid_divisions: 5
  line_color: [31, 119, 180]
  font_size: 18

# Signal computation
analysis:
  angle_policy: "raw"

# Interactive session
interactive:
  max_minutes: 10
  cache_coordinates: true
  preview_file: "preview.png"
  clips:
    - label: "Hand 1"
      id: "hand_1"
    - label: "Hand 2"
      id: "hand_2"
    - label: "Sync 1"
      id: "sync_1"
    - label: "Sync 2"
      id: "sync_2"
    - label: "Sync 3"
      id: "sync_3"
"#;
