//! Constants used throughout the application

/// Number of hand landmarks per frame
pub const NUM_KEYPOINTS: usize = 21;

/// Minimum number of coordinate axes (x, y) in a coordinate file
pub const MIN_COORDINATE_AXES: usize = 2;

/// Seconds in one minute
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Largest value accepted for the seconds part of a timestamp
pub const MAX_SECONDS_FIELD: u32 = 59;

/// Upper bound of the minutes input in the interactive form
pub const DEFAULT_MAX_MINUTES: u32 = 10;

/// Default directory holding `meta.json` and the per-clip `.npy` files
pub const DEFAULT_COORDINATE_DIR: &str = "coordinates";

/// Default metadata file name inside the coordinate directory
pub const DEFAULT_METADATA_FILE: &str = "meta.json";

/// File extension of coordinate arrays
pub const COORDINATE_FILE_EXTENSION: &str = "npy";

/// Default canvas size for trajectory plots
pub const DEFAULT_TRAJECTORY_SIZE: u32 = 960;

/// Default canvas size for time-series plots (15:4 figure)
pub const DEFAULT_SERIES_WIDTH: u32 = 1500;
pub const DEFAULT_SERIES_HEIGHT: u32 = 400;

/// Blank border around the plot area in pixels
pub const DEFAULT_PLOT_MARGIN: u32 = 40;

/// Number of grid cells along each axis
pub const DEFAULT_GRID_DIVISIONS: u32 = 5;

/// Pixel height of title, label and tick text (0 draws no text)
pub const DEFAULT_FONT_SIZE: f32 = 18.0;

/// Default series colour (matplotlib's first cycle colour)
pub const DEFAULT_LINE_COLOR: [u8; 3] = [31, 119, 180];

/// Default file name of the interactive preview image
pub const DEFAULT_PREVIEW_FILE: &str = "preview.png";
