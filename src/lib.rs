//! Hand motion analysis from precomputed keypoint coordinates.
//!
//! Given the 21 hand landmarks of every video frame (as produced by an
//! upstream pose-estimation pipeline) this library computes one of three
//! signals over a time range of a clip:
//! - the 2D trajectory of a single keypoint
//! - the Euclidean distance between two keypoints over time
//! - the angle formed by three keypoints over time
//!
//! The pipeline for one request is:
//! 1. Validation of the time range and the keypoint count
//! 2. Resolution of the time range into frame indices using the clip's fps
//! 3. Extraction of the signal from the coordinate array
//! 4. Presentation as a PNG plot
//!
//! # Examples
//!
//! ## Batch analysis
//!
//! ```no_run
//! use hand_motion_analysis::{
//!     dataset::{CoordinateStore, MetadataStore},
//!     keypoints::KeypointId,
//!     pipeline::{AnalysisRequest, Analyzer},
//!     render::{output_path, render_analysis, save_png, PlotRenderer},
//!     signal::{AnalysisMethod, AnglePolicy},
//!     time_range::TimeRange,
//! };
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metadata = MetadataStore::from_file("coordinates/meta.json")?;
//! let store = CoordinateStore::new("coordinates");
//! let analyzer = Analyzer::new(&metadata, &store, AnglePolicy::Raw);
//!
//! let request = AnalysisRequest::new(
//!     "sync_1",
//!     TimeRange::parse("1m25s", "1m35s")?,
//!     AnalysisMethod::Distance,
//!     vec![KeypointId::THUMB_TIP, KeypointId::PINKY_TIP],
//! );
//! let analysis = analyzer.run(&request)?;
//!
//! let image = render_analysis(&mut PlotRenderer::default(), &analysis)?;
//! save_png(&image, &output_path(Path::new("."), "sync_1", &request.range, &analysis.selection))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Computing a signal from an in-memory array
//!
//! ```
//! use hand_motion_analysis::{
//!     keypoints::KeypointId,
//!     signal::distance_series,
//!     time_range::FrameRange,
//! };
//! use ndarray::Array3;
//!
//! let mut coords = Array3::<f64>::zeros((1, 21, 2));
//! coords[[0, 20, 0]] = 3.0;
//! coords[[0, 20, 1]] = 4.0;
//!
//! let d = distance_series(coords.view(), FrameRange::new(0, 1), KeypointId::THUMB_TIP, KeypointId::PINKY_TIP);
//! assert_eq!(d, vec![5.0]);
//! ```

/// Registry of the 21 hand landmarks
pub mod keypoints;

/// Time range to frame range resolution
pub mod time_range;

/// Request validation
pub mod validation;

/// Trajectory, distance and angle extraction
pub mod signal;

/// Clip metadata and coordinate array storage
pub mod dataset;

/// Shared validate-resolve-extract pipeline
pub mod pipeline;

/// Plot rendering and output files
pub mod render;

/// Descriptive statistics of signals
pub mod summary;

/// Interactive form-style front end
pub mod interactive;

/// Numeric helpers
pub mod utils;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
