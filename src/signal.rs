//! Derived signals computed from per-frame keypoint coordinates.
//!
//! Coordinate arrays have shape `(frames, 21, axes)` with `axes >= 2`. Missing
//! detections are stored as NaN and propagate into every signal computed from
//! them; they are never treated as errors.

use crate::{keypoints::KeypointId, time_range::FrameRange, utils::nan_min_max, Error, Result};
use log::debug;
use ndarray::{s, ArrayView1, ArrayView3, Axis};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Kind of analysis requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisMethod {
    /// 2D path of one keypoint
    Track,
    /// Euclidean distance between two keypoints over time
    Distance,
    /// Angle at a vertex keypoint over time
    Angle,
}

impl AnalysisMethod {
    pub const ALL: [Self; 3] = [Self::Track, Self::Distance, Self::Angle];

    /// Number of keypoints the method needs
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::Track => 1,
            Self::Distance => 2,
            Self::Angle => 3,
        }
    }

    /// Name used on the command line and in output directories
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Distance => "distance",
            Self::Angle => "angle",
        }
    }

    /// Human readable description shown in the interactive form
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Track => "Trajectory of one keypoint",
            Self::Distance => "Distance between two keypoints",
            Self::Angle => "Angle formed by three keypoints",
        }
    }
}

impl FromStr for AnalysisMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "track" => Ok(Self::Track),
            "distance" => Ok(Self::Distance),
            "angle" => Ok(Self::Angle),
            other => Err(Error::InvalidInput(format!(
                "Unknown method '{other}', expected one of: track, distance, angle"
            ))),
        }
    }
}

impl fmt::Display for AnalysisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keypoint selection whose shape already matches its method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Track(KeypointId),
    Distance(KeypointId, KeypointId),
    /// First ray end, vertex, second ray end
    Angle(KeypointId, KeypointId, KeypointId),
}

impl Selection {
    #[must_use]
    pub fn method(&self) -> AnalysisMethod {
        match self {
            Self::Track(_) => AnalysisMethod::Track,
            Self::Distance(..) => AnalysisMethod::Distance,
            Self::Angle(..) => AnalysisMethod::Angle,
        }
    }

    /// Keypoints in selection order
    #[must_use]
    pub fn keypoints(&self) -> Vec<KeypointId> {
        match *self {
            Self::Track(a) => vec![a],
            Self::Distance(a, b) => vec![a, b],
            Self::Angle(a, b, c) => vec![a, b, c],
        }
    }
}

/// How cosines pushed outside `[-1, 1]` by rounding are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnglePolicy {
    /// Pass the cosine to `acos` unchanged; out-of-domain values give NaN
    #[default]
    Raw,
    /// Clamp the cosine to `[-1, 1]` first
    Clamped,
}

impl FromStr for AnglePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "clamped" | "clamp" => Ok(Self::Clamped),
            other => Err(Error::InvalidInput(format!("Unknown angle policy '{other}'"))),
        }
    }
}

/// Display bounds of a trajectory plot, in presentation coordinates (y negated)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl AxisBounds {
    /// Bounds over every keypoint and frame of a clip, ignoring NaN.
    ///
    /// Returns `None` if the clip holds no finite x or y value.
    #[must_use]
    pub fn from_coordinates(coordinates: ArrayView3<'_, f64>) -> Option<Self> {
        let (x_min, x_max) = nan_min_max(coordinates.index_axis(Axis(2), 0).iter().copied())?;
        let (y_min, y_max) = nan_min_max(coordinates.index_axis(Axis(2), 1).iter().map(|y| -y))?;

        Some(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }
}

/// Path of one keypoint, y negated so that image coordinates plot upright
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub keypoint: KeypointId,
    pub points: Vec<(f64, f64)>,
    /// Fixed bounds from the whole clip so different ranges share a scale
    pub bounds: Option<AxisBounds>,
}

/// Quantity carried by a time series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Distance,
    Angle,
}

impl SeriesKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Angle => "angle",
        }
    }

    /// Label of the value axis
    #[must_use]
    pub fn axis_label(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Angle => "angle (°)",
        }
    }
}

/// Values paired with the time in seconds of the frame they come from
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub kind: SeriesKind,
    pub keypoints: Vec<KeypointId>,
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of undefined samples
    #[must_use]
    pub fn nan_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }
}

/// Output of the extractor
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Trajectory(Trajectory),
    TimeSeries(TimeSeries),
}

impl Signal {
    /// Number of frames in the signal
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Trajectory(t) => t.points.len(),
            Self::TimeSeries(s) => s.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Slice one keypoint's coordinates over a frame range (truncated to the array)
fn keypoint_slice<'a>(
    coordinates: &'a ArrayView3<'_, f64>,
    frames: FrameRange,
    keypoint: KeypointId,
) -> ndarray::ArrayView2<'a, f64> {
    let frames = frames.clamp_to(coordinates.len_of(Axis(0)));
    coordinates.slice(s![frames.start..frames.end, keypoint.index(), ..])
}

/// `(x, -y)` of a keypoint over the frame range
#[must_use]
pub fn trajectory(coordinates: ArrayView3<'_, f64>, frames: FrameRange, keypoint: KeypointId) -> Vec<(f64, f64)> {
    keypoint_slice(&coordinates, frames, keypoint)
        .outer_iter()
        .map(|p| (p[0], -p[1]))
        .collect()
}

fn difference(a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> Vec<f64> {
    a.iter().zip(b.iter()).map(|(x, y)| x - y).collect()
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Euclidean distance between two keypoints at each frame, over all axes
#[must_use]
pub fn distance_series(
    coordinates: ArrayView3<'_, f64>,
    frames: FrameRange,
    first: KeypointId,
    second: KeypointId,
) -> Vec<f64> {
    let p0 = keypoint_slice(&coordinates, frames, first);
    let p1 = keypoint_slice(&coordinates, frames, second);

    p0.outer_iter()
        .zip(p1.outer_iter())
        .map(|(a, b)| norm(&difference(&a, &b)))
        .collect()
}

/// Angle in degrees at `vertex` between the rays to `first` and `third`
#[must_use]
pub fn angle_series(
    coordinates: ArrayView3<'_, f64>,
    frames: FrameRange,
    (first, vertex, third): (KeypointId, KeypointId, KeypointId),
    policy: AnglePolicy,
) -> Vec<f64> {
    let a = keypoint_slice(&coordinates, frames, first);
    let b = keypoint_slice(&coordinates, frames, vertex);
    let c = keypoint_slice(&coordinates, frames, third);

    a.outer_iter()
        .zip(b.outer_iter())
        .zip(c.outer_iter())
        .map(|((a, b), c)| {
            let v1 = difference(&a, &b);
            let v2 = difference(&c, &b);
            let dot: f64 = v1.iter().zip(&v2).map(|(x, y)| x * y).sum();
            let cos = dot / (norm(&v1) * norm(&v2));
            let cos = match policy {
                AnglePolicy::Raw => cos,
                AnglePolicy::Clamped => cos.clamp(-1.0, 1.0),
            };
            cos.acos() * 180.0 / PI
        })
        .collect()
}

/// Compute the signal for a selection over a frame range.
///
/// `times` is the time axis of the same frame range. No validation happens
/// here; the selection type already fixes the keypoint count.
#[must_use]
pub fn extract(
    coordinates: ArrayView3<'_, f64>,
    frames: FrameRange,
    selection: &Selection,
    times: &[f64],
    policy: AnglePolicy,
) -> Signal {
    let signal = match *selection {
        Selection::Track(keypoint) => Signal::Trajectory(Trajectory {
            keypoint,
            points: trajectory(coordinates.view(), frames, keypoint),
            bounds: AxisBounds::from_coordinates(coordinates.view()),
        }),
        Selection::Distance(first, second) => Signal::TimeSeries(TimeSeries {
            kind: SeriesKind::Distance,
            keypoints: selection.keypoints(),
            times: times.to_vec(),
            values: distance_series(coordinates.view(), frames, first, second),
        }),
        Selection::Angle(first, vertex, third) => Signal::TimeSeries(TimeSeries {
            kind: SeriesKind::Angle,
            keypoints: selection.keypoints(),
            times: times.to_vec(),
            values: angle_series(coordinates.view(), frames, (first, vertex, third), policy),
        }),
    };

    if let Signal::TimeSeries(series) = &signal {
        debug!(
            "Extracted {} series: {} samples, {} undefined",
            series.kind.label(),
            series.len(),
            series.nan_count()
        );
    }

    signal
}
