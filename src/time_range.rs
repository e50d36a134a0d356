//! Conversion of wall-clock time ranges into frame ranges and time axes.

use crate::{
    constants::{MAX_SECONDS_FIELD, SECONDS_PER_MINUTE},
    dataset::ClipMetadata,
    utils::safe_cast::{f64_to_usize_floor, usize_to_f64},
    Error, Result,
};
use log::{debug, warn};
use std::fmt;
use std::str::FromStr;

/// Offset into a clip entered as minutes and seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Timestamp {
    minutes: u32,
    seconds: u32,
}

impl Timestamp {
    /// Create a timestamp
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeFormat` if `seconds` is above 59
    pub fn new(minutes: u32, seconds: u32) -> Result<Self> {
        if seconds > MAX_SECONDS_FIELD {
            return Err(Error::InvalidTimeFormat(format!(
                "seconds must be between 0 and {MAX_SECONDS_FIELD}, got {seconds}"
            )));
        }
        Ok(Self { minutes, seconds })
    }

    #[must_use]
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    #[must_use]
    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Offset in whole seconds
    #[must_use]
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.minutes) * u64::from(SECONDS_PER_MINUTE) + u64::from(self.seconds)
    }

    /// Frame index of this offset at the given frame rate (truncating)
    ///
    /// # Errors
    ///
    /// Returns an error if `fps` is not a positive finite number
    pub fn frame_index(&self, fps: f64) -> Result<usize> {
        frame_index(self.total_seconds(), fps)
    }
}

/// Parses `<minutes>m<seconds>s`, e.g. `1m25s`
impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidTimeFormat(format!("expected <minutes>m<seconds>s, got '{s}'"));

        let (minutes, seconds) = s.trim().split_once('m').ok_or_else(invalid)?;
        let seconds = seconds.strip_suffix('s').ok_or_else(invalid)?;
        let minutes = minutes.parse::<u32>().map_err(|_| invalid())?;
        let seconds = seconds.parse::<u32>().map_err(|_| invalid())?;

        Self::new(minutes, seconds)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m{}s", self.minutes, self.seconds)
    }
}

/// Requested portion of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    #[must_use]
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Parse both endpoints from `<m>m<s>s` strings
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeFormat` if either endpoint is malformed
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(start.parse()?, end.parse()?))
    }

    /// Whether the start strictly precedes the end
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.start.total_seconds() < self.end.total_seconds()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Half-open range of frame indices `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: usize,
    pub end: usize,
}

impl FrameRange {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of frames covered
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Range restricted to the first `num_frames` frames, as slicing does
    #[must_use]
    pub fn clamp_to(&self, num_frames: usize) -> Self {
        let end = self.end.min(num_frames);
        Self {
            start: self.start.min(end),
            end,
        }
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Frame index of an offset in seconds: `floor(seconds * fps)`
///
/// # Errors
///
/// Returns an error if `fps` is not a positive finite number
#[allow(clippy::cast_precision_loss)] // Offsets in seconds are small
pub fn frame_index(total_seconds: u64, fps: f64) -> Result<usize> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(Error::InvalidInput(format!("fps must be positive, got {fps}")));
    }
    f64_to_usize_floor(total_seconds as f64 * fps)
}

/// Time in seconds of every frame of a clip: `t[i] = i / fps`
#[must_use]
pub fn time_axis(num_frames: usize, fps: f64) -> Vec<f64> {
    (0..num_frames).map(|i| usize_to_f64(i) / fps).collect()
}

/// Frame range and matching time axis for a request
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRange {
    /// Frame indices as computed from the timestamps, before truncation
    pub frames: FrameRange,
    /// Times of the frames actually available in the range
    pub times: Vec<f64>,
}

impl ResolvedRange {
    /// Frame range after truncation to the clip length
    #[must_use]
    pub fn available(&self, num_frames: usize) -> FrameRange {
        self.frames.clamp_to(num_frames)
    }
}

/// Resolve a time range against a clip's frame rate and length.
///
/// Ordering is not checked here; a range reaching past the end of the clip is
/// silently truncated to the frames that exist.
///
/// # Errors
///
/// Returns an error if the clip's fps is not a positive finite number
pub fn resolve(range: &TimeRange, clip: &ClipMetadata) -> Result<ResolvedRange> {
    let frames = FrameRange::new(range.start.frame_index(clip.fps)?, range.end.frame_index(clip.fps)?);
    let available = frames.clamp_to(clip.num_frames);

    if available != frames {
        warn!(
            "Range {} of clip '{}' exceeds its {} frames, truncated to {}",
            frames, clip.clip_id, clip.num_frames, available
        );
    }
    debug!("Resolved {} at {} fps to frames {}", range, clip.fps, frames);

    let times = time_axis(clip.num_frames, clip.fps)[available.start..available.end].to_vec();

    Ok(ResolvedRange { frames, times })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn clip(fps: f64, num_frames: usize) -> ClipMetadata {
        ClipMetadata {
            clip_id: "test".to_string(),
            fps,
            num_frames,
        }
    }

    #[test]
    fn test_parse_timestamp() {
        let ts: Timestamp = "1m25s".parse().unwrap();
        assert_eq!(ts.minutes(), 1);
        assert_eq!(ts.seconds(), 25);
        assert_eq!(ts.total_seconds(), 85);
        assert_eq!(ts.to_string(), "1m25s");
    }

    #[test]
    fn test_parse_timestamp_errors() {
        for input in ["", "1m", "25s", "1m25", "am5s", "1m-5s", "1m60s", "1x25s"] {
            assert!(
                matches!(input.parse::<Timestamp>(), Err(Error::InvalidTimeFormat(_))),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_frame_index_truncates() {
        // 10 s at 29.97 fps is 299.7 frames
        assert_eq!(frame_index(10, 29.97).unwrap(), 299);
        assert_eq!(frame_index(0, 30.0).unwrap(), 0);
        assert!(frame_index(1, 0.0).is_err());
        assert!(frame_index(1, f64::NAN).is_err());
    }

    #[test]
    fn test_resolve_full_clip() {
        // fps=30, 300 frames, 0m0s to 0m10s covers the whole clip
        let range = TimeRange::parse("0m0s", "0m10s").unwrap();
        let resolved = resolve(&range, &clip(30.0, 300)).unwrap();

        assert_eq!(resolved.frames, FrameRange::new(0, 300));
        assert_eq!(resolved.times.len(), 300);
        assert_eq!(resolved.times[0], 0.0);
        assert!((resolved.times[299] - 299.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_resolve_truncates_past_end() {
        let range = TimeRange::parse("0m5s", "0m20s").unwrap();
        let resolved = resolve(&range, &clip(30.0, 300)).unwrap();

        // Frames keep their computed value, times only cover existing frames
        assert_eq!(resolved.frames, FrameRange::new(150, 600));
        assert_eq!(resolved.available(300), FrameRange::new(150, 300));
        assert_eq!(resolved.times.len(), 150);
    }

    #[test]
    fn test_resolve_start_past_end_of_clip() {
        let range = TimeRange::parse("1m0s", "2m0s").unwrap();
        let resolved = resolve(&range, &clip(30.0, 300)).unwrap();

        assert!(resolved.available(300).is_empty());
        assert!(resolved.times.is_empty());
    }

    #[test]
    fn test_range_ordering() {
        assert!(TimeRange::parse("0m1s", "0m2s").unwrap().is_ordered());
        assert!(!TimeRange::parse("0m2s", "0m2s").unwrap().is_ordered());
        assert!(!TimeRange::parse("1m0s", "0m59s").unwrap().is_ordered());
    }

    proptest! {
        #[test]
        fn prop_frame_formula(minutes in 0u32..=120, seconds in 0u32..=59, fps in 1.0f64..240.0) {
            let ts = Timestamp::new(minutes, seconds).unwrap();
            let expected = ((f64::from(minutes) * 60.0 + f64::from(seconds)) * fps).floor() as usize;
            prop_assert_eq!(ts.frame_index(fps).unwrap(), expected);
        }

        #[test]
        fn prop_ordered_seconds_imply_ordered_frames(
            a in 0u32..600, b in 0u32..600, fps in 1.0f64..240.0
        ) {
            let start = Timestamp::new(a / 60, a % 60).unwrap();
            let end = Timestamp::new(b / 60, b % 60).unwrap();
            if TimeRange::new(start, end).is_ordered() {
                prop_assert!(start.frame_index(fps).unwrap() <= end.frame_index(fps).unwrap());
            }
        }

        #[test]
        fn prop_display_parse_roundtrip(minutes in 0u32..1000, seconds in 0u32..=59) {
            let ts = Timestamp::new(minutes, seconds).unwrap();
            prop_assert_eq!(ts.to_string().parse::<Timestamp>().unwrap(), ts);
        }
    }
}
