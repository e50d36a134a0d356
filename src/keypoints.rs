//! Registry of the 21 canonical hand landmarks.
//!
//! Indices follow the MediaPipe hand model: the wrist is 0, then four joints
//! for each finger from thumb to pinky, base to tip.

use crate::{constants::NUM_KEYPOINTS, signal::AnalysisMethod, Error, Result};
use std::fmt;
use std::str::FromStr;

/// Canonical landmark names, indexed by keypoint id
pub const KEYPOINT_NAMES: [&str; NUM_KEYPOINTS] = [
    "WRIST",
    "THUMB_CMC",
    "THUMB_MCP",
    "THUMB_IP",
    "THUMB_TIP",
    "INDEX_FINGER_MCP",
    "INDEX_FINGER_PIP",
    "INDEX_FINGER_DIP",
    "INDEX_FINGER_TIP",
    "MIDDLE_FINGER_MCP",
    "MIDDLE_FINGER_PIP",
    "MIDDLE_FINGER_DIP",
    "MIDDLE_FINGER_TIP",
    "RING_FINGER_MCP",
    "RING_FINGER_PIP",
    "RING_FINGER_DIP",
    "RING_FINGER_TIP",
    "PINKY_MCP",
    "PINKY_PIP",
    "PINKY_DIP",
    "PINKY_TIP",
];

/// Index of a hand landmark, always within `0..NUM_KEYPOINTS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeypointId(u8);

impl KeypointId {
    pub const WRIST: Self = Self(0);
    pub const THUMB_MCP: Self = Self(2);
    pub const THUMB_IP: Self = Self(3);
    pub const THUMB_TIP: Self = Self(4);
    pub const MIDDLE_FINGER_PIP: Self = Self(10);
    pub const PINKY_TIP: Self = Self(20);

    /// Look up a keypoint by index
    ///
    /// # Errors
    ///
    /// Returns `UnknownKeypoint` if the index is 21 or larger
    pub fn new(index: usize) -> Result<Self> {
        u8::try_from(index)
            .ok()
            .filter(|&i| usize::from(i) < NUM_KEYPOINTS)
            .map(Self)
            .ok_or_else(|| Error::UnknownKeypoint(index.to_string()))
    }

    /// Position of this keypoint along the keypoint axis of a coordinate array
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Canonical name
    #[must_use]
    pub fn name(self) -> &'static str {
        KEYPOINT_NAMES[self.index()]
    }

    /// All keypoints in index order
    pub fn all() -> impl Iterator<Item = Self> {
        (0..NUM_KEYPOINTS as u8).map(Self)
    }
}

/// Resolve a canonical name to its id. Matching ignores ASCII case.
///
/// # Errors
///
/// Returns `UnknownKeypoint` for names outside the registry
pub fn name_to_id(name: &str) -> Result<KeypointId> {
    let name = name.trim();
    KEYPOINT_NAMES
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(name))
        .and_then(|index| KeypointId::new(index).ok())
        .ok_or_else(|| Error::UnknownKeypoint(name.to_string()))
}

/// Canonical name of a keypoint id
#[must_use]
pub fn id_to_name(id: KeypointId) -> &'static str {
    id.name()
}

/// Keypoints preselected for each method in the interactive form
#[must_use]
pub fn default_selection(method: AnalysisMethod) -> Vec<KeypointId> {
    match method {
        AnalysisMethod::Track => vec![KeypointId::MIDDLE_FINGER_PIP],
        AnalysisMethod::Distance => vec![KeypointId::PINKY_TIP, KeypointId::THUMB_TIP],
        AnalysisMethod::Angle => vec![KeypointId::THUMB_TIP, KeypointId::THUMB_IP, KeypointId::THUMB_MCP],
    }
}

/// Parse a list of keypoints separated by commas or whitespace
///
/// # Errors
///
/// Returns `UnknownKeypoint` for the first entry that is neither a valid
/// index nor a canonical name
pub fn parse_selection(input: &str) -> Result<Vec<KeypointId>> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}

impl FromStr for KeypointId {
    type Err = Error;

    /// Accepts either an integer index or a canonical name
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.parse::<usize>() {
            Ok(index) => Self::new(index),
            Err(_) => name_to_id(s),
        }
    }
}

impl fmt::Display for KeypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<KeypointId> for usize {
    fn from(id: KeypointId) -> Self {
        id.index()
    }
}
