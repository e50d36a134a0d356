//! Validate, resolve and extract: the analysis shared by both front ends.

use crate::{
    dataset::{ClipMetadata, CoordinateSource, MetadataStore},
    keypoints::KeypointId,
    signal::{extract, AnalysisMethod, AnglePolicy, Selection, Signal},
    time_range::{resolve, FrameRange, TimeRange},
    validation::validate,
    Result,
};
use log::info;
use ndarray::ArrayView3;

/// Raw user request, not yet validated
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub clip_id: String,
    pub range: TimeRange,
    pub method: AnalysisMethod,
    pub keypoints: Vec<KeypointId>,
}

impl AnalysisRequest {
    pub fn new(
        clip_id: impl Into<String>,
        range: TimeRange,
        method: AnalysisMethod,
        keypoints: Vec<KeypointId>,
    ) -> Self {
        Self {
            clip_id: clip_id.into(),
            range,
            method,
            keypoints,
        }
    }

    /// Check the request without touching any data
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` or `KeypointCountMismatch`
    pub fn validate(&self) -> Result<Selection> {
        validate(&self.range, self.method, &self.keypoints)
    }
}

/// Result of one analysis request
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub clip: ClipMetadata,
    pub range: TimeRange,
    pub selection: Selection,
    /// Frame range computed from the time range, before truncation
    pub frames: FrameRange,
    pub signal: Signal,
}

/// Run a request against an already loaded coordinate array
///
/// # Errors
///
/// Returns a validation error, or an error if the clip's fps is unusable
pub fn analyze(
    request: &AnalysisRequest,
    clip: &ClipMetadata,
    coordinates: ArrayView3<'_, f64>,
    policy: AnglePolicy,
) -> Result<Analysis> {
    let selection = request.validate()?;
    analyze_selection(selection, request.range, clip, coordinates, policy)
}

fn analyze_selection(
    selection: Selection,
    range: TimeRange,
    clip: &ClipMetadata,
    coordinates: ArrayView3<'_, f64>,
    policy: AnglePolicy,
) -> Result<Analysis> {
    let resolved = resolve(&range, clip)?;
    let signal = extract(coordinates, resolved.frames, &selection, &resolved.times, policy);

    Ok(Analysis {
        clip: clip.clone(),
        range,
        selection,
        frames: resolved.frames,
        signal,
    })
}

/// Runs requests against a metadata store and a coordinate source
pub struct Analyzer<'a, S> {
    metadata: &'a MetadataStore,
    source: &'a S,
    policy: AnglePolicy,
}

impl<'a, S: CoordinateSource> Analyzer<'a, S> {
    pub fn new(metadata: &'a MetadataStore, source: &'a S, policy: AnglePolicy) -> Self {
        Self {
            metadata,
            source,
            policy,
        }
    }

    #[must_use]
    pub fn metadata(&self) -> &MetadataStore {
        self.metadata
    }

    /// Validate, then load the clip and analyze it
    ///
    /// # Errors
    ///
    /// Validation errors are returned before any lookup or file access;
    /// afterwards `UnknownClip`, I/O and data format errors propagate.
    pub fn run(&self, request: &AnalysisRequest) -> Result<Analysis> {
        let selection = request.validate()?;
        let clip = self.metadata.get(&request.clip_id)?;
        let coordinates = self.source.load(clip)?;

        info!(
            "Analyzing {} of '{}' over {} for {:?}",
            request.method,
            clip.clip_id,
            request.range,
            selection.keypoints().iter().map(|k| k.index()).collect::<Vec<_>>()
        );

        analyze_selection(selection, request.range, clip, coordinates.view(), self.policy)
    }
}
