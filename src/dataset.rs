//! Clip metadata and per-clip coordinate arrays stored on disk.
//!
//! The coordinate directory holds a `meta.json` mapping each clip id to its
//! frame rate and frame count, and one `<clip id>.npy` array per clip with
//! shape `(num_frames, 21, axes)`.

use crate::{
    constants::{COORDINATE_FILE_EXTENSION, MIN_COORDINATE_AXES, NUM_KEYPOINTS},
    Error, Result,
};
use log::{debug, info};
use ndarray::{Array3, ArrayD, Ix3};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Frame rate and length of one clip
#[derive(Debug, Clone, PartialEq)]
pub struct ClipMetadata {
    pub clip_id: String,
    pub fps: f64,
    pub num_frames: usize,
}

impl ClipMetadata {
    /// Create metadata after checking the values are usable
    ///
    /// # Errors
    ///
    /// Returns `DataFormat` if `fps` is not positive and finite or `num_frames` is zero
    pub fn new(clip_id: impl Into<String>, fps: f64, num_frames: usize) -> Result<Self> {
        let clip_id = clip_id.into();
        if !(fps.is_finite() && fps > 0.0) {
            return Err(Error::DataFormat(format!("Clip '{clip_id}' has invalid fps {fps}")));
        }
        if num_frames == 0 {
            return Err(Error::DataFormat(format!("Clip '{clip_id}' has no frames")));
        }
        Ok(Self {
            clip_id,
            fps,
            num_frames,
        })
    }

    /// Clip length in seconds
    #[must_use]
    pub fn duration(&self) -> f64 {
        crate::utils::safe_cast::usize_to_f64(self.num_frames) / self.fps
    }
}

#[derive(Debug, Deserialize)]
struct MetadataEntry {
    fps: f64,
    num_frames: usize,
}

/// All known clips, keyed by clip id
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    clips: BTreeMap<String, ClipMetadata>,
}

impl MetadataStore {
    /// Load the metadata JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_json_str(&content)?;
        info!("Loaded metadata for {} clips from {}", store.len(), path.display());
        Ok(store)
    }

    /// Decode metadata JSON; a leading byte order mark is ignored
    ///
    /// # Errors
    ///
    /// Returns `Json` for malformed JSON and `DataFormat` for unusable values
    pub fn from_json_str(content: &str) -> Result<Self> {
        let entries: BTreeMap<String, MetadataEntry> = serde_json::from_str(content.trim_start_matches('\u{feff}'))?;

        entries
            .into_iter()
            .map(|(clip_id, entry)| ClipMetadata::new(clip_id, entry.fps, entry.num_frames))
            .collect::<Result<Vec<_>>>()
            .map(Self::from_clips)
    }

    /// Build a store from already known clips
    pub fn from_clips(clips: impl IntoIterator<Item = ClipMetadata>) -> Self {
        Self {
            clips: clips.into_iter().map(|clip| (clip.clip_id.clone(), clip)).collect(),
        }
    }

    /// Metadata of a clip
    ///
    /// # Errors
    ///
    /// Returns `UnknownClip` if the id is not in the store
    pub fn get(&self, clip_id: &str) -> Result<&ClipMetadata> {
        self.clips
            .get(clip_id)
            .ok_or_else(|| Error::UnknownClip(clip_id.to_string()))
    }

    /// Clip ids in sorted order
    pub fn clip_ids(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// Provider of coordinate arrays for clips
pub trait CoordinateSource {
    /// Load the full coordinate array of a clip
    ///
    /// # Errors
    ///
    /// Returns an error if the array is missing or does not match the clip
    fn load(&self, clip: &ClipMetadata) -> Result<Arc<Array3<f64>>>;
}

/// Reads `<clip id>.npy` files from a directory
#[derive(Debug, Clone)]
pub struct CoordinateStore {
    dir: PathBuf,
}

impl CoordinateStore {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a clip's coordinate file
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the clip id is empty or contains path components
    pub fn path_for(&self, clip_id: &str) -> Result<PathBuf> {
        if clip_id.is_empty() || clip_id.contains(['/', '\\']) || clip_id.starts_with('.') {
            return Err(Error::InvalidInput(format!("Malformed clip id '{clip_id}'")));
        }
        Ok(self.dir.join(format!("{clip_id}.{COORDINATE_FILE_EXTENSION}")))
    }
}

impl CoordinateSource for CoordinateStore {
    fn load(&self, clip: &ClipMetadata) -> Result<Arc<Array3<f64>>> {
        let path = self.path_for(&clip.clip_id)?;
        let array = check_shape(read_npy(&path)?, clip, &path)?;
        info!("Loaded coordinates {:?} from {}", array.shape(), path.display());
        Ok(Arc::new(array))
    }
}

/// Read an array stored as float64, falling back to float32
fn read_npy(path: &Path) -> Result<ArrayD<f64>> {
    use ndarray_npy::ReadNpyExt;

    let as_f64 = ArrayD::<f64>::read_npy(BufReader::new(File::open(path)?));
    match as_f64 {
        Ok(array) => Ok(array),
        Err(f64_err) => ArrayD::<f32>::read_npy(BufReader::new(File::open(path)?))
            .map(|array| array.mapv(f64::from))
            .map_err(|_| Error::DataFormat(format!("NPY read error at {}: {f64_err}", path.display()))),
    }
}

/// Verify an array has shape `(num_frames, 21, >=2)`
fn check_shape(array: ArrayD<f64>, clip: &ClipMetadata, path: &Path) -> Result<Array3<f64>> {
    let shape = array.shape().to_vec();
    let array = array.into_dimensionality::<Ix3>().map_err(|e| {
        Error::DataFormat(format!(
            "Expected 3-D keypoint array in {}, got shape {shape:?}: {e}",
            path.display()
        ))
    })?;

    let (frames, keypoints, axes) = array.dim();
    if keypoints != NUM_KEYPOINTS || axes < MIN_COORDINATE_AXES {
        return Err(Error::DataFormat(format!(
            "Expected shape (frames, {NUM_KEYPOINTS}, >={MIN_COORDINATE_AXES}) in {}, got {shape:?}",
            path.display()
        )));
    }
    if frames != clip.num_frames {
        return Err(Error::DataFormat(format!(
            "{} holds {frames} frames but clip '{}' has {}",
            path.display(),
            clip.clip_id,
            clip.num_frames
        )));
    }

    Ok(array)
}

/// Read-through cache in front of another source, keyed by clip id
pub struct CachedCoordinateStore<S> {
    inner: S,
    cache: RefCell<HashMap<String, Arc<Array3<f64>>>>,
}

impl<S: CoordinateSource> CachedCoordinateStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Number of clips held in memory
    #[must_use]
    pub fn cached_clips(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl<S: CoordinateSource> CoordinateSource for CachedCoordinateStore<S> {
    fn load(&self, clip: &ClipMetadata) -> Result<Arc<Array3<f64>>> {
        if let Some(array) = self.cache.borrow().get(&clip.clip_id) {
            debug!("Coordinate cache hit for '{}'", clip.clip_id);
            return Ok(Arc::clone(array));
        }

        let array = self.inner.load(clip)?;
        self.cache
            .borrow_mut()
            .insert(clip.clip_id.clone(), Arc::clone(&array));
        Ok(array)
    }
}
