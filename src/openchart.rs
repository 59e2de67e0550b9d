//! The OpenChart format, the native JSON chart file.
//!
//! A file is a UTF-8 JSON document with camelCase keys:
//!
//! ```json
//! {
//!   "metadata": { "version": "0.1" },
//!   "song": { "artist": "Artist", "title": "Title", "path": "song.ogg" },
//!   "charts": [
//!     {
//!       "author": "Charter",
//!       "chartName": "Hard",
//!       "keyCount": 4,
//!       "bpms": [{ "value": 150.0, "beat": 0.0 }],
//!       "rows": [
//!         { "beat": 0.0, "objects": [{ "type": "tap", "key": 0 }] },
//!         { "beat": 1.5, "objects": [{ "type": "hold", "key": 2, "length": 1.0 }] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! `metadata.version` is required and passed through to [`crate::project::Project::format_version`]. Missing `song` means no song, and missing `charts`, `bpms` or `rows` mean empty ones. Values are validated while converting into the native model, not while parsing JSON.

pub mod converter;
pub mod serializer;

use serde::{Deserialize, Serialize};

use crate::format::{DataValidationError, FormatHandler};

pub use self::{converter::OpenChartConverter, serializer::OpenChartSerializer};

/// The format version written by this crate.
pub const VERSION: &str = "0.1";

/// Top-level object of an OpenChart file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    /// Metadata about the file. Required.
    #[serde(default)]
    pub metadata: Option<ProjectMetadata>,
    /// The song, or `None` if there is no song.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song: Option<SongData>,
    /// The charts.
    #[serde(default)]
    pub charts: Vec<ChartData>,
}

impl ProjectData {
    /// Checks the fields required to convert this into a project.
    ///
    /// # Errors
    ///
    /// Returns [`DataValidationError::MissingField`] if `metadata` or `metadata.version` is missing.
    pub fn validate(&self) -> Result<(), DataValidationError> {
        let metadata = self
            .metadata
            .as_ref()
            .ok_or(DataValidationError::MissingField("metadata"))?;
        metadata
            .version
            .as_ref()
            .ok_or(DataValidationError::MissingField("metadata.version"))?;
        Ok(())
    }
}

/// Metadata about the file format.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    /// The format version of the file. Required.
    #[serde(default)]
    pub version: Option<String>,
}

/// The song metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongData {
    /// The artist.
    #[serde(default)]
    pub artist: String,
    /// The title.
    #[serde(default)]
    pub title: String,
    /// The path to the audio file.
    #[serde(default)]
    pub path: String,
}

/// A chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// Who made the chart.
    #[serde(default)]
    pub author: String,
    /// The name of the chart.
    #[serde(default)]
    pub chart_name: String,
    /// The number of keys. It must be positive.
    pub key_count: i64,
    /// BPM changes.
    #[serde(default)]
    pub bpms: Vec<BpmData>,
    /// Objects grouped by beat.
    #[serde(default)]
    pub rows: Vec<RowData>,
}

/// A BPM change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BpmData {
    /// Beats per minute.
    pub value: f64,
    /// The beat where the tempo changes.
    pub beat: f64,
}

/// Objects placed on the same beat.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowData {
    /// The beat of the objects.
    pub beat: f64,
    /// The objects, one per key at most.
    #[serde(default)]
    pub objects: Vec<ObjectData>,
}

/// The kind of [`ObjectData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A tap note.
    Tap,
    /// A hold note, which requires `length`.
    Hold,
}

/// An object in a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    /// The kind of the object.
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    /// The key where the object is placed.
    pub key: i64,
    /// The length in beats of a hold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
}

/// The OpenChart format handler.
#[derive(Debug, Clone, Default)]
pub struct OpenChartFormat {
    /// The serializer.
    pub serializer: OpenChartSerializer,
    /// The converter.
    pub converter: OpenChartConverter,
}

impl FormatHandler for OpenChartFormat {
    type Data = ProjectData;
    type Serializer = OpenChartSerializer;
    type Converter = OpenChartConverter;

    const NAME: &'static str = "OpenChart";
    const EXTENSION: &'static str = "oc";
    const SUPPORTS_MULTIPLE_EXPORTS: bool = true;

    fn serializer(&self) -> &Self::Serializer {
        &self.serializer
    }

    fn converter(&self) -> &Self::Converter {
        &self.converter
    }
}
