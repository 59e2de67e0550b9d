//! The interface for chart file formats.
//!
//! A format is plugged in as a [`FormatHandler`], which pairs two stages:
//!
//! - [`FormatSerializer`] converts between raw bytes and a format-specific data object, such as [`crate::sm::StepFileData`]. It must round trip every data object its converter can produce.
//! - [`ProjectConverter`] converts between that data object and the native [`Project`]. Loading validates the data object, and saving fails only when the project uses something the format cannot express.

use log::debug;
use thiserror::Error;

use crate::{
    chart::{
        ChartError, PlacementError,
        value::{Beat, KeyIndex, ValueRangeError},
    },
    project::Project,
    sm::FieldFormatError,
};

/// A data object failed its structural validation.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataValidationError {
    /// A required field is missing or null.
    #[error("required field `{0}` is missing")]
    MissingField(&'static str),
    /// A hold tail has no head before it on the same key.
    #[error("hold tail at beat {beat} of key {key} has no head")]
    HoldTailWithoutHead {
        /// The key of the tail.
        key: KeyIndex,
        /// The beat of the tail.
        beat: Beat,
    },
    /// A hold head is not closed by a tail on the same key.
    #[error("hold head at beat {beat} of key {key} has no tail")]
    HoldHeadWithoutTail {
        /// The key of the head.
        key: KeyIndex,
        /// The beat of the head.
        beat: Beat,
    },
}

/// What made a conversion fail.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionCause {
    /// The data object is malformed.
    #[error(transparent)]
    Validation(#[from] DataValidationError),
    /// The data object holds an invalid chart.
    #[error(transparent)]
    Chart(#[from] ChartError),
    /// A field of the data object has a malformed value.
    #[error(transparent)]
    Field(#[from] FieldFormatError),
    /// The format cannot express the data.
    #[error("unsupported by the format: {0}")]
    Unsupported(String),
}

impl From<PlacementError> for ConversionCause {
    fn from(value: PlacementError) -> Self {
        Self::Chart(value.into())
    }
}

impl From<ValueRangeError> for ConversionCause {
    fn from(value: ValueRangeError) -> Self {
        Self::Chart(value.into())
    }
}

/// An error of a [`ProjectConverter`], carrying its cause as the source.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Converting a data object into a project failed.
    #[error("failed to load the project data")]
    Load(#[source] ConversionCause),
    /// Converting a project into a data object failed.
    #[error("failed to store the project data")]
    Store(#[source] ConversionCause),
}

impl ConversionError {
    /// The underlying cause.
    #[must_use]
    pub const fn cause(&self) -> &ConversionCause {
        match self {
            Self::Load(cause) | Self::Store(cause) => cause,
        }
    }
}

/// An error of loading or saving a project through a [`FormatHandler`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FormatError {
    /// The JSON document is malformed or has a value of unexpected type.
    #[cfg(feature = "openchart")]
    #[error("invalid JSON at `{path}`: {source}")]
    Json {
        /// The path to the value failed, such as `charts[0].keyCount`.
        path: String,
        /// The error from the JSON parser.
        #[source]
        source: serde_json::Error,
    },
    /// The input is not valid UTF-8.
    #[error("input is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// A text field has a malformed value.
    #[error(transparent)]
    Field(#[from] FieldFormatError),
    /// The data object could not be converted.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    /// Formatting the output text failed.
    #[error("failed to write the text: {0}")]
    Write(#[from] std::fmt::Error),
}

/// Converts between raw bytes and the data object of a format.
pub trait FormatSerializer {
    /// The data object.
    type Data;

    /// Writes `data` into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if `data` cannot be written.
    fn serialize(&self, data: &Self::Data) -> Result<Vec<u8>, FormatError>;

    /// Reads a data object from `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if `bytes` is malformed.
    fn deserialize(&self, bytes: &[u8]) -> Result<Self::Data, FormatError>;
}

/// Converts between the data object of a format and [`Project`].
pub trait ProjectConverter {
    /// The data object.
    type Data;

    /// Validates `data` and builds a project from it.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Load`] with the validation failure.
    fn to_native(&self, data: Self::Data) -> Result<Project, ConversionError>;

    /// Builds a data object from `project`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Store`] if the format cannot express `project`.
    fn from_native(&self, project: &Project) -> Result<Self::Data, ConversionError>;
}

/// A chart file format, pairing a [`FormatSerializer`] and a [`ProjectConverter`] on the same data object.
pub trait FormatHandler {
    /// The data object shared by the serializer and the converter.
    type Data;
    /// The serializer.
    type Serializer: FormatSerializer<Data = Self::Data>;
    /// The converter.
    type Converter: ProjectConverter<Data = Self::Data>;

    /// The display name of the format.
    const NAME: &'static str;
    /// The file extension without the leading dot.
    const EXTENSION: &'static str;
    /// Whether a file can hold many charts. Otherwise each chart must be exported into its own file.
    const SUPPORTS_MULTIPLE_EXPORTS: bool;

    /// The serializer.
    fn serializer(&self) -> &Self::Serializer;

    /// The converter.
    fn converter(&self) -> &Self::Converter;

    /// Reads a project from `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] from the serializer or the converter.
    fn load(&self, bytes: &[u8]) -> Result<Project, FormatError> {
        let data = self.serializer().deserialize(bytes)?;
        let project = self.converter().to_native(data)?;
        debug!(
            "loaded {} chart(s) from a {} file",
            project.charts.len(),
            Self::NAME
        );
        Ok(project)
    }

    /// Writes `project` into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] from the converter or the serializer.
    fn save(&self, project: &Project) -> Result<Vec<u8>, FormatError> {
        let data = self.converter().from_native(project)?;
        let bytes = self.serializer().serialize(&data)?;
        debug!(
            "saved {} chart(s) into a {} file",
            project.charts.len(),
            Self::NAME
        );
        Ok(bytes)
    }
}
