//! Prelude module for the crate.
//!
//! This module re-exports the public types for convenient access. You can use `use openchart_rs::prelude::*;` to import them at once.

// Re-export diagnostics
#[cfg(feature = "diagnostics")]
pub use crate::diagnostics::{SimpleSource, ToAriadne, collect_sm_reports, emit_sm_warnings};

// Re-export the chart model
pub use crate::chart::{
    Chart, ChartError, ChartEvent, ChartSubscription, PlacementError,
    notify::Subscription,
    obj::{BeatObject, Bpm, ChartObject, HoldNote, TapNote, check_placement},
    tempo::{BeatLines, BeatTime, TimeConverter},
    timeline::{Timeline, TimelineEvent},
    value::{Beat, BeatDuration, KeyCount, KeyIndex, ValueRangeError},
};

// Re-export the format interface
pub use crate::format::{
    ConversionCause, ConversionError, DataValidationError, FormatError, FormatHandler,
    FormatSerializer, ProjectConverter,
};
pub use crate::project::{Project, SongMetadata};

// Re-export formats
#[cfg(feature = "openchart")]
pub use crate::openchart::{
    OpenChartFormat, ProjectData, converter::OpenChartConverter, serializer::OpenChartSerializer,
};
pub use crate::sm::{
    DuplicateFieldPolicy, FieldFormatError, FieldFormatReason, SmConverter, SmFormat,
    SmParseOutput, SmSerializer, SmWarning, SmWarningWithRange, StepFileData, parse_sm,
};
