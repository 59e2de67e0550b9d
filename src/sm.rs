//! The StepMania `.sm` format.
//!
//! A file is a sequence of `#NAME:value;` records. Header records describe the song and its timing, and each `#NOTES` record is one chart made of six `:`-separated segments:
//!
//! ```text
//! #TITLE:Song;
//! #BPMS:0=120,16=180;
//! #NOTES:
//!      dance-single:
//!      Charter:
//!      Hard:
//!      9:
//!      0.5,0.6,0.1,0.2,0.3:
//! 1000
//! 0100
//! 0010
//! 0001
//! ,
//! 2000
//! 3000
//! 0000
//! 0000
//! ;
//! ```
//!
//! The note grid is split into measures of 4 beats by `,`, and each line in a measure is a row of cells evenly dividing the measure.
//!
//! Parsing is split into the lexer in [`cursor`], the pure value parsers in [`field_parser`] and the header assembly in [`serializer`]. Recoverable oddities of the input, such as an unknown record, are reported as [`SmWarning`]s, while a malformed value aborts the parse with [`FieldFormatError`].

pub mod converter;
pub mod cursor;
pub mod field;
pub mod field_parser;
pub mod mixin;
pub mod serializer;

use std::ops::Range;

use thiserror::Error;

use crate::format::FormatHandler;

use self::mixin::SourceRangeMixin;

pub use self::{
    converter::SmConverter,
    serializer::{SmSerializer, parse_sm},
};

/// A parsed SM file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepFileData {
    /// Text describing the song.
    pub meta: MetaData,
    /// The audio.
    pub song: SongData,
    /// What the song select screen shows.
    pub display: DisplayData,
    /// The timing.
    pub play: PlayData,
    /// The charts from `#NOTES` records, in order of appearance.
    pub charts: Vec<SmChart>,
}

/// Text fields describing the song. Each is `None` if the record is absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetaData {
    /// `#TITLE`.
    pub title: Option<String>,
    /// `#SUBTITLE`.
    pub subtitle: Option<String>,
    /// `#ARTIST`.
    pub artist: Option<String>,
    /// `#TITLETRANSLIT`, the title in Latin letters.
    pub title_translit: Option<String>,
    /// `#SUBTITLETRANSLIT`.
    pub subtitle_translit: Option<String>,
    /// `#ARTISTTRANSLIT`.
    pub artist_translit: Option<String>,
    /// `#GENRE`.
    pub genre: Option<String>,
    /// `#CREDIT`, who made the simfile.
    pub credit: Option<String>,
}

/// The audio of the song.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SongData {
    /// `#MUSIC`, the path to the audio file.
    pub music: Option<String>,
    /// `#SAMPLESTART`, where the preview starts in seconds.
    pub sample_start: Option<f64>,
    /// `#SAMPLELENGTH`, how long the preview plays in seconds.
    pub sample_length: Option<f64>,
}

/// Fields for the song select screen and the background.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayData {
    /// `#BANNER`, the path to the banner image.
    pub banner: Option<String>,
    /// `#BACKGROUND`, the path to the background image.
    pub background: Option<String>,
    /// `#CDTITLE`, the path to the small logo image.
    pub cd_title: Option<String>,
    /// `#LYRICSPATH`, the path to the lyrics file.
    pub lyrics_path: Option<String>,
    /// `#BGCHANGES`, kept as raw text.
    pub bg_changes: Option<String>,
    /// `#FGCHANGES`, kept as raw text.
    pub fg_changes: Option<String>,
    /// `#SELECTABLE`, whether the song is shown on the song select screen.
    pub selectable: Option<bool>,
    /// `#DISPLAYBPM`, the BPM shown instead of the real one.
    pub display_bpm: Option<DisplayBpm>,
}

/// The timing shared by all the charts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayData {
    /// `#OFFSET`, seconds from the start of the audio to beat zero, negated.
    pub offset: Option<f64>,
    /// `#BPMS`.
    pub bpms: Vec<SmBpm>,
    /// `#STOPS`.
    pub stops: Vec<SmStop>,
}

/// The value of `#DISPLAYBPM`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayBpm {
    /// Shows one BPM, such as `150`.
    Fixed(f64),
    /// Shows a range of BPM, such as `120:180`.
    Range {
        /// The lower bound.
        lower: f64,
        /// The upper bound.
        upper: f64,
    },
    /// Shows randomly changing numbers, written as `*`.
    Random,
}

/// An entry of `#BPMS`, written as `beat=value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmBpm {
    /// The beat where the tempo changes.
    pub beat: f64,
    /// Beats per minute.
    pub value: f64,
}

/// An entry of `#STOPS`, written as `beat=seconds`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmStop {
    /// The beat where scrolling stops.
    pub beat: f64,
    /// How long it stops in seconds.
    pub duration: f64,
}

/// A chart from a `#NOTES` record.
#[derive(Debug, Clone, PartialEq)]
pub struct SmChart {
    /// The first segment, the play style.
    pub chart_type: ChartType,
    /// The second segment, the description. Usually the author.
    pub author: String,
    /// The third segment.
    pub difficulty: Difficulty,
    /// The fourth segment, the numeric difficulty rating.
    pub meter: u32,
    /// The fifth segment, the groove radar values.
    pub groove_radar: Vec<f64>,
    /// The sixth segment, the note grid.
    pub measures: Vec<Measure>,
}

/// Rows of a measure, evenly dividing its 4 beats.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Measure {
    /// Cells of each row, one per key.
    pub rows: Vec<Vec<SmNote>>,
}

/// A cell of the note grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SmNote {
    /// `0`, no note.
    #[default]
    Empty,
    /// `1`, a tap note.
    Tap,
    /// `2`, the head of a hold.
    HoldHead,
    /// `3`, the tail of a hold or a roll.
    Tail,
    /// `4`, the head of a roll, which must be tapped repeatedly.
    RollHead,
    /// `M`, a mine not to be hit.
    Mine,
    /// `L`, a note to be released.
    Lift,
    /// `F`, a note without judgement.
    Fake,
    /// `K`, an autoplayed keysound.
    KeySound,
}

impl SmNote {
    /// Reads a cell character. Letters are case-insensitive.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        Some(match c.to_ascii_uppercase() {
            '0' => Self::Empty,
            '1' => Self::Tap,
            '2' => Self::HoldHead,
            '3' => Self::Tail,
            '4' => Self::RollHead,
            'M' => Self::Mine,
            'L' => Self::Lift,
            'F' => Self::Fake,
            'K' => Self::KeySound,
            _ => return None,
        })
    }

    /// The cell character.
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Self::Empty => '0',
            Self::Tap => '1',
            Self::HoldHead => '2',
            Self::Tail => '3',
            Self::RollHead => '4',
            Self::Mine => 'M',
            Self::Lift => 'L',
            Self::Fake => 'F',
            Self::KeySound => 'K',
        }
    }
}

/// The play style of a chart, which decides the number of keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChartType {
    /// `dance-single`, 4 keys.
    DanceSingle,
    /// `dance-double`, 8 keys.
    DanceDouble,
    /// `dance-couple`, 8 keys.
    DanceCouple,
    /// `dance-solo`, 6 keys.
    DanceSolo,
    /// `dance-threepanel`, 3 keys.
    DanceThreePanel,
    /// `pump-single`, 5 keys.
    PumpSingle,
    /// `pump-halfdouble`, 6 keys.
    PumpHalfDouble,
    /// `pump-double`, 10 keys.
    PumpDouble,
    /// `pump-couple`, 10 keys.
    PumpCouple,
    /// `kb7-single`, 7 keys.
    Kb7Single,
    /// Any other style, with its name as written.
    Other(String),
}

impl ChartType {
    const KNOWN: [(Self, &'static str, u32); 10] = [
        (Self::DanceSingle, "dance-single", 4),
        (Self::DanceDouble, "dance-double", 8),
        (Self::DanceCouple, "dance-couple", 8),
        (Self::DanceSolo, "dance-solo", 6),
        (Self::DanceThreePanel, "dance-threepanel", 3),
        (Self::PumpSingle, "pump-single", 5),
        (Self::PumpHalfDouble, "pump-halfdouble", 6),
        (Self::PumpDouble, "pump-double", 10),
        (Self::PumpCouple, "pump-couple", 10),
        (Self::Kb7Single, "kb7-single", 7),
    ];

    /// Reads a style name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|(_, known, _)| known.eq_ignore_ascii_case(name))
            .map_or_else(|| Self::Other(name.to_owned()), |(ty, _, _)| ty.clone())
    }

    /// The style name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Other(name) => name,
            known => Self::KNOWN
                .iter()
                .find(|(ty, _, _)| ty == known)
                .map_or("", |(_, name, _)| name),
        }
    }

    /// The number of keys of the style, or `None` for [`ChartType::Other`].
    #[must_use]
    pub fn key_count(&self) -> Option<u32> {
        Self::KNOWN
            .iter()
            .find(|(ty, _, _)| ty == self)
            .map(|(_, _, keys)| *keys)
    }

    /// The usual style for `keys` keys.
    #[must_use]
    pub const fn from_key_count(keys: u32) -> Option<Self> {
        Some(match keys {
            3 => Self::DanceThreePanel,
            4 => Self::DanceSingle,
            5 => Self::PumpSingle,
            6 => Self::DanceSolo,
            7 => Self::Kb7Single,
            8 => Self::DanceDouble,
            10 => Self::PumpDouble,
            _ => return None,
        })
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The difficulty slot of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Difficulty {
    /// `Beginner`.
    Beginner,
    /// `Easy`, also `Basic` and `Light` in older files.
    Easy,
    /// `Medium`, also `Another`, `Trick`, `Standard` and `Difficult` in older files.
    Medium,
    /// `Hard`, also `SSR`, `Maniac` and `Heavy` in older files.
    Hard,
    /// `Challenge`, also `SManiac`, `Expert` and `Oni` in older files.
    Challenge,
    /// `Edit`, a user-made chart.
    Edit,
    /// Any other name, as written.
    Other(String),
}

impl Difficulty {
    /// Reads a difficulty name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "beginner" => Self::Beginner,
            "easy" | "basic" | "light" => Self::Easy,
            "medium" | "another" | "trick" | "standard" | "difficult" => Self::Medium,
            "hard" | "ssr" | "maniac" | "heavy" => Self::Hard,
            "challenge" | "smaniac" | "expert" | "oni" => Self::Challenge,
            "edit" => Self::Edit,
            _ => Self::Other(name.to_owned()),
        }
    }

    /// The modern name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Beginner => "Beginner",
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Challenge => "Challenge",
            Self::Edit => "Edit",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How to treat a header record appearing twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DuplicateFieldPolicy {
    /// Keeps the first value.
    UseOlder,
    /// Takes the last value, like StepMania does.
    #[default]
    UseNewer,
    /// Fails with [`FieldFormatReason::Duplicated`].
    Halt,
}

/// Why a field value was rejected.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum FieldFormatReason {
    /// A token is not a finite number.
    #[error("expected a number")]
    InvalidNumber,
    /// A list entry is not a `beat=value` pair.
    #[error("expected a `beat=value` pair")]
    MalformedPair,
    /// The display BPM has too many `:`.
    #[error("expected `*`, a number or `lower:upper`")]
    MalformedDisplayBpm,
    /// A boolean is not one of `YES` and `NO`.
    #[error("expected `YES` or `NO`")]
    InvalidBool,
    /// The record has a wrong number of `:`-separated segments.
    #[error("expected {expected} segments, but found {found}")]
    SegmentCount {
        /// Segments required.
        expected: usize,
        /// Segments found.
        found: usize,
    },
    /// A note grid cell is not a known note.
    #[error("unknown note `{0}`")]
    UnknownNote(char),
    /// A note grid row has a different number of cells from the others.
    #[error("expected rows of {expected} cells, but found {found}")]
    InconsistentRowWidth {
        /// Cells of the other rows.
        expected: usize,
        /// Cells of this row.
        found: usize,
    },
    /// The record appeared twice under [`DuplicateFieldPolicy::Halt`].
    #[error("the field is duplicated")]
    Duplicated,
    /// The text would not be read back as written, as it has a line break, `;`, `//`, surrounding whitespaces, or `:` inside `#NOTES`.
    #[error("the text cannot be written in this field")]
    UnwritableText,
}

/// A malformed value of an SM record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid #{field} value `{content}`: {reason}")]
pub struct FieldFormatError {
    /// The record name, such as `BPMS`.
    pub field: String,
    /// The rejected text.
    pub content: String,
    /// Why it was rejected.
    #[source]
    pub reason: FieldFormatReason,
    /// Where the value is in the source, if parsed from a file.
    pub range: Option<Range<usize>>,
}

impl FieldFormatError {
    /// Creates an error without a source range.
    pub fn new(
        field: impl Into<String>,
        content: impl Into<String>,
        reason: FieldFormatReason,
    ) -> Self {
        Self {
            field: field.into(),
            content: content.into(),
            reason,
            range: None,
        }
    }

    /// Attaches the range in the source where the value is.
    #[must_use]
    pub fn with_range(mut self, range: Range<usize>) -> Self {
        self.range = Some(range);
        self
    }
}

/// A recoverable oddity found while reading an SM file.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum SmWarning {
    /// A record is not known. It was ignored.
    #[error("unknown field #{name}")]
    UnknownField {
        /// The record name.
        name: String,
    },
    /// A header record appeared twice. It was resolved by [`DuplicateFieldPolicy`].
    #[error("duplicated field #{name}")]
    DuplicateField {
        /// The record name.
        name: String,
    },
    /// A record was not closed by `;`. It was closed at the next record or the end of file.
    #[error("field #{name} is not terminated by `;`")]
    MissingSemicolon {
        /// The record name.
        name: String,
    },
    /// Text not in any record. It was skipped.
    #[error("text outside of fields")]
    TextOutsideField,
}

/// [`SmWarning`] with the range in the source.
pub type SmWarningWithRange = SourceRangeMixin<SmWarning>;

/// The result of [`parse_sm`]: the data and the warnings found.
#[derive(Debug, Clone, PartialEq)]
pub struct SmParseOutput {
    /// The parsed data.
    pub data: StepFileData,
    /// Warnings in order of appearance.
    pub warnings: Vec<SmWarningWithRange>,
}

/// The StepMania format handler.
#[derive(Debug, Clone, Default)]
pub struct SmFormat {
    /// The serializer.
    pub serializer: SmSerializer,
    /// The converter.
    pub converter: SmConverter,
}

impl FormatHandler for SmFormat {
    type Data = StepFileData;
    type Serializer = SmSerializer;
    type Converter = SmConverter;

    const NAME: &'static str = "StepMania";
    const EXTENSION: &'static str = "sm";
    const SUPPORTS_MULTIPLE_EXPORTS: bool = true;

    fn serializer(&self) -> &Self::Serializer {
        &self.serializer
    }

    fn converter(&self) -> &Self::Converter {
        &self.converter
    }
}
