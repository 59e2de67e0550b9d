//! A song with its charts.

use crate::chart::Chart;

/// Metadata of the song which charts are played along.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SongMetadata {
    /// The artist of the song.
    pub artist: String,
    /// The title of the song.
    pub title: String,
    /// The path to the audio file, relative to the chart file.
    pub audio_file_path: String,
}

/// Charts for one song, the unit saved into and loaded from a chart file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Project {
    /// The name of the project.
    pub name: String,
    /// The song, or `None` if not chosen yet.
    pub song: Option<SongMetadata>,
    /// The charts in order.
    pub charts: Vec<Chart>,
    /// The format version declared by the file this project was loaded from.
    pub format_version: Option<String>,
}

impl Project {
    /// Creates an empty project.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the song metadata.
    #[must_use]
    pub fn with_song(mut self, song: SongMetadata) -> Self {
        self.song = Some(song);
        self
    }

    /// Appends a chart.
    pub fn push_chart(&mut self, chart: Chart) {
        self.charts.push(chart);
    }
}
