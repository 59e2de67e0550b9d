//! Header records known by this crate.

/// A header record of an SM file. `#NOTES` is not a header record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeaderField {
    /// `#TITLE`.
    Title,
    /// `#SUBTITLE`.
    Subtitle,
    /// `#ARTIST`.
    Artist,
    /// `#TITLETRANSLIT`.
    TitleTranslit,
    /// `#SUBTITLETRANSLIT`.
    SubtitleTranslit,
    /// `#ARTISTTRANSLIT`.
    ArtistTranslit,
    /// `#GENRE`.
    Genre,
    /// `#CREDIT`.
    Credit,
    /// `#BANNER`.
    Banner,
    /// `#BACKGROUND`.
    Background,
    /// `#LYRICSPATH`.
    LyricsPath,
    /// `#CDTITLE`.
    CdTitle,
    /// `#MUSIC`.
    Music,
    /// `#OFFSET`.
    Offset,
    /// `#SAMPLESTART`.
    SampleStart,
    /// `#SAMPLELENGTH`.
    SampleLength,
    /// `#SELECTABLE`.
    Selectable,
    /// `#DISPLAYBPM`.
    DisplayBpm,
    /// `#BPMS`.
    Bpms,
    /// `#STOPS`.
    Stops,
    /// `#BGCHANGES`.
    BgChanges,
    /// `#FGCHANGES`.
    FgChanges,
}

impl HeaderField {
    /// All the fields, in the order they are written.
    pub const ALL: [Self; 22] = [
        Self::Title,
        Self::Subtitle,
        Self::Artist,
        Self::TitleTranslit,
        Self::SubtitleTranslit,
        Self::ArtistTranslit,
        Self::Genre,
        Self::Credit,
        Self::Banner,
        Self::Background,
        Self::LyricsPath,
        Self::CdTitle,
        Self::Music,
        Self::Offset,
        Self::SampleStart,
        Self::SampleLength,
        Self::Selectable,
        Self::DisplayBpm,
        Self::Bpms,
        Self::Stops,
        Self::BgChanges,
        Self::FgChanges,
    ];

    /// The record name without `#`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "TITLE",
            Self::Subtitle => "SUBTITLE",
            Self::Artist => "ARTIST",
            Self::TitleTranslit => "TITLETRANSLIT",
            Self::SubtitleTranslit => "SUBTITLETRANSLIT",
            Self::ArtistTranslit => "ARTISTTRANSLIT",
            Self::Genre => "GENRE",
            Self::Credit => "CREDIT",
            Self::Banner => "BANNER",
            Self::Background => "BACKGROUND",
            Self::LyricsPath => "LYRICSPATH",
            Self::CdTitle => "CDTITLE",
            Self::Music => "MUSIC",
            Self::Offset => "OFFSET",
            Self::SampleStart => "SAMPLESTART",
            Self::SampleLength => "SAMPLELENGTH",
            Self::Selectable => "SELECTABLE",
            Self::DisplayBpm => "DISPLAYBPM",
            Self::Bpms => "BPMS",
            Self::Stops => "STOPS",
            Self::BgChanges => "BGCHANGES",
            Self::FgChanges => "FGCHANGES",
        }
    }

    /// Finds the field by an uppercased record name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl std::fmt::Display for HeaderField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.name())
    }
}
