//! JSON reading and writing of [`ProjectData`].

use log::trace;

use super::ProjectData;
use crate::format::{FormatError, FormatSerializer};

/// Converts between JSON bytes and [`ProjectData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenChartSerializer {
    /// Whether to write indented JSON. Defaults to `true`.
    pub pretty: bool,
}

impl Default for OpenChartSerializer {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl OpenChartSerializer {
    /// A serializer writing JSON without whitespace.
    #[must_use]
    pub const fn compact() -> Self {
        Self { pretty: false }
    }
}

fn json_error(path: String, source: serde_json::Error) -> FormatError {
    FormatError::Json { path, source }
}

impl FormatSerializer for OpenChartSerializer {
    type Data = ProjectData;

    fn serialize(&self, data: &ProjectData) -> Result<Vec<u8>, FormatError> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(data)
        } else {
            serde_json::to_vec(data)
        };
        bytes.map_err(|source| json_error(String::new(), source))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<ProjectData, FormatError> {
        let mut deserializer = serde_json::Deserializer::from_slice(bytes);
        let data: ProjectData = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|err| json_error(err.path().to_string(), err.into_inner()))?;
        deserializer
            .end()
            .map_err(|source| json_error(String::new(), source))?;
        trace!("read {} chart(s) from JSON", data.charts.len());
        Ok(data)
    }
}
