use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use base64::Engine as _;

use crate::foundation::error::{ReelError, ReelResult};

/// Locator for one media input (still image or audio).
///
/// Locators are written as strings in requests: a filesystem path (optionally `file://`-prefixed)
/// or a `data:<mime>;base64,<payload>` URI. In-process callers can hand over bytes directly.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MediaSource {
    /// File on the local filesystem.
    Path(PathBuf),
    /// Inline `data:` URI.
    DataUri(String),
    /// Remote URL; recognized so it can be rejected with a clear error.
    Remote(String),
    /// Encoded bytes already in memory.
    Bytes(Arc<[u8]>),
}

impl MediaSource {
    /// Parse a locator string. Blank strings mean "no source" and return `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.starts_with("data:") {
            return Some(Self::DataUri(raw.to_owned()));
        }
        if let Some(path) = raw.strip_prefix("file://") {
            return Some(Self::Path(PathBuf::from(path)));
        }
        if raw.contains("://") || raw.starts_with("blob:") {
            return Some(Self::Remote(raw.to_owned()));
        }
        Some(Self::Path(PathBuf::from(raw)))
    }

    /// Locator for a filesystem path.
    pub fn path(path: impl AsRef<Path>) -> Self {
        Self::Path(path.as_ref().to_path_buf())
    }

    /// Locator for encoded bytes held in memory.
    pub fn bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Make a relative path locator relative to `base`; other locators are returned unchanged.
    pub fn resolved_against(self, base: &Path) -> Self {
        match self {
            Self::Path(path) if path.is_relative() => Self::Path(base.join(path)),
            other => other,
        }
    }

    /// Read the encoded bytes behind this locator.
    ///
    /// Unreachable sources fail with [`ReelError::AssetLoad`].
    pub fn read_bytes(&self) -> ReelResult<Arc<[u8]>> {
        match self {
            Self::Path(path) => std::fs::read(path).map(Arc::from).map_err(|e| {
                ReelError::asset_load(format!("failed to read '{}': {e}", path.display()))
            }),
            Self::DataUri(uri) => decode_data_uri(uri).map(Arc::from),
            Self::Remote(url) => Err(ReelError::asset_load(format!(
                "remote locator '{url}' is not supported; fetch it and pass bytes or a path"
            ))),
            Self::Bytes(bytes) => Ok(bytes.clone()),
        }
    }

    /// Short human-readable description used in logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::DataUri(uri) => {
                let header = uri.split(',').next().unwrap_or("data:");
                format!("{header},<{} chars>", uri.len().saturating_sub(header.len()))
            }
            Self::Remote(url) => url.clone(),
            Self::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

impl fmt::Debug for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MediaSource").field(&self.describe()).finish()
    }
}

impl TryFrom<String> for MediaSource {
    type Error = ReelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| ReelError::validation("media locator must be non-empty"))
    }
}

impl From<MediaSource> for String {
    fn from(value: MediaSource) -> Self {
        match value {
            MediaSource::Path(path) => path.display().to_string(),
            MediaSource::DataUri(uri) | MediaSource::Remote(uri) => uri,
            MediaSource::Bytes(bytes) => format!(
                "data:application/octet-stream;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(&bytes)
            ),
        }
    }
}

fn decode_data_uri(uri: &str) -> ReelResult<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ReelError::asset_load("data uri must start with 'data:'"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ReelError::asset_load("data uri is missing the ',' separator"))?;

    if header.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ReelError::asset_load(format!("invalid base64 in data uri: {e}")))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
