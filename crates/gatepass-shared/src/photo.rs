use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// A captured still image, kept as a `data:` URI so it can be stored and
/// handed to the pass renderer without any file handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Photo(String);

impl Photo {
    /// Encode raw JPEG bytes from the camera.
    pub fn from_jpeg(bytes: &[u8]) -> Self {
        Self::from_bytes("image/jpeg", bytes)
    }

    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
    }

    /// Wrap a data URI produced elsewhere (e.g. by a browser canvas).
    pub fn from_data_uri(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_data_uri(&self) -> &str {
        &self.0
    }

    pub fn into_data_uri(self) -> String {
        self.0
    }

    /// Decode the image payload, if the URI is a base64 data URI.
    pub fn decode(&self) -> Option<Vec<u8>> {
        let (_, payload) = self.0.strip_prefix("data:")?.split_once(";base64,")?;
        STANDARD.decode(payload).ok()
    }
}
