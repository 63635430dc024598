use serde::Deserialize;

// ============================================================================
// Failure bodies
// ============================================================================

/// Decoded non-2xx body. Accepts a bare `{message}` (also the JSend error
/// shape) and the JSend fail shape `{data: {message}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Flat { message: String },
    Wrapped { data: FailData },
}

#[derive(Debug, Deserialize)]
pub struct FailData {
    pub message: String,
}

impl ErrorBody {
    /// Extract the message from raw response bytes, if the body carries one.
    pub fn message_from(body: &[u8]) -> Option<String> {
        let decoded: ErrorBody = serde_json::from_slice(body).ok()?;
        let message = match decoded {
            ErrorBody::Flat { message } => message,
            ErrorBody::Wrapped { data } => data.message,
        };
        Some(message).filter(|m| !m.trim().is_empty())
    }
}

// ============================================================================
// Upload bodies
// ============================================================================

/// Upload success body: `{url}` or `{data: {url}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UploadBody {
    Flat { url: String },
    Wrapped { data: UploadData },
}

#[derive(Debug, Deserialize)]
pub struct UploadData {
    pub url: String,
}

impl UploadBody {
    pub fn into_url(self) -> String {
        match self {
            UploadBody::Flat { url } => url,
            UploadBody::Wrapped { data } => data.url,
        }
    }
}
