use serde::{Deserialize, Serialize};

/// A single image attached to a `response` message, base64-encoded inline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageData {
    pub filename: String,
    pub data: String,
}
