//! Decoding of OTLP export request bodies.
//!
//! Bodies arrive either as binary protobuf or as OTLP/JSON.

use prost::Message;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Content type of binary protobuf bodies.
pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";
/// Content type of OTLP/JSON bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Encoding of an export request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// Binary protobuf.
    Protobuf,
    /// OTLP/JSON.
    Json,
}

impl PayloadFormat {
    /// Picks the format from a `Content-Type` value; anything but protobuf is JSON.
    #[must_use]
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct)
                if ct
                    .split(';')
                    .next()
                    .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(PROTOBUF_CONTENT_TYPE)) =>
            {
                Self::Protobuf
            }
            _ => Self::Json,
        }
    }
}

/// Errors that can occur while decoding a body.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The protobuf body is malformed.
    #[error("Invalid protobuf payload: {0}")]
    Protobuf(#[from] prost::DecodeError),

    /// The JSON body is malformed.
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decodes an export request body.
///
/// # Errors
///
/// Returns an error if the body is not a valid request in the given format.
pub fn decode_request<T>(body: &[u8], format: PayloadFormat) -> Result<T, PayloadError>
where
    T: Message + Default + DeserializeOwned,
{
    match format {
        PayloadFormat::Protobuf => Ok(T::decode(body)?),
        PayloadFormat::Json => Ok(serde_json::from_slice(body)?),
    }
}
