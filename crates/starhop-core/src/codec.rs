use serde::Serialize;
use serde::de::DeserializeOwned;

/// Maximum encoded state size in bytes.
pub const MAX_STATE_SIZE: usize = 256 * 1024; // 256 KiB

#[derive(Debug)]
pub enum CodecError {
    EmptyPayload,
    PayloadTooLarge(usize),
    SerializeError(String),
    DeserializeError(String),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "empty payload"),
            Self::PayloadTooLarge(size) => {
                write!(f, "payload too large: {size} bytes (max {MAX_STATE_SIZE})")
            },
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "deserialize error: {e}"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Encode a simulation state snapshot as MessagePack for out-of-process readers.
pub fn encode_state<T: Serialize>(state: &T) -> Result<Vec<u8>, CodecError> {
    let bytes = rmp_serde::to_vec(state).map_err(|e| CodecError::SerializeError(e.to_string()))?;
    if bytes.len() > MAX_STATE_SIZE {
        return Err(CodecError::PayloadTooLarge(bytes.len()));
    }
    Ok(bytes)
}

/// Decode a snapshot produced by [`encode_state`].
pub fn decode_state<T: DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
    if data.is_empty() {
        return Err(CodecError::EmptyPayload);
    }
    if data.len() > MAX_STATE_SIZE {
        return Err(CodecError::PayloadTooLarge(data.len()));
    }
    rmp_serde::from_slice(data).map_err(|e| CodecError::DeserializeError(e.to_string()))
}
