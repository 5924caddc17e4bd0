use thiserror::Error;

use crate::model::Envelope;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed wire data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Serialize an envelope to its canonical JSON wire form.
///
/// Cannot fail for a well-formed envelope (the data map is already JSON); the
/// Result is kept so callers treat the codec as a fallible seam.
pub fn encode(envelope: &Envelope) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(envelope)?)
}

/// Decode raw bytes into an envelope.
///
/// Fails only on malformed JSON. A structurally valid object with missing
/// `type` / `source` / `data` fields decodes to a best-effort envelope with
/// defaults (unknown kind, "UNKNOWN" origin, empty data) so the mesh
/// tolerates partially-formed producers.
pub fn decode(bytes: &[u8]) -> Result<Envelope, CodecError> {
    Ok(serde_json::from_slice(bytes)?)
}
