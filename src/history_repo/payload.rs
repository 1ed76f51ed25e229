// Snapshot payload contract between the collect tick (writer) and history readers.
// Payload = Snapshot as a JSON object; `schema_version` says which layout wrote it.
// Version 0 = written before versioning (field absent). Newer-than-current is rejected.

use crate::models::{SNAPSHOT_SCHEMA_VERSION, Snapshot};

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("payload does not match snapshot schema: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("payload schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

pub fn encode(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string(snapshot)
}

/// Strict decode: missing fields fail, they are not defaulted.
pub fn decode(data: &str) -> Result<Snapshot, PayloadError> {
    let snapshot: Snapshot = serde_json::from_str(data)?;
    if snapshot.schema_version > SNAPSHOT_SCHEMA_VERSION {
        return Err(PayloadError::UnsupportedVersion {
            found: snapshot.schema_version,
            supported: SNAPSHOT_SCHEMA_VERSION,
        });
    }
    Ok(snapshot)
}
