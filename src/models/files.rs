use serde::Deserialize;

use crate::units::{BytesFromB, BytesFromMb};

/// Files of one queue item (`mode=get_files`).
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ItemFilesResponse {
    pub files: Vec<ItemFile>,
    pub error: Option<String>,
}

/// One file of a queue item. `bytes_left` never exceeds `bytes`.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(from = "WireItemFile")]
pub struct ItemFile {
    pub id: String,
    pub nzf_id: String,
    pub status: String,
    pub filename: String,
    pub age: String,
    pub bytes: BytesFromB,
    pub bytes_left: BytesFromMb,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct WireItemFile {
    id: String,
    nzf_id: String,
    status: String,
    filename: String,
    age: String,
    bytes: BytesFromB,
    #[serde(rename = "mbleft")]
    bytes_left: BytesFromMb,
}

impl From<WireItemFile> for ItemFile {
    fn from(wire: WireItemFile) -> Self {
        let mut bytes_left = wire.bytes_left;
        if bytes_left.bytes() > wire.bytes.bytes() {
            tracing::trace!(
                nzf_id = %wire.nzf_id,
                bytes = wire.bytes.bytes(),
                bytes_left = bytes_left.bytes(),
                "clamping bytes left to file size"
            );
            bytes_left = wire.bytes.cast();
        }
        ItemFile {
            id: wire.id,
            nzf_id: wire.nzf_id,
            status: wire.status,
            filename: wire.filename,
            age: wire.age,
            bytes: wire.bytes,
            bytes_left,
        }
    }
}
