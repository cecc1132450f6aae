use thiserror::Error;

/// Fatal conditions that stop an extract or rebuild run. Soft findings
/// (odd magic, unknown FLB type) go through `report::Report` instead.
#[derive(Error, Debug)]
pub enum FlbError {
    #[error("input truncated: {what} needs {needed} bytes, {remaining} remain")]
    TruncatedInput {
        what: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("device list region of {bytes} bytes is not a multiple of 12")]
    MisalignedDeviceList { bytes: usize },

    #[error("header length {header_length} is smaller than the 139 fixed header bytes")]
    NegativeDeviceListLength { header_length: u32 },

    #[error("container ends mid-chunk at offset {offset} with {remaining} bytes left")]
    TrailingData { offset: usize, remaining: usize },

    #[error("field '{field}' does not fit its {max}-byte wire slot: {detail}")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        detail: String,
    },

    #[error("missing or invalid metadata for {artifact}: {reason}")]
    MissingOrInvalidMetadata { artifact: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("binary codec error: {0}")]
    Codec(#[from] binrw::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
