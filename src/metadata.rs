use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FlbError;
use crate::flb3::chunk::FlbChunk;
use crate::flb3::header::FlbHeader;
use crate::flb3::pci::{PciDetails, PciDevice, PciDeviceList};

/// JSON sidecar written next to each chunk's payload. One fixed schema per
/// field: opaque spans (magic, the 37 classification bytes) are hex strings,
/// everything else is its natural JSON type. The length fields are carried
/// for reference but recomputed on rebuild, so stale values are harmless.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChunkMetadata {
    pub header: HeaderMetadata,
    pub pci_details: PciDetailsMetadata,
    pub pci_devices: Vec<PciDevice>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HeaderMetadata {
    pub magic: String,
    pub header_length: u32,
    pub unknown1: u8,
    pub data_length: u32,
    pub delimiter: u16,
    pub description: String,
    pub version: [u8; 3],
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PciDetailsMetadata {
    pub flb_type: u32,
    pub unknown: String,
}

impl ChunkMetadata {
    pub fn from_chunk(chunk: &FlbChunk) -> Self {
        ChunkMetadata {
            header: HeaderMetadata {
                magic: hex::encode(&chunk.header.magic),
                header_length: chunk.header.header_length,
                unknown1: chunk.header.unknown1,
                data_length: chunk.header.data_length,
                delimiter: chunk.header.delimiter,
                description: chunk.header.description(),
                version: chunk.header.version,
            },
            pci_details: PciDetailsMetadata {
                flb_type: chunk.details.flb_type,
                unknown: hex::encode(&chunk.details.unknown),
            },
            pci_devices: chunk.devices.devices.clone(),
        }
    }

    /// Reassembles a chunk from this snapshot plus its payload bytes. The
    /// wire-width checks live here so a bad sidecar fails before anything
    /// is written.
    pub fn into_chunk(self, index: usize, firmware: Vec<u8>) -> Result<FlbChunk, FlbError> {
        let magic = fixed_span(&self.header.magic, 4, "magic")?;
        let unknown = fixed_span(
            &self.pci_details.unknown,
            PciDetails::UNKNOWN_WIDTH,
            "classification unknown",
        )?;

        let mut header = FlbHeader {
            magic,
            header_length: self.header.header_length,
            unknown1: self.header.unknown1,
            data_length: self.header.data_length,
            delimiter: self.header.delimiter,
            description_bytes: Vec::new(),
            version: self.header.version,
        };
        header.set_description(&self.header.description)?;

        Ok(FlbChunk {
            index,
            header,
            details: PciDetails {
                flb_type: self.pci_details.flb_type,
                unknown,
            },
            devices: PciDeviceList {
                devices: self.pci_devices,
            },
            firmware,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), FlbError> {
        let mut file = File::create(path)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        file.write_all(b"\n")?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, FlbError> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            FlbError::MissingOrInvalidMetadata {
                artifact: path.display().to_string(),
                reason: err.to_string(),
            }
        })?;
        serde_json::from_str(&text).map_err(|err| FlbError::MissingOrInvalidMetadata {
            artifact: path.display().to_string(),
            reason: err.to_string(),
        })
    }
}

fn fixed_span(encoded: &str, width: usize, field: &'static str) -> Result<Vec<u8>, FlbError> {
    let bytes = hex::decode(encoded).map_err(|err| FlbError::FieldTooLong {
        field,
        max: width,
        detail: err.to_string(),
    })?;
    if bytes.len() != width {
        return Err(FlbError::FieldTooLong {
            field,
            max: width,
            detail: format!("{} bytes", bytes.len()),
        });
    }
    Ok(bytes)
}
