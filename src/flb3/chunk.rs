use std::io::{Seek, Write};

use binrw::BinWrite;

use crate::error::FlbError;
use crate::flb3::header::FlbHeader;
use crate::flb3::pci::{PciDetails, PciDeviceList};
use crate::report::Report;

/// One header + classification + device list + payload unit. A chunk knows
/// nothing about its siblings; `parse` returns the bytes it consumed so the
/// container can advance its own cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlbChunk {
    pub index: usize,
    pub header: FlbHeader,
    pub details: PciDetails,
    pub devices: PciDeviceList,
    pub firmware: Vec<u8>,
}

impl FlbChunk {
    /// Sequentially decodes the four sub-structures from the front of
    /// `data`. The device-list byte length is derived from the header
    /// (`header_length - 98 - 41`); a header claiming less than the two
    /// fixed sub-headers fails rather than truncating the list.
    pub fn parse(
        data: &[u8],
        index: usize,
        report: &mut dyn Report,
    ) -> Result<(Self, usize), FlbError> {
        report.info(&format!("FLB3 chunk {}", index));
        let mut pos = 0;

        let (header, used) = FlbHeader::parse(data)?;
        pos += used;
        if header.magic != FlbHeader::MAGIC {
            report.warn(&format!(
                "chunk {} magic is {:02x?}, not \"FLB3\", continuing anyway",
                index, header.magic
            ));
        }
        report.info(&format!(
            "Version: {}.{}.{} Description: {}",
            header.version[0],
            header.version[1],
            header.version[2],
            header.description()
        ));
        report.info(&format!(
            "Header length: {} Data length: {}",
            header.header_length, header.data_length
        ));

        let (details, used) = PciDetails::parse(&data[pos..])?;
        pos += used;
        match details.type_name() {
            Some(name) => report.info(&format!("FLB type: {:#x} ({})", details.flb_type, name)),
            None => report.warn(&format!("FLB type: {:#x} (UNKNOWN)", details.flb_type)),
        }

        let fixed = (FlbHeader::SIZE + PciDetails::SIZE) as u32;
        if header.header_length < fixed {
            return Err(FlbError::NegativeDeviceListLength {
                header_length: header.header_length,
            });
        }
        let list_bytes = (header.header_length - fixed) as usize;
        if data.len() - pos < list_bytes {
            return Err(FlbError::TruncatedInput {
                what: "PCI device list",
                needed: list_bytes,
                remaining: data.len() - pos,
            });
        }
        let (devices, used) = PciDeviceList::parse(&data[pos..pos + list_bytes])?;
        pos += used;
        report.info("Supported PCI devices:");
        for device in devices.devices.iter().filter(|d| d.is_valid()) {
            report.info(&device.to_string());
        }

        let payload_len = header.data_length as usize;
        if data.len() - pos < payload_len {
            return Err(FlbError::TruncatedInput {
                what: "firmware payload",
                needed: payload_len,
                remaining: data.len() - pos,
            });
        }
        let firmware = data[pos..pos + payload_len].to_vec();
        pos += payload_len;

        Ok((
            FlbChunk {
                index,
                header,
                details,
                devices,
                firmware,
            },
            pos,
        ))
    }

    /// Rewrites the header's derived length fields from the current payload
    /// and device list. Must run before `serialize` whenever either may have
    /// changed since parse; edited artifacts only round-trip because of this.
    pub fn recalculate_lengths(&mut self) {
        self.header.data_length = self.firmware.len() as u32;
        self.header.header_length =
            (FlbHeader::SIZE + PciDetails::SIZE + self.devices.byte_len()) as u32;
    }

    /// Writes header, classification, device list, then payload. Length
    /// recomputation is the caller's call: a pure copy-through doesn't need
    /// it, an edit path does.
    pub fn serialize<W: Write + Seek>(&self, out: &mut W) -> Result<(), FlbError> {
        self.header.write_le(out)?;
        self.details.write_le(out)?;
        self.devices.serialize(out)?;
        out.write_all(&self.firmware)?;
        Ok(())
    }
}

/// Assembles well-formed chunk bytes for tests elsewhere in the crate.
#[cfg(test)]
pub(crate) fn build_chunk_bytes(
    description: &[u8],
    devices: &[[u16; 6]],
    payload: &[u8],
) -> Vec<u8> {
    let header_length = 98 + 41 + 12 * devices.len();
    let mut raw = Vec::new();
    raw.extend_from_slice(b"FLB3");
    raw.extend_from_slice(&(header_length as u32).to_le_bytes());
    raw.push(0);
    raw.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    raw.extend_from_slice(&0x8086u16.to_le_bytes());
    let mut desc = description.to_vec();
    desc.resize(80, 0);
    raw.extend_from_slice(&desc);
    raw.extend_from_slice(&[1, 0, 0]);
    raw.extend_from_slice(&0x300u32.to_le_bytes());
    raw.extend_from_slice(&[0u8; 37]);
    for device in devices {
        for field in device {
            raw.extend_from_slice(&field.to_le_bytes());
        }
    }
    raw.extend_from_slice(payload);
    raw
}
