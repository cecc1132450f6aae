use std::fmt;
use std::io::{Cursor, Seek, Write};

use binrw::{BinRead, BinReaderExt, BinWrite};
use serde::{Deserialize, Serialize};

use crate::error::FlbError;

/// Best guesses for observed `flb_type` values. It is unclear whether this
/// is an enum or a bitmask (values overlap in bit patterns), so lookup is a
/// whole-value match and anything unmatched stays valid data.
pub const FLB_TYPES: &[(u32, &str)] = &[
    (0x300, "FLB_PXE"),
    (0x800, "FLB_UEFI_DRIVER"),
    (0x1000, "FLB_ISCSI_OPTION"),
    (0x2000, "FLB_FCOE_OPTION"),
    (0x10000, "FLB_COMBO_RULES"),
    (0x100000, "FLB_CIVD_BIN"),
    (0x100001, "FLB_COMBO_IMAGE_VERSION_NAME"),
    (0x200000, "FLB_OCD_OPTION"),
    (0x800000, "FLB_CLP_LOADER"),
    (0x1000000, "FLB_ISCSI_SETUP"),
    (0x2000000, "FLB_40G_INTERFACE"),
    (0x10000000, "FLB_UEFI_X64_FCOE_DRIVER"),
    (0x20000000, "FLB_SIGNATURE"),
    (0x20000100, "FLB_SIGNATURE_2"),
];

pub fn flb_type_name(flb_type: u32) -> Option<&'static str> {
    FLB_TYPES
        .iter()
        .find(|(code, _)| *code == flb_type)
        .map(|(_, name)| *name)
}

/// 41-byte classification block that follows the header. Images read back
/// from a NIC have the 37 unknown bytes zeroed, vendor-shipped images
/// sometimes don't, so the span is preserved verbatim either way.
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct PciDetails {
    pub flb_type: u32,
    #[br(count = 37)]
    #[bw(assert(unknown.len() == 37))]
    pub unknown: Vec<u8>,
}

impl PciDetails {
    pub const SIZE: usize = 41;
    pub const UNKNOWN_WIDTH: usize = 37;

    pub fn parse(data: &[u8]) -> Result<(Self, usize), FlbError> {
        if data.len() < Self::SIZE {
            return Err(FlbError::TruncatedInput {
                what: "PCI details",
                needed: Self::SIZE,
                remaining: data.len(),
            });
        }
        let mut reader = Cursor::new(&data[..Self::SIZE]);
        let details: PciDetails = reader.read_le()?;
        Ok((details, Self::SIZE))
    }

    pub fn type_name(&self) -> Option<&'static str> {
        flb_type_name(self.flb_type)
    }
}

/// One supported-device record. The list always ends with an all-zero
/// sentinel entry, which counts as "not valid" here but is kept in the list.
#[derive(BinRead, BinWrite, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
pub struct PciDevice {
    pub vendor: u16,
    pub device: u16,
    pub subvendor: u16,
    pub subdevice: u16,
    // almost always 0, 0x4100 is the only other value seen
    pub unk1: u16,
    pub unk2: u16,
}

impl PciDevice {
    pub const SIZE: usize = 12;

    pub const SENTINEL: PciDevice = PciDevice {
        vendor: 0,
        device: 0,
        subvendor: 0,
        subdevice: 0,
        unk1: 0,
        unk2: 0,
    };

    pub fn is_valid(&self) -> bool {
        *self != Self::SENTINEL
    }
}

impl fmt::Display for PciDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} subsys {:04x}:{:04x} unk {:04x}:{:04x}",
            self.vendor, self.device, self.subvendor, self.subdevice, self.unk1, self.unk2
        )
    }
}

/// The supported-device list between the classification block and the
/// payload. Its byte length is not stored anywhere; the chunk derives it
/// from `header_length` and hands us exactly that region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PciDeviceList {
    pub devices: Vec<PciDevice>,
}

impl PciDeviceList {
    /// Decodes the whole supplied region, 12 bytes at a time. A zero entry
    /// does not stop the scan: a hand-edited region could hold entries after
    /// a spurious sentinel, and the derived byte length is what is trusted.
    pub fn parse(data: &[u8]) -> Result<(Self, usize), FlbError> {
        if data.len() % PciDevice::SIZE != 0 {
            return Err(FlbError::MisalignedDeviceList { bytes: data.len() });
        }
        let mut reader = Cursor::new(data);
        let mut devices = Vec::with_capacity(data.len() / PciDevice::SIZE);
        for _ in 0..data.len() / PciDevice::SIZE {
            devices.push(reader.read_le::<PciDevice>()?);
        }
        Ok((PciDeviceList { devices }, data.len()))
    }

    /// Writes every entry in order. No sentinel is injected; the list is
    /// reproduced exactly as supplied.
    pub fn serialize<W: Write + Seek>(&self, out: &mut W) -> Result<(), FlbError> {
        for device in &self.devices {
            device.write_le(out)?;
        }
        Ok(())
    }

    pub fn byte_len(&self) -> usize {
        self.devices.len() * PciDevice::SIZE
    }
}
