use std::io::Cursor;

use binrw::{BinRead, BinReaderExt, BinWrite};

use crate::common;
use crate::error::FlbError;

/// 98-byte header at the start of every chunk. `header_length` and
/// `data_length` are the only derived fields; everything else is carried
/// verbatim, including `unknown1` whose meaning is not understood from the
/// observed samples.
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct FlbHeader {
    #[br(count = 4)]
    #[bw(assert(magic.len() == 4))]
    pub magic: Vec<u8>,
    pub header_length: u32,
    pub unknown1: u8,
    pub data_length: u32,
    // \x86\x80 in every observed sample
    pub delimiter: u16,
    #[br(count = 80)]
    #[bw(assert(description_bytes.len() == 80))]
    pub description_bytes: Vec<u8>,
    pub version: [u8; 3],
}

impl FlbHeader {
    pub const SIZE: usize = 98;
    pub const MAGIC: &'static [u8; 4] = b"FLB3";
    pub const DESCRIPTION_WIDTH: usize = 80;

    /// Decodes a header from the front of `data`. The magic tag is not
    /// checked here; callers surface an odd magic as a warning and keep
    /// going, since best-effort extraction of unusual containers is wanted.
    pub fn parse(data: &[u8]) -> Result<(Self, usize), FlbError> {
        if data.len() < Self::SIZE {
            return Err(FlbError::TruncatedInput {
                what: "FLB header",
                needed: Self::SIZE,
                remaining: data.len(),
            });
        }
        let mut reader = Cursor::new(&data[..Self::SIZE]);
        let header: FlbHeader = reader.read_le()?;
        Ok((header, Self::SIZE))
    }

    pub fn description(&self) -> String {
        common::string_from_padded(&self.description_bytes)
    }

    /// Re-encodes `text` into the 80-byte null-padded wire field.
    pub fn set_description(&mut self, text: &str) -> Result<(), FlbError> {
        self.description_bytes =
            common::padded_from_string(text, Self::DESCRIPTION_WIDTH, "description")?;
        Ok(())
    }
}
