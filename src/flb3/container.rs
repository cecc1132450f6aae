use std::io::{Seek, Write};

use crate::error::FlbError;
use crate::flb3::chunk::FlbChunk;
use crate::report::Report;

/// A whole FLB3 file: chunks laid back-to-back with no count or length
/// field anywhere, so running out of buffer is the only terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlbContainer {
    pub chunks: Vec<FlbChunk>,
}

impl FlbContainer {
    /// Decodes chunks from offset 0 until the buffer is exactly exhausted.
    /// A chunk whose declared lengths reach past the end of the buffer
    /// surfaces as `TrailingData` rather than a bare truncation, since at
    /// the container level it means the file ends mid-chunk.
    pub fn parse(data: &[u8], report: &mut dyn Report) -> Result<Self, FlbError> {
        let mut chunks = Vec::new();
        let mut pos = 0;
        while pos < data.len() {
            let index = chunks.len();
            match FlbChunk::parse(&data[pos..], index, report) {
                Ok((chunk, used)) => {
                    pos += used;
                    chunks.push(chunk);
                }
                Err(FlbError::TruncatedInput { .. }) => {
                    return Err(FlbError::TrailingData {
                        offset: pos,
                        remaining: data.len() - pos,
                    });
                }
                Err(err) => return Err(err),
            }
        }
        Ok(FlbContainer { chunks })
    }

    /// Caller-supplied order is kept as-is; it becomes the on-wire order.
    pub fn from_chunks(chunks: Vec<FlbChunk>) -> Self {
        FlbContainer { chunks }
    }

    /// Recomputes each chunk's derived lengths, then writes the chunks
    /// back-to-back in index order.
    pub fn serialize<W: Write + Seek>(&mut self, out: &mut W) -> Result<(), FlbError> {
        for chunk in &mut self.chunks {
            chunk.recalculate_lengths();
            chunk.serialize(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::flb3::chunk::build_chunk_bytes;
    use crate::report::SilentReport;

    #[test]
    fn parses_concatenated_chunks() {
        let mut raw = build_chunk_bytes(b"first", &[[0; 6]], b"aaaa");
        raw.extend_from_slice(&build_chunk_bytes(
            b"second",
            &[
                [0x8086, 0x1563, 0, 0, 0, 0],
                [0x8086, 0x10fb, 0, 0, 0, 0],
                [0x8086, 0x1528, 0, 0, 0, 0],
                [0; 6],
            ],
            b"bbbbbbbb",
        ));

        let container = FlbContainer::parse(&raw, &mut SilentReport).unwrap();
        assert_eq!(container.chunks.len(), 2);
        assert_eq!(container.chunks[0].index, 0);
        assert_eq!(container.chunks[1].index, 1);
        assert_eq!(container.chunks[1].header.header_length, 98 + 41 + 48);
    }

    #[test]
    fn partial_final_chunk_is_trailing_data() {
        let mut raw = build_chunk_bytes(b"ok", &[[0; 6]], b"aaaa");
        let chunk_len = raw.len();
        raw.extend_from_slice(&build_chunk_bytes(b"cut", &[[0; 6]], b"bbbb")[..60]);

        let err = FlbContainer::parse(&raw, &mut SilentReport).unwrap_err();
        assert!(matches!(
            err,
            FlbError::TrailingData { offset, remaining: 60 } if offset == chunk_len
        ));
    }

    #[test]
    fn serialize_roundtrips_byte_identical() {
        let mut raw = build_chunk_bytes(b"one", &[[0; 6]], &[0x11; 32]);
        raw.extend_from_slice(&build_chunk_bytes(
            b"two",
            &[[0x8086, 0x37d0, 0x17aa, 0x4040, 0, 0], [0; 6]],
            &[0x22; 9],
        ));

        let mut container = FlbContainer::parse(&raw, &mut SilentReport).unwrap();
        let mut out = std::io::Cursor::new(Vec::new());
        container.serialize(&mut out).unwrap();
        assert_eq!(out.into_inner(), raw);
    }

    #[test]
    fn empty_buffer_is_an_empty_container() {
        let container = FlbContainer::parse(&[], &mut SilentReport).unwrap();
        assert!(container.chunks.is_empty());
    }
}
