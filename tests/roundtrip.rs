use std::fs;

use flbtool::error::FlbError;
use flbtool::flb3::container::FlbContainer;
use flbtool::flb3::{extract_flb3, rebuild_flb3};
use flbtool::report::SilentReport;

fn chunk_bytes(
    description: &[u8],
    flb_type: u32,
    devices: &[[u16; 6]],
    payload: &[u8],
) -> Vec<u8> {
    let header_length = 98 + 41 + 12 * devices.len();
    let mut raw = Vec::new();
    raw.extend_from_slice(b"FLB3");
    raw.extend_from_slice(&(header_length as u32).to_le_bytes());
    raw.push(0x42);
    raw.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    raw.extend_from_slice(&0x8086u16.to_le_bytes());
    let mut desc = description.to_vec();
    desc.resize(80, 0);
    raw.extend_from_slice(&desc);
    raw.extend_from_slice(&[2, 1, 0]);
    raw.extend_from_slice(&flb_type.to_le_bytes());
    raw.extend_from_slice(&[0u8; 37]);
    for device in devices {
        for field in device {
            raw.extend_from_slice(&field.to_le_bytes());
        }
    }
    raw.extend_from_slice(payload);
    raw
}

#[test]
fn single_chunk_with_sentinel_only_device_list() {
    // 98 + 41 + 12 + 4 = 155 bytes
    let raw = chunk_bytes(b"minimal", 0x300, &[[0; 6]], &[0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(raw.len(), 155);

    let mut container = FlbContainer::parse(&raw, &mut SilentReport).unwrap();
    assert_eq!(container.chunks.len(), 1);
    let chunk = &container.chunks[0];
    assert_eq!(chunk.header.header_length, 151);
    assert_eq!(chunk.devices.devices.len(), 1);
    assert!(!chunk.devices.devices[0].is_valid());
    assert_eq!(chunk.firmware, [0xDE, 0xAD, 0xBE, 0xEF]);

    let mut out = std::io::Cursor::new(Vec::new());
    container.serialize(&mut out).unwrap();
    assert_eq!(out.into_inner(), raw);
}

#[test]
fn two_chunks_parse_without_trailing_data() {
    let mut raw = chunk_bytes(b"first", 0x300, &[[0; 6]], b"abcd");
    raw.extend_from_slice(&chunk_bytes(
        b"second",
        0x800,
        &[
            [0x8086, 0x1563, 0x15d9, 0x0903, 0, 0],
            [0x8086, 0x10fb, 0, 0, 0, 0],
            [0x8086, 0x1528, 0, 0, 0, 0x4100],
            [0; 6],
        ],
        &[0x5A; 100],
    ));

    let container = FlbContainer::parse(&raw, &mut SilentReport).unwrap();
    assert_eq!(container.chunks.len(), 2);
    assert_eq!(container.chunks[1].header.header_length, 98 + 41 + 48);
    assert_eq!(container.chunks[1].devices.devices.len(), 4);
}

#[test]
fn header_length_smaller_than_fixed_headers_fails() {
    let mut raw = chunk_bytes(b"broken", 0x300, &[[0; 6]], b"");
    raw[4..8].copy_from_slice(&100u32.to_le_bytes());

    let err = FlbContainer::parse(&raw, &mut SilentReport).unwrap_err();
    assert!(matches!(
        err,
        FlbError::NegativeDeviceListLength { header_length: 100 }
    ));
}

#[test]
fn extract_then_rebuild_is_byte_identical() {
    let mut raw = chunk_bytes(b"PXE base code", 0x300, &[[0; 6]], &[0x11; 200]);
    raw.extend_from_slice(&chunk_bytes(
        b"UEFI driver",
        0x800,
        &[[0x8086, 0x37d0, 0x17aa, 0x4040, 0, 0], [0; 6]],
        &[0x22; 77],
    ));
    // unknown flb_type must survive the cycle unchanged
    raw.extend_from_slice(&chunk_bytes(b"mystery", 0xDEADBEEF, &[[0; 6]], &[0x33; 9]));

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.flb");
    let artifacts = dir.path().join("chunks");
    let rebuilt = dir.path().join("rebuilt.flb");
    fs::write(&input, &raw).unwrap();

    extract_flb3(&input, &artifacts, &mut SilentReport).unwrap();
    assert!(artifacts.join("chunk_000.bin").exists());
    assert!(artifacts.join("chunk_002.json").exists());

    rebuild_flb3(&artifacts, &rebuilt, &mut SilentReport).unwrap();
    assert_eq!(fs::read(&rebuilt).unwrap(), raw);
}

#[test]
fn edited_payload_rebuilds_with_recomputed_lengths() {
    let raw = chunk_bytes(b"editable", 0x1000, &[[0; 6]], &[0x44; 16]);

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.flb");
    let artifacts = dir.path().join("chunks");
    let rebuilt = dir.path().join("rebuilt.flb");
    fs::write(&input, &raw).unwrap();
    extract_flb3(&input, &artifacts, &mut SilentReport).unwrap();

    // grow the payload; the stale data_length in the sidecar must not matter
    fs::write(artifacts.join("chunk_000.bin"), vec![0x55; 64]).unwrap();
    rebuild_flb3(&artifacts, &rebuilt, &mut SilentReport).unwrap();

    let rebuilt_bytes = fs::read(&rebuilt).unwrap();
    let container = FlbContainer::parse(&rebuilt_bytes, &mut SilentReport).unwrap();
    assert_eq!(container.chunks[0].header.data_length, 64);
    assert_eq!(container.chunks[0].firmware, vec![0x55; 64]);
}

#[test]
fn missing_sidecar_aborts_before_writing_output() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = dir.path().join("chunks");
    let rebuilt = dir.path().join("rebuilt.flb");
    fs::create_dir(&artifacts).unwrap();
    fs::write(artifacts.join("chunk_000.bin"), b"payload").unwrap();

    let err = rebuild_flb3(&artifacts, &rebuilt, &mut SilentReport).unwrap_err();
    assert!(matches!(err, FlbError::MissingOrInvalidMetadata { .. }));
    assert!(!rebuilt.exists());
}

#[test]
fn truncated_final_chunk_is_trailing_data() {
    let mut raw = chunk_bytes(b"whole", 0x300, &[[0; 6]], b"abcd");
    let first_len = raw.len();
    raw.extend_from_slice(&chunk_bytes(b"partial", 0x300, &[[0; 6]], b"abcd")[..80]);

    let err = FlbContainer::parse(&raw, &mut SilentReport).unwrap_err();
    assert!(matches!(
        err,
        FlbError::TrailingData { offset, remaining: 80 } if offset == first_len
    ));
}
