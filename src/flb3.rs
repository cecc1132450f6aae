use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use crate::error::FlbError;
use crate::metadata::ChunkMetadata;
use crate::report::Report;

pub mod chunk;
pub mod container;
pub mod header;
pub mod pci;

use container::FlbContainer;
use header::FlbHeader;

fn payload_name(index: usize) -> String {
    format!("chunk_{:03}.bin", index)
}

fn sidecar_name(index: usize) -> String {
    format!("chunk_{:03}.json", index)
}

/// Splits an FLB3 file into per-chunk artifacts: `chunk_NNN.bin` holding the
/// raw firmware payload and `chunk_NNN.json` holding everything else.
pub fn extract_flb3(
    input: &Path,
    output_dir: &Path,
    report: &mut dyn Report,
) -> Result<(), FlbError> {
    let mut data = Vec::new();
    File::open(input)?.read_to_end(&mut data)?;

    if !data.starts_with(FlbHeader::MAGIC) {
        report.warn("File does not appear to be FLB3, continuing anyway... this is not likely going to work");
    }
    report.info(&format!("Reading {} bytes...", data.len()));

    let container = FlbContainer::parse(&data, report)?;
    report.info(&format!(
        "Parsing done, writing {} chunks to disk",
        container.chunks.len()
    ));

    match fs::create_dir(output_dir) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            report.warn("Output directory exists, writing anyway");
        }
        Err(err) => return Err(err.into()),
    }

    for chunk in &container.chunks {
        fs::write(output_dir.join(payload_name(chunk.index)), &chunk.firmware)?;
        ChunkMetadata::from_chunk(chunk).save(&output_dir.join(sidecar_name(chunk.index)))?;
    }

    report.info("Done!");
    Ok(())
}

/// Merges a directory of per-chunk artifacts back into one FLB3 file. All
/// chunks are loaded and validated first; the output file is only created
/// once every sidecar has checked out, so a bad artifact never leaves a
/// partial container behind.
pub fn rebuild_flb3(
    input_dir: &Path,
    output: &Path,
    report: &mut dyn Report,
) -> Result<(), FlbError> {
    let mut payloads: Vec<PathBuf> = fs::read_dir(input_dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "bin"))
        .collect();
    // chunk_NNN names sort into ascending index order
    payloads.sort();

    let mut chunks = Vec::new();
    for payload_path in &payloads {
        report.info(&format!("Processing {}", payload_path.display()));
        let index = chunk_index(payload_path)?;
        let metadata = ChunkMetadata::load(&payload_path.with_extension("json"))?;
        let firmware = fs::read(payload_path)?;
        chunks.push(metadata.into_chunk(index, firmware)?);
    }
    report.info(&format!("Loaded {} chunks", chunks.len()));

    let mut container = FlbContainer::from_chunks(chunks);
    let mut out = File::create(output)?;
    container.serialize(&mut out)?;

    report.info("Done!");
    Ok(())
}

fn chunk_index(payload_path: &Path) -> Result<usize, FlbError> {
    let stem = payload_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("");
    stem.strip_prefix("chunk_")
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| FlbError::MissingOrInvalidMetadata {
            artifact: payload_path.display().to_string(),
            reason: "payload file name is not of the form chunk_NNN.bin".to_string(),
        })
}
