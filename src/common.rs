use crate::error::FlbError;

/// Recovers the logical string from a fixed-width wire field. The container
/// zero-pads text fields, and some real-world samples carry stray interior
/// nulls, so every null byte is dropped, not just the trailing run.
pub fn string_from_padded(buf: &[u8]) -> String {
    let stripped: Vec<u8> = buf.iter().copied().filter(|&b| b != 0).collect();
    String::from_utf8_lossy(&stripped).to_string()
}

/// Encodes `text` into a zero-padded field of exactly `width` bytes.
/// Oversized or non-ASCII text is an error, never silently truncated.
pub fn padded_from_string(
    text: &str,
    width: usize,
    field: &'static str,
) -> Result<Vec<u8>, FlbError> {
    if !text.is_ascii() {
        return Err(FlbError::FieldTooLong {
            field,
            max: width,
            detail: "contains non-ASCII characters".to_string(),
        });
    }
    if text.len() > width {
        return Err(FlbError::FieldTooLong {
            field,
            max: width,
            detail: format!("{} bytes", text.len()),
        });
    }
    let mut out = text.as_bytes().to_vec();
    out.resize(width, 0);
    Ok(out)
}
