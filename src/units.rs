//! Unit conversion helpers.

/// Bytes per mebibyte (2^20).
pub const BYTES_PER_MEBIBYTE: f64 = 1_048_576.0;

/// Convert a raw byte count into mebibytes.
///
/// Takes the integer byte count the panel reports, so an already converted
/// value cannot be fed back in by accident.
pub fn bytes_to_mebibytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MEBIBYTE
}
