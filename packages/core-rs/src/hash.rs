//! Display-only pseudo hash for scan reports.
//!
//! The value mixes the wall-clock timestamp into its seed, so two scans of the same
//! file produce different strings. It carries no collision or preimage guarantees and
//! must never be shown as a real digest of file contents.

const BLOCK_REPEATS: usize = 8;
pub const SYNTHETIC_HASH_LEN: usize = 8 * BLOCK_REPEATS;

pub fn synthesize_hash(name: &str, size: u64, now_millis: u64) -> String {
    let seed = format!("{name}|{size}|{now_millis}");
    let acc = seed
        .encode_utf16()
        .fold(0i32, |acc, unit| acc.wrapping_mul(31).wrapping_add(i32::from(unit)));
    format!("{:08x}", acc as u32).repeat(BLOCK_REPEATS)
}
