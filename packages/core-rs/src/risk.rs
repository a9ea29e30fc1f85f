use crate::types::{FileMetadata, RiskAssessment};
use log::debug;
use rand::Rng;

const PIRACY_HINTS: &[&str] = &[
    "crack", "keygen", "patch", "serial", "warez", "pirate", "cracked", "torrent",
];
const PIRACY_REASON_HINTS: &[&str] = &["crack", "keygen", "patch", "serial"];
const SCORED_EXTENSIONS: &[&str] = &["exe", "dll", "msi", "apk", "jar"];
const EXECUTABLE_EXTENSIONS: &[&str] = &["exe", "apk", "msi"];

const PIRACY_BUMP: i32 = 35;
const EXTENSION_BUMP: i32 = 12;
const BASE_CAP: i32 = 90;
const NOISE_MIN: i32 = -8;
const NOISE_MAX: i32 = 9;
const LARGE_FILE_BYTES: u64 = 5 * 1024 * 1024;

pub const MIN_SCORE: u8 = 2;
pub const MAX_SCORE: u8 = 99;
pub const VERY_HIGH_RISK_SCORE: u8 = 80;

pub const REASON_VERY_HIGH: &str = "Very high heuristic risk (simulated).";
pub const REASON_PIRATED: &str = "Filename suggests pirated/cracked distribution.";
pub const REASON_EXECUTABLE: &str = "Executable file type.";
pub const REASON_LARGE: &str = "Large file size (unusual for installers).";
pub const REASON_NO_FLAGS: &str = "No obvious heuristic flags, treat as likely safe (simulated).";

fn clamp_score(score: i32) -> u8 {
    score.clamp(i32::from(MIN_SCORE), i32::from(MAX_SCORE)) as u8
}

/// Text after the final `.`, lower-cased. A name without a dot is its own extension.
pub fn file_extension(name: &str) -> String {
    name.rsplit('.').next().unwrap_or_default().to_lowercase()
}

/// `floor((size mod 100) / 1.2)`, computed as `10x / 12` to stay in integers.
fn base_score(size: u64) -> i32 {
    let remainder = (size % 100) as i32;
    (remainder * 10 / 12).min(BASE_CAP)
}

pub fn is_pirated_name(name: &str) -> bool {
    let lowered = name.to_lowercase();
    PIRACY_REASON_HINTS.iter().any(|hint| lowered.contains(hint))
}

pub fn score_file<R: Rng + ?Sized>(meta: &FileMetadata, rng: &mut R) -> RiskAssessment {
    let name = meta.name.to_lowercase();
    let extension = file_extension(&name);

    let mut score = base_score(meta.size);
    for hint in PIRACY_HINTS {
        if name.contains(hint) {
            score += PIRACY_BUMP;
        }
    }
    if SCORED_EXTENSIONS.contains(&extension.as_str()) {
        score += EXTENSION_BUMP;
    }

    let noise = rng.gen_range(NOISE_MIN..=NOISE_MAX);
    debug!("risk score for {}: raw {} noise {}", meta.name, score, noise);
    let score = clamp_score(score + noise);

    let mut reasons: Vec<String> = Vec::new();

    if score >= VERY_HIGH_RISK_SCORE {
        reasons.push(REASON_VERY_HIGH.to_string());
    }

    if is_pirated_name(&name) {
        reasons.push(REASON_PIRATED.to_string());
    }

    if EXECUTABLE_EXTENSIONS.contains(&extension.as_str()) {
        reasons.push(REASON_EXECUTABLE.to_string());
    }

    if meta.size > LARGE_FILE_BYTES {
        reasons.push(REASON_LARGE.to_string());
    }

    if reasons.is_empty() {
        reasons.push(REASON_NO_FLAGS.to_string());
    }

    RiskAssessment { score, reasons }
}
