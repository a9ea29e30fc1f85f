//! Canned-answer assistant.
//!
//! Answers are picked by keyword rules over the question; the most recent scan is
//! passed in explicitly by the caller and never remembered here.

use crate::advisory::official_source;
use crate::types::ScanResult;
use crate::verdict::is_risky_score;

pub const REMOVAL_ADVICE: &str = "This is a simulated demo. For real threats: isolate the device, \
disconnect from network, use a reputable AV/EDR product, and follow vendor removal steps. \
Avoid running suspicious files.";
pub const NO_SCAN_ATTACHED: &str = "No scan attached. Run a scan and attach it for context.";
pub const GENERIC_DOWNLOAD_ADVICE: &str = "Search the official vendor site or trusted stores \
(e.g., vendor website, Microsoft Store, Google Play). Avoid pirated downloads.";
pub const DISCLAIMER: &str = "This assistant is simulated. For serious cases, consult a \
cybersecurity professional. You can attach a scan for context.";

fn safety_answer(scan: &ScanResult) -> String {
    let qualifier = if is_risky_score(scan.score) {
        "likely risky (simulated)"
    } else {
        "likely safe (simulated)"
    };
    format!(
        "Based on the simulated score ({}%), the file is {qualifier}; treat as demo output only.",
        scan.score
    )
}

fn normalize_token(token: &str) -> String {
    token
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .collect()
}

fn download_answer(question: &str) -> String {
    question
        .split_whitespace()
        .map(normalize_token)
        .find_map(|token| official_source(&token))
        .map(|url| format!("Use official source: {url}"))
        .unwrap_or_else(|| GENERIC_DOWNLOAD_ADVICE.to_string())
}

pub fn respond(question: &str, last_scan: Option<&ScanResult>) -> String {
    let lowered = question.to_lowercase();

    if lowered.contains("remove") {
        return REMOVAL_ADVICE.to_string();
    }

    if lowered.contains("safe") {
        return match last_scan {
            Some(scan) => safety_answer(scan),
            None => NO_SCAN_ATTACHED.to_string(),
        };
    }

    if lowered.contains("where") && lowered.contains("download") {
        return download_answer(question);
    }

    DISCLAIMER.to_string()
}

/// Message a user sends to hand the last scan over to the assistant.
pub fn attach_prompt(scan: &ScanResult) -> String {
    format!(
        "Attached scan: {} (score {}%). Please advise.",
        scan.filename, scan.score
    )
}
