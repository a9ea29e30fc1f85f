use scansim_core::{human_size, Advisory, FileMetadata, ScanResult, ScanUpdate};
use std::fmt::Write;

pub fn file_summary(meta: &FileMetadata) -> String {
    let kind = meta.declared_type.as_deref().unwrap_or("Unknown type");
    format!("{} ({kind}, {})", meta.name, human_size(meta.size))
}

pub fn progress_line(update: &ScanUpdate) -> String {
    format!("[{:>3}%] {}", update.percent, update.status_text)
}

pub fn advisories(items: &[Advisory]) -> String {
    let mut out = String::new();
    for item in items {
        let _ = writeln!(out, "  - {}: {}", item.keyword, item.url);
    }
    out
}

pub fn scan_report(result: &ScanResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "File:    {} ({})", result.filename, result.human_size);
    let _ = writeln!(out, "Status:  {} [{}]", result.status_text(), result.badge());
    let _ = writeln!(out, "Threat:  {}", result.threat_label);
    let _ = writeln!(out, "Score:   {}%", result.score);
    let _ = writeln!(out, "Hash:    {} (simulated)", result.synthetic_hash);
    let _ = writeln!(out, "Reasons:");
    for reason in &result.reasons {
        let _ = writeln!(out, "  - {reason}");
    }
    let _ = writeln!(out, "Official sources:");
    out.push_str(&advisories(&result.suggestions));
    out
}
