use anyhow::{Context, Result};
use scansim_core::ScanResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const STORE_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastScanFile {
    pub version: u8,
    pub saved_at: i64,
    pub scan: ScanResult,
}

pub fn last_scan_path(state_dir: &Path) -> PathBuf {
    state_dir.join("last-scan.json")
}

/// Unreadable, corrupt or foreign-version files count as "no scan".
pub fn read_last_scan(state_dir: &Path) -> Option<ScanResult> {
    let path = last_scan_path(state_dir);
    let contents = fs::read_to_string(&path).ok()?;
    match serde_json::from_str::<LastScanFile>(&contents) {
        Ok(file) if file.version == STORE_VERSION => Some(file.scan),
        Ok(file) => {
            log::warn!(
                "ignoring last scan with unsupported version {} at {}",
                file.version,
                path.display()
            );
            None
        }
        Err(error) => {
            log::warn!("ignoring unreadable last scan at {}: {error}", path.display());
            None
        }
    }
}

pub fn write_last_scan(state_dir: &Path, scan: &ScanResult) -> Result<()> {
    let saved_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64;
    let file = LastScanFile {
        version: STORE_VERSION,
        saved_at,
        scan: scan.clone(),
    };
    let data = serde_json::to_string_pretty(&file).context("Failed to encode last scan")?;

    fs::create_dir_all(state_dir)
        .with_context(|| format!("Failed to create {}", state_dir.display()))?;
    let path = last_scan_path(state_dir);
    fs::write(&path, data).with_context(|| format!("Failed to write {}", path.display()))
}

/// Returns whether a stored scan was removed.
pub fn clear_last_scan(state_dir: &Path) -> Result<bool> {
    let path = last_scan_path(state_dir);
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(error) => Err(error).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scansim_core::suggest_advisories;
    use tempfile::tempdir;

    fn sample_scan() -> ScanResult {
        ScanResult {
            filename: "zoom_installer.msi".to_string(),
            size_bytes: 3_000_000,
            human_size: "2.9 MB".to_string(),
            synthetic_hash: "1234abcd".repeat(8),
            score: 57,
            threat_label: "No known threats (simulated)".to_string(),
            detected: false,
            reasons: vec!["Executable file type.".to_string()],
            suggestions: suggest_advisories("zoom_installer.msi"),
        }
    }

    #[test]
    fn write_then_read_returns_same_scan() {
        let temp = tempdir().unwrap();
        let state_dir = temp.path().join("nested");
        write_last_scan(&state_dir, &sample_scan()).unwrap();
        assert_eq!(read_last_scan(&state_dir), Some(sample_scan()));
    }

    #[test]
    fn missing_or_corrupt_file_reads_as_none() {
        let temp = tempdir().unwrap();
        assert_eq!(read_last_scan(temp.path()), None);

        fs::write(last_scan_path(temp.path()), "{not json").unwrap();
        assert_eq!(read_last_scan(temp.path()), None);
    }

    #[test]
    fn unknown_version_reads_as_none() {
        let temp = tempdir().unwrap();
        let file = LastScanFile {
            version: 99,
            saved_at: 0,
            scan: sample_scan(),
        };
        fs::write(
            last_scan_path(temp.path()),
            serde_json::to_string(&file).unwrap(),
        )
        .unwrap();
        assert_eq!(read_last_scan(temp.path()), None);
    }

    #[test]
    fn clear_reports_whether_anything_was_removed() {
        let temp = tempdir().unwrap();
        assert!(!clear_last_scan(temp.path()).unwrap());
        write_last_scan(temp.path(), &sample_scan()).unwrap();
        assert!(clear_last_scan(temp.path()).unwrap());
        assert_eq!(read_last_scan(temp.path()), None);
    }
}
