use crate::types::Verdict;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

pub const DETECTION_THRESHOLD: u8 = 65;
pub const CLEAN_LABEL: &str = "No known threats (simulated)";
pub const RANSOM_LABEL: &str = "Ransom.Win32.Simulated";

pub const THREAT_CATALOG: &[&str] = &[
    "Trojan.Generic.AI",
    "Worm.Agent.X",
    "Ransom.Win32.Locky",
    "Backdoor.Stealther",
    "Dropper.Packed.Z",
    "Spyware.DataExfil",
    "Loader.EvasiveV2",
    "Adware.UnwantedV",
    "PUP.SuspiciousInstaller",
];

pub fn is_risky_score(score: u8) -> bool {
    score >= DETECTION_THRESHOLD
}

pub fn resolve_verdict<R: Rng + ?Sized>(score: u8, filename: &str, rng: &mut R) -> Verdict {
    let mut detected = is_risky_score(score);
    let mut threat_label = if detected {
        THREAT_CATALOG
            .choose(rng)
            .copied()
            .unwrap_or(THREAT_CATALOG[0])
            .to_string()
    } else {
        CLEAN_LABEL.to_string()
    };

    // Filename override runs last and always wins.
    if filename.to_lowercase().contains("ransom") {
        debug!("ransom override for {filename}");
        detected = true;
        threat_label = RANSOM_LABEL.to_string();
    }

    Verdict {
        threat_label,
        detected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn ransom_override_wins_for_every_score() {
        let mut rng = StdRng::seed_from_u64(9);
        for score in 0..=100u8 {
            let verdict = resolve_verdict(score, "Invoice_RANSOM_note.pdf", &mut rng);
            assert!(verdict.detected);
            assert_eq!(verdict.threat_label, RANSOM_LABEL);
        }
    }

    #[test]
    fn detection_follows_threshold_without_override() {
        let mut rng = StdRng::seed_from_u64(11);
        for score in 2..=99u8 {
            let verdict = resolve_verdict(score, "setup.exe", &mut rng);
            assert_eq!(verdict.detected, score >= 65, "score {score}");
            if verdict.detected {
                assert!(THREAT_CATALOG.contains(&verdict.threat_label.as_str()));
            } else {
                assert_eq!(verdict.threat_label, CLEAN_LABEL);
            }
        }
    }

    #[test]
    fn catalog_has_nine_names() {
        assert_eq!(THREAT_CATALOG.len(), 9);
    }

    #[test]
    fn seeded_rng_gives_repeatable_labels() {
        let first = resolve_verdict(90, "a.exe", &mut StdRng::seed_from_u64(5));
        let second = resolve_verdict(90, "a.exe", &mut StdRng::seed_from_u64(5));
        assert_eq!(first, second);
    }
}
