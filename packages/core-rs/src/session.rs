use crate::advisory::suggest_advisories;
use crate::error::{Result, ScanError};
use crate::format::human_size;
use crate::hash::synthesize_hash;
use crate::risk::score_file;
use crate::types::{FileMetadata, ScanPhase, ScanProgress, ScanResult, ScanUpdate};
use crate::verdict::resolve_verdict;
use log::{debug, info, warn};
use rand::Rng;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const TICK_INTERVAL: Duration = Duration::from_millis(500);
pub const MIN_STEP: u8 = 6;
pub const MAX_STEP: u8 = 23;
/// Upper bound on ticks from start to `Done`: `ceil(100 / MIN_STEP)`.
pub const MAX_TICKS: u32 = 17;
pub const IDLE_STATUS: &str = "Ready to scan";

pub type Clock = Box<dyn Fn() -> u64 + Send>;

fn system_now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn validate(meta: Option<FileMetadata>) -> Result<FileMetadata> {
    let meta = meta.ok_or_else(|| ScanError::InvalidInput("no file selected".to_string()))?;
    if meta.name.trim().is_empty() {
        return Err(ScanError::InvalidInput("file name is empty".to_string()));
    }
    Ok(meta)
}

/// One simulated scan, `Idle -> Scanning -> Done`.
///
/// The session never schedules itself: a caller-owned timer calls [`ScanSession::tick`]
/// once per interval. A finished session is not reused; start a new one per file.
pub struct ScanSession<R> {
    rng: R,
    clock: Clock,
    meta: Option<FileMetadata>,
    percent: u8,
    phase: ScanPhase,
    ticks: u32,
    result: Option<ScanResult>,
}

impl<R: Rng> ScanSession<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            clock: Box::new(system_now_millis),
            meta: None,
            percent: 0,
            phase: ScanPhase::Idle,
            ticks: 0,
            result: None,
        }
    }

    /// Replaces the wall clock used to seed the synthetic hash.
    pub fn with_clock(mut self, clock: impl Fn() -> u64 + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn start(&mut self, meta: Option<FileMetadata>) -> Result<()> {
        if self.phase != ScanPhase::Idle {
            warn!("ignoring start on a session in phase {:?}", self.phase);
            return Err(ScanError::AlreadyStarted);
        }
        let meta = validate(meta).inspect_err(|error| warn!("scan rejected: {error}"))?;
        debug!("scan started for {} ({} bytes)", meta.name, meta.size);
        self.meta = Some(meta);
        self.phase = ScanPhase::Scanning;
        Ok(())
    }

    /// Advances progress by one step. Returns `None` unless the session is scanning.
    pub fn tick(&mut self) -> Option<ScanUpdate> {
        if self.phase != ScanPhase::Scanning {
            return None;
        }

        let step = self.rng.gen_range(MIN_STEP..=MAX_STEP);
        self.percent = self.percent.saturating_add(step).min(100);
        self.ticks += 1;
        debug!("tick {} -> {}%", self.ticks, self.percent);

        if self.percent < 100 {
            return Some(ScanUpdate {
                percent: self.percent,
                status_text: format!("Analyzing ({}%)", self.percent),
            });
        }

        let result = self.finish();
        let update = ScanUpdate {
            percent: 100,
            status_text: result.status_text().to_string(),
        };
        self.result = Some(result);
        self.phase = ScanPhase::Done;
        Some(update)
    }

    fn finish(&mut self) -> ScanResult {
        let meta = self.meta.take().unwrap_or_default();
        let assessment = score_file(&meta, &mut self.rng);
        let verdict = resolve_verdict(assessment.score, &meta.name, &mut self.rng);
        let synthetic_hash = synthesize_hash(&meta.name, meta.size, (self.clock)());
        let suggestions = suggest_advisories(&meta.name);

        info!(
            "scan of {} finished after {} ticks: score {} ({})",
            meta.name, self.ticks, assessment.score, verdict.threat_label
        );

        ScanResult {
            human_size: human_size(meta.size),
            filename: meta.name,
            size_bytes: meta.size,
            synthetic_hash,
            score: assessment.score,
            threat_label: verdict.threat_label,
            detected: verdict.detected,
            reasons: assessment.reasons,
            suggestions,
        }
    }

    pub fn progress(&self) -> ScanProgress {
        ScanProgress {
            percent: self.percent,
            phase: self.phase,
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn status_text(&self) -> String {
        match (&self.phase, &self.result) {
            (ScanPhase::Idle, _) => IDLE_STATUS.to_string(),
            (ScanPhase::Done, Some(result)) => result.status_text().to_string(),
            _ => format!("Analyzing ({}%)", self.percent),
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase == ScanPhase::Done
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn result(&self) -> Option<&ScanResult> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<ScanResult> {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run_to_done<R: Rng>(session: &mut ScanSession<R>) -> Vec<ScanUpdate> {
        let mut updates = Vec::new();
        while let Some(update) = session.tick() {
            updates.push(update);
            if session.is_done() {
                break;
            }
        }
        updates
    }

    #[test]
    fn start_without_metadata_is_invalid_input() {
        let mut session = ScanSession::new(StdRng::seed_from_u64(1));
        let error = session.start(None).unwrap_err();
        assert!(matches!(error, ScanError::InvalidInput(_)));
        assert_eq!(session.phase(), ScanPhase::Idle);
        assert_eq!(session.status_text(), IDLE_STATUS);
    }

    #[test]
    fn start_with_blank_name_is_invalid_input() {
        let mut session = ScanSession::new(StdRng::seed_from_u64(1));
        let error = session.start(Some(FileMetadata::new("   ", 10))).unwrap_err();
        assert!(matches!(error, ScanError::InvalidInput(_)));
    }

    #[test]
    fn second_start_is_rejected_and_keeps_state() {
        let mut session = ScanSession::new(StdRng::seed_from_u64(1));
        session.start(Some(FileMetadata::new("a.txt", 1))).unwrap();
        session.tick();
        let before = session.progress();
        assert_eq!(
            session.start(Some(FileMetadata::new("b.txt", 1))),
            Err(ScanError::AlreadyStarted)
        );
        assert_eq!(session.progress(), before);
    }

    #[test]
    fn idle_session_does_not_tick() {
        let mut session = ScanSession::new(StdRng::seed_from_u64(1));
        assert!(session.tick().is_none());
        assert_eq!(session.ticks(), 0);
    }

    #[test]
    fn minimum_steps_reach_done_in_exactly_max_ticks() {
        // StepRng(0, 0) always draws the smallest step.
        let mut session = ScanSession::new(StepRng::new(0, 0)).with_clock(|| 0);
        session
            .start(Some(FileMetadata::new("invoice.pdf", 120_000)))
            .unwrap();
        let updates = run_to_done(&mut session);
        assert_eq!(session.ticks(), MAX_TICKS);
        assert_eq!(updates.len(), MAX_TICKS as usize);
        assert_eq!(updates[0].percent, MIN_STEP);
        assert_eq!(updates[0].status_text, "Analyzing (6%)");
        assert_eq!(updates.last().map(|u| u.percent), Some(100));
    }

    #[test]
    fn percent_is_monotonic_and_bounded_for_many_seeds() {
        for seed in 0..200u64 {
            let mut session = ScanSession::new(StdRng::seed_from_u64(seed));
            session
                .start(Some(FileMetadata::new("invoice.pdf", 120_000)))
                .unwrap();
            let updates = run_to_done(&mut session);
            assert!(session.is_done());
            assert!(session.ticks() <= MAX_TICKS);
            for pair in updates.windows(2) {
                assert!(pair[0].percent < pair[1].percent);
            }
            assert!(updates.iter().all(|u| u.percent <= 100));
        }
    }

    #[test]
    fn steps_cover_the_full_range_before_the_final_clamp() {
        let mut largest = 0u8;
        for seed in 0..200u64 {
            let mut session = ScanSession::new(StdRng::seed_from_u64(seed));
            session
                .start(Some(FileMetadata::new("invoice.pdf", 120_000)))
                .unwrap();
            let updates = run_to_done(&mut session);

            let mut percents = vec![0u8];
            percents.extend(updates.iter().map(|u| u.percent));
            // The last step may be cut short by the clamp at 100.
            let unclamped = &percents[..percents.len() - 1];
            for pair in unclamped.windows(2) {
                let step = pair[1] - pair[0];
                assert!((MIN_STEP..=MAX_STEP).contains(&step), "seed {seed}: step {step}");
                largest = largest.max(step);
            }
        }
        assert_eq!(largest, MAX_STEP);
    }

    #[test]
    fn done_session_emits_nothing_more_and_keeps_one_result() {
        let mut session = ScanSession::new(StdRng::seed_from_u64(4)).with_clock(|| 1_000);
        session
            .start(Some(FileMetadata::new("vlc_player.exe", 2048)))
            .unwrap();
        run_to_done(&mut session);
        let ticks = session.ticks();
        assert!(session.tick().is_none());
        assert_eq!(session.ticks(), ticks);

        let status = session.status_text();
        let result = session.into_result().expect("result");
        assert_eq!(status, result.status_text());
        assert_eq!(result.filename, "vlc_player.exe");
        assert_eq!(result.human_size, "2.0 KB");
        assert_eq!(
            result.synthetic_hash,
            synthesize_hash("vlc_player.exe", 2048, 1_000)
        );
        assert_eq!(result.suggestions[0].keyword, "vlc");
        assert!(!result.reasons.is_empty());
        assert_eq!(result.detected, result.score >= 65);
    }

    #[test]
    fn ransom_file_is_always_detected() {
        let mut session = ScanSession::new(StdRng::seed_from_u64(8));
        session
            .start(Some(FileMetadata::new("ransomnote.txt", 1)))
            .unwrap();
        run_to_done(&mut session);
        let result = session.result().expect("result");
        assert!(result.detected);
        assert_eq!(result.threat_label, "Ransom.Win32.Simulated");
    }
}
