// profiler.rs
// Per-section timing for the kernel, compiled in with the `profiling` feature

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Accumulated timing for one named section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectionStats {
    pub total: Duration,
    pub calls: u64,
    pub longest: Duration,
}

impl SectionStats {
    fn record(&mut self, elapsed: Duration) {
        self.total += elapsed;
        self.calls += 1;
        self.longest = self.longest.max(elapsed);
    }

    pub fn mean(&self) -> Duration {
        match u32::try_from(self.calls) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total / n,
            Err(_) => Duration::from_secs_f64(self.total.as_secs_f64() / self.calls as f64),
        }
    }
}

#[derive(Debug, Default)]
pub struct Profiler {
    sections: HashMap<&'static str, SectionStats>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, section: &'static str, elapsed: Duration) {
        self.sections.entry(section).or_default().record(elapsed);
    }

    pub fn section(&self, name: &str) -> Option<SectionStats> {
        self.sections.get(name).copied()
    }

    /// Sections ordered by total time, slowest first; ties by name.
    pub fn report(&self) -> Vec<(&'static str, SectionStats)> {
        let mut rows: Vec<_> = self.sections.iter().map(|(name, stats)| (*name, *stats)).collect();
        rows.sort_by(|a, b| b.1.total.cmp(&a.1.total).then(a.0.cmp(b.0)));
        rows
    }

    pub fn clear(&mut self) {
        self.sections.clear();
    }

    /// Log one line per section, then start over.
    pub fn log_and_clear(&mut self) {
        for (name, stats) in self.report() {
            log::info!(
                "{name:<20} total {:?}  calls {}  mean {:?}  max {:?}",
                stats.total,
                stats.calls,
                stats.mean(),
                stats.longest
            );
        }
        self.clear();
    }
}

/// Times a section from creation until drop.
pub struct SectionTimer {
    section: &'static str,
    started: Instant,
}

pub fn start(section: &'static str) -> SectionTimer {
    SectionTimer { section, started: Instant::now() }
}

#[cfg(feature = "profiling")]
impl Drop for SectionTimer {
    fn drop(&mut self) {
        crate::PROFILER.lock().record(self.section, self.started.elapsed());
    }
}

/// Profile the enclosing scope when the `profiling` feature is enabled.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::profiler::start($name);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_per_section() {
        let mut p = Profiler::new();
        p.record("update", Duration::from_millis(2));
        p.record("update", Duration::from_millis(6));
        p.record("load_scene", Duration::from_millis(1));

        let update = p.section("update").unwrap();
        assert_eq!(update.calls, 2);
        assert_eq!(update.total, Duration::from_millis(8));
        assert_eq!(update.mean(), Duration::from_millis(4));
        assert_eq!(update.longest, Duration::from_millis(6));

        let names: Vec<_> = p.report().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["update", "load_scene"]);

        p.log_and_clear();
        assert!(p.report().is_empty());
    }

    #[test]
    fn empty_section_has_zero_mean() {
        assert_eq!(SectionStats::default().mean(), Duration::ZERO);
    }
}
