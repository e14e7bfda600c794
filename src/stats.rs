//! Derived, non-persisted display values: word count, text statistics and
//! typing speed.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Count whitespace-separated words.
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteStats {
    pub words: usize,
    pub chars: usize,
    pub lines: usize,
}

impl NoteStats {
    pub fn of(content: &str) -> Self {
        Self {
            words: word_count(content),
            chars: content.chars().count(),
            lines: content.split('\n').count(),
        }
    }
}

impl std::fmt::Display for NoteStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Words: {} | Chars: {} | Lines: {}",
            self.words, self.chars, self.lines
        )
    }
}

/// Words-per-minute meter for one editing session on one note.
///
/// The meter starts at the first recorded edit and measures words added
/// since then. Deleting text never yields a negative speed.
#[derive(Debug, Clone, Default)]
pub struct TypingMeter {
    start: Option<(DateTime<Utc>, usize)>,
}

impl TypingMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the current session.
    pub fn reset(&mut self) {
        self.start = None;
    }

    /// Start a session from a known baseline word count.
    pub fn start(&mut self, at: DateTime<Utc>, words: usize) {
        self.start = Some((at, words));
    }

    /// Record an edit and return the speed so far, if measurable.
    pub fn record(&mut self, at: DateTime<Utc>, words: usize) -> Option<f64> {
        let (started, baseline) = match self.start {
            Some(start) => start,
            None => {
                self.start = Some((at, words));
                return None;
            }
        };

        let elapsed_ms = (at - started).num_milliseconds();
        if elapsed_ms <= 0 {
            return None;
        }

        let typed = words.saturating_sub(baseline) as f64;
        let minutes = elapsed_ms as f64 / 60_000.0;
        Some(typed / minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_word_count_ignores_surrounding_whitespace() {
        assert_eq!(word_count("  one  two   three "), 3);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count(" \n\t "), 0);
        assert_eq!(word_count("line one\nline\ttwo"), 4);
    }

    #[test]
    fn test_note_stats() {
        let stats = NoteStats::of("# Title\nbody text\n");
        assert_eq!(stats.words, 4);
        assert_eq!(stats.chars, 18);
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.to_string(), "Words: 4 | Chars: 18 | Lines: 3");
    }

    #[test]
    fn test_empty_content_has_one_line() {
        assert_eq!(NoteStats::of("").lines, 1);
    }

    #[test]
    fn test_typing_meter() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let mut meter = TypingMeter::new();

        assert_eq!(meter.record(t0, 10), None);
        let wpm = meter.record(t0 + Duration::seconds(30), 25).unwrap();
        assert!((wpm - 30.0).abs() < f64::EPSILON);

        // Removing words does not go negative.
        let wpm = meter.record(t0 + Duration::seconds(60), 5).unwrap();
        assert_eq!(wpm, 0.0);

        meter.reset();
        assert_eq!(meter.record(t0 + Duration::seconds(90), 5), None);
    }

    #[test]
    fn test_typing_meter_with_baseline() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let mut meter = TypingMeter::new();
        meter.start(t0, 0);
        let wpm = meter.record(t0 + Duration::minutes(2), 100).unwrap();
        assert!((wpm - 50.0).abs() < f64::EPSILON);
    }
}
