use crate::model::ScoredMode;

/// In-memory snapshot of the best score per scored mode.
///
/// Loaded once at startup; the session raises an entry when a completed run beats it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScores {
    capital: u32,
    country: u32,
}

impl HighScores {
    #[must_use]
    pub fn new(capital: u32, country: u32) -> Self {
        Self { capital, country }
    }

    #[must_use]
    pub fn get(&self, mode: ScoredMode) -> u32 {
        match mode {
            ScoredMode::Capital => self.capital,
            ScoredMode::Country => self.country,
        }
    }

    /// Raise the stored best for `mode` if `score` strictly exceeds it.
    ///
    /// Returns `true` when the snapshot changed.
    pub fn record(&mut self, mode: ScoredMode, score: u32) -> bool {
        let slot = match mode {
            ScoredMode::Capital => &mut self.capital,
            ScoredMode::Country => &mut self.country,
        };
        if score > *slot {
            *slot = score;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_only_raises() {
        let mut scores = HighScores::new(5, 0);
        assert!(!scores.record(ScoredMode::Capital, 5));
        assert!(!scores.record(ScoredMode::Capital, 3));
        assert!(scores.record(ScoredMode::Capital, 7));
        assert_eq!(scores.get(ScoredMode::Capital), 7);
        assert_eq!(scores.get(ScoredMode::Country), 0);
    }
}
