//! High score persistence
//!
//! A single best score in a plain text file, read once at startup and
//! rewritten only when strictly beaten. I/O trouble here is logged and never
//! interrupts a round.

use std::fs;
use std::path::Path;

/// Default high score file, kept next to the working directory.
pub const HIGH_SCORE_FILE: &str = "highscore.txt";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScore {
    pub best: u32,
}

impl HighScore {
    /// Read a stored score; a missing or garbled file counts as zero.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => match text.trim().parse() {
                Ok(best) => {
                    log::info!("loaded high score {best}");
                    Self { best }
                }
                Err(_) => {
                    log::warn!("unreadable high score in {}; starting at 0", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn load() -> Self {
        Self::load_from(Path::new(HIGH_SCORE_FILE))
    }

    /// Fold in a round's final score. Returns true when it beat the record.
    pub fn record(&mut self, score: u32) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Write the score out; failure is logged, not fatal.
    pub fn save_to(&self, path: &Path) {
        if let Err(err) = fs::write(path, self.best.to_string()) {
            log::warn!("could not save high score to {}: {err}", path.display());
        }
    }

    pub fn save(&self) {
        self.save_to(Path::new(HIGH_SCORE_FILE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_only_on_strict_improvement() {
        let mut high = HighScore::default();
        assert!(high.record(3));
        assert!(!high.record(3));
        assert!(!high.record(2));
        assert!(high.record(4));
        assert_eq!(high.best, 4);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("highscore.txt");
        let high = HighScore { best: 17 };
        high.save_to(&path);
        assert_eq!(HighScore::load_from(&path), high);
    }

    #[test]
    fn test_missing_or_garbled_file_is_zero() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("nope.txt");
        assert_eq!(HighScore::load_from(&missing).best, 0);

        let garbled = dir.path().join("bad.txt");
        fs::write(&garbled, "not a number").expect("write");
        assert_eq!(HighScore::load_from(&garbled).best, 0);
    }
}
