//! Champion policy persistence
//!
//! The best evolved network travels between runs as a versioned JSON
//! envelope. An existing artifact is only replaced by a strictly better
//! fitness; a corrupt one is detected and replaced with a warning rather
//! than crashing the trainer.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evo::Champion;
use crate::policy::PolicyNetwork;

/// Default artifact location.
pub const CHAMPION_FILE: &str = "champion.json";

/// Envelope version; bump when the network layout changes.
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed champion artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported artifact version {found} (expected {ARTIFACT_VERSION})")]
    Version { found: u32 },
}

/// The stored champion: the network plus enough context to compare runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionArtifact {
    pub version: u32,
    pub fitness: f32,
    pub generation: u32,
    pub network: PolicyNetwork,
}

impl From<&Champion> for ChampionArtifact {
    fn from(champion: &Champion) -> Self {
        Self {
            version: ARTIFACT_VERSION,
            fitness: champion.fitness,
            generation: champion.generation,
            network: champion.network.clone(),
        }
    }
}

/// Whether a save attempt replaced the stored artifact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SaveOutcome {
    Saved,
    /// The stored artifact's fitness was at least as good
    KeptExisting { fitness: f32 },
}

pub fn load_champion_from(path: &Path) -> Result<ChampionArtifact, PersistError> {
    let text = fs::read_to_string(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let artifact: ChampionArtifact = serde_json::from_str(&text)?;
    if artifact.version != ARTIFACT_VERSION {
        return Err(PersistError::Version {
            found: artifact.version,
        });
    }
    Ok(artifact)
}

pub fn load_champion() -> Result<ChampionArtifact, PersistError> {
    load_champion_from(Path::new(CHAMPION_FILE))
}

/// Store `candidate` unless the artifact already on disk is strictly better.
///
/// A missing artifact is simply written; an unreadable or version-mismatched
/// one is replaced with a warning (corruption recovery beats keeping a file
/// nothing can load).
pub fn save_champion_if_better(
    path: &Path,
    candidate: &ChampionArtifact,
) -> Result<SaveOutcome, PersistError> {
    match load_champion_from(path) {
        Ok(existing) if existing.fitness >= candidate.fitness => {
            return Ok(SaveOutcome::KeptExisting {
                fitness: existing.fitness,
            });
        }
        Ok(_) => {}
        Err(PersistError::Io { ref source, .. })
            if source.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            log::warn!("replacing unusable champion artifact: {err}");
        }
    }

    let json = serde_json::to_string_pretty(candidate)?;
    fs::write(path, json).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(SaveOutcome::Saved)
}

pub fn save_champion(candidate: &ChampionArtifact) -> Result<SaveOutcome, PersistError> {
    save_champion_if_better(Path::new(CHAMPION_FILE), candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn artifact(fitness: f32) -> ChampionArtifact {
        let mut rng = Pcg32::seed_from_u64(fitness.to_bits() as u64);
        ChampionArtifact {
            version: ARTIFACT_VERSION,
            fitness,
            generation: 3,
            network: PolicyNetwork::random(4, &mut rng),
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("champion.json");
        let stored = artifact(12.5);
        assert_eq!(
            save_champion_if_better(&path, &stored).expect("save"),
            SaveOutcome::Saved
        );
        let loaded = load_champion_from(&path).expect("load");
        assert_eq!(loaded, stored);
    }

    #[test]
    fn test_only_strictly_better_overwrites() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("champion.json");
        save_champion_if_better(&path, &artifact(20.0)).expect("save");

        // Equal fitness keeps the stored artifact
        assert_eq!(
            save_champion_if_better(&path, &artifact(20.0)).expect("save"),
            SaveOutcome::KeptExisting { fitness: 20.0 }
        );
        // Worse fitness keeps it too
        assert_eq!(
            save_champion_if_better(&path, &artifact(5.0)).expect("save"),
            SaveOutcome::KeptExisting { fitness: 20.0 }
        );
        // Strictly better replaces it
        assert_eq!(
            save_champion_if_better(&path, &artifact(25.0)).expect("save"),
            SaveOutcome::Saved
        );
        assert_eq!(load_champion_from(&path).expect("load").fitness, 25.0);
    }

    #[test]
    fn test_corrupt_artifact_is_replaced() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("champion.json");
        fs::write(&path, "{{definitely not json").expect("write");
        assert_eq!(
            save_champion_if_better(&path, &artifact(1.0)).expect("save"),
            SaveOutcome::Saved
        );
        assert_eq!(load_champion_from(&path).expect("load").fitness, 1.0);
    }

    #[test]
    fn test_version_mismatch_rejected_on_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("champion.json");
        let mut old = artifact(2.0);
        old.version = 99;
        fs::write(&path, serde_json::to_string(&old).expect("encode")).expect("write");
        assert!(matches!(
            load_champion_from(&path),
            Err(PersistError::Version { found: 99 })
        ));
    }
}
