//! Saving and loading of population snapshots.
use neuroevo_nn::Network;

use serde::{Deserialize, Serialize};

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "population_";

/// File format of saved snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveFormat {
    Ron,
    Json,
}

impl SaveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Ron => "ron",
            Self::Json => "json",
        }
    }
}

/// The genomes of a population at a given generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub generation: usize,
    pub genomes: Vec<Network>,
}

#[derive(Serialize)]
struct BorrowedSnapshot<'a> {
    generation: usize,
    genomes: &'a [Network],
}

/// Error type for failed saves and loads.
#[derive(Debug)]
pub enum PersistenceError {
    Io(io::Error),
    /// RON (de)serialization failure.
    Ron(String),
    Json(serde_json::Error),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o error: {}", e),
            Self::Ron(e) => write!(f, "RON error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Ron(_) => None,
            Self::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for PersistenceError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Writes a population snapshot into a directory
/// every `save_every` generations.
#[derive(Clone, Debug)]
pub struct SaveManager {
    directory: PathBuf,
    format: SaveFormat,
    save_every: NonZeroUsize,
}

impl SaveManager {
    pub fn new(directory: impl Into<PathBuf>, format: SaveFormat, save_every: NonZeroUsize) -> SaveManager {
        SaveManager {
            directory: directory.into(),
            format,
            save_every,
        }
    }

    /// Saves the generation if it is due, returning
    /// the written file's path.
    pub fn on_generation(
        &self,
        generation: usize,
        genomes: &[Network],
    ) -> Result<Option<PathBuf>, PersistenceError> {
        if generation % self.save_every.get() != 0 {
            return Ok(None);
        }
        self.save(generation, genomes).map(Some)
    }

    /// Saves the genomes of a generation unconditionally.
    pub fn save(&self, generation: usize, genomes: &[Network]) -> Result<PathBuf, PersistenceError> {
        fs::create_dir_all(&self.directory)?;
        let snapshot = BorrowedSnapshot {
            generation,
            genomes,
        };
        let contents = match self.format {
            SaveFormat::Ron => ron::to_string(&snapshot).map_err(|e| PersistenceError::Ron(e.to_string()))?,
            SaveFormat::Json => serde_json::to_string(&snapshot)?,
        };
        let path = self.directory.join(format!(
            "{}{:06}.{}",
            FILE_PREFIX,
            generation,
            self.format.extension()
        ));
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Lists saved snapshot files of this manager's
    /// format, oldest generation first.
    pub fn saved_files(&self) -> Result<Vec<PathBuf>, PersistenceError> {
        if !self.directory.exists() {
            return Ok(vec![]);
        }
        let mut files = vec![];
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if let Some(generation) = self.snapshot_generation(&path) {
                files.push((generation, path));
            }
        }
        files.sort_by_key(|(generation, _)| *generation);
        Ok(files.into_iter().map(|(_, path)| path).collect())
    }

    /// The generation a snapshot file of this manager's
    /// format was saved at, parsed from its name.
    fn snapshot_generation(&self, path: &Path) -> Option<usize> {
        if path.extension()?.to_str()? != self.format.extension() {
            return None;
        }
        path.file_stem()?
            .to_str()?
            .strip_prefix(FILE_PREFIX)?
            .parse()
            .ok()
    }

    /// Loads a snapshot, in this manager's format.
    pub fn load(&self, path: &Path) -> Result<PopulationSnapshot, PersistenceError> {
        let contents = fs::read_to_string(path)?;
        match self.format {
            SaveFormat::Ron => ron::from_str(&contents).map_err(|e| PersistenceError::Ron(e.to_string())),
            SaveFormat::Json => Ok(serde_json::from_str(&contents)?),
        }
    }

    /// Loads the most recently saved generation, if any.
    pub fn load_latest(&self) -> Result<Option<PopulationSnapshot>, PersistenceError> {
        match self.saved_files()?.last() {
            Some(path) => self.load(path).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuroevo_nn::NetworkConfig;
    use tempfile::tempdir;

    fn genomes() -> Vec<Network> {
        let template = Network::new(&[2, 3, 1], NetworkConfig::default()).unwrap();
        (0..4).map(|_| template.randomized()).collect()
    }

    #[test]
    fn saves_only_due_generations() {
        let dir = tempdir().unwrap();
        let manager = SaveManager::new(dir.path(), SaveFormat::Json, NonZeroUsize::new(3).unwrap());
        let genomes = genomes();

        let saved: Vec<_> = (1..=7)
            .filter_map(|generation| manager.on_generation(generation, &genomes).unwrap())
            .collect();
        assert_eq!(saved.len(), 2);
        assert_eq!(manager.saved_files().unwrap(), saved);
    }

    #[test]
    fn round_trip_in_both_formats() {
        for format in [SaveFormat::Ron, SaveFormat::Json] {
            let dir = tempdir().unwrap();
            let manager = SaveManager::new(dir.path(), format, NonZeroUsize::new(1).unwrap());
            let genomes = genomes();

            manager.save(2, &genomes).unwrap();
            manager.save(10, &genomes[..2]).unwrap();

            let latest = manager.load_latest().unwrap().unwrap();
            assert_eq!(latest.generation, 10);
            assert_eq!(latest.genomes.len(), 2);
            for (loaded, original) in latest.genomes.iter().zip(&genomes) {
                assert_eq!(loaded.to_record(), original.to_record());
            }
        }
    }

    #[test]
    fn latest_is_highest_generation() {
        let dir = tempdir().unwrap();
        let manager = SaveManager::new(dir.path(), SaveFormat::Ron, NonZeroUsize::new(1).unwrap());
        let genomes = genomes();

        // Past six digits, names no longer sort by generation.
        for generation in [50, 1_000_000, 70] {
            manager.save(generation, &genomes[..2]).unwrap();
        }

        let names: Vec<_> = manager
            .saved_files()
            .unwrap()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            ["population_000050.ron", "population_000070.ron", "population_1000000.ron"]
        );
        assert_eq!(manager.load_latest().unwrap().unwrap().generation, 1_000_000);
    }

    #[test]
    fn listing_ignores_other_files() {
        let dir = tempdir().unwrap();
        let manager = SaveManager::new(dir.path(), SaveFormat::Ron, NonZeroUsize::new(1).unwrap());
        assert!(manager.saved_files().unwrap().is_empty());
        assert!(manager.load_latest().unwrap().is_none());

        manager.save(1, &genomes()).unwrap();
        fs::write(dir.path().join("notes.ron"), "()").unwrap();
        fs::write(dir.path().join("population_latest.ron"), "()").unwrap();
        fs::write(dir.path().join("population_000002.json"), "{}").unwrap();
        assert_eq!(manager.saved_files().unwrap().len(), 1);
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let dir = tempdir().unwrap();
        let manager = SaveManager::new(dir.path().join("saves"), SaveFormat::Json, NonZeroUsize::new(1).unwrap());
        assert!(manager.saved_files().unwrap().is_empty());
    }

    #[test]
    fn corrupt_files_are_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("population_000001.json");
        fs::write(&path, "{\"generation\": 1}").unwrap();

        let manager = SaveManager::new(dir.path(), SaveFormat::Json, NonZeroUsize::new(1).unwrap());
        assert!(matches!(manager.load(&path), Err(PersistenceError::Json(_))));
        assert!(matches!(
            manager.load(&dir.path().join("missing.json")),
            Err(PersistenceError::Io(_))
        ));
    }
}
