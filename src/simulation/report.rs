//! Winner reports and evolution snapshots written to disk.

use crate::simulation::genome::Genome;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// Line separating sections within a report file.
pub const SECTION_DELIMITER: &str = "______________________________";

/// Appends winner sections to per-species report files in one directory.
///
/// Report files are append-only: every round adds a delimited section, so the
/// file reads as the species' history across a whole run.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Creates a writer rooted at a directory. Nothing is touched on disk
    /// until the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory reports land in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends one titled section to `<dir>/<file_stem>.txt`.
    ///
    /// The directory and the headlined file are created on first use.
    ///
    /// # Returns
    ///
    /// The path of the report file written to.
    pub fn append_section(
        &self,
        file_stem: &str,
        title: &str,
        info: &str,
    ) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{file_stem}.txt"));
        if !path.exists() {
            fs::write(&path, format!("{file_stem}\n\n\n"))?;
        }
        let mut file = fs::OpenOptions::new().append(true).open(&path)?;
        writeln!(file, "{SECTION_DELIMITER}")?;
        write!(file, "{title}:\n{info}\n\n\n")?;
        Ok(path)
    }

    /// Saves one winner genome as pretty JSON next to the reports.
    pub fn save_genome(&self, title: &str, genome: &Genome) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{title}.json"));
        let json = serde_json::to_string_pretty(genome).map_err(std::io::Error::other)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

/// Resumable state of the generational loop: the parent pools and the
/// generation they were evaluated at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionSnapshot {
    /// Rounds completed when the snapshot was taken.
    pub generation: u32,
    /// Parent pool the next boat cohort spawns from.
    pub boat_parents: Vec<Genome>,
    /// Parent pool the next pirate cohort spawns from.
    pub pirate_parents: Vec<Genome>,
    /// Parent pool the next navy cohort spawns from.
    pub navy_parents: Vec<Genome>,
}

impl EvolutionSnapshot {
    /// Saves the snapshot to a JSON file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads a snapshot from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = fs::read_to_string(path)?;
        let snapshot = serde_json::from_str(&json)?;
        Ok(snapshot)
    }
}
