/*!
 * JSON corpus files.
 *
 * A corpus file holds `{"units": [...]}`; a corpus path may also be a
 * directory, in which case every `*.json` file below it is loaded in file
 * name order.
 */

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::Unit;
use super::memory::MemoryStore;

/// On-disk corpus format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusFile {
    /// Units with their language variants
    #[serde(default)]
    pub units: Vec<Unit>,
}

impl CorpusFile {
    /// Parse one corpus file
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read corpus file: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse corpus file: {:?}", path))
    }

    /// Write as pretty-printed JSON
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize corpus")?;
        fs::write(path, json).with_context(|| format!("Failed to write corpus file: {:?}", path))
    }
}

/// Every JSON file making up a corpus path
fn corpus_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(anyhow!("Corpus path does not exist: {:?}", path));
    }

    let files = WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")))
        .collect();

    Ok(files)
}

/// Load a corpus file or directory into a memory store.
///
/// Later files override earlier ones for the same unit and language.
pub fn load_corpus(path: &Path) -> Result<MemoryStore> {
    let store = MemoryStore::new();
    let files = corpus_files(path)?;

    for file in &files {
        let corpus = CorpusFile::read(file)?;
        debug!("Loaded {} units from {:?}", corpus.units.len(), file);
        for unit in corpus.units {
            store.insert_unit(unit);
        }
    }

    info!("Loaded corpus of {} units from {} file(s)", store.len(), files.len());
    Ok(store)
}
