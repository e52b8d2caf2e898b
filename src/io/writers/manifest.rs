//! Batch manifest describing the artifacts a run produced.
//!
//! The manifest is rewritten wholesale at the end of every run. Readers
//! that want incremental state diff two manifests; the writer never
//! patches one in place.
use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub artifact: String,
    pub dataset: String,
    pub width: usize,
    pub height: usize,
    pub display_interval_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub generated_at: DateTime<Utc>,
    pub generation: u32,
    /// Region id to artifact entry, ordered for stable diffs.
    pub regions: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new(generation: u32) -> Self {
        Self {
            generated_at: Utc::now(),
            generation,
            regions: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, region_id: &str, entry: ManifestEntry) {
        self.regions.insert(region_id.to_owned(), entry);
    }

    /// Atomically replaces `manifest.json` under `dir`.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join("manifest.json");
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(path)
    }

    pub fn read(dir: &Path) -> Result<Self> {
        let text = fs::read_to_string(dir.join("manifest.json"))?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> ManifestEntry {
        ManifestEntry {
            artifact: format!("{name}_srtm_90m_128px_v1.json"),
            dataset: "srtm_90m".to_owned(),
            width: 128,
            height: 96,
            display_interval_m: 120.0,
        }
    }

    #[test]
    fn roundtrip_is_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = Manifest::new(1);
        first.insert("alps", entry("alps"));
        first.insert("andes", entry("andes"));
        first.write(dir.path()).unwrap();

        // A later run with fewer regions replaces the file outright.
        let mut second = Manifest::new(2);
        second.insert("alps", entry("alps"));
        second.write(dir.path()).unwrap();

        let back = Manifest::read(dir.path()).unwrap();
        assert_eq!(back.generation, 2);
        assert_eq!(back.regions.len(), 1);
        assert!(back.regions.contains_key("alps"));
    }

    #[test]
    fn regions_serialize_in_sorted_order() {
        let mut m = Manifest::new(1);
        m.insert("zagros", entry("zagros"));
        m.insert("alps", entry("alps"));
        let json = serde_json::to_string(&m).unwrap();
        let alps = json.find("alps").unwrap();
        let zagros = json.find("zagros").unwrap();
        assert!(alps < zagros);
    }
}
