use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::catalog::Catalog;

/// POI type -> Font Awesome icon name
pub type Mapping = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("io error")]
    Io(#[from] io::Error),
    #[error("mapping file is not valid json")]
    Json(#[from] serde_json::Error),
    #[error("failed to replace the mapping file")]
    Persist(#[from] tempfile::PersistError),
    #[error("no mapping found at {path:?}, run map-poi-icons first")]
    MissingPriorState { path: PathBuf },
}

/// The json file that keeps the mapping between runs
pub struct MappingStore {
    path: PathBuf,
}

impl MappingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the mapping, or an empty one if the file doesn't exist yet
    pub fn load(&self) -> Result<Mapping, MappingError> {
        match File::open(&self.path) {
            Ok(file) => {
                let mapping: Mapping = serde_json::from_reader(BufReader::new(file))?;
                tracing::info!(entries = mapping.len(), "loaded existing mapping");
                Ok(mapping)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("no existing mapping found, starting fresh");
                Ok(Mapping::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Like [`Self::load`], but a missing file is an error
    pub fn load_required(&self) -> Result<Mapping, MappingError> {
        if !self.path.exists() {
            return Err(MappingError::MissingPriorState {
                path: self.path.clone(),
            });
        }
        self.load()
    }

    /// Writes the whole mapping to a temp file next to the target and renames it over
    pub fn save(&self, mapping: &Mapping) -> Result<(), MappingError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, mapping)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        tracing::info!(path = ?self.path, entries = mapping.len(), "saved mapping");
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Merged {
    pub mapping: Mapping,
    /// poi types that were filled in from the catalog defaults
    pub seeded: Vec<String>,
    /// poi types with neither an existing entry nor a default, in catalog order
    pub unmapped: Vec<String>,
}

/// Fills in defaults for every catalog entry the existing mapping doesn't have yet.
///
/// Existing entries are never touched, even if the catalog has a different default.
pub fn merge(existing: Mapping, catalog: &Catalog<'_>) -> Merged {
    let mut merged = Merged {
        mapping: existing,
        ..Default::default()
    };

    for poi_type in catalog.poi_types() {
        if merged.mapping.contains_key(poi_type) {
            continue;
        }

        match catalog.default_icon(poi_type) {
            Some(icon) => {
                merged
                    .mapping
                    .insert(poi_type.to_string(), icon.to_string());
                merged.seeded.push(poi_type.to_string());
            }
            None => merged.unmapped.push(poi_type.to_string()),
        }
    }

    merged
}
