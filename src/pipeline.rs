use std::{io, path::Path};

use thiserror::Error;

use crate::{
    catalog::Catalog,
    config::BuildPaths,
    docs::{write_docs, BuildInfo},
    fontawesome::FetchError,
    mapping::{MappingError, MappingStore},
    resolver::{stage_icons, IconSource, StageReport},
    spreet::{pack_sprites, PackError, PackReport, SpritePacker},
};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("{0}")]
    Mapping(#[from] MappingError),
    #[error("io error")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Fetch(#[from] FetchError),
}

pub struct SpriteBuild<'a> {
    pub paths: &'a BuildPaths,
    pub output_dir: &'a Path,
    pub sprite_name: &'a str,
    pub url_base: &'a str,
    pub catalog: Catalog<'a>,
}

#[derive(Debug)]
pub struct BuildSummary {
    pub mapped: usize,
    pub stage: StageReport,
    /// `Err` if packing couldn't be attempted at all
    pub pack: Result<PackReport, PackError>,
}

impl BuildSummary {
    pub fn fully_succeeded(&self) -> bool {
        self.stage.failures.is_empty()
            && matches!(&self.pack, Ok(report) if report.failed.is_empty())
    }
}

impl SpriteBuild<'_> {
    /// Stages the icons of the stored mapping, packs them and writes the docs.
    ///
    /// Only a missing mapping or a broken staging directory is an error; everything
    /// else ends up in the summary.
    pub async fn run(
        &self,
        store: &MappingStore,
        source: &IconSource,
        packer: &(dyn SpritePacker + Sync),
    ) -> Result<BuildSummary, BuildError> {
        let mapping = store.load_required()?;

        let stage = stage_icons(&mapping, source, &self.paths.svg_dir)?;

        let pack = pack_sprites(packer, &self.paths.svg_dir, self.sprite_name).await;

        let mapped = self
            .catalog
            .poi_types()
            .filter(|t| mapping.contains_key(*t))
            .count();

        match &pack {
            Ok(_) => {
                let info = BuildInfo::new(
                    self.sprite_name,
                    self.catalog.len(),
                    mapped,
                    stage.staged,
                    self.output_dir,
                );
                write_docs(&info, self.url_base, self.output_dir, &self.paths.build_info)?;
            }
            Err(e) => tracing::warn!(error = %e, "sprite generation failed"),
        }

        Ok(BuildSummary {
            mapped,
            stage,
            pack,
        })
    }
}
