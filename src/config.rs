use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct BuildDirArgs {
    /// Working directory for the mapping, icon source and staged svgs
    #[arg(long, env = "BUILD_DIR", default_value = "/srv/build/poi-sprites")]
    pub build_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct SpriteArgs {
    /// Where the sprite sheets end up
    #[arg(long, env = "OUTPUT_DIR", default_value = "/srv/assets/sprites/poi")]
    pub output_dir: PathBuf,

    /// Docker image containing spreet
    #[arg(long, env = "DOCKER_IMAGE", default_value = "local-spreet-builder")]
    pub docker_image: String,

    /// Base name of the sprite files
    #[arg(long, env = "SPRITE_NAME", default_value = "poi")]
    pub sprite_name: String,

    /// Public url the output directory is served from, used in the generated readme
    #[arg(
        long,
        env = "SPRITE_URL_BASE",
        default_value = "https://tiles.oe5ith.at/assets/sprites/poi"
    )]
    pub sprite_url_base: String,

    /// Timeout in seconds for the download and every docker invocation
    #[arg(long = "timeout", env = "STEP_TIMEOUT", default_value_t = 600)]
    pub timeout_secs: u64,

    /// Don't wait for the icon source to be placed by hand if the download fails
    #[arg(long, env = "NO_PROMPT")]
    pub no_prompt: bool,
}

impl SpriteArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Layout of the build directory
#[derive(Debug, Clone)]
pub struct BuildPaths {
    pub build_dir: PathBuf,
    pub svg_dir: PathBuf,
    pub tmp_dir: PathBuf,
    pub fa_dir: PathBuf,
    pub mapping_file: PathBuf,
    pub archive_file: PathBuf,
    pub build_info: PathBuf,
}

impl BuildPaths {
    pub fn new(build_dir: &Path) -> Self {
        Self {
            build_dir: build_dir.to_path_buf(),
            svg_dir: build_dir.join("svgs"),
            tmp_dir: build_dir.join("tmp"),
            fa_dir: build_dir.join("fontawesome"),
            mapping_file: build_dir.join("poi_mapping.json"),
            archive_file: build_dir.join("fontawesome.zip"),
            build_info: build_dir.join("build_info.json"),
        }
    }

    /// Creates the build directory and its subdirectories, plus any extra ones given
    pub fn prepare(&self, extra: &[&Path]) -> io::Result<()> {
        let dirs = [
            self.build_dir.as_path(),
            &self.svg_dir,
            &self.tmp_dir,
            &self.fa_dir,
        ];
        for dir in dirs.iter().chain(extra) {
            std::fs::create_dir_all(dir)?;
            tracing::debug!(?dir, "directory ready");
        }
        Ok(())
    }
}
