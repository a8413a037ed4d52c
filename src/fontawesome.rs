use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;

use crate::config::BuildPaths;

#[cfg(test)]
use mockall::automock;

pub const FA_VERSION: &str = "6.5.1";

pub fn archive_url() -> String {
    format!(
        "https://github.com/FortAwesome/Font-Awesome/releases/download/{FA_VERSION}/fontawesome-free-{FA_VERSION}-web.zip"
    )
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error")]
    Network(#[from] reqwest::Error),
    #[error("download failed with status {0}")]
    Status(reqwest::StatusCode),
    #[error("io error")]
    Io(#[from] io::Error),
    #[error("archive error")]
    Archive(#[from] zip::result::ZipError),
}

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ArchiveDownloader {
    /// downloads `url` into the file at `dest`
    async fn download(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ArchiveDownloader for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let res = self.client.get(url).send().await?;
        if !res.status().is_success() {
            return Err(FetchError::Status(res.status()));
        }

        let bytes = res.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    AlreadyPresent(PathBuf),
    Downloaded(PathBuf),
}

/// Places of the `svgs` folder inside the extracted archive, most likely first
pub fn svg_dir_candidates() -> Vec<PathBuf> {
    vec![
        PathBuf::from(format!("fontawesome-free-{FA_VERSION}-web/svgs")),
        PathBuf::from(format!("fontawesome-free-{FA_VERSION}-desktop/svgs")),
        PathBuf::from("svgs"),
    ]
}

/// Returns the first candidate `svgs` folder that exists under `fa_dir`.
///
/// If none of them match, any `<release>/svgs` one level down is accepted, so an
/// archive of another version extracted by hand is still found.
pub fn discover_svg_root(fa_dir: &Path) -> Option<PathBuf> {
    svg_dir_candidates()
        .into_iter()
        .map(|c| fa_dir.join(c))
        .find(|p| p.is_dir())
        .or_else(|| any_release_svgs(fa_dir))
}

fn any_release_svgs(fa_dir: &Path) -> Option<PathBuf> {
    let mut found = std::fs::read_dir(fa_dir)
        .ok()?
        .flatten()
        .filter(|e| e.file_type().map_or(false, |t| t.is_dir()))
        .map(|e| e.path().join("svgs"))
        .filter(|p| p.is_dir())
        .collect::<Vec<_>>();
    found.sort();

    let root = found.into_iter().next()?;
    tracing::info!(?root, "using svgs of an unexpected font awesome release");
    Some(root)
}

/// Like [`discover_svg_root`], but falls back to searching all of `fa_dir`
pub fn svg_root_or_fallback(fa_dir: &Path) -> PathBuf {
    discover_svg_root(fa_dir).unwrap_or_else(|| {
        tracing::warn!(?fa_dir, "font awesome svg directory not found, searching everything");
        fa_dir.to_path_buf()
    })
}

/// Makes sure the font awesome svgs are in the build directory.
///
/// Does nothing if they are already there.
pub async fn fetch(
    downloader: &(dyn ArchiveDownloader + Sync),
    paths: &BuildPaths,
) -> Result<FetchOutcome, FetchError> {
    if let Some(root) = discover_svg_root(&paths.fa_dir) {
        tracing::info!(?root, "font awesome already downloaded, skipping download");
        return Ok(FetchOutcome::AlreadyPresent(root));
    }

    let url = archive_url();
    tracing::info!(%url, "downloading font awesome free");
    downloader.download(&url, &paths.archive_file).await?;

    tracing::info!("extracting font awesome");
    let staging = paths.tmp_dir.join("fontawesome");
    let res = extract(&paths.archive_file, &staging, &paths.fa_dir);
    // the archive is useless either way
    if let Err(e) = std::fs::remove_file(&paths.archive_file) {
        tracing::debug!(error = %e, "couldn't remove archive");
    }
    res?;

    Ok(FetchOutcome::Downloaded(svg_root_or_fallback(&paths.fa_dir)))
}

/// Extracts into `staging` first and only moves the tree into `dest` once the whole
/// archive is out, so a broken extraction never looks like a finished download.
fn extract(archive: &Path, staging: &Path, dest: &Path) -> Result<(), FetchError> {
    if staging.exists() {
        std::fs::remove_dir_all(staging)?;
    }

    let res = extract_into(archive, staging, dest);
    if let Err(e) = std::fs::remove_dir_all(staging) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::debug!(error = %e, ?staging, "couldn't remove extraction dir");
        }
    }
    res
}

fn extract_into(archive: &Path, staging: &Path, dest: &Path) -> Result<(), FetchError> {
    let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
    zip.extract(staging)?;

    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(staging)?.flatten() {
        let target = dest.join(entry.file_name());
        if target.is_dir() {
            std::fs::remove_dir_all(&target)?;
        } else if target.exists() {
            std::fs::remove_file(&target)?;
        }
        std::fs::rename(entry.path(), &target)?;
    }
    Ok(())
}

/// What to tell the user when the icons have to be placed by hand
pub fn manual_placement_instructions(paths: &BuildPaths) -> String {
    format!(
        "Please download Font Awesome manually:\n\
         1. Go to https://fontawesome.com/download\n\
         2. Download 'Free For Web'\n\
         3. Extract the archive into {}",
        paths.fa_dir.display()
    )
}
