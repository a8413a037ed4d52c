use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::mapping::Mapping;

/// Font Awesome style folders, in the order they are searched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleCategory {
    Solid,
    Regular,
    Brands,
}

impl StyleCategory {
    pub const PRIORITY: [StyleCategory; 3] = [Self::Solid, Self::Regular, Self::Brands];

    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Regular => "regular",
            Self::Brands => "brands",
        }
    }
}

impl fmt::Display for StyleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// found in one of the style folders
    Direct {
        path: PathBuf,
        category: StyleCategory,
    },
    /// found somewhere else in the tree, only by file name
    Fallback { path: PathBuf },
    NotFound,
}

/// A folder of svgs laid out as `<category>/<icon>.svg`
pub struct IconSource {
    root: PathBuf,
}

impl IconSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, icon: &str) -> Resolution {
        let file_name = format!("{icon}.svg");

        for category in StyleCategory::PRIORITY {
            let path = self.root.join(category.dir_name()).join(&file_name);
            if path.is_file() {
                return Resolution::Direct { path, category };
            }
        }

        match find_file(&self.root, &file_name) {
            Some(path) => Resolution::Fallback { path },
            None => Resolution::NotFound,
        }
    }
}

/// Depth first search with sorted entries, so the result doesn't depend on the filesystem.
///
/// Style folders are visited in priority order before anything else. Symlinked
/// directories are not followed.
fn find_file(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let mut entries = match std::fs::read_dir(dir) {
        Ok(rd) => rd
            .flatten()
            .filter_map(|e| Some((e.path(), e.file_type().ok()?)))
            .collect::<Vec<_>>(),
        Err(e) => {
            tracing::debug!(?dir, error = %e, "can't read directory");
            return None;
        }
    };
    entries.sort_by_key(|(path, _)| (search_rank(path), path.clone()));

    if let Some((hit, _)) = entries.iter().find(|(p, _)| {
        p.file_name().map_or(false, |n| n == file_name) && p.is_file()
    }) {
        return Some(hit.clone());
    }

    entries
        .iter()
        .filter(|(_, t)| t.is_dir())
        .find_map(|(p, _)| find_file(p, file_name))
}

/// position of a style folder in the search order, everything else after them
fn search_rank(path: &Path) -> usize {
    StyleCategory::PRIORITY
        .iter()
        .position(|c| path.file_name().map_or(false, |n| n == c.dir_name()))
        .unwrap_or(StyleCategory::PRIORITY.len())
}

#[derive(Error, Debug)]
pub enum StageError {
    #[error("{icon}.svg not found for {poi_type}")]
    AssetNotFound { poi_type: String, icon: String },
    #[error("failed to copy {icon}.svg for {poi_type}")]
    Copy {
        poi_type: String,
        icon: String,
        #[source]
        source: io::Error,
    },
}

impl StageError {
    pub fn poi_type(&self) -> &str {
        match self {
            Self::AssetNotFound { poi_type, .. } | Self::Copy { poi_type, .. } => poi_type,
        }
    }

    pub fn icon(&self) -> &str {
        match self {
            Self::AssetNotFound { icon, .. } | Self::Copy { icon, .. } => icon,
        }
    }
}

#[derive(Debug, Default)]
pub struct StageReport {
    pub staged: usize,
    pub fallbacks: usize,
    pub failures: Vec<StageError>,
}

/// Copies the icon of every mapped poi type into `svg_dir` as `<poi_type>.svg`.
///
/// Individual failures are collected in the report; only failing to prepare `svg_dir`
/// itself is an error.
pub fn stage_icons(
    mapping: &Mapping,
    source: &IconSource,
    svg_dir: &Path,
) -> io::Result<StageReport> {
    clear_svgs(svg_dir)?;

    tracing::info!(root = ?source.root(), "staging icons");

    let mut report = StageReport::default();

    for (poi_type, icon) in mapping {
        let (path, category) = match source.resolve(icon) {
            Resolution::Direct { path, category } => (path, Some(category)),
            Resolution::Fallback { path } => (path, None),
            Resolution::NotFound => {
                tracing::warn!("not found: {icon}.svg for {poi_type}");
                report.failures.push(StageError::AssetNotFound {
                    poi_type: poi_type.clone(),
                    icon: icon.clone(),
                });
                continue;
            }
        };

        let dest = svg_dir.join(format!("{poi_type}.svg"));
        if let Err(e) = std::fs::copy(&path, &dest) {
            tracing::warn!(error = %e, "failed to copy {icon}.svg for {poi_type}");
            report.failures.push(StageError::Copy {
                poi_type: poi_type.clone(),
                icon: icon.clone(),
                source: e,
            });
            continue;
        }

        match category {
            Some(category) => tracing::info!("{poi_type:30} -> {icon}.svg ({category})"),
            None => {
                report.fallbacks += 1;
                tracing::warn!(?path, "{poi_type:30} -> {icon}.svg (matched by file name only)");
            }
        }
        report.staged += 1;
    }

    tracing::info!(staged = report.staged, "svgs copied");
    if !report.failures.is_empty() {
        tracing::warn!(count = report.failures.len(), "icons not found:");
        for failure in report.failures.iter().take(10) {
            tracing::warn!("  - {} -> {}", failure.poi_type(), failure.icon());
        }
    }

    Ok(report)
}

/// removes svgs left over from a previous run
fn clear_svgs(svg_dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(svg_dir)?;
    for entry in std::fs::read_dir(svg_dir)?.flatten() {
        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |e| e == "svg") {
            std::fs::remove_file(path)?;
        }
    }
    Ok(())
}

/// Number of svgs in the staging directory
pub fn count_svgs(svg_dir: &Path) -> io::Result<usize> {
    Ok(std::fs::read_dir(svg_dir)?
        .flatten()
        .filter(|e| e.path().extension().map_or(false, |ext| ext == "svg"))
        .count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn mapping(entries: &[(&str, &str)]) -> Mapping {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_solid_wins() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "brands/star.svg", "b");
        touch(dir.path(), "regular/star.svg", "r");
        touch(dir.path(), "solid/star.svg", "s");

        let res = IconSource::new(dir.path()).resolve("star");
        assert_eq!(
            res,
            Resolution::Direct {
                path: dir.path().join("solid/star.svg"),
                category: StyleCategory::Solid
            }
        );
    }

    #[test]
    fn test_regular_beats_brands() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "brands/bluetooth.svg", "b");
        touch(dir.path(), "regular/bluetooth.svg", "r");

        let res = IconSource::new(dir.path()).resolve("bluetooth");
        assert!(matches!(
            res,
            Resolution::Direct {
                category: StyleCategory::Regular,
                ..
            }
        ));
    }

    #[test]
    fn test_fallback_search() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "sharp-light/b/ferry.svg", "x");
        touch(dir.path(), "sharp-light/a/ferry.svg", "y");

        let res = IconSource::new(dir.path()).resolve("ferry");
        assert_eq!(
            res,
            Resolution::Fallback {
                path: dir.path().join("sharp-light/a/ferry.svg")
            }
        );
    }

    #[test]
    fn test_fallback_prefers_style_folders() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "release/svgs/brands/bluetooth.svg", "b");
        touch(dir.path(), "release/svgs/regular/bluetooth.svg", "r");
        touch(dir.path(), "release/svgs/aaa/bluetooth.svg", "a");

        let res = IconSource::new(dir.path()).resolve("bluetooth");
        assert_eq!(
            res,
            Resolution::Fallback {
                path: dir.path().join("release/svgs/regular/bluetooth.svg")
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_fallback_survives_symlink_loop() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "icons/solid-ish/ferry.svg", "f");
        std::os::unix::fs::symlink(dir.path(), dir.path().join("icons/loop")).unwrap();

        let source = IconSource::new(dir.path());
        assert_eq!(source.resolve("unicorn"), Resolution::NotFound);
        assert_eq!(
            source.resolve("ferry"),
            Resolution::Fallback {
                path: dir.path().join("icons/solid-ish/ferry.svg")
            }
        );
    }

    #[test]
    fn test_not_found() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "solid/star.svg", "s");

        assert_eq!(
            IconSource::new(dir.path()).resolve("unicorn"),
            Resolution::NotFound
        );
        assert_eq!(
            IconSource::new(dir.path().join("missing")).resolve("star"),
            Resolution::NotFound
        );
    }

    #[test]
    fn test_stage_keeps_going_after_a_miss() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        touch(src.path(), "solid/utensils.svg", "utensils");
        touch(src.path(), "regular/hospital.svg", "hospital");

        let m = mapping(&[
            ("restaurant", "utensils"),
            ("unicorn_shop", "unicorn"),
            ("hospital", "hospital"),
        ]);

        let report = stage_icons(&m, &IconSource::new(src.path()), out.path()).unwrap();

        assert_eq!(report.staged, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].poi_type(), "unicorn_shop");
        assert_eq!(report.failures[0].icon(), "unicorn");
        assert_eq!(
            std::fs::read_to_string(out.path().join("restaurant.svg")).unwrap(),
            "utensils"
        );
        assert!(out.path().join("hospital.svg").is_file());
        assert!(!out.path().join("unicorn_shop.svg").exists());
    }

    #[test]
    fn test_stage_removes_stale_svgs() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        touch(src.path(), "solid/utensils.svg", "utensils");
        touch(out.path(), "removed_type.svg", "old");
        touch(out.path(), "notes.txt", "keep");

        let m = mapping(&[("restaurant", "utensils")]);
        stage_icons(&m, &IconSource::new(src.path()), out.path()).unwrap();

        assert!(!out.path().join("removed_type.svg").exists());
        assert!(out.path().join("notes.txt").exists());
        assert_eq!(count_svgs(out.path()).unwrap(), 1);
    }

    #[test]
    fn test_stage_counts_fallbacks() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        touch(src.path(), "duotone/ferry.svg", "ferry");

        let m = mapping(&[("ferry_terminal", "ferry")]);
        let report = stage_icons(&m, &IconSource::new(src.path()), out.path()).unwrap();

        assert_eq!((report.staged, report.fallbacks), (1, 1));
    }
}
