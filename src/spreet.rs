use std::{
    ffi::OsString,
    future::Future,
    io,
    path::{Path, PathBuf},
    process::Output,
    time::Duration,
};

use thiserror::Error;
use tokio::process::Command;

use crate::resolver::count_svgs;

#[cfg(test)]
use mockall::automock;

pub const SPREET_REPO: &str = "https://github.com/flother/spreet.git";

#[derive(Error, Debug)]
pub enum PackError {
    #[error("docker is not available")]
    DockerUnavailable,
    #[error("docker image {image} is not available: {message}")]
    ImageUnavailable { image: String, message: String },
    #[error("no svg files to process in {0:?}")]
    NoSources(PathBuf),
    #[error("{step} failed: {stderr}")]
    ToolFailed { step: String, stderr: String },
    #[error("{step} timed out after {timeout:?}")]
    Timeout { step: String, timeout: Duration },
    #[error("io error")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Density {
    Standard,
    Retina,
}

impl Density {
    pub const ALL: [Density; 2] = [Self::Standard, Self::Retina];

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Standard => "",
            Self::Retina => "@2x",
        }
    }

    /// `poi` or `poi@2x`
    pub fn output_name(self, sprite_name: &str) -> String {
        format!("{sprite_name}{}", self.suffix())
    }
}

/// Turns a folder of svgs into a sprite sheet png and its json index
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait SpritePacker {
    /// makes sure the packer can run at all
    async fn prepare(&self) -> Result<(), PackError>;
    async fn pack(&self, density: Density, output_name: &str) -> Result<(), PackError>;
}

/// Runs spreet inside docker
pub struct DockerSpreet {
    image: String,
    svg_dir: PathBuf,
    output_dir: PathBuf,
    timeout: Duration,
}

impl DockerSpreet {
    pub fn new(image: &str, svg_dir: &Path, output_dir: &Path, timeout: Duration) -> Self {
        Self {
            image: image.to_string(),
            svg_dir: svg_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            timeout,
        }
    }

    fn run_args(
        &self,
        svg_dir: &Path,
        output_dir: &Path,
        density: Density,
        output_name: &str,
    ) -> Vec<OsString> {
        let mut sources = svg_dir.as_os_str().to_owned();
        sources.push(":/sources");
        let mut output = output_dir.as_os_str().to_owned();
        output.push(":/output");

        let mut args: Vec<OsString> = vec![
            "run".into(),
            "--rm".into(),
            "--entrypoint".into(),
            "/app/spreet".into(),
            "-v".into(),
            sources,
            "-v".into(),
            output,
            self.image.clone().into(),
        ];
        if density == Density::Retina {
            args.push("--retina".into());
        }
        args.push("/sources".into());
        args.push(format!("/output/{output_name}").into());
        args
    }

    async fn docker(&self, step: &str, args: &[OsString]) -> Result<Output, PackError> {
        let mut cmd = Command::new("docker");
        cmd.args(args).kill_on_drop(true);

        tracing::debug!(?args, "running docker");
        with_timeout(step, self.timeout, cmd.output()).await
    }

    async fn check_docker(&self) -> Result<(), PackError> {
        match self.docker("docker ps", &["ps".into()]).await {
            Ok(out) if out.status.success() => {
                tracing::info!("docker is running");
                Ok(())
            }
            Ok(out) => {
                tracing::warn!(stderr = %String::from_utf8_lossy(&out.stderr), "docker is not running");
                Err(PackError::DockerUnavailable)
            }
            Err(PackError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("docker not found");
                Err(PackError::DockerUnavailable)
            }
            Err(e) => Err(e),
        }
    }

    async fn ensure_image(&self) -> Result<(), PackError> {
        let out = self
            .docker(
                "docker images",
                &["images".into(), "-q".into(), self.image.clone().into()],
            )
            .await?;
        if !String::from_utf8_lossy(&out.stdout).trim().is_empty() {
            tracing::info!(image = %self.image, "docker image already present");
            return Ok(());
        }

        tracing::info!(image = %self.image, "building docker image");
        let out = self
            .docker(
                "docker build",
                &[
                    "build".into(),
                    "-t".into(),
                    self.image.clone().into(),
                    SPREET_REPO.into(),
                ],
            )
            .await
            .map_err(|e| PackError::ImageUnavailable {
                image: self.image.clone(),
                message: e.to_string(),
            })?;

        if out.status.success() {
            tracing::info!("docker image built");
            Ok(())
        } else {
            Err(PackError::ImageUnavailable {
                image: self.image.clone(),
                message: String::from_utf8_lossy(&out.stderr).into_owned(),
            })
        }
    }
}

/// Awaits one external step, giving up after `timeout`.
///
/// Dropping the future is what stops the step, so child processes need `kill_on_drop`.
pub async fn with_timeout<T>(
    step: &str,
    timeout: Duration,
    fut: impl Future<Output = io::Result<T>>,
) -> Result<T, PackError> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(res) => Ok(res?),
        Err(_) => Err(PackError::Timeout {
            step: step.to_string(),
            timeout,
        }),
    }
}

#[async_trait::async_trait]
impl SpritePacker for DockerSpreet {
    async fn prepare(&self) -> Result<(), PackError> {
        self.check_docker().await?;
        self.ensure_image().await
    }

    async fn pack(&self, density: Density, output_name: &str) -> Result<(), PackError> {
        // docker wants absolute paths for bind mounts
        let svg_dir = std::fs::canonicalize(&self.svg_dir)?;
        let output_dir = std::fs::canonicalize(&self.output_dir)?;

        let args = self.run_args(&svg_dir, &output_dir, density, output_name);
        let out = self.docker(&format!("spreet {output_name}"), &args).await?;

        if out.status.success() {
            Ok(())
        } else {
            Err(PackError::ToolFailed {
                step: format!("spreet {output_name}"),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            })
        }
    }
}

#[derive(Debug, Default)]
pub struct PackReport {
    pub built: Vec<String>,
    pub failed: Vec<(String, PackError)>,
}

/// Builds every density of the sprite sheet.
///
/// Returns an error if nothing could be attempted; a failing density is recorded and
/// the next one is still built.
pub async fn pack_sprites(
    packer: &(dyn SpritePacker + Sync),
    svg_dir: &Path,
    sprite_name: &str,
) -> Result<PackReport, PackError> {
    packer.prepare().await?;

    let svg_count = count_svgs(svg_dir)?;
    if svg_count == 0 {
        return Err(PackError::NoSources(svg_dir.to_path_buf()));
    }
    tracing::info!("processing {svg_count} svg files");

    let mut report = PackReport::default();
    for density in Density::ALL {
        let name = density.output_name(sprite_name);
        tracing::info!("building {name}");

        match packer.pack(density, &name).await {
            Ok(()) => {
                tracing::info!("{name}.png created");
                tracing::info!("{name}.json created");
                report.built.push(name);
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to build {name}");
                report.failed.push((name, e));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use mockall::predicate::*;

    use super::*;

    fn svg_dir_with(n: usize) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..n {
            std::fs::write(dir.path().join(format!("poi{i}.svg")), "<svg/>").unwrap();
        }
        dir
    }

    #[test]
    fn test_output_names() {
        assert_eq!(Density::Standard.output_name("poi"), "poi");
        assert_eq!(Density::Retina.output_name("poi"), "poi@2x");
    }

    #[test]
    fn test_run_args() {
        let spreet = DockerSpreet::new(
            "local-spreet-builder",
            Path::new("/b/svgs"),
            Path::new("/o"),
            Duration::from_secs(1),
        );

        let args = spreet.run_args(
            Path::new("/b/svgs"),
            Path::new("/o"),
            Density::Retina,
            "poi@2x",
        );
        assert_eq!(
            args,
            [
                "run",
                "--rm",
                "--entrypoint",
                "/app/spreet",
                "-v",
                "/b/svgs:/sources",
                "-v",
                "/o:/output",
                "local-spreet-builder",
                "--retina",
                "/sources",
                "/output/poi@2x",
            ]
            .map(OsString::from)
        );

        let args = spreet.run_args(
            Path::new("/b/svgs"),
            Path::new("/o"),
            Density::Standard,
            "poi",
        );
        assert!(!args.contains(&OsString::from("--retina")));
        assert_eq!(args.last().unwrap(), "/output/poi");
    }

    #[tokio::test]
    async fn test_one_density_failing_doesnt_stop_the_other() {
        let dir = svg_dir_with(3);

        let mut packer = MockSpritePacker::new();
        packer.expect_prepare().times(1).returning(|| Ok(()));
        packer
            .expect_pack()
            .with(eq(Density::Standard), eq("poi"))
            .times(1)
            .returning(|_, _| {
                Err(PackError::ToolFailed {
                    step: "spreet poi".into(),
                    stderr: "boom".into(),
                })
            });
        packer
            .expect_pack()
            .with(eq(Density::Retina), eq("poi@2x"))
            .times(1)
            .returning(|_, _| Ok(()));

        let report = pack_sprites(&packer, dir.path(), "poi").await.unwrap();

        assert_eq!(report.built, vec!["poi@2x"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "poi");
    }

    #[tokio::test]
    async fn test_step_that_never_finishes_times_out() {
        let res = with_timeout(
            "spreet poi",
            Duration::from_millis(20),
            std::future::pending::<io::Result<()>>(),
        )
        .await;

        match res {
            Err(PackError::Timeout { step, timeout }) => {
                assert_eq!(step, "spreet poi");
                assert_eq!(timeout, Duration::from_millis(20));
            }
            other => panic!("expected a timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_finished_step_keeps_its_result() {
        let out = with_timeout("docker ps", Duration::from_secs(5), async { Ok(7) }).await;
        assert_eq!(out.unwrap(), 7);

        let err = with_timeout("docker ps", Duration::from_secs(5), async {
            Err::<(), _>(io::Error::from(io::ErrorKind::NotFound))
        })
        .await;
        assert!(matches!(err, Err(PackError::Io(e)) if e.kind() == io::ErrorKind::NotFound));
    }

    /// standard density hangs forever, retina works
    struct HangingStandard;

    #[async_trait::async_trait]
    impl SpritePacker for HangingStandard {
        async fn prepare(&self) -> Result<(), PackError> {
            Ok(())
        }

        async fn pack(&self, density: Density, output_name: &str) -> Result<(), PackError> {
            match density {
                Density::Standard => {
                    with_timeout(
                        &format!("spreet {output_name}"),
                        Duration::from_millis(20),
                        std::future::pending::<io::Result<()>>(),
                    )
                    .await
                }
                Density::Retina => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn test_timed_out_density_doesnt_stop_the_other() {
        let dir = svg_dir_with(2);

        let report = pack_sprites(&HangingStandard, dir.path(), "poi")
            .await
            .unwrap();

        assert_eq!(report.built, vec!["poi@2x"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "poi");
        assert!(matches!(report.failed[0].1, PackError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_no_sources() {
        let dir = svg_dir_with(0);

        let mut packer = MockSpritePacker::new();
        packer.expect_prepare().returning(|| Ok(()));
        packer.expect_pack().times(0);

        let res = pack_sprites(&packer, dir.path(), "poi").await;
        assert!(matches!(res, Err(PackError::NoSources(_))));
    }

    #[tokio::test]
    async fn test_docker_unavailable() {
        let dir = svg_dir_with(1);

        let mut packer = MockSpritePacker::new();
        packer
            .expect_prepare()
            .returning(|| Err(PackError::DockerUnavailable));
        packer.expect_pack().times(0);

        let res = pack_sprites(&packer, dir.path(), "poi").await;
        assert!(matches!(res, Err(PackError::DockerUnavailable)));
    }
}
