use std::process::ExitCode;

use clap::Parser;
use tokio::io::AsyncBufReadExt;

use poi_sprites::{
    catalog::Catalog,
    config::{BuildDirArgs, BuildPaths, SpriteArgs},
    fontawesome::{
        self, manual_placement_instructions, svg_root_or_fallback, FetchOutcome, HttpDownloader,
    },
    mapping::MappingStore,
    pipeline::{BuildError, SpriteBuild},
    resolver::IconSource,
    spreet::DockerSpreet,
    tracing::setup_tracing,
};

/// Build the poi sprite sheets from a saved mapping
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    build: BuildDirArgs,
    #[command(flatten)]
    sprite: SpriteArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let guard = setup_tracing();

    let paths = BuildPaths::new(&cli.build.build_dir);

    tokio::select! {
        res = run(&cli.sprite, &paths) => match res {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = ?e, "build failed");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted by user");
            tracing::info!("progress is saved in {}", paths.mapping_file.display());
            // a pending stdin read would keep the runtime from shutting down
            drop(guard);
            std::process::exit(1)
        }
    }
}

async fn run(args: &SpriteArgs, paths: &BuildPaths) -> Result<(), BuildError> {
    paths.prepare(&[&args.output_dir])?;

    let store = MappingStore::new(&paths.mapping_file);
    if !store.path().exists() {
        // checked before the download so a fresh setup fails fast
        store.load_required()?;
    }

    let downloader = HttpDownloader::new(args.timeout())?;
    let root = match fontawesome::fetch(&downloader, paths).await {
        Ok(FetchOutcome::AlreadyPresent(root) | FetchOutcome::Downloaded(root)) => root,
        Err(e) => {
            tracing::warn!(error = %e, "automatic download failed");
            tracing::info!("{}", manual_placement_instructions(paths));
            if !args.no_prompt {
                wait_for_enter().await?;
            }
            svg_root_or_fallback(&paths.fa_dir)
        }
    };

    let packer = DockerSpreet::new(
        &args.docker_image,
        &paths.svg_dir,
        &args.output_dir,
        args.timeout(),
    );

    let build = SpriteBuild {
        paths,
        output_dir: &args.output_dir,
        sprite_name: &args.sprite_name,
        url_base: &args.sprite_url_base,
        catalog: Catalog::builtin(),
    };
    let summary = build.run(&store, &IconSource::new(root), &packer).await?;

    tracing::info!(
        mapped = summary.mapped,
        total = build.catalog.len(),
        staged = summary.stage.staged,
        "build finished"
    );

    match &summary.pack {
        Ok(report) if report.failed.is_empty() => {
            tracing::info!("poi sprites created");
            tracing::info!(output = ?args.output_dir, "output");
            tracing::info!(
                "sprite url for maplibre: {}/{}",
                args.sprite_url_base.trim_end_matches('/'),
                args.sprite_name
            );
        }
        Ok(report) => {
            for (name, e) in &report.failed {
                tracing::warn!(error = %e, "{name} was not built");
            }
        }
        Err(_) => tracing::warn!("no sprites were built"),
    }

    Ok(())
}

async fn wait_for_enter() -> std::io::Result<()> {
    println!("\nPress ENTER when ready...");
    let mut line = String::new();
    tokio::io::BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(())
}
