use std::{io, path::PathBuf, process::ExitCode};

use clap::Parser;
use thiserror::Error;

use poi_sprites::{
    catalog::Catalog,
    completion::{complete_mapping, CompletionError},
    config::{BuildDirArgs, BuildPaths},
    decision::{DecisionError, DecisionProvider, FromFile, Interactive, SkipAll},
    mapping::MappingStore,
    tracing::setup_tracing,
};

/// Create or update the poi -> font awesome mapping
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    build: BuildDirArgs,

    /// Json object of poi type -> icon name to answer from instead of asking
    #[arg(long, env = "POI_DECISIONS", conflicts_with = "non_interactive")]
    decisions: Option<PathBuf>,

    /// Skip every poi type without a default instead of asking
    #[arg(long, env = "NON_INTERACTIVE")]
    non_interactive: bool,
}

#[derive(Error, Debug)]
enum MapError {
    #[error("io error")]
    Io(#[from] io::Error),
    #[error("can't read decisions file")]
    Decisions(#[from] DecisionError),
    #[error("{0}")]
    Completion(#[from] CompletionError),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let guard = setup_tracing();

    let paths = BuildPaths::new(&cli.build.build_dir);

    tokio::select! {
        res = run(&cli, &paths) => match res {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = ?e, "mapping failed");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted by user, no changes were written");
            tracing::info!("last saved mapping: {}", paths.mapping_file.display());
            // a pending stdin read would keep the runtime from shutting down
            drop(guard);
            std::process::exit(1)
        }
    }
}

async fn run(cli: &Cli, paths: &BuildPaths) -> Result<(), MapError> {
    paths.prepare(&[])?;
    tracing::info!(build_dir = ?paths.build_dir, "build directory ready");

    let mut decisions: Box<dyn DecisionProvider + Send> =
        match (&cli.decisions, cli.non_interactive) {
            (Some(path), _) => Box::new(FromFile::load(path)?),
            (None, true) => Box::new(SkipAll),
            (None, false) => Box::new(Interactive::new()),
        };

    let store = MappingStore::new(&paths.mapping_file);
    let report = complete_mapping(&store, &Catalog::builtin(), decisions.as_mut()).await?;

    tracing::info!(
        seeded = report.seeded.len(),
        decided = report.decided.len(),
        unmapped = report.unmapped.len(),
        "{}/{} poi types mapped",
        report.mapped,
        report.total
    );

    Ok(())
}
