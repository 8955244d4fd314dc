use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::metadata::LevelFilter;
use tracing_subscriber::{EnvFilter, prelude::*};
use wa2html::cli::Args;
use wa2html_document::ATTRIBUTION_URL;

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::builder().with_default_directive(level.into()).from_env_lossy())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false));
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {err}");
    }

    if args.about {
        println!("Visit {ATTRIBUTION_URL}");
        return ExitCode::SUCCESS;
    }

    match wa2html::run(&args, Path::new(".")) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:?}");
            ExitCode::FAILURE
        },
    }
}
