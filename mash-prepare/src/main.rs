// Copyright 2026 The Mash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Prepare
//!
//! Compiles the shaders and writes `assets.h` before the editor itself is built.
//!
//! ## Usage
//!
//! Run it from the source directory.  With an `assets.toml` there, that manifest drives the run.
//! Without one, the vertex and fragment shaders are compiled with `glslc` and embedded.
//!
//! (Try --help)

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use mash_assets::manifest::MANIFEST_NAME;
use mash_assets::{AssetError, Manifest};

#[derive(Parser, Debug)]
#[command(name = "mash-prepare")]
#[command(about = "Compile shaders and embed assets into a C header.", long_about = None)]
struct Args {
    /// Asset manifest.  Defaults to ./assets.toml, or the built-in shader table if that is absent.
    #[arg(long, short, global = true)]
    manifest: Option<PathBuf>,

    /// Write the header here instead of where the manifest says.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Skip recompiling shaders that have not changed since the last run.
    #[arg(long)]
    incremental: bool,

    /// Shader compiler program to run.
    #[arg(long)]
    compiler: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the asset table and list the symbols it would declare
    Check,
}

#[derive(Debug, thiserror::Error)]
enum PrepareError {
    #[error(transparent)]
    Asset(#[from] AssetError),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,mash_assets=info,mash_prepare=info"),
    )
    .init();

    let args = Args::parse();

    let result = match args.command {
        Some(Command::Check) => cmd_check(&args),
        None => cmd_run(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_manifest(args: &Args) -> Result<Manifest, PrepareError> {
    let mut manifest = match &args.manifest {
        Some(path) => Manifest::load(path)?,
        None if Path::new(MANIFEST_NAME).is_file() => Manifest::load(Path::new(MANIFEST_NAME))?,
        None => {
            log::info!("no {MANIFEST_NAME}, using the built-in shader table");
            Manifest::builtin(Path::new("."))
        }
    };

    if let Some(output) = &args.output {
        manifest.output = output.clone();
    }
    if let Some(program) = &args.compiler {
        manifest.compiler.program = program.clone();
    }
    manifest.incremental |= args.incremental;

    Ok(manifest)
}

fn cmd_run(args: &Args) -> Result<(), PrepareError> {
    let manifest = load_manifest(args)?;
    // Compiler output is shown as-is the moment it arrives, even when the compile went fine.
    let report = manifest
        .pipeline()
        .on_diagnostics(|_, diagnostics| {
            let text = diagnostics.as_str();
            if text.ends_with('\n') {
                eprint!("{text}");
            } else {
                eprintln!("{text}");
            }
        })
        .run(&manifest.table, &manifest.output)?;

    log::info!(
        "{} assets, {} shaders compiled, {} up to date",
        report.symbols.len(),
        report.compiled,
        report.skipped
    );
    Ok(())
}

fn cmd_check(args: &Args) -> Result<(), PrepareError> {
    let manifest = load_manifest(args)?;
    manifest.table.check_sources()?;

    for descriptor in &manifest.table {
        println!(
            "{}\t{}",
            descriptor.symbol()?,
            descriptor.embedded().display()
        );
    }
    println!("-> {}", manifest.output.display());
    Ok(())
}
