//! `quire compile`: batch-compile a project directory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use quire_loader::ArchiveCompiler;
use tracing::warn;

use crate::setup::{load_archive, LoaderArgs};

pub struct CompileArgs {
    pub archive: PathBuf,
    pub out_dir: PathBuf,
    pub loader: LoaderArgs,
}

pub fn execute(args: CompileArgs) -> anyhow::Result<()> {
    let config = args.loader.config()?;
    let archive = load_archive(&args.archive)?;
    let compiler = ArchiveCompiler::new(
        config.clone(),
        args.loader.compiler()?,
        Arc::new(args.loader.resource_space()?),
    );

    let sources = compiler.sources(&archive);
    if sources.is_empty() {
        warn!(
            root = %config.project_root,
            "no {} sources to compile", config.source_suffix
        );
    }

    let compiled = compiler.compile(&archive)?;
    compiled
        .write_to(&args.out_dir)
        .with_context(|| format!("failed to write {}", args.out_dir.display()))?;

    println!(
        "Compiled {} file(s) into {}",
        sources.len(),
        args.out_dir.display()
    );
    Ok(())
}
