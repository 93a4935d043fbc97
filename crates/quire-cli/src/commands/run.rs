//! `quire run`: load a module and execute it once.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use quire_loader::EvaluationTracker;

use crate::runtime::CommandRuntime;
use crate::setup::LoaderArgs;

pub struct RunArgs {
    pub specifier: String,
    pub base: Option<String>,
    pub archive: Option<PathBuf>,
    pub runtime: String,
    pub loader: LoaderArgs,
}

pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let runtime = match CommandRuntime::parse(&args.runtime) {
        Some(runtime) => runtime,
        None => bail!("--runtime needs a command"),
    };
    let cache = args.loader.compile_cache(args.archive.as_deref())?;
    let tracker = EvaluationTracker::new(cache).with_runtime(Arc::new(runtime));

    if tracker
        .load_and_run(&args.specifier, args.base.as_deref())?
        .is_none()
    {
        bail!("cannot resolve {}", args.specifier);
    }
    Ok(())
}
