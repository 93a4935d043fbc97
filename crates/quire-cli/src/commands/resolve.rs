//! `quire resolve`: find a module, compiling it if only its source exists.

use std::path::PathBuf;

use anyhow::bail;

use crate::setup::LoaderArgs;

pub struct ResolveArgs {
    pub specifier: String,
    pub base: Option<String>,
    pub archive: Option<PathBuf>,
    pub identity_only: bool,
    pub loader: LoaderArgs,
}

pub fn execute(args: ResolveArgs) -> anyhow::Result<()> {
    let cache = args.loader.compile_cache(args.archive.as_deref())?;

    let artifact = match cache.resolve_executable(&args.specifier, args.base.as_deref())? {
        Some(artifact) => artifact,
        None => bail!("cannot resolve {}", args.specifier),
    };

    println!("{}", artifact.uri());
    if !args.identity_only {
        print!("{}", artifact.contents());
        if !artifact.contents().ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
