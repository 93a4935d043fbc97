//! Quire command line driver
//!
//! Thin wrapper over `quire-loader`: resolve a module (compiling it when
//! needed), batch-compile an archive directory, or run a module through an
//! external runtime.

mod commands;
mod logging;
mod runtime;
mod setup;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::setup::LoaderArgs;

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Resolve, compile and run archive-backed modules", long_about = None)]
#[command(version)]
struct Cli {
    /// Log loader decisions (same as QUIRE_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a module and print it
    Resolve {
        /// Module specifier (e.g. ".atomist/editors/Foo.js", "lodash/index.js")
        specifier: String,
        /// File the specifier is relative to
        #[arg(long)]
        base: Option<String>,
        /// Project directory used as the source archive
        #[arg(long)]
        archive: Option<PathBuf>,
        /// Print only the resolved identity
        #[arg(long)]
        identity_only: bool,
        #[command(flatten)]
        loader: LoaderArgs,
    },

    /// Compile every project source of an archive directory
    Compile {
        /// Project directory to compile
        archive: PathBuf,
        /// Directory to write the compiled archive to
        out_dir: PathBuf,
        #[command(flatten)]
        loader: LoaderArgs,
    },

    /// Load a module and execute it once in an external runtime
    Run {
        /// Module specifier
        specifier: String,
        /// File the specifier is relative to
        #[arg(long)]
        base: Option<String>,
        /// Project directory used as the source archive
        #[arg(long)]
        archive: Option<PathBuf>,
        /// Runtime command; the module text is fed on stdin (e.g. "node")
        #[arg(long)]
        runtime: String,
        #[command(flatten)]
        loader: LoaderArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Resolve {
            specifier,
            base,
            archive,
            identity_only,
            loader,
        } => commands::resolve::execute(commands::resolve::ResolveArgs {
            specifier,
            base,
            archive,
            identity_only,
            loader,
        }),

        Commands::Compile {
            archive,
            out_dir,
            loader,
        } => commands::compile::execute(commands::compile::CompileArgs {
            archive,
            out_dir,
            loader,
        }),

        Commands::Run {
            specifier,
            base,
            archive,
            runtime,
            loader,
        } => commands::run::execute(commands::run::RunArgs {
            specifier,
            base,
            archive,
            runtime,
            loader,
        }),
    }
}
