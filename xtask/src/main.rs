use std::{fs, path::PathBuf};

use anyhow::{bail, Result};
use clap::{Args, Parser};
use strum::IntoEnumIterator;
use xtask::{
    cargo::{self, CargoArgsBuilder},
    Package,
    SelectionArgs,
};

// ----------------------------------------------------------------------------
// Command-line Interface

#[derive(Debug, Parser)]
enum Cli {
    /// Resolve every combination of build options and report the rejected
    /// ones.
    Check(CheckArgs),
    /// Print the default environment of a configuration.
    Env(EnvArgs),
    /// Print the flash partition tables of a configuration.
    Partitions(SelectionArgs),
    /// Write a markdown summary of a configuration.
    Summary(SummaryArgs),
    /// Build the board crate with the given configuration.
    BuildBoard(SelectionArgs),
    /// Run the tests of the specified packages.
    RunTests(RunTestsArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    /// List every rejected selection instead of counting them.
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct EnvArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    /// Print the NUL separated environment image as escaped bytes.
    #[arg(long)]
    image: bool,
}

#[derive(Debug, Args)]
struct SummaryArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    /// File to write the summary to, stdout if omitted.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RunTestsArgs {
    /// Package(s) to test.
    #[arg(value_enum, default_values_t = Package::iter())]
    packages: Vec<Package>,
}

// ----------------------------------------------------------------------------
// Application

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_module("xtask", log::LevelFilter::Info)
        .init();

    let workspace = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(workspace) = workspace.parent() else {
        bail!("xtask must live inside the workspace");
    };
    let workspace = workspace.canonicalize()?;

    match Cli::parse() {
        Cli::Check(args) => check(args),
        Cli::Env(args) => env(args),
        Cli::Partitions(args) => partitions(args),
        Cli::Summary(args) => summary(args),
        Cli::BuildBoard(args) => build_board(&workspace, args),
        Cli::RunTests(args) => run_tests(&workspace, args),
    }
}

// ----------------------------------------------------------------------------
// Subcommands

fn check(args: CheckArgs) -> Result<()> {
    let config = args.selection.config();
    let (accepted, rejected) = xtask::check_selections(config);

    log::info!(
        "{}: {} selections accepted, {} rejected",
        config.name(),
        accepted.len(),
        rejected.len()
    );

    if args.verbose {
        for (selection, reason) in &rejected {
            log::info!("{selection:?}: {reason}");
        }
    }

    // The selection asked for on the command line has to be valid.
    args.selection.resolve()?;

    Ok(())
}

fn env(args: EnvArgs) -> Result<()> {
    let board = args.selection.resolve()?;
    let env = board.default_environment();

    if args.image {
        println!("{}", env.to_bytes().escape_ascii());
    } else {
        print!("{env}");
    }

    Ok(())
}

fn partitions(args: SelectionArgs) -> Result<()> {
    let board = args.resolve()?;
    let report = xtask::partition_report(&board)?;

    if report.is_empty() {
        log::warn!("No flash devices are enabled");
    }
    print!("{report}");

    Ok(())
}

fn summary(args: SummaryArgs) -> Result<()> {
    let board = args.selection.resolve()?;

    let mut summary = String::new();
    board_metadata::generate_board_summary(&board, &mut summary)?;

    match args.output {
        Some(path) => {
            fs::write(&path, summary)?;
            log::info!("Summary written to {}", path.display());
        }
        None => print!("{summary}"),
    }

    Ok(())
}

fn build_board(workspace: &std::path::Path, args: SelectionArgs) -> Result<()> {
    // Reject invalid selections before handing them to the build script.
    let selection = args.selection();
    args.config().resolve(&selection)?;

    log::info!("Building {} with {selection:?}", args.board);

    let cargo_args = CargoArgsBuilder::default()
        .subcommand("build")
        .package(Package::Vip1970.to_string())
        .build();

    cargo::run(&cargo_args, &xtask::selection_env(args.board, &selection), workspace)
}

fn run_tests(workspace: &std::path::Path, args: RunTestsArgs) -> Result<()> {
    for package in args.packages {
        log::info!("Testing {package}");

        let cargo_args = CargoArgsBuilder::default()
            .subcommand("test")
            .package(package.to_string())
            .build();

        cargo::run(&cargo_args, &[], workspace)?;
    }

    Ok(())
}
