use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use cmake_archive::{ExtractOptions, extract, normalize};
use cmake_binaries::{FixedArchive, InstallOptions, Installer, LocalFetcher};
use cmake_platform::Platform;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, util::SubscriberInitExt};

/// Unpack and install CMake binary distributions
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None, propagate_version = true)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract an archive into a directory
    #[command(alias = "x")]
    Extract(ExtractArg),
    /// Hoist the directory holding `bin/` to the top of a root
    Normalize(NormalizeArg),
    /// Install a CMake release into a directory
    #[command(alias = "i")]
    Install(InstallArg),
    /// Print the detected platform and its release archive or system CMake
    Platform,
}

#[derive(Debug, Args)]
struct ExtractArg {
    archive: PathBuf,
    target: PathBuf,
    /// Leave the extracted layout as it is
    #[arg(long)]
    no_normalize: bool,
}

#[derive(Debug, Args)]
struct NormalizeArg {
    root: PathBuf,
}

#[derive(Debug, Args)]
struct InstallArg {
    version: String,
    target: PathBuf,
    /// Install from this archive instead of the release URL
    #[arg(long)]
    archive: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_filter.into())
        .from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .finish()
        .try_init()?;

    match cli.command {
        Commands::Extract(arg) => run_extract(arg),
        Commands::Normalize(arg) => {
            let bin = normalize(&arg.root)
                .with_context(|| format!("failed to normalize {}", arg.root.display()))?;
            println!("{}", bin.display());
            Ok(())
        }
        Commands::Install(arg) => run_install(arg),
        Commands::Platform => {
            let platform = Platform::detect()?;
            println!("{platform}");
            match platform.download_suffix() {
                Ok(suffix) => println!("{suffix}"),
                Err(e) => {
                    println!("{e}");
                    let path = std::env::var_os("PATH").unwrap_or_default();
                    match platform.executable_on_path("cmake", &path) {
                        Ok(cmake) => println!("{}", cmake.display()),
                        Err(e) => println!("{e}"),
                    }
                }
            }
            Ok(())
        }
    }
}

fn run_extract(arg: ExtractArg) -> anyhow::Result<()> {
    let platform = Platform::detect()?;
    let options = ExtractOptions::new().supports_posix(platform.supports_posix());
    let report = extract(&arg.archive, &arg.target, &options)
        .with_context(|| format!("failed to extract {}", arg.archive.display()))?;
    for skipped in &report.skipped {
        tracing::warn!(entry = %skipped.name, kind = skipped.kind, "skipped entry");
    }
    if !arg.no_normalize {
        let bin = normalize(&arg.target)
            .with_context(|| format!("failed to normalize {}", arg.target.display()))?;
        println!("{}", bin.display());
    }
    Ok(())
}

fn run_install(arg: InstallArg) -> anyhow::Result<()> {
    let platform = Platform::detect()?;
    let options = InstallOptions::new(&arg.target, platform);
    let outcome = match arg.archive {
        Some(archive) => Installer::new(FixedArchive::new(archive), options).install(&arg.version),
        // Only local sources are fetched; a release URL fails with its scheme.
        None => Installer::new(LocalFetcher, options).install(&arg.version),
    }
    .with_context(|| format!("failed to install CMake {}", arg.version))?;
    println!("{}", outcome.bin().display());
    Ok(())
}
