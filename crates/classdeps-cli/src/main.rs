use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use classdeps::{Manifest, ModeArg, Overrides, Report, ReportFormat};
use classdeps_core::{extract_references, Analyzer, Catalog};

#[derive(Parser)]
#[command(name = "classdeps")]
#[command(about = "Find the classes a JAR selection depends on", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split the classes reachable from the seeds into kept classes and dependencies
    Analyze {
        /// Archives to analyze, after those of the manifest
        archives: Vec<PathBuf>,

        /// Manifest file
        #[arg(short, long, env = "CLASSDEPS_MANIFEST")]
        manifest: Option<PathBuf>,

        /// Class pattern selecting seeds (`*` within a package, `**` across packages)
        #[arg(short, long = "include")]
        include: Vec<String>,

        /// Select every subclass of this class, and the class itself
        #[arg(long = "derive-from")]
        derive_from: Vec<String>,

        /// Names in this namespace become dependencies
        #[arg(long)]
        namespace: Option<String>,

        /// How the namespace pattern is matched
        #[arg(long, value_enum)]
        namespace_mode: Option<ModeArg>,

        /// Package provided by the target runtime
        #[arg(long = "runtime-package")]
        runtime_packages: Vec<String>,

        /// Archive whose classes the target runtime provides
        #[arg(long = "runtime-jar")]
        runtime_archives: Vec<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum)]
        format: Option<ReportFormat>,

        /// Print counts only
        #[arg(long)]
        summary: bool,

        /// Output file (stdout when absent)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the classes one class references
    References {
        /// Binary name of the class, e.g. com.example.Main
        class: String,

        /// Archives to search
        #[arg(required = true)]
        archives: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // RUST_LOG directives refine the flag-selected level
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.debug) // Show target module in debug mode
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            archives,
            manifest,
            include,
            derive_from,
            namespace,
            namespace_mode,
            runtime_packages,
            runtime_archives,
            format,
            summary,
            output,
        } => {
            let mut config = match manifest {
                Some(path) => Manifest::from_file(&path)?,
                None => Manifest::default(),
            };
            config.apply(Overrides {
                archives,
                include,
                derive_from,
                namespace,
                namespace_mode,
                runtime_packages,
                runtime_archives,
                format,
                summary,
                output,
            });
            analyze(config)
        }
        Commands::References { class, archives } => references(&class, &archives),
    }
}

fn analyze(manifest: Manifest) -> Result<()> {
    if manifest.analysis.archives.is_empty() {
        anyhow::bail!("No archives given; pass them as arguments or list them in the manifest");
    }

    let runtime = manifest
        .analysis
        .runtime
        .build()
        .context("Failed to load the base runtime archives")?;

    let analyzer = Analyzer::new(manifest.analysis.clone());
    let analysis = analyzer
        .analyze(&runtime)
        .context("Dependency analysis failed")?;

    info!(
        "Found {} classes to keep, {} dependencies",
        analysis.closure.kept().len(),
        analysis.closure.dependencies().len()
    );

    let report = Report::from_analysis(&analysis);
    let rendered = report.render(manifest.output.format, manifest.output.summary)?;

    match &manifest.output.path {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            info!("✓ Report written to {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn references(class: &str, archives: &[PathBuf]) -> Result<()> {
    let catalog = Catalog::load(archives).context("Failed to load archives")?;
    let record = catalog
        .get(class)
        .with_context(|| format!("Class {} not found in {} archives", class, archives.len()))?;

    let mut names = extract_references(record);
    names.sort();
    names.dedup();
    for name in names {
        let marker = if catalog.contains(&name) { "" } else { " (external)" };
        println!("{}{}", name, marker);
    }
    Ok(())
}
