//! bidsval - Discovery, association and summary of BIDS datasets.
//!
//! Usage:
//!   bidsval summary [PATH]         Summarize a dataset
//!   bidsval files [PATH]           List dataset files and whether they are ignored
//!   bidsval inspect FILE [PATH]    Show the validation context of one file
//!   bidsval --help                 Show help

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context as _, Result, eyre};
use serde_json::json;
use tracing::debug;

use bidsval_core::{FileTree, ValidatorConfig};
use bidsval_scan::FsScanner;
use bidsval_schema::{AssociationMatch, Context};
use bidsval_summary::{SummaryConfig, SummaryOutput, summarize};

#[derive(Parser)]
#[command(
    name = "bidsval",
    version,
    about = "Discovery, association and summary core of a BIDS validator",
    long_about = "bidsval reads a BIDS dataset, applies its exclusion rules, resolves \
                  companion files for every data file and reports dataset-wide \
                  statistics."
)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every command that reads a dataset.
#[derive(Args)]
struct DatasetArgs {
    /// Dataset root
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Extra exclusion pattern, gitignore syntax (repeatable)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Follow symbolic links while walking the dataset
    #[arg(short = 'L', long)]
    follow_symlinks: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a dataset
    Summary {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Report the exact number of files instead of the legacy count
        #[arg(long)]
        exact_file_count: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List dataset files in traversal order
    Files {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Include ignored files
        #[arg(short, long)]
        all: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the validation context of one file
    Inspect {
        /// Dataset relative path of the file (e.g. /sub-01/anat/sub-01_T1w.nii.gz)
        file: String,

        #[command(flatten)]
        dataset: DatasetArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Command::Summary {
            dataset,
            exact_file_count,
            format,
        } => {
            run_summary(&dataset, exact_file_count, format)?;
        }
        Command::Files {
            dataset,
            all,
            format,
        } => {
            run_files(&dataset, all, format)?;
        }
        Command::Inspect {
            dataset,
            file,
            format,
        } => {
            run_inspect(&dataset, &file, format)?;
        }
    }

    Ok(())
}

fn setup_logging(verbose: u8) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info,ignore=warn,globset=warn"),
            2 => tracing_subscriber::EnvFilter::new("debug,ignore=warn,globset=warn"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Scan the dataset described by the shared arguments.
fn scan(dataset: &DatasetArgs) -> Result<FileTree> {
    let config = ValidatorConfig::builder()
        .root(dataset.path.as_path())
        .follow_symlinks(dataset.follow_symlinks)
        .ignore_patterns(dataset.ignore.clone())
        .build()
        .context("Invalid configuration")?;
    debug!(?config, "validator config");

    eprintln!("Scanning {}...", dataset.path.display());

    let tree = FsScanner::new().scan(&config).context("Scan failed")?;
    Ok(tree)
}

/// Summarize a dataset.
fn run_summary(dataset: &DatasetArgs, exact_file_count: bool, format: OutputFormat) -> Result<()> {
    let tree = scan(dataset)?;
    let config = SummaryConfig::builder()
        .legacy_file_count(!exact_file_count)
        .build()
        .context("Invalid summary configuration")?;

    let output = summarize(&tree, &config).context("Summary failed")?;

    match format {
        OutputFormat::Text => print_summary(&dataset.path, &output, config.format_version()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
    }

    Ok(())
}

fn print_summary(path: &Path, output: &SummaryOutput, format_version: u32) {
    println!();
    println!("{}", "─".repeat(60));
    println!(" {} - {}", path.display(), format_size(output.size));
    println!(
        " {} files, {} subjects, {} sessions",
        output.total_files,
        output.subjects.len(),
        output.sessions.len()
    );
    println!(" Summary format v{format_version}");
    println!("{}", "─".repeat(60));
    println!();

    print_list("Subjects", &output.subjects);
    print_list("Sessions", &output.sessions);
    print_list("Tasks", &output.tasks);
    print_list("Datatypes", &output.datatypes);
    print_list("Modalities", &output.modalities);
    print_list("Secondary modalities", &output.secondary_modalities);

    if !output.subject_metadata.is_empty() {
        println!(" Participants:");
        for subject in &output.subject_metadata {
            let age = subject
                .age
                .as_ref()
                .map_or_else(|| "n/a".to_string(), ToString::to_string);
            println!(
                "   {:<12} age {:<6} {:<4} {}",
                subject.participant_id,
                age,
                subject.sex.as_deref().unwrap_or(""),
                subject.group.as_deref().unwrap_or("")
            );
        }
        println!();
    }
}

fn print_list(label: &str, values: &[String]) {
    if values.is_empty() {
        println!(" {label}: none");
    } else {
        println!(" {label}: {}", values.join(", "));
    }
}

/// List dataset files.
fn run_files(dataset: &DatasetArgs, all: bool, format: OutputFormat) -> Result<()> {
    let tree = scan(dataset)?;

    let mut listed = Vec::new();
    for file in tree.files() {
        if !all && file.ignored() {
            continue;
        }
        let size = file
            .size()
            .with_context(|| format!("Could not read size of {}", file.path()))?;
        listed.push((file, size));
    }

    match format {
        OutputFormat::Text => {
            for (file, size) in &listed {
                let marker = if file.ignored() { "I" } else { " " };
                println!("{marker} {:>10}  {}", format_size(*size), file.path());
            }
            eprintln!(
                "{} of {} files listed, {} directories",
                listed.len(),
                tree.file_count(),
                tree.dir_count()
            );
        }
        OutputFormat::Json => {
            let entries: Vec<_> = listed
                .iter()
                .map(|(file, size)| {
                    json!({
                        "path": file.path(),
                        "size": size,
                        "ignored": file.ignored(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}

/// Show the context of one file.
fn run_inspect(dataset: &DatasetArgs, path: &str, format: OutputFormat) -> Result<()> {
    let tree = scan(dataset)?;
    let path = format!("/{}", path.trim_start_matches('/'));
    let file = tree
        .find_file(&path)
        .ok_or_else(|| eyre!("{path} is not part of the dataset"))?;

    let context = Context::build(&tree, file).context("Could not build context")?;

    match format {
        OutputFormat::Text => print_context(&context),
        OutputFormat::Json => {
            let value = json!({
                "path": context.path(),
                "ignored": file.ignored(),
                "entities": context.entities,
                "datatype": context.datatype,
                "modality": context.modality,
                "associations": context.associations,
                "sidecar": context.sidecar,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

fn print_context(context: &Context<'_>) {
    println!();
    println!(" {}", context.path());
    if context.file.ignored() {
        println!(" (ignored)");
    }
    println!("{}", "─".repeat(60));

    for (key, value) in &context.entities.entities {
        println!("   {key:<12} {value}");
    }
    println!("   {:<12} {}", "suffix", context.suffix());
    println!("   {:<12} {}", "extension", context.extension());
    println!(
        "   {:<12} {}",
        "datatype",
        context.datatype.map_or_else(|| "-".to_string(), |d| d.to_string())
    );
    println!(
        "   {:<12} {}",
        "modality",
        context.modality.map_or("-", |m| m.display_name())
    );
    println!();

    if context.associations.is_empty() {
        println!(" No associated files.");
    } else {
        println!(" Associations:");
        for (kind, found) in context.associations.iter() {
            match found {
                AssociationMatch::Resolved(payload) => {
                    println!("   {:<12} {}", kind.as_ref(), payload.path());
                }
                AssociationMatch::Ambiguous { candidates } => {
                    println!("   {:<12} ambiguous:", kind.as_ref());
                    for candidate in candidates {
                        println!("     {candidate}");
                    }
                }
            }
        }
    }
    println!();

    if !context.sidecar.is_empty() {
        println!(" Sidecar metadata:");
        for (key, value) in &context.sidecar {
            println!("   {key:<24} {value}");
        }
        println!();
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
