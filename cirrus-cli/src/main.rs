mod stacks;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::info;

use cirrus_core::builder::TemplateBuilder;
use cirrus_core::document::Document;
use cirrus_core::validator::ValidatorConfig;

use stacks::Stack;

#[derive(Parser)]
#[command(name = "cirrus")]
#[command(about = "Build infrastructure template documents", long_about = None)]
struct Cli {
    /// Log more (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bundled stacks
    List,
    /// Validate a stack and write its template document
    Build {
        /// Stack name (see `cirrus list`)
        stack: String,

        /// Output path (defaults to <stack>.json)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Treat reference cycles as errors
        #[arg(long)]
        strict_cycles: bool,

        /// Write the document without indentation
        #[arg(long)]
        compact: bool,
    },
    /// Validate a stack and report every problem
    Validate {
        /// Stack name
        stack: String,

        /// Treat reference cycles as errors
        #[arg(long)]
        strict_cycles: bool,
    },
    /// Show the dependency order of a stack
    Graph {
        /// Stack name
        stack: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::List => run_list(),
        Commands::Build {
            stack,
            output,
            strict_cycles,
            compact,
        } => run_build(&stack, output, ValidatorConfig { strict_cycles }, compact),
        Commands::Validate {
            stack,
            strict_cycles,
        } => run_validate(&stack, ValidatorConfig { strict_cycles }),
        Commands::Graph { stack } => run_graph(&stack),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn find_stack(name: &str) -> Result<Stack> {
    match stacks::find(name) {
        Some(stack) => Ok(stack),
        None => {
            let known: Vec<&str> = stacks::all().iter().map(|s| s.name).collect();
            bail!("Unknown stack '{}', expected one of: {}", name, known.join(", "))
        }
    }
}

/// Declare and validate a stack, printing every validation error
fn validated_builder(stack: &Stack, config: ValidatorConfig) -> Result<TemplateBuilder> {
    let mut builder = stack
        .builder(config)
        .with_context(|| format!("Failed to declare stack '{}'", stack.name))?;

    if let Err(errors) = builder.validate() {
        for error in &errors {
            eprintln!("  {} {}", "✗".red(), error);
        }
        bail!(
            "{} validation error(s) in stack '{}'",
            errors.len(),
            stack.name
        );
    }
    Ok(builder)
}

fn print_warnings(document: &Document) {
    for warning in document.warnings() {
        eprintln!("  {} {}", "!".yellow().bold(), warning);
    }
}

fn run_list() -> Result<()> {
    for stack in stacks::all() {
        println!("  {} {}", format!("{:<12}", stack.name).bold(), stack.summary);
    }
    Ok(())
}

/// Build a stack's document
fn build_document(name: &str, config: ValidatorConfig) -> Result<Document> {
    let stack = find_stack(name)?;
    let mut builder = validated_builder(&stack, config)?;
    let document = builder.serialize()?;
    Ok(document)
}

fn write_document(document: &Document, path: &Path, compact: bool) -> Result<()> {
    let json = if compact {
        document.to_json_compact()?
    } else {
        document.to_json()?
    };
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}

fn run_build(
    name: &str,
    output: Option<PathBuf>,
    config: ValidatorConfig,
    compact: bool,
) -> Result<()> {
    let document = build_document(name, config)?;
    print_warnings(&document);

    let path = output.unwrap_or_else(|| PathBuf::from(format!("{}.json", name)));
    write_document(&document, &path, compact)?;

    println!(
        "{}",
        format!(
            "✓ {} resources written to {}",
            document.resources().len(),
            path.display()
        )
        .green()
        .bold()
    );
    Ok(())
}

fn run_validate(name: &str, config: ValidatorConfig) -> Result<()> {
    let stack = find_stack(name)?;
    println!("{}", "Validating...".cyan());

    let builder = validated_builder(&stack, config)?;
    let graph = builder.graph();
    println!(
        "{}",
        format!(
            "✓ {} resources validated successfully.",
            graph.resource_count()
        )
        .green()
        .bold()
    );
    for resource in graph.resources() {
        println!("  • {} {}", resource.logical_name, resource.kind.dimmed());
    }
    Ok(())
}

fn run_graph(name: &str) -> Result<()> {
    let stack = find_stack(name)?;
    let builder = validated_builder(&stack, ValidatorConfig::default())?;
    let Some(order) = builder.order() else {
        bail!("Stack '{}' has no dependency order", name);
    };

    for (rank, node) in order.order().iter().enumerate() {
        let deps: Vec<&str> = order.dependencies_of(node).collect();
        if deps.is_empty() {
            println!("{:>3}. {}", rank + 1, node.bold());
        } else {
            println!(
                "{:>3}. {} {} {}",
                rank + 1,
                node.bold(),
                "<-".dimmed(),
                deps.join(", ")
            );
        }
    }
    for warning in order.warnings() {
        println!("  {} {}", "!".yellow().bold(), warning);
    }
    Ok(())
}
