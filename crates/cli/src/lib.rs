use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dtview_annotated::{AnnotatedDocument, ParserConfig, ProvenanceEntry};
use dtview_include_tree::IncludeResolver;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

pub mod config;
pub mod render;
pub mod source;

use config::{config_path, DtvConfig};
use render::Renderer;

#[derive(Parser)]
#[command(name = "dtview")]
#[command(about = "Browse annotated devicetree output by node and source file", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ./dtv.toml, then the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the folded node tree of an annotated file
    Tree(TreeArgs),

    /// Print every line with its origin and inclusion lineage
    Lines(LinesArgs),

    /// Print the include tree of a source file
    Includes(IncludesArgs),

    /// Print the original source text a line came from
    Source(LineArgs),

    /// Print the editor command for a line's origin, one argument per line
    Editor(LineArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
struct TreeArgs {
    /// Annotated file (`-` reads stdin)
    annotated: PathBuf,

    /// Output JSON
    #[arg(long)]
    json: bool,

    /// Colour lines by source file
    #[arg(long)]
    color: bool,
}

#[derive(Args)]
struct LinesArgs {
    /// Annotated file (`-` reads stdin)
    annotated: PathBuf,

    /// Output JSON
    #[arg(long)]
    json: bool,

    /// Colour rows by source file
    #[arg(long)]
    color: bool,
}

#[derive(Args)]
struct IncludesArgs {
    /// Top-level source file
    root: PathBuf,

    /// Extra include directory, searched before the configured ones
    #[arg(short = 'I', long = "include-dir")]
    include_dirs: Vec<PathBuf>,

    /// Output JSON
    #[arg(long)]
    json: bool,

    /// Colour files by identity
    #[arg(long)]
    color: bool,
}

#[derive(Args)]
struct LineArgs {
    /// Annotated file (`-` reads stdin)
    annotated: PathBuf,

    /// Line number in the annotated file
    #[arg(short, long)]
    line: usize,
}

#[derive(Args)]
struct ConfigArgs {
    /// Write the default configuration to the config file
    #[arg(long)]
    reset: bool,
}

pub fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON parsing
    let json_output = match &cli.command {
        Commands::Tree(args) => args.json,
        Commands::Lines(args) => args.json,
        Commands::Includes(args) => args.json,
        _ => false,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config_file = config_path(cli.config.as_deref());

    match cli.command {
        Commands::Tree(args) => run_tree(args)?,
        Commands::Lines(args) => run_lines(args)?,
        Commands::Includes(args) => run_includes(args, &config_file)?,
        Commands::Source(args) => run_source(args)?,
        Commands::Editor(args) => run_editor(args, &config_file)?,
        Commands::Config(args) => run_config(args, &config_file)?,
    }

    Ok(())
}

fn load_document(path: &Path) -> Result<AnnotatedDocument> {
    let config = ParserConfig::default();
    let document = if path == Path::new("-") {
        AnnotatedDocument::from_reader(io::stdin().lock(), &config)
            .context("Failed to read annotated text from stdin")?
    } else {
        let file = File::open(path)
            .with_context(|| format!("Failed to open annotated file {}", path.display()))?;
        AnnotatedDocument::from_reader(BufReader::new(file), &config)
            .with_context(|| format!("Failed to read annotated file {}", path.display()))?
    };

    for diagnostic in document.diagnostics() {
        log::warn!("{diagnostic}");
    }
    Ok(document)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct TreeOutput<'a> {
    forest: &'a [dtview_annotated::TreeChild],
    unmatched_open: usize,
    unmatched_close: usize,
    diagnostics: &'a [dtview_annotated::Diagnostic],
}

fn run_tree(args: TreeArgs) -> Result<()> {
    let document = load_document(&args.annotated)?;
    if args.json {
        let fold = document.fold_outcome();
        return print_json(&TreeOutput {
            forest: &fold.forest,
            unmatched_open: fold.unmatched_open,
            unmatched_close: fold.unmatched_close,
            diagnostics: document.diagnostics(),
        });
    }
    print!("{}", Renderer::new(args.color).forest(document.forest()));
    Ok(())
}

#[derive(Serialize)]
struct LinesOutput<'a> {
    rows: &'a [dtview_annotated::DisplayRow],
    physical_lines: usize,
    skipped_lines: usize,
}

fn run_lines(args: LinesArgs) -> Result<()> {
    let document = load_document(&args.annotated)?;
    if args.json {
        return print_json(&LinesOutput {
            rows: document.rows(),
            physical_lines: document.physical_lines(),
            skipped_lines: document.skipped_lines(),
        });
    }
    print!("{}", Renderer::new(args.color).rows(document.rows()));
    Ok(())
}

fn run_includes(args: IncludesArgs, config_file: &Path) -> Result<()> {
    if !args.root.is_file() {
        bail!("Source file not found: {}", args.root.display());
    }
    let config = DtvConfig::load(config_file)?;

    // Own directory first, then -I dirs, then configured stubs
    let mut search_dirs = config.include_dirs(&args.root);
    let after_own_dir = search_dirs.len().min(1);
    search_dirs.splice(after_own_dir..after_own_dir, args.include_dirs);
    log::debug!("Include search dirs: {search_dirs:?}");

    let tree = IncludeResolver::new(search_dirs).resolve(&args.root);
    for diagnostic in &tree.diagnostics {
        log::warn!("{diagnostic}");
    }

    if args.json {
        return print_json(&tree);
    }
    print!("{}", Renderer::new(args.color).include_tree(&tree.root));
    Ok(())
}

fn line_origin(document: &AnnotatedDocument, line: usize) -> Result<ProvenanceEntry> {
    let record = document
        .record(line)
        .with_context(|| format!("Line {line} has no content"))?;
    record
        .origin()
        .cloned()
        .with_context(|| format!("Line {line} has no source file"))
}

fn run_source(args: LineArgs) -> Result<()> {
    let document = load_document(&args.annotated)?;
    let origin = line_origin(&document, args.line)?;
    let lines = source::read_source_lines(
        Path::new(&origin.resolved_path),
        origin.start_line,
        origin.end_line,
    )?;
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn run_editor(args: LineArgs, config_file: &Path) -> Result<()> {
    let config = DtvConfig::load(config_file)?;
    let document = load_document(&args.annotated)?;
    let origin = line_origin(&document, args.line)?;
    for arg in source::expand_editor_command(
        &config.editor_cmd,
        &origin.resolved_path,
        origin.start_line,
    ) {
        println!("{arg}");
    }
    Ok(())
}

fn run_config(args: ConfigArgs, config_file: &Path) -> Result<()> {
    let config = if args.reset {
        let defaults = DtvConfig::default();
        defaults.save(config_file)?;
        log::info!("Wrote default config to {}", config_file.display());
        defaults
    } else {
        DtvConfig::load(config_file)?
    };
    println!("# {}", config_file.display());
    print!("{}", config.to_toml()?);
    Ok(())
}
