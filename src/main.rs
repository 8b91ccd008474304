// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 noct-ml

//! Command-line interface for echoforge.
//!
//! This binary provides the `echoforge` command for converting saved chat
//! pages from HTML to Markdown or JSON Lines.

use echoforge::OutputDocument;
use echoforge::config::{ConfigError, ConversionConfig, Theme};
use lexopt::prelude::*;
use snafu::{OptionExt, ensure, prelude::*};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Line count at which pretty output collapses code blocks by default.
const DEFAULT_COLLAPSE_LINES: usize = 14;

/// Title of pretty output when none is given.
const DEFAULT_TITLE: &str = "Chat Transcript";

/// Where to write the rendered output.
#[derive(Clone)]
enum OutputTarget {
    /// Write to the given file, or into the given directory in batch mode.
    Path(PathBuf),
    /// Write to stdout.
    Stdout,
}

#[allow(clippy::struct_excessive_bools)]
struct Cli {
    input: PathBuf,
    output: OutputTarget,
    config: ConversionConfig,
    quiet: bool,
    verbose: bool,
    dry_run: bool,
    force: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("{source}"))]
    InvalidConfig { source: ConfigError },

    #[snafu(display("cannot convert a directory to stdout; give an output directory"))]
    DirectoryToStdout,

    #[snafu(display("no .html or .htm files found in {}", path.display()))]
    NoInputFiles { path: PathBuf },

    #[snafu(display("failed to create output directory: {source}"))]
    CreateOutputDir { source: std::io::Error },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to convert {}: {source}", path.display()))]
    ConvertFile {
        path: PathBuf,
        source: echoforge::Error,
    },

    #[snafu(display("invalid input filename: no file stem"))]
    InvalidFilename,

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn print_help() {
    println!(
        "\
{name} {version}
Convert saved chat web pages to Markdown or JSON Lines

Usage: {name} [OPTIONS] <INPUT> <OUTPUT>

Arguments:
  <INPUT>   Saved chat page (.html), or a directory of pages
  <OUTPUT>  Output file (directory when INPUT is a directory, - for stdout)

Output format:
      --jsonl               Write one JSON record per turn instead of Markdown
      --by-speaker          Label turns with speaker names
      --user-label <NAME>   Display name for your turns (default: User)
      --no-markdown         Do not turn plain-text code headers into code blocks

Markdown layout:
      --pretty-md           Headings, table of contents and themes
      --max-width <N>       Wrap prose at N columns (default: no wrapping)
      --toc-depth <N>       Table of contents depth, 0 for none (default: 0)
      --no-toc              Alias for --toc-depth 0
      --title <TEXT>        Document title (pretty mode, default: {title})
      --theme <THEME>       light, dark, auto or obsidian (default: light)
      --obsidian-links      Rewrite anchor links as Obsidian wikilinks
      --collapse-code <N>   Collapse code blocks of N+ lines, 0 to disable
                            (pretty mode, default: {collapse})
      --no-signature        Omit the generator signature

Other options:
  -q, --quiet               Only report warnings and errors
  -v, --verbose             Report conversion details
  -n, --dry-run             Show what would be processed without writing
  -f, --force               Overwrite existing output files
  -h, --help                Print help
  -V, --version             Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        collapse = DEFAULT_COLLAPSE_LINES,
        title = DEFAULT_TITLE,
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    // Show help if no arguments provided
    if std::env::args().len() == 1 {
        print_help();
        std::process::exit(0);
    }

    let mut input: Option<PathBuf> = None;
    let mut output: Option<OutputTarget> = None;
    let mut config = ConversionConfig::default();
    let mut collapse_code: Option<usize> = None;
    let mut quiet = false;
    let mut verbose = false;
    let mut dry_run = false;
    let mut force = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Long("jsonl") => config.jsonl = true,
            Long("by-speaker") => config.by_speaker = true,
            Long("user-label") => config.user_label = parser.value()?.string()?,
            Long("no-markdown") => config.detect_plain_code = false,
            Long("pretty-md") => config.pretty_markdown = true,
            Long("max-width") => config.max_width = Some(parser.value()?.parse()?),
            Long("toc-depth") => config.toc_depth = parser.value()?.parse()?,
            Long("no-toc") => config.toc_depth = 0,
            Long("title") => config.title = Some(parser.value()?.string()?),
            Long("theme") => config.theme = parser.value()?.parse::<Theme>()?,
            Long("obsidian-links") => config.obsidian_links = true,
            Long("collapse-code") => collapse_code = Some(parser.value()?.parse()?),
            Long("no-signature") => config.include_signature = false,
            Short('q') | Long("quiet") => quiet = true,
            Short('v') | Long("verbose") => verbose = true,
            Short('n') | Long("dry-run") => dry_run = true,
            Short('f') | Long("force") => force = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) if input.is_none() => input = Some(val.into()),
            Value(val) if output.is_none() => {
                let val = PathBuf::from(val);
                output = Some(if val == Path::new("-") {
                    OutputTarget::Stdout
                } else {
                    OutputTarget::Path(val)
                });
            }
            _ => return Err(arg.unexpected()),
        }
    }

    // 0 turns collapsing off; pretty output collapses by default
    config.collapse_code_after = match collapse_code {
        Some(0) => None,
        Some(lines) => Some(lines),
        None => config.pretty_markdown.then_some(DEFAULT_COLLAPSE_LINES),
    };
    if config.pretty_markdown && config.title.is_none() {
        config.title = Some(DEFAULT_TITLE.to_owned());
    }

    Ok(Cli {
        input: input.ok_or("missing required argument: <INPUT>")?,
        output: output.ok_or("missing required argument: <OUTPUT>")?,
        config,
        quiet,
        verbose,
        dry_run,
        force,
    })
}

/// Sends progress and diagnostics to stderr. `RUST_LOG` overrides the level.
fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,echoforge={level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .compact()
        .try_init();
}

fn main() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;
    init_tracing(&cli);

    // Reject bad options before touching any file
    cli.config.validate().context(InvalidConfigSnafu)?;

    if cli.input.is_dir() {
        let OutputTarget::Path(out_dir) = &cli.output else {
            return DirectoryToStdoutSnafu.fail();
        };
        let files = collect_input_files(&cli.input);
        ensure!(!files.is_empty(), NoInputFilesSnafu { path: &cli.input });

        if !cli.dry_run {
            std::fs::create_dir_all(out_dir).context(CreateOutputDirSnafu)?;
        }
        for file in &files {
            let out_path = batch_output_path(file, out_dir, &cli.config)?;
            process_file(file, &OutputTarget::Path(out_path), &cli)?;
        }
    } else {
        process_file(&cli.input, &cli.output, &cli)?;
    }

    Ok(())
}

/// Collects all saved pages under a directory, in file name order.
fn collect_input_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path().extension().is_some_and(|ext| {
                ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm")
            })
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Names the output of one page converted in batch mode.
fn batch_output_path(
    input: &Path,
    out_dir: &Path,
    config: &ConversionConfig,
) -> Result<PathBuf, Error> {
    let stem = input.file_stem().context(InvalidFilenameSnafu)?;
    let extension = if config.jsonl { "jsonl" } else { "md" };
    Ok(out_dir.join(format!("{}.{extension}", stem.to_string_lossy())))
}

/// Returns the options for one output.
///
/// Plain transcripts carry the signature only when they are written as
/// Markdown, so `.txt` transcripts stay free of Markdown decoration.
fn output_config(config: &ConversionConfig, target: &OutputTarget) -> ConversionConfig {
    let markdown_target = match target {
        OutputTarget::Stdout => true,
        OutputTarget::Path(path) => path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md")),
    };

    let mut config = config.clone();
    if !config.pretty_markdown && !markdown_target {
        config.include_signature = false;
    }
    config
}

/// Converts one page and writes it to the target.
fn process_file(input: &Path, target: &OutputTarget, cli: &Cli) -> Result<(), Error> {
    match target {
        OutputTarget::Path(path) => {
            // Handle dry-run mode
            if cli.dry_run {
                tracing::info!("Would write {}", path.display());
                return Ok(());
            }

            // Check if output exists and handle overwrite
            if path.exists() && !cli.force {
                tracing::warn!(
                    "Skipping {} (already exists, use --force to overwrite)",
                    path.display()
                );
                return Ok(());
            }
        }
        OutputTarget::Stdout => {
            if cli.dry_run {
                tracing::info!("Would output {}", input.display());
                return Ok(());
            }
        }
    }

    let bytes = std::fs::read(input).context(ReadFileSnafu { path: input })?;
    let html = String::from_utf8_lossy(&bytes);

    let config = output_config(&cli.config, target);
    let text = echoforge::convert(&html, &config)
        .and_then(OutputDocument::into_string)
        .context(ConvertFileSnafu { path: input })?;

    match target {
        OutputTarget::Stdout => print!("{text}"),
        OutputTarget::Path(path) => {
            // Create parent directory if needed
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).context(CreateOutputDirSnafu)?;
            }
            std::fs::write(path, &text).context(WriteFileSnafu { path })?;
            tracing::info!("Wrote {}", path.display());
        }
    }
    Ok(())
}
