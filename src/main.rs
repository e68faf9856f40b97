// SPDX-License-Identifier: GPL-3.0-only

//! Command-line interface for ds2md.
//!
//! This binary provides the `ds2md` command for converting DeepSeek chat
//! exports from JSON to Markdown format. Run with no arguments it reads
//! `conversations.json` from the working directory and writes one document
//! per conversation into `chats/`.

use ds2md::{parser, renderer};
use lexopt::prelude::*;
use snafu::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Input read when no paths are given on the command line.
const DEFAULT_INPUT: &str = "conversations.json";

/// Directory written when `--output` is not given.
const DEFAULT_OUTPUT: &str = "chats";

struct Cli {
    input: Vec<PathBuf>,
    output: PathBuf,
    show_timestamps: bool,
    heading_offset: u8,
    quiet: bool,
    dry_run: bool,
    force: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to parse {}: {source}", path.display()))]
    ParseFile {
        path: PathBuf,
        source: parser::ParseError,
    },

    #[snafu(display("failed to create output directory: {source}"))]
    CreateOutputDir { source: std::io::Error },

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
Convert DeepSeek chat exports to Markdown

Usage: {name} [OPTIONS] [INPUT]...

Arguments:
  [INPUT]...  Input JSON files or directories containing exports
              (default: {input})

Options:
  -o, --output <DIR>        Output directory (default: {output})
      --heading-offset <N>  Shift heading levels by N (0-5, default: 0)
      --show-timestamps     Include per-message timestamps (default: on)
      --hide-timestamps     Hide per-message timestamps

Other options:
  -q, --quiet               Suppress progress messages
  -n, --dry-run             Show what would be written without writing
  -f, --force               Overwrite existing output files
  -h, --help                Print help
  -V, --version             Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        input = DEFAULT_INPUT,
        output = DEFAULT_OUTPUT,
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    let mut input = Vec::new();
    let mut output: Option<PathBuf> = None;
    let mut show_timestamps = true;
    let mut heading_offset: u8 = 0;
    let mut quiet = false;
    let mut dry_run = false;
    let mut force = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('o') | Long("output") => output = Some(parser.value()?.parse()?),
            Long("show-timestamps") => show_timestamps = true,
            Long("hide-timestamps") => show_timestamps = false,
            Long("heading-offset") => {
                let val: u8 = parser
                    .value()?
                    .parse()
                    .map_err(|_| "heading-offset must be a number 0-5")?;
                if val > 5 {
                    return Err("heading-offset must be 0-5".into());
                }
                heading_offset = val;
            }
            Short('q') | Long("quiet") => quiet = true,
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
            Value(val) => input.push(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    if input.is_empty() {
        input.push(PathBuf::from(DEFAULT_INPUT));
    }

    Ok(Cli {
        input,
        output: output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
        show_timestamps,
        heading_offset,
        quiet,
        dry_run,
        force,
    })
}

fn main() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;

    let files = collect_input_files(&cli.input);

    // Parse everything up front so a missing or malformed archive halts
    // the run before any output exists.
    let mut conversations = Vec::new();
    for path in &files {
        let json = std::fs::read_to_string(path).context(ReadFileSnafu { path })?;
        let archive = parser::parse_archive(&json).context(ParseFileSnafu { path })?;
        conversations.extend(archive);
    }

    if !cli.dry_run {
        std::fs::create_dir_all(&cli.output).context(CreateOutputDirSnafu)?;
    }

    let opts = make_render_options(&cli);
    let mut written = 0usize;
    for (i, conversation) in conversations.iter().enumerate() {
        if write_conversation(conversation, i + 1, &opts, &cli)? {
            written += 1;
        }
    }

    if !cli.quiet && !cli.dry_run {
        eprintln!(
            "Done. {written} conversation(s) written to {}",
            cli.output.display()
        );
    }

    Ok(())
}

/// Collects all JSON files from the given inputs (files and directories).
fn collect_input_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            {
                files.push(entry.path().to_path_buf());
            }
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Creates render options from CLI arguments.
#[allow(clippy::missing_const_for_fn)]
fn make_render_options(cli: &Cli) -> renderer::RenderOptions {
    renderer::RenderOptions {
        show_timestamps: cli.show_timestamps,
        heading_offset: cli.heading_offset,
    }
}

/// Derives the output filename for a conversation.
///
/// Titled conversations use their sanitized title; untitled ones fall back
/// to `chat_<index>` with the 1-based position in the run.
fn output_path(conversation: &parser::Conversation, index: usize, out_dir: &Path) -> PathBuf {
    let stem = conversation
        .title
        .as_deref()
        .map_or_else(|| format!("chat_{index}"), renderer::sanitize_title);
    out_dir.join(format!("{stem}.md"))
}

/// Renders one conversation and writes it to the output directory.
///
/// Returns `true` if a file was written.
fn write_conversation(
    conversation: &parser::Conversation,
    index: usize,
    opts: &renderer::RenderOptions,
    cli: &Cli,
) -> Result<bool, Error> {
    let out_path = output_path(conversation, index, &cli.output);

    if cli.dry_run {
        eprintln!("Would write {}", out_path.display());
        return Ok(false);
    }

    if out_path.exists() && !cli.force {
        eprintln!(
            "Skipping {} (already exists, use --force to overwrite)",
            out_path.display()
        );
        return Ok(false);
    }

    let markdown = renderer::render_conversation(conversation, opts);
    std::fs::write(&out_path, &markdown).context(WriteFileSnafu { path: &out_path })?;

    if !cli.quiet {
        eprintln!("Wrote {}", out_path.display());
    }
    Ok(true)
}
