mod config;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use miette::{Context, IntoDiagnostic, Result, miette};
use nebula_editor_core::{
    DocumentStore, FileStore, FindReplace, MarkdownDocument, find_matches, line_col,
};
use nebula_renderer::{RenderedBlock, Renderer, SpecParseError};

use crate::config::Config;

#[derive(Parser)]
#[command(version, about = "Nebula - markdown with live charts, gauges and terminals", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a .toml or .json config file
    #[arg(long, global = true, env = "NEBULA_CONFIG")]
    config: Option<PathBuf>,

    /// More logging on stderr (repeat for debug and trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a document to HTML
    Render {
        /// Markdown file, `-` for stdin, or omit for the saved document
        input: Option<PathBuf>,

        /// Write HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit only the body fragment, without page chrome and styles
        #[arg(long)]
        fragment: bool,

        /// Page title
        #[arg(long)]
        title: Option<String>,
    },
    /// Describe every fenced block as JSON
    Blocks { input: Option<PathBuf> },
    /// Print line:column of every case-insensitive match
    Find {
        /// Markdown file, or `-` for stdin
        input: PathBuf,
        query: String,
    },
    /// Replace literal, case-insensitive matches
    Replace {
        /// Markdown file, or `-` for stdin
        input: PathBuf,
        query: String,
        replacement: String,

        /// Replace every match
        #[arg(long, conflicts_with = "index")]
        all: bool,

        /// Replace only this match (0-based)
        #[arg(long)]
        index: Option<usize>,

        /// Write the result back instead of printing it
        #[arg(long)]
        in_place: bool,
    },
    /// Character and word counts
    Stats { input: Option<PathBuf> },
}

fn main() -> Result<()> {
    init_miette();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            input,
            output,
            fragment,
            title,
        } => {
            let source = Source::new(input, &config);
            let text = source.read()?;
            let renderer = Renderer::new(config.theme.clone(), config.render);
            let doc = if fragment {
                renderer.render(&text)
            } else {
                let title = title.unwrap_or_else(|| source.title());
                renderer.render_page(&title, &text)?
            };
            report_failures(doc.failures);
            write_output(output.as_deref(), &doc.html)?;
        }
        Commands::Blocks { input } => {
            let text = Source::new(input, &config).read()?;
            let renderer = Renderer::new(config.theme.clone(), config.render);
            let blocks = renderer.blocks(&text);
            println!("{}", serde_json::to_string_pretty(&blocks).into_diagnostic()?);
            report_failures(blocks.into_iter().filter_map(|block| match block.rendered {
                RenderedBlock::Failed(failure) => Some(failure.error),
                _ => None,
            }));
        }
        Commands::Find { input, query } => {
            let text = Source::new(Some(input), &config).read()?;
            let matches = find_matches(&text, &query);
            tracing::info!(count = matches.len(), "search finished");
            for found in matches {
                let (line, column) = line_col(&text, found.start);
                println!("{line}:{column}");
            }
        }
        Commands::Replace {
            input,
            query,
            replacement,
            all,
            index,
            in_place,
        } => {
            let source = Source::new(Some(input), &config);
            let mut doc = MarkdownDocument::new(source.read()?);
            let count = replace(&mut doc, &query, &replacement, all, index);
            if in_place {
                source.write(doc.text())?;
            } else {
                print!("{}", doc.text());
            }
            eprintln!("replaced {count} occurrence(s)");
        }
        Commands::Stats { input } => {
            let text = Source::new(input, &config).read()?;
            let stats = MarkdownDocument::new(text).stats();
            println!("characters: {}", stats.chars);
            println!("words: {}", stats.words);
        }
    }

    Ok(())
}

fn replace(
    doc: &mut MarkdownDocument,
    query: &str,
    replacement: &str,
    all: bool,
    index: Option<usize>,
) -> usize {
    let mut search = FindReplace::new();
    search.open(doc);
    search.set_query(query, doc);
    if all {
        return search.replace_all(doc, replacement);
    }
    let index = index.unwrap_or(0);
    if search.set_current(index).is_none() {
        tracing::warn!(index, found = search.matches().len(), "no such match, nothing replaced");
        return 0;
    }
    usize::from(search.replace_current(doc, replacement))
}

/// Where the document text comes from, and where `--in-place` writes it.
enum Source {
    File(PathBuf),
    Stdin,
    Store(FileStore),
}

impl Source {
    fn new(input: Option<PathBuf>, config: &Config) -> Self {
        match input {
            Some(path) if path.as_os_str() == "-" => Source::Stdin,
            Some(path) => Source::File(path),
            None => match config.store.document_path() {
                Some(path) => Source::Store(FileStore::new(path)),
                None => Source::Stdin,
            },
        }
    }

    fn read(&self) -> Result<String> {
        match self {
            Source::File(path) => std::fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading {}", path.display())),
            Source::Stdin => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text).into_diagnostic()?;
                Ok(text)
            }
            Source::Store(store) => Ok(store.load()?),
        }
    }

    fn write(&self, text: &str) -> Result<()> {
        match self {
            Source::File(path) => std::fs::write(path, text).into_diagnostic(),
            Source::Stdin => Err(miette!("--in-place needs an input file")),
            Source::Store(store) => Ok(store.save(text)?),
        }
    }

    fn title(&self) -> String {
        match self {
            Source::File(path) => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Nebula".to_string()),
            Source::Stdin | Source::Store(_) => "Nebula".to_string(),
        }
    }
}

fn write_output(output: Option<&Path>, html: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, html).into_diagnostic()?;
            tracing::info!(path = %path.display(), "wrote html");
            Ok(())
        }
        None => {
            print!("{html}");
            Ok(())
        }
    }
}

/// Failed blocks never abort output; they are shown as warnings.
fn report_failures(failures: impl IntoIterator<Item = SpecParseError>) {
    for failure in failures {
        eprintln!("{:?}", miette::Report::new(failure));
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn init_miette() {
    let installed = miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .context_lines(2)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }));
    if installed.is_ok() {
        miette::set_panic_hook();
    }
}
