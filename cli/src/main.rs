mod outline;
mod test_runner;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adoc::DraftDocument;

const SUBCOMMANDS: &[&str] = &["assemble", "test", "help"];

#[derive(Parser)]
#[command(name = "adoc", version, about = "Draft document assembler")]
struct Cli {
    /// Disable colored diagnostics
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a draft document and print its outline
    Assemble(AssembleArgs),

    /// Run .test.toml fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct AssembleArgs {
    /// Draft document serialized as TOML
    file: String,

    /// Print the reference index instead of the outline
    #[arg(long, conflicts_with = "ast")]
    refs: bool,

    /// Dump the assembled document tree
    #[arg(long)]
    ast: bool,

    /// Suppress warnings
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.toml file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adoc=error".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // `adoc draft.toml` is shorthand for `adoc assemble draft.toml`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args
        .iter()
        .skip(1)
        .position(|a| !a.starts_with('-'))
        .map(|pos| pos + 1)
    {
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(pos, "assemble".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    match cli.command {
        Command::Assemble(assemble_args) => do_assemble(assemble_args, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn do_assemble(args: AssembleArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();

    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            process::exit(1);
        }
    };

    tracing::debug!(file = %args.file, bytes = source.len(), "read draft");
    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    let draft: DraftDocument = match toml::from_str(&source) {
        Ok(draft) => draft,
        Err(error) => {
            let mut diagnostic =
                Diagnostic::error().with_message(format!("invalid draft: {}", error.message()));
            if let Some(span) = error.span() {
                diagnostic = diagnostic.with_labels(vec![Label::primary(file_id, span)]);
            }
            emit(&writer, &config, &files, &diagnostic);
            process::exit(1);
        }
    };

    let assembled = match adoc::assemble(draft) {
        Ok(assembled) => assembled,
        Err(error) => {
            emit(&writer, &config, &files, &error.to_diagnostic());
            process::exit(1);
        }
    };

    if !args.quiet {
        for warning in &assembled.warnings {
            emit(&writer, &config, &files, &warning.to_diagnostic());
        }
    }

    let document = &assembled.document;
    if args.ast {
        println!("{:#?}", document);
    } else if args.refs {
        print!("{}", outline::render_references(document));
    } else {
        print!("{}", outline::render_outline(document));
    }
}

fn emit(
    writer: &StandardStream,
    config: &term::Config,
    files: &SimpleFiles<String, String>,
    diagnostic: &Diagnostic<usize>,
) {
    let _ = term::emit_to_write_style(&mut writer.lock(), config, files, diagnostic);
}
