//! Crucible CLI.
//!
//! Fronts the default hub: single-document compilation, batch
//! transpilation over a source tree, and registry listing.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crucible_lib::{batch, hub, TranspileRequest};

#[derive(Parser, Debug)]
#[command(name = "crucible", about = "Crucible multi-language compilation hub", version)]
struct Cli {
    /// Log level.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Transpile a single document.
    Compile {
        /// Source location: a file path or an http(s) URL.
        #[arg(short, long)]
        input: String,

        /// Output language.
        #[arg(short = 'l', long)]
        output_lang: String,

        /// Input language; derived from the location's extension when omitted.
        #[arg(long)]
        input_lang: Option<String>,

        /// Write the result here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Pretty output and diagnostic traces.
        #[arg(long)]
        debug: bool,

        /// Bypass the memo table.
        #[arg(long)]
        no_cache: bool,
    },

    /// Transpile every file under src/<output-lang>/ directories.
    Batch {
        /// Source root; each first-level subdirectory names an output language.
        #[arg(long)]
        src: PathBuf,

        /// Output root.
        #[arg(long)]
        out: PathBuf,
    },

    /// List registered transpiler pairs and interpreter languages.
    List,
}

fn init_tracing(log_level: &str) {
    let directive = log_level.parse().unwrap_or_else(|_| {
        eprintln!("invalid log level {log_level:?}, falling back to info");
        "info".parse().expect("valid log directive")
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(1)
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Compile {
            input,
            output_lang,
            input_lang,
            out,
            debug,
            no_cache,
        } => {
            let mut request = TranspileRequest::new(output_lang);
            request.location = Some(input);
            request.input_language = input_lang;
            request.debug = debug;
            request.allow_cache = !no_cache;

            let result = hub().transpile(request).await?;
            match out {
                Some(path) => std::fs::write(&path, &result.text)?,
                None => println!("{}", result.text),
            }
            Ok(())
        }

        Commands::Batch { src, out } => {
            let summary = batch::run(hub(), &src, &out).await?;
            println!("{} transpiled, {} failed", summary.succeeded, summary.failed);
            if summary.failed > 0 {
                anyhow::bail!("{} file(s) failed", summary.failed);
            }
            Ok(())
        }

        Commands::List => {
            let registry = hub().registry();
            println!("transpilers:");
            for (input, output) in registry.transpilers() {
                println!("  {input} -> {output}");
            }
            println!("interpreters:");
            for language in registry.interpreters() {
                println!("  {language}");
            }
            Ok(())
        }
    }
}
