//! The spanq command-line driver.
//!
//! - `spanqc gen <file>` - Print the unit synthesized for a script
//! - `spanqc run <file>` - Synthesize, then evaluate and print the bindings
//! - `spanqc check <file>` - Report calls still unresolved after synthesis
//!
//! Options shared by every subcommand:
//! - `--config` - Settings file (default: `spanq.toml` next to the script)
//! - `--unit-name`, `--max-rounds` - Override generator settings
//! - `--json` - Output as JSON (diagnostics one object per line)
//! - `--no-color` - Disable colorized diagnostics
//!
//! Logging goes to stderr, filtered by `SPANQ_LOG` (default `warn`).

mod config;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use spanq_gen::GeneratorConfig;
use spanq_host::{prepare, Diagnostic, HostProgram, Prepared};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::FileConfig;

#[derive(Parser)]
#[command(name = "spanqc", version, about = "Query operators over borrowed views, on demand")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the unit synthesized for a script
    Gen(CommonArgs),
    /// Synthesize, evaluate, and print every binding
    Run(CommonArgs),
    /// Report calls that stay unresolved after synthesis
    Check(CommonArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Path to the script
    file: PathBuf,

    /// Settings file; defaults to spanq.toml beside the script, if present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name of the generated unit
    #[arg(long = "unit-name")]
    unit_name: Option<String>,

    /// Stop after this many resolution rounds
    #[arg(long = "max-rounds")]
    max_rounds: Option<usize>,

    /// Output as JSON instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Disable colorized output
    #[arg(long = "no-color")]
    no_color: bool,
}

/// How diagnostics are written.
#[derive(Debug, Clone, Copy)]
struct DiagnosticOptions {
    color: bool,
    json: bool,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let (args, result) = match &cli.command {
        Commands::Gen(args) => (args, gen_unit(args)),
        Commands::Run(args) => (args, run_script(args)),
        Commands::Check(args) => (args, check_script(args)),
    };
    if let Err(e) = result {
        if args.json {
            let msg = serde_json::json!({
                "code": "C0001",
                "message": e,
            });
            eprintln!("{}", msg);
        } else {
            eprintln!("error: {}", e);
        }
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SPANQ_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Settings from the config file, then from flags.
fn load_config(args: &CommonArgs) -> Result<GeneratorConfig, String> {
    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => args
            .file
            .parent()
            .map(|dir| dir.join("spanq.toml"))
            .filter(|p| p.is_file()),
    };
    let mut config = match &path {
        Some(path) => {
            debug!(target: "spanq::cli", path = %path.display(), "loading config");
            FileConfig::from_file(path)?.into_generator_config()
        }
        None => GeneratorConfig::default(),
    };
    if let Some(name) = &args.unit_name {
        config.unit_name = name.clone();
    }
    if args.max_rounds.is_some() {
        config.max_rounds = args.max_rounds;
    }
    Ok(config)
}

fn read_source(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path.display(), e))
}

fn diag_options(args: &CommonArgs) -> DiagnosticOptions {
    DiagnosticOptions {
        color: !args.no_color && !args.json,
        json: args.json,
    }
}

/// Read, generate and install. Parse errors stop here.
fn load(args: &CommonArgs) -> Result<(String, Prepared), String> {
    let config = load_config(args)?;
    let source = read_source(&args.file)?;
    let prepared = prepare(&source, &config);
    let parse_errors: Vec<Diagnostic> = prepared
        .program
        .parse_errors()
        .iter()
        .map(Diagnostic::from_parse)
        .collect();
    if !parse_errors.is_empty() {
        report(&source, &parse_errors, diag_options(args));
        return Err("Parsing failed due to errors above.".to_string());
    }
    Ok((source, prepared))
}

fn gen_unit(args: &CommonArgs) -> Result<(), String> {
    let (_, prepared) = load(args)?;
    let Some(generated) = prepared.generated else {
        return Ok(());
    };
    if args.json {
        let out = serde_json::json!({
            "unit": generated.unit.name(),
            "stats": generated.stats,
            "text": generated.text,
        });
        println!("{}", out);
    } else {
        print!("{}", generated.text);
    }
    Ok(())
}

fn run_script(args: &CommonArgs) -> Result<(), String> {
    let (source, prepared) = load(args)?;
    let program = prepared.program;
    if report_host_errors(&source, &program, diag_options(args)) {
        return Err("Resolution failed due to errors above.".to_string());
    }

    let outcome = match program.evaluate() {
        Ok(outcome) => outcome,
        Err(err) => {
            report(&source, &[Diagnostic::from_runtime(&err)], diag_options(args));
            return Err("Evaluation failed.".to_string());
        }
    };

    if args.json {
        let bindings: serde_json::Map<String, serde_json::Value> = outcome
            .bindings
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string().into()))
            .collect();
        let out = serde_json::json!({
            "bindings": bindings,
            "result": outcome.result.as_ref().map(|v| v.to_string()),
        });
        println!("{}", out);
    } else {
        for (name, value) in &outcome.bindings {
            match program.binding_type(name) {
                Some(ty) => println!("{}: {} = {}", name, ty, value),
                None => println!("{} = {}", name, value),
            }
        }
        if let Some(result) = &outcome.result {
            println!("=> {}", result);
        }
    }
    Ok(())
}

fn check_script(args: &CommonArgs) -> Result<(), String> {
    let (source, prepared) = load(args)?;
    if report_host_errors(&source, &prepared.program, diag_options(args)) {
        return Err(format!(
            "{} unresolved after synthesis.",
            prepared.program.errors().len()
        ));
    }
    if !args.json {
        println!("ok");
    }
    Ok(())
}

/// Report static errors. Returns true if there were any.
fn report_host_errors(source: &str, program: &HostProgram, opts: DiagnosticOptions) -> bool {
    let diagnostics: Vec<Diagnostic> = program.errors().iter().map(Diagnostic::from_host).collect();
    report(source, &diagnostics, opts);
    !diagnostics.is_empty()
}

fn report(source: &str, diagnostics: &[Diagnostic], opts: DiagnosticOptions) {
    for diag in diagnostics {
        if opts.json {
            eprintln!("{}", diag.to_json());
        } else {
            eprint!("{}", diag.render(source, opts.color));
        }
    }
}
