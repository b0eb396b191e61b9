use clap::{Args, Parser, Subcommand};
use lpp_model::ProblemModel;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lpp")]
#[command(about = "Parse linear programs into matrix form and convert them to their dual", long_about = None)]
struct Cli {
    /// Log pipeline details to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a problem description and write its matrix form
    Parse {
        /// The problem file to parse
        file: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Load a model previously written with --json
    Load {
        /// The JSON file to load
        file: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check a problem description for errors
    Check {
        /// The problem file to check
        file: PathBuf,
        /// Print the summary as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Convert the problem from primal to dual form
    #[arg(short, long)]
    dual: bool,
    /// Write the model in JSON format
    #[arg(short, long)]
    json: bool,
    /// Output file name (default: "(LP-2) <input>", plus ".json" with --json)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print to stdout instead of writing a file
    #[arg(short, long)]
    print: bool,
}

#[derive(serde::Serialize)]
struct CheckReport<'a> {
    file: String,
    variables: &'a [String],
    constraints: usize,
    diagnostics: &'a [lpp_lang::Diagnostic],
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_with(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {}", message);
    std::process::exit(1);
}

fn read_source(file: &Path) -> String {
    match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => exit_with(format_args!("reading {}: {}", file.display(), e)),
    }
}

fn parse_file(file: &Path) -> lpp_lang::CompiledProblem {
    let source = read_source(file);
    match lpp_lang::parse(&source) {
        Ok(compiled) => compiled,
        Err(e) => exit_with(format_args!("{}: {}", file.display(), e)),
    }
}

fn load_file(file: &Path) -> ProblemModel {
    let source = read_source(file);
    let model: ProblemModel = match serde_json::from_str(&source) {
        Ok(m) => m,
        Err(e) => exit_with(format_args!("{}: {}", file.display(), e)),
    };
    if let Err(e) = model.validate() {
        exit_with(format_args!("{}: {}", file.display(), e));
    }
    model
}

/// "(LP-2) <name>" next to the input file
fn default_output(input: &Path, json: bool) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("(LP-2) {}", name);
    if json {
        name.push_str(".json");
    }
    input.with_file_name(name)
}

fn emit(model: ProblemModel, input: &Path, args: &OutputArgs) {
    let model = if args.dual { model.dual() } else { model };
    if let Err(e) = model.validate() {
        exit_with(format_args!("{}: {}", input.display(), e));
    }

    let content = if args.json {
        match serde_json::to_string_pretty(&model) {
            Ok(s) => s,
            Err(e) => exit_with(e),
        }
    } else {
        model.to_string()
    };

    if args.print {
        println!("{}", content);
        return;
    }

    if !args.json {
        eprintln!("WARNING! This output is not meant for parsing, it's unreliable.");
        eprintln!("Use --json for JSON format instead.");
    }

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(input, args.json));
    if let Err(e) = std::fs::write(&path, content) {
        exit_with(format_args!("writing {}: {}", path.display(), e));
    }
    eprintln!("Wrote {}", path.display());
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse { file, output } => {
            let compiled = parse_file(&file);
            emit(compiled.model, &file, &output);
        }
        Commands::Load { file, output } => {
            let model = load_file(&file);
            emit(model, &file, &output);
        }
        Commands::Check { file, json } => {
            let compiled = parse_file(&file);
            if json {
                let report = CheckReport {
                    file: file.display().to_string(),
                    variables: compiled.variables.names(),
                    constraints: compiled.model.num_constraints(),
                    diagnostics: &compiled.diagnostics,
                };
                match serde_json::to_string_pretty(&report) {
                    Ok(s) => println!("{}", s),
                    Err(e) => exit_with(e),
                }
                return;
            }

            println!("✓ {} is valid", file.display());
            println!(
                "  {} variables: {}",
                compiled.variables.len(),
                compiled.variables.names().join(", ")
            );
            println!("  {} constraints", compiled.model.num_constraints());
            for diagnostic in &compiled.diagnostics {
                println!("  warning: {}", diagnostic);
            }
        }
    }
}
