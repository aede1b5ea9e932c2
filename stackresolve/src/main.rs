mod trace;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use stackresolve_symbols::{match_module_with_pdb_file, resolve_stack_frame_symbols, PdbProvider};

use trace::TraceAnnotator;

#[derive(Debug, Parser)]
#[command(
    name = "stackresolve",
    version,
    about = r#"
stackresolve maps module-relative addresses to function, source file and line
using PDB files, and checks that a PDB file belongs to a module build.

EXAMPLES:
    # Resolve one address:
    stackresolve resolve x64.pdb 0x10E5

    # Check a PDB against its module (exit status 0 = match, 1 = mismatch):
    stackresolve match x64.efi x64.pdb

    # Annotate a dumped stack trace:
    stackresolve trace --pdb-dir build/pdbs crash.txt
"#
)]
struct Opt {
    /// Log debug output. RUST_LOG overrides the default level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Resolve one RVA against a PDB file.
    Resolve(ResolveArgs),

    /// Check whether a PDB file matches a module.
    Match(MatchArgs),

    /// Annotate the frames of a stack trace.
    Trace(TraceArgs),
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Path to the PDB file
    pdb: PathBuf,

    /// Module-relative address, in hex
    #[arg(value_parser = parse_rva)]
    rva: u32,
}

#[derive(Debug, Args)]
struct MatchArgs {
    /// Path to the module (.efi, .dll or .exe)
    module: PathBuf,

    /// Path to the PDB file
    pdb: PathBuf,
}

#[derive(Debug, Args)]
struct TraceArgs {
    /// Directory with a <module>.pdb for every module in the trace
    #[arg(long)]
    pdb_dir: PathBuf,

    /// Directory with the modules. When given, each module is checked against its PDB
    /// before its frames are resolved.
    #[arg(long)]
    module_dir: Option<PathBuf>,

    /// The stack trace. Read from stdin if omitted.
    file: Option<PathBuf>,
}

fn parse_rva(s: &str) -> Result<u32, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid hex RVA {s:?}: {e}"))
}

fn init_logging(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() -> anyhow::Result<ExitCode> {
    let opt = Opt::parse();
    init_logging(opt.verbose);

    let provider = PdbProvider::new();
    match opt.action {
        Action::Resolve(args) => {
            let report = resolve_stack_frame_symbols(&provider, &args.pdb, args.rva);
            if !report.is_success() {
                eprintln!("{}", report.diagnostic);
                return Ok(ExitCode::FAILURE);
            }
            println!("{}+0x{:X}", report.function_name, report.displacement);
            println!("    {} @ {}", report.file_name, report.line_number);
            Ok(ExitCode::SUCCESS)
        }
        Action::Match(args) => {
            let report = match_module_with_pdb_file(&provider, &args.module, &args.pdb);
            if !report.is_success() {
                eprintln!("{}", report.diagnostic);
                return Ok(ExitCode::from(2));
            }
            if report.is_matched {
                println!("{} matches {}", args.pdb.display(), args.module.display());
                Ok(ExitCode::SUCCESS)
            } else {
                println!(
                    "{} does not match {}",
                    args.pdb.display(),
                    args.module.display()
                );
                Ok(ExitCode::from(1))
            }
        }
        Action::Trace(args) => {
            let mut annotator = TraceAnnotator::new(&provider, args.pdb_dir, args.module_dir);
            let stdout = io::stdout().lock();
            match &args.file {
                Some(path) => {
                    let file = File::open(path).map_err(|e| {
                        anyhow::anyhow!("Could not open trace file {}: {e}", path.display())
                    })?;
                    annotator.annotate(BufReader::new(file), stdout)?;
                }
                None => annotator.annotate(io::stdin().lock(), stdout)?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
