//! Tessera Compiler CLI

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tessera_ir::{SourceId, TreeBuilder};
use tesserac::{
    build, compile, dump_tree, init_tracing, launch, load_program, make_module_source,
    BuildOptions, CompileError, SconsToolchain, SerializedTreeBuilder,
};

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let command = &args[1];

    match command.as_str() {
        "build" => {
            if args.len() < 3 {
                print_build_usage();
                return ExitCode::FAILURE;
            }
            match parse_build_args(&args[2..]) {
                Ok(invocation) => run_build(&invocation),
                Err(message) => {
                    eprintln!("error: {message}");
                    print_build_usage();
                    ExitCode::FAILURE
                }
            }
        }
        "source" => {
            if args.len() < 3 {
                eprintln!("Usage: tesserac source <module.tree>");
                return ExitCode::FAILURE;
            }
            run_source(Path::new(&args[2]))
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("Tessera Compiler {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            ExitCode::FAILURE
        }
    }
}

/// A parsed `build` command line.
#[derive(Debug)]
struct BuildInvocation {
    entry: PathBuf,
    tree_path: Vec<PathBuf>,
    options: BuildOptions,
    dump_tree: bool,
    run: bool,
    program_args: Vec<OsString>,
}

fn parse_build_args(args: &[String]) -> Result<BuildInvocation, String> {
    let mut entry = None;
    let mut tree_path = Vec::new();
    let mut options = BuildOptions::default();
    let mut dump_tree = false;
    let mut run = false;
    let mut program_args = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--" => {
                program_args.extend(args[i + 1..].iter().map(OsString::from));
                break;
            }
            "-o" => {
                let dir = args.get(i + 1).ok_or("-o needs a directory")?;
                options = options.with_output_dir(dir);
                i += 1;
            }
            "--module" => options = options.with_module_mode(true),
            "--debug" => options = options.with_debug(true),
            "--optimize" => options = options.with_optimize(true),
            "--lto" => options = options.with_lto(true),
            "--runtime-debug" => options = options.with_runtime_debug(true),
            "--show-scons" => options = options.with_show_command(true),
            "--quiet" | "-q" => options = options.with_quiet(true),
            "--dump-tree" => dump_tree = true,
            "--run" => run = true,
            _ => {
                if let Some(version) = arg.strip_prefix("--runtime=") {
                    options = options.with_runtime_version(version);
                } else if let Some(jobs) = arg.strip_prefix("--jobs=") {
                    let jobs = jobs
                        .parse()
                        .map_err(|_| format!("invalid job count `{jobs}`"))?;
                    options = options.with_jobs(jobs);
                } else if let Some(dir) = arg.strip_prefix("--tree-path=") {
                    tree_path.push(PathBuf::from(dir));
                } else if arg.starts_with('-') {
                    return Err(format!("unknown option `{arg}`"));
                } else if entry.is_none() {
                    entry = Some(PathBuf::from(arg));
                } else {
                    return Err(format!("unexpected argument `{arg}`"));
                }
            }
        }
        i += 1;
    }

    let entry = entry.ok_or("missing entry tree")?;
    let source = SourceId::new(&entry);
    let mut options = options;
    options.entry_name = source.module_name().as_str().to_string();

    Ok(BuildInvocation {
        entry,
        tree_path,
        options,
        dump_tree,
        run,
        program_args,
    })
}

/// The entry's own directory is searched first, then `--tree-path`
/// directories in order.
fn tree_builder(entry: &Path, extra: &[PathBuf]) -> SerializedTreeBuilder {
    let mut search_path = Vec::with_capacity(extra.len() + 1);
    let parent = entry.parent().filter(|p| !p.as_os_str().is_empty());
    search_path.push(parent.map_or_else(|| PathBuf::from("."), Path::to_path_buf));
    search_path.extend(extra.iter().cloned());
    SerializedTreeBuilder::new(search_path)
}

fn run_build(invocation: &BuildInvocation) -> ExitCode {
    let entry = SourceId::new(&invocation.entry);
    let mut builder = tree_builder(&invocation.entry, &invocation.tree_path);

    if invocation.dump_tree {
        return report(dump_entry(&entry, &mut builder, &invocation.options));
    }

    let result = compile(&entry, &mut builder, &invocation.options).and_then(|sources| {
        let toolchain = SconsToolchain::from_env()?.configured(&invocation.options);
        build(&sources, &invocation.options, &toolchain)
    });
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => return report(Err(err)),
    };

    if !invocation.run {
        if !invocation.options.quiet {
            println!("Built {}", outcome.artifact.display());
        }
        return ExitCode::SUCCESS;
    }

    match launch(&outcome, &invocation.program_args) {
        Ok(status) => status
            .code()
            .and_then(|code| u8::try_from(code).ok())
            .map_or(ExitCode::FAILURE, ExitCode::from),
        Err(err) => report(Err(err.into())),
    }
}

fn dump_entry(
    entry: &SourceId,
    builder: &mut dyn TreeBuilder,
    options: &BuildOptions,
) -> Result<(), CompileError> {
    let modules = load_program(entry, builder, options)?;
    if let Some(record) = modules.entry() {
        print!("{}", dump_tree(&record.tree));
    }
    Ok(())
}

fn run_source(path: &Path) -> ExitCode {
    let source = SourceId::new(path);
    let mut builder = tree_builder(path, &[]);
    let result = builder
        .build(&source, false)
        .map_err(|err| CompileError::from(tessera_opt::DiscoveryError::from(err)))
        .and_then(|tree| {
            make_module_source(
                tree,
                &source.module_name(),
                &BuildOptions::default().optimizer,
            )
        });
    match result {
        Ok(code) => {
            print!("{code}");
            ExitCode::SUCCESS
        }
        Err(err) => report(Err(err)),
    }
}

fn report(result: Result<(), CompileError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error[{}]: {err}", err.phase());
            ExitCode::FAILURE
        }
    }
}

fn print_build_usage() {
    eprintln!("Usage: tesserac build <entry.tree> [options] [-- program args]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --module            Build an extension module instead of a program");
    eprintln!("  --debug             Build with debug checks");
    eprintln!("  --optimize          Enable C++ optimizations");
    eprintln!("  --lto               Enable link-time optimization");
    eprintln!("  --runtime=<ver>     Target runtime version (default: 3.12)");
    eprintln!("  --runtime-debug     Link against a debug runtime");
    eprintln!("  --jobs=<n>          Parallel native build jobs");
    eprintln!("  -o <dir>            Output directory (default: .)");
    eprintln!("  --tree-path=<dir>   Extra directory to search for imported trees");
    eprintln!("  --show-scons        Print the native build command");
    eprintln!("  -q, --quiet         Quiet native build");
    eprintln!("  --dump-tree         Print the optimized entry tree and stop");
    eprintln!("  --run               Launch the result after building");
}

fn print_usage() {
    println!("Tessera Compiler");
    println!();
    println!("Usage: tesserac <command> [options]");
    println!();
    println!("Commands:");
    println!("  build <entry.tree>   Compile a program or module to a native artifact");
    println!("  source <file.tree>   Print the C++ translation of one module");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Set {} to the directory holding the native build scripts.", tesserac::SCONS_DIR_VAR);
    println!("Set RUST_LOG (e.g. RUST_LOG=tesserac=debug) for pipeline logs.");
}
