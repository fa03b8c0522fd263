use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use asm_studio::{BackendResult, Comparator, CompilationRequest, OptLevel};
use clap::Args;

use super::{resolve_config, ConfigArgs};

#[derive(Args)]
pub struct CompareArgs {
    /// C source file, or `-` for standard input
    pub input: PathBuf,
    /// Optimization level for backend A (-O0, -O1, -O2, -O3, -Os)
    #[arg(long, default_value = "-O2", allow_hyphen_values = true)]
    pub opt: OptLevel,
    /// Print the JSON response instead of two panels
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn cmd_compare(args: CompareArgs) {
    let source = read_source(&args.input);
    let config = resolve_config(&args.config);
    let comparator = Comparator::new(&config);

    let request = CompilationRequest::new(source, args.opt);
    let result = comparator.compare(&request);

    if args.json {
        println!("{}", result.to_json());
        return;
    }

    let (label_a, label_b) = comparator.labels();
    print_panel(
        &format!("{} ({}, {})", label_a, args.opt, args.opt.describe()),
        &result.backend_a,
    );
    println!();
    print_panel(&format!("{} (default options)", label_b), &result.backend_b);
}

fn read_source(input: &Path) -> String {
    if input.as_os_str() == "-" {
        let mut source = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut source) {
            eprintln!("error: cannot read standard input: {}", e);
            process::exit(1);
        }
        return source;
    }
    std::fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("error: cannot read '{}': {}", input.display(), e);
        process::exit(1);
    })
}

fn print_panel(title: &str, result: &BackendResult) {
    println!("── {} ──", title);
    if result.success {
        println!("{}", result.output.trim_end());
    } else {
        println!("error: {}", result.output.trim_end());
    }
}
