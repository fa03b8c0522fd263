pub mod compare;
pub mod pipe;
pub mod probe;

use std::path::PathBuf;
use std::process;

use asm_studio::StudioConfig;
use clap::Args;

/// Configuration flags shared by every subcommand.
#[derive(Args)]
pub struct ConfigArgs {
    /// Config file (default: nearest asm-studio.json, else built-in defaults)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Compiler that emits assembly text (backend A)
    #[arg(long, value_name = "PATH")]
    pub backend_a: Option<PathBuf>,
    /// Compiler that emits object code (backend B)
    #[arg(long, value_name = "PATH")]
    pub backend_b: Option<PathBuf>,
    /// Preferred disassembler
    #[arg(long, value_name = "PATH")]
    pub disassembler: Option<PathBuf>,
    /// Wall-clock limit per tool invocation, in milliseconds
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,
    /// Bytes kept from each tool output stream
    #[arg(long, value_name = "BYTES", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_output_bytes: Option<u64>,
    /// Directory for per-request workspaces
    #[arg(long, value_name = "DIR")]
    pub workspace_root: Option<PathBuf>,
    /// Run the backends one after the other
    #[arg(long)]
    pub sequential: bool,
}

/// Resolve the effective configuration: file (explicit or discovered),
/// then command-line overrides.
pub fn resolve_config(args: &ConfigArgs) -> StudioConfig {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let path = args.config.clone().or_else(|| StudioConfig::find(&cwd));
    let mut config = match path {
        Some(path) => {
            log::info!("using config {}", path.display());
            StudioConfig::load(&path).unwrap_or_else(|e| {
                eprintln!("error: {}", e);
                process::exit(1);
            })
        }
        None => StudioConfig::default(),
    };

    if let Some(ref p) = args.backend_a {
        config.backend_a_path = p.clone();
    }
    if let Some(ref p) = args.backend_b {
        config.backend_b_path = p.clone();
    }
    if let Some(ref p) = args.disassembler {
        config.disassembler_path = p.clone();
    }
    if let Some(ms) = args.timeout_ms {
        config.time_limit_ms = ms;
    }
    if let Some(bytes) = args.max_output_bytes {
        config.max_output_bytes = usize::try_from(bytes).unwrap_or(usize::MAX);
    }
    if let Some(ref dir) = args.workspace_root {
        config.workspace_root = dir.clone();
    }
    if args.sequential {
        config.concurrent = false;
    }

    config.anchor(&cwd);
    config
}
