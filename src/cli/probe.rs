use std::path::Path;

use asm_studio::config::toolchain::tool_available;
use asm_studio::Toolchain;
use clap::Args;

use super::{resolve_config, ConfigArgs};

#[derive(Args)]
pub struct ProbeArgs {
    /// Print the effective configuration as JSON (usable as asm-studio.json)
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn cmd_probe(args: ProbeArgs) {
    let config = resolve_config(&args.config);

    if args.json {
        match serde_json::to_string_pretty(&config) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let toolchain = Toolchain::detect(&config);
    let label_a = format!("backend A ({})", config.backend_a_label);
    let label_b = format!("backend B ({})", config.backend_b_label);
    print_tool(&label_a, &toolchain.backend_a);
    print_tool(&label_b, &toolchain.backend_b);
    print_tool("disassembler", &config.disassembler_path);
    if toolchain.disassembler != config.disassembler_path {
        print_tool("  fallback", &toolchain.disassembler);
    }
    println!("{:<20} {}", "workspace root", toolchain.workspace_root.display());
    println!("{:<20} {:?}", "time limit", toolchain.limits.time);
    println!("{:<20} {} bytes", "output cap", toolchain.limits.output_bytes);
    println!(
        "{:<20} {}",
        "mode",
        if config.concurrent {
            "concurrent"
        } else {
            "sequential"
        }
    );
}

fn print_tool(label: &str, program: &Path) {
    let status = if tool_available(program) {
        "ok"
    } else {
        "unavailable"
    };
    println!("{:<20} {} [{}]", label, program.display(), status);
}
