use clap::{Parser, Subcommand};

mod cli;

use cli::compare::CompareArgs;
use cli::pipe::PipeArgs;
use cli::probe::ProbeArgs;

#[derive(Parser)]
#[command(
    name = "asm-studio",
    version,
    about = "Compare the assembly two C compilers produce, side by side"
)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a C snippet with both backends and show the results
    Compare(CompareArgs),
    /// Show the resolved toolchain and which tools are usable
    Probe(ProbeArgs),
    /// Answer JSON requests on stdin, one per line
    Pipe(PipeArgs),
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Compare(args) => cli::compare::cmd_compare(args),
        Command::Probe(args) => cli::probe::cmd_probe(args),
        Command::Pipe(args) => cli::pipe::cmd_pipe(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
