use std::io::{BufRead, Write};
use std::process;

use asm_studio::{Comparator, ComparisonResult, StudioError, WireRequest};
use clap::Args;

use super::{resolve_config, ConfigArgs};

#[derive(Args)]
pub struct PipeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Serve line-delimited JSON: one request per stdin line, one response
/// per stdout line, in order.
pub fn cmd_pipe(args: PipeArgs) {
    let config = resolve_config(&args.config);
    let comparator = Comparator::new(&config);

    let stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();

    for line in stdin.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("error: cannot read request: {}", e);
                process::exit(1);
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let result = respond(&comparator, &line);
        if writeln!(stdout, "{}", result.to_json())
            .and_then(|_| stdout.flush())
            .is_err()
        {
            // Reader went away.
            return;
        }
    }
}

fn respond(comparator: &Comparator, line: &str) -> ComparisonResult {
    let wire: WireRequest = match serde_json::from_str(line) {
        Ok(w) => w,
        Err(e) => {
            log::warn!("malformed request: {}", e);
            return ComparisonResult::rejected(&StudioError::BadRequest(e.to_string()));
        }
    };
    match wire.into_request() {
        Ok(request) => comparator.compare(&request),
        Err(e) => ComparisonResult::rejected(&e),
    }
}
