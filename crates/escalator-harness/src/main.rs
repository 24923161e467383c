#![forbid(unsafe_code)]

//! Replay an Escalator scenario script and print a JSONL event log.
//!
//! ```sh
//! escalator-replay scenario.esc
//! escalator-replay --golden tests/golden/scenario.checksums scenario.esc
//! ESCALATOR_LOG=escalator=debug escalator-replay - < scenario.esc
//! ```
//!
//! Configuration comes from `ESCALATOR_*` environment variables. Tracing
//! output goes to stderr as JSON, filtered by `ESCALATOR_LOG`.

use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use escalator::EscalatorConfig;
use escalator_core::logging::init_json_subscriber;
use escalator_harness::{
    EventLog, GoldenOutcome, Replay, is_bless_mode, load_golden_checksums, parse,
    save_golden_checksums, verify_checksums,
};

struct Config {
    /// `None` reads stdin.
    script: Option<PathBuf>,
    golden: Option<PathBuf>,
    print_text: bool,
}

fn print_usage() {
    eprintln!(
        "Usage: escalator-replay [--golden <file>] [--text] [<script> | -]\n\
         \n\
         Replays a scenario script and writes JSONL events to stdout.\n\
         --golden <file>  verify snapshot checksums (BLESS=1 rewrites the file)\n\
         --text           print snapshot text to stderr"
    );
}

fn parse_args() -> Result<Config, String> {
    let mut args = env::args().skip(1);
    let mut config = Config {
        script: None,
        golden: None,
        print_text: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--golden" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--golden requires a value".to_string())?;
                config.golden = Some(PathBuf::from(value));
            }
            "--text" => config.print_text = true,
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "-" => config.script = None,
            other if other.starts_with("--") => return Err(format!("unknown flag {other}")),
            _ => {
                if config.script.is_some() {
                    return Err("more than one script given".to_string());
                }
                config.script = Some(PathBuf::from(arg));
            }
        }
    }
    Ok(config)
}

fn read_script(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn run() -> Result<GoldenOutcome, Box<dyn Error>> {
    let cfg = parse_args().inspect_err(|_| print_usage())?;
    init_json_subscriber();

    let source = read_script(cfg.script.as_ref())?;
    let script = parse(&source)?;
    let mut replay = Replay::new(EscalatorConfig::from_env())?;
    let mut events = EventLog::new(io::stdout());

    if let Err(err) = replay.run(&script, &mut events) {
        events.log_complete(script.steps.len(), GoldenOutcome::Error);
        return Err(err.into());
    }

    if cfg.print_text {
        for (index, text) in replay.snapshots().iter().enumerate() {
            eprintln!("--- snapshot {index} ---\n{text}");
        }
    }

    let outcome = match cfg.golden {
        Some(path) if is_bless_mode() => {
            save_golden_checksums(&path, events.checksums())?;
            GoldenOutcome::Pass
        }
        Some(path) => {
            let expected = load_golden_checksums(&path)?;
            let (outcome, mismatch) = verify_checksums(events.checksums(), &expected);
            if let Some(at) = mismatch {
                eprintln!(
                    "checksum mismatch at snapshot {at}: expected {}, got {}",
                    expected[at],
                    events.checksums()[at]
                );
            }
            outcome
        }
        None => GoldenOutcome::Pass,
    };
    events.log_complete(script.steps.len(), outcome);
    Ok(outcome)
}

fn main() -> ExitCode {
    match run() {
        Ok(GoldenOutcome::Pass) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("escalator-replay error: {err}");
            ExitCode::FAILURE
        }
    }
}
