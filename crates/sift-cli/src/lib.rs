//! Command line for running selection sessions against a simulated list.

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use sift_loop::session::{SessionController, SessionReport};
use tokio_util::sync::CancellationToken;

pub mod config;
pub mod console;
pub mod simulate;

use config::{load_config, CliConfig};
use console::ConsoleEventSink;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedArgs {
    help: bool,
    config_file: Option<String>,
    target: Option<u32>,
    json: bool,
}

fn parse_args(args: &[String]) -> Result<ParsedArgs, String> {
    let mut parsed = ParsedArgs {
        help: false,
        config_file: None,
        target: None,
        json: false,
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => parsed.help = true,
            "--json" => parsed.json = true,
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--config requires a path".to_string())?;
                parsed.config_file = Some(value.clone());
            }
            "--target" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--target requires a count".to_string())?;
                let count: u32 = value
                    .parse()
                    .map_err(|_| format!("invalid --target value {value:?}"))?;
                parsed.target = (count > 0).then_some(count);
            }
            other => return Err(format!("unknown argument {other:?} (try --help)")),
        }
    }
    Ok(parsed)
}

fn write_help(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "sift - automated bulk selection over a scrolling list")?;
    writeln!(out)?;
    writeln!(out, "Usage: sift [options]")?;
    writeln!(out)?;
    writeln!(out, "Options:")?;
    writeln!(out, "  --config <path>   TOML config file (default: ~/.config/sift/config.toml)")?;
    writeln!(out, "  --target <count>  stop after this many confirmed selections (0 = unbounded)")?;
    writeln!(out, "  --json            print the final report as JSON instead of narration")?;
    writeln!(out, "  -h, --help        show this help")?;
    Ok(())
}

/// Final report shape for `--json` output.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    status: &'a str,
    achieved: u32,
    processed: usize,
    recorded_labels: &'a [String],
}

fn write_report(
    report: &SessionReport,
    json: bool,
    stdout: &mut dyn Write,
) -> Result<(), String> {
    if json {
        let rendered = serde_json::to_string_pretty(&JsonReport {
            status: report.status.as_str(),
            achieved: report.achieved,
            processed: report.processed,
            recorded_labels: &report.recorded_labels,
        })
        .map_err(|err| format!("render report: {err}"))?;
        writeln!(stdout, "{rendered}").map_err(|err| err.to_string())?;
    } else if !report.recorded_labels.is_empty() {
        writeln!(stdout, "recorded selections:").map_err(|err| err.to_string())?;
        for label in &report.recorded_labels {
            writeln!(stdout, "  {label}").map_err(|err| err.to_string())?;
        }
    }
    Ok(())
}

async fn run_session(cfg: &CliConfig, json: bool) -> Result<SessionReport, String> {
    let view = Arc::new(simulate::build_view(&cfg.simulation));
    let mut controller = SessionController::new(view, cfg.session_config());
    if !json {
        controller = controller.with_event_sink(Arc::new(ConsoleEventSink::stdout()));
    }

    // Ctrl-C requests a stop; the session halts at the next actuation
    // boundary and still reports what it did.
    let stop = CancellationToken::new();
    let stop_signal = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop_signal.cancel();
        }
    });

    controller.run(stop).await.map_err(|err| err.to_string())
}

fn execute(args: &[String], stdout: &mut dyn Write) -> Result<(), String> {
    let parsed = parse_args(args)?;
    if parsed.help {
        return write_help(stdout).map_err(|err| err.to_string());
    }

    let (mut cfg, _path) = load_config(parsed.config_file.as_deref())?;
    if parsed.target.is_some() {
        cfg.session.target = parsed.target;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("start runtime: {err}"))?;
    let report = runtime.block_on(run_session(&cfg, parsed.json))?;
    write_report(&report, parsed.json, stdout)
}

pub fn run(args: &[String], stdout: &mut dyn Write, stderr: &mut dyn Write) -> i32 {
    match execute(args, stdout) {
        Ok(()) => 0,
        Err(message) => {
            let _ = writeln!(stderr, "{message}");
            1
        }
    }
}

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    run(&args, &mut stdout, &mut stderr)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::{parse_args, run};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn parses_flags() {
        let parsed = parse_args(&args(&["--config", "sift.toml", "--target", "12", "--json"]))
            .unwrap();
        assert_eq!(parsed.config_file.as_deref(), Some("sift.toml"));
        assert_eq!(parsed.target, Some(12));
        assert!(parsed.json);
        assert!(!parsed.help);
    }

    #[test]
    fn zero_target_flag_means_unbounded() {
        let parsed = parse_args(&args(&["--target", "0"])).unwrap();
        assert_eq!(parsed.target, None);
    }

    #[test]
    fn rejects_unknown_arguments() {
        let err = parse_args(&args(&["--frobnicate"])).unwrap_err();
        assert!(err.contains("--frobnicate"));
    }

    #[test]
    fn missing_flag_values_are_errors() {
        assert!(parse_args(&args(&["--config"])).is_err());
        assert!(parse_args(&args(&["--target"])).is_err());
        assert!(parse_args(&args(&["--target", "many"])).is_err());
    }

    #[test]
    fn help_prints_usage_and_succeeds() {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(&args(&["--help"]), &mut stdout, &mut stderr);
        assert_eq!(code, 0);
        let text = String::from_utf8(stdout).unwrap();
        assert!(text.contains("Usage: sift"));
        assert!(stderr.is_empty());
    }

    #[test]
    fn bad_arguments_exit_nonzero() {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(&args(&["--nope"]), &mut stdout, &mut stderr);
        assert_eq!(code, 1);
        assert!(String::from_utf8(stderr).unwrap().contains("--nope"));
    }
}
