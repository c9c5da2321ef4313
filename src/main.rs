//! mission-control: evaluate a repository's review policy for one pull request.
//!
//! Reads a JSON document from stdin:
//!
//! ```json
//! {
//!   "event_type": "pull_request",
//!   "payload": { "action": "synchronize", "pull_request": { ... }, "repository": { ... } },
//!   "files": ["/lib/mission_control.rb"],
//!   "approvals": ["aterris"],
//!   "policy": "Code Review:\n  users: [aterris]\n"
//! }
//! ```
//!
//! and writes the posted statuses as one JSON line to stdout. Exits 1 when a
//! control failed or the input could not be used, 0 otherwise.

use std::io::Read;

use serde::{Deserialize, Serialize};

use mission_control::config::Settings;
use mission_control::event::PullRequestEvent;
use mission_control::{BatchReport, Control, Snapshot, StatusResult, logging};

#[derive(Debug, Deserialize)]
struct Input {
    event_type: String,
    payload: serde_json::Value,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    approvals: Vec<String>,
    /// Policy file contents at the base ref; absent when the repository has none.
    policy: Option<String>,
}

#[derive(Serialize)]
struct Output<'a> {
    statuses: &'a [StatusResult],
    failures: Vec<FailureOutput<'a>>,
}

#[derive(Serialize)]
struct FailureOutput<'a> {
    name: &'a str,
    error: String,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    policy_path: Option<String>,
    dry_run: bool,
}

fn parse_args<I>(argv: I) -> Result<Args, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = Args {
        policy_path: None,
        dry_run: false,
    };
    let mut iter = argv.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--policy-path" => {
                args.policy_path = Some(iter.next().ok_or("--policy-path needs a value")?);
            }
            "--dry-run" => args.dry_run = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(args)
}

/// What a run did with its input.
#[derive(Debug)]
enum Outcome {
    /// The event action does not affect statuses.
    Skipped(PullRequestEvent),
    Evaluated {
        event: PullRequestEvent,
        report: BatchReport,
    },
}

/// Decode the event, place the policy text at `policy_path`, and evaluate every control.
fn run(input: Input, policy_path: &str) -> mission_control::Result<Outcome> {
    let event = PullRequestEvent::from_payload(&input.event_type, input.payload)?;
    if !event.should_evaluate() {
        return Ok(Outcome::Skipped(event));
    }

    let mut snapshot = Snapshot::new(event.pull_request.clone())
        .with_changed_files(input.files)
        .with_approvals(input.approvals);
    if let Some(policy) = input.policy {
        snapshot = snapshot.with_file(policy_path, policy);
    }

    let report = Control::execute_all(&snapshot, &snapshot, policy_path)?;
    Ok(Outcome::Evaluated { event, report })
}

/// The JSON line printed for a report.
fn render(report: &BatchReport) -> serde_json::Result<String> {
    let output = Output {
        statuses: &report.results,
        failures: report
            .failures
            .iter()
            .map(|f| FailureOutput {
                name: &f.name,
                error: f.error.to_string(),
            })
            .collect(),
    };
    serde_json::to_string(&output)
}

fn exit_code(report: &BatchReport) -> i32 {
    if report.is_clean() { 0 } else { 1 }
}

fn main() {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("mission-control: {e}");
            eprintln!("usage: mission-control [--policy-path PATH] [--dry-run] < event.json");
            std::process::exit(2);
        }
    };

    let mut settings = Settings::load();
    if let Some(path) = args.policy_path {
        settings.policy.path = path;
    }
    logging::init(settings.log_level());

    let mut raw = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut raw) {
        log::error!("failed to read stdin: {e}");
        std::process::exit(1);
    }
    let input: Input = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            log::error!("JSON parse error: {e}");
            std::process::exit(1);
        }
    };

    let (event, report) = match run(input, &settings.policy.path) {
        Ok(Outcome::Evaluated { event, report }) => (event, report),
        Ok(Outcome::Skipped(event)) => {
            log::info!("ignoring {:?} action {:?}", event.kind, event.action);
            std::process::exit(0);
        }
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    if !args.dry_run
        && let Some(path) = settings.status_log_path()
    {
        for result in &report.results {
            logging::log_status(&path, &event.pull_request, result);
        }
    }

    match render(&report) {
        Ok(line) => println!("{line}"),
        Err(e) => log::error!("failed to encode output: {e}"),
    }
    std::process::exit(exit_code(&report));
}
