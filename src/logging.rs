use std::io::Write;
use std::path::Path;

use log::LevelFilter;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

use crate::eval::StatusResult;
use crate::platform::PullRequestRef;

/// Install the stderr logger. A logger that is already set is left alone.
pub fn init(level: LevelFilter) {
    let _ = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

/// Append a status record to the status log.
/// Best-effort: failures are only logged (recording must never block posting).
pub fn log_status(path: &Path, pull_request: &PullRequestRef, result: &StatusResult) {
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let mut file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    {
        Ok(file) => file,
        Err(e) => {
            log::debug!("status log {} unavailable: {e}", path.display());
            return;
        }
    };

    let line = format_record(&timestamp_now(), pull_request, result);
    if let Err(e) = writeln!(file, "{line}") {
        log::debug!("status log {} write failed: {e}", path.display());
    }
}

/// One tab-separated status record; tabs and newlines in fields become spaces.
fn format_record(ts: &str, pull_request: &PullRequestRef, result: &StatusResult) -> String {
    let clean = |s: &str| s.replace(['\t', '\n'], " ");
    format!(
        "{ts}\t{repo}#{number}\t{sha}\t{name}\t{state}\t{description}",
        repo = pull_request.repository,
        number = pull_request.number,
        sha = pull_request.head_sha,
        name = clean(&result.name),
        state = result.state.as_str(),
        description = clean(&result.description),
    )
}

/// Simple UTC timestamp without external deps.
fn timestamp_now() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let (year, month, day) = civil_from_days(secs / 86400);
    let rem = secs % 86400;
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

/// Days since the Unix epoch to (year, month, day), proleptic Gregorian.
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}
