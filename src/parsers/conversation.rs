use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::TranscriptPair;
use crate::utils::open_bounded_file;

const MAX_CONSECUTIVE_ERRORS: usize = 100;

/// Parse a conversation payload (an array of transcript pairs).
///
/// Individual pairs that are not objects are skipped. The payload as a whole fails only if
/// it is not an array, or if it has elements and none of them parse.
pub fn parse_transcript(payload: &Value) -> Result<Vec<TranscriptPair>> {
    let Value::Array(items) = payload else {
        bail!("Transcript payload is not an array of pairs");
    };

    let mut pairs = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match TranscriptPair::deserialize(item) {
            Ok(pair) => pairs.push(pair),
            Err(e) => debug!(pair = i, error = %e, "Skipping malformed transcript pair"),
        }
    }

    if !items.is_empty() && pairs.is_empty() {
        bail!("None of the {} transcript pairs could be parsed", items.len());
    }

    Ok(pairs)
}

/// Parse a JSONL transcript log (one pair per line) into a pair array payload.
///
/// Malformed lines are logged and skipped. Returns an error if more than 50% of lines fail
/// to parse or 100 consecutive lines fail.
pub fn parse_pair_file(path: &Path) -> Result<Value> {
    let file = open_bounded_file(path)?;

    let reader = BufReader::new(file);
    let mut pairs = Vec::new();
    let mut skipped_count = 0;
    let mut total_lines = 0;
    let mut consecutive_errors = 0;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line from transcript file")?;

        if line.trim().is_empty() {
            continue;
        }

        total_lines += 1;

        match serde_json::from_str::<Value>(&line) {
            Ok(value) => {
                pairs.push(value);
                consecutive_errors = 0;
            }
            Err(e) => {
                warn!(
                    line = line_num + 1,
                    path = %path.display(),
                    error = %e,
                    "Failed to parse JSON line"
                );
                skipped_count += 1;
                consecutive_errors += 1;

                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    bail!(
                        "Too many consecutive parse errors ({}) in {} - file may be corrupted",
                        consecutive_errors,
                        path.display()
                    );
                }
            }
        }
    }

    if total_lines > 0 {
        let failure_rate = (skipped_count as f64) / (total_lines as f64);
        if failure_rate > 0.5 {
            bail!(
                "Too many parse failures in {}: {} of {} lines failed ({:.1}%)",
                path.display(),
                skipped_count,
                total_lines,
                failure_rate * 100.0
            );
        }
    }

    if skipped_count > 0 {
        debug!(
            path = %path.display(),
            pairs = pairs.len(),
            skipped = skipped_count,
            "Parsed transcript file"
        );
    }

    Ok(Value::Array(pairs))
}
