use std::env;
use std::path::PathBuf;

/// Environment variable naming the transcript log directory
pub const TRACE_DIR_ENV: &str = "CLAUDE_TRACE_DIR";

const DEFAULT_TRACE_DIR: &str = ".claude-trace";

/// Get the transcript directory (`$CLAUDE_TRACE_DIR`, or `.claude-trace` relative to the
/// working directory)
pub fn get_trace_dir() -> PathBuf {
    match env::var(TRACE_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(DEFAULT_TRACE_DIR),
    }
}
