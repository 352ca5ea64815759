use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};
use walkdir::WalkDir;

use super::conversation::parse_pair_file;
use crate::models::RawConversation;
use crate::utils::{get_trace_dir, rendered_document_path};

const TRANSCRIPT_EXTENSION: &str = "jsonl";

/// Something that can hand the assembler its list of conversation records.
pub trait ConversationSource {
    /// Load every conversation record.
    ///
    /// Failing here is the only way an index build fails outright.
    fn load(&self) -> Result<Vec<RawConversation>>;
}

impl ConversationSource for [RawConversation] {
    fn load(&self) -> Result<Vec<RawConversation>> {
        Ok(self.to_vec())
    }
}

impl ConversationSource for Vec<RawConversation> {
    fn load(&self) -> Result<Vec<RawConversation>> {
        Ok(self.clone())
    }
}

/// A directory of `*.jsonl` transcript logs, one conversation per file.
///
/// The file stem is the conversation id; a sibling `.html` file, when present, is recorded
/// as the rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceDirectory {
    dir: PathBuf,
}

impl TraceDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory named by `CLAUDE_TRACE_DIR`, or `.claude-trace` in the working directory
    pub fn from_env() -> Self {
        Self::new(get_trace_dir())
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn transcript_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.with_context(|| {
                format!("Failed to read transcript directory: {}", self.dir.display())
            })?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().is_some_and(|ext| ext == TRANSCRIPT_EXTENSION)
            {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }
}

impl ConversationSource for TraceDirectory {
    fn load(&self) -> Result<Vec<RawConversation>> {
        if !self.dir.is_dir() {
            bail!("Transcript directory not found: {}", self.dir.display());
        }

        let mut conversations = Vec::new();
        let mut failed = 0;

        for path in self.transcript_files()? {
            let Some(id) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };

            match parse_pair_file(&path) {
                Ok(payload) => conversations.push(RawConversation {
                    id,
                    log_file: path.display().to_string(),
                    html_file: rendered_document_path(&path).map(|p| p.display().to_string()),
                    payload,
                }),
                Err(e) => {
                    failed += 1;
                    warn!(path = %path.display(), error = %e, "Skipping transcript file");
                }
            }
        }

        info!(
            dir = %self.dir.display(),
            loaded = conversations.len(),
            failed,
            "Loaded transcript directory"
        );

        Ok(conversations)
    }
}
