//! Subprocess implementation of the tool contract

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use crate::error::{ToolError, ToolResult};
use crate::types::ExecutionResult;
use crate::{ToolOutput, ToolRequest, TransitionTool};

const ALLOC_FILE: &str = "alloc.json";
const TXS_FILE: &str = "txs.json";
const ENV_FILE: &str = "env.json";
const RESULT_FILE: &str = "out.json";
const OUT_ALLOC_FILE: &str = "outAlloc.json";

/// Runs a `t8n` binary once per block in a scratch directory
#[derive(Clone, Debug)]
pub struct ProcessTool {
    path: PathBuf,
    work_dir: Option<PathBuf>,
}

impl ProcessTool {
    /// Tool at `path`, scratch files in the system temp directory
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            work_dir: None,
        }
    }

    /// Create scratch directories under `dir` instead
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Tool binary path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn scratch_dir(&self) -> ToolResult<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("t8n-");
        let dir = match &self.work_dir {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> ToolResult<()> {
    let body = serde_json::to_string_pretty(value)?;
    tracing::trace!("{}:\n{}", path.display(), body);
    fs::write(path, body)?;
    Ok(())
}

fn read_output(path: &Path) -> ToolResult<String> {
    match fs::read_to_string(path) {
        Ok(body) => {
            tracing::trace!("{}:\n{}", path.display(), body);
            Ok(body)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ToolError::MissingOutput(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

impl TransitionTool for ProcessTool {
    fn transition(&self, request: &ToolRequest<'_>) -> ToolResult<ToolOutput> {
        let dir = self.scratch_dir()?;
        let alloc_path = dir.path().join(ALLOC_FILE);
        let txs_path = dir.path().join(TXS_FILE);
        let env_path = dir.path().join(ENV_FILE);
        let result_path = dir.path().join(RESULT_FILE);
        let out_alloc_path = dir.path().join(OUT_ALLOC_FILE);

        write_json(&alloc_path, request.alloc)?;
        write_json(&txs_path, request.txs)?;
        write_json(&env_path, request.env)?;

        let mut cmd = Command::new(&self.path);
        cmd.arg("--input.alloc")
            .arg(&alloc_path)
            .arg("--input.txs")
            .arg(&txs_path)
            .arg("--input.env")
            .arg(&env_path)
            .arg("--output.result")
            .arg(&result_path)
            .arg("--output.alloc")
            .arg(&out_alloc_path)
            .arg("--state.fork")
            .arg(request.fork);
        if let Some(reward) = request.reward {
            cmd.arg("--state.reward").arg(reward.to_string());
        }

        tracing::debug!(
            "Running {} for block {} ({} txs)",
            self.path.display(),
            request.env.current_number,
            request.txs.len()
        );
        let output = cmd.output().map_err(|source| ToolError::Spawn {
            path: self.path.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(ToolError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let result: ExecutionResult = serde_json::from_str(&read_output(&result_path)?)?;
        let alloc = serde_json::from_str(&read_output(&out_alloc_path)?)?;
        Ok(ToolOutput { result, alloc })
    }
}
