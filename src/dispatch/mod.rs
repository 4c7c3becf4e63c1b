//! External runner dispatch
//!
//! All scientific computation happens in an external analysis runner. This
//! module serializes plans into per-run directories, spawns the runner and
//! parses its JSON reports back.

use crate::config::ToolsConfig;
use crate::inspect::{FileKind, InspectionReport};
use crate::utils::error::{AppError, AppResult};
use crate::utils::format::run_timestamp;
use crate::workflow::WorkflowPlan;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use uuid::Uuid;

/// Per-step entry of the runner's report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
}

/// The runner's final report for a submitted plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub status: String,
    #[serde(default)]
    pub steps_details: Vec<StepReport>,
    #[serde(default)]
    pub final_plot: Option<String>,
}

/// Receipt for a submitted run
#[derive(Debug, Clone)]
pub struct TaskReceipt {
    pub task_id: String,
    pub output_dir: PathBuf,
    pub report: RunReport,
}

pub struct Dispatcher {
    runner_cmd: String,
    results_dir: PathBuf,
    cellranger_reference: Option<PathBuf>,
}

impl Dispatcher {
    pub fn new(tools: &ToolsConfig, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner_cmd: tools.runner_cmd.clone(),
            results_dir: results_dir.into(),
            cellranger_reference: tools.cellranger_reference.clone(),
        }
    }

    /// Deep inspection, delegated to `<runner> inspect <path>`
    pub async fn inspect(&self, path: &Path) -> AppResult<InspectionReport> {
        let output = Command::new(&self.runner_cmd)
            .arg("inspect")
            .arg(path)
            .output()
            .await
            .map_err(|e| {
                AppError::Dispatch(format!(
                    "Failed to launch runner '{}': {}",
                    self.runner_cmd, e
                ))
            })?;

        if !output.status.success() {
            return Err(AppError::Dispatch(format!(
                "Runner inspect failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| AppError::Parse(format!("Failed to parse inspection report: {}", e)))
    }

    /// Write the plan into a fresh run directory and execute it
    pub async fn submit(&self, plan: &WorkflowPlan, input: &Path) -> AppResult<TaskReceipt> {
        // Direct FASTQ input needs Cell Ranger preprocessing, which the
        // runner does not handle
        if FileKind::from_path(input) == FileKind::Fastq {
            let hint = match &self.cellranger_reference {
                Some(reference) => format!(
                    "run Cell Ranger with the reference at {} first",
                    reference.display()
                ),
                None => {
                    "run Cell Ranger first (set tools.cellranger_reference in the config)"
                        .to_string()
                }
            };
            return Err(AppError::Dispatch(format!(
                "FASTQ input requires Cell Ranger preprocessing before the pipeline can run; {}",
                hint
            )));
        }

        let task_id = Uuid::new_v4().to_string();
        let output_dir = self.create_run_dir(&task_id)?;
        let plan_path = self.write_plan(plan, &output_dir)?;

        let output = Command::new(&self.runner_cmd)
            .arg("run")
            .arg("--plan")
            .arg(&plan_path)
            .arg("--input")
            .arg(input)
            .arg("--output")
            .arg(&output_dir)
            .output()
            .await
            .map_err(|e| {
                AppError::Dispatch(format!(
                    "Failed to launch runner '{}': {}",
                    self.runner_cmd, e
                ))
            })?;

        if !output.status.success() {
            return Err(AppError::Dispatch(format!(
                "Runner exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let report: RunReport = serde_json::from_slice(&output.stdout)
            .map_err(|e| AppError::Parse(format!("Failed to parse run report: {}", e)))?;

        Ok(TaskReceipt {
            task_id,
            output_dir,
            report,
        })
    }

    /// `run_<timestamp>_<short id>` under the results root
    fn create_run_dir(&self, task_id: &str) -> AppResult<PathBuf> {
        let short_id = &task_id[..task_id.len().min(8)];
        let dir = self
            .results_dir
            .join(format!("run_{}_{}", run_timestamp(&Utc::now()), short_id));
        std::fs::create_dir_all(&dir)
            .map_err(|e| AppError::Io(format!("Failed to create run directory: {}", e)))?;
        Ok(dir)
    }

    fn write_plan(&self, plan: &WorkflowPlan, output_dir: &Path) -> AppResult<PathBuf> {
        let plan_path = output_dir.join("workflow.json");
        let content = serde_json::to_string_pretty(plan)
            .map_err(|e| AppError::Parse(format!("Failed to serialize plan: {}", e)))?;
        std::fs::write(&plan_path, content)
            .map_err(|e| AppError::Io(format!("Failed to write plan: {}", e)))?;
        Ok(plan_path)
    }
}
