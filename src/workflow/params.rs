//! Workflow parameter extraction
//!
//! Parameters come from three places, in priority order: the user query,
//! recommendations derived from file inspection, and fixed defaults. The LLM
//! does the merging; any extraction failure falls back to defaults.

use crate::inspect::InspectionReport;
use crate::llm::{ChatMessage, ChatOptions, LlmClient, extract_json_block};
use serde::{Deserialize, Serialize};

/// The four tunable knobs of the standard pipeline.
///
/// Values stay strings end to end; the runner owns numeric validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowParams {
    #[serde(default = "default_min_genes")]
    pub min_genes: String,
    #[serde(default = "default_max_mt")]
    pub max_mt: String,
    #[serde(default = "default_resolution")]
    pub resolution: String,
    #[serde(default = "default_n_top_genes")]
    pub n_top_genes: String,
}

fn default_min_genes() -> String {
    "200".to_string()
}

fn default_max_mt() -> String {
    "20".to_string()
}

fn default_resolution() -> String {
    "0.5".to_string()
}

fn default_n_top_genes() -> String {
    "2000".to_string()
}

impl Default for WorkflowParams {
    fn default() -> Self {
        Self {
            min_genes: default_min_genes(),
            max_mt: default_max_mt(),
            resolution: default_resolution(),
            n_top_genes: default_n_top_genes(),
        }
    }
}

/// Filtering recommendations conditioned on dataset size and state
pub fn recommendations(report: &InspectionReport) -> String {
    let mut lines = Vec::new();

    if report.n_obs > 10_000 {
        lines.push("- Large dataset (>10k cells): Recommend min_genes=500, max_mt=5%".to_string());
    } else if report.n_obs > 5_000 {
        lines.push("- Medium dataset (5k-10k cells): Recommend min_genes=300, max_mt=5%".to_string());
    } else {
        lines.push("- Small dataset (<5k cells): Recommend min_genes=200, max_mt=10%".to_string());
    }

    if report.is_normalized {
        lines.push("- Data appears normalized: Skip normalization step".to_string());
    } else {
        lines.push("- Data appears to be raw counts: Need normalization".to_string());
    }

    if report.has_qc_metrics {
        lines.push("- QC metrics already calculated: May skip QC calculation".to_string());
    }

    lines.join("\n")
}

fn build_extraction_prompt(
    query: &str,
    file_paths: &[String],
    report: Option<&InspectionReport>,
) -> String {
    let inspection_info = match report {
        Some(r) => format!(
            "\n{}\n\n【Recommendations Based on Inspection】\n{}\n",
            r.summary(),
            recommendations(r)
        ),
        None => String::new(),
    };

    format!(
        "Extract workflow parameters from user query and inspection results:\n\n\
         Query: {}\n\
         Files: {}\n\
         {}\n\
         Extract these parameters (if mentioned in query, otherwise use recommendations):\n\
         - min_genes (default: 200, adjust based on dataset size)\n\
         - max_mt (default: 20, adjust based on dataset size)\n\
         - resolution (default: 0.5, for clustering)\n\
         - n_top_genes (default: 2000, for HVG selection)\n\n\
         Return JSON only:\n\
         {{\"resolution\": \"0.8\", \"min_genes\": \"500\", \"max_mt\": \"5\"}}",
        query,
        if file_paths.is_empty() {
            "None".to_string()
        } else {
            file_paths.join(", ")
        },
        inspection_info,
    )
}

/// Parse the model's JSON reply, filling unmentioned fields with defaults
pub fn parse_params(completion: &str) -> Option<WorkflowParams> {
    let json = extract_json_block(completion);
    serde_json::from_str(&json).ok()
}

/// Ask the LLM for parameters; falls back to defaults on any failure
pub async fn extract_params(
    llm: &dyn LlmClient,
    query: &str,
    file_paths: &[String],
    report: Option<&InspectionReport>,
) -> WorkflowParams {
    let messages = [
        ChatMessage::system("You are a parameter extraction assistant. Return JSON only."),
        ChatMessage::user(build_extraction_prompt(query, file_paths, report)),
    ];

    let options = ChatOptions {
        temperature: Some(0.1),
        max_tokens: Some(256),
    };

    match llm.chat_with_options(&messages, options).await {
        Ok(completion) => parse_params(&completion).unwrap_or_default(),
        Err(_) => WorkflowParams::default(),
    }
}
