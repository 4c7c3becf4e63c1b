//! Workflow plan assembly
//!
//! The analysis pipeline is a fixed ten-step template. Assembly only decides
//! which numeric parameters get injected into which steps; all computation is
//! delegated to the external runner.

pub mod params;

pub use params::WorkflowParams;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const WORKFLOW_NAME: &str = "Standard Single-Cell Pipeline";

/// A single named step handed to the external runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub name: String,
    pub tool_id: String,
    pub desc: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// The materialized plan, serialized as JSON for the runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowPlan {
    pub workflow_name: String,
    pub steps: Vec<WorkflowStep>,
}

/// The fixed step template: name, tool id, description
const STEP_TEMPLATE: [(&str, &str, &str); 10] = [
    ("1. Quality Control", "local_qc", "Filter low-quality cells and genes"),
    ("2. Normalization", "local_normalize", "Normalize counts per cell"),
    ("3. Find Variable Genes", "local_hvg", "Select highly variable genes"),
    ("4. Scale Data", "local_scale", "Scale expression values"),
    ("5. PCA", "local_pca", "Principal component analysis"),
    ("6. Compute Neighbors", "local_neighbors", "Build the neighborhood graph"),
    ("7. Clustering", "local_cluster", "Leiden clustering"),
    ("8. UMAP Visualization", "local_umap", "UMAP embedding"),
    ("9. t-SNE Visualization", "local_tsne", "t-SNE embedding"),
    ("10. Find Markers", "local_markers", "Rank marker genes per cluster"),
];

impl WorkflowPlan {
    /// Materialize the standard pipeline with the given parameters.
    ///
    /// Parameters land on exactly three steps: QC (min_genes, max_mt),
    /// HVG selection (n_top_genes) and clustering (resolution). Every other
    /// step carries an empty parameter map.
    pub fn assemble(params: &WorkflowParams) -> Self {
        let steps = STEP_TEMPLATE
            .iter()
            .map(|(name, tool_id, desc)| {
                let mut step_params = BTreeMap::new();
                match *tool_id {
                    "local_qc" => {
                        step_params.insert("min_genes".to_string(), params.min_genes.clone());
                        step_params.insert("max_mt".to_string(), params.max_mt.clone());
                    }
                    "local_hvg" => {
                        step_params.insert("n_top_genes".to_string(), params.n_top_genes.clone());
                    }
                    "local_cluster" => {
                        step_params.insert("resolution".to_string(), params.resolution.clone());
                    }
                    _ => {}
                }
                WorkflowStep {
                    name: name.to_string(),
                    tool_id: tool_id.to_string(),
                    desc: desc.to_string(),
                    params: step_params,
                }
            })
            .collect();

        Self {
            workflow_name: WORKFLOW_NAME.to_string(),
            steps,
        }
    }

    /// Find a step by tool id
    pub fn step(&self, tool_id: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.tool_id == tool_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_has_ten_steps_in_order() {
        let plan = WorkflowPlan::assemble(&WorkflowParams::default());
        assert_eq!(plan.workflow_name, WORKFLOW_NAME);
        assert_eq!(plan.steps.len(), 10);

        let tool_ids: Vec<&str> = plan.steps.iter().map(|s| s.tool_id.as_str()).collect();
        assert_eq!(
            tool_ids,
            vec![
                "local_qc",
                "local_normalize",
                "local_hvg",
                "local_scale",
                "local_pca",
                "local_neighbors",
                "local_cluster",
                "local_umap",
                "local_tsne",
                "local_markers",
            ]
        );
    }

    #[test]
    fn test_assemble_injects_default_params() {
        let plan = WorkflowPlan::assemble(&WorkflowParams::default());

        let qc = plan.step("local_qc").unwrap();
        assert_eq!(qc.params.get("min_genes"), Some(&"200".to_string()));
        assert_eq!(qc.params.get("max_mt"), Some(&"20".to_string()));

        let hvg = plan.step("local_hvg").unwrap();
        assert_eq!(hvg.params.get("n_top_genes"), Some(&"2000".to_string()));

        let cluster = plan.step("local_cluster").unwrap();
        assert_eq!(cluster.params.get("resolution"), Some(&"0.5".to_string()));
    }

    #[test]
    fn test_assemble_leaves_other_steps_without_params() {
        let plan = WorkflowPlan::assemble(&WorkflowParams::default());
        for step in &plan.steps {
            match step.tool_id.as_str() {
                "local_qc" | "local_hvg" | "local_cluster" => {
                    assert!(!step.params.is_empty())
                }
                _ => assert!(step.params.is_empty(), "{} should carry no params", step.tool_id),
            }
        }
    }

    #[test]
    fn test_assemble_respects_extracted_params() {
        let params = WorkflowParams {
            min_genes: "500".to_string(),
            max_mt: "5".to_string(),
            resolution: "0.8".to_string(),
            n_top_genes: "3000".to_string(),
        };
        let plan = WorkflowPlan::assemble(&params);
        assert_eq!(
            plan.step("local_qc").unwrap().params.get("min_genes"),
            Some(&"500".to_string())
        );
        assert_eq!(
            plan.step("local_cluster").unwrap().params.get("resolution"),
            Some(&"0.8".to_string())
        );
    }

    #[test]
    fn test_plan_json_shape() {
        let plan = WorkflowPlan::assemble(&WorkflowParams::default());
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["workflow_name"], WORKFLOW_NAME);
        assert_eq!(json["steps"].as_array().unwrap().len(), 10);
        assert_eq!(json["steps"][0]["tool_id"], "local_qc");
        assert_eq!(json["steps"][0]["params"]["min_genes"], "200");
    }
}
