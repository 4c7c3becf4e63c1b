//! Test dataset discovery
//!
//! Known reference datasets living under the configured test-data directory
//! are detected by layout and offered for pipeline runs.

use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct TestDataset {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fastq_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h5ad_file: Option<PathBuf>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cells: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chemistry: Option<String>,
}

pub struct TestDataManager {
    test_data_dir: PathBuf,
}

impl TestDataManager {
    pub fn new(test_data_dir: impl Into<PathBuf>) -> Self {
        Self {
            test_data_dir: test_data_dir.into(),
        }
    }

    /// Scan the test-data directory for known dataset layouts
    pub fn scan(&self) -> Vec<TestDataset> {
        let mut datasets = Vec::new();

        if !self.test_data_dir.exists() {
            return datasets;
        }

        if let Some(pbmc) = self.scan_pbmc_1k_v3() {
            datasets.push(pbmc);
        }

        datasets
    }

    /// 10x Genomics PBMC 1k v3: fastq dir + reference, optional converted h5ad
    fn scan_pbmc_1k_v3(&self) -> Option<TestDataset> {
        let fastq_dir = self.test_data_dir.join("pbmc_1k_v3_fastqs");
        let reference = self.test_data_dir.join("refdata-gex-GRCh38-2024-A");
        let h5ad_file = self.test_data_dir.join("pbmc_1k_v3_filtered.h5ad");

        if !fastq_dir.exists() || !reference.exists() {
            return None;
        }

        Some(TestDataset {
            id: "pbmc_1k_v3".to_string(),
            name: "PBMC 1k v3".to_string(),
            description: "10x Genomics PBMC 1k cells v3 chemistry dataset".to_string(),
            fastq_dir: Some(fastq_dir),
            reference: Some(reference),
            h5ad_file: h5ad_file.exists().then_some(h5ad_file),
            available: true,
            cells: Some("~1,200".to_string()),
            chemistry: Some("v3".to_string()),
        })
    }

    pub fn get_by_id(&self, dataset_id: &str) -> Option<TestDataset> {
        self.scan().into_iter().find(|d| d.id == dataset_id)
    }

    /// Simplified JSON listing for selection interfaces
    pub fn to_selection_json(datasets: &[TestDataset]) -> String {
        #[derive(Serialize)]
        struct Entry<'a> {
            id: &'a str,
            name: &'a str,
            description: &'a str,
            available: bool,
        }

        let simplified: Vec<Entry> = datasets
            .iter()
            .map(|d| Entry {
                id: &d.id,
                name: &d.name,
                description: &d.description,
                available: d.available,
            })
            .collect();

        serde_json::to_string_pretty(&simplified).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn data_dir(&self) -> &Path {
        &self.test_data_dir
    }
}
