//! File inspection
//!
//! Uploaded data files are characterized without ever loading them: sizes,
//! extensions and a few header lines are enough to estimate shape. Deep
//! inspection of binary formats (h5ad) is delegated to the external runner
//! and comes back as an [`InspectionReport`].

use crate::utils::error::{AppError, AppResult};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// File kinds the agents know how to route on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Fastq,
    Bam,
    H5ad,
    Mtx,
    Vcf,
    Bed,
    Bigwig,
    Csv,
    Tsv,
    #[serde(rename = "10x_genomics")]
    TenxDirectory,
    Unknown,
}

impl FileKind {
    /// Detect the kind from a path, by extension (directories are checked
    /// for the 10x Genomics layout separately).
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_lowercase();

        // Strip a trailing .gz so compressed files map to their base kind
        let name = name.strip_suffix(".gz").unwrap_or(&name);

        match name.rsplit('.').next().unwrap_or_default() {
            "fastq" | "fq" => FileKind::Fastq,
            "bam" | "sam" => FileKind::Bam,
            "h5ad" => FileKind::H5ad,
            "mtx" => FileKind::Mtx,
            "vcf" => FileKind::Vcf,
            "bed" => FileKind::Bed,
            "bw" | "bigwig" => FileKind::Bigwig,
            "csv" => FileKind::Csv,
            "tsv" => FileKind::Tsv,
            _ => FileKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Fastq => "fastq",
            FileKind::Bam => "bam",
            FileKind::H5ad => "h5ad",
            FileKind::Mtx => "mtx",
            FileKind::Vcf => "vcf",
            FileKind::Bed => "bed",
            FileKind::Bigwig => "bigwig",
            FileKind::Csv => "csv",
            FileKind::Tsv => "tsv",
            FileKind::TenxDirectory => "10x_genomics",
            FileKind::Unknown => "unknown",
        }
    }
}

/// Shallow metadata generated locally and saved as a `.meta.json` sidecar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMeta {
    pub filename: String,
    pub file_type: FileKind,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub size_mb: f64,
    #[serde(default)]
    pub estimated_cells: Option<String>,
    #[serde(default)]
    pub estimated_genes: Option<String>,
    #[serde(default)]
    pub is_directory: bool,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Characteristics returned by the external runner's deep inspection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InspectionReport {
    #[serde(default)]
    pub n_obs: u64,
    #[serde(default)]
    pub n_vars: u64,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub is_normalized: bool,
    #[serde(default)]
    pub has_qc_metrics: bool,
    #[serde(default)]
    pub has_clusters: bool,
    #[serde(default)]
    pub has_umap: bool,
}

impl InspectionReport {
    /// Render the summary block that gets folded into LLM prompts
    pub fn summary(&self) -> String {
        format!(
            "【Data Inspection Results】\n\
             - Number of cells (n_obs): {}\n\
             - Number of genes (n_vars): {}\n\
             - Max value: {}\n\
             - Is normalized: {}\n\
             - Has QC metrics: {}\n\
             - Has clusters: {}\n\
             - Has UMAP: {}",
            self.n_obs,
            self.n_vars,
            self.max_value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            self.is_normalized,
            self.has_qc_metrics,
            self.has_clusters,
            self.has_umap,
        )
    }
}

/// Generates shallow metadata for uploaded files
///
/// Only headers, sizes and directory listings are touched; data matrices are
/// never read into memory here.
pub struct FileInspector {
    upload_dir: PathBuf,
}

impl FileInspector {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    /// Inspect a file (or 10x directory) and write the `.meta.json` sidecar
    pub fn generate_metadata(&self, filename: &str) -> AppResult<FileMeta> {
        let filepath = self.resolve(filename);
        if !filepath.exists() {
            return Err(AppError::Io(format!(
                "File not found: {}",
                filepath.display()
            )));
        }

        let meta = if filepath.is_dir() {
            self.inspect_directory(filename, &filepath)?
        } else {
            self.inspect_file(filename, &filepath)?
        };

        self.save_sidecar(&filepath, &meta)?;
        Ok(meta)
    }

    /// Load a previously generated sidecar, if present
    pub fn get_metadata(&self, filename: &str) -> Option<FileMeta> {
        let sidecar = Self::sidecar_path(&self.resolve(filename));
        let content = std::fs::read_to_string(sidecar).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn resolve(&self, filename: &str) -> PathBuf {
        let path = Path::new(filename);
        // Paths that already resolve (absolute or CWD-relative) win over the
        // upload directory
        if path.is_absolute() || path.exists() {
            path.to_path_buf()
        } else {
            self.upload_dir.join(filename)
        }
    }

    fn sidecar_path(filepath: &Path) -> PathBuf {
        if filepath.is_dir() {
            filepath.join(".meta.json")
        } else {
            let mut name = filepath
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            name.push_str(".meta.json");
            filepath.with_file_name(name)
        }
    }

    fn save_sidecar(&self, filepath: &Path, meta: &FileMeta) -> AppResult<()> {
        let content = serde_json::to_string_pretty(meta)
            .map_err(|e| AppError::Parse(format!("Failed to serialize metadata: {}", e)))?;
        std::fs::write(Self::sidecar_path(filepath), content)
            .map_err(|e| AppError::Io(format!("Failed to save metadata: {}", e)))?;
        Ok(())
    }

    fn inspect_directory(&self, filename: &str, filepath: &Path) -> AppResult<FileMeta> {
        let entries: Vec<String> = std::fs::read_dir(filepath)
            .map_err(|e| AppError::Io(format!("Failed to read directory: {}", e)))?
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().to_str().map(String::from))
            .collect();

        let is_tenx = entries
            .iter()
            .any(|f| f == "matrix.mtx" || f == "matrix.mtx.gz");

        Ok(FileMeta {
            filename: filename.to_string(),
            file_type: if is_tenx {
                FileKind::TenxDirectory
            } else {
                FileKind::Unknown
            },
            size_bytes: 0,
            size_mb: 0.0,
            estimated_cells: None,
            estimated_genes: None,
            is_directory: true,
            files: entries,
        })
    }

    fn inspect_file(&self, filename: &str, filepath: &Path) -> AppResult<FileMeta> {
        let size_bytes = filepath
            .metadata()
            .map_err(|e| AppError::Io(format!("Failed to stat file: {}", e)))?
            .len();
        let size_mb = (size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0;

        let kind = FileKind::from_path(filepath);
        let mut meta = FileMeta {
            filename: filename.to_string(),
            file_type: kind,
            size_bytes,
            size_mb,
            estimated_cells: None,
            estimated_genes: None,
            is_directory: false,
            files: Vec::new(),
        };

        match kind {
            // Cell count tiers estimated from file size alone
            FileKind::H5ad => {
                meta.estimated_cells = Some(
                    if size_mb > 500.0 {
                        ">10k"
                    } else if size_mb > 100.0 {
                        "5k-10k"
                    } else {
                        "<5k"
                    }
                    .to_string(),
                );
                meta.estimated_genes = Some(">20k".to_string());
            }
            FileKind::Mtx => {
                if let Some((genes, cells)) = self.parse_mtx_header(filepath) {
                    meta.estimated_genes = Some(genes.to_string());
                    meta.estimated_cells = Some(cells.to_string());
                }
            }
            FileKind::Csv => {
                if let Some(first) = self.read_head(filepath, 1).first() {
                    meta.estimated_genes = Some(first.split(',').count().to_string());
                }
            }
            FileKind::Tsv => {
                if let Some(first) = self.read_head(filepath, 1).first() {
                    meta.estimated_genes = Some(first.split('\t').count().to_string());
                }
            }
            // FASTQ files are too large to estimate cheaply
            _ => {}
        }

        Ok(meta)
    }

    /// Matrix Market header: first non-comment line is "rows cols nnz",
    /// rows being genes and cols cells in the 10x convention.
    fn parse_mtx_header(&self, filepath: &Path) -> Option<(u64, u64)> {
        for line in self.read_head(filepath, 3) {
            if line.starts_with('%') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let rows = parts.next()?.parse().ok()?;
            let cols = parts.next()?.parse().ok()?;
            return Some((rows, cols));
        }
        None
    }

    fn is_gzipped(filepath: &Path) -> bool {
        let Ok(mut f) = File::open(filepath) else {
            return false;
        };
        let mut magic = [0u8; 2];
        f.read_exact(&mut magic).is_ok() && magic == [0x1f, 0x8b]
    }

    /// Read the first few lines of a (possibly gzipped) text file
    fn read_head(&self, filepath: &Path, lines: usize) -> Vec<String> {
        let Ok(file) = File::open(filepath) else {
            return Vec::new();
        };

        let reader: Box<dyn BufRead> = if Self::is_gzipped(filepath) {
            let Ok(inner) = File::open(filepath) else {
                return Vec::new();
            };
            Box::new(BufReader::new(GzDecoder::new(inner)))
        } else {
            Box::new(BufReader::new(file))
        };

        reader
            .lines()
            .take(lines)
            .filter_map(|l| l.ok())
            .map(|l| l.trim().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_file_kind_from_path() {
        assert_eq!(FileKind::from_path(Path::new("sample.h5ad")), FileKind::H5ad);
        assert_eq!(FileKind::from_path(Path::new("reads.fastq.gz")), FileKind::Fastq);
        assert_eq!(FileKind::from_path(Path::new("reads.fq")), FileKind::Fastq);
        assert_eq!(FileKind::from_path(Path::new("matrix.mtx.gz")), FileKind::Mtx);
        assert_eq!(FileKind::from_path(Path::new("track.bigwig")), FileKind::Bigwig);
        assert_eq!(FileKind::from_path(Path::new("notes.txt")), FileKind::Unknown);
    }

    #[test]
    fn test_inspect_mtx_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("matrix.mtx");
        std::fs::write(
            &path,
            "%%MatrixMarket matrix coordinate integer general\n%\n33538 1222 2612776\n",
        )
        .unwrap();

        let inspector = FileInspector::new(dir.path());
        let meta = inspector.generate_metadata("matrix.mtx").unwrap();
        assert_eq!(meta.file_type, FileKind::Mtx);
        assert_eq!(meta.estimated_genes.as_deref(), Some("33538"));
        assert_eq!(meta.estimated_cells.as_deref(), Some("1222"));
    }

    #[test]
    fn test_inspect_gzipped_mtx_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("matrix.mtx.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder
            .write_all(b"%%MatrixMarket matrix coordinate integer general\n1000 500 20000\n")
            .unwrap();
        encoder.finish().unwrap();

        let inspector = FileInspector::new(dir.path());
        let meta = inspector.generate_metadata("matrix.mtx.gz").unwrap();
        assert_eq!(meta.estimated_genes.as_deref(), Some("1000"));
        assert_eq!(meta.estimated_cells.as_deref(), Some("500"));
    }

    #[test]
    fn test_inspect_tenx_directory() {
        let dir = TempDir::new().unwrap();
        let tenx = dir.path().join("sample_filtered");
        std::fs::create_dir(&tenx).unwrap();
        std::fs::write(tenx.join("matrix.mtx.gz"), b"").unwrap();
        std::fs::write(tenx.join("barcodes.tsv.gz"), b"").unwrap();

        let inspector = FileInspector::new(dir.path());
        let meta = inspector.generate_metadata("sample_filtered").unwrap();
        assert!(meta.is_directory);
        assert_eq!(meta.file_type, FileKind::TenxDirectory);
        assert!(meta.files.iter().any(|f| f == "matrix.mtx.gz"));
    }

    #[test]
    fn test_sidecar_roundtrip() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("counts.csv"), "gene,a,b,c\n").unwrap();

        let inspector = FileInspector::new(dir.path());
        let meta = inspector.generate_metadata("counts.csv").unwrap();
        assert_eq!(meta.estimated_genes.as_deref(), Some("4"));

        let loaded = inspector.get_metadata("counts.csv").unwrap();
        assert_eq!(loaded.filename, meta.filename);
        assert_eq!(loaded.file_type, FileKind::Csv);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let inspector = FileInspector::new(dir.path());
        assert!(inspector.generate_metadata("nope.h5ad").is_err());
    }

    #[test]
    fn test_inspection_report_summary_mentions_shape() {
        let report = InspectionReport {
            n_obs: 5000,
            n_vars: 30000,
            max_value: Some(1000.0),
            is_normalized: false,
            ..Default::default()
        };
        let summary = report.summary();
        assert!(summary.contains("5000"));
        assert!(summary.contains("30000"));
        assert!(summary.contains("Is normalized: false"));
    }
}
