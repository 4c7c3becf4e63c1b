pub mod ask;
pub mod configure;
pub mod datasets;
pub mod inspect;
pub mod plan;
pub mod submit;

use crate::agents::UploadedFile;
use std::path::Path;

/// Attached files become name/path pairs for the agents
pub fn to_uploaded_files(paths: &[std::path::PathBuf]) -> Vec<UploadedFile> {
    paths
        .iter()
        .map(|p| {
            let name = p
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            UploadedFile::new(name, p.display().to_string())
        })
        .collect()
}

/// Warn (but do not fail) about attachments that do not exist yet
pub fn warn_missing(paths: &[std::path::PathBuf]) {
    use crate::utils::output::OutputStyle;
    for path in paths {
        if !Path::new(path).exists() {
            println!(
                "⚠️  {}",
                OutputStyle::warning(&format!("File does not exist: {}", path.display()))
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_to_uploaded_files_keeps_name_and_path() {
        let files = to_uploaded_files(&[PathBuf::from("/uploads/sample.h5ad")]);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "sample.h5ad");
        assert_eq!(files[0].path, "/uploads/sample.h5ad");
    }
}
