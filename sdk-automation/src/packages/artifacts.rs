//! Build artifact collection and upload.

use super::PackageError;
use crate::activity_log::ActivityLog;
use crate::storage::BlobStorage;
use crate::templates::ArtifactLink;
use std::path::{Path, PathBuf};

/// Finds files below `folder` whose names end with one of `extensions`.
///
/// # Errors
///
/// Returns [`PackageError::Io`] if a folder cannot be listed.
pub async fn collect_artifacts(
    folder: &Path,
    extensions: &[String],
) -> Result<Vec<PathBuf>, PackageError> {
    let mut found = Vec::new();
    if extensions.is_empty() {
        return Ok(found);
    }

    let mut pending = vec![folder.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let io_error = |e| PackageError::Io {
            path: dir.display().to_string(),
            source: e,
        };
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(io_error(e)),
        };
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(io_error)?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                let name = entry.file_name().to_string_lossy().to_string();
                if extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
                    found.push(path);
                }
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Uploads artifacts below `prefix`, one blob per file name.
///
/// # Errors
///
/// Returns [`PackageError`] if a file cannot be read or stored.
pub async fn upload_artifacts(
    storage: &dyn BlobStorage,
    artifacts: &[PathBuf],
    prefix: &str,
    log: &ActivityLog,
) -> Result<Vec<ArtifactLink>, PackageError> {
    let mut links = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let path = format!("{prefix}/{name}");
        let url = storage.url(&path);

        log.info(format!("Uploading {} to {url}...", artifact.display()));
        let content = tokio::fs::read(artifact)
            .await
            .map_err(|e| PackageError::Io {
                path: artifact.display().to_string(),
                source: e,
            })?;
        storage.write(&path, &content).await?;
        log.info(format!("Done uploading {} to {url}.", artifact.display()));

        links.push(ArtifactLink { name, url });
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryBlobStorage;
    use tempfile::TempDir;

    #[tokio::test]
    async fn collects_matching_files_recursively() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("dist")).unwrap();
        std::fs::write(dir.path().join("dist/pkg-1.0.0.tar.gz"), "x").unwrap();
        std::fs::write(dir.path().join("pkg-1.0.0-py3-none-any.whl"), "x").unwrap();
        std::fs::write(dir.path().join("setup.py"), "x").unwrap();

        let found = collect_artifacts(
            dir.path(),
            &[".whl".to_string(), ".tar.gz".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn missing_folder_has_no_artifacts() {
        let dir = TempDir::new().unwrap();
        let found = collect_artifacts(&dir.path().join("absent"), &[".whl".to_string()])
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn uploads_and_logs() {
        let dir = TempDir::new().unwrap();
        let wheel = dir.path().join("fake-python-package.whl");
        std::fs::write(&wheel, "wheel").unwrap();
        let storage = InMemoryBlobStorage::new();
        let log = ActivityLog::new();

        let links = upload_artifacts(&storage, &[wheel.clone()], "abc/1/pkg", &log)
            .await
            .unwrap();

        assert_eq!(links[0].name, "fake-python-package.whl");
        assert_eq!(
            links[0].url,
            "https://storage.example.com/abc/1/pkg/fake-python-package.whl"
        );
        assert_eq!(
            storage.text("abc/1/pkg/fake-python-package.whl").await.as_deref(),
            Some("wheel")
        );
        assert_eq!(log.lines().len(), 2);
    }
}
