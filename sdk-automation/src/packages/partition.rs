//! Grouping of changed files into package folders.

use crate::config::PackagePartition;
use std::path::Path;

/// A package folder and the changed files inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFolder {
    /// Folder relative to the clone root, `/`-separated.
    pub relative_folder: String,
    /// Changed files inside the folder, relative to the clone root.
    pub files: Vec<String>,
}

/// Partitions changed files into package folders, in order of first appearance.
///
/// The clone root itself is never a package; files that do not fall inside
/// a package folder are left out.
pub async fn find_package_folders(
    changed_files: &[String],
    repository_folder: &Path,
    partition: &PackagePartition,
) -> Vec<PackageFolder> {
    let mut folders: Vec<PackageFolder> = Vec::new();

    match partition {
        PackagePartition::DeepestCommonAncestor => {
            if let Some(root) = deepest_common_folder(changed_files) {
                folders.push(PackageFolder {
                    relative_folder: root,
                    files: changed_files.to_vec(),
                });
            }
        }
        PackagePartition::FixedDepth { depth } => {
            for file in changed_files {
                if let Some(folder) = fixed_depth_folder(file, *depth) {
                    add_file(&mut folders, folder, file);
                }
            }
        }
        PackagePartition::PackageRootFile { file: marker } => {
            for file in changed_files {
                if let Some(folder) = nearest_root_folder(file, repository_folder, marker).await {
                    add_file(&mut folders, folder, file);
                }
            }
        }
    }

    folders
}

fn add_file(folders: &mut Vec<PackageFolder>, folder: String, file: &str) {
    match folders.iter_mut().find(|f| f.relative_folder == folder) {
        Some(existing) => existing.files.push(file.to_string()),
        None => folders.push(PackageFolder {
            relative_folder: folder,
            files: vec![file.to_string()],
        }),
    }
}

fn parent_segments(file: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = file.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop();
    segments
}

fn fixed_depth_folder(file: &str, depth: usize) -> Option<String> {
    let parents = parent_segments(file);
    if depth == 0 || parents.len() < depth {
        return None;
    }
    Some(parents[..depth].join("/"))
}

async fn nearest_root_folder(file: &str, repository_folder: &Path, marker: &str) -> Option<String> {
    let parents = parent_segments(file);
    for len in (1..=parents.len()).rev() {
        let folder = parents[..len].join("/");
        let candidate = repository_folder.join(&folder).join(marker);
        if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return Some(folder);
        }
    }
    None
}

fn deepest_common_folder(files: &[String]) -> Option<String> {
    let mut iter = files.iter();
    let mut common = parent_segments(iter.next()?);
    for file in iter {
        let parents = parent_segments(file);
        let shared = common
            .iter()
            .zip(parents.iter())
            .take_while(|(a, b)| a == b)
            .count();
        common.truncate(shared);
    }
    if common.is_empty() {
        None
    } else {
        Some(common.join("/"))
    }
}
