//! View rendered into `comment.html`.

use super::SdkRepositoryRecord;
use crate::templates::ArtifactLink;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub specification_url: String,
    pub specification_number: u64,
    pub iteration: u32,
    pub sdk_repositories: Vec<SdkRepositoryView>,
}

#[derive(Debug, Serialize)]
pub struct SdkRepositoryView {
    pub main_repository: String,
    pub language: String,
    pub status: &'static str,
    pub packages: Vec<PackageView>,
}

#[derive(Debug, Serialize)]
pub struct PackageView {
    pub name: String,
    pub status: &'static str,
    pub pull_request_url: Option<String>,
    pub instructions_url: Option<String>,
    pub artifacts: Vec<ArtifactLink>,
}

impl CommentView {
    pub fn new(
        specification_url: &str,
        specification_number: u64,
        iteration: u32,
        records: &[SdkRepositoryRecord],
    ) -> Self {
        let sdk_repositories = records
            .iter()
            .map(|record| SdkRepositoryView {
                main_repository: record.topology.main_repository.full_name(),
                language: record.language_name.clone(),
                status: record.status.as_str(),
                packages: record
                    .packages
                    .iter()
                    .map(|package| PackageView {
                        name: package.name.clone(),
                        status: package.status.as_str(),
                        pull_request_url: package.generation_pull_request_url.clone(),
                        instructions_url: package.instructions_url.clone(),
                        artifacts: package.artifacts.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            specification_url: specification_url.to_string(),
            specification_number,
            iteration,
            sdk_repositories,
        }
    }
}
