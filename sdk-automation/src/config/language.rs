//! Per-language generation settings.
//!
//! A built-in table covers the supported SDK languages. Entries from a
//! `languages.toml` file replace built-in entries with the same name or are
//! appended when new.

use crate::repository::RepositoryName;
use serde::Deserialize;

/// How changed files are grouped into packages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum PackagePartition {
    /// The first `depth` path segments form the package folder.
    FixedDepth {
        /// Number of leading path segments.
        depth: usize,
    },

    /// The nearest ancestor folder containing `file` is the package folder.
    PackageRootFile {
        /// File name marking a package root (e.g. `setup.py`).
        file: String,
    },

    /// All changed files form one package rooted at their deepest common folder.
    DeepestCommonAncestor,
}

/// Generation settings for one SDK language.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LanguageConfiguration {
    /// Display name, e.g. `Python`.
    pub name: String,

    /// Alternative names matched against repository names.
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Package partition strategy.
    pub partition: PackagePartition,

    /// Generator command line. Supports `$(options)`, `$(repository_folder)`
    /// and `$(readme)` along with any generator option.
    #[serde(default = "default_generation_command")]
    pub generation_command: String,

    /// Build command run per package. Supports `$(package_folder)` and `$(package_name)`.
    #[serde(default)]
    pub build_command: Option<String>,

    /// File extensions collected as build artifacts.
    #[serde(default)]
    pub artifact_extensions: Vec<String>,

    /// Generator package used when the repository configuration selects none.
    #[serde(default)]
    pub generator_package_name: Option<String>,

    /// Prefix added to package folder names to form package names.
    #[serde(default)]
    pub package_name_prefix: Option<String>,

    /// Handlebars template for installation instructions.
    #[serde(default)]
    pub instructions_template: Option<String>,
}

pub(crate) fn default_generation_command() -> String {
    "autorest $(options) $(readme)".to_string()
}

impl LanguageConfiguration {
    fn new(name: &str, aliases: &[&str], partition: PackagePartition) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|alias| (*alias).to_string()).collect(),
            partition,
            generation_command: default_generation_command(),
            build_command: None,
            artifact_extensions: Vec::new(),
            generator_package_name: None,
            package_name_prefix: None,
            instructions_template: None,
        }
    }

    /// Returns true when the language name or one of its aliases appears in
    /// the repository's full name, ignoring case.
    #[must_use]
    pub fn matches_repository(&self, repository: &RepositoryName) -> bool {
        let full_name = repository.full_name().to_lowercase();
        std::iter::once(&self.name)
            .chain(self.aliases.iter())
            .any(|candidate| full_name.contains(&candidate.to_lowercase()))
    }
}

/// The set of known languages.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfiguration>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Document shape of `languages.toml`.
#[derive(Debug, Deserialize)]
pub(crate) struct LanguagesDocument {
    #[serde(default)]
    pub(crate) language: Vec<LanguageConfiguration>,
}

impl LanguageRegistry {
    /// Returns the built-in language table.
    #[must_use]
    pub fn builtin() -> Self {
        let mut python = LanguageConfiguration::new(
            "Python",
            &["py"],
            PackagePartition::PackageRootFile {
                file: "setup.py".to_string(),
            },
        );
        python.generation_command =
            "autorest $(options) --python --python-sdks-folder=$(repository_folder) $(readme)"
                .to_string();
        python.build_command =
            Some("python ./build_package.py --dest $(package_folder) $(package_name)".to_string());
        python.artifact_extensions = vec![".whl".to_string(), ".zip".to_string()];
        python.generator_package_name = Some("@autorest/python".to_string());

        let mut javascript = LanguageConfiguration::new(
            "JavaScript",
            &["js", "typescript"],
            PackagePartition::PackageRootFile {
                file: "package.json".to_string(),
            },
        );
        javascript.generation_command =
            "autorest $(options) --typescript --typescript-sdks-folder=$(repository_folder) $(readme)"
                .to_string();
        javascript.build_command = Some("npm pack $(package_folder)".to_string());
        javascript.artifact_extensions = vec![".tgz".to_string()];
        javascript.generator_package_name = Some("@autorest/typescript".to_string());

        let mut java = LanguageConfiguration::new(
            "Java",
            &[],
            PackagePartition::PackageRootFile {
                file: "pom.xml".to_string(),
            },
        );
        java.generation_command =
            "autorest $(options) --java --azure-libraries-for-java-folder=$(repository_folder) $(readme)"
                .to_string();
        java.artifact_extensions = vec![".jar".to_string()];
        java.generator_package_name = Some("@autorest/java".to_string());

        let mut dotnet = LanguageConfiguration::new(
            ".NET",
            &["net", "csharp"],
            PackagePartition::FixedDepth { depth: 2 },
        );
        dotnet.generation_command =
            "autorest $(options) --csharp --csharp-sdks-folder=$(repository_folder) $(readme)"
                .to_string();
        dotnet.artifact_extensions = vec![".nupkg".to_string()];
        dotnet.generator_package_name = Some("@autorest/csharp".to_string());

        let mut ruby = LanguageConfiguration::new(
            "Ruby",
            &["rb"],
            PackagePartition::FixedDepth { depth: 2 },
        );
        ruby.generation_command =
            "autorest $(options) --ruby --ruby-sdks-folder=$(repository_folder) $(readme)"
                .to_string();
        ruby.artifact_extensions = vec![".gem".to_string()];
        ruby.generator_package_name = Some("@autorest/ruby".to_string());

        let mut go = LanguageConfiguration::new(
            "Go",
            &["golang"],
            PackagePartition::DeepestCommonAncestor,
        );
        go.generation_command =
            "autorest $(options) --go --go-sdk-folder=$(repository_folder) $(readme)".to_string();
        go.generator_package_name = Some("@autorest/go".to_string());

        // JavaScript precedes Java so `azure-sdk-for-javascript` is not taken for Java.
        Self {
            languages: vec![python, javascript, java, dotnet, ruby, go],
        }
    }

    /// Applies overrides on top of the current table.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Vec<LanguageConfiguration>) -> Self {
        for language in overrides {
            match self
                .languages
                .iter_mut()
                .find(|existing| existing.name.eq_ignore_ascii_case(&language.name))
            {
                Some(existing) => *existing = language,
                None => self.languages.push(language),
            }
        }
        self
    }

    /// Finds the language for a repository.
    #[must_use]
    pub fn find_for_repository(
        &self,
        repository: &RepositoryName,
    ) -> Option<&LanguageConfiguration> {
        self.languages
            .iter()
            .find(|language| language.matches_repository(repository))
    }

    /// Finds a language by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LanguageConfiguration> {
        self.languages
            .iter()
            .find(|language| language.name.eq_ignore_ascii_case(name))
    }

    /// Returns every known language.
    #[must_use]
    pub fn languages(&self) -> &[LanguageConfiguration] {
        &self.languages
    }
}
