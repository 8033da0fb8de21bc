//! Generator configuration.

use crate::error::{GenError, Result};
use crate::resolver::UserOverride;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Names of the runtime collaborators the generated code calls into.
///
/// The emitter never spells these out itself; every reference to the object store, the
/// registry, the factory or the logging macro goes through this value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeContract {
    /// C++ namespace of the runtime types (`DalObject`, `DalFactory`, `Configuration`, ...)
    pub namespace: String,

    /// Include directory of the runtime headers
    pub header_dir: String,

    /// Header providing the debug-log macro
    pub logging_header: String,

    /// Debug-log statement prefix used by generated `init`
    pub debug_log: String,
}

impl Default for RuntimeContract {
    fn default() -> Self {
        Self {
            namespace: "dal".to_string(),
            header_dir: "dal".to_string(),
            logging_header: "logging/Logging.hpp".to_string(),
            debug_log: "TLOG_DEBUG(5)".to_string(),
        }
    }
}

impl RuntimeContract {
    /// Qualified name of a runtime type.
    pub fn qualify(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", self.namespace, name)
        }
    }

    /// Include path of a runtime header.
    pub fn header(&self, file: &str) -> String {
        if self.header_dir.is_empty() {
            file.to_string()
        } else {
            format!("{}/{}", self.header_dir, file)
        }
    }
}

/// Configuration for one generator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Classes to generate (empty = every class defined by `schema_files`)
    pub classes: Vec<String>,

    /// Schema files to load
    pub schema_files: Vec<PathBuf>,

    /// Directory receiving the generated units
    pub output_dir: PathBuf,

    /// C++ namespace of the generated classes (`a::b` for nested namespaces)
    pub namespace: String,

    /// Include-path prefix of the generated headers
    pub include_prefix: String,

    /// Directories searched for manifests of earlier runs, in order
    pub search_dirs: Vec<PathBuf>,

    /// Explicit locations of external classes
    pub user_overrides: Vec<UserOverride>,

    /// Manifest written by this run (relative paths are taken from the working directory)
    pub manifest_path: PathBuf,

    /// Emit the dump program next to the classes
    pub generate_dump: bool,

    /// Render units in parallel
    pub parallel: bool,

    /// Number of threads for parallel rendering (None = use default)
    pub num_threads: Option<usize>,

    /// Runtime the generated code targets
    pub runtime: RuntimeContract,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
            schema_files: Vec::new(),
            output_dir: PathBuf::from("."),
            namespace: String::new(),
            include_prefix: String::new(),
            search_dirs: Vec::new(),
            user_overrides: Vec::new(),
            manifest_path: PathBuf::from(crate::resolver::MANIFEST_FILE_NAME),
            generate_dump: true,
            parallel: false,
            num_threads: None,
            runtime: RuntimeContract::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_files.push(path.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_include_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.include_prefix = prefix.into();
        self
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    pub fn with_user_override(mut self, user_override: UserOverride) -> Self {
        self.user_overrides.push(user_override);
        self
    }

    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    pub fn with_dump(mut self, generate_dump: bool) -> Self {
        self.generate_dump = generate_dump;
        self
    }

    pub fn with_parallel(mut self, num_threads: Option<usize>) -> Self {
        self.parallel = true;
        self.num_threads = num_threads;
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeContract) -> Self {
        self.runtime = runtime;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.schema_files.is_empty() {
            return Err(GenError::InvalidConfig(
                "at least one schema file is required".to_string(),
            ));
        }

        if let Some(threads) = self.num_threads {
            if threads == 0 {
                return Err(GenError::InvalidConfig(
                    "num_threads must be greater than 0".to_string(),
                ));
            }
        }

        if self.manifest_path.as_os_str().is_empty() {
            return Err(GenError::InvalidConfig(
                "manifest path cannot be empty".to_string(),
            ));
        }

        if let Some(bad) = self.user_overrides.iter().find(|o| o.class.is_empty()) {
            return Err(GenError::InvalidConfig(format!(
                "user-defined class \"{bad}\" has no class name"
            )));
        }

        if self.namespace.split("::").any(|part| part.is_empty()) && !self.namespace.is_empty() {
            return Err(GenError::InvalidConfig(format!(
                "namespace \"{}\" has an empty component",
                self.namespace
            )));
        }

        Ok(())
    }

    /// Where the manifest of this run is written: `manifest_path` as given, relative paths
    /// taken from the working directory and never from `output_dir`.
    pub fn manifest_output_path(&self) -> &Path {
        &self.manifest_path
    }
}
