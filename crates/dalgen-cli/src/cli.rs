use std::path::PathBuf;

use clap::Parser;
use dalgen::{GeneratorConfig, UserOverride};

#[derive(Parser, Debug)]
#[command(name = "dalgen")]
#[command(about = "Generate C++ data-access classes from a class schema")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
    /// Classes to generate (default: every class defined by the schema files)
    #[arg(short = 'c', long, num_args = 1..)]
    pub classes: Vec<String>,

    /// Schema files to load
    #[arg(short = 's', long, num_args = 1.., required = true)]
    pub schema_files: Vec<PathBuf>,

    /// Directory for the generated units
    #[arg(short = 'd', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// C++ namespace of the generated classes
    #[arg(short = 'n', long, default_value = "")]
    pub namespace: String,

    /// Include-path prefix of the generated headers
    #[arg(short = 'i', long, default_value = "")]
    pub include_prefix: String,

    /// Directories searched for manifests of earlier runs, in order
    #[arg(short = 'I', long, num_args = 1..)]
    pub search_dirs: Vec<PathBuf>,

    /// External classes as [namespace::]class[@include-prefix]
    #[arg(short = 'D', long = "user-defined-classes", num_args = 1..)]
    pub user_classes: Vec<UserOverride>,

    /// Manifest written by this run (relative paths are taken from the working directory)
    #[arg(short = 'f', long = "info-file", alias = "info-file-name", default_value = dalgen::resolver::MANIFEST_FILE_NAME)]
    pub info_file: PathBuf,

    /// Do not generate the dump program
    #[arg(long)]
    pub no_dump: bool,

    /// Render classes in parallel on N threads
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Print resolver and configuration details
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Generator configuration described by the arguments.
    pub fn into_config(self) -> GeneratorConfig {
        let mut config = GeneratorConfig {
            classes: self.classes,
            schema_files: self.schema_files,
            output_dir: self.output_dir,
            namespace: self.namespace,
            include_prefix: self.include_prefix,
            search_dirs: self.search_dirs,
            user_overrides: self.user_classes,
            manifest_path: self.info_file,
            generate_dump: !self.no_dump,
            ..GeneratorConfig::default()
        };
        if self.jobs.is_some() {
            config = config.with_parallel(self.jobs);
        }
        config
    }
}
