//! Manifest ("info") files recording where a run put its classes.
//!
//! Format, one directive per line:
//!
//! ```text
//! // comment
//! c++-namespace=<namespace-path>
//! c++-header-dir-prefix=<include-prefix>
//! classes:
//!   <ClassName>
//! ```
//!
//! Assignments apply to every class listed after them in the same file.

use super::ClassInfo;
use crate::error::{GenError, Result};
use log::{debug, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Manifest file name looked up in every search directory
pub const MANIFEST_FILE_NAME: &str = "dalgen.info";

const NAMESPACE_KEY: &str = "c++-namespace=";
const PREFIX_KEY: &str = "c++-header-dir-prefix=";
const CLASSES_KEY: &str = "classes:";

/// One class listed by a manifest, with the location in effect where it was listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub class: String,
    pub info: ClassInfo,
}

/// Parsed manifest: listed classes in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Parse manifest text. Lines that match no directive are logged and skipped.
    pub fn parse(text: &str) -> Self {
        let mut namespace = String::new();
        let mut include_prefix = String::new();
        let mut in_classes = false;
        let mut entries = Vec::new();

        for line in text.lines() {
            if line.contains("//") {
                debug!(" - skip comment \"{line}\"");
            } else if line.contains(CLASSES_KEY) {
                in_classes = true;
            } else if let Some(idx) = line.find(NAMESPACE_KEY) {
                namespace = line[idx + NAMESPACE_KEY.len()..].trim_end().to_string();
            } else if let Some(idx) = line.find(PREFIX_KEY) {
                include_prefix = line[idx + PREFIX_KEY.len()..].trim_end().to_string();
            } else if in_classes {
                let class = line.trim();
                if !class.is_empty() {
                    entries.push(ManifestEntry {
                        class: class.to_string(),
                        info: ClassInfo::new(namespace.clone(), include_prefix.clone()),
                    });
                }
            } else if !line.trim().is_empty() {
                warn!("Failed to parse manifest line \"{line}\"");
            }
        }

        Self { entries }
    }

    /// Read the manifest at `path`.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Io`] if the file exists but cannot be read.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(Self::parse(&text))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GenError::io(path, e)),
        }
    }

    /// Render the manifest for one run. Classes are written in the order given.
    pub fn render<'a>(
        namespace: &str,
        include_prefix: &str,
        classes: impl IntoIterator<Item = &'a str>,
    ) -> String {
        let mut output = String::new();
        output.push_str("// the file is generated by dalgen\n");
        output.push_str("// *** do not modify the file ***\n");
        output.push_str(&format!("{NAMESPACE_KEY}{namespace}\n"));
        output.push_str(&format!("{PREFIX_KEY}{include_prefix}\n"));
        output.push_str(CLASSES_KEY);
        output.push('\n');
        for class in classes {
            output.push_str(&format!("  {class}\n"));
        }
        output
    }
}
