//! In-memory schema model: classes with attributes, relationships, superclasses and methods.
//!
//! A [`Schema`] is built once from one or more JSON schema files and is read-only afterwards.
//! Classes are kept in name order so every walk over the model is deterministic.

pub mod class;
pub mod types;

pub use class::{Attribute, Method, MethodImplementation, Relationship, SchemaClass};
pub use types::{AttributeKind, Format, HighCardinality, LowCardinality};

use crate::error::{GenError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk layout of one schema file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    #[serde(default)]
    pub classes: Vec<SchemaClass>,
}

/// The full class graph for one run.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    classes: BTreeMap<String, SchemaClass>,
    // Schema file each class was loaded from (absent for classes added in code)
    origins: BTreeMap<String, PathBuf>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from classes defined in code.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Schema`] if a class name appears twice.
    pub fn from_classes(classes: impl IntoIterator<Item = SchemaClass>) -> Result<Self> {
        let mut schema = Self::new();
        for class in classes {
            schema.insert(class, None)?;
        }
        Ok(schema)
    }

    /// Load and merge schema files in order.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Io`] for unreadable files and [`GenError::Schema`] for malformed
    /// files or classes defined more than once.
    pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut schema = Self::new();
        for path in paths {
            schema.load_file(path.as_ref())?;
        }
        info!(
            "Loaded {} classes from {} schema files",
            schema.classes.len(),
            paths.len()
        );
        Ok(schema)
    }

    /// Load one schema file into this schema.
    ///
    /// # Errors
    ///
    /// Same as [`Schema::load_files`].
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        debug!("Loading schema file {}", path.display());
        let text = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        let file: SchemaFile = serde_json::from_str(&text)
            .map_err(|e| GenError::schema(path, "failed to parse schema file", Some(e)))?;

        for class in file.classes {
            self.insert(class, Some(path.to_path_buf()))?;
        }
        Ok(())
    }

    fn insert(&mut self, class: SchemaClass, origin: Option<PathBuf>) -> Result<()> {
        if self.classes.contains_key(&class.name) {
            let path = origin.clone().unwrap_or_default();
            return Err(GenError::schema(
                path,
                format!("class \"{}\" is defined more than once", class.name),
                None::<std::io::Error>,
            ));
        }
        if let Some(origin) = origin {
            self.origins.insert(class.name.clone(), origin);
        }
        self.classes.insert(class.name.clone(), class);
        Ok(())
    }

    /// Look up a class by name.
    pub fn find_class(&self, name: &str) -> Option<&SchemaClass> {
        self.classes.get(name)
    }

    /// Whether the schema defines the class.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// All classes in name order.
    pub fn classes(&self) -> impl Iterator<Item = &SchemaClass> {
        self.classes.values()
    }

    /// All class names in name order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Names of classes loaded from any of the given files, in name order.
    pub fn classes_from_files<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<String> {
        self.origins
            .iter()
            .filter(|(_, origin)| paths.iter().any(|p| p.as_ref() == origin.as_path()))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Transitive superclass closure of a class.
    ///
    /// Unknown superclass names are included as written but not expanded; cycles terminate.
    pub fn all_superclasses(&self, name: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<&str> = match self.classes.get(name) {
            Some(class) => class.superclasses.iter().map(String::as_str).collect(),
            None => return seen,
        };

        while let Some(current) = stack.pop() {
            if !seen.insert(current.to_string()) {
                continue;
            }
            if let Some(class) = self.classes.get(current) {
                stack.extend(class.superclasses.iter().map(String::as_str));
            }
        }

        seen
    }

    /// Whether `ancestor` is a direct or indirect superclass of `class`.
    pub fn has_superclass(&self, class: &str, ancestor: &str) -> bool {
        self.all_superclasses(class).contains(ancestor)
    }
}
