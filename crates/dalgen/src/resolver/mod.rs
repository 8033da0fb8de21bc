//! Cross-run class resolution.
//!
//! Classes referenced by the generation set but emitted by some other run are located
//! through explicit user overrides first, then through the manifests that earlier runs left
//! in the search directories. Every answer is cached in a [`ClassInfoMap`] on first
//! discovery and never changes afterwards.

pub mod manifest;
pub mod user_override;

pub use manifest::{Manifest, ManifestEntry, MANIFEST_FILE_NAME};
pub use user_override::UserOverride;

use crate::error::Result;
use crate::schema::Schema;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Location of an external class: namespace and include-path prefix of its header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub namespace: String,
    pub include_prefix: String,
}

impl ClassInfo {
    pub fn new(namespace: impl Into<String>, include_prefix: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            include_prefix: include_prefix.into(),
        }
    }
}

/// Class name to location map. Entries are insert-once, first writer wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfoMap {
    entries: BTreeMap<String, ClassInfo>,
}

impl ClassInfoMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the class already has an entry. Returns whether the entry was added.
    pub fn insert_if_absent(&mut self, class: impl Into<String>, info: ClassInfo) -> bool {
        match self.entries.entry(class.into()) {
            Entry::Vacant(slot) => {
                slot.insert(info);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, class: &str) -> Option<&ClassInfo> {
        self.entries.get(class)
    }

    pub fn contains(&self, class: &str) -> bool {
        self.entries.contains_key(class)
    }

    /// Entries in class-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClassInfo)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lazily resolves external classes against user overrides and search-directory manifests.
///
/// Search directories are scanned in order and each one at most once. Opening a manifest
/// records every schema class it lists, not just the one asked for, so the map always
/// reflects the first listing in directory order.
pub struct ClassResolver<'a> {
    schema: &'a Schema,
    search_dirs: Vec<PathBuf>,
    overrides: Vec<UserOverride>,
    generated: BTreeSet<String>,
    map: ClassInfoMap,
    next_dir: usize,
}

impl<'a> ClassResolver<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            search_dirs: Vec::new(),
            overrides: Vec::new(),
            generated: BTreeSet::new(),
            map: ClassInfoMap::new(),
            next_dir: 0,
        }
    }

    pub fn with_search_dirs(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_dirs.extend(dirs);
        self
    }

    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = UserOverride>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    /// Classes of the current run. Manifests never assign them a location.
    pub fn with_generated<S: Into<String>>(mut self, classes: impl IntoIterator<Item = S>) -> Self {
        self.generated.extend(classes.into_iter().map(Into::into));
        self
    }

    /// Resolve the location of `class`.
    ///
    /// Returns `Ok(None)` when no override names the class and no manifest in any search
    /// directory lists it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GenError::Io`] if a manifest exists but cannot be read.
    pub fn resolve(&mut self, class: &str) -> Result<Option<&ClassInfo>> {
        if !self.map.contains(class) && !self.resolve_uncached(class)? {
            return Ok(None);
        }
        Ok(self.map.get(class))
    }

    fn resolve_uncached(&mut self, class: &str) -> Result<bool> {
        if let Some(o) = self.overrides.iter().find(|o| o.class == class) {
            debug!(
                " * class \"{}\" is defined by user in namespace \"{}\" with prefix \"{}\"",
                class, o.namespace, o.include_prefix
            );
            let info = ClassInfo::new(o.namespace.clone(), o.include_prefix.clone());
            self.map.insert_if_absent(class, info);
            return Ok(true);
        }

        while self.next_dir < self.search_dirs.len() {
            let dir = self.search_dirs[self.next_dir].clone();
            self.next_dir += 1;
            self.scan_manifest(&dir)?;
            if self.map.contains(class) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn scan_manifest(&mut self, dir: &std::path::Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let Some(manifest) = Manifest::read(&path)? else {
            debug!(" * no manifest in \"{}\"", dir.display());
            return Ok(());
        };

        debug!(" * reading manifest \"{}\"", path.display());
        for entry in manifest.entries {
            if !self.schema.contains(&entry.class) {
                debug!("   - skip class \"{}\" unknown to the schema", entry.class);
                continue;
            }
            if self.generated.contains(&entry.class)
                || self.overrides.iter().any(|o| o.class == entry.class)
            {
                continue;
            }
            if self.map.contains(&entry.class) {
                continue;
            }
            debug!(
                "   - class \"{}\" in namespace \"{}\" with prefix \"{}\"",
                entry.class, entry.info.namespace, entry.info.include_prefix
            );
            self.map.insert_if_absent(entry.class, entry.info);
        }
        Ok(())
    }

    /// Resolved entries so far.
    pub fn map(&self) -> &ClassInfoMap {
        &self.map
    }

    /// Finish resolution and hand over the map, read-only from here on.
    pub fn into_map(self) -> ClassInfoMap {
        self.map
    }
}
