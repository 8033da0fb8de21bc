//! Generation pipeline: load, resolve, render, write.

use crate::config::GeneratorConfig;
use crate::emit::dump::dump_file_name;
use crate::emit::{Emitter, GeneratedUnit};
use crate::error::{GenError, ReferenceError, Result};
use crate::resolver::{ClassInfoMap, ClassResolver, Manifest};
use crate::schema::Schema;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Everything one run produces, rendered in memory.
#[derive(Debug, Clone)]
pub struct RenderedOutput {
    /// Units in class-name order
    pub units: Vec<GeneratedUnit>,
    /// Dump program file name and text
    pub dump: Option<(String, String)>,
    /// Manifest text for this run
    pub manifest: String,
    /// Locations of every external class found while resolving, including classes a
    /// manifest listed that nothing references
    pub class_map: ClassInfoMap,
    /// External classes the generation set references, in name order
    pub externals: BTreeSet<String>,
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generated classes, in name order
    pub classes: Vec<String>,
    /// Number of external classes the generated classes reference
    pub externals_resolved: usize,
    /// Every file written
    pub files: Vec<PathBuf>,
    /// Wall time of the run
    pub duration: Duration,
}

impl GenerationReport {
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

/// Drives one generator run.
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Load schemas, resolve, render and write every output.
    ///
    /// Nothing is written unless every reference of the generation set resolved.
    ///
    /// # Errors
    ///
    /// [`GenError::InvalidConfig`] for a rejected configuration, [`GenError::Io`] and
    /// [`GenError::Schema`] for input problems, [`GenError::Unresolved`] with every reference
    /// problem found, and [`GenError::Io`] when an output cannot be written.
    pub fn run(&self) -> Result<GenerationReport> {
        let start = Instant::now();
        let schema = self.load_schema()?;
        let output = self.render(&schema)?;
        let mut report = self.write(&output)?;
        report.duration = start.elapsed();

        info!(
            "Generated {} classes ({} external classes resolved) in {:?}",
            report.class_count(),
            report.externals_resolved,
            report.duration
        );
        Ok(report)
    }

    /// Validate the configuration and load its schema files.
    pub fn load_schema(&self) -> Result<Schema> {
        self.config.validate()?;
        Schema::load_files(&self.config.schema_files)
    }

    /// Classes this run generates, with an error for every requested class the schema lacks.
    pub fn generation_set(&self, schema: &Schema) -> Result<(BTreeSet<String>, Vec<ReferenceError>)> {
        let mut errors = Vec::new();

        if self.config.classes.is_empty() {
            debug!("No explicit classes were provided, using every class of the given schema files");
            let classes: BTreeSet<String> = schema
                .classes_from_files(&self.config.schema_files)
                .into_iter()
                .collect();
            if classes.is_empty() {
                return Err(GenError::InvalidConfig(
                    "no classes in schema files and no classes specified".to_string(),
                ));
            }
            return Ok((classes, errors));
        }

        let mut classes = BTreeSet::new();
        for name in &self.config.classes {
            if schema.contains(name) {
                classes.insert(name.clone());
            } else {
                errors.push(ReferenceError::UnknownClass { class: name.clone() });
            }
        }
        Ok((classes, errors))
    }

    /// Check every relationship and superclass edge of the generation set and resolve
    /// external classes. Reference problems are accumulated over the whole set.
    pub fn resolve(
        &self,
        schema: &Schema,
        generated: &BTreeSet<String>,
        mut errors: Vec<ReferenceError>,
    ) -> Result<ClassInfoMap> {
        let mut resolver = ClassResolver::new(schema)
            .with_search_dirs(self.config.search_dirs.iter().cloned())
            .with_overrides(self.config.user_overrides.iter().cloned())
            .with_generated(generated.iter().cloned());

        for class in generated.iter().filter_map(|name| schema.find_class(name)) {
            for relationship in &class.relationships {
                let target = &relationship.target;
                if !schema.contains(target) {
                    errors.push(ReferenceError::UnknownRelationshipTarget {
                        class: class.name.clone(),
                        relationship: relationship.name.clone(),
                        target: target.clone(),
                    });
                } else if !generated.contains(target) && resolver.resolve(target)?.is_none() {
                    errors.push(ReferenceError::UnresolvedRelationshipTarget {
                        class: class.name.clone(),
                        relationship: relationship.name.clone(),
                        target: target.clone(),
                    });
                }
            }

            for superclass in &class.superclasses {
                if !schema.contains(superclass) {
                    errors.push(ReferenceError::UnknownSuperclass {
                        class: class.name.clone(),
                        superclass: superclass.clone(),
                    });
                } else if !generated.contains(superclass) && resolver.resolve(superclass)?.is_none() {
                    errors.push(ReferenceError::UnresolvedSuperclass {
                        class: class.name.clone(),
                        superclass: superclass.clone(),
                    });
                }
            }
        }

        if !errors.is_empty() {
            return Err(GenError::Unresolved { errors });
        }
        Ok(resolver.into_map())
    }

    /// Resolve and render every output in memory, without touching the output directory.
    pub fn render(&self, schema: &Schema) -> Result<RenderedOutput> {
        let (generated, errors) = self.generation_set(schema)?;
        let class_map = self.resolve(schema, &generated, errors)?;
        let externals = referenced_externals(schema, &generated);

        let emitter = Emitter::new(
            schema,
            &class_map,
            &self.config.namespace,
            &self.config.include_prefix,
            &self.config.runtime,
        );

        let classes: Vec<String> = generated.into_iter().collect();
        info!("Rendering {} classes", classes.len());

        let units = if self.config.parallel {
            self.render_parallel(&emitter, schema, &classes)?
        } else {
            classes
                .iter()
                .filter_map(|name| schema.find_class(name))
                .map(|class| emitter.emit_class(class))
                .collect()
        };

        let dump = self.config.generate_dump.then(|| {
            (
                dump_file_name(&self.config.namespace),
                emitter.render_dump(&classes),
            )
        });

        let manifest = Manifest::render(
            &self.config.namespace,
            &self.config.include_prefix,
            classes.iter().map(String::as_str),
        );

        Ok(RenderedOutput {
            units,
            dump,
            manifest,
            class_map,
            externals,
        })
    }

    fn render_parallel(
        &self,
        emitter: &Emitter<'_>,
        schema: &Schema,
        classes: &[String],
    ) -> Result<Vec<GeneratedUnit>> {
        use rayon::prelude::*;

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(num_threads) = self.config.num_threads {
            builder = builder.num_threads(num_threads);
        }
        let pool = builder.build().map_err(|e| {
            GenError::InvalidConfig(format!("Failed to create thread pool: {e}"))
        })?;

        Ok(pool.install(|| {
            classes
                .par_iter()
                .filter_map(|name| schema.find_class(name))
                .map(|class| emitter.emit_class(class))
                .collect()
        }))
    }

    /// Write rendered output below the configured output directory.
    ///
    /// The manifest is written last, only after every unit and the dump program were
    /// written. If a write fails, the units written so far stay on disk but no manifest
    /// announces them, so later runs never resolve against a partial output.
    pub fn write(&self, output: &RenderedOutput) -> Result<GenerationReport> {
        let dir = &self.config.output_dir;
        fs::create_dir_all(dir).map_err(|e| GenError::io(dir, e))?;

        let mut report = GenerationReport {
            classes: output.units.iter().map(|u| u.class.clone()).collect(),
            externals_resolved: output.externals.len(),
            ..GenerationReport::default()
        };

        for unit in &output.units {
            report.files.push(write_file(&dir.join(unit.header_file_name()), &unit.header)?);
            report.files.push(write_file(&dir.join(unit.body_file_name()), &unit.body)?);
        }

        if let Some((name, text)) = &output.dump {
            report.files.push(write_file(&dir.join(name), text)?);
        }

        let manifest_path = self.config.manifest_output_path();
        if let Some(parent) = manifest_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| GenError::io(parent, e))?;
        }
        report.files.push(write_file(manifest_path, &output.manifest)?);
        info!("Wrote manifest {}", manifest_path.display());

        Ok(report)
    }
}

/// Relationship targets and direct superclasses of the generation set that it does not
/// generate itself.
fn referenced_externals(schema: &Schema, generated: &BTreeSet<String>) -> BTreeSet<String> {
    generated
        .iter()
        .filter_map(|name| schema.find_class(name))
        .flat_map(|class| {
            class
                .relationships
                .iter()
                .map(|r| &r.target)
                .chain(class.superclasses.iter())
        })
        .filter(|name| !generated.contains(*name))
        .cloned()
        .collect()
}

fn write_file(path: &Path, contents: &str) -> Result<PathBuf> {
    debug!("Writing {}", path.display());
    fs::write(path, contents).map_err(|e| GenError::io(path, e))?;
    Ok(path.to_path_buf())
}
