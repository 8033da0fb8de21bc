//! Source emission: one header unit and one body unit per generated class.
//!
//! The [`Emitter`] reads the schema and a frozen [`ClassInfoMap`]; it performs no I/O and
//! keeps no state between classes, so units can be rendered in any order or in parallel.

pub mod body;
pub mod dump;
pub mod header;
pub mod namespace;
pub mod prototype;

pub use namespace::NamespaceTree;
pub use prototype::Prototype;

use crate::config::RuntimeContract;
use crate::resolver::ClassInfoMap;
use crate::sanitize::alnum_name;
use crate::schema::{Schema, SchemaClass};
use log::trace;
use serde::{Deserialize, Serialize};

/// Rendered sources of one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedUnit {
    /// Schema class name
    pub class: String,
    /// Sanitized name, used for file names and the C++ class
    pub file_stem: String,
    /// Header unit text
    pub header: String,
    /// Body unit text
    pub body: String,
}

impl GeneratedUnit {
    pub fn header_file_name(&self) -> String {
        format!("{}.hpp", self.file_stem)
    }

    pub fn body_file_name(&self) -> String {
        format!("{}.cpp", self.file_stem)
    }
}

/// Renders header and body units against a resolved class map.
#[derive(Debug, Clone, Copy)]
pub struct Emitter<'a> {
    schema: &'a Schema,
    classes: &'a ClassInfoMap,
    namespace: &'a str,
    include_prefix: &'a str,
    runtime: &'a RuntimeContract,
}

impl<'a> Emitter<'a> {
    pub fn new(
        schema: &'a Schema,
        classes: &'a ClassInfoMap,
        namespace: &'a str,
        include_prefix: &'a str,
        runtime: &'a RuntimeContract,
    ) -> Self {
        Self {
            schema,
            classes,
            namespace,
            include_prefix,
            runtime,
        }
    }

    /// Render both units of a class.
    pub fn emit_class(&self, class: &SchemaClass) -> GeneratedUnit {
        trace!("Rendering class {}", class.name);
        GeneratedUnit {
            class: class.name.clone(),
            file_stem: alnum_name(&class.name),
            header: self.render_header(class),
            body: self.render_body(class),
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn runtime(&self) -> &'a RuntimeContract {
        self.runtime
    }

    pub fn namespace(&self) -> &'a str {
        self.namespace
    }

    pub fn include_prefix(&self) -> &'a str {
        self.include_prefix
    }

    /// Qualified sanitized class name, taking the namespace from the class map or this run.
    pub fn full_class_name(&self, class: &str) -> String {
        self.class_name_in(class, self.namespace)
    }

    /// Like [`Emitter::full_class_name`], with `default_namespace` for classes of this run.
    pub fn class_name_in(&self, class: &str, default_namespace: &str) -> String {
        let namespace = self
            .classes
            .get(class)
            .map_or(default_namespace, |info| info.namespace.as_str());
        if namespace.is_empty() {
            alnum_name(class)
        } else {
            format!("{namespace}::{}", alnum_name(class))
        }
    }

    /// Namespace a class lives in.
    pub fn class_namespace(&self, class: &str) -> &'a str {
        self.classes
            .get(class)
            .map_or(self.namespace, |info| info.namespace.as_str())
    }

    /// Header include path of a class, without the `.hpp` extension.
    pub fn include_path(&self, class: &str) -> String {
        let prefix = match self.classes.get(class) {
            Some(info) => info.include_prefix.as_str(),
            None => self.include_prefix,
        };
        if prefix.is_empty() {
            alnum_name(class)
        } else {
            format!("{prefix}/{}", alnum_name(class))
        }
    }
}

/// Two spaces per nesting level.
pub fn indent(level: usize) -> String {
    " ".repeat(level * 2)
}

/// Open one namespace block per `::` component. Returns the nesting depth.
pub fn open_namespace(output: &mut String, namespace: &str) -> usize {
    let mut level = 0;
    for token in namespace.split(':').filter(|t| !t.is_empty()) {
        output.push_str(&format!("{}namespace {token} {{\n", indent(level)));
        level += 1;
    }
    level
}

/// Close the blocks opened by [`open_namespace`].
pub fn close_namespace(output: &mut String, level: usize) {
    for depth in (0..level).rev() {
        output.push_str(&format!("{}}}\n", indent(depth)));
    }
}

/// Doc-comment block, one `*` line per non-empty text line. Empty text prints nothing.
pub fn print_description(output: &mut String, text: &str, dx: &str) {
    if text.is_empty() {
        return;
    }
    output.push_str(&format!("{dx} /**\n"));
    for line in text.split('\n').filter(|l| !l.is_empty()) {
        output.push_str(&format!("{dx}  *  {line}\n"));
    }
    output.push_str(&format!("{dx}  */\n\n"));
}

/// Each non-empty line of `text`, prefixed by `dx`.
pub fn print_indented(output: &mut String, text: &str, dx: &str) {
    for line in text.split('\n').filter(|l| !l.is_empty()) {
        output.push_str(&format!("{dx}{line}\n"));
    }
}
