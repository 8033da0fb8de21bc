use super::types::{AttributeKind, Format, HighCardinality, LowCardinality};
use serde::{Deserialize, Serialize};

/// Languages whose method implementations the emitter consumes
const CPP_LANGUAGES: [&str; 2] = ["c++", "C++"];

/// Typed scalar or multi-valued field of a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name as written in the schema
    pub name: String,

    /// Scalar kind
    #[serde(rename = "type")]
    pub kind: AttributeKind,

    /// Holds a list of values instead of one
    #[serde(default)]
    pub multi_value: bool,

    /// Display format for integer values
    #[serde(default)]
    pub format: Format,

    /// Comma-separated enumeration literals (enum kind only)
    #[serde(default)]
    pub range: String,

    #[serde(default)]
    pub description: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            multi_value: false,
            format: Format::Dec,
            range: String::new(),
            description: String::new(),
        }
    }

    pub fn multi_value(mut self) -> Self {
        self.multi_value = true;
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Enumeration literals in declaration order, empty entries dropped.
    pub fn enum_literals(&self) -> Vec<&str> {
        self.range
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect()
    }
}

/// Typed reference from one class to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship name
    pub name: String,

    /// Target class name
    #[serde(rename = "class")]
    pub target: String,

    #[serde(default)]
    pub low: LowCardinality,

    #[serde(default)]
    pub high: HighCardinality,

    /// Owning (composite) relationship
    #[serde(default)]
    pub composite: bool,

    #[serde(default)]
    pub description: String,
}

impl Relationship {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            low: LowCardinality::Zero,
            high: HighCardinality::One,
            composite: false,
            description: String::new(),
        }
    }

    pub fn with_cardinality(mut self, low: LowCardinality, high: HighCardinality) -> Self {
        self.low = low;
        self.high = high;
        self
    }

    pub fn composite(mut self) -> Self {
        self.composite = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether the relationship holds a list of objects.
    pub fn is_many(&self) -> bool {
        self.high == HighCardinality::Many
    }
}

/// Language-specific implementation of a method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodImplementation {
    /// Language tag, e.g. "c++"
    pub language: String,

    /// Declaration text as it appears in the class body
    pub prototype: String,

    /// Body text, possibly carrying extension markers
    #[serde(default)]
    pub body: String,
}

impl MethodImplementation {
    pub fn new(
        language: impl Into<String>,
        prototype: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            prototype: prototype.into(),
            body: body.into(),
        }
    }

    /// Shortcut for a C++ implementation.
    pub fn cpp(prototype: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new("c++", prototype, body)
    }
}

/// Method declared on a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub implementations: Vec<MethodImplementation>,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            implementations: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_implementation(mut self, implementation: MethodImplementation) -> Self {
        self.implementations.push(implementation);
        self
    }

    /// The C++ implementation, if one with a non-empty prototype exists.
    pub fn cpp_implementation(&self) -> Option<&MethodImplementation> {
        CPP_LANGUAGES.iter().find_map(|language| {
            self.implementations
                .iter()
                .find(|mi| mi.language == *language && !mi.prototype.trim().is_empty())
        })
    }
}

/// Class definition from the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaClass {
    /// Class name
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Direct superclass names, in declaration order
    #[serde(default)]
    pub superclasses: Vec<String>,

    /// Direct attributes, in declaration order
    #[serde(default)]
    pub attributes: Vec<Attribute>,

    /// Direct relationships, in declaration order
    #[serde(default)]
    pub relationships: Vec<Relationship>,

    /// Direct methods, in declaration order
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl SchemaClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            superclasses: Vec::new(),
            attributes: Vec::new(),
            relationships: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclasses.push(superclass.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Methods that carry a C++ implementation, paired with it.
    pub fn cpp_methods(&self) -> impl Iterator<Item = (&Method, &MethodImplementation)> {
        self.methods
            .iter()
            .filter_map(|m| m.cpp_implementation().map(|mi| (m, mi)))
    }

    /// Root classes derive from the runtime base type directly.
    pub fn is_root(&self) -> bool {
        self.superclasses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpp_implementation_requires_prototype() {
        let method = Method::new("area")
            .with_implementation(MethodImplementation::new("java", "double area()", ""))
            .with_implementation(MethodImplementation::cpp("  ", "return 0;"));
        assert!(method.cpp_implementation().is_none());

        let method = method.with_implementation(MethodImplementation::new(
            "C++",
            "double area() const",
            "return 1.0;",
        ));
        let mi = method.cpp_implementation().unwrap();
        assert_eq!(mi.prototype, "double area() const");
    }

    #[test]
    fn test_lowercase_language_preferred() {
        let method = Method::new("f")
            .with_implementation(MethodImplementation::new("C++", "void upper()", ""))
            .with_implementation(MethodImplementation::new("c++", "void lower()", ""));
        assert_eq!(method.cpp_implementation().unwrap().prototype, "void lower()");
    }

    #[test]
    fn test_enum_literals() {
        let attr = Attribute::new("state", AttributeKind::Enum).with_range("On, Off,,Standby");
        assert_eq!(attr.enum_literals(), vec!["On", "Off", "Standby"]);
    }

    #[test]
    fn test_class_builder() {
        let class = SchemaClass::new("Sensor")
            .with_superclass("Device")
            .with_attribute(Attribute::new("tags", AttributeKind::String).multi_value())
            .with_relationship(
                Relationship::new("rack", "Rack")
                    .with_cardinality(LowCardinality::One, HighCardinality::One),
            );

        assert!(!class.is_root());
        assert_eq!(class.attributes.len(), 1);
        assert!(class.attributes[0].multi_value);
        assert!(!class.relationships[0].is_many());
        assert_eq!(class.cpp_methods().count(), 0);
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{
            "name": "Rack",
            "attributes": [{"name": "slots", "type": "u16"}],
            "relationships": [{"name": "sensors", "class": "Sensor", "high": "many"}]
        }"#;
        let class: SchemaClass = serde_json::from_str(json).unwrap();
        assert!(class.is_root());
        assert_eq!(class.attributes[0].format, Format::Dec);
        assert!(!class.attributes[0].multi_value);
        assert_eq!(class.relationships[0].low, LowCardinality::Zero);
        assert!(class.relationships[0].is_many());
    }
}
