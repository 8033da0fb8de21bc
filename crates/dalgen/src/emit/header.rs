//! Header unit: class declaration with accessors and user algorithms.

use super::prototype::mentions_word;
use super::{close_namespace, indent, open_namespace, print_description, print_indented, Emitter, NamespaceTree};
use crate::extract::TextBlocks;
use crate::sanitize::{alnum_name, capitalize_name};
use crate::schema::{Attribute, AttributeKind, LowCardinality, Relationship, SchemaClass};
use std::collections::BTreeSet;

impl Emitter<'_> {
    /// Render the complete header unit of `class`.
    pub fn render_header(&self, class: &SchemaClass) -> String {
        let name = alnum_name(&class.name);
        let mut output = String::new();

        self.header_prologue(&name, &mut output);
        self.superclass_includes(class, &mut output);
        self.forward_declarations(class, &mut output);

        for (method, mi) in class.cpp_methods() {
            let prologue = TextBlocks::parse(&mi.body).header_prologue;
            if !prologue.is_empty() {
                output.push_str(&format!("  // prologue of method {}::{}()\n", class.name, method.name));
                output.push_str(prologue);
                output.push('\n');
            }
        }

        let level = open_namespace(&mut output, self.namespace());
        let dx = indent(level);

        output.push('\n');
        print_description(&mut output, &class.description, &dx);

        self.class_declaration(class, &name, &dx, &mut output);
        self.members(class, &dx, &mut output);
        self.algorithms(class, &dx, &mut output);

        output.push_str(&format!("{dx}}};\n\n"));
        output.push_str(&format!(
            "{dx}  // out stream operator\n\n\
             {dx}inline std::ostream& operator<<(std::ostream& s, const {name}& obj)\n\
             {dx}  {{\n\
             {dx}    return obj.print_object(s);\n\
             {dx}  }}\n\n\
             {dx}typedef std::vector<const {name}*>::const_iterator {name}Iterator;\n\n"
        ));

        close_namespace(&mut output, level);

        for (method, mi) in class.cpp_methods() {
            let epilogue = TextBlocks::parse(&mi.body).header_epilogue;
            if !epilogue.is_empty() {
                output.push_str(&format!("  // epilogue of method {}::{}()\n", class.name, method.name));
                output.push_str(epilogue);
                output.push('\n');
            }
        }

        output.push_str("\n#endif\n");
        output
    }

    fn header_prologue(&self, name: &str, output: &mut String) {
        let guard = format!(
            "_{}_0_{}_0_{}_H_",
            alnum_name(name),
            alnum_name(self.namespace()),
            alnum_name(self.include_prefix())
        );
        let runtime = self.runtime();

        output.push_str("// *** this file is generated by dalgen, do not modify it ***\n\n");
        output.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
        output.push_str(
            "#include <stdint.h>   // to define 64 bits types\n\
             #include <iostream>\n\
             #include <sstream>\n\
             #include <string>\n\
             #include <map>\n\
             #include <vector>\n\n",
        );
        output.push_str(&format!(
            "#include \"{}\"\n#include \"{}\"\n\n",
            runtime.header("Configuration.hpp"),
            runtime.header("DalObject.hpp")
        ));
    }

    fn superclass_includes(&self, class: &SchemaClass, output: &mut String) {
        if !class.superclasses.is_empty() {
            output.push_str("  // include files for classes used in inheritance hierarchy\n\n");
            for superclass in &class.superclasses {
                output.push_str(&format!("#include \"{}.hpp\"\n", self.include_path(superclass)));
            }
        }
        output.push('\n');
    }

    /// Classes needing a forward declaration: relationship targets and classes named in
    /// method prototypes, minus the class itself and everything it inherits from.
    pub fn forward_declared_classes(&self, class: &SchemaClass) -> BTreeSet<String> {
        let mut referenced: BTreeSet<String> = class
            .relationships
            .iter()
            .map(|r| r.target.clone())
            .collect();

        for (_, mi) in class.cpp_methods() {
            for candidate in self.schema().class_names() {
                if mentions_word(&mi.prototype, &alnum_name(candidate)) {
                    referenced.insert(candidate.to_string());
                }
            }
        }

        let inherited = self.schema().all_superclasses(&class.name);
        referenced.retain(|c| *c != class.name && !inherited.contains(c));
        referenced
    }

    fn forward_declarations(&self, class: &SchemaClass, output: &mut String) {
        let mut tree = NamespaceTree::new();
        for referenced in self.forward_declared_classes(class) {
            tree.add(self.class_namespace(&referenced), &alnum_name(&referenced));
        }

        if !tree.is_empty() {
            output.push_str("  // forward declaration for classes used in relationships and algorithms\n\n");
            tree.render(output, 0);
            output.push_str("\n\n");
        }
    }

    fn class_declaration(&self, class: &SchemaClass, name: &str, dx: &str, output: &mut String) {
        let rt = self.runtime();
        let dal_object = rt.qualify("DalObject");

        let bases = if class.superclasses.is_empty() {
            format!("public virtual {dal_object}")
        } else {
            class
                .superclasses
                .iter()
                .map(|s| format!("public {}", self.full_class_name(s)))
                .collect::<Vec<_>>()
                .join(", ")
        };
        output.push_str(&format!("{dx}class {name} : {bases} {{\n\n"));

        let configuration = rt.qualify("Configuration");
        output.push_str(&format!(
            "{dx}  friend class {configuration};\n\
             {dx}  friend class {configuration}::Cache<{name}>;\n\n\
             {dx}  friend class {dal_object};\n\
             {dx}  friend class {};\n\
             {dx}  friend class {};\n\n",
            rt.qualify("DalFactory"),
            rt.qualify("DalRegistry"),
        ));

        output.push_str(&format!(
            "{dx}  protected:\n\n\
             {dx}    {name}({}& db, const {}& obj) noexcept;\n\
             {dx}    virtual ~{name}() noexcept;\n\
             {dx}    virtual void init(bool init_children);\n\n",
            rt.qualify("DalRegistry"),
            rt.qualify("ConfigObject"),
        ));

        output.push_str(&format!(
            "{dx}  public:\n\n\
             {dx}      /** The name of the configuration class. */\n\n\
             {dx}    static const std::string& s_class_name;\n\n\n\
             {dx}      /**\n\
             {dx}       * \\brief Print details of the {name} object.\n\
             {dx}       *\n\
             {dx}       * Parameters are:\n\
             {dx}       *   \\param offset        number of spaces to shift object right (useful to print nested objects)\n\
             {dx}       *   \\param print_header  if false, do not print object header (to print attributes of base classes)\n\
             {dx}       *   \\param s             output stream\n\
             {dx}       */\n\n\
             {dx}    virtual void print(unsigned int offset, bool print_header, std::ostream& s) const;\n\n\n\
             {dx}      /**\n\
             {dx}       * \\brief Get values of relationships and results of some algorithms as a vector of {dal_object} pointers.\n\
             {dx}       *\n\
             {dx}       * Parameters are:\n\
             {dx}       *   \\param name          name of the relationship or algorithm\n\
             {dx}       *   \\return              value of relationship or result of algorithm\n\
             {dx}       *   \\throw               std::exception if there is no relationship or algorithm with such name in this and base classes\n\
             {dx}       */\n\n\
             {dx}    virtual std::vector<const {dal_object} *> get(const std::string& name, bool upcast_unregistered = true) const;\n\n\n\
             {dx}  protected:\n\n\
             {dx}    bool get(const std::string& name, std::vector<const {dal_object} *>& vec, bool upcast_unregistered, bool first_call) const;\n\n\n"
        ));
    }

    fn members(&self, class: &SchemaClass, dx: &str, output: &mut String) {
        let dx2 = format!("{dx}    ");
        let extensions: Vec<(&str, &str)> = class
            .cpp_methods()
            .map(|(m, mi)| (m.name.as_str(), TextBlocks::parse(&mi.body).private_section))
            .filter(|(_, ext)| !ext.is_empty())
            .collect();

        let has_fields = !class.attributes.is_empty() || !class.relationships.is_empty();
        if !has_fields && extensions.is_empty() {
            return;
        }

        output.push_str(&format!("{dx}  private:\n\n"));

        for attribute in &class.attributes {
            output.push_str(&format!(
                "{dx}    {} m_{};\n",
                field_type(attribute),
                alnum_name(&attribute.name)
            ));
        }

        for relationship in &class.relationships {
            output.push_str(&format!(
                "{dx}    {} m_{};\n",
                self.relationship_type(relationship),
                alnum_name(&relationship.name)
            ));
        }

        for (method, extension) in extensions {
            output.push_str(&format!(
                "\n{dx}      // extension of method {}::{method}()\n",
                class.name
            ));
            print_indented(output, extension, &dx2);
        }

        if !has_fields {
            output.push_str("\n\n");
            return;
        }

        output.push_str(&format!("\n\n{dx}  public:\n\n"));

        if !class.attributes.is_empty() {
            output.push_str(&format!("{dx}      // attribute names\n\n"));
            name_constants(class.attributes.iter().map(|a| a.name.as_str()), dx, output);

            for attribute in &class.attributes {
                self.attribute_accessors(attribute, dx, output);
            }
        }

        if !class.relationships.is_empty() {
            output.push_str(&format!("{dx}      // relationship names\n\n"));
            name_constants(class.relationships.iter().map(|r| r.name.as_str()), dx, output);

            for relationship in &class.relationships {
                self.relationship_accessors(relationship, dx, output);
            }
        }
    }

    fn attribute_accessors(&self, attribute: &Attribute, dx: &str, output: &mut String) {
        let dx2 = format!("{dx}    ");
        let aname = alnum_name(&attribute.name);
        let rt = self.runtime();
        let throws = format!("\\throw {}, {}\n", rt.qualify("Generic"), rt.qualify("DeletedObject"));

        let literals = attribute.enum_literals();
        if attribute.kind == AttributeKind::Enum && !literals.is_empty() {
            let description = format!(
                "Valid enumeration values to compare with value returned by get_{aname}() and to pass value to set_{aname}() methods."
            );
            print_description(output, &description, &dx2);

            output.push_str(&format!("{dx}    struct {} {{\n", capitalize_name(&aname)));
            for literal in literals {
                output.push_str(&format!(
                    "{dx}      inline static const std::string {} = \"{literal}\";\n",
                    capitalize_name(&alnum_name(literal))
                ));
            }
            output.push_str(&format!("{dx}    }};\n\n"));
        }

        let value_type = value_type(attribute);

        let description = format!(
            "\\brief Get \"{}\" attribute value.\n\n{}\n\\return the attribute value\n{throws}",
            attribute.name, attribute.description
        );
        print_description(output, &description, &dx2);

        output.push_str(&format!(
            "{dx}    {value_type}\n\
             {dx}    get_{aname}() const\n\
             {dx}      {{\n\
             {dx}        std::lock_guard scoped_lock(m_mutex);\n\
             {dx}        check();\n\
             {dx}        check_init();\n\
             {dx}        return m_{aname};\n\
             {dx}      }}\n\n"
        ));

        let description = format!(
            "\\brief Set \"{}\" attribute value.\n\n{}\n\\param value  new attribute value\n{throws}",
            attribute.name, attribute.description
        );
        print_description(output, &description, &dx2);

        output.push_str(&format!(
            "{dx}    void\n\
             {dx}    set_{aname}({value_type} value)\n\
             {dx}      {{\n\
             {dx}        std::lock_guard scoped_lock(m_mutex);\n\
             {dx}        check();\n\
             {dx}        clear();\n\
             {dx}        p_obj.{}(s_{aname}, value);\n\
             {dx}      }}\n\n\n",
            attribute.kind.store_setter(attribute.multi_value)
        ));
    }

    fn relationship_accessors(&self, relationship: &Relationship, dx: &str, output: &mut String) {
        let dx2 = format!("{dx}    ");
        let rname = alnum_name(&relationship.name);
        let rt = self.runtime();
        let generic = rt.qualify("Generic");
        let throws = format!("\\throw {generic}, {}\n", rt.qualify("DeletedObject"));
        let value_type = self.relationship_value_type(relationship);

        let description = format!(
            "\\brief Get \"{}\" relationship value.\n\n{}\n\\return the relationship value\n{throws}",
            relationship.name, relationship.description
        );
        print_description(output, &description, &dx2);

        output.push_str(&format!(
            "{dx}    {value_type}\n\
             {dx}    get_{rname}() const\n\
             {dx}      {{\n\
             {dx}        std::lock_guard scoped_lock(m_mutex);\n\
             {dx}        check();\n\
             {dx}        check_init();\n"
        ));

        if relationship.low == LowCardinality::One {
            let (condition, problem) = if relationship.is_many() {
                (format!("m_{rname}.empty()"), "is empty")
            } else {
                (format!("!m_{rname}"), "is not set")
            };
            output.push_str(&format!(
                "{dx}        if ({condition})\n\
                 {dx}          {{\n\
                 {dx}            std::ostringstream text;\n\
                 {dx}            text << \"relationship \\\"\" << s_{rname} << \"\\\" of object \" << this << \" {problem}\";\n\
                 {dx}            throw {generic}(text.str());\n\
                 {dx}          }}\n"
            ));
        }

        output.push_str(&format!(
            "{dx}        return m_{rname};\n\
             {dx}      }}\n\n\n"
        ));

        let description = format!(
            "\\brief Set \"{}\" relationship value.\n\n{}\n\\param value  new relationship value\n{throws}",
            relationship.name, relationship.description
        );
        print_description(output, &description, &dx2);

        output.push_str(&format!(
            "{dx}    void\n\
             {dx}    set_{rname}({value_type} value);\n\n"
        ));
    }

    fn algorithms(&self, class: &SchemaClass, dx: &str, output: &mut String) {
        let dx2 = format!("{dx}    ");
        let mut first = true;

        for (method, mi) in class.cpp_methods() {
            if first {
                output.push_str(&format!("\n{dx}  public:\n\n{dx}      // user-defined algorithms\n\n"));
                first = false;
            } else {
                output.push_str("\n\n");
            }

            print_description(output, &method.description, &dx2);
            output.push_str(&format!("{dx}    {};\n", mi.prototype));

            let extension = TextBlocks::parse(&mi.body).public_section;
            if !extension.is_empty() {
                output.push_str(&format!(
                    "\n{dx}      // extension of method {}::{}()\n",
                    class.name, method.name
                ));
                print_indented(output, extension, &dx2);
            }
        }
    }

    /// Member type of a relationship: pointer, or vector of pointers for high cardinality Many.
    pub fn relationship_type(&self, relationship: &Relationship) -> String {
        let target = self.full_class_name(&relationship.target);
        if relationship.is_many() {
            format!("std::vector<const {target}*>")
        } else {
            format!("const {target}*")
        }
    }

    /// Getter return and setter parameter type of a relationship.
    pub fn relationship_value_type(&self, relationship: &Relationship) -> String {
        let target = self.full_class_name(&relationship.target);
        if relationship.is_many() {
            format!("const std::vector<const {target}*>&")
        } else {
            format!("const {target} *")
        }
    }
}

/// Member type of an attribute: the scalar, or a vector of it when multi-valued.
pub fn field_type(attribute: &Attribute) -> String {
    let cpp_type = attribute.kind.cpp_type();
    if attribute.multi_value {
        format!("std::vector<{cpp_type}>")
    } else {
        cpp_type.to_string()
    }
}

/// Getter return and setter parameter type of an attribute.
pub fn value_type(attribute: &Attribute) -> String {
    let cpp_type = attribute.kind.cpp_type();
    if attribute.multi_value {
        format!("const std::vector<{cpp_type}>&")
    } else if cpp_type == "std::string" {
        "const std::string&".to_string()
    } else {
        cpp_type.to_string()
    }
}

fn name_constants<'n>(names: impl Iterator<Item = &'n str> + Clone, dx: &str, output: &mut String) {
    for name in names.clone() {
        output.push_str(&format!(
            "{dx}    inline static const std::string s_{} = \"{name}\";\n",
            alnum_name(name)
        ));
    }
    output.push('\n');

    for name in names {
        let cpp_name = alnum_name(name);
        output.push_str(&format!(
            "{dx}    static const std::string& __get_{cpp_name}_str() noexcept {{ return s_{cpp_name}; }}\n"
        ));
    }
    output.push_str("\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeContract;
    use crate::resolver::{ClassInfo, ClassInfoMap};
    use crate::schema::{HighCardinality, Method, MethodImplementation, Schema};

    fn schema() -> Schema {
        Schema::from_classes([
            SchemaClass::new("Device").with_relationship(Relationship::new("parent", "Rack")),
            SchemaClass::new("Sensor")
                .with_description("A measuring device")
                .with_superclass("Device")
                .with_attribute(Attribute::new("tags", AttributeKind::String).multi_value())
                .with_attribute(
                    Attribute::new("state", AttributeKind::Enum).with_range("on,off,2nd-mode"),
                )
                .with_relationship(
                    Relationship::new("rack", "Rack")
                        .with_cardinality(LowCardinality::One, HighCardinality::One),
                )
                .with_relationship(
                    Relationship::new("probes", "Probe")
                        .with_cardinality(LowCardinality::One, HighCardinality::Many),
                )
                .with_relationship(Relationship::new("owner", "Device"))
                .with_method(Method::new("calibrate").with_implementation(
                    MethodImplementation::cpp(
                        "const Calibration* calibrate(const Sensor& other) const",
                        "BEGIN_PRIVATE_SECTION\nmutable int m_cache = 0;\nEND_PRIVATE_SECTION\nreturn nullptr;",
                    ),
                )),
            SchemaClass::new("Rack"),
            SchemaClass::new("Probe"),
            SchemaClass::new("Calibration"),
        ])
        .unwrap()
    }

    fn render(class: &str, map: &ClassInfoMap) -> String {
        let schema = schema();
        let runtime = RuntimeContract::default();
        let emitter = Emitter::new(&schema, map, "hw", "hw/dal", &runtime);
        emitter.render_header(schema.find_class(class).unwrap())
    }

    #[test]
    fn test_forward_declarations_skip_self_and_inherited() {
        let schema = schema();
        let map = ClassInfoMap::new();
        let runtime = RuntimeContract::default();
        let emitter = Emitter::new(&schema, &map, "hw", "", &runtime);

        let set = emitter.forward_declared_classes(schema.find_class("Sensor").unwrap());
        let names: Vec<&str> = set.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["Calibration", "Probe", "Rack"]);
    }

    #[test]
    fn test_forward_declarations_use_resolved_namespace() {
        let mut map = ClassInfoMap::new();
        map.insert_if_absent("Rack", ClassInfo::new("infra", "infra"));
        let header = render("Sensor", &map);
        assert!(header.contains("namespace infra {\n  class Rack;\n}\n"));
        assert!(header.contains("namespace hw {\n  class Calibration;\n  class Probe;\n}\n"));
        assert!(header.contains("const infra::Rack* m_rack;"));
    }

    #[test]
    fn test_superclass_include_and_inheritance() {
        let header = render("Sensor", &ClassInfoMap::new());
        assert!(header.contains("#include \"hw/dal/Device.hpp\"\n"));
        assert!(header.contains("class Sensor : public hw::Device {"));
        assert!(header.starts_with("// *** this file is generated by dalgen"));
        assert!(header.contains("#ifndef _Sensor_0_hw_0_hw_dal_H_\n"));
        assert!(header.ends_with("\n#endif\n"));

        let root = render("Rack", &ClassInfoMap::new());
        assert!(root.contains("class Rack : public virtual dal::DalObject {"));
    }

    #[test]
    fn test_multi_value_attribute_is_container() {
        let header = render("Sensor", &ClassInfoMap::new());
        assert!(header.contains("std::vector<std::string> m_tags;"));
        assert!(header.contains("const std::vector<std::string>&\n      get_tags() const"));
        assert!(header.contains("p_obj.set_by_val(s_tags, value);"));
        assert!(header.contains("p_obj.set_enum(s_state, value);"));
    }

    #[test]
    fn test_cardinality_checks() {
        let header = render("Sensor", &ClassInfoMap::new());
        assert!(header.contains("if (!m_rack)"));
        assert!(header.contains("\" is not set\";"));
        assert!(header.contains("if (m_probes.empty())"));
        assert!(header.contains("\" is empty\";"));
        assert!(!header.contains("if (!m_owner)"));
    }

    #[test]
    fn test_enum_constants() {
        let header = render("Sensor", &ClassInfoMap::new());
        assert!(header.contains("struct State {"));
        assert!(header.contains("inline static const std::string On = \"on\";"));
        assert!(header.contains("inline static const std::string _2nd_mode = \"2nd-mode\";"));
    }

    #[test]
    fn test_private_extension_spliced_after_members() {
        let header = render("Sensor", &ClassInfoMap::new());
        let members = header.find("const hw::Device* m_owner;").unwrap();
        let extension = header.find("// extension of method Sensor::calibrate()").unwrap();
        let cache = header.find("mutable int m_cache = 0;").unwrap();
        assert!(members < extension && extension < cache);
        assert!(header.contains("const Calibration* calibrate(const Sensor& other) const;"));
    }

    #[test]
    fn test_empty_class_has_no_sections() {
        let header = render("Probe", &ClassInfoMap::new());
        assert!(!header.contains("private:"));
        assert!(!header.contains("// attribute names"));
        assert!(!header.contains("// user-defined algorithms"));
    }
}
