//! Body unit: registration, constructor, print, init, name dispatch and user algorithms.

use super::prototype::{method_name, Prototype};
use super::{close_namespace, indent, open_namespace, print_description, Emitter};
use crate::extract::TextBlocks;
use crate::sanitize::alnum_name;
use crate::schema::{Format, SchemaClass};
use std::collections::BTreeSet;

/// One capability check of the generated two-phase `get(name, ...)`, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStep {
    /// First call only: validate liveness and look the name up among relationships
    RelationshipTable,
    /// Algorithm returning a list of objects
    BulkAlgorithm(String),
    /// Algorithm returning one object
    SingleAlgorithm(String),
    /// Delegate to a direct superclass in non-first-call mode
    Superclass(String),
    /// First call only: store-level algorithm lookup
    StoreAlgorithms,
}

/// Names of the algorithms a class exposes through name dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlgorithmSets {
    pub bulk: BTreeSet<String>,
    pub single: BTreeSet<String>,
}

impl AlgorithmSets {
    /// Collect marked methods. A method carrying both markers counts as bulk.
    pub fn collect(class: &SchemaClass) -> Self {
        let mut sets = Self::default();
        for (_, mi) in class.cpp_methods() {
            let blocks = TextBlocks::parse(&mi.body);
            let Some(name) = method_name(&mi.prototype) else {
                continue;
            };
            if blocks.bulk_result {
                sets.bulk.insert(name.to_string());
            } else if blocks.single_result {
                sets.single.insert(name.to_string());
            }
        }
        sets
    }
}

impl Emitter<'_> {
    /// Dispatch chain of the generated `get`.
    pub fn dispatch_steps(&self, class: &SchemaClass) -> Vec<DispatchStep> {
        let algorithms = AlgorithmSets::collect(class);
        let mut steps = vec![DispatchStep::RelationshipTable];
        steps.extend(algorithms.bulk.into_iter().map(DispatchStep::BulkAlgorithm));
        steps.extend(algorithms.single.into_iter().map(DispatchStep::SingleAlgorithm));
        steps.extend(
            class
                .superclasses
                .iter()
                .map(|s| DispatchStep::Superclass(self.class_name_in(s, ""))),
        );
        steps.push(DispatchStep::StoreAlgorithms);
        steps
    }

    /// Classes whose headers the body includes: relationship targets outside the inheritance
    /// chain and known classes returned by marked algorithms.
    pub fn body_included_classes(&self, class: &SchemaClass) -> BTreeSet<String> {
        let inherited = self.schema().all_superclasses(&class.name);
        let mut included: BTreeSet<String> = class
            .relationships
            .iter()
            .map(|r| r.target.clone())
            .filter(|t| *t != class.name && !inherited.contains(t))
            .collect();

        for (_, mi) in class.cpp_methods() {
            let blocks = TextBlocks::parse(&mi.body);
            if !blocks.bulk_result && !blocks.single_result {
                continue;
            }
            let Some(pointee) = Prototype::parse(&mi.prototype).and_then(|p| p.pointee()) else {
                continue;
            };
            if let Some(known) = self
                .schema()
                .class_names()
                .find(|c| alnum_name(c) == pointee)
            {
                included.insert(known.to_string());
            }
        }

        included
    }

    /// Render the complete body unit of `class`.
    pub fn render_body(&self, class: &SchemaClass) -> String {
        let name = alnum_name(&class.name);
        let rt = self.runtime();
        let mut output = String::new();

        for header in ["ConfigObject.hpp", "DalFactory.hpp", "DalObjectPrint.hpp", "Errors.hpp"] {
            output.push_str(&format!("#include \"{}\"\n", rt.header(header)));
        }
        output.push_str(&format!("#include \"{}.hpp\"\n\n", self.include_path(&class.name)));
        output.push_str(&format!("#include \"{}\"\n\n", rt.logging_header));

        let included = self.body_included_classes(class);
        if !included.is_empty() {
            output.push_str("  // include files for classes used in relationships and algorithms\n\n");
            for c in &included {
                output.push_str(&format!("#include \"{}.hpp\"\n", self.include_path(c)));
            }
            output.push_str("\n\n");
        }

        let level = open_namespace(&mut output, self.namespace());
        let dx = indent(level);

        self.registration(class, &name, &dx, &mut output);
        self.constructor(class, &name, &dx, &mut output);
        self.print_method(class, &name, &dx, &mut output);
        self.init_method(class, &name, &dx, &mut output);

        output.push_str(&format!(
            "{dx}{name}::~{name}() noexcept\n\
             {dx}{{\n\
             {dx}}}\n\n"
        ));

        self.get_methods(class, &name, &dx, &mut output);
        self.relationship_setters(class, &name, &dx, &mut output);
        self.algorithm_bodies(class, &name, &dx, &mut output);

        close_namespace(&mut output, level);
        output
    }

    fn registration(&self, class: &SchemaClass, name: &str, dx: &str, output: &mut String) {
        let factory = self.runtime().qualify("DalFactory");
        output.push_str(&format!(
            "{dx}const std::string& {name}::s_class_name({factory}::instance().get_known_class_name_ref(\"{name}\"));\n\n"
        ));

        let algorithms = AlgorithmSets::collect(class);
        let names = algorithms
            .single
            .iter()
            .chain(algorithms.bulk.iter())
            .map(|a| format!("\"{a}()\""))
            .collect::<Vec<_>>()
            .join(",");

        output.push_str(&format!(
            "{dx}  // the factory initializer\n\n\
             {dx}static struct __{name}_Registrator\n\
             {dx}  {{\n\
             {dx}    __{name}_Registrator()\n\
             {dx}      {{\n\
             {dx}        {factory}::instance().register_dal_class<{name}>(\"{}\", {{{names}}});\n\
             {dx}      }}\n\
             {dx}  }} registrator;\n\n\n",
            class.name
        ));
    }

    fn constructor(&self, class: &SchemaClass, name: &str, dx: &str, output: &mut String) {
        let rt = self.runtime();
        output.push_str(&format!(
            "{dx}  // the constructor\n\n\
             {dx}{name}::{name}({}& db, const {}& o) noexcept :\n\
             {dx}  {}(db, o)",
            rt.qualify("DalRegistry"),
            rt.qualify("ConfigObject"),
            rt.qualify("DalObject"),
        ));

        let mut initializers: Vec<String> = class
            .superclasses
            .iter()
            .map(|s| format!("{}(db, o)", self.class_name_in(s, "")))
            .collect();

        initializers.extend(
            class
                .relationships
                .iter()
                .filter(|r| !r.is_many())
                .map(|r| format!("m_{} (nullptr)", alnum_name(&r.name))),
        );

        initializers.extend(
            class
                .cpp_methods()
                .map(|(_, mi)| TextBlocks::parse(&mi.body).initializer())
                .filter(|fragment| !fragment.is_empty()),
        );

        if !initializers.is_empty() {
            for initializer in &initializers {
                output.push_str(&format!(",\n{dx}  {initializer}"));
            }
            output.push('\n');
        }

        output.push_str(&format!(
            "\n{dx}{{\n\
             {dx}  ;\n\
             {dx}}}\n\n\n"
        ));
    }

    fn print_method(&self, class: &SchemaClass, name: &str, dx: &str, output: &mut String) {
        let rt = self.runtime();
        output.push_str(&format!(
            "{dx}void {name}::print(unsigned int indent, bool print_header, std::ostream& s) const\n\
             {dx}{{\n\
             {dx}  check_init();\n\n\
             {dx}  try {{\n"
        ));

        if !class.attributes.is_empty() || !class.relationships.is_empty() {
            output.push_str(&format!("{dx}    const std::string str(indent+2, ' ');\n"));
        }

        let namespace_arg = if self.namespace().is_empty() {
            String::new()
        } else {
            format!(", \"{}\"", self.namespace())
        };
        output.push_str(&format!(
            "\n{dx}    if (print_header)\n\
             {dx}      p_hdr(s, indent, s_class_name{namespace_arg});\n"
        ));

        if !class.superclasses.is_empty() {
            output.push_str(&format!("\n\n{dx}      // print direct super-classes\n\n"));
            for superclass in &class.superclasses {
                output.push_str(&format!(
                    "{dx}    {}::print(indent, false, s);\n",
                    self.full_class_name(superclass)
                ));
            }
        }

        if !class.attributes.is_empty() {
            output.push_str(&format!("\n\n{dx}      // print direct attributes\n\n"));
            for attribute in &class.attributes {
                let aname = alnum_name(&attribute.name);
                let base = match attribute.format {
                    Format::Hex => format!("<{}>", rt.qualify("hex")),
                    Format::Oct => format!("<{}>", rt.qualify("oct")),
                    Format::Dec => String::new(),
                };
                let printer = if attribute.multi_value { "p_mv_attr" } else { "p_sv_attr" };
                output.push_str(&format!(
                    "{dx}    {}{base}(s, str, s_{aname}, m_{aname});\n",
                    rt.qualify(printer)
                ));
            }
        }

        if !class.relationships.is_empty() {
            output.push_str(&format!("\n\n{dx}      // print direct relationships\n\n"));
            for relationship in &class.relationships {
                let rname = alnum_name(&relationship.name);
                let printer = if relationship.is_many() { "p_mv_rel" } else { "p_sv_rel" };
                let nested = if relationship.composite { "indent, " } else { "" };
                output.push_str(&format!(
                    "{dx}    {}(s, str, {nested}s_{rname}, m_{rname});\n",
                    rt.qualify(printer)
                ));
            }
        }

        output.push_str(&format!(
            "{dx}  }}\n\
             {dx}  catch ({} & ex) {{\n\
             {dx}    {}::p_error(s, ex);\n\
             {dx}  }}\n\
             {dx}}}\n\n\n",
            rt.qualify("Exception"),
            rt.qualify("DalObject"),
        ));
    }

    fn init_method(&self, class: &SchemaClass, name: &str, dx: &str, output: &mut String) {
        let rt = self.runtime();
        let parameter = if class.relationships.is_empty() && class.superclasses.is_empty() {
            "/* init_children */"
        } else {
            "init_children"
        };

        output.push_str(&format!(
            "{dx}void {name}::init(bool {parameter})\n\
             {dx}{{\n"
        ));

        if class.is_root() {
            output.push_str(&format!(
                "{dx}  p_was_read = true;\n\
                 {dx}  increment_read();\n"
            ));
        } else {
            for superclass in &class.superclasses {
                output.push_str(&format!(
                    "{dx}  {}::init(init_children);\n",
                    self.class_name_in(superclass, "")
                ));
            }
            output.push('\n');
        }

        output.push_str(&format!(
            "{dx}  {} << \"read object \" << this << \" (class \" << s_class_name << ')';\n",
            rt.debug_log
        ));

        if !class.attributes.is_empty() || !class.relationships.is_empty() {
            output.push_str(&format!("\n{dx}  try {{\n"));

            for attribute in &class.attributes {
                let aname = alnum_name(&attribute.name);
                output.push_str(&format!("{dx}    p_obj.get(s_{aname}, m_{aname});\n"));
            }

            for relationship in &class.relationships {
                let rname = alnum_name(&relationship.name);
                let target = self.full_class_name(&relationship.target);
                if relationship.is_many() {
                    output.push_str(&format!(
                        "{dx}    p_registry._ref<{target}>(p_obj, s_{rname}, m_{rname}, init_children);\n"
                    ));
                } else {
                    output.push_str(&format!(
                        "{dx}    m_{rname} = p_registry._ref<{target}>(p_obj, s_{rname}, init_children);\n"
                    ));
                }
            }

            output.push_str(&format!(
                "{dx}  }}\n\
                 {dx}  catch ({} & ex) {{\n\
                 {dx}    throw_init_ex(ex);\n\
                 {dx}  }}\n",
                rt.qualify("Exception")
            ));
        }

        output.push_str(&format!("{dx}}}\n\n"));
    }

    fn get_methods(&self, class: &SchemaClass, name: &str, dx: &str, output: &mut String) {
        let dal_object = self.runtime().qualify("DalObject");

        output.push_str(&format!(
            "{dx}std::vector<const {dal_object} *> {name}::get(const std::string& name, bool upcast_unregistered) const\n\
             {dx}{{\n\
             {dx}  std::vector<const {dal_object} *> vec;\n\n\
             {dx}  if (!get(name, vec, upcast_unregistered, true))\n\
             {dx}    throw_get_ex(name, s_class_name, this);\n\n\
             {dx}  return vec;\n\
             {dx}}}\n\n"
        ));

        output.push_str(&format!(
            "{dx}bool {name}::get(const std::string& name, std::vector<const {dal_object} *>& vec, bool upcast_unregistered, bool first_call) const\n\
             {dx}{{\n"
        ));

        let steps = self.dispatch_steps(class);
        let has_superclasses = steps.iter().any(|s| matches!(s, DispatchStep::Superclass(_)));

        for step in &steps {
            match step {
                DispatchStep::RelationshipTable => output.push_str(&format!(
                    "{dx}  if (first_call)\n\
                     {dx}    {{\n\
                     {dx}      std::lock_guard scoped_lock(m_mutex);\n\n\
                     {dx}      check();\n\
                     {dx}      check_init();\n\n\
                     {dx}      if (get_rel_objects(name, upcast_unregistered, vec))\n\
                     {dx}        return true;\n\
                     {dx}    }}\n\n"
                )),
                DispatchStep::BulkAlgorithm(algorithm) => output.push_str(&format!(
                    "{dx}  if (name == \"{algorithm}()\")\n\
                     {dx}    {{\n\
                     {dx}      p_registry.downcast_dal_objects({algorithm}(), upcast_unregistered, vec);\n\
                     {dx}      return true;\n\
                     {dx}    }}\n\n"
                )),
                DispatchStep::SingleAlgorithm(algorithm) => output.push_str(&format!(
                    "{dx}  if (name == \"{algorithm}()\")\n\
                     {dx}    {{\n\
                     {dx}      p_registry.downcast_dal_object({algorithm}(), upcast_unregistered, vec);\n\
                     {dx}      return true;\n\
                     {dx}    }}\n\n"
                )),
                DispatchStep::Superclass(superclass) => output.push_str(&format!(
                    "{dx}  if ({superclass}::get(name, vec, upcast_unregistered, false)) return true;\n"
                )),
                DispatchStep::StoreAlgorithms => {
                    if has_superclasses {
                        output.push('\n');
                    }
                    output.push_str(&format!(
                        "{dx}  if (first_call)\n\
                         {dx}    return get_algo_objects(name, vec);\n\n\
                         {dx}  return false;\n\
                         {dx}}}\n\n"
                    ));
                }
            }
        }
    }

    fn relationship_setters(&self, class: &SchemaClass, name: &str, dx: &str, output: &mut String) {
        for relationship in &class.relationships {
            let rname = alnum_name(&relationship.name);
            let setter = if relationship.is_many() { "_set_objects" } else { "_set_object" };
            output.push_str(&format!(
                "{dx}void {name}::set_{rname}({} value)\n\
                 {dx}{{\n\
                 {dx}  {setter}(s_{rname}, value);\n\
                 {dx}}}\n\n",
                self.relationship_value_type(relationship)
            ));
        }
    }

    fn algorithm_bodies(&self, class: &SchemaClass, name: &str, dx: &str, output: &mut String) {
        let dx2 = format!("{dx}    ");
        let mut first = true;

        for (method, mi) in class.cpp_methods() {
            let blocks = TextBlocks::parse(&mi.body);
            if blocks.body.is_empty() {
                continue;
            }

            if first {
                output.push_str(&format!("{dx}    // user-defined algorithms\n\n"));
                first = false;
            }

            print_description(output, &method.description, &dx2);

            let definition = match Prototype::parse(&mi.prototype) {
                Some(prototype) => prototype.definition(name, dx),
                None => format!("{dx}{}", mi.prototype.trim()),
            };

            output.push_str(&format!(
                "{definition}\n\
                 {dx}{{\n\
                 {}\n\
                 {dx}}}\n\n",
                blocks.body
            ));
        }
    }
}
