//! Dump program: a small command-line tool printing objects of the generated classes.

use super::Emitter;
use crate::sanitize::alnum_name;

/// File name of the dump program for a namespace: `dump.cpp` or `dump_<namespace>.cpp`.
pub fn dump_file_name(namespace: &str) -> String {
    if namespace.is_empty() {
        "dump.cpp".to_string()
    } else {
        format!("dump_{}.cpp", alnum_name(namespace))
    }
}

impl Emitter<'_> {
    /// Render the dump program for the given generated classes, in the order given.
    pub fn render_dump(&self, classes: &[String]) -> String {
        let rt = self.runtime();
        let configuration = rt.qualify("Configuration");
        let config_object = rt.qualify("ConfigObject");
        let not_found = rt.qualify("NotFound");
        let mut output = String::new();

        output.push_str("  // *** this file is generated by dalgen ***\n\n");
        output.push_str(&format!(
            "#include \"{}\"\n#include \"{}\"\n\n",
            rt.header("ConfigObject.hpp"),
            rt.header("Configuration.hpp")
        ));
        for class in classes {
            output.push_str(&format!("#include \"{}.hpp\"\n", self.include_path(class)));
        }

        output.push_str(
            "\n\n\
             static void usage(const char * s)\n\
             {\n\
             \x20 std::cout << s << \" -d db-name -c class-name [-q query | -i object-id] [-t]\\n\"\n\
             \x20   \"\\n\"\n\
             \x20   \"Options/Arguments:\\n\"\n\
             \x20   \"  -d | --data db-name            mandatory name of the database\\n\"\n\
             \x20   \"  -c | --class-name class-name   mandatory name of class\\n\"\n\
             \x20   \"  -q | --query query             optional query to select class objects\\n\"\n\
             \x20   \"  -i | --object-id object-id     optional identity to select one object\\n\"\n\
             \x20   \"  -t | --init-children           all referenced objects are initialized (is used\\n\"\n\
             \x20   \"                                 for debug purposes and performance measurements)\\n\"\n\
             \x20   \"  -h | --help                    print this message\\n\"\n\
             \x20   \"\\n\"\n\
             \x20   \"Description:\\n\"\n\
             \x20   \"  The program prints out object(s) of given class.\\n\"\n\
             \x20   \"  If no query or object id is provided, all objects of the class are printed.\\n\"\n\
             \x20   \"  It is automatically generated by dalgen utility.\\n\"\n\
             \x20   \"\\n\";\n\
             }\n\
             \n\
             static void no_param(const char * s)\n\
             {\n\
             \x20 std::cerr << \"ERROR: the required argument for option \\'\" << s << \"\\' is missing\\n\\n\";\n\
             \x20 exit (EXIT_FAILURE);\n\
             }\n\
             \n\
             int main(int argc, char *argv[])\n\
             {\n\
             \x20   // parse parameters\n\
             \n\
             \x20 const char * db_name = nullptr;\n\
             \x20 const char * object_id = nullptr;\n\
             \x20 const char * query = \"\";\n\
             \x20 std::string class_name;\n\
             \x20 bool init_children = false;\n\
             \n\
             \x20 for(int i = 1; i < argc; i++) {\n\
             \x20   const char * cp = argv[i];\n\
             \x20   if(!strcmp(cp, \"-h\") || !strcmp(cp, \"--help\")) {\n\
             \x20     usage(argv[0]);\n\
             \x20     return 0;\n\
             \x20   }\n\
             \x20   if(!strcmp(cp, \"-t\") || !strcmp(cp, \"--init-children\")) {\n\
             \x20     init_children = true;\n\
             \x20   }\n\
             \x20   else if(!strcmp(cp, \"-d\") || !strcmp(cp, \"--data\")) {\n\
             \x20     if(++i == argc || argv[i][0] == '-') { no_param(cp); } else { db_name = argv[i]; }\n\
             \x20   }\n\
             \x20   else if(!strcmp(cp, \"-c\") || !strcmp(cp, \"--class-name\")) {\n\
             \x20     if(++i == argc || argv[i][0] == '-') { no_param(cp); } else { class_name = argv[i]; }\n\
             \x20   }\n\
             \x20   else if(!strcmp(cp, \"-i\") || !strcmp(cp, \"--object-id\")) {\n\
             \x20     if(++i == argc || argv[i][0] == '-') { no_param(cp); } else { object_id = argv[i]; }\n\
             \x20   }\n\
             \x20   else if(!strcmp(cp, \"-q\") || !strcmp(cp, \"--query\")) {\n\
             \x20     if(++i == argc || argv[i][0] == '-') { no_param(cp); } else { query = argv[i]; }\n\
             \x20   }\n\
             \x20   else {\n\
             \x20     std::cerr << \"ERROR: bad parameter \" << cp << std::endl;\n\
             \x20     usage(argv[0]);\n\
             \x20     return (EXIT_FAILURE);\n\
             \x20   }\n\
             \x20 }\n\
             \n\
             \x20 if(db_name == nullptr) {\n\
             \x20   std::cerr << \"ERROR: no database name provided\\n\";\n\
             \x20   return (EXIT_FAILURE);\n\
             \x20 }\n\
             \n\
             \x20 if(class_name.empty()) {\n\
             \x20   std::cerr << \"ERROR: no class name provided\\n\";\n\
             \x20   return (EXIT_FAILURE);\n\
             \x20 }\n\
             \n\
             \x20 if(*query != 0 && object_id != nullptr) {\n\
             \x20   std::cerr << \"ERROR: only one parameter -i or -q can be provided\\n\";\n\
             \x20   return (EXIT_FAILURE);\n\
             \x20 }\n\
             \n\
             \n\
             \x20 std::cout << std::boolalpha;\n\
             \n",
        );

        output.push_str(&format!(
            "  try {{\n\
             \x20   {configuration} conf(db_name);\n\
             \n\
             \x20   if(!conf.loaded()) {{\n\
             \x20     std::cerr << \"Can not load database: \" << db_name << std::endl;\n\
             \x20     return (EXIT_FAILURE);\n\
             \x20   }}\n\
             \n\
             \x20   std::vector< {config_object} > objects;\n\
             \n\
             \x20   if(object_id) {{\n\
             \x20     {config_object} obj;\n\
             \x20     try {{\n\
             \x20       conf.get(class_name, object_id, obj, 1);\n\
             \x20     }}\n\
             \x20     catch ({not_found} & ex) {{\n\
             \x20       std::cerr << \"Can not get object \\'\" << object_id << \"\\' of class \\'\" << class_name << \"\\':\\n\" << ex << std::endl;\n\
             \x20       return (EXIT_FAILURE);\n\
             \x20     }}\n\
             \x20     objects.push_back(obj);\n\
             \x20   }}\n\
             \x20   else {{\n\
             \x20     try {{\n\
             \x20       conf.get(class_name, objects, query, 1);\n\
             \x20     }}\n\
             \x20     catch ({not_found} & ex) {{\n\
             \x20       std::cerr << \"Can not get objects of class \\'\" << class_name << \"\\':\\n\" << ex << std::endl;\n\
             \x20       return (EXIT_FAILURE);\n\
             \x20     }}\n\
             \x20   }}\n\
             \n\
             \x20   struct SortByUId {{\n\
             \x20     bool operator() (const {config_object} * o1, const {config_object} * o2) const {{\n\
             \x20       return (o1->UID() < o2->UID());\n\
             \x20     }};\n\
             \x20   }};\n\
             \n\
             \x20   std::set< {config_object} *, SortByUId > sorted_objects;\n\
             \n\
             \x20   for(auto& i : objects)\n\
             \x20     sorted_objects.insert(&i);\n\
             \n\
             \x20   for(auto& i : sorted_objects) {{\n"
        ));

        for (idx, class) in classes.iter().enumerate() {
            let op = if idx == 0 { "if" } else { "else if" };
            output.push_str(&format!(
                "      {op}(class_name == \"{class}\") {{\n\
                 \x20       std::cout << *conf.get<{}>(*i, init_children) << std::endl;\n\
                 \x20     }}\n",
                self.full_class_name(class)
            ));
        }

        output.push_str(&format!(
            "      {}{{\n\
             \x20       std::cerr << \"ERROR: do not know how to dump object of \" << class_name << \" class\\n\";\n\
             \x20       return (EXIT_FAILURE);\n\
             \x20     }}\n\
             \x20   }}\n\
             \x20 }}\n\
             \x20 catch ({} & ex) {{\n\
             \x20   std::cerr << \"Caught \" << ex << std::endl;\n\
             \x20   return (EXIT_FAILURE);\n\
             \x20 }}\n\
             \n\
             \x20 return 0;\n\
             }}\n",
            if classes.is_empty() { "" } else { "else " },
            rt.qualify("Exception")
        ));

        output
    }
}
