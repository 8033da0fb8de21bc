//! End-to-end tests: schema files in, generated units and manifest out.

use dalgen::resolver::MANIFEST_FILE_NAME;
use dalgen::{GenError, Generator, GeneratorConfig, ReferenceError, UserOverride};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Hardware classes with `Device` coming from a user override.
fn hw_config(output_dir: &Path) -> GeneratorConfig {
    GeneratorConfig::new()
        .with_schema_file(fixture("hw.json"))
        .with_schema_file(fixture("core.json"))
        .with_class("Sensor")
        .with_class("Rack")
        .with_class("Probe")
        .with_namespace("hw")
        .with_include_prefix("hw/dal")
        .with_output_dir(output_dir)
        .with_manifest_path(output_dir.join(MANIFEST_FILE_NAME))
        .with_user_override("core::Device@core/dal".parse().unwrap())
}

fn read_outputs(dir: &Path) -> BTreeMap<String, String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            (name, fs::read_to_string(&path).unwrap())
        })
        .collect()
}

#[test]
fn test_run_writes_every_unit() {
    let dir = tempfile::tempdir().unwrap();
    let report = Generator::new(hw_config(dir.path())).run().unwrap();

    assert_eq!(report.classes, vec!["Probe", "Rack", "Sensor"]);
    assert_eq!(report.externals_resolved, 1);
    // three units of two files each, the dump program and the manifest
    assert_eq!(report.files.len(), 8, "unexpected files: {:?}", report.files);

    let outputs = read_outputs(dir.path());
    for name in ["Probe.hpp", "Probe.cpp", "Rack.hpp", "Rack.cpp", "Sensor.hpp", "Sensor.cpp", "dump_hw.cpp"] {
        assert!(outputs.contains_key(name), "missing {name}");
    }
    assert_eq!(
        outputs[MANIFEST_FILE_NAME],
        "// the file is generated by dalgen\n\
         // *** do not modify the file ***\n\
         c++-namespace=hw\n\
         c++-header-dir-prefix=hw/dal\n\
         classes:\n  Probe\n  Rack\n  Sensor\n"
    );
}

#[test]
fn test_idempotent_runs() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    Generator::new(hw_config(first.path())).run().unwrap();
    Generator::new(hw_config(second.path())).run().unwrap();

    let a = read_outputs(first.path());
    let b = read_outputs(second.path());
    assert_eq!(a.len(), b.len());
    for (name, text) in &a {
        assert_eq!(Some(text), b.get(name), "{name} differs between runs");
    }
}

#[test]
fn test_class_order_does_not_matter() {
    let forward = tempfile::tempdir().unwrap();
    let backward = tempfile::tempdir().unwrap();

    Generator::new(hw_config(forward.path())).run().unwrap();

    let reversed = GeneratorConfig {
        classes: vec!["Probe".to_string(), "Sensor".to_string(), "Rack".to_string()],
        ..hw_config(backward.path())
    };
    Generator::new(reversed).run().unwrap();

    assert_eq!(read_outputs(forward.path()), read_outputs(backward.path()));
}

#[test]
fn test_parallel_run_matches_sequential() {
    let sequential = tempfile::tempdir().unwrap();
    let parallel = tempfile::tempdir().unwrap();

    Generator::new(hw_config(sequential.path())).run().unwrap();
    Generator::new(hw_config(parallel.path()).with_parallel(Some(3)))
        .run()
        .unwrap();

    assert_eq!(read_outputs(sequential.path()), read_outputs(parallel.path()));
}

#[test]
fn test_manifest_from_earlier_run_resolves_external_class() {
    let core_dir = tempfile::tempdir().unwrap();
    let hw_dir = tempfile::tempdir().unwrap();

    let core = GeneratorConfig::new()
        .with_schema_file(fixture("core.json"))
        .with_namespace("Foo")
        .with_include_prefix("foo/dal")
        .with_output_dir(core_dir.path())
        .with_manifest_path(core_dir.path().join(MANIFEST_FILE_NAME));
    let report = Generator::new(core).run().unwrap();
    assert_eq!(report.classes, vec!["Device"]);

    let config = GeneratorConfig {
        user_overrides: Vec::new(),
        ..hw_config(hw_dir.path())
    }
    .with_search_dir(core_dir.path());
    Generator::new(config).run().unwrap();

    let header = fs::read_to_string(hw_dir.path().join("Sensor.hpp")).unwrap();
    assert!(header.contains("#include \"foo/dal/Device.hpp\"\n"));
    assert!(header.contains("class Sensor : public Foo::Device {"));

    let body = fs::read_to_string(hw_dir.path().join("Sensor.cpp")).unwrap();
    assert!(body.contains("#include \"hw/dal/Sensor.hpp\""));
}

#[test]
fn test_override_beats_manifest() {
    let search = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::write(
        search.path().join(MANIFEST_FILE_NAME),
        "// written by hand\nc++-namespace=Foo\nc++-header-dir-prefix=foo/dal\nclasses:\n  Device\n",
    )
    .unwrap();

    let config = hw_config(out.path()).with_search_dir(search.path());
    Generator::new(config).run().unwrap();

    let header = fs::read_to_string(out.path().join("Sensor.hpp")).unwrap();
    assert!(header.contains("#include \"core/dal/Device.hpp\"\n"));
    assert!(header.contains("class Sensor : public core::Device {"));
    assert!(!header.contains("Foo::"));
}

#[test]
fn test_inherited_classes_are_not_forward_declared() {
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig::new()
        .with_schema_file(fixture("chain.json"))
        .with_namespace("ns")
        .with_output_dir(dir.path())
        .with_manifest_path(dir.path().join(MANIFEST_FILE_NAME))
        .with_dump(false);
    Generator::new(config).run().unwrap();

    let header = fs::read_to_string(dir.path().join("A.hpp")).unwrap();
    assert!(
        header.contains(
            "  // forward declaration for classes used in relationships and algorithms\n\n\
             namespace ns {\n  class D;\n  class E;\n  class Z;\n}\n"
        ),
        "unexpected forward declarations:\n{header}"
    );
    assert!(!header.contains("class B;"));
    assert!(!header.contains("class C;"));
    assert!(header.contains("#include \"B.hpp\"\n"));

    let body = fs::read_to_string(dir.path().join("A.cpp")).unwrap();
    assert!(body.contains("#include \"D.hpp\""));
    assert!(body.contains("#include \"Z.hpp\""));
    assert!(!body.contains("#include \"C.hpp\""));
}

#[test]
fn test_required_relationship_and_container_attribute() {
    let dir = tempfile::tempdir().unwrap();
    Generator::new(hw_config(dir.path())).run().unwrap();
    let header = fs::read_to_string(dir.path().join("Sensor.hpp")).unwrap();

    let getter = header.find("get_rack() const").unwrap();
    let check = header[getter..].find("if (!m_rack)").unwrap();
    let message = header[getter..].find("\" is not set\";").unwrap();
    assert!(check < message);
    assert!(header.contains("text << \"relationship \\\"\" << s_rack << \"\\\" of object \" << this"));

    assert!(header.contains("std::vector<std::string> m_tags;"));
    assert!(header.contains("const std::vector<std::string>&\n      get_tags() const"));
    assert!(!header.contains("const std::string&\n      get_tags() const"));
}

#[test]
fn test_cardinality_checks() {
    let dir = tempfile::tempdir().unwrap();
    Generator::new(hw_config(dir.path())).run().unwrap();
    let header = fs::read_to_string(dir.path().join("Sensor.hpp")).unwrap();

    assert!(header.contains("if (m_probes.empty())"));
    assert!(header.contains("\" is empty\";"));
    assert!(!header.contains("if (!m_spare)"));

    let rack = fs::read_to_string(dir.path().join("Rack.hpp")).unwrap();
    assert!(!rack.contains("if (m_sensors.empty())"));
}

#[test]
fn test_extension_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    Generator::new(hw_config(dir.path())).run().unwrap();
    let header = fs::read_to_string(dir.path().join("Sensor.hpp")).unwrap();
    let body = fs::read_to_string(dir.path().join("Sensor.cpp")).unwrap();

    let private = header.find("  private:").unwrap();
    let extension = header.find("// extension of method Sensor::cached_reading()").unwrap();
    let member = header.find("mutable int m_cache = 0;").unwrap();
    assert!(private < extension && extension < member);
    assert!(!header.contains("BEGIN_PRIVATE_SECTION"));

    // whitespace-only residual: declared, never defined
    assert!(header.contains("int cached_reading() const;"));
    assert!(!body.contains("Sensor::cached_reading()"));

    assert!(header.contains("virtual double area() const override;"));
    assert!(body.contains("double\n  Sensor::area() const\n  {\nreturn 1.0;\n  }\n"));
}

#[test]
fn test_unknown_relationship_target_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let config = GeneratorConfig::new()
        .with_schema_file(fixture("broken.json"))
        .with_output_dir(&out)
        .with_manifest_path(out.join(MANIFEST_FILE_NAME));

    let err = Generator::new(config).run().unwrap_err();
    assert!(matches!(err, GenError::Unresolved { .. }));
    assert_eq!(err.to_string(), "1 error was found");

    let errors = err.reference_errors();
    assert_eq!(
        errors,
        &[ReferenceError::UnknownRelationshipTarget {
            class: "Sensor".to_string(),
            relationship: "ghost".to_string(),
            target: "Ghost".to_string(),
        }]
    );
    let text = errors[0].to_string();
    assert!(text.contains("\"Sensor\"") && text.contains("\"ghost\""));

    assert!(!out.exists(), "output directory must not be created");
}

#[test]
fn test_unresolved_external_class_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        user_overrides: Vec::new(),
        ..hw_config(dir.path())
    };

    let err = Generator::new(config).run().unwrap_err();
    assert_eq!(
        err.reference_errors(),
        &[ReferenceError::UnresolvedSuperclass {
            class: "Sensor".to_string(),
            superclass: "Device".to_string(),
        }]
    );
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_malformed_override_rejected() {
    let err = "core::@core/dal".parse::<UserOverride>().unwrap_err();
    assert!(matches!(err, GenError::InvalidConfig(_)));
}

#[test]
fn test_report_serializes() {
    let dir = tempfile::tempdir().unwrap();
    let report = Generator::new(hw_config(dir.path()).with_dump(false))
        .run()
        .unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let back: dalgen::GenerationReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.classes, report.classes);
    assert_eq!(back.files.len(), 7);
}
