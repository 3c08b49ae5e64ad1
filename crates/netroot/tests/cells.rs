use netroot::{Direction, Library, ModuleRegistry, Netlist, ResolveError};

fn library() -> Library {
    Library::default()
        .with_cell("INV", &[("A", Direction::Input), ("Y", Direction::Output)])
        .with_cell(
            "NAND2",
            &[
                ("A", Direction::Input),
                ("B", Direction::Input),
                ("Y", Direction::Output),
            ],
        )
}

const GATES: &str = r#"{ "modules": [
    { "name": "top", "ports": ["a", "b", "y"], "statements": [
        { "kind": "declaration", "name": "a", "direction": "input" },
        { "kind": "declaration", "name": "b", "direction": "input" },
        { "kind": "declaration", "name": "y", "direction": "output" },
        { "kind": "declaration", "name": "n1" },
        { "kind": "declaration", "name": "n2" },
        { "kind": "cell_inst", "instance": "g1", "cell": "NAND2", "nets": ["a", "b", "n1"] },
        { "kind": "cell_inst", "instance": "g2", "cell": "INV", "nets": ["n1", "n2"] },
        { "kind": "cell_inst", "instance": "g3", "cell": "INV", "nets": [null, ""] },
        { "kind": "assign", "lhs": "y", "rhs": "n2" }
    ] }
] }"#;

#[test]
fn test_cell_output_is_source() {
    let netlist = Netlist::from_json_str(GATES).unwrap();
    let lib = library();
    let mut registry = ModuleRegistry::new(&netlist, &lib, "top");

    assert_eq!(registry.resolve("y").unwrap(), vec!["g2/Y"]);
    assert_eq!(registry.resolve("n1").unwrap(), vec!["g1/Y"]);
    assert_eq!(registry.resolve("g2/A").unwrap(), vec!["g1/Y"]);
    assert_eq!(registry.resolve("g1/B").unwrap(), vec!["b"]);
}

#[test]
fn test_unconnected_cell_pins_are_skipped() {
    let netlist = Netlist::from_json_str(GATES).unwrap();
    let lib = library();
    let mut registry = ModuleRegistry::new(&netlist, &lib, "top");
    registry.build_root().unwrap();

    let top = registry.module_by_name("top").unwrap();
    assert!(top.symbol("g3").unwrap().is_instance());
    assert!(top.symbol("g3/A").is_none());
    assert!(top.symbol("g3/Y").is_none());
    assert_eq!(top.instance_module("g3"), None);
}

#[test]
fn test_named_pin_cell_instantiation() {
    let code = r#"{ "modules": [
        { "name": "top", "ports": ["a"], "statements": [
            { "kind": "declaration", "name": "a", "direction": "input" },
            { "kind": "declaration", "name": "m" },
            { "kind": "module_inst", "instance": "g", "module": "INV", "pins": [
                { "kind": "scalar", "port": "A", "net": "a" },
                { "kind": "scalar", "port": "Y", "net": "m" }
            ] }
        ] }
    ] }"#;
    let netlist = Netlist::from_json_str(code).unwrap();
    let lib = library();
    let mut registry = ModuleRegistry::new(&netlist, &lib, "top");

    assert_eq!(registry.resolve("m").unwrap(), vec!["g/Y"]);
    assert_eq!(registry.resolve("g/A").unwrap(), vec!["a"]);
    assert_eq!(registry.modules().len(), 1);
}

#[test]
fn test_cells_inside_submodules() {
    let code = r#"{ "modules": [
        { "name": "leaf", "ports": ["i", "o"], "statements": [
            { "kind": "declaration", "name": "i", "direction": "input" },
            { "kind": "declaration", "name": "o", "direction": "output" },
            { "kind": "cell_inst", "instance": "inv", "cell": "INV", "nets": ["i", "o"] }
        ] },
        { "name": "top", "ports": ["a"], "statements": [
            { "kind": "declaration", "name": "a", "direction": "input" },
            { "kind": "declaration", "name": "w" },
            { "kind": "module_inst", "instance": "u", "module": "leaf", "pins": [
                { "kind": "scalar", "port": "i", "net": "a" },
                { "kind": "scalar", "port": "o", "net": "w" }
            ] }
        ] }
    ] }"#;
    let netlist = Netlist::from_json_str(code).unwrap();
    let lib = library();
    let mut registry = ModuleRegistry::new(&netlist, &lib, "top");

    assert_eq!(registry.resolve("w").unwrap(), vec!["u/inv/Y"]);
    assert_eq!(registry.resolve("u/inv/A").unwrap(), vec!["a"]);
}

#[test]
fn test_unknown_cell_pin_is_fatal() {
    let code = r#"{ "modules": [
        { "name": "top", "statements": [
            { "kind": "module_inst", "instance": "g", "module": "INV", "pins": [
                { "kind": "scalar", "port": "Z", "net": "n" }
            ] }
        ] }
    ] }"#;
    let netlist = Netlist::from_json_str(code).unwrap();
    let lib = library();
    let mut registry = ModuleRegistry::new(&netlist, &lib, "top");
    assert_eq!(
        registry.resolve("n").unwrap_err(),
        ResolveError::UnknownCellPin {
            cell: "INV".to_string(),
            pin: "Z".to_string(),
            instance: "g".to_string(),
        }
    );
}

#[test]
fn test_escaped_pin_name_in_named_cell_connection() {
    let code = r#"{ "modules": [
        { "name": "top", "ports": ["a"], "statements": [
            { "kind": "declaration", "name": "a", "direction": "input" },
            { "kind": "declaration", "name": "m" },
            { "kind": "module_inst", "instance": "g", "module": "INV", "pins": [
                { "kind": "scalar", "port": "\\A ", "net": "a" },
                { "kind": "scalar", "port": "Y", "net": "m" }
            ] }
        ] }
    ] }"#;
    let netlist = Netlist::from_json_str(code).unwrap();
    let lib = library();
    let mut registry = ModuleRegistry::new(&netlist, &lib, "top");

    assert_eq!(registry.resolve("g/A").unwrap(), vec!["a"]);
    assert_eq!(registry.resolve("m").unwrap(), vec!["g/Y"]);
}
