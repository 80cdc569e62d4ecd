//! End-to-end scenarios for deadmethod-core.

use crate::program::{
    ExprId, Field, MethodSymbol, Node, Object, Package, ReceiverKind, Selection, SourceFile,
    TypeDecl, TypeRef,
};
use crate::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

const DB: &str = "example.com/app/db";
const APP: &str = "example.com/app";

fn setup_temp_dir() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir()
        .join("deadmethod_tests")
        .join(format!("{}_{}", std::process::id(), id));

    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_snapshot(file: &Path, packages: &[&Package]) {
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    let json = serde_json::json!({ "packages": packages });
    fs::write(file, serde_json::to_string_pretty(&json).unwrap()).unwrap();
}

fn foo() -> TypeRef {
    TypeRef::named(DB, "Foo")
}

/// `type Foo struct{}` with `func (Foo) Bar()` and `func (*Foo) Baz()`.
fn foo_package() -> Package {
    Package::new(DB, "db").with_type(
        TypeDecl::structure("Foo", Vec::new())
            .with_method("Bar", ReceiverKind::Value)
            .with_method("Baz", ReceiverKind::Pointer),
    )
}

/// `f.<method>()` in main.go, with `f` a `Foo`.
fn caller(method: &str, owner: TypeRef) -> Package {
    Package::new(APP, "main")
        .with_file(SourceFile::new("main.go", vec![Node::method_call(1, "f", method)]))
        .with_selection(Selection::method_val(
            ExprId(1),
            foo(),
            MethodSymbol::new(method, owner),
        ))
}

fn analyze(program: &Program) -> DeadmethodResult<AnalysisResult> {
    DeadMethods::new(DB, "Foo")
        .use_config_file(false)
        .analyze_program(program)
}

// Scenario 1: nothing called
#[test]
fn test_all_methods_unused() {
    let program = Program::new(vec![foo_package()]);
    let result = analyze(&program).unwrap();
    assert_eq!(result.unused(), ["Bar", "Baz"]);
}

// Scenario 2: one value method called
#[test]
fn test_called_method_not_reported() {
    let program = Program::new(vec![foo_package(), caller("Bar", foo())]);
    let result = analyze(&program).unwrap();
    assert_eq!(result.unused(), ["Baz"]);
    assert_eq!(result.usage.calls["Bar"], 1);
}

// Scenario 3: promoted call, credited to Foo only on request
#[test]
fn test_promoted_method_attribution() {
    let base = TypeRef::named(DB, "Base");
    let db = Package::new(DB, "db")
        .with_type(
            TypeDecl::structure("Foo", vec![Field::embedded(base.clone())])
                .with_method("Bar", ReceiverKind::Value),
        )
        .with_type(TypeDecl::structure("Base", Vec::new()).with_method("Qux", ReceiverKind::Value));
    let program = Program::new(vec![db, caller("Qux", base)]);

    let default = analyze(&program).unwrap();
    assert!(default.methods.get("Qux").unwrap().is_promoted());
    assert_eq!(default.attribution, Attribution::Declared);
    assert_eq!(default.unused(), ["Bar", "Qux"]);

    let receiver = DeadMethods::new(DB, "Foo")
        .use_config_file(false)
        .attribution(Attribution::Receiver)
        .analyze_program(&program)
        .unwrap();
    assert_eq!(receiver.unused(), ["Bar"]);
}

// Scenario 4: ignore list
#[test]
fn test_ignore_list() {
    let program = Program::new(vec![foo_package()]);
    let result = DeadMethods::new(DB, "Foo")
        .use_config_file(false)
        .ignore(["Baz"])
        .analyze_program(&program)
        .unwrap();
    assert_eq!(result.unused(), ["Bar"]);
    assert_eq!(result.report.ignored, 1);
    // The method set itself keeps the ignored name
    assert!(result.methods.contains("Baz"));
}

// Scenario 5: unknown package or type
#[test]
fn test_resolution_failures() {
    let program = Program::new(vec![foo_package()]);

    let err = DeadMethods::new("example.com/missing", "Foo")
        .use_config_file(false)
        .analyze_program(&program)
        .unwrap_err();
    assert!(matches!(err, DeadmethodError::PackageNotFound { .. }));

    let err = DeadMethods::new(DB, "Nope")
        .use_config_file(false)
        .analyze_program(&program)
        .unwrap_err();
    assert!(matches!(err, DeadmethodError::TypeNotFound { .. }));

    let program = Program::new(vec![foo_package().with_object("Open", Object::Func)]);
    let err = DeadMethods::new(DB, "Open")
        .use_config_file(false)
        .analyze_program(&program)
        .unwrap_err();
    assert!(matches!(err, DeadmethodError::NotANamedType { .. }));
}

// Scenario 6: same method name on an unrelated type
#[test]
fn test_unrelated_type_same_name() {
    let conn = TypeRef::named(APP, "Conn");
    let db = Package::new(DB, "db").with_type(
        TypeDecl::structure("Foo", Vec::new())
            .with_method("Bar", ReceiverKind::Value)
            .with_method("Baz", ReceiverKind::Pointer)
            .with_method("Close", ReceiverKind::Pointer),
    );
    let app = Package::new(APP, "main")
        .with_type(TypeDecl::structure("Conn", Vec::new()).with_method("Close", ReceiverKind::Pointer))
        .with_file(SourceFile::new("main.go", vec![Node::method_call(1, "c", "Close")]))
        .with_selection(Selection::method_val(
            ExprId(1),
            conn.clone().pointer(),
            MethodSymbol::new("Close", conn.pointer()),
        ));
    let program = Program::new(vec![db, app]);

    let result = analyze(&program).unwrap();
    assert_eq!(result.unused(), ["Bar", "Baz", "Close"]);
    assert_eq!(result.usage.call_sites, 1);
}

#[test]
fn test_pointer_receiver_call_through_pointer() {
    let program = Program::new(vec![
        foo_package(),
        Package::new(APP, "main")
            .with_file(SourceFile::new("main.go", vec![Node::method_call(7, "p", "Baz")]))
            .with_selection(Selection::method_val(
                ExprId(7),
                foo().pointer(),
                MethodSymbol::new("Baz", foo().pointer()),
            )),
    ]);
    let result = analyze(&program).unwrap();
    assert_eq!(result.unused(), ["Bar"]);
}

#[test]
fn test_method_expression_counts() {
    // Foo.Bar(f)
    let app = Package::new(APP, "main")
        .with_file(SourceFile::new(
            "main.go",
            vec![Node::call(
                Node::selector(3, Node::ident("Foo"), "Bar"),
                vec![Node::ident("f")],
            )],
        ))
        .with_selection(Selection::method_expr(
            ExprId(3),
            foo(),
            MethodSymbol::new("Bar", foo()),
        ));
    let result = analyze(&Program::new(vec![foo_package(), app])).unwrap();
    assert_eq!(result.unused(), ["Baz"]);
}

#[test]
fn test_method_value_without_call_is_not_usage() {
    // g := f.Bar
    let app = Package::new(APP, "main")
        .with_file(SourceFile::new(
            "main.go",
            vec![Node::compound(
                "assign",
                vec![Node::ident("g"), Node::selector(2, Node::ident("f"), "Bar")],
            )],
        ))
        .with_selection(Selection::method_val(
            ExprId(2),
            foo(),
            MethodSymbol::new("Bar", foo()),
        ));
    let result = analyze(&Program::new(vec![foo_package(), app])).unwrap();
    assert_eq!(result.unused(), ["Bar", "Baz"]);
}

#[test]
fn test_calls_in_declaring_package_count() {
    let db = foo_package()
        .with_file(SourceFile::new("foo.go", vec![Node::method_call(1, "f", "Baz")]))
        .with_selection(Selection::method_val(
            ExprId(1),
            foo().pointer(),
            MethodSymbol::new("Baz", foo().pointer()),
        ));
    let result = analyze(&Program::new(vec![db])).unwrap();
    assert_eq!(result.unused(), ["Bar"]);
}

#[test]
fn test_deterministic_across_runs() {
    let program = Program::new(vec![foo_package(), caller("Bar", foo())]);
    let first = analyze(&program).unwrap();
    for _ in 0..5 {
        let again = analyze(&program).unwrap();
        assert_eq!(again.report, first.report);
        assert_eq!(again.usage, first.usage);
    }
}

#[test]
fn test_json_output_shape() {
    let program = Program::new(vec![foo_package(), caller("Bar", foo())]);
    let result = analyze(&program).unwrap();
    let value: serde_json::Value = serde_json::from_str(&render_json(&result).unwrap()).unwrap();
    assert_eq!(value["target"], "example.com/app/db.Foo");
    assert_eq!(value["declared"], 2);
    assert_eq!(value["used"], 1);
    assert_eq!(value["unused"], serde_json::json!(["Baz"]));
}

#[test]
fn test_end_to_end_from_snapshots() {
    let root = setup_temp_dir();
    write_snapshot(&root.join("db/db.typed.json"), &[&foo_package()]);
    write_snapshot(&root.join("app/main.typed.json"), &[&caller("Bar", foo())]);
    // Ignored by default exclusion
    write_snapshot(
        &root.join("testdata/bad.typed.json"),
        &[&Package::new(DB, "db")],
    );
    fs::write(root.join(CONFIG_FILE), "ignore_patterns = [\"^Ba[z]$\"]\n").unwrap();

    let result = DeadMethods::new(DB, "Foo").root(&root).analyze().unwrap();
    assert!(result.unused().is_empty());
    assert_eq!(result.report.ignored, 1);
    assert_eq!(result.packages, 2);
    assert_eq!(result.files, 1);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_end_to_end_long_method_chain() {
    // f.Bar().Bar()...Bar(), each link a resolved call on Foo
    let mut node = Node::ident("f");
    let mut app = Package::new(APP, "main");
    for id in 0..100 {
        node = Node::call(Node::selector(id, node, "Bar"), Vec::new());
        app = app.with_selection(Selection::method_val(
            ExprId(id),
            foo(),
            MethodSymbol::new("Bar", foo()),
        ));
    }
    let app = app.with_file(SourceFile::new("main.go", vec![node]));

    let root = setup_temp_dir();
    write_snapshot(&root.join("db.typed.json"), &[&foo_package()]);
    write_snapshot(&root.join("app.typed.json"), &[&app]);

    let result = DeadMethods::new(DB, "Foo").root(&root).analyze().unwrap();
    assert_eq!(result.unused(), ["Baz"]);
    assert_eq!(result.usage.calls["Bar"], 100);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_end_to_end_invalid_config() {
    let root = setup_temp_dir();
    write_snapshot(&root.join("db.typed.json"), &[&foo_package()]);
    fs::write(root.join(CONFIG_FILE), "attribution = 3\n").unwrap();

    let err = DeadMethods::new(DB, "Foo").root(&root).analyze().unwrap_err();
    assert!(matches!(err, DeadmethodError::Config { .. }));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_end_to_end_no_snapshots() {
    let root = setup_temp_dir();
    let err = DeadMethods::new(DB, "Foo").root(&root).analyze().unwrap_err();
    assert!(matches!(err, DeadmethodError::ProgramLoad { .. }));
    fs::remove_dir_all(&root).ok();
}
