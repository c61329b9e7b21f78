//! Whole-pass properties: counting, ordering, file-backed modules and
//! reporting settings.

mod common;
use common::*;

use expect_test::expect;
use rsnames_hir::{check_with_config, AnalysisConfig};

#[test]
fn k_equal_definitions_report_k_minus_one() {
    for k in 1..=5usize {
        let source = "fn f() {} ".repeat(k);
        let items = (0..k).map(|_| Item::function("f")).collect();
        assert_eq!(codes(&source, items).len(), k - 1, "k = {}", k);
    }
}

#[test]
fn namespaces_are_counted_independently() {
    let source = "fn x() {} struct x; fn x() {} enum x {} macro_rules! x { () => {} }";
    let items = vec![
        Item::function("x"),
        Item::structure("x"),
        Item::function("x"),
        Item::enumeration("x", []),
        Item::macro_rules("x"),
    ];
    assert_eq!(codes(source, items), vec!["E0428", "E0428"]);
}

#[test]
fn checking_twice_gives_the_same_diagnostics() {
    let (_, tree) = tree_of(
        r#"
mod m { fn hidden() {} }
use m::hidden;
fn hidden() {}
struct S { a: u8, a: u8 }
"#,
        vec![
            Item::module("m", [Item::function("hidden")]),
            Item::use_item(UseTree::simple("m::hidden")),
            Item::function("hidden"),
            Item::structure("S")
                .field(FieldDecl::new("a"))
                .field(FieldDecl::new("a")),
        ],
    );
    let options = CfgOptions::new();
    let analysis = Analysis::new(&options, &ModuleTreeReachability);
    let first = analysis.check(&tree);
    let second = analysis.check(&tree);
    assert_eq!(first, second);
    insta::assert_snapshot!(
        first.iter().map(|d| d.code.code()).collect::<Vec<_>>().join(" "),
        @"E0603 E0255 E0124"
    );
}

#[test]
fn diagnostics_are_ordered_by_position() {
    let (_, tree) = tree_of(
        "struct S { a: u8, a: u8 } fn g() {} fn g() {}",
        vec![
            Item::structure("S")
                .field(FieldDecl::new("a"))
                .field(FieldDecl::new("a")),
            Item::function("g"),
            Item::function("g"),
        ],
    );
    let diagnostics = diagnostics_with(&tree, &CfgOptions::new());
    let starts: Vec<u32> = diagnostics.iter().map(|d| d.span.start()).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
    assert_eq!(starts.len(), 2);
}

#[test]
fn same_file_module_declared_twice() {
    check_files(
        &[
            (
                FileId(0),
                r#"
mod foo;
mod <error descr="A type named `foo` has already been defined in this module [E0428]">foo</error>;
"#,
            ),
            (FileId(1), ""),
        ],
        vec![
            Item::module_decl("foo", FileId(1), []),
            Item::module_decl("foo", FileId(1), []),
        ],
    );
}

#[test]
fn distinct_or_unresolved_module_files_do_not_collide() {
    check_files(
        &[
            (FileId(0), "mod foo;\nmod foo;\nmod bar;\nmod bar;\n"),
            (FileId(1), ""),
            (FileId(2), ""),
        ],
        vec![
            Item::module_decl("foo", FileId(1), []),
            Item::module_decl("foo", FileId(2), []),
            Item::unresolved_module_decl("bar"),
            Item::unresolved_module_decl("bar"),
        ],
    );
}

#[test]
fn duplicates_inside_module_files() {
    check_files(
        &[
            (FileId(0), "mod foo;\n"),
            (
                FileId(1),
                r#"fn f() {}
fn <error descr="A value named `f` has already been defined in this module [E0428]">f</error>() {}
"#,
            ),
        ],
        vec![Item::module_decl(
            "foo",
            FileId(1),
            [Item::function("f"), Item::function("f")],
        )],
    );
}

#[test]
fn settings_disable_and_downgrade_codes() {
    let (_, tree) = tree_of(
        "fn f() {} fn f() {} struct S { a: u8, a: u8 }",
        vec![
            Item::function("f"),
            Item::function("f"),
            Item::structure("S")
                .field(FieldDecl::new("a"))
                .field(FieldDecl::new("a")),
        ],
    );
    let config = AnalysisConfig::from_toml_str(
        r#"
[diagnostics]
disabled = ["E0428"]

[diagnostics.severity_overrides]
E0124 = "warning"
"#,
    )
    .unwrap();
    let diagnostics = check_with_config(&tree, &config);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::DuplicateField);
    assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Warning);
}

#[test]
fn diagnostics_render_with_code_and_range() {
    let (_, tree) = tree_of(
        "mod m { fn hidden() {} } use m::hidden;",
        vec![
            Item::module("m", [Item::function("hidden")]),
            Item::use_item(UseTree::simple("m::hidden")),
        ],
    );
    let rendered: Vec<String> = diagnostics_with(&tree, &CfgOptions::new())
        .iter()
        .map(ToString::to_string)
        .collect();
    expect![[r#"
        [
            "error[E0603]: Function `m::hidden` is private (at 29..38)",
        ]
    "#]]
    .assert_debug_eq(&rendered);
}
