//! Shared helpers for checker tests.
//!
//! Fixtures are Rust source annotated with the expected diagnostics:
//! `struct <error descr="Field `a` is already declared [E0124]">a</error>`.
//! The markup is stripped, the item tree is built against the plain source,
//! and the reported diagnostics are compared with the annotations.
#![allow(dead_code, unused_imports)]

pub use rsnames_hir::cfg::{CfgAttr, CfgExpr, CfgOptions, CfgState};
pub use rsnames_hir::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSeverity};
pub use rsnames_hir::item_tree::{
    FieldDecl, GenericParamKind, Item, ItemTree, ItemTreeBuilder, Stmt, UseTree, Variant,
    VisibilityExpr,
};
pub use rsnames_hir::span::FileId;
pub use rsnames_hir::symbols::Namespace;
pub use rsnames_hir::visibility::{ModuleTreeReachability, Visibility};
pub use rsnames_hir::Analysis;

const OPEN: &str = "<error descr=\"";
const CLOSE: &str = "</error>";

/// One expected or reported diagnostic: file, range and `message [CODE]`.
pub type Annotation = (FileId, u32, u32, String);

/// Source with its markup removed, plus the annotations it carried.
pub struct Fixture {
    pub source: String,
    pub annotations: Vec<Annotation>,
}

/// Strips `<error descr="..">..</error>` markup from `marked`.
pub fn parse_markup(file_id: FileId, marked: &str) -> Fixture {
    let mut source = String::new();
    let mut annotations = Vec::new();
    let mut open: Vec<(u32, String)> = Vec::new();
    let mut rest = marked;
    loop {
        let next_open = rest.find(OPEN);
        let next_close = rest.find(CLOSE);
        match (next_open, next_close) {
            (Some(o), c) if c.map_or(true, |c| o < c) => {
                source.push_str(&rest[..o]);
                let after = &rest[o + OPEN.len()..];
                let end = after.find("\">").expect("unterminated descr");
                open.push((source.len() as u32, after[..end].to_string()));
                rest = &after[end + 2..];
            }
            (_, Some(c)) => {
                source.push_str(&rest[..c]);
                let (start, message) = open.pop().expect("unbalanced </error>");
                annotations.push((file_id, start, source.len() as u32, message));
                rest = &rest[c + CLOSE.len()..];
            }
            _ => {
                source.push_str(rest);
                break;
            }
        }
    }
    assert!(open.is_empty(), "unclosed <error> markup");
    annotations.sort();
    Fixture {
        source,
        annotations,
    }
}

/// Renders reported diagnostics in annotation form.
pub fn annotations_of(diagnostics: &[Diagnostic]) -> Vec<Annotation> {
    let mut annotations: Vec<_> = diagnostics
        .iter()
        .map(|d| {
            (
                d.span.file_id,
                d.span.start(),
                d.span.end(),
                format!("{} [{}]", d.message, d.code.code()),
            )
        })
        .collect();
    annotations.sort();
    annotations
}

/// Builds the tree of a single-file fixture.
pub fn tree_of(marked: &str, items: Vec<Item>) -> (Fixture, ItemTree) {
    let fixture = parse_markup(FileId(0), marked);
    let tree = ItemTreeBuilder::new(fixture.source.clone())
        .items(items)
        .finish()
        .expect("fixture names must occur in the source");
    (fixture, tree)
}

/// Runs the analysis over `tree` with the given cfg options.
pub fn diagnostics_with(tree: &ItemTree, cfg: &CfgOptions) -> Vec<Diagnostic> {
    Analysis::new(cfg, &ModuleTreeReachability).check(tree)
}

/// Checks a single-file fixture with no cfg options enabled.
pub fn check_errors(marked: &str, items: Vec<Item>) {
    check_errors_with(marked, items, &CfgOptions::new());
}

/// Checks a single-file fixture under `cfg`.
pub fn check_errors_with(marked: &str, items: Vec<Item>, cfg: &CfgOptions) {
    let (fixture, tree) = tree_of(marked, items);
    let reported = annotations_of(&diagnostics_with(&tree, cfg));
    assert_eq!(
        reported, fixture.annotations,
        "\nsource:\n{}\n",
        fixture.source
    );
}

/// Checks a fixture spread over several files. The first file is the crate
/// root; the others are loaded by `mod m;` items built with
/// [`Item::module_decl`].
pub fn check_files(files: &[(FileId, &str)], items: Vec<Item>) {
    let mut expected = Vec::new();
    let mut sources = Vec::new();
    for (file_id, marked) in files {
        let fixture = parse_markup(*file_id, marked);
        expected.extend(fixture.annotations);
        sources.push((*file_id, fixture.source));
    }
    expected.sort();

    let (root_id, root_source) = sources.remove(0);
    assert_eq!(root_id, FileId(0), "the crate root must be file 0");
    let mut builder = ItemTreeBuilder::new(root_source);
    for (file_id, source) in sources {
        builder = builder.file(file_id, source);
    }
    let tree = builder
        .items(items)
        .finish()
        .expect("fixture names must occur in the source");
    let reported = annotations_of(&diagnostics_with(&tree, &CfgOptions::new()));
    assert_eq!(reported, expected);
}

/// Asserts that a fixture without markup reports nothing.
pub fn check_no_errors(source: &str, items: Vec<Item>) {
    check_errors(source, items);
}

/// Codes reported for a fixture, in reporting order.
pub fn codes(source: &str, items: Vec<Item>) -> Vec<&'static str> {
    let (_, tree) = tree_of(source, items);
    diagnostics_with(&tree, &CfgOptions::new())
        .iter()
        .map(|d| d.code.code())
        .collect()
}
