//! Privacy checks for imports, use sites and visibility qualifiers.

use std::cmp::Ordering;

use crate::diagnostics::{Diagnostic, DiagnosticBuilder, DiagnosticCode};
use crate::item_tree::{Access, Name, Path};
use crate::resolve::Resolver;
use crate::span::{FileId, SourceSpan};
use crate::symbols::{
    AccessRecord, Binding, ContainerId, DeclId, DeclKind, GlobImport, ImportRecord,
    ImportResolution, Namespaces, QualifierIssue, QualifierIssueKind, SymbolTable,
};
use crate::visibility::{ModulePath, ModuleReachability, Visibility};

/// Checks that every path names only what is visible from where it is written.
pub struct VisibilityValidator<'t> {
    table: &'t SymbolTable,
    reach: &'t dyn ModuleReachability,
    resolver: Resolver<'t>,
}

impl<'t> VisibilityValidator<'t> {
    /// Creates a validator over a finished table.
    pub fn new(table: &'t SymbolTable, reach: &'t dyn ModuleReachability) -> Self {
        Self {
            table,
            reach,
            resolver: Resolver::new(table, reach),
        }
    }

    /// Validates every import, glob, use site and qualifier of the table.
    pub fn run(&mut self) -> Vec<Diagnostic> {
        let table = self.table;
        let mut diagnostics = DiagnosticBuilder::new();
        for record in table.imports() {
            if let Some(diagnostic) = self.validate_import(record) {
                diagnostics.add(diagnostic);
            }
        }
        for glob in table.globs() {
            if let Some(diagnostic) = self.validate_glob(glob) {
                diagnostics.add(diagnostic);
            }
        }
        for access in table.accesses() {
            if let Some(diagnostic) = self.validate_access(access) {
                diagnostics.add(diagnostic);
            }
        }
        for issue in table.qualifier_issues() {
            if let Some(diagnostic) = qualifier_issue(issue) {
                diagnostics.add(diagnostic);
            }
        }
        diagnostics.finish()
    }

    /// Checks one named import; unresolved and cfg-gated imports are skipped.
    pub fn validate_import(&mut self, record: &ImportRecord) -> Option<Diagnostic> {
        if !record.cfg.is_enabled() {
            return None;
        }
        let resolution = record.resolution.as_ref()?;
        let site = self.table.module_path(record.container);
        if let Some(diagnostic) =
            self.check_qualifiers(&record.path, &resolution.qualifiers, &site, record.file_id)
        {
            return Some(diagnostic);
        }
        if record.is_self_import() {
            return self.check_self_import(record, resolution, &site);
        }
        if record.is_reexport() {
            self.check_reexport(record, resolution, &site)
        } else {
            self.check_target(&record.path, &resolution.targets, &site, record.file_id)
        }
    }

    /// Checks the module path of a glob import.
    pub fn validate_glob(&mut self, glob: &GlobImport) -> Option<Diagnostic> {
        if !glob.cfg.is_enabled() {
            return None;
        }
        let resolved =
            self.resolver
                .resolve_path(&glob.path, glob.container, Namespaces::MODULE_LIKE)?;
        let site = self.table.module_path(glob.container);
        self.check_qualifiers(&glob.path, &resolved.qualifiers, &site, glob.file_id)
            .or_else(|| self.check_target(&glob.path, &resolved.targets, &site, glob.file_id))
    }

    /// Checks one use site inside a body.
    pub fn validate_access(&mut self, record: &AccessRecord) -> Option<Diagnostic> {
        if !record.cfg.is_enabled() {
            return None;
        }
        let site = self.table.module_path(record.container);
        match &record.access {
            Access::Path { path, namespace } => {
                let resolved =
                    self.resolver
                        .resolve_path(path, record.container, namespace.set())?;
                self.check_qualifiers(path, &resolved.qualifiers, &site, record.file_id)
                    .or_else(|| self.check_target(path, &resolved.targets, &site, record.file_id))
            }
            Access::Field { owner, field } => {
                self.check_field(owner, field, record.container, &site, record.file_id)
            }
            Access::Method { owner, method } => {
                self.check_method(owner, method, record.container, &site, record.file_id)
            }
        }
    }

    /// First declaration a binding resolves to.
    fn item(&mut self, binding: Binding) -> Option<(DeclId, DeclKind)> {
        let id = self.resolver.items_of(binding).into_iter().next()?;
        Some((id, self.table.declaration(id)?.kind))
    }

    fn check_qualifiers(
        &mut self,
        path: &Path,
        qualifiers: &[(usize, Binding)],
        site: &ModulePath,
        file_id: FileId,
    ) -> Option<Diagnostic> {
        let (index, binding) = qualifiers
            .iter()
            .copied()
            .find(|(_, binding)| !self.resolver.is_visible(*binding, site))?;
        let kind = self.item(binding).map(|(_, kind)| kind);
        let range = path.prefix_range(index)?;
        Some(private_item(
            kind,
            SourceSpan::new(file_id, range),
            &path.prefix_text(index),
        ))
    }

    /// Plain access: some target must be visible.
    fn check_target(
        &mut self,
        path: &Path,
        targets: &[Binding],
        site: &ModulePath,
        file_id: FileId,
    ) -> Option<Diagnostic> {
        if targets
            .iter()
            .any(|binding| self.resolver.is_visible(*binding, site))
        {
            return None;
        }
        let kind = self.item(*targets.first()?).map(|(_, kind)| kind);
        let range = path.range()?;
        Some(private_item(
            kind,
            SourceSpan::new(file_id, range),
            &path.texts().join("::"),
        ))
    }

    /// `pub use m::{self}` needs module `m` to be visible and at least as
    /// visible as the re-export.
    fn check_self_import(
        &mut self,
        record: &ImportRecord,
        resolution: &ImportResolution,
        site: &ModulePath,
    ) -> Option<Diagnostic> {
        if !record.is_reexport() {
            return self.check_target(&record.path, &resolution.targets, site, record.file_id);
        }
        if self.exports_any(record, &resolution.targets, site) {
            return None;
        }
        let range = record.self_range?;
        let module = record.path.last()?;
        Some(Diagnostic::error(
            DiagnosticCode::PrivateModuleReexport,
            SourceSpan::new(record.file_id, range),
            format!("`{}` is private, and cannot be re-exported", module.text),
        ))
    }

    fn check_reexport(
        &mut self,
        record: &ImportRecord,
        resolution: &ImportResolution,
        site: &ModulePath,
    ) -> Option<Diagnostic> {
        if self.exports_any(record, &resolution.targets, site) {
            return None;
        }
        let target = record.path.last()?;
        let kind = self.item(*resolution.targets.first()?).map(|(_, kind)| kind);
        let code = if kind.is_some_and(|kind| kind.is_module()) {
            DiagnosticCode::PrivateModuleInPath
        } else {
            DiagnosticCode::PrivateItemCannotBeReexported
        };
        let diagnostic = Diagnostic::error(
            code,
            SourceSpan::new(record.file_id, target.range),
            format!("`{}` is private, and cannot be re-exported", target.text),
        );
        match self.narrowing(record, &resolution.targets, site) {
            Some(suggestion) => Some(diagnostic.with_suggestion(suggestion)),
            None => Some(diagnostic),
        }
    }

    /// True when some target is visible here and admits every module the
    /// re-export does.
    fn exports_any(&self, record: &ImportRecord, targets: &[Binding], site: &ModulePath) -> bool {
        let Some(exported) = &record.visibility else {
            return true;
        };
        targets.iter().any(|binding| {
            if !self.resolver.is_visible(*binding, site) {
                return false;
            }
            match self.resolver.visibility_of(*binding) {
                Some((visibility, owner)) => {
                    exported.is_within(site, &visibility, &owner, self.reach)
                }
                None => true,
            }
        })
    }

    /// Visibility the re-export could have, when some visible target is
    /// strictly narrower than it.
    fn narrowing(
        &self,
        record: &ImportRecord,
        targets: &[Binding],
        site: &ModulePath,
    ) -> Option<Visibility> {
        let exported = record.visibility.as_ref()?;
        targets.iter().find_map(|binding| {
            if !self.resolver.is_visible(*binding, site) {
                return None;
            }
            let (visibility, owner) = self.resolver.visibility_of(*binding)?;
            (exported.compare(site, &visibility, &owner, self.reach) == Some(Ordering::Greater))
                .then(|| visibility.relative_to(&owner, site))
        })
    }

    /// Struct or union declarations a type path names.
    fn adts(&mut self, owner: &Path, from: ContainerId) -> Vec<DeclId> {
        let table = self.table;
        let Some(resolved) = self.resolver.resolve_path(owner, from, Namespaces::TYPE) else {
            return Vec::new();
        };
        resolved
            .targets
            .into_iter()
            .flat_map(|binding| self.resolver.items_of(binding))
            .filter(|id| {
                table.declaration(*id).is_some_and(|decl| {
                    matches!(decl.kind, DeclKind::Struct | DeclKind::Union | DeclKind::Enum)
                })
            })
            .collect()
    }

    fn check_field(
        &mut self,
        owner: &Path,
        field: &Name,
        from: ContainerId,
        site: &ModulePath,
        file_id: FileId,
    ) -> Option<Diagnostic> {
        for adt in self.adts(owner, from) {
            let Some(decl) = self.table.declaration(adt) else {
                continue;
            };
            if decl.kind == DeclKind::Enum {
                continue;
            }
            let Some(fields) = decl.body.and_then(|body| self.table.container(body)) else {
                continue;
            };
            let Some((id, member)) = fields.lookup(&field.text).next() else {
                continue;
            };
            if member
                .visibility
                .is_visible_from(&self.table.owner_module(id), site, self.reach)
            {
                return None;
            }
            let struct_name = self.table.owner_module(adt).qualify(&decl.name);
            return Some(Diagnostic::error(
                DiagnosticCode::PrivateFieldAccess,
                SourceSpan::new(file_id, field.range),
                format!("Field `{}` of struct `{}` is private", field.text, struct_name),
            ));
        }
        None
    }

    /// Only inherent impls are searched; trait methods are never private.
    fn check_method(
        &mut self,
        owner: &Path,
        method: &Name,
        from: ContainerId,
        site: &ModulePath,
        file_id: FileId,
    ) -> Option<Diagnostic> {
        let adts = self.adts(owner, from);
        if adts.is_empty() {
            return None;
        }
        let table = self.table;
        for imp in table.impls() {
            if imp.trait_impl || !imp.cfg.is_enabled() {
                continue;
            }
            if !self
                .adts(&imp.self_ty, imp.scope)
                .iter()
                .any(|id| adts.contains(id))
            {
                continue;
            }
            let Some(body) = table.container(imp.body) else {
                continue;
            };
            let Some((id, member)) = body
                .lookup(&method.text)
                .find(|(_, decl)| decl.kind == DeclKind::Fn)
            else {
                continue;
            };
            if member
                .visibility
                .is_visible_from(&table.owner_module(id), site, self.reach)
            {
                return None;
            }
            return Some(Diagnostic::error(
                DiagnosticCode::PrivateMethodAccess,
                SourceSpan::new(file_id, method.range),
                format!("Method `{}` is private", method.text),
            ));
        }
        None
    }
}

/// E0603 for an item or module that cannot be named.
fn private_item(kind: Option<DeclKind>, span: SourceSpan, text: &str) -> Diagnostic {
    let (code, noun) = match kind {
        Some(kind) if kind.is_module() => (DiagnosticCode::PrivateModuleInPath, "Module"),
        Some(kind) => (DiagnosticCode::PrivateAccess, kind.noun()),
        None => (DiagnosticCode::PrivateAccess, "Item"),
    };
    Diagnostic::error(code, span, format!("{} `{}` is private", noun, text))
}

fn qualifier_issue(issue: &QualifierIssue) -> Option<Diagnostic> {
    if !issue.cfg.is_enabled() {
        return None;
    }
    let diagnostic = match issue.kind {
        QualifierIssueKind::Unnecessary => Diagnostic::error(
            DiagnosticCode::UnnecessaryVisibilityQualifier,
            issue.span,
            "Unnecessary visibility qualifier",
        ),
        QualifierIssueKind::MissingIn => Diagnostic::error(
            DiagnosticCode::IncorrectVisibilityRestriction,
            issue.span,
            "Incorrect visibility restriction",
        ),
    };
    Some(diagnostic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::CfgOptions;
    use crate::item_tree::{FieldDecl, Item, ItemTree, ItemTreeBuilder, Stmt, UseTree};
    use crate::scope::ScopeBuilder;
    use crate::symbols::Namespace;
    use crate::visibility::ModuleTreeReachability;

    fn validate(source: &str, tree: &ItemTree) -> Vec<(String, String, &'static str)> {
        let reach = ModuleTreeReachability;
        let table = ScopeBuilder::new(&CfgOptions::new(), &reach).build(tree);
        VisibilityValidator::new(&table, &reach)
            .run()
            .into_iter()
            .map(|diagnostic| {
                (
                    source[diagnostic.span.range].to_string(),
                    diagnostic.message,
                    diagnostic.code.code(),
                )
            })
            .collect()
    }

    #[test]
    fn private_function_through_a_use() {
        let source = "mod foo { fn bar() {} } use foo::bar;";
        let tree = ItemTreeBuilder::new(source)
            .item(Item::module("foo", [Item::function("bar")]))
            .item(Item::use_item(UseTree::simple("foo::bar")))
            .finish()
            .unwrap();
        assert_eq!(
            validate(source, &tree),
            vec![(
                "foo::bar".to_string(),
                "Function `foo::bar` is private".to_string(),
                "E0603"
            )]
        );
    }

    #[test]
    fn private_module_in_the_middle_of_a_path() {
        let source = "mod foo { mod qwe { pub struct Foo; } } mod bar { use crate::foo::qwe::Foo; }";
        let tree = ItemTreeBuilder::new(source)
            .item(Item::module(
                "foo",
                [Item::module("qwe", [Item::structure("Foo").public()])],
            ))
            .item(Item::module(
                "bar",
                [Item::use_item(UseTree::simple("crate::foo::qwe::Foo"))],
            ))
            .finish()
            .unwrap();
        assert_eq!(
            validate(source, &tree),
            vec![(
                "crate::foo::qwe".to_string(),
                "Module `crate::foo::qwe` is private".to_string(),
                "E0603"
            )]
        );
    }

    #[test]
    fn private_module_cannot_be_reexported() {
        let source = "mod bar {} pub use bar as baz;";
        let tree = ItemTreeBuilder::new(source)
            .item(Item::module("bar", []))
            .item(Item::use_item(UseTree::alias("bar", "baz")).public())
            .finish()
            .unwrap();
        assert_eq!(
            validate(source, &tree),
            vec![(
                "bar".to_string(),
                "`bar` is private, and cannot be re-exported".to_string(),
                "E0603"
            )]
        );
    }

    #[test]
    fn reexport_suggests_the_target_visibility() {
        let source = "mod m { pub(crate) fn f() {} } pub use m::f;";
        let tree = ItemTreeBuilder::new(source)
            .item(Item::module(
                "m",
                [Item::function("f").vis(crate::item_tree::VisibilityExpr::crate_())],
            ))
            .item(Item::use_item(UseTree::simple("m::f")).public())
            .finish()
            .unwrap();
        let reach = ModuleTreeReachability;
        let table = ScopeBuilder::new(&CfgOptions::new(), &reach).build(&tree);
        let diagnostics = VisibilityValidator::new(&table, &reach).run();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::PrivateItemCannotBeReexported);
        assert_eq!(diagnostics[0].suggestion, Some(Visibility::Private));
    }

    #[test]
    fn private_field_and_method_accesses() {
        let source = "mod m { pub struct S { x: u8, pub y: u8 } impl S { fn hidden() {} pub fn shown() {} } } \
                      fn f() { s.x; s.y; s.hidden(); s.shown(); }";
        let tree = ItemTreeBuilder::new(source)
            .item(Item::module(
                "m",
                [
                    Item::structure("S")
                        .public()
                        .field(FieldDecl::new("x"))
                        .field(FieldDecl::new("y").public()),
                    Item::inherent_impl(
                        "S",
                        [Item::function("hidden"), Item::function("shown").public()],
                    ),
                ],
            ))
            .item(Item::function("f").body([
                Stmt::field("m::S", "x"),
                Stmt::field("m::S", "y"),
                Stmt::method("m::S", "hidden"),
                Stmt::method("m::S", "shown"),
            ]))
            .finish()
            .unwrap();
        assert_eq!(
            validate(source, &tree),
            vec![
                (
                    "x".to_string(),
                    "Field `x` of struct `m::S` is private".to_string(),
                    "E0616"
                ),
                (
                    "hidden".to_string(),
                    "Method `hidden` is private".to_string(),
                    "E0624"
                ),
            ]
        );
    }

    #[test]
    fn same_module_access_is_allowed() {
        let source = "fn secret() {} mod inner { fn g() { super::secret(); } }";
        let tree = ItemTreeBuilder::new(source)
            .item(Item::function("secret"))
            .item(Item::module(
                "inner",
                [Item::function("g").body([Stmt::path("super::secret", Namespace::Value)])],
            ))
            .finish()
            .unwrap();
        assert!(validate(source, &tree).is_empty());
    }
}
