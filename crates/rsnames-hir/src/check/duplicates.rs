//! Duplicate detection within one container.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::diagnostics::{Diagnostic, DiagnosticBuilder, DiagnosticCode};
use crate::span::SourceSpan;
use crate::symbols::{
    Container, ContainerKind, DeclKind, Declaration, Namespaces, SelfImportGroup,
};

/// Reports every declaration that collides with an earlier one of `container`.
///
/// Each collision group is checked on its own, so `k` same-named
/// declarations in one group yield `k - 1` diagnostics, each anchored at the
/// later declaration with the first one as related span.
#[must_use]
pub fn detect(container: &Container) -> Vec<Diagnostic> {
    let mut diagnostics = DiagnosticBuilder::new();
    let decls = container.in_source_order();

    for group in Namespaces::COLLISION_GROUPS {
        let mut by_name: IndexMap<&SmolStr, Vec<&Declaration>> = IndexMap::new();
        for decl in decls.iter().copied() {
            if takes_part(decl, group) {
                by_name.entry(&decl.name).or_default().push(decl);
            }
        }

        for same_name in by_name.values() {
            for (position, later) in same_name.iter().enumerate().skip(1) {
                let Some(first) = same_name[..position]
                    .iter()
                    .find(|earlier| collides(earlier, later))
                else {
                    continue;
                };
                diagnostics.add(duplicate(container.kind, group, first, later));
            }
        }
    }

    let mut diagnostics = diagnostics.finish();
    let mut seen = rustc_hash::FxHashSet::default();
    diagnostics.retain(|diagnostic| seen.insert((diagnostic.code, diagnostic.span)));
    diagnostics.sort_by_key(|diagnostic| diagnostic.span);
    diagnostics
}

/// Reports every un-aliased `self` after the first one of a use group.
#[must_use]
pub fn detect_self_imports(groups: &[SelfImportGroup]) -> Vec<Diagnostic> {
    let mut diagnostics = DiagnosticBuilder::new();
    for group in groups.iter().filter(|group| group.cfg.is_enabled()) {
        let Some((first, rest)) = group.spans.split_first() else {
            continue;
        };
        for span in rest {
            diagnostics.add(
                Diagnostic::error(
                    DiagnosticCode::DuplicateSelfImport,
                    *span,
                    "The `self` import appears more than once in the list",
                )
                .with_related(*first, "first `self` import here"),
            );
        }
    }
    diagnostics.finish()
}

fn takes_part(decl: &Declaration, group: Namespaces) -> bool {
    if !decl.is_enabled() || !decl.namespaces.intersects(group) {
        return false;
    }
    match decl.kind {
        DeclKind::MacroRules => false,
        DeclKind::Const | DeclKind::Import { .. } | DeclKind::ExternCrate => decl.name != "_",
        _ => true,
    }
}

/// Two `mod m;` collide only when they load the same file.
fn collides(first: &Declaration, later: &Declaration) -> bool {
    match (first.kind, later.kind) {
        (DeclKind::ModDecl { file: Some(a) }, DeclKind::ModDecl { file: Some(b) }) => a == b,
        (DeclKind::ModDecl { .. }, DeclKind::ModDecl { .. }) => false,
        _ => true,
    }
}

/// Where a declaration is reported; `extern crate` covers the whole item.
fn anchor(decl: &Declaration) -> SourceSpan {
    if decl.kind.is_extern_crate() {
        decl.item_span
    } else {
        decl.span
    }
}

fn duplicate(
    kind: ContainerKind,
    group: Namespaces,
    first: &Declaration,
    later: &Declaration,
) -> Diagnostic {
    let name = &later.name;
    let (code, message) = match import_collision(first, later) {
        Some(code) => (code, format!("The name `{}` is defined multiple times", name)),
        None => definition_collision(kind, group, name),
    };
    let previous = if first.kind.is_import() {
        "import"
    } else {
        "definition"
    };
    Diagnostic::error(code, anchor(later), message).with_related(
        anchor(first),
        format!(
            "previous {} of the {} `{}` here",
            previous,
            group.describe(),
            first.name
        ),
    )
}

fn import_collision(first: &Declaration, later: &Declaration) -> Option<DiagnosticCode> {
    let crates = (first.kind.is_extern_crate(), later.kind.is_extern_crate());
    let imports = (first.kind.is_import(), later.kind.is_import());
    let code = match (crates, imports) {
        ((true, true), _) => DiagnosticCode::DuplicateExternCrate,
        ((true, false), (_, true)) | ((false, true), (true, _)) => {
            DiagnosticCode::ExternCrateCollidesWithImport
        }
        ((true, false) | (false, true), _) => DiagnosticCode::ExternCrateCollidesWithItem,
        (_, (true, true)) => DiagnosticCode::DuplicateImport,
        (_, (true, false) | (false, true)) => DiagnosticCode::ImportCollidesWithItem,
        _ => return None,
    };
    Some(code)
}

fn definition_collision(
    kind: ContainerKind,
    group: Namespaces,
    name: &SmolStr,
) -> (DiagnosticCode, String) {
    match kind {
        ContainerKind::Module
        | ContainerKind::Block
        | ContainerKind::Trait
        | ContainerKind::ExternBlock => (
            DiagnosticCode::DuplicateDefinition,
            format!(
                "A {} named `{}` has already been defined in this {}",
                group.describe(),
                name,
                kind.scope_word()
            ),
        ),
        ContainerKind::Enum => (
            DiagnosticCode::DuplicateDefinition,
            format!("Enum variant `{}` is already declared", name),
        ),
        ContainerKind::Impl { .. } => (
            DiagnosticCode::DuplicateAssociatedItem,
            format!("Duplicate definitions with name `{}`", name),
        ),
        ContainerKind::Fields => (
            DiagnosticCode::DuplicateField,
            format!("Field `{}` is already declared", name),
        ),
        ContainerKind::GenericParams if group == Namespaces::LIFETIME => (
            DiagnosticCode::DuplicateLifetime,
            format!("Lifetime name `{}` declared twice in the same scope", name),
        ),
        ContainerKind::GenericParams => (
            DiagnosticCode::DuplicateGenericParam,
            format!(
                "The name `{}` is already used for a type parameter in this type parameter list",
                name
            ),
        ),
        ContainerKind::Params => (
            DiagnosticCode::DuplicateBinding,
            format!(
                "Identifier `{}` is bound more than once in this parameter list",
                name
            ),
        ),
    }
}
