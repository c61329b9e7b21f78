//! Lowering of written visibility qualifiers and `use` trees.

use rustc_hash::FxHashSet;
use text_size::TextRange;

use crate::item_tree::{Name, Path, UseTree, UseTreeKind, VisibilityExpr};
use crate::visibility::{ModulePath, Visibility};

/// Outcome of lowering a qualifier written in `module`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct LoweredVisibility {
    /// `None` when the restriction names no enclosing module.
    pub(super) visibility: Option<Visibility>,
    /// Range of a `pub(path)` restriction written without `in`.
    pub(super) missing_in: Option<TextRange>,
}

pub(super) fn lower_visibility(
    expr: &VisibilityExpr,
    module: &ModulePath,
    modules: &FxHashSet<ModulePath>,
) -> LoweredVisibility {
    let mut missing_in = None;
    let visibility = match expr {
        VisibilityExpr::Inherited | VisibilityExpr::PubSelf { .. } => Some(Visibility::Private),
        VisibilityExpr::Pub { .. } => Some(Visibility::Public),
        VisibilityExpr::PubCrate { .. } => Some(Visibility::PublicInPath(ModulePath::root())),
        VisibilityExpr::PubSuper { .. } => module.parent().map(Visibility::PublicInPath),
        VisibilityExpr::PubIn { path, has_in, .. } => {
            let shorthand = path.segments.len() == 1
                && matches!(path.segments[0].text.as_str(), "crate" | "self" | "super");
            if !*has_in && !shorthand {
                missing_in = path.range();
                None
            } else {
                restriction(path, module, modules).map(|root| {
                    if &root == module {
                        Visibility::Private
                    } else {
                        Visibility::PublicInPath(root)
                    }
                })
            }
        }
    };
    LoweredVisibility {
        visibility,
        missing_in,
    }
}

/// Resolves `crate::a`, `self::b`, `super::super` to an enclosing module.
fn restriction(
    path: &Path,
    module: &ModulePath,
    modules: &FxHashSet<ModulePath>,
) -> Option<ModulePath> {
    let mut segments = path.segments.iter();
    let mut current = match segments.next()?.text.as_str() {
        "crate" => ModulePath::root(),
        "self" => module.clone(),
        "super" => module.parent()?,
        _ => return None,
    };
    for segment in segments {
        current = match segment.text.as_str() {
            "super" => current.parent()?,
            "crate" | "self" => return None,
            name => current.join(name),
        };
    }
    (modules.contains(&current) && module.starts_with(&current)).then_some(current)
}

/// One name bound by a `use` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct FlatImport {
    /// Full path; for `self` entries, the path of the module.
    pub(super) path: Path,
    /// Bound name, at the range it is reported at.
    pub(super) name: Name,
    /// Whether `as` was written.
    pub(super) aliased: bool,
    /// Range of the `self` keyword of a `{self}` entry.
    pub(super) self_range: Option<TextRange>,
}

/// A flattened `use` item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct FlatUse {
    pub(super) imports: Vec<FlatImport>,
    pub(super) globs: Vec<Path>,
    /// Ranges of un-aliased `self` entries, per group.
    pub(super) self_groups: Vec<Vec<TextRange>>,
}

pub(super) fn flatten_use(tree: &UseTree) -> FlatUse {
    let mut flat = FlatUse::default();
    flatten(tree, &[], &mut flat);
    flat
}

fn is_self_entry(tree: &UseTree) -> bool {
    tree.path.segments.len() == 1 && tree.path.segments[0].text == "self"
}

fn flatten(tree: &UseTree, prefix: &[Name], flat: &mut FlatUse) {
    let mut full: Vec<Name> = prefix.to_vec();
    full.extend(tree.path.segments.iter().cloned());
    match &tree.kind {
        UseTreeKind::Glob => flat.globs.push(Path { segments: full }),
        UseTreeKind::Group { trees } => {
            let mut selves = Vec::new();
            for subtree in trees {
                let plain_self = is_self_entry(subtree)
                    && matches!(subtree.kind, UseTreeKind::Simple { alias: None });
                if plain_self {
                    selves.push(subtree.path.segments[0].range);
                    if selves.len() > 1 {
                        continue;
                    }
                }
                flatten(subtree, &full, flat);
            }
            if !selves.is_empty() {
                flat.self_groups.push(selves);
            }
        }
        UseTreeKind::Simple { alias } => {
            let Some((last, init)) = full.split_last() else {
                return;
            };
            if last.text == "self" {
                let Some(module_name) = init.last() else {
                    return;
                };
                let name = alias
                    .clone()
                    .unwrap_or_else(|| Name::at(module_name.text.clone(), last.range));
                flat.imports.push(FlatImport {
                    path: Path {
                        segments: init.to_vec(),
                    },
                    name,
                    aliased: alias.is_some(),
                    self_range: Some(last.range),
                });
                return;
            }
            if alias.is_none() && matches!(last.text.as_str(), "crate" | "super") {
                return;
            }
            flat.imports.push(FlatImport {
                name: alias.clone().unwrap_or_else(|| last.clone()),
                aliased: alias.is_some(),
                path: Path { segments: full },
                self_range: None,
            });
        }
    }
}
