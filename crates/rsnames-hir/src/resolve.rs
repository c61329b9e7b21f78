//! Path resolution over a [`SymbolTable`].
//!
//! Paths are resolved segment by segment. A leading `crate`, `self` or
//! `super` picks the starting module; otherwise the first segment is looked
//! up lexically, from the innermost block out to the enclosing module, and
//! then in the crate root. Every later segment is looked up in the members
//! of the module or enum the previous segment resolved to.
//!
//! Imports are resolved lazily and memoised. Chains deeper than
//! [`MAX_IMPORT_DEPTH`] and cycles resolve to nothing, and such failures are
//! not memoised since they depend on where the chain was entered.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::trace;

use crate::item_tree::Path;
use crate::symbols::{
    Binding, ContainerId, DeclId, Declaration, ImportId, ImportRecord, ImportResolution,
    Namespaces, SymbolTable,
};
use crate::visibility::{ModulePath, ModuleReachability, Visibility};

/// Longest chain of imports followed while resolving one path.
pub const MAX_IMPORT_DEPTH: usize = 16;

/// A resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolution {
    /// Bindings of the segments that were looked up inside a module or enum,
    /// by segment index.
    pub qualifiers: Vec<(usize, Binding)>,
    /// Bindings of the last segment.
    pub targets: Vec<Binding>,
}

#[derive(Debug, Clone)]
enum ImportState {
    InProgress,
    Done(Option<ImportResolution>),
}

/// Resolves paths and imports against a symbol table.
pub struct Resolver<'t> {
    table: &'t SymbolTable,
    reach: &'t dyn ModuleReachability,
    states: FxHashMap<ImportId, ImportState>,
    /// Set when a lookup hit the depth limit or a cycle.
    truncated: bool,
}

impl<'t> Resolver<'t> {
    /// Creates a resolver; imports already resolved in `table` are reused.
    pub fn new(table: &'t SymbolTable, reach: &'t dyn ModuleReachability) -> Self {
        let states = table
            .imports()
            .iter()
            .filter_map(|record| {
                let resolution = record.resolution.clone()?;
                Some((record.id, ImportState::Done(Some(resolution))))
            })
            .collect();
        Self {
            table,
            reach,
            states,
            truncated: false,
        }
    }

    /// Resolves one named import.
    pub fn resolve_import(&mut self, id: ImportId) -> Option<ImportResolution> {
        self.import_at(id, 0)
    }

    /// Resolves a path written in container `from`; the last segment is
    /// looked up in `namespaces`.
    pub fn resolve_path(
        &mut self,
        path: &Path,
        from: ContainerId,
        namespaces: Namespaces,
    ) -> Option<PathResolution> {
        self.path_at(path, from, namespaces, 0)
    }

    /// Item declarations a binding ultimately refers to.
    pub fn items_of(&mut self, binding: Binding) -> Vec<DeclId> {
        let mut items = Vec::new();
        self.collect_items(binding, 0, &mut items);
        items
    }

    /// Declared visibility of a binding and the module it is relative to.
    ///
    /// `None` for imports whose restriction could not be resolved.
    #[must_use]
    pub fn visibility_of(&self, binding: Binding) -> Option<(Visibility, ModulePath)> {
        match binding {
            Binding::Item(id) => {
                let decl = self.table.declaration(id)?;
                Some((decl.visibility.clone(), self.table.owner_module(id)))
            }
            Binding::Import(id) => {
                let record = self.table.import(id)?;
                Some((
                    record.visibility.clone()?,
                    self.table.module_path(record.container),
                ))
            }
        }
    }

    /// True when `binding` can be named from module `from`.
    #[must_use]
    pub fn is_visible(&self, binding: Binding, from: &ModulePath) -> bool {
        self.visibility_of(binding)
            .map_or(true, |(vis, owner)| vis.is_visible_from(&owner, from, self.reach))
    }

    fn import_at(&mut self, id: ImportId, depth: usize) -> Option<ImportResolution> {
        if depth > MAX_IMPORT_DEPTH {
            trace!("import chain deeper than {MAX_IMPORT_DEPTH} at {id:?}");
            self.truncated = true;
            return None;
        }
        match self.states.get(&id) {
            Some(ImportState::Done(resolution)) => return resolution.clone(),
            Some(ImportState::InProgress) => {
                trace!("import cycle through {id:?}");
                self.truncated = true;
                return None;
            }
            None => {}
        }
        let record = self.table.import(id)?;
        self.states.insert(id, ImportState::InProgress);
        let outer = std::mem::replace(&mut self.truncated, false);

        let resolution = self.import_resolution(record, depth);

        if self.truncated {
            self.states.remove(&id);
        } else {
            self.states
                .insert(id, ImportState::Done(resolution.clone()));
        }
        self.truncated |= outer;
        resolution
    }

    fn import_resolution(
        &mut self,
        record: &ImportRecord,
        depth: usize,
    ) -> Option<ImportResolution> {
        let wanted = if record.is_self_import() {
            Namespaces::MODULE_LIKE
        } else {
            Namespaces::all()
        };
        let resolved = self.path_at(&record.path, record.container, wanted, depth + 1)?;
        let mut targets = resolved.targets;
        if record.is_self_import() {
            targets.retain(|binding| {
                let binding = *binding;
                self.scope_of_at(binding, depth + 1).is_some()
            });
        }
        if targets.is_empty() {
            return None;
        }

        let site = self.table.module_path(record.container);
        let mut visible = Namespaces::empty();
        let mut all = Namespaces::empty();
        for binding in &targets {
            let namespaces = self.namespaces_at(*binding, depth + 1);
            all |= namespaces;
            if self.is_visible(*binding, &site) {
                visible |= namespaces;
            }
        }
        if record.is_self_import() {
            visible &= Namespaces::MODULE_LIKE;
            all &= Namespaces::MODULE_LIKE;
        }
        let namespaces = if visible.is_empty() { all } else { visible };
        if namespaces.is_empty() {
            return None;
        }
        Some(ImportResolution {
            qualifiers: resolved.qualifiers,
            targets,
            namespaces,
        })
    }

    fn namespaces_at(&mut self, binding: Binding, depth: usize) -> Namespaces {
        match binding {
            Binding::Item(id) => self
                .table
                .declaration(id)
                .map_or(Namespaces::empty(), |decl| decl.namespaces),
            Binding::Import(id) => self
                .import_at(id, depth)
                .map_or(Namespaces::empty(), |resolution| resolution.namespaces),
        }
    }

    fn collect_items(&mut self, binding: Binding, depth: usize, items: &mut Vec<DeclId>) {
        match binding {
            Binding::Item(id) => {
                if !items.contains(&id) {
                    items.push(id);
                }
            }
            Binding::Import(id) => {
                let Some(resolution) = self.import_at(id, depth) else {
                    return;
                };
                for target in resolution.targets {
                    self.collect_items(target, depth + 1, items);
                }
            }
        }
    }

    fn scope_of_at(&mut self, binding: Binding, depth: usize) -> Option<ContainerId> {
        let mut items = Vec::new();
        self.collect_items(binding, depth, &mut items);
        items.into_iter().find_map(|id| {
            let decl = self.table.declaration(id)?;
            decl.kind.is_module_like().then_some(decl.body).flatten()
        })
    }

    /// Module container `levels` modules above the one enclosing `from`,
    /// following the containers each module was declared in.
    fn ancestor_module(&self, from: ContainerId, levels: usize) -> Option<ContainerId> {
        let mut module = self.table.module_of(from);
        for _ in 0..levels {
            let parent = self.table.container(module)?.parent?;
            module = self.table.module_of(parent);
        }
        Some(module)
    }

    fn path_at(
        &mut self,
        path: &Path,
        from: ContainerId,
        namespaces: Namespaces,
        depth: usize,
    ) -> Option<PathResolution> {
        let segments = &path.segments;
        let mut index = 0;
        let mut scope = match segments.first()?.text.as_str() {
            "crate" => {
                index = 1;
                Some(ContainerId::ROOT)
            }
            "self" => {
                index = 1;
                Some(self.table.module_of(from))
            }
            "super" => {
                while segments.get(index).is_some_and(|segment| segment.text == "super") {
                    index += 1;
                }
                Some(self.ancestor_module(from, index)?)
            }
            _ => None,
        };
        if index >= segments.len() {
            return None;
        }

        let mut qualifiers = Vec::new();
        let last = segments.len() - 1;
        for (position, segment) in segments.iter().enumerate().skip(index) {
            let wanted = if position == last {
                namespaces
            } else {
                Namespaces::MODULE_LIKE
            };
            let bindings = match scope {
                Some(container) => self.lookup(container, &segment.text, wanted, depth),
                None => self.lookup_lexical(from, &segment.text, wanted, depth),
            };
            if bindings.is_empty() {
                return None;
            }
            if position == last {
                return Some(PathResolution {
                    qualifiers,
                    targets: bindings,
                });
            }
            let (binding, members) = bindings
                .iter()
                .find_map(|binding| Some((*binding, self.scope_of_at(*binding, depth)?)))?;
            if scope.is_some() {
                qualifiers.push((position, binding));
            }
            scope = Some(members);
        }
        None
    }

    fn lookup_lexical(
        &mut self,
        from: ContainerId,
        name: &SmolStr,
        namespaces: Namespaces,
        depth: usize,
    ) -> Vec<Binding> {
        for container in self.table.lexical_scopes(from) {
            let found = self.lookup(container, name, namespaces, depth);
            if !found.is_empty() {
                return found;
            }
        }
        self.lookup(ContainerId::ROOT, name, namespaces, depth)
    }

    /// Bindings named `name` in one container, items first.
    fn lookup(
        &mut self,
        container: ContainerId,
        name: &SmolStr,
        namespaces: Namespaces,
        depth: usize,
    ) -> Vec<Binding> {
        let Some(scope) = self.table.container(container) else {
            return Vec::new();
        };
        let mut bindings: Vec<Binding> = scope
            .lookup(name)
            .filter(|(_, decl)| is_resolvable_item(decl) && decl.namespaces.intersects(namespaces))
            .map(|(id, _)| Binding::Item(id))
            .collect();
        let imports: Vec<ImportId> = scope
            .imports
            .iter()
            .copied()
            .filter(|id| {
                self.table
                    .import(*id)
                    .is_some_and(|record| record.cfg.is_enabled() && record.name.text == *name)
            })
            .collect();
        for id in imports {
            if self.namespaces_at(Binding::Import(id), depth + 1).intersects(namespaces) {
                bindings.push(Binding::Import(id));
            }
        }
        bindings
    }
}

fn is_resolvable_item(decl: &Declaration) -> bool {
    !decl.kind.is_import() && !decl.kind.is_extern_crate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::CfgOptions;
    use crate::item_tree::{Item, ItemTree, ItemTreeBuilder, UseTree};
    use crate::scope::ScopeBuilder;
    use crate::visibility::ModuleTreeReachability;

    fn build(tree: &ItemTree) -> SymbolTable {
        ScopeBuilder::new(&CfgOptions::new(), &ModuleTreeReachability).build(tree)
    }

    fn target_names(table: &SymbolTable, resolver: &mut Resolver<'_>, binding: Binding) -> Vec<String> {
        resolver
            .items_of(binding)
            .into_iter()
            .map(|id| table.declaration(id).unwrap().name.to_string())
            .collect()
    }

    #[test]
    fn resolves_through_reexport_chains() {
        let source = "mod a { pub mod b { pub fn f() {} } } pub use a::b as c; use c::f as g;";
        let tree = ItemTreeBuilder::new(source)
            .item(Item::module(
                "a",
                [Item::module("b", [Item::function("f").public()]).public()],
            ))
            .item(Item::use_item(UseTree::alias("a::b", "c")).public())
            .item(Item::use_item(UseTree::alias("c::f", "g")))
            .finish()
            .unwrap();
        let table = build(&tree);
        let reach = ModuleTreeReachability;
        let mut resolver = Resolver::new(&table, &reach);

        let g = resolver.resolve_import(ImportId(1)).unwrap();
        assert_eq!(g.namespaces, Namespaces::VALUE);
        assert_eq!(target_names(&table, &mut resolver, g.targets[0]), vec!["f"]);
        assert!(g.qualifiers.is_empty());
    }

    #[test]
    fn cycles_resolve_to_nothing() {
        let source = "use self::a as b; use self::b as a;";
        let tree = ItemTreeBuilder::new(source)
            .item(Item::use_item(UseTree::alias("self::a", "b")))
            .item(Item::use_item(UseTree::alias("self::b", "a")))
            .finish()
            .unwrap();
        let table = build(&tree);
        assert!(table.imports().iter().all(|record| record.resolution.is_none()));
    }

    #[test]
    fn super_walks_up_modules() {
        let source = "fn top() {} mod m { mod n { use super::super::top; } }";
        let tree = ItemTreeBuilder::new(source)
            .item(Item::function("top"))
            .item(Item::module(
                "m",
                [Item::module(
                    "n",
                    [Item::use_item(UseTree::simple("super::super::top"))],
                )],
            ))
            .finish()
            .unwrap();
        let table = build(&tree);
        let resolution = table.imports()[0].resolution.as_ref().unwrap();
        assert_eq!(resolution.namespaces, Namespaces::VALUE);
    }

    #[test]
    fn qualifiers_record_segments_inside_modules() {
        let source = "mod a { pub mod b { pub struct S; } } use crate::a::b::S;";
        let tree = ItemTreeBuilder::new(source)
            .item(Item::module(
                "a",
                [Item::module("b", [Item::structure("S").public()]).public()],
            ))
            .item(Item::use_item(UseTree::simple("crate::a::b::S")))
            .finish()
            .unwrap();
        let table = build(&tree);
        let resolution = table.imports()[0].resolution.as_ref().unwrap();
        let positions: Vec<_> = resolution.qualifiers.iter().map(|(index, _)| *index).collect();
        assert_eq!(positions, vec![1, 2]);
    }
}
