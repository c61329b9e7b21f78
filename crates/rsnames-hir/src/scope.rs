//! Scope building: from an item tree to a [`SymbolTable`].
//!
//! The walk runs in three phases. The module paths of the crate are
//! collected first so that `pub(in path)` restrictions can name modules
//! declared later in the source. The items are then walked into containers,
//! one per lexical scope, with the cfg state of each item recorded on its
//! declaration. Finally every named import is resolved and bound in its
//! container with the namespaces of what it resolves to.

mod lower;

use rustc_hash::{FxHashMap, FxHashSet};
use text_size::TextRange;
use tracing::{debug, trace};

use crate::cfg::{CfgEvaluator, CfgState};
use crate::item_tree::{
    Block, FieldDecl, FnItem, ImplItem, Item, ItemKind, ItemTree, ModuleFile, Name, Stmt,
    UseTree, VisibilityExpr,
};
use crate::resolve::Resolver;
use crate::span::{FileId, SourceSpan};
use crate::symbols::{
    AccessRecord, ContainerId, ContainerKind, DeclId, DeclKind, Declaration, GlobImport,
    ImplRecord, ImportId, ImportRecord, QualifierIssue, QualifierIssueKind, SelfImportGroup,
    SymbolTable,
};
use crate::visibility::{ModulePath, ModuleReachability, Visibility};

use lower::{flatten_use, lower_visibility};

/// Builds the symbol table of one analysis pass.
pub struct ScopeBuilder<'a> {
    cfg: &'a dyn CfgEvaluator,
    reach: &'a dyn ModuleReachability,
}

impl<'a> ScopeBuilder<'a> {
    /// Creates a builder over the host's oracles.
    pub fn new(cfg: &'a dyn CfgEvaluator, reach: &'a dyn ModuleReachability) -> Self {
        Self { cfg, reach }
    }

    /// Walks `tree` and returns the finished table. The tree is not modified.
    #[must_use]
    pub fn build(&self, tree: &ItemTree) -> SymbolTable {
        let mut modules = FxHashSet::default();
        modules.insert(ModulePath::root());
        collect_module_paths(
            self.cfg,
            &tree.items,
            &ModulePath::root(),
            CfgState::Enabled,
            &mut modules,
        );

        let mut collector = Collector {
            cfg: self.cfg,
            modules,
            table: SymbolTable::new(tree.file_id),
            files: FxHashMap::default(),
        };
        collector.files.insert(tree.file_id, ContainerId::ROOT);
        collector.items(&tree.items, ContainerId::ROOT, CfgState::Enabled);

        let mut table = collector.table;
        bind_imports(&mut table, self.reach);
        debug!(
            "built symbol table: {} containers, {} imports, {} accesses",
            table.containers().len(),
            table.imports().len(),
            table.accesses().len()
        );
        table
    }
}

fn collect_module_paths(
    cfg: &dyn CfgEvaluator,
    items: &[Item],
    module: &ModulePath,
    inherited: CfgState,
    modules: &mut FxHashSet<ModulePath>,
) {
    for item in items {
        let state = inherited.and(cfg.state(&item.cfg));
        if state == CfgState::Disabled {
            continue;
        }
        let Some(name) = &item.name else {
            continue;
        };
        let children = match &item.kind {
            ItemKind::Mod { items } => Some(items.as_slice()),
            ItemKind::ModDecl {
                file: Some(ModuleFile { items, .. }),
            } => Some(items.as_slice()),
            ItemKind::ModDecl { file: None } => None,
            _ => continue,
        };
        let path = module.join(name.text.clone());
        if let Some(children) = children {
            collect_module_paths(cfg, children, &path, state, modules);
        }
        modules.insert(path);
    }
}

struct Collector<'a> {
    cfg: &'a dyn CfgEvaluator,
    modules: FxHashSet<ModulePath>,
    table: SymbolTable,
    /// Module container created for each loaded file.
    files: FxHashMap<FileId, ContainerId>,
}

/// Where an item is being declared.
#[derive(Clone)]
struct Site {
    container: ContainerId,
    kind: ContainerKind,
    module: ModulePath,
    file: FileId,
}

impl Site {
    fn span(&self, range: TextRange) -> SourceSpan {
        SourceSpan::new(self.file, range)
    }
}

impl Collector<'_> {
    fn site(&self, container: ContainerId) -> Option<Site> {
        let scope = self.table.container(container)?;
        Some(Site {
            container,
            kind: scope.kind,
            module: scope.module.clone(),
            file: scope.file_id,
        })
    }

    fn child(&mut self, kind: ContainerKind, site: &Site, state: CfgState) -> ContainerId {
        self.table
            .add_container(kind, site.container, site.module.clone(), site.file, state)
    }

    /// Path of module `name` declared at `site`; registered as a known module.
    fn module_path(&mut self, site: &Site, name: &Name) -> ModulePath {
        let parent = if site.kind == ContainerKind::Block {
            site.module.block(site.container.0)
        } else {
            site.module.clone()
        };
        let module = parent.join(name.text.clone());
        self.modules.insert(module.clone());
        module
    }

    fn items(&mut self, items: &[Item], container: ContainerId, inherited: CfgState) {
        for item in items {
            self.item(item, container, inherited);
        }
    }

    fn qualifier_issue(
        &mut self,
        kind: QualifierIssueKind,
        site: &Site,
        range: TextRange,
        state: CfgState,
    ) {
        self.table.add_qualifier_issue(QualifierIssue {
            kind,
            span: site.span(range),
            cfg: state,
        });
    }

    /// Lowers a qualifier; `None` when the restriction cannot be resolved.
    fn lower(&mut self, expr: &VisibilityExpr, site: &Site, state: CfgState) -> Option<Visibility> {
        let lowered = lower_visibility(expr, &site.module, &self.modules);
        if let Some(range) = lowered.missing_in {
            self.qualifier_issue(QualifierIssueKind::MissingIn, site, range, state);
        }
        lowered.visibility
    }

    /// Flags a qualifier written where none is allowed.
    fn forbid_qualifier(&mut self, expr: &VisibilityExpr, site: &Site, state: CfgState) {
        if let Some(range) = expr.range() {
            self.qualifier_issue(QualifierIssueKind::Unnecessary, site, range, state);
        }
    }

    fn item_visibility(&mut self, item: &Item, site: &Site, state: CfgState) -> Visibility {
        match site.kind {
            ContainerKind::Impl { trait_impl: true } => {
                self.forbid_qualifier(&item.visibility, site, state);
                Visibility::Public
            }
            ContainerKind::Trait => Visibility::Public,
            _ => self
                .lower(&item.visibility, site, state)
                .unwrap_or(Visibility::Public),
        }
    }

    fn declare(
        &mut self,
        name: &Name,
        kind: DeclKind,
        visibility: Visibility,
        site: &Site,
        state: CfgState,
    ) -> Option<DeclId> {
        let decl = Declaration::new(
            name.text.clone(),
            kind,
            visibility,
            site.span(name.range),
            site.container,
            state,
        );
        self.table.add_declaration(decl)
    }

    fn item(&mut self, item: &Item, container: ContainerId, inherited: CfgState) {
        let Some(site) = self.site(container) else {
            return;
        };
        let state = inherited.and(self.cfg.state(&item.cfg));
        let walk = state != CfgState::Disabled;

        match &item.kind {
            ItemKind::Use { tree } => {
                if walk {
                    self.use_item(item, tree, &site, state);
                }
                return;
            }
            ItemKind::Impl(imp) => {
                self.forbid_qualifier(&item.visibility, &site, state);
                if walk {
                    self.impl_block(item, imp, &site, state);
                }
                return;
            }
            ItemKind::ExternBlock { items } => {
                self.forbid_qualifier(&item.visibility, &site, state);
                if walk {
                    let body = self.child(ContainerKind::ExternBlock, &site, state);
                    self.items(items, body, state);
                }
                return;
            }
            _ => {}
        }

        let visibility = self.item_visibility(item, &site, state);
        if let ItemKind::ExternCrate { alias } = &item.kind {
            let Some(name) = alias.as_ref().or(item.name.as_ref()) else {
                return;
            };
            let decl = Declaration::new(
                name.text.clone(),
                DeclKind::ExternCrate,
                visibility,
                site.span(name.range),
                site.container,
                state,
            )
            .with_item_span(site.span(item.range));
            self.table.add_declaration(decl);
            return;
        }

        let Some(name) = &item.name else {
            return;
        };
        let kind = match &item.kind {
            ItemKind::Const => DeclKind::Const,
            ItemKind::Static => DeclKind::Static,
            ItemKind::Fn(_) => DeclKind::Fn,
            ItemKind::Struct { .. } => DeclKind::Struct,
            ItemKind::Union { .. } => DeclKind::Union,
            ItemKind::Enum { .. } => DeclKind::Enum,
            ItemKind::Trait { .. } => DeclKind::Trait,
            ItemKind::TraitAlias => DeclKind::TraitAlias,
            ItemKind::Mod { .. } => DeclKind::Mod,
            ItemKind::ModDecl { file } => DeclKind::ModDecl {
                file: file.as_ref().map(|file| file.file_id),
            },
            ItemKind::TypeAlias => DeclKind::TypeAlias,
            ItemKind::MacroRules => DeclKind::MacroRules,
            ItemKind::Macro => DeclKind::Macro,
            ItemKind::ExternCrate { .. }
            | ItemKind::Use { .. }
            | ItemKind::Impl(_)
            | ItemKind::ExternBlock { .. } => return,
        };
        let Some(decl) = self.declare(name, kind, visibility.clone(), &site, state) else {
            return;
        };
        if !walk {
            trace!("skipping children of cfg-disabled `{}`", name.text);
            return;
        }
        self.generics(item, &site, state);

        let body = match &item.kind {
            ItemKind::Fn(func) => {
                self.function(func, &site, state);
                None
            }
            ItemKind::Struct { fields } | ItemKind::Union { fields } => {
                Some(self.fields(fields, &site, state, false))
            }
            ItemKind::Enum { variants } => {
                let body = self.child(ContainerKind::Enum, &site, state);
                let enum_site = Site {
                    container: body,
                    kind: ContainerKind::Enum,
                    ..site.clone()
                };
                for variant in variants {
                    let variant_state = state.and(self.cfg.state(&variant.cfg));
                    let Some(id) = self.declare(
                        &variant.name,
                        DeclKind::EnumVariant,
                        visibility.clone(),
                        &enum_site,
                        variant_state,
                    ) else {
                        continue;
                    };
                    if variant_state != CfgState::Disabled && !variant.fields.is_empty() {
                        let fields = self.fields(&variant.fields, &site, variant_state, true);
                        self.table.set_body(id, fields);
                    }
                }
                Some(body)
            }
            ItemKind::Trait { items } => {
                let body = self.child(ContainerKind::Trait, &site, state);
                self.items(items, body, state);
                Some(body)
            }
            ItemKind::Mod { items } => {
                let module = self.module_path(&site, name);
                let body = self.table.add_container(
                    ContainerKind::Module,
                    site.container,
                    module.clone(),
                    site.file,
                    state,
                );
                self.table.register_module(module, body);
                self.items(items, body, state);
                Some(body)
            }
            ItemKind::ModDecl {
                file: Some(ModuleFile { file_id, items }),
            } => {
                let module = self.module_path(&site, name);
                let body = if let Some(body) = self.files.get(file_id) {
                    debug!("{file_id} already loaded, `mod {}` reuses it", name.text);
                    *body
                } else {
                    let body = self.table.add_container(
                        ContainerKind::Module,
                        site.container,
                        module.clone(),
                        *file_id,
                        state,
                    );
                    self.files.insert(*file_id, body);
                    self.items(items, body, state);
                    body
                };
                self.table.register_module(module, body);
                Some(body)
            }
            _ => None,
        };
        if let Some(body) = body {
            self.table.set_body(decl, body);
        }
    }

    fn generics(&mut self, item: &Item, site: &Site, state: CfgState) {
        if item.generics.is_empty() {
            return;
        }
        let body = self.child(ContainerKind::GenericParams, site, state);
        let params_site = Site {
            container: body,
            kind: ContainerKind::GenericParams,
            ..site.clone()
        };
        for param in &item.generics {
            self.declare(
                &param.name,
                DeclKind::GenericParam(param.kind),
                Visibility::Private,
                &params_site,
                state,
            );
        }
    }

    fn function(&mut self, func: &FnItem, site: &Site, state: CfgState) {
        let Some(body) = &func.body else {
            return;
        };
        let params = self.child(ContainerKind::Params, site, state);
        let params_site = Site {
            container: params,
            kind: ContainerKind::Params,
            ..site.clone()
        };
        for param in &func.params {
            let param_state = state.and(self.cfg.state(&param.cfg));
            for binding in &param.bindings {
                self.declare(
                    binding,
                    DeclKind::Binding,
                    Visibility::Private,
                    &params_site,
                    param_state,
                );
            }
        }
        self.block(body, site, state);
    }

    fn fields(
        &mut self,
        fields: &[FieldDecl],
        site: &Site,
        state: CfgState,
        in_variant: bool,
    ) -> ContainerId {
        let body = self.child(ContainerKind::Fields, site, state);
        let fields_site = Site {
            container: body,
            kind: ContainerKind::Fields,
            ..site.clone()
        };
        for field in fields {
            let field_state = state.and(self.cfg.state(&field.cfg));
            let visibility = if in_variant {
                self.forbid_qualifier(&field.visibility, site, field_state);
                Visibility::Public
            } else {
                self.lower(&field.visibility, site, field_state)
                    .unwrap_or(Visibility::Public)
            };
            self.declare(
                &field.name,
                DeclKind::Field,
                visibility,
                &fields_site,
                field_state,
            );
        }
        body
    }

    fn block(&mut self, block: &Block, parent: &Site, state: CfgState) {
        let id = self.child(ContainerKind::Block, parent, state);
        let site = Site {
            container: id,
            kind: ContainerKind::Block,
            ..parent.clone()
        };
        for stmt in &block.stmts {
            match stmt {
                Stmt::Item(item) => self.item(item, id, state),
                Stmt::Block(inner) => self.block(inner, &site, state),
                Stmt::Access(access) => self.table.add_access(AccessRecord {
                    access: access.clone(),
                    container: id,
                    file_id: site.file,
                    cfg: state,
                }),
            }
        }
    }

    fn impl_block(&mut self, item: &Item, imp: &ImplItem, site: &Site, state: CfgState) {
        self.generics(item, site, state);
        let trait_impl = imp.trait_ref.is_some();
        let body = self.child(ContainerKind::Impl { trait_impl }, site, state);
        self.table.add_impl(ImplRecord {
            self_ty: imp.self_ty.clone(),
            trait_impl,
            scope: site.container,
            body,
            cfg: state,
        });
        self.items(&imp.items, body, state);
    }

    fn use_item(
        &mut self,
        item: &Item,
        tree: &UseTree,
        site: &Site,
        state: CfgState,
    ) {
        let visibility = self.lower(&item.visibility, site, state);
        let flat = flatten_use(tree);
        for import in flat.imports {
            self.table.add_import(ImportRecord {
                id: ImportId(0),
                path: import.path,
                name: import.name,
                aliased: import.aliased,
                self_range: import.self_range,
                visibility: visibility.clone(),
                container: site.container,
                file_id: site.file,
                cfg: state,
                resolution: None,
            });
        }
        for path in flat.globs {
            self.table.add_glob(GlobImport {
                path,
                container: site.container,
                file_id: site.file,
                cfg: state,
            });
        }
        for group in flat.self_groups {
            self.table.add_self_import_group(SelfImportGroup {
                spans: group.into_iter().map(|range| site.span(range)).collect(),
                cfg: state,
            });
        }
    }
}

/// Resolves every import and binds the resolved ones in their containers.
fn bind_imports(table: &mut SymbolTable, reach: &dyn ModuleReachability) {
    let resolutions: Vec<_> = {
        let mut resolver = Resolver::new(table, reach);
        (0..table.imports().len())
            .map(|index| {
                let id = ImportId(index as u32);
                (id, resolver.resolve_import(id))
            })
            .collect()
    };

    for (id, resolution) in resolutions {
        let Some(resolution) = resolution else {
            if let Some(record) = table.import(id) {
                debug!(
                    "unresolved import `{}` in {}",
                    record.path.texts().join("::"),
                    record.file_id
                );
            }
            continue;
        };
        let Some(record) = table.import(id) else {
            continue;
        };
        let decl = Declaration::new(
            record.name.text.clone(),
            DeclKind::Import {
                id,
                namespaces: resolution.namespaces,
            },
            record.visibility.clone().unwrap_or(Visibility::Public),
            record.span(),
            record.container,
            record.cfg,
        );
        table.add_declaration(decl);
        table.set_resolution(id, resolution);
    }
}
