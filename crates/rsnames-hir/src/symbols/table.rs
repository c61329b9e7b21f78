use rustc_hash::FxHashMap;

use super::defs::*;
use crate::cfg::CfgState;
use crate::span::FileId;
use crate::visibility::ModulePath;

/// The symbol table produced by one analysis pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    /// All containers, indexed by ID.
    containers: Vec<Container>,
    /// Module containers by path; the first registration of a path wins.
    modules: FxHashMap<ModulePath, ContainerId>,
    /// Named imports, indexed by ID.
    imports: Vec<ImportRecord>,
    /// Glob imports.
    globs: Vec<GlobImport>,
    /// Un-aliased `self` entries per use group.
    self_import_groups: Vec<SelfImportGroup>,
    /// Use sites inside bodies.
    accesses: Vec<AccessRecord>,
    /// Impl blocks.
    impls: Vec<ImplRecord>,
    /// Visibility qualifiers reported as written.
    qualifier_issues: Vec<QualifierIssue>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new(FileId::default())
    }
}

impl SymbolTable {
    /// Creates a table holding only the crate root module of `file_id`.
    #[must_use]
    pub fn new(file_id: FileId) -> Self {
        let mut table = Self {
            containers: Vec::new(),
            modules: FxHashMap::default(),
            imports: Vec::new(),
            globs: Vec::new(),
            self_import_groups: Vec::new(),
            accesses: Vec::new(),
            impls: Vec::new(),
            qualifier_issues: Vec::new(),
        };
        table.containers.push(Container {
            id: ContainerId::ROOT,
            kind: ContainerKind::Module,
            parent: None,
            module: ModulePath::root(),
            file_id,
            cfg: CfgState::Enabled,
            declarations: Vec::new(),
            imports: Vec::new(),
        });
        table.modules.insert(ModulePath::root(), ContainerId::ROOT);
        table
    }

    /// Creates a child container and returns its ID.
    pub fn add_container(
        &mut self,
        kind: ContainerKind,
        parent: ContainerId,
        module: ModulePath,
        file_id: FileId,
        cfg: CfgState,
    ) -> ContainerId {
        let id = ContainerId(self.containers.len() as u32);
        self.containers.push(Container {
            id,
            kind,
            parent: Some(parent),
            module,
            file_id,
            cfg,
            declarations: Vec::new(),
            imports: Vec::new(),
        });
        id
    }

    /// Gets a container by ID.
    #[must_use]
    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.0 as usize)
    }

    /// Returns all containers.
    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    /// Appends a declaration to its container.
    pub fn add_declaration(&mut self, decl: Declaration) -> Option<DeclId> {
        let container = self.containers.get_mut(decl.container.0 as usize)?;
        let id = DeclId {
            container: container.id,
            index: container.declarations.len() as u32,
        };
        container.declarations.push(decl);
        Some(id)
    }

    /// Gets a declaration by ID.
    #[must_use]
    pub fn declaration(&self, id: DeclId) -> Option<&Declaration> {
        self.container(id.container)?
            .declarations
            .get(id.index as usize)
    }

    /// Links a declaration to the container of its members.
    pub fn set_body(&mut self, id: DeclId, body: ContainerId) {
        if let Some(decl) = self
            .containers
            .get_mut(id.container.0 as usize)
            .and_then(|container| container.declarations.get_mut(id.index as usize))
        {
            decl.body = Some(body);
        }
    }

    /// Registers the container of a module path; later registrations are ignored.
    pub fn register_module(&mut self, path: ModulePath, id: ContainerId) {
        self.modules.entry(path).or_insert(id);
    }

    /// Looks up the container of a module path.
    #[must_use]
    pub fn module(&self, path: &ModulePath) -> Option<ContainerId> {
        self.modules.get(path).copied()
    }

    /// Records a named import and returns its ID.
    pub fn add_import(&mut self, mut record: ImportRecord) -> ImportId {
        let id = ImportId(self.imports.len() as u32);
        record.id = id;
        if let Some(container) = self.containers.get_mut(record.container.0 as usize) {
            container.imports.push(id);
        }
        self.imports.push(record);
        id
    }

    /// Gets an import by ID.
    #[must_use]
    pub fn import(&self, id: ImportId) -> Option<&ImportRecord> {
        self.imports.get(id.0 as usize)
    }

    /// Returns all named imports.
    pub fn imports(&self) -> &[ImportRecord] {
        &self.imports
    }

    /// Stores the resolution of an import.
    pub fn set_resolution(&mut self, id: ImportId, resolution: ImportResolution) {
        if let Some(record) = self.imports.get_mut(id.0 as usize) {
            record.resolution = Some(resolution);
        }
    }

    /// Nearest module container enclosing `id`, `id` itself included.
    #[must_use]
    pub fn module_of(&self, id: ContainerId) -> ContainerId {
        let mut current = id;
        while let Some(container) = self.container(current) {
            if container.kind == ContainerKind::Module {
                return current;
            }
            match container.parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        ContainerId::ROOT
    }

    /// Module path a container belongs to.
    #[must_use]
    pub fn module_path(&self, id: ContainerId) -> ModulePath {
        self.container(id)
            .map(|container| container.module.clone())
            .unwrap_or_default()
    }

    /// Module owning a declaration, which its visibility is relative to.
    #[must_use]
    pub fn owner_module(&self, id: DeclId) -> ModulePath {
        self.module_path(id.container)
    }

    /// Containers searched for an unqualified name written in `id`, innermost first.
    ///
    /// Blocks are walked outwards up to the enclosing module.
    #[must_use]
    pub fn lexical_scopes(&self, id: ContainerId) -> Vec<ContainerId> {
        let mut scopes = Vec::new();
        let mut current = Some(id);
        while let Some(container) = current.and_then(|id| self.container(id)) {
            if container.kind.is_lexical() {
                scopes.push(container.id);
            }
            if container.kind == ContainerKind::Module {
                break;
            }
            current = container.parent;
        }
        scopes
    }

    /// Records a glob import.
    pub fn add_glob(&mut self, glob: GlobImport) {
        self.globs.push(glob);
    }

    /// Returns all glob imports.
    pub fn globs(&self) -> &[GlobImport] {
        &self.globs
    }

    /// Records the `self` entries of one use group.
    pub fn add_self_import_group(&mut self, group: SelfImportGroup) {
        self.self_import_groups.push(group);
    }

    /// Returns all recorded `self` groups.
    pub fn self_import_groups(&self) -> &[SelfImportGroup] {
        &self.self_import_groups
    }

    /// Records a use site.
    pub fn add_access(&mut self, access: AccessRecord) {
        self.accesses.push(access);
    }

    /// Returns all use sites.
    pub fn accesses(&self) -> &[AccessRecord] {
        &self.accesses
    }

    /// Records an impl block.
    pub fn add_impl(&mut self, record: ImplRecord) {
        self.impls.push(record);
    }

    /// Returns all impl blocks.
    pub fn impls(&self) -> &[ImplRecord] {
        &self.impls
    }

    /// Records a misplaced or malformed visibility qualifier.
    pub fn add_qualifier_issue(&mut self, issue: QualifierIssue) {
        self.qualifier_issues.push(issue);
    }

    /// Returns all qualifier issues.
    pub fn qualifier_issues(&self) -> &[QualifierIssue] {
        &self.qualifier_issues
    }
}
