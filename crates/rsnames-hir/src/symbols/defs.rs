//! Declarations, containers and the side records kept next to them.

use smol_str::SmolStr;
use text_size::TextRange;

use super::namespace::{classify, Namespaces};
use crate::cfg::CfgState;
use crate::item_tree::{Access, GenericParamKind, Name, Path};
use crate::span::{FileId, SourceSpan};
use crate::visibility::{ModulePath, Visibility};

/// A unique identifier for a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContainerId(pub u32);

impl ContainerId {
    /// The crate root module.
    pub const ROOT: Self = Self(0);
}

/// A declaration inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclId {
    /// Owning container.
    pub container: ContainerId,
    /// Position in the container's declaration list.
    pub index: u32,
}

/// A unique identifier for an import record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImportId(pub u32);

/// The kind of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// `const`
    Const,
    /// `static`
    Static,
    /// `fn`
    Fn,
    /// `struct`
    Struct,
    /// `union`
    Union,
    /// `enum`
    Enum,
    /// An enum variant.
    EnumVariant,
    /// `trait`
    Trait,
    /// `trait A = B;`
    TraitAlias,
    /// Inline `mod m { .. }`.
    Mod,
    /// `mod m;`, with the file the host loaded for it.
    ModDecl {
        /// Module identity, if the host resolved the declaration.
        file: Option<FileId>,
    },
    /// `type`
    TypeAlias,
    /// `macro_rules!`
    MacroRules,
    /// `macro`
    Macro,
    /// `extern crate`
    ExternCrate,
    /// A name bound by `use`.
    Import {
        /// The import record.
        id: ImportId,
        /// Namespaces of the resolved targets.
        namespaces: Namespaces,
    },
    /// A named field.
    Field,
    /// A generic parameter.
    GenericParam(GenericParamKind),
    /// A name bound by a function parameter pattern.
    Binding,
}

impl DeclKind {
    /// True for `use` bindings.
    #[must_use]
    pub fn is_import(&self) -> bool {
        matches!(self, DeclKind::Import { .. })
    }

    /// True for `extern crate`.
    #[must_use]
    pub fn is_extern_crate(&self) -> bool {
        matches!(self, DeclKind::ExternCrate)
    }

    /// True for inline and file modules.
    #[must_use]
    pub fn is_module(&self) -> bool {
        matches!(self, DeclKind::Mod | DeclKind::ModDecl { .. })
    }

    /// Kinds whose members can be reached with `::`.
    #[must_use]
    pub fn is_module_like(&self) -> bool {
        self.is_module() || matches!(self, DeclKind::Enum)
    }

    /// Noun used in privacy messages.
    #[must_use]
    pub fn noun(&self) -> &'static str {
        match self {
            DeclKind::Mod | DeclKind::ModDecl { .. } => "Module",
            DeclKind::Const | DeclKind::Static => "Constant",
            DeclKind::Fn => "Function",
            DeclKind::Struct => "Struct",
            DeclKind::Enum => "Enum",
            DeclKind::Trait => "Trait",
            DeclKind::TypeAlias => "Type alias",
            _ => "Item",
        }
    }
}

/// One named entry of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Bound name.
    pub name: SmolStr,
    /// Namespaces the name is bound in; never empty.
    pub namespaces: Namespaces,
    /// Declaration kind.
    pub kind: DeclKind,
    /// Declared visibility, relative to the container's module.
    pub visibility: Visibility,
    /// Span of the bound identifier.
    pub span: SourceSpan,
    /// Span of the whole item.
    pub item_span: SourceSpan,
    /// Owning container.
    pub container: ContainerId,
    /// Conditional compilation state.
    pub cfg: CfgState,
    /// Container holding the members, for modules, enums, structs and traits.
    pub body: Option<ContainerId>,
}

impl Declaration {
    /// Creates a declaration; the namespace set follows from `kind`.
    ///
    /// # Panics
    ///
    /// Panics when `kind` classifies into no namespace, which only an import
    /// that failed to resolve can do.
    #[must_use]
    pub fn new(
        name: impl Into<SmolStr>,
        kind: DeclKind,
        visibility: Visibility,
        span: SourceSpan,
        container: ContainerId,
        cfg: CfgState,
    ) -> Self {
        let name = name.into();
        let namespaces = classify(&kind);
        assert!(
            !namespaces.is_empty(),
            "declaration `{name}` ({kind:?}) binds no namespace"
        );
        Self {
            name,
            namespaces,
            kind,
            visibility,
            span,
            item_span: span,
            container,
            cfg,
            body: None,
        }
    }

    /// Sets the span of the whole item.
    #[must_use]
    pub fn with_item_span(mut self, item_span: SourceSpan) -> Self {
        self.item_span = item_span;
        self
    }

    /// True when the declaration takes part in checks.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.cfg.is_enabled()
    }
}

/// The kind of a container; drives message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// A module or file.
    Module,
    /// A function body or nested block.
    Block,
    /// A trait body.
    Trait,
    /// An impl body.
    Impl {
        /// True for `impl Trait for Type`.
        trait_impl: bool,
    },
    /// An enum body.
    Enum,
    /// An `extern` block.
    ExternBlock,
    /// Named fields of a struct, union or variant.
    Fields,
    /// Generic parameters of an item.
    GenericParams,
    /// Parameters of a function with a body.
    Params,
}

impl ContainerKind {
    /// Word naming the scope in duplicate messages.
    #[must_use]
    pub fn scope_word(self) -> &'static str {
        match self {
            ContainerKind::Module | ContainerKind::ExternBlock => "module",
            ContainerKind::Block => "block",
            ContainerKind::Trait => "trait",
            _ => "scope",
        }
    }

    /// Containers consulted for names written without a qualifier.
    #[must_use]
    pub fn is_lexical(self) -> bool {
        matches!(self, ContainerKind::Module | ContainerKind::Block)
    }
}

/// A lexical scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// The container's unique ID.
    pub id: ContainerId,
    /// The kind of container.
    pub kind: ContainerKind,
    /// Enclosing container.
    pub parent: Option<ContainerId>,
    /// Module the container belongs to.
    pub module: ModulePath,
    /// File the container's source lives in.
    pub file_id: FileId,
    /// Conditional compilation state inherited by the members.
    pub cfg: CfgState,
    /// Declarations in insertion order.
    pub declarations: Vec<Declaration>,
    /// Named imports written in this container.
    pub imports: Vec<ImportId>,
}

impl Container {
    /// Declarations ordered by their identifier span.
    #[must_use]
    pub fn in_source_order(&self) -> Vec<&Declaration> {
        let mut decls: Vec<_> = self.declarations.iter().collect();
        decls.sort_by_key(|decl| decl.span);
        decls
    }

    /// Enabled declarations named `name`, with their ids.
    pub fn lookup<'a>(&'a self, name: &'a str) -> impl Iterator<Item = (DeclId, &'a Declaration)> {
        let id = self.id;
        self.declarations
            .iter()
            .enumerate()
            .filter(move |(_, decl)| decl.is_enabled() && decl.name == name)
            .map(move |(index, decl)| {
                (
                    DeclId {
                        container: id,
                        index: u32::try_from(index).unwrap_or(u32::MAX),
                    },
                    decl,
                )
            })
    }
}

/// Something a name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// A declared item.
    Item(DeclId),
    /// A `use` binding; its own targets are in the import's resolution.
    Import(ImportId),
}

/// Outcome of resolving an import path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResolution {
    /// Bindings used for qualifier segments, by segment index.
    pub qualifiers: Vec<(usize, Binding)>,
    /// Bindings the final segment resolved to.
    pub targets: Vec<Binding>,
    /// Namespaces the import binds.
    pub namespaces: Namespaces,
}

/// A named `use` binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// The record's unique ID.
    pub id: ImportId,
    /// Path to the imported item; for `self` entries, the path of the module.
    pub path: Path,
    /// Bound name and the span it is reported at.
    pub name: Name,
    /// True when `as alias` was written.
    pub aliased: bool,
    /// Range of `self` for `{self}` entries.
    pub self_range: Option<TextRange>,
    /// Declared visibility; `None` when the restriction could not be resolved.
    pub visibility: Option<Visibility>,
    /// Container holding the `use`.
    pub container: ContainerId,
    /// File of the `use`.
    pub file_id: FileId,
    /// Conditional compilation state.
    pub cfg: CfgState,
    /// Filled in once imports are resolved.
    pub resolution: Option<ImportResolution>,
}

impl ImportRecord {
    /// True when the `use` extends the visibility of what it imports.
    #[must_use]
    pub fn is_reexport(&self) -> bool {
        matches!(
            self.visibility,
            Some(Visibility::Public | Visibility::PublicInPath(_))
        )
    }

    /// True for `{self}` entries.
    #[must_use]
    pub fn is_self_import(&self) -> bool {
        self.self_range.is_some()
    }

    /// Span of the bound name.
    #[must_use]
    pub fn span(&self) -> SourceSpan {
        SourceSpan::new(self.file_id, self.name.range)
    }
}

/// A `use path::*;` import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobImport {
    /// Path of the module glob-imported from.
    pub path: Path,
    /// Container holding the `use`.
    pub container: ContainerId,
    /// File of the `use`.
    pub file_id: FileId,
    /// Conditional compilation state.
    pub cfg: CfgState,
}

/// Un-aliased `self` entries of one use group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfImportGroup {
    /// Spans of the `self` keywords, in source order.
    pub spans: Vec<SourceSpan>,
    /// Conditional compilation state of the `use`.
    pub cfg: CfgState,
}

/// A use site inside a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    /// The access as written.
    pub access: Access,
    /// Innermost container of the access.
    pub container: ContainerId,
    /// File of the access.
    pub file_id: FileId,
    /// Conditional compilation state.
    pub cfg: CfgState,
}

/// An impl block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplRecord {
    /// Path of the implementing type.
    pub self_ty: Path,
    /// True for trait impls.
    pub trait_impl: bool,
    /// Container the impl is written in.
    pub scope: ContainerId,
    /// Container of the associated items.
    pub body: ContainerId,
    /// Conditional compilation state.
    pub cfg: CfgState,
}

/// A problem with a visibility qualifier itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualifierIssueKind {
    /// A qualifier where visibility cannot be declared.
    Unnecessary,
    /// `pub(path)` without `in`.
    MissingIn,
}

/// A visibility qualifier recorded for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualifierIssue {
    /// What is wrong.
    pub kind: QualifierIssueKind,
    /// Where to report it.
    pub span: SourceSpan,
    /// Conditional compilation state of the qualified item.
    pub cfg: CfgState,
}
