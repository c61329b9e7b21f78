//! Owned, read-only item tree supplied by the host.
//!
//! The tree carries exactly what the checks need: item kinds, names with
//! their ranges, declared visibility, `cfg` attributes, `use` trees and the
//! accesses a host located inside function bodies. It deserializes from JSON
//! so that a host outside the process can hand it over as data.

mod builder;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use text_size::TextRange;

use crate::cfg::CfgAttr;
use crate::span::FileId;
use crate::symbols::Namespace;

pub use builder::{ItemTreeBuilder, LocateError};

/// Items of the crate root file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTree {
    /// File of the crate root.
    #[serde(default)]
    pub file_id: FileId,
    /// Top-level items in source order.
    #[serde(default)]
    pub items: Vec<Item>,
}

/// An identifier with its location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    /// Identifier text (`'a` for lifetimes).
    pub text: SmolStr,
    /// Range of the identifier.
    #[serde(default)]
    pub range: TextRange,
}

impl Name {
    /// Creates a name whose range is assigned later.
    pub fn new(text: impl Into<SmolStr>) -> Self {
        Self {
            text: text.into(),
            range: TextRange::default(),
        }
    }

    /// Creates a name at a known range.
    pub fn at(text: impl Into<SmolStr>, range: TextRange) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }

    /// True for the `_` placeholder.
    #[must_use]
    pub fn is_underscore(&self) -> bool {
        self.text == "_"
    }
}

/// A path as written, `crate::a::b`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    /// Segments, including `crate`, `self` and `super` keywords.
    pub segments: Vec<Name>,
}

impl Path {
    /// Parses `a::b::c` into a path whose ranges are assigned later.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            segments: text
                .split("::")
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(Name::new)
                .collect(),
        }
    }

    /// Cover of all segment ranges.
    #[must_use]
    pub fn range(&self) -> Option<TextRange> {
        self.prefix_range(self.segments.len().checked_sub(1)?)
    }

    /// Cover of the segments up to and including `last`.
    #[must_use]
    pub fn prefix_range(&self, last: usize) -> Option<TextRange> {
        let first = self.segments.first()?;
        let last = self.segments.get(last)?;
        Some(first.range.cover(last.range))
    }

    /// Text of the segments up to and including `last`, joined with `::`.
    #[must_use]
    pub fn prefix_text(&self, last: usize) -> String {
        self.segments
            .iter()
            .take(last + 1)
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join("::")
    }

    /// Segment texts.
    #[must_use]
    pub fn texts(&self) -> Vec<SmolStr> {
        self.segments.iter().map(|segment| segment.text.clone()).collect()
    }

    /// Last segment.
    #[must_use]
    pub fn last(&self) -> Option<&Name> {
        self.segments.last()
    }

    /// True when the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// One syntactic item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item kind and kind-specific children.
    #[serde(flatten)]
    pub kind: ItemKind,
    /// Declared name; absent for `impl`, `use` and extern blocks.
    #[serde(default)]
    pub name: Option<Name>,
    /// Range of the whole item.
    #[serde(default)]
    pub range: TextRange,
    /// Declared visibility.
    #[serde(default)]
    pub visibility: VisibilityExpr,
    /// `cfg` and `cfg_attr` attributes.
    #[serde(default)]
    pub cfg: Vec<CfgAttr>,
    /// Generic parameters.
    #[serde(default)]
    pub generics: Vec<GenericParam>,
}

/// Kind of an [`Item`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    /// `const X: T = ..;`
    Const,
    /// `static X: T = ..;`
    Static,
    /// `fn f(..) { .. }`
    Fn(FnItem),
    /// `struct S { .. }`
    Struct {
        /// Named fields.
        #[serde(default)]
        fields: Vec<FieldDecl>,
    },
    /// `union U { .. }`
    Union {
        /// Named fields.
        #[serde(default)]
        fields: Vec<FieldDecl>,
    },
    /// `enum E { .. }`
    Enum {
        /// Variants in source order.
        #[serde(default)]
        variants: Vec<Variant>,
    },
    /// `trait T { .. }`
    Trait {
        /// Associated items.
        #[serde(default)]
        items: Vec<Item>,
    },
    /// `trait T = ..;`
    TraitAlias,
    /// `mod m { .. }`
    Mod {
        /// Items of the inline module.
        #[serde(default)]
        items: Vec<Item>,
    },
    /// `mod m;`
    ModDecl {
        /// The file the host resolved the declaration to, if any.
        #[serde(default)]
        file: Option<ModuleFile>,
    },
    /// `type T = ..;`
    TypeAlias,
    /// `macro_rules! m { .. }`
    MacroRules,
    /// `macro m(..) { .. }`
    Macro,
    /// `extern crate name as alias;`
    ExternCrate {
        /// Local alias.
        #[serde(default)]
        alias: Option<Name>,
    },
    /// `use ..;`
    Use {
        /// The use tree.
        tree: UseTree,
    },
    /// `impl Trait for Type { .. }` or `impl Type { .. }`
    Impl(ImplItem),
    /// `extern "abi" { .. }`
    ExternBlock {
        /// Foreign items.
        #[serde(default)]
        items: Vec<Item>,
    },
}

impl ItemKind {
    /// Keyword introducing the item.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match self {
            ItemKind::Const => "const",
            ItemKind::Static => "static",
            ItemKind::Fn(_) => "fn",
            ItemKind::Struct { .. } => "struct",
            ItemKind::Union { .. } => "union",
            ItemKind::Enum { .. } => "enum",
            ItemKind::Trait { .. } | ItemKind::TraitAlias => "trait",
            ItemKind::Mod { .. } | ItemKind::ModDecl { .. } => "mod",
            ItemKind::TypeAlias => "type",
            ItemKind::MacroRules => "macro_rules",
            ItemKind::Macro => "macro",
            ItemKind::ExternCrate { .. } | ItemKind::ExternBlock { .. } => "extern",
            ItemKind::Use { .. } => "use",
            ItemKind::Impl(_) => "impl",
        }
    }
}

/// Function signature and body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FnItem {
    /// Parameters in order.
    #[serde(default)]
    pub params: Vec<Param>,
    /// Body; `None` for declarations such as trait methods without a default.
    #[serde(default)]
    pub body: Option<Block>,
}

/// One function parameter; a pattern may bind several names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Names bound by the parameter pattern.
    #[serde(default)]
    pub bindings: Vec<Name>,
    /// `cfg` attributes on the parameter.
    #[serde(default)]
    pub cfg: Vec<CfgAttr>,
}

/// A brace-delimited body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Statements relevant to name checks, in source order.
    #[serde(default)]
    pub stmts: Vec<Stmt>,
}

/// A statement of a [`Block`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    /// A local item.
    Item(Item),
    /// A nested block or closure body.
    Block(Block),
    /// A use site located by the host.
    Access(Access),
}

/// A use site inside a body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "access", rename_all = "snake_case")]
pub enum Access {
    /// A path expression or type, `a::b::c`.
    Path {
        /// The path as written.
        path: Path,
        /// Namespace the path is looked up in.
        namespace: Namespace,
    },
    /// `expr.field` where the host inferred the type of `expr`.
    Field {
        /// Path of the struct or union, as seen from the access site.
        owner: Path,
        /// Field name.
        field: Name,
    },
    /// `expr.method()` where the host inferred the type of `expr`.
    Method {
        /// Path of the receiver type, as seen from the access site.
        owner: Path,
        /// Method name.
        method: Name,
    },
}

/// The file a `mod m;` declaration was loaded from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleFile {
    /// File identity; two declarations of the same file are the same module.
    pub file_id: FileId,
    /// Items of the file.
    #[serde(default)]
    pub items: Vec<Item>,
}

/// An `impl` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplItem {
    /// Path of the implementing type.
    pub self_ty: Path,
    /// Implemented trait, for trait impls.
    #[serde(default)]
    pub trait_ref: Option<Path>,
    /// Associated items.
    #[serde(default)]
    pub items: Vec<Item>,
}

/// A named field of a struct, union or struct-like variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name.
    pub name: Name,
    /// Declared visibility.
    #[serde(default)]
    pub visibility: VisibilityExpr,
    /// `cfg` attributes on the field.
    #[serde(default)]
    pub cfg: Vec<CfgAttr>,
}

/// An enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant name.
    pub name: Name,
    /// Named fields of a struct-like variant.
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    /// `cfg` attributes on the variant.
    #[serde(default)]
    pub cfg: Vec<CfgAttr>,
}

/// A generic parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericParam {
    /// Parameter name.
    pub name: Name,
    /// Parameter kind.
    #[serde(default)]
    pub kind: GenericParamKind,
}

/// Kind of a [`GenericParam`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenericParamKind {
    /// `T`
    #[default]
    Type,
    /// `'a`
    Lifetime,
    /// `const N: usize`
    Const,
}

/// A `use` tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseTree {
    /// Path before the tree kind, possibly empty (`use {a, b};`).
    #[serde(default)]
    pub path: Path,
    /// What follows the path.
    #[serde(flatten)]
    pub kind: UseTreeKind,
    /// Range of the whole tree.
    #[serde(default)]
    pub range: TextRange,
}

/// Kind of a [`UseTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tree", rename_all = "snake_case")]
pub enum UseTreeKind {
    /// `a::b` or `a::b as c`.
    Simple {
        /// Alias after `as`.
        #[serde(default)]
        alias: Option<Name>,
    },
    /// `a::*`
    Glob,
    /// `a::{..}`
    Group {
        /// Nested trees.
        #[serde(default)]
        trees: Vec<UseTree>,
    },
}

/// A visibility qualifier as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "vis", rename_all = "snake_case")]
pub enum VisibilityExpr {
    /// No qualifier.
    #[default]
    Inherited,
    /// `pub`
    Pub {
        /// Range of the qualifier.
        #[serde(default)]
        range: TextRange,
    },
    /// `pub(crate)`
    PubCrate {
        /// Range of the qualifier.
        #[serde(default)]
        range: TextRange,
    },
    /// `pub(super)`
    PubSuper {
        /// Range of the qualifier.
        #[serde(default)]
        range: TextRange,
    },
    /// `pub(self)`
    PubSelf {
        /// Range of the qualifier.
        #[serde(default)]
        range: TextRange,
    },
    /// `pub(in path)`, or `pub(path)` when `has_in` is false.
    PubIn {
        /// Restriction path.
        path: Path,
        /// Whether the `in` keyword was written.
        #[serde(default = "default_true")]
        has_in: bool,
        /// Range of the qualifier.
        #[serde(default)]
        range: TextRange,
    },
}

fn default_true() -> bool {
    true
}

impl VisibilityExpr {
    /// Range of the qualifier, `None` when nothing was written.
    #[must_use]
    pub fn range(&self) -> Option<TextRange> {
        match self {
            VisibilityExpr::Inherited => None,
            VisibilityExpr::Pub { range }
            | VisibilityExpr::PubCrate { range }
            | VisibilityExpr::PubSuper { range }
            | VisibilityExpr::PubSelf { range }
            | VisibilityExpr::PubIn { range, .. } => Some(*range),
        }
    }

    /// True when a qualifier was written.
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        !matches!(self, VisibilityExpr::Inherited)
    }
}
