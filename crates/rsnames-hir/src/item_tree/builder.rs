//! Building item trees in code.
//!
//! Items are assembled with the constructors below and carry placeholder
//! ranges. [`ItemTreeBuilder::finish`] then walks the tree in the order the
//! tokens appear in Rust source and assigns every name the range of its next
//! occurrence in the source text. Attributes, comments and string literals
//! are skipped while scanning.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use super::{
    Access, Block, FieldDecl, FnItem, GenericParam, GenericParamKind, ImplItem, Item, ItemKind,
    ItemTree, ModuleFile, Name, Param, Path, Stmt, UseTree, UseTreeKind, Variant, VisibilityExpr,
};
use crate::cfg::{CfgAttr, CfgExpr};
use crate::span::FileId;
use crate::symbols::Namespace;

/// Error produced while locating names in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    /// A name or token does not occur after the current position.
    #[error("`{text}` not found in {file} after offset {offset}")]
    NotFound {
        /// Text that was searched for.
        text: SmolStr,
        /// File searched.
        file: FileId,
        /// Offset the search started at.
        offset: usize,
    },
    /// A `mod m;` refers to a file that was not registered.
    #[error("no source registered for {0}")]
    MissingFile(FileId),
}

/// Assembles an [`ItemTree`] and locates its names in source text.
#[derive(Debug, Clone)]
pub struct ItemTreeBuilder {
    file_id: FileId,
    sources: FxHashMap<FileId, String>,
    items: Vec<Item>,
}

impl ItemTreeBuilder {
    /// Starts a tree for the crate root source.
    pub fn new(source: impl Into<String>) -> Self {
        let file_id = FileId(0);
        let mut sources = FxHashMap::default();
        sources.insert(file_id, source.into());
        Self {
            file_id,
            sources,
            items: Vec::new(),
        }
    }

    /// Registers the source of a file loaded by a `mod m;` declaration.
    #[must_use]
    pub fn file(mut self, file_id: FileId, source: impl Into<String>) -> Self {
        self.sources.insert(file_id, source.into());
        self
    }

    /// Appends a top-level item.
    #[must_use]
    pub fn item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Appends several top-level items.
    #[must_use]
    pub fn items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items.extend(items);
        self
    }

    /// Locates every name and returns the finished tree.
    pub fn finish(mut self) -> Result<ItemTree, LocateError> {
        let mut items = std::mem::take(&mut self.items);
        let mut locator = Locator::new(&self.sources, self.file_id)?;
        for item in &mut items {
            locator.item(item)?;
        }
        Ok(ItemTree {
            file_id: self.file_id,
            items,
        })
    }
}

struct Locator<'s> {
    sources: &'s FxHashMap<FileId, String>,
    file: FileId,
    text: &'s str,
    pos: usize,
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn range(start: usize, end: usize) -> TextRange {
    let start = TextSize::try_from(start).unwrap_or(TextSize::from(u32::MAX));
    let end = TextSize::try_from(end).unwrap_or(TextSize::from(u32::MAX));
    TextRange::new(start, end)
}

impl<'s> Locator<'s> {
    fn new(sources: &'s FxHashMap<FileId, String>, file: FileId) -> Result<Self, LocateError> {
        let text = sources.get(&file).ok_or(LocateError::MissingFile(file))?;
        Ok(Self {
            sources,
            file,
            text,
            pos: 0,
        })
    }

    /// Skips an attribute, comment or string starting at `at`; returns the offset after it.
    fn skip_trivia(&self, at: usize) -> Option<usize> {
        let rest = &self.text[at..];
        if rest.starts_with("#[") || rest.starts_with("#![") {
            let mut depth = 0usize;
            for (offset, ch) in rest.char_indices() {
                match ch {
                    '[' => depth += 1,
                    ']' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(at + offset + 1);
                        }
                    }
                    _ => {}
                }
            }
            return Some(self.text.len());
        }
        if rest.starts_with("//") {
            return Some(rest.find('\n').map_or(self.text.len(), |end| at + end));
        }
        if rest.starts_with("/*") {
            return Some(rest.find("*/").map_or(self.text.len(), |end| at + end + 2));
        }
        if rest.starts_with('"') {
            let mut escaped = false;
            for (offset, ch) in rest.char_indices().skip(1) {
                match ch {
                    '\\' if !escaped => escaped = true,
                    '"' if !escaped => return Some(at + offset + 1),
                    _ => escaped = false,
                }
            }
            return Some(self.text.len());
        }
        None
    }

    fn find(&mut self, needle: &str, word: bool) -> Result<TextRange, LocateError> {
        let mut at = self.pos;
        while at < self.text.len() {
            if let Some(next) = self.skip_trivia(at) {
                at = next;
                continue;
            }
            let rest = &self.text[at..];
            if rest.starts_with(needle) {
                let end = at + needle.len();
                let before_ok = !word
                    || self.text[..at]
                        .chars()
                        .next_back()
                        .map_or(true, |ch| !is_ident_char(ch));
                let after_ok = !word
                    || self.text[end..]
                        .chars()
                        .next()
                        .map_or(true, |ch| !is_ident_char(ch));
                if before_ok && after_ok {
                    self.pos = end;
                    return Ok(range(at, end));
                }
            }
            at += rest.chars().next().map_or(1, char::len_utf8);
        }
        Err(LocateError::NotFound {
            text: SmolStr::new(needle),
            file: self.file,
            offset: self.pos,
        })
    }

    fn word(&mut self, word: &str) -> Result<TextRange, LocateError> {
        self.find(word, true)
    }

    fn punct(&mut self, punct: &str) -> Result<TextRange, LocateError> {
        self.find(punct, false)
    }

    fn name(&mut self, name: &mut Name) -> Result<TextRange, LocateError> {
        name.range = self.word(&name.text)?;
        Ok(name.range)
    }

    fn path(&mut self, path: &mut Path) -> Result<Option<TextRange>, LocateError> {
        for segment in &mut path.segments {
            self.name(segment)?;
        }
        Ok(path.range())
    }

    fn visibility(&mut self, vis: &mut VisibilityExpr) -> Result<Option<TextRange>, LocateError> {
        let (range, keyword) = match vis {
            VisibilityExpr::Inherited => return Ok(None),
            VisibilityExpr::Pub { range } => {
                *range = self.word("pub")?;
                return Ok(Some(*range));
            }
            VisibilityExpr::PubCrate { range } => (range, "crate"),
            VisibilityExpr::PubSuper { range } => (range, "super"),
            VisibilityExpr::PubSelf { range } => (range, "self"),
            VisibilityExpr::PubIn {
                path,
                has_in,
                range,
            } => {
                let start = self.word("pub")?;
                if *has_in {
                    self.word("in")?;
                }
                self.path(path)?;
                let close = self.punct(")")?;
                *range = start.cover(close);
                return Ok(Some(*range));
            }
        };
        let start = self.word("pub")?;
        self.word(keyword)?;
        let close = self.punct(")")?;
        *range = start.cover(close);
        Ok(Some(*range))
    }

    fn generics(&mut self, generics: &mut [GenericParam]) -> Result<(), LocateError> {
        for param in generics {
            self.name(&mut param.name)?;
        }
        Ok(())
    }

    fn fields(&mut self, fields: &mut [FieldDecl]) -> Result<(), LocateError> {
        for field in fields {
            self.visibility(&mut field.visibility)?;
            self.name(&mut field.name)?;
        }
        Ok(())
    }

    fn items(&mut self, items: &mut [Item]) -> Result<(), LocateError> {
        for item in items {
            self.item(item)?;
        }
        Ok(())
    }

    fn item(&mut self, item: &mut Item) -> Result<(), LocateError> {
        let vis = self.visibility(&mut item.visibility)?;
        let keyword = self.word(item.kind.keyword())?;
        let start = vis.unwrap_or(keyword).start();
        match &mut item.kind {
            ItemKind::Impl(ImplItem {
                self_ty,
                trait_ref,
                items,
            }) => {
                self.generics(&mut item.generics)?;
                if let Some(trait_ref) = trait_ref {
                    self.path(trait_ref)?;
                }
                self.path(self_ty)?;
                self.items(items)?;
            }
            ItemKind::ExternBlock { items } => self.items(items)?,
            ItemKind::Use { tree } => {
                self.use_tree(tree)?;
                self.punct(";")?;
            }
            ItemKind::ExternCrate { alias } => {
                self.word("crate")?;
                if let Some(name) = &mut item.name {
                    self.name(name)?;
                }
                if let Some(alias) = alias {
                    self.name(alias)?;
                }
                self.punct(";")?;
            }
            kind => {
                if let Some(name) = &mut item.name {
                    self.name(name)?;
                }
                self.generics(&mut item.generics)?;
                match kind {
                    ItemKind::Fn(FnItem { params, body }) => {
                        for param in params {
                            for binding in &mut param.bindings {
                                self.name(binding)?;
                            }
                        }
                        if let Some(body) = body {
                            self.block(body)?;
                        }
                    }
                    ItemKind::Struct { fields } | ItemKind::Union { fields } => {
                        self.fields(fields)?;
                    }
                    ItemKind::Enum { variants } => {
                        for variant in variants {
                            self.name(&mut variant.name)?;
                            self.fields(&mut variant.fields)?;
                        }
                    }
                    ItemKind::Trait { items } | ItemKind::Mod { items } => self.items(items)?,
                    ItemKind::ModDecl {
                        file: Some(ModuleFile { file_id, items }),
                    } => {
                        let mut nested = Locator::new(self.sources, *file_id)?;
                        nested.items(items)?;
                    }
                    _ => {}
                }
            }
        }
        item.range = range(usize::from(start), self.pos);
        Ok(())
    }

    fn use_tree(&mut self, tree: &mut UseTree) -> Result<TextRange, LocateError> {
        let mut cover = self.path(&mut tree.path)?;
        let mut extend = |range: TextRange| {
            cover = Some(cover.map_or(range, |cover| cover.cover(range)));
        };
        match &mut tree.kind {
            UseTreeKind::Simple { alias } => {
                if let Some(alias) = alias {
                    extend(self.name(alias)?);
                }
            }
            UseTreeKind::Glob => extend(self.punct("*")?),
            UseTreeKind::Group { trees } => {
                extend(self.punct("{")?);
                for tree in trees {
                    extend(self.use_tree(tree)?);
                }
                extend(self.punct("}")?);
            }
        }
        tree.range = cover.unwrap_or_else(|| range(self.pos, self.pos));
        Ok(tree.range)
    }

    fn block(&mut self, block: &mut Block) -> Result<(), LocateError> {
        for stmt in &mut block.stmts {
            match stmt {
                Stmt::Item(item) => self.item(item)?,
                Stmt::Block(block) => self.block(block)?,
                Stmt::Access(Access::Path { path, .. }) => {
                    self.path(path)?;
                }
                Stmt::Access(Access::Field { field, .. }) => {
                    self.name(field)?;
                }
                Stmt::Access(Access::Method { method, .. }) => {
                    self.name(method)?;
                }
            }
        }
        Ok(())
    }
}

impl Item {
    fn with_kind(kind: ItemKind, name: Option<&str>) -> Self {
        Self {
            kind,
            name: name.map(Name::new),
            range: TextRange::default(),
            visibility: VisibilityExpr::Inherited,
            cfg: Vec::new(),
            generics: Vec::new(),
        }
    }

    /// `const name`
    #[must_use]
    pub fn constant(name: &str) -> Self {
        Self::with_kind(ItemKind::Const, Some(name))
    }

    /// `static name`
    #[must_use]
    pub fn static_item(name: &str) -> Self {
        Self::with_kind(ItemKind::Static, Some(name))
    }

    /// `fn name() {}` with an empty body.
    #[must_use]
    pub fn function(name: &str) -> Self {
        Self::with_kind(
            ItemKind::Fn(FnItem {
                params: Vec::new(),
                body: Some(Block::default()),
            }),
            Some(name),
        )
    }

    /// `fn name();` without a body.
    #[must_use]
    pub fn function_decl(name: &str) -> Self {
        Self::with_kind(ItemKind::Fn(FnItem::default()), Some(name))
    }

    /// `struct name`
    #[must_use]
    pub fn structure(name: &str) -> Self {
        Self::with_kind(ItemKind::Struct { fields: Vec::new() }, Some(name))
    }

    /// `union name`
    #[must_use]
    pub fn union(name: &str) -> Self {
        Self::with_kind(ItemKind::Union { fields: Vec::new() }, Some(name))
    }

    /// `enum name { variants.. }`
    #[must_use]
    pub fn enumeration(name: &str, variants: impl IntoIterator<Item = Variant>) -> Self {
        Self::with_kind(
            ItemKind::Enum {
                variants: variants.into_iter().collect(),
            },
            Some(name),
        )
    }

    /// `trait name { items.. }`
    #[must_use]
    pub fn trait_def(name: &str, items: impl IntoIterator<Item = Item>) -> Self {
        Self::with_kind(
            ItemKind::Trait {
                items: items.into_iter().collect(),
            },
            Some(name),
        )
    }

    /// `trait name = ..;`
    #[must_use]
    pub fn trait_alias(name: &str) -> Self {
        Self::with_kind(ItemKind::TraitAlias, Some(name))
    }

    /// `mod name { items.. }`
    #[must_use]
    pub fn module(name: &str, items: impl IntoIterator<Item = Item>) -> Self {
        Self::with_kind(
            ItemKind::Mod {
                items: items.into_iter().collect(),
            },
            Some(name),
        )
    }

    /// `mod name;` loaded from `file`.
    #[must_use]
    pub fn module_decl(name: &str, file: FileId, items: impl IntoIterator<Item = Item>) -> Self {
        Self::with_kind(
            ItemKind::ModDecl {
                file: Some(ModuleFile {
                    file_id: file,
                    items: items.into_iter().collect(),
                }),
            },
            Some(name),
        )
    }

    /// `mod name;` the host could not load.
    #[must_use]
    pub fn unresolved_module_decl(name: &str) -> Self {
        Self::with_kind(ItemKind::ModDecl { file: None }, Some(name))
    }

    /// `type name = ..;`
    #[must_use]
    pub fn type_alias(name: &str) -> Self {
        Self::with_kind(ItemKind::TypeAlias, Some(name))
    }

    /// `macro_rules! name {}`
    #[must_use]
    pub fn macro_rules(name: &str) -> Self {
        Self::with_kind(ItemKind::MacroRules, Some(name))
    }

    /// `macro name() {}`
    #[must_use]
    pub fn macro_def(name: &str) -> Self {
        Self::with_kind(ItemKind::Macro, Some(name))
    }

    /// `extern crate name;` or `extern crate name as alias;`
    #[must_use]
    pub fn extern_crate(name: &str, alias: Option<&str>) -> Self {
        Self::with_kind(
            ItemKind::ExternCrate {
                alias: alias.map(Name::new),
            },
            Some(name),
        )
    }

    /// `use tree;`
    #[must_use]
    pub fn use_item(tree: UseTree) -> Self {
        Self::with_kind(ItemKind::Use { tree }, None)
    }

    /// `impl self_ty { items.. }`
    #[must_use]
    pub fn inherent_impl(self_ty: &str, items: impl IntoIterator<Item = Item>) -> Self {
        Self::with_kind(
            ItemKind::Impl(ImplItem {
                self_ty: Path::parse(self_ty),
                trait_ref: None,
                items: items.into_iter().collect(),
            }),
            None,
        )
    }

    /// `impl trait_ref for self_ty { items.. }`
    #[must_use]
    pub fn trait_impl(
        trait_ref: &str,
        self_ty: &str,
        items: impl IntoIterator<Item = Item>,
    ) -> Self {
        Self::with_kind(
            ItemKind::Impl(ImplItem {
                self_ty: Path::parse(self_ty),
                trait_ref: Some(Path::parse(trait_ref)),
                items: items.into_iter().collect(),
            }),
            None,
        )
    }

    /// `extern "C" { items.. }`
    #[must_use]
    pub fn extern_block(items: impl IntoIterator<Item = Item>) -> Self {
        Self::with_kind(
            ItemKind::ExternBlock {
                items: items.into_iter().collect(),
            },
            None,
        )
    }

    /// Sets the visibility qualifier.
    #[must_use]
    pub fn vis(mut self, visibility: VisibilityExpr) -> Self {
        self.visibility = visibility;
        self
    }

    /// Shorthand for a plain `pub` qualifier.
    #[must_use]
    pub fn public(self) -> Self {
        self.vis(VisibilityExpr::public())
    }

    /// Adds a `#[cfg(predicate)]` attribute.
    #[must_use]
    pub fn cfg(mut self, predicate: CfgExpr) -> Self {
        self.cfg.push(CfgAttr::Cfg(predicate));
        self
    }

    /// Adds an arbitrary `cfg` attribute.
    #[must_use]
    pub fn cfg_attr(mut self, attr: CfgAttr) -> Self {
        self.cfg.push(attr);
        self
    }

    /// Adds a generic parameter.
    #[must_use]
    pub fn generic(mut self, name: &str, kind: GenericParamKind) -> Self {
        self.generics.push(GenericParam {
            name: Name::new(name),
            kind,
        });
        self
    }

    /// Adds a function parameter binding `names`.
    #[must_use]
    pub fn param(self, names: &[&str]) -> Self {
        self.param_with_cfg(names, Vec::new())
    }

    /// Adds a function parameter with `cfg` attributes.
    #[must_use]
    pub fn param_with_cfg(mut self, names: &[&str], cfg: Vec<CfgAttr>) -> Self {
        if let ItemKind::Fn(FnItem { params, .. }) = &mut self.kind {
            params.push(Param {
                bindings: names.iter().map(|name| Name::new(*name)).collect(),
                cfg,
            });
        }
        self
    }

    /// Replaces the function body.
    #[must_use]
    pub fn body(mut self, stmts: impl IntoIterator<Item = Stmt>) -> Self {
        if let ItemKind::Fn(FnItem { body, .. }) = &mut self.kind {
            *body = Some(Block {
                stmts: stmts.into_iter().collect(),
            });
        }
        self
    }

    /// Adds a named field to a struct or union.
    #[must_use]
    pub fn field(mut self, field: FieldDecl) -> Self {
        if let ItemKind::Struct { fields } | ItemKind::Union { fields } = &mut self.kind {
            fields.push(field);
        }
        self
    }
}

impl FieldDecl {
    /// A private field.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Name::new(name),
            visibility: VisibilityExpr::Inherited,
            cfg: Vec::new(),
        }
    }

    /// Sets the visibility qualifier.
    #[must_use]
    pub fn vis(mut self, visibility: VisibilityExpr) -> Self {
        self.visibility = visibility;
        self
    }

    /// Shorthand for a plain `pub` qualifier.
    #[must_use]
    pub fn public(self) -> Self {
        self.vis(VisibilityExpr::public())
    }

    /// Adds a `#[cfg(predicate)]` attribute.
    #[must_use]
    pub fn cfg(mut self, predicate: CfgExpr) -> Self {
        self.cfg.push(CfgAttr::Cfg(predicate));
        self
    }
}

impl Variant {
    /// A unit variant.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Name::new(name),
            fields: Vec::new(),
            cfg: Vec::new(),
        }
    }

    /// Adds a named field.
    #[must_use]
    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a `#[cfg(predicate)]` attribute.
    #[must_use]
    pub fn cfg(mut self, predicate: CfgExpr) -> Self {
        self.cfg.push(CfgAttr::Cfg(predicate));
        self
    }
}

impl UseTree {
    fn with_kind(path: &str, kind: UseTreeKind) -> Self {
        Self {
            path: Path::parse(path),
            kind,
            range: TextRange::default(),
        }
    }

    /// `path`
    #[must_use]
    pub fn simple(path: &str) -> Self {
        Self::with_kind(path, UseTreeKind::Simple { alias: None })
    }

    /// `path as alias`
    #[must_use]
    pub fn alias(path: &str, alias: &str) -> Self {
        Self::with_kind(
            path,
            UseTreeKind::Simple {
                alias: Some(Name::new(alias)),
            },
        )
    }

    /// `path::*`
    #[must_use]
    pub fn glob(path: &str) -> Self {
        Self::with_kind(path, UseTreeKind::Glob)
    }

    /// `path::{trees..}`
    #[must_use]
    pub fn group(path: &str, trees: impl IntoIterator<Item = UseTree>) -> Self {
        Self::with_kind(
            path,
            UseTreeKind::Group {
                trees: trees.into_iter().collect(),
            },
        )
    }
}

impl VisibilityExpr {
    /// `pub`
    #[must_use]
    pub fn public() -> Self {
        VisibilityExpr::Pub {
            range: TextRange::default(),
        }
    }

    /// `pub(crate)`
    #[must_use]
    pub fn crate_() -> Self {
        VisibilityExpr::PubCrate {
            range: TextRange::default(),
        }
    }

    /// `pub(super)`
    #[must_use]
    pub fn super_() -> Self {
        VisibilityExpr::PubSuper {
            range: TextRange::default(),
        }
    }

    /// `pub(self)`
    #[must_use]
    pub fn self_() -> Self {
        VisibilityExpr::PubSelf {
            range: TextRange::default(),
        }
    }

    /// `pub(in path)`
    #[must_use]
    pub fn in_path(path: &str) -> Self {
        VisibilityExpr::PubIn {
            path: Path::parse(path),
            has_in: true,
            range: TextRange::default(),
        }
    }

    /// `pub(path)`, written without `in`.
    #[must_use]
    pub fn restricted_without_in(path: &str) -> Self {
        VisibilityExpr::PubIn {
            path: Path::parse(path),
            has_in: false,
            range: TextRange::default(),
        }
    }
}

impl Stmt {
    /// A path access looked up in `namespace`.
    #[must_use]
    pub fn path(path: &str, namespace: Namespace) -> Self {
        Stmt::Access(Access::Path {
            path: Path::parse(path),
            namespace,
        })
    }

    /// A field access on a value of type `owner`.
    #[must_use]
    pub fn field(owner: &str, field: &str) -> Self {
        Stmt::Access(Access::Field {
            owner: Path::parse(owner),
            field: Name::new(field),
        })
    }

    /// A method call on a value of type `owner`.
    #[must_use]
    pub fn method(owner: &str, method: &str) -> Self {
        Stmt::Access(Access::Method {
            owner: Path::parse(owner),
            method: Name::new(method),
        })
    }

    /// A local item.
    #[must_use]
    pub fn item(item: Item) -> Self {
        Stmt::Item(item)
    }

    /// A nested block.
    #[must_use]
    pub fn block(stmts: impl IntoIterator<Item = Stmt>) -> Self {
        Stmt::Block(Block {
            stmts: stmts.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(source: &str, range: TextRange) -> &str {
        &source[range]
    }

    #[test]
    fn locates_names_in_token_order() {
        let source = "#[cfg(foo)] fn foo() {}\npub(crate) struct S { pub a: u8, b: u8 }\n";
        let tree = ItemTreeBuilder::new(source)
            .item(Item::function("foo").cfg(CfgExpr::atom("foo")))
            .item(
                Item::structure("S")
                    .vis(VisibilityExpr::crate_())
                    .field(FieldDecl::new("a").vis(VisibilityExpr::public()))
                    .field(FieldDecl::new("b")),
            )
            .finish()
            .unwrap();

        let func = &tree.items[0];
        let name = func.name.as_ref().unwrap();
        assert_eq!(u32::from(name.range.start()), 15);
        assert_eq!(slice(source, name.range), "foo");

        let strukt = &tree.items[1];
        assert_eq!(
            slice(source, strukt.visibility.range().unwrap()),
            "pub(crate)"
        );
        let ItemKind::Struct { fields } = &strukt.kind else {
            panic!("expected struct");
        };
        assert_eq!(slice(source, fields[1].name.range), "b");
        assert!(slice(source, strukt.range).starts_with("pub(crate) struct S"));
    }

    #[test]
    fn skips_comments_and_strings() {
        let source = "// fn a\nextern \"a\" { fn a(); }\n";
        let tree = ItemTreeBuilder::new(source)
            .item(Item::extern_block([Item::function_decl("a")]))
            .finish()
            .unwrap();
        let ItemKind::ExternBlock { items } = &tree.items[0].kind else {
            panic!("expected extern block");
        };
        let name = items[0].name.as_ref().unwrap();
        assert_eq!(u32::from(name.range.start()), 24);
    }

    #[test]
    fn use_tree_ranges_cover_groups() {
        let source = "use foo::{self, bar as baz};";
        let tree = ItemTreeBuilder::new(source)
            .item(Item::use_item(UseTree::group(
                "foo",
                [UseTree::simple("self"), UseTree::alias("bar", "baz")],
            )))
            .finish()
            .unwrap();
        let ItemKind::Use { tree: use_tree } = &tree.items[0].kind else {
            panic!("expected use");
        };
        assert_eq!(slice(source, use_tree.range), "foo::{self, bar as baz}");
        assert_eq!(slice(source, tree.items[0].range), source);
    }

    #[test]
    fn missing_names_are_reported() {
        let err = ItemTreeBuilder::new("fn foo() {}")
            .item(Item::function("bar"))
            .finish()
            .unwrap_err();
        assert_eq!(
            err,
            LocateError::NotFound {
                text: SmolStr::new("bar"),
                file: FileId(0),
                offset: 2,
            }
        );
    }

    #[test]
    fn module_files_use_their_own_source() {
        let tree = ItemTreeBuilder::new("mod foo;")
            .file(FileId(1), "pub fn inner() {}")
            .item(Item::module_decl("foo", FileId(1), [Item::function("inner").public()]))
            .finish()
            .unwrap();
        let ItemKind::ModDecl { file: Some(file) } = &tree.items[0].kind else {
            panic!("expected module file");
        };
        let name = file.items[0].name.as_ref().unwrap();
        assert_eq!(u32::from(name.range.start()), 7);
    }
}
