//! `rsnames-hir` - Namespace-aware symbol table and name checks for Rust item trees.
//!
//! The host hands over an [`ItemTree`]: the items of a crate with their
//! names, ranges, visibility qualifiers, `cfg` attributes and `use` trees.
//! This crate turns it into a [`SymbolTable`] and reports:
//!
//! - **Duplicates**: two bindings of one name in one namespace of one scope
//!   (E0428, E0201, E0124, E0403, E0263, E0415, E0252, E0255, E0254, E0259,
//!   E0260, E0430)
//! - **Privacy**: imports and paths that name something not visible from
//!   where they are written, and re-exports wider than what they export
//!   (E0603, E0364, E0365, E0616, E0624)
//! - **Qualifiers**: misplaced or malformed visibility qualifiers (E0449, E0704)
//!
//! # Example
//!
//! ```
//! use rsnames_hir::{Analysis, CfgOptions, Item, ItemTreeBuilder, ModuleTreeReachability};
//!
//! let source = "fn Dup() {} const Dup: u32 = 1;";
//! let tree = ItemTreeBuilder::new(source)
//!     .item(Item::function("Dup"))
//!     .item(Item::constant("Dup"))
//!     .finish()
//!     .unwrap();
//!
//! let diagnostics = Analysis::new(&CfgOptions::new(), &ModuleTreeReachability).check(&tree);
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].code.code(), "E0428");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod cfg;
pub mod check;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod item_tree;
pub mod resolve;
pub mod scope;
pub mod span;
pub mod symbols;
pub mod visibility;

pub use analysis::{check_with_config, Analysis};
pub use cfg::{CfgAttr, CfgEvaluator, CfgExpr, CfgOptions, CfgState};
pub use config::{AnalysisConfig, DiagnosticSettings};
pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSeverity};
pub use error::ConfigError;
pub use item_tree::{Item, ItemTree, ItemTreeBuilder, UseTree};
pub use span::{FileId, SourceSpan};
pub use symbols::{Namespace, Namespaces, SymbolTable};
pub use visibility::{ModulePath, ModuleReachability, ModuleTreeReachability, Visibility};
