//! Symbol table and symbol definitions.
//!
//! Every lexical scope of the analysed crate becomes a [`Container`] holding
//! its [`Declaration`]s in source order. Imports are kept as
//! [`ImportRecord`]s next to the containers and, once resolved, also appear
//! as declarations of the container that holds the `use`.

mod defs;
mod namespace;
mod table;

pub use defs::*;
pub use namespace::{classify, Namespace, Namespaces};
pub use table::SymbolTable;
