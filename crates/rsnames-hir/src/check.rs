//! Checks run over a finished [`SymbolTable`](crate::symbols::SymbolTable).
//!
//! The duplicate detector looks at one container at a time. The visibility
//! validator walks imports, use sites and visibility qualifiers, resolving
//! paths as it goes. Both produce plain [`Diagnostic`](crate::Diagnostic)
//! lists that are merged by [`emit`](crate::diagnostics::emit).

mod duplicates;
mod visibility;

pub use duplicates::{detect, detect_self_imports};
pub use visibility::VisibilityValidator;
