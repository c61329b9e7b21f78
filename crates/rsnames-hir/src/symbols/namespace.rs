//! Namespaces and the classification of declaration kinds into them.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::defs::DeclKind;
use crate::item_tree::GenericParamKind;

/// A single namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Functions, constants, statics, variant constructors.
    Value,
    /// Types, traits and modules.
    Type,
    /// Macros.
    Macro,
    /// Lifetime parameters.
    Lifetime,
    /// Names bound by `extern crate`.
    ExternCrate,
}

impl Namespace {
    /// The set holding only this namespace.
    #[must_use]
    pub fn set(self) -> Namespaces {
        match self {
            Namespace::Value => Namespaces::VALUE,
            Namespace::Type => Namespaces::TYPE,
            Namespace::Macro => Namespaces::MACRO,
            Namespace::Lifetime => Namespaces::LIFETIME,
            Namespace::ExternCrate => Namespaces::EXTERN_CRATE,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Namespace::Value => "value",
            Namespace::Type | Namespace::ExternCrate => "type",
            Namespace::Macro => "macro",
            Namespace::Lifetime => "lifetime",
        })
    }
}

bitflags! {
    /// A set of namespaces.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Namespaces: u8 {
        /// See [`Namespace::Value`].
        const VALUE = 1;
        /// See [`Namespace::Type`].
        const TYPE = 1 << 1;
        /// See [`Namespace::Macro`].
        const MACRO = 1 << 2;
        /// See [`Namespace::Lifetime`].
        const LIFETIME = 1 << 3;
        /// See [`Namespace::ExternCrate`].
        const EXTERN_CRATE = 1 << 4;
    }
}

impl Namespaces {
    /// Namespaces a path segment in front of `::` is looked up in.
    pub const MODULE_LIKE: Namespaces = Namespaces::TYPE;

    /// Namespaces checked together by the duplicate detector.
    pub const COLLISION_GROUPS: [Namespaces; 4] = [
        Namespaces::VALUE,
        Namespaces::TYPE.union(Namespaces::EXTERN_CRATE),
        Namespaces::MACRO,
        Namespaces::LIFETIME,
    ];

    /// Word used in messages for the namespace group.
    #[must_use]
    pub fn describe(self) -> &'static str {
        if self.intersects(Namespaces::TYPE | Namespaces::EXTERN_CRATE) {
            "type"
        } else if self.contains(Namespaces::VALUE) {
            "value"
        } else if self.contains(Namespaces::MACRO) {
            "macro"
        } else {
            "lifetime"
        }
    }
}

/// Maps a declaration kind to the namespaces it binds a name in.
#[must_use]
pub fn classify(kind: &DeclKind) -> Namespaces {
    match kind {
        DeclKind::Const
        | DeclKind::Static
        | DeclKind::Fn
        | DeclKind::EnumVariant
        | DeclKind::Field
        | DeclKind::Binding => Namespaces::VALUE,
        DeclKind::Struct
        | DeclKind::Union
        | DeclKind::Enum
        | DeclKind::Trait
        | DeclKind::TraitAlias
        | DeclKind::TypeAlias
        | DeclKind::Mod
        | DeclKind::ModDecl { .. } => Namespaces::TYPE,
        DeclKind::MacroRules | DeclKind::Macro => Namespaces::MACRO,
        DeclKind::ExternCrate => Namespaces::EXTERN_CRATE,
        DeclKind::Import { namespaces, .. } => *namespaces,
        DeclKind::GenericParam(GenericParamKind::Type) => Namespaces::TYPE,
        DeclKind::GenericParam(GenericParamKind::Const) => Namespaces::TYPE | Namespaces::VALUE,
        DeclKind::GenericParam(GenericParamKind::Lifetime) => Namespaces::LIFETIME,
    }
}
