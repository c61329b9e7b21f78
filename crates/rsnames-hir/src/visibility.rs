//! Module paths, visibility values and the partial order between them.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Path of a module from the crate root (`crate::a::b` is `["a", "b"]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModulePath(Vec<SmolStr>);

impl ModulePath {
    /// The crate root.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Builds a path from its segments below the crate root.
    pub fn from_segments(segments: impl IntoIterator<Item = impl Into<SmolStr>>) -> Self {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Returns the child module path `self::name`.
    #[must_use]
    pub fn join(&self, name: impl Into<SmolStr>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    /// Returns the anonymous module of block `id`, nested in `self`.
    ///
    /// Modules declared inside a function body live below it, so they never
    /// share a path with a module of the same name outside the body.
    #[must_use]
    pub fn block(&self, id: u32) -> Self {
        self.join(format!("{{block#{id}}}"))
    }

    /// Returns the parent module, or `None` for the crate root.
    ///
    /// Anonymous block modules are skipped: the parent of a module declared
    /// in a function body is the module enclosing the function.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        let mut segments = rest.to_vec();
        while segments.last().is_some_and(|segment| is_block_segment(segment)) {
            segments.pop();
        }
        Some(Self(segments))
    }

    /// Segments below the crate root.
    #[must_use]
    pub fn segments(&self) -> &[SmolStr] {
        &self.0
    }

    /// True for the crate root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `self` is `ancestor` or lies below it.
    #[must_use]
    pub fn starts_with(&self, ancestor: &ModulePath) -> bool {
        self.0.starts_with(&ancestor.0)
    }

    /// Renders `name` qualified by this module, omitting the `crate` prefix.
    #[must_use]
    pub fn qualify(&self, name: &str) -> String {
        let mut text = String::new();
        for segment in self.0.iter().filter(|segment| !is_block_segment(segment)) {
            text.push_str(segment);
            text.push_str("::");
        }
        text.push_str(name);
        text
    }
}

fn is_block_segment(segment: &str) -> bool {
    segment.starts_with('{')
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("crate")?;
        for segment in &self.0 {
            write!(f, "::{segment}")?;
        }
        Ok(())
    }
}

/// Host oracle over the module tree.
pub trait ModuleReachability {
    /// True when `candidate` is `root` or one of its descendants.
    fn is_descendant_module(&self, candidate: &ModulePath, root: &ModulePath) -> bool;
}

/// Reachability by path prefix, correct for any tree without path aliasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleTreeReachability;

impl ModuleReachability for ModuleTreeReachability {
    fn is_descendant_module(&self, candidate: &ModulePath, root: &ModulePath) -> bool {
        candidate.starts_with(root)
    }
}

/// Declared visibility of a binding, relative to the module that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible inside the owning module subtree.
    Private,
    /// Visible inside the subtree rooted at the path.
    PublicInPath(ModulePath),
    /// Visible everywhere.
    Public,
}

impl Visibility {
    /// Root of the subtree this visibility admits, `None` when unrestricted.
    #[must_use]
    pub fn restriction<'a>(&'a self, owner: &'a ModulePath) -> Option<&'a ModulePath> {
        match self {
            Visibility::Private => Some(owner),
            Visibility::PublicInPath(path) => Some(path),
            Visibility::Public => None,
        }
    }

    /// True when a binding owned by `owner` with this visibility can be named from `from`.
    #[must_use]
    pub fn is_visible_from(
        &self,
        owner: &ModulePath,
        from: &ModulePath,
        reach: &dyn ModuleReachability,
    ) -> bool {
        match self.restriction(owner) {
            Some(root) => reach.is_descendant_module(from, root),
            None => true,
        }
    }

    /// Partial order between two visibilities, each relative to its own owner.
    ///
    /// `None` means the two admit incomparable subtrees.
    #[must_use]
    pub fn compare(
        &self,
        owner: &ModulePath,
        other: &Visibility,
        other_owner: &ModulePath,
        reach: &dyn ModuleReachability,
    ) -> Option<Ordering> {
        match (self.restriction(owner), other.restriction(other_owner)) {
            (None, None) => Some(Ordering::Equal),
            (None, Some(_)) => Some(Ordering::Greater),
            (Some(_), None) => Some(Ordering::Less),
            (Some(lhs), Some(rhs)) => {
                let narrower = reach.is_descendant_module(lhs, rhs);
                let wider = reach.is_descendant_module(rhs, lhs);
                match (narrower, wider) {
                    (true, true) => Some(Ordering::Equal),
                    (true, false) => Some(Ordering::Less),
                    (false, true) => Some(Ordering::Greater),
                    (false, false) => None,
                }
            }
        }
    }

    /// True when `self` admits no more modules than `other`.
    #[must_use]
    pub fn is_within(
        &self,
        owner: &ModulePath,
        other: &Visibility,
        other_owner: &ModulePath,
        reach: &dyn ModuleReachability,
    ) -> bool {
        matches!(
            self.compare(owner, other, other_owner, reach),
            Some(Ordering::Less | Ordering::Equal)
        )
    }

    /// Expresses this visibility as it would be written in module `site`.
    #[must_use]
    pub fn relative_to(&self, owner: &ModulePath, site: &ModulePath) -> Visibility {
        match self.restriction(owner) {
            None => Visibility::Public,
            Some(root) if root == site => Visibility::Private,
            Some(root) => Visibility::PublicInPath(root.clone()),
        }
    }

    /// Source text of the qualifier, relative to the module `site`.
    #[must_use]
    pub fn to_source(&self, site: &ModulePath) -> String {
        match self {
            Visibility::Private => String::new(),
            Visibility::Public => "pub".to_string(),
            Visibility::PublicInPath(path) if path == site => "pub(self)".to_string(),
            Visibility::PublicInPath(path) if path.is_root() => "pub(crate)".to_string(),
            Visibility::PublicInPath(path) if site.parent().as_ref() == Some(path) => {
                "pub(super)".to_string()
            }
            Visibility::PublicInPath(path) => format!("pub(in {path})"),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Private => f.write_str("private"),
            Visibility::Public => f.write_str("pub"),
            Visibility::PublicInPath(path) if path.is_root() => f.write_str("pub(crate)"),
            Visibility::PublicInPath(path) => write!(f, "pub(in {path})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> ModulePath {
        ModulePath::from_segments(text.split("::").filter(|s| !s.is_empty() && *s != "crate"))
    }

    const REACH: ModuleTreeReachability = ModuleTreeReachability;

    #[test]
    fn module_path_navigation() {
        let a_b = path("crate::a::b");
        assert_eq!(a_b.to_string(), "crate::a::b");
        assert_eq!(a_b.parent(), Some(path("crate::a")));
        assert_eq!(ModulePath::root().parent(), None);
        assert_eq!(path("crate::a").join("c"), path("crate::a::c"));
        assert_eq!(a_b.qualify("S"), "a::b::S");
        assert!(a_b.starts_with(&path("crate::a")));
        assert!(!path("crate::ab").starts_with(&path("crate::a")));
    }

    #[test]
    fn block_modules_are_distinct_but_transparent() {
        let local = ModulePath::root().block(4).join("m");
        assert_ne!(local, path("crate::m"));
        assert_eq!(local.parent(), Some(ModulePath::root()));
        assert_eq!(local.join("n").parent(), Some(local.clone()));
        assert_eq!(local.qualify("x"), "m::x");
        assert!(local.starts_with(&ModulePath::root()));
    }

    #[test]
    fn private_is_visible_in_owner_subtree() {
        let owner = path("crate::a");
        assert!(Visibility::Private.is_visible_from(&owner, &path("crate::a::b"), &REACH));
        assert!(Visibility::Private.is_visible_from(&owner, &owner, &REACH));
        assert!(!Visibility::Private.is_visible_from(&owner, &path("crate::c"), &REACH));
        assert!(!Visibility::Private.is_visible_from(&owner, &ModulePath::root(), &REACH));
    }

    #[test]
    fn restricted_visibility_uses_its_own_root() {
        let owner = path("crate::a::b");
        let vis = Visibility::PublicInPath(path("crate::a"));
        assert!(vis.is_visible_from(&owner, &path("crate::a::c"), &REACH));
        assert!(!vis.is_visible_from(&owner, &path("crate::d"), &REACH));
        assert!(Visibility::Public.is_visible_from(&owner, &path("crate::d"), &REACH));
    }

    #[test]
    fn ordering_is_partial() {
        let root = ModulePath::root();
        let a = path("crate::a");
        let b = path("crate::b");

        assert_eq!(
            Visibility::Private.compare(&a, &Visibility::PublicInPath(a.clone()), &root, &REACH),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Visibility::Private.compare(&a, &Visibility::PublicInPath(root.clone()), &root, &REACH),
            Some(Ordering::Less)
        );
        assert_eq!(
            Visibility::Public.compare(&root, &Visibility::PublicInPath(root.clone()), &a, &REACH),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Visibility::Private.compare(&a, &Visibility::Private, &b, &REACH),
            None
        );
        assert!(!Visibility::Private.is_within(&a, &Visibility::Private, &b, &REACH));
        assert!(Visibility::Private.is_within(&a, &Visibility::Public, &b, &REACH));
    }

    #[test]
    fn relative_rendering() {
        let root = ModulePath::root();
        let a = path("crate::a");
        assert_eq!(Visibility::Private.relative_to(&root, &root), Visibility::Private);
        assert_eq!(
            Visibility::Private.relative_to(&root, &a),
            Visibility::PublicInPath(root.clone())
        );
        assert_eq!(Visibility::PublicInPath(root.clone()).to_source(&a), "pub(crate)");
        assert_eq!(Visibility::PublicInPath(a.clone()).to_source(&a), "pub(self)");
        assert_eq!(
            Visibility::PublicInPath(a.clone()).to_source(&path("crate::a::b")),
            "pub(super)"
        );
        assert_eq!(
            Visibility::PublicInPath(a.clone()).to_source(&path("crate::b::c")),
            "pub(in crate::a)"
        );
        assert_eq!(Visibility::PublicInPath(root).to_string(), "pub(crate)");
    }
}
