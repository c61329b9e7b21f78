//! Diagnostic types for name-resolution errors.
//!
//! This module defines the diagnostic records produced by the duplicate
//! detector and the visibility validator, and the emitter that merges them
//! into the single ordered list handed back to the host.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::span::SourceSpan;
use crate::visibility::Visibility;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    /// Error - rejected by the compiler.
    Error,
    /// Warning - potential issue.
    Warning,
}

/// A diagnostic code identifying the type of diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DiagnosticCode {
    // Duplicate definitions
    /// Two items with one name in one namespace.
    DuplicateDefinition,
    /// Two associated items with one name in an impl.
    DuplicateAssociatedItem,
    /// Two fields with one name.
    DuplicateField,
    /// Two generic parameters with one name.
    DuplicateGenericParam,
    /// Two lifetime parameters with one name.
    DuplicateLifetime,
    /// One identifier bound twice in a parameter list.
    DuplicateBinding,

    // Import collisions
    /// An import and an item bind the same name.
    ImportCollidesWithItem,
    /// Two imports bind the same name.
    DuplicateImport,
    /// Two `extern crate` bind the same name.
    DuplicateExternCrate,
    /// An `extern crate` and an import bind the same name.
    ExternCrateCollidesWithImport,
    /// An `extern crate` and an item bind the same name.
    ExternCrateCollidesWithItem,
    /// `self` appears twice in one use group.
    DuplicateSelfImport,

    // Privacy
    /// A private item is re-exported.
    PrivateItemCannotBeReexported,
    /// A private module is re-exported through `self`.
    PrivateModuleReexport,
    /// A path goes through or names a private module.
    PrivateModuleInPath,
    /// A path names a private item.
    PrivateAccess,
    /// A private field is accessed.
    PrivateFieldAccess,
    /// A private method is called.
    PrivateMethodAccess,

    // Visibility qualifiers
    /// A qualifier where none is allowed.
    UnnecessaryVisibilityQualifier,
    /// `pub(path)` without `in`.
    IncorrectVisibilityRestriction,
}

impl DiagnosticCode {
    /// Returns the rustc error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateDefinition => "E0428",
            Self::DuplicateAssociatedItem => "E0201",
            Self::DuplicateField => "E0124",
            Self::DuplicateGenericParam => "E0403",
            Self::DuplicateLifetime => "E0263",
            Self::DuplicateBinding => "E0415",
            Self::ImportCollidesWithItem => "E0255",
            Self::DuplicateImport => "E0252",
            Self::DuplicateExternCrate => "E0259",
            Self::ExternCrateCollidesWithImport => "E0254",
            Self::ExternCrateCollidesWithItem => "E0260",
            Self::DuplicateSelfImport => "E0430",
            Self::PrivateItemCannotBeReexported => "E0364",
            Self::PrivateModuleReexport => "E0365",
            Self::PrivateModuleInPath | Self::PrivateAccess => "E0603",
            Self::PrivateFieldAccess => "E0616",
            Self::PrivateMethodAccess => "E0624",
            Self::UnnecessaryVisibilityQualifier => "E0449",
            Self::IncorrectVisibilityRestriction => "E0704",
        }
    }

    /// Returns the default severity for this diagnostic code.
    #[must_use]
    pub fn severity(&self) -> DiagnosticSeverity {
        DiagnosticSeverity::Error
    }
}

/// Related information for a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedInfo {
    /// The location of the related information.
    pub span: SourceSpan,
    /// The message.
    pub message: String,
}

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The diagnostic code.
    pub code: DiagnosticCode,
    /// The severity level.
    pub severity: DiagnosticSeverity,
    /// The primary span.
    pub span: SourceSpan,
    /// The diagnostic message.
    pub message: String,
    /// Secondary spans (e.g., "previous definition here").
    pub related: Vec<RelatedInfo>,
    /// Narrower visibility proposed for a re-export.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Visibility>,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(code: DiagnosticCode, span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            code,
            span,
            message: message.into(),
            related: Vec::new(),
            suggestion: None,
        }
    }

    /// Creates an error diagnostic.
    pub fn error(code: DiagnosticCode, span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            ..Self::new(code, span, message)
        }
    }

    /// Adds related information to the diagnostic.
    #[must_use]
    pub fn with_related(mut self, span: SourceSpan, message: impl Into<String>) -> Self {
        self.related.push(RelatedInfo {
            span,
            message: message.into(),
        });
        self
    }

    /// Attaches a suggested visibility.
    #[must_use]
    pub fn with_suggestion(mut self, visibility: Visibility) -> Self {
        self.suggestion = Some(visibility);
        self
    }

    /// Returns true if this is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        };
        write!(
            f,
            "{severity}[{}]: {} (at {}..{})",
            self.code.code(),
            self.message,
            self.span.start(),
            self.span.end()
        )
    }
}

/// Builder for collecting diagnostics.
#[derive(Debug, Default)]
pub struct DiagnosticBuilder {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBuilder {
    /// Creates a new diagnostic builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Adds an error.
    pub fn error(&mut self, code: DiagnosticCode, span: SourceSpan, message: impl Into<String>) {
        self.add(Diagnostic::error(code, span, message));
    }

    /// Returns true if any errors have been recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Consumes the builder and returns the diagnostics.
    #[must_use]
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Merges detector and validator findings into the final list.
///
/// The result is ordered by file, primary start offset and rustc code;
/// entries with the same code and primary span are kept once.
#[must_use]
pub fn emit(detected: Vec<Diagnostic>, validated: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut diagnostics = detected;
    diagnostics.extend(validated);
    diagnostics.sort_by(|a, b| {
        a.span
            .file_id
            .cmp(&b.span.file_id)
            .then_with(|| a.span.start().cmp(&b.span.start()))
            .then_with(|| a.code.code().cmp(b.code.code()))
    });
    let mut seen = FxHashSet::default();
    diagnostics.retain(|diagnostic| seen.insert((diagnostic.code, diagnostic.span)));
    diagnostics
}
