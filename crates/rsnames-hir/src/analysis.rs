//! One analysis pass: build the symbol table, run both checks, merge.

use tracing::debug;

use crate::cfg::CfgEvaluator;
use crate::check::{detect, detect_self_imports, VisibilityValidator};
use crate::config::{AnalysisConfig, DiagnosticSettings};
use crate::diagnostics::{emit, Diagnostic};
use crate::item_tree::ItemTree;
use crate::scope::ScopeBuilder;
use crate::symbols::SymbolTable;
use crate::visibility::{ModuleReachability, ModuleTreeReachability};

/// Runs the duplicate and visibility checks over item trees.
pub struct Analysis<'a> {
    cfg: &'a dyn CfgEvaluator,
    reach: &'a dyn ModuleReachability,
    settings: Option<&'a DiagnosticSettings>,
}

impl<'a> Analysis<'a> {
    /// Creates an analysis over the host's oracles.
    pub fn new(cfg: &'a dyn CfgEvaluator, reach: &'a dyn ModuleReachability) -> Self {
        Self {
            cfg,
            reach,
            settings: None,
        }
    }

    /// Filters the reported diagnostics through `settings`.
    #[must_use]
    pub fn with_settings(mut self, settings: &'a DiagnosticSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Builds the symbol table of `tree`.
    #[must_use]
    pub fn symbols(&self, tree: &ItemTree) -> SymbolTable {
        ScopeBuilder::new(self.cfg, self.reach).build(tree)
    }

    /// Checks `tree` and returns its diagnostics in reporting order.
    #[must_use]
    pub fn check(&self, tree: &ItemTree) -> Vec<Diagnostic> {
        let table = self.symbols(tree);
        self.check_table(&table)
    }

    /// Checks an already built table.
    #[must_use]
    pub fn check_table(&self, table: &SymbolTable) -> Vec<Diagnostic> {
        let mut detected: Vec<Diagnostic> = table
            .containers()
            .iter()
            .flat_map(detect)
            .collect();
        detected.extend(detect_self_imports(table.self_import_groups()));
        let validated = VisibilityValidator::new(table, self.reach).run();
        debug!(
            "{} duplicate and {} visibility findings over {} containers",
            detected.len(),
            validated.len(),
            table.containers().len()
        );

        let mut diagnostics = emit(detected, validated);
        if let Some(settings) = self.settings {
            settings.apply(&mut diagnostics);
        }
        diagnostics
    }
}

/// Checks `tree` under `config`, with module reachability by path prefix.
#[must_use]
pub fn check_with_config(tree: &ItemTree, config: &AnalysisConfig) -> Vec<Diagnostic> {
    Analysis::new(&config.cfg, &ModuleTreeReachability)
        .with_settings(&config.diagnostics)
        .check(tree)
}
