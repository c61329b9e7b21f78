//! `rsnames` - Command line driver for the duplicate and visibility checks.
//!
//! Reads an item tree serialized as JSON, runs one analysis pass and prints
//! the diagnostics. Exits with status 1 when any error was reported.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use rsnames_hir::config::CONFIG_FILE;
use rsnames_hir::{check_with_config, AnalysisConfig, Diagnostic, ItemTree};

#[derive(Debug, Parser)]
#[command(
    name = "rsnames",
    version,
    about = "Duplicate definition and visibility checks for Rust item trees",
    after_help = "Examples:\n  rsnames check tree.json\n  rsnames check tree.json --cfg unix --feature serde\n  rsnames check tree.json --format json"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check an item tree and print its diagnostics.
    Check {
        /// Item tree in JSON form.
        #[arg(value_name = "TREE")]
        tree: PathBuf,
        /// Config file (defaults to ./rsnames.toml when present).
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Enable a cfg option (`unix` or `key=value`).
        #[arg(long = "cfg", value_name = "OPTION")]
        cfg: Vec<String>,
        /// Enable a cargo feature.
        #[arg(long = "feature", value_name = "NAME")]
        features: Vec<String>,
        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check {
            tree,
            config,
            cfg,
            features,
            format,
        } => {
            let has_errors = run_check(&tree, config.as_deref(), &cfg, &features, format)?;
            if has_errors {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

fn run_check(
    tree_path: &Path,
    config_path: Option<&Path>,
    cfg: &[String],
    features: &[String],
    format: Format,
) -> anyhow::Result<bool> {
    let mut config = load_config(config_path)?;
    for option in cfg {
        match option.split_once('=') {
            Some((key, value)) => config
                .cfg
                .insert_key_value(key.trim(), value.trim().trim_matches('"')),
            None => config.cfg.insert_atom(option.trim()),
        }
    }
    for feature in features {
        config.cfg.insert_key_value("feature", feature.as_str());
    }

    let contents = std::fs::read_to_string(tree_path)
        .with_context(|| format!("failed to read item tree {}", tree_path.display()))?;
    let tree: ItemTree = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse item tree {}", tree_path.display()))?;
    debug!("loaded {} top-level items", tree.items.len());

    let diagnostics = check_with_config(&tree, &config);
    info!("{} diagnostics", diagnostics.len());
    match format {
        Format::Text => print!("{}", render_text(&diagnostics)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&diagnostics)?),
    }
    Ok(diagnostics.iter().any(Diagnostic::is_error))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    if let Some(path) = path {
        return AnalysisConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    let default = Path::new(CONFIG_FILE);
    if default.is_file() {
        debug!("using {}", default.display());
        return AnalysisConfig::load(default)
            .with_context(|| format!("failed to load config {}", default.display()));
    }
    Ok(AnalysisConfig::default())
}

fn render_text(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics {
        let _ = writeln!(out, "{}: {}", diagnostic.span.file_id, diagnostic);
        for related in &diagnostic.related {
            let _ = writeln!(
                out,
                "  note: {} (at {}:{}..{})",
                related.message,
                related.span.file_id,
                related.span.start(),
                related.span.end()
            );
        }
        if let Some(suggestion) = &diagnostic.suggestion {
            let _ = writeln!(out, "  help: suggested visibility: {}", suggestion);
        }
    }
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let _ = writeln!(
        out,
        "{} error(s), {} warning(s)",
        errors,
        diagnostics.len() - errors
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use rsnames_hir::{AnalysisConfig, Item, ItemTreeBuilder, UseTree};

    #[test]
    fn renders_duplicates_and_privacy() {
        let source = "fn Dup() {} const Dup: u32 = 1; mod bar {} pub use bar as baz;";
        let tree = ItemTreeBuilder::new(source)
            .item(Item::function("Dup"))
            .item(Item::constant("Dup"))
            .item(Item::module("bar", []))
            .item(Item::use_item(UseTree::alias("bar", "baz")).public())
            .finish()
            .unwrap();
        let diagnostics = check_with_config(&tree, &AnalysisConfig::default());
        expect![[r#"
            file#0: error[E0428]: A value named `Dup` has already been defined in this module (at 18..21)
              note: previous definition of the value `Dup` here (at file#0:3..6)
            file#0: error[E0603]: `bar` is private, and cannot be re-exported (at 51..54)
              help: suggested visibility: private
            2 error(s), 0 warning(s)
        "#]]
        .assert_eq(&render_text(&diagnostics));
    }

    #[test]
    fn item_trees_round_trip_through_json() {
        let source = "struct S { a: u8, a: u8 }";
        let tree = ItemTreeBuilder::new(source)
            .item(
                Item::structure("S")
                    .field(rsnames_hir::item_tree::FieldDecl::new("a"))
                    .field(rsnames_hir::item_tree::FieldDecl::new("a")),
            )
            .finish()
            .unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        let parsed: ItemTree = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tree);
        let diagnostics = check_with_config(&parsed, &AnalysisConfig::default());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code.code(), "E0124");
    }
}
