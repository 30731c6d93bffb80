use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

use vstc_core::{Config, Diagnostic, Report, SchemeDetails, Severity};
use vstc_scheme::compile_file;
use vstc_sink::{MemorySink, SymbolTable};

const CONFIG_FILE: &str = "vstc.toml";
const SCHEME_SUFFIX: &str = ".scheme.toml";
const TABLE_SUFFIX: &str = ".vst.json";

/// vstc - Compiler for transliteration schemes
#[derive(Parser)]
#[command(name = "vstc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: vstc.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a scheme file, or every scheme under a directory
    Compile {
        /// Scheme file or directory
        path: PathBuf,

        /// Directory for the compiled tables (default: next to each scheme)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output file for report.json
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Also output markdown report
        #[arg(short, long)]
        markdown: Option<PathBuf>,
    },

    /// List the compiled tables in a directory
    Schemes {
        /// Directory to search
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Compile {
            path,
            output_dir,
            report,
            markdown,
        } => compile_command(
            &config,
            &path,
            output_dir.as_deref(),
            report.as_deref(),
            markdown.as_deref(),
            cli.verbose,
        ),
        Commands::Schemes { dir } => schemes_command(&dir),
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "off" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }

    let default_path = Path::new(CONFIG_FILE);
    if default_path.exists() {
        return Config::from_file(default_path)
            .with_context(|| format!("Failed to load config {}", default_path.display()));
    }

    if verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

/// `--output` wins; otherwise the config's directory, relative to the config file
fn resolve_output_dir(config: &Config, flag: Option<&Path>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf).or_else(|| config.output_directory())
}

/// Compile command - build one symbol table per scheme
fn compile_command(
    config: &Config,
    path: &Path,
    output_dir: Option<&Path>,
    report_path: Option<&Path>,
    markdown: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let sources = find_files(path, SCHEME_SUFFIX)?;
    if sources.is_empty() {
        anyhow::bail!("No {} files found under {}", SCHEME_SUFFIX, path.display());
    }

    if verbose {
        eprintln!("{} {} scheme(s)", "Found".cyan(), sources.len());
    }

    let output_dir = resolve_output_dir(config, output_dir);

    let mut report = Report::new();
    for source in &sources {
        let scheme_report = compile_scheme(config, source, output_dir.as_deref(), verbose)?;
        report.merge(scheme_report);
    }

    if let Some(report_path) = report_path {
        report
            .save_to_file(report_path)
            .with_context(|| format!("Failed to write report {}", report_path.display()))?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), report_path.display());
        }
    }

    if let Some(md_path) = markdown {
        std::fs::write(md_path, generate_markdown_report(&report))
            .with_context(|| format!("Failed to write markdown report {}", md_path.display()))?;
        if verbose {
            eprintln!("{} {}", "Markdown report saved to:".green(), md_path.display());
        }
    }

    print_report_summary(&report);

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

fn compile_scheme(
    config: &Config,
    source: &Path,
    output_dir: Option<&Path>,
    verbose: bool,
) -> Result<Report> {
    let target = table_path(source, output_dir);

    println!("{} {}", "Compiling".cyan(), source.display());
    println!("{} {}", "Building".cyan(), target.display());

    let compiled = compile_file(source, MemorySink::new(), config);

    for diagnostic in &compiled.report.diagnostics {
        print_diagnostic(diagnostic);
    }

    if compiled.aborted {
        eprintln!("{} {}", "Aborted, nothing written for".red(), source.display());
    } else {
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        compiled
            .sink
            .to_table()
            .save_to_file(&target)
            .with_context(|| format!("Failed to write table {}", target.display()))?;
        if verbose {
            eprintln!(
                "{} {} tokens to {}",
                "Wrote".green(),
                compiled.sink.token_count(),
                target.display()
            );
        }
    }

    println!(
        "Completed with '{}' warning(s) and '{}' error(s)",
        compiled.report.summary.warnings, compiled.report.summary.errors
    );

    Ok(compiled.report)
}

/// Schemes command - show the details stored in compiled tables
fn schemes_command(dir: &Path) -> Result<()> {
    let tables = find_files(dir, TABLE_SUFFIX)?;
    if tables.is_empty() {
        println!("{}", format!("No compiled tables found under {}", dir.display()).yellow());
        return Ok(());
    }

    for path in &tables {
        let table = SymbolTable::from_file(path)
            .with_context(|| format!("Failed to read table {}", path.display()))?;

        println!("{}", path.display().to_string().bold());
        match &table.details {
            Some(details) => print_details(details),
            None => println!("  {}", "No scheme details".yellow()),
        }
        println!();
    }

    Ok(())
}

fn print_details(details: &SchemeDetails) {
    println!("  Lang code    : {}", details.language_code);
    println!("  Identifier   : {}", details.identifier);
    println!("  Display name : {}", details.display_name);
    println!("  Author       : {}", details.author);
    println!("  Compiled on  : {}", details.compiled_date);
    println!("  Stable?      : {}", if details.is_stable { "Yes" } else { "No" });
}

/// `path` itself when it is a file, otherwise every file under it ending in `suffix`
fn find_files(path: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!("{} does not exist", path.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let matches = entry
            .file_name()
            .to_str()
            .map(|name| name.ends_with(suffix))
            .unwrap_or(false);
        if entry.file_type().is_file() && matches {
            files.push(entry.path().to_path_buf());
        }
    }

    Ok(files)
}

/// `ml.scheme.toml` compiles to `ml.vst.json`
fn table_path(source: &Path, output_dir: Option<&Path>) -> PathBuf {
    let file_name = source
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let stem = file_name
        .strip_suffix(SCHEME_SUFFIX)
        .or_else(|| source.file_stem().and_then(|s| s.to_str()))
        .unwrap_or("scheme");

    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => source.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    dir.join(format!("{}{}", stem, TABLE_SUFFIX))
}

fn severity_label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Error => "ERROR".red().bold(),
        Severity::Warn => "WARN".yellow().bold(),
        Severity::Info => "INFO".cyan(),
    }
}

fn print_diagnostic(diag: &Diagnostic) {
    println!("  [{}] {}: {}", severity_label(diag.severity), diag.code, diag.message);

    if let Some(loc) = &diag.location {
        println!("    at {}", loc);
    }
    if let Some(expression) = &diag.expression {
        println!("    in `{}`", expression);
    }
}

/// Print report summary to stdout
fn print_report_summary(report: &Report) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Scheme Compilation Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Schemes compiled: {}", report.summary.schemes_compiled);
    println!("  Tokens created:   {}", report.summary.tokens_created);
    println!("  Total diagnostics: {}", report.summary.total);

    if report.summary.errors > 0 {
        println!("  Errors:   {}", format!("{}", report.summary.errors).red().bold());
    } else {
        println!("  Errors:   {}", format!("{}", report.summary.errors).green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).yellow());
    } else {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).green());
    }

    println!("  Info:     {}", report.summary.info);
    println!();

    if report.diagnostics.is_empty() {
        println!("{}", "✓ No issues found!".green().bold());
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

/// Generate markdown report
fn generate_markdown_report(report: &Report) -> String {
    let mut md = String::new();

    md.push_str("# Scheme Compilation Report\n\n");
    md.push_str(&format!("**Version:** {}\n\n", report.version));
    md.push_str(&format!("**Timestamp:** {}\n\n", report.timestamp));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Schemes compiled: {}\n", report.summary.schemes_compiled));
    md.push_str(&format!("- Tokens created: {}\n", report.summary.tokens_created));
    md.push_str(&format!("- Total diagnostics: {}\n", report.summary.total));
    md.push_str(&format!("- Errors: {}\n", report.summary.errors));
    md.push_str(&format!("- Warnings: {}\n", report.summary.warnings));
    md.push_str(&format!("- Info: {}\n", report.summary.info));
    md.push('\n');

    if !report.schemes.is_empty() {
        md.push_str("## Schemes\n\n");
        md.push_str("| Identifier | Language | Display name | Stable |\n");
        md.push_str("|---|---|---|---|\n");
        for details in &report.schemes {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                details.identifier,
                details.language_code,
                details.display_name,
                if details.is_stable { "yes" } else { "no" }
            ));
        }
        md.push('\n');
    }

    if report.diagnostics.is_empty() {
        md.push_str("✅ **No issues found!**\n");
    } else {
        md.push_str("## Diagnostics\n\n");

        for diag in &report.diagnostics {
            let severity_emoji = match diag.severity {
                Severity::Error => "❌",
                Severity::Warn => "⚠️",
                Severity::Info => "ℹ️",
            };

            md.push_str(&format!("### {} {} - {}\n\n", severity_emoji, diag.severity, diag.code));
            md.push_str(&format!("{}\n\n", diag.message));

            if let Some(loc) = &diag.location {
                md.push_str(&format!("**Location:** {}\n\n", loc));
            }
            if let Some(expression) = &diag.expression {
                md.push_str(&format!("**Expression:** `{}`\n\n", expression));
            }
        }
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use vstc_core::{DiagnosticCode, Location};

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn table_names_follow_the_scheme() {
        assert_eq!(
            table_path(Path::new("schemes/ml.scheme.toml"), None),
            PathBuf::from("schemes/ml.vst.json")
        );
        assert_eq!(
            table_path(Path::new("schemes/ml.scheme.toml"), Some(Path::new("out"))),
            PathBuf::from("out/ml.vst.json")
        );
        assert_eq!(
            table_path(Path::new("hi.toml"), None),
            PathBuf::from("hi.vst.json")
        );
    }

    #[test]
    fn finds_schemes_recursively() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("indic")).unwrap();
        std::fs::write(temp.path().join("indic/ml.scheme.toml"), "").unwrap();
        std::fs::write(temp.path().join("hi.scheme.toml"), "").unwrap();
        std::fs::write(temp.path().join("notes.toml"), "").unwrap();

        let found = find_files(temp.path(), SCHEME_SUFFIX).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().display().to_string())
            .collect();

        assert_eq!(names, vec!["hi.scheme.toml", "indic/ml.scheme.toml"]);
    }

    #[test]
    fn missing_path_is_an_error() {
        assert!(find_files(Path::new("/nonexistent/schemes"), SCHEME_SUFFIX).is_err());
    }

    #[test]
    fn markdown_lists_diagnostics() {
        let report = Report::from_diagnostics(vec![Diagnostic::error(
            DiagnosticCode::ShapeEmptyValue,
            "Empty values are not allowed",
        )
        .with_location(Location::with_step("ml.scheme.toml", 3))
        .with_expression("ka => ")]);

        let md = generate_markdown_report(&report);
        assert!(md.contains("# Scheme Compilation Report"));
        assert!(md.contains("- Errors: 1"));
        assert!(md.contains("SHAPE_EMPTY_VALUE"));
        assert!(md.contains("**Location:** ml.scheme.toml (step 3)"));
        assert!(md.contains("**Expression:** `ka => `"));
    }

    #[test]
    fn output_directory_is_relative_to_the_config_file() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("conf")).unwrap();
        let path = temp.path().join("conf/vstc.toml");
        std::fs::write(&path, "[output]\ndirectory = \"out\"\n").unwrap();

        let config = load_config(Some(&path), false).unwrap();
        assert_eq!(resolve_output_dir(&config, None), Some(temp.path().join("conf/out")));
        assert_eq!(
            resolve_output_dir(&config, Some(Path::new("elsewhere"))),
            Some(PathBuf::from("elsewhere"))
        );
    }

    #[test]
    fn compiles_the_demo_scheme() {
        let temp = tempfile::tempdir().unwrap();
        let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schemes/ml.scheme.toml");

        let report = compile_scheme(&Config::default(), &source, Some(temp.path()), false).unwrap();
        assert!(!report.has_errors());

        let table = SymbolTable::from_file(&temp.path().join("ml.vst.json")).unwrap();
        assert_eq!(table.details.unwrap().identifier, "ml-unicode");
    }
}
