use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use sticky_patcher::{
    apply_rules, check_rules, rules, ApplyError, ProjectGuard, Rule, RuleResult, SourceDocument,
};
use walkdir::WalkDir;

/// Default target, relative to the project root.
const DEFAULT_TARGET: &str = "src/App.js";

/// Environment variable overriding the target file.
const TARGET_ENV: &str = "STICKY_PATCHER_TARGET";

#[derive(Parser)]
#[command(name = "sticky-patcher")]
#[command(about = "Retrofit sticky section headers into the invoice form UI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the sticky-header transformation
    Apply {
        /// Target source file (auto-detected if not specified)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Dry run - evaluate and report without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Check transformation status without modifying the target
    Status {
        /// Target source file (auto-detected if not specified)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Emit a machine-readable JSON report
        #[arg(long)]
        json: bool,
    },

    /// Verify the transformation is fully applied
    Verify {
        /// Target source file (auto-detected if not specified)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List the rules in the catalog
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            file,
            dry_run,
            diff,
        } => cmd_apply(file, dry_run, diff),

        Commands::Status { file, json } => cmd_status(file, json),

        Commands::Verify { file } => cmd_verify(file),

        Commands::List => cmd_list(),
    }
}

/// Resolve the target file using multiple detection strategies
///
/// Priority order:
/// 1. Explicit --file flag
/// 2. STICKY_PATCHER_TARGET environment variable
/// 3. Auto-detect from the nearest package.json root
fn resolve_target(cli_file: Option<PathBuf>) -> Result<PathBuf> {
    // 1. Explicit flag (highest priority)
    if let Some(path) = cli_file {
        return Ok(path.canonicalize()?);
    }

    // 2. Environment variable
    if let Ok(env_path) = env::var(TARGET_ENV) {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(path.canonicalize()?);
        }
        eprintln!(
            "{}",
            format!(
                "Warning: {} is set but path doesn't exist: {}",
                TARGET_ENV, env_path
            )
            .yellow()
        );
    }

    // 3. Auto-detect from current directory
    if let Some(path) = auto_detect_target() {
        println!(
            "{}",
            format!("Auto-detected target: {}", path.display()).dimmed()
        );
        return Ok(path);
    }

    // 4. Helpful error with multiple solutions
    anyhow::bail!(
        "{}\n{}\n  {}\n  {}\n  {}",
        "Could not find the form component to patch.".red(),
        "Try one of:".bold(),
        "1. cd into the app directory: cd /path/to/app && sticky-patcher apply",
        "2. Specify explicitly: sticky-patcher apply --file /path/to/app/src/App.js",
        format!("3. Set environment variable: export {}=/path/to/app/src/App.js", TARGET_ENV)
    )
}

/// Auto-detect the target by walking up to the nearest package.json root.
///
/// Prefers `src/App.js` directly under the root; otherwise takes the first
/// `App.js` found anywhere under `src/`.
fn auto_detect_target() -> Option<PathBuf> {
    let current = env::current_dir().ok()?;

    for ancestor in current.ancestors() {
        if !ancestor.join("package.json").exists() {
            continue;
        }

        let default = ancestor.join(DEFAULT_TARGET);
        if default.exists() {
            return default.canonicalize().ok();
        }

        let src = ancestor.join("src");
        if src.exists() {
            let mut found: Vec<PathBuf> = WalkDir::new(&src)
                .into_iter()
                .flatten()
                .filter(|e| e.file_type().is_file() && e.file_name().to_str() == Some("App.js"))
                .map(|e| e.path().to_path_buf())
                .collect();
            found.sort();
            if let Some(path) = found.first() {
                return path.canonicalize().ok();
            }
        }
    }

    None
}

/// The nearest ancestor of the target carrying a package.json.
fn project_root_of(target: &Path) -> PathBuf {
    target
        .ancestors()
        .skip(1)
        .find(|a| a.join("package.json").exists())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| {
            target
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf()
        })
}

#[derive(Debug, Default)]
struct PackageInfo {
    name: Option<String>,
    version: Option<String>,
}

/// Helper: Read project name/version from package.json
fn read_package_info(project_root: &Path) -> PackageInfo {
    let manifest = project_root.join("package.json");
    let Ok(raw) = fs::read_to_string(&manifest) else {
        return PackageInfo::default();
    };

    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(json) => PackageInfo {
            name: json
                .get("name")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            version: json
                .get("version")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        },
        Err(e) => {
            eprintln!(
                "{}",
                format!("Warning: could not parse {}: {}", manifest.display(), e).yellow()
            );
            PackageInfo::default()
        }
    }
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
    println!();
}

#[derive(Debug, Default)]
struct Totals {
    applied: usize,
    already_applied: usize,
    skipped: usize,
    failed: usize,
}

fn report_results(
    results: &[(String, Result<RuleResult, ApplyError>)],
    dry_run: bool,
) -> Totals {
    let mut totals = Totals::default();

    for (rule_id, result) in results {
        match result {
            Ok(RuleResult::Applied) => {
                if dry_run {
                    println!("{} {}: Would apply", "✓".green(), rule_id);
                } else {
                    println!("{} {}: Applied", "✓".green(), rule_id);
                }
                totals.applied += 1;
            }
            Ok(RuleResult::AlreadyApplied) => {
                println!("{} {}: Already applied", "⊙".yellow(), rule_id);
                totals.already_applied += 1;
            }
            Ok(RuleResult::Skipped { reason }) => {
                eprintln!("{} {}: Skipped - {}", "⊘".red(), rule_id, reason);
                totals.skipped += 1;
            }
            Err(e) => {
                eprintln!("{} {}: Error - {}", "✗".red(), rule_id, e);
                if let ApplyError::AmbiguousMatch { count } = e {
                    eprintln!(
                        "  {}",
                        format!("CONFLICT: pattern matched {} locations (expected 1)", count).red()
                    );
                    eprintln!("  Action: the component has duplicate section markup; fix it first");
                }
                totals.failed += 1;
            }
        }
    }

    totals
}

fn print_summary(totals: &Totals) {
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", totals.applied).green());
    println!(
        "  {} already applied",
        format!("{}", totals.already_applied).yellow()
    );
    println!("  {} skipped", format!("{}", totals.skipped).red());
    println!("  {} failed", format!("{}", totals.failed).red());
}

/// Resolve, guard, and describe the target; shared preamble of every command.
fn open_target(file: Option<PathBuf>, quiet: bool) -> Result<(PathBuf, PackageInfo)> {
    let target = resolve_target(file)?;
    let project_root = project_root_of(&target);
    let guard = ProjectGuard::new(&project_root)?;
    let target = guard.validate_path(&target)?;

    let info = read_package_info(&project_root);
    if !quiet {
        println!(
            "Project: {} {}",
            info.name.as_deref().unwrap_or("(unnamed)"),
            info.version.as_deref().unwrap_or("")
        );
        println!("Target: {}", target.display());
        println!();
    }

    Ok((target, info))
}

fn cmd_apply(file: Option<PathBuf>, dry_run: bool, show_diff: bool) -> Result<()> {
    let (target, _info) = open_target(file, false)?;

    if dry_run {
        println!(
            "{}",
            "[DRY RUN - showing what would be applied]".cyan()
        );
    }

    let mut doc = SourceDocument::load(&target)?;
    let before = doc.content().to_string();

    let results = apply_rules(&mut doc, &rules());
    let totals = report_results(&results, dry_run);

    if show_diff && doc.content() != before {
        display_diff(&target, &before, doc.content());
    }

    if !dry_run && doc.content() != before {
        doc.save()?;
    }

    println!();
    print_summary(&totals);

    if totals.skipped + totals.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Serialize)]
struct StatusReport {
    target: String,
    project: Option<String>,
    version: Option<String>,
    rules: Vec<RuleStatus>,
}

#[derive(Serialize)]
struct RuleStatus {
    id: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

fn cmd_status(file: Option<PathBuf>, json: bool) -> Result<()> {
    let (target, info) = open_target(file, json)?;

    let doc = SourceDocument::load(&target)?;
    let results = check_rules(&doc, &rules());

    if json {
        let report = StatusReport {
            target: target.display().to_string(),
            project: info.name,
            version: info.version,
            rules: results
                .iter()
                .map(|(id, result)| {
                    let (status, detail) = match result {
                        Ok(RuleResult::AlreadyApplied) => ("applied", None),
                        Ok(RuleResult::Applied) => ("pending", None),
                        Ok(RuleResult::Skipped { reason }) => ("unmatched", Some(reason.clone())),
                        Err(e) => ("error", Some(e.to_string())),
                    };
                    RuleStatus {
                        id: id.clone(),
                        status,
                        detail,
                    }
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Transformation Status Report".bold());
    println!();

    let mut applied = Vec::new();
    let mut pending = Vec::new();
    let mut unmatched = Vec::new();

    for (rule_id, result) in results {
        match result {
            Ok(RuleResult::AlreadyApplied) => applied.push(rule_id),
            Ok(RuleResult::Applied) => pending.push(rule_id),
            Ok(RuleResult::Skipped { reason }) => unmatched.push((rule_id, reason)),
            Err(e) => unmatched.push((rule_id, e.to_string())),
        }
    }

    if !applied.is_empty() {
        println!(
            "{} {} ({} rules)",
            "✓".green(),
            "APPLIED".green().bold(),
            applied.len()
        );
        for id in &applied {
            println!("  - {}", id);
        }
        println!();
    }

    if !pending.is_empty() {
        println!(
            "{} {} ({} rules)",
            "⊙".yellow(),
            "PENDING".yellow().bold(),
            pending.len()
        );
        for id in &pending {
            println!("  - {}", id);
        }
        println!();
    }

    if !unmatched.is_empty() {
        println!(
            "{} {} ({} rules)",
            "⊘".red(),
            "UNMATCHED".red().bold(),
            unmatched.len()
        );
        for (id, reason) in &unmatched {
            println!("  - {} ({})", id, reason.dimmed());
        }
        println!();
    }

    Ok(())
}

fn cmd_verify(file: Option<PathBuf>) -> Result<()> {
    let (target, _info) = open_target(file, false)?;

    println!("{}", "Verifying transformation...".bold());
    println!();

    let doc = SourceDocument::load(&target)?;
    let results = check_rules(&doc, &rules());

    let mut verified = 0;
    let mut mismatch = 0;

    for (rule_id, result) in results {
        match result {
            Ok(RuleResult::AlreadyApplied) => {
                println!("{} {}: Verified (already applied)", "✓".green(), rule_id);
                verified += 1;
            }
            Ok(RuleResult::Applied) => {
                eprintln!("{} {}: MISMATCH", "✗".red(), rule_id);
                eprintln!("  Expected: rule already applied");
                eprintln!("  Found: rule not yet applied");
                mismatch += 1;
            }
            Ok(RuleResult::Skipped { reason }) => {
                eprintln!("{} {}: MISMATCH", "✗".red(), rule_id);
                eprintln!("  Error: {}", reason);
                mismatch += 1;
            }
            Err(e) => {
                eprintln!("{} {}: MISMATCH", "✗".red(), rule_id);
                eprintln!("  Error: {}", e);
                mismatch += 1;
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} verified", format!("{}", verified).green());
    println!("  {} mismatch", format!("{}", mismatch).red());

    if mismatch > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_list() -> Result<()> {
    println!("{}", "Rule catalog (applied in this order):".bold());
    println!();

    for rule in rules() {
        let kind = match &rule {
            Rule::Insert(_) => "insert".cyan(),
            Rule::Rewrite(_) => "rewrite".magenta(),
        };
        println!("{} [{}]", rule.id().bold(), kind);
        println!("  {}", rule.description());
        println!("  guard: {}", rule.guard_marker().dimmed());
        println!();
    }

    Ok(())
}
