use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;

use loresmith::LoresmithError;
use loresmith::check::{self, LengthViolation};
use loresmith::config::ContentConfig;
use loresmith::exchange::{UpdateStats, append_lore, apply_update, parse_lore, plan_update};
use loresmith::quest::QuestCollection;
use loresmith::solutions::append_solutions;

#[derive(Parser)]
#[command(name = "loresmith", version, about = "Maintenance utilities for quest narrative text")]
struct Cli {
    /// Base directory containing one subdirectory per theme
    #[arg(long, global = true, default_value = "quests")]
    quests_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export narrative fields to lore-<theme>.md files for editing
    Export,
    /// Merge edited lore-<theme>.md files back into quests.json
    Import {
        /// Show what would change without modifying any file
        #[arg(long)]
        dry_run: bool,
    },
    /// Report narrative text exceeding the maximum length
    Check {
        #[arg(long, default_value_t = check::DEFAULT_MAX_LENGTH)]
        max_length: usize,
        /// Emit violations as JSON instead of a text report
        #[arg(long)]
        json: bool,
    },
    /// Export quest solutions to solution-<theme>.md files
    Solutions,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(cli: Cli) -> loresmith::Result<()> {
    let config = ContentConfig::new(cli.quests_dir);
    match cli.command {
        Commands::Export => run_export(&config),
        Commands::Import { dry_run } => run_import(&config, dry_run),
        Commands::Check { max_length, json } => run_check(&config, max_length, json),
        Commands::Solutions => run_solutions(&config),
    }
}

fn run_export(config: &ContentConfig) -> loresmith::Result<()> {
    let themes = config.discover_collections()?;
    if themes.is_empty() {
        println!("No quest files found in {}", config.base_dir.display());
        return Ok(());
    }
    println!("Found {} quest file(s) to process\n", themes.len());

    let mut total_entries = 0;
    for theme in &themes {
        println!("Processing {}...", theme.theme);
        let collection = match QuestCollection::load(&theme.quests_path) {
            Ok(collection) => collection,
            Err(e) => {
                error!("failed to read {}: {}", theme.quests_path.display(), e);
                println!("  Skipping {} due to errors\n", theme.theme);
                continue;
            }
        };

        match append_lore(&collection, &theme.lore_path) {
            Ok(stats) if stats.is_empty() => {
                println!("  No lore entries found in {}\n", theme.quests_path.display());
            }
            Ok(stats) => {
                println!(
                    "  Wrote {} quest lore entries to {}",
                    stats.entries,
                    theme.lore_path.display()
                );
                if stats.meta_prologue_paragraphs > 0 {
                    println!(
                        "  + Meta prologue with {} paragraph(s)",
                        stats.meta_prologue_paragraphs
                    );
                }
                if stats.meta_epilogue_paragraphs > 0 {
                    println!(
                        "  + Meta epilogue with {} paragraph(s)",
                        stats.meta_epilogue_paragraphs
                    );
                }
                total_entries += stats.entries;
                println!();
            }
            Err(e) => {
                error!("failed to write {}: {}", theme.lore_path.display(), e);
                println!();
            }
        }
    }

    println!("Complete! Exported {} total quest lore entries.", total_entries);
    Ok(())
}

fn run_import(config: &ContentConfig, dry_run: bool) -> loresmith::Result<()> {
    let themes = config.discover_lore_files()?;
    if themes.is_empty() {
        println!("No lore markdown files found in {}", config.base_dir.display());
        return Ok(());
    }
    println!("Found {} lore file(s) to process", themes.len());
    if dry_run {
        println!("DRY RUN MODE - No files will be modified");
    }
    println!();

    let mut totals = UpdateStats::default();
    for theme in &themes {
        println!("Processing {}...", theme.theme);
        let content = match fs::read_to_string(&theme.lore_path).map_err(|e| {
            LoresmithError::Import(format!("failed to read {}: {e}", theme.lore_path.display()))
        }) {
            Ok(content) => content,
            Err(e) => {
                error!("{}", e);
                println!();
                continue;
            }
        };

        let parsed = parse_lore(&content);
        if parsed.is_empty() {
            println!("  No lore entries found in {}\n", theme.lore_path.display());
            continue;
        }
        if !parsed.quests.is_empty() {
            println!("  Parsed {} quest lore entries from markdown", parsed.quests.len());
        }
        if let Some(paragraphs) = &parsed.meta_prologue {
            println!("  Parsed meta prologue with {} paragraph(s)", paragraphs.len());
        }
        if let Some(paragraphs) = &parsed.meta_epilogue {
            println!("  Parsed meta epilogue with {} paragraph(s)", paragraphs.len());
        }

        if !theme.quests_path.exists() {
            println!("  quests.json not found at {}\n", theme.quests_path.display());
            continue;
        }
        let mut collection = match QuestCollection::load(&theme.quests_path) {
            Ok(collection) => collection,
            Err(e) => {
                error!("failed to read {}: {}", theme.quests_path.display(), e);
                println!();
                continue;
            }
        };

        let plan = plan_update(&collection, &parsed);
        if dry_run {
            for change in &plan.changes {
                println!("  [DRY RUN] {}", change);
            }
            for id in &plan.unknown_ids {
                println!("  [DRY RUN] Would add new Quest {id} (found in markdown but not in JSON)");
            }
            for id in &plan.unreferenced_ids {
                println!("  [DRY RUN] Quest {id} has lore in JSON but not in markdown (keeping existing)");
            }
            if !plan.is_noop() {
                println!(
                    "  Would update: {}, add: {}, remove: {}",
                    plan.stats.updated, plan.stats.added, plan.stats.removed
                );
            }
        } else if plan.stats.updated > 0 {
            apply_update(&mut collection, &plan);
            if let Err(e) = collection.save(&theme.quests_path).map_err(|e| {
                LoresmithError::Import(format!(
                    "failed to write {}: {e}",
                    theme.quests_path.display()
                ))
            }) {
                // A failed write discards this file's counts entirely.
                error!("{}", e);
                println!();
                continue;
            }
            println!(
                "  Updated {} quest(s) in {}",
                plan.stats.updated,
                theme.quests_path.display()
            );
        } else {
            println!("  No changes needed");
        }

        totals.updated += plan.stats.updated;
        totals.added += plan.stats.added;
        totals.removed += plan.stats.removed;
        println!();
    }

    if dry_run {
        println!("DRY RUN SUMMARY:");
        println!("  Would update: {} quest(s)", totals.updated);
        println!("  Would add: {} quest(s)", totals.added);
        println!("  Quests with lore in JSON but not markdown: {}", totals.removed);
    } else {
        println!("Complete! Updated {} quest(s) across all themes.", totals.updated);
        if totals.added > 0 {
            println!("  Note: {} quest(s) found in markdown but not in JSON", totals.added);
        }
        if totals.removed > 0 {
            println!(
                "  Note: {} quest(s) have lore in JSON but not in markdown (kept existing)",
                totals.removed
            );
        }
    }
    Ok(())
}

fn run_check(config: &ContentConfig, max_length: usize, json: bool) -> loresmith::Result<()> {
    let themes = config.discover_collections()?;

    let mut violations: Vec<LengthViolation> = Vec::new();
    for theme in &themes {
        match QuestCollection::load(&theme.quests_path) {
            Ok(collection) => {
                violations.extend(check::check_collection(&theme.theme, &collection, max_length));
            }
            Err(e) => error!("failed to read {}: {}", theme.quests_path.display(), e),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&violations)?);
        return Ok(());
    }

    println!("Checking for text exceeding {} characters...\n", max_length);
    if violations.is_empty() {
        println!("All text is within the {} character limit.", max_length);
        return Ok(());
    }

    println!("Found {} violation(s):\n", violations.len());
    for (i, violation) in violations.iter().enumerate() {
        println!("{}. Theme: {}", i + 1, violation.theme);
        if let Some(id) = violation.quest_id {
            println!("   Quest ID: {}", id);
        }
        if let Some(title) = &violation.quest_title {
            println!("   Quest Title: {}", title);
        }
        println!("   Field: {}", violation.field);
        println!(
            "   Length: {} characters (exceeds by {})",
            violation.length,
            violation.length - max_length
        );
        println!("   Preview: {}\n", violation.preview);
    }
    println!("Total violations: {}", violations.len());
    Ok(())
}

fn run_solutions(config: &ContentConfig) -> loresmith::Result<()> {
    let themes = config.discover_collections()?;
    if themes.is_empty() {
        println!("No quest files found in {}", config.base_dir.display());
        return Ok(());
    }
    println!("Found {} quest file(s) to process\n", themes.len());

    let mut total = 0;
    for theme in &themes {
        println!("Processing {}...", theme.theme);
        let collection = match QuestCollection::load(&theme.quests_path) {
            Ok(collection) => collection,
            Err(e) => {
                error!("failed to read {}: {}", theme.quests_path.display(), e);
                println!("  Skipping {} due to errors\n", theme.theme);
                continue;
            }
        };

        match append_solutions(&collection, &theme.solutions_path) {
            Ok(0) => println!("  No solutions found in {}\n", theme.quests_path.display()),
            Ok(count) => {
                println!("  Wrote {} solutions to {}\n", count, theme.solutions_path.display());
                total += count;
            }
            Err(e) => {
                error!("failed to write {}: {}", theme.solutions_path.display(), e);
                println!();
            }
        }
    }

    println!("Complete! Exported {} total solutions.", total);
    Ok(())
}
