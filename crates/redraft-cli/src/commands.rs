use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use chrono::Utc;
use colored::Colorize;
use redraft_diff::{diff_sentences, TokenDiff};
use redraft_merge::{merge_text, MergeReport, Merger, Resolution};
use redraft_sdk::draft_name;
use redraft_store::{DraftStore, FileDraftStore};
use redraft_types::{RecordId, Value};
use serde_json::json;
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Merge(args) => cmd_merge(args, cli.format),
        Command::Text(args) => cmd_text(args, cli.format),
        Command::Diff(args) => cmd_diff(args, cli.format),
        Command::Draft(args) => cmd_draft(args, &config, cli.format),
    }
}

fn read_text(path: &str) -> anyhow::Result<Option<String>> {
    if path == MISSING {
        return Ok(None);
    }
    let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    Ok(Some(text))
}

fn read_value(path: &str) -> anyhow::Result<Option<Value>> {
    read_text(path)?
        .map(|text| Value::from_json_str(&text).with_context(|| format!("parsing {path}")))
        .transpose()
}

fn cmd_merge(args: MergeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let base = read_value(&args.base)?;
    let ours = read_value(&args.ours)?;
    let theirs = read_value(&args.theirs)?;

    let mut merger = Merger::new();
    let merged = merger.merge_values(base.as_ref(), ours.as_ref(), theirs.as_ref());
    let report = merger.into_report();
    debug!(conflicts = report.len(), "merge finished");

    match format {
        OutputFormat::Json => {
            let out = json!({ "merged": merged, "report": report });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            match &merged {
                Some(value) => println!("{}", value.to_json_pretty()),
                None => eprintln!("{} merged value is absent (deleted)", "!".yellow().bold()),
            }
            print_report(&report);
        }
    }

    let overridden = report.overridden_paths().len();
    if args.strict && overridden > 0 {
        bail!("{overridden} local edit(s) overridden by theirs");
    }
    Ok(())
}

fn print_report(report: &MergeReport) {
    for conflict in &report.conflicts {
        let path = conflict.path.to_string();
        match conflict.resolution {
            Resolution::Recursed => {
                eprintln!("  {} {}", "merged".cyan(), path.bold());
            }
            Resolution::TextMerged { overlapping: 0 } => {
                eprintln!("  {} {}", "text".green(), path.bold());
            }
            Resolution::TextMerged { overlapping } => {
                eprintln!(
                    "  {} {} ({} sentence(s) kept from theirs)",
                    "text".yellow(),
                    path.bold(),
                    overlapping
                );
            }
            Resolution::TheirsWon => {
                eprintln!("  {} {}", "theirs".red(), path.bold());
            }
        }
    }
    if report.is_clean() {
        eprintln!("{} No local edits lost.", "✓".green().bold());
    } else {
        eprintln!(
            "{} {} field(s) resolved in favor of theirs.",
            "!".yellow().bold(),
            report.overridden_paths().len()
        );
    }
}

fn cmd_text(args: TextArgs, format: OutputFormat) -> anyhow::Result<()> {
    let base = read_text(&args.base)?.unwrap_or_default();
    let ours = read_text(&args.ours)?.unwrap_or_default();
    let theirs = read_text(&args.theirs)?.unwrap_or_default();

    let merged = merge_text(&base, &ours, &theirs);

    match format {
        OutputFormat::Json => {
            let out = json!({ "text": merged.text, "overlapping": merged.overlapping });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            print!("{}", merged.text);
            if merged.overlapping > 0 {
                eprintln!(
                    "{} {} sentence(s) edited on both sides; kept theirs.",
                    "!".yellow().bold(),
                    merged.overlapping
                );
            }
        }
    }

    if args.strict && merged.overlapping > 0 {
        bail!("{} overlapping sentence edit(s)", merged.overlapping);
    }
    Ok(())
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let before = read_file(&args.before)?;
    let after = read_file(&args.after)?;
    let diff = diff_sentences(&before, &after);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&diff_json(&diff))?);
        }
        OutputFormat::Text => {
            if diff.is_unchanged() {
                println!("No changes.");
                return Ok(());
            }
            println!("{}", render_diff(&diff));
            println!(
                "{} change(s): {} sentence(s) removed, {} added",
                diff.changes(),
                diff.removed(),
                diff.added()
            );
        }
    }
    Ok(())
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn diff_json(diff: &TokenDiff<'_>) -> serde_json::Value {
    diff.iter()
        .map(|segment| {
            json!({
                "changed": segment.changed,
                "before": segment.before.concat(),
                "after": segment.after.concat(),
            })
        })
        .collect()
}

/// Unchanged text as is, removals as `[-..-]` and additions as `{+..+}`.
fn render_diff(diff: &TokenDiff<'_>) -> String {
    let mut out = String::new();
    for segment in diff {
        if !segment.changed {
            out.push_str(&segment.before.concat());
            continue;
        }
        if !segment.before.is_empty() {
            let removed = format!("[-{}-]", segment.before.concat());
            out.push_str(&removed.red().to_string());
        }
        if !segment.after.is_empty() {
            let added = format!("{{+{}+}}", segment.after.concat());
            out.push_str(&added.green().to_string());
        }
    }
    out
}

fn cmd_draft(args: DraftArgs, config: &CliConfig, format: OutputFormat) -> anyhow::Result<()> {
    let dir = args.dir.unwrap_or_else(|| config.draft_dir.clone());
    let store = FileDraftStore::new(dir);

    match args.action {
        DraftAction::Show(target) => {
            let name = target_name(target);
            let Some(draft) = store.get(&name).with_context(|| format!("reading draft {name}"))? else {
                bail!("no draft named {name} in {}", store.dir().display());
            };
            let age = draft.age_at(Utc::now());
            let expired = age >= config.draft_config().max_age;

            match format {
                OutputFormat::Json => {
                    let out = json!({
                        "name": name,
                        "date": draft.saved_at,
                        "age_secs": age.as_secs(),
                        "expired": expired,
                        "object": draft.object,
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                OutputFormat::Text => {
                    let status = if expired { "expired".red() } else { "restorable".green() };
                    println!("Draft {} ({})", name.yellow().bold(), status);
                    println!("  Saved: {} ({}s ago)", draft.saved_at.to_rfc3339(), age.as_secs());
                    if let Some(id) = RecordId::of(&draft.object) {
                        println!("  Record: {}", id.to_string().cyan());
                    }
                    println!("{}", draft.object.to_json_pretty());
                }
            }
        }
        DraftAction::Clear(target) => {
            let name = target_name(target);
            let removed = store.remove(&name).with_context(|| format!("removing draft {name}"))?;
            match format {
                OutputFormat::Json => println!("{}", json!({ "name": name, "removed": removed })),
                OutputFormat::Text if removed => println!("{} Cleared draft {}", "✓".green().bold(), name.yellow()),
                OutputFormat::Text => println!("No draft named {}.", name.yellow()),
            }
        }
    }
    Ok(())
}

fn target_name(target: DraftTarget) -> String {
    match (target.name, target.record) {
        (Some(name), _) => name,
        (None, id) => draft_name(id.map(RecordId)),
    }
}
