use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "redraft",
    about = "Three-way merge for records and prose, with preserved drafts",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file (defaults to ./redraft.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge two JSON documents against their common ancestor
    Merge(MergeArgs),
    /// Merge two text files sentence by sentence
    Text(TextArgs),
    /// Show the sentence diff between two text files
    Diff(DiffArgs),
    /// Inspect or clear preserved drafts
    Draft(DraftArgs),
}

/// A file argument; `-` stands for a missing side.
pub const MISSING: &str = "-";

#[derive(Args)]
pub struct MergeArgs {
    /// Common ancestor (`-` if absent)
    pub base: String,
    /// Local version (`-` if deleted locally)
    pub ours: String,
    /// Remote version (`-` if deleted remotely)
    pub theirs: String,
    /// Exit with status 1 when a local edit was overridden
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct TextArgs {
    /// Common ancestor (`-` for empty)
    pub base: String,
    pub ours: String,
    pub theirs: String,
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    pub before: PathBuf,
    pub after: PathBuf,
}

#[derive(Args)]
pub struct DraftArgs {
    #[command(subcommand)]
    pub action: DraftAction,
    /// Draft directory (overrides the configured one)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum DraftAction {
    /// Show a preserved draft and whether it would still be restored
    Show(DraftTarget),
    /// Remove a preserved draft
    Clear(DraftTarget),
}

#[derive(Args)]
pub struct DraftTarget {
    /// Draft name
    #[arg(required_unless_present = "record")]
    pub name: Option<String>,
    /// Address the draft of a record by id instead of by name
    #[arg(long, conflicts_with = "name")]
    pub record: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_merge_with_missing_side() {
        let cli = Cli::parse_from(["redraft", "merge", "base.json", "ours.json", "-"]);
        match cli.command {
            Command::Merge(args) => {
                assert_eq!(args.theirs, MISSING);
                assert!(!args.strict);
            }
            _ => panic!("expected merge"),
        }
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "redraft", "diff", "a.txt", "b.txt", "--format", "json", "--verbose",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
    }

    #[test]
    fn draft_target_by_record_id() {
        let cli = Cli::parse_from(["redraft", "draft", "show", "--record", "7"]);
        match cli.command {
            Command::Draft(DraftArgs { action: DraftAction::Show(target), .. }) => {
                assert_eq!(target.record, Some(7));
                assert_eq!(target.name, None);
            }
            _ => panic!("expected draft show"),
        }
    }

    #[test]
    fn draft_target_requires_name_or_record() {
        assert!(Cli::try_parse_from(["redraft", "draft", "clear"]).is_err());
        assert!(Cli::try_parse_from(["redraft", "draft", "clear", "x", "--record", "1"]).is_err());
    }
}
