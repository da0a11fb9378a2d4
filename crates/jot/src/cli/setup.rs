use clap::{Args, Parser, Subcommand, ValueEnum};
use jotapp::commands::export::ExportFormat;
use jotapp::commands::view::{CategoryFilter, PriorityFilter, SortKey};
use jotapp::model::{Category, Priority, Theme};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "jot",
    bin_name = "jot",
    version,
    about = "Local-only note shell for the terminal",
    long_about = None,
    after_help = "Without a command, jot starts an interactive shell. Type `help` at the prompt."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Data directory (defaults to the platform data directory)
    #[arg(long, env = "JOT_DATA_DIR", global = true, help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Verbose logging on stderr
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

/// One line typed at the shell prompt.
#[derive(Parser, Debug)]
#[command(name = "jot", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default, Clone)]
pub struct NoteAttrs {
    #[arg(short, long)]
    pub category: Option<Category>,

    #[arg(short, long)]
    pub priority: Option<Priority>,

    /// Comma separated tags
    #[arg(short, long)]
    pub tags: Option<String>,

    #[arg(long)]
    pub color: Option<String>,

    /// Reminder as RFC 3339 (2024-05-01T09:00:00Z), or `none` to clear it
    #[arg(long)]
    pub remind: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    Active,
    Archived,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a note (uses the draft when no text is given)
    #[command(alias = "n", display_order = 1)]
    Add {
        #[command(flatten)]
        attrs: NoteAttrs,

        /// Note text. `\n` starts a new line
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Show, set or clear the draft
    #[command(display_order = 2)]
    Draft {
        #[arg(long, conflicts_with = "text")]
        clear: bool,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// List the notes of the current view
    #[command(alias = "ls", display_order = 3)]
    List,

    /// Show notes in full
    #[command(alias = "v", display_order = 4)]
    Show {
        /// View positions (1, 2, ...) or id prefixes
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,
    },

    /// Edit a note
    #[command(alias = "e", display_order = 5)]
    Edit {
        selector: String,

        #[command(flatten)]
        attrs: NoteAttrs,

        /// Keep the edit open; finish with `save` or `cancel`
        #[arg(long)]
        hold: bool,

        /// Replacement text
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Save the open edit
    #[command(display_order = 6)]
    Save,

    /// Discard the open edit
    #[command(display_order = 7)]
    Cancel,

    /// Delete notes
    #[command(alias = "rm", display_order = 10)]
    Delete {
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,
    },

    /// Archive or unarchive notes
    #[command(display_order = 11)]
    Archive {
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,
    },

    /// Copy a note
    #[command(alias = "dup", display_order = 12)]
    Duplicate { selector: String },

    /// Mark or unmark favorites
    #[command(alias = "fav", display_order = 13)]
    Favorite {
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,
    },

    /// Pin or unpin notes
    #[command(display_order = 14)]
    Pin {
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,
    },

    /// Toggle notes in the bulk selection
    #[command(alias = "sel", display_order = 20)]
    Select {
        /// Select every note of the current view
        #[arg(long, conflicts_with_all = ["clear", "selectors"])]
        all: bool,

        #[arg(long, conflicts_with = "selectors")]
        clear: bool,

        selectors: Vec<String>,
    },

    /// Act on the selected notes
    #[command(display_order = 21)]
    Bulk {
        #[command(subcommand)]
        action: BulkAction,
    },

    /// Search text, titles and tags (no words clears the search)
    #[command(alias = "s", display_order = 30)]
    Search {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },

    /// Filter the view by category and priority (`all` resets)
    #[command(display_order = 31)]
    Filter {
        #[arg(short, long)]
        category: Option<CategoryFilter>,

        #[arg(short, long)]
        priority: Option<PriorityFilter>,
    },

    /// Sort the view: newest, oldest, alphabetical, priority, category
    #[command(display_order = 32)]
    Sort { key: SortKey },

    /// Switch between active and archived notes (toggles without argument)
    #[command(display_order = 33)]
    Scope {
        #[arg(value_enum)]
        scope: Option<ScopeArg>,
    },

    /// Collection statistics
    #[command(display_order = 40)]
    Stats,

    /// Every tag in use
    #[command(display_order = 41)]
    Tags,

    /// Export the current scope as json, txt or csv
    #[command(display_order = 50)]
    Export {
        #[arg(default_value = "json")]
        format: ExportFormat,

        /// Output file (defaults to notes.<format> in the working directory)
        #[arg(short, long, conflicts_with = "stdout")]
        out: Option<PathBuf>,

        /// Print instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Import notes from a JSON file
    #[command(display_order = 51)]
    Import { path: PathBuf },

    /// Show or set the theme: light, dark or auto
    #[command(display_order = 60)]
    Theme { theme: Option<Theme> },

    /// List timestamped backups, newest first
    #[command(display_order = 61)]
    Backups,

    /// Replace all notes with a backup
    #[command(display_order = 62)]
    Restore {
        /// Backup key, as shown by `backups`, or `notes-backup` for the latest
        key: String,
    },

    /// Storage and backup status
    #[command(display_order = 63)]
    Status,

    /// Leave the shell
    #[command(alias = "exit", alias = "q", display_order = 70)]
    Quit,
}

#[derive(Subcommand, Debug)]
pub enum BulkAction {
    /// Delete the selected notes
    Delete,
    /// Archive or unarchive the selected notes
    Archive,
    /// Move the selected notes to a category
    Category { category: Category },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn line(words: &[&str]) -> Command {
        ShellLine::try_parse_from(words).unwrap().command
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
        ShellLine::command().debug_assert();
    }

    #[test]
    fn test_add_parses_attrs_then_text() {
        match line(&["add", "-c", "work", "-t", "a,b", "Call", "-me"]) {
            Command::Add { attrs, text } => {
                assert_eq!(attrs.category, Some(Category::Work));
                assert_eq!(attrs.tags.as_deref(), Some("a,b"));
                assert_eq!(text, vec!["Call", "-me"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_typed_values() {
        assert!(matches!(
            line(&["sort", "priority"]),
            Command::Sort {
                key: SortKey::Priority
            }
        ));
        assert!(matches!(
            line(&["export", "csv", "--stdout"]),
            Command::Export {
                format: ExportFormat::Csv,
                stdout: true,
                ..
            }
        ));
        assert!(matches!(
            line(&["filter", "-c", "all"]),
            Command::Filter {
                category: Some(CategoryFilter::All),
                ..
            }
        ));
        assert!(ShellLine::try_parse_from(["sort", "sideways"]).is_err());
    }

    #[test]
    fn test_aliases() {
        assert!(matches!(line(&["ls"]), Command::List));
        assert!(matches!(line(&["q"]), Command::Quit));
        assert!(matches!(line(&["rm", "1", "2"]), Command::Delete { .. }));
    }
}
