//! # CLI Layer
//!
//! The terminal client for jot. It is a thin layer over
//! [`jotapp::api::Notebook`].
//!
//! ## Modules
//!
//! - [`setup`]: clap definitions, shared by the process arguments and the shell prompt
//! - `handlers`: [`Command`](setup::Command) to API dispatch, returning text
//! - `render`: formatting of notes, statistics and status
//!
//! ## Lifecycle
//!
//! 1. Parse arguments and install the tracing subscriber (stderr only)
//! 2. Load `jot.toml` from the data directory
//! 3. Open the notebook and start the backup timer and the draft autosaver
//! 4. Run one command, or read command lines from stdin until `quit` or EOF
//! 5. Flush the draft and stop the backup timer

mod handlers;
mod render;
pub mod setup;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use jotapp::api::Notebook;
use jotapp::backup::BackupScheduler;
use jotapp::config::{default_data_dir, JotConfig};
use jotapp::draft::DraftAutosaver;
use jotapp::store::fs_backend::FsBackend;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use handlers::{Reply, Session};
use setup::{Cli, ShellLine};

const PROMPT: &str = "jot> ";

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let data_dir = match cli.data {
        Some(dir) => dir,
        None => default_data_dir().ok_or_else(|| anyhow!("no home directory; pass --data"))?,
    };
    tokio::fs::create_dir_all(&data_dir)
        .await
        .with_context(|| format!("cannot create data directory {}", data_dir.display()))?;

    let config = JotConfig::load(&data_dir)?;
    let policy = config.backup_policy()?;
    tracing::debug!(dir = %data_dir.display(), ?policy, "opening notebook");

    let notebook = Notebook::open(Arc::new(FsBackend::new(data_dir)))
        .with_timestamp_format(config.timestamp_format.clone());

    let mut backups = BackupScheduler::start(notebook.gateway().clone(), policy);
    let autosaver = config
        .autosave_draft
        .then(|| DraftAutosaver::start(notebook.gateway().clone(), config.draft_debounce()));
    let mut session = Session::new(notebook, autosaver);

    let result = match cli.command {
        Some(command) => match session.execute(command).await {
            Ok(Reply::Text(text)) => {
                print!("{}", text);
                Ok(())
            }
            Ok(Reply::Quit) => Ok(()),
            Err(e) => Err(e.into()),
        },
        None => shell(&mut session).await,
    };

    session.shutdown().await;
    backups.stop().await;
    result
}

/// Reads command lines from stdin. Command errors are reported and the shell
/// keeps going; only stdin failures end it early.
async fn shell(session: &mut Session) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        if interactive {
            stdout.write_all(PROMPT.as_bytes()).await?;
            stdout.flush().await?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() || words[0].starts_with('#') {
            continue;
        }

        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                // help and usage errors alike
                let _ = e.print();
                continue;
            }
        };

        match session.execute(command).await {
            Ok(Reply::Text(text)) => {
                stdout.write_all(text.as_bytes()).await?;
                stdout.flush().await?;
            }
            Ok(Reply::Quit) => break,
            Err(e) => eprintln!("Error: {}", e),
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "jot=debug,jotapp=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("JOT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}
