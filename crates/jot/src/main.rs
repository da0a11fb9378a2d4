//! # Jot CLI
//!
//! The binary is intentionally thin: the client lives in `src/cli/`, while this
//! file only starts the runtime, invokes `cli::run()` and handles process
//! termination.
//!
//! ## Workspace Structure
//!
//! - `crates/jotapp/`: the UI-agnostic note engine (library)
//! - `crates/jot/`: this terminal client, depends on `jotapp`
//!
//! ## Layering
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/jot/src/cli/)                         │
//! │  - clap parsing of arguments and shell lines (setup.rs)  │
//! │  - dispatch to the Notebook (handlers.rs)                │
//! │  - terminal formatting (render.rs)                       │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  API Layer (jotapp::api::Notebook)                       │
//! │  - resolves selectors, keeps side sets consistent        │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  Commands + Store (jotapp::commands, jotapp::store)      │
//! │  - pure logic, persistence, no terminal knowledge        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Testing Approach
//!
//! - **Library**: unit tests beside each module, plus filesystem tests in
//!   `crates/jotapp/tests/`.
//! - **CLI**: end-to-end tests in `tests/` run the real binary against a
//!   temporary data directory and feed shell lines on stdin.

mod cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
