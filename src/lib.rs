//! Conventional commit message generation for staged changes.
//!
//! The staged diff is turned into a prompt, sent to an OpenAI-compatible
//! chat completion endpoint, and the reply is decorated (emoji, template)
//! before being committed with `git commit -F -`.
pub mod api;
pub mod config;
pub mod emoji;
pub mod error;
pub mod filter;
pub mod git;
pub mod interact;
pub mod postprocess;
pub mod prompt;
pub mod session;
pub mod style;
pub mod types;

// Re-export commonly used types
pub use api::{ChatCompletionClient, CompletionGateway};
pub use config::CommitConfig;
pub use error::{CommitGenError, Result};
pub use filter::{CostFilter, PreflightFilter};
pub use git::{GitCli, GitRepo};
pub use interact::{Prompter, TerminalPrompter};
pub use session::{CommitOutcome, Session};
pub use types::{Args, Mode};
