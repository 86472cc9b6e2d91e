use std::path::PathBuf;

use clap::Parser;

/// Resolve model shorthand names to full model names
pub fn resolve_model_name(name: &str) -> String {
   match name {
      "4o" | "gpt4o" => "gpt-4o",
      "mini" | "4o-mini" => "gpt-4o-mini",
      "g5" | "gpt5" => "gpt-5",
      "sonnet" | "s" => "claude-sonnet-4.5",
      "haiku" | "h" => "claude-haiku-4-5",
      _ => name,
   }
   .to_string()
}

/// Generation mode, decided by `--list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
   /// One message, confirmed with a yes/no question.
   #[default]
   Single,
   /// N candidates picked from a menu.
   List { count: usize },
}

impl Mode {
   /// Number of completions the mode asks the model for.
   pub const fn completions(self) -> usize {
      match self {
         Self::Single => 1,
         Self::List { count } => count,
      }
   }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "aic")]
#[command(about = "Generate a conventional commit message for staged changes and commit it")]
#[command(version)]
pub struct Args {
   /// API key (overrides AIC_API_KEY / OPENAI_API_KEY)
   #[arg(long)]
   pub api_key: Option<String>,

   /// Commit template; `{COMMIT_MESSAGE}` and `{GIT_BRANCH}` are substituted
   #[arg(long)]
   pub template: Option<String>,

   /// Prefix the message with an emoji matching its commit type
   #[arg(long)]
   pub emoji: bool,

   /// Extra context appended to the prompt
   #[arg(long)]
   pub hint: Option<String>,

   /// Commit without asking for confirmation
   #[arg(long, short = 'f')]
   pub force: bool,

   /// Show the estimated request fee and ask before calling the API
   #[arg(long)]
   pub filter_fee: bool,

   /// Generate several candidates and pick one from a menu
   #[arg(long, short = 'l')]
   pub list: bool,

   /// Number of candidates in list mode
   #[arg(long, requires = "list")]
   pub count: Option<usize>,

   /// Model for generation. Short names (4o, mini, sonnet) or full model names.
   #[arg(long, short = 'm')]
   pub model: Option<String>,

   /// Language the commit message is written in
   #[arg(long)]
   pub language: Option<String>,

   /// Path to config file (default: ~/.config/aic/config.toml)
   #[arg(long)]
   pub config: Option<PathBuf>,

   /// Directory to run git commands in
   #[arg(long, default_value = ".")]
   pub dir: String,

   /// Enable debug logging on stderr
   #[arg(long, short = 'v')]
   pub verbose: bool,
}

impl Default for Args {
   fn default() -> Self {
      Self {
         api_key:    None,
         template:   None,
         emoji:      false,
         hint:       None,
         force:      false,
         filter_fee: false,
         list:       false,
         count:      None,
         model:      None,
         language:   None,
         config:     None,
         dir:        ".".to_string(),
         verbose:    false,
      }
   }
}
