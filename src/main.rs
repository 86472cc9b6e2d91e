use std::process::ExitCode;

use aic::{
   ChatCompletionClient, CommitConfig, CommitGenError, CommitOutcome, CostFilter, GitCli, Result,
   Session, TerminalPrompter, style, types::Args,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; `--verbose` wins over `AIC_LOG`.
fn init_tracing(verbose: bool) {
   let filter = if verbose {
      EnvFilter::new("aic=debug")
   } else {
      EnvFilter::try_from_env("AIC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
   };

   tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_writer(std::io::stderr)
      .with_target(false)
      .init();
}

fn run(args: &Args) -> Result<CommitOutcome> {
   let config = CommitConfig::resolve(args)?;

   let repo = GitCli::new(config.dir.clone(), config.excluded_files.clone());
   let gateway = ChatCompletionClient::new(&config)?;
   let filter = CostFilter::new(&config);
   let prompter = TerminalPrompter::default();

   Session { config: &config, repo: &repo, gateway: &gateway, filter: &filter, prompter: &prompter }
      .run()
}

fn report(err: &CommitGenError) {
   if err.is_silent() {
      return;
   }

   match err {
      CommitGenError::Cancelled => style::warn("Commit cancelled"),
      err if err.is_api_failure() => {
         style::print_error(&format!("Completion service error: {err}"));
         style::print_info("Check your API key, AIC_API_URL and network connection");
      },
      err => style::print_error(&err.to_string()),
   }
}

fn main() -> ExitCode {
   dotenvy::dotenv().ok();
   let args = Args::parse();
   init_tracing(args.verbose);

   match run(&args) {
      Ok(outcome) => {
         tracing::debug!(attempts = outcome.attempts, "commit created");
         ExitCode::SUCCESS
      },
      Err(err) => {
         report(&err);
         ExitCode::from(err.exit_code())
      },
   }
}
