//! The commit pipeline: diff → prompt → filter → completion → candidates →
//! selection → commit.

use crate::{
   api::CompletionGateway,
   config::CommitConfig,
   error::{CommitGenError, Result},
   filter::PreflightFilter,
   git::GitRepo,
   interact::Prompter,
   postprocess::{COMMIT_MESSAGE_TOKEN, Candidates, process_response},
   prompt::build_prompt,
   style,
   types::Mode,
};

/// Menu entry that discards the candidates and asks the model again.
pub const REGENERATE_CHOICE: &str = "↻ Regenerate messages";

/// What was committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
   pub message:  String,
   /// Generation rounds used, 1 when no regeneration happened.
   pub attempts: usize,
}

/// Collaborators of one run.
pub struct Session<'a> {
   pub config:   &'a CommitConfig,
   pub repo:     &'a dyn GitRepo,
   pub gateway:  &'a dyn CompletionGateway,
   pub filter:   &'a dyn PreflightFilter,
   pub prompter: &'a dyn Prompter,
}

enum Decision {
   Commit(String),
   Regenerate,
}

impl Session<'_> {
   pub fn run(&self) -> Result<CommitOutcome> {
      let diff = self.repo.staged_diff()?;
      tracing::debug!(chars = diff.len(), "read staged diff");

      let mut attempt = 0;
      let mut template_warned = false;
      loop {
         attempt += 1;
         let Candidates { messages: candidates, template_ignored } = self.generate(&diff)?;
         if template_ignored && !template_warned {
            style::warn(&format!(
               "Commit template has no {COMMIT_MESSAGE_TOKEN} placeholder; ignoring the template"
            ));
            template_warned = true;
         }

         let decision = match self.config.mode {
            Mode::Single => self.confirm_single(candidates)?,
            Mode::List { .. } => self.choose_from_list(candidates, attempt)?,
         };

         match decision {
            Decision::Commit(message) => {
               self.repo.commit(&message)?;
               return Ok(CommitOutcome { message, attempts: attempt });
            },
            Decision::Regenerate => {
               style::print_info(&format!(
                  "Regenerating ({}/{})...",
                  attempt,
                  self.config.max_regenerations
               ));
            },
         }
      }
   }

   /// One round of prompt construction, pre-flight check, completion and
   /// post-processing.
   fn generate(&self, diff: &str) -> Result<Candidates> {
      let prompt = build_prompt(diff, self.config)?;

      if !self
         .filter
         .check(&prompt, self.config.mode.completions(), self.prompter)?
      {
         return Err(CommitGenError::FilterRejected);
      }

      let raw = style::with_spinner_result("Generating commit message...", || {
         self.gateway.complete(&prompt)
      })?;
      process_response(&raw, self.config, self.repo)
   }

   fn confirm_single(&self, candidates: Vec<String>) -> Result<Decision> {
      let message = candidates
         .into_iter()
         .next()
         .ok_or(CommitGenError::EmptyResponse)?;

      println!("{}", style::boxed_message("Commit message", &message, style::term_width()));

      if !self.config.force && !self.prompter.confirm("Continue with this message?", true)? {
         return Err(CommitGenError::Cancelled);
      }
      Ok(Decision::Commit(message))
   }

   fn choose_from_list(&self, candidates: Vec<String>, attempt: usize) -> Result<Decision> {
      let can_regenerate = attempt <= self.config.max_regenerations;
      if candidates.is_empty() && !can_regenerate {
         return Err(CommitGenError::EmptyResponse);
      }

      let mut items = candidates.clone();
      if can_regenerate {
         items.push(REGENERATE_CHOICE.to_string());
      }

      let choice = self.prompter.select("Select a commit message", &items)?;
      if choice >= candidates.len() {
         return if can_regenerate {
            Ok(Decision::Regenerate)
         } else {
            Err(CommitGenError::Other(format!("Invalid menu selection {choice}")))
         };
      }

      Ok(Decision::Commit(candidates.into_iter().nth(choice).unwrap_or_default()))
   }
}
