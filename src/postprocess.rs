//! Turning completion text into commit message candidates.
//!
//! Order per candidate: clean, split (list mode), emoji, template.

use crate::{
   config::CommitConfig, emoji::add_emoji, error::Result, git::GitRepo, types::Mode,
};

pub const COMMIT_MESSAGE_TOKEN: &str = "{COMMIT_MESSAGE}";
pub const GIT_BRANCH_TOKEN: &str = "{GIT_BRANCH}";

/// Strip a surrounding pair of quotes or backticks.
fn strip_quotes(text: &str) -> &str {
   for quote in ['"', '\'', '`'] {
      if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
         return text[1..text.len() - 1].trim();
      }
   }
   text
}

fn is_info_string(line: &str) -> bool {
   line
      .trim()
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}

/// Trim the response and remove a markdown code fence or quotes wrapped
/// around it.
pub fn clean_response(raw: &str) -> String {
   let mut text = raw.trim();

   if let Some(rest) = text.strip_prefix("```") {
      // A first line that is a bare word ("```text") is an info string.
      let body = match rest.split_once('\n') {
         Some((info, body)) if is_info_string(info) => body,
         _ => rest,
      };
      let body = body.trim();
      text = body.strip_suffix("```").unwrap_or(body).trim();
   }

   strip_quotes(text).to_string()
}

/// Split a list-mode response on `;` into trimmed, non-empty candidates.
///
/// A response without any `;` but with several lines is split per line.
pub fn split_candidates(raw: &str) -> Vec<String> {
   let cleaned = clean_response(raw);
   let pieces: Vec<&str> = if cleaned.contains(';') {
      cleaned.split(';').collect()
   } else {
      cleaned.lines().collect()
   };

   pieces
      .into_iter()
      .map(|piece| strip_quotes(piece.trim()).to_string())
      .filter(|piece| !piece.is_empty())
      .collect()
}

/// Substitute `message` into `template`.
///
/// Returns `None` when the template has no `{COMMIT_MESSAGE}` placeholder.
/// `branch` is only called when the substituted text contains
/// `{GIT_BRANCH}`.
pub fn render_template(
   template: &str,
   message: &str,
   branch: impl FnOnce() -> Result<String>,
) -> Result<Option<String>> {
   if !template.contains(COMMIT_MESSAGE_TOKEN) {
      return Ok(None);
   }

   let rendered = template.replace(COMMIT_MESSAGE_TOKEN, message);
   if !rendered.contains(GIT_BRANCH_TOKEN) {
      return Ok(Some(rendered));
   }

   let branch = branch()?;
   Ok(Some(rendered.replace(GIT_BRANCH_TOKEN, &branch)))
}

/// Decorated candidates of one completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
   pub messages:         Vec<String>,
   /// A template was configured but has no `{COMMIT_MESSAGE}` placeholder,
   /// so it was not applied.
   pub template_ignored: bool,
}

/// Apply emoji and template decoration to each candidate.
pub fn decorate_candidates(
   candidates: Vec<String>,
   config: &CommitConfig,
   repo: &dyn GitRepo,
) -> Result<Candidates> {
   let template = config.template.as_deref().filter(|t| !t.is_empty());
   let template_ignored = template.is_some_and(|t| !t.contains(COMMIT_MESSAGE_TOKEN));

   let mut branch: Option<String> = None;
   let mut messages = Vec::with_capacity(candidates.len());

   for candidate in candidates {
      let message =
         if config.emoji { add_emoji(&candidate, &config.emoji_map) } else { candidate };

      let message = match template {
         Some(template) if !template_ignored => {
            let rendered = render_template(template, &message, || {
               if let Some(ref name) = branch {
                  return Ok(name.clone());
               }
               let name = repo.current_branch()?;
               branch = Some(name.clone());
               Ok(name)
            })?;
            rendered.unwrap_or(message)
         },
         _ => message,
      };
      messages.push(message);
   }

   Ok(Candidates { messages, template_ignored })
}

/// Full post-processing of a raw completion for the configured mode.
pub fn process_response(raw: &str, config: &CommitConfig, repo: &dyn GitRepo) -> Result<Candidates> {
   let candidates = match config.mode {
      Mode::Single => {
         let message = clean_response(raw);
         if message.is_empty() { Vec::new() } else { vec![message] }
      },
      Mode::List { count } => {
         let candidates = split_candidates(raw);
         if candidates.len() != count {
            tracing::debug!(expected = count, got = candidates.len(), "candidate count mismatch");
         }
         candidates
      },
   };

   decorate_candidates(candidates, config, repo)
}
