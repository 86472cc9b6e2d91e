//! Prompt construction for single and list generation.
//!
//! Prompts are Tera templates embedded from `prompts/`. A file with the same
//! name under `~/.aic/prompts/` takes precedence over the embedded one.

use std::{
   path::{Path, PathBuf},
   sync::LazyLock,
};

use parking_lot::Mutex;
use rust_embed::RustEmbed;
use serde::Serialize;
use tera::{Context, Tera};

use crate::{
   config::CommitConfig,
   error::{CommitGenError, Result},
   types::Mode,
};

const SINGLE_TEMPLATE: &str = "single.md";
const LIST_TEMPLATE: &str = "list.md";

/// Embedded prompts folder (compiled into binary)
#[derive(RustEmbed)]
#[folder = "prompts/"]
struct Prompts;

/// A commit type the model may choose from.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CommitTypeRule {
   pub name:        &'static str,
   pub description: &'static str,
}

/// Type vocabulary offered to the model.
pub const COMMIT_TYPES: &[CommitTypeRule] = &[
   CommitTypeRule { name: "feat", description: "a new feature" },
   CommitTypeRule { name: "fix", description: "a bug fix" },
   CommitTypeRule { name: "docs", description: "documentation only changes" },
   CommitTypeRule { name: "test", description: "adding or correcting tests" },
   CommitTypeRule {
      name:        "refactor",
      description: "code change that neither fixes a bug nor adds a feature",
   },
   CommitTypeRule { name: "ci", description: "CI configuration files and scripts" },
   CommitTypeRule { name: "style", description: "formatting, white-space, no code change" },
   CommitTypeRule { name: "chore", description: "tooling, dependencies and other maintenance" },
];

/// Style guide for single-mode messages. The model is asked to follow these;
/// nothing checks the result.
pub const STYLE_RULES: &[&str] = &[
   "Write the subject in the imperative mood (\"add\", not \"added\" or \"adds\").",
   "Keep the subject line at most 72 characters long.",
   "Start the subject with one of the allowed types, e.g. `fix: handle empty input`.",
   "A scope may follow the type in parentheses, e.g. `feat(parser): add arrays`.",
   "Separate the subject from the body with one blank line.",
   "Keep the body at most 256 characters long.",
   "Write each body line as a bullet starting with a hyphen (`- `).",
];

/// Global Tera instance with user overrides registered before embedded
/// defaults.
static TERA: LazyLock<Mutex<Tera>> = LazyLock::new(|| {
   let mut tera = Tera::default();

   if let Some(prompts_dir) = get_user_prompts_dir()
      && let Err(e) = register_directory_templates(&mut tera, &prompts_dir)
   {
      crate::style::warn(&e.to_string());
   }

   for file in Prompts::iter() {
      if tera.get_template_names().any(|name| name == file.as_ref()) {
         continue;
      }

      if let Some(embedded_file) = Prompts::get(file.as_ref()) {
         match std::str::from_utf8(embedded_file.data.as_ref()) {
            Ok(content) => {
               if let Err(e) = tera.add_raw_template(file.as_ref(), content) {
                  crate::style::warn(&format!(
                     "Failed to register embedded template {}: {e}",
                     file.as_ref()
                  ));
               }
            },
            Err(e) => {
               crate::style::warn(&format!(
                  "Embedded template {} is not valid UTF-8: {e}",
                  file.as_ref()
               ));
            },
         }
      }
   }

   tera.autoescape_on(vec![]);

   Mutex::new(tera)
});

/// Determine user prompts directory (~/.aic/prompts/) if a home dir exists.
fn get_user_prompts_dir() -> Option<PathBuf> {
   std::env::var("HOME")
      .or_else(|_| std::env::var("USERPROFILE"))
      .ok()
      .map(|home| PathBuf::from(home).join(".aic").join("prompts"))
}

fn register_directory_templates(tera: &mut Tera, directory: &Path) -> Result<()> {
   if !directory.is_dir() {
      return Ok(());
   }

   for entry in std::fs::read_dir(directory).map_err(|e| {
      CommitGenError::Other(format!(
         "Failed to read prompts directory {}: {e}",
         directory.display()
      ))
   })? {
      let Ok(entry) = entry else { continue };
      let path = entry.path();
      if path.extension().and_then(|s| s.to_str()) != Some("md") {
         continue;
      }

      let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
         continue;
      };
      if let Err(e) = tera.add_template_file(&path, Some(name)) {
         crate::style::warn(&format!("Failed to load prompt file {}: {e}", path.display()));
      } else {
         tracing::debug!(path = %path.display(), "using user prompt override");
      }
   }

   Ok(())
}

fn base_context(diff: &str, hint: Option<&str>, language: &str) -> Context {
   let mut context = Context::new();
   context.insert("diff", diff);
   context.insert("hint", &hint);
   context.insert("language", language);
   context.insert("types", COMMIT_TYPES);
   context
}

/// Prompt asking for exactly one commit message that follows [`STYLE_RULES`].
/// The hint, if any, follows the diff verbatim.
pub fn build_single_prompt(diff: &str, hint: Option<&str>, language: &str) -> Result<String> {
   let mut context = base_context(diff, hint, language);
   context.insert("rules", STYLE_RULES);
   Ok(TERA.lock().render(SINGLE_TEMPLATE, &context)?)
}

/// Prompt asking for `count` `type: subject` candidates separated by `;`.
pub fn build_list_prompt(
   diff: &str,
   hint: Option<&str>,
   language: &str,
   count: usize,
) -> Result<String> {
   let mut context = base_context(diff, hint, language);
   context.insert("count", &count);
   Ok(TERA.lock().render(LIST_TEMPLATE, &context)?)
}

/// Build the prompt for the configured mode.
pub fn build_prompt(diff: &str, config: &CommitConfig) -> Result<String> {
   let hint = config.hint.as_deref();
   let prompt = match config.mode {
      Mode::Single => build_single_prompt(diff, hint, &config.language)?,
      Mode::List { count } => build_list_prompt(diff, hint, &config.language, count)?,
   };
   tracing::debug!(chars = prompt.len(), mode = ?config.mode, "built prompt");
   Ok(prompt)
}

#[cfg(test)]
mod tests {
   use super::*;

   const DIFF: &str = "diff --git a/src/lib.rs b/src/lib.rs\n+pub fn parse() {}\n";

   #[test]
   fn test_single_prompt_contains_diff_verbatim() {
      let prompt = build_single_prompt(DIFF, None, "English").unwrap();
      assert!(prompt.contains(DIFF));
      assert!(!prompt.contains("ADDITIONAL CONTEXT"));
   }

   #[test]
   fn test_single_prompt_hint_follows_diff() {
      let hint = "this is part of the {{ parser }} rewrite";
      let prompt = build_single_prompt(DIFF, Some(hint), "English").unwrap();
      let diff_at = prompt.find(DIFF).expect("diff missing");
      let hint_at = prompt.find(hint).expect("hint missing");
      assert!(hint_at > diff_at);
   }

   #[test]
   fn test_diff_with_template_syntax_is_not_interpreted() {
      let diff = "+let s = \"{{ not a var }} {% if x %}\";\n";
      let prompt = build_single_prompt(diff, None, "English").unwrap();
      assert!(prompt.contains(diff));
   }

   #[test]
   fn test_single_prompt_lists_style_rules_and_types() {
      let prompt = build_single_prompt(DIFF, None, "English").unwrap();
      for rule in STYLE_RULES {
         assert!(prompt.contains(rule), "missing rule: {rule}");
      }
      for ty in COMMIT_TYPES {
         assert!(prompt.contains(&format!("- {}: {}", ty.name, ty.description)));
      }
   }

   #[test]
   fn test_list_prompt_requests_count_and_delimiter() {
      let prompt = build_list_prompt(DIFF, Some("hint text"), "English", 3).unwrap();
      assert!(prompt.contains("exactly 3 different"));
      assert!(prompt.contains("semicolon (;)"));
      assert!(prompt.contains("feat, fix, docs, test, refactor, ci, style, chore."));
      assert!(prompt.find("hint text").unwrap() > prompt.find(DIFF).unwrap());
   }

   #[test]
   fn test_build_prompt_follows_mode() {
      let mut config = CommitConfig::default();
      let single = build_prompt(DIFF, &config).unwrap();
      assert!(single.contains("Write one git commit message"));

      config.mode = Mode::List { count: 2 };
      let list = build_prompt(DIFF, &config).unwrap();
      assert!(list.contains("exactly 2 different"));
   }

   #[test]
   fn test_language_is_requested() {
      let prompt = build_single_prompt(DIFF, None, "German").unwrap();
      assert!(prompt.contains("in German"));
   }
}
