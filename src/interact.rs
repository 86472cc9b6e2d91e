use std::io;

use dialoguer::{Confirm, Select, theme::ColorfulTheme};

use crate::error::{CommitGenError, Result};

/// Questions the pipeline asks the user.
pub trait Prompter {
   /// Yes/no question.
   fn confirm(&self, question: &str, default: bool) -> Result<bool>;

   /// Pick one of `items`; returns its index.
   fn select(&self, question: &str, items: &[String]) -> Result<usize>;
}

/// [`Prompter`] on the controlling terminal.
#[derive(Default)]
pub struct TerminalPrompter {
   theme: ColorfulTheme,
}

fn map_prompt_error(err: dialoguer::Error) -> CommitGenError {
   let interrupted =
      matches!(&err, dialoguer::Error::IO(io_err) if io_err.kind() == io::ErrorKind::Interrupted);
   if interrupted { CommitGenError::Cancelled } else { CommitGenError::Prompt(err) }
}

impl Prompter for TerminalPrompter {
   fn confirm(&self, question: &str, default: bool) -> Result<bool> {
      Confirm::with_theme(&self.theme)
         .with_prompt(question)
         .default(default)
         .interact()
         .map_err(map_prompt_error)
   }

   fn select(&self, question: &str, items: &[String]) -> Result<usize> {
      Select::with_theme(&self.theme)
         .with_prompt(question)
         .items(items)
         .default(0)
         .interact()
         .map_err(map_prompt_error)
   }
}
