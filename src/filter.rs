//! Pre-flight check run on the finished prompt before it is sent.
//!
//! Rejects prompts that exceed the token limit and, with `--filter-fee`,
//! shows the estimated fee and lets the user back out.

use std::fmt;

use tiktoken_rs::{CoreBPE, get_bpe_from_model};

use crate::{config::CommitConfig, error::Result, interact::Prompter, style};

/// Decides whether a prompt may be sent to the completion service.
pub trait PreflightFilter {
   /// `completions` is the number of messages the prompt asks for.
   fn check(&self, prompt: &str, completions: usize, prompter: &dyn Prompter) -> Result<bool>;
}

/// Token counter: tiktoken for known models, 4 chars per token otherwise.
pub struct TokenCounter {
   model:    String,
   tiktoken: Option<CoreBPE>,
}

impl fmt::Debug for TokenCounter {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("TokenCounter")
         .field("model", &self.model)
         .field("has_tiktoken", &self.tiktoken.is_some())
         .finish_non_exhaustive()
   }
}

impl TokenCounter {
   pub fn new(model: &str) -> Self {
      Self { model: model.to_string(), tiktoken: get_bpe_from_model(model).ok() }
   }

   /// Character estimate only; never loads an encoder.
   pub fn estimate_only(model: &str) -> Self {
      Self { model: model.to_string(), tiktoken: None }
   }

   pub fn count(&self, text: &str) -> usize {
      if let Some(ref encoder) = self.tiktoken {
         encoder.encode_with_special_tokens(text).len()
      } else {
         text.len().div_ceil(4)
      }
   }
}

/// Token-limit and fee filter.
#[derive(Debug)]
pub struct CostFilter {
   counter:             TokenCounter,
   max_prompt_tokens:   usize,
   price_per_1k_tokens: f64,
   confirm_fee:         bool,
}

impl CostFilter {
   pub fn new(config: &CommitConfig) -> Self {
      Self::with_counter(TokenCounter::new(&config.model), config)
   }

   pub fn with_counter(counter: TokenCounter, config: &CommitConfig) -> Self {
      Self {
         counter,
         max_prompt_tokens: config.max_prompt_tokens,
         price_per_1k_tokens: config.price_per_1k_tokens,
         confirm_fee: config.filter_fee,
      }
   }

   /// Estimated USD cost of sending `tokens` for `completions` messages.
   pub fn estimate_fee(&self, tokens: usize, completions: usize) -> f64 {
      (tokens * completions.max(1)) as f64 / 1000.0 * self.price_per_1k_tokens
   }
}

impl PreflightFilter for CostFilter {
   fn check(&self, prompt: &str, completions: usize, prompter: &dyn Prompter) -> Result<bool> {
      let tokens = self.counter.count(prompt);
      tracing::debug!(tokens, completions, model = %self.counter.model, "pre-flight token count");

      if tokens > self.max_prompt_tokens {
         style::print_error(&format!(
            "The staged diff is too large to send: {tokens} tokens (limit {}). Commit in smaller \
             pieces or raise max_prompt_tokens.",
            self.max_prompt_tokens
         ));
         return Ok(false);
      }

      if !self.confirm_fee {
         return Ok(true);
      }

      let fee = self.estimate_fee(tokens, completions);
      style::print_info(&format!(
         "Estimated request: {tokens} tokens x {completions} message(s), about ${fee:.5}"
      ));
      prompter.confirm("Send the request?", true)
   }
}
