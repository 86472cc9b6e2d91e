//! Shared fixtures: a mock completion server and throwaway repositories.
#![allow(dead_code, reason = "not every test binary uses every helper")]

use std::{
   cell::{Cell, RefCell},
   collections::VecDeque,
   fs,
   path::Path,
   process::Command,
};

use aic::{CommitConfig, Prompter, Result};
use serde_json::json;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "sk-test";

/// Mock server kept alive by its own runtime; the blocking client is called
/// from the test thread, outside that runtime.
pub struct MockApi {
   pub server: MockServer,
   rt:         Runtime,
}

impl MockApi {
   pub fn start() -> Self {
      let rt = Runtime::new().expect("tokio runtime");
      let server = rt.block_on(MockServer::start());
      Self { server, rt }
   }

   pub fn mount(&self, mock: Mock) {
      self.rt.block_on(mock.mount(&self.server));
   }

   pub fn received_prompts(&self) -> Vec<String> {
      self
         .rt
         .block_on(self.server.received_requests())
         .unwrap_or_default()
         .iter()
         .filter_map(|req| serde_json::from_slice::<serde_json::Value>(&req.body).ok())
         .filter_map(|body| body["messages"][0]["content"].as_str().map(str::to_string))
         .collect()
   }

   pub fn config(&self) -> CommitConfig {
      CommitConfig {
         api_base_url: self.server.uri(),
         api_key: Some(API_KEY.to_string()),
         model: "gpt-4o-mini".to_string(),
         request_timeout_secs: 10,
         connect_timeout_secs: 5,
         ..Default::default()
      }
   }
}

pub fn completion(content: &str) -> ResponseTemplate {
   ResponseTemplate::new(200).set_body_json(json!({
      "id": "chatcmpl-1",
      "object": "chat.completion",
      "choices": [{
         "index": 0,
         "message": { "role": "assistant", "content": content },
         "finish_reason": "stop"
      }]
   }))
}

pub fn git(dir: &Path, args: &[&str]) -> String {
   let output = Command::new("git")
      .args(args)
      .current_dir(dir)
      .output()
      .expect("git should be installed");
   assert!(
      output.status.success(),
      "git {args:?} failed: {}",
      String::from_utf8_lossy(&output.stderr)
   );
   String::from_utf8_lossy(&output.stdout).to_string()
}

/// Repository on branch `main` with one staged file.
pub fn repo_with_staged_change() -> TempDir {
   let dir = TempDir::new().unwrap();
   git(dir.path(), &["init", "-q"]);
   git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
   git(dir.path(), &["config", "user.name", "Test User"]);
   git(dir.path(), &["config", "user.email", "test@example.com"]);
   git(dir.path(), &["config", "commit.gpgsign", "false"]);
   fs::write(dir.path().join("parser.rs"), "pub fn parse_array() {}\n").unwrap();
   git(dir.path(), &["add", "parser.rs"]);
   dir
}

pub fn last_commit_message(dir: &Path) -> String {
   git(dir, &["log", "-1", "--format=%B"]).trim_end().to_string()
}

pub fn commit_count(dir: &Path) -> usize {
   Command::new("git")
      .args(["rev-list", "--count", "HEAD"])
      .current_dir(dir)
      .output()
      .ok()
      .filter(|o| o.status.success())
      .and_then(|o| String::from_utf8_lossy(&o.stdout).trim().parse().ok())
      .unwrap_or(0)
}

/// Prompter answering from a script.
#[derive(Default)]
pub struct ScriptedPrompter {
   pub confirm_answer: bool,
   pub confirms:       Cell<usize>,
   pub selections:     RefCell<VecDeque<usize>>,
   pub menus:          RefCell<Vec<Vec<String>>>,
}

impl ScriptedPrompter {
   pub fn confirming(answer: bool) -> Self {
      Self { confirm_answer: answer, ..Default::default() }
   }

   pub fn selecting(choices: &[usize]) -> Self {
      Self { selections: RefCell::new(choices.iter().copied().collect()), ..Default::default() }
   }
}

impl Prompter for ScriptedPrompter {
   fn confirm(&self, _question: &str, _default: bool) -> Result<bool> {
      self.confirms.set(self.confirms.get() + 1);
      Ok(self.confirm_answer)
   }

   fn select(&self, _question: &str, items: &[String]) -> Result<usize> {
      self.menus.borrow_mut().push(items.to_vec());
      Ok(self
         .selections
         .borrow_mut()
         .pop_front()
         .expect("unexpected menu"))
   }
}
