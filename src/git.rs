use std::{
   io::Write,
   process::{Command, Stdio},
};

use crate::{
   error::{CommitGenError, Result},
   style,
};

/// The repository operations the commit pipeline needs.
pub trait GitRepo {
   /// Staged diff text. Fails with `NotARepository` outside a work tree and
   /// with `NoStagedChanges` when nothing is staged.
   fn staged_diff(&self) -> Result<String>;

   /// Name of the checked-out branch.
   fn current_branch(&self) -> Result<String>;

   /// Commit the index with `message` as the complete commit message.
   fn commit(&self, message: &str) -> Result<()>;
}

/// [`GitRepo`] backed by the `git` executable on `PATH`.
#[derive(Debug, Clone)]
pub struct GitCli {
   dir:            String,
   excluded_files: Vec<String>,
}

impl GitCli {
   pub fn new(dir: impl Into<String>, excluded_files: Vec<String>) -> Self {
      Self { dir: dir.into(), excluded_files }
   }

   fn git(&self) -> Command {
      let mut cmd = Command::new("git");
      cmd.current_dir(&self.dir);
      cmd
   }

   fn ensure_work_tree(&self) -> Result<()> {
      let output = self
         .git()
         .args(["rev-parse", "--is-inside-work-tree"])
         .output()
         .map_err(|e| CommitGenError::GitError(format!("Failed to run git rev-parse: {e}")))?;

      if !output.status.success() || String::from_utf8_lossy(&output.stdout).trim() != "true" {
         return Err(CommitGenError::NotARepository(self.dir.clone()));
      }
      Ok(())
   }

   fn diff_staged(&self, pathspecs: &[String]) -> Result<String> {
      let output = self
         .git()
         .args(["diff", "--staged"])
         .args(pathspecs)
         .output()
         .map_err(|e| CommitGenError::GitError(format!("Failed to run git diff --staged: {e}")))?;

      if !output.status.success() {
         let stderr = String::from_utf8_lossy(&output.stderr);
         return Err(CommitGenError::GitError(format!("git diff --staged failed: {stderr}")));
      }

      Ok(String::from_utf8_lossy(&output.stdout).to_string())
   }

   /// `:(exclude)` pathspecs for the configured noise files, anchored at the
   /// repository root.
   fn exclude_pathspecs(&self) -> Vec<String> {
      if self.excluded_files.is_empty() {
         return Vec::new();
      }

      let mut specs = vec!["--".to_string(), ":/".to_string()];
      specs.extend(
         self
            .excluded_files
            .iter()
            .map(|file| format!(":(top,exclude,glob)**/{file}")),
      );
      specs
   }
}

impl GitRepo for GitCli {
   fn staged_diff(&self) -> Result<String> {
      self.ensure_work_tree()?;

      let diff = self.diff_staged(&self.exclude_pathspecs())?;
      if !diff.trim().is_empty() {
         return Ok(diff);
      }

      // Only excluded files staged: send them rather than nothing.
      let diff = if self.excluded_files.is_empty() {
         diff
      } else {
         self.diff_staged(&[])?
      };

      if diff.trim().is_empty() {
         return Err(CommitGenError::NoStagedChanges);
      }
      Ok(diff)
   }

   fn current_branch(&self) -> Result<String> {
      let output = self
         .git()
         .args(["branch", "--show-current"])
         .output()
         .map_err(|e| CommitGenError::GitError(format!("Failed to get current branch: {e}")))?;

      if !output.status.success() {
         let stderr = String::from_utf8_lossy(&output.stderr);
         return Err(CommitGenError::GitError(format!("git branch --show-current failed: {stderr}")));
      }

      let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
      if branch.is_empty() {
         tracing::debug!("detached HEAD, using literal HEAD as branch name");
         return Ok("HEAD".to_string());
      }
      Ok(branch)
   }

   fn commit(&self, message: &str) -> Result<()> {
      let mut child = self
         .git()
         .args(["commit", "-F", "-"])
         .stdin(Stdio::piped())
         .stdout(Stdio::piped())
         .stderr(Stdio::piped())
         .spawn()
         .map_err(|e| CommitGenError::GitError(format!("Failed to run git commit: {e}")))?;

      {
         let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CommitGenError::GitError("git commit stdin unavailable".to_string()))?;
         stdin.write_all(message.as_bytes())?;
      }

      let output = child.wait_with_output()?;
      if !output.status.success() {
         let stderr = String::from_utf8_lossy(&output.stderr);
         let stdout = String::from_utf8_lossy(&output.stdout);
         return Err(CommitGenError::GitError(format!(
            "Git commit failed:\nstderr: {stderr}\nstdout: {stdout}"
         )));
      }

      let stdout = String::from_utf8_lossy(&output.stdout);
      println!("\n{}", stdout.trim_end());
      println!("{} {}", style::success(style::icons::SUCCESS), style::success("Successfully committed!"));

      Ok(())
   }
}
