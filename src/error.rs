use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommitGenError {
   #[error(
      "No API key configured. Pass --api-key or set AIC_API_KEY (or OPENAI_API_KEY) in your \
       environment"
   )]
   MissingApiKey,

   #[error("Not a git repository (or any of the parent directories): {0}")]
   NotARepository(String),

   #[error("No staged changes found. Stage your changes with `git add` before running aic")]
   NoStagedChanges,

   #[error("Git command failed: {0}")]
   GitError(String),

   #[error("Completion service returned HTTP {status}: {body}")]
   ApiError { status: u16, body: String },

   #[error("Completion service returned no message content")]
   EmptyResponse,

   #[error("Request was rejected by the pre-flight filter")]
   FilterRejected,

   #[error("Commit cancelled")]
   Cancelled,

   #[error("Prompt error: {0}")]
   Prompt(#[from] dialoguer::Error),

   #[error("Failed to render prompt template: {0}")]
   TemplateError(#[from] tera::Error),

   #[error("IO error: {0}")]
   IoError(#[from] std::io::Error),

   #[error("HTTP error: {0}")]
   HttpError(#[from] reqwest::Error),

   #[error("{0}")]
   Other(String),
}

impl CommitGenError {
   /// Failures of the completion service (as opposed to local problems).
   pub const fn is_api_failure(&self) -> bool {
      matches!(self, Self::ApiError { .. } | Self::EmptyResponse | Self::HttpError(_))
   }

   /// Errors that end the run without printing anything further.
   pub const fn is_silent(&self) -> bool {
      matches!(self, Self::FilterRejected)
   }

   /// Process exit code for this error.
   pub const fn exit_code(&self) -> u8 {
      match self {
         Self::FilterRejected => 2,
         _ => 1,
      }
   }
}

pub type Result<T> = std::result::Result<T, CommitGenError>;

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_filter_rejection_is_silent_with_distinct_code() {
      let err = CommitGenError::FilterRejected;
      assert!(err.is_silent());
      assert_eq!(err.exit_code(), 2);
   }

   #[test]
   fn test_user_facing_errors_exit_with_one() {
      for err in [
         CommitGenError::MissingApiKey,
         CommitGenError::NoStagedChanges,
         CommitGenError::Cancelled,
         CommitGenError::NotARepository("/tmp".to_string()),
      ] {
         assert!(!err.is_silent());
         assert_eq!(err.exit_code(), 1);
      }
   }

   #[test]
   fn test_api_failures_are_distinguishable() {
      assert!(CommitGenError::EmptyResponse.is_api_failure());
      assert!(
         CommitGenError::ApiError { status: 401, body: "bad key".to_string() }.is_api_failure()
      );
      assert!(!CommitGenError::NoStagedChanges.is_api_failure());
   }

   #[test]
   fn test_no_staged_changes_mentions_git_add() {
      assert!(CommitGenError::NoStagedChanges.to_string().contains("git add"));
   }
}
