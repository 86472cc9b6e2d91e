use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
   config::CommitConfig,
   error::{CommitGenError, Result},
};

/// Something that turns a prompt into completion text.
pub trait CompletionGateway {
   fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct Message<'a> {
   role:    &'a str,
   content: &'a str,
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
   model:       &'a str,
   temperature: f32,
   messages:    Vec<Message<'a>>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
   #[serde(default)]
   content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
   message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
   #[serde(default)]
   choices: Vec<Choice>,
}

/// Blocking client for OpenAI-compatible `/chat/completions` endpoints.
///
/// One request per call; failures are returned, never retried.
#[derive(Debug)]
pub struct ChatCompletionClient {
   client:       reqwest::blocking::Client,
   api_base_url: String,
   api_key:      Option<String>,
   model:        String,
   temperature:  f32,
}

impl ChatCompletionClient {
   pub fn new(config: &CommitConfig) -> Result<Self> {
      let client = reqwest::blocking::Client::builder()
         .timeout(Duration::from_secs(config.request_timeout_secs))
         .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
         .build()?;

      Ok(Self {
         client,
         api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
         api_key: config.api_key.clone(),
         model: config.model.clone(),
         temperature: config.temperature,
      })
   }

   fn endpoint(&self) -> String {
      format!("{}/chat/completions", self.api_base_url)
   }
}

impl CompletionGateway for ChatCompletionClient {
   fn complete(&self, prompt: &str) -> Result<String> {
      let request = ApiRequest {
         model:       &self.model,
         temperature: self.temperature,
         messages:    vec![Message { role: "user", content: prompt }],
      };

      tracing::debug!(endpoint = %self.endpoint(), model = %self.model, "sending completion request");

      let mut request_builder = self
         .client
         .post(self.endpoint())
         .header("content-type", "application/json");

      if let Some(ref api_key) = self.api_key {
         request_builder = request_builder.header("Authorization", format!("Bearer {api_key}"));
      }

      let response = request_builder.json(&request).send()?;
      let status = response.status();

      if !status.is_success() {
         let body = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
         return Err(CommitGenError::ApiError { status: status.as_u16(), body });
      }

      let api_response: ApiResponse = response.json()?;
      let content = api_response
         .choices
         .into_iter()
         .next()
         .and_then(|choice| choice.message.content)
         .filter(|content| !content.trim().is_empty())
         .ok_or(CommitGenError::EmptyResponse)?;

      tracing::debug!(chars = content.len(), "received completion");
      Ok(content)
   }
}
