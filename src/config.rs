use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::{
   emoji::default_emoji_map,
   error::{CommitGenError, Result},
   types::{Args, Mode, resolve_model_name},
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommitConfig {
   pub api_base_url: String,

   /// API key (overridden by `AIC_API_KEY` / `OPENAI_API_KEY`, then
   /// `--api-key`)
   pub api_key: Option<String>,

   pub model:       String,
   pub temperature: f32,

   /// HTTP request timeout in seconds
   pub request_timeout_secs: u64,

   /// HTTP connection timeout in seconds
   pub connect_timeout_secs: u64,

   /// Commit template with `{COMMIT_MESSAGE}` / `{GIT_BRANCH}` placeholders
   pub template: Option<String>,

   /// Prefix messages with the emoji of their commit type
   pub emoji: bool,

   /// Language requested for the generated message
   pub language: String,

   /// Candidates requested in list mode
   pub list_count: usize,

   /// Regenerate rounds offered in list mode before the option is withdrawn
   pub max_regenerations: usize,

   /// Prompts above this token count are rejected before the API call
   pub max_prompt_tokens: usize,

   /// Input price in USD per 1000 tokens, used for the fee estimate
   pub price_per_1k_tokens: f64,

   /// Files left out of the staged diff sent to the model
   pub excluded_files: Vec<String>,

   /// Commit type → emoji; file entries are merged over the defaults
   #[serde(deserialize_with = "merge_emoji_map")]
   pub emoji_map: IndexMap<String, String>,

   /// Extra prompt context from `--hint` (not in config file)
   #[serde(skip)]
   pub hint: Option<String>,

   /// Skip single-mode confirmation (not in config file)
   #[serde(skip)]
   pub force: bool,

   /// Ask before spending money on the request (not in config file)
   #[serde(skip)]
   pub filter_fee: bool,

   /// Single or list generation (not in config file)
   #[serde(skip)]
   pub mode: Mode,

   /// Repository directory (not in config file)
   #[serde(skip)]
   pub dir: String,
}

impl Default for CommitConfig {
   fn default() -> Self {
      Self {
         api_base_url:         "https://api.openai.com/v1".to_string(),
         api_key:              None,
         model:                "gpt-4o-mini".to_string(),
         temperature:          0.7,
         request_timeout_secs: 120,
         connect_timeout_secs: 30,
         template:             None,
         emoji:                false,
         language:             "English".to_string(),
         list_count:           5,
         max_regenerations:    10,
         max_prompt_tokens:    32_000,
         price_per_1k_tokens:  0.00015,
         excluded_files:       vec![
            "Cargo.lock".to_string(),
            "package-lock.json".to_string(),
            "yarn.lock".to_string(),
            "pnpm-lock.yaml".to_string(),
            "composer.lock".to_string(),
            "Gemfile.lock".to_string(),
            "poetry.lock".to_string(),
            "flake.lock".to_string(),
         ],
         emoji_map:            default_emoji_map(),
         hint:                 None,
         force:                false,
         filter_fee:           false,
         mode:                 Mode::Single,
         dir:                  ".".to_string(),
      }
   }
}

fn merge_emoji_map<'de, D>(deserializer: D) -> std::result::Result<IndexMap<String, String>, D::Error>
where
   D: Deserializer<'de>,
{
   let overrides = IndexMap::<String, String>::deserialize(deserializer)?;
   let mut map = default_emoji_map();
   map.extend(overrides);
   Ok(map)
}

/// Non-empty value of an environment variable. An exported but empty
/// variable counts as unset.
fn env_var(name: &str) -> Option<String> {
   std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse the boolean spellings accepted in environment variables.
fn parse_env_bool(value: &str) -> Option<bool> {
   match value.trim().to_ascii_lowercase().as_str() {
      "1" | "true" | "yes" | "on" => Some(true),
      "0" | "false" | "no" | "off" | "" => Some(false),
      _ => None,
   }
}

impl CommitConfig {
   /// Resolve the run configuration once at startup.
   ///
   /// Precedence: CLI argument > environment variable > config file > default.
   /// Fails with [`CommitGenError::MissingApiKey`] when no key is found at any
   /// level.
   pub fn resolve(args: &Args) -> Result<Self> {
      let mut config = if let Some(ref config_path) = args.config {
         Self::from_file(config_path)?
      } else {
         Self::load()?
      };
      config.apply_cli_overrides(args);

      if config.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
         return Err(CommitGenError::MissingApiKey);
      }

      tracing::debug!(
         model = %config.model,
         api = %config.api_base_url,
         mode = ?config.mode,
         "resolved configuration"
      );
      Ok(config)
   }

   /// Load config from default location (~/.config/aic/config.toml).
   /// Falls back to Default if the file doesn't exist. Environment variables
   /// override file values.
   pub fn load() -> Result<Self> {
      let config_path = if let Some(custom_path) = env_var("AIC_CONFIG") {
         PathBuf::from(custom_path)
      } else {
         Self::default_config_path().unwrap_or_else(|_| PathBuf::new())
      };

      let mut config = if config_path.is_file() {
         Self::from_file(&config_path)?
      } else {
         let mut config = Self::default();
         config.apply_env_overrides();
         config
      };
      config.model = resolve_model_name(&config.model);
      Ok(config)
   }

   /// Load config from specific file
   pub fn from_file(path: &Path) -> Result<Self> {
      let contents = std::fs::read_to_string(path)
         .map_err(|e| CommitGenError::Other(format!("Failed to read config: {e}")))?;
      let mut config: Self = toml::from_str(&contents)
         .map_err(|e| CommitGenError::Other(format!("Failed to parse config: {e}")))?;

      config.apply_env_overrides();
      config.model = resolve_model_name(&config.model);
      tracing::debug!(path = %path.display(), "loaded config file");
      Ok(config)
   }

   /// Apply environment variable overrides to config
   fn apply_env_overrides(&mut self) {
      if let Some(api_url) = env_var("AIC_API_URL") {
         self.api_base_url = api_url;
      }

      if let Some(api_key) = env_var("AIC_API_KEY").or_else(|| env_var("OPENAI_API_KEY")) {
         self.api_key = Some(api_key);
      }

      if let Some(model) = env_var("AIC_MODEL") {
         self.model = model;
      }

      if let Some(template) = env_var("AIC_COMMIT_TEMPLATE") {
         self.template = Some(template);
      }

      if let Some(emoji) = env_var("AIC_ADD_EMOJI") {
         match parse_env_bool(&emoji) {
            Some(enabled) => self.emoji = enabled,
            None => crate::style::warn(&format!("Ignoring AIC_ADD_EMOJI={emoji}: not a boolean")),
         }
      }
   }

   /// Apply CLI overrides to config
   pub fn apply_cli_overrides(&mut self, args: &Args) {
      if let Some(ref key) = args.api_key {
         self.api_key = Some(key.clone());
      }
      if let Some(ref template) = args.template {
         self.template = Some(template.clone());
      }
      if args.emoji {
         self.emoji = true;
      }
      if let Some(ref model) = args.model {
         self.model = resolve_model_name(model);
      }
      if let Some(ref language) = args.language {
         self.language.clone_from(language);
      }

      self.hint = args.hint.clone().filter(|h| !h.trim().is_empty());
      self.force = args.force;
      self.filter_fee = args.filter_fee;
      self.dir.clone_from(&args.dir);
      self.mode = if args.list {
         let count = args.count.unwrap_or(self.list_count).max(1);
         Mode::List { count }
      } else {
         Mode::Single
      };
   }

   /// Get default config path (platform-safe)
   /// Tries HOME (Unix/Linux/macOS) then USERPROFILE (Windows)
   pub fn default_config_path() -> Result<PathBuf> {
      if let Ok(home) = std::env::var("HOME") {
         return Ok(PathBuf::from(home).join(".config/aic/config.toml"));
      }

      if let Ok(home) = std::env::var("USERPROFILE") {
         return Ok(PathBuf::from(home).join(".config/aic/config.toml"));
      }

      Err(CommitGenError::Other("No home directory found (tried HOME and USERPROFILE)".to_string()))
   }
}

#[cfg(test)]
mod tests {
   use std::io::Write;

   use super::*;

   const CLEAR_ENV: [(&str, Option<&str>); 7] = [
      ("AIC_CONFIG", None),
      ("AIC_API_URL", None),
      ("AIC_API_KEY", None),
      ("OPENAI_API_KEY", None),
      ("AIC_MODEL", None),
      ("AIC_COMMIT_TEMPLATE", None),
      ("AIC_ADD_EMOJI", None),
   ];

   fn write_config(contents: &str) -> tempfile::NamedTempFile {
      let mut file = tempfile::NamedTempFile::new().unwrap();
      file.write_all(contents.as_bytes()).unwrap();
      file
   }

   fn with_env<R>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
      let mut all: Vec<(&str, Option<&str>)> = CLEAR_ENV.to_vec();
      for (key, value) in vars {
         all.retain(|(k, _)| k != key);
         all.push((*key, *value));
      }
      temp_env::with_vars(all, f)
   }

   #[test]
   fn test_parse_env_bool() {
      assert_eq!(parse_env_bool("true"), Some(true));
      assert_eq!(parse_env_bool("1"), Some(true));
      assert_eq!(parse_env_bool("YES"), Some(true));
      assert_eq!(parse_env_bool("false"), Some(false));
      assert_eq!(parse_env_bool("0"), Some(false));
      assert_eq!(parse_env_bool("maybe"), None);
   }

   #[test]
   fn test_missing_api_key_is_fatal() {
      let file = write_config("model = \"gpt-4o\"\n");
      let args = Args { config: Some(file.path().to_path_buf()), ..Default::default() };
      let result = with_env(&[], || CommitConfig::resolve(&args));
      assert!(matches!(result, Err(CommitGenError::MissingApiKey)));
   }

   #[test]
   fn test_argument_overrides_environment() {
      let file = write_config("api_key = \"from-file\"\n");
      let args = Args {
         config: Some(file.path().to_path_buf()),
         api_key: Some("from-arg".to_string()),
         template: Some("arg {COMMIT_MESSAGE}".to_string()),
         ..Default::default()
      };
      let config = with_env(
         &[("AIC_API_KEY", Some("from-env")), ("AIC_COMMIT_TEMPLATE", Some("env {COMMIT_MESSAGE}"))],
         || CommitConfig::resolve(&args),
      )
      .unwrap();
      assert_eq!(config.api_key.as_deref(), Some("from-arg"));
      assert_eq!(config.template.as_deref(), Some("arg {COMMIT_MESSAGE}"));
   }

   #[test]
   fn test_environment_overrides_file() {
      let file = write_config("api_key = \"from-file\"\nemoji = false\nmodel = \"mini\"\n");
      let args = Args { config: Some(file.path().to_path_buf()), ..Default::default() };
      let config = with_env(
         &[("AIC_API_KEY", Some("from-env")), ("AIC_ADD_EMOJI", Some("true"))],
         || CommitConfig::resolve(&args),
      )
      .unwrap();
      assert_eq!(config.api_key.as_deref(), Some("from-env"));
      assert!(config.emoji);
      assert_eq!(config.model, "gpt-4o-mini");
   }

   #[test]
   fn test_openai_key_fallback() {
      let file = write_config("");
      let args = Args { config: Some(file.path().to_path_buf()), ..Default::default() };
      let config =
         with_env(&[("OPENAI_API_KEY", Some("sk-openai"))], || CommitConfig::resolve(&args))
            .unwrap();
      assert_eq!(config.api_key.as_deref(), Some("sk-openai"));
   }

   #[test]
   fn test_list_mode_uses_configured_count() {
      let file = write_config("api_key = \"k\"\nlist_count = 4\n");
      let args =
         Args { config: Some(file.path().to_path_buf()), list: true, ..Default::default() };
      let config = with_env(&[], || CommitConfig::resolve(&args)).unwrap();
      assert_eq!(config.mode, Mode::List { count: 4 });

      let args = Args {
         config: Some(file.path().to_path_buf()),
         list: true,
         count: Some(2),
         ..Default::default()
      };
      let config = with_env(&[], || CommitConfig::resolve(&args)).unwrap();
      assert_eq!(config.mode, Mode::List { count: 2 });
   }

   #[test]
   fn test_emoji_map_overridable_from_file() {
      let file = write_config("api_key = \"k\"\n[emoji_map]\nfeat = \"🚀\"\n");
      let args = Args { config: Some(file.path().to_path_buf()), ..Default::default() };
      let config = with_env(&[], || CommitConfig::resolve(&args)).unwrap();
      assert_eq!(config.emoji_map.get("feat").map(String::as_str), Some("🚀"));
      assert_eq!(config.emoji_map.get("fix").map(String::as_str), Some("🐛"));
      assert_eq!(config.emoji_map.len(), default_emoji_map().len());
   }

   #[test]
   fn test_emoji_map_accepts_new_types() {
      let file = write_config("api_key = \"k\"\n[emoji_map]\nwip = \"🚧\"\n");
      let args = Args { config: Some(file.path().to_path_buf()), ..Default::default() };
      let config = with_env(&[], || CommitConfig::resolve(&args)).unwrap();
      assert_eq!(config.emoji_map.get("wip").map(String::as_str), Some("🚧"));
      assert_eq!(config.emoji_map.get("feat").map(String::as_str), Some("✨"));
   }

   #[test]
   fn test_empty_api_key_env_falls_back_to_openai_key() {
      let file = write_config("");
      let args = Args { config: Some(file.path().to_path_buf()), ..Default::default() };
      let config = with_env(
         &[("AIC_API_KEY", Some("")), ("OPENAI_API_KEY", Some("sk-openai"))],
         || CommitConfig::resolve(&args),
      )
      .unwrap();
      assert_eq!(config.api_key.as_deref(), Some("sk-openai"));
   }

   #[test]
   fn test_empty_api_key_env_keeps_file_key() {
      let file = write_config("api_key = \"from-file\"\n");
      let args = Args { config: Some(file.path().to_path_buf()), ..Default::default() };
      let config =
         with_env(&[("AIC_API_KEY", Some("")), ("AIC_MODEL", Some(""))], || {
            CommitConfig::resolve(&args)
         })
         .unwrap();
      assert_eq!(config.api_key.as_deref(), Some("from-file"));
      assert_eq!(config.model, "gpt-4o-mini");
   }

   #[test]
   fn test_blank_hint_is_dropped() {
      let mut config = CommitConfig::default();
      config.apply_cli_overrides(&Args { hint: Some("   ".to_string()), ..Default::default() });
      assert!(config.hint.is_none());
   }
}
