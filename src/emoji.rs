//! Commit type → emoji decoration.

use indexmap::IndexMap;

/// Default emoji for each conventional commit type (gitmoji conventions).
pub const EMOJI_TABLE: &[(&str, &str)] = &[
   ("feat", "✨"),
   ("fix", "🐛"),
   ("docs", "📝"),
   ("style", "💄"),
   ("refactor", "♻️"),
   ("test", "✅"),
   ("chore", "🔧"),
   ("ci", "👷"),
   ("perf", "⚡️"),
   ("build", "📦"),
   ("revert", "⏪"),
];

pub fn default_emoji_map() -> IndexMap<String, String> {
   EMOJI_TABLE
      .iter()
      .map(|(ty, emoji)| ((*ty).to_string(), (*emoji).to_string()))
      .collect()
}

/// Extract the conventional commit type keyword from the start of a message.
///
/// Accepts `type: ...`, `type(scope): ...` and `type!: ...`. Returns the type
/// lowercased, or `None` when the subject has no such prefix.
pub fn commit_type_of(message: &str) -> Option<String> {
   let subject = message.lines().next()?.trim_start();
   let (prefix, _) = subject.split_once(':')?;
   let prefix = prefix.trim_end().trim_end_matches('!');
   let ty = match prefix.find('(') {
      Some(open) if prefix.ends_with(')') => &prefix[..open],
      Some(_) => return None,
      None => prefix,
   };

   if ty.is_empty() || !ty.chars().all(|c| c.is_ascii_alphabetic()) {
      return None;
   }
   Some(ty.to_ascii_lowercase())
}

/// Prefix `message` with the emoji mapped to its commit type.
///
/// Messages without a recognized type are returned unchanged. A message that
/// already starts with an emoji has no parseable type, so it is never
/// prefixed twice. An empty map entry disables the emoji for that type.
pub fn add_emoji(message: &str, emoji_map: &IndexMap<String, String>) -> String {
   let emoji = commit_type_of(message)
      .and_then(|ty| emoji_map.get(&ty))
      .filter(|emoji| !emoji.is_empty());

   match emoji {
      Some(emoji) => format!("{emoji} {message}"),
      None => message.to_string(),
   }
}
