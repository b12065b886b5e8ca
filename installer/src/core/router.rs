//! Commit a resolved answer into the snapshot.

use crate::core::question::Question;
use crate::core::snapshot::ConfigSnapshot;

/// Write `prefix + raw` to every output key of `question` and return `raw`.
///
/// Later writes to the same key overwrite earlier ones. A question without
/// output keys leaves the snapshot untouched.
pub fn commit(question: &Question, raw: &str, snapshot: &mut ConfigSnapshot) -> String {
    if !question.output_keys.is_empty() {
        let persisted = match question.value_prefix.as_deref() {
            Some(prefix) => format!("{prefix}{raw}"),
            None => raw.to_string(),
        };
        for key in &question.output_keys {
            snapshot.set(*key, persisted.clone());
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::EnvKey;

    #[test]
    fn prefix_is_persisted_but_not_returned() {
        let question = Question::text("Domain?")
            .writes(EnvKey::EditorBaseUrl)
            .writes(EnvKey::WebhookUrl)
            .prefix("https://");
        let mut snapshot = ConfigSnapshot::seeded();
        let resolved = commit(&question, "n8n.example.com", &mut snapshot);
        assert_eq!(resolved, "n8n.example.com");
        assert_eq!(
            snapshot.get(EnvKey::EditorBaseUrl),
            Some("https://n8n.example.com")
        );
        assert_eq!(
            snapshot.get(EnvKey::WebhookUrl),
            Some("https://n8n.example.com")
        );
    }

    #[test]
    fn no_output_keys_is_noop() {
        let mut snapshot = ConfigSnapshot::seeded();
        let before = snapshot.clone();
        let resolved = commit(&Question::secret("Token?"), "abc", &mut snapshot);
        assert_eq!(resolved, "abc");
        assert_eq!(snapshot, before);
    }

    #[test]
    fn last_write_wins() {
        let question = Question::text("Prefix?").writes(EnvKey::DbTablePrefix);
        let mut snapshot = ConfigSnapshot::seeded();
        commit(&question, "first", &mut snapshot);
        commit(&question, "second", &mut snapshot);
        assert_eq!(snapshot.get(EnvKey::DbTablePrefix), Some("second"));
    }
}
