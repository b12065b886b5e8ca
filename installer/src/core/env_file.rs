//! Render a snapshot into the deployment's `.env` file and the matching
//! compose `environment:` entries.

use crate::core::snapshot::{ConfigSnapshot, EnvKey, Section};

const HEADER: &str = "# See Vars at https://docs.n8n.io/hosting/configuration/environment-variables/\n\
# Generated by n8n-install. Edit values here and restart the container to apply.\n";

/// Render the `.env` file.
///
/// Keys are grouped by section in catalog order. Absent keys render as
/// `# KEY=` so the file never carries a literal `"None"`. Enterprise-only
/// sections are written fully commented out.
pub fn render_env_file(snapshot: &ConfigSnapshot, n8n_version: &str) -> String {
    let mut out = String::from(HEADER);
    out.push_str("\n# N8N VERSION\n");
    out.push_str(&format!("N8N_VERSION=\"{}\"\n", escape(n8n_version)));

    let mut current: Option<Section> = None;
    for (key, value) in snapshot.iter() {
        let section = key.section();
        if current != Some(section) {
            out.push_str(&format!("\n# {}\n", section.title()));
            current = Some(section);
        }
        let line = match value {
            Some(value) => format!("{}=\"{}\"", key, escape(value)),
            None => format!("# {}=", key),
        };
        if section.is_inert() && value.is_some() {
            out.push_str("# ");
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Compose `environment:` entries (`KEY=${KEY}`) for keys that carry a
/// non-empty value. `N8N_VERSION` is consumed by the image tag instead.
pub fn compose_environment(snapshot: &ConfigSnapshot) -> Vec<String> {
    snapshot
        .iter()
        .filter(|(key, value)| !key.section().is_inert() && value.is_some_and(|v| !v.is_empty()))
        .map(|(key, _)| interpolation(key))
        .collect()
}

fn interpolation(key: EnvKey) -> String {
    format!("{key}=${{{key}}}")
}

/// Escape for a double-quoted value. Compose expands `$` inside double
/// quotes, so it is escaped too.
fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_keys_render_as_comments() {
        let snapshot = ConfigSnapshot::seeded();
        let rendered = render_env_file(&snapshot, "latest");
        assert!(rendered.contains("\n# N8N_EDITOR_BASE_URL=\n"));
        assert!(rendered.contains("\nDB_TYPE=\"sqlite\"\n"));
        assert!(rendered.contains("N8N_VERSION=\"latest\""));
        assert!(!rendered.contains("None"));
    }

    #[test]
    fn sections_appear_once_in_order() {
        let rendered = render_env_file(&ConfigSnapshot::seeded(), "latest");
        let database = rendered.find("# DATABASE VARIABLES").expect("database");
        let license = rendered.find("# LICENSE").expect("license");
        assert!(database < license);
        assert_eq!(rendered.matches("# SECURITY\n").count(), 1);
    }

    #[test]
    fn inert_sections_are_commented() {
        let mut snapshot = ConfigSnapshot::seeded();
        snapshot.set(EnvKey::ExternalStorageS3Host, "s3.example.com");
        let rendered = render_env_file(&snapshot, "latest");
        assert!(rendered.contains("\n# N8N_EXTERNAL_STORAGE_S3_HOST=\"s3.example.com\"\n"));
        assert!(rendered.contains("\n# N8N_EVENTBUS_LOGWRITER_KEEPLOGCOUNT=\"3\"\n"));
        let compose = compose_environment(&snapshot);
        assert!(!compose.iter().any(|line| line.starts_with("N8N_EXTERNAL_STORAGE")));
    }

    #[test]
    fn values_are_escaped() {
        let mut snapshot = ConfigSnapshot::seeded();
        snapshot.set(EnvKey::WorkflowsDefaultName, r#"my "flow" \ one"#);
        let rendered = render_env_file(&snapshot, "latest");
        assert!(rendered.contains(r#"WORKFLOWS_DEFAULT_NAME="my \"flow\" \\ one""#));
    }

    #[test]
    fn values_with_dollar_are_literal() {
        let mut snapshot = ConfigSnapshot::seeded();
        snapshot.set(EnvKey::SmtpPass, "a$b${HOME}");
        let rendered = render_env_file(&snapshot, "latest");
        assert!(rendered.contains(r#"N8N_SMTP_PASS="a\$b\${HOME}""#));
    }

    #[test]
    fn compose_skips_absent_and_empty() {
        let mut snapshot = ConfigSnapshot::seeded();
        snapshot.set(EnvKey::DbTablePrefix, "");
        snapshot.set(EnvKey::GenericTimezone, "Europe/Berlin");
        let compose = compose_environment(&snapshot);
        assert!(compose.contains(&"GENERIC_TIMEZONE=${GENERIC_TIMEZONE}".to_string()));
        assert!(compose.contains(&"DB_TYPE=${DB_TYPE}".to_string()));
        assert!(!compose.iter().any(|line| line.starts_with("DB_TABLE_PREFIX")));
        assert!(!compose.iter().any(|line| line.starts_with("N8N_EDITOR_BASE_URL")));
        assert!(!compose.iter().any(|line| line.starts_with("N8N_VERSION")));
    }

    #[test]
    fn rendering_is_idempotent() {
        let mut snapshot = ConfigSnapshot::seeded();
        snapshot.set(EnvKey::GenericTimezone, "UTC");
        assert_eq!(
            render_env_file(&snapshot, "1.0.0"),
            render_env_file(&snapshot, "1.0.0")
        );
    }
}
