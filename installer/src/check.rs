//! `n8n-install check` and `n8n-install keys`.

use crate::core::catalog::{CatalogContext, build_catalog};
use crate::core::invariants::validate_tree;
use crate::core::options::check_tables;
use crate::core::snapshot::EnvKey;
use crate::core::timezones::FALLBACK_TIMEZONE;

/// Every static violation in the shipped catalog and option tables.
pub fn check_catalog() -> Vec<String> {
    let tree = build_catalog(&CatalogContext {
        local_timezone: FALLBACK_TIMEZONE.to_string(),
    });
    let mut errors = validate_tree(&tree);
    errors.extend(check_tables());
    errors
}

/// One line per catalog key: name, section, seeded default.
pub fn key_listing() -> Vec<String> {
    EnvKey::ALL
        .iter()
        .map(|key| {
            format!(
                "{}\t{}\t{}",
                key,
                key.section().title(),
                key.seeded_default().unwrap_or("-")
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_catalog_is_clean() {
        let errors = check_catalog();
        assert!(errors.is_empty(), "{errors:#?}");
    }

    #[test]
    fn listing_covers_every_key() {
        let listing = key_listing();
        assert_eq!(listing.len(), EnvKey::ALL.len());
        assert!(listing.iter().any(|line| line.starts_with("DB_TYPE\t")));
    }
}
