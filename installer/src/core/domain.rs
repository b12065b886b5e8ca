//! Split a hostname into subdomain and registrable domain.
//!
//! Only multi-label public suffixes need an explicit entry; any other
//! hostname is treated as having a single-label suffix.

use anyhow::{Result, bail};

/// Multi-label public suffixes commonly used for zones.
const MULTI_LABEL_SUFFIXES: &[&str] = &[
    "ac.uk", "co.uk", "gov.uk", "ltd.uk", "me.uk", "net.uk", "org.uk", "plc.uk", "sch.uk",
    "com.au", "net.au", "org.au", "edu.au", "gov.au", "id.au", "co.nz", "net.nz", "org.nz",
    "co.za", "org.za", "co.jp", "ne.jp", "or.jp", "co.kr", "or.kr", "co.in", "net.in", "org.in",
    "firm.in", "com.br", "net.br", "org.br", "com.mx", "org.mx", "com.ar", "com.co", "com.cn",
    "net.cn", "org.cn", "com.hk", "com.sg", "com.tw", "com.tr", "com.ua", "co.il", "co.id",
    "com.my", "com.ph", "com.pk", "com.vn", "com.eg", "com.sa", "co.th", "in.th", "com.pl",
    "eu.org", "us.com", "uk.com",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParts {
    /// Labels left of the registrable domain, `None` at the apex.
    pub subdomain: Option<String>,
    pub registrable: String,
}

impl DomainParts {
    /// DNS record name inside the zone: the subdomain, or `@` for the apex.
    pub fn record_name(&self) -> &str {
        self.subdomain.as_deref().unwrap_or("@")
    }
}

pub fn split_domain(domain: &str) -> Result<DomainParts> {
    let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        bail!("{domain:?} is not a fully qualified domain name");
    }

    let suffix_labels = if labels.len() >= 3 {
        let tail = labels[labels.len() - 2..].join(".");
        if MULTI_LABEL_SUFFIXES.contains(&tail.as_str()) { 2 } else { 1 }
    } else {
        1
    };
    if labels.len() <= suffix_labels {
        bail!("{domain:?} is a public suffix, not a registrable domain");
    }

    let split = labels.len() - suffix_labels - 1;
    let registrable = labels[split..].join(".");
    let subdomain = (split > 0).then(|| labels[..split].join("."));
    Ok(DomainParts {
        subdomain,
        registrable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdomain_of_simple_zone() {
        let parts = split_domain("sub.example.com").expect("split");
        assert_eq!(parts.registrable, "example.com");
        assert_eq!(parts.record_name(), "sub");
    }

    #[test]
    fn apex_uses_at_sign() {
        let parts = split_domain("example.com").expect("split");
        assert_eq!(parts.subdomain, None);
        assert_eq!(parts.record_name(), "@");
    }

    #[test]
    fn multi_label_suffix() {
        let parts = split_domain("n8n.shop.example.co.uk").expect("split");
        assert_eq!(parts.registrable, "example.co.uk");
        assert_eq!(parts.record_name(), "n8n.shop");
        assert_eq!(
            split_domain("example.co.uk").expect("split").record_name(),
            "@"
        );
    }

    #[test]
    fn rejects_non_domains() {
        assert!(split_domain("localhost").is_err());
        assert!(split_domain("a..com").is_err());
    }
}
