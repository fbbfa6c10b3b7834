// Field normalization: raw cell text -> comparable key.
// Pure functions. Anything unusable degrades to None ("no signal"), never an error.

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Url,
    Name,
    Phone,
    Email,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Url => "url",
            FieldKind::Name => "name",
            FieldKind::Phone => "phone",
            FieldKind::Email => "email",
        }
    }
}

/// Normalize a raw field of the given kind.
///
/// Non-empty input that yields no key is logged at debug level so a strict
/// run can audit what was silently dropped.
pub fn normalize(raw: &str, kind: FieldKind) -> Option<String> {
    let key = match kind {
        FieldKind::Url => normalize_domain(raw),
        FieldKind::Name => normalize_name(raw),
        FieldKind::Phone => normalize_phone(raw),
        FieldKind::Email => normalize_email(raw),
    };
    if key.is_none() && !raw.trim().is_empty() {
        tracing::debug!(kind = kind.as_str(), raw, "value normalized to nothing");
    }
    key
}

/// `HTTPS://WWW.Foo.COM/book` -> `foo.com`.
///
/// Prepends `https://` when no scheme is present, takes the lowercased host
/// and strips leading `www.` labels. `n/a` and unparseable input give None.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        return None;
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&with_scheme).ok()?;
    let mut host = parsed.host_str()?.to_ascii_lowercase();
    // Repeated so the result is a fixed point ("www.www.x" -> "x").
    while let Some(rest) = host.strip_prefix("www.") {
        host = rest.to_string();
    }

    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Lowercase, keep `[a-z0-9]` only. No suffix stripping ("Inc", "Ltd").
pub fn normalize_name(raw: &str) -> Option<String> {
    let key: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Digits only: `(403) 555-0134` -> `4035550134`.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let key: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Lowercased and trimmed; must contain `@`.
pub fn normalize_email(raw: &str) -> Option<String> {
    let key = raw.to_lowercase().trim().to_string();
    if key.contains('@') {
        Some(key)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn domain_case_and_scheme_insensitive() {
        assert_eq!(normalize_domain("HTTPS://WWW.Foo.COM").as_deref(), Some("foo.com"));
        assert_eq!(normalize_domain("foo.com").as_deref(), Some("foo.com"));
        assert_eq!(normalize_domain("  www.AcmeSpa.com ").as_deref(), Some("acmespa.com"));
        assert_eq!(
            normalize_domain("https://acmespa.com/book-now?ref=ig").as_deref(),
            Some("acmespa.com")
        );
        assert_eq!(normalize_domain("http://shop.acmespa.com").as_deref(), Some("shop.acmespa.com"));
    }

    #[test]
    fn domain_degrades_to_none() {
        assert_eq!(normalize_domain(""), None);
        assert_eq!(normalize_domain("   "), None);
        assert_eq!(normalize_domain("N/A"), None);
        assert_eq!(normalize_domain("n/a"), None);
        assert_eq!(normalize_domain("not a url"), None);
        assert_eq!(normalize_domain("www."), None);
    }

    #[test]
    fn name_keeps_alphanumerics_only() {
        assert_eq!(normalize_name("Glow Skin Bar").as_deref(), Some("glowskinbar"));
        assert_eq!(normalize_name("A&B Nails, Inc.").as_deref(), Some("abnailsinc"));
        assert_eq!(normalize_name("Café 21").as_deref(), Some("caf21"));
        assert_eq!(normalize_name("—"), None);
    }

    #[test]
    fn phone_digits_only() {
        assert_eq!(normalize_phone("(403) 555-0134").as_deref(), Some("4035550134"));
        assert_eq!(normalize_phone("403-555-0134").as_deref(), Some("4035550134"));
        assert_eq!(normalize_phone("+1 403.555.0134").as_deref(), Some("14035550134"));
        assert_eq!(normalize_phone("n/a"), None);
    }

    #[test]
    fn email_requires_at_sign() {
        assert_eq!(normalize_email(" Info@GlowSkin.ca ").as_deref(), Some("info@glowskin.ca"));
        assert_eq!(normalize_email("none"), None);
        assert_eq!(normalize_email(""), None);
    }

    #[test]
    fn dispatch_matches_kind() {
        assert_eq!(normalize("www.x.com", FieldKind::Url).as_deref(), Some("x.com"));
        assert_eq!(normalize("X Co", FieldKind::Name).as_deref(), Some("xco"));
        assert_eq!(normalize("1-2", FieldKind::Phone).as_deref(), Some("12"));
        assert_eq!(normalize("a@b", FieldKind::Email).as_deref(), Some("a@b"));
    }

    fn arb_url() -> impl Strategy<Value = String> {
        (
            prop_oneof![Just(""), Just("http://"), Just("HTTPS://"), Just("https://www.")],
            prop_oneof![Just(""), Just("www."), Just("WWW.")],
            r"[a-zA-Z][a-zA-Z0-9-]{0,10}\.[a-zA-Z]{2,4}",
            prop_oneof![Just(""), Just("/"), Just("/book-now")],
        )
            .prop_map(|(scheme, www, host, path)| format!("{scheme}{www}{host}{path}"))
    }

    proptest! {
        #[test]
        fn domain_idempotent(raw in arb_url()) {
            if let Some(once) = normalize_domain(&raw) {
                prop_assert_eq!(normalize_domain(&once), Some(once.clone()));
            }
        }

        #[test]
        fn name_idempotent(raw in "\\PC{0,30}") {
            if let Some(once) = normalize_name(&raw) {
                prop_assert_eq!(normalize_name(&once), Some(once.clone()));
            }
        }

        #[test]
        fn phone_idempotent(raw in "[0-9 ()+.-]{0,20}") {
            if let Some(once) = normalize_phone(&raw) {
                prop_assert_eq!(normalize_phone(&once), Some(once.clone()));
            }
        }

        #[test]
        fn email_idempotent(local in "[A-Za-z0-9._]{1,10}", host in "[A-Za-z0-9.]{1,10}") {
            let raw = format!("  {local}@{host} ");
            let once = normalize_email(&raw).unwrap();
            prop_assert_eq!(normalize_email(&once), Some(once.clone()));
        }
    }
}
