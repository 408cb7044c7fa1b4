//! Small helpers shared across resources: public id generation, slugs, and
//! the canonical timestamp representation.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Canonical timestamp string: RFC 3339, UTC, fixed millisecond precision.
/// The fixed width keeps stored strings ordered lexicographically, which the
/// date range filters and `created_at` sorts depend on.
pub fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter storing `DateTime<Utc>` through [`timestamp`].
pub mod rfc3339 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::timestamp(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(serde::de::Error::custom)
    }

    fn parse(text: &str) -> chrono::ParseResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => super::serialize(dt, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|text| super::parse(&text).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

/// Generate a client-facing id: `prefix_millis_hex8`, e.g.
/// `prod_1732377600000_a1b2c3d4`. These ids are stored alongside Mongo's
/// `_id` and are the only ids the API ever exposes.
pub fn generate_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, millis, &uuid[..8])
}

/// Turn free text into a URL slug: lowercase, special characters dropped,
/// runs of whitespace/underscores/dashes collapsed to a single dash.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    slug
}

/// A valid slug is non-empty lowercase alphanumeric groups joined by single
/// dashes.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .split('-')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn generated_id_has_prefix_timestamp_and_suffix() {
        let id = generate_id("prod");
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "prod");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(generate_id("order"), generate_id("order"));
    }

    #[test]
    fn timestamps_are_fixed_width_and_ordered() {
        let whole = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let frac = whole + chrono::Duration::milliseconds(500);
        assert_eq!(timestamp(&whole), "2026-03-04T05:06:07.000Z");
        assert_eq!(timestamp(&frac), "2026-03-04T05:06:07.500Z");
        assert!(timestamp(&whole) < timestamp(&frac));
    }

    #[test]
    fn rfc3339_round_trips_through_serde() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Stamp {
            #[serde(with = "rfc3339")]
            at: DateTime<Utc>,
            #[serde(with = "rfc3339::option", default)]
            seen: Option<DateTime<Utc>>,
        }

        let stamp = Stamp {
            at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            seen: None,
        };
        let json = serde_json::to_value(&stamp).unwrap();
        assert_eq!(json["at"], "2026-01-01T00:00:00.000Z");
        assert_eq!(json["seen"], serde_json::Value::Null);

        let back: Stamp = serde_json::from_value(json).unwrap();
        assert_eq!(back.at, stamp.at);
        assert_eq!(back.seen, None);
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Hello World!"), "hello-world");
        assert_eq!(slugify("  Rock & Roll  "), "rock-roll");
        assert_eq!(slugify("foo_bar--baz"), "foo-bar-baz");
        assert_eq!(slugify("Électronique"), "lectronique");
    }

    #[test]
    fn slugify_drops_leading_and_trailing_separators() {
        assert_eq!(slugify("--hello--"), "hello");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slug_validity() {
        assert!(is_valid_slug("hello-world"));
        assert!(is_valid_slug("a1-b2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-hello"));
        assert!(!is_valid_slug("hello--world"));
        assert!(!is_valid_slug("Hello"));
    }
}
