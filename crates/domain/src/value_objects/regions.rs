use std::collections::HashSet;

pub const DEFAULT_REGION: &str = "default";

const LANGUAGE_COUNTRIES: &[(&str, &str)] = &[
    ("zh", "CN"),
    ("zh-CN", "CN"),
    ("zh-TW", "TW"),
    ("zh-HK", "HK"),
    ("en", "US"),
    ("en-US", "US"),
    ("en-GB", "GB"),
    ("ja", "JP"),
    ("ko", "KR"),
    ("de", "DE"),
    ("fr", "FR"),
    ("es", "ES"),
    ("it", "IT"),
    ("pt", "BR"),
    ("ru", "RU"),
    ("ar", "SA"),
    ("hi", "IN"),
    ("th", "TH"),
    ("vi", "VN"),
    ("id", "ID"),
    ("ms", "MY"),
    ("tr", "TR"),
    ("pl", "PL"),
    ("nl", "NL"),
    ("sv", "SE"),
    ("da", "DK"),
    ("no", "NO"),
    ("fi", "FI"),
    ("cs", "CZ"),
    ("hu", "HU"),
    ("ro", "RO"),
    ("el", "GR"),
    ("he", "IL"),
    ("is", "IS"),
];

/// Maps a language header value (`zh-TW,zh;q=0.9,en;q=0.8`) to a country code using only its
/// first entry: exact tag first, then the base language.
pub fn country_from_language(header: &str) -> Option<&'static str> {
    let first = header.split(',').next()?;
    let tag = first.split(';').next()?.trim();
    if tag.is_empty() {
        return None;
    }

    lookup_language(tag).or_else(|| {
        tag.split_once('-')
            .and_then(|(base, _)| lookup_language(base))
    })
}

fn lookup_language(tag: &str) -> Option<&'static str> {
    LANGUAGE_COUNTRIES
        .iter()
        .find(|(language, _)| *language == tag)
        .map(|(_, country)| *country)
}

/// ISO 3166-1 alpha-2 shape check (two ASCII uppercase letters).
pub fn is_country_code(value: &str) -> bool {
    value.len() == 2 && value.chars().all(|c| c.is_ascii_uppercase())
}

/// Allowlist of pricing lookup keys. `"default"` is always a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedRegions {
    regions: HashSet<String>,
}

impl Default for SupportedRegions {
    fn default() -> Self {
        Self::new(["default", "CN", "US", "EU"])
    }
}

impl SupportedRegions {
    pub fn new<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: HashSet<String> = regions
            .into_iter()
            .map(|r| r.as_ref().trim().to_string())
            .filter(|r| !r.is_empty())
            .map(|r| {
                if r.eq_ignore_ascii_case(DEFAULT_REGION) {
                    DEFAULT_REGION.to_string()
                } else {
                    r.to_ascii_uppercase()
                }
            })
            .collect();
        set.insert(DEFAULT_REGION.to_string());

        Self { regions: set }
    }

    /// Parses a comma separated list such as `default,CN,US,EU`.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn contains(&self, region: &str) -> bool {
        self.regions.contains(region)
    }

    /// Returns the lookup key to use and whether a fallback to `"default"` happened.
    pub fn normalize(&self, region: &str) -> (String, bool) {
        let trimmed = region.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(DEFAULT_REGION) {
            return (DEFAULT_REGION.to_string(), false);
        }

        let upper = trimmed.to_ascii_uppercase();
        if self.contains(&upper) {
            (upper, false)
        } else {
            (DEFAULT_REGION.to_string(), true)
        }
    }
}
