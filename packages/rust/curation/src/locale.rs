//! Ranking of a detected locale against the preferred one.

/// How well a URL's locale fits the preferred locale. Higher wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreferenceScore {
    /// A different language altogether.
    OtherLanguage = 0,
    /// No locale segment; treated as the site's default variant.
    NoLocale = 1,
    /// Same base language, different or missing region (`zh` vs `zh-CN`).
    SameLanguage = 2,
    /// Exact tag match.
    Exact = 3,
}

impl PreferenceScore {
    /// Numeric value in `0..=3`.
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Score `locale` against `preferred`.
pub fn score(locale: Option<&str>, preferred: &str) -> PreferenceScore {
    let Some(locale) = locale else {
        return PreferenceScore::NoLocale;
    };

    if locale == preferred {
        PreferenceScore::Exact
    } else if base_language(locale) == base_language(preferred) {
        PreferenceScore::SameLanguage
    } else {
        PreferenceScore::OtherLanguage
    }
}

/// `zh-CN` → `zh`.
fn base_language(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_table() {
        assert_eq!(score(Some("en"), "en"), PreferenceScore::Exact);
        assert_eq!(score(Some("zh-CN"), "zh-CN"), PreferenceScore::Exact);
        assert_eq!(score(Some("zh-CN"), "zh"), PreferenceScore::SameLanguage);
        assert_eq!(score(Some("zh"), "zh-TW"), PreferenceScore::SameLanguage);
        assert_eq!(score(None, "en"), PreferenceScore::NoLocale);
        assert_eq!(score(Some("fr"), "en"), PreferenceScore::OtherLanguage);
    }

    #[test]
    fn ordering_matches_numeric_value() {
        assert!(PreferenceScore::Exact > PreferenceScore::SameLanguage);
        assert!(PreferenceScore::SameLanguage > PreferenceScore::NoLocale);
        assert!(PreferenceScore::NoLocale > PreferenceScore::OtherLanguage);
        assert_eq!(PreferenceScore::Exact.value(), 3);
        assert_eq!(PreferenceScore::OtherLanguage.value(), 0);
    }
}
