//! Language codes and diacritic substitution rules.
//!
//! The "mis-spelled" search strategy widens language-specific special
//! characters to SQL wildcards before pattern matching, so a user typing
//! `Ocean` still finds `Océan`. The substitution table is data, not code:
//! deployments with additional languages supply their own
//! [`DiacriticRules`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Two-letter lowercase ISO 639-1 language code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IsoLanguage(String);

impl IsoLanguage {
    /// Normalize and wrap a two-letter code. Longer tags are truncated to
    /// their primary subtag (`fr-FR` becomes `fr`).
    pub fn new(code: &str) -> Self {
        let primary = code.split(['-', '_']).next().unwrap_or(code);
        Self(primary.to_lowercase())
    }

    /// The two-letter code.
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IsoLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IsoLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("empty language code".to_string());
        }
        Ok(Self::new(s))
    }
}

impl From<&str> for IsoLanguage {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Per-language table of characters widened to a wildcard by the
/// mis-spelled search strategy.
///
/// Both the diacritic form and its base letter are widened, so the rule
/// works in whichever direction the user mistyped.
#[derive(Debug, Clone, Default)]
pub struct DiacriticRules {
    by_language: HashMap<String, Vec<char>>,
}

static DEFAULT_RULES: Lazy<DiacriticRules> = Lazy::new(|| {
    let mut rules = DiacriticRules::default();
    rules.set("fr", "àâäéèêëîïôöùûüçaeiouc");
    rules.set("de", "äöüßaousz");
    rules.set("es", "áéíóúüñaeioun");
    rules.set("it", "àèéìòùaeiou");
    rules.set("pt", "ãâáàçéêíõóôúaceiou");
    rules.set("en", "");
    rules
});

impl DiacriticRules {
    /// The built-in rule table (en/fr/de/es/it/pt).
    pub fn builtin() -> &'static DiacriticRules {
        &DEFAULT_RULES
    }

    /// Replace the widened character set for a language.
    pub fn set(&mut self, language: &str, chars: &str) {
        self.by_language
            .insert(language.to_lowercase(), chars.chars().collect());
    }

    /// Characters widened for a language; empty when the language has no rule.
    pub fn chars_for(&self, language: &IsoLanguage) -> &[char] {
        self.by_language
            .get(language.code())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Build a SQL LIKE pattern from `term`, replacing every widened
    /// character with the single-character wildcard `_`.
    ///
    /// Returns `None` when the term contains no widened character, meaning
    /// the mis-spelled strategy cannot improve on an exact match.
    pub fn wildcard_pattern(&self, term: &str, language: &IsoLanguage) -> Option<String> {
        let widened = self.chars_for(language);
        if widened.is_empty() {
            return None;
        }
        let mut replaced = false;
        let pattern: String = term
            .chars()
            .map(|c| {
                if widened.contains(&c.to_lowercase().next().unwrap_or(c)) {
                    replaced = true;
                    '_'
                } else {
                    c
                }
            })
            .collect();
        replaced.then_some(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_normalization() {
        assert_eq!(IsoLanguage::new("FR").code(), "fr");
        assert_eq!(IsoLanguage::new("fr-FR").code(), "fr");
        assert_eq!(IsoLanguage::new("en_US").code(), "en");
    }

    #[test]
    fn test_language_from_str_rejects_empty() {
        assert!("".parse::<IsoLanguage>().is_err());
        assert!("fr".parse::<IsoLanguage>().is_ok());
    }

    #[test]
    fn test_wildcard_pattern_french() {
        let rules = DiacriticRules::builtin();
        let fr = IsoLanguage::new("fr");
        // Both the accented and the plain spelling widen to the same pattern.
        assert_eq!(rules.wildcard_pattern("Océan", &fr).unwrap(), "____n");
        assert_eq!(rules.wildcard_pattern("Ocean", &fr).unwrap(), "____n");
    }

    #[test]
    fn test_wildcard_pattern_none_without_candidates() {
        let rules = DiacriticRules::builtin();
        let fr = IsoLanguage::new("fr");
        // No widened character appears: strategy is skipped.
        assert!(rules.wildcard_pattern("Rhythm", &fr).is_none());
    }

    #[test]
    fn test_wildcard_pattern_unknown_language() {
        let rules = DiacriticRules::builtin();
        assert!(rules
            .wildcard_pattern("Océan", &IsoLanguage::new("ja"))
            .is_none());
    }

    #[test]
    fn test_custom_rules_override() {
        let mut rules = DiacriticRules::default();
        rules.set("xx", "o");
        let xx = IsoLanguage::new("xx");
        assert_eq!(rules.wildcard_pattern("foo", &xx).unwrap(), "f__");
    }
}
