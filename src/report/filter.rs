use serde::{Deserialize, Serialize};

/// String comparison applied when filtering rows by a dimension value.
///
/// Serializes to the GA4 `StringFilter.MatchType` enum names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    #[default]
    Exact,
    Contains,
    BeginsWith,
    EndsWith,
    PartialRegexp,
    FullRegexp,
}

impl MatchType {
    /// Map a free-text condition label onto a match operator.
    ///
    /// Matching is case-insensitive and accepts Portuguese spellings with and
    /// without accents as well as the English operator names. Any label that
    /// is not in the table maps to [`MatchType::Exact`] without error.
    pub fn parse(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "contem" | "contém" | "contains" => Self::Contains,
            "começa com" | "comeca com" | "comeca_com" | "begins_with" => Self::BeginsWith,
            "termina com" | "termina_com" | "ends_with" => Self::EndsWith,
            "regex" | "regexp" => Self::PartialRegexp,
            "regex completa" | "full_regexp" => Self::FullRegexp,
            // "igual", "exact" and everything unrecognized
            _ => Self::Exact,
        }
    }
}

/// A single-field string filter as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
    pub condition: MatchType,
}

impl FieldFilter {
    /// Build a filter from raw caller input.
    ///
    /// Returns `None` unless both the field and the value are non-empty after
    /// trimming, in which case the request is sent unfiltered.
    pub fn from_parts(field: &str, value: &str, condition: &str) -> Option<Self> {
        let field = field.trim();
        let value = value.trim();
        if field.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            value: value.to_string(),
            condition: MatchType::parse(condition),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_portuguese_labels() {
        assert_eq!(MatchType::parse("igual"), MatchType::Exact);
        assert_eq!(MatchType::parse("contem"), MatchType::Contains);
        assert_eq!(MatchType::parse("contém"), MatchType::Contains);
        assert_eq!(MatchType::parse("começa com"), MatchType::BeginsWith);
        assert_eq!(MatchType::parse("comeca com"), MatchType::BeginsWith);
        assert_eq!(MatchType::parse("comeca_com"), MatchType::BeginsWith);
        assert_eq!(MatchType::parse("termina com"), MatchType::EndsWith);
        assert_eq!(MatchType::parse("termina_com"), MatchType::EndsWith);
        assert_eq!(MatchType::parse("regex"), MatchType::PartialRegexp);
        assert_eq!(MatchType::parse("regex completa"), MatchType::FullRegexp);
    }

    #[test]
    fn test_parse_english_labels() {
        assert_eq!(MatchType::parse("exact"), MatchType::Exact);
        assert_eq!(MatchType::parse("contains"), MatchType::Contains);
        assert_eq!(MatchType::parse("begins_with"), MatchType::BeginsWith);
        assert_eq!(MatchType::parse("ends_with"), MatchType::EndsWith);
        assert_eq!(MatchType::parse("regexp"), MatchType::PartialRegexp);
        assert_eq!(MatchType::parse("full_regexp"), MatchType::FullRegexp);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(MatchType::parse("CONTAINS"), MatchType::Contains);
        assert_eq!(MatchType::parse("Começa Com"), MatchType::BeginsWith);
        assert_eq!(MatchType::parse("CONTÉM"), MatchType::Contains);
    }

    #[test]
    fn test_parse_unknown_falls_back_to_exact() {
        assert_eq!(MatchType::parse("parecido"), MatchType::Exact);
        assert_eq!(MatchType::parse(""), MatchType::Exact);
        assert_eq!(MatchType::parse(" contains "), MatchType::Exact);
    }

    #[test]
    fn test_serializes_to_ga4_enum() {
        let json = serde_json::to_string(&MatchType::BeginsWith).unwrap();
        assert_eq!(json, "\"BEGINS_WITH\"");
        let json = serde_json::to_string(&MatchType::PartialRegexp).unwrap();
        assert_eq!(json, "\"PARTIAL_REGEXP\"");
    }

    #[test]
    fn test_field_filter_requires_field_and_value() {
        assert!(FieldFilter::from_parts("", "BR", "igual").is_none());
        assert!(FieldFilter::from_parts("country", "  ", "igual").is_none());

        let filter = FieldFilter::from_parts(" country ", " Brazil ", "contém").unwrap();
        assert_eq!(filter.field, "country");
        assert_eq!(filter.value, "Brazil");
        assert_eq!(filter.condition, MatchType::Contains);
    }

    proptest! {
        #[test]
        fn prop_unknown_labels_are_exact(label in "[xyz]{1,10}") {
            prop_assert_eq!(MatchType::parse(&label), MatchType::Exact);
        }
    }
}
