//! Name suggestions for lint messages, plus the kebab-case check for rule set ids.

/// Closest candidate to `input` by case-insensitive edit distance.
///
/// Returns `None` when even the best candidate needs more edits than half
/// the longer of the two names.
pub(crate) fn fuzzy_match<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let needle = input.to_lowercase();
    let (best, dist) = candidates
        .iter()
        .map(|c| (*c, levenshtein(&needle, &c.to_lowercase())))
        .min_by_key(|(_, d)| *d)?;

    let limit = input.chars().count().max(best.chars().count()) / 2;
    (dist <= limit).then_some(best)
}

/// `"Did you mean 'x'?"` for an unknown name, when a close candidate exists.
pub(crate) fn did_you_mean(input: &str, candidates: &[&str]) -> Option<String> {
    fuzzy_match(input, candidates).map(|c| format!("did you mean '{}'?", c))
}

/// Edit distance (insert, delete, substitute) between two strings.
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let substitute = diagonal + usize::from(ca != *cb);
            row[j + 1] = substitute.min(above + 1).min(row[j] + 1);
            diagonal = above;
        }
    }

    row[b.len()]
}

/// `^[a-z0-9]+(-[a-z0-9]+)*$`
pub(crate) fn is_kebab_case(s: &str) -> bool {
    !s.is_empty()
        && s.split('-').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[&str] = &[
        "creditutilizationratio",
        "balance",
        "limit",
        "mon_arrears",
        "inst_arrears",
        "legal_cases_active",
        "case_types",
    ];

    #[test]
    fn levenshtein_distances() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("balance", "balance"), 0);
    }

    #[test]
    fn suggests_close_field_names() {
        assert_eq!(fuzzy_match("balence", FIELDS), Some("balance"));
        assert_eq!(fuzzy_match("CreditUtilisationRatio", FIELDS), Some("creditutilizationratio"));
        assert_eq!(fuzzy_match("month_arrears", FIELDS), Some("mon_arrears"));
        assert_eq!(
            did_you_mean("legal_case_active", FIELDS).as_deref(),
            Some("did you mean 'legal_cases_active'?")
        );
    }

    #[test]
    fn no_suggestion_for_distant_names() {
        assert_eq!(fuzzy_match("zzzzzzzzzzzzz", FIELDS), None);
        assert_eq!(fuzzy_match("x", &[]), None);
    }

    #[test]
    fn kebab_case() {
        assert!(is_kebab_case("credit-rules"));
        assert!(is_kebab_case("ccris2"));
        assert!(!is_kebab_case("Credit-Rules"));
        assert!(!is_kebab_case("credit--rules"));
        assert!(!is_kebab_case("-credit"));
        assert!(!is_kebab_case("credit_rules"));
        assert!(!is_kebab_case(""));
    }
}
