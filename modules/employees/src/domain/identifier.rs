//! Employee identifier allocation.
//!
//! An identifier is `prefix + GI + FA`, where `GI` and `FA` are the first two
//! characters of the given and family names, upper-cased. When that token is
//! taken, a zero-padded counter is appended (`001`, `002`, ...) and the first
//! free candidate wins. Counters past `999` keep counting (`1000`), so the
//! token stays unique and only the fixed width is lost.
//!
//! Allocation is pure: callers decide what "taken" means. The service answers
//! from a snapshot of stored identifiers and relies on the unique index as the
//! final authority when two writers race.

/// Default prefix for generated identifiers.
pub const DEFAULT_PREFIX: &str = "EMP";

/// First two characters of `name`, upper-cased after taking them
/// (so `ß` becomes `SS`). Shorter names contribute what they have.
fn initials(name: &str) -> String {
    name.trim().chars().take(2).collect::<String>().to_uppercase()
}

/// The un-suffixed identifier for a name pair.
pub fn base_identifier(prefix: &str, given_name: &str, family_name: &str) -> String {
    format!("{prefix}{}{}", initials(given_name), initials(family_name))
}

/// Returns the first candidate for which `is_taken` is false: the base token,
/// then `base001`, `base002`, ... in increasing order.
pub fn allocate_identifier<F>(
    prefix: &str,
    given_name: &str,
    family_name: &str,
    mut is_taken: F,
) -> String
where
    F: FnMut(&str) -> bool,
{
    let base = base_identifier(prefix, given_name, family_name);
    if !is_taken(&base) {
        return base;
    }
    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{base}{counter:03}");
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn taken(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn free_base_is_returned_as_is() {
        let id = allocate_identifier("EMP", "Jo", "Li", |_| false);
        assert_eq!(id, "EMPJOLI");
    }

    #[test]
    fn uses_first_two_characters_upper_cased() {
        assert_eq!(base_identifier("EMP", "john", "lennon"), "EMPJOLE");
        assert_eq!(base_identifier("EMP", "  mary ", "o'neil"), "EMPMAO'");
    }

    #[test]
    fn taken_base_gets_first_counter() {
        let existing = taken(&["EMPJOLI"]);
        let id = allocate_identifier("EMP", "Jo", "Li", |c| existing.contains(c));
        assert_eq!(id, "EMPJOLI001");
    }

    #[test]
    fn counters_are_tried_in_order_without_skipping() {
        let existing = taken(&["EMPJOLI", "EMPJOLI001", "EMPJOLI002", "EMPJOLI004"]);
        let id = allocate_identifier("EMP", "Jo", "Li", |c| existing.contains(c));
        assert_eq!(id, "EMPJOLI003");
    }

    #[test]
    fn candidates_are_sequential() {
        let existing = taken(&["EMPJOLI", "EMPJOLI001"]);
        let mut candidates = Vec::new();
        let id = allocate_identifier("EMP", "Jo", "Li", |c| {
            candidates.push(c.to_string());
            existing.contains(c)
        });
        assert_eq!(id, "EMPJOLI002");
        assert_eq!(candidates, vec!["EMPJOLI", "EMPJOLI001", "EMPJOLI002"]);
    }

    #[test]
    fn never_returns_a_taken_token() {
        let existing: HashSet<String> = std::iter::once("EMPADOB".to_string())
            .chain((1..=50).map(|n| format!("EMPADOB{n:03}")))
            .collect();
        let id = allocate_identifier("EMP", "Ada", "Obi", |c| existing.contains(c));
        assert!(!existing.contains(&id));
        assert_eq!(id, "EMPADOB051");
    }

    #[test]
    fn counter_keeps_counting_past_three_digits() {
        let id = allocate_identifier("EMP", "Jo", "Li", |c| {
            c == "EMPJOLI" || c.strip_prefix("EMPJOLI").is_some_and(|n| n.len() == 3)
        });
        assert_eq!(id, "EMPJOLI1000");
    }

    #[test]
    fn short_names_are_not_padded() {
        assert_eq!(allocate_identifier("EMP", "A", "B", |_| false), "EMPAB");
        assert_eq!(allocate_identifier("EMP", "", "Li", |_| false), "EMPLI");
    }

    #[test]
    fn unicode_characters_are_counted_not_bytes() {
        assert_eq!(base_identifier("EMP", "Émile", "Zoë"), "EMPÉMZO");
        assert_eq!(base_identifier("EMP", "ßa", "Li"), "EMPSSALI");
    }

    #[test]
    fn custom_prefix_is_used() {
        assert_eq!(allocate_identifier("STF", "Jo", "Li", |_| false), "STFJOLI");
    }
}
