//! Display ordering for accumulated records.

use chrono::NaiveDate;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{BookRecord, SortKey};

/// Return `records` ordered by `key`, leaving the input untouched.
///
/// The sort is stable: records whose keys compare equal keep their
/// accumulation order. [`SortKey::None`] returns the input order as is.
pub fn sort_records(records: &[BookRecord], key: SortKey) -> Vec<BookRecord> {
    let mut sorted = records.to_vec();

    match key {
        SortKey::None => {}
        SortKey::TitleAsc => {
            sorted.sort_by(|a, b| compare_titles(a.sort_title(), b.sort_title()));
        }
        SortKey::TitleDesc => {
            sorted.sort_by(|a, b| compare_titles(b.sort_title(), a.sort_title()));
        }
        SortKey::DateDesc => {
            sorted.sort_by(|a, b| date_or_epoch(b).cmp(&date_or_epoch(a)));
        }
        SortKey::DateAsc => {
            sorted.sort_by(|a, b| date_or_epoch(a).cmp(&date_or_epoch(b)));
        }
    }

    sorted
}

/// Collation-style title comparison.
///
/// Base letters are compared first, ignoring accents and case, so "Éclair"
/// sorts between "apple" and "Zebra". Accents break ties next, then plain
/// byte order, so distinct titles never compare equal.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accented_letters(a).cmp(accented_letters(b)))
        .then_with(|| a.cmp(b))
}

fn base_letters(title: &str) -> impl Iterator<Item = char> + '_ {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn accented_letters(title: &str) -> impl Iterator<Item = char> + '_ {
    title.nfd().flat_map(char::to_lowercase)
}

// Missing or unreadable dates sort as the Unix epoch (NaiveDate's default).
fn date_or_epoch(record: &BookRecord) -> NaiveDate {
    record.parsed_date().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookBuilder;

    fn book(title: Option<&str>, date: Option<&str>) -> BookRecord {
        BookRecord {
            title: title.map(str::to_string),
            published_date: date.map(str::to_string),
            ..Default::default()
        }
    }

    fn titles(records: &[BookRecord]) -> Vec<&str> {
        records.iter().map(|b| b.sort_title()).collect()
    }

    #[test]
    fn test_none_keeps_order() {
        let records = vec![book(Some("Zeta"), None), book(Some("Alpha"), None)];
        let sorted = sort_records(&records, SortKey::None);
        assert_eq!(sorted, records);
    }

    #[test]
    fn test_title_sorting_is_case_insensitive() {
        let records = vec![
            book(Some("zeta"), None),
            book(Some("Alpha"), None),
            book(Some("beta"), None),
        ];

        let asc = sort_records(&records, SortKey::TitleAsc);
        assert_eq!(titles(&asc), vec!["Alpha", "beta", "zeta"]);

        let desc = sort_records(&records, SortKey::TitleDesc);
        assert_eq!(titles(&desc), vec!["zeta", "beta", "Alpha"]);
    }

    #[test]
    fn test_accented_titles_sort_by_base_letter() {
        let records = vec![
            book(Some("Zebra"), None),
            book(Some("Éclair"), None),
            book(Some("apple"), None),
            book(Some("Ångström"), None),
        ];

        let asc = sort_records(&records, SortKey::TitleAsc);
        assert_eq!(titles(&asc), vec!["Ångström", "apple", "Éclair", "Zebra"]);

        let desc = sort_records(&records, SortKey::TitleDesc);
        assert_eq!(titles(&desc), vec!["Zebra", "Éclair", "apple", "Ångström"]);
    }

    #[test]
    fn test_accent_breaks_ties_before_case() {
        assert_eq!(compare_titles("resume", "résumé"), Ordering::Less);
        assert_eq!(compare_titles("Résumé", "resumes"), Ordering::Less);
        assert_eq!(compare_titles("Same", "same"), Ordering::Less);
        assert_eq!(compare_titles("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_missing_title_sorts_as_empty() {
        let records = vec![book(Some("Alpha"), None), book(None, None)];
        let asc = sort_records(&records, SortKey::TitleAsc);
        assert_eq!(asc[0].title, None);

        let desc = sort_records(&records, SortKey::TitleDesc);
        assert_eq!(desc[1].title, None);
    }

    #[test]
    fn test_date_sorting_with_missing_dates() {
        let records = vec![
            book(Some("undated"), None),
            book(Some("old"), Some("1999")),
            book(Some("garbled"), Some("not a date")),
            book(Some("new"), Some("2020-05-01")),
        ];

        let newest = sort_records(&records, SortKey::DateDesc);
        assert_eq!(titles(&newest), vec!["new", "old", "undated", "garbled"]);

        let oldest = sort_records(&records, SortKey::DateAsc);
        assert_eq!(titles(&oldest), vec!["undated", "garbled", "old", "new"]);
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let records = vec![
            BookBuilder::new().id("1").title("Same").build(),
            BookBuilder::new().id("2").title("same").build(),
            BookBuilder::new().id("3").title("Same").build(),
        ];

        let sorted = sort_records(&records, SortKey::TitleAsc);
        let ids: Vec<_> = sorted.iter().map(|b| b.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["1", "3", "2"]);

        let by_date = sort_records(&records, SortKey::DateDesc);
        assert_eq!(by_date, records);
    }

    #[test]
    fn test_sort_is_pure_and_deterministic() {
        let records = vec![book(Some("b"), Some("2001")), book(Some("a"), Some("2002"))];
        let snapshot = records.clone();

        for key in SortKey::ALL {
            let first = sort_records(&records, key);
            let second = sort_records(&records, key);
            assert_eq!(first, second);
            assert_eq!(records, snapshot);
        }
    }
}
