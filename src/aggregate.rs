//! Per-president counting for a day threshold.

use crate::loader::Dataset;
use crate::model::{ExecutiveOrderRecord, PresidentCount};
use std::cmp::Ordering;
use std::collections::HashMap;
use time::Date;

/// Count orders per president whose day offset is within `threshold`.
///
/// Every known president is present (zero-filled), sorted by term start with the
/// most recent administration first. Unknown term starts sort last; ties fall back
/// to the president name.
pub fn aggregate(dataset: &Dataset, threshold: i64) -> Vec<PresidentCount> {
    let mut by_president: HashMap<&str, usize> = HashMap::new();
    for rec in &dataset.records {
        if within(rec, threshold) {
            *by_president.entry(rec.president.as_str()).or_insert(0) += 1;
        }
    }

    let mut counts: Vec<PresidentCount> = dataset
        .presidents
        .iter()
        .map(|p| PresidentCount {
            president: p.name.clone(),
            count: by_president.get(p.name.as_str()).copied().unwrap_or(0),
            term_start_date: p.term_start_date,
        })
        .collect();

    counts.sort_by(|a, b| {
        cmp_term_start_desc(a.term_start_date, b.term_start_date)
            .then_with(|| a.president.cmp(&b.president))
    });
    counts
}

/// Whether a record falls in the first `threshold` days of its term.
/// Offsets before the term start are negative and always inside; records
/// without a computable offset never are.
pub fn within(rec: &ExecutiveOrderRecord, threshold: i64) -> bool {
    matches!(rec.day_offset(), Some(offset) if offset <= threshold)
}

fn cmp_term_start_desc(a: Option<Date>, b: Option<Date>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Days elapsed in the current term as of `today`, never negative.
pub fn final_days(term_start: Date, today: Date) -> u32 {
    let days = (today - term_start).whole_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

pub fn max_count(counts: &[PresidentCount]) -> usize {
    counts.iter().map(|c| c.count).max().unwrap_or(0)
}

/// One president's orders within the window, highest order number first.
pub fn orders_within(
    dataset: &Dataset,
    president: &str,
    threshold: i64,
) -> Vec<ExecutiveOrderRecord> {
    let mut orders: Vec<ExecutiveOrderRecord> = dataset
        .records
        .iter()
        .filter(|r| r.president == president && within(r, threshold))
        .cloned()
        .collect();
    orders.sort_by(|a, b| match (a.order_number_value(), b.order_number_value()) {
        (Some(x), Some(y)) => y.cmp(&x),
        _ => b.order_number.cmp(&a.order_number),
    });
    orders
}

/// Most recently signed in-window order for a president, used by the detail panel.
pub fn latest_order(
    dataset: &Dataset,
    president: &str,
    threshold: i64,
) -> Option<ExecutiveOrderRecord> {
    dataset
        .records
        .iter()
        .filter(|r| r.president == president && within(r, threshold))
        .max_by(|a, b| {
            a.day_offset()
                .cmp(&b.day_offset())
                .then_with(|| a.order_number_value().cmp(&b.order_number_value()))
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{build_dataset, CurrentTermDefaults};
    use crate::model::Party;
    use time::macros::date;

    fn defaults() -> CurrentTermDefaults {
        CurrentTermDefaults {
            president: "Donald Trump 2nd".into(),
            party: Party::Republican,
            term_start: date!(2025 - 01 - 20),
        }
    }

    // 5 current-term orders: days 0, 0, 3, 30, 31.
    const CURRENT: &str = r#"{"results": [
        {"title": "c1", "executive_order_number": 14148, "signing_date": "2025-01-20"},
        {"title": "c2", "executive_order_number": 14149, "signing_date": "2025-01-20"},
        {"title": "c3", "executive_order_number": 14150, "signing_date": "2025-01-23"},
        {"title": "c4", "executive_order_number": 14151, "signing_date": "2025-02-19"},
        {"title": "c5", "executive_order_number": 14152, "signing_date": "2025-02-20"}
    ]}"#;

    // 12 historical orders across 3 presidents.
    // Biden (start 2021-01-20): days 0, 1, 29, 30, 45 -> 4 within 30.
    // Trump 1st (start 2017-01-20): days 0, 5, 31, 60 -> 2 within 30.
    // Obama (start 2009-01-20): days 2, 10, 100 -> 2 within 30.
    const HISTORICAL: &str = r#"[
        {"title": "b1", "executive_order_number": 13985, "signing_date": "2021-01-20", "president": "Joe Biden", "party": "Democratic", "start_date": "2021-01-20"},
        {"title": "b2", "executive_order_number": 13986, "signing_date": "2021-01-21", "president": "Joe Biden", "party": "Democratic", "start_date": "2021-01-20"},
        {"title": "b3", "executive_order_number": 13987, "signing_date": "2021-02-18", "president": "Joe Biden", "party": "Democratic", "start_date": "2021-01-20"},
        {"title": "b4", "executive_order_number": 13988, "signing_date": "2021-02-19", "president": "Joe Biden", "party": "Democratic", "start_date": "2021-01-20"},
        {"title": "b5", "executive_order_number": 13989, "signing_date": "2021-03-06", "president": "Joe Biden", "party": "Democratic", "start_date": "2021-01-20"},
        {"title": "t1", "executive_order_number": 13765, "signing_date": "2017-01-20", "president": "Donald Trump 1st", "party": "Republican", "start_date": "2017-01-20"},
        {"title": "t2", "executive_order_number": 13766, "signing_date": "2017-01-25", "president": "Donald Trump 1st", "party": "Republican", "start_date": "2017-01-20"},
        {"title": "t3", "executive_order_number": 13767, "signing_date": "2017-02-20", "president": "Donald Trump 1st", "party": "Republican", "start_date": "2017-01-20"},
        {"title": "t4", "executive_order_number": 13768, "signing_date": "2017-03-21", "president": "Donald Trump 1st", "party": "Republican", "start_date": "2017-01-20"},
        {"title": "o1", "executive_order_number": 13489, "signing_date": "2009-01-22", "president": "Barack Obama", "party": "Democratic", "start_date": "2009-01-20"},
        {"title": "o2", "executive_order_number": 13490, "signing_date": "2009-01-30", "president": "Barack Obama", "party": "Democratic", "start_date": "2009-01-20"},
        {"title": "o3", "executive_order_number": 13491, "signing_date": "2009-04-30", "president": "Barack Obama", "party": "Democratic", "start_date": "2009-01-20"}
    ]"#;

    fn dataset() -> Dataset {
        build_dataset(CURRENT, HISTORICAL, &defaults()).unwrap()
    }

    fn table(counts: &[PresidentCount]) -> Vec<(&str, usize)> {
        counts
            .iter()
            .map(|c| (c.president.as_str(), c.count))
            .collect()
    }

    #[test]
    fn matches_hand_computed_reference_at_thirty_days() {
        let counts = aggregate(&dataset(), 30);
        assert_eq!(
            table(&counts),
            vec![
                ("Donald Trump 2nd", 4),
                ("Joe Biden", 4),
                ("Donald Trump 1st", 2),
                ("Barack Obama", 2),
            ]
        );
    }

    #[test]
    fn every_president_present_for_every_threshold() {
        let ds = dataset();
        for t in [-5, 0, 1, 30, 100, 10_000] {
            let counts = aggregate(&ds, t);
            assert_eq!(counts.len(), 4, "threshold {t}");
            for p in &ds.presidents {
                assert!(counts.iter().any(|c| c.president == p.name));
            }
        }
        let before = aggregate(&ds, -1);
        assert!(before.iter().all(|c| c.count == 0));
    }

    #[test]
    fn counts_are_monotonic_in_threshold() {
        let ds = dataset();
        let mut prev = aggregate(&ds, -1);
        for t in 0..=120 {
            let next = aggregate(&ds, t);
            for (a, b) in prev.iter().zip(next.iter()) {
                assert_eq!(a.president, b.president);
                assert!(b.count >= a.count, "{} dropped at {t}", b.president);
            }
            prev = next;
        }
        assert_eq!(max_count(&prev), 5);
    }

    #[test]
    fn undated_records_are_excluded_but_president_stays() {
        let hist = r#"[
            {"title": "x", "executive_order_number": 1, "signing_date": "garbage",
             "president": "Undated", "party": "Whig", "start_date": "1841-03-04"},
            {"title": "y", "executive_order_number": 2, "signing_date": "1841-03-05",
             "president": "No Start", "party": "Whig", "start_date": "??"}
        ]"#;
        let ds = build_dataset(r#"{"results": []}"#, hist, &defaults()).unwrap();
        let counts = aggregate(&ds, i64::MAX);
        assert_eq!(ds.report.undated, 2);
        assert!(counts.iter().all(|c| c.count == 0));
        assert_eq!(counts.len(), 3);
        // Unknown term start sorts last.
        assert_eq!(counts.last().unwrap().president, "No Start");
    }

    #[test]
    fn orders_signed_before_term_start_count_from_day_zero() {
        let current = r#"{"results": [
            {"title": "early", "executive_order_number": 14147, "signing_date": "2025-01-19"},
            {"title": "first", "executive_order_number": 14148, "signing_date": "2025-01-20"}
        ]}"#;
        let ds = build_dataset(current, "[]", &defaults()).unwrap();
        assert_eq!(ds.records[0].day_offset(), Some(-1));

        assert_eq!(table(&aggregate(&ds, 0)), vec![("Donald Trump 2nd", 2)]);
        assert_eq!(table(&aggregate(&ds, -1)), vec![("Donald Trump 2nd", 1)]);
        assert_eq!(orders_within(&ds, "Donald Trump 2nd", 0).len(), 2);
    }

    #[test]
    fn final_days_never_negative() {
        assert_eq!(final_days(date!(2025 - 01 - 20), date!(2025 - 03 - 24)), 63);
        assert_eq!(final_days(date!(2025 - 01 - 20), date!(2025 - 01 - 20)), 0);
        assert_eq!(final_days(date!(2025 - 01 - 20), date!(2024 - 12 - 31)), 0);
    }

    #[test]
    fn orders_within_sorts_by_number_descending() {
        let orders = orders_within(&dataset(), "Donald Trump 2nd", 30);
        let numbers: Vec<&str> = orders.iter().map(|o| o.order_number.as_str()).collect();
        assert_eq!(numbers, vec!["14151", "14150", "14149", "14148"]);
    }

    #[test]
    fn latest_order_respects_window() {
        let ds = dataset();
        assert_eq!(latest_order(&ds, "Joe Biden", 30).unwrap().title, "b4");
        assert_eq!(latest_order(&ds, "Joe Biden", 0).unwrap().title, "b1");
        assert!(latest_order(&ds, "Barack Obama", 1).is_none());
    }

    #[test]
    fn max_count_of_empty_is_zero() {
        assert_eq!(max_count(&[]), 0);
    }
}
