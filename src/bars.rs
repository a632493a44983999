//! Bar projection shared by the TUI and text output.

use crate::aggregate::max_count;
use crate::model::PresidentCount;

/// One drawable row, keyed by president.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarRow {
    pub president: String,
    pub count: usize,
    /// Bar length in cells.
    pub width: u16,
}

/// Project counts onto bar widths proportional to `count / max`, in input order.
///
/// Widths are zero when every count is zero; any non-zero count gets at least one
/// cell so a single order stays visible.
pub fn bar_rows(counts: &[PresidentCount], max_width: u16) -> Vec<BarRow> {
    let max = max_count(counts);
    counts
        .iter()
        .map(|c| {
            let width = if max == 0 || max_width == 0 {
                0
            } else {
                let w = (c.count as f64 / max as f64 * f64::from(max_width)).round() as u16;
                if c.count > 0 {
                    w.max(1)
                } else {
                    0
                }
            };
            BarRow {
                president: c.president.clone(),
                count: c.count,
                width: width.min(max_width),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(values: &[(&str, usize)]) -> Vec<PresidentCount> {
        values
            .iter()
            .map(|(p, c)| PresidentCount {
                president: p.to_string(),
                count: *c,
                term_start_date: None,
            })
            .collect()
    }

    #[test]
    fn widths_are_proportional_to_max() {
        let rows = bar_rows(&counts(&[("a", 10), ("b", 5), ("c", 0)]), 40);
        let widths: Vec<u16> = rows.iter().map(|r| r.width).collect();
        assert_eq!(widths, vec![40, 20, 0]);
    }

    #[test]
    fn all_zero_counts_draw_nothing() {
        let rows = bar_rows(&counts(&[("a", 0), ("b", 0)]), 40);
        assert!(rows.iter().all(|r| r.width == 0));
    }

    #[test]
    fn small_nonzero_counts_stay_visible() {
        let rows = bar_rows(&counts(&[("a", 1000), ("b", 1)]), 20);
        assert_eq!(rows[1].width, 1);
    }

    #[test]
    fn projection_is_idempotent_and_keyed() {
        let input = counts(&[("a", 3), ("b", 7), ("c", 1)]);
        let first = bar_rows(&input, 33);
        let second = bar_rows(&input, 33);
        assert_eq!(first, second);
        let keys: Vec<&str> = first.iter().map(|r| r.president.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
