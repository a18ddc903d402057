use std::collections::BTreeMap;

use crate::models::CsvRow;

/// Split `pool` across holders proportionally to their balances.
///
/// Returns no rows when there is nothing to split (no holders or a zero total),
/// so a filter that rejects everybody yields an empty export instead of NaN shares.
pub fn proportional_shares(holders: &BTreeMap<String, f64>, total: f64, pool: f64) -> Vec<CsvRow> {
    if holders.is_empty() || total <= 0.0 || !total.is_finite() {
        return Vec::new();
    }

    holders
        .iter()
        .map(|(owner, amount)| CsvRow {
            owner: owner.clone(),
            value: amount / total * pool,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holders(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|(owner, amount)| (owner.to_string(), *amount))
            .collect()
    }

    #[test]
    fn test_shares_sum_to_pool() {
        let holders = holders(&[("A", 2000.0), ("B", 1500.0), ("C", 123_456.789)]);
        let total: f64 = holders.values().sum();

        let rows = proportional_shares(&holders, total, 20_000_000.0);
        let sum: f64 = rows.iter().map(|row| row.value).sum();

        assert_eq!(rows.len(), 3);
        assert!((sum - 20_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_shares_are_proportional() {
        let holders = holders(&[("A", 3000.0), ("B", 1000.0)]);
        let rows = proportional_shares(&holders, 4000.0, 100.0);

        assert_eq!(
            rows,
            vec![
                CsvRow {
                    owner: "A".to_string(),
                    value: 75.0
                },
                CsvRow {
                    owner: "B".to_string(),
                    value: 25.0
                },
            ]
        );
    }

    #[test]
    fn test_zero_total_yields_no_rows() {
        assert!(proportional_shares(&BTreeMap::new(), 0.0, 100.0).is_empty());

        let zero = holders(&[("A", 0.0)]);
        assert!(proportional_shares(&zero, 0.0, 100.0).is_empty());
    }
}
