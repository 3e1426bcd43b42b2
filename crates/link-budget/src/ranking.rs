//! Loss contributor ranking for explainability

use crate::{BudgetError, LinkInput, Result};

/// Number of contributors reported per link
pub const TOP_N: usize = 3;

/// A named loss term
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contributor {
    pub name: &'static str,
    pub magnitude_db: f64,
}

impl Contributor {
    pub const fn new(name: &'static str, magnitude_db: f64) -> Self {
        Self { name, magnitude_db }
    }
}

/// The five ranked terms of a link in canonical order.
///
/// The per-unit splice loss is listed on its own next to the splice total.
pub fn link_contributors(link: &LinkInput) -> [Contributor; 5] {
    [
        Contributor::new("fiber_loss_db", link.fiber_loss_db()),
        Contributor::new("connector_total_db", link.connector_total_db()),
        Contributor::new("splice_total_db", link.splice_total_db()),
        Contributor::new("splitter_loss_db", link.splitter_loss_db),
        Contributor::new("splice_loss_db", link.splice_loss_db),
    ]
}

/// Names of the three largest contributors, largest first.
///
/// Ties keep the input order, so earlier canonical terms win.
pub fn rank_contributors(contributors: &[Contributor]) -> Result<[&'static str; TOP_N]> {
    if contributors.len() < TOP_N {
        return Err(BudgetError::InsufficientData {
            need: TOP_N,
            have: contributors.len(),
        });
    }

    let mut sorted = contributors.to_vec();
    // `sort_by` is stable
    sorted.sort_by(|a, b| b.magnitude_db.total_cmp(&a.magnitude_db));

    Ok([sorted[0].name, sorted[1].name, sorted[2].name])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(magnitudes: [f64; 5]) -> Vec<Contributor> {
        let names = [
            "fiber_loss_db",
            "connector_total_db",
            "splice_total_db",
            "splitter_loss_db",
            "splice_loss_db",
        ];
        names
            .iter()
            .zip(magnitudes)
            .map(|(name, m)| Contributor::new(*name, m))
            .collect()
    }

    #[test]
    fn test_ties_keep_canonical_order() {
        let top = rank_contributors(&canonical([5.0, 5.0, 3.0, 1.0, 0.0])).unwrap();
        assert_eq!(top, ["fiber_loss_db", "connector_total_db", "splice_total_db"]);
    }

    #[test]
    fn test_splitter_dominates() {
        let top = rank_contributors(&canonical([3.5, 1.2, 0.2, 7.0, 0.1])).unwrap();
        assert_eq!(top, ["splitter_loss_db", "fiber_loss_db", "connector_total_db"]);
    }

    #[test]
    fn test_all_equal() {
        let top = rank_contributors(&canonical([0.0; 5])).unwrap();
        assert_eq!(top, ["fiber_loss_db", "connector_total_db", "splice_total_db"]);
    }

    #[test]
    fn test_unit_splice_loss_ranked_separately() {
        // Single splice: total and per-unit tie, total listed first
        let top = rank_contributors(&canonical([0.1, 0.0, 0.5, 0.0, 0.5])).unwrap();
        assert_eq!(top, ["splice_total_db", "splice_loss_db", "fiber_loss_db"]);
    }

    #[test]
    fn test_insufficient_contributors() {
        let err = rank_contributors(&canonical([1.0; 5])[..2]).unwrap_err();
        assert_eq!(err, BudgetError::InsufficientData { need: 3, have: 2 });
    }
}
