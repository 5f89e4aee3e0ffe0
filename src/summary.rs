//! Summary statistics of interaction change classifications.

use crate::classify::{ChangeType, Classification};
use crate::error::Result;
use crate::filters::InteractionKind;
use crate::table::EnergyTable;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Statistics computed for every change type of every classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    /// Number of rows.
    Changes,
    /// Sum of the `total` term, rounded to 4 decimals.
    Sum,
    /// Rows with `total >= 1`.
    EnergyAbove,
    /// Rows with `total <= -1`.
    EnergyBelow,
}

impl Metric {
    /// All metrics in row order.
    pub const ALL: [Metric; 4] = [
        Metric::Changes,
        Metric::Sum,
        Metric::EnergyAbove,
        Metric::EnergyBelow,
    ];

    /// Row label of the metric.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Changes => "Changes",
            Metric::Sum => "Sum",
            Metric::EnergyAbove => "Energy > 1",
            Metric::EnergyBelow => "Energy < -1",
        }
    }

    /// Evaluate the metric on one change-type table. Empty tables give 0.
    pub fn compute(&self, table: &EnergyTable) -> f64 {
        let totals = table.rows().iter().map(|r| table.total(r));
        match self {
            Metric::Changes => table.len() as f64,
            Metric::Sum => round4(totals.sum()),
            Metric::EnergyAbove => totals.filter(|t| *t >= 1.0).count() as f64,
            Metric::EnergyBelow => totals.filter(|t| *t <= -1.0).count() as f64,
        }
    }
}

fn round4(x: f64) -> f64 {
    (x * 1e4).round() / 1e4
}

/// Row label of a filtered classification in the overview table.
fn overview_label(kind: InteractionKind) -> &'static str {
    match kind {
        InteractionKind::All => "All Interactions",
        InteractionKind::SaltBridge => "Salt Bridge",
        InteractionKind::Disulfide => "Sulfide Bonds",
        InteractionKind::HBondScSc => "SC-SC HBonds",
        InteractionKind::HBondBbSc => "BB-SC HBonds",
        InteractionKind::HBondBbBbSr => "BB-BB-SR HBonds",
        InteractionKind::HBondBbBbLr => "BB-BB-LR HBonds",
    }
}

/// Every (metric, classification, change type) value of an analysis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryTable {
    values: BTreeMap<(Metric, InteractionKind, ChangeType), f64>,
}

impl SummaryTable {
    /// The value of `metric` for change type `change` of classification `kind`,
    /// or `None` if that classification was not summarized.
    pub fn get(&self, metric: Metric, kind: InteractionKind, change: ChangeType) -> Option<f64> {
        self.values.get(&(metric, kind, change)).copied()
    }

    /// Summarized classifications, in report order.
    pub fn kinds(&self) -> Vec<InteractionKind> {
        let mut kinds: Vec<InteractionKind> = self.values.keys().map(|(_, k, _)| *k).collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    /// One row per metric, one `<classification>_<change type>` column per pair.
    pub fn to_df(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = vec![Series::new(
            "metric".into(),
            Metric::ALL.iter().map(|m| m.label()).collect::<Vec<&str>>(),
        )
        .into()];
        for kind in self.kinds() {
            for change in ChangeType::ALL {
                let values: Vec<f64> = Metric::ALL
                    .iter()
                    .map(|m| self.get(*m, kind, change).unwrap_or(0.0))
                    .collect();
                let name = format!("{}_{}", kind.key(), change.key());
                columns.push(Series::new(name.into(), values).into());
            }
        }
        Ok(DataFrame::new(columns)?)
    }

    /// The condensed overview: all four metrics of the unfiltered
    /// classification followed by the change counts of each filtered one,
    /// with one column per change type.
    pub fn overview_df(&self) -> Result<DataFrame> {
        let mut rows: Vec<(&str, Metric, InteractionKind)> = Metric::ALL
            .iter()
            .map(|m| (m.label(), *m, InteractionKind::All))
            .collect();
        rows.extend(
            InteractionKind::ALL
                .iter()
                .skip(1)
                .map(|k| (overview_label(*k), Metric::Changes, *k)),
        );

        let mut columns: Vec<Column> = vec![Series::new(
            "summary".into(),
            rows.iter().map(|(label, _, _)| *label).collect::<Vec<&str>>(),
        )
        .into()];
        for change in ChangeType::ALL {
            let values: Vec<f64> = rows
                .iter()
                .map(|(_, metric, kind)| self.get(*metric, *kind, change).unwrap_or(0.0))
                .collect();
            columns.push(Series::new(change.to_string().into(), values).into());
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Reduce every classification to its per-change-type metrics.
pub fn summarize(results: &BTreeMap<InteractionKind, Classification>) -> SummaryTable {
    let mut values = BTreeMap::new();
    for (kind, classification) in results {
        for (change, table) in classification.iter() {
            for metric in Metric::ALL {
                values.insert((metric, *kind, change), metric.compute(table));
            }
        }
    }
    SummaryTable { values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::mutations::MutationSet;
    use crate::table::tests::{row, table};
    use crate::table::TOTAL;

    fn results() -> BTreeMap<InteractionKind, Classification> {
        let variant = table(
            "variant",
            vec![
                row(1, "ALA", 2, "GLY", &[(TOTAL, 5.0)]),
                row(3, "LYS", 4, "ASP", &[(TOTAL, -2.0)]),
                row(6, "SER", 7, "SER", &[(TOTAL, 0.25)]),
            ],
        );
        let wild = table(
            "wild_type",
            vec![
                row(1, "ALA", 2, "GLY", &[(TOTAL, 3.0)]),
                row(5, "SER", 6, "THR", &[(TOTAL, 1.0)]),
                row(3, "LYS", 8, "ILE", &[(TOTAL, -1.23456)]),
            ],
        );
        let classification = classify(&variant, &wild, &MutationSet::from_positions([3])).unwrap();
        BTreeMap::from([(InteractionKind::All, classification)])
    }

    #[test]
    fn metrics_per_change_type() {
        let summary = summarize(&results());
        let all = InteractionKind::All;

        assert_eq!(summary.get(Metric::Changes, all, ChangeType::A), Some(1.0));
        assert_eq!(summary.get(Metric::Sum, all, ChangeType::A), Some(2.0));
        assert_eq!(summary.get(Metric::EnergyAbove, all, ChangeType::A), Some(1.0));
        assert_eq!(summary.get(Metric::Sum, all, ChangeType::D), Some(-1.2346));
        assert_eq!(summary.get(Metric::EnergyBelow, all, ChangeType::D), Some(1.0));
        assert_eq!(summary.get(Metric::Changes, all, ChangeType::E), Some(1.0));
        assert_eq!(summary.get(Metric::EnergyAbove, all, ChangeType::E), Some(0.0));
        assert_eq!(summary.get(Metric::Changes, all, ChangeType::B), Some(0.0));
        assert_eq!(summary.get(Metric::Sum, all, ChangeType::B), Some(0.0));
        assert_eq!(summary.get(Metric::Changes, InteractionKind::SaltBridge, ChangeType::A), None);
    }

    #[test]
    fn sum_row_matches_hand_computed_totals() {
        let summary = summarize(&results());
        let total: f64 = ChangeType::ALL
            .iter()
            .map(|c| summary.get(Metric::Sum, InteractionKind::All, *c).unwrap())
            .sum();
        // A: 5 - 3, C: 1, D: -1.23456, E: 0.25, F: -2
        let expected = 2.0 + 1.0 - 1.2346 + 0.25 - 2.0;
        assert!((total - expected).abs() < 1e-9, "{total} != {expected}");
    }

    #[test]
    fn flattened_table_has_one_row_per_metric() {
        let df = summarize(&results()).to_df().unwrap();
        assert_eq!(df.height(), 4);
        assert_eq!(df.width(), 1 + 6);
        let a = df.column("all_changes_a").unwrap().f64().unwrap();
        assert_eq!(a.get(0), Some(1.0));
        assert_eq!(a.get(1), Some(2.0));
    }

    #[test]
    fn overview_lists_filtered_counts() {
        let df = summarize(&results()).overview_df().unwrap();
        assert_eq!(df.height(), 10);
        assert_eq!(df.width(), 7);
        let labels: Vec<&str> = df
            .column("summary")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(labels[1], "Sum");
        assert_eq!(labels[4], "Salt Bridge");
        let f = df.column("F").unwrap().f64().unwrap();
        assert_eq!(f.get(0), Some(1.0));
        assert_eq!(f.get(9), Some(0.0));
    }
}
