//! Residue burial cross analysis: buried hydrogen bond changes and per-residue
//! net energy against depth.

use crate::analysis::AnalysisReport;
use crate::classify::ChangeType;
use crate::error::{PairdiffError, Result};
use crate::filters::InteractionKind;
use crate::table::EnergyTable;
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// A hydrogen bond change with at least one partner buried below the depth threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct BuriedBond {
    /// Hydrogen bond class.
    pub kind: InteractionKind,
    /// Change type the bond was classified as.
    pub change: ChangeType,
    /// Position of the first partner.
    pub resi1: i64,
    /// Position of the second partner.
    pub resi2: i64,
    /// `total` score of the pair.
    pub total: f64,
    /// Depth of the deeper partner.
    pub depth: f64,
}

fn depth_of(depth: &BTreeMap<i64, f64>, position: i64) -> Result<f64> {
    depth
        .get(&position)
        .copied()
        .ok_or(PairdiffError::MissingDepth(position))
}

/// Hydrogen bonds lost (`unsatisfied`, change types C and D) or gained (E and F)
/// where either residue is deeper than `threshold`.
///
/// Results follow the hydrogen bond class order, then the change type order.
pub fn buried_hbonds(
    report: &AnalysisReport,
    depth: &BTreeMap<i64, f64>,
    threshold: f64,
    unsatisfied: bool,
) -> Result<Vec<BuriedBond>> {
    let changes = match unsatisfied {
        true => [ChangeType::C, ChangeType::D],
        false => [ChangeType::E, ChangeType::F],
    };

    let mut buried = Vec::new();
    for kind in InteractionKind::HYDROGEN_BONDS {
        for change in changes {
            let table = report.get(kind).get(change);
            for row in table.rows() {
                let deeper = depth_of(depth, row.resi1)?.max(depth_of(depth, row.resi2)?);
                if deeper > threshold {
                    buried.push(BuriedBond {
                        kind,
                        change,
                        resi1: row.resi1,
                        resi2: row.resi2,
                        total: table.total(row),
                        depth: deeper,
                    });
                }
            }
        }
    }
    debug!(
        "Found {} buried {} hydrogen bond(s) deeper than {threshold}",
        buried.len(),
        if unsatisfied { "lost" } else { "gained" }
    );
    Ok(buried)
}

/// Columns `interaction`, `change`, `resi1`, `resi2`, `total` and `depth`.
pub fn buried_to_df(bonds: &[BuriedBond]) -> Result<DataFrame> {
    Ok(df!(
        "interaction" => bonds.iter().map(|b| b.kind.key()).collect::<Vec<&str>>(),
        "change" => bonds.iter().map(|b| b.change.to_string()).collect::<Vec<String>>(),
        "resi1" => bonds.iter().map(|b| b.resi1).collect::<Vec<i64>>(),
        "resi2" => bonds.iter().map(|b| b.resi2).collect::<Vec<i64>>(),
        "total" => bonds.iter().map(|b| b.total).collect::<Vec<f64>>(),
        "depth" => bonds.iter().map(|b| b.depth).collect::<Vec<f64>>(),
    )?)
}

/// Depth and net interaction energy of every residue in `depth`.
///
/// The net energy of a residue is the sum of `total` over the rows of `table`
/// it takes part in, 0 for residues without interactions. Columns `resi`,
/// `depth` and `net_energy`, ordered by position.
pub fn residue_depth_df(table: &EnergyTable, depth: &BTreeMap<i64, f64>) -> Result<DataFrame> {
    let net = table.residue_net_energy();
    if let Some(resi) = net.keys().find(|resi| !depth.contains_key(resi)) {
        return Err(PairdiffError::MissingDepth(*resi));
    }
    Ok(df!(
        "resi" => depth.keys().copied().collect::<Vec<i64>>(),
        "depth" => depth.values().copied().collect::<Vec<f64>>(),
        "net_energy" => depth
            .keys()
            .map(|resi| net.get(resi).copied().unwrap_or(0.0))
            .collect::<Vec<f64>>(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, AnalysisInput};
    use crate::progress::ProgressReporter;
    use crate::utils::{load_depth, load_energy_table, load_mutations};
    use std::path::{Path, PathBuf};

    fn test_data(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data").join(name)
    }

    fn report() -> AnalysisReport {
        let input = AnalysisInput::new(
            load_energy_table(&test_data("energy_variant.csv"), "variant").unwrap(),
            load_energy_table(&test_data("energy_wild.csv"), "wild_type").unwrap(),
            load_mutations(&test_data("mutations.csv")).unwrap(),
        );
        analyze(&input, &ProgressReporter::new()).unwrap()
    }

    fn keys(bonds: &[BuriedBond]) -> Vec<(InteractionKind, ChangeType, i64, i64)> {
        bonds
            .iter()
            .map(|b| (b.kind, b.change, b.resi1, b.resi2))
            .collect()
    }

    #[test]
    fn lost_bonds_deeper_than_threshold() {
        let report = report();
        let depth = load_depth(&test_data("depth_wild.csv")).unwrap();

        let buried = buried_hbonds(&report, &depth, 3.5, true).unwrap();
        assert_eq!(
            keys(&buried),
            vec![(InteractionKind::HBondBbSc, ChangeType::D, 3, 4)]
        );
        assert!((buried[0].depth - 4.1).abs() < 1e-9);
        assert!((buried[0].total + 0.4).abs() < 1e-9);

        let shallow = buried_hbonds(&report, &depth, 2.0, true).unwrap();
        assert_eq!(
            keys(&shallow),
            vec![
                (InteractionKind::HBondBbSc, ChangeType::D, 3, 4),
                (InteractionKind::HBondBbBbLr, ChangeType::C, 2, 6),
            ]
        );
    }

    #[test]
    fn gained_bonds_use_e_and_f() {
        let report = report();
        let depth = load_depth(&test_data("depth_wild.csv")).unwrap();

        let buried = buried_hbonds(&report, &depth, 2.0, false).unwrap();
        assert_eq!(
            keys(&buried),
            vec![(InteractionKind::HBondBbSc, ChangeType::F, 3, 6)]
        );
        assert!(buried_hbonds(&report, &depth, 4.5, false).unwrap().is_empty());

        let df = buried_to_df(&buried).unwrap();
        assert_eq!(df.shape(), (1, 6));
    }

    #[test]
    fn net_energy_against_depth() {
        let wild = load_energy_table(&test_data("energy_wild.csv"), "wild_type").unwrap();
        let depth = load_depth(&test_data("depth_wild.csv")).unwrap();
        let df = residue_depth_df(&wild, &depth).unwrap();
        assert_eq!(df.shape(), (6, 3));

        let net: Vec<f64> = df
            .column("net_energy")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        // (1,2) -1.1; (2,6) 1.3; (3,4) -0.4; (4,5) -2.5
        let expected = [-1.1, 0.2, -0.4, -2.9, -2.5, 1.3];
        for (got, want) in net.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{net:?}");
        }
        let resi = df.column("resi").unwrap().i64().unwrap();
        assert_eq!(resi.get(5), Some(6));

        let partial = BTreeMap::from([(1, 1.0), (2, 2.0)]);
        assert!(matches!(
            residue_depth_df(&wild, &partial),
            Err(PairdiffError::MissingDepth(3))
        ));
    }

    #[test]
    fn missing_depth_is_an_error() {
        let depth = BTreeMap::from([(1, 1.0), (2, 1.0), (3, 1.0), (4, 1.0)]);
        let err = buried_hbonds(&report(), &depth, 0.5, true).unwrap_err();
        assert!(matches!(err, PairdiffError::MissingDepth(6)));
    }
}
