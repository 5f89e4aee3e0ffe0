//! Interaction filters over energy tables.
//!
//! Each filter returns a new table with the same schema holding the rows that
//! qualify as a given interaction type, in their original order.

use crate::table::{
    EnergyRow, EnergyTable, DSLF_FA13, HBOND_BB_SC, HBOND_LR_BB, HBOND_SC, HBOND_SR_BB,
};
use core::fmt;

/// The interaction subsets the change classifier is run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InteractionKind {
    /// Every interacting pair, unfiltered.
    All,
    /// Attractive side-chain hydrogen bonds between an acidic and a basic residue.
    SaltBridge,
    /// Cysteine pairs and pairs with an attractive disulfide term.
    Disulfide,
    /// Side-chain to side-chain hydrogen bonds.
    HBondScSc,
    /// Backbone to side-chain hydrogen bonds.
    HBondBbSc,
    /// Short-range backbone to backbone hydrogen bonds.
    HBondBbBbSr,
    /// Long-range backbone to backbone hydrogen bonds.
    HBondBbBbLr,
}

impl InteractionKind {
    /// All kinds, in report order.
    pub const ALL: [InteractionKind; 7] = [
        InteractionKind::All,
        InteractionKind::SaltBridge,
        InteractionKind::Disulfide,
        InteractionKind::HBondScSc,
        InteractionKind::HBondBbSc,
        InteractionKind::HBondBbBbSr,
        InteractionKind::HBondBbBbLr,
    ];

    /// The four hydrogen bond classes.
    pub const HYDROGEN_BONDS: [InteractionKind; 4] = [
        InteractionKind::HBondScSc,
        InteractionKind::HBondBbSc,
        InteractionKind::HBondBbBbSr,
        InteractionKind::HBondBbBbLr,
    ];

    /// Stable identifier used for column names and output files.
    pub fn key(&self) -> &'static str {
        match self {
            InteractionKind::All => "all_changes",
            InteractionKind::SaltBridge => "salt_changes",
            InteractionKind::Disulfide => "sulfide_changes",
            InteractionKind::HBondScSc => "hbonds_sc_sc",
            InteractionKind::HBondBbSc => "hbonds_bb_sc",
            InteractionKind::HBondBbBbSr => "hbonds_bb_bb_sr",
            InteractionKind::HBondBbBbLr => "hbonds_bb_bb_lr",
        }
    }

    /// Human readable name.
    pub fn label(&self) -> &'static str {
        match self {
            InteractionKind::All => "All Interactions",
            InteractionKind::SaltBridge => "Salt Bridges",
            InteractionKind::Disulfide => "Sulfide Bonds",
            InteractionKind::HBondScSc => "Hydrogen Bonds: Side-Chain to Side-Chain",
            InteractionKind::HBondBbSc => "Hydrogen Bonds: Side-Chain to Backbone",
            InteractionKind::HBondBbBbSr => "Hydrogen Bonds: Backbone to Backbone Short Range",
            InteractionKind::HBondBbBbLr => "Hydrogen Bonds: Backbone to Backbone Long Range",
        }
    }

    /// Subset `table` to the rows of this interaction kind.
    ///
    /// Hydrogen bond classes are computed independently, so a row may land in several.
    pub fn apply(&self, table: &EnergyTable) -> EnergyTable {
        match self {
            InteractionKind::All => table.clone(),
            InteractionKind::SaltBridge => salt_bridges(table),
            InteractionKind::Disulfide => sulfide_bonds(table),
            InteractionKind::HBondScSc => table.filter(negative_term(table, HBOND_SC)),
            InteractionKind::HBondBbSc => table.filter(negative_term(table, HBOND_BB_SC)),
            InteractionKind::HBondBbBbSr => table.filter(negative_term(table, HBOND_SR_BB)),
            InteractionKind::HBondBbBbLr => table.filter(negative_term(table, HBOND_LR_BB)),
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Predicate for rows where `term` is attractive. Tables without the term match nothing.
fn negative_term(table: &EnergyTable, term: &str) -> impl Fn(&EnergyRow) -> bool {
    let index = table.term_index(term);
    move |row| index.is_some_and(|i| row.terms.get(i).is_some_and(|v| *v < 0.0))
}

fn is_acidic(restype: &str) -> bool {
    matches!(restype, "ASP" | "GLU")
}

fn is_basic(restype: &str) -> bool {
    matches!(restype, "ARG" | "HIS" | "LYS")
}

/// Salt bridges: an attractive side-chain hydrogen bond term between an
/// acidic and a basic residue, in either order.
pub fn salt_bridges(table: &EnergyTable) -> EnergyTable {
    let hbond = negative_term(table, HBOND_SC);
    table.filter(|row| {
        let (r1, r2) = (row.restype1.as_str(), row.restype2.as_str());
        hbond(row) && ((is_acidic(r1) && is_basic(r2)) || (is_basic(r1) && is_acidic(r2)))
    })
}

/// Disulfide bonds: a cysteine pair, or any pair with an attractive disulfide term.
pub fn sulfide_bonds(table: &EnergyTable) -> EnergyTable {
    let dslf = negative_term(table, DSLF_FA13);
    table.filter(|row| (row.restype1 == "CYS" && row.restype2 == "CYS") || dslf(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::{row, table};
    use crate::table::TOTAL;

    #[test]
    fn salt_bridge_needs_attractive_hbond_and_charged_pair() {
        let t = table(
            "variant",
            vec![
                row(1, "ASP", 2, "ARG", &[(HBOND_SC, -1.5)]),
                row(3, "ASP", 4, "ARG", &[(HBOND_SC, 1.5)]),
                row(5, "ALA", 6, "ARG", &[(HBOND_SC, -1.5)]),
                row(7, "LYS", 8, "GLU", &[(HBOND_SC, -0.2)]),
                row(9, "ASP", 10, "GLU", &[(HBOND_SC, -2.0)]),
            ],
        );
        let salt = salt_bridges(&t);
        let keys: Vec<(i64, i64)> = salt.rows().iter().map(|r| (r.resi1, r.resi2)).collect();
        assert_eq!(keys, vec![(1, 2), (7, 8)]);
        assert_eq!(salt.term_names(), t.term_names());
    }

    #[test]
    fn disulfide_by_residue_type_or_energy() {
        let t = table(
            "variant",
            vec![
                row(1, "CYS", 2, "CYS", &[(DSLF_FA13, 0.0)]),
                row(3, "ALA", 4, "ALA", &[(DSLF_FA13, -2.0)]),
                row(5, "CYS", 6, "ALA", &[(DSLF_FA13, 0.5)]),
            ],
        );
        let ss = sulfide_bonds(&t);
        let keys: Vec<(i64, i64)> = ss.rows().iter().map(|r| (r.resi1, r.resi2)).collect();
        assert_eq!(keys, vec![(1, 2), (3, 4)]);
    }

    #[test]
    fn hydrogen_bond_classes_overlap() {
        let t = table(
            "wild_type",
            vec![
                row(1, "SER", 2, "THR", &[(HBOND_SC, -0.5), (HBOND_BB_SC, -0.3)]),
                row(3, "GLY", 4, "GLY", &[(HBOND_SR_BB, -1.0)]),
                row(5, "GLY", 40, "GLY", &[(HBOND_LR_BB, -1.1), (TOTAL, -1.1)]),
                row(6, "ALA", 7, "ALA", &[(TOTAL, -3.0)]),
            ],
        );
        let [sc_sc, bb_sc, bb_bb_sr, bb_bb_lr] =
            InteractionKind::HYDROGEN_BONDS.map(|k| k.apply(&t));
        assert_eq!(sc_sc.len(), 1);
        assert_eq!(bb_sc.len(), 1);
        assert_eq!(sc_sc.rows()[0], bb_sc.rows()[0]);
        assert_eq!(bb_bb_sr.rows()[0].resi1, 3);
        assert_eq!(bb_bb_lr.rows()[0].resi2, 40);
    }

    #[test]
    fn empty_tables_filter_to_empty() {
        let t = table("variant", vec![]);
        for kind in InteractionKind::ALL {
            assert!(kind.apply(&t).is_empty(), "{kind} should be empty");
        }
    }

    #[test]
    fn kinds_have_distinct_keys() {
        let keys: std::collections::HashSet<&str> =
            InteractionKind::ALL.iter().map(|k| k.key()).collect();
        assert_eq!(keys.len(), 7);
        assert_eq!(InteractionKind::All.apply(&table("v", vec![])).name(), "v");
    }
}
