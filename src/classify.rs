//! Classification of pairwise interaction changes between two structures.
//!
//! Every residue pair of the variant and wild-type tables is routed to one of
//! six change types, depending on which structures the pair interacts in and
//! whether a mutated residue takes part:
//!
//! | Type | Wild-type | Variant | Mutated residue |
//! |------|-----------|---------|-----------------|
//! | A    | yes       | yes     | no              |
//! | B    | yes       | yes     | yes             |
//! | C    | yes       | no      | no              |
//! | D    | yes       | no      | yes             |
//! | E    | no        | yes     | no              |
//! | F    | no        | yes     | yes             |
//!
//! Rows of types A and B carry the energy difference (variant minus
//! wild-type) of every term, all other types carry the raw values of the
//! structure the pair was found in.

use crate::error::{PairdiffError, Result};
use crate::mutations::MutationSet;
use crate::table::{EnergyRow, EnergyTable, PairKey};
use core::fmt;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, warn};

/// The six interaction change types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeType {
    /// Kept, away from the mutations.
    A,
    /// Kept, at a mutated residue.
    B,
    /// Lost, away from the mutations.
    C,
    /// Lost at a mutated residue.
    D,
    /// Gained, away from the mutations.
    E,
    /// Gained at a mutated residue.
    F,
}

impl ChangeType {
    /// All change types in label order.
    pub const ALL: [ChangeType; 6] = [
        ChangeType::A,
        ChangeType::B,
        ChangeType::C,
        ChangeType::D,
        ChangeType::E,
        ChangeType::F,
    ];

    /// Route a pair by where it interacts and whether a mutated residue is involved.
    ///
    /// Pairs present in neither structure have no change type.
    pub fn route(in_wild_type: bool, in_variant: bool, mutated: bool) -> Option<Self> {
        match (in_wild_type, in_variant, mutated) {
            (true, true, false) => Some(ChangeType::A),
            (true, true, true) => Some(ChangeType::B),
            (true, false, false) => Some(ChangeType::C),
            (true, false, true) => Some(ChangeType::D),
            (false, true, false) => Some(ChangeType::E),
            (false, true, true) => Some(ChangeType::F),
            (false, false, _) => None,
        }
    }

    /// Lower-case bucket label, `a` to `f`.
    pub fn key(&self) -> &'static str {
        match self {
            ChangeType::A => "a",
            ChangeType::B => "b",
            ChangeType::C => "c",
            ChangeType::D => "d",
            ChangeType::E => "e",
            ChangeType::F => "f",
        }
    }

    /// Whether pairs of this type interact in the wild-type.
    pub fn in_wild_type(&self) -> bool {
        matches!(
            self,
            ChangeType::A | ChangeType::B | ChangeType::C | ChangeType::D
        )
    }

    /// Whether pairs of this type interact in the variant.
    pub fn in_variant(&self) -> bool {
        matches!(
            self,
            ChangeType::A | ChangeType::B | ChangeType::E | ChangeType::F
        )
    }

    /// Whether pairs of this type involve a mutated residue.
    pub fn involves_mutation(&self) -> bool {
        matches!(self, ChangeType::B | ChangeType::D | ChangeType::F)
    }

    /// Whether rows of this type hold variant minus wild-type differences.
    pub fn is_delta(&self) -> bool {
        self.in_wild_type() && self.in_variant()
    }

    /// One-line meaning of the change type.
    pub fn description(&self) -> &'static str {
        match self {
            ChangeType::A => "Interaction kept, energy changed by the surrounding mutations",
            ChangeType::B => "Interaction kept, energy changed at a mutated residue",
            ChangeType::C => "Interaction lost away from the mutated residues",
            ChangeType::D => "Interaction lost at a mutated residue",
            ChangeType::E => "Interaction gained away from the mutated residues",
            ChangeType::F => "Interaction gained at a mutated residue",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key().to_uppercase())
    }
}

/// The change type table: membership, mutation involvement and description
/// of every type, one row each.
pub fn change_types_df() -> Result<DataFrame> {
    let types = ChangeType::ALL;
    Ok(df!(
        "change" => types.iter().map(|c| c.to_string()).collect::<Vec<String>>(),
        "wild_type" => types.iter().map(|c| c.in_wild_type()).collect::<Vec<bool>>(),
        "variant" => types.iter().map(|c| c.in_variant()).collect::<Vec<bool>>(),
        "mutated" => types.iter().map(|c| c.involves_mutation()).collect::<Vec<bool>>(),
        "description" => types.iter().map(|c| c.description()).collect::<Vec<&str>>(),
    )?)
}

/// How to treat a wild-type table holding the same ordered pair more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Fail with [`PairdiffError::DuplicatePair`].
    #[default]
    Reject,
    /// Subtract the first wild-type row of the pair, like a linear scan would.
    FirstMatch,
}

/// The six change-type tables of one classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    tables: [EnergyTable; 6],
}

impl Classification {
    /// The table of one change type, possibly empty.
    pub fn get(&self, change: ChangeType) -> &EnergyTable {
        &self.tables[change.index()]
    }

    /// Change types with their tables, A to F.
    pub fn iter(&self) -> impl Iterator<Item = (ChangeType, &EnergyTable)> {
        ChangeType::ALL.into_iter().zip(self.tables.iter())
    }

    /// Number of rows per change type.
    pub fn counts(&self) -> [usize; 6] {
        self.tables.each_ref().map(|t| t.len())
    }

    /// Number of rows over all change types.
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.len()).sum()
    }
}

/// Classify the interaction changes from `wild_type` to `variant`.
///
/// Pairs are matched on the ordered `(resi1, resi2)` key: a pair stored as
/// `(2, 1)` in one table does not match `(1, 2)` in the other.
///
/// # Errors
///
/// * [`PairdiffError::SchemaMismatch`] if the tables have different energy terms.
/// * [`PairdiffError::DuplicatePair`] if the wild-type table holds a pair more
///   than once. The wild-type row to subtract would then depend on row order.
///   Use [`classify_with`] and [`DuplicatePolicy::FirstMatch`] to accept such tables.
pub fn classify(
    variant: &EnergyTable,
    wild_type: &EnergyTable,
    mutated: &MutationSet,
) -> Result<Classification> {
    classify_with(variant, wild_type, mutated, DuplicatePolicy::Reject)
}

/// [`classify`] with an explicit policy for duplicate wild-type pairs.
pub fn classify_with(
    variant: &EnergyTable,
    wild_type: &EnergyTable,
    mutated: &MutationSet,
    policy: DuplicatePolicy,
) -> Result<Classification> {
    if variant.term_names() != wild_type.term_names() {
        return Err(PairdiffError::SchemaMismatch {
            variant: variant.term_names().to_vec(),
            wild_type: wild_type.term_names().to_vec(),
        });
    }
    if let Some(pair) = wild_type.first_duplicate_pair() {
        match policy {
            DuplicatePolicy::Reject => {
                return Err(PairdiffError::DuplicatePair {
                    table: wild_type.name().to_string(),
                    pair,
                })
            }
            DuplicatePolicy::FirstMatch => {
                warn!(
                    "Pair {pair} occurs more than once in '{}', using its first row",
                    wild_type.name()
                )
            }
        }
    }

    let wild_index = wild_type.pair_index();
    let variant_keys: HashSet<PairKey> = variant.rows().iter().map(|r| r.key()).collect();
    let swapped = variant_keys
        .iter()
        .filter(|&key| !wild_index.contains_key(key) && wild_index.contains_key(&key.reversed()))
        .count();
    if swapped > 0 {
        debug!(
            "{swapped} pair(s) of '{}' only appear reversed in '{}'",
            variant.name(),
            wild_type.name()
        );
    }
    let is_mutated = |position: i64| mutated.contains(position);

    let mut buckets: [Vec<EnergyRow>; 6] = Default::default();
    for row in variant.rows() {
        let matched = wild_index.get(&row.key()).map(|&i| &wild_type.rows()[i]);
        let Some(change) = ChangeType::route(matched.is_some(), true, row.involves(is_mutated))
        else {
            continue;
        };
        let entry = match matched {
            Some(wild_row) => subtract_rows(row, wild_row),
            None => row.clone(),
        };
        buckets[change.index()].push(entry);
    }
    for row in wild_type.rows() {
        if variant_keys.contains(&row.key()) {
            continue;
        }
        if let Some(change) = ChangeType::route(true, false, row.involves(is_mutated)) {
            buckets[change.index()].push(row.clone());
        }
    }

    debug!(
        "Classified {} variant and {} wild-type rows of '{}' into {}",
        variant.len(),
        wild_type.len(),
        variant.name(),
        ChangeType::ALL
            .iter()
            .map(|c| format!("{c}={}", buckets[c.index()].len()))
            .collect::<Vec<_>>()
            .join(" ")
    );

    Ok(Classification {
        tables: buckets.map(|rows| variant.with_rows(rows)),
    })
}

/// Identifying columns of `variant`, energy terms of `variant - wild_type`.
fn subtract_rows(variant: &EnergyRow, wild_type: &EnergyRow) -> EnergyRow {
    EnergyRow {
        terms: variant
            .terms
            .iter()
            .zip(&wild_type.terms)
            .map(|(v, w)| v - w)
            .collect(),
        ..variant.clone()
    }
}
