//! Mutated residue positions between a wild-type and a variant structure.

use crate::error::{PairdiffError, Result};
use crate::residues::ChainExt;
use crate::table::positions;
use pdbtbx::*;
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// A single point mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// 1-based residue position.
    pub position: i64,
    /// One-letter code in the wild-type, if known.
    pub wild: Option<String>,
    /// One-letter code in the variant, if known.
    pub variant: Option<String>,
}

/// Mutated positions, ordered by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationSet {
    mutations: BTreeMap<i64, Mutation>,
}

impl MutationSet {
    /// Collect mutations keyed by position; a later duplicate position replaces an earlier one.
    pub fn new(mutations: impl IntoIterator<Item = Mutation>) -> Self {
        Self {
            mutations: mutations.into_iter().map(|m| (m.position, m)).collect(),
        }
    }

    /// A set with positions only, without residue identities.
    pub fn from_positions(positions: impl IntoIterator<Item = i64>) -> Self {
        Self::new(positions.into_iter().map(|position| Mutation {
            position,
            wild: None,
            variant: None,
        }))
    }

    /// Whether `position` is mutated.
    pub fn contains(&self, position: i64) -> bool {
        self.mutations.contains_key(&position)
    }

    /// Mutated positions in increasing order.
    pub fn positions(&self) -> impl Iterator<Item = i64> + '_ {
        self.mutations.keys().copied()
    }

    /// Mutations in increasing position order.
    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.mutations.values()
    }

    /// Number of mutated positions.
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Whether no position is mutated.
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Read a mutation table with a `Position` column and optional `Mutated` and `Wild` columns.
    pub fn from_df(df: &DataFrame) -> Result<Self> {
        let column = df
            .column("Position")
            .map_err(|_| PairdiffError::MissingColumn {
                table: "mutations".to_string(),
                column: "Position".to_string(),
            })?;
        let positions = positions(column, "mutations", "Position")?;
        let optional = |name: &str| -> Result<Option<Vec<Option<String>>>> {
            match df.column(name) {
                Ok(c) => Ok(Some(
                    c.cast(&DataType::String)?
                        .str()?
                        .into_iter()
                        .map(|v| v.map(|s| s.trim().to_string()))
                        .collect(),
                )),
                Err(_) => Ok(None),
            }
        };
        let variant = optional("Mutated")?;
        let wild = optional("Wild")?;

        let mutations = positions
            .into_iter()
            .enumerate()
            .map(|(i, position)| Mutation {
                position,
                wild: wild.as_ref().and_then(|w| w[i].clone()),
                variant: variant.as_ref().and_then(|v| v[i].clone()),
            });
        Ok(Self::new(mutations))
    }

    /// Columns `Position`, `Mutated` and `Wild`, sorted by position.
    pub fn to_df(&self) -> Result<DataFrame> {
        Ok(df!(
            "Position" => self.iter().map(|m| m.position).collect::<Vec<i64>>(),
            "Mutated" => self.iter().map(|m| m.variant.clone()).collect::<Vec<Option<String>>>(),
            "Wild" => self.iter().map(|m| m.wild.clone()).collect::<Vec<Option<String>>>(),
        )?)
    }
}

/// One-letter sequence of the first model, all chains concatenated in file order.
pub fn structure_sequence(pdb: &PDB) -> Vec<String> {
    pdb.model(0)
        .map(|model| {
            model
                .chains()
                .flat_map(|chain| chain.pdb_seq())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Compare the sequences of two structures position by position.
///
/// Positions are counted from 1 over the concatenated sequence, matching
/// structures whose residues were renumbered to start at 1.
pub fn find_mutations(wild_type: &PDB, variant: &PDB) -> Result<MutationSet> {
    let wild_seq = structure_sequence(wild_type);
    let variant_seq = structure_sequence(variant);
    if wild_seq.len() != variant_seq.len() {
        return Err(PairdiffError::SequenceLengthMismatch {
            wild_type: wild_seq.len(),
            variant: variant_seq.len(),
        });
    }

    let mutations = MutationSet::new(
        wild_seq
            .into_iter()
            .zip(variant_seq)
            .zip(1i64..)
            .filter(|((w, v), _)| w != v)
            .map(|((w, v), position)| Mutation {
                position,
                wild: Some(w),
                variant: Some(v),
            }),
    );
    debug!(
        "Found {} mutated position(s): {:?}",
        mutations.len(),
        mutations.positions().collect::<Vec<_>>()
    );
    Ok(mutations)
}
