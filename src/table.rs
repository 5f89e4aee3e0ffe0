//! Pairwise residue energy tables.
//!
//! An [`EnergyTable`] holds the per-residue-pair energy breakdown of a single
//! structure: the identifying columns of each residue pair plus an ordered set
//! of numeric energy terms, the last of which is usually the `total` score.

use crate::error::{PairdiffError, Result};
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Aggregate score of a residue pair.
pub const TOTAL: &str = "total";
/// Side-chain to side-chain hydrogen bond term.
pub const HBOND_SC: &str = "hbond_sc";
/// Backbone to side-chain hydrogen bond term.
pub const HBOND_BB_SC: &str = "hbond_bb_sc";
/// Short-range backbone to backbone hydrogen bond term.
pub const HBOND_SR_BB: &str = "hbond_sr_bb";
/// Long-range backbone to backbone hydrogen bond term.
pub const HBOND_LR_BB: &str = "hbond_lr_bb";
/// Disulfide geometry term.
pub const DSLF_FA13: &str = "dslf_fa13";

/// Energy terms every table must carry for the interaction filters to work.
pub const REQUIRED_TERMS: [&str; 6] = [
    HBOND_SC,
    HBOND_BB_SC,
    HBOND_SR_BB,
    HBOND_LR_BB,
    DSLF_FA13,
    TOTAL,
];

/// The score terms emitted by `residue_energy_breakdown` with the default score function.
pub const STANDARD_TERMS: [&str; 20] = [
    "fa_atr",
    "fa_rep",
    "fa_sol",
    "fa_intra_rep",
    "fa_intra_sol_xover4",
    "lk_ball_wtd",
    "fa_elec",
    "pro_close",
    HBOND_SR_BB,
    HBOND_LR_BB,
    HBOND_BB_SC,
    HBOND_SC,
    DSLF_FA13,
    "omega",
    "fa_dun",
    "p_aa_pp",
    "yhh_planarity",
    "ref",
    "rama_prepro",
    TOTAL,
];

/// Identifying (non-energy) columns, in output order.
pub const ID_COLUMNS: [&str; 6] = ["resi1", "pdbid1", "restype1", "resi2", "pdbid2", "restype2"];

/// Columns of the raw breakdown output that carry no information about the pair.
const IGNORED_COLUMNS: [&str; 3] = ["SCORE:", "pose_id", "description"];

/// Ordered residue-pair key.
///
/// The pair is matched in the orientation it was emitted in, so `(1, 2)` and
/// `(2, 1)` are different keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    /// Position of the first partner.
    pub resi1: i64,
    /// Position of the second partner.
    pub resi2: i64,
}

impl PairKey {
    /// Key of the pair `resi1`-`resi2` in this orientation.
    pub fn new(resi1: i64, resi2: i64) -> Self {
        Self { resi1, resi2 }
    }

    /// The same pair with the partners swapped.
    pub fn reversed(&self) -> Self {
        Self::new(self.resi2, self.resi1)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.resi1, self.resi2)
    }
}

/// One residue-pair interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyRow {
    /// Position of the first residue.
    pub resi1: i64,
    /// PDB numbering of the first residue, e.g. `12A`.
    pub pdbid1: String,
    /// Three-letter code of the first residue.
    pub restype1: String,
    /// Position of the second residue.
    pub resi2: i64,
    /// PDB numbering of the second residue.
    pub pdbid2: String,
    /// Three-letter code of the second residue.
    pub restype2: String,
    /// Energy term values, aligned with [`EnergyTable::term_names`].
    pub terms: Vec<f64>,
}

impl EnergyRow {
    /// The ordered pair key of this row.
    pub fn key(&self) -> PairKey {
        PairKey::new(self.resi1, self.resi2)
    }

    /// Whether either partner sits at one of the given positions.
    pub fn involves(&self, is_member: impl Fn(i64) -> bool) -> bool {
        is_member(self.resi1) || is_member(self.resi2)
    }
}

/// Ordered table of pairwise interaction energies for one structure.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyTable {
    name: String,
    term_names: Vec<String>,
    rows: Vec<EnergyRow>,
}

impl EnergyTable {
    /// Create a table, checking that every row carries one value per term.
    pub fn new(name: &str, term_names: Vec<String>, rows: Vec<EnergyRow>) -> Result<Self> {
        let table = Self {
            name: name.to_string(),
            term_names,
            rows,
        };
        match table.short_row() {
            Some(row) => Err(PairdiffError::RowWidth {
                table: table.name.clone(),
                pair: row.key(),
                expected: table.term_names.len(),
                found: row.terms.len(),
            }),
            None => Ok(table),
        }
    }

    /// A table holding `rows` under this table's name and schema.
    ///
    /// Callers pass rows derived from this table, so their widths already match.
    pub(crate) fn with_rows(&self, rows: Vec<EnergyRow>) -> Self {
        Self {
            name: self.name.clone(),
            term_names: self.term_names.clone(),
            rows,
        }
    }

    /// Label of the table, `variant` or `wild_type` when loaded from files.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Energy term names, in column order.
    pub fn term_names(&self) -> &[String] {
        &self.term_names
    }

    /// Rows in their original order.
    pub fn rows(&self) -> &[EnergyRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column index of `term` among the energy terms.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.term_names.iter().position(|t| t == term)
    }

    /// Value of `term` for `row`, or `None` if the table has no such term.
    pub fn value(&self, row: &EnergyRow, term: &str) -> Option<f64> {
        self.term_index(term).and_then(|i| row.terms.get(i).copied())
    }

    /// The `total` score of `row`, 0.0 when the table carries no total.
    pub fn total(&self, row: &EnergyRow) -> f64 {
        self.value(row, TOTAL).unwrap_or(0.0)
    }

    /// Check that every term the filters rely on is present.
    pub fn validate_schema(&self) -> Result<()> {
        for term in REQUIRED_TERMS {
            if self.term_index(term).is_none() {
                return Err(PairdiffError::MissingColumn {
                    table: self.name.clone(),
                    column: term.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Keep the rows matching `predicate`, preserving order and schema.
    pub fn filter(&self, predicate: impl Fn(&EnergyRow) -> bool) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect();
        self.with_rows(rows)
    }

    /// Index from pair key to the row where it first occurs.
    pub fn pair_index(&self) -> HashMap<PairKey, usize> {
        let mut index = HashMap::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            index.entry(row.key()).or_insert(i);
        }
        index
    }

    /// The first pair key that occurs in more than one row, if any.
    pub fn first_duplicate_pair(&self) -> Option<PairKey> {
        let mut seen = std::collections::HashSet::with_capacity(self.rows.len());
        self.rows
            .iter()
            .map(|r| r.key())
            .find(|key| !seen.insert(*key))
    }

    /// Sum of the `total` score over all rows.
    pub fn net_energy(&self) -> f64 {
        self.rows.iter().map(|r| self.total(r)).sum()
    }

    /// Sum of `total` over every pair each residue position takes part in.
    pub fn residue_net_energy(&self) -> BTreeMap<i64, f64> {
        let mut net = BTreeMap::new();
        for row in &self.rows {
            let total = self.total(row);
            *net.entry(row.resi1).or_insert(0.0) += total;
            if row.resi2 != row.resi1 {
                *net.entry(row.resi2).or_insert(0.0) += total;
            }
        }
        net
    }

    /// Build a table from a DataFrame whose missing-partner rows were already dropped.
    ///
    /// `resi1`, `resi2`, `restype1` and `restype2` are required, `pdbid1` and
    /// `pdbid2` are optional. Every other column is read as an energy term.
    pub fn from_df(df: &DataFrame, name: &str) -> Result<Self> {
        let column_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|c| c.to_string())
            .collect();
        let require = |column: &str| -> Result<&Column> {
            df.column(column).map_err(|_| PairdiffError::MissingColumn {
                table: name.to_string(),
                column: column.to_string(),
            })
        };

        let resi1 = positions(require("resi1")?, name, "resi1")?;
        let resi2 = positions(require("resi2")?, name, "resi2")?;
        let restype1 = strings(Some(require("restype1")?))?;
        let restype2 = strings(Some(require("restype2")?))?;
        let pdbid1 = strings(df.column("pdbid1").ok())?;
        let pdbid2 = strings(df.column("pdbid2").ok())?;

        let term_names: Vec<String> = column_names
            .into_iter()
            .filter(|c| !ID_COLUMNS.contains(&c.as_str()) && !IGNORED_COLUMNS.contains(&c.as_str()))
            .collect();
        let mut term_values = Vec::with_capacity(term_names.len());
        for term in &term_names {
            let values = df.column(term)?.cast(&DataType::Float64)?;
            let values = values
                .f64()?
                .into_iter()
                .collect::<Option<Vec<f64>>>()
                .ok_or_else(|| PairdiffError::InvalidTerm {
                    table: name.to_string(),
                    column: term.to_string(),
                })?;
            term_values.push(values);
        }

        let rows = (0..df.height())
            .map(|i| EnergyRow {
                resi1: resi1[i],
                pdbid1: pdbid1.get(i).cloned().unwrap_or_default(),
                restype1: restype1[i].clone(),
                resi2: resi2[i],
                pdbid2: pdbid2.get(i).cloned().unwrap_or_default(),
                restype2: restype2[i].clone(),
                terms: term_values.iter().map(|v| v[i]).collect(),
            })
            .collect();

        let table = Self::new(name, term_names, rows)?;
        table.validate_schema()?;
        Ok(table)
    }

    /// Convert the table into a DataFrame with the identifying columns first.
    ///
    /// # Errors
    ///
    /// [`PairdiffError::RowWidth`] if a row does not carry one value per term.
    pub fn to_df(&self) -> Result<DataFrame> {
        if let Some(row) = self.short_row() {
            return Err(PairdiffError::RowWidth {
                table: self.name.clone(),
                pair: row.key(),
                expected: self.term_names.len(),
                found: row.terms.len(),
            });
        }

        let rows = &self.rows;
        let ids = |f: fn(&EnergyRow) -> &str| -> Vec<String> {
            rows.iter().map(|r| f(r).to_string()).collect()
        };
        let mut columns: Vec<Column> = vec![
            Series::new("resi1".into(), rows.iter().map(|r| r.resi1).collect::<Vec<i64>>()).into(),
            Series::new("pdbid1".into(), ids(|r| &r.pdbid1)).into(),
            Series::new("restype1".into(), ids(|r| &r.restype1)).into(),
            Series::new("resi2".into(), rows.iter().map(|r| r.resi2).collect::<Vec<i64>>()).into(),
            Series::new("pdbid2".into(), ids(|r| &r.pdbid2)).into(),
            Series::new("restype2".into(), ids(|r| &r.restype2)).into(),
        ];
        for (i, term) in self.term_names.iter().enumerate() {
            let values: Vec<f64> = rows.iter().map(|r| r.terms[i]).collect();
            columns.push(Series::new(term.as_str().into(), values).into());
        }
        Ok(DataFrame::new(columns)?)
    }

    fn short_row(&self) -> Option<&EnergyRow> {
        self.rows
            .iter()
            .find(|r| r.terms.len() != self.term_names.len())
    }
}

/// Read a residue position column as integers, accepting integral floats and strings.
///
/// Nulls, fractions and anything unparseable are [`PairdiffError::InvalidPosition`].
pub(crate) fn positions(column: &Column, table: &str, name: &str) -> Result<Vec<i64>> {
    let as_str = column.cast(&DataType::String)?;
    as_str
        .str()?
        .into_iter()
        .map(|value| {
            let raw = value.unwrap_or("").trim();
            parse_position(raw).ok_or_else(|| PairdiffError::InvalidPosition {
                table: table.to_string(),
                column: name.to_string(),
                value: raw.to_string(),
            })
        })
        .collect()
}

pub(crate) fn parse_position(raw: &str) -> Option<i64> {
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Some(v as i64),
        _ => None,
    }
}

fn strings(column: Option<&Column>) -> Result<Vec<String>> {
    let Some(column) = column else {
        return Ok(Vec::new());
    };
    let as_str = column.cast(&DataType::String)?;
    Ok(as_str
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or("").trim().to_string())
        .collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a row carrying [`STANDARD_TERMS`] with the given overrides, all other terms zero.
    pub(crate) fn row(
        resi1: i64,
        restype1: &str,
        resi2: i64,
        restype2: &str,
        set: &[(&str, f64)],
    ) -> EnergyRow {
        let terms = STANDARD_TERMS
            .iter()
            .map(|t| set.iter().find(|(n, _)| n == t).map_or(0.0, |(_, v)| *v))
            .collect();
        EnergyRow {
            resi1,
            pdbid1: format!("{resi1}A"),
            restype1: restype1.to_string(),
            resi2,
            pdbid2: format!("{resi2}A"),
            restype2: restype2.to_string(),
            terms,
        }
    }

    pub(crate) fn table(name: &str, rows: Vec<EnergyRow>) -> EnergyTable {
        let terms = STANDARD_TERMS.iter().map(|t| t.to_string()).collect();
        EnergyTable::new(name, terms, rows).unwrap()
    }

    #[test]
    fn pair_keys_are_ordered() {
        let key = PairKey::new(1, 2);
        assert_ne!(key, key.reversed());
        assert_eq!(key, key.reversed().reversed());
        assert_eq!(key.to_string(), "(1, 2)");
    }

    #[test]
    fn pair_index_keeps_first_occurrence() {
        let t = table(
            "wild_type",
            vec![
                row(1, "ALA", 2, "GLY", &[(TOTAL, 1.0)]),
                row(2, "GLY", 1, "ALA", &[(TOTAL, 2.0)]),
                row(1, "ALA", 2, "GLY", &[(TOTAL, 3.0)]),
            ],
        );
        let index = t.pair_index();
        assert_eq!(index.len(), 2);
        assert_eq!(index[&PairKey::new(1, 2)], 0);
        assert_eq!(index[&PairKey::new(2, 1)], 1);
        assert_eq!(t.first_duplicate_pair(), Some(PairKey::new(1, 2)));
        assert_eq!(t.with_rows(t.rows()[..2].to_vec()).first_duplicate_pair(), None);
    }

    #[test]
    fn row_width_is_checked() {
        let mut bad = row(1, "ALA", 2, "GLY", &[]);
        bad.terms.pop();
        let terms = STANDARD_TERMS.iter().map(|t| t.to_string()).collect();
        let err = EnergyTable::new("variant", terms, vec![bad]).unwrap_err();
        assert!(matches!(err, PairdiffError::RowWidth { expected: 20, found: 19, .. }));
    }

    #[test]
    fn short_rows_are_reported_not_indexed() {
        let t = table("variant", vec![row(1, "ALA", 2, "GLY", &[(HBOND_SC, -1.0)])]);
        let mut short = row(3, "SER", 4, "THR", &[]);
        short.terms.truncate(3);
        let derived = t.with_rows(vec![short]);

        let err = derived.to_df().unwrap_err();
        match err {
            PairdiffError::RowWidth {
                pair,
                expected,
                found,
                ..
            } => assert_eq!((pair, expected, found), (PairKey::new(3, 4), 20, 3)),
            other => panic!("unexpected error: {other}"),
        }
        assert!(crate::filters::InteractionKind::HBondScSc
            .apply(&derived)
            .is_empty());
    }

    #[test]
    fn residue_net_energy_counts_both_partners() {
        let t = table(
            "variant",
            vec![
                row(1, "ALA", 2, "GLY", &[(TOTAL, -1.5)]),
                row(2, "GLY", 3, "SER", &[(TOTAL, 0.5)]),
            ],
        );
        let net = t.residue_net_energy();
        assert_eq!(net[&1], -1.5);
        assert_eq!(net[&2], -1.0);
        assert_eq!(net[&3], 0.5);
        assert!((t.net_energy() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn dataframe_conversion_keeps_schema() {
        let t = table(
            "variant",
            vec![
                row(1, "ASP", 5, "ARG", &[(HBOND_SC, -1.2), (TOTAL, -3.0)]),
                row(2, "CYS", 9, "CYS", &[(DSLF_FA13, -0.8), (TOTAL, -0.8)]),
            ],
        );
        let df = t.to_df().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), ID_COLUMNS.len() + STANDARD_TERMS.len());

        let back = EnergyTable::from_df(&df, "variant").unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn missing_required_column_names_table() {
        let df = df!(
            "resi1" => [1i64],
            "restype1" => ["ALA"],
            "resi2" => [2i64],
            "restype2" => ["GLY"],
            "total" => [1.0],
        )
        .unwrap();
        let err = EnergyTable::from_df(&df, "wild_type").unwrap_err();
        match err {
            PairdiffError::MissingColumn { table, column } => {
                assert_eq!(table, "wild_type");
                assert_eq!(column, HBOND_SC);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn non_integer_position_is_rejected() {
        let mut df = table("variant", vec![row(1, "ALA", 2, "GLY", &[])])
            .to_df()
            .unwrap();
        df.with_column(Series::new("resi2".into(), ["2.5"])).unwrap();
        let err = EnergyTable::from_df(&df, "variant").unwrap_err();
        assert!(matches!(err, PairdiffError::InvalidPosition { ref value, .. } if value == "2.5"));
    }
}
