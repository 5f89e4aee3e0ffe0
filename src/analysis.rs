//! Full interaction change analysis of a wild-type / variant pair.
//!
//! The change classifier is run once on the unfiltered energy tables and once
//! on each interaction subset (salt bridges, disulfides and the four hydrogen
//! bond classes), and the seven classifications are summarized. Any failing
//! classification fails the whole analysis.

use crate::classify::{classify_with, Classification, DuplicatePolicy};
use crate::error::{PairdiffError, Result};
use crate::filters::InteractionKind;
use crate::mutations::MutationSet;
use crate::progress::ProgressReporter;
use crate::summary::{summarize, SummaryTable};
use crate::table::EnergyTable;
use rayon::prelude::*;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// Progress percentages reported over one analysis.
pub const CHECKPOINTS: [u8; 10] = [5, 25, 35, 45, 55, 65, 75, 85, 95, 99];

/// Percentages reported as classifications complete, in completion order.
const CLASSIFIED: [u8; 7] = [25, 35, 45, 65, 75, 85, 95];

/// Immutable inputs of one analysis.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    /// Energy table of the variant.
    pub variant: EnergyTable,
    /// Energy table of the wild-type.
    pub wild_type: EnergyTable,
    /// Mutated residue positions.
    pub mutations: MutationSet,
    /// Handling of pairs listed more than once in the wild-type table.
    pub duplicate_policy: DuplicatePolicy,
}

impl AnalysisInput {
    /// Inputs that reject duplicated wild-type pairs.
    pub fn new(variant: EnergyTable, wild_type: EnergyTable, mutations: MutationSet) -> Self {
        Self {
            variant,
            wild_type,
            mutations,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    /// Replace the duplicate pair handling.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Check every precondition of the classifications before running any of them.
    pub fn validate(&self) -> Result<()> {
        self.variant.validate_schema()?;
        self.wild_type.validate_schema()?;
        if self.variant.term_names() != self.wild_type.term_names() {
            return Err(PairdiffError::SchemaMismatch {
                variant: self.variant.term_names().to_vec(),
                wild_type: self.wild_type.term_names().to_vec(),
            });
        }
        if self.duplicate_policy == DuplicatePolicy::Reject {
            if let Some(pair) = self.wild_type.first_duplicate_pair() {
                return Err(PairdiffError::DuplicatePair {
                    table: self.wild_type.name().to_string(),
                    pair,
                });
            }
        }
        Ok(())
    }

    fn classify(&self, kind: InteractionKind) -> Result<Classification> {
        let variant = subset(kind, &self.variant);
        let wild_type = subset(kind, &self.wild_type);
        debug!(
            "Classifying {kind}: {} variant and {} wild-type rows",
            variant.len(),
            wild_type.len()
        );
        classify_with(&variant, &wild_type, &self.mutations, self.duplicate_policy)
    }
}

fn subset(kind: InteractionKind, table: &EnergyTable) -> Cow<'_, EnergyTable> {
    match kind {
        InteractionKind::All => Cow::Borrowed(table),
        _ => Cow::Owned(kind.apply(table)),
    }
}

/// The seven classifications of an analysis and their summary.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    classifications: BTreeMap<InteractionKind, Classification>,
    summary: SummaryTable,
}

impl AnalysisReport {
    fn new(classifications: BTreeMap<InteractionKind, Classification>) -> Self {
        let summary = summarize(&classifications);
        Self {
            classifications,
            summary,
        }
    }

    /// The classification of one interaction subset.
    pub fn get(&self, kind: InteractionKind) -> &Classification {
        &self.classifications[&kind]
    }

    /// Classifications in report order.
    pub fn iter(&self) -> impl Iterator<Item = (InteractionKind, &Classification)> {
        self.classifications.iter().map(|(k, c)| (*k, c))
    }

    /// Classifications keyed by interaction kind.
    pub fn classifications(&self) -> &BTreeMap<InteractionKind, Classification> {
        &self.classifications
    }

    /// Per change type statistics of every classification.
    pub fn summary(&self) -> &SummaryTable {
        &self.summary
    }
}

/// Run the seven classifications one after the other.
///
/// Progress is reported at each of the [`CHECKPOINTS`].
pub fn analyze(input: &AnalysisInput, progress: &ProgressReporter) -> Result<AnalysisReport> {
    input.validate()?;
    progress.report(CHECKPOINTS[0]);

    let mut classifications = BTreeMap::new();
    for kind in [
        InteractionKind::All,
        InteractionKind::SaltBridge,
        InteractionKind::Disulfide,
    ] {
        classifications.insert(kind, input.classify(kind)?);
        progress.report(CHECKPOINTS[classifications.len()]);
    }

    let variant_hbonds = InteractionKind::HYDROGEN_BONDS.map(|k| k.apply(&input.variant));
    let wild_hbonds = InteractionKind::HYDROGEN_BONDS.map(|k| k.apply(&input.wild_type));
    progress.report(CHECKPOINTS[4]);

    for (i, kind) in InteractionKind::HYDROGEN_BONDS.into_iter().enumerate() {
        let result = classify_with(
            &variant_hbonds[i],
            &wild_hbonds[i],
            &input.mutations,
            input.duplicate_policy,
        )?;
        classifications.insert(kind, result);
        progress.report(CHECKPOINTS[5 + i]);
    }

    let report = AnalysisReport::new(classifications);
    progress.report(CHECKPOINTS[9]);
    log_report(&report);
    Ok(report)
}

/// Run the seven classifications on the current rayon pool.
///
/// Produces the same report as [`analyze`]. Progress percentages follow the
/// number of finished classifications, whichever finish first.
pub fn analyze_parallel(
    input: &AnalysisInput,
    progress: &ProgressReporter,
) -> Result<AnalysisReport> {
    input.validate()?;
    progress.report(CHECKPOINTS[0]);

    let finished = AtomicUsize::new(0);
    let classifications = InteractionKind::ALL
        .par_iter()
        .map(|kind| -> Result<(InteractionKind, Classification)> {
            let result = input.classify(*kind)?;
            let done = finished.fetch_add(1, Ordering::SeqCst);
            progress.report(CLASSIFIED[done.min(CLASSIFIED.len() - 1)]);
            Ok((*kind, result))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    let report = AnalysisReport::new(classifications);
    progress.report(CHECKPOINTS[9]);
    log_report(&report);
    Ok(report)
}

fn log_report(report: &AnalysisReport) {
    for (kind, classification) in report.iter() {
        info!(
            "{label}: {counts:?} changes of type A-F",
            label = kind.label(),
            counts = classification.counts()
        );
    }
}
