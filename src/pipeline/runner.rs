use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::annotation::Annotator;
use crate::classifier::Classifier;
use crate::scoring::feature_keys;
use crate::storage::{InputStore, ResultStore, WorkRange};
use crate::synonyms::SynonymResolver;

use super::PipelineSettings;
use super::bundle::{Bundler, next_batch};
use super::error::PipelineError;
use super::worker::{WorkerContext, WorkerPool};

/// Totals of one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub range: Option<WorkRange>,
    pub batches: usize,
    pub bundles: usize,
    pub pairs_scored: usize,
    pub rows_skipped: usize,
    pub inserted: usize,
    pub elapsed: Duration,
}

/// Drives scoring of a row range: bundles rows, fans bundles out to a worker pool one batch
/// at a time and persists each finished bundle before collecting the next.
pub struct PairScoringPipeline {
    context: WorkerContext,
}

impl std::fmt::Debug for PairScoringPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairScoringPipeline")
            .field("context", &self.context)
            .finish()
    }
}

impl PairScoringPipeline {
    pub fn new(
        settings: PipelineSettings,
        annotator: Arc<dyn Annotator>,
        synonyms: Option<Arc<dyn SynonymResolver>>,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, PipelineError> {
        settings
            .validate()
            .map_err(|reason| PipelineError::Configuration { reason })?;

        if annotator.language() != settings.language {
            return Err(PipelineError::Configuration {
                reason: format!(
                    "annotator language {} does not match configured language {}",
                    annotator.language(),
                    settings.language
                ),
            });
        }

        if settings.use_modified {
            match &synonyms {
                None => {
                    return Err(PipelineError::Configuration {
                        reason: "modified scoring requires a synonym resolver".to_string(),
                    });
                }
                Some(resolver) if resolver.language() != settings.language => {
                    return Err(PipelineError::Configuration {
                        reason: format!(
                            "synonym resolver language {} does not match configured language {}",
                            resolver.language(),
                            settings.language
                        ),
                    });
                }
                Some(_) => {}
            }
        }

        let keys = feature_keys(settings.ngram_length, settings.use_modified);
        classifier
            .check_features(&keys)
            .map_err(|e| PipelineError::Configuration {
                reason: e.to_string(),
            })?;

        Ok(Self {
            context: WorkerContext::new(settings, annotator, synonyms, classifier),
        })
    }

    pub fn settings(&self) -> &PipelineSettings {
        self.context.settings()
    }

    /// Score keys in classifier feature order.
    pub fn feature_keys(&self) -> Vec<String> {
        let settings = self.settings();
        feature_keys(settings.ngram_length, settings.use_modified)
    }

    /// Resolves optional row bounds against the input's pair count.
    pub fn resolve_range(
        input: &InputStore,
        start: Option<u64>,
        end: Option<u64>,
    ) -> Result<WorkRange, PipelineError> {
        let total = input
            .total_pairs()
            .map_err(|source| PipelineError::Open { source })?;
        WorkRange::resolve(start, end, total).map_err(|e| PipelineError::Configuration {
            reason: e.to_string(),
        })
    }

    /// Scores every row of `range`, writing labeled pairs to `output`.
    ///
    /// Stops at the end of the first batch containing a failed bundle; every other bundle of
    /// that batch is still persisted. Re-running any range is safe. Bundles are scored on the
    /// blocking pool of the ambient tokio runtime.
    pub async fn run(
        &self,
        input: &InputStore,
        output: &mut ResultStore,
        range: WorkRange,
    ) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();
        let settings = self.settings();

        let mut pool = WorkerPool::new(&self.context, settings.workers)?;
        let rows = input
            .pairs(range, settings.page_size)
            .map_err(|source| PipelineError::Open { source })?;
        let mut bundles = Bundler::new(rows, settings.bundle_size, settings.language);

        info!(
            range = %range,
            rows = range.len(),
            workers = pool.size(),
            bundle_size = settings.bundle_size,
            modified = settings.use_modified,
            "Starting run"
        );

        let mut summary = RunSummary {
            range: Some(range),
            ..RunSummary::default()
        };

        loop {
            let batch = next_batch(&mut bundles, pool.size())?;
            if batch.is_empty() {
                break;
            }

            summary.batches += 1;
            let batch_started = Instant::now();
            let batch_range = batch
                .iter()
                .map(|b| b.range)
                .reduce(|a, b| a.union(&b))
                .unwrap_or(range);
            let submitted = batch.len();

            info!(batch = summary.batches, rows = %batch_range, bundles = submitted, "Processing batch");

            for bundle in batch {
                pool.submit(bundle)?;
            }

            let mut failure: Option<PipelineError> = None;
            while let Some(outcome) = pool.next().await {
                let outcome = outcome?;
                summary.rows_skipped += outcome.skipped;

                match outcome.result {
                    Ok(records) => {
                        let inserted = output.insert_bundle(&records).map_err(|source| {
                            PipelineError::Persistence {
                                range: outcome.range,
                                source,
                            }
                        })?;
                        summary.bundles += 1;
                        summary.pairs_scored += records.len();
                        summary.inserted += inserted;
                        debug!(
                            bundle = %outcome.range,
                            records = records.len(),
                            inserted = inserted,
                            "Persisted bundle"
                        );
                    }
                    Err(e) => {
                        error!(
                            stage = %e.stage(),
                            bundle = %outcome.range,
                            error = %e,
                            "Bundle failed"
                        );
                        failure.get_or_insert(e);
                    }
                }
            }

            if let Some(e) = failure {
                return Err(e);
            }

            info!(
                batch = summary.batches,
                rows = %batch_range,
                elapsed_ms = batch_started.elapsed().as_millis() as u64,
                "Finished batch"
            );
        }

        summary.elapsed = started.elapsed();
        info!(
            range = %range,
            pairs = summary.pairs_scored,
            skipped = summary.rows_skipped,
            inserted = summary.inserted,
            batches = summary.batches,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Run complete"
        );
        Ok(summary)
    }
}
