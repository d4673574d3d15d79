use std::sync::Arc;

use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, error};

use crate::annotation::Annotator;
use crate::classifier::Classifier;
use crate::scoring::{BaselineScorer, DocumentCache, ModifiedScorer, PairScorer};
use crate::storage::{PairRecord, WorkRange};
use crate::synonyms::{SynonymCache, SynonymResolver};

use super::PipelineSettings;
use super::bundle::WorkBundle;
use super::error::PipelineError;

/// Shared, read-only collaborators every worker is built from.
#[derive(Clone)]
pub struct WorkerContext {
    settings: PipelineSettings,
    annotator: Arc<dyn Annotator>,
    synonyms: Option<Arc<dyn SynonymResolver>>,
    classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for WorkerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerContext")
            .field("settings", &self.settings)
            .field("language", &self.annotator.language())
            .field("synonyms", &self.synonyms.is_some())
            .finish()
    }
}

impl WorkerContext {
    pub fn new(
        settings: PipelineSettings,
        annotator: Arc<dyn Annotator>,
        synonyms: Option<Arc<dyn SynonymResolver>>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            settings,
            annotator,
            synonyms,
            classifier,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Builds a worker with fresh, private caches.
    pub fn build_worker(&self) -> Result<Worker, PipelineError> {
        let n = self.settings.ngram_length;

        let modified = if self.settings.use_modified {
            let resolver = self.synonyms.clone().ok_or_else(|| PipelineError::Configuration {
                reason: "modified scoring requires a synonym resolver".to_string(),
            })?;
            let cache = SynonymCache::with_capacity(resolver, self.settings.synonym_cache_capacity);
            Some(ModifiedScorer::new(n, cache))
        } else {
            None
        };

        let scorer = PairScorer::new(
            Arc::clone(&self.annotator),
            DocumentCache::with_capacity(n, self.settings.document_cache_capacity),
            BaselineScorer::new(n),
            modified,
        )
        .map_err(|e| PipelineError::Configuration {
            reason: e.to_string(),
        })?;

        Ok(Worker {
            scorer,
            classifier: Arc::clone(&self.classifier),
        })
    }
}

/// Scores bundles. Owns its document and synonym caches for its whole lifetime.
pub struct Worker {
    scorer: PairScorer,
    classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("scorer", &self.scorer)
            .finish()
    }
}

impl Worker {
    pub fn scorer(&self) -> &PairScorer {
        &self.scorer
    }

    /// Scores and classifies every task of `bundle`, in task order.
    ///
    /// Any failing pair fails the whole bundle.
    pub fn process_bundle(&self, bundle: &WorkBundle) -> Result<Vec<PairRecord>, PipelineError> {
        let mut records = Vec::with_capacity(bundle.tasks.len());

        for task in &bundle.tasks {
            let fail = |reason: String| PipelineError::Worker {
                range: bundle.range,
                reason: format!(
                    "row {} ({} / {}): {}",
                    task.row(),
                    task.source_id(),
                    task.candidate_id(),
                    reason
                ),
            };

            let source_key = task.source_key();
            let candidate_key = task.candidate_key();
            let scores = self
                .scorer
                .score_pair(
                    (&source_key, task.source_text()),
                    (&candidate_key, task.candidate_text()),
                )
                .map_err(|e| fail(e.to_string()))?;

            let label = self
                .classifier
                .predict(&scores.values())
                .map_err(|e| fail(e.to_string()))?;

            records.push(PairRecord {
                source_id: task.source_id().to_string(),
                candidate_id: task.candidate_id().to_string(),
                scores,
                label,
            });
        }

        Ok(records)
    }
}

/// Result of one bundle as reported by the pool.
#[derive(Debug)]
pub struct BundleOutcome {
    pub range: WorkRange,
    pub skipped: usize,
    pub result: Result<Vec<PairRecord>, PipelineError>,
}

type ScoredBundle = (
    WorkRange,
    usize,
    Result<(Worker, Result<Vec<PairRecord>, PipelineError>), JoinError>,
);

/// Fixed set of workers reused for every batch of a run.
///
/// A submitted bundle checks out an idle worker and is scored on tokio's blocking pool; the
/// worker is checked back in when the bundle finishes. Outcomes come back in completion order.
pub struct WorkerPool {
    context: WorkerContext,
    size: usize,
    idle: Vec<Worker>,
    running: JoinSet<ScoredBundle>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .field("idle", &self.idle.len())
            .field("in_flight", &self.running.len())
            .finish()
    }
}

impl WorkerPool {
    /// Builds `size` workers up front.
    pub fn new(context: &WorkerContext, size: usize) -> Result<Self, PipelineError> {
        let size = size.max(1);
        let idle = (0..size)
            .map(|_| context.build_worker())
            .collect::<Result<Vec<_>, _>>()?;

        debug!(workers = size, "Built worker pool");
        Ok(Self {
            context: context.clone(),
            size,
            idle,
            running: JoinSet::new(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    pub fn in_flight(&self) -> usize {
        self.running.len()
    }

    /// Hands `bundle` to an idle worker. Must be called from within a tokio runtime.
    pub fn submit(&mut self, bundle: WorkBundle) -> Result<(), PipelineError> {
        let range = bundle.range;
        let skipped = bundle.skipped;
        let worker = self.idle.pop().ok_or_else(|| PipelineError::Resource {
            reason: format!("no idle worker for bundle {}", range),
        })?;

        debug!(bundle = %range, tasks = bundle.tasks.len(), "Submitting bundle");

        let scoring = task::spawn_blocking(move || {
            let result = worker.process_bundle(&bundle);
            (worker, result)
        });
        self.running.spawn(async move { (range, skipped, scoring.await) });
        Ok(())
    }

    /// Waits for the next bundle to finish. Returns `None` once nothing is in flight.
    ///
    /// A worker that panicked is replaced with a freshly built one.
    pub async fn next(&mut self) -> Option<Result<BundleOutcome, PipelineError>> {
        let joined = self.running.join_next().await?;

        let (range, skipped, scored) = match joined {
            Ok(scored) => scored,
            Err(e) => {
                return Some(Err(PipelineError::Resource {
                    reason: format!("bundle task failed: {}", e),
                }));
            }
        };

        let result = match scored {
            Ok((worker, result)) => {
                self.idle.push(worker);
                result
            }
            Err(e) => {
                let reason = if e.is_panic() {
                    format!("worker panicked: {}", e)
                } else {
                    format!("worker cancelled: {}", e)
                };
                error!(bundle = %range, reason = %reason, "Lost worker");

                match self.context.build_worker() {
                    Ok(worker) => self.idle.push(worker),
                    Err(build) => {
                        return Some(Err(build));
                    }
                }
                Err(PipelineError::Worker { range, reason })
            }
        };

        Some(Ok(BundleOutcome {
            range,
            skipped,
            result,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Language, LexiconAnnotator};
    use crate::classifier::MockClassifier;
    use crate::pipeline::bundle::PairTask;
    use crate::storage::{InputRecord, PairRow};

    fn context(classifier: Arc<MockClassifier>) -> WorkerContext {
        let settings = PipelineSettings {
            ngram_length: 2,
            ..PipelineSettings::default()
        };
        WorkerContext::new(
            settings,
            Arc::new(LexiconAnnotator::new(Language::German)),
            None,
            classifier,
        )
    }

    fn bundle(start: u64, len: u64) -> WorkBundle {
        let tasks = (start..start + len)
            .map(|row| {
                let record = |id: String, text: &str| {
                    Arc::new(InputRecord {
                        id: Some(id),
                        text: Some(text.to_string()),
                        language: Some("de".to_string()),
                    })
                };
                let pair = PairRow {
                    row,
                    source: record("s".to_string(), "der hund bellt"),
                    candidate: record(format!("c{}", row), "der hund"),
                };
                PairTask::try_from_row(pair, Language::German).unwrap()
            })
            .collect();
        WorkBundle {
            range: WorkRange::new(start, start + len).unwrap(),
            tasks,
            skipped: 0,
        }
    }

    #[test]
    fn test_worker_scores_bundle_in_order() {
        let ctx = context(Arc::new(MockClassifier::new(0.5)));
        let worker = ctx.build_worker().unwrap();

        let records = worker.process_bundle(&bundle(0, 3)).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.candidate_id.as_str()).collect();
        assert_eq!(ids, vec!["c0", "c1", "c2"]);
        assert_eq!(records[0].scores.get("1"), Some(1.0));
        assert_eq!(records[0].label, "related");

        // the shared source text is analyzed once
        worker.scorer().documents().run_pending_tasks();
        assert_eq!(worker.scorer().documents().len(), 4);
    }

    #[test]
    fn test_worker_fails_whole_bundle() {
        let classifier = Arc::new(MockClassifier::new(0.5));
        classifier.fail_after(1);
        let worker = context(classifier).build_worker().unwrap();

        let err = worker.process_bundle(&bundle(5, 3)).unwrap_err();
        assert_eq!(err.row_range(), Some(WorkRange::new(5, 8).unwrap()));
        assert!(err.to_string().contains("row 6"));
    }

    #[test]
    fn test_modified_without_resolver_is_configuration_error() {
        let settings = PipelineSettings {
            use_modified: true,
            ..PipelineSettings::default()
        };
        let ctx = WorkerContext::new(
            settings,
            Arc::new(LexiconAnnotator::new(Language::German)),
            None,
            Arc::new(MockClassifier::default()),
        );
        assert!(matches!(
            ctx.build_worker(),
            Err(PipelineError::Configuration { .. })
        ));
    }

    async fn drain(pool: &mut WorkerPool) -> Vec<BundleOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = pool.next().await {
            outcomes.push(outcome.unwrap());
        }
        outcomes
    }

    #[tokio::test]
    async fn test_pool_returns_every_outcome() {
        let ctx = context(Arc::new(MockClassifier::default()));
        let mut pool = WorkerPool::new(&ctx, 3).unwrap();
        assert_eq!(pool.size(), 3);

        for round in 0..2 {
            for i in 0..3 {
                pool.submit(bundle((round * 3 + i) * 10, 2)).unwrap();
            }
            assert_eq!(pool.idle(), 0);

            let mut starts: Vec<u64> = drain(&mut pool)
                .await
                .into_iter()
                .map(|o| {
                    assert!(o.result.is_ok());
                    o.range.start()
                })
                .collect();
            starts.sort_unstable();
            let base = round * 30;
            assert_eq!(starts, vec![base, base + 10, base + 20]);
            assert_eq!(pool.idle(), 3);
        }
    }

    #[tokio::test]
    async fn test_submit_without_idle_worker_fails() {
        let mut pool = WorkerPool::new(&context(Arc::new(MockClassifier::default())), 1).unwrap();
        pool.submit(bundle(0, 1)).unwrap();
        assert!(matches!(
            pool.submit(bundle(1, 1)),
            Err(PipelineError::Resource { .. })
        ));
        assert_eq!(drain(&mut pool).await.len(), 1);
    }

    #[tokio::test]
    async fn test_pool_converts_panics() {
        let classifier = Arc::new(MockClassifier::default());
        classifier.panic_after(0);
        let mut pool = WorkerPool::new(&context(classifier), 1).unwrap();

        pool.submit(bundle(100, 1)).unwrap();
        let outcome = pool.next().await.unwrap().unwrap();
        let err = outcome.result.unwrap_err();
        assert_eq!(err.row_range(), Some(WorkRange::new(100, 101).unwrap()));
        assert!(err.to_string().contains("panicked"));

        // the lost worker is replaced and the pool keeps serving
        assert_eq!(pool.idle(), 1);
        pool.submit(bundle(200, 1)).unwrap();
        let next = pool.next().await.unwrap().unwrap();
        assert_eq!(next.range.start(), 200);
        assert!(pool.next().await.is_none());
    }
}
