use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::retrieve::ContextRetriever;
use crate::scorer::RiskScorer;
use crate::stream::ProgressEmitter;
use crate::suggest::SuggestionGenerator;
use crate::types::{ClauseRecord, EvaluationResult};

/// Bookkeeping for one batch: ordinal-indexed result slots, each written
/// exactly once regardless of completion order.
struct BatchState {
    total: usize,
    completed: usize,
    slots: Vec<Option<EvaluationResult>>,
}

impl BatchState {
    fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            slots: vec![None; total],
        }
    }

    fn fill(&mut self, result: EvaluationResult) {
        let idx = result.ordinal.saturating_sub(1) as usize;
        match self.slots.get_mut(idx) {
            Some(slot) if slot.is_none() => {
                *slot = Some(result);
                self.completed += 1;
            }
            Some(_) => warn!(ordinal = result.ordinal, "duplicate result slot write ignored"),
            None => warn!(ordinal = result.ordinal, "result ordinal out of range"),
        }
    }

    fn into_ordered(self) -> Vec<EvaluationResult> {
        self.slots.into_iter().flatten().collect()
    }
}

/// Fans a clause batch out to retrieval + scoring under a concurrency
/// bound, preserving ordinal order and isolating per-clause failures.
///
/// A single clause's failure never cancels sibling work; batch-level
/// failure is reserved for conditions that prevent starting any work at
/// all, and is the caller's responsibility to surface.
pub struct EvaluationPipeline {
    retriever: Arc<ContextRetriever>,
    scorer: Arc<RiskScorer>,
    suggester: Arc<SuggestionGenerator>,
}

impl EvaluationPipeline {
    pub fn new(
        retriever: Arc<ContextRetriever>,
        scorer: Arc<RiskScorer>,
        suggester: Arc<SuggestionGenerator>,
    ) -> Self {
        Self {
            retriever,
            scorer,
            suggester,
        }
    }

    /// Evaluate every clause with at most `max_concurrent` units in flight,
    /// emitting progress per completed unit and a terminal `complete` event
    /// carrying the ordered results. Returns the same ordered results.
    pub async fn run(
        &self,
        clauses: Vec<ClauseRecord>,
        max_concurrent: usize,
        emitter: &mut ProgressEmitter,
    ) -> Vec<EvaluationResult> {
        let total = clauses.len();
        if total == 0 {
            info!("no clauses to evaluate, completing empty batch");
            emitter.complete(&[]);
            return Vec::new();
        }

        info!(total, max_concurrent, "starting clause evaluation batch");

        let mut state = BatchState::new(total);
        let roster = clauses.clone();
        let gate = Arc::new(Semaphore::new(max_concurrent.max(1)));
        let mut units: JoinSet<EvaluationResult> = JoinSet::new();

        for clause in clauses {
            let gate = Arc::clone(&gate);
            let retriever = Arc::clone(&self.retriever);
            let scorer = Arc::clone(&self.scorer);
            units.spawn(async move {
                // The gate is never closed; Err is unreachable here.
                let _permit = gate.acquire_owned().await.ok();
                let context = retriever.retrieve(&clause.text).await;
                scorer.score(&clause, &context).await
            });
        }

        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(result) => {
                    let ordinal = result.ordinal;
                    state.fill(result);
                    emitter.progress(
                        state.completed,
                        state.total,
                        format!("clause {ordinal} evaluated"),
                    );
                }
                Err(e) => warn!("evaluation unit failed to join: {e}"),
            }
        }

        // A panicked unit leaves its slot empty; mark it as an error result
        // so the batch still reports one row per clause.
        for clause in &roster {
            let idx = clause.ordinal.saturating_sub(1) as usize;
            if state.slots.get(idx).map(Option::is_none).unwrap_or(false) {
                state.fill(EvaluationResult::error(
                    clause,
                    String::new(),
                    "evaluation task aborted",
                ));
                emitter.progress(
                    state.completed,
                    state.total,
                    format!("clause {} failed", clause.ordinal),
                );
            }
        }

        let mut results = state.into_ordered();

        self.generate_suggestions(&mut results, max_concurrent, total, emitter)
            .await;

        let flagged = results.iter().filter(|r| r.is_toxic).count();
        info!(total, flagged, "batch complete");
        emitter.complete(&results);
        results
    }

    /// Second fan-out, restricted to the toxic subset. Suggestion failures
    /// are already absorbed by the generator; this only distributes work.
    async fn generate_suggestions(
        &self,
        results: &mut [EvaluationResult],
        max_concurrent: usize,
        total: usize,
        emitter: &mut ProgressEmitter,
    ) {
        let toxic: Vec<usize> = results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_toxic)
            .map(|(i, _)| i)
            .collect();
        if toxic.is_empty() {
            return;
        }

        info!(count = toxic.len(), "generating redraft suggestions for flagged clauses");

        let gate = Arc::new(Semaphore::new(max_concurrent.max(1)));
        let mut jobs: JoinSet<(usize, String)> = JoinSet::new();
        for i in toxic {
            let result = results[i].clone();
            let suggester = Arc::clone(&self.suggester);
            let gate = Arc::clone(&gate);
            jobs.spawn(async move {
                let _permit = gate.acquire_owned().await.ok();
                let suggestion = suggester.suggest(&result).await;
                (i, suggestion)
            });
        }

        while let Some(joined) = jobs.join_next().await {
            match joined {
                Ok((i, suggestion)) => {
                    results[i].suggestion = suggestion;
                    emitter.progress(
                        total,
                        total,
                        format!("suggestion ready for clause {}", results[i].ordinal),
                    );
                }
                Err(e) => warn!("suggestion unit failed to join: {e}"),
            }
        }
    }
}
