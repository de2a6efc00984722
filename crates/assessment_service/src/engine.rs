//! Assessment Engine
//!
//! Runs one claim through the full pipeline:
//!
//! ```text
//!                                     ┌─> inconsistency ─┐
//! intake ─> validation ─> graph ingest ┼─> pattern match ─┼─> normalize ─> score ─┐
//!                                     ├─> photo ─────────┘                       ├─> ClaimAssessment
//!                                     └─> ring detection ────────────────────────┘
//! ```
//!
//! The claim is ingested into the shared graph before anything reads it, so
//! of two concurrent runs for one claimant the later ingestion always sees the
//! earlier claim. Evaluators then run as independent tasks joined at a
//! barrier, each under its own timeout, while ring detection runs on the
//! blocking pool alongside them.
//! Nothing that goes wrong inside a run escapes as an error: soft failures
//! become coverage gaps and hard failures produce a `Failed` assessment.
//! Only cancellation yields no assessment at all.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinSet;
use tokio::time::error::Elapsed;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};

use core_kernel::{ClaimId, HealthCheckResult, OperationMetadata, RunId};
use domain_claims::{ClaimRecord, ClaimValidator};
use domain_network::{
    query_graph, ClaimGraph, EntityKey, GraphBuilder, NetworkAssessment, NetworkError,
    RingDetector, Subgraph,
};
use domain_signals::{
    order_indicators, EvaluationContext, EvaluatorError, InconsistencyEvaluator, Indicator,
    PartialSignalLoss, PatternEvaluator, PhotoAuthenticityEvaluator, RawFinding, Recommendation,
    RiskLevel, RiskScoringEngine, ScoreBreakdown, SignalCategory, SignalEvaluator,
    SignalNormalizer, SoftSignalFailure,
};

use crate::assessment::{ClaimAssessment, CoverageGap, CoverageSource};
use crate::cancel::{CancelToken, RunCanceller};
use crate::collaborators::{Collaborators, GraphClaimHistory};
use crate::config::AssessmentConfig;
use crate::error::{AssessmentError, HardRunFailure};
use crate::input::{ClaimInput, ClaimSource};
use crate::narrative::{NarrativeGenerator, TemplateNarrative};
use crate::state::{RunState, StateTrail};

type EvaluatorOutcome = Result<Result<Vec<RawFinding>, EvaluatorError>, Elapsed>;

/// Everything the evaluator branch produced
#[derive(Debug, Default)]
struct SignalCollection {
    indicators: Vec<Indicator>,
    failures: Vec<SoftSignalFailure>,
    losses: Vec<PartialSignalLoss>,
    gaps: Vec<CoverageGap>,
    fatal: Option<HardRunFailure>,
}

/// The claim risk engine
///
/// One engine serves any number of concurrent runs; they share the claim
/// graph and the collaborators.
pub struct AssessmentEngine {
    config: AssessmentConfig,
    collaborators: Collaborators,
    evaluators: Vec<Arc<dyn SignalEvaluator>>,
    normalizer: SignalNormalizer,
    scoring: RiskScoringEngine,
    builder: GraphBuilder,
    detector: RingDetector,
    template: TemplateNarrative,
}

impl AssessmentEngine {
    /// Builds an engine over a shared claim graph
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Configuration` if any configuration section
    /// is invalid.
    pub fn new(
        config: AssessmentConfig,
        collaborators: Collaborators,
        graph: Arc<ClaimGraph>,
    ) -> Result<Self, AssessmentError> {
        config.validate()?;

        let history = collaborators
            .claim_history
            .clone()
            .unwrap_or_else(|| Arc::new(GraphClaimHistory::new(Arc::clone(&graph))));

        let evaluators: Vec<Arc<dyn SignalEvaluator>> = vec![
            Arc::new(InconsistencyEvaluator::new(config.inconsistency.clone(), history)),
            Arc::new(PatternEvaluator::new(
                config.pattern.clone(),
                Arc::clone(&collaborators.pattern_index),
            )),
            Arc::new(PhotoAuthenticityEvaluator::new(
                config.photo.clone(),
                Arc::clone(&collaborators.photo_analyzer),
            )),
        ];

        let normalizer = SignalNormalizer::new(config.severity.clone());
        let scoring = RiskScoringEngine::new(config.scoring.clone())?;
        let builder = GraphBuilder::new(graph, config.network.coordinated_window_days);
        let detector = RingDetector::new(config.network.clone())?;

        info!(
            radius = config.network.radius,
            pattern_timeout_ms = config.timeouts.pattern_ms,
            "Assessment engine ready"
        );

        Ok(Self {
            config,
            collaborators,
            evaluators,
            normalizer,
            scoring,
            builder,
            detector,
            template: TemplateNarrative::new(),
        })
    }

    pub fn config(&self) -> &AssessmentConfig {
        &self.config
    }

    pub fn graph(&self) -> &Arc<ClaimGraph> {
        self.builder.graph()
    }

    /// Assesses one claim and waits for the result
    pub async fn run_assessment(&self, input: ClaimInput) -> Result<ClaimAssessment, AssessmentError> {
        let canceller = RunCanceller::new();
        self.run_assessment_cancellable(input, canceller.token()).await
    }

    /// Assesses one claim unless `cancel` fires first.
    ///
    /// On cancellation every in-flight evaluator task is aborted, collected
    /// indicators are discarded and no assessment is returned. Graph ingestion
    /// that already started is allowed to finish; it is idempotent.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Cancelled` if the run was cancelled.
    pub async fn run_assessment_cancellable(
        &self,
        input: ClaimInput,
        mut cancel: CancelToken,
    ) -> Result<ClaimAssessment, AssessmentError> {
        let run_id = RunId::new_v7();
        if cancel.is_cancelled() {
            info!(%run_id, "Assessment run cancelled before start");
            return Err(AssessmentError::Cancelled { run_id });
        }

        let span = info_span!(
            "assessment_run",
            run_id = %run_id,
            claim_id = tracing::field::Empty
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(%run_id, "Assessment run cancelled");
                Err(AssessmentError::Cancelled { run_id })
            }
            assessment = self.execute(run_id, input).instrument(span) => Ok(assessment),
        }
    }

    /// Subgraph within `radius` hops of an entity, for drill-down
    pub fn query_graph(&self, center: &EntityKey, radius: usize) -> Subgraph {
        query_graph(self.builder.graph(), center, radius)
    }

    /// Writes the investigator narrative for an assessment.
    ///
    /// Uses the configured generator and falls back to the built-in template
    /// when none is configured or it fails.
    pub async fn narrate(&self, assessment: &ClaimAssessment) -> String {
        if let Some(narrator) = &self.collaborators.narrator {
            match narrator.generate(assessment).await {
                Ok(text) => return text,
                Err(e) => warn!(
                    claim_id = %assessment.claim_id,
                    error = %e,
                    "Narrative generation failed, using template"
                ),
            }
        }
        self.template.render(assessment)
    }

    /// Health of every collaborator
    pub async fn health(&self) -> Vec<HealthCheckResult> {
        let c = &self.collaborators;
        let mut results = vec![
            c.extractor.health_check().await,
            c.pattern_index.health_check().await,
            c.photo_analyzer.health_check().await,
        ];
        if let Some(history) = &c.claim_history {
            results.push(history.health_check().await);
        }
        if let Some(narrator) = &c.narrator {
            results.push(narrator.health_check().await);
        }
        results
    }

    async fn execute(&self, run_id: RunId, input: ClaimInput) -> ClaimAssessment {
        let started_at = Utc::now();
        let mut trail = StateTrail::new();
        let metadata = OperationMetadata::with_correlation_id(run_id.to_string());
        info!(reference = %input.reference(), photos = input.photos.len(), "Assessment run received");

        enter(&mut trail, RunState::Extracting);
        let reference = input.reference().clone();
        let record = match self.intake(input.source, &metadata).await {
            Ok(record) => record,
            Err(failure) => {
                return failed_intake(reference, run_id, trail, failure, started_at);
            }
        };
        Span::current().record("claim_id", tracing::field::display(&record.claim_id));

        enter(&mut trail, RunState::Evaluating);
        let ctx = EvaluationContext::new(record.clone())
            .with_photos(input.photos)
            .with_metadata(metadata.with_context("claim_id", record.claim_id.to_string()));

        self.ingest(&record);
        let (mut signals, graph) = tokio::join!(
            self.evaluate(ctx),
            self.detect_ring(record.claim_id.clone())
        );

        enter(&mut trail, RunState::Scoring);
        let indicators = order_indicators(std::mem::take(&mut signals.indicators));
        let outcome = self.scoring.score(&indicators);
        let mut failure = signals.fatal.take();
        let mut network = None;

        if failure.is_none() {
            enter(&mut trail, RunState::GraphUpdating);
            match graph {
                Ok(detection) => {
                    enter(&mut trail, RunState::RingDetecting);
                    match detection {
                        Ok(assessment) => network = Some(assessment),
                        Err(e) => {
                            warn!(error = %e, "Ring detection unavailable");
                            signals.gaps.push(CoverageGap::new(CoverageSource::Network, e.to_string()));
                        }
                    }
                }
                Err(panicked) => {
                    error!(error = %panicked, "Ring detection panicked");
                    signals.gaps.push(CoverageGap::new(CoverageSource::Network, "ring detection panicked"));
                    failure = Some(HardRunFailure::BranchPanicked {
                        branch: "ring detection".to_string(),
                    });
                }
            }
        } else if let Ok(Ok(assessment)) = graph {
            network = Some(assessment);
        }

        let (state, risk_level, recommendation) = match &failure {
            Some(f) => {
                error!(failure = %f, "Assessment run failed");
                trail.fail();
                (RunState::Failed, RiskLevel::Indeterminate, Recommendation::Review)
            }
            None => {
                enter(&mut trail, RunState::Complete);
                (RunState::Complete, outcome.risk_level, outcome.recommendation)
            }
        };

        signals.failures.sort_by_key(|f| f.category);
        signals.gaps.sort_by(|a, b| a.source.cmp(&b.source));

        let assessment = ClaimAssessment {
            claim_id: record.claim_id,
            run_id,
            fraud_score: outcome.fraud_score,
            risk_level,
            indicators,
            recommendation,
            network,
            state,
            state_trail: trail,
            breakdown: outcome.breakdown,
            coverage_gaps: signals.gaps,
            signal_failures: signals.failures,
            signal_losses: signals.losses,
            failure,
            started_at,
            completed_at: Utc::now(),
        };

        info!(
            fraud_score = assessment.fraud_score,
            risk_level = %assessment.risk_level,
            recommendation = %assessment.recommendation,
            indicators = assessment.indicators.len(),
            degraded = assessment.is_degraded(),
            ring = assessment.ring_detected(),
            duration_ms = assessment.duration_ms(),
            "Assessment run finished"
        );
        assessment
    }

    /// Produces a validated claim record
    async fn intake(
        &self,
        source: ClaimSource,
        metadata: &OperationMetadata,
    ) -> Result<ClaimRecord, HardRunFailure> {
        let record = match source {
            ClaimSource::Record(record) => record,
            ClaimSource::Document { reference, bytes } => {
                debug!(%reference, bytes = bytes.len(), "Extracting claim document");
                self.collaborators
                    .extractor
                    .extract(&bytes, metadata)
                    .await
                    .map_err(|e| {
                        warn!(%reference, error = %e, "Claim extraction failed");
                        HardRunFailure::from(e)
                    })?
            }
        };

        let warnings = ClaimValidator::validate(&record).into_result()?;
        for warning in warnings {
            debug!(claim_id = %record.claim_id, %warning, "Claim record warning");
        }
        Ok(record)
    }

    /// Runs every evaluator concurrently and joins their results
    async fn evaluate(&self, ctx: EvaluationContext) -> SignalCollection {
        let mut tasks = JoinSet::new();
        for evaluator in &self.evaluators {
            let evaluator = Arc::clone(evaluator);
            let ctx = ctx.clone();
            let category = evaluator.category();
            let limit = self.config.timeouts.for_category(category);
            tasks.spawn(
                async move {
                    let outcome = tokio::time::timeout(limit, evaluator.evaluate(&ctx)).await;
                    (category, outcome)
                }
                .in_current_span(),
            );
        }

        let mut collection = SignalCollection::default();
        let mut finished = BTreeSet::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((category, outcome)) => {
                    finished.insert(category);
                    self.absorb(category, outcome, &mut collection);
                }
                Err(e) => error!(error = %e, "Evaluator task did not complete"),
            }
        }

        for category in SignalCategory::ALL {
            if self.evaluators.iter().any(|e| e.category() == category) && !finished.contains(&category) {
                collection.gaps.push(CoverageGap::new(
                    CoverageSource::Signal(category),
                    "evaluator panicked",
                ));
                collection.fatal.get_or_insert(HardRunFailure::BranchPanicked {
                    branch: format!("{} evaluator", category),
                });
            }
        }
        collection
    }

    fn absorb(&self, category: SignalCategory, outcome: EvaluatorOutcome, collection: &mut SignalCollection) {
        match outcome {
            Err(_) => {
                let timeout_ms = self.config.timeouts.millis(category);
                warn!(%category, timeout_ms, "Evaluator timed out");
                let failure = SoftSignalFailure::timeout(category, timeout_ms);
                collection.gaps.push(CoverageGap::signal(&failure));
                collection.failures.push(failure);
            }
            Ok(Err(EvaluatorError::Soft { reason, .. })) => {
                warn!(%category, %reason, "Evaluator degraded");
                let failure = SoftSignalFailure::new(category, reason);
                collection.gaps.push(CoverageGap::signal(&failure));
                collection.failures.push(failure);
            }
            Ok(Err(EvaluatorError::Fatal { reason, .. })) => {
                error!(%category, %reason, "Evaluator failed");
                collection
                    .gaps
                    .push(CoverageGap::new(CoverageSource::Signal(category), reason.clone()));
                collection
                    .fatal
                    .get_or_insert(HardRunFailure::EvaluatorFatal { category, reason });
            }
            Ok(Ok(findings)) => {
                let normalized = self.normalizer.normalize(findings, category);
                debug!(
                    %category,
                    indicators = normalized.indicators.len(),
                    dropped = normalized.losses.len(),
                    "Evaluator finished"
                );
                collection.indicators.extend(normalized.indicators);
                collection.losses.extend(normalized.losses);
            }
        }
    }

    /// Ingests the claim into the shared graph and looks for a ring around it
    fn ingest(&self, record: &ClaimRecord) {
        let delta = self.builder.ingest(record);
        debug!(
            new_nodes = delta.new_nodes.len(),
            new_edges = delta.new_edges.len(),
            reinforced = delta.reinforced_edges.len(),
            "Claim ingested into graph"
        );
    }

    async fn detect_ring(
        &self,
        claim_id: ClaimId,
    ) -> Result<Result<NetworkAssessment, NetworkError>, tokio::task::JoinError> {
        let graph = Arc::clone(self.builder.graph());
        let detector = self.detector.clone();
        let radius = self.config.network.radius;
        let span = Span::current();

        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            detector.detect(&graph, &claim_id, radius)
        })
        .await
    }
}

fn enter(trail: &mut StateTrail, state: RunState) {
    if let Err(e) = trail.advance(state) {
        warn!(error = %e, "Ignoring invalid run state transition");
    }
}

/// Assessment for a run whose claim never got past intake
fn failed_intake(
    claim_id: ClaimId,
    run_id: RunId,
    mut trail: StateTrail,
    failure: HardRunFailure,
    started_at: chrono::DateTime<Utc>,
) -> ClaimAssessment {
    error!(failure = %failure, "Assessment run failed during intake");
    trail.fail();
    let claim_id = if claim_id.is_blank() {
        ClaimId::unassigned()
    } else {
        claim_id
    };

    let reason = failure.to_string();
    let mut coverage_gaps: Vec<CoverageGap> = SignalCategory::ALL
        .into_iter()
        .map(|category| CoverageGap::new(CoverageSource::Signal(category), reason.clone()))
        .collect();
    coverage_gaps.push(CoverageGap::new(CoverageSource::Network, reason));

    ClaimAssessment {
        claim_id,
        run_id,
        fraud_score: 0.0,
        risk_level: RiskLevel::Indeterminate,
        indicators: Vec::new(),
        recommendation: Recommendation::Review,
        network: None,
        state: RunState::Failed,
        state_trail: trail,
        breakdown: ScoreBreakdown::default(),
        coverage_gaps,
        signal_failures: Vec::new(),
        signal_losses: Vec::new(),
        failure: Some(failure),
        started_at,
        completed_at: Utc::now(),
    }
}
