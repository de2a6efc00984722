//! Claim Assessment Service
//!
//! Orchestrates one assessment run per claim over the signal and network
//! domains:
//!
//! - **Engine**: intake, concurrent evaluator fan-out with per-evaluator
//!   timeouts, scoring, graph update and ring detection
//! - **Run state**: the per-run state machine and its recorded trail
//! - **Cancellation**: abort a run without producing an assessment
//! - **Narratives**: investigator summaries from a finished assessment
//! - **Configuration and telemetry**: layered config loading and tracing setup
//!
//! # Usage
//!
//! ```ignore
//! let config = AssessmentConfig::load(None)?;
//! init_tracing(&config.log_level, config.log_json)?;
//!
//! let engine = AssessmentEngine::new(config, collaborators, Arc::new(ClaimGraph::new()))?;
//! let assessment = engine.run_assessment(ClaimInput::record(record)).await?;
//! println!("{}", engine.narrate(&assessment).await);
//! ```

pub mod assessment;
pub mod cancel;
pub mod collaborators;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod narrative;
pub mod state;
pub mod telemetry;

pub use assessment::{ClaimAssessment, CoverageGap, CoverageSource};
pub use cancel::{CancelToken, RunCanceller};
pub use collaborators::{Collaborators, GraphClaimHistory};
pub use config::{AssessmentConfig, EvaluatorTimeouts};
pub use engine::AssessmentEngine;
pub use error::{AssessmentError, HardRunFailure};
pub use input::{ClaimInput, ClaimSource};
pub use narrative::{NarrativeGenerator, TemplateNarrative};
pub use state::{RunState, StateTrail, StateTransition};
pub use telemetry::init_tracing;
