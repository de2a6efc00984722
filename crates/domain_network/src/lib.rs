//! Claim Network Domain
//!
//! Cross-claim analysis over a shared entity graph:
//!
//! - **Entity resolution**: claimants, providers, addresses, phones and bank
//!   accounts normalized into stable keys
//! - **Claim graph**: a concurrent store of entity nodes and weighted edges,
//!   shared by every assessment run
//! - **Graph builder**: idempotent ingestion of claim records
//! - **Ring detector**: bounded traversal and suspicion scoring around a claim
//!
//! # Usage
//!
//! ```ignore
//! let graph = Arc::new(ClaimGraph::new());
//! let builder = GraphBuilder::new(graph.clone(), config.coordinated_window_days);
//! builder.ingest(&record);
//!
//! let detector = RingDetector::new(config.clone())?;
//! let network = detector.detect(&graph, &record.claim_id, config.radius)?;
//! ```

pub mod entity;
pub mod edge;
pub mod graph;
pub mod builder;
pub mod query;
pub mod ring;
pub mod config;
pub mod error;

pub use entity::{ClaimEntities, EntityKey, EntityKind, EntityNode};
pub use edge::{EdgeId, EdgeType, EntityEdge};
pub use graph::{ClaimGraph, EdgeChange, GraphSnapshot};
pub use builder::{GraphBuilder, GraphDelta};
pub use query::{query_graph, Subgraph};
pub use ring::{NetworkAssessment, RingDetector};
pub use config::{NetworkConfig, RingWeights};
pub use error::NetworkError;
