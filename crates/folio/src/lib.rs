#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/folio-rs/folio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod classifier;
pub mod concept;
pub mod context;
pub mod error;
pub mod labels;
pub mod matcher;
pub mod presentation;
pub mod statement;

pub use classifier::{KeywordClassifier, PeriodClassifier, is_statement_like};
pub use concept::{Concept, resolve_href};
pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use error::{Result, StatementError};
pub use labels::{LabelClass, LabelMap};
pub use matcher::{FactIndex, FactMatcher, FactSource, MatchedFact, PeriodKind, PeriodPolicy, TargetPeriod};
pub use presentation::{Child, GraphBuilder, Role, Visit, Walk};
pub use statement::{ExtractionReport, OutputRow, SkippedRole, Statement, extract, materialize};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
