#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/folio-rs/folio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod edgar;
pub mod error;
pub mod facts;
pub mod instance;
pub mod linkbase;
pub mod schema;

mod xml;

pub use error::{DataError, Result};
pub use facts::{CompanyFacts, Fact, FactPeriod, FactValue};
pub use instance::Instance;
pub use linkbase::{ExtendedLink, LinkArc, Linkbase, Locator, Resource};
pub use schema::{LinkbaseRef, RoleType, Schema};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
