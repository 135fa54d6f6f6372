#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/folio-rs/folio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod render;

pub use export::{ExportError, ExportFormat, Exporter, export_statements, role_file_stem};
pub use render::render_statement;
