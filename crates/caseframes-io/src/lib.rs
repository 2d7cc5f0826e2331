//! # caseframes-io: MATPOWER Case I/O
//!
//! Reads MATPOWER case files into [`caseframes_core::Case`] tables and writes
//! cases back out.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use caseframes_core::LoadOptions;
//! use caseframes_io::{exporters::write_json, importers::load_case_file};
//!
//! fn main() -> anyhow::Result<()> {
//!     let import = load_case_file("case9.m".as_ref(), &LoadOptions::default())?;
//!     for issue in &import.diagnostics.issues {
//!         eprintln!("{}", issue);
//!     }
//!     write_json(&import.case, "case9.json".as_ref())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Sources
//!
//! | Source | Extensions | Notes |
//! |--------|------------|-------|
//! | MATPOWER | `.m` | Extension-less names resolve to `<name>.m` |
//! | JSON field dictionary | `.json` | As written by [`exporters::write_json`] |
//!
//! ## Module Overview
//!
//! - [`importers`] - locator, line parser, [`importers::MatpowerParser`] and file loading
//! - [`exporters`] - JSON and CSV directory writers

pub mod exporters;
pub mod importers;

pub use exporters::{write_csv_dir, write_json};
pub use importers::{load_case_file, load_case_str, MatpowerParser};
