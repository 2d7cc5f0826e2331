//! MATPOWER case importers.
//!
//! The [`MatpowerParser`] implements [`caseframes_core::CaseParser`] in two
//! steps:
//!
//! 1. **Locate** - [`locator::Locator`] finds `mpc.<name> = ...`
//!    declarations and the raw text span of each value
//! 2. **Parse lines** - [`line_parser::parse_rows`] strips comments and
//!    turns each span line into a row of typed cells
//!
//! Column naming and table building happen in `caseframes-core`.
//!
//! ```no_run
//! use caseframes_core::LoadOptions;
//! use caseframes_io::importers::load_case_file;
//!
//! let import = load_case_file("case9.m".as_ref(), &LoadOptions::default())?;
//! println!("{} buses", import.case.bus().map(|b| b.n_rows()).unwrap_or(0));
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod format;
pub mod line_parser;
pub mod locator;
mod matpower;

pub use format::{resolve_source, SourceFormat};
pub use matpower::{load_case_file, load_case_str, MatpowerParser};
