//! Case exporters.
//!
//! - [`write_json`] - the `to_dict` field map as a JSON object, loadable
//!   again through the `.json` importer
//! - [`write_csv_dir`] - one CSV per table plus a `case.csv` summary

pub mod csv_directory;
pub mod json;

pub use csv_directory::write_csv_dir;
pub use json::{case_to_json, write_json};
