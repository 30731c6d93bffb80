//! Scheme files and their execution
//!
//! This crate handles:
//! - Parsing `*.scheme.toml` sources into ordered steps
//! - Converting TOML values into compiler inputs
//! - Running the steps against a compilation session
//! - Compiling a whole file into a report and a filled sink

pub mod source;
pub mod interpreter;

pub use source::{
    mapping_value, scheme_value, CategoryStep, CombineSource, CombineStep, SchemeError, SchemeHeader,
    SchemeSource, Step,
};
pub use interpreter::{compile_file, Compiled, Interpreter};
