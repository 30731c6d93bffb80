//! vstc compiler - scheme compilation core
//!
//! This crate turns scheme declarations into validated, normalized tokens:
//! - Shape validation of pattern => value mappings
//! - Priority and accept condition resolution
//! - Token building with exact and possibility matches
//! - Tag and list scopes
//! - Consonant-vowel compound generation
//! - Placeholder combination over token lists
//! - Default symbol injection

pub mod value;
pub mod error;
pub mod context;
pub mod validate;
pub mod resolve;
pub mod lists;
pub mod cv;
pub mod combine;
pub mod session;

pub use value::{PatternValue, SchemeValue, TokenMap};
pub use error::CompileError;
pub use context::DiagnosticsContext;
pub use validate::validate;
pub use resolve::{resolve_accept, resolve_priority};
pub use lists::{CustomList, ListRegistry};
pub use combine::combine;
pub use session::{CompilationSession, CompileOutcome, TokenFilter, TokenOptions, TokenSource};
