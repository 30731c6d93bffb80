//! Token sinks for compiled transliteration schemes
//!
//! The compiler hands every token, stem rule and piece of metadata to a
//! [`TokenSink`]. This crate defines that seam and ships [`MemorySink`], an
//! in-memory implementation that mirrors the engine's insert-time behaviour
//! and can export a [`SymbolTable`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use vstc_sink::{MemorySink, SinkOption, TokenSink};
//!
//! let mut sink = MemorySink::new();
//! sink.configure(SinkOption::IgnoreDuplicates(false))?;
//! ```

pub mod sink;
pub mod memory;
pub mod table;

pub use sink::{SinkError, SinkOption, TokenSink};
pub use memory::{MemorySink, SYMBOL_MAX, ZWJ, ZWNJ};
pub use table::{StemException, StemRule, SymbolTable, TableError};
