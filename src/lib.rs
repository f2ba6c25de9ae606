//! # nfamatch - multi-criteria best-match decision engine
//!
//! A query is a fixed-length vector of field values, one per criterion. It is
//! matched against a precompiled level table: an acyclic, multi-level
//! transition structure where each level applies one criterion and adds that
//! criterion's weight to the running score when it matches without a
//! wildcard. The highest-scoring terminal edge identifies the matched rule.
//!
//! ## Architecture
//!
//! - [`engine`] - criterion schema, comparison functors, level matcher and the
//!   recursive best-match search
//! - [`table`] - packed edge codec, table loader/validator and encoders
//! - [`workload`] - query workload loader
//! - [`batch`] - parallel batch execution, timing sweep and report writers
//! - [`config`] - run configuration
//!
//! ## Quick Start
//!
//! ```no_run
//! use nfamatch::engine::{Engine, DEFAULT_SCHEMA};
//! use nfamatch::table::LevelTable;
//! use std::path::Path;
//!
//! let table = LevelTable::open(Path::new("rules.bin")).unwrap();
//! let engine = Engine::new(&table, &DEFAULT_SCHEMA).unwrap();
//!
//! let query = [0u16; 22];
//! let result = engine.evaluate(&query).unwrap();
//! println!("rule {} (weight {})", result.pointer, result.weight);
//! ```
//!
//! The same table and workload encodings are consumed by the hardware
//! accelerator path, which must produce identical pointers for the same
//! inputs.

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod table;
pub mod utils;
pub mod workload;

pub use error::{MatchError, Result};
