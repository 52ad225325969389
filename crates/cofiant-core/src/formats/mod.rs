//! # Formats Module
//!
//! Binary encodings of core data. Pure byte transforms; file I/O lives in
//! the app layer.

mod persistence;

pub use persistence::*;
