//! Editor behaviour on top of the `mia-core` text predicates: boundary
//! scans, line selections, paste case preservation and the clipboard and
//! delete helpers the actions use.

pub mod boundary;
pub mod case_preserve;
pub mod clipboard;
pub mod config;
pub mod delete_regex;
pub mod host;
pub mod inserted_range;
pub mod line_selection;
pub mod movement;
pub mod pattern;
pub mod position;
pub mod prefix;
pub mod reentry;
pub mod scheduler;
pub mod selection;
