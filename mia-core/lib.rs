use smartstring::{LazyCompact, SmartString};

pub mod case_convention;
pub mod chars;
pub mod classify;
pub mod line_ending;
pub mod text;
pub mod word_range;
pub mod word_study;

pub type Tendril = SmartString<LazyCompact>;
