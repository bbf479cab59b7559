//! Fontaweswimm CLI library.

pub mod cli;
