//! Core library for the sectoral-diff command line application.
//!
//! The library compares a climate-emissions simulation against the EDGAR
//! reference inventory, sector by sector and gas by gas. The modules keep
//! responsibilities narrow and composable: IO adapters live under
//! [`emissions::diff::io`], data representations inside
//! [`emissions::diff::model`], mapping-driven aggregation in
//! [`emissions::diff::aggregate`], the diff roll-ups in
//! [`emissions::diff::report`], and the end-to-end orchestration under
//! [`emissions::diff::pipeline`].

pub mod emissions;

pub use emissions::diff::{
    DiffError, Result, aggregate, config, error, io, model, pipeline, report,
};
