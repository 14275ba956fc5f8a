//! Command implementations

pub mod config;
pub mod convert;
pub mod forecast;
pub mod match_item;
pub mod normalize;
pub mod run;
pub mod serve;
