//! Form submissions module: REST surface, domain rules and the document
//! store adapters behind them.

pub mod api;
pub mod domain;
pub mod infra;
