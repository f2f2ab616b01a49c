//! Static passes run over the syntax tree before evaluation.

pub mod resolve;
