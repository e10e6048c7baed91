//! Auth-domain value types: verified subjects, token pairs, and secret wrappers.

pub mod subject;
pub mod token;

pub use subject::*;
pub use token::{pair::*, secret::*};
