//! Token pair wire model and the redacting secret wrapper.

pub mod pair;
pub mod secret;
