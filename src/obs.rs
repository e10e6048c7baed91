//! Optional observability helpers for refresh coordination.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `singleflight.refresh` with the `stage`
//!   (call site) field.
//! - Enable `metrics` to increment the `singleflight_refresh_total` counter for every
//!   attempt/success/failure (labeled by `outcome`) and `singleflight_refresh_path_total` for
//!   every race resolution (labeled by `path`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Which side of the single-flight race an invocation landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshPath {
	/// Acquired the lease and performed the authority round-trip.
	Winner,
	/// Lost the race and polled for the winner's cached result.
	Waiter,
}
impl RefreshPath {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshPath::Winner => "winner",
			RefreshPath::Waiter => "waiter",
		}
	}
}
impl Display for RefreshPath {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each refresh attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
	/// Entry into the coordinator.
	Attempt,
	/// Successful completion, fresh or cached.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl RefreshOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshOutcome::Attempt => "attempt",
			RefreshOutcome::Success => "success",
			RefreshOutcome::Failure => "failure",
		}
	}
}
impl Display for RefreshOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
