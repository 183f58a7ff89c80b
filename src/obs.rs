//! Observability helpers for connector operations.
//!
//! Every public operation runs inside a `hubspot_connector.op` tracing span carrying `op`
//! and `stage` fields. With the `metrics` feature enabled, the
//! `hubspot_connector_op_total` counter is incremented for every attempt/success/failure,
//! labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Connector operations observed by spans and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectorOp {
	/// Consent URL minting.
	Authorize,
	/// Redirect handling and code exchange.
	Callback,
	/// Consume-once credential retrieval.
	Credentials,
	/// Collection walk and normalization.
	Items,
}
impl ConnectorOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ConnectorOp::Authorize => "authorize",
			ConnectorOp::Callback => "oauth_callback",
			ConnectorOp::Credentials => "get_credentials",
			ConnectorOp::Items => "get_items",
		}
	}
}
impl Display for ConnectorOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a connector operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span, recording attempt and outcome.
pub(crate) async fn observe<T, Fut>(op: ConnectorOp, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OpSpan::new(op, stage);

	record_op_outcome(op, OpOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_op_outcome(op, OpOutcome::Success),
		Err(e) => {
			let _guard = span.entered();

			::tracing::warn!(error = %e, client_error = e.is_client_error(), "Operation failed.");
			record_op_outcome(op, OpOutcome::Failure);
		},
	}

	result
}
