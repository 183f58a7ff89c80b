//! Collection walks over the CRM object API and item normalization.
//!
//! [`Connector::get_items`] visits every collection named by the provider descriptor in
//! order. Each collection is paged with a cursor until the provider stops returning one.
//! Records are normalized one at a time and unreadable records are skipped. A non-200 page
//! or a failure after the first page ends that collection early but keeps what was already
//! collected. Only a failure on the first page drops the collection.

mod metrics;

pub use self::metrics::FetchMetrics;

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
	error::ConfigError,
	flows::{Connector, PAGE_LIMIT},
	http::ConnectorHttpClient,
	item::{CrmRecord, IntegrationItem},
	oauth::{self, Endpoint, TransportErrorMapper},
	obs::{self, ConnectorOp, OpSpan},
	provider::CrmCollection,
};

/// Items gathered from one collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionFetch {
	/// Normalized items in page-arrival order.
	pub items: Vec<IntegrationItem>,
	/// Reason the walk ended before the last page, if it did.
	pub stop: Option<CollectionStop>,
}
impl CollectionFetch {
	/// Returns `true` when every page was read.
	pub fn is_complete(&self) -> bool {
		self.stop.is_none()
	}

	/// Status of the page request that ended the walk early, if any.
	pub fn stopped_status(&self) -> Option<u16> {
		match self.stop {
			Some(CollectionStop::Status { status, .. }) => Some(status),
			_ => None,
		}
	}

	/// Retry-After hint sent with the page that ended the walk, if any.
	pub fn retry_after(&self) -> Option<Duration> {
		match self.stop {
			Some(CollectionStop::Status { retry_after, .. }) => retry_after,
			_ => None,
		}
	}
}

/// Why a collection walk ended early.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectionStop {
	/// A page request returned a non-200 status.
	Status {
		/// HTTP status of the rejected page.
		status: u16,
		/// Retry-After hint attached to the rejection.
		retry_after: Option<Duration>,
	},
	/// A page after the first failed in transport or could not be read.
	Failed {
		/// Rendered error.
		reason: String,
	},
}

enum PageOutcome {
	Page(CollectionPage),
	Rejected(CollectionStop),
}

#[derive(Debug, Deserialize)]
struct CollectionPage {
	#[serde(default)]
	results: Vec<Value>,
	#[serde(default)]
	paging: Option<Paging>,
}
impl CollectionPage {
	fn next_cursor(&mut self) -> Option<String> {
		self.paging
			.take()
			.and_then(|paging| paging.next)
			.map(|next| next.after)
			.filter(|after| !after.is_empty())
	}
}

#[derive(Debug, Deserialize)]
struct Paging {
	#[serde(default)]
	next: Option<NextPage>,
}

#[derive(Debug, Deserialize)]
struct NextPage {
	after: String,
}

impl<C, M> Connector<C, M>
where
	C: ?Sized + ConnectorHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches and normalizes every configured collection.
	///
	/// Fails only when the credentials carry no access token; per-collection failures are
	/// logged and skipped.
	pub async fn get_items(&self, credentials: &Credentials) -> Result<Vec<IntegrationItem>> {
		obs::observe(ConnectorOp::Items, "get_items", async move {
			let token = credentials.access_token().ok_or(Error::NoAccessToken)?;
			let mut items = Vec::new();

			for collection in &self.descriptor.collections {
				match self.fetch_collection(&token, collection).await {
					Ok(fetch) => {
						tracing::info!(
							endpoint = %collection.endpoint,
							count = fetch.items.len(),
							complete = fetch.is_complete(),
							"Fetched collection."
						);

						items.extend(fetch.items);
					},
					Err(e) => {
						self.fetch_metrics.record_failed_collection();

						tracing::warn!(
							endpoint = %collection.endpoint,
							error = %e,
							"Skipping collection after fetch failure."
						);
					},
				}
			}

			tracing::info!(count = items.len(), "Fetched all collections.");

			Ok(items)
		})
		.await
	}

	/// Same as [`Connector::get_items`] but accepts the JSON-serialized credentials.
	pub async fn get_items_from_json(&self, credentials: &str) -> Result<Vec<IntegrationItem>> {
		let credentials = Credentials::from_json(credentials)?;

		self.get_items(&credentials).await
	}

	/// Walks one collection page by page.
	///
	/// A failure on the first page is returned as an error. Later failures and non-200 pages
	/// stop the walk and are recorded in [`CollectionFetch::stop`].
	pub async fn fetch_collection(
		&self,
		access_token: &TokenSecret,
		collection: &CrmCollection,
	) -> Result<CollectionFetch> {
		let span = OpSpan::new(ConnectorOp::Items, "fetch_collection");

		span.instrument(async move {
			let url =
				self.descriptor.collection_url(&collection.endpoint).map_err(ConfigError::from)?;
			let mut fetch = CollectionFetch::default();
			let mut after = None::<String>;

			loop {
				let mut page =
					match self.next_page(&url, access_token, collection, after.as_deref()).await {
						Ok(PageOutcome::Page(page)) => page,
						Ok(PageOutcome::Rejected(stop)) => {
							fetch.stop = Some(stop);

							break;
						},
						Err(e) if after.is_some() => {
							tracing::warn!(
								endpoint = %collection.endpoint,
								error = %e,
								kept = fetch.items.len(),
								"Collection page failed; keeping partial results."
							);

							fetch.stop = Some(CollectionStop::Failed { reason: e.to_string() });

							break;
						},
						Err(e) => return Err(e),
					};
				let received = page.results.len();
				let before = fetch.items.len();

				for raw in page.results.drain(..) {
					match serde_json::from_value::<CrmRecord>(raw) {
						Ok(record) => fetch.items.push(IntegrationItem::from_record(
							&self.descriptor,
							&record,
							&collection.item_type,
						)),
						Err(e) => {
							self.fetch_metrics.record_skipped_record();

							tracing::warn!(
								endpoint = %collection.endpoint,
								error = %e,
								"Skipping unreadable record."
							);
						},
					}
				}

				let normalized = fetch.items.len() - before;

				self.fetch_metrics.record_page(normalized);

				tracing::debug!(
					endpoint = %collection.endpoint,
					received,
					normalized,
					"Fetched collection page."
				);

				match page.next_cursor() {
					Some(cursor) => after = Some(cursor),
					None => break,
				}
			}

			Ok(fetch)
		})
		.await
	}

	async fn next_page(
		&self,
		url: &Url,
		access_token: &TokenSecret,
		collection: &CrmCollection,
		after: Option<&str>,
	) -> Result<PageOutcome> {
		let request = oauth::collection_page_request(url, access_token, PAGE_LIMIT, after)?;
		let (response, meta) = self.send(Endpoint::Collection, request).await?;
		let status = response.status().as_u16();

		if status != 200 {
			tracing::warn!(
				endpoint = %collection.endpoint,
				status,
				retry_after = ?meta.retry_after,
				body = %oauth::body_preview(&response),
				"Collection page request failed; keeping partial results."
			);

			return Ok(PageOutcome::Rejected(CollectionStop::Status {
				status,
				retry_after: meta.retry_after,
			}));
		}

		Ok(PageOutcome::Page(oauth::parse_json_body(Endpoint::Collection, &response)?))
	}
}
