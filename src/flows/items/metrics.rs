// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for collection walks.
#[derive(Debug, Default)]
pub struct FetchMetrics {
	pages: AtomicU64,
	items: AtomicU64,
	failed_collections: AtomicU64,
	skipped_records: AtomicU64,
}
impl FetchMetrics {
	/// Returns the number of collection pages parsed successfully.
	pub fn pages(&self) -> u64 {
		self.pages.load(Ordering::Relaxed)
	}

	/// Returns the number of records normalized into items.
	pub fn items(&self) -> u64 {
		self.items.load(Ordering::Relaxed)
	}

	/// Returns the number of collections dropped because of a hard failure.
	pub fn failed_collections(&self) -> u64 {
		self.failed_collections.load(Ordering::Relaxed)
	}

	/// Returns the number of records skipped because they could not be read.
	pub fn skipped_records(&self) -> u64 {
		self.skipped_records.load(Ordering::Relaxed)
	}

	pub(crate) fn record_page(&self, items: usize) {
		self.pages.fetch_add(1, Ordering::Relaxed);
		self.items.fetch_add(u64::try_from(items).unwrap_or(u64::MAX), Ordering::Relaxed);
	}

	pub(crate) fn record_failed_collection(&self) {
		self.failed_collections.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_skipped_record(&self) {
		self.skipped_records.fetch_add(1, Ordering::Relaxed);
	}
}
