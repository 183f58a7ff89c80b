// std
use std::iter::IntoIterator;
// self
use crate::{
	_prelude::*,
	auth::KEY_SEPARATOR,
	provider::{CrmCollection, ProviderDescriptor, ProviderEndpoints},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, ThisError)]
pub enum ProviderDescriptorError {
	/// Provider identifier is unusable as a key/item prefix.
	#[error("Provider identifier `{id}` must be non-empty lowercase ASCII without `:`.")]
	InvalidId {
		/// Rejected identifier.
		id: String,
	},
	/// Authorization endpoint is required.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is required.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// API base is required.
	#[error("Missing API base URL.")]
	MissingApiBase,
	/// API base cannot carry path segments (e.g. `mailto:` or `data:` URLs).
	#[error("API base URL `{url}` cannot be used as a base.")]
	InvalidApiBase {
		/// Offending URL.
		url: String,
	},
	/// A built-in URL constant failed to parse.
	#[error("Endpoint URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending URL.
		url: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// At least one collection must be walked.
	#[error("Descriptor must declare at least one collection.")]
	NoCollections,
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: String,
	/// Source label; defaults to the identifier.
	pub label: Option<String>,
	/// Consent screen URL.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint URL.
	pub token_endpoint: Option<Url>,
	/// Collection base URL.
	pub api_base: Option<Url>,
	/// Collections walked by the item fetcher.
	pub collections: Vec<CrmCollection>,
	/// Scope delimiter for the consent URL.
	pub scope_delimiter: char,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier and the default collections.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: None,
			authorization_endpoint: None,
			token_endpoint: None,
			api_base: None,
			collections: CrmCollection::defaults(),
			scope_delimiter: ' ',
		}
	}

	/// Sets the source label.
	pub fn label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the collection base URL.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Replaces the collections walked by the item fetcher.
	pub fn collections<I>(mut self, collections: I) -> Self
	where
		I: IntoIterator<Item = CrmCollection>,
	{
		self.collections = collections.into_iter().collect();

		self
	}

	/// Overrides the scope delimiter.
	pub fn scope_delimiter(mut self, delimiter: char) -> Self {
		self.scope_delimiter = delimiter;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let api_base = self.api_base.ok_or(ProviderDescriptorError::MissingApiBase)?;
		let label = self.label.unwrap_or_else(|| self.id.clone());
		let descriptor = ProviderDescriptor {
			id: self.id,
			label,
			endpoints: ProviderEndpoints { authorization, token, api_base },
			collections: self.collections,
			scope_delimiter: self.scope_delimiter,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_id(&self.id)?;

		if self.endpoints.api_base.cannot_be_a_base() {
			return Err(ProviderDescriptorError::InvalidApiBase {
				url: self.endpoints.api_base.to_string(),
			});
		}
		if self.collections.is_empty() {
			return Err(ProviderDescriptorError::NoCollections);
		}
		if self.scope_delimiter.is_control() {
			return Err(ProviderDescriptorError::InvalidScopeDelimiter {
				delimiter: self.scope_delimiter,
			});
		}

		Ok(())
	}
}

fn validate_id(id: &str) -> Result<(), ProviderDescriptorError> {
	let valid = !id.is_empty()
		&& !id.contains(KEY_SEPARATOR)
		&& id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

	if valid { Ok(()) } else { Err(ProviderDescriptorError::InvalidId { id: id.to_owned() }) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::item::ItemType;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse descriptor fixture URL.")
	}

	fn complete(id: &str) -> ProviderDescriptorBuilder {
		ProviderDescriptor::builder(id)
			.authorization_endpoint(url("https://example.com/auth"))
			.token_endpoint(url("https://example.com/token"))
			.api_base(url("https://example.com/crm"))
	}

	#[test]
	fn builder_requires_every_endpoint() {
		let err = ProviderDescriptor::builder("mock")
			.token_endpoint(url("https://example.com/token"))
			.api_base(url("https://example.com/crm"))
			.build()
			.expect_err("Missing authorization endpoint should fail.");

		assert!(matches!(err, ProviderDescriptorError::MissingAuthorizationEndpoint));

		let err = ProviderDescriptor::builder("mock")
			.authorization_endpoint(url("https://example.com/auth"))
			.token_endpoint(url("https://example.com/token"))
			.build()
			.expect_err("Missing API base should fail.");

		assert!(matches!(err, ProviderDescriptorError::MissingApiBase));
	}

	#[test]
	fn builder_rejects_bad_ids_and_bases() {
		for id in ["", "Hub", "hub:spot", "hub spot"] {
			assert!(matches!(
				complete(id).build(),
				Err(ProviderDescriptorError::InvalidId { .. })
			));
		}

		let err = complete("mock")
			.api_base(url("mailto:crm@example.com"))
			.build()
			.expect_err("Opaque API base should fail.");

		assert!(matches!(err, ProviderDescriptorError::InvalidApiBase { .. }));
	}

	#[test]
	fn builder_defaults_label_and_collections() {
		let descriptor = complete("mock").build().expect("Descriptor should build.");

		assert_eq!(descriptor.label, "mock");
		assert_eq!(descriptor.collections, CrmCollection::defaults());

		let err = complete("mock")
			.collections(Vec::new())
			.build()
			.expect_err("Empty collection list should fail.");

		assert!(matches!(err, ProviderDescriptorError::NoCollections));

		let descriptor = complete("mock")
			.collections([CrmCollection::new("deals", ItemType::Deal)])
			.build()
			.expect("Descriptor should build.");

		assert_eq!(descriptor.collections.len(), 1);
	}

	#[test]
	fn control_characters_cannot_delimit_scopes() {
		let err = complete("mock")
			.scope_delimiter('\n')
			.build()
			.expect_err("Control delimiter should fail.");

		assert!(matches!(err, ProviderDescriptorError::InvalidScopeDelimiter { delimiter: '\n' }));
	}
}
