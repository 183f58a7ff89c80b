//! Provider descriptor data structures shared by all connector flows.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, item::ItemType};

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Consent screen the browser is redirected to.
	pub authorization: Url,
	/// Server-to-server token endpoint used for the code exchange.
	pub token: Url,
	/// Base of the CRM object collections (`{api_base}/{endpoint}`).
	pub api_base: Url,
}

/// A CRM object collection and the item type its records normalize into.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmCollection {
	/// Path segment under the API base (`contacts`, `companies`, ...).
	pub endpoint: String,
	/// Item type assigned to every record of the collection.
	pub item_type: ItemType,
}
impl CrmCollection {
	/// Creates a collection descriptor.
	pub fn new(endpoint: impl Into<String>, item_type: ItemType) -> Self {
		Self { endpoint: endpoint.into(), item_type }
	}

	/// The four collections walked by default, in fetch order.
	pub fn defaults() -> Vec<Self> {
		vec![
			Self::new("contacts", ItemType::Contact),
			Self::new("companies", ItemType::Company),
			Self::new("deals", ItemType::Deal),
			Self::new("tickets", ItemType::Ticket),
		]
	}
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Lowercase identifier used as store key prefix and item id prefix (`hubspot`).
	pub id: String,
	/// Human-facing source label written into `parent_path_or_name` (`HubSpot`).
	pub label: String,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Collections walked by the item fetcher, in order.
	pub collections: Vec<CrmCollection>,
	/// Character used to join scopes in the consent URL.
	pub scope_delimiter: char,
}
impl ProviderDescriptor {
	/// HubSpot consent screen.
	pub const HUBSPOT_AUTHORIZATION_URL: &'static str = "https://app.hubspot.com/oauth/authorize";
	/// HubSpot token endpoint.
	pub const HUBSPOT_TOKEN_URL: &'static str = "https://api.hubapi.com/oauth/v1/token";
	/// HubSpot CRM v3 object collections.
	pub const HUBSPOT_API_BASE: &'static str = "https://api.hubapi.com/crm/v3/objects";

	/// Creates a new builder for the provided identifier.
	pub fn builder(id: impl Into<String>) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Production HubSpot descriptor.
	pub fn hubspot() -> Result<Self, ProviderDescriptorError> {
		Self::builder("hubspot")
			.label("HubSpot")
			.authorization_endpoint(parse_static(Self::HUBSPOT_AUTHORIZATION_URL)?)
			.token_endpoint(parse_static(Self::HUBSPOT_TOKEN_URL)?)
			.api_base(parse_static(Self::HUBSPOT_API_BASE)?)
			.build()
	}

	/// Resolves the URL of a collection endpoint under the API base.
	pub fn collection_url(&self, endpoint: &str) -> Result<Url, ProviderDescriptorError> {
		let mut url = self.endpoints.api_base.clone();

		url.path_segments_mut()
			.map_err(|_| ProviderDescriptorError::InvalidApiBase {
				url: self.endpoints.api_base.to_string(),
			})?
			.pop_if_empty()
			.push(endpoint);

		Ok(url)
	}
}

fn parse_static(raw: &'static str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(raw).map_err(|source| ProviderDescriptorError::InvalidUrl { url: raw, source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn hubspot_descriptor_points_at_production_endpoints() {
		let descriptor = ProviderDescriptor::hubspot().expect("HubSpot descriptor should build.");

		assert_eq!(descriptor.id, "hubspot");
		assert_eq!(descriptor.label, "HubSpot");
		assert_eq!(descriptor.endpoints.token.as_str(), ProviderDescriptor::HUBSPOT_TOKEN_URL);
		assert_eq!(
			descriptor.collections.iter().map(|c| c.endpoint.as_str()).collect::<Vec<_>>(),
			["contacts", "companies", "deals", "tickets"]
		);
	}

	#[test]
	fn collection_url_appends_a_single_segment() {
		let descriptor = ProviderDescriptor::hubspot().expect("HubSpot descriptor should build.");

		assert_eq!(
			descriptor.collection_url("deals").expect("Collection URL should resolve.").as_str(),
			"https://api.hubapi.com/crm/v3/objects/deals"
		);

		let trailing = ProviderDescriptor::builder("mock")
			.label("Mock")
			.authorization_endpoint(Url::parse("http://127.0.0.1/auth").expect("URL should parse."))
			.token_endpoint(Url::parse("http://127.0.0.1/token").expect("URL should parse."))
			.api_base(Url::parse("http://127.0.0.1/crm/").expect("URL should parse."))
			.build()
			.expect("Descriptor should build.");

		assert_eq!(
			trailing.collection_url("tickets").expect("Collection URL should resolve.").as_str(),
			"http://127.0.0.1/crm/tickets"
		);
	}
}
