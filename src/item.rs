//! Provider-agnostic integration items and the CRM record normalizer.
//!
//! Every connector in the platform emits [`IntegrationItem`]s; this module maps raw CRM
//! object records into that shape. Name derivation dispatches on [`ItemType`] with one arm
//! per type so a new type cannot be added without deciding how it is named.

// crates.io
use serde::Deserializer;
use serde_json::{Map, Number, Value};
// self
use crate::{_prelude::*, provider::ProviderDescriptor};

/// Kind of CRM object an item was normalized from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemType {
	/// CRM contact (person).
	Contact,
	/// CRM company.
	Company,
	/// CRM deal.
	Deal,
	/// Service ticket.
	Ticket,
	/// Any other object type, carried by its raw label.
	Other(String),
}
impl ItemType {
	/// Returns the lowercase label used in item ids and the `type` field.
	pub fn as_str(&self) -> &str {
		match self {
			ItemType::Contact => "contact",
			ItemType::Company => "company",
			ItemType::Deal => "deal",
			ItemType::Ticket => "ticket",
			ItemType::Other(label) => label,
		}
	}
}
impl From<String> for ItemType {
	fn from(value: String) -> Self {
		match value.as_str() {
			"contact" => ItemType::Contact,
			"company" => ItemType::Company,
			"deal" => ItemType::Deal,
			"ticket" => ItemType::Ticket,
			_ => ItemType::Other(value),
		}
	}
}
impl From<ItemType> for String {
	fn from(value: ItemType) -> Self {
		match value {
			ItemType::Other(label) => label,
			known => known.as_str().to_owned(),
		}
	}
}
impl Display for ItemType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One raw record from a CRM collection page.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CrmRecord {
	/// Provider-side object id (numbers are accepted and rendered as text).
	#[serde(deserialize_with = "deserialize_record_id")]
	pub id: String,
	/// Object properties; absent or `null` maps to an empty set.
	#[serde(default, deserialize_with = "deserialize_properties")]
	pub properties: Map<String, Value>,
}
impl CrmRecord {
	/// Returns a property as text, treating `null` and empty strings as absent.
	pub fn property(&self, name: &str) -> Option<String> {
		match self.properties.get(name)? {
			Value::String(text) if !text.is_empty() => Some(text.clone()),
			Value::Number(number) => Some(number.to_string()),
			Value::Bool(flag) => Some(flag.to_string()),
			_ => None,
		}
	}

	fn display_name(&self, item_type: &ItemType) -> String {
		let placeholder = |label: &str| format!("{label} {}", self.id);

		match item_type {
			ItemType::Contact => {
				let first = self.property("firstname").unwrap_or_default();
				let last = self.property("lastname").unwrap_or_default();
				let full = format!("{first} {last}");
				let full = full.trim();

				if full.is_empty() {
					self.property("email").unwrap_or_else(|| placeholder("Contact"))
				} else {
					full.to_owned()
				}
			},
			ItemType::Company => self.property("name").unwrap_or_else(|| placeholder("Company")),
			ItemType::Deal => self.property("dealname").unwrap_or_else(|| placeholder("Deal")),
			ItemType::Ticket => self.property("subject").unwrap_or_else(|| placeholder("Ticket")),
			ItemType::Other(label) => placeholder(&capitalize(label)),
		}
	}
}

/// Provider-agnostic item shared by every connector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationItem {
	/// Globally unique id: `{provider}_{type}_{raw_id}`.
	pub id: String,
	/// Display name derived per item type.
	pub name: String,
	/// Item type label.
	#[serde(rename = "type")]
	pub item_type: ItemType,
	/// Creation timestamp exactly as the source reported it.
	pub creation_time: Option<String>,
	/// Last-modified timestamp exactly as the source reported it.
	pub last_modified_time: Option<String>,
	/// Parent item id; CRM objects are flat so this is always `None`.
	pub parent_id: Option<String>,
	/// Source system label.
	pub parent_path_or_name: Option<String>,
}
impl IntegrationItem {
	/// Normalizes a raw record. Never fails for a record that deserialized.
	pub fn from_record(
		descriptor: &ProviderDescriptor,
		record: &CrmRecord,
		item_type: &ItemType,
	) -> Self {
		Self {
			id: format!("{}_{}_{}", descriptor.id, item_type, record.id),
			name: record.display_name(item_type),
			item_type: item_type.clone(),
			creation_time: record.property("createdate"),
			last_modified_time: record
				.property("lastmodifieddate")
				.or_else(|| record.property("hs_lastmodifieddate")),
			parent_id: None,
			parent_path_or_name: Some(descriptor.label.clone()),
		}
	}
}

fn capitalize(label: &str) -> String {
	let mut chars = label.chars();

	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
		None => String::new(),
	}
}

fn deserialize_record_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum RawId {
		Text(String),
		Number(Number),
	}

	Ok(match RawId::deserialize(deserializer)? {
		RawId::Text(text) => text,
		RawId::Number(number) => number.to_string(),
	})
}

fn deserialize_properties<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}
