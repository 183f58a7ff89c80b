//! Provider-facing descriptors: endpoints, naming, and the CRM collections to walk.
//!
//! `descriptor` exposes validated metadata ([`ProviderDescriptor`]) so the connector can be
//! pointed at HubSpot in production and at a mock server in tests without touching the
//! flows themselves.

pub mod descriptor;

pub use descriptor::*;
