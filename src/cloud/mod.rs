//! Cloud Service Catalogs
//!
//! Static per-provider tables mapping requirements onto managed services with
//! monthly cost estimates. Lookups are pure: the same provider and
//! requirement set always yield the same resources in catalog order.

mod aws;
mod azure;

use serde_json::Value;
use tracing::debug;

use crate::config::CloudConfig;
use crate::types::{CloudProvider, CloudResource, Requirement, RequirementSet};

/// One managed service in a provider catalog
#[derive(Debug)]
pub struct ServiceEntry {
    /// Requirements this service satisfies
    pub requirements: &'static [Requirement],
    /// Functional slot ("frontend_cdn", "primary_database", ...)
    pub resource_type: &'static str,
    pub service_name: &'static str,
    /// Estimated monthly cost in USD
    pub monthly_cost: f64,
    /// Default configuration for a region/location
    pub configure: fn(&str) -> Value,
}

impl ServiceEntry {
    fn satisfies(&self, requirements: &RequirementSet) -> bool {
        self.requirements.iter().any(|r| requirements.contains(*r))
    }
}

/// Static catalog for a provider
pub fn catalog(provider: CloudProvider) -> &'static [ServiceEntry] {
    match provider {
        CloudProvider::Aws => aws::CATALOG,
        CloudProvider::Azure => azure::CATALOG,
    }
}

/// Monthly cost of a resource type in a provider's catalog
pub fn monthly_cost(provider: CloudProvider, resource_type: &str) -> Option<f64> {
    catalog(provider)
        .iter()
        .find(|entry| entry.resource_type == resource_type)
        .map(|entry| entry.monthly_cost)
}

/// Sum of monthly costs for `provider`; other providers' resources are ignored
pub fn estimate_total_cost(provider: CloudProvider, resources: &[CloudResource]) -> f64 {
    resources
        .iter()
        .filter(|r| r.provider == provider)
        .map(|r| r.monthly_cost)
        .sum()
}

/// Resource builder bound to configured regions
#[derive(Debug, Clone)]
pub struct CloudCatalog {
    aws_region: String,
    azure_location: String,
}

impl Default for CloudCatalog {
    fn default() -> Self {
        Self::new(&CloudConfig::default())
    }
}

impl CloudCatalog {
    pub fn new(config: &CloudConfig) -> Self {
        Self {
            aws_region: config.aws_region.clone(),
            azure_location: config.azure_location.clone(),
        }
    }

    fn region(&self, provider: CloudProvider) -> &str {
        match provider {
            CloudProvider::Aws => &self.aws_region,
            CloudProvider::Azure => &self.azure_location,
        }
    }

    /// Resources satisfying `requirements`, in catalog order
    pub fn resources_for(
        &self,
        provider: CloudProvider,
        requirements: &RequirementSet,
    ) -> Vec<CloudResource> {
        let region = self.region(provider);
        let resources: Vec<CloudResource> = catalog(provider)
            .iter()
            .filter(|entry| entry.satisfies(requirements))
            .map(|entry| CloudResource {
                resource_type: entry.resource_type.to_string(),
                service_name: entry.service_name.to_string(),
                provider,
                monthly_cost: entry.monthly_cost,
                configuration: (entry.configure)(region),
            })
            .collect();

        debug!(
            provider = %provider,
            count = resources.len(),
            "Catalog resources selected"
        );
        resources
    }
}
