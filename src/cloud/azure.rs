//! Azure service catalog

use serde_json::{Value, json};

use super::ServiceEntry;
use crate::types::Requirement;

pub(super) static CATALOG: &[ServiceEntry] = &[
    ServiceEntry {
        requirements: &[Requirement::Frontend],
        resource_type: "frontend_hosting",
        service_name: "Static Web Apps",
        monthly_cost: 0.0,
        configure: static_web_app,
    },
    ServiceEntry {
        requirements: &[Requirement::Frontend],
        resource_type: "frontend_cdn",
        service_name: "Azure CDN",
        monthly_cost: 25.0,
        configure: cdn,
    },
    ServiceEntry {
        requirements: &[Requirement::Backend],
        resource_type: "backend_compute",
        service_name: "Container Apps",
        monthly_cost: 60.0,
        configure: container_apps,
    },
    ServiceEntry {
        requirements: &[Requirement::Database],
        resource_type: "primary_database",
        service_name: "PostgreSQL Flexible Server",
        monthly_cost: 45.0,
        configure: postgres,
    },
    ServiceEntry {
        requirements: &[Requirement::Cache],
        resource_type: "cache_database",
        service_name: "Azure Cache for Redis",
        monthly_cost: 25.0,
        configure: redis,
    },
    ServiceEntry {
        requirements: &[Requirement::Networking],
        resource_type: "networking_vnet",
        service_name: "Virtual Network",
        monthly_cost: 5.0,
        configure: vnet,
    },
    ServiceEntry {
        requirements: &[Requirement::ApiGateway],
        resource_type: "api_gateway",
        service_name: "API Management",
        monthly_cost: 50.0,
        configure: api_management,
    },
    ServiceEntry {
        requirements: &[Requirement::Storage],
        resource_type: "data_storage",
        service_name: "Storage Account",
        monthly_cost: 15.0,
        configure: storage_account,
    },
    ServiceEntry {
        requirements: &[Requirement::Monitoring, Requirement::Logging],
        resource_type: "logging",
        service_name: "Log Analytics",
        monthly_cost: 20.0,
        configure: log_analytics,
    },
    ServiceEntry {
        requirements: &[Requirement::Monitoring],
        resource_type: "monitoring",
        service_name: "Application Insights",
        monthly_cost: 25.0,
        configure: app_insights,
    },
    ServiceEntry {
        requirements: &[Requirement::Authentication],
        resource_type: "authentication",
        service_name: "Entra ID",
        monthly_cost: 0.0,
        configure: entra_id,
    },
];

fn static_web_app(location: &str) -> Value {
    json!({
        "location": location,
        "sku": "Free",
        "app_location": "/",
        "output_location": "build",
    })
}

fn cdn(location: &str) -> Value {
    json!({
        "location": location,
        "sku": "Standard_Microsoft",
        "https_only": true,
        "compression": true,
    })
}

fn container_apps(location: &str) -> Value {
    json!({
        "location": location,
        "cpu": 0.5,
        "memory": "1Gi",
        "min_replicas": 1,
        "max_replicas": 5,
        "target_port": 8080,
    })
}

fn postgres(location: &str) -> Value {
    json!({
        "location": location,
        "sku_name": "Standard_B1ms",
        "tier": "Burstable",
        "version": "15",
        "storage_gb": 32,
        "backup_retention_days": 7,
    })
}

fn redis(location: &str) -> Value {
    json!({
        "location": location,
        "sku": "Basic",
        "family": "C",
        "capacity": 0,
    })
}

fn vnet(location: &str) -> Value {
    json!({
        "location": location,
        "address_space": "10.0.0.0/16",
        "subnets": {"apps": "10.0.1.0/24", "data": "10.0.2.0/24"},
    })
}

fn api_management(location: &str) -> Value {
    json!({
        "location": location,
        "sku": "Developer",
        "capacity": 1,
    })
}

fn storage_account(location: &str) -> Value {
    json!({
        "location": location,
        "sku": "Standard_LRS",
        "kind": "StorageV2",
        "access_tier": "Hot",
    })
}

fn log_analytics(location: &str) -> Value {
    json!({
        "location": location,
        "sku": "PerGB2018",
        "retention_days": 30,
    })
}

fn app_insights(location: &str) -> Value {
    json!({
        "location": location,
        "application_type": "web",
    })
}

fn entra_id(location: &str) -> Value {
    json!({
        "location": location,
        "sign_in_audience": "AzureADMyOrg",
    })
}
