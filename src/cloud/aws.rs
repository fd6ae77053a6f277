//! AWS service catalog

use serde_json::{Value, json};

use super::ServiceEntry;
use crate::types::Requirement;

pub(super) static CATALOG: &[ServiceEntry] = &[
    ServiceEntry {
        requirements: &[Requirement::Frontend],
        resource_type: "frontend_storage",
        service_name: "S3",
        monthly_cost: 5.0,
        configure: static_site_bucket,
    },
    ServiceEntry {
        requirements: &[Requirement::Frontend],
        resource_type: "frontend_cdn",
        service_name: "CloudFront",
        monthly_cost: 20.0,
        configure: cdn,
    },
    ServiceEntry {
        requirements: &[Requirement::Backend],
        resource_type: "backend_compute",
        service_name: "ECS Fargate",
        monthly_cost: 50.0,
        configure: fargate,
    },
    ServiceEntry {
        requirements: &[Requirement::Backend],
        resource_type: "backend_loadbalancer",
        service_name: "Application Load Balancer",
        monthly_cost: 25.0,
        configure: load_balancer,
    },
    ServiceEntry {
        requirements: &[Requirement::Database],
        resource_type: "primary_database",
        service_name: "RDS PostgreSQL",
        monthly_cost: 35.0,
        configure: postgres,
    },
    ServiceEntry {
        requirements: &[Requirement::Cache],
        resource_type: "cache_database",
        service_name: "ElastiCache Redis",
        monthly_cost: 20.0,
        configure: redis,
    },
    ServiceEntry {
        requirements: &[Requirement::Networking],
        resource_type: "networking_vpc",
        service_name: "VPC",
        monthly_cost: 0.0,
        configure: vpc,
    },
    ServiceEntry {
        requirements: &[Requirement::ApiGateway],
        resource_type: "api_gateway",
        service_name: "API Gateway",
        monthly_cost: 15.0,
        configure: api_gateway,
    },
    ServiceEntry {
        requirements: &[Requirement::Storage],
        resource_type: "data_storage",
        service_name: "S3",
        monthly_cost: 10.0,
        configure: data_bucket,
    },
    ServiceEntry {
        requirements: &[Requirement::Monitoring, Requirement::Logging],
        resource_type: "monitoring",
        service_name: "CloudWatch",
        monthly_cost: 30.0,
        configure: cloudwatch,
    },
    ServiceEntry {
        requirements: &[Requirement::Authentication],
        resource_type: "authentication",
        service_name: "Cognito",
        monthly_cost: 0.0,
        configure: cognito,
    },
];

fn static_site_bucket(region: &str) -> Value {
    json!({
        "region": region,
        "website_hosting": true,
        "index_document": "index.html",
        "error_document": "index.html",
        "versioning": true,
    })
}

fn cdn(region: &str) -> Value {
    json!({
        "region": region,
        "price_class": "PriceClass_100",
        "viewer_protocol_policy": "redirect-to-https",
        "compress": true,
    })
}

fn fargate(region: &str) -> Value {
    json!({
        "region": region,
        "cpu": 512,
        "memory": 1024,
        "desired_count": 2,
        "container_port": 8080,
    })
}

fn load_balancer(region: &str) -> Value {
    json!({
        "region": region,
        "scheme": "internet-facing",
        "listener_port": 443,
        "health_check_path": "/actuator/health",
    })
}

fn postgres(region: &str) -> Value {
    json!({
        "region": region,
        "engine": "postgres",
        "engine_version": "15",
        "instance_class": "db.t3.micro",
        "allocated_storage_gb": 20,
        "multi_az": false,
        "backup_retention_days": 7,
    })
}

fn redis(region: &str) -> Value {
    json!({
        "region": region,
        "engine": "redis",
        "node_type": "cache.t3.micro",
        "num_cache_nodes": 1,
    })
}

fn vpc(region: &str) -> Value {
    json!({
        "region": region,
        "cidr_block": "10.0.0.0/16",
        "public_subnets": ["10.0.1.0/24", "10.0.2.0/24"],
        "private_subnets": ["10.0.10.0/24", "10.0.20.0/24"],
    })
}

fn api_gateway(region: &str) -> Value {
    json!({
        "region": region,
        "type": "REST",
        "throttling_rate_limit": 1000,
        "cors": true,
    })
}

fn data_bucket(region: &str) -> Value {
    json!({
        "region": region,
        "storage_class": "STANDARD",
        "encryption": "AES256",
        "versioning": true,
    })
}

fn cloudwatch(region: &str) -> Value {
    json!({
        "region": region,
        "log_retention_days": 30,
        "alarms": ["cpu_utilization", "memory_utilization", "http_5xx"],
    })
}

fn cognito(region: &str) -> Value {
    json!({
        "region": region,
        "mfa": "OPTIONAL",
        "password_min_length": 8,
    })
}
