//! Pure ARN parsing: type classification and resource-id extraction.
//!
//! ARN shape: `arn:partition:service:region:account:resource`, where the
//! resource field is either `kind/instance-id` or a bare id.

/// Sentinel returned for identifiers with fewer than six `:` fields.
pub const UNKNOWN_TYPE: &str = "unknown";

/// Known `(service, resource-kind)` pairs mapped to AWS Config resource
/// type names. Anything else gets a synthesized name so classification
/// never comes back empty.
const CONFIG_TYPE_MAP: &[(&str, &str, &str)] = &[
    ("ec2", "instance", "AWS::EC2::Instance"),
    ("ec2", "security-group", "AWS::EC2::SecurityGroup"),
    ("ec2", "vpc", "AWS::EC2::VPC"),
    ("ec2", "subnet", "AWS::EC2::Subnet"),
    ("ec2", "network-interface", "AWS::EC2::NetworkInterface"),
    ("ec2", "volume", "AWS::EC2::Volume"),
    ("elasticloadbalancing", "loadbalancer", "AWS::ElasticLoadBalancingV2::LoadBalancer"),
    ("rds", "db", "AWS::RDS::DBInstance"),
    ("s3", "", "AWS::S3::Bucket"),
    ("lambda", "function", "AWS::Lambda::Function"),
    ("dynamodb", "table", "AWS::DynamoDB::Table"),
];

/// Classify an ARN into a canonical resource type. Total: malformed input
/// yields [`UNKNOWN_TYPE`], unmapped pairs yield a synthesized
/// `AWS::<SERVICE>::<Kind>` name.
pub fn classify(identifier: &str) -> String {
    let parts: Vec<&str> = identifier.split(':').collect();
    if parts.len() < 6 {
        return UNKNOWN_TYPE.to_string();
    }

    let service = parts[2];
    let resource = parts[5];
    let kind = resource.split('/').next().unwrap_or(resource);

    for (svc, k, mapped) in CONFIG_TYPE_MAP {
        if *svc == service && *k == kind {
            return (*mapped).to_string();
        }
    }
    format!("AWS::{}::{}", service.to_uppercase(), capitalize(kind))
}

/// Extract the bare resource id, the text after the first `/` in the
/// resource field, or the whole field when no kind prefix is present.
pub fn resource_id(identifier: &str) -> Option<String> {
    let parts: Vec<&str> = identifier.split(':').collect();
    if parts.len() < 6 {
        return None;
    }
    let resource = parts[5];
    match resource.split_once('/') {
        Some((_, id)) => Some(id.to_string()),
        None => Some(resource.to_string()),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
