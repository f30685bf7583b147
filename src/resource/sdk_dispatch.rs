//! SDK Dispatch
//!
//! Maps SDK method names from the resource registry to AWS SDK calls and
//! redacts each typed response into the small JSON record the fetcher
//! works on. A fresh service client is built from the shared
//! [`SdkConfig`] on every call.

use anyhow::{Context, Result};
use aws_config::SdkConfig;
use serde_json::{json, Map, Value};

/// Invoke an AWS SDK method
pub async fn invoke_sdk(
    service: &str,
    method: &str,
    config: &SdkConfig,
    params: &Value,
) -> Result<Value> {
    tracing::debug!("invoke_sdk: service={}, method={}", service, method);

    match service {
        "s3" => invoke_s3(method, config).await,
        "cloudfront" => invoke_cloudfront(method, config).await,
        "lambda" => invoke_lambda(method, config).await,
        "ec2" => invoke_ec2(method, config).await,
        "rds" => invoke_rds(method, config).await,
        "dynamodb" => invoke_dynamodb(method, config).await,
        "iam" => invoke_iam(method, config).await,
        "cloudformation" => invoke_cloudformation(method, config, params).await,
        _ => Err(anyhow::anyhow!("Unknown service: {}", service)),
    }
}

// =============================================================================
// S3
// =============================================================================

async fn invoke_s3(method: &str, config: &SdkConfig) -> Result<Value> {
    match method {
        "list_buckets" => {
            let client = aws_sdk_s3::Client::new(config);
            let output = client
                .list_buckets()
                .send()
                .await
                .context("ListBuckets failed")?;

            let buckets: Vec<Value> = items(output.buckets())
                .iter()
                .map(|bucket| {
                    let mut record = Map::new();
                    put_str(&mut record, "Name", bucket.name());
                    Value::Object(record)
                })
                .collect();

            Ok(json!({ "Buckets": buckets }))
        },
        _ => Err(unknown_method("s3", method)),
    }
}

// =============================================================================
// CloudFront
// =============================================================================

async fn invoke_cloudfront(method: &str, config: &SdkConfig) -> Result<Value> {
    match method {
        "list_distributions" => {
            let client = aws_sdk_cloudfront::Client::new(config);
            let output = client
                .list_distributions()
                .send()
                .await
                .context("ListDistributions failed")?;

            let Some(list) = output.distribution_list().present() else {
                return Ok(json!({}));
            };

            let distributions: Vec<Value> = items(list.items())
                .iter()
                .map(|dist| {
                    let mut record = Map::new();
                    put_str(&mut record, "ARN", dist.arn());
                    put_str(&mut record, "Id", dist.id());
                    put_str(&mut record, "DomainName", dist.domain_name());

                    let aliases: Vec<Value> = dist
                        .aliases()
                        .present()
                        .map(|aliases| {
                            items(aliases.items())
                                .iter()
                                .map(|cname| Value::String(cname.clone()))
                                .collect()
                        })
                        .unwrap_or_default();
                    record.insert("Aliases".to_string(), Value::Array(aliases));

                    Value::Object(record)
                })
                .collect();

            Ok(json!({ "DistributionList": { "Items": distributions } }))
        },
        _ => Err(unknown_method("cloudfront", method)),
    }
}

// =============================================================================
// Lambda
// =============================================================================

async fn invoke_lambda(method: &str, config: &SdkConfig) -> Result<Value> {
    match method {
        "list_functions" => {
            let client = aws_sdk_lambda::Client::new(config);
            let output = client
                .list_functions()
                .send()
                .await
                .context("ListFunctions failed")?;

            let functions: Vec<Value> = items(output.functions())
                .iter()
                .map(|function| {
                    let mut record = Map::new();
                    put_str(&mut record, "FunctionName", function.function_name());
                    put_str(&mut record, "FunctionArn", function.function_arn());
                    Value::Object(record)
                })
                .collect();

            Ok(json!({ "Functions": functions }))
        },
        _ => Err(unknown_method("lambda", method)),
    }
}

// =============================================================================
// EC2
// =============================================================================

async fn invoke_ec2(method: &str, config: &SdkConfig) -> Result<Value> {
    match method {
        "describe_instances" => {
            let client = aws_sdk_ec2::Client::new(config);
            let output = client
                .describe_instances()
                .send()
                .await
                .context("DescribeInstances failed")?;

            // Instances come grouped by reservation
            let mut instances: Vec<Value> = Vec::new();
            for reservation in items(output.reservations()) {
                for instance in items(reservation.instances()) {
                    let mut record = Map::new();
                    put_str(&mut record, "InstanceId", instance.instance_id());

                    let name = items(instance.tags())
                        .iter()
                        .find(|tag| tag.key().present() == Some("Name"))
                        .and_then(|tag| tag.value().present());
                    put_str(&mut record, "Name", name);

                    instances.push(Value::Object(record));
                }
            }

            Ok(json!({ "Instances": instances }))
        },
        _ => Err(unknown_method("ec2", method)),
    }
}

// =============================================================================
// RDS
// =============================================================================

async fn invoke_rds(method: &str, config: &SdkConfig) -> Result<Value> {
    match method {
        "describe_db_instances" => {
            let client = aws_sdk_rds::Client::new(config);
            let output = client
                .describe_db_instances()
                .send()
                .await
                .context("DescribeDBInstances failed")?;

            let instances: Vec<Value> = items(output.db_instances())
                .iter()
                .map(|db| {
                    let mut record = Map::new();
                    put_str(&mut record, "DBInstanceIdentifier", db.db_instance_identifier());
                    put_str(&mut record, "DBInstanceArn", db.db_instance_arn());
                    Value::Object(record)
                })
                .collect();

            Ok(json!({ "DBInstances": instances }))
        },
        _ => Err(unknown_method("rds", method)),
    }
}

// =============================================================================
// DynamoDB
// =============================================================================

async fn invoke_dynamodb(method: &str, config: &SdkConfig) -> Result<Value> {
    match method {
        "list_tables" => {
            let client = aws_sdk_dynamodb::Client::new(config);
            let output = client
                .list_tables()
                .send()
                .await
                .context("ListTables failed")?;

            // ListTables only returns names; wrap them so every probe sees records
            let tables: Vec<Value> = items(output.table_names())
                .iter()
                .map(|name| json!({ "TableName": name }))
                .collect();

            Ok(json!({ "Tables": tables }))
        },
        _ => Err(unknown_method("dynamodb", method)),
    }
}

// =============================================================================
// IAM
// =============================================================================

async fn invoke_iam(method: &str, config: &SdkConfig) -> Result<Value> {
    match method {
        "list_roles" => {
            let client = aws_sdk_iam::Client::new(config);
            let output = client
                .list_roles()
                .send()
                .await
                .context("ListRoles failed")?;

            let roles: Vec<Value> = items(output.roles())
                .iter()
                .map(|role| {
                    let mut record = Map::new();
                    put_str(&mut record, "RoleName", role.role_name());
                    put_str(&mut record, "Arn", role.arn());
                    Value::Object(record)
                })
                .collect();

            Ok(json!({ "Roles": roles }))
        },
        _ => Err(unknown_method("iam", method)),
    }
}

// =============================================================================
// CloudFormation
// =============================================================================

async fn invoke_cloudformation(method: &str, config: &SdkConfig, params: &Value) -> Result<Value> {
    use aws_sdk_cloudformation::types::StackStatus;

    match method {
        "list_stacks" => {
            let statuses: Vec<StackStatus> = get_param_strs(params, "StackStatusFilter")
                .iter()
                .map(|s| StackStatus::from(s.as_str()))
                .collect();

            let client = aws_sdk_cloudformation::Client::new(config);
            let mut request = client.list_stacks();
            if !statuses.is_empty() {
                request = request.set_stack_status_filter(Some(statuses));
            }
            let output = request.send().await.context("ListStacks failed")?;

            let stacks: Vec<Value> = items(output.stack_summaries())
                .iter()
                .map(|stack| {
                    let mut record = Map::new();
                    put_str(&mut record, "StackName", stack.stack_name());
                    put_str(&mut record, "StackId", stack.stack_id());
                    put_str(
                        &mut record,
                        "StackStatus",
                        stack.stack_status().present().map(|s| s.as_str()),
                    );
                    Value::Object(record)
                })
                .collect();

            Ok(json!({ "StackSummaries": stacks }))
        },
        _ => Err(unknown_method("cloudformation", method)),
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// SDK accessors return `&T` for required members and `Option<&T>` for
/// optional ones; this lets the record builders treat both the same way.
trait Present<'a> {
    type Target: ?Sized;
    fn present(self) -> Option<&'a Self::Target>;
}

impl<'a, T: ?Sized> Present<'a> for &'a T {
    type Target = T;
    fn present(self) -> Option<&'a T> {
        Some(self)
    }
}

impl<'a, T: ?Sized> Present<'a> for Option<&'a T> {
    type Target = T;
    fn present(self) -> Option<&'a T> {
        self
    }
}

fn items<'a, T: 'a>(list: impl Present<'a, Target = [T]>) -> &'a [T] {
    list.present().unwrap_or_default()
}

/// Insert a string field, leaving it out when the SDK returned nothing
fn put_str<'a>(record: &mut Map<String, Value>, key: &str, value: impl Present<'a, Target = str>) {
    if let Some(value) = value.present() {
        record.insert(key.to_string(), Value::String(value.to_string()));
    }
}

fn get_param_strs(params: &Value, key: &str) -> Vec<String> {
    match params.get(key) {
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn unknown_method(service: &str, method: &str) -> anyhow::Error {
    anyhow::anyhow!("Unknown {} method: {}", service, method)
}
