//! Integration tests for the AWS client using wiremock
//!
//! A mock server stands in for the AWS endpoints so the real SDK clients,
//! the dispatch layer and the probes run end to end.

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::config::Credentials;
use awsfind::aws::client::{AwsClient, ResourceApi};
use awsfind::resource::{get_resource, probe, run_probes, DetailValue};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AMZ_JSON: &str = "application/x-amz-json-1.0";

const CALLER_IDENTITY: &str = r#"<GetCallerIdentityResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <GetCallerIdentityResult>
    <Arn>arn:aws:iam::123456789012:user/tester</Arn>
    <UserId>AIDATESTUSER</UserId>
    <Account>123456789012</Account>
  </GetCallerIdentityResult>
  <ResponseMetadata>
    <RequestId>01234567-89ab-cdef-0123-456789abcdef</RequestId>
  </ResponseMetadata>
</GetCallerIdentityResponse>"#;

const BUCKETS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListAllMyBucketsResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Owner><ID>owner</ID></Owner>
  <Buckets>
    <Bucket><Name>logs-prod</Name><CreationDate>2024-01-01T00:00:00.000Z</CreationDate></Bucket>
    <Bucket><Name>logs-dev</Name><CreationDate>2024-01-02T00:00:00.000Z</CreationDate></Bucket>
    <Bucket><Name>assets</Name><CreationDate>2024-01-03T00:00:00.000Z</CreationDate></Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#;

/// Build a client whose every service endpoint is the mock server
async fn client_for(server: &MockServer) -> AwsClient {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .endpoint_url(server.uri())
        .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
        .retry_config(RetryConfig::disabled())
        .load()
        .await;

    AwsClient::from_sdk_config(config)
}

async fn mount_caller_identity(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("Action=GetCallerIdentity"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(CALLER_IDENTITY, "text/xml"))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_list_tables(server: &MockServer, body: &str) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", "DynamoDB_20120810.ListTables"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, AMZ_JSON))
        .mount(server)
        .await;
}

/// Test module for DynamoDB + STS
mod dynamodb_tests {
    use super::*;

    #[tokio::test]
    async fn test_matching_tables_get_account_scoped_arns() {
        let server = MockServer::start().await;
        mount_list_tables(&server, r#"{"TableNames":["orders-v1","users","orders-v2"]}"#).await;
        mount_caller_identity(&server, 1).await;

        let client = client_for(&server).await;
        let def = get_resource("dynamodb-tables").unwrap();

        let matches = probe(def, &client, "orders").await.expect("search should succeed");
        let references: Vec<&str> = matches.iter().map(|m| m.reference.as_str()).collect();

        assert_eq!(
            references,
            vec![
                "arn:aws:dynamodb:us-east-1:123456789012:table/orders-v1",
                "arn:aws:dynamodb:us-east-1:123456789012:table/orders-v2",
            ]
        );
    }

    #[tokio::test]
    async fn test_caller_identity_is_resolved_once_per_client() {
        let server = MockServer::start().await;
        mount_list_tables(&server, r#"{"TableNames":["orders"]}"#).await;
        mount_caller_identity(&server, 1).await;

        let client = client_for(&server).await;
        let def = get_resource("dynamodb-tables").unwrap();

        for _ in 0..3 {
            assert_eq!(probe(def, &client, "ord").await.unwrap().len(), 1);
        }
        let caller = client.caller_context().await.unwrap();
        assert_eq!(caller.account_id, "123456789012");
        assert_eq!(caller.region, "us-east-1");
    }

    #[tokio::test]
    async fn test_no_match_skips_identity_lookup() {
        let server = MockServer::start().await;
        mount_list_tables(&server, r#"{"TableNames":["orders"]}"#).await;
        mount_caller_identity(&server, 0).await;

        let client = client_for(&server).await;
        let def = get_resource("dynamodb-tables").unwrap();

        assert!(probe(def, &client, "payments").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_service_error_fails_only_that_resource_type() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-amz-target", "DynamoDB_20120810.ListTables"))
            .respond_with(ResponseTemplate::new(400).set_body_raw(
                r#"{"__type":"com.amazonaws.dynamodb.v20120810#AccessDeniedException","message":"not allowed"}"#,
                AMZ_JSON,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let resources = vec![
            get_resource("dynamodb-tables").unwrap(),
            get_resource("s3-buckets").unwrap(),
        ];

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(BUCKETS, "application/xml"))
            .mount(&server)
            .await;

        let outcomes = run_probes(&resources, &client, "logs", false).await;

        assert_eq!(outcomes.len(), 2);
        let err = outcomes[0].result.as_ref().unwrap_err();
        assert_eq!(err.to_string(), "ListTables failed");
        assert_eq!(outcomes[1].result.as_ref().unwrap().len(), 2);
    }
}

/// Test module for S3
mod s3_tests {
    use super::*;

    #[tokio::test]
    async fn test_bucket_listing_is_filtered_in_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(BUCKETS, "application/xml"))
            .mount(&server)
            .await;
        mount_caller_identity(&server, 0).await;

        let client = client_for(&server).await;
        let def = get_resource("s3-buckets").unwrap();

        let matches = probe(def, &client, "logs").await.expect("search should succeed");
        let references: Vec<&str> = matches.iter().map(|m| m.reference.as_str()).collect();

        assert_eq!(references, vec!["arn:aws:s3:::logs-prod", "arn:aws:s3:::logs-dev"]);
    }
}

const INSTANCES: &str = r#"<DescribeInstancesResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
  <requestId>8f7724cf-496f-496e-8fe3-example</requestId>
  <reservationSet>
    <item>
      <reservationId>r-0001</reservationId>
      <ownerId>123456789012</ownerId>
      <instancesSet>
        <item>
          <instanceId>i-001</instanceId>
        </item>
        <item>
          <instanceId>i-002</instanceId>
          <tagSet>
            <item><key>team</key><value>web-platform</value></item>
          </tagSet>
        </item>
      </instancesSet>
    </item>
    <item>
      <reservationId>r-0002</reservationId>
      <ownerId>123456789012</ownerId>
      <instancesSet>
        <item>
          <instanceId>i-003</instanceId>
          <tagSet>
            <item><key>env</key><value>prod</value></item>
            <item><key>Name</key><value>web-frontend</value></item>
          </tagSet>
        </item>
      </instancesSet>
    </item>
  </reservationSet>
</DescribeInstancesResponse>"#;

/// Test module for EC2
mod ec2_tests {
    use super::*;

    async fn mount_describe_instances(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_string_contains("Action=DescribeInstances"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(INSTANCES, "text/xml"))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_reservations_are_flattened_with_name_tags() {
        let server = MockServer::start().await;
        mount_describe_instances(&server).await;

        let client = client_for(&server).await;
        let response = client
            .invoke("ec2", "describe_instances", &json!({}))
            .await
            .unwrap();

        assert_eq!(
            response,
            json!({
                "Instances": [
                    { "InstanceId": "i-001" },
                    { "InstanceId": "i-002" },
                    { "InstanceId": "i-003", "Name": "web-frontend" },
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_only_name_tag_is_searched() {
        let server = MockServer::start().await;
        mount_describe_instances(&server).await;
        mount_caller_identity(&server, 1).await;

        let client = client_for(&server).await;
        let def = get_resource("ec2-instances").unwrap();

        // "web" also appears in the team tag of i-002
        let matches = probe(def, &client, "web").await.unwrap();
        let references: Vec<&str> = matches.iter().map(|m| m.reference.as_str()).collect();

        assert_eq!(
            references,
            vec!["arn:aws:ec2:us-east-1:123456789012:instance/i-003"]
        );
    }
}

const DISTRIBUTIONS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DistributionList xmlns="http://cloudfront.amazonaws.com/doc/2020-05-31/">
  <Marker></Marker>
  <MaxItems>100</MaxItems>
  <IsTruncated>false</IsTruncated>
  <Quantity>2</Quantity>
  <Items>
    <DistributionSummary>
      <Id>E1A2B3C4D5</Id>
      <ARN>arn:aws:cloudfront::123456789012:distribution/E1A2B3C4D5</ARN>
      <Status>Deployed</Status>
      <LastModifiedTime>2024-01-01T00:00:00.000Z</LastModifiedTime>
      <DomainName>d111111abcdef8.cloudfront.net</DomainName>
      <Aliases>
        <Quantity>2</Quantity>
        <Items>
          <CNAME>static.example.com</CNAME>
          <CNAME>cdn.example.com</CNAME>
        </Items>
      </Aliases>
      <Enabled>true</Enabled>
    </DistributionSummary>
    <DistributionSummary>
      <Id>E9Z8Y7X6</Id>
      <ARN>arn:aws:cloudfront::123456789012:distribution/E9Z8Y7X6</ARN>
      <Status>Deployed</Status>
      <LastModifiedTime>2024-01-02T00:00:00.000Z</LastModifiedTime>
      <DomainName>d222222abcdef8.cloudfront.net</DomainName>
      <Aliases>
        <Quantity>0</Quantity>
      </Aliases>
      <Enabled>true</Enabled>
    </DistributionSummary>
  </Items>
</DistributionList>"#;

/// Test module for CloudFront
mod cloudfront_tests {
    use super::*;

    async fn mount_list_distributions(server: &MockServer, body: &str) {
        Mock::given(method("GET"))
            .and(path("/2020-05-31/distribution"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/xml"))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_alias_match_reports_every_alias() {
        let server = MockServer::start().await;
        mount_list_distributions(&server, DISTRIBUTIONS).await;
        mount_caller_identity(&server, 0).await;

        let client = client_for(&server).await;
        let def = get_resource("cloudfront-distributions").unwrap();

        let matches = probe(def, &client, "cdn.example").await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(
            matches[0].reference,
            "arn:aws:cloudfront::123456789012:distribution/E1A2B3C4D5"
        );
        let labels: Vec<&str> = matches[0].details.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["ID", "Domain", "CNAMEs"]);
        assert_eq!(
            matches[0].details[2].value,
            DetailValue::List(vec![
                "static.example.com".to_string(),
                "cdn.example.com".to_string(),
            ])
        );
    }

    #[tokio::test]
    async fn test_distribution_without_aliases_omits_cnames() {
        let server = MockServer::start().await;
        mount_list_distributions(&server, DISTRIBUTIONS).await;

        let client = client_for(&server).await;
        let def = get_resource("cloudfront-distributions").unwrap();

        let matches = probe(def, &client, "E9Z8").await.unwrap();

        assert_eq!(matches.len(), 1);
        let labels: Vec<&str> = matches[0].details.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["ID", "Domain"]);
    }

    #[tokio::test]
    async fn test_empty_distribution_list() {
        let server = MockServer::start().await;
        mount_list_distributions(
            &server,
            r#"<DistributionList xmlns="http://cloudfront.amazonaws.com/doc/2020-05-31/">
  <Marker></Marker>
  <MaxItems>100</MaxItems>
  <IsTruncated>false</IsTruncated>
  <Quantity>0</Quantity>
</DistributionList>"#,
        )
        .await;

        let client = client_for(&server).await;
        let def = get_resource("cloudfront-distributions").unwrap();

        assert!(probe(def, &client, "").await.unwrap().is_empty());
    }
}

const STACKS: &str = r#"<ListStacksResponse xmlns="http://cloudformation.amazonaws.com/doc/2010-05-15/">
  <ListStacksResult>
    <StackSummaries>
      <member>
        <StackId>arn:aws:cloudformation:us-east-1:123456789012:stack/api-prod/1111</StackId>
        <StackName>api-prod</StackName>
        <CreationTime>2024-01-01T00:00:00.000Z</CreationTime>
        <StackStatus>CREATE_COMPLETE</StackStatus>
      </member>
      <member>
        <StackId>arn:aws:cloudformation:us-east-1:123456789012:stack/api-old/2222</StackId>
        <StackName>api-old</StackName>
        <CreationTime>2023-01-01T00:00:00.000Z</CreationTime>
        <StackStatus>ROLLBACK_COMPLETE</StackStatus>
      </member>
      <member>
        <StackId>arn:aws:cloudformation:us-east-1:123456789012:stack/api-dev/3333</StackId>
        <StackName>api-dev</StackName>
        <CreationTime>2024-02-01T00:00:00.000Z</CreationTime>
        <StackStatus>UPDATE_COMPLETE</StackStatus>
      </member>
    </StackSummaries>
  </ListStacksResult>
  <ResponseMetadata>
    <RequestId>b9b4b068-3a41-11e5-94eb-example</RequestId>
  </ResponseMetadata>
</ListStacksResponse>"#;

/// Test module for CloudFormation
mod cloudformation_tests {
    use super::*;

    #[tokio::test]
    async fn test_status_filter_is_sent_and_enforced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_string_contains("Action=ListStacks"))
            .and(body_string_contains("StackStatusFilter.member.1=CREATE_COMPLETE"))
            .and(body_string_contains("StackStatusFilter.member.2=UPDATE_COMPLETE"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(STACKS, "text/xml"))
            .expect(1)
            .mount(&server)
            .await;
        mount_caller_identity(&server, 0).await;

        let client = client_for(&server).await;
        let def = get_resource("cloudformation-stacks").unwrap();

        // The mock ignores the filter, so the rolled back stack still arrives
        let matches = probe(def, &client, "api").await.unwrap();
        let references: Vec<&str> = matches.iter().map(|m| m.reference.as_str()).collect();

        assert_eq!(
            references,
            vec![
                "arn:aws:cloudformation:us-east-1:123456789012:stack/api-prod/1111",
                "arn:aws:cloudformation:us-east-1:123456789012:stack/api-dev/3333",
            ]
        );
    }

    #[tokio::test]
    async fn test_stack_status_is_kept_in_records() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_string_contains("Action=ListStacks"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(STACKS, "text/xml"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let response = client
            .invoke("cloudformation", "list_stacks", &json!({}))
            .await
            .unwrap();

        assert_eq!(
            response["StackSummaries"][1],
            json!({
                "StackName": "api-old",
                "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/api-old/2222",
                "StackStatus": "ROLLBACK_COMPLETE",
            })
        );
    }
}

const ROLES: &str = r#"<ListRolesResponse xmlns="https://iam.amazonaws.com/doc/2010-05-08/">
  <ListRolesResult>
    <IsTruncated>false</IsTruncated>
    <Roles>
      <member>
        <Path>/</Path>
        <RoleName>deploy-bot</RoleName>
        <RoleId>AROAEXAMPLE1</RoleId>
        <Arn>arn:aws:iam::123456789012:role/deploy-bot</Arn>
        <CreateDate>2024-01-01T00:00:00Z</CreateDate>
      </member>
      <member>
        <Path>/service-role/</Path>
        <RoleName>lambda-exec</RoleName>
        <RoleId>AROAEXAMPLE2</RoleId>
        <Arn>arn:aws:iam::123456789012:role/service-role/lambda-exec</Arn>
        <CreateDate>2024-01-02T00:00:00Z</CreateDate>
      </member>
    </Roles>
  </ListRolesResult>
  <ResponseMetadata>
    <RequestId>7a62c49f-347e-4fc4-9331-example</RequestId>
  </ResponseMetadata>
</ListRolesResponse>"#;

/// Test module for IAM and Lambda
mod iam_lambda_tests {
    use super::*;

    #[tokio::test]
    async fn test_role_arn_comes_from_listing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_string_contains("Action=ListRoles"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(ROLES, "text/xml"))
            .mount(&server)
            .await;
        mount_caller_identity(&server, 0).await;

        let client = client_for(&server).await;
        let def = get_resource("iam-roles").unwrap();

        let matches = probe(def, &client, "lambda").await.unwrap();
        let references: Vec<&str> = matches.iter().map(|m| m.reference.as_str()).collect();

        assert_eq!(
            references,
            vec!["arn:aws:iam::123456789012:role/service-role/lambda-exec"]
        );
    }

    #[tokio::test]
    async fn test_function_arn_comes_from_listing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/2015-03-31/functions/?$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Functions": [
                    {
                        "FunctionName": "resize-images",
                        "FunctionArn": "arn:aws:lambda:us-east-1:123456789012:function:resize-images"
                    },
                    {
                        "FunctionName": "send-mail",
                        "FunctionArn": "arn:aws:lambda:us-east-1:123456789012:function:send-mail"
                    }
                ]
            })))
            .mount(&server)
            .await;
        mount_caller_identity(&server, 0).await;

        let client = client_for(&server).await;
        let def = get_resource("lambda-functions").unwrap();

        let matches = probe(def, &client, "mail").await.unwrap();
        let references: Vec<&str> = matches.iter().map(|m| m.reference.as_str()).collect();

        assert_eq!(
            references,
            vec!["arn:aws:lambda:us-east-1:123456789012:function:send-mail"]
        );
    }
}
