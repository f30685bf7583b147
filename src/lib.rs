//! awsfind - search AWS resources for a substring
//!
//! Lists S3 buckets, CloudFront distributions, Lambda functions, EC2
//! instances, RDS databases, DynamoDB tables, IAM roles and CloudFormation
//! stacks, and reports the ones whose identifying fields contain a term.

pub mod aws;
pub mod config;
pub mod report;
pub mod resource;
