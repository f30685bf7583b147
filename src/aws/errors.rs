//! Error formatting for AWS API failures

/// Maximum length of a raw error chain shown to the user
const MAX_ERROR_LENGTH: usize = 300;

/// Well-known AWS error codes and the hint shown for them.
/// Codes only count as whole tokens of the error chain.
const KNOWN_CODES: &[(&[&str], &str)] = &[
    (
        &["ExpiredToken", "ExpiredTokenException", "RequestExpired", "TokenRefreshRequired"],
        "AWS credentials have expired. Refresh your session (e.g. 'aws sso login').",
    ),
    (
        &["InvalidClientTokenId", "UnrecognizedClientException", "SignatureDoesNotMatch", "InvalidAccessKeyId"],
        "AWS credentials were rejected. Check your access keys and profile.",
    ),
    (
        &["AccessDenied", "AccessDeniedException", "UnauthorizedOperation", "AuthorizationError"],
        "Access denied. Check the IAM permissions of the active credentials.",
    ),
    (
        &["Throttling", "ThrottlingException", "TooManyRequestsException", "RequestLimitExceeded", "SlowDown"],
        "Request throttled by AWS. Please try again later.",
    ),
    (
        &["CredentialsNotLoaded"],
        NO_CREDENTIALS,
    ),
];

/// Messages the SDK itself prints for failures that never reached a service
const SDK_FAILURES: &[(&str, &str)] = &[
    ("the credential provider was not enabled", NO_CREDENTIALS),
    ("no providers in chain provided credentials", NO_CREDENTIALS),
    ("dispatch failure", UNREACHABLE),
    ("request has timed out", UNREACHABLE),
];

const NO_CREDENTIALS: &str = "No AWS credentials found. Configure a profile or set AWS_ACCESS_KEY_ID.";
const UNREACHABLE: &str = "Could not reach the AWS endpoint. Check your network connection and region.";

/// Format an AWS API error for display.
///
/// The outermost context (the failing operation) is always kept. Known error
/// codes anywhere in the chain are replaced by a short hint; otherwise the
/// cleaned-up chain is shown.
pub fn format_aws_error(error: &anyhow::Error) -> String {
    let operation = error.to_string();
    let chain = format!("{:#}", error);

    if let Some(hint) = hint_for(&chain) {
        return format!("{}: {}", operation, hint);
    }

    let cleaned: String = chain.chars().filter(|c| !c.is_control()).collect();

    if cleaned.chars().count() > MAX_ERROR_LENGTH {
        let truncated: String = cleaned.chars().take(MAX_ERROR_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        cleaned
    }
}

fn hint_for(chain: &str) -> Option<&'static str> {
    let tokens: Vec<&str> = chain
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    for (codes, hint) in KNOWN_CODES {
        if codes.iter().any(|code| tokens.contains(code)) {
            return Some(*hint);
        }
    }

    SDK_FAILURES
        .iter()
        .find(|(phrase, _)| chain.contains(phrase))
        .map(|(_, hint)| *hint)
}
