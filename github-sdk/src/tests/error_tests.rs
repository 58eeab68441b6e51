//! Tests for the error taxonomy

#[cfg(test)]
mod tests {
    use crate::error::{ErrorContext, GitHubError};

    #[test]
    fn codes_are_stable_per_kind() {
        let cases: Vec<(GitHubError, &str)> = vec![
            (GitHubError::authentication("x"), "authentication"),
            (GitHubError::authorization("x"), "authorization"),
            (GitHubError::not_found("x"), "not_found"),
            (GitHubError::rate_limited("x"), "rate_limited"),
            (GitHubError::upstream_server("x"), "upstream_server"),
            (GitHubError::timeout("x"), "timeout"),
            (GitHubError::network("x"), "network"),
            (GitHubError::validation("x"), "validation"),
            (GitHubError::parsing("x"), "parsing"),
            (GitHubError::configuration("x"), "configuration"),
            (GitHubError::unexpected("x"), "unexpected"),
        ];

        for (err, code) in cases {
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn transient_kinds_are_retryable() {
        assert!(GitHubError::network("x").is_retryable());
        assert!(GitHubError::timeout("x").is_retryable());
        assert!(GitHubError::rate_limited("x").is_retryable());
        assert!(GitHubError::upstream_server("x").is_retryable());

        assert!(GitHubError::not_found("x").is_permanent());
        assert!(GitHubError::validation("x").is_permanent());
        assert!(GitHubError::authentication("x").is_permanent());
    }

    #[test]
    fn context_wrapping_preserves_kind_and_message() {
        let err = GitHubError::not_found("Resource not found").with_context(
            ErrorContext::for_endpoint("/repos/a/x")
                .status_code(404)
                .attempts(1),
        );

        assert_eq!(err.code(), "not_found");
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.endpoint(), Some("/repos/a/x"));
        assert!(err.to_string().contains("Resource not found"));
        assert!(err.is_permanent());
    }

    #[test]
    fn retryability_recurses_through_context() {
        let err = GitHubError::timeout("slow").with_context(ErrorContext::new().attempts(3));
        assert!(err.is_retryable());
    }

    #[test]
    fn unexpected_carries_the_original_description() {
        let err = GitHubError::unexpected("socket closed mid-read");
        assert!(err.to_string().contains("socket closed mid-read"));
    }
}
