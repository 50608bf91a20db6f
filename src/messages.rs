// User-facing copy shown by the form.

pub const INVALID_URL: &str = "Please enter a valid URL";
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

pub const SENTIMENT_PLACEHOLDER: &str = "N/A";
pub const EMPTY_LIST_PLACEHOLDER: &str = "No items found";
pub const VERDICT_PLACEHOLDER: &str = "No verdict available";

pub const SUBMIT_LABEL_READY: &str = "Analyze";
pub const SUBMIT_LABEL_BUSY: &str = "Analyzing...";

/// Status lines cycled while a submission is in flight.
pub const LOADING_MESSAGES: [&str; 5] = [
    "Extracting content from URL...",
    "Processing transcript text...",
    "Analyzing with AI...",
    "Generating insights...",
    "Finalizing results...",
];

pub const NETWORK_ERROR: &str =
    "Network error: Please check your internet connection and try again.";
pub const NOT_FOUND_ERROR: &str =
    "The provided URL could not be found. Please check the URL and try again.";
pub const ACCESS_DENIED_ERROR: &str =
    "Access denied: The website may be blocking automated requests.";
pub const TIMEOUT_ERROR: &str =
    "Request timeout: The analysis took too long. Please try again with a different URL.";
pub const CONFIG_ERROR: &str = "Configuration error: Please contact support for assistance.";
pub const RATE_LIMIT_ERROR: &str =
    "Service temporarily unavailable: Too many requests. Please try again in a few minutes.";

// First matching row wins; matching is case-sensitive.
const ERROR_RULES: &[(&[&str], &str)] = &[
    (&["Failed to fetch", "NetworkError"], NETWORK_ERROR),
    (&["404"], NOT_FOUND_ERROR),
    (&["403", "401"], ACCESS_DENIED_ERROR),
    (&["timeout"], TIMEOUT_ERROR),
    (&["API key"], CONFIG_ERROR),
    (&["rate limit"], RATE_LIMIT_ERROR),
];

/// Rewrite a raw failure message into the fixed catalog, passing unknown
/// messages through untouched.
pub fn friendly_error(raw: &str) -> String {
    if raw.is_empty() {
        return UNEXPECTED_ERROR.to_string();
    }
    ERROR_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| raw.contains(n)))
        .map(|(_, msg)| msg.to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Status line for the `index`-th rotation step, wrapping around.
pub fn loading_message(index: usize) -> &'static str {
    LOADING_MESSAGES[index % LOADING_MESSAGES.len()]
}
