//! Gemini API preflight check.

use super::CheckResult;
use crate::services::gemini::GeminiClient;

/// Check if the Gemini API is accessible.
pub async fn check() -> CheckResult {
    match GeminiClient::from_env() {
        Ok(client) => match client.verify_api_key().await {
            Ok(true) => CheckResult::ok("Gemini API", "connected"),
            Ok(false) => CheckResult::fail(
                "Gemini API",
                "invalid API key",
                "Check your GEMINI_API_KEY environment variable",
            ),
            Err(_) => CheckResult::fail(
                "Gemini API",
                "connection failed",
                "Check your network connection",
            ),
        },
        Err(_) => CheckResult::fail(
            "Gemini API",
            "API key not configured",
            "Set GEMINI_API_KEY environment variable",
        ),
    }
}
