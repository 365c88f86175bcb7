use std::fmt::Write;

use crate::services::checker::CheckResult;

/// Render a batch of results into the analysis prompt sent to the model.
pub fn build_analysis_prompt(results: &[CheckResult]) -> String {
    let mut prompt = String::new();

    prompt.push_str("You are an expert system administrator analyzing API endpoint monitoring data. ");
    prompt.push_str(
        "Provide 2-4 concise insights in JSON format with title, content, type (alert/warning/info/success), and confidence (0.0-1.0).\n\n",
    );
    prompt.push_str("Current endpoint status:\n");

    for result in results {
        let status = if result.is_healthy { "HEALTHY" } else { "UNHEALTHY" };
        let _ = writeln!(
            prompt,
            "- {}: {} (Status: {}, Response Time: {}ms, Error: {})",
            result.url,
            status,
            result.status_code,
            result.response_time_ms(),
            result.error.as_deref().unwrap_or(""),
        );
    }

    prompt.push_str(
        "\nProvide insights as JSON array: [{\"title\":\"...\",\"content\":\"...\",\"type\":\"alert|warning|info|success\",\"confidence\":0.9}]\n",
    );
    prompt.push_str("Focus on:\n");
    prompt.push_str("1. Immediate issues requiring attention\n");
    prompt.push_str("2. Performance trends and patterns\n");
    prompt.push_str("3. Proactive recommendations\n");
    prompt.push_str("4. System health summary\n");

    prompt
}
