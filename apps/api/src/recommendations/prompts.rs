// All LLM prompt constants for the Recommendations module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::weather::WeatherConditions;

/// Section marker the prompt asks the model to emit before each tree.
pub const TREE_MARKER: &str = "TREE";

/// Tree recommendation prompt template.
/// Replace: {temperature}, {humidity}, {wind_speed}, {count}
pub const TREE_PROMPT_TEMPLATE: &str = r#"Based on the following weather conditions:
- Temperature: {temperature}°C
- Humidity: {humidity}%
- Wind Speed: {wind_speed} m/s

Provide exactly {count} environmentally friendly tree recommendations for these conditions to keep climate sustainable.
For each tree, provide the information in this exact format (no asterisks, bullets, or markdown):

TREE 1:
Name: [Tree Name]
Benefit: [Environmental benefit]
Suitable: [Why suitable for these conditions]

TREE 2:
Name: [Tree Name]
Benefit: [Environmental benefit]
Suitable: [Why suitable for these conditions]

Continue this pattern for all {count} trees. Make sure each tree is clearly separated and follows this exact format."#;

/// Renders the tree recommendation prompt for the given conditions.
pub fn build_tree_prompt(weather: &WeatherConditions, count: u32) -> String {
    TREE_PROMPT_TEMPLATE
        .replace("{temperature}", &format_number(weather.temperature_c))
        .replace("{humidity}", &format_number(weather.humidity_pct))
        .replace("{wind_speed}", &format_number(weather.wind_speed_ms))
        .replace("{count}", &count.to_string())
}

/// Formats to at most two decimals, dropping trailing zeros ("27.4", "62").
fn format_number(value: f64) -> String {
    let formatted = format!("{value:.2}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
