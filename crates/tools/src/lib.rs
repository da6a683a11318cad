//! Built-in tool implementations for InfoAgent.
//!
//! Tools give the agent the ability to answer questions the model cannot
//! answer alone: evaluate math expressions, check the current weather,
//! and search the web.

pub mod calculator;
pub mod weather_lookup;
pub mod web_search;

pub use calculator::CalculatorTool;
pub use weather_lookup::WeatherLookupTool;
pub use web_search::WebSearchTool;

use infoagent_core::tool::ToolRegistry;

/// Create the default tool registry with all built-in tools.
///
/// `search_api_key` is the Tavily key; when `None` the web_search tool is
/// still registered and explains that search is unavailable.
pub fn default_registry(search_api_key: Option<String>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(CalculatorTool));
    registry.register(Box::new(WeatherLookupTool::new()));
    registry.register(Box::new(WebSearchTool::new(search_api_key)));
    registry
}
