use std::env;

pub const DEFAULT_AUTH_URL: &str = "https://learn.reboot01.com/api/auth/signin";
pub const DEFAULT_GRAPHQL_URL: &str = "https://learn.reboot01.com/api/graphql-engine/v1/graphql";
pub const DEFAULT_PATH_SCOPE: &str = "/bahrain/bh-module";
pub const DEFAULT_CHART_WIDTH: u32 = 600;
pub const MIN_CHART_WIDTH: u32 = 200;
pub const MAX_CHART_WIDTH: u32 = 2000;

/// Ratios below this (after rounding to one decimal) get the "low" message.
pub const RATIO_THRESHOLD: f64 = 1.2;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub auth_url: String,
    pub graphql_url: String,
    pub path_scope: String,
    pub chart_width: u32,
    pub ratio_copy: RatioCopy,
}

/// Presentation copy for the audit ratio line.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioCopy {
    pub low: String,
    pub good: String,
}

impl Default for RatioCopy {
    fn default() -> Self {
        Self {
            low: "You should do better".to_string(),
            good: "It's good".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            path_scope: DEFAULT_PATH_SCOPE.to_string(),
            chart_width: DEFAULT_CHART_WIDTH,
            ratio_copy: RatioCopy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        let ratio_copy = RatioCopy {
            low: env::var("RATIO_LOW_MESSAGE").unwrap_or(defaults.ratio_copy.low),
            good: env::var("RATIO_GOOD_MESSAGE").unwrap_or(defaults.ratio_copy.good),
        };

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(defaults.port),
            auth_url: env::var("AUTH_URL").unwrap_or(defaults.auth_url),
            graphql_url: env::var("GRAPHQL_URL").unwrap_or(defaults.graphql_url),
            path_scope: env::var("PATH_SCOPE")
                .map(|value| value.trim_end_matches('/').to_string())
                .unwrap_or(defaults.path_scope),
            chart_width: env::var("CHART_WIDTH")
                .ok()
                .and_then(|value| value.parse::<u32>().ok())
                .map(clamp_width)
                .unwrap_or(defaults.chart_width),
            ratio_copy,
        }
    }

    /// Width to lay charts out at for one render pass.
    pub fn chart_width(&self, requested: Option<u32>) -> u32 {
        requested.map(clamp_width).unwrap_or(self.chart_width)
    }
}

pub fn clamp_width(width: u32) -> u32 {
    width.clamp(MIN_CHART_WIDTH, MAX_CHART_WIDTH)
}
