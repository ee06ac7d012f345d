//! Option source backed by a JSON file
//!
//! Stands in for a remote endpoint: the file is read once, and every request
//! answers with the options whose labels or values match the keyword, after
//! an optional simulated latency.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use blinc_field::config::FieldConfig;
use blinc_field::error::FetchError;
use blinc_field::filter::filter_list;
use blinc_field::option::{list_from_json, FieldNames, SelectOption};
use blinc_field::request::{OptionRequest, OptionsFuture, RequestQuery};
use tracing::info;

pub struct JsonFileSource {
    options: Arc<Vec<SelectOption>>,
    latency: Duration,
}

impl JsonFileSource {
    pub fn new(options: Vec<SelectOption>, latency: Duration) -> Self {
        Self {
            options: Arc::new(options),
            latency,
        }
    }

    /// Read an option list, mapping property names through `names`
    pub fn load(path: &Path, names: &FieldNames, latency: Duration) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        let options = list_from_json(&value, names)
            .with_context(|| format!("Invalid option list in {}", path.display()))?;

        info!("Loaded {} options from {}", options.len(), path.display());
        Ok(Self::new(options, latency))
    }
}

impl OptionRequest for JsonFileSource {
    fn request(&self, query: RequestQuery, _field: &FieldConfig) -> OptionsFuture {
        let options = self.options.clone();
        let latency = self.latency;
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            Ok::<_, FetchError>(filter_list(
                &options,
                query.keyword.as_deref().unwrap_or_default(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn query(keyword: Option<&str>) -> RequestQuery {
        RequestQuery {
            params: Value::Null,
            keyword: keyword.map(str::to_string),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_filters_server_side() {
        let source = JsonFileSource::new(
            vec![
                SelectOption::new("ada", "Ada Lovelace"),
                SelectOption::new("alan", "Alan Turing"),
            ],
            Duration::from_millis(250),
        );
        let config = FieldConfig::default();

        let all = source.request(query(None), &config).await.unwrap();
        assert_eq!(all.len(), 2);

        let turing = source.request(query(Some("turing")), &config).await.unwrap();
        assert_eq!(turing, vec![SelectOption::new("alan", "Alan Turing")]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = JsonFileSource::load(
            Path::new("/nonexistent/options.json"),
            &FieldNames::default(),
            Duration::ZERO,
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("Failed to read"));
    }
}
