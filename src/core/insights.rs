use crate::adapters::http::http_client;
use crate::domain::model::{InsightOrigin, InsightsReport, QlooInsight};
use crate::domain::ports::{ConfigProvider, InsightsSource};
use crate::utils::error::{OrchestratorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const QLOO_SERVICE: &str = "Qloo";

/// Qloo v2 insights response; arrays may be absent.
#[derive(Debug, Deserialize)]
struct QlooInsightsResponse {
    #[serde(default)]
    preferences: Vec<String>,
    #[serde(default)]
    trends: Vec<String>,
    #[serde(default)]
    cultural_clusters: Vec<String>,
}

pub struct QlooClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl QlooClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self::new(
            config.qloo_base_url(),
            config.qloo_api_key().map(str::to_string),
            Duration::from_secs(config.request_timeout_secs()),
        )
    }

    fn insights_url(&self) -> String {
        format!("{}/v2/insights", self.base_url)
    }

    async fn request(&self, location: &str, api_key: &str) -> Result<QlooInsight> {
        tracing::debug!("Making Qloo request for location: {}", location);
        let response = self
            .client
            .get(self.insights_url())
            .query(&[
                ("filter.location.query", location),
                ("filter.type", "urn:entity:place"),
            ])
            .header("X-Api-Key", api_key)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        tracing::debug!("Qloo response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OrchestratorError::UpstreamStatus {
                service: QLOO_SERVICE.to_string(),
                status,
                body,
            });
        }

        let data: QlooInsightsResponse =
            response
                .json()
                .await
                .map_err(|e| OrchestratorError::UpstreamFormat {
                    service: QLOO_SERVICE.to_string(),
                    message: e.to_string(),
                })?;

        Ok(QlooInsight {
            preferences: data.preferences,
            trends: data.trends,
            cultural_clusters: data.cultural_clusters,
        })
    }
}

#[async_trait]
impl InsightsSource for QlooClient {
    async fn fetch_insights(&self, location: &str, business_type: &str) -> Result<InsightsReport> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::error!("Qloo API key not configured");
            return Err(OrchestratorError::InsightsUnavailable {
                message: "QLOO_API_KEY is not configured".to_string(),
            });
        };

        // business type is not sent yet; Qloo only filters by location here
        tracing::debug!("Fetching insights for {} in {}", business_type, location);

        match self.request(location, api_key).await {
            Ok(insights) => Ok(InsightsReport {
                insights,
                origin: InsightOrigin::Qloo,
            }),
            Err(e) => {
                tracing::error!("Error calling Qloo API: {}", e);
                Err(OrchestratorError::InsightsUnavailable {
                    message: e.to_string(),
                })
            }
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Canned insights keyed by lowercase location. Unknown locations get the
/// `default` entry.
pub fn mock_insights(location: &str) -> QlooInsight {
    match location.trim().to_lowercase().as_str() {
        "france" => QlooInsight {
            preferences: to_strings(&[
                "luxury brands",
                "artisanal products",
                "sustainable fashion",
                "gourmet food",
            ]),
            trends: to_strings(&[
                "eco-consciousness",
                "local sourcing",
                "premium quality",
                "cultural heritage",
            ]),
            cultural_clusters: to_strings(&[
                "sophistication seekers",
                "tradition preservers",
                "quality enthusiasts",
            ]),
        },
        "japan" => QlooInsight {
            preferences: to_strings(&[
                "minimalist design",
                "high-tech products",
                "seasonal items",
                "kawaii culture",
            ]),
            trends: to_strings(&[
                "digital innovation",
                "convenience focus",
                "aesthetic perfection",
                "group harmony",
            ]),
            cultural_clusters: to_strings(&[
                "tech adopters",
                "aesthetic purists",
                "convenience seekers",
            ]),
        },
        "usa" => QlooInsight {
            preferences: to_strings(&[
                "convenience products",
                "value deals",
                "personalization",
                "brand loyalty",
            ]),
            trends: to_strings(&[
                "fast consumption",
                "social media influence",
                "instant gratification",
                "diversity celebration",
            ]),
            cultural_clusters: to_strings(&[
                "convenience seekers",
                "value hunters",
                "trend followers",
            ]),
        },
        _ => QlooInsight {
            preferences: to_strings(&[
                "quality products",
                "good value",
                "reliable service",
                "local relevance",
            ]),
            trends: to_strings(&[
                "digital adoption",
                "sustainability awareness",
                "personalization",
                "convenience",
            ]),
            cultural_clusters: to_strings(&[
                "quality seekers",
                "value conscious",
                "digitally engaged",
            ]),
        },
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MockInsights;

#[async_trait]
impl InsightsSource for MockInsights {
    async fn fetch_insights(&self, location: &str, _business_type: &str) -> Result<InsightsReport> {
        Ok(InsightsReport {
            insights: mock_insights(location),
            origin: InsightOrigin::Mock,
        })
    }
}

/// Wraps a live source and answers with [`mock_insights`] when it fails.
pub struct WithMockFallback<S: InsightsSource> {
    primary: S,
    enabled: bool,
}

impl<S: InsightsSource> WithMockFallback<S> {
    pub fn new(primary: S, enabled: bool) -> Self {
        Self { primary, enabled }
    }
}

#[async_trait]
impl<S: InsightsSource> InsightsSource for WithMockFallback<S> {
    async fn fetch_insights(&self, location: &str, business_type: &str) -> Result<InsightsReport> {
        match self.primary.fetch_insights(location, business_type).await {
            Ok(report) => Ok(report),
            Err(e) if self.enabled => {
                tracing::warn!("Insights unavailable ({}), using mock data for {}", e, location);
                MockInsights.fetch_insights(location, business_type).await
            }
            Err(e) => Err(e),
        }
    }
}

pub fn insights_from_config<C: ConfigProvider + ?Sized>(config: &C) -> WithMockFallback<QlooClient> {
    WithMockFallback::new(
        QlooClient::from_config(config),
        config.mock_insights_fallback(),
    )
}
