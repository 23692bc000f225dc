use crate::domain::ports::DistanceSource;
use crate::utils::error::{Result, ShippingError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_DISTANCE_MATRIX_ENDPOINT: &str =
    "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Country appended to every destination so short town names resolve locally.
const DESTINATION_SUFFIX: &str = ", Kenya";

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
struct MatrixValue {
    /// Metres.
    value: u64,
}

/// Client for a Distance Matrix style JSON API.
#[derive(Debug, Clone)]
pub struct DistanceMatrixClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl DistanceMatrixClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    fn parse(city: &str, body: MatrixResponse) -> Result<u32> {
        if body.status != "OK" {
            return Err(ShippingError::UpstreamStatusError {
                city: city.to_string(),
                status: body.status,
            });
        }

        let element = body
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next())
            .ok_or_else(|| ShippingError::MalformedResponseError {
                city: city.to_string(),
                message: "response has no rows or elements".to_string(),
            })?;

        if element.status != "OK" {
            return Err(ShippingError::NoRouteError {
                city: city.to_string(),
                status: element.status,
            });
        }

        let metres = element
            .distance
            .ok_or_else(|| ShippingError::MalformedResponseError {
                city: city.to_string(),
                message: "element has no distance".to_string(),
            })?
            .value;

        let km = (metres as f64 / 1000.0).round();
        u32::try_from(km as u64).map_err(|_| ShippingError::MalformedResponseError {
            city: city.to_string(),
            message: format!("distance of {} m is out of range", metres),
        })
    }
}

#[async_trait::async_trait]
impl DistanceSource for DistanceMatrixClient {
    async fn distance_km(&self, origin: &str, city: &str) -> Result<u32> {
        let destination = format!("{}{}", city, DESTINATION_SUFFIX);
        tracing::debug!("Requesting distance {} -> {}", origin, destination);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("origins", origin),
                ("destinations", destination.as_str()),
                ("key", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Distance service response status: {}", status);
        if !status.is_success() {
            return Err(ShippingError::UpstreamStatusError {
                city: city.to_string(),
                status: format!("HTTP {}", status.as_u16()),
            });
        }

        let body: MatrixResponse = response.json().await?;
        Self::parse(city, body)
    }
}
