use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::ApiError;

/// Parses a JSON request body. An empty body is treated as `{}`.
pub fn parse_json_body<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|_| ApiError::validation("Invalid JSON body"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthRequest {
    pub action: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateOfferBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub payout: Option<f64>,
    pub category: Option<String>,
    pub advertiser_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateOfferBody {
    pub offer_id: Option<i32>,
    pub action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OffersQuery {
    pub id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PixelQuery {
    pub action: Option<String>,
    pub offer_id: Option<String>,
    pub wm_id: Option<String>,
    pub referrer: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatsQuery {
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub period: Option<String>,
}
