use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ============= Run Parameters =============

/// Parameters for one planning run.
///
/// Only `destination` is mandatory; everything else has a usable default or is
/// optional context for the collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TripRequest {
    /// Free-form description of the trip, forwarded to every collaborator
    #[serde(default)]
    pub query: String,
    pub destination: Option<String>,
    pub origin: Option<String>,
    /// Date range as entered by the user, e.g. "2026-03-01 to 2026-03-08"
    pub dates: Option<String>,
    pub days: Option<u32>,
    #[serde(default = "default_travelers")]
    pub travelers: u32,
    /// Loose travel window, e.g. "March 2026"
    pub travel_time: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub strict_budget: bool,
    pub budget: Option<String>,
}

fn default_travelers() -> u32 {
    1
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for TripRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            destination: None,
            origin: None,
            dates: None,
            days: None,
            travelers: default_travelers(),
            travel_time: None,
            currency: default_currency(),
            strict_budget: false,
            budget: None,
        }
    }
}

impl TripRequest {
    /// Convenience constructor for a request with only a destination set.
    pub fn to_destination(destination: impl Into<String>) -> Self {
        Self {
            destination: Some(destination.into()),
            ..Self::default()
        }
    }

    /// Reject requests that cannot start a run.
    pub fn validate(&self) -> Result<()> {
        match self.destination.as_deref() {
            Some(d) if !d.trim().is_empty() => {}
            _ => {
                return Err(AppError::InvalidParameters(
                    "destination is required".to_string(),
                ))
            }
        }
        if self.travelers == 0 {
            return Err(AppError::InvalidParameters(
                "travelers must be at least 1".to_string(),
            ));
        }
        if self.days == Some(0) {
            return Err(AppError::InvalidParameters(
                "days must be at least 1 when given".to_string(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(AppError::InvalidParameters(
                "currency must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Destination with surrounding whitespace removed ("" when absent).
    pub fn destination(&self) -> &str {
        self.destination.as_deref().map(str::trim).unwrap_or("")
    }

    /// Origin with surrounding whitespace removed ("" when absent).
    pub fn origin(&self) -> &str {
        self.origin.as_deref().map(str::trim).unwrap_or("")
    }

    /// One-line summary used as the user prompt for collaborators.
    pub fn summary(&self) -> String {
        let mut line = format!("Trip to {}", self.destination());
        if let Some(dates) = self.dates.as_deref() {
            line.push_str(&format!(" on {}", dates));
        }
        if !self.origin().is_empty() {
            line.push_str(&format!(" from {}", self.origin()));
        }
        if !self.query.trim().is_empty() {
            line.push_str(&format!(". {}", self.query.trim()));
        }
        line
    }
}

// ============= Collaborator Records =============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Flight {
    pub airline: String,
    pub price: String,
    pub departure: String,
    pub arrival: String,
    pub duration: String,
    pub booking_url: Option<String>,
}

/// Roundtrip flight search output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FlightList {
    pub outbound_flights: Vec<Flight>,
    pub return_flights: Vec<Flight>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Hotel {
    pub name: String,
    pub price_per_night: String,
    pub rating: f32,
    pub description: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub image_url: Option<String>,
    pub booking_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct VisaInfo {
    pub country: String,
    pub required: bool,
    pub requirements: Vec<String>,
    pub processing_time: String,
    pub application_url: Option<String>,
    #[serde(default)]
    pub application_steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Activity {
    pub name: String,
    pub description: String,
    pub price: String,
    pub duration: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ItineraryDay {
    pub day: u32,
    pub activities: Vec<Activity>,
}

// ============= Aggregated Result =============

/// The single result of a planning run.
///
/// Every field is always populated: collaborator output when available,
/// otherwise the configured default (listed in `defaults_applied`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TripPlan {
    pub run_id: Uuid,
    pub destination: String,
    pub origin: Option<String>,
    pub outbound_flights: Vec<Flight>,
    pub return_flights: Vec<Flight>,
    pub hotels: Vec<Hotel>,
    pub visa: VisaInfo,
    pub activities: Vec<Activity>,
    pub itinerary: Vec<ItineraryDay>,
    /// Rough estimate, e.g. "USD 1,650.00". Not an authoritative total.
    pub total_budget: String,
    pub preferred_currency: String,
    /// Output keys that fell back to their default value
    pub defaults_applied: Vec<String>,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Run failed: {0}")]
    RunFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::InvalidParameters(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            AppError::LLM(msg) => (axum::http::StatusCode::BAD_GATEWAY, msg),
            AppError::Collaborator(msg) => (axum::http::StatusCode::BAD_GATEWAY, msg),
            AppError::RunFailed(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Configuration(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_from_json() {
        let request: TripRequest =
            serde_json::from_str(r#"{"destination": "Lisbon"}"#).unwrap();

        assert_eq!(request.travelers, 1);
        assert_eq!(request.currency, "USD");
        assert!(!request.strict_budget);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_missing_destination_is_invalid() {
        let request = TripRequest::default();
        assert!(matches!(
            request.validate(),
            Err(AppError::InvalidParameters(_))
        ));

        let blank = TripRequest::to_destination("   ");
        assert!(matches!(blank.validate(), Err(AppError::InvalidParameters(_))));
    }

    #[test]
    fn test_zero_travelers_and_days_are_invalid() {
        let mut request = TripRequest::to_destination("Kyoto");
        request.travelers = 0;
        assert!(request.validate().is_err());

        let mut request = TripRequest::to_destination("Kyoto");
        request.days = Some(0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_summary_includes_dates_and_origin() {
        let request = TripRequest {
            destination: Some("Paris".to_string()),
            origin: Some("NYC".to_string()),
            dates: Some("May 3-10".to_string()),
            ..TripRequest::default()
        };

        assert_eq!(request.summary(), "Trip to Paris on May 3-10 from NYC");
    }
}
