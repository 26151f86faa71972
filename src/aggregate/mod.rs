//! Result Aggregator
//!
//! Turns the final snapshot of a run into one [`TripPlan`]. Every field gets
//! a value: collaborator output when the key holds a typed payload, the
//! configured default when it is absent or holds the empty sentinel. Booking
//! links are derived from the run parameters only; no collaborator is called.

pub mod price;

use crate::agents::keys;
use crate::types::{Flight, FlightList, Hotel, TripPlan, TripRequest, VisaInfo};
use crate::workflows::state::{StateSnapshot, TaskOutput};
use reqwest::Url;

pub use crate::utils::toml_config::AggregationDefaults;
pub use price::{extract_price, format_amount};

const GOOGLE_FLIGHTS: &str = "https://www.google.com/travel/flights";
const GOOGLE_HOTELS: &str = "https://www.google.com/travel/hotels";

/// Stateless assembler of the final result.
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    defaults: AggregationDefaults,
}

impl ResultAggregator {
    pub fn new(defaults: AggregationDefaults) -> Self {
        Self { defaults }
    }

    /// Build the plan from a snapshot. Never fails.
    pub fn aggregate(&self, snapshot: &StateSnapshot, request: &TripRequest) -> TripPlan {
        let run_id = snapshot.run_id();
        let mut defaults_applied = Vec::new();
        let mut fallback = |field: &str| {
            tracing::info!(%run_id, field, "aggregation default applied");
            defaults_applied.push(field.to_string());
        };

        let destination = match request.destination() {
            "" => {
                fallback("destination");
                self.defaults.unknown_destination.clone()
            }
            d => d.to_string(),
        };
        let origin = Some(request.origin())
            .filter(|o| !o.is_empty())
            .map(str::to_string);
        let dates = request.dates.as_deref().map(str::trim).filter(|d| !d.is_empty());

        let flights = match snapshot.get(keys::FLIGHTS) {
            Some(TaskOutput::Flights(list)) => list.clone(),
            _ => {
                fallback(keys::FLIGHTS);
                FlightList::default()
            }
        };
        let hotels = match snapshot.get(keys::HOTELS) {
            Some(TaskOutput::Hotels(hotels)) => hotels.clone(),
            _ => {
                fallback(keys::HOTELS);
                Vec::new()
            }
        };
        let visa = match snapshot.get(keys::VISA) {
            Some(TaskOutput::Visa(visa)) => visa.clone(),
            _ => {
                fallback(keys::VISA);
                self.default_visa(&destination)
            }
        };
        let activities = match snapshot.get(keys::ACTIVITIES) {
            Some(TaskOutput::Activities(activities)) => activities.clone(),
            _ => {
                fallback(keys::ACTIVITIES);
                Vec::new()
            }
        };
        let itinerary = match snapshot.get(keys::ITINERARY) {
            Some(TaskOutput::Itinerary(days)) => days.clone(),
            _ => {
                fallback(keys::ITINERARY);
                Vec::new()
            }
        };

        let outbound_url = flights_url(origin.as_deref(), Some(&destination), dates);
        let return_url = flights_url(Some(&destination), origin.as_deref(), dates);
        let outbound_flights = with_booking_url(flights.outbound_flights, outbound_url.as_deref());
        let return_flights = with_booking_url(flights.return_flights, return_url.as_deref());

        let hotels: Vec<Hotel> = hotels
            .into_iter()
            .map(|mut hotel| {
                hotel.booking_url = hotels_url(&hotel.name, &destination, dates);
                hotel
            })
            .collect();

        let nights = request.days.unwrap_or(self.defaults.default_nights);
        let mut total = first_price(&outbound_flights) + first_price(&return_flights);
        if let Some(hotel) = hotels.first() {
            total += extract_price(&hotel.price_per_night) * f64::from(nights);
        }
        total += itinerary
            .iter()
            .flat_map(|day| day.activities.iter())
            .map(|activity| extract_price(&activity.price))
            .sum::<f64>();

        TripPlan {
            run_id,
            destination,
            origin,
            outbound_flights,
            return_flights,
            hotels,
            visa,
            activities,
            itinerary,
            total_budget: format!("{} {}", request.currency, format_amount(total)),
            preferred_currency: request.currency.clone(),
            defaults_applied,
        }
    }

    /// "No visa requirement found".
    fn default_visa(&self, destination: &str) -> VisaInfo {
        VisaInfo {
            country: destination.to_string(),
            required: false,
            requirements: Vec::new(),
            processing_time: self.defaults.visa_processing_time.clone(),
            application_url: None,
            application_steps: Vec::new(),
        }
    }
}

fn first_price(flights: &[Flight]) -> f64 {
    flights.first().map(|f| extract_price(&f.price)).unwrap_or(0.0)
}

fn with_booking_url(flights: Vec<Flight>, url: Option<&str>) -> Vec<Flight> {
    flights
        .into_iter()
        .map(|mut flight| {
            flight.booking_url = url.map(str::to_string);
            flight
        })
        .collect()
}

/// Google Flights search for "from <origin> to <destination> <dates>".
pub fn flights_url(from: Option<&str>, to: Option<&str>, dates: Option<&str>) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(from) = from.filter(|s| !s.is_empty()) {
        parts.push(format!("from {}", from));
    }
    if let Some(to) = to.filter(|s| !s.is_empty()) {
        parts.push(format!("to {}", to));
    }
    if let Some(dates) = dates {
        parts.push(dates.to_string());
    }
    search_url(GOOGLE_FLIGHTS, &parts.join(" "))
}

/// Google Hotels search for "<hotel> <destination> <dates>".
pub fn hotels_url(hotel: &str, destination: &str, dates: Option<&str>) -> Option<String> {
    let name = if hotel.trim().is_empty() { "hotel" } else { hotel.trim() };
    let mut query = format!("{} {}", name, destination);
    if let Some(dates) = dates {
        query.push(' ');
        query.push_str(dates);
    }
    search_url(GOOGLE_HOTELS, &query)
}

fn search_url(base: &str, query: &str) -> Option<String> {
    Url::parse_with_params(base, &[("q", query)])
        .map(String::from)
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Activity, ItineraryDay};
    use crate::workflows::state::RunState;
    use uuid::Uuid;

    fn flight(price: &str) -> Flight {
        Flight {
            airline: "TAP".to_string(),
            price: price.to_string(),
            departure: "08:00".to_string(),
            arrival: "11:00".to_string(),
            duration: "3h".to_string(),
            booking_url: None,
        }
    }

    fn hotel(name: &str, price: &str) -> Hotel {
        Hotel {
            name: name.to_string(),
            price_per_night: price.to_string(),
            rating: 4.5,
            description: "Central".to_string(),
            amenities: vec!["wifi".to_string()],
            image_url: None,
            booking_url: None,
        }
    }

    fn activity(name: &str, price: &str) -> Activity {
        Activity {
            name: name.to_string(),
            description: String::new(),
            price: price.to_string(),
            duration: "2 hours".to_string(),
            image_url: None,
        }
    }

    fn request() -> TripRequest {
        TripRequest {
            destination: Some("Lisbon".to_string()),
            origin: Some("Berlin".to_string()),
            dates: Some("May 3-7".to_string()),
            days: Some(4),
            currency: "EUR".to_string(),
            ..TripRequest::default()
        }
    }

    #[test]
    fn test_empty_snapshot_gets_every_default() {
        let state = RunState::new(Uuid::new_v4());
        let plan =
            ResultAggregator::default().aggregate(&state.snapshot(), &TripRequest::default());

        assert_eq!(plan.destination, "Unknown");
        assert_eq!(plan.origin, None);
        assert!(plan.outbound_flights.is_empty());
        assert!(plan.itinerary.is_empty());
        assert!(!plan.visa.required);
        assert_eq!(plan.visa.country, "Unknown");
        assert_eq!(plan.visa.processing_time, "N/A");
        assert_eq!(plan.total_budget, "USD 0.00");
        assert_eq!(
            plan.defaults_applied,
            vec!["destination", "flights", "hotels", "visa", "activities", "itinerary"]
        );
    }

    #[test]
    fn test_full_snapshot_estimate_and_links() {
        let state = RunState::new(Uuid::new_v4());
        state.write(
            keys::FLIGHTS,
            TaskOutput::Flights(FlightList {
                outbound_flights: vec![flight("EUR 210"), flight("EUR 180")],
                return_flights: vec![flight("EUR 1,190.50")],
            }),
        );
        state.write(keys::HOTELS, TaskOutput::Hotels(vec![hotel("Casa Azul", "EUR 95/night")]));
        state.write(keys::VISA, TaskOutput::Empty);
        state.write(keys::ACTIVITIES, TaskOutput::Activities(vec![activity("Tram 28", "EUR 3")]));
        state.write(
            keys::ITINERARY,
            TaskOutput::Itinerary(vec![ItineraryDay {
                day: 1,
                activities: vec![activity("Belem tower", "EUR 10"), activity("Walk", "Free")],
            }]),
        );

        let plan = ResultAggregator::default().aggregate(&state.snapshot(), &request());

        // 210 + 1190.50 + 95 * 4 + 10
        assert_eq!(plan.total_budget, "EUR 1,790.50");
        assert_eq!(plan.preferred_currency, "EUR");
        assert_eq!(plan.defaults_applied, vec!["visa"]);
        assert_eq!(plan.visa.country, "Lisbon");
        assert_eq!(plan.activities.len(), 1);

        let outbound = plan.outbound_flights[0].booking_url.as_deref().unwrap();
        assert!(outbound.starts_with("https://www.google.com/travel/flights?q="));
        assert!(outbound.contains("from+Berlin+to+Lisbon+May+3-7"));
        let inbound = plan.return_flights[0].booking_url.as_deref().unwrap();
        assert!(inbound.contains("from+Lisbon+to+Berlin"));
        let stay = plan.hotels[0].booking_url.as_deref().unwrap();
        assert!(stay.contains("Casa+Azul+Lisbon+May+3-7"));
    }

    #[test]
    fn test_default_nights_without_days() {
        let state = RunState::new(Uuid::new_v4());
        state.write(keys::HOTELS, TaskOutput::Hotels(vec![hotel("Inn", "USD 100")]));
        let aggregator = ResultAggregator::new(AggregationDefaults {
            default_nights: 2,
            ..AggregationDefaults::default()
        });

        let plan = aggregator.aggregate(&state.snapshot(), &TripRequest::to_destination("Oslo"));
        assert_eq!(plan.total_budget, "USD 200.00");
    }

    #[test]
    fn test_mistyped_value_falls_back() {
        let state = RunState::new(Uuid::new_v4());
        state.write(keys::HOTELS, TaskOutput::Value(serde_json::json!({"hotels": []})));

        let plan = ResultAggregator::default().aggregate(&state.snapshot(), &request());
        assert!(plan.hotels.is_empty());
        assert!(plan.defaults_applied.contains(&"hotels".to_string()));
    }

    #[test]
    fn test_flights_url_skips_missing_origin() {
        let url = flights_url(None, Some("Rome"), None).unwrap();
        assert_eq!(url, "https://www.google.com/travel/flights?q=to+Rome");
    }
}
