//! Mock travel lookups: weather, flights and hotels
//!
//! Static tables stand in for real data sources. Every lookup is a pure
//! function of its arguments.

use crate::error::Result;
use crate::tools::{parse_args, schema_of, Tool, ToolOutput, ToolRegistry};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Tool name of the weather lookup
pub const WEATHER_TOOL: &str = "get_weather_forecast";
/// Tool name of the flight search
pub const FLIGHT_TOOL: &str = "search_flights";
/// Tool name of the hotel search
pub const HOTEL_TOOL: &str = "search_hotels";

struct CityClimate {
    city: &'static str,
    sunny: f32,
    rainy: f32,
    cloudy: f32,
    temperature: &'static str,
}

const CLIMATE: [CityClimate; 7] = [
    CityClimate { city: "New York", sunny: 0.3, rainy: 0.4, cloudy: 0.3, temperature: "15-25°C" },
    CityClimate { city: "Los Angeles", sunny: 0.8, rainy: 0.1, cloudy: 0.1, temperature: "20-30°C" },
    CityClimate { city: "Chicago", sunny: 0.4, rainy: 0.3, cloudy: 0.3, temperature: "10-20°C" },
    CityClimate { city: "Miami", sunny: 0.7, rainy: 0.2, cloudy: 0.1, temperature: "25-35°C" },
    CityClimate { city: "London", sunny: 0.2, rainy: 0.5, cloudy: 0.3, temperature: "10-18°C" },
    CityClimate { city: "Paris", sunny: 0.4, rainy: 0.3, cloudy: 0.3, temperature: "12-22°C" },
    CityClimate { city: "Tokyo", sunny: 0.5, rainy: 0.3, cloudy: 0.2, temperature: "15-25°C" },
];

impl CityClimate {
    /// Most likely condition; earlier entries win ties
    fn likeliest(&self) -> &'static str {
        let mut best = ("sunny", self.sunny);
        for candidate in [("rainy", self.rainy), ("cloudy", self.cloudy)] {
            if candidate.1 > best.1 {
                best = candidate;
            }
        }
        best.0
    }
}

/// Arguments of [`WeatherForecastTool`]
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WeatherArgs {
    /// City name, e.g. "Paris"
    pub city: String,
    /// Date of interest, free form
    pub date: String,
}

/// Weather forecast lookup
pub struct WeatherForecastTool;

impl Tool for WeatherForecastTool {
    fn name(&self) -> &str {
        WEATHER_TOOL
    }

    fn description(&self) -> &str {
        "Get the weather forecast for a city on a specific date."
    }

    fn input_schema(&self) -> Value {
        schema_of::<WeatherArgs>()
    }

    fn execute(&self, params: &Value) -> Result<ToolOutput> {
        let args: WeatherArgs = parse_args(self.name(), params)?;
        Ok(ToolOutput::text(forecast(&args.city, &args.date)))
    }
}

/// Forecast sentence for a city and date
pub fn forecast(city: &str, date: &str) -> String {
    match CLIMATE.iter().find(|entry| entry.city == city) {
        Some(entry) => format!(
            "The weather in {} on {} is forecasted to be {} with temperatures around {}.",
            city,
            date,
            entry.likeliest(),
            entry.temperature
        ),
        None => format!("Weather forecast for {} is not available.", city),
    }
}

/// A flight candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOption {
    /// Operating airline
    pub airline: String,
    /// Departure time
    pub departure_time: String,
    /// Arrival time
    pub arrival_time: String,
    /// Ticket price in USD
    pub price: f64,
    /// Whether the flight is non-stop
    pub direct: bool,
}

/// Arguments of [`FlightSearchTool`]
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FlightSearchArgs {
    /// Departure city
    pub origin: String,
    /// Arrival city
    pub destination: String,
    /// Travel date
    pub date: String,
}

/// Flight search
pub struct FlightSearchTool;

impl Tool for FlightSearchTool {
    fn name(&self) -> &str {
        FLIGHT_TOOL
    }

    fn description(&self) -> &str {
        "Search for flights between two cities on a specific date."
    }

    fn input_schema(&self) -> Value {
        schema_of::<FlightSearchArgs>()
    }

    fn execute(&self, params: &Value) -> Result<ToolOutput> {
        let args: FlightSearchArgs = parse_args(self.name(), params)?;
        ToolOutput::records(&search_flights(&args.origin, &args.destination, &args.date))
    }
}

/// Flight candidates for a route; the table does not depend on the route
pub fn search_flights(_origin: &str, _destination: &str, _date: &str) -> Vec<FlightOption> {
    [
        ("SkyWays", "08:00", "10:30", 350.00, true),
        ("OceanAir", "12:45", "15:15", 275.50, true),
        ("MountainJet", "16:30", "21:45", 225.75, false),
    ]
    .into_iter()
    .map(|(airline, departure, arrival, price, direct)| FlightOption {
        airline: airline.to_string(),
        departure_time: departure.to_string(),
        arrival_time: arrival.to_string(),
        price,
        direct,
    })
    .collect()
}

/// A hotel candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelOption {
    /// Hotel name
    pub name: String,
    /// District
    pub location: String,
    /// Nightly rate in USD
    pub price_per_night: f64,
    /// Amenities offered
    pub amenities: Vec<String>,
}

/// Arguments of [`HotelSearchTool`]
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct HotelSearchArgs {
    /// City to stay in
    pub city: String,
    /// Check-in date
    pub check_in: String,
    /// Check-out date
    pub check_out: String,
    /// Highest acceptable nightly rate in USD
    #[serde(default)]
    pub max_price: Option<f64>,
}

/// Hotel search with an optional price ceiling
pub struct HotelSearchTool;

impl Tool for HotelSearchTool {
    fn name(&self) -> &str {
        HOTEL_TOOL
    }

    fn description(&self) -> &str {
        "Search for hotels in a city for specific dates within a price range."
    }

    fn input_schema(&self) -> Value {
        schema_of::<HotelSearchArgs>()
    }

    fn execute(&self, params: &Value) -> Result<ToolOutput> {
        let args: HotelSearchArgs = parse_args(self.name(), params)?;
        ToolOutput::records(&search_hotels(
            &args.city,
            &args.check_in,
            &args.check_out,
            args.max_price,
        ))
    }
}

/// Hotels at or under `max_price` per night; all hotels without a ceiling
pub fn search_hotels(
    _city: &str,
    _check_in: &str,
    _check_out: &str,
    max_price: Option<f64>,
) -> Vec<HotelOption> {
    let hotels: [(&str, &str, f64, &[&str]); 3] = [
        ("City Center Hotel", "Downtown", 199.99, &["WiFi", "Pool", "Gym", "Restaurant"]),
        ("Riverside Inn", "Riverside District", 149.50, &["WiFi", "Free Breakfast", "Parking"]),
        (
            "Luxury Palace",
            "Historic District",
            349.99,
            &["WiFi", "Pool", "Spa", "Fine Dining", "Concierge"],
        ),
    ];

    hotels
        .into_iter()
        .filter(|(_, _, price, _)| max_price.map_or(true, |ceiling| *price <= ceiling))
        .map(|(name, location, price_per_night, amenities)| HotelOption {
            name: name.to_string(),
            location: location.to_string(),
            price_per_night,
            amenities: amenities.iter().map(|a| a.to_string()).collect(),
        })
        .collect()
}

/// Registry holding the three travel tools
pub fn travel_registry() -> ToolRegistry {
    ToolRegistry::new()
        .register(Arc::new(WeatherForecastTool))
        .register(Arc::new(FlightSearchTool))
        .register(Arc::new(HotelSearchTool))
}
