//! Device position and reverse geocoding.

use serde::Deserialize;
use std::time::Duration;

use crate::models::report::Coordinates;

/// Default client-side limit on a position fix.
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of asking the platform for access to a device capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// One reverse-geocoding result, split into the parts the address uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressComponents {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Source of the device position.
#[allow(async_fn_in_trait)]
pub trait Geolocator {
    async fn request_permission(&self) -> PermissionStatus;

    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

#[allow(async_fn_in_trait)]
pub trait ReverseGeocoder {
    async fn reverse_geocode(
        &self,
        coordinates: Coordinates,
    ) -> Result<Vec<AddressComponents>, LocationError>;
}

/// Fetch the current position, giving up after `timeout`.
pub async fn current_position_within<G: Geolocator>(
    geolocator: &G,
    timeout: Duration,
) -> Result<Coordinates, LocationError> {
    tokio::time::timeout(timeout, geolocator.current_position())
        .await
        .map_err(|_| LocationError::Timeout(timeout))?
}

/// Multi-line address: name, street, "city, region postcode", country.
/// Absent parts are left out.
pub fn format_address(components: &AddressComponents) -> String {
    let present = |part: &Option<String>| {
        part.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let region_line = [present(&components.region), present(&components.postal_code)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let locality = match (present(&components.city), region_line.is_empty()) {
        (Some(city), false) => Some(format!("{}, {}", city, region_line)),
        (Some(city), true) => Some(city),
        (None, false) => Some(region_line),
        (None, true) => None,
    };

    [
        present(&components.name),
        present(&components.street),
        locality,
        present(&components.country),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n")
}

/// Position fixed up front, e.g. from command-line arguments.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Option<Coordinates>);

impl Geolocator for FixedPosition {
    async fn request_permission(&self) -> PermissionStatus {
        match self.0 {
            Some(_) => PermissionStatus::Granted,
            None => PermissionStatus::Denied,
        }
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.0.ok_or(LocationError::Unavailable)
    }
}

/// Reverse geocoder backed by an OpenStreetMap Nominatim server.
pub struct NominatimGeocoder {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct NominatimResponse {
    name: Option<String>,
    address: Option<NominatimAddress>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct NominatimAddress {
    house_number: Option<String>,
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LocationError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("waste-report/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse_geocode(
        &self,
        coordinates: Coordinates,
    ) -> Result<Vec<AddressComponents>, LocationError> {
        let url = format!("{}/reverse", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LocationError::Geocoder(format!(
                "geocoder returned HTTP {}",
                response.status()
            )));
        }

        let body: NominatimResponse = response.json().await?;
        if let Some(error) = body.error {
            tracing::debug!(error = %error, "Nominatim found no address");
            return Ok(Vec::new());
        }

        let Some(address) = body.address else {
            return Ok(Vec::new());
        };

        let street = match (address.house_number, address.road) {
            (Some(number), Some(road)) => Some(format!("{} {}", number, road)),
            (None, road) => road,
            (number, None) => number,
        };

        Ok(vec![AddressComponents {
            name: body.name,
            street,
            city: address.city.or(address.town).or(address.village),
            region: address.state,
            postal_code: address.postcode,
            country: address.country,
        }])
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("No position available from the location source")]
    Unavailable,

    #[error("Timed out after {0:?} waiting for a position fix")]
    Timeout(Duration),

    #[error("Reverse geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Reverse geocoding failed: {0}")]
    Geocoder(String),
}
