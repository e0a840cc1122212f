//! Texts and URIs sent to emergency contacts
//!
//! The wording matches what contacts have been receiving from the phone app,
//! so it is kept byte for byte, including the emoji.

use guidex_core::PhoneNumber;
use serde::{Deserialize, Serialize};

use crate::device::Coordinates;

/// Body of the "Get Help" SMS
pub const HELP_MESSAGE: &str = "Help! I need assistance urgently. Please respond ASAP.";

/// Google Maps link centred on `coords`
pub fn maps_link(coords: Coordinates) -> String {
    format!("https://maps.google.com/?q={},{}", coords.latitude, coords.longitude)
}

/// SMS body sent after a fall
pub fn fall_alert_message(coords: Coordinates) -> String {
    format!(
        "🚨 Fall detected! I may need help.\nLocation:\nLat: {}, Lon: {}\n{}",
        coords.latitude,
        coords.longitude,
        maps_link(coords)
    )
}

/// Dialer URI
pub fn tel_uri(number: &PhoneNumber) -> String {
    format!("tel:{}", number)
}

/// SMS composer URI with a pre-filled body
///
/// The body is percent-encoded as UTF-8; only `A-Z a-z 0-9 - . _ ~` pass
/// through unchanged.
pub fn sms_uri(number: &PhoneNumber, body: &str) -> String {
    format!("sms:{}?body={}", number, urlencoding::encode(body))
}

/// Reverse-geocoded place, every part optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
}

impl Address {
    /// One-line address, e.g. `Shaniwar Wada, Pune, Maharashtra`
    ///
    /// Missing and blank parts are left out entirely.
    pub fn formatted(&self) -> String {
        [&self.name, &self.street, &self.city, &self.region, &self.postal_code]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Health details shown to first responders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthInfo {
    pub blood_type: String,
    pub allergies: String,
}

impl Default for HealthInfo {
    fn default() -> Self {
        Self {
            blood_type: "O+".into(),
            allergies: "None".into(),
        }
    }
}

impl HealthInfo {
    pub fn summary(&self) -> String {
        format!("Blood Type: {}\nAllergies: {}", self.blood_type, self.allergies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> PhoneNumber {
        PhoneNumber::parse("+919822115810").unwrap()
    }

    #[test]
    fn fall_message_wording() {
        let message = fall_alert_message(Coordinates::new(18.5204, 73.8567));
        assert_eq!(
            message,
            "🚨 Fall detected! I may need help.\nLocation:\nLat: 18.5204, Lon: 73.8567\n\
             https://maps.google.com/?q=18.5204,73.8567"
        );
    }

    #[test]
    fn whole_degrees_print_without_fraction() {
        assert_eq!(maps_link(Coordinates::new(18.0, -73.5)), "https://maps.google.com/?q=18,-73.5");
    }

    #[test]
    fn tel_uri_uses_normalised_number() {
        assert_eq!(tel_uri(&contact()), "tel:+919822115810");
    }

    #[test]
    fn sms_uri_encodes_body() {
        let uri = sms_uri(&contact(), "Help me: now!\nOK?");
        assert_eq!(uri, "sms:+919822115810?body=Help%20me%3A%20now%21%0AOK%3F");
    }

    #[test]
    fn sms_body_encoding() {
        let uri = sms_uri(&contact(), "a-b_c.d~e (f*g) q=1,2&x 🚨");
        assert_eq!(
            uri,
            "sms:+919822115810?body=a-b_c.d~e%20%28f%2Ag%29%20q%3D1%2C2%26x%20%F0%9F%9A%A8"
        );
    }

    #[test]
    fn address_skips_missing_parts() {
        let address = Address {
            name: Some("Shaniwar Wada".into()),
            street: None,
            city: Some("Pune".into()),
            region: Some(" ".into()),
            postal_code: Some("411030".into()),
        };
        assert_eq!(address.formatted(), "Shaniwar Wada, Pune, 411030");
        assert_eq!(Address::default().formatted(), "");
    }

    #[test]
    fn health_summary() {
        assert_eq!(HealthInfo::default().summary(), "Blood Type: O+\nAllergies: None");
    }
}
