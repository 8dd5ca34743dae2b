//! Ticket encoding.
//!
//! An encoded ticket is URL-safe base64 of a JSON envelope holding the ticket
//! fields plus a validation code. The code is a SHA-256 digest of the machine
//! secret and the ticket fields, so editing any field without the secret is
//! caught at the gate as a signature mismatch.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{DecodedTicket, Price, RateBand, Station, Ticket};

use super::error::CodecError;

/// Ticket fields covered by the validation code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketFields {
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
    rate_band: RateBand,
    price: Price,
    start_station: Station,
    dest_station: Station,
}

impl From<&Ticket> for TicketFields {
    fn from(ticket: &Ticket) -> Self {
        Self {
            valid_from: ticket.valid_from(),
            valid_to: ticket.valid_to(),
            rate_band: ticket.rate_band(),
            price: ticket.price(),
            start_station: ticket.start_station().clone(),
            dest_station: ticket.dest_station().clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(flatten)]
    fields: TicketFields,
    validation_code: String,
}

/// Signs, encodes and decodes tickets with a shared secret.
#[derive(Clone)]
pub struct TicketCodec {
    secret: Vec<u8>,
}

impl TicketCodec {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Encode and sign a ticket for issuance.
    pub fn encode(&self, ticket: &Ticket) -> Result<String, CodecError> {
        let fields = TicketFields::from(ticket);
        let validation_code = self.validation_code(&fields)?;
        let envelope = Envelope {
            fields,
            validation_code,
        };

        let json = serde_json::to_vec(&envelope).map_err(|e| CodecError::Malformed {
            message: e.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode a ticket presented at a gate.
    ///
    /// Input that isn't a ticket at all is an error. A well-formed ticket
    /// whose validation code doesn't match comes back with
    /// `signature_valid == false`.
    pub fn decode(&self, encoded: &str) -> Result<DecodedTicket, CodecError> {
        let bytes = URL_SAFE_NO_PAD.decode(encoded.trim())?;
        let envelope: Envelope =
            serde_json::from_slice(&bytes).map_err(|e| CodecError::Malformed {
                message: e.to_string(),
            })?;

        let expected = self.validation_code(&envelope.fields)?;
        let signature_valid = codes_match(&expected, &envelope.validation_code);

        let f = envelope.fields;
        let ticket = Ticket::new(
            f.valid_from,
            f.valid_to,
            f.rate_band,
            f.price,
            f.start_station,
            f.dest_station,
        )?;

        Ok(DecodedTicket::new(ticket, signature_valid))
    }

    fn validation_code(&self, fields: &TicketFields) -> Result<String, CodecError> {
        let canonical = serde_json::to_vec(fields).map_err(|e| CodecError::Malformed {
            message: e.to_string(),
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(&canonical);
        Ok(STANDARD.encode(hasher.finalize()))
    }
}

impl fmt::Debug for TicketCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketCodec")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Compare validation codes without exiting early on the first difference.
fn codes_match(expected: &str, presented: &str) -> bool {
    let (a, b) = (expected.as_bytes(), presented.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Zone;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, hour, min, 0).unwrap()
    }

    fn ticket() -> Ticket {
        Ticket::new(
            at(12, 30),
            at(14, 30),
            RateBand::OffPeak,
            Price::from_pence(500),
            Station::new("Upney", Zone::new(2).unwrap()),
            Station::new("Whitechapel", Zone::new(4).unwrap()),
        )
        .unwrap()
    }

    /// Edit the JSON inside an encoded ticket without re-signing it.
    fn tamper(encoded: &str, edit: impl FnOnce(&mut serde_json::Value)) -> String {
        let bytes = URL_SAFE_NO_PAD.decode(encoded).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        edit(&mut value);
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&value).unwrap())
    }

    #[test]
    fn encoded_ticket_decodes_with_valid_signature() {
        let codec = TicketCodec::new("machine-secret");
        let encoded = codec.encode(&ticket()).unwrap();

        let decoded = codec.decode(&encoded).unwrap();
        assert!(decoded.signature_valid);
        assert_eq!(decoded.ticket, ticket());
    }

    #[test]
    fn replaced_validation_code_is_detected() {
        let codec = TicketCodec::new("machine-secret");
        let encoded = codec.encode(&ticket()).unwrap();
        let tampered = tamper(&encoded, |v| v["validationCode"] = "invalid code".into());

        let decoded = codec.decode(&tampered).unwrap();
        assert!(!decoded.signature_valid);
    }

    #[test]
    fn edited_field_is_detected() {
        let codec = TicketCodec::new("machine-secret");
        let encoded = codec.encode(&ticket()).unwrap();
        let tampered = tamper(&encoded, |v| v["price"] = 1.into());

        let decoded = codec.decode(&tampered).unwrap();
        assert!(!decoded.signature_valid);
        assert_eq!(decoded.ticket.price(), Price::from_pence(1));
    }

    #[test]
    fn widened_zones_are_detected() {
        let codec = TicketCodec::new("machine-secret");
        let encoded = codec.encode(&ticket()).unwrap();
        let tampered = tamper(&encoded, |v| v["destStation"]["zone"] = 9.into());

        assert!(!codec.decode(&tampered).unwrap().signature_valid);
    }

    #[test]
    fn other_secret_rejects_signature() {
        let issued = TicketCodec::new("machine-secret").encode(&ticket()).unwrap();
        let decoded = TicketCodec::new("other-secret").decode(&issued).unwrap();
        assert!(!decoded.signature_valid);
    }

    #[test]
    fn garbage_is_an_error_not_a_panic() {
        let codec = TicketCodec::new("machine-secret");
        assert!(matches!(codec.decode("%%%"), Err(CodecError::Base64(_))));

        let not_json = URL_SAFE_NO_PAD.encode(b"<ticket/>");
        assert!(matches!(
            codec.decode(&not_json),
            Err(CodecError::Malformed { .. })
        ));
    }

    #[test]
    fn inverted_window_is_an_error() {
        let codec = TicketCodec::new("machine-secret");
        let encoded = codec.encode(&ticket()).unwrap();
        let tampered = tamper(&encoded, |v| {
            v["validTo"] = "2024-03-15T10:00:00Z".into();
        });
        assert!(matches!(codec.decode(&tampered), Err(CodecError::Invalid(_))));
    }

    #[test]
    fn debug_hides_secret() {
        let codec = TicketCodec::new("machine-secret");
        assert!(!format!("{:?}", codec).contains("machine-secret"));
    }
}
