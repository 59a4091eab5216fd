//! Token encoding: JSON → UTF-8 bytes → unpadded URL-safe base64.

use base64::{
  Engine as _,
  alphabet,
  engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::URL_SAFE_NO_PAD},
};

use crate::{Error, Result, SharePayload};

const LENIENT: GeneralPurposeConfig =
  GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// URL-safe alphabet, padding optional.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Standard alphabet, padding optional; accepted for links minted by older
/// clients.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

pub fn encode(payload: &SharePayload) -> Result<String> {
  let json = serde_json::to_vec(payload)?;
  Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode(token: &str) -> Result<SharePayload> {
  let token = token.trim();
  if token.is_empty() {
    return Err(Error::MissingToken);
  }

  let bytes = match URL_SAFE_LENIENT.decode(token) {
    Ok(bytes) => bytes,
    Err(_) => STANDARD_LENIENT.decode(token)?,
  };

  let mut payload: SharePayload = serde_json::from_slice(&bytes)?;
  payload.snapshot.normalize_athlete_ids();
  Ok(payload)
}

#[cfg(test)]
mod tests {
  use base64::{Engine as _, engine::general_purpose::STANDARD};
  use meet_core::event::EventSnapshot;

  use super::*;

  #[test]
  fn accepts_padded_standard_alphabet() {
    let payload = SharePayload::new(None, EventSnapshot::new("??>>"));
    let json = serde_json::to_vec(&payload).unwrap();
    let legacy = STANDARD.encode(json);
    assert_eq!(decode(&legacy).unwrap(), payload);
  }

  #[test]
  fn repeated_athlete_ids_are_rekeyed() {
    let json = br#"{"snapshot":{"title":"x","athletes":[{"id":"a","name":"Fast"},{"id":"a","name":"Slow"}]}}"#;
    let payload = decode(&URL_SAFE_NO_PAD.encode(json)).unwrap();
    let ids: Vec<&str> = payload.snapshot.athletes.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["a", "a-2"]);
  }

  #[test]
  fn rejects_valid_base64_of_wrong_shape() {
    let token = URL_SAFE_NO_PAD.encode(br#"{"title":"no snapshot key"}"#);
    assert!(matches!(decode(&token), Err(Error::Json(_))));
  }
}
