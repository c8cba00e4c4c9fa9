//! NASCAR lap-times feed
//!
//! Plain JSON listing every completed lap for each driver on every poll.

use serde::Deserialize;

use super::{FeedEntry, LapUpdate, Payload, Scalar, lap_time_text, non_blank_text, present_text};
use crate::types::{DriverId, LapRecord};
use crate::{LapFeedError, Result, json_utils};

#[derive(Debug, Deserialize)]
struct Document {
    laps: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
struct Entry {
    #[serde(rename = "NASCARDriverID")]
    driver_id: Option<Scalar>,
    number: Option<Scalar>,
    full_name: Option<Scalar>,
    manufacturer: Option<Scalar>,
    laps: Vec<LapEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LapEntry {
    #[serde(default)]
    lap: Option<Scalar>,
    #[serde(default)]
    lap_time: Option<Scalar>,
    #[serde(default)]
    running_pos: Option<Scalar>,
}

/// Decode a NASCAR lap-times body
pub fn decode(body: &str) -> Result<Payload> {
    let document: Document = json_utils::decode("NASCAR lap-times document", body)?;

    let entries = document
        .laps
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.into_entry(index))
        .collect::<Result<Vec<_>>>()?;

    Ok(Payload::new(entries))
}

impl Entry {
    fn into_entry(self, index: usize) -> Result<FeedEntry> {
        let laps = self
            .laps
            .iter()
            .map(|lap| lap.to_record(index))
            .collect::<Result<Vec<_>>>()?;

        Ok(FeedEntry {
            driver_id: non_blank_text(self.driver_id.as_ref()).map(DriverId::new),
            car_number: present_text(self.number.as_ref()),
            name: present_text(self.full_name.as_ref()),
            manufacturer: present_text(self.manufacturer.as_ref()),
            update: LapUpdate::Batch(laps),
        })
    }
}

impl LapEntry {
    fn to_record(&self, index: usize) -> Result<LapRecord> {
        let context = || format!("NASCAR entry {index}");
        let number = required_u32(self.lap.as_ref(), "Lap", &context)?;
        let position = required_u32(self.running_pos.as_ref(), "RunningPos", &context)?;
        // Lap 0 arrives with a null LapTime
        let time = lap_time_text(self.lap_time.as_ref());
        Ok(LapRecord::new(number, time, position))
    }
}

fn required_u32(value: Option<&Scalar>, field: &str, context: &dyn Fn() -> String) -> Result<u32> {
    let value =
        value.ok_or_else(|| LapFeedError::parse_error(context(), format!("missing {field}")))?;
    value.as_u32().ok_or_else(|| {
        LapFeedError::parse_error(context(), format!("invalid {field} '{}'", value.text()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "laps": [
            {"Number": "9", "FullName": "Chase Elliott", "Manufacturer": "Chv",
             "NASCARDriverID": 4025,
             "Laps": [
                {"Lap": 0, "LapTime": null, "LapSpeed": null, "RunningPos": 3},
                {"Lap": 1, "LapTime": 31.602, "LapSpeed": "170.1", "RunningPos": 2},
                {"Lap": 2, "LapTime": 30.988, "LapSpeed": "173.4", "RunningPos": 1},
                {"Lap": 3, "LapTime": 31.0, "LapSpeed": "169.8", "RunningPos": 1}
             ]},
            {"Number": "24", "FullName": "William Byron", "Manufacturer": "Chv",
             "NASCARDriverID": 4164,
             "Laps": []}
        ]
    }"#;

    #[test]
    fn decodes_every_listed_lap() {
        let payload = decode(BODY).unwrap();
        assert_eq!(payload.entries.len(), 2);

        let elliott = &payload.entries[0];
        assert_eq!(elliott.driver_id, Some(DriverId::new("4025")));
        assert_eq!(elliott.car_number.as_deref(), Some("9"));
        assert_eq!(elliott.name.as_deref(), Some("Chase Elliott"));
        assert_eq!(elliott.manufacturer.as_deref(), Some("Chv"));
        assert_eq!(
            elliott.update,
            LapUpdate::Batch(vec![
                LapRecord::new(0, "", 3),
                LapRecord::new(1, "31.602", 2),
                LapRecord::new(2, "30.988", 1),
                LapRecord::new(3, "31.000", 1),
            ])
        );

        assert_eq!(payload.entries[1].update, LapUpdate::Batch(vec![]));
    }

    #[test]
    fn blank_manufacturer_is_kept_as_empty_text() {
        let body = r#"{"laps": [
            {"NASCARDriverID": 1, "Number": "9", "FullName": "A", "Manufacturer": "", "Laps": []}
        ]}"#;
        let entry = &decode(body).unwrap().entries[0];
        assert_eq!(entry.manufacturer.as_deref(), Some(""));
    }

    #[test]
    fn missing_top_level_laps_is_a_parse_error() {
        let result = decode(r#"{"flags": []}"#);
        assert!(matches!(result, Err(LapFeedError::Parse { .. })));
    }

    #[test]
    fn missing_running_position_is_a_parse_error() {
        let body = r#"{"laps": [{"NASCARDriverID": 1, "Laps": [{"Lap": 4, "LapTime": 30.1}]}]}"#;
        let result = decode(body);
        match result {
            Err(LapFeedError::Parse { context, details }) => {
                assert_eq!(context, "NASCAR entry 0");
                assert!(details.contains("RunningPos"));
            }
            other => panic!("Expected parse error, got {other:?}"),
        }
    }
}
