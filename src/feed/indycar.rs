//! IndyCar timing and scoring feed
//!
//! The feed reports a running lap count plus the last lap time for each
//! driver, wrapped in a JavaScript callback.

use serde::Deserialize;

use super::{FeedEntry, LapUpdate, Payload, Scalar, lap_time_text, non_blank_text, present_text};
use crate::types::{DriverId, LapRecord};
use crate::{LapFeedError, Result, json_utils};

/// Public IndyCar timing and scoring endpoint
pub const DEFAULT_ENDPOINT: &str = "http://racecontrol.indycar.com/xml/timingscoring.json";

#[derive(Debug, Deserialize)]
struct Document {
    timing_results: TimingResults,
}

#[derive(Debug, Deserialize)]
struct TimingResults {
    #[serde(rename = "Item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
struct Item {
    #[serde(rename = "DriverID")]
    driver_id: Option<Scalar>,
    #[serde(rename = "EntrantID")]
    entrant_id: Option<Scalar>,
    first_name: Option<Scalar>,
    last_name: Option<Scalar>,
    team: Option<Scalar>,
    laps: Option<Scalar>,
    last_lap_time: Option<Scalar>,
    overall_rank: Option<Scalar>,
}

/// Decode a callback-wrapped IndyCar body
pub fn decode(body: &str) -> Result<Payload> {
    let json = json_utils::unwrap_callback(body)?;
    let document: Document = json_utils::decode("IndyCar timing document", json)?;

    let entries = document
        .timing_results
        .items
        .into_iter()
        .enumerate()
        .map(|(index, item)| item.into_entry(index))
        .collect::<Result<Vec<_>>>()?;

    Ok(Payload::new(entries))
}

impl Item {
    fn into_entry(self, index: usize) -> Result<FeedEntry> {
        let first_name = present_text(self.first_name.as_ref());
        let last_name = present_text(self.last_name.as_ref());
        let name = match (first_name, last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}").trim().to_string()),
            _ => None,
        };

        Ok(FeedEntry {
            driver_id: non_blank_text(self.driver_id.as_ref()).map(DriverId::new),
            car_number: present_text(self.entrant_id.as_ref()),
            name,
            manufacturer: present_text(self.team.as_ref()),
            update: LapUpdate::Latest(latest_lap(
                index,
                self.laps.as_ref(),
                self.last_lap_time.as_ref(),
                self.overall_rank.as_ref(),
            )?),
        })
    }
}

fn latest_lap(
    index: usize,
    laps: Option<&Scalar>,
    last_lap_time: Option<&Scalar>,
    overall_rank: Option<&Scalar>,
) -> Result<Option<LapRecord>> {
    // No lap count yet means the car has not completed a lap
    let Some(laps) = laps.filter(|v| !v.is_blank()) else {
        return Ok(None);
    };
    let context = || format!("IndyCar entry {index}");

    let number = laps.as_u32().ok_or_else(|| {
        LapFeedError::parse_error(context(), format!("invalid lap count '{}'", laps.text()))
    })?;
    let rank =
        overall_rank.ok_or_else(|| LapFeedError::parse_error(context(), "missing overallRank"))?;
    let position = rank.as_u32().ok_or_else(|| {
        LapFeedError::parse_error(context(), format!("invalid overallRank '{}'", rank.text()))
    })?;
    let time = lap_time_text(last_lap_time);

    Ok(Some(LapRecord::new(number, time, position)))
}
