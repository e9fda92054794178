//! This module contains [PropertyRecord], the input both front ends collect, together with the
//! allowed values the front ends validate against.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{columns, Column, Frame, PriceError, PriceResult};

/// All property types the front ends offer.
pub const PROPERTY_TYPES: [&str; 2] = ["Apartment", "House"];

/// All property subtypes the front ends offer.
pub const PROPERTY_SUBTYPES: [&str; 15] = [
    "Apartment",
    "Residence",
    "Villa",
    "Ground floor",
    "Penthouse",
    "Duplex",
    "Mixed building",
    "Studio",
    "Chalet",
    "Bungalow",
    "Cottage",
    "Loft",
    "Triplex",
    "Mansion",
    "Masterhouse",
];

/// All Belgian provinces the front ends offer. Brussels counts as a province here.
pub const PROVINCES: [&str; 11] = [
    "Brussels",
    "Antwerp",
    "West-Flanders",
    "East-Flanders",
    "Flemish-Brabant",
    "Limburg",
    "Liège",
    "Brabant-Wallon",
    "Hainaut",
    "Luxembourg",
    "Namur",
];

/// All building states the front ends offer, from worst to best.
pub const BUILDING_STATES: [&str; 9] = [
    "To demolish",
    "Under construction",
    "To restore",
    "To renovate",
    "To be renovated",
    "Normal",
    "Fully renovated",
    "Excellent",
    "New",
];

/// Gives the accepted lower and upper bound on the living area in m².
pub const LIVING_AREA_RANGE: (f64, f64) = (18.0, 2670.0);
/// Gives the accepted lower and upper bound on the number of bedrooms.
pub const NUMBER_OF_BEDROOMS_RANGE: (u32, u32) = (1, 50);
/// Gives the accepted lower and upper bound on the terrace area in m².
pub const TERRACE_AREA_RANGE: (f64, f64) = (0.0, 150.0);
/// Gives the accepted lower and upper bound on the number of facades.
pub const NUMBER_FACADES_RANGE: (u32, u32) = (1, 4);

/// The answer to a yes/no question in the forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    /// The numeric encoding the model was trained with.
    pub fn as_indicator(self) -> f64 {
        match self {
            YesNo::Yes => 1.0,
            YesNo::No => 0.0,
        }
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

/// One property as entered in a front end.
/// Deserializing this from json accepts the field names used by the REST endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
#[allow(missing_docs)]
pub struct PropertyRecord {
    /// `Apartment` or `House`.
    #[serde(rename = "type")]
    pub property_type: String,
    pub subtype: String,
    pub province: String,
    pub state_of_building: String,
    /// Living area in m².
    pub living_area: f64,
    pub number_of_bedrooms: u32,
    pub number_facades: u32,
    pub has_equiped_kitchen: YesNo,
    pub is_furnished: YesNo,
    pub has_open_fire: YesNo,
    pub has_terrace: YesNo,
    /// Terrace area in m².
    pub terrace_area: f64,
    pub has_garden: YesNo,
    pub has_swimming_pool: YesNo,
}

fn check_one_of(field: &str, value: &str, allowed: &[&str]) -> PriceResult<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be one of {:?}", field, allowed).into())
    }
}

fn check_range<T: PartialOrd + std::fmt::Display>(
    field: &str,
    value: T,
    (lower, upper): (T, T),
) -> PriceResult<()> {
    if lower <= value && value <= upper {
        Ok(())
    } else {
        Err(format!("{} must lie between {} and {}", field, lower, upper).into())
    }
}

impl PropertyRecord {
    /// Checks all fields against the values the front ends allow.
    /// The pipeline itself trusts its input, so this has to happen before a record gets predicted.
    pub fn validate(&self) -> PriceResult<()> {
        check_one_of("type", &self.property_type, &PROPERTY_TYPES)?;
        check_one_of("subtype", &self.subtype, &PROPERTY_SUBTYPES)?;
        check_one_of("province", &self.province, &PROVINCES)?;
        check_one_of("state_of_building", &self.state_of_building, &BUILDING_STATES)?;
        check_range("living_area", self.living_area, LIVING_AREA_RANGE)?;
        check_range(
            "number_of_bedrooms",
            self.number_of_bedrooms,
            NUMBER_OF_BEDROOMS_RANGE,
        )?;
        check_range("terrace_area", self.terrace_area, TERRACE_AREA_RANGE)?;
        check_range("number_facades", self.number_facades, NUMBER_FACADES_RANGE)?;
        Ok(())
    }

    /// Builds a [Frame] with one row per record.
    /// Yes/No answers become 1/0 here, this is the only place this conversion happens.
    pub fn to_frame<'r>(records: impl IntoIterator<Item = &'r PropertyRecord>) -> PriceResult<Frame> {
        let records: Vec<_> = records.into_iter().collect();

        let categorical = |name: &str, field: fn(&PropertyRecord) -> &str| {
            Column::categorical(
                name,
                records
                    .iter()
                    .map(|record| Some(field(record).to_string()))
                    .collect(),
            )
        };
        let numeric = |name: &str, field: fn(&PropertyRecord) -> f64| {
            Column::numeric(
                name,
                records.iter().map(|record| Some(field(record))).collect(),
            )
        };

        Frame::with_columns(vec![
            categorical(columns::TYPE, |r| r.property_type.as_str()),
            categorical(columns::SUBTYPE, |r| r.subtype.as_str()),
            categorical(columns::PROVINCE, |r| r.province.as_str()),
            categorical(columns::STATE_OF_BUILDING, |r| r.state_of_building.as_str()),
            numeric(columns::LIVING_AREA, |r| r.living_area),
            numeric(columns::NUMBER_OF_BEDROOMS, |r| r.number_of_bedrooms as f64),
            numeric(columns::NUMBER_FACADES, |r| r.number_facades as f64),
            numeric(columns::EQUIPED_KITCHEN, |r| {
                r.has_equiped_kitchen.as_indicator()
            }),
            numeric(columns::FURNISHED, |r| r.is_furnished.as_indicator()),
            numeric(columns::OPEN_FIRE, |r| r.has_open_fire.as_indicator()),
            numeric(columns::TERRACE, |r| r.has_terrace.as_indicator()),
            numeric(columns::TERRACE_AREA, |r| r.terrace_area),
            numeric(columns::GARDEN, |r| r.has_garden.as_indicator()),
            numeric(columns::SWIMMING_POOL, |r| r.has_swimming_pool.as_indicator()),
        ])
        .map_err(PriceError::rethrow_with("could not build frame from records"))
    }
}
