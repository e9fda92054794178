#![cfg_attr(feature = "strict", deny(warnings))]
#![cfg_attr(feature = "strict", deny(clippy::all))]
#![cfg_attr(feature = "strict", deny(missing_docs))]
//! This crate contains stuff that's really helpful for tests.
use common::{
    columns,
    property::{BUILDING_STATES, PROPERTY_SUBTYPES, PROPERTY_TYPES, PROVINCES},
    Dataset, PropertyRecord, PropertyRecordBuilder, YesNo,
};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

/// The record of the end to end example: a new villa in Namur.
pub fn villa() -> PropertyRecord {
    PropertyRecordBuilder::default()
        .property_type("House")
        .subtype("Villa")
        .province("Namur")
        .state_of_building("New")
        .living_area(180.0)
        .number_of_bedrooms(4u32)
        .number_facades(4u32)
        .has_equiped_kitchen(YesNo::Yes)
        .is_furnished(YesNo::No)
        .has_open_fire(YesNo::No)
        .has_terrace(YesNo::Yes)
        .terrace_area(20.0)
        .has_garden(YesNo::Yes)
        .has_swimming_pool(YesNo::No)
        .build()
        .unwrap()
}

fn position(value: &str, allowed: &[&str]) -> f64 {
    allowed.iter().position(|&a| a == value).unwrap_or(0) as f64
}

/// Gives a made up but plausible price for `record`.
/// The price is a deterministic, mostly additive function of the attributes, so a model can learn
/// it from a few hundred rows.
pub fn synthetic_price(record: &PropertyRecord) -> f64 {
    let house_premium = if record.property_type == "House" {
        25_000.0
    } else {
        0.0
    };
    let province_premium = 12_000.0 * position(&record.province, &PROVINCES);
    let subtype_premium = 6_000.0 * position(&record.subtype, &PROPERTY_SUBTYPES);
    let state_premium = 9_000.0 * position(&record.state_of_building, &BUILDING_STATES);

    60_000.0
        + 2_200.0 * record.living_area
        + 14_000.0 * record.number_of_bedrooms as f64
        + 4_000.0 * record.number_facades as f64
        + 400.0 * record.terrace_area
        + 8_000.0 * record.has_equiped_kitchen.as_indicator()
        + 3_000.0 * record.has_open_fire.as_indicator()
        + 12_000.0 * record.has_garden.as_indicator()
        + 35_000.0 * record.has_swimming_pool.as_indicator()
        + house_premium
        + province_premium
        + subtype_premium
        + state_premium
}

fn pick<'a>(rng: &mut XorShiftRng, values: &[&'a str]) -> &'a str {
    values[rng.gen_range(0..values.len())]
}

/// Gives `n` random but valid records. The same `seed` always gives the same records.
pub fn synthetic_records(n: usize, seed: u64) -> Vec<PropertyRecord> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let has_terrace: bool = rng.gen_bool(0.6);
            PropertyRecord {
                property_type: pick(&mut rng, &PROPERTY_TYPES).to_string(),
                subtype: pick(&mut rng, &PROPERTY_SUBTYPES).to_string(),
                province: pick(&mut rng, &PROVINCES).to_string(),
                state_of_building: pick(&mut rng, &BUILDING_STATES).to_string(),
                living_area: rng.gen_range(30.0..600.0f64).round(),
                number_of_bedrooms: rng.gen_range(1..8),
                number_facades: rng.gen_range(1..=4),
                has_equiped_kitchen: rng.gen_bool(0.7).into(),
                is_furnished: rng.gen_bool(0.1).into(),
                has_open_fire: rng.gen_bool(0.1).into(),
                has_terrace: has_terrace.into(),
                terrace_area: if has_terrace {
                    rng.gen_range(4.0..60.0f64).round()
                } else {
                    0.0
                },
                has_garden: rng.gen_bool(0.5).into(),
                has_swimming_pool: rng.gen_bool(0.05).into(),
            }
        })
        .collect()
}

/// Gives a dataset of `n` synthetic records priced by [synthetic_price].
/// About one in twenty terrace areas and facade counts is blanked out, so the imputer has work to do.
pub fn synthetic_dataset(n: usize, seed: u64) -> Dataset {
    let records = synthetic_records(n, seed);
    let targets = records.iter().map(synthetic_price).collect();
    let mut features = PropertyRecord::to_frame(&records).unwrap();

    let mut rng = XorShiftRng::seed_from_u64(seed.wrapping_add(1));
    for column in &[columns::TERRACE_AREA, columns::NUMBER_FACADES] {
        for cell in features.numeric_mut(column).unwrap().iter_mut() {
            if rng.gen_bool(0.05) {
                *cell = None;
            }
        }
    }
    Dataset::new(features, targets).unwrap()
}

/// Gives a strategy generating [YesNo].
pub fn yes_no() -> impl Strategy<Value = YesNo> {
    prop_oneof![Just(YesNo::Yes), Just(YesNo::No)]
}

prop_compose! {
    /// Gives a strategy that generates a valid [PropertyRecord], with all fields in their allowed
    /// ranges.
    pub fn property_record()(
        property_type in prop::sample::select(PROPERTY_TYPES.to_vec()),
        subtype in prop::sample::select(PROPERTY_SUBTYPES.to_vec()),
        province in prop::sample::select(PROVINCES.to_vec()),
        state_of_building in prop::sample::select(BUILDING_STATES.to_vec()),
        living_area in 18.0..2670.0,
        number_of_bedrooms in 1u32..=50u32,
        number_facades in 1u32..=4u32,
        terrace_area in 0.0..150.0,
        has_equiped_kitchen in yes_no(),
        is_furnished in yes_no(),
        has_open_fire in yes_no(),
        has_terrace in yes_no(),
        has_garden in yes_no(),
        has_swimming_pool in yes_no(),
    ) -> PropertyRecord {
        PropertyRecord {
            property_type: property_type.to_string(),
            subtype: subtype.to_string(),
            province: province.to_string(),
            state_of_building: state_of_building.to_string(),
            living_area,
            number_of_bedrooms,
            number_facades,
            has_equiped_kitchen,
            is_furnished,
            has_open_fire,
            has_terrace,
            terrace_area,
            has_garden,
            has_swimming_pool,
        }
    }
}

prop_compose! {
    /// Gives a strategy generating between one and `limit` many [property_record]s.
    pub fn property_records(limit: usize)(records in prop::collection::vec(property_record(), 1..limit)) -> Vec<PropertyRecord> {
        records
    }
}

prop_compose! {
    /// Gives a strategy generating a [Dataset] of between `min` and `limit` rows, priced by
    /// [synthetic_price].
    pub fn priced_dataset(min: usize, limit: usize)(records in prop::collection::vec(property_record(), min..limit)) -> Dataset {
        let targets = records.iter().map(synthetic_price).collect();
        Dataset::new(PropertyRecord::to_frame(&records).unwrap(), targets).unwrap()
    }
}
