use std::sync::Arc;

use boosting::GbmParamsBuilder;
use common::{columns, logging::init_test_logging, Column, Dataset, Frame, PriceError, PropertyRecord};
use encoders::label::UNSEEN_CODE;
use evaluators::KpiEvaluator;
use predictions::{Driver, Pipeline};
use proptest::prelude::*;
use proptest::test_runner::{Config, TestRunner};
use rayon::prelude::*;
use test_helpers::*;

use crate::{FittedEncodingState, GbmPricePipeline, PipelineConfig};

fn small_config(log_target: bool) -> PipelineConfig {
    PipelineConfig {
        log_target,
        gbm: GbmParamsBuilder::default()
            .n_estimators(100)
            .learning_rate(0.1)
            .max_depth(5)
            .min_child_weight(2.0)
            .build()
            .unwrap(),
    }
}

fn fitted(data: &Dataset) -> (GbmPricePipeline, FittedEncodingState) {
    init_test_logging();
    let pipeline = GbmPricePipeline::new(small_config(true));
    let state = pipeline.fit(&data.features, &data.targets).unwrap();
    (pipeline, state)
}

fn feature_index(state: &FittedEncodingState, column: &str) -> usize {
    state
        .feature_cols()
        .iter()
        .position(|feature| feature == column)
        .unwrap()
}

fn replace_categorical(frame: &mut Frame, column: &str, values: Vec<Option<String>>) {
    frame.drop_column(column).unwrap();
    frame
        .push_column(Column::categorical(column, values))
        .unwrap();
}

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("{}_{}.json", name, std::process::id()))
}

#[test]
fn feature_columns_are_numeric_then_ordinal_then_label() {
    let data = synthetic_dataset(200, 0);
    let (_, state) = fitted(&data);

    let mut expected = data.features.numeric_column_names();
    expected.push("state_of_building_oe".to_string());
    expected.extend(
        columns::NOMINAL_COLUMNS
            .iter()
            .map(|column| columns::label_encoded(column)),
    );
    assert_eq!(state.feature_cols(), expected.as_slice());
    assert!(state
        .feature_cols()
        .iter()
        .all(|feature| !columns::is_categorical(feature)));
}

#[test]
fn fit_is_deterministic() {
    let data = synthetic_dataset(150, 1);
    let (_, first) = fitted(&data);
    let (_, second) = fitted(&data);
    assert_eq!(first, second);
}

#[test]
fn matrix_holds_learned_label_codes() {
    let data = synthetic_dataset(200, 2);
    let (pipeline, state) = fitted(&data);
    let matrix = pipeline.transform(&state, &data.features).unwrap();

    let provinces = data.features.categorical(columns::PROVINCE).unwrap();
    let mapping = state.label_encoder().mapping(columns::PROVINCE).unwrap();
    let idx = feature_index(&state, &columns::label_encoded(columns::PROVINCE));
    for (row, province) in provinces.iter().enumerate() {
        assert_eq!(
            matrix.get(row, idx),
            mapping.code(province.as_deref()) as f64
        );
    }
}

#[test]
fn transform_leaves_input_untouched_and_repeats() {
    let data = synthetic_dataset(120, 3);
    let (pipeline, state) = fitted(&data);
    let before = data.features.clone();

    let first = pipeline.transform(&state, &data.features).unwrap();
    let second = pipeline.transform(&state, &data.features).unwrap();

    assert_eq!(data.features, before);
    assert_eq!(first.n_rows(), data.len());
    assert!(first
        .rows()
        .zip(second.rows())
        .all(|(a, b)| a.iter().zip(b).all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))));
}

#[test]
fn column_order_does_not_matter() {
    let data = synthetic_dataset(150, 4);
    let (pipeline, state) = fitted(&data);

    let mut reversed: Vec<Column> = data.features.columns().cloned().collect();
    reversed.reverse();
    let reversed = Frame::with_columns(reversed).unwrap();

    assert_eq!(
        pipeline.predict(&state, &data.features).unwrap(),
        pipeline.predict(&state, &reversed).unwrap()
    );
}

#[test]
fn unseen_province_is_encoded_and_predicted() {
    let data = synthetic_dataset(150, 5);
    let (pipeline, state) = fitted(&data);

    let mut frame = PropertyRecord::to_frame(&[villa()]).unwrap();
    replace_categorical(
        &mut frame,
        columns::PROVINCE,
        vec![Some("Atlantis".to_string())],
    );

    let matrix = pipeline.transform(&state, &frame).unwrap();
    let idx = feature_index(&state, &columns::label_encoded(columns::PROVINCE));
    assert_eq!(matrix.get(0, idx), UNSEEN_CODE as f64);

    let prices = pipeline.predict(&state, &frame).unwrap();
    assert!(prices[0].is_finite() && prices[0] >= 0.0);
}

#[test]
fn villa_is_priced_plausibly() {
    let data = synthetic_dataset(300, 6);
    let (pipeline, state) = fitted(&data);
    let villa = villa();

    let price = pipeline
        .predict(&state, &PropertyRecord::to_frame(&[villa.clone()]).unwrap())
        .unwrap()[0];

    let (min, max) = data.target_range().unwrap();
    assert!(min <= price && price <= max, "{} not in {}..{}", price, min, max);
    let expected = synthetic_price(&villa);
    assert!(
        (price - expected).abs() / expected < 0.5,
        "predicted {} for a villa worth {}",
        price,
        expected
    );
}

#[test]
fn predictions_are_finite_and_not_negative() {
    let data = synthetic_dataset(200, 7);
    let (pipeline, state) = fitted(&data);

    let mut runner = TestRunner::new(Config::with_cases(64));
    runner
        .run(&property_records(20), |records| {
            let frame = PropertyRecord::to_frame(&records).unwrap();
            let prices = pipeline.predict(&state, &frame).unwrap();
            prop_assert_eq!(prices.len(), records.len());
            for price in prices {
                prop_assert!(price.is_finite());
                prop_assert!(price >= 0.0);
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn saved_state_predicts_the_same() {
    let data = synthetic_dataset(150, 8);
    let (pipeline, state) = fitted(&data);
    let path = temp_path("saved_state_predicts_the_same");

    state.save(&path).unwrap();
    let loaded = FittedEncodingState::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, state);
    assert_eq!(
        pipeline.predict(&loaded, &data.features).unwrap(),
        pipeline.predict(&state, &data.features).unwrap()
    );
}

#[test]
fn corrupt_state_is_an_inference_error() {
    let path = temp_path("corrupt_state_is_an_inference_error");
    for content in &["this is not json", "{\"foo\": 1}"] {
        std::fs::write(&path, content).unwrap();
        assert!(matches!(
            FittedEncodingState::load(&path),
            Err(PriceError::Inference(_))
        ));
    }
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(
        FittedEncodingState::load("/does/not/exist.json"),
        Err(PriceError::Inference(_))
    ));
}

#[test]
fn inconsistent_state_is_an_inference_error() {
    let data = synthetic_dataset(100, 9);
    let (_, mut state) = fitted(&data);
    state.feature_cols.pop();
    let path = temp_path("inconsistent_state_is_an_inference_error");

    state.save(&path).unwrap();
    let result = FittedEncodingState::load(&path);
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(PriceError::Inference(_))));
}

#[test]
fn state_can_be_shared_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FittedEncodingState>();
    assert_send_sync::<GbmPricePipeline>();

    let data = synthetic_dataset(150, 10);
    let (pipeline, state) = fitted(&data);
    let state = Arc::new(state);
    let records = synthetic_records(40, 11);

    let batch = pipeline
        .predict(&state, &PropertyRecord::to_frame(&records).unwrap())
        .unwrap();
    let single: Vec<f64> = records
        .par_iter()
        .map(|record| {
            let state = Arc::clone(&state);
            let frame = PropertyRecord::to_frame(std::iter::once(record)).unwrap();
            pipeline.predict(&state, &frame).unwrap()[0]
        })
        .collect();

    assert_eq!(batch, single);
}

#[test]
fn missing_column_is_a_shape_error() {
    let data = synthetic_dataset(100, 12);
    let (pipeline, state) = fitted(&data);

    let mut frame = data.features.clone();
    frame.drop_column(columns::PROVINCE).unwrap();
    assert!(pipeline.predict(&state, &frame).unwrap_err().is_shape_error());

    let mut frame = data.features.clone();
    frame.drop_column(columns::LIVING_AREA).unwrap();
    assert!(pipeline.predict(&state, &frame).unwrap_err().is_shape_error());
}

#[test]
fn extra_column_is_a_shape_error() {
    let data = synthetic_dataset(100, 13);
    let (pipeline, state) = fitted(&data);

    let mut frame = data.features.clone();
    frame
        .push_column(Column::categorical(
            "city",
            vec![Some("Namur".to_string()); frame.n_rows()],
        ))
        .unwrap();
    assert!(pipeline.predict(&state, &frame).unwrap_err().is_shape_error());

    let mut frame = data.features.clone();
    frame
        .push_column(Column::numeric("parking", vec![Some(1.0); frame.n_rows()]))
        .unwrap();
    assert!(pipeline.predict(&state, &frame).unwrap_err().is_shape_error());
}

#[test]
fn mismatched_targets_are_a_shape_error() {
    let data = synthetic_dataset(50, 14);
    let pipeline = GbmPricePipeline::new(small_config(true));
    assert!(pipeline
        .fit(&data.features, &data.targets[1..])
        .unwrap_err()
        .is_shape_error());
}

#[test]
fn unknown_building_state_is_domain_drift() {
    let data = synthetic_dataset(100, 15);
    let pipeline = GbmPricePipeline::new(small_config(true));

    let mut features = data.features.clone();
    let mut states = features
        .categorical(columns::STATE_OF_BUILDING)
        .unwrap()
        .to_vec();
    states[3] = Some("Haunted".to_string());
    replace_categorical(&mut features, columns::STATE_OF_BUILDING, states.clone());
    assert!(matches!(
        pipeline.fit(&features, &data.targets),
        Err(PriceError::DomainDrift { .. })
    ));

    let state = pipeline.fit(&data.features, &data.targets).unwrap();
    match pipeline.predict(&state, &features) {
        Err(PriceError::DomainDrift { column, value }) => {
            assert_eq!(column, columns::STATE_OF_BUILDING);
            assert_eq!(value, "Haunted");
        }
        other => panic!("expected domain drift, got {:?}", other),
    }
}

#[test]
fn missing_building_state_ranks_lowest() {
    let data = synthetic_dataset(100, 16);
    let (pipeline, state) = fitted(&data);

    let mut frame = PropertyRecord::to_frame(&[villa()]).unwrap();
    replace_categorical(&mut frame, columns::STATE_OF_BUILDING, vec![None]);

    let matrix = pipeline.transform(&state, &frame).unwrap();
    assert_eq!(matrix.get(0, feature_index(&state, "state_of_building_oe")), 0.0);
    assert!(pipeline.predict(&state, &frame).unwrap()[0].is_finite());
}

#[test]
fn empty_numeric_column_still_predicts() {
    let data = synthetic_dataset(150, 17);
    let mut features = data.features.clone();
    for cell in features.numeric_mut(columns::TERRACE_AREA).unwrap().iter_mut() {
        *cell = None;
    }
    let pipeline = GbmPricePipeline::new(small_config(true));
    let state = pipeline.fit(&features, &data.targets).unwrap();

    assert_eq!(state.imputer().degenerate_columns(), vec![columns::TERRACE_AREA]);
    let prices = pipeline.predict(&state, &data.features).unwrap();
    assert!(prices.iter().all(|price| price.is_finite() && *price >= 0.0));
}

#[test]
fn raw_target_pipeline_predicts() {
    let data = synthetic_dataset(150, 18);
    let pipeline = GbmPricePipeline::new(small_config(false));
    let state = pipeline.fit(&data.features, &data.targets).unwrap();

    assert!(!state.log_target());
    let prices = pipeline.predict(&state, &data.features).unwrap();
    assert!(prices.iter().all(|price| price.is_finite() && *price >= 0.0));
}

#[test]
fn training_fit_explains_most_variance() {
    let data = synthetic_dataset(200, 19);
    let (pipeline, state) = fitted(&data);

    let kpi = pipeline
        .evaluate(&state, &data.features, &data.targets, &KpiEvaluator::new())
        .unwrap();
    assert_eq!(kpi.count, data.len());
    assert!(kpi.r_squared > 0.8, "{}", kpi);
}

#[test]
fn driver_validates_real_pipeline() {
    let data = synthetic_dataset(300, 20);
    let pipeline = GbmPricePipeline::new(small_config(true));
    let evaluator = KpiEvaluator::new();

    let (state, kpi) = Driver::with(&pipeline, &evaluator).drive(&data).unwrap();
    assert_eq!(kpi.count, data.len() - (0.8 * data.len() as f64) as usize);
    assert!(kpi.r_squared > 0.5, "{}", kpi);
    assert_eq!(state.feature_cols().len(), state.regressor().n_features());
}

#[test]
fn training_columns_must_match_record_columns() {
    let data = synthetic_dataset(60, 21);
    let pipeline = GbmPricePipeline::new(small_config(true));

    let mut features = data.features.clone();
    features
        .push_column(Column::numeric(
            "postal_code",
            vec![Some(5000.0); features.n_rows()],
        ))
        .unwrap();
    assert!(pipeline
        .fit(&features, &data.targets)
        .unwrap_err()
        .is_shape_error());

    let mut features = data.features.clone();
    features.drop_column(columns::SWIMMING_POOL).unwrap();
    assert!(pipeline
        .fit(&features, &data.targets)
        .unwrap_err()
        .is_shape_error());
}

fn constant_price_round_trip(log_target: bool) {
    let price = 250_000.0;
    let records = synthetic_records(80, 22);
    let features = PropertyRecord::to_frame(&records).unwrap();
    let pipeline = GbmPricePipeline::new(small_config(log_target));
    let state = pipeline.fit(&features, &vec![price; records.len()]).unwrap();

    assert_eq!(state.log_target(), log_target);
    let frame = PropertyRecord::to_frame(&[villa()]).unwrap();
    for predicted in pipeline
        .predict(&state, &features)
        .unwrap()
        .into_iter()
        .chain(pipeline.predict(&state, &frame).unwrap())
    {
        assert!(
            (predicted - price).abs() <= 1e-9 * price,
            "predicted {} for a constant price of {}",
            predicted,
            price
        );
    }
}

#[test]
fn log_target_predictions_invert_the_fit_transform() {
    constant_price_round_trip(true);
}

#[test]
fn raw_target_predictions_keep_the_price() {
    constant_price_round_trip(false);
}
