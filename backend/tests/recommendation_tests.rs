//! Tests for the recommendation pipeline
//!
//! Covers fitting from a crop table, region and price restrictions, the
//! top-5 cut and the no-match outcome.

use crop_advisor::config::ModelConfig;
use crop_advisor::dataset::{CropTable, RegionTable};
use crop_advisor::ml::ClassifierKind;
use crop_advisor::services::recommendation::{filter_ranked, region_crops};
use crop_advisor::services::{RecommendationFilter, Recommender};
use crop_advisor::AppError;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{CropScore, RecommendationOutcome, RegionQuery, SoilSample, TOP_RECOMMENDATIONS};
use std::collections::HashMap;

/// Fertilizer-style table with a categorical soil column
fn fertilizer_table() -> CropTable {
    let mut csv = String::from(
        "Temparature,Humidity ,Moisture,Soil Type,Crop Type,Nitrogen,Potassium,Phosphorous\n",
    );
    for i in 0..12 {
        csv.push_str(&format!("{},52,38,Sandy,Maize,{},0,0\n", 26 + i % 3, 37 + i));
        csv.push_str(&format!("{},65,45,Clayey,Paddy,{},0,0\n", 29 + i % 3, 8 + i % 4));
        csv.push_str(&format!("{},58,33,Black,Cotton,{},15,36\n", 33 + i % 2, 12 + i % 5));
    }
    CropTable::from_reader(csv.as_bytes()).unwrap()
}

fn region_table() -> RegionTable {
    RegionTable::from_reader(
        "State_Name,District_Name,Crop_Year,Season,Crop,Area,Production
Maharashtra,NAGPUR,2012,Kharif,Cotton,1200,3400
Maharashtra,NAGPUR,2012,Kharif,Soyabean,800,900
Maharashtra,NAGPUR,2012,Rabi,Wheat,300,NA
Punjab,LUDHIANA,2012,Kharif,Rice,900,2700
Punjab,LUDHIANA,2012,Kharif,Maize,100,300
"
        .as_bytes(),
    )
    .unwrap()
}

fn config() -> ModelConfig {
    ModelConfig {
        kind: ClassifierKind::Forest,
        n_trees: 20,
        max_depth: 8,
        ..ModelConfig::default()
    }
}

fn sample(temperature: f64, nitrogen: f64, soil: &str) -> SoilSample {
    SoilSample::new(nitrogen, 0.0, 0.0, temperature, 52.0)
        .with_moisture(38.0)
        .with_soil_type(soil)
}

// ============================================================================
// Fitting and Prediction
// ============================================================================

mod fitting {
    use super::*;

    #[test]
    fn test_predicts_from_soil_and_readings() {
        let recommender = Recommender::fit(&fertilizer_table(), &config()).unwrap();
        let result = recommender.predict(&sample(27.0, 42.0, "Sandy")).unwrap();

        assert_eq!(result.crops.len(), 3);
        assert_eq!(result.top().unwrap().crop, "Maize");
        let total: f64 = result.crops.iter().map(|c| c.confidence).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_lists_encoded_vocabularies() {
        let recommender = Recommender::fit(&fertilizer_table(), &config()).unwrap();
        let summary = recommender.summary();
        assert_eq!(summary.rows, 36);
        assert_eq!(summary.crops, vec!["Cotton", "Maize", "Paddy"]);
        assert_eq!(summary.soil_types, vec!["Black", "Clayey", "Sandy"]);
        assert_eq!(summary.features.last(), Some(&"soil_type"));
    }

    #[test]
    fn test_unseen_soil_type_is_refused() {
        let recommender = Recommender::fit(&fertilizer_table(), &config()).unwrap();
        let err = recommender.predict(&sample(27.0, 42.0, "Loamy")).unwrap_err();
        assert!(matches!(err, AppError::UnseenCategory { .. }));
    }

    #[test]
    fn test_missing_table_reading_is_a_validation_error() {
        let recommender = Recommender::fit(&fertilizer_table(), &config()).unwrap();
        let no_soil = SoilSample::new(42.0, 0.0, 0.0, 27.0, 52.0).with_moisture(38.0);
        let err = recommender.predict(&no_soil).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_blank_soil_type_names_the_field() {
        let recommender = Recommender::fit(&fertilizer_table(), &config()).unwrap();
        let err = recommender.predict(&sample(27.0, 42.0, "   ")).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "soil_type"));
    }

    #[test]
    fn test_out_of_range_sample_is_refused() {
        let recommender = Recommender::fit(&fertilizer_table(), &config()).unwrap();
        let hot = sample(95.0, 42.0, "Sandy");
        assert!(recommender.predict(&hot).is_err());
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

const CROPS: [&str; 8] = [
    "Cotton", "Soyabean", "Wheat", "Rice", "Maize", "Jute", "Gram", "Mango",
];

/// A ranking over every crop with random descending confidences
fn ranking_strategy() -> impl Strategy<Value = Vec<CropScore>> {
    (
        Just(CROPS.to_vec()).prop_shuffle(),
        prop::collection::vec(0.0..1.0f64, CROPS.len()),
    )
        .prop_map(|(crops, mut weights)| {
            weights.sort_by(|a, b| b.total_cmp(a));
            crops
                .into_iter()
                .zip(weights)
                .map(|(crop, w)| CropScore::new(crop.to_lowercase(), w))
                .collect()
        })
}

fn price_map_strategy() -> impl Strategy<Value = HashMap<String, Decimal>> {
    prop::collection::vec(prop::option::of(500i64..5000), CROPS.len()).prop_map(|prices| {
        CROPS
            .iter()
            .zip(prices)
            .filter_map(|(crop, price)| price.map(|p| (crop.to_lowercase(), Decimal::from(p))))
            .collect()
    })
}

fn region_strategy() -> impl Strategy<Value = Option<RegionQuery>> {
    prop_oneof![
        Just(None),
        Just(Some(RegionQuery::new("Maharashtra", "Nagpur"))),
        Just(Some(RegionQuery::new("punjab", "ludhiana"))),
        Just(Some(RegionQuery::new("Kerala", "Idukki"))),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Filtered crops are a prefix-ordered subset of the ranking that
    /// satisfies every active restriction
    #[test]
    fn test_filter_respects_region_price_and_order(
        ranked in ranking_strategy(),
        prices in price_map_strategy(),
        region in region_strategy(),
        ceiling in prop::option::of(500i64..5000),
    ) {
        let table = region_table();
        let filter = RecommendationFilter {
            region: region.clone(),
            price_ceiling: ceiling.map(Decimal::from),
        };
        let outcome = filter_ranked(ranked.clone(), &filter, Some(&table), &prices, TOP_RECOMMENDATIONS);
        let crops = outcome.crops();

        prop_assert!(crops.len() <= TOP_RECOMMENDATIONS);
        prop_assert_eq!(outcome.is_match(), !crops.is_empty());

        let allowed = region.as_ref().map(|q| region_crops(&table, q));
        for crop in crops {
            if let Some(allowed) = &allowed {
                prop_assert!(allowed.iter().any(|c| c.eq_ignore_ascii_case(&crop.crop)));
            }
            if let Some(ceiling) = ceiling {
                let price = prices.get(&crop.crop);
                prop_assert!(price.map_or(false, |p| *p <= Decimal::from(ceiling)));
            }
        }

        let positions: Vec<usize> = crops
            .iter()
            .map(|c| ranked.iter().position(|r| r.crop == c.crop).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    /// Without restrictions the result is the head of the ranking
    #[test]
    fn test_unfiltered_is_top_of_ranking(ranked in ranking_strategy()) {
        let outcome = filter_ranked(
            ranked.clone(),
            &RecommendationFilter::default(),
            None,
            &HashMap::new(),
            TOP_RECOMMENDATIONS,
        );
        prop_assert_eq!(outcome.crops(), &ranked[..TOP_RECOMMENDATIONS]);
    }
}

// ============================================================================
// No Match
// ============================================================================

mod no_match {
    use super::*;

    #[test]
    fn test_unknown_district_is_no_match() {
        let table = region_table();
        let filter = RecommendationFilter {
            region: Some(RegionQuery::new("Kerala", "Idukki")),
            price_ceiling: None,
        };
        let ranked = vec![CropScore::new("cotton", 0.9), CropScore::new("wheat", 0.1)];
        let outcome = filter_ranked(ranked, &filter, Some(&table), &HashMap::new(), 5);
        match outcome {
            RecommendationOutcome::NoMatch { reason } => assert!(reason.contains("Idukki")),
            other => panic!("expected no match, got {:?}", other),
        }
    }

    #[test]
    fn test_ceiling_below_every_price_is_no_match() {
        let prices: HashMap<String, Decimal> =
            [("cotton".to_string(), Decimal::from(6000))].into_iter().collect();
        let filter = RecommendationFilter {
            region: None,
            price_ceiling: Some(Decimal::from(1000)),
        };
        let outcome = filter_ranked(
            vec![CropScore::new("cotton", 1.0)],
            &filter,
            None,
            &prices,
            5,
        );
        assert!(!outcome.is_match());
    }

    #[test]
    fn test_nagpur_kharif_crops() {
        let query = RegionQuery::new("maharashtra", "Nagpur").with_season(shared::Season::Kharif);
        assert_eq!(region_crops(&region_table(), &query), vec!["Cotton", "Soyabean"]);
    }
}
