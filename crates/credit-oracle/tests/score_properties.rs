use credit_oracle::scoring::{
    clamp_probability, score_from_probability, CausalAttributor, CounterfactualExplainer, Feature,
    FeatureVector, ReasonCodeMapper, UncertaintyEstimator,
};
use proptest::prelude::*;

fn feature_vector() -> impl Strategy<Value = FeatureVector> {
    prop::collection::vec(0.0f64..=2.0, Feature::ordered().len()).prop_map(|values| {
        FeatureVector::from_pairs(Feature::ordered().into_iter().zip(values))
    })
}

proptest! {
    #[test]
    fn score_is_bounded(p in 0.0f64..=1.0) {
        let score = score_from_probability(p);
        prop_assert!((300..=850).contains(&score));
    }

    #[test]
    fn score_never_rises_with_probability(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(score_from_probability(low) >= score_from_probability(high));
    }

    #[test]
    fn interval_brackets_the_score(p in 0.0f64..=1.0) {
        let p = clamp_probability(p);
        let interval = UncertaintyEstimator::default().interval(p);
        let score = score_from_probability(p);
        prop_assert!(interval.low <= score && score <= interval.high);
    }

    #[test]
    fn attribution_is_ranked_and_bounded(features in feature_vector()) {
        let factors = CausalAttributor::default().attribute(&features);
        prop_assert!(factors.len() <= 8);
        prop_assert!(factors.iter().all(|factor| factor.impact > 0.04));
        prop_assert!(factors.windows(2).all(|pair| pair[0].impact >= pair[1].impact));
    }

    #[test]
    fn counterfactuals_are_ranked_improvements(features in feature_vector(), p in 0.01f64..=0.99) {
        let counterfactuals = CounterfactualExplainer::default().explain(&features, p);
        prop_assert!(counterfactuals.len() <= 4);
        prop_assert!(counterfactuals.iter().all(|cf| cf.score_improvement > 0));
        prop_assert!(counterfactuals
            .windows(2)
            .all(|pair| pair[0].score_improvement >= pair[1].score_improvement));
    }

    #[test]
    fn no_reasons_at_low_probability(features in feature_vector(), p in 0.0f64..=0.35) {
        let factors = CausalAttributor::default().attribute(&features);
        prop_assert!(ReasonCodeMapper::default().reasons(p, &factors).is_empty());
    }
}
