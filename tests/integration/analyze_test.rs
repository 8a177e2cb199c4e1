//! Single-instrument analysis integration tests

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use streak_odds::streak::{
    AnalysisError, Direction, HistoryPolicy, PricePoint, Probability, StreakAnalyzer,
};

fn series(closes: &[Decimal]) -> Vec<PricePoint> {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint::new(base + Duration::days(i as i64), close))
        .collect()
}

/// Deterministic pseudo-random walk
fn walk(len: usize, seed: u64) -> Vec<Decimal> {
    let mut state = seed;
    let mut price = dec!(100);
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let step = Decimal::from((state >> 33) % 5) - dec!(2);
            price = (price + step).max(dec!(1));
            price
        })
        .collect()
}

#[test]
fn test_streaks_partition_random_walks() {
    for seed in 1..20 {
        let closes = walk(250, seed);
        let analysis = StreakAnalyzer::default().analyze(&series(&closes)).unwrap();

        let total: usize = analysis.streaks.iter().map(|s| s.length).sum();
        assert_eq!(total, closes.len() - 1);

        let mut expected_start = 0;
        for (i, streak) in analysis.streaks.iter().enumerate() {
            assert_eq!(streak.start, expected_start);
            assert_eq!(streak.end - streak.start + 1, streak.length);
            if i > 0 {
                assert_ne!(streak.direction, analysis.streaks[i - 1].direction);
            }
            expected_start = streak.end + 1;
        }
    }
}

#[test]
fn test_extend_and_break_complement_on_random_walks() {
    for seed in 1..10 {
        let analysis = StreakAnalyzer::default()
            .analyze(&series(&walk(300, seed)))
            .unwrap();
        for direction in Direction::ALL {
            for length in 1..=8 {
                let extend = analysis.extend_probability(direction, length);
                let reverse = analysis.break_probability(direction, length);
                match (extend.value(), reverse.value()) {
                    (Some(e), Some(b)) => assert_eq!(e + b, Decimal::ONE),
                    (None, None) => {}
                    other => panic!("mismatched definedness: {:?}", other),
                }
            }
        }
    }
}

#[test]
fn test_next_period_matches_extension_of_current() {
    let analysis = StreakAnalyzer::default()
        .analyze(&series(&walk(400, 7)))
        .unwrap();
    let current = analysis.current;
    assert_eq!(
        analysis.next.toward(current.direction),
        analysis.extend_probability(current.direction, current.length)
    );
    assert_eq!(
        analysis.next.toward(current.direction.opposite()),
        analysis.break_probability(current.direction, current.length)
    );
}

#[test]
fn test_constant_series() {
    let analysis = StreakAnalyzer::default()
        .analyze(&series(&[dec!(42); 12]))
        .unwrap();
    assert_eq!(analysis.current.direction, Direction::Down);
    assert_eq!(analysis.current.length, 11);
    assert_eq!(analysis.streaks.len(), 1);
    assert!(analysis.up.is_empty());
}

#[test]
fn test_increasing_series_under_both_policies() {
    let closes: Vec<Decimal> = (1..=10).map(Decimal::from).collect();

    let excluded = StreakAnalyzer::new(HistoryPolicy::ExcludeCurrent)
        .analyze(&series(&closes))
        .unwrap();
    let included = StreakAnalyzer::new(HistoryPolicy::IncludeCurrent)
        .analyze(&series(&closes))
        .unwrap();

    for length in 1..9 {
        assert_eq!(
            excluded.extend_probability(Direction::Up, length),
            Probability::Undefined
        );
        assert_eq!(
            included.extend_probability(Direction::Up, length),
            Probability::Defined(Decimal::ONE)
        );
    }
    assert!(excluded.down.is_empty());
    assert!(included.down.is_empty());
}

#[test]
fn test_no_history_strict_accessor() {
    let analysis = StreakAnalyzer::default()
        .analyze(&series(&[dec!(1), dec!(2), dec!(3)]))
        .unwrap();
    assert_eq!(
        analysis.extension.require_extend_probability(),
        Err(AnalysisError::NoHistory {
            direction: Direction::Up,
            length: 2
        })
    );
}

#[test]
fn test_insufficient_data() {
    let result = StreakAnalyzer::default().analyze(&series(&[dec!(5)]));
    assert_eq!(
        result.unwrap_err(),
        AnalysisError::InsufficientData { got: 1 }
    );
}

#[test]
fn test_analysis_serializes_undefined_as_tagged_value() {
    let analysis = StreakAnalyzer::default()
        .analyze(&series(&[dec!(1), dec!(2)]))
        .unwrap();
    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["next"]["up"]["kind"], "undefined");
    assert_eq!(json["current"]["direction"], "up");
}
