//! Pure scorers over a stats window (most recent round first).

use crate::config::{TransferParams, TrendParams};
use crate::model::{RiskFlags, RoundStat};

fn total_minutes(window: &[RoundStat]) -> u64 {
    window.iter().map(|r| r.minutes as u64).sum()
}

/// Points per 90 minutes played; 0.0 when the window has no minutes.
pub fn points_per_90(window: &[RoundStat]) -> f64 {
    let mins = total_minutes(window);
    if mins == 0 {
        return 0.0;
    }
    let points: i64 = window.iter().map(|r| r.total_points as i64).sum();
    (points as f64 / mins as f64) * 90.0
}

/// xG per 90 plus xA per 90.
///
/// Returns 0.0 when there are no minutes, or when neither xG nor xA was recorded
/// for any round. A round missing one of the two counts as zero for that stat.
pub fn xgi_per_90(window: &[RoundStat]) -> f64 {
    let mins = total_minutes(window);
    if mins == 0 {
        return 0.0;
    }
    let has_xg = window.iter().any(|r| r.xg.is_some());
    let has_xa = window.iter().any(|r| r.xa.is_some());
    if !has_xg && !has_xa {
        return 0.0;
    }
    let xg: f64 = window.iter().filter_map(|r| r.xg).sum();
    let xa: f64 = window.iter().filter_map(|r| r.xa).sum();
    let mins = mins as f64;
    (xg / mins) * 90.0 + (xa / mins) * 90.0
}

/// Average minutes / 90, clamped to [0, 1]. Empty window yields 0.0.
pub fn minutes_probability(window: &[RoundStat]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let avg = total_minutes(window) as f64 / window.len() as f64;
    (avg / 90.0).clamp(0.0, 1.0)
}

/// `(1 - injury) * (1 - rotation)` with both risks clamped to [0, 1].
pub fn risk_factor(flags: Option<&RiskFlags>) -> f64 {
    let Some(flags) = flags else {
        return 1.0;
    };
    let injury = clamp_unit(flags.injury_risk);
    let rotation = clamp_unit(flags.rotation_risk);
    (1.0 - injury) * (1.0 - rotation)
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Momentum multiplier from short- vs long-window scoring rate.
///
/// `long_window` holds the long look-back, most recent first; the short rate is
/// taken from its first `short_window` rows.
pub fn trend_factor(long_window: &[RoundStat], params: &TrendParams) -> f64 {
    if long_window.is_empty() {
        return 1.0;
    }
    let rate_long = points_per_90(long_window);
    if rate_long <= 0.0 {
        return 1.0;
    }
    let short_len = params.short_window.min(long_window.len());
    let rate_short = points_per_90(&long_window[..short_len]);
    let delta = (rate_short - rate_long) / rate_long;
    (1.0 + delta * params.sensitivity).clamp(params.min_factor, params.max_factor)
}

/// Share of rounds with at least `stability_minutes` played.
pub fn minutes_stability(window: &[RoundStat], params: &TransferParams) -> f64 {
    share(window, |r| r.minutes >= params.stability_minutes)
}

/// Share of rounds with a points "return".
pub fn consistency(window: &[RoundStat], params: &TransferParams) -> f64 {
    share(window, |r| r.total_points >= params.return_points)
}

/// Best haul in the window scaled so `upside_ceiling` points maps to 1.0.
pub fn upside(window: &[RoundStat], params: &TransferParams) -> f64 {
    let Some(max_points) = window.iter().map(|r| r.total_points).max() else {
        return 0.0;
    };
    if max_points <= 0 {
        return 0.0;
    }
    (max_points as f64 / params.upside_ceiling).clamp(0.0, 1.0)
}

fn share(window: &[RoundStat], pred: impl Fn(&RoundStat) -> bool) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let hits = window.iter().filter(|r| pred(r)).count();
    hits as f64 / window.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(round_number: u32, minutes: u32, points: i32) -> RoundStat {
        RoundStat {
            player_id: 1,
            round_number,
            minutes,
            total_points: points,
            goals_scored: 0,
            assists: 0,
            clean_sheets: 0,
            goals_conceded: 0,
            bonus: 0,
            xg: None,
            xa: None,
        }
    }

    #[test]
    fn points_per_90_normalises_by_minutes() {
        let w = vec![row(4, 45, 3), row(3, 45, 3)];
        assert!((points_per_90(&w) - 6.0).abs() < 1e-12);
        assert_eq!(points_per_90(&[row(1, 0, 2)]), 0.0);
        assert_eq!(points_per_90(&[]), 0.0);
    }

    #[test]
    fn negative_points_give_negative_form() {
        let w = vec![row(2, 90, -1)];
        assert!(points_per_90(&w) < 0.0);
    }

    #[test]
    fn xgi_distinguishes_no_data_from_zero_output() {
        let no_data = vec![row(2, 90, 2), row(1, 90, 2)];
        assert_eq!(xgi_per_90(&no_data), 0.0);

        let mut partial = no_data.clone();
        partial[0].xg = Some(0.6);
        partial[1].xa = Some(0.2);
        assert!((xgi_per_90(&partial) - 0.4).abs() < 1e-12);

        let mut idle = vec![row(1, 0, 0)];
        idle[0].xg = Some(0.5);
        assert_eq!(xgi_per_90(&idle), 0.0);
    }

    #[test]
    fn minutes_probability_is_clamped() {
        assert_eq!(minutes_probability(&[]), 0.0);
        assert_eq!(minutes_probability(&[row(1, 120, 0)]), 1.0);
        assert!((minutes_probability(&[row(2, 45, 0), row(1, 90, 0)]) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn risk_factor_clamps_and_defaults() {
        assert_eq!(risk_factor(None), 1.0);
        let flags = RiskFlags {
            injury_risk: 0.3,
            rotation_risk: 0.2,
            note: None,
        };
        assert!((risk_factor(Some(&flags)) - 0.56).abs() < 1e-12);
        let wild = RiskFlags {
            injury_risk: 1.7,
            rotation_risk: -0.4,
            note: None,
        };
        assert_eq!(risk_factor(Some(&wild)), 0.0);
    }

    #[test]
    fn trend_is_bounded_and_neutral_without_scoring() {
        let p = TrendParams::default();
        assert_eq!(trend_factor(&[], &p), 1.0);
        assert_eq!(trend_factor(&[row(2, 90, 0), row(1, 90, 0)], &p), 1.0);

        // Hot streak: recent 2 rounds far above the 6-round rate.
        let hot = vec![
            row(6, 90, 15),
            row(5, 90, 15),
            row(4, 90, 1),
            row(3, 90, 1),
            row(2, 90, 1),
            row(1, 90, 1),
        ];
        assert_eq!(trend_factor(&hot, &p), 1.1);

        // Cold: recent 2 rounds blank.
        let cold = vec![
            row(6, 90, 0),
            row(5, 90, 0),
            row(4, 90, 8),
            row(3, 90, 8),
            row(2, 90, 8),
            row(1, 90, 8),
        ];
        assert_eq!(trend_factor(&cold, &p), 0.9);

        // Mild: rate2 = 6, rate6 = 5 -> 1 + 0.2 * 0.2 = 1.04
        let mild = vec![
            row(6, 90, 6),
            row(5, 90, 6),
            row(4, 90, 4),
            row(3, 90, 4),
            row(2, 90, 5),
            row(1, 90, 5),
        ];
        assert!((trend_factor(&mild, &p) - 1.04).abs() < 1e-12);
    }

    #[test]
    fn auxiliary_metrics_share_and_ceiling() {
        let p = TransferParams::default();
        let w = vec![
            row(4, 90, 12),
            row(3, 59, 2),
            row(2, 60, 5),
            row(1, 0, 0),
        ];
        assert_eq!(minutes_stability(&w, &p), 0.5);
        assert_eq!(consistency(&w, &p), 0.5);
        assert!((upside(&w, &p) - 0.8).abs() < 1e-12);
        assert_eq!(upside(&[row(1, 90, 20)], &p), 1.0);
        assert_eq!(upside(&[row(1, 90, -2)], &p), 0.0);
        assert_eq!(minutes_stability(&[], &p), 0.0);
        assert_eq!(consistency(&[], &p), 0.0);
        assert_eq!(upside(&[], &p), 0.0);
    }
}
