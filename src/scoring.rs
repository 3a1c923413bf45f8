//! Proficiency scoring
//!
//! Turns a finished interaction into a proficiency tier. Three signals are
//! combined: whether the answer was correct, how much of the time limit it
//! took, and how steady the pointer was while answering (jitter, the
//! population variance of the sampled velocities). Points follow the same
//! linear decay used for timed quiz answers: a correct answer is worth full
//! points when instant and half of them at the time limit.

use std::time::Duration;

use enum_map::{Enum, EnumMap};
use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    constants::scene::MAX_POINTS,
    mechanic::Outcome,
    telemetry::{EventType, TelemetrySample},
};

/// Ordinal proficiency outcome, lowest first
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Enum, Serialize, Deserialize,
)]
pub enum Tier {
    /// Incorrect, or correct only after the time limit
    #[serde(rename = "level_1")]
    Level1,
    /// Correct within the time limit
    #[serde(rename = "level_2")]
    Level2,
    /// Correct, fast and steady
    #[serde(rename = "level_3")]
    Level3,
}

/// Tier boundaries, overridable per sub-competency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Thresholds {
    /// Largest share of the time limit a level 3 answer may use
    #[garde(range(min = 0., max = 1.))]
    pub fluent_time_ratio: f64,
    /// Largest velocity variance a level 3 answer may show
    #[garde(range(min = 0.))]
    pub max_jitter: f64,
    /// Points for an instant correct answer
    #[garde(range(max = MAX_POINTS))]
    pub max_points: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fluent_time_ratio: 0.5,
            max_jitter: 250_000.,
            max_points: MAX_POINTS,
        }
    }
}

/// Raw measurements behind a score
#[serde_with::serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Whether the selection was correct
    pub correct: bool,
    /// Time taken to answer
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub elapsed: Duration,
    /// Time limit of the scene
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub time_limit: Duration,
    /// `elapsed / time_limit`, may exceed 1
    pub time_ratio: f64,
    /// Population variance of the move and end velocities
    pub jitter: f64,
    /// Mean of the move and end velocities
    pub mean_velocity: f64,
    /// Number of telemetry samples considered
    pub sample_count: usize,
}

/// Scored interaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Proficiency tier
    pub tier: Tier,
    /// Measurements the tier was derived from
    pub metrics: Metrics,
    /// Points awarded
    pub points: u64,
}

/// Points for an answer taking `taken` out of `full`
///
/// Decays linearly from `full_points` to half of it at the limit and stays
/// at half afterwards.
pub fn time_decayed_points(full: Duration, taken: Duration, full_points: u64) -> u64 {
    let ratio = if full.is_zero() {
        1.
    } else {
        (taken.as_secs_f64() / full.as_secs_f64()).min(1.)
    };
    (full_points as f64 * (1. - ratio / 2.)) as u64
}

/// Mean and population variance of the velocities that follow a prior sample
fn velocity_stats(samples: &[TelemetrySample]) -> (f64, f64) {
    let velocities = samples
        .iter()
        .filter(|s| matches!(s.event_type, EventType::Move | EventType::End))
        .filter_map(|s| s.velocity)
        .collect_vec();
    if velocities.is_empty() {
        return (0., 0.);
    }
    let n = velocities.len() as f64;
    let mean = velocities.iter().sum::<f64>() / n;
    let variance = velocities.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance)
}

/// Scores one interaction
///
/// A wrong answer is always level 1. A correct answer is level 3 when it
/// used at most the fluent share of the time limit with jitter at or below
/// the maximum, level 2 when it still came in within the limit, and level 1
/// otherwise.
pub fn score(
    correct: bool,
    samples: &[TelemetrySample],
    time_limit: Duration,
    elapsed: Duration,
    thresholds: &Thresholds,
) -> Score {
    let (mean_velocity, jitter) = velocity_stats(samples);
    let time_ratio = if time_limit.is_zero() {
        f64::INFINITY
    } else {
        elapsed.as_secs_f64() / time_limit.as_secs_f64()
    };

    let tier = match correct {
        false => Tier::Level1,
        true if time_ratio <= thresholds.fluent_time_ratio && jitter <= thresholds.max_jitter => {
            Tier::Level3
        }
        true if time_ratio <= 1. => Tier::Level2,
        true => Tier::Level1,
    };

    let points = if correct {
        time_decayed_points(time_limit, elapsed, thresholds.max_points)
    } else {
        0
    };

    tracing::debug!(?tier, correct, time_ratio, jitter, points, "interaction scored");

    Score {
        tier,
        metrics: Metrics {
            correct,
            elapsed,
            time_limit,
            time_ratio,
            jitter,
            mean_velocity,
            sample_count: samples.len(),
        },
        points,
    }
}

/// Scores a widget outcome with its own correctness and telemetry
pub fn score_outcome(
    outcome: &Outcome,
    time_limit: Duration,
    elapsed: Duration,
    thresholds: &Thresholds,
) -> Score {
    score(
        outcome.is_correct(),
        outcome.samples(),
        time_limit,
        elapsed,
        thresholds,
    )
}

/// Number of scores per tier
pub fn tally<'a>(scores: impl IntoIterator<Item = &'a Score>) -> EnumMap<Tier, usize> {
    let mut counts = EnumMap::default();
    for score in scores {
        counts[score.tier] += 1;
    }
    counts
}
