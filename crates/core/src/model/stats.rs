use serde::Serialize;

use crate::model::HistoryEntry;

/// Round to two decimal places, the precision reported to callers.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn accuracy(correct: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(correct as f64 / total as f64 * 100.0)
    }
}

//
// ─── SESSION STATS ────────────────────────────────────────────────────────────
//

/// Cheap aggregate view over one session's pool, usage, and history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub quizzes_taken: usize,
    pub pool_size: usize,
    pub used_count: usize,
    pub remaining: usize,
    pub history: Vec<HistoryEntry>,
    pub average_score: f64,
}

impl SessionStats {
    #[must_use]
    pub fn from_parts(pool_size: usize, used_count: usize, history: Vec<HistoryEntry>) -> Self {
        let average_score = if history.is_empty() {
            0.0
        } else {
            let sum: f64 = history.iter().map(|e| f64::from(e.score())).sum();
            round2(sum / history.len() as f64)
        };

        Self {
            quizzes_taken: history.len(),
            pool_size,
            used_count,
            remaining: pool_size.saturating_sub(used_count),
            history,
            average_score,
        }
    }

    /// Stats for a session nobody has touched.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_parts(0, 0, Vec::new())
    }
}

//
// ─── ANALYTICS ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_quizzes: usize,
    pub questions_answered: u64,
    pub correct_answers: u64,
    pub overall_accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizScore {
    pub quiz_number: u32,
    pub score: u32,
    pub total: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizTiming {
    pub quiz_number: u32,
    pub avg_time_secs: f64,
    pub total_time_secs: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeStats {
    pub average_per_question_secs: f64,
    pub total_time_spent_secs: f64,
    pub fastest_question_secs: f64,
    pub slowest_question_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub quiz_number: u32,
    pub cumulative_accuracy: f64,
}

/// Trend report derived from a session's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionAnalytics {
    pub summary: AnalyticsSummary,
    pub quiz_scores: Vec<QuizScore>,
    pub time_analysis: Vec<QuizTiming>,
    pub time_stats: TimeStats,
    pub performance_trend: Vec<TrendPoint>,
}

impl SessionAnalytics {
    /// Build the report, or `None` if there is nothing to report on.
    #[must_use]
    pub fn from_history(history: &[HistoryEntry]) -> Option<Self> {
        if history.is_empty() {
            return None;
        }

        let mut correct = 0_u64;
        let mut answered = 0_u64;
        let mut quiz_scores = Vec::with_capacity(history.len());
        let mut time_analysis = Vec::with_capacity(history.len());
        let mut performance_trend = Vec::with_capacity(history.len());
        let mut all_times: Vec<f64> = Vec::new();

        for entry in history {
            correct += u64::from(entry.score());
            answered += u64::from(entry.total());

            quiz_scores.push(QuizScore {
                quiz_number: entry.sequence_number(),
                score: entry.score(),
                total: entry.total(),
                percentage: round2(entry.percentage()),
            });

            let times = entry.per_question_time_secs();
            let summed: f64 = times.iter().sum();
            let avg_time_secs = if times.is_empty() {
                0.0
            } else {
                round2(summed / times.len() as f64)
            };
            time_analysis.push(QuizTiming {
                quiz_number: entry.sequence_number(),
                avg_time_secs,
                total_time_secs: round2(entry.total_time_secs().unwrap_or(summed)),
            });
            all_times.extend_from_slice(times);

            performance_trend.push(TrendPoint {
                quiz_number: entry.sequence_number(),
                cumulative_accuracy: accuracy(correct, answered),
            });
        }

        Some(Self {
            summary: AnalyticsSummary {
                total_quizzes: history.len(),
                questions_answered: answered,
                correct_answers: correct,
                overall_accuracy: accuracy(correct, answered),
            },
            quiz_scores,
            time_analysis,
            time_stats: time_stats(&all_times),
            performance_trend,
        })
    }
}

fn time_stats(times: &[f64]) -> TimeStats {
    if times.is_empty() {
        return TimeStats::default();
    }
    let total: f64 = times.iter().sum();
    let fastest = times.iter().copied().fold(f64::INFINITY, f64::min);
    let slowest = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    TimeStats {
        average_per_question_secs: round2(total / times.len() as f64),
        total_time_spent_secs: round2(total),
        fastest_question_secs: round2(fastest),
        slowest_question_secs: round2(slowest),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
