//! Feedback analysis: satisfaction statistics, insights and recommendations
//!
//! A report is always recomputed from the full set of stored events.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

use crate::error::Result;
use crate::storage::FeedbackDb;

use super::feedback::{FeedbackEvent, Sentiment};

/// Number of disliked questions quoted in a report
const SAMPLE_DISLIKED: usize = 5;
/// Above this like percentage the system counts as performing well
const HIGH_SATISFACTION: f64 = 80.0;
/// Below this like percentage (with enough samples) the system needs attention
const LOW_SATISFACTION: f64 = 50.0;
/// Low satisfaction is only reported with more events than this
const MIN_SAMPLES_FOR_LOW: usize = 10;

/// Counts plus satisfaction percentage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportStats {
    pub likes: usize,
    pub dislikes: usize,
    pub total: usize,
    pub like_percentage: f64,
}

/// Derived view over all feedback
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub stats: ReportStats,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    /// First disliked questions in store order
    pub disliked_queries: Vec<String>,
}

/// Aggregates feedback into a report
pub struct FeedbackAnalyzer;

impl FeedbackAnalyzer {
    /// Load every event from the store and analyze it
    ///
    /// The total counts every stored row, so rows that cannot be read as
    /// events still weigh against the like percentage.
    pub fn analyze_store(db: &FeedbackDb) -> Result<FeedbackReport> {
        let events = db.all_feedback()?;
        let total = db.row_count()?;
        Ok(Self::summarize(&events, total))
    }

    /// Analyze a set of events
    pub fn analyze(events: &[FeedbackEvent]) -> FeedbackReport {
        Self::summarize(events, events.len())
    }

    fn summarize(events: &[FeedbackEvent], total: usize) -> FeedbackReport {
        let likes = events.iter().filter(|e| e.feedback == Sentiment::Like).count();
        let dislikes = events.iter().filter(|e| e.feedback == Sentiment::Dislike).count();
        let total = total.max(likes + dislikes);

        let like_percentage = if total == 0 {
            0.0
        } else {
            likes as f64 / total as f64 * 100.0
        };

        let mut insights = Vec::new();
        let mut recommendations = Vec::new();

        if dislikes > 0 {
            insights.push(format!(
                "There are {} disliked responses that might need improvement.",
                dislikes
            ));
            recommendations.push("Consider reviewing the disliked responses for common issues.".to_string());
        }

        if like_percentage > HIGH_SATISFACTION {
            insights.push(format!("High satisfaction rate of {:.1}%", like_percentage));
            recommendations.push("System is performing well, continue monitoring.".to_string());
        } else if like_percentage < LOW_SATISFACTION && total > MIN_SAMPLES_FOR_LOW {
            insights.push(format!("Low satisfaction rate of {:.1}%", like_percentage));
            recommendations
                .push("Consider updating the RAG system or improving document retrieval.".to_string());
        }

        let disliked_queries = events
            .iter()
            .filter(|e| e.feedback == Sentiment::Dislike)
            .take(SAMPLE_DISLIKED)
            .map(|e| e.query.clone())
            .collect();

        FeedbackReport {
            stats: ReportStats {
                likes,
                dislikes,
                total,
                like_percentage,
            },
            insights,
            recommendations,
            disliked_queries,
        }
    }

    /// Write the report as pretty JSON
    pub fn export(report: &FeedbackReport, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(path, json)?;
        tracing::info!("Analysis exported to {}", path.display());
        Ok(())
    }

    /// Plain-text summary for terminals
    pub fn render(report: &FeedbackReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Feedback Analysis ===");
        let _ = writeln!(out, "Total responses: {}", report.stats.total);
        let _ = writeln!(out, "Likes: {}", report.stats.likes);
        let _ = writeln!(out, "Dislikes: {}", report.stats.dislikes);
        let _ = writeln!(out, "Satisfaction rate: {:.1}%", report.stats.like_percentage);

        let _ = writeln!(out, "\n=== Insights ===");
        for insight in &report.insights {
            let _ = writeln!(out, "- {}", insight);
        }

        let _ = writeln!(out, "\n=== Recommendations ===");
        for recommendation in &report.recommendations {
            let _ = writeln!(out, "- {}", recommendation);
        }

        if !report.disliked_queries.is_empty() {
            let _ = writeln!(out, "\n=== Sample Disliked Queries ===");
            for query in &report.disliked_queries {
                let _ = writeln!(out, "- {}", query);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn events(likes: usize, dislikes: usize) -> Vec<FeedbackEvent> {
        let make = |i: usize, feedback| FeedbackEvent {
            id: Uuid::new_v4(),
            query: format!("question {}", i),
            response: "answer".to_string(),
            feedback,
            timestamp: Utc::now(),
        };
        (0..likes)
            .map(|i| make(i, Sentiment::Like))
            .chain((likes..likes + dislikes).map(|i| make(i, Sentiment::Dislike)))
            .collect()
    }

    fn has_low_insight(report: &FeedbackReport) -> bool {
        report.insights.iter().any(|i| i.starts_with("Low satisfaction"))
    }

    #[test]
    fn test_empty_report() {
        let report = FeedbackAnalyzer::analyze(&[]);
        assert_eq!(report.stats, ReportStats::default());
        assert!(report.insights.is_empty());
        assert!(report.recommendations.is_empty());
        assert!(report.disliked_queries.is_empty());
    }

    #[test]
    fn test_three_likes_one_dislike() {
        let report = FeedbackAnalyzer::analyze(&events(3, 1));
        assert_eq!(report.stats.likes, 3);
        assert_eq!(report.stats.dislikes, 1);
        assert_eq!(report.stats.total, 4);
        assert!((report.stats.like_percentage - 75.0).abs() < 1e-9);
        assert_eq!(
            report.insights,
            vec!["There are 1 disliked responses that might need improvement.".to_string()]
        );
        assert_eq!(report.disliked_queries, vec!["question 3".to_string()]);
    }

    #[test]
    fn test_high_satisfaction() {
        let report = FeedbackAnalyzer::analyze(&events(9, 1));
        assert!(report.insights.contains(&"High satisfaction rate of 90.0%".to_string()));
        assert!(report
            .recommendations
            .contains(&"System is performing well, continue monitoring.".to_string()));
    }

    #[test]
    fn test_low_satisfaction_needs_enough_samples() {
        // total = 5, 20%
        let small = FeedbackAnalyzer::analyze(&events(1, 4));
        assert!(!has_low_insight(&small));

        // total = 11, 36.4%
        let large = FeedbackAnalyzer::analyze(&events(4, 7));
        assert!(has_low_insight(&large));
        assert!(large.insights.contains(&"Low satisfaction rate of 36.4%".to_string()));
    }

    #[test]
    fn test_disliked_sample_is_capped_and_ordered() {
        let report = FeedbackAnalyzer::analyze(&events(0, 8));
        assert_eq!(report.disliked_queries.len(), 5);
        assert_eq!(report.disliked_queries[0], "question 0");
        assert_eq!(report.disliked_queries[4], "question 4");
    }

    #[test]
    fn test_analyze_store_and_export() {
        let db = FeedbackDb::in_memory().unwrap();
        for ev in events(2, 2) {
            db.record_feedback(&ev).unwrap();
        }

        let report = FeedbackAnalyzer::analyze_store(&db).unwrap();
        assert_eq!(report.stats.total, 4);
        assert_eq!(report.disliked_queries, vec!["question 2", "question 3"]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback_analysis.json");
        FeedbackAnalyzer::export(&report, &path).unwrap();

        let loaded: FeedbackReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn test_unreadable_rows_count_toward_total() {
        let db = FeedbackDb::in_memory().unwrap();
        for ev in events(1, 1) {
            db.record_feedback(&ev).unwrap();
        }
        db.execute_raw("INSERT INTO feedback VALUES (NULL, 'q', 'r', 'like', NULL)");
        db.execute_raw("INSERT INTO feedback VALUES ('legacy', 'q', 'r', NULL, NULL)");

        let report = FeedbackAnalyzer::analyze_store(&db).unwrap();
        assert_eq!(report.stats.likes, 1);
        assert_eq!(report.stats.dislikes, 1);
        assert_eq!(report.stats.total, 4);
        assert!((report.stats.like_percentage - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_render() {
        let text = FeedbackAnalyzer::render(&FeedbackAnalyzer::analyze(&events(1, 1)));
        assert!(text.contains("Satisfaction rate: 50.0%"));
        assert!(text.contains("=== Sample Disliked Queries ===\n- question 1"));
    }
}
