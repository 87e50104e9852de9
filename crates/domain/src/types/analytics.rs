//! Chart payloads produced by the analytics service

use serde::{Deserialize, Serialize};

/// Labels with parallel counts and colours, shaped for Chart.js
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub data: Vec<u64>,
    #[serde(rename = "backgroundColor")]
    pub background_color: Vec<String>,
}

impl ChartSeries {
    pub fn push(&mut self, label: impl Into<String>, value: u64, color: impl Into<String>) {
        self.labels.push(label.into());
        self.data.push(value);
        self.background_color.push(color.into());
    }

    pub fn total(&self) -> u64 {
        self.data.iter().sum()
    }
}

/// Completion figures of one project
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectProgress {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    /// Rounded to two decimals
    pub progress_percentage: f64,
}

impl ProjectProgress {
    pub fn new(total_tasks: u64, completed_tasks: u64) -> Self {
        let progress_percentage = if total_tasks == 0 {
            0.0
        } else {
            let raw = completed_tasks as f64 * 100.0 / total_tasks as f64;
            (raw * 100.0).round() / 100.0
        };
        Self { total_tasks, completed_tasks, progress_percentage }
    }
}
