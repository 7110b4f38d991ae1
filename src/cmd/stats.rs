// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;

use crate::cmd::candidates;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::query::StudyStats;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_stats(
    collection: &Collection,
    card_ids: Vec<String>,
    format: StatsFormat,
    now: Timestamp,
) -> Fallible<()> {
    let card_ids = candidates(collection, card_ids);
    let stats = collection.scheduler.stats(&card_ids, now);
    match format {
        StatsFormat::Text => {
            print!("{}", render_text(&stats));
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}

fn render_text(stats: &StudyStats) -> String {
    let mut out = String::new();
    let mut line = |label: &str, value: String| {
        out.push_str(&format!("{label:<18}{value}\n"));
    };
    line("Cards:", stats.total_cards.to_string());
    line("New:", stats.new_cards.to_string());
    line("Learning:", stats.learning_cards.to_string());
    line("Due:", stats.due_cards.to_string());
    line("Scheduled:", stats.scheduled_cards.to_string());
    line("Mastered:", stats.mastered_cards.to_string());
    line("Reviews:", stats.total_reviews.to_string());
    line(
        "Success rate:",
        format!("{:.1}%", stats.success_rate * 100.0),
    );
    line("Average ease:", optional(stats.average_ease, 2));
    line("Average interval:", optional(stats.average_interval_days, 1));
    line("Study time:", format_duration(stats.total_study_time_secs));
    for review in &stats.recent_reviews {
        out.push_str(&format!(
            "  {}  {:<6} {}\n",
            review.reviewed_at, review.grade, review.card_id
        ));
    }
    out
}

fn optional(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(value) => format!("{value:.precision$}"),
        None => "-".to_string(),
    }
}

fn format_duration(secs: f64) -> String {
    if secs >= 3600.0 {
        format!("{:.1}h", secs / 3600.0)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
