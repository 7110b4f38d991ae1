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

use std::fs::read_to_string;
use std::path::Path;

use chrono::Duration;
use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

/// The longest interval, in days, a configuration may allow.
pub const INTERVAL_LIMIT_DAYS: f64 = 365_000.0;

/// Scheduling parameters. `Default` gives the standard values; tests and
/// users can shorten or lengthen any of them.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Delays between learning steps, in order.
    pub learning_steps: Vec<Duration>,
    /// The interval given to a card when it first graduates to review.
    pub graduating_interval_days: f64,
    /// Interval multiplier for an `Easy` grade.
    pub easy_bonus: f64,
    /// Interval multiplier for a `Hard` grade in review.
    pub hard_interval_factor: f64,
    /// Ease lost when a review card lapses.
    pub lapse_ease_delta: f64,
    /// Ease lost on a `Hard` grade in review.
    pub hard_ease_delta: f64,
    /// Ease gained on an `Easy` grade in review.
    pub easy_ease_delta: f64,
    pub min_ease: f64,
    pub max_ease: f64,
    /// Share of the lapsed interval a card keeps when it graduates from
    /// relearning.
    pub relearning_interval_factor: f64,
    pub max_interval_days: f64,
    /// A review card not yet due counts as mastered once its repetitions
    /// exceed this.
    pub mastery_threshold: u32,
    /// How many recent reviews the statistics report.
    pub recent_history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            learning_steps: vec![Duration::minutes(1), Duration::minutes(10)],
            graduating_interval_days: 1.0,
            easy_bonus: 1.3,
            hard_interval_factor: 1.2,
            lapse_ease_delta: 0.2,
            hard_ease_delta: 0.15,
            easy_ease_delta: 0.15,
            min_ease: 1.3,
            max_ease: 5.0,
            relearning_interval_factor: 0.5,
            max_interval_days: 36500.0,
            mastery_threshold: 8,
            recent_history_limit: 20,
        }
    }
}

/// The on-disk form of the configuration. Every key is optional.
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    /// In whole minutes.
    learning_steps: Vec<i64>,
    graduating_interval: f64,
    easy_bonus: f64,
    hard_interval_factor: f64,
    lapse_ease_delta: f64,
    hard_ease_delta: f64,
    easy_ease_delta: f64,
    min_ease: f64,
    max_ease: f64,
    relearning_interval_factor: f64,
    max_interval: f64,
    mastery_threshold: u32,
    recent_history_limit: usize,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let config = Config::default();
        Self {
            learning_steps: config
                .learning_steps
                .iter()
                .map(|step| step.num_minutes())
                .collect(),
            graduating_interval: config.graduating_interval_days,
            easy_bonus: config.easy_bonus,
            hard_interval_factor: config.hard_interval_factor,
            lapse_ease_delta: config.lapse_ease_delta,
            hard_ease_delta: config.hard_ease_delta,
            easy_ease_delta: config.easy_ease_delta,
            min_ease: config.min_ease,
            max_ease: config.max_ease,
            relearning_interval_factor: config.relearning_interval_factor,
            max_interval: config.max_interval_days,
            mastery_threshold: config.mastery_threshold,
            recent_history_limit: config.recent_history_limit,
        }
    }
}

impl Config {
    /// Parse a TOML configuration, filling missing keys with defaults.
    pub fn from_toml(text: &str) -> Fallible<Self> {
        let file: ConfigFile = toml::from_str(text)?;
        let mut learning_steps = Vec::with_capacity(file.learning_steps.len());
        for minutes in file.learning_steps {
            match Duration::try_minutes(minutes) {
                Some(step) => learning_steps.push(step),
                None => return fail(format!("learning step out of range: {minutes} minutes")),
            }
        }
        let config = Self {
            learning_steps,
            graduating_interval_days: file.graduating_interval,
            easy_bonus: file.easy_bonus,
            hard_interval_factor: file.hard_interval_factor,
            lapse_ease_delta: file.lapse_ease_delta,
            hard_ease_delta: file.hard_ease_delta,
            easy_ease_delta: file.easy_ease_delta,
            min_ease: file.min_ease,
            max_ease: file.max_ease,
            relearning_interval_factor: file.relearning_interval_factor,
            max_interval_days: file.max_interval,
            mastery_threshold: file.mastery_threshold,
            recent_history_limit: file.recent_history_limit,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Fallible<Self> {
        log::debug!("Loading configuration from {}", path.display());
        let text = read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Fallible<()> {
        if self.learning_steps.is_empty() {
            return fail("at least one learning step is required.");
        }
        if self
            .learning_steps
            .iter()
            .any(|step| *step < Duration::minutes(1))
        {
            return fail("learning steps must be at least one minute.");
        }
        if self
            .learning_steps
            .iter()
            .any(|step| step.num_days() as f64 > INTERVAL_LIMIT_DAYS)
        {
            return fail(format!(
                "learning steps must not exceed {INTERVAL_LIMIT_DAYS} days."
            ));
        }
        let positive = [
            ("graduating_interval", self.graduating_interval_days),
            ("hard_interval_factor", self.hard_interval_factor),
            ("min_ease", self.min_ease),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return fail(format!("{name} must be a positive number."));
            }
        }
        let non_negative = [
            ("lapse_ease_delta", self.lapse_ease_delta),
            ("hard_ease_delta", self.hard_ease_delta),
            ("easy_ease_delta", self.easy_ease_delta),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return fail(format!("{name} must not be negative."));
            }
        }
        if !(self.easy_bonus.is_finite() && self.easy_bonus >= 1.0) {
            return fail("easy_bonus must be at least 1.");
        }
        if !(self.max_ease.is_finite() && self.max_ease >= self.min_ease) {
            return fail("max_ease must not be below min_ease.");
        }
        if !(0.0..=1.0).contains(&self.relearning_interval_factor) {
            return fail("relearning_interval_factor must be between 0 and 1.");
        }
        if !(self.max_interval_days.is_finite()
            && self.max_interval_days >= self.graduating_interval_days)
        {
            return fail("max_interval must not be below graduating_interval.");
        }
        if self.max_interval_days > INTERVAL_LIMIT_DAYS {
            return fail(format!(
                "max_interval must not exceed {INTERVAL_LIMIT_DAYS} days."
            ));
        }
        Ok(())
    }
}
