//! Learned-model confidence bonuses.
//!
//! Converts model performance records into additive confidence bonuses.
//! The registry is rebuilt wholesale from each refresh and keeps no
//! history.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::types::ModelStat;

/// Bonus contributed by a fully trained model (learning progress 100%).
const MAX_LEARNING_BONUS: f64 = 0.15;

/// Bonus contributed by a perfectly accurate model.
const MAX_ACCURACY_BONUS: f64 = 0.10;

/// Accuracy at or below which a model earns no accuracy bonus.
const ACCURACY_BASELINE_PCT: f64 = 50.0;

/// Bonus for one performance record, in [0, 0.25].
pub fn bonus_for(stat: &ModelStat) -> f64 {
    let progress = stat.learning_progress_pct.clamp(0.0, 100.0);
    let accuracy = stat.accuracy_pct.clamp(0.0, 100.0);

    let learning = (progress / 100.0) * MAX_LEARNING_BONUS;
    let accuracy = ((accuracy - ACCURACY_BASELINE_PCT) / (100.0 - ACCURACY_BASELINE_PCT)).max(0.0)
        * MAX_ACCURACY_BONUS;
    learning + accuracy
}

/// Per-model confidence bonuses from the latest performance refresh.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceBonusRegistry {
    bonuses: HashMap<String, f64>,
}

impl ConfidenceBonusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all bonuses with those derived from `stats`.
    /// Records with non-finite percentages are ignored.
    pub fn refresh(&mut self, stats: &[ModelStat]) {
        let mut bonuses = HashMap::with_capacity(stats.len());
        for stat in stats {
            if !stat.learning_progress_pct.is_finite() || !stat.accuracy_pct.is_finite() {
                warn!(model = %stat.model_name, "Ignoring model stat with non-finite values");
                continue;
            }
            bonuses.insert(stat.model_name.clone(), bonus_for(stat));
        }
        debug!(models = bonuses.len(), "Confidence bonuses refreshed");
        self.bonuses = bonuses;
    }

    /// Drop every bonus (feed unavailable).
    pub fn clear(&mut self) {
        self.bonuses.clear();
    }

    /// Registered bonus for a model, if any.
    pub fn lookup(&self, model: &str) -> Option<f64> {
        self.bonuses.get(model).copied()
    }

    /// Bonus for a model, 0 when absent.
    pub fn get(&self, model: &str) -> f64 {
        self.lookup(model).unwrap_or(0.0)
    }

    /// Mean bonus over the models with a non-zero bonus, `None` if none do.
    pub fn average_for<S: AsRef<str>>(&self, models: &[S]) -> Option<f64> {
        let found: Vec<f64> = models
            .iter()
            .filter_map(|m| self.lookup(m.as_ref()))
            .filter(|b| *b > 0.0)
            .collect();
        if found.is_empty() {
            None
        } else {
            Some(found.iter().sum::<f64>() / found.len() as f64)
        }
    }

    pub fn len(&self) -> usize {
        self.bonuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
