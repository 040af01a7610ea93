//! Name-based classification of evaluations into reporting categories.
//!
//! Rules are evaluated in table order and the first rule with a pattern that
//! occurs in the name wins. Matching is a case-sensitive substring test.

use crate::model::{round1, EvaluationStatus};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FALLBACK_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    pub patterns: Vec<String>,
}

impl CategoryRule {
    pub fn new(label: &str, patterns: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| name.contains(p.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRules {
    pub rules: Vec<CategoryRule>,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_fallback() -> String {
    FALLBACK_CATEGORY.to_string()
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            rules: vec![
                CategoryRule::new("Fraud Detection", &["Fraud"]),
                CategoryRule::new("Risk Assessment", &["Risk"]),
                CategoryRule::new("Performance", &["Performance", "Benchmark"]),
                CategoryRule::new("Identity", &["Identity", "Verification"]),
                CategoryRule::new("Compliance", &["Compliance", "AML", "Laundering"]),
                CategoryRule::new("Pattern Analysis", &["Pattern", "Recognition"]),
                CategoryRule::new("Security", &["Freeze", "OTP"]),
            ],
            fallback: default_fallback(),
        }
    }
}

impl CategoryRules {
    pub fn classify(&self, name: &str) -> &str {
        self.position(name)
            .map(|i| self.rules[i].label.as_str())
            .unwrap_or(self.fallback.as_str())
    }

    /// Index of the matching rule, `None` for the fallback.
    fn position(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.matches(name))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        let mut ignored = Vec::new();
        let deserializer = serde_yaml::Deserializer::from_str(raw);
        let rules: CategoryRules = serde_ignored::deserialize(deserializer, |path| {
            ignored.push(path.to_string());
        })
        .context("failed to parse category rules")?;

        if !ignored.is_empty() {
            tracing::warn!(
                event = "category_rules_unknown_fields",
                fields = ?ignored,
                "ignoring unknown fields in category rules"
            );
        }

        rules.validate()?;
        Ok(rules)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read category rules {}", path.display()))?;
        Self::from_yaml_str(&raw).with_context(|| format!("in {}", path.display()))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.fallback.trim().is_empty() {
            anyhow::bail!("fallback category label is empty");
        }
        for rule in &self.rules {
            if rule.label.trim().is_empty() {
                anyhow::bail!("category rule with empty label");
            }
            if rule.patterns.is_empty() {
                anyhow::bail!("category '{}' has no patterns", rule.label);
            }
            // an empty needle would swallow every name
            if rule.patterns.iter().any(|p| p.is_empty()) {
                anyhow::bail!("category '{}' has an empty pattern", rule.label);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: String,
    pub count: u64,
    pub avg_score: f64,
    pub completed: u64,
}

#[derive(Debug, Default, Clone)]
struct Bucket {
    count: u64,
    scored: u64,
    score_sum: f64,
    completed: u64,
}

/// Accumulates evaluations per category. Only categories that received at
/// least one evaluation are emitted.
pub struct CategoryAggregator<'a> {
    rules: &'a CategoryRules,
    // one slot per rule, plus the fallback at the end
    buckets: Vec<Bucket>,
}

impl<'a> CategoryAggregator<'a> {
    pub fn new(rules: &'a CategoryRules) -> Self {
        Self {
            rules,
            buckets: vec![Bucket::default(); rules.rules.len() + 1],
        }
    }

    pub fn push(&mut self, name: &str, score: Option<f64>, status: &EvaluationStatus) {
        let slot = self
            .rules
            .position(name)
            .unwrap_or(self.rules.rules.len());
        let b = &mut self.buckets[slot];
        b.count += 1;
        if let Some(s) = score {
            b.scored += 1;
            b.score_sum += s;
        }
        if *status == EvaluationStatus::Completed {
            b.completed += 1;
        }
    }

    /// Sorted by count descending; equal counts keep rule-table order.
    pub fn finish(self) -> Vec<CategoryBreakdown> {
        let mut out: Vec<CategoryBreakdown> = self
            .buckets
            .into_iter()
            .enumerate()
            .filter(|(_, b)| b.count > 0)
            .map(|(i, b)| {
                let label = self
                    .rules
                    .rules
                    .get(i)
                    .map(|r| r.label.clone())
                    .unwrap_or_else(|| self.rules.fallback.clone());
                let avg = if b.scored > 0 {
                    b.score_sum / b.scored as f64
                } else {
                    0.0
                };
                CategoryBreakdown {
                    category: label,
                    count: b.count,
                    avg_score: round1(avg),
                    completed: b.completed,
                }
            })
            .collect();

        out.sort_by(|a, b| b.count.cmp(&a.count));
        out
    }
}
