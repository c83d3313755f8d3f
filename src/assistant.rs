// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Hooks for an assistant: read-only tools it may call by name, and
//! category suggestions for new transactions.

use crate::models::FinancialData;
use crate::queries;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

pub const MAX_RECENT: usize = 50;
const DEFAULT_RECENT: usize = 5;

#[derive(Error, Debug, PartialEq)]
pub enum ToolError {
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),
    #[error("Bad arguments for '{function}': {reason}")]
    BadArguments {
        function: &'static str,
        reason: String,
    },
    #[error("Could not encode result: {0}")]
    Encode(String),
}

/// Describes one callable tool in JSON-schema terms.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

pub fn declarations() -> Vec<FunctionDeclaration> {
    vec![
        FunctionDeclaration {
            name: "get_net_worth",
            description: "Current net worth with cash, investments, assets and liabilities.",
            parameters: json!({ "type": "object", "properties": {} }),
        },
        FunctionDeclaration {
            name: "get_budget_status",
            description: "Spending against the budget for one category in a month.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "category": { "type": "string" },
                    "month": { "type": "string", "description": "YYYY-MM, defaults to this month" }
                },
                "required": ["category"]
            }),
        },
        FunctionDeclaration {
            name: "get_recent_transactions",
            description: "The most recent transactions, newest first.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "count": { "type": "integer", "minimum": 1, "maximum": MAX_RECENT }
                }
            }),
        },
    ]
}

/// Runs the tool `name` against `data`. Tools never modify the document.
pub fn call(data: &FinancialData, name: &str, args: &Value) -> Result<Value, ToolError> {
    match name {
        "get_net_worth" => encode(&queries::net_worth(data)),
        "get_budget_status" => {
            let category = args
                .get("category")
                .and_then(Value::as_str)
                .filter(|c| !c.trim().is_empty())
                .ok_or_else(|| ToolError::BadArguments {
                    function: "get_budget_status",
                    reason: "'category' is required".into(),
                })?;
            let month = match args.get("month").and_then(Value::as_str) {
                Some(m) => crate::utils::parse_month(m).map_err(|e| ToolError::BadArguments {
                    function: "get_budget_status",
                    reason: e.to_string(),
                })?,
                None => chrono::Local::now().format("%Y-%m").to_string(),
            };
            encode(&queries::budget_status(data, category, &month))
        }
        "get_recent_transactions" => {
            let count = match args.get("count") {
                None | Some(Value::Null) => DEFAULT_RECENT,
                Some(v) => v
                    .as_u64()
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| ToolError::BadArguments {
                        function: "get_recent_transactions",
                        reason: format!("'count' must be a positive integer, got {}", v),
                    })? as usize,
            };
            encode(&queries::recent_transactions(data, count.min(MAX_RECENT)))
        }
        other => Err(ToolError::UnknownFunction(other.to_string())),
    }
}

fn encode<T: Serialize>(v: &T) -> Result<Value, ToolError> {
    serde_json::to_value(v).map_err(|e| ToolError::Encode(e.to_string()))
}

/// Picks a category for a transaction description from `candidates`.
pub trait CategorySuggester {
    fn suggest(&self, description: &str, candidates: &[String]) -> Option<String>;
}

/// Keyword rules checked in order; the first rule whose category is a
/// candidate wins.
#[derive(Debug, Clone, Default)]
pub struct RuleSuggester {
    rules: Vec<(Regex, String)>,
}

const DEFAULT_RULES: &[(&str, &str)] = &[
    (r"grocer|supermarket|market|bakery", "Groceries"),
    (r"restaurant|cafe|coffee|dinner|lunch|takeaway", "Dining"),
    (r"fuel|petrol|gas station|uber|taxi|metro|parking", "Transport"),
    (r"rent|mortgage", "Housing"),
    (r"electric|water|internet|phone bill", "Utilities"),
    (r"salary|payroll|wages", "Salary"),
    (r"pharmacy|clinic|doctor|dental", "Health"),
];

impl RuleSuggester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_rules() -> Result<Self, regex::Error> {
        DEFAULT_RULES
            .iter()
            .try_fold(Self::new(), |s, (pattern, category)| s.rule(pattern, category))
    }

    /// Adds a case-insensitive rule.
    pub fn rule(mut self, pattern: &str, category: &str) -> Result<Self, regex::Error> {
        let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        self.rules.push((re, category.to_string()));
        Ok(self)
    }
}

impl CategorySuggester for RuleSuggester {
    fn suggest(&self, description: &str, candidates: &[String]) -> Option<String> {
        let candidate = |name: &str| {
            candidates
                .iter()
                .find(|c| c.eq_ignore_ascii_case(name))
                .cloned()
        };
        self.rules
            .iter()
            .filter(|(re, _)| re.is_match(description))
            .find_map(|(_, category)| candidate(category))
            .or_else(|| {
                // A description naming a category outright.
                let lower = description.to_lowercase();
                candidates
                    .iter()
                    .find(|c| !c.is_empty() && lower.contains(&c.to_lowercase()))
                    .cloned()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::default_data;

    #[test]
    fn every_declared_tool_is_callable() {
        let data = default_data();
        let args = json!({ "category": "Dining", "month": "2025-06" });
        for decl in declarations() {
            assert!(call(&data, decl.name, &args).is_ok(), "{}", decl.name);
        }
    }

    #[test]
    fn budget_status_tool_returns_spending() {
        let out = call(
            &default_data(),
            "get_budget_status",
            &json!({ "category": "Dining", "month": "2025-06" }),
        )
        .unwrap();
        assert_eq!(out["spent"], json!("86.40"));
        assert_eq!(out["limit"], json!("200"));
    }

    #[test]
    fn bad_arguments_are_reported() {
        let data = default_data();
        assert!(matches!(
            call(&data, "get_budget_status", &json!({})),
            Err(ToolError::BadArguments { .. })
        ));
        assert!(matches!(
            call(&data, "get_recent_transactions", &json!({ "count": 0 })),
            Err(ToolError::BadArguments { .. })
        ));
        assert_eq!(
            call(&data, "transfer_money", &json!({})),
            Err(ToolError::UnknownFunction("transfer_money".into()))
        );
    }

    #[test]
    fn recent_transactions_tool_caps_count() {
        let out = call(&default_data(), "get_recent_transactions", &json!({ "count": 3 })).unwrap();
        assert_eq!(out.as_array().unwrap().len(), 3);
        let out = call(&default_data(), "get_recent_transactions", &json!({ "count": 500 })).unwrap();
        assert_eq!(out.as_array().unwrap().len(), 7);
    }

    #[test]
    fn rules_only_pick_candidates() {
        let s = RuleSuggester::with_default_rules().unwrap();
        let cats: Vec<String> = ["Groceries", "Dining", "Travel"].map(String::from).to_vec();
        assert_eq!(s.suggest("CITY SUPERMARKET #12", &cats), Some("Groceries".into()));
        assert_eq!(s.suggest("Uber trip", &cats), None);
        assert_eq!(s.suggest("Travel insurance", &cats), Some("Travel".into()));
    }
}
