// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, json_flags, opt};
use crate::assistant::{CategorySuggester, RuleSuggester};
use crate::models::{FinancialData, Transaction, TransactionType};
use crate::store::Store;
use crate::utils::{
    fmt_money, maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table,
};
use anyhow::{Context, Result};
use serde::Serialize;

pub fn handle(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => {
            let id = arg(sub, "id")?;
            store.delete_transaction(id)?;
            println!("Removed transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

/// Categories already in use, budgets first.
fn known_categories(data: &FinancialData) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let names = data
        .budgets
        .iter()
        .map(|b| &b.category)
        .chain(data.transactions.iter().map(|t| &t.category));
    for name in names {
        if !out.iter().any(|c| c.eq_ignore_ascii_case(name)) {
            out.push(name.clone());
        }
    }
    out
}

fn add(store: &mut Store, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(arg(sub, "date")?)?;
    let account_id = arg(sub, "account")?;
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let description = arg(sub, "description")?;

    let category = match opt(sub, "category") {
        Some(c) => c.to_string(),
        None => {
            let suggester = RuleSuggester::with_default_rules()?;
            match suggester.suggest(description, &known_categories(&store.state())) {
                Some(c) => {
                    println!("Category suggested: {}", c);
                    c
                }
                None => "Uncategorized".to_string(),
            }
        }
    };

    store.add_transaction(Transaction {
        id: String::new(),
        date,
        description: description.to_string(),
        amount,
        category,
        budget_category: opt(sub, "budget-category").map(str::to_string),
        account_id: account_id.to_string(),
        r#type: TransactionType::for_amount(amount),
    })?;
    println!(
        "Recorded {} on {} '{}' (acct: {})",
        amount, date, description, account_id
    );
    Ok(())
}

fn edit(store: &mut Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg(sub, "id")?;
    let mut tx = store
        .state()
        .transaction(id)
        .cloned()
        .with_context(|| format!("Transaction '{}' not found", id))?;
    if let Some(d) = opt(sub, "date") {
        tx.date = parse_date(d)?;
    }
    if let Some(a) = opt(sub, "account") {
        tx.account_id = a.to_string();
    }
    if let Some(a) = opt(sub, "amount") {
        tx.amount = parse_decimal(a)?;
        tx.r#type = TransactionType::for_amount(tx.amount);
    }
    if let Some(d) = opt(sub, "description") {
        tx.description = d.to_string();
    }
    if let Some(c) = opt(sub, "category") {
        tx.category = c.to_string();
    }
    store.update_transaction(tx)?;
    println!("Updated transaction {}", id);
    Ok(())
}

fn list(store: &mut Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let filter = Filter {
        month: opt(sub, "month").map(parse_month).transpose()?,
        account: opt(sub, "account").map(str::to_string),
        category: opt(sub, "category").map(str::to_string),
        limit: sub.get_one::<usize>("limit").copied(),
    };
    let data = query_rows(&store.state(), &filter);
    if !maybe_print_json(json, jsonl, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.date.clone(),
                    r.account.clone(),
                    r.description.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Account", "Description", "Amount", "Category"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct Filter {
    pub month: Option<String>,
    pub account: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub account: String,
    pub description: String,
    pub amount: String,
    pub r#type: String,
    pub category: String,
}

/// Matching transactions, newest first.
pub fn query_rows(data: &FinancialData, filter: &Filter) -> Vec<TransactionRow> {
    let mut txs: Vec<&Transaction> = data
        .transactions
        .iter()
        .filter(|t| {
            filter
                .month
                .as_ref()
                .is_none_or(|m| t.date.format("%Y-%m").to_string() == *m)
        })
        .filter(|t| filter.account.as_ref().is_none_or(|a| t.account_id == *a))
        .filter(|t| {
            filter
                .category
                .as_ref()
                .is_none_or(|c| t.category.eq_ignore_ascii_case(c))
        })
        .collect();
    txs.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(limit) = filter.limit {
        txs.truncate(limit);
    }
    txs.into_iter()
        .map(|t| TransactionRow {
            id: t.id.clone(),
            date: t.date.to_string(),
            account: data
                .account(&t.account_id)
                .map(|a| a.name.clone())
                .unwrap_or_else(|| t.account_id.clone()),
            description: t.description.clone(),
            amount: fmt_money(&t.amount),
            r#type: t.r#type.as_str().to_string(),
            category: t.category.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::default_data;

    #[test]
    fn filters_combine() {
        let data = default_data();
        let rows = query_rows(
            &data,
            &Filter {
                month: Some("2025-06".into()),
                account: Some("acc-checking".into()),
                limit: Some(2),
                ..Default::default()
            },
        );
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["tx-utilities", "tx-groceries"]);
        assert_eq!(rows[0].account, "Family Checking");
        assert_eq!(rows[0].amount, "-135.00");
    }

    #[test]
    fn known_categories_are_unique() {
        let cats = known_categories(&default_data());
        assert_eq!(cats.iter().filter(|c| c.as_str() == "Groceries").count(), 1);
        assert!(cats.contains(&"Transport".to_string()));
    }
}
