// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{records::insert_new, sort_most_recent_first};
use crate::errors::{LedgerError, Result};
use crate::models::{FinancialData, Transaction, TransactionType};
use rust_decimal::Decimal;
use tracing::debug;

fn validate(tx: &Transaction) -> Result<()> {
    let sign_ok = match tx.r#type {
        TransactionType::Income => !tx.amount.is_sign_negative() || tx.amount.is_zero(),
        TransactionType::Expense => tx.amount.is_sign_negative() || tx.amount.is_zero(),
    };
    if !sign_ok {
        return Err(LedgerError::validation(format!(
            "Amount {} does not match {} transaction '{}'",
            tx.amount,
            tx.r#type.as_str(),
            tx.description
        )));
    }
    Ok(())
}

fn adjust_balance(data: &mut FinancialData, account_id: &str, delta: Decimal) -> Result<()> {
    match data.accounts.iter_mut().find(|a| a.id == account_id) {
        Some(acc) => {
            acc.balance = acc.balance.checked_add(delta).ok_or_else(|| {
                LedgerError::validation(format!("Balance of '{}' is out of range", acc.name))
            })?;
        }
        // Account may have been deleted; its transactions outlive it.
        None => debug!(account_id, %delta, "balance adjustment skipped for missing account"),
    }
    Ok(())
}

pub(super) fn add(data: &mut FinancialData, tx: Transaction) -> Result<()> {
    validate(&tx)?;
    if data.account(&tx.account_id).is_none() {
        return Err(LedgerError::reference("Account", tx.account_id));
    }
    let account_id = tx.account_id.clone();
    let amount = tx.amount;
    insert_new(&mut data.transactions, tx)?;
    // insert_new appends; move the new record to the front so it wins ties.
    if let Some(last) = data.transactions.pop() {
        data.transactions.insert(0, last);
    }
    sort_most_recent_first(&mut data.transactions, |t| t.date);
    adjust_balance(data, &account_id, amount)
}

/// Replaces a transaction in place; list order is left as is even when the
/// date changes.
pub(super) fn update(data: &mut FinancialData, tx: Transaction) -> Result<()> {
    validate(&tx)?;
    let Some(idx) = data.transactions.iter().position(|t| t.id == tx.id) else {
        debug!(id = %tx.id, "update of unknown transaction ignored");
        return Ok(());
    };
    if data.account(&tx.account_id).is_none() {
        return Err(LedgerError::reference("Account", tx.account_id));
    }
    let old = std::mem::replace(&mut data.transactions[idx], tx);
    let new_account = data.transactions[idx].account_id.clone();
    let new_amount = data.transactions[idx].amount;
    adjust_balance(data, &old.account_id, -old.amount)?;
    adjust_balance(data, &new_account, new_amount)
}

pub(super) fn delete(data: &mut FinancialData, id: &str) -> Result<()> {
    let Some(idx) = data.transactions.iter().position(|t| t.id == id) else {
        debug!(id, "delete of unknown transaction ignored");
        return Ok(());
    };
    let old = data.transactions.remove(idx);
    adjust_balance(data, &old.account_id, -old.amount)
}
