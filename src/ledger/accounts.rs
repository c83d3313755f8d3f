// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::records::insert_new;
use crate::errors::{LedgerError, Result};
use crate::models::{Account, AccountKind, FinancialData, Portfolio};
use rust_decimal::Decimal;
use tracing::debug;

/// Sets every investment account's balance to the current value of the
/// holdings in its portfolios.
pub(super) fn revalue_investment_accounts(data: &mut FinancialData) -> Result<()> {
    let mut totals: Vec<(usize, Decimal)> = Vec::new();
    for (idx, a) in data.accounts.iter().enumerate() {
        if a.kind != AccountKind::Investment {
            continue;
        }
        let total = data
            .holdings_for_account(&a.id)
            .try_fold(Decimal::ZERO, |sum, h| sum.checked_add(h.current_value))
            .ok_or_else(|| {
                LedgerError::validation(format!("Value of account '{}' is out of range", a.name))
            })?;
        totals.push((idx, total));
    }
    for (idx, total) in totals {
        data.accounts[idx].balance = total;
    }
    Ok(())
}

pub(super) fn add(data: &mut FinancialData, account: Account) -> Result<()> {
    if account.name.trim().is_empty() {
        return Err(LedgerError::validation("Account name must not be empty"));
    }
    insert_new(&mut data.accounts, account)
}

/// Replaces name, kind and balance. Investment balances are recomputed by the
/// reducer afterwards, so the incoming balance only sticks for cash accounts.
pub(super) fn update(data: &mut FinancialData, account: Account) -> Result<()> {
    match data.accounts.iter_mut().find(|a| a.id == account.id) {
        Some(slot) => *slot = account,
        None => debug!(id = %account.id, "update of unknown account ignored"),
    }
    Ok(())
}

/// Removes the account together with its portfolios and trade history.
/// Cash transactions are kept.
pub(super) fn delete(data: &mut FinancialData, id: &str) -> Result<()> {
    let before = data.accounts.len();
    data.accounts.retain(|a| a.id != id);
    if data.accounts.len() == before {
        debug!(id, "delete of unknown account ignored");
        return Ok(());
    }
    data.portfolios.retain(|p| p.account_id != id);
    data.investment_transactions.retain(|t| t.account_id != id);
    Ok(())
}

fn require_investment_account(data: &FinancialData, account_id: &str) -> Result<()> {
    let account = data
        .account(account_id)
        .ok_or_else(|| LedgerError::reference("Account", account_id))?;
    if account.kind != AccountKind::Investment {
        return Err(LedgerError::validation(format!(
            "Portfolios must link to an investment account, '{}' is {}",
            account.name, account.kind
        )));
    }
    Ok(())
}

pub(super) fn add_portfolio(data: &mut FinancialData, portfolio: Portfolio) -> Result<()> {
    require_investment_account(data, &portfolio.account_id)?;
    insert_new(&mut data.portfolios, portfolio)
}

/// Renames or relinks a portfolio; its holdings are managed separately and kept.
pub(super) fn update_portfolio(data: &mut FinancialData, portfolio: Portfolio) -> Result<()> {
    if data.portfolio(&portfolio.id).is_none() {
        debug!(id = %portfolio.id, "update of unknown portfolio ignored");
        return Ok(());
    }
    require_investment_account(data, &portfolio.account_id)?;
    if let Some(slot) = data.portfolios.iter_mut().find(|p| p.id == portfolio.id) {
        slot.name = portfolio.name;
        slot.account_id = portfolio.account_id;
    }
    Ok(())
}

pub(super) fn delete_portfolio(data: &mut FinancialData, id: &str) -> Result<()> {
    let before = data.portfolios.len();
    data.portfolios.retain(|p| p.id != id);
    if data.portfolios.len() == before {
        debug!(id, "delete of unknown portfolio ignored");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Holding;
    use rust_decimal_macros::dec;

    fn account(id: &str, kind: AccountKind) -> Account {
        Account {
            id: id.into(),
            name: format!("Account {}", id),
            kind,
            balance: Decimal::ZERO,
        }
    }

    fn holding(id: &str, value: Decimal) -> Holding {
        Holding {
            id: id.into(),
            symbol: id.to_uppercase(),
            name: id.into(),
            quantity: dec!(1),
            avg_cost: value,
            current_value: value,
            zakat_class: Default::default(),
            realized_pnl: Decimal::ZERO,
            asset_class: None,
            goal_id: None,
        }
    }

    #[test]
    fn revalue_sums_holdings_across_linked_portfolios() {
        let mut data = FinancialData {
            accounts: vec![
                account("inv", AccountKind::Investment),
                account("chk", AccountKind::Checking),
            ],
            portfolios: vec![
                Portfolio {
                    id: "p1".into(),
                    name: "Core".into(),
                    account_id: "inv".into(),
                    holdings: vec![holding("a", dec!(100)), holding("b", dec!(50))],
                },
                Portfolio {
                    id: "p2".into(),
                    name: "Satellite".into(),
                    account_id: "inv".into(),
                    holdings: vec![holding("c", dec!(25))],
                },
            ],
            ..Default::default()
        };
        data.accounts[1].balance = dec!(42);
        revalue_investment_accounts(&mut data).unwrap();
        assert_eq!(data.accounts[0].balance, dec!(175));
        assert_eq!(data.accounts[1].balance, dec!(42));
    }

    #[test]
    fn revalue_reports_overflow() {
        let mut data = FinancialData {
            accounts: vec![account("inv", AccountKind::Investment)],
            portfolios: vec![Portfolio {
                id: "p1".into(),
                name: "Core".into(),
                account_id: "inv".into(),
                holdings: vec![holding("a", Decimal::MAX), holding("b", Decimal::MAX)],
            }],
            ..Default::default()
        };
        assert!(matches!(
            revalue_investment_accounts(&mut data),
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(data.accounts[0].balance, Decimal::ZERO);
    }

    #[test]
    fn portfolio_requires_investment_account() {
        let mut data = FinancialData {
            accounts: vec![account("chk", AccountKind::Checking)],
            ..Default::default()
        };
        let p = Portfolio {
            id: "p1".into(),
            name: "Core".into(),
            account_id: "chk".into(),
            holdings: Vec::new(),
        };
        assert!(matches!(
            add_portfolio(&mut data, p.clone()),
            Err(LedgerError::Validation(_))
        ));
        let orphan = Portfolio {
            account_id: "nope".into(),
            ..p
        };
        assert!(matches!(
            add_portfolio(&mut data, orphan),
            Err(LedgerError::Reference { .. })
        ));
    }
}
