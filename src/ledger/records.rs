// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::require_id;
use crate::errors::{LedgerError, Result};
use crate::models::{
    Account, Asset, Budget, FinancialData, Goal, Holding, InvestmentTransaction, Liability,
    Portfolio, PriceAlert, Transaction, WatchlistItem, ZakatPayment,
};
use tracing::debug;

/// A record addressable by its identifier.
pub trait Record {
    const ENTITY: &'static str;
    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($($ty:ty => $entity:literal),* $(,)?) => {
        $(
            impl Record for $ty {
                const ENTITY: &'static str = $entity;
                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

impl_record!(
    Account => "Account",
    Transaction => "Transaction",
    InvestmentTransaction => "Trade",
    Portfolio => "Portfolio",
    Holding => "Holding",
    Asset => "Asset",
    Liability => "Liability",
    Goal => "Goal",
    Budget => "Budget",
    WatchlistItem => "Watchlist item",
    ZakatPayment => "Zakat payment",
    PriceAlert => "Price alert",
);

/// Plain create/update/delete for records without derived state.
#[derive(Debug, Clone, PartialEq)]
pub enum Crud<T> {
    Add(T),
    Update(T),
    Delete(String),
}

impl<T> Crud<T> {
    pub fn verb(&self) -> &'static str {
        match self {
            Crud::Add(_) => "add",
            Crud::Update(_) => "update",
            Crud::Delete(_) => "delete",
        }
    }
}

pub(super) fn insert_new<T: Record>(items: &mut Vec<T>, item: T) -> Result<()> {
    require_id(T::ENTITY, item.id())?;
    if items.iter().any(|i| i.id() == item.id()) {
        return Err(LedgerError::validation(format!(
            "{} '{}' already exists",
            T::ENTITY,
            item.id()
        )));
    }
    items.push(item);
    Ok(())
}

pub(super) fn apply<T: Record>(items: &mut Vec<T>, op: Crud<T>) -> Result<()> {
    match op {
        Crud::Add(item) => insert_new(items, item)?,
        Crud::Update(item) => match items.iter_mut().find(|i| i.id() == item.id()) {
            Some(slot) => *slot = item,
            None => debug!(entity = T::ENTITY, id = item.id(), "update of unknown record ignored"),
        },
        Crud::Delete(id) => {
            let before = items.len();
            items.retain(|i| i.id() != id);
            if items.len() == before {
                debug!(entity = T::ENTITY, id = %id, "delete of unknown record ignored");
            }
        }
    }
    Ok(())
}

pub(super) fn link_asset_to_goal(
    data: &mut FinancialData,
    asset_id: &str,
    goal_id: Option<String>,
) -> Result<()> {
    match data.assets.iter_mut().find(|a| a.id == asset_id) {
        Some(asset) => asset.goal_id = goal_id,
        None => debug!(asset_id, "link of unknown asset ignored"),
    }
    Ok(())
}
