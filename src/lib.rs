// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod assistant;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod errors;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod queries;
pub mod seed;
pub mod store;
pub mod ticker;
pub mod utils;
