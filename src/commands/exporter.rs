// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::transactions::{Filter, query_rows};
use super::{arg, opt};
use crate::models::FinancialData;
use crate::store::Store;
use crate::utils::parse_month;
use anyhow::Result;
use std::io::Write;
use std::path::Path;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let out = arg(sub, "out")?;
            let filter = Filter {
                month: opt(sub, "month").map(parse_month).transpose()?,
                ..Default::default()
            };
            let n = write_transactions_csv(&store.state(), &filter, std::fs::File::create(out)?)?;
            println!("Exported {} transactions to {}", n, out);
        }
        Some(("json", sub)) => {
            let out = arg(sub, "out")?;
            export_json(&store.state(), Path::new(out))?;
            println!("Exported document to {}", out);
        }
        _ => {}
    }
    Ok(())
}

/// Oldest first, the way spreadsheets expect it. Returns the row count.
pub fn write_transactions_csv<W: Write>(
    data: &FinancialData,
    filter: &Filter,
    out: W,
) -> Result<usize> {
    let mut rows = query_rows(data, filter);
    rows.reverse();
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "id",
        "date",
        "account",
        "description",
        "amount",
        "type",
        "category",
    ])?;
    for r in &rows {
        wtr.write_record([
            &r.id,
            &r.date,
            &r.account,
            &r.description,
            &r.amount,
            &r.r#type,
            &r.category,
        ])?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

pub fn export_json(data: &FinancialData, out: &Path) -> Result<()> {
    std::fs::write(out, serde_json::to_string_pretty(data)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::default_data;

    #[test]
    fn csv_has_header_and_rows_oldest_first() {
        let mut buf = Vec::new();
        let n = write_transactions_csv(&default_data(), &Filter::default(), &mut buf).unwrap();
        assert_eq!(n, 7);
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,date,account,description,amount,type,category")
        );
        assert!(lines.next().unwrap().starts_with("tx-salary,2025-06-01,Family Checking"));
        assert_eq!(text.lines().count(), 8);
    }

    #[test]
    fn json_export_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        export_json(&default_data(), &path).unwrap();
        let back: FinancialData =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, default_data());
    }
}
