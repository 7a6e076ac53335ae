//! Generated source for development and tests.
//!
//! Produces a random-walk feed that looks like a real vendor dump: raw
//! column names straight from the declared schema, ISO timestamp strings,
//! and a messy free-text brand column for the normalizer to clean up.
//! Rows are deterministic per symbol, so runs are reproducible.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::SourceAdapter;
use crate::error::PipelineError;
use crate::schema::SourceSchema;

/// Random-walk daily bars, `days` weekday rows per symbol starting at
/// January 1 of the schema's target year.
pub struct SyntheticSource {
    name: String,
    symbols: Vec<String>,
    days: usize,
    schema: SourceSchema,
}

impl SyntheticSource {
    pub fn new(
        name: impl Into<String>,
        symbols: Vec<String>,
        days: usize,
        schema: SourceSchema,
    ) -> Self {
        Self {
            name: name.into(),
            symbols,
            days,
            schema,
        }
    }
}

impl SourceAdapter for SyntheticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &SourceSchema {
        &self.schema
    }

    fn is_synthetic(&self) -> bool {
        true
    }

    fn fetch(&self) -> Result<DataFrame, PipelineError> {
        let start = NaiveDate::from_ymd_opt(self.schema.year, 1, 1).ok_or_else(|| {
            PipelineError::SourceUnavailable {
                name: self.name.clone(),
                reason: format!("year {} is out of calendar range", self.schema.year),
            }
        })?;

        let rows = self.symbols.len() * self.days;
        let mut ts = Vec::with_capacity(rows);
        let mut keys = Vec::with_capacity(rows);
        let mut brands = Vec::with_capacity(rows);
        let mut open = Vec::with_capacity(rows);
        let mut high = Vec::with_capacity(rows);
        let mut low = Vec::with_capacity(rows);
        let mut close = Vec::with_capacity(rows);
        let mut volume = Vec::with_capacity(rows);

        for symbol in &self.symbols {
            // Deterministic seed from symbol name
            let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
            let mut rng = StdRng::from_seed(seed);

            let mut price = 100.0_f64;
            let mut current = start;
            let mut produced = 0;
            while produced < self.days {
                if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                    current += Duration::days(1);
                    continue;
                }

                let daily_return: f64 = rng.gen_range(-0.03..0.03);
                let o = price;
                let c = price * (1.0 + daily_return);
                let h = o.max(c) * (1.0 + rng.gen_range(0.0..0.01));
                let l = o.min(c) * (1.0 - rng.gen_range(0.0..0.01));

                ts.push(format!("{}T16:00:00", current.format("%Y-%m-%d")));
                keys.push(symbol.clone());
                brands.push(format!("{} corp", symbol.to_lowercase()));
                open.push(o);
                high.push(h);
                low.push(l);
                close.push(c);
                volume.push(rng.gen_range(500_000..5_000_000i64));

                price = c;
                produced += 1;
                current += Duration::days(1);
            }
        }

        let df = DataFrame::new(vec![
            Column::new(self.schema.timestamp_column.as_str().into(), ts),
            Column::new(self.schema.symbol_column.as_str().into(), keys),
            Column::new("Brand_Name".into(), brands),
            Column::new("Open".into(), open),
            Column::new("High".into(), high),
            Column::new("Low".into(), low),
            Column::new("Close".into(), close),
            Column::new("Volume".into(), volume),
        ])?;
        Ok(df)
    }
}
