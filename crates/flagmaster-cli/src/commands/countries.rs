//! The `flagmaster countries` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use flagmaster_core::model::MAX_LEVEL;

use super::load_dataset;

pub fn execute(tier: Option<u8>, dataset_path: Option<PathBuf>) -> Result<()> {
    if let Some(t) = tier {
        if !(1..=MAX_LEVEL).contains(&t) {
            anyhow::bail!("tier must be between 1 and {MAX_LEVEL}, got {t}");
        }
    }

    let set = load_dataset(dataset_path.as_deref())?;
    let mut countries: Vec<_> = set
        .countries()
        .iter()
        .filter(|c| tier.map_or(true, |t| c.difficulty == t))
        .collect();
    countries.sort_by_key(|c| c.difficulty);

    let mut table = Table::new();
    table.set_header(vec!["Tier", "Flag", "Country", "ISO", "Capital", "Currency"]);
    for country in &countries {
        table.add_row(vec![
            Cell::new(country.difficulty),
            Cell::new(country.flag_emoji()),
            Cell::new(&country.name),
            Cell::new(country.iso_code.to_uppercase()),
            Cell::new(&country.capital),
            Cell::new(&country.currency),
        ]);
    }

    println!("{table}");
    println!("{} countries", countries.len());
    Ok(())
}
