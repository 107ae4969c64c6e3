use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Display;

/// Print each item on its own line, or all of them as one pretty JSON array.
pub(crate) fn print_all<T>(items: &[T], json: bool) -> Result<()>
where
    T: Serialize + Display,
{
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(items).context("Could not create string from items.")?
        );
    } else {
        for item in items {
            println!("{}", item);
        }
    }
    Ok(())
}

pub(crate) fn print_one<T>(item: &T, json: bool) -> Result<()>
where
    T: Serialize + Display,
{
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(item).context("Could not create string from item.")?
        );
    } else {
        println!("{}", item);
    }
    Ok(())
}
