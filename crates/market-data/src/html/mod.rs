//! HTML table extraction.
//!
//! Turns upstream markup into rows of trimmed cell text. The first `<tr>` of
//! every table is its header and is always skipped. Only `<td>` cells are
//! collected, so header-style `<th>` rows further down yield empty rows that
//! the price parser discards.

use scraper::{ElementRef, Html, Selector};

use crate::errors::MarketDataError;

/// One table row as cell text, in column order.
pub type Row = Vec<String>;

fn selector(css: &str) -> Result<Selector, MarketDataError> {
    Selector::parse(css)
        .map_err(|e| MarketDataError::Parse(format!("invalid selector {css}: {e}")))
}

struct TableSelectors {
    table: Selector,
    row: Selector,
    cell: Selector,
}

impl TableSelectors {
    fn new() -> Result<Self, MarketDataError> {
        Ok(Self {
            table: selector("table")?,
            row: selector("tr")?,
            cell: selector("td")?,
        })
    }

    fn rows(&self, table: ElementRef<'_>) -> Vec<Row> {
        table
            .select(&self.row)
            .skip(1)
            .map(|tr| {
                tr.select(&self.cell)
                    .map(|td| td.text().collect::<String>().trim().to_string())
                    .collect()
            })
            .collect()
    }
}

/// Rows of the first table in the document.
pub fn first_table_rows(html: &str) -> Result<Vec<Row>, MarketDataError> {
    let selectors = TableSelectors::new()?;
    let document = Html::parse_document(html);
    let table = document
        .select(&selectors.table)
        .next()
        .ok_or_else(|| MarketDataError::Parse("no table found in upstream page".to_string()))?;
    Ok(selectors.rows(table))
}

/// Rows of every table in the document, concatenated in document order.
///
/// `skip_trailing` tables at the end of the document are left out; the
/// archive page ends with a legend table that carries no prices. Fails when
/// no table remains after the exclusion.
pub fn merged_table_rows(html: &str, skip_trailing: usize) -> Result<Vec<Row>, MarketDataError> {
    let selectors = TableSelectors::new()?;
    let document = Html::parse_document(html);
    let tables: Vec<ElementRef<'_>> = document.select(&selectors.table).collect();

    let keep = tables.len().saturating_sub(skip_trailing);
    if keep == 0 {
        return Err(MarketDataError::Parse(format!(
            "expected more than {skip_trailing} table(s) in upstream page, found {}",
            tables.len()
        )));
    }

    Ok(tables[..keep]
        .iter()
        .flat_map(|table| selectors.rows(*table))
        .collect())
}
