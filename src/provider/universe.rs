//! S&P 500 constituent universe from the public Wikipedia table.

use reqwest::Client;
use tracing::{error, info};

/// Constituent list page; its first table holds one ticker per row.
pub const SP500_CONSTITUENTS_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";

/// Fetch and parse the constituent symbols.
///
/// Any network or parse failure is logged and yields an empty list; the
/// caller treats that as "nothing to collect", not as an error.
pub async fn fetch_sp500_symbols(client: &Client) -> Vec<String> {
    let html = match client.get(SP500_CONSTITUENTS_URL).send().await {
        Ok(response) => match response.text().await {
            Ok(text) => text,
            Err(e) => {
                error!("error reading S&P 500 constituent page: {}", e);
                return Vec::new();
            }
        },
        Err(e) => {
            error!("error fetching S&P 500 constituent page: {}", e);
            return Vec::new();
        }
    };

    let symbols = parse_constituent_table(&html);
    if symbols.is_empty() {
        error!("no constituent table found on page");
    } else {
        info!("parsed {} constituent symbols", symbols.len());
    }
    symbols
}

/// Extract the first column of the first HTML table in `html`.
///
/// Header rows (`<th>` cells) are skipped; anchor markup inside the symbol
/// cell is stripped.
pub fn parse_constituent_table(html: &str) -> Vec<String> {
    let Some(table_start) = html.find("<table") else {
        return Vec::new();
    };
    let table = match html[table_start..].find("</table>") {
        Some(end) => &html[table_start..table_start + end],
        None => &html[table_start..],
    };

    let mut symbols = Vec::new();
    for row in table.split("<tr").skip(1) {
        let Some(cell_start) = row.find("<td") else {
            continue; // header row
        };
        let cell = &row[cell_start..];
        let Some(open_end) = cell.find('>') else {
            continue;
        };
        let body = match cell[open_end + 1..].find("</td>") {
            Some(end) => &cell[open_end + 1..open_end + 1 + end],
            None => &cell[open_end + 1..],
        };
        let symbol = strip_tags(body);
        if !symbol.is_empty() {
            symbols.push(symbol);
        }
    }
    symbols
}

fn strip_tags(fragment: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for c in fragment.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}
