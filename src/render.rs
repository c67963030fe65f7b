use analytics::PnlReport;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use core_types::PriceTable;

const MISSING: &str = "n/a";

fn new_table(header: Vec<Cell>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn money(value: f64) -> Cell {
    Cell::new(format!("{:.2}", value)).set_alignment(CellAlignment::Right)
}

/// Green for profit, red for loss or breakeven.
fn signed(value: f64, positive: bool) -> Cell {
    money(value).fg(if positive { Color::Green } else { Color::Red })
}

/// One row per trading day, one column per symbol.
pub fn price_table(prices: &PriceTable) -> Table {
    let mut header = vec![Cell::new("Date")];
    header.extend(prices.symbols().iter().map(|s| Cell::new(s.as_str())));
    let mut table = new_table(header);

    for (date, cells) in prices.rows() {
        let mut row = vec![Cell::new(date.format("%Y-%m-%d"))];
        row.extend(cells.iter().map(|cell| match cell {
            Some(price) => money(*price),
            None => Cell::new(MISSING).set_alignment(CellAlignment::Right),
        }));
        table.add_row(row);
    }
    table
}

/// Per-share PnL ranked from best to worst.
pub fn per_share_table(report: &PnlReport) -> Table {
    let mut table = new_table(vec![
        Cell::new("#"),
        Cell::new("Stock"),
        Cell::new(format!("Purchase ({})", report.first_date)),
        Cell::new(format!("Current ({})", report.last_date)),
        Cell::new("PnL / share"),
        Cell::new("Positive"),
    ]);

    for (rank, entry) in report.per_share.iter().enumerate() {
        let positive = report.is_profitable(&entry.symbol);
        let (purchase, current) = match report.quote(&entry.symbol) {
            Some(q) => (money(q.purchase_price), money(q.current_price)),
            None => (Cell::new(MISSING), Cell::new(MISSING)),
        };
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(entry.symbol.as_str()),
            purchase,
            current,
            signed(entry.value, positive),
            Cell::new(positive),
        ]);
    }
    table
}

/// Per-share PnL multiplied by the quantity owned, plus the sum.
pub fn personal_table(report: &PnlReport) -> Table {
    let mut table = new_table(vec![
        Cell::new("Stock"),
        Cell::new("Shares"),
        Cell::new("Your PnL"),
    ]);

    for (entry, quantity) in report.scaled.iter().zip(&report.quantities) {
        table.add_row(vec![
            Cell::new(entry.symbol.as_str()),
            Cell::new(quantity).set_alignment(CellAlignment::Right),
            signed(entry.value, report.is_profitable(&entry.symbol)),
        ]);
    }

    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(""),
        signed(report.total, report.total > 0.0),
    ]);
    table
}

/// Human-readable lines for every symbol left out of the figures.
pub fn issue_lines(report: &PnlReport) -> Vec<String> {
    report.issues.iter().map(|issue| format!("  - {}", issue)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::PnlEngine;
    use chrono::NaiveDate;
    use core_types::{Holding, Symbol};

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    fn sample() -> (PriceTable, PnlReport) {
        let prices = PriceTable::new(
            vec![
                NaiveDate::from_ymd_opt(2022, 1, 3).unwrap(),
                NaiveDate::from_ymd_opt(2022, 1, 4).unwrap(),
            ],
            vec![sym("A"), sym("B"), sym("C")],
            vec![
                vec![Some(10.0), Some(20.0), Some(1.0)],
                vec![Some(15.0), Some(18.0), None],
            ],
        )
        .unwrap();
        let mut holding = Holding::new();
        holding.set(sym("A"), 3).unwrap();
        holding.set(sym("B"), 4).unwrap();
        let report = PnlEngine::default().evaluate(&prices, &holding).unwrap();
        (prices, report)
    }

    #[test]
    fn price_table_marks_missing_cells() {
        let (prices, _) = sample();
        let text = price_table(&prices).force_no_tty().to_string();
        assert!(text.contains("2022-01-04"));
        assert!(text.contains("15.00"));
        assert!(text.contains(MISSING));
    }

    #[test]
    fn per_share_table_lists_ranked_symbols() {
        let (_, report) = sample();
        let text = per_share_table(&report).force_no_tty().to_string();
        let a = text.find("5.00").unwrap();
        let b = text.find("-2.00").unwrap();
        assert!(a < b);
        assert!(text.contains("Purchase (2022-01-03)"));
    }

    #[test]
    fn personal_table_ends_with_total() {
        let (_, report) = sample();
        let text = personal_table(&report).force_no_tty().to_string();
        assert!(text.contains("15.00"));
        assert!(text.contains("-8.00"));
        assert!(text.contains("7.00"));
        assert!(text.find("Total").unwrap() > text.find("-8.00").unwrap());
    }

    #[test]
    fn issues_name_the_symbol() {
        let (_, report) = sample();
        let lines = issue_lines(&report);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("'C'"));
    }
}
