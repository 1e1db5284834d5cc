use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::types::{CandidateRecord, CandidateTable, ColumnSignal, RawRow, RowLink};

const ORDER_KEYWORDS: &[&str] = &["order", "no."];
const DATE_KEYWORDS: &[&str] = &["date", "signed"];
const DESCRIPTION_KEYWORDS: &[&str] = &["description", "title", "subject"];

pub const MIN_TABLE_ROWS: usize = 2;
pub const MIN_COLUMNS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum RowSkip {
    #[error("Row has {0} cell(s), need at least 3")]
    TooFewCells(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRejection {
    TooFewRows(usize),
    TooFewColumns(usize),
}

static RE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}").expect("invalid regex: date signed")
});

static SEL_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("invalid selector: table"));
static SEL_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: tr"));
static SEL_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("invalid selector: cell"));
static SEL_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("invalid selector: a"));
static SEL_HREF: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("invalid selector: a[href]"));
static SEL_DIV_CLASS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div[class]").expect("invalid selector: div[class]"));

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Derives the column roles hinted at by lower-cased header texts.
pub fn classify_headers<S: AsRef<str>>(headers: &[S]) -> ColumnSignal {
    ColumnSignal {
        has_order_header: headers.iter().any(|h| contains_any(h.as_ref(), ORDER_KEYWORDS)),
        has_date_header: headers.iter().any(|h| contains_any(h.as_ref(), DATE_KEYWORDS)),
        has_description_header: headers
            .iter()
            .any(|h| contains_any(h.as_ref(), DESCRIPTION_KEYWORDS)),
    }
}

/// Page-level counts that help spot layout changes on the source site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageDiagnostics {
    pub tables: usize,
    pub table_class_divs: usize,
    pub pdf_links: usize,
}

#[derive(Debug, Clone)]
pub struct DiscoveredTable {
    pub table: CandidateTable,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone, Default)]
pub struct PageScan {
    pub diagnostics: PageDiagnostics,
    pub tables: Vec<DiscoveredTable>,
    pub rejected: Vec<(usize, TableRejection)>,
}

pub fn scan_page(html: &str) -> PageScan {
    let document = Html::parse_document(html);
    let diagnostics = page_diagnostics(&document);

    log::debug!(
        "Found {} tables, {} divs with table-related classes, {} PDF links",
        diagnostics.tables,
        diagnostics.table_class_divs,
        diagnostics.pdf_links
    );

    let mut scan = PageScan {
        diagnostics,
        ..Default::default()
    };

    for (index, table) in document.select(&SEL_TABLE).enumerate() {
        match discover_table(index, table) {
            Ok(discovered) => scan.tables.push(discovered),
            Err(rejection) => {
                log::debug!("Skipping table {}: {:?}", index + 1, rejection);
                scan.rejected.push((index, rejection));
            }
        }
    }

    scan
}

fn page_diagnostics(document: &Html) -> PageDiagnostics {
    PageDiagnostics {
        tables: document.select(&SEL_TABLE).count(),
        table_class_divs: document
            .select(&SEL_DIV_CLASS)
            .filter(|d| {
                d.value()
                    .attr("class")
                    .is_some_and(|c| c.to_lowercase().contains("table"))
            })
            .count(),
        pdf_links: document
            .select(&SEL_HREF)
            .filter(|a| {
                a.value()
                    .attr("href")
                    .is_some_and(|h| h.to_lowercase().contains(".pdf"))
            })
            .count(),
    }
}

fn discover_table(index: usize, table: ElementRef) -> Result<DiscoveredTable, TableRejection> {
    let rows: Vec<ElementRef> = table.select(&SEL_ROW).collect();
    log::debug!("Table {} has {} rows", index + 1, rows.len());

    if rows.len() < MIN_TABLE_ROWS {
        return Err(TableRejection::TooFewRows(rows.len()));
    }

    for (row_idx, row) in rows.iter().take(3).enumerate() {
        let preview: Vec<String> = row
            .select(&SEL_CELL)
            .map(|c| elem_text(c).trim().chars().take(50).collect())
            .collect();
        log::debug!("Row {}: {:?}", row_idx, preview);
    }

    let headers: Vec<String> = rows[0]
        .select(&SEL_CELL)
        .map(|c| elem_text(c).trim().to_lowercase())
        .collect();
    let signal = classify_headers(&headers);

    log::debug!("Header row: {:?}", headers);
    log::debug!("Table analysis - {}", signal);

    if headers.len() < MIN_COLUMNS {
        return Err(TableRejection::TooFewColumns(headers.len()));
    }

    let data_rows: Vec<RawRow> = rows[1..].iter().map(|r| raw_row(*r)).collect();
    if data_rows.is_empty() {
        log::debug!("No data rows in table {}", index + 1);
    }

    Ok(DiscoveredTable {
        table: CandidateTable {
            index,
            column_count: headers.len(),
            headers,
            signal,
        },
        rows: data_rows,
    })
}

fn raw_row(row: ElementRef) -> RawRow {
    let cells: Vec<ElementRef> = row.select(&SEL_CELL).collect();

    let first_link = cells.first().and_then(|cell| {
        cell.select(&SEL_LINK).next().map(|a| RowLink {
            text: elem_text(a),
            href: a.value().attr("href").unwrap_or_default().to_string(),
        })
    });

    RawRow {
        cells: cells.into_iter().map(elem_text).collect(),
        first_link,
    }
}

/// Pulls a candidate order out of one data row.
///
/// Cell 0 carries the order number (and optionally its document link), cell 1
/// the description; the signing date is the first later cell that looks like a
/// date, falling back to the last cell.
pub fn extract_record(row: &RawRow, base: &Url, year: i32) -> Result<CandidateRecord, RowSkip> {
    let cells = &row.cells;
    if cells.len() < MIN_COLUMNS {
        return Err(RowSkip::TooFewCells(cells.len()));
    }

    let (order_number, link_order) = match &row.first_link {
        Some(link) => {
            let href = link.href.trim();
            let resolved = if href.is_empty() {
                String::new()
            } else {
                match base.join(href) {
                    Ok(url) => url.to_string(),
                    Err(e) => {
                        log::debug!("Keeping unresolvable link '{}' as-is: {}", href, e);
                        href.to_string()
                    }
                }
            };
            (link.text.trim().to_string(), resolved)
        }
        None => (cells[0].trim().to_string(), String::new()),
    };

    let description = cells[1].trim().to_string();

    let date_signed = cells[2..]
        .iter()
        .map(|c| c.trim())
        .find(|c| RE_DATE.is_match(c))
        .or_else(|| cells.last().map(|c| c.trim()))
        .unwrap_or_default()
        .to_string();

    Ok(CandidateRecord {
        order_number,
        description,
        date_signed,
        link_order,
        year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn base() -> Url {
        Url::parse(crate::BASE_URL).unwrap()
    }

    fn table_html(rows: &[&[&str]]) -> String {
        let body: String = rows
            .iter()
            .map(|cells| {
                let tds: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
                format!("<tr>{}</tr>", tds)
            })
            .collect();
        format!("<html><body><table>{}</table></body></html>", body)
    }

    #[test]
    fn test_classify_headers_keywords() {
        let signal = classify_headers(&["order no.", "title", "date signed"]);
        assert!(signal.has_order_header);
        assert!(signal.has_date_header);
        assert!(signal.has_description_header);

        let signal = classify_headers(&["number", "subject", "when"]);
        assert!(!signal.has_order_header);
        assert!(!signal.has_date_header);
        assert!(signal.has_description_header);

        assert_eq!(classify_headers::<&str>(&[]), ColumnSignal::default());
    }

    #[test]
    fn test_narrow_header_is_never_a_source() {
        let html = table_html(&[
            &["Order", "Description"],
            &["56-01", "Amending Rule 5", "1/5/1956"],
            &["56-02", "Amending Rule 6", "2/5/1956"],
        ]);

        let scan = scan_page(&html);
        assert!(scan.tables.is_empty());
        assert_eq!(scan.rejected, vec![(0, TableRejection::TooFewColumns(2))]);
    }

    #[test]
    fn test_single_row_table_rejected() {
        let html = table_html(&[&["Order", "Description", "Date"]]);

        let scan = scan_page(&html);
        assert!(scan.tables.is_empty());
        assert_eq!(scan.rejected, vec![(0, TableRejection::TooFewRows(1))]);
    }

    #[test]
    fn test_signal_does_not_gate_acceptance() {
        let html = table_html(&[
            &["Alpha", "Beta", "Gamma"],
            &["56-01", "Amending Rule 5", "1/5/1956"],
        ]);

        let scan = scan_page(&html);
        assert_eq!(scan.tables.len(), 1);
        let discovered = &scan.tables[0];
        assert_eq!(discovered.table.signal, ColumnSignal::default());
        assert_eq!(discovered.table.column_count, 3);
        assert_eq!(discovered.table.headers, vec!["alpha", "beta", "gamma"]);
        assert_eq!(discovered.rows.len(), 1);
    }

    #[test]
    fn test_extract_linked_order() {
        let html = r#"
            <table>
                <tr><th>Order No.</th><th>Description</th><th>Date Signed</th></tr>
                <tr>
                    <td><a href="/orders/56-01.pdf">56-01</a></td>
                    <td>Amending Rule 5</td>
                    <td>1/5/1956</td>
                </tr>
            </table>
        "#;

        let scan = scan_page(html);
        let row = &scan.tables[0].rows[0];
        let record = extract_record(row, &base(), 1956).expect("row should extract");

        assert_eq!(
            record,
            CandidateRecord {
                order_number: "56-01".to_string(),
                description: "Amending Rule 5".to_string(),
                date_signed: "1/5/1956".to_string(),
                link_order: "https://www.azcourts.gov/orders/56-01.pdf".to_string(),
                year: 1956,
            }
        );
    }

    #[test]
    fn test_extract_plain_order_has_empty_link() {
        let row = RawRow::new(["  75-02 ", "Court reporters", "06-27-75"]);
        let record = extract_record(&row, &base(), 1975).unwrap();

        assert_eq!(record.order_number, "75-02");
        assert_eq!(record.link_order, "");
        assert_eq!(record.date_signed, "06-27-75");
    }

    #[test]
    fn test_extract_date_scans_past_non_dates() {
        let row = RawRow::new(["2020-10", "Judicial conduct", "Signed", "3/4/2020", "5/6/2020"]);
        let record = extract_record(&row, &base(), 2020).unwrap();
        assert_eq!(record.date_signed, "3/4/2020");
    }

    #[test]
    fn test_extract_date_falls_back_to_last_cell() {
        let row = RawRow::new(["2020-10", "Judicial conduct", "pending", " March 4, 2020 "]);
        let record = extract_record(&row, &base(), 2020).unwrap();
        assert_eq!(record.date_signed, "March 4, 2020");
    }

    #[test]
    fn test_extract_skips_short_rows() {
        let row = RawRow::new(["56-01", "Amending Rule 5"]);
        assert!(matches!(
            extract_record(&row, &base(), 1956),
            Err(RowSkip::TooFewCells(2))
        ));
    }

    #[test]
    fn test_extract_link_without_href() {
        let row = RawRow::new(["56-01", "Amending Rule 5", "1/5/1956"]).with_link(" 56-01 ", "");
        let record = extract_record(&row, &base(), 1956).unwrap();
        assert_eq!(record.order_number, "56-01");
        assert_eq!(record.link_order, "");
    }

    #[test]
    fn test_unresolvable_link_keeps_order() {
        for href in ["http://", " https://exa mple.com/x.pdf "] {
            let row = RawRow::new(["x", "Amending Rule 5", "1/5/1956"]).with_link("56-01", href);
            let record = extract_record(&row, &base(), 1956)
                .unwrap_or_else(|e| panic!("row with link '{}' was dropped: {}", href, e));

            assert_eq!(record.order_number, "56-01");
            assert_eq!(record.description, "Amending Rule 5");
            assert_eq!(record.date_signed, "1/5/1956");
            assert_eq!(record.link_order, href.trim());
        }
    }

    #[test]
    fn test_extract_keeps_absolute_link() {
        let row = RawRow::new(["x", "Amending Rule 5", "1/5/1956"])
            .with_link("2021-01", "https://cdn.example.org/docs/2021-01.pdf");
        let record = extract_record(&row, &base(), 2021).unwrap();
        assert_eq!(record.link_order, "https://cdn.example.org/docs/2021-01.pdf");
    }

    #[test]
    fn test_page_diagnostics() {
        let html = r#"
            <div class="Responsive-Table"><table><tr><td>a</td></tr></table></div>
            <div class="content"></div>
            <a href="/a.PDF">A</a><a href="/b.pdf">B</a><a href="/c.html">C</a><a>D</a>
        "#;

        let scan = scan_page(html);
        assert_eq!(
            scan.diagnostics,
            PageDiagnostics {
                tables: 1,
                table_class_divs: 1,
                pdf_links: 2,
            }
        );
    }

    #[test]
    fn test_scan_legacy_fixture() {
        let html = fs::read_to_string("fixtures/legacy_1975.html")
            .expect("Failed to read sample HTML file");

        let scan = scan_page(&html);

        assert_eq!(scan.diagnostics.tables, 2);
        assert_eq!(scan.tables.len(), 1, "Only the order table should survive");

        let discovered = &scan.tables[0];
        assert!(discovered.table.signal.has_order_header);
        assert!(discovered.table.signal.has_date_header);
        assert!(discovered.table.signal.has_description_header);

        let records: Vec<CandidateRecord> = discovered
            .rows
            .iter()
            .filter_map(|r| extract_record(r, &base(), 1975).ok())
            .collect();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].order_number, "75-01");
        assert_eq!(
            records[0].link_order,
            "https://www.azcourts.gov/Portals/22/admorder/Orders75/75-01.pdf"
        );
        assert_eq!(records[0].date_signed, "1/15/1975");
    }

    #[test]
    fn test_scan_modern_fixture() {
        let html = fs::read_to_string("fixtures/modern_2020.html")
            .expect("Failed to read sample HTML file");

        let scan = scan_page(&html);

        assert_eq!(scan.tables.len(), 1);
        assert_eq!(scan.diagnostics.pdf_links, 3);

        let rows = &scan.tables[0].rows;
        let records: Vec<CandidateRecord> = rows
            .iter()
            .filter_map(|r| extract_record(r, &base(), 2020).ok())
            .collect();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].order_number, "2020-02");
        assert_eq!(records[1].date_signed, "01-09-2020");
        assert!(records[1].description.contains('\n'));
        assert_eq!(records[2].date_signed, "Amended 3/2/2020");
    }
}
