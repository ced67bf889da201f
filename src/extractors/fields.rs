// src/extractors/fields.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

// --- Row-signature patterns (Lazy Static) ---
//
// Every amount in the statement form sits in a row carrying a fixed numeric
// line code, stable across filing years even when the surrounding markup is
// not. Each field gets an ordered list of row signatures, tried in sequence;
// the captured digit run is always the named group `value`.

static TOTAL_INCOME_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Canonical layout: code cell, empty notes cell, right-aligned value.
        Regex::new(
            r#"<td style="text-align: center;">201</td>\s*<td></td>\s*<td style="text-align: right; padding-right: 8px">(?<value>\d+)</td>"#,
        )
        .expect("Failed to compile total income primary pattern"),
        // Newer vendor layout: two leading cells and styling attributes on
        // every cell, including the notes cell.
        Regex::new(
            r#"<tr>\s*<td.*?>.*?</td>\s*<td.*?>.*?</td>\s*<td style="text-align: center;">201</td>\s*<td.*?>.*?</td>\s*<td style="text-align: right; padding-right: 8px">(?<value>\d+)</td>"#,
        )
        .expect("Failed to compile total income fallback pattern"),
    ]
});

// Code 260 appears in more than one row of the form, so the profit signature
// is additionally anchored to its label. No layout-variant fallback exists
// for this field.
static PROFIT_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![Regex::new(
        r#"<td style="text-align: left">IX\. Neto sveobuhvatni rezultat \(248\+259\)</td>\s*<td style="text-align: center;">260</td>\s*<td></td>\s*<td style="text-align: right; padding-right: 8px">(?<value>\d+)</td>"#,
    )
    .expect("Failed to compile profit pattern")]
});

// The label contains "č", which some filings encode as an HTML entity;
// [^<]+ rides over either form.
static EMPLOYEE_COUNT_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![Regex::new(
        r#"<td style="text-align: left">Prosje[^<]+an broj zaposlenih[^<]+</td>\s*<td style="text-align: center;">001</td>\s*<td></td>\s*<td style="text-align: right; padding-right: 8px">(?<value>\d+)</td>"#,
    )
    .expect("Failed to compile employee count pattern")]
});

static NET_PAY_COSTS_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![Regex::new(
        r#"<td style="text-align: left">a\) Neto troškovi zarada, naknada zarada i lični rashodi</td>\s*<td style="text-align: center;">212</td>\s*<td></td>\s*<td style="text-align: right; padding-right: 8px">(?<value>\d+)</td>"#,
    )
    .expect("Failed to compile net pay costs pattern")]
});

// --- Data Structures ---

/// The scalar fields pulled out of one statement document, plus the derived
/// average pay. A field whose row signature never matched is 0; pre-2020
/// filings simply do not report net pay costs, so 0 is a normal value there,
/// not a failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialFields {
    pub total_income: i64,
    pub profit: i64,
    pub employee_count: i64,
    pub net_pay_costs: i64,
    pub average_pay: f64,
}

// --- Extractor ---

pub struct FieldExtractor;

impl FieldExtractor {
    pub fn new() -> Self {
        Self {}
    }

    /// Extracts the four raw fields and derives the average pay. Pure over
    /// the document text: same input, same output, never an error.
    pub fn extract(&self, html: &str) -> FinancialFields {
        let total_income = extract_field(&TOTAL_INCOME_RULES, html);
        if total_income == 0 {
            tracing::warn!("No row matched for total income (code 201)");
        }

        let profit = extract_field(&PROFIT_RULES, html);
        let employee_count = extract_field(&EMPLOYEE_COUNT_RULES, html);
        let net_pay_costs = extract_field(&NET_PAY_COSTS_RULES, html);

        // Monthly average over the year. An unmatched net-pay row leaves
        // net_pay_costs at 0 and therefore the average at 0 as well.
        let average_pay = if employee_count > 0 {
            net_pay_costs as f64 / employee_count as f64 / 12.0
        } else {
            0.0
        };

        FinancialFields {
            total_income,
            profit,
            employee_count,
            net_pay_costs,
            average_pay,
        }
    }
}

/// Tries the rules in order and returns the first match, reading the first
/// occurrence in document order when a pattern matches more than once.
///
/// A captured value of 0 counts as "not found" and sends the search to the
/// next rule. That conflates a genuine zero with a non-match; the behavior
/// is kept as-is because existing extracted data depends on it.
fn extract_field(rules: &[Regex], html: &str) -> i64 {
    for rule in rules {
        let value = rule
            .captures(html)
            .and_then(|caps| caps.name("value"))
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .unwrap_or(0);
        if value != 0 {
            return value;
        }
    }
    0
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const EMPLOYEE_LABEL: &str = "Prosječan broj zaposlenih na osnovu stanja krajem mjeseca";
    const NET_PAY_LABEL: &str = "a) Neto troškovi zarada, naknada zarada i lični rashodi";
    const PROFIT_LABEL: &str = "IX. Neto sveobuhvatni rezultat (248+259)";

    fn coded_row(code: &str, value: i64) -> String {
        format!(
            r#"<tr><td style="text-align: center;">{}</td><td></td><td style="text-align: right; padding-right: 8px">{}</td></tr>"#,
            code, value
        )
    }

    fn labeled_row(label: &str, code: &str, value: i64) -> String {
        format!(
            r#"<tr><td style="text-align: left">{}</td><td style="text-align: center;">{}</td><td></td><td style="text-align: right; padding-right: 8px">{}</td></tr>"#,
            label, code, value
        )
    }

    fn attribute_laden_income_row(value: i64) -> String {
        format!(
            r#"<tr><td class="rb">1</td><td class="pos">Poslovni prihodi</td><td style="text-align: center;">201</td><td class="note"></td><td style="text-align: right; padding-right: 8px">{}</td></tr>"#,
            value
        )
    }

    fn canonical_document() -> String {
        format!(
            "<table>{}{}{}{}</table>",
            coded_row("201", 221152),
            labeled_row(PROFIT_LABEL, "260", 91040),
            labeled_row(EMPLOYEE_LABEL, "001", 13),
            labeled_row(NET_PAY_LABEL, "212", 64418),
        )
    }

    #[test]
    fn extracts_all_fields_from_canonical_layout() {
        let fields = FieldExtractor::new().extract(&canonical_document());

        assert_eq!(fields.total_income, 221152);
        assert_eq!(fields.profit, 91040);
        assert_eq!(fields.employee_count, 13);
        assert_eq!(fields.net_pay_costs, 64418);
        assert!((fields.average_pay - 64418.0 / 13.0 / 12.0).abs() < 1e-9);
        assert!((fields.average_pay - 412.94).abs() < 0.01);
    }

    #[test]
    fn extraction_is_deterministic() {
        let document = canonical_document();
        let extractor = FieldExtractor::new();
        assert_eq!(extractor.extract(&document), extractor.extract(&document));
    }

    #[test]
    fn unknown_document_defaults_to_zeroes_without_error() {
        let fields = FieldExtractor::new().extract("<html><body><p>no statement here</p></body></html>");
        assert_eq!(fields, FinancialFields::default());
    }

    #[test]
    fn missing_net_pay_row_leaves_costs_and_average_at_zero() {
        let document = format!(
            "<table>{}{}{}</table>",
            coded_row("201", 221152),
            labeled_row(PROFIT_LABEL, "260", 91040),
            labeled_row(EMPLOYEE_LABEL, "001", 13),
        );
        let fields = FieldExtractor::new().extract(&document);

        assert_eq!(fields.total_income, 221152);
        assert_eq!(fields.profit, 91040);
        assert_eq!(fields.employee_count, 13);
        assert_eq!(fields.net_pay_costs, 0);
        assert_eq!(fields.average_pay, 0.0);
    }

    #[test]
    fn zero_employees_never_divides() {
        let document = format!(
            "<table>{}{}</table>",
            coded_row("201", 500000),
            labeled_row(NET_PAY_LABEL, "212", 64418),
        );
        let fields = FieldExtractor::new().extract(&document);

        assert_eq!(fields.net_pay_costs, 64418);
        assert_eq!(fields.employee_count, 0);
        assert_eq!(fields.average_pay, 0.0);
    }

    #[test]
    fn attribute_laden_layout_falls_back_to_secondary_pattern() {
        let fallback_doc = format!("<table>{}</table>", attribute_laden_income_row(221152));
        let canonical_doc = format!("<table>{}</table>", coded_row("201", 221152));

        let extractor = FieldExtractor::new();
        let from_fallback = extractor.extract(&fallback_doc).total_income;
        let from_canonical = extractor.extract(&canonical_doc).total_income;

        assert_eq!(from_fallback, 221152);
        assert_eq!(from_fallback, from_canonical);
    }

    #[test]
    fn zero_valued_primary_match_is_treated_as_a_miss() {
        // Kept-for-compatibility tie-break: a captured 0 sends the search to
        // the next rule even though the row did match.
        let document = format!(
            "<table>{}{}</table>",
            coded_row("201", 0),
            attribute_laden_income_row(98765),
        );
        let fields = FieldExtractor::new().extract(&document);
        assert_eq!(fields.total_income, 98765);
    }

    #[test]
    fn first_match_in_document_order_wins() {
        let document = format!(
            "<table>{}{}</table>",
            coded_row("201", 111),
            coded_row("201", 222),
        );
        let fields = FieldExtractor::new().extract(&document);
        assert_eq!(fields.total_income, 111);
    }

    #[test]
    fn profit_requires_its_label_anchor() {
        // A 260 row with a different label must not be read as profit.
        let document = format!(
            "<table>{}</table>",
            labeled_row("Some other position", "260", 55555),
        );
        let fields = FieldExtractor::new().extract(&document);
        assert_eq!(fields.profit, 0);
    }
}
