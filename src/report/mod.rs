// src/report/mod.rs
use std::io::Write;

use serde::Serialize;

/// One extracted (entity, year) result. Column names follow the historical
/// report format, hence the serde renames.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialRecord {
    pub name: String,
    #[serde(rename = "Year")]
    pub year: u16,
    #[serde(rename = "totalIncome")]
    pub total_income: i64,
    pub profit: i64,
    #[serde(rename = "employeeCount")]
    pub employee_count: i64,
    #[serde(rename = "netPayCosts")]
    pub net_pay_costs: i64,
    #[serde(rename = "averagePay")]
    pub average_pay: f64,
}

/// Append-only, insertion-ordered record collection. Deliberately keeps
/// duplicates: if the portal lists the same statement twice, dedup policy
/// belongs to whoever consumes the report.
#[derive(Debug, Default)]
pub struct ReportAccumulator {
    records: Vec<FinancialRecord>,
}

impl ReportAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: FinancialRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[FinancialRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Consumes records as they are produced, so the report file advances with
/// the run and an interrupted run keeps the rows already written.
pub trait RecordSink {
    fn write(&mut self, record: &FinancialRecord) -> Result<(), csv::Error>;
}

/// CSV sink with the historical header row and quoted entity names.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Result<Self, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(csv::QuoteStyle::NonNumeric)
            .from_writer(out);
        // Header written manually to keep the exact legacy casing
        writer.write_record([
            "name",
            "Year",
            "totalIncome",
            "profit",
            "employeeCount",
            "netPayCosts",
            "averagePay",
        ])?;
        writer.flush()?;
        Ok(Self { writer })
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write(&mut self, record: &FinancialRecord) -> Result<(), csv::Error> {
        self.writer.serialize(record)?;
        // Flush per record so partial results survive an interrupted run
        self.writer.flush()?;
        Ok(())
    }
}
