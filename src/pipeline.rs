// src/pipeline.rs
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Entity;
use crate::extractors::fields::FieldExtractor;
use crate::portal::models::{DocumentKind, StatementRef, TaxpayerMatch};
use crate::report::{FinancialRecord, RecordSink, ReportAccumulator};
use crate::storage::{DocumentStore, Fetcher};
use crate::utils::error::PortalError;

/// Statement discovery seam: who filed what, and under which number.
#[async_trait]
pub trait StatementSource: Send + Sync {
    async fn find_taxpayers(&self, tax_id: &str) -> Result<Vec<TaxpayerMatch>, PortalError>;
    async fn list_statements(&self, tax_id: &str) -> Result<Vec<StatementRef>, PortalError>;
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub failures: usize,
}

/// Drives the per-entity, per-statement loop: discover statements,
/// materialize each document through the cache, extract, append. Strictly
/// sequential; the portal is an authenticated, rate-sensitive service and
/// gets one request at a time.
pub struct Pipeline<S, F> {
    locator: S,
    store: DocumentStore<F>,
    extractor: FieldExtractor,
    statement_delay: Duration,
}

impl<S: StatementSource, F: Fetcher> Pipeline<S, F> {
    pub fn new(locator: S, store: DocumentStore<F>, statement_delay: Duration) -> Self {
        Self {
            locator,
            store,
            extractor: FieldExtractor::new(),
            statement_delay,
        }
    }

    /// Processes every entity in order. An error confined to one entity or
    /// one statement is logged and the loop moves on; nothing here aborts
    /// the whole run.
    pub async fn run(
        &self,
        entities: &[Entity],
        report: &mut ReportAccumulator,
        sink: &mut dyn RecordSink,
    ) -> RunSummary {
        let mut summary = RunSummary::default();

        for entity in entities {
            self.process_entity(entity, report, sink, &mut summary).await;
        }

        tracing::info!(
            "Run finished: {} records, {} failed work items",
            summary.records,
            summary.failures
        );
        summary
    }

    async fn process_entity(
        &self,
        entity: &Entity,
        report: &mut ReportAccumulator,
        sink: &mut dyn RecordSink,
        summary: &mut RunSummary,
    ) {
        tracing::info!("Collecting data for {} ({})", entity.name, entity.tax_id);

        // Grid lookup confirms the entity exists. Logging only - it never
        // gates further processing.
        match self.locator.find_taxpayers(&entity.tax_id).await {
            Ok(matches) if matches.is_empty() => {
                tracing::warn!("No taxpayer match for {} ({})", entity.name, entity.tax_id);
            }
            Ok(matches) => {
                for taxpayer in &matches {
                    tracing::info!("Found taxpayer: {} - {}", taxpayer.pib, taxpayer.naziv);
                }
            }
            Err(e) => {
                tracing::warn!("Taxpayer lookup failed for {}: {}", entity.name, e);
            }
        }

        if let Err(e) = self.store.get(entity, &DocumentKind::EntityDetails).await {
            tracing::error!("Failed to materialize entity details for {}: {}", entity.name, e);
            summary.failures += 1;
            // Statements may still be reachable; keep going.
        }

        let statements = match self.locator.list_statements(&entity.tax_id).await {
            Ok(statements) => statements,
            Err(e) => {
                tracing::error!("Failed to list statements for {}: {}", entity.name, e);
                summary.failures += 1;
                return;
            }
        };

        if statements.is_empty() {
            tracing::info!("No statements filed for {}", entity.name);
            return;
        }
        tracing::info!("Found {} statements for {}", statements.len(), entity.name);

        for statement in statements {
            tracing::info!(
                "Processing statement {} for {} ({})",
                statement.number,
                entity.name,
                statement.year
            );

            let kind = DocumentKind::Statement(statement.clone());
            let html = match self.store.get(entity, &kind).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::error!(
                        "Failed to materialize statement {} for {}: {}",
                        statement.number,
                        entity.name,
                        e
                    );
                    summary.failures += 1;
                    continue;
                }
            };

            let fields = self.extractor.extract(&html);
            tracing::info!(
                "Extracted - totalIncome: {}, profit: {}, employees: {}, netPayCosts: {}",
                fields.total_income,
                fields.profit,
                fields.employee_count,
                fields.net_pay_costs
            );

            let record = FinancialRecord {
                name: entity.name.clone(),
                year: statement.year,
                total_income: fields.total_income,
                profit: fields.profit,
                employee_count: fields.employee_count,
                net_pay_costs: fields.net_pay_costs,
                average_pay: fields.average_pay,
            };
            if let Err(e) = sink.write(&record) {
                tracing::error!(
                    "Failed to write report row for {} ({}): {}",
                    entity.name,
                    statement.year,
                    e
                );
            }
            report.append(record);
            summary.records += 1;

            if !self.statement_delay.is_zero() {
                tokio::time::sleep(self.statement_delay).await;
            }
        }
    }
}
