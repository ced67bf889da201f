// src/portal/models.rs
use serde::{Deserialize, Deserializer};

/// Taxpayer grid lookup response.
/// Example endpoint: /TaxisPortal/FinancialStatement/Grid?pib=...
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxpayerGrid {
    pub tax_payer_rows: Vec<TaxpayerMatch>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxpayerMatch {
    /// Tax registry number as echoed back by the portal.
    pub pib: String,
    /// Registered name.
    pub naziv: String,
}

/// One page of the statement list response.
/// Example endpoint: /TaxisPortal/FinancialStatement/TaxPayerStatementsList?PIB=...
#[derive(Debug, Deserialize)]
pub struct StatementList {
    pub data: Vec<StatementRef>,
}

/// Reference to one filed statement, as listed by the portal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatementRef {
    /// Portal-assigned statement number ("Rbr" in the details endpoint).
    #[serde(rename = "FinStatementNumber")]
    pub number: String,
    /// Filing year. Older portal responses carry it as a JSON string,
    /// newer ones as a number.
    #[serde(deserialize_with = "year_from_json")]
    pub year: u16,
}

fn year_from_json<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawYear {
        Number(u16),
        Text(String),
    }

    match RawYear::deserialize(deserializer)? {
        RawYear::Number(year) => Ok(year),
        RawYear::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Which cached document a key refers to. Together with the entity this
/// forms the full document key used by the store and the fetcher.
#[derive(Debug, Clone)]
pub enum DocumentKind {
    EntityDetails,
    Statement(StatementRef),
}

impl DocumentKind {
    /// Human-readable key description for logs and errors.
    pub fn describe(&self) -> String {
        match self {
            DocumentKind::EntityDetails => "entity details".to_string(),
            DocumentKind::Statement(statement) => {
                format!("statement {} ({})", statement.number, statement.year)
            }
        }
    }
}
