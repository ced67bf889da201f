// src/config.rs
use std::path::Path;

use serde::Deserialize;

use crate::utils::error::AppError;

/// One legal entity the run collects statements for. The list is fixed for
/// the lifetime of a run; nothing mutates it after startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Entity {
    /// National tax registry number (PIB).
    #[serde(rename = "taxId")]
    pub tax_id: String,
    /// Display name, also used as the cache folder name.
    pub name: String,
}

/// Built-in entity list, kept in its historical order so reports stay
/// comparable between runs.
const DEFAULT_ENTITIES: &[(&str, &str)] = &[
    ("03014215", "Coinis"),
    ("02686473", "Domen"),
    ("02775018", "CoreIT"),
    ("02632284", "Logate"),
    ("02783061", "Bild Studio"),
    ("02907259", "Amplitudo"),
    ("03073572", "Datum Solutions"),
    ("02713098", "Poslovna Inteligencija"),
    ("03037258", "International Bridge"),
    ("02731517", "Fleka"),
    ("02679744", "Datalab"),
    ("03167453", "Omnitech"),
    ("03131343", "SynergySuite"),
    ("03122123", "Alicorn"),
    ("03066258", "Codingo"),
    ("03274357", "Uhura Solutions"),
    ("02246244", "Winsoft"),
    ("02177579", "Cikom"),
    ("02961717", "Media Monkeys"),
    ("03091627", "Codeus"),
    ("03084434", "Digital Control"),
    ("03165663", "Ridgemax"),
    ("03360962", "Infinum"),
    ("03191451", "Kodio"),
    ("03381447", "EPAM"),
    ("03413772", "First Line Software"),
    ("03374700", "Vega IT Omega"),
    ("03373398", "Quantox Technology"),
    ("03216446", "Ooblee"),
    ("03209296", "BIXBIT"),
    ("03367053", "GoldBear Technologies"),
    ("03421198", "G5 Entertainment"),
    ("03428184", "Tungsten Montenegro"),
    ("03110222", "BGS Consulting"),
    ("03413381", "Artec 3D Adriatica"),
    ("03413616", "Customertimes Montenegro"),
    ("03200116", "Codepixel"),
    ("03403912", "Codemine"),
    ("03418545", "Belka"),
    ("03489159", "Playrix"),
    ("03424804", "FSTR"),
    ("03442586", "Arctic 7"),
];

pub fn default_entities() -> Vec<Entity> {
    DEFAULT_ENTITIES
        .iter()
        .map(|(tax_id, name)| Entity {
            tax_id: (*tax_id).to_string(),
            name: (*name).to_string(),
        })
        .collect()
}

/// Loads an entity list from a JSON file: an ordered array of
/// `{"taxId": "...", "name": "..."}` objects. Any problem here is fatal for
/// the run - without a valid entity list there is nothing to process.
pub fn load_entities(path: &Path) -> Result<Vec<Entity>, AppError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read entity list {}: {}", path.display(), e)))?;
    let entities: Vec<Entity> = serde_json::from_str(&raw)
        .map_err(|e| AppError::Config(format!("invalid entity list {}: {}", path.display(), e)))?;
    if entities.is_empty() {
        return Err(AppError::Config(format!(
            "entity list {} contains no entities",
            path.display()
        )));
    }
    Ok(entities)
}
