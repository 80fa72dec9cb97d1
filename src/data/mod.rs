pub mod bonus;
pub mod boss;
pub mod catalog;
pub mod rank;
pub mod synergy;
pub mod target;
pub mod unit;
pub mod validate;

pub use bonus::{BonusDefinition, BonusEffect, BonusRule, BonusStat, DynamicEffect, TriggerCondition};
pub use boss::{BossDefinition, BossMechanic};
pub use catalog::{BossRankBinding, Catalog, CatalogError};
pub use rank::{Rank, Tier};
pub use synergy::{Requirement, SynergyBonusKind, SynergyDefinition};
pub use target::Target;
pub use unit::{has_tag, Element, Rarity, TagSet, UnitDefinition, UnitTag};
pub use validate::{validate_catalog, ValidationDiagnostic, ValidationReport, ValidationSeverity};
