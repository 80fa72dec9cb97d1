use std::collections::HashSet;
use std::fmt;

use crate::data::bonus::{BonusRule, TriggerCondition};
use crate::data::catalog::Catalog;
use crate::data::target::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
    }
}

fn check_unique<'a>(
    report: &mut ValidationReport,
    kind: &str,
    keys: impl IntoIterator<Item = &'a str>,
) {
    let mut seen = HashSet::new();
    for key in keys {
        if key.trim().is_empty() {
            report.push(ValidationSeverity::Error, kind, "empty key");
        } else if !seen.insert(key) {
            report.push(
                ValidationSeverity::Error,
                format!("{kind} '{key}'"),
                "duplicate key",
            );
        }
    }
}

pub fn validate_catalog(catalog: &Catalog) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_unique(&mut report, "unit", catalog.units.iter().map(|u| u.name.as_str()));
    check_unique(
        &mut report,
        "synergy",
        catalog.synergies.iter().map(|s| s.name.as_str()),
    );
    check_unique(&mut report, "bonus", catalog.bonuses.iter().map(|b| b.id.as_str()));
    check_unique(&mut report, "boss", catalog.bosses.iter().map(|b| b.name.as_str()));

    for unit in &catalog.units {
        let context = format!("unit '{}'", unit.name);
        if unit.tags.is_empty() {
            report.push(ValidationSeverity::Error, &context, "unit has no type tag");
        }
        if unit.damage < 0 || unit.multiplier < 0 {
            report.push(ValidationSeverity::Error, &context, "negative damage or multiplier");
        }
        if unit.element.is_none() {
            report.push(ValidationSeverity::Info, &context, "no element");
        }
    }

    for synergy in &catalog.synergies {
        let context = format!("synergy '{}'", synergy.name);
        if synergy.target == Target::FourthPosition {
            report.push(
                ValidationSeverity::Error,
                &context,
                "fourth_position is only valid for equipment bonuses",
            );
        }
        if synergy.base_damage == 0 && synergy.base_multiplier == 0 {
            report.push(ValidationSeverity::Warning, &context, "grants nothing");
        }
    }

    for bonus in &catalog.bonuses {
        let context = format!("bonus '{}'", bonus.id);
        for group in bonus.fusion_groups() {
            if group.len() < 2 {
                report.push(
                    ValidationSeverity::Error,
                    &context,
                    "fusion_element needs at least two elements",
                );
            }
        }
        match &bonus.rule {
            BonusRule::Position { base, .. } if bonus.target != Target::FourthPosition => {
                report.push(
                    ValidationSeverity::Warning,
                    &context,
                    format!("position rule (base {base}) should target fourth_position"),
                );
            }
            BonusRule::Dynamic { effects } => {
                if effects.is_empty() {
                    report.push(ValidationSeverity::Warning, &context, "dynamic bonus has no effect");
                }
                for effect in effects {
                    if let TriggerCondition::SynergyTrigger(name) = &effect.condition {
                        if catalog.synergy(name).is_none() {
                            report.push(
                                ValidationSeverity::Error,
                                &context,
                                format!("synergy_trigger references unknown synergy '{name}'"),
                            );
                        }
                    }
                }
            }
            _ => {}
        }
    }

    for boss in &catalog.bosses {
        if boss.base_target <= 0 {
            report.push(
                ValidationSeverity::Error,
                format!("boss '{}'", boss.name),
                "base_target must be positive",
            );
        }
    }

    for binding in &catalog.boss_ranks {
        let context = format!("boss rank {}", binding.rank);
        if !binding.rank.is_boss_rank() {
            report.push(ValidationSeverity::Warning, &context, "rank is not a boss rank");
        }
        if catalog.boss(&binding.boss).is_none() {
            report.push(
                ValidationSeverity::Error,
                &context,
                format!("unknown boss '{}'", binding.boss),
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bonus::{BonusDefinition, BonusEffect};
    use crate::data::unit::Element;

    #[test]
    fn builtin_catalog_has_no_errors() {
        let report = validate_catalog(&Catalog::builtin());
        let errors: Vec<_> = report.errors().collect();
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn flags_duplicates_and_broken_references() {
        let mut catalog = Catalog::builtin();
        let first = catalog.units[0].clone();
        catalog.units.push(first);
        catalog.bonuses.push(BonusDefinition {
            id: "fusion_solo".to_string(),
            name: "Solo".to_string(),
            description: String::new(),
            target: Target::All,
            rule: BonusRule::None,
            effects: vec![BonusEffect::FusionElement {
                elements: vec![Element::Feu],
            }],
        });
        if let Some(binding) = catalog.boss_ranks.first_mut() {
            binding.boss = "Personne".to_string();
        }

        let report = validate_catalog(&catalog);
        let messages: Vec<String> = report.errors().map(ToString::to_string).collect();
        assert!(report.has_errors());
        assert!(messages.iter().any(|m| m.contains("duplicate key")));
        assert!(messages.iter().any(|m| m.contains("at least two elements")));
        assert!(messages.iter().any(|m| m.contains("unknown boss 'Personne'")));
    }
}
