//! Shared matching target for synergies and equipment bonuses.
//! Serialized as a bare string: `all`, `fourth_position`, a tag name or an element name.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::unit::{Element, UnitTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Target {
    All,
    FourthPosition,
    Tag(UnitTag),
    Element(Element),
}

impl From<Target> for String {
    fn from(value: Target) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Target {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Target::parse(&value).ok_or_else(|| format!("unknown target '{value}'"))
    }
}

impl Target {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        match trimmed {
            "all" => return Some(Self::All),
            "fourth_position" => return Some(Self::FourthPosition),
            _ => {}
        }
        if let Some(tag) = UnitTag::ALL.into_iter().find(|t| t.as_str() == trimmed) {
            return Some(Self::Tag(tag));
        }
        Element::ALL
            .into_iter()
            .find(|e| e.as_str() == trimmed)
            .map(Self::Element)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::FourthPosition => f.write_str("fourth_position"),
            Self::Tag(tag) => f.write_str(tag.as_str()),
            Self::Element(element) => f.write_str(element.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_form() {
        assert_eq!(Target::parse("all"), Some(Target::All));
        assert_eq!(Target::parse("fourth_position"), Some(Target::FourthPosition));
        assert_eq!(
            Target::parse("Corps à corps"),
            Some(Target::Tag(UnitTag::CorpsACorps))
        );
        assert_eq!(Target::parse("Ténèbre"), Some(Target::Element(Element::Tenebre)));
        assert_eq!(Target::parse("nowhere"), None);
    }

    #[test]
    fn rejects_unknown_target_on_deserialize() {
        let err = serde_json::from_str::<Target>("\"Glace\"");
        assert!(err.is_err());
    }
}
