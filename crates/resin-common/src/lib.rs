//! # Resin Common
//!
//! Shared types and the error taxonomy for the resin planner.
//!
//! This crate provides the vocabulary every other crate speaks:
//! - Elements and stat kinds (with lenient label parsing)
//! - Ability slots, equipment slots and weapon classes
//! - Upgrade material tiers
//! - Configuration, parse and top-level error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod element;
pub mod error;
pub mod material;
pub mod slot;
pub mod stat;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::element::*;
    pub use crate::error::*;
    pub use crate::material::*;
    pub use crate::slot::*;
    pub use crate::stat::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_material_values_cascade() {
        assert_eq!(MaterialTier::Guides.value(), 3 * MaterialTier::Teachings.value());
        assert_eq!(MaterialTier::Philosophies.value(), 3 * MaterialTier::Guides.value());
    }

    #[test]
    fn test_stat_kind_serde_uses_labels() {
        #[derive(serde::Deserialize)]
        struct Row {
            stat: StatKind,
        }
        let row: Row = toml::from_str("stat = \"Hydro DMG Bonus%\"").expect("valid toml");
        assert_eq!(row.stat, StatKind::DamageBonus(Element::Hydro));
    }

    proptest! {
        #[test]
        fn test_label_parsing_never_panics(label in ".{0,24}") {
            let _ = StatKind::from_label(&label);
        }
    }
}
