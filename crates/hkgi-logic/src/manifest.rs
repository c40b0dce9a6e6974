//! The item and recipe manifest - read-only game content.
//!
//! The manifest is plain JSON (see `data/manifest.json`) and is served to
//! clients as-is. It holds:
//! - `items`: display metadata, the `usable` flag and what using the item does;
//! - `plant_titles`: display names per plant kind;
//! - `plant_recipes`: for each plant kind, the ordered list of recipes that
//!   can be crafted on a plot holding that kind.
//!
//! Content is validated once at load so the engine can trust it afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kinds::{Family, ItemKind, PlantKind};

/// Manifest shipped with the game.
const BUNDLED_MANIFEST: &str = include_str!("../../../data/manifest.json");

/// Allowed drift of a weighted table's total from 1.0 before we warn.
const WEIGHT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub items: BTreeMap<ItemKind, ItemDef>,
    pub plant_titles: BTreeMap<PlantKind, String>,
    pub plant_recipes: BTreeMap<PlantKind, Vec<Recipe>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub name: String,
    pub desc: String,
    #[serde(default)]
    pub usable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_use: Option<UseEffect>,
}

/// What happens when a usable item is consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseEffect {
    /// Credit a fixed bundle.
    Grant(BTreeMap<ItemKind, u64>),
    /// `slots` independent uniform picks from `candidates`.
    Roll {
        slots: u32,
        candidates: Vec<(ItemKind, u64)>,
    },
    /// Start an ephemeral status effect.
    Boost(BoostSpec),
    /// Append an empty plot.
    AddPlot,
}

/// Multiplier and duration range for a timed boost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostSpec {
    pub multiplier: f64,
    pub min_secs: u32,
    pub max_secs: u32,
    /// Family the boost is limited to; absent means every plant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Family>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub needs: BTreeMap<ItemKind, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_plant_to: Option<PlantKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make_item: Option<MakeItem>,
    /// Minimum plant level required to craft.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_level: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MakeItem {
    Item(ItemKind),
    /// `[probability, item]` pairs, drawn by cumulative weight.
    OneOf { one_of: Vec<(f64, ItemKind)> },
}

impl Manifest {
    /// The manifest compiled into the binary.
    pub fn bundled() -> Result<Self, ManifestError> {
        Self::from_json(BUNDLED_MANIFEST)
    }

    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let json = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn item(&self, item: ItemKind) -> Option<&ItemDef> {
        self.items.get(&item)
    }

    pub fn recipes(&self, kind: PlantKind) -> &[Recipe] {
        self.plant_recipes.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn recipe(&self, kind: PlantKind, index: usize) -> Option<&Recipe> {
        self.recipes(kind).get(index)
    }

    /// Reject content the engine cannot act on; warn on suspicious weights.
    pub fn validate(&self) -> Result<(), ManifestError> {
        for (item, def) in &self.items {
            match (&def.on_use, def.usable) {
                (None, true) => return Err(ManifestError::MissingEffect(*item)),
                (Some(_), false) => {
                    log::warn!("manifest: {item} has an on_use effect but is not usable");
                }
                _ => {}
            }
            match &def.on_use {
                Some(UseEffect::Roll { slots, candidates }) if *slots == 0 || candidates.is_empty() => {
                    return Err(ManifestError::EmptyRoll(*item));
                }
                Some(UseEffect::Boost(spec))
                    if spec.min_secs > spec.max_secs || !(spec.multiplier >= 0.0) =>
                {
                    return Err(ManifestError::BadBoost(*item));
                }
                _ => {}
            }
        }

        for (kind, recipes) in &self.plant_recipes {
            for (index, recipe) in recipes.iter().enumerate() {
                if kind.is_empty() && recipe.min_level.is_some() {
                    log::warn!("manifest: {kind} recipe {index} has a min_level dirt can never reach");
                }
                let Some(MakeItem::OneOf { one_of }) = &recipe.make_item else {
                    continue;
                };
                if one_of.is_empty() {
                    return Err(ManifestError::EmptyOutcomeTable { kind: *kind, index });
                }
                if one_of.iter().any(|(p, _)| !(*p >= 0.0)) {
                    return Err(ManifestError::NegativeWeight { kind: *kind, index });
                }
                let total: f64 = one_of.iter().map(|(p, _)| p).sum();
                if (total - 1.0).abs() > WEIGHT_EPSILON {
                    log::warn!(
                        "manifest: {kind} recipe {index} weights sum to {total}; \
                         draws past the table fall back to the last candidate"
                    );
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0} is usable but has no on_use effect")]
    MissingEffect(ItemKind),
    #[error("{0} rolls from an empty candidate list")]
    EmptyRoll(ItemKind),
    #[error("{0} has an invalid boost range or multiplier")]
    BadBoost(ItemKind),
    #[error("{kind} recipe {index} has an empty one_of table")]
    EmptyOutcomeTable { kind: PlantKind, index: usize },
    #[error("{kind} recipe {index} has a negative weight")]
    NegativeWeight { kind: PlantKind, index: usize },
}
