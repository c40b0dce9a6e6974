//! Closed tags for plant kinds, plant families and item kinds.
//!
//! Every tag has one canonical lowercase string form (`"bbc"`,
//! `"hvv_essence"`, `"powder_t2"`) used by the manifest, save files and the
//! client read model. Parsing an unknown string is an error rather than a
//! silently-empty lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Three-letter plant family. Items and standing boosts are scoped to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Family {
    /// Bractus - bread-themed cactus.
    Bbc,
    /// H4CK3R V1B3Z V1N3.
    Hvv,
    /// Coffea Cyl plant.
    Cyl,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Bbc, Family::Hvv, Family::Cyl];

    pub fn as_str(self) -> &'static str {
        match self {
            Family::Bbc => "bbc",
            Family::Hvv => "hvv",
            Family::Cyl => "cyl",
        }
    }
}

/// What occupies a plot. `Dirt` is the reserved empty tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PlantKind {
    Dirt,
    Grown(Family),
}

impl PlantKind {
    pub const ALL: [PlantKind; 4] = [
        PlantKind::Dirt,
        PlantKind::Grown(Family::Bbc),
        PlantKind::Grown(Family::Hvv),
        PlantKind::Grown(Family::Cyl),
    ];

    /// The plant's family, `None` for dirt.
    pub fn family(self) -> Option<Family> {
        match self {
            PlantKind::Dirt => None,
            PlantKind::Grown(family) => Some(family),
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, PlantKind::Dirt)
    }
}

/// Tier of a powder or bag item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    T1,
    T2,
    T3,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::T1, Tier::T2, Tier::T3];

    fn suffix(self) -> &'static str {
        match self {
            Tier::T1 => "t1",
            Tier::T2 => "t2",
            Tier::T3 => "t3",
        }
    }

    fn from_suffix(s: &str) -> Option<Tier> {
        match s {
            "t1" => Some(Tier::T1),
            "t2" => Some(Tier::T2),
            "t3" => Some(Tier::T3),
            _ => None,
        }
    }
}

/// Every item a stead can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ItemKind {
    /// Harvested from a plant on each yield event.
    Essence(Family),
    /// Five essences pressed together; egg ingredient.
    Compressence(Family),
    /// Usable: rolls a bundle of other families' goodies.
    Egg(Family),
    /// Plants a dirt plot with this family.
    Seed(Family),
    /// Equipment: a standing boost for every plant of this family.
    Booster(Family),
    /// Usable starter bundle.
    NestEgg,
    /// Usable: temporary growth boost.
    Powder(Tier),
    /// Usable: random bundle, dropped by high-level plants.
    Bag(Tier),
    /// Usable: adds an empty plot.
    LandDeed,
}

impl ItemKind {
    /// Family this item belongs to, if it is family-specific.
    pub fn family(self) -> Option<Family> {
        match self {
            ItemKind::Essence(f)
            | ItemKind::Compressence(f)
            | ItemKind::Egg(f)
            | ItemKind::Seed(f)
            | ItemKind::Booster(f) => Some(f),
            _ => None,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PlantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlantKind::Dirt => f.write_str("dirt"),
            PlantKind::Grown(family) => f.write_str(family.as_str()),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Essence(fam) => write!(f, "{fam}_essence"),
            ItemKind::Compressence(fam) => write!(f, "{fam}_compressence"),
            ItemKind::Egg(fam) => write!(f, "{fam}_egg"),
            ItemKind::Seed(fam) => write!(f, "{fam}_seed"),
            ItemKind::Booster(fam) => write!(f, "{fam}_item"),
            ItemKind::NestEgg => f.write_str("nest_egg"),
            ItemKind::Powder(tier) => write!(f, "powder_{}", tier.suffix()),
            ItemKind::Bag(tier) => write!(f, "bag_{}", tier.suffix()),
            ItemKind::LandDeed => f.write_str("land_deed"),
        }
    }
}

impl FromStr for Family {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bbc" => Ok(Family::Bbc),
            "hvv" => Ok(Family::Hvv),
            "cyl" => Ok(Family::Cyl),
            _ => Err(GameError::UnknownItem(s.to_string())),
        }
    }
}

impl FromStr for PlantKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "dirt" {
            return Ok(PlantKind::Dirt);
        }
        s.parse::<Family>().map(PlantKind::Grown)
    }
}

impl FromStr for ItemKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || GameError::UnknownItem(s.to_string());
        match s {
            "nest_egg" => return Ok(ItemKind::NestEgg),
            "land_deed" => return Ok(ItemKind::LandDeed),
            _ => {}
        }

        let (head, tail) = s.split_once('_').ok_or_else(unknown)?;
        match head {
            "powder" => return Tier::from_suffix(tail).map(ItemKind::Powder).ok_or_else(unknown),
            "bag" => return Tier::from_suffix(tail).map(ItemKind::Bag).ok_or_else(unknown),
            _ => {}
        }

        let family: Family = head.parse().map_err(|_| unknown())?;
        match tail {
            "essence" => Ok(ItemKind::Essence(family)),
            "compressence" => Ok(ItemKind::Compressence(family)),
            "egg" => Ok(ItemKind::Egg(family)),
            "seed" => Ok(ItemKind::Seed(family)),
            "item" => Ok(ItemKind::Booster(family)),
            _ => Err(unknown()),
        }
    }
}

macro_rules! string_serde {
    ($($ty:ty),*) => {$(
        impl TryFrom<String> for $ty {
            type Error = GameError;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> String {
                value.to_string()
            }
        }
    )*};
}

string_serde!(Family, PlantKind, ItemKind);
