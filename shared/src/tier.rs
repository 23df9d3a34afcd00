use std::{borrow::Cow, fmt::Debug, hash::Hash};

use crate::TierName;

/// A classifier carried by a tier. A target "needs" a tier when it carries
/// that tier's tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TierTag(Cow<'static, str>);

impl TierTag {
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub mod tags {
    use super::TierTag;

    pub static NEEDS_WOOD_TOOL: TierTag = TierTag::from_static("forge:needs_wood_tool");
    pub static NEEDS_GOLD_TOOL: TierTag = TierTag::from_static("forge:needs_gold_tool");
    pub static NEEDS_STONE_TOOL: TierTag = TierTag::from_static("minecraft:needs_stone_tool");
    pub static NEEDS_IRON_TOOL: TierTag = TierTag::from_static("minecraft:needs_iron_tool");
    pub static NEEDS_DIAMOND_TOOL: TierTag = TierTag::from_static("minecraft:needs_diamond_tool");
    pub static NEEDS_NETHERITE_TOOL: TierTag = TierTag::from_static("forge:needs_netherite_tool");
}

/// One ranked level supplied by the surrounding domain model. Tiers are
/// compared by value, so two handles to the same material must be equal.
pub trait Tier: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Numeric level consulted only when the tier has no registered name
    fn level(&self) -> u32;

    fn tag(&self) -> Option<&TierTag>;
}

/// Something a tier is tested against, e.g. a block state
pub trait TierTarget {
    fn has_tag(&self, tag: &TierTag) -> bool;

    /// Policy for tiers outside the sorted order: the base game's three
    /// thresholds (diamond needs 3, iron needs 2, stone needs 1)
    fn is_correct_level(&self, level: u32) -> bool {
        if level < 3 && self.has_tag(&tags::NEEDS_DIAMOND_TOOL) {
            return false;
        }
        if level < 2 && self.has_tag(&tags::NEEDS_IRON_TOOL) {
            return false;
        }
        if level < 1 && self.has_tag(&tags::NEEDS_STONE_TOOL) {
            return false;
        }
        true
    }
}

/// Base progression levels, registered before anything else
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VanillaTier {
    Wood,
    Stone,
    Iron,
    Diamond,
    Gold,
    Netherite,
}

impl VanillaTier {
    /// Registration order of the seed chain
    pub const ALL: [VanillaTier; 6] = [
        VanillaTier::Wood,
        VanillaTier::Stone,
        VanillaTier::Iron,
        VanillaTier::Diamond,
        VanillaTier::Netherite,
        VanillaTier::Gold,
    ];

    /// Order produced by sorting the seed chain alone
    pub const SORTED: [VanillaTier; 6] = [
        VanillaTier::Wood,
        VanillaTier::Gold,
        VanillaTier::Stone,
        VanillaTier::Iron,
        VanillaTier::Diamond,
        VanillaTier::Netherite,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            VanillaTier::Wood => "wood",
            VanillaTier::Stone => "stone",
            VanillaTier::Iron => "iron",
            VanillaTier::Diamond => "diamond",
            VanillaTier::Gold => "gold",
            VanillaTier::Netherite => "netherite",
        }
    }

    pub fn name(&self) -> TierName {
        TierName::builtin(self.path())
    }

    pub(crate) fn afters(&self) -> &'static [VanillaTier] {
        match self {
            VanillaTier::Wood => &[],
            VanillaTier::Stone => &[VanillaTier::Wood],
            VanillaTier::Iron => &[VanillaTier::Stone],
            VanillaTier::Diamond => &[VanillaTier::Iron],
            VanillaTier::Netherite => &[VanillaTier::Diamond],
            VanillaTier::Gold => &[VanillaTier::Wood],
        }
    }

    pub(crate) fn befores(&self) -> &'static [VanillaTier] {
        match self {
            VanillaTier::Gold => &[VanillaTier::Stone],
            _ => &[],
        }
    }
}

impl Tier for VanillaTier {
    fn level(&self) -> u32 {
        match self {
            VanillaTier::Wood | VanillaTier::Gold => 0,
            VanillaTier::Stone => 1,
            VanillaTier::Iron => 2,
            VanillaTier::Diamond => 3,
            VanillaTier::Netherite => 4,
        }
    }

    fn tag(&self) -> Option<&TierTag> {
        Some(match self {
            VanillaTier::Wood => &tags::NEEDS_WOOD_TOOL,
            VanillaTier::Gold => &tags::NEEDS_GOLD_TOOL,
            VanillaTier::Stone => &tags::NEEDS_STONE_TOOL,
            VanillaTier::Iron => &tags::NEEDS_IRON_TOOL,
            VanillaTier::Diamond => &tags::NEEDS_DIAMOND_TOOL,
            VanillaTier::Netherite => &tags::NEEDS_NETHERITE_TOOL,
        })
    }
}
