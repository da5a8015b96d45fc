//! Ore Kinds and Amounts
//!
//! The five fixed ore categories, their value weights, and the bounded
//! per-kind quantity vector carried through commitments and reveals.

use serde::{Deserialize, Serialize};

/// Largest quantity a single ore field (or a session's accrual counter)
/// may hold. Facade inputs arrive as wide integers and anything past this
/// bound is rejected, never truncated.
pub const MAX_ORE_AMOUNT: u32 = u8::MAX as u32;

/// Kind of minable ore.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OreKind {
    Gold = 0,     // common
    Emerald = 1,
    Ruby = 2,
    Sapphire = 3,
    Diamond = 4,  // rare, heaviest weight
}

impl OreKind {
    /// All kinds in canonical (index) order.
    pub const ALL: [OreKind; 5] = [
        OreKind::Gold,
        OreKind::Emerald,
        OreKind::Ruby,
        OreKind::Sapphire,
        OreKind::Diamond,
    ];

    /// Fixed value weight for this kind.
    ///
    /// The weighted sum over a claim's amounts is the claim's total value;
    /// the verifier holds every reveal to this function.
    pub fn weight(self) -> u32 {
        match self {
            OreKind::Gold => 1,
            OreKind::Emerald => 2,
            OreKind::Ruby => 3,
            OreKind::Sapphire => 5,
            OreKind::Diamond => 8,
        }
    }

    /// Get kind from index (0-4).
    pub fn from_index(index: u8) -> Option<OreKind> {
        match index {
            0 => Some(OreKind::Gold),
            1 => Some(OreKind::Emerald),
            2 => Some(OreKind::Ruby),
            3 => Some(OreKind::Sapphire),
            4 => Some(OreKind::Diamond),
            _ => None,
        }
    }
}

/// Per-kind ore quantities, each bounded to 0-255.
///
/// The bound is structural: fields are `u8`, so an out-of-range quantity
/// cannot be represented. Use [`OreAmounts::checked`] to validate wide
/// caller input at the engine boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OreAmounts([u8; 5]);

impl OreAmounts {
    /// Create from per-kind quantities in canonical order.
    pub const fn new(gold: u8, emerald: u8, ruby: u8, sapphire: u8, diamond: u8) -> Self {
        Self([gold, emerald, ruby, sapphire, diamond])
    }

    /// Validate wide caller input, in canonical kind order.
    ///
    /// Returns `None` if any quantity exceeds [`MAX_ORE_AMOUNT`].
    pub fn checked(raw: [u32; 5]) -> Option<Self> {
        let mut amounts = [0u8; 5];
        for (slot, value) in amounts.iter_mut().zip(raw) {
            if value > MAX_ORE_AMOUNT {
                return None;
            }
            *slot = value as u8;
        }
        Some(Self(amounts))
    }

    /// Quantity of a single kind.
    #[inline]
    pub fn get(&self, kind: OreKind) -> u8 {
        self.0[kind as usize]
    }

    /// Plain sum of all five quantities (the ore count settled into
    /// miner stats).
    pub fn count(&self) -> u32 {
        self.0.iter().map(|&a| a as u32).sum()
    }

    /// Deterministic total value: sum of each quantity times its kind's
    /// fixed weight.
    pub fn value(&self) -> u32 {
        OreKind::ALL
            .iter()
            .map(|&kind| self.get(kind) as u32 * kind.weight())
            .sum()
    }

    /// Raw quantities in canonical order.
    pub fn as_array(&self) -> [u8; 5] {
        self.0
    }

    /// True when every quantity is zero.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&a| a == 0)
    }
}
