//! Closed category lookups.
//!
//! The deck files identify unsimulated-generation sources by a numeric block
//! index and CADIC loads by a free-text label. Both are mapped here, once,
//! onto fixed output columns. Anything outside these tables is an error at the
//! call site, never a silently-created column.

use std::fmt;

use crate::columns;

// ---------------------------------------------------------------------------
// Unsimulated generation
// ---------------------------------------------------------------------------

/// Unsimulated-generation source categories, in deck block-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GenerationCategory {
    Pch,
    Pct,
    Eol,
    Ufv,
    PchMmgd,
    PctMmgd,
    EolMmgd,
    UfvMmgd,
}

impl GenerationCategory {
    pub const ALL: [GenerationCategory; 8] = [
        GenerationCategory::Pch,
        GenerationCategory::Pct,
        GenerationCategory::Eol,
        GenerationCategory::Ufv,
        GenerationCategory::PchMmgd,
        GenerationCategory::PctMmgd,
        GenerationCategory::EolMmgd,
        GenerationCategory::UfvMmgd,
    ];

    /// Deck block index (1-based).
    pub fn block_index(&self) -> i64 {
        match self {
            GenerationCategory::Pch => 1,
            GenerationCategory::Pct => 2,
            GenerationCategory::Eol => 3,
            GenerationCategory::Ufv => 4,
            GenerationCategory::PchMmgd => 5,
            GenerationCategory::PctMmgd => 6,
            GenerationCategory::EolMmgd => 7,
            GenerationCategory::UfvMmgd => 8,
        }
    }

    pub fn from_block_index(idx: i64) -> Option<Self> {
        GenerationCategory::ALL
            .into_iter()
            .find(|c| c.block_index() == idx)
    }

    /// Label used in long tables (`categoria` column) and by the deck.
    pub fn label(&self) -> &'static str {
        match self {
            GenerationCategory::Pch => "PCH",
            GenerationCategory::Pct => "PCT",
            GenerationCategory::Eol => "EOL",
            GenerationCategory::Ufv => "UFV",
            GenerationCategory::PchMmgd => "PCH MMGD",
            GenerationCategory::PctMmgd => "PCT MMGD",
            GenerationCategory::EolMmgd => "EOL MMGD",
            GenerationCategory::UfvMmgd => "UFV MMGD",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        let wanted = normalize_label(s);
        GenerationCategory::ALL
            .into_iter()
            .find(|c| c.label() == wanted)
    }

    /// Wide-table output column for this category.
    pub fn column(&self) -> &'static str {
        match self {
            GenerationCategory::Pch => columns::GERACAO_PCH,
            GenerationCategory::Pct => columns::GERACAO_PCT,
            GenerationCategory::Eol => columns::GERACAO_EOL,
            GenerationCategory::Ufv => columns::GERACAO_UFV,
            GenerationCategory::PchMmgd => columns::GERACAO_PCH_MMGD,
            GenerationCategory::PctMmgd => columns::GERACAO_PCT_MMGD,
            GenerationCategory::EolMmgd => columns::GERACAO_EOL_MMGD,
            GenerationCategory::UfvMmgd => columns::GERACAO_UFV_MMGD,
        }
    }

    pub fn is_distributed(&self) -> bool {
        matches!(
            self,
            GenerationCategory::PchMmgd
                | GenerationCategory::PctMmgd
                | GenerationCategory::EolMmgd
                | GenerationCategory::UfvMmgd
        )
    }
}

impl fmt::Display for GenerationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// CADIC additional loads
// ---------------------------------------------------------------------------

/// CADIC additional-load categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CadicCategory {
    ConsItaipu,
    Ande,
    MmgdSe,
    MmgdS,
    MmgdNe,
    MmgdN,
    BoaVista,
}

impl CadicCategory {
    pub const ALL: [CadicCategory; 7] = [
        CadicCategory::ConsItaipu,
        CadicCategory::Ande,
        CadicCategory::MmgdSe,
        CadicCategory::MmgdS,
        CadicCategory::MmgdNe,
        CadicCategory::MmgdN,
        CadicCategory::BoaVista,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CadicCategory::ConsItaipu => "CONS.ITAIPU",
            CadicCategory::Ande => "ANDE",
            CadicCategory::MmgdSe => "MMGD SE",
            CadicCategory::MmgdS => "MMGD S",
            CadicCategory::MmgdNe => "MMGD NE",
            CadicCategory::MmgdN => "MMGD N",
            CadicCategory::BoaVista => "BOA VISTA",
        }
    }

    /// Closed lookup from the deck's free-text label. Case and repeated
    /// whitespace are ignored; anything else must match exactly.
    pub fn from_label(s: &str) -> Option<Self> {
        let wanted = normalize_label(s);
        CadicCategory::ALL.into_iter().find(|c| c.label() == wanted)
    }

    pub fn column(&self) -> &'static str {
        match self {
            CadicCategory::ConsItaipu => columns::CONST_ITAIPU,
            CadicCategory::Ande => columns::ANDE,
            CadicCategory::MmgdSe => columns::MMGD_SE,
            CadicCategory::MmgdS => columns::MMGD_S,
            CadicCategory::MmgdNe => columns::MMGD_NE,
            CadicCategory::MmgdN => columns::MMGD_N,
            CadicCategory::BoaVista => columns::BOA_VISTA,
        }
    }
}

impl fmt::Display for CadicCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize_label(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}
