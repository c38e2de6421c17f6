use std::fmt;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::region::Region;
use crate::store::LevelStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotaItem {
    Rooms,
    Category(Category),
}

impl QuotaItem {
    pub const ALL: [QuotaItem; 10] = [
        QuotaItem::Rooms,
        QuotaItem::Category(Category::Guards),
        QuotaItem::Category(Category::Doors),
        QuotaItem::Category(Category::Gates),
        QuotaItem::Category(Category::Loose),
        QuotaItem::Category(Category::Raise),
        QuotaItem::Category(Category::Drop),
        QuotaItem::Category(Category::Chompers),
        QuotaItem::Category(Category::Spikes),
        QuotaItem::Category(Category::Potions),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rooms => "rooms",
            Self::Category(category) => category.as_str(),
        }
    }
}

impl fmt::Display for QuotaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaLine {
    pub item: QuotaItem,
    pub used: usize,
    pub allowed: usize,
}

impl QuotaLine {
    pub fn ok(&self) -> bool {
        self.used <= self.allowed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaReport {
    pub region: Region,
    pub lines: Vec<QuotaLine>,
}

impl QuotaReport {
    pub fn all_ok(&self) -> bool {
        self.lines.iter().all(QuotaLine::ok)
    }

    pub fn exceeded(&self) -> impl Iterator<Item = &QuotaLine> {
        self.lines.iter().filter(|line| !line.ok())
    }

    pub fn line(&self, item: QuotaItem) -> Option<&QuotaLine> {
        self.lines.iter().find(|line| line.item == item)
    }
}

pub fn quota_report(store: &LevelStore) -> QuotaReport {
    let allowances = &store.profile().allowances;
    let lines = QuotaItem::ALL
        .iter()
        .map(|&item| match item {
            QuotaItem::Rooms => QuotaLine {
                item,
                used: store.total_rooms(),
                allowed: allowances.rooms,
            },
            QuotaItem::Category(category) => QuotaLine {
                item,
                used: store.total(category),
                allowed: allowances.for_category(category),
            },
        })
        .collect();

    QuotaReport {
        region: store.region(),
        lines,
    }
}
