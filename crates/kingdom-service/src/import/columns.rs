//! Header recognition
//!
//! Exports from different tools label the same column differently. Headers
//! are normalized (lowercased, everything but letters and digits dropped)
//! before they are looked up in the alias table, so `Lord ID`, `lord_id` and
//! `LORDID` all land on the same column.

use std::collections::HashMap;

use kingdom_core::DomainError;

/// A column the importer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    LordId,
    Name,
    Alliance,
    Power,
    HighestPower,
    BuildingPower,
    HeroPower,
    LegionPower,
    TechPower,
    Merits,
    UnitsKilled,
    UnitsDead,
    UnitsHealed,
    T1Kills,
    T2Kills,
    T3Kills,
    T4Kills,
    T5Kills,
    Gold,
    Wood,
    Ore,
    Mana,
    Gems,
    GoldSpent,
    WoodSpent,
    OreSpent,
    ManaSpent,
    ResourcesGiven,
    ResourcesGivenCount,
    HelpsGiven,
    CityLevel,
    Division,
    Faction,
}

const ALIASES: &[(Column, &[&str])] = &[
    (Column::LordId, &["lordid", "id", "governorid", "playerid", "userid"]),
    (Column::Name, &["name", "lordname", "playername", "governorname", "nickname"]),
    (Column::Alliance, &["alliance", "alliancetag", "tag", "guild"]),
    (Column::Power, &["power", "currentpower", "totalpower"]),
    (Column::HighestPower, &["highestpower", "maxpower", "peakpower"]),
    (Column::BuildingPower, &["buildingpower", "buildpower"]),
    (Column::HeroPower, &["heropower"]),
    (Column::LegionPower, &["legionpower", "trooppower", "troopspower"]),
    (Column::TechPower, &["techpower", "researchpower"]),
    (Column::Merits, &["merits", "merit"]),
    (Column::UnitsKilled, &["unitskilled", "kills", "totalkills"]),
    (Column::UnitsDead, &["unitsdead", "dead", "deaths"]),
    (Column::UnitsHealed, &["unitshealed", "healed"]),
    (Column::T1Kills, &["t1kills", "t1kill", "t1"]),
    (Column::T2Kills, &["t2kills", "t2kill", "t2"]),
    (Column::T3Kills, &["t3kills", "t3kill", "t3"]),
    (Column::T4Kills, &["t4kills", "t4kill", "t4"]),
    (Column::T5Kills, &["t5kills", "t5kill", "t5"]),
    (Column::Gold, &["gold"]),
    (Column::Wood, &["wood"]),
    (Column::Ore, &["ore", "stone"]),
    (Column::Mana, &["mana"]),
    (Column::Gems, &["gems", "gem"]),
    (Column::GoldSpent, &["goldspent"]),
    (Column::WoodSpent, &["woodspent"]),
    (Column::OreSpent, &["orespent", "stonespent"]),
    (Column::ManaSpent, &["manaspent"]),
    (Column::ResourcesGiven, &["resourcesgiven", "rssgiven", "rssassistance"]),
    (Column::ResourcesGivenCount, &["resourcesgivencount", "rssgivencount"]),
    (Column::HelpsGiven, &["helpsgiven", "helps", "alliancehelps"]),
    (Column::CityLevel, &["citylevel", "city", "castlelevel", "castle"]),
    (Column::Division, &["division", "div"]),
    (Column::Faction, &["faction"]),
];

const REQUIRED: [(Column, &str); 3] = [
    (Column::LordId, "lordId"),
    (Column::Name, "name"),
    (Column::Power, "power"),
];

pub fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl Column {
    pub fn from_header(raw: &str) -> Option<Self> {
        let key = normalize_header(raw);
        ALIASES
            .iter()
            .find(|(_, aliases)| aliases.contains(&key.as_str()))
            .map(|(column, _)| *column)
    }
}

/// Column positions resolved from the header row
#[derive(Debug, Clone)]
pub struct HeaderMap {
    positions: HashMap<Column, usize>,
}

impl HeaderMap {
    /// Resolve a header row; the leftmost occurrence of a column wins
    pub fn resolve(cells: &[String]) -> Result<Self, DomainError> {
        let mut positions = HashMap::new();
        for (index, cell) in cells.iter().enumerate() {
            if let Some(column) = Column::from_header(cell) {
                positions.entry(column).or_insert(index);
            }
        }

        for (column, label) in REQUIRED {
            if !positions.contains_key(&column) {
                return Err(DomainError::MissingColumn(label));
            }
        }

        Ok(Self { positions })
    }

    /// Trimmed cell text for `column`, empty when absent
    pub fn cell<'a>(&self, column: Column, cells: &'a [String]) -> &'a str {
        self.positions
            .get(&column)
            .and_then(|&index| cells.get(index))
            .map_or("", |cell| cell.trim())
    }
}
