//! Row conversion into the canonical player-row format

use kingdom_core::{AllianceTag, DomainError, LordId, PlayerStats};

use super::columns::{Column, HeaderMap};
use super::reader::RawRow;

/// One validated spreadsheet row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based row number in the source file
    pub row_number: usize,
    pub lord_id: LordId,
    pub name: String,
    pub alliance: Option<AllianceTag>,
    pub stats: PlayerStats,
}

/// Parse a whole-number cell
///
/// Thousands separators (`,`, `_`, whitespace) are ignored and integral
/// decimals such as `1234.0` are accepted. Blank cells read as zero.
pub fn parse_count(raw: &str) -> Result<i64, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '_') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Ok(0);
    }
    if let Ok(value) = cleaned.parse::<i64>() {
        return Ok(value);
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract().abs() < f64::EPSILON && value.abs() < 9.0e18 => {
            Ok(value as i64)
        }
        _ => Err(format!("'{}' is not a whole number", raw.trim())),
    }
}

fn invalid(row: usize, reason: impl Into<String>) -> DomainError {
    DomainError::InvalidRow {
        row,
        reason: reason.into(),
    }
}

/// Convert one non-blank raw row
pub fn parse_row(header: &HeaderMap, raw: &RawRow) -> Result<ParsedRow, DomainError> {
    let number = raw.number;
    let cells = raw.cells.as_slice();

    let lord_id = LordId::parse(header.cell(Column::LordId, cells))
        .map_err(|e| invalid(number, e.to_string()))?;

    let name = header.cell(Column::Name, cells);
    if name.is_empty() {
        return Err(invalid(number, "name is missing"));
    }

    let power_cell = header.cell(Column::Power, cells);
    if power_cell.is_empty() {
        return Err(invalid(number, "power is missing"));
    }

    let count = |column: Column| -> Result<i64, DomainError> {
        parse_count(header.cell(column, cells))
            .map_err(|reason| invalid(number, format!("{column:?}: {reason}")))
    };
    let level = |column: Column| -> Result<i32, DomainError> {
        let value = count(column)?;
        i32::try_from(value).map_err(|_| invalid(number, format!("{column:?}: {value} is out of range")))
    };

    let faction = header.cell(Column::Faction, cells);
    let stats = PlayerStats {
        power: count(Column::Power)?,
        highest_power: count(Column::HighestPower)?,
        building_power: count(Column::BuildingPower)?,
        hero_power: count(Column::HeroPower)?,
        legion_power: count(Column::LegionPower)?,
        tech_power: count(Column::TechPower)?,
        merits: count(Column::Merits)?,
        units_killed: count(Column::UnitsKilled)?,
        units_dead: count(Column::UnitsDead)?,
        units_healed: count(Column::UnitsHealed)?,
        t1_kills: count(Column::T1Kills)?,
        t2_kills: count(Column::T2Kills)?,
        t3_kills: count(Column::T3Kills)?,
        t4_kills: count(Column::T4Kills)?,
        t5_kills: count(Column::T5Kills)?,
        gold: count(Column::Gold)?,
        wood: count(Column::Wood)?,
        ore: count(Column::Ore)?,
        mana: count(Column::Mana)?,
        gems: count(Column::Gems)?,
        gold_spent: count(Column::GoldSpent)?,
        wood_spent: count(Column::WoodSpent)?,
        ore_spent: count(Column::OreSpent)?,
        mana_spent: count(Column::ManaSpent)?,
        resources_given: count(Column::ResourcesGiven)?,
        resources_given_count: count(Column::ResourcesGivenCount)?,
        helps_given: count(Column::HelpsGiven)?,
        city_level: level(Column::CityLevel)?,
        division: level(Column::Division)?,
        faction: (!faction.is_empty()).then(|| faction.to_string()),
    };

    Ok(ParsedRow {
        row_number: number,
        lord_id,
        name: name.to_string(),
        alliance: AllianceTag::normalize(Some(header.cell(Column::Alliance, cells))),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(ToString::to_string).collect()
    }

    fn header() -> HeaderMap {
        HeaderMap::resolve(&strings(&["Lord ID", "Name", "Alliance", "Power", "City Level", "Faction"]))
            .unwrap()
    }

    fn raw(number: usize, cells: &[&str]) -> RawRow {
        RawRow {
            number,
            cells: strings(cells),
        }
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("12,345,678"), Ok(12_345_678));
        assert_eq!(parse_count("1_000"), Ok(1000));
        assert_eq!(parse_count(" 5 000 000 "), Ok(5_000_000));
        assert_eq!(parse_count("1234.0"), Ok(1234));
        assert_eq!(parse_count(""), Ok(0));
        assert!(parse_count("12.5").is_err());
        assert!(parse_count("lots").is_err());
    }

    #[test]
    fn test_parse_row() {
        let row = parse_row(&header(), &raw(2, &["1001", "Aldric", "KOR", "52,000,000", "25", ""])).unwrap();
        assert_eq!(row.row_number, 2);
        assert_eq!(row.lord_id, LordId::new(1001));
        assert_eq!(row.alliance.as_ref().map(AllianceTag::as_str), Some("KOR"));
        assert_eq!(row.stats.power, 52_000_000);
        assert_eq!(row.stats.city_level, 25);
        assert_eq!(row.stats.units_killed, 0);
        assert!(row.stats.faction.is_none());
    }

    #[test]
    fn test_empty_alliance_is_none() {
        let row = parse_row(&header(), &raw(3, &["1002", "Brenna", "  ", "10", "", "Elves"])).unwrap();
        assert!(row.alliance.is_none());
        assert_eq!(row.stats.faction.as_deref(), Some("Elves"));
    }

    #[test]
    fn test_invalid_cells_report_row_number() {
        let err = parse_row(&header(), &raw(7, &["abc", "X", "", "10", "", ""])).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRow { row: 7, .. }));

        let err = parse_row(&header(), &raw(8, &["5", "X", "", "ten", "", ""])).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRow { row: 8, .. }));

        let err = parse_row(&header(), &raw(9, &["5", "", "", "10", "", ""])).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRow { row: 9, .. }));

        let err = parse_row(&header(), &raw(10, &["5", "X", "", "", "", ""])).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRow { row: 10, .. }));
    }
}
