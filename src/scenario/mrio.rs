//! MRIO (ICIO) coefficient ingestion
//!
//! Reads an OECD ICIO-style supply-use matrix: rows and columns are
//! `COUNTRY_SECTOR` labels, with special rows `VA` (value added), `TLS`
//! (taxes less subsidies) and `OUT` (total output), and final-demand
//! columns (`HFCE`, `NPISH`, `GGFC`, `GFCF`, `INVNT`, `DPABR`) per
//! country. The top-left header cell is `V1`.
//!
//! Two products come out of a parsed table:
//! - per-country technical coefficients `A[i,j] = Z[i,j] / X[j]` (zero
//!   where `X[j] = 0`), aggregated from ISIC sectors to the 12 simulation
//!   commodities by a many-to-one mapping supplied as data;
//! - bilateral base trade volumes, from the cross-country flows.
//!
//! Columns whose output would make an aggregated coefficient column sum
//! reach 1 are rescaled to [`MAX_COLUMN_SUM`]; real ICIO data stays well
//! below that, so the rescale only fires on degenerate inputs.

use crate::models::coefficients::TechnicalCoefficientMatrix;
use crate::models::commodity::{Commodity, COMMODITY_COUNT};
use std::collections::HashMap;
use thiserror::Error;

/// Ceiling applied to aggregated coefficient column sums.
pub const MAX_COLUMN_SUM: f64 = 0.99;

/// Final-demand column tags (the sector part of `COUNTRY_TAG` labels).
const FINAL_DEMAND_TAGS: [&str; 6] = ["HFCE", "NPISH", "GGFC", "GFCF", "INVNT", "DPABR"];

/// Errors raised while parsing or aggregating MRIO data.
#[derive(Debug, Error, PartialEq)]
pub enum MrioError {
    #[error("table is empty")]
    Empty,

    #[error("header cell is {0:?}, expected \"V1\"")]
    BadHeader(String),

    #[error("row {row} has {len} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("missing OUT (total output) row")]
    MissingOutRow,

    #[error("cell ({row}, {col}) is not a number: {value:?}")]
    BadNumber {
        row: usize,
        col: usize,
        value: String,
    },

    #[error("sector {0:?} has no commodity mapping")]
    UnmappedSector(String),

    #[error("unknown country {0:?}")]
    UnknownCountry(String),
}

/// Many-to-one mapping from ISIC sector codes to simulation commodities.
#[derive(Debug, Clone, Default)]
pub struct SectorMap {
    entries: HashMap<String, Commodity>,
}

impl SectorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[(&str, Commodity)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(code, commodity)| (code.to_string(), *commodity))
                .collect(),
        }
    }

    pub fn insert(&mut self, sector: &str, commodity: Commodity) {
        self.entries.insert(sector.to_string(), commodity);
    }

    pub fn get(&self, sector: &str) -> Option<Commodity> {
        self.entries.get(sector).copied()
    }

    /// Mapping for the OECD ICIO Rev.4 sector codes.
    ///
    /// Coal, Uranium and RareEarths have no clean ICIO counterpart; their
    /// coefficients stay zero and come from scenario data instead.
    pub fn default_icio() -> Self {
        use Commodity::*;
        Self::from_pairs(&[
            ("A01_02", Agriculture),
            ("A03", Agriculture),
            ("B05_06", Petroleum),
            ("B07_08", Ore),
            ("B09", Ore),
            ("C10T12", ConsumerGoods),
            ("C13T15", ConsumerGoods),
            ("C16", IndustrialGoods),
            ("C17_18", ConsumerGoods),
            ("C19", Petroleum),
            ("C20", IndustrialGoods),
            ("C21", ConsumerGoods),
            ("C22", IndustrialGoods),
            ("C23", IndustrialGoods),
            ("C24", IndustrialGoods),
            ("C25", IndustrialGoods),
            ("C26", Electronics),
            ("C27", Electronics),
            ("C28", IndustrialGoods),
            ("C29", ConsumerGoods),
            ("C30", MilitaryGoods),
            ("C31T33", ConsumerGoods),
            ("D", Electricity),
            ("E", Services),
            ("F", Services),
            ("G", Services),
            ("H49", Services),
            ("H50", Services),
            ("H51", Services),
            ("H52", Services),
            ("H53", Services),
            ("I", Services),
            ("J58T60", Services),
            ("J61", Services),
            ("J62_63", Services),
            ("K", Services),
            ("L", Services),
            ("M", Services),
            ("N", Services),
            ("O", Services),
            ("P", Services),
            ("Q", Services),
            ("R", Services),
            ("S", Services),
            ("T", Services),
            ("U", Services),
        ])
    }
}

/// A column of the parsed table.
#[derive(Debug, Clone, PartialEq)]
enum ColumnKind {
    /// `COUNTRY_SECTOR` intermediate-use column.
    Sector { country: String, sector: String },
    /// `COUNTRY_TAG` final-demand column.
    FinalDemand { country: String },
}

/// Parsed ICIO table: intermediate flows plus the total-output row.
#[derive(Debug, Clone)]
pub struct MrioTable {
    /// Row labels (`COUNTRY_SECTOR` of the supplying sector).
    row_labels: Vec<(String, String)>,
    columns: Vec<ColumnKind>,
    /// Flows, row-major over (row_labels × columns).
    flows: Vec<f64>,
    /// Total output per column (from the OUT row); final-demand columns
    /// carry 0.
    output: Vec<f64>,
}

/// Split a `COUNTRY_SECTOR` label at the first underscore.
fn split_label(label: &str) -> Option<(&str, &str)> {
    let idx = label.find('_')?;
    Some((&label[..idx], &label[idx + 1..]))
}

fn parse_cell(raw: &str, row: usize, col: usize) -> Result<f64, MrioError> {
    let trimmed = raw.trim().trim_matches('"');
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed.parse::<f64>().map_err(|_| MrioError::BadNumber {
        row,
        col,
        value: raw.to_string(),
    })
}

/// Parse an ICIO CSV.
pub fn parse_icio(csv: &str) -> Result<MrioTable, MrioError> {
    let mut lines = csv.lines().filter(|l| !l.trim().is_empty());
    let header = lines.next().ok_or(MrioError::Empty)?;
    let header_cells: Vec<&str> = header.split(',').map(|c| c.trim().trim_matches('"')).collect();
    let corner = header_cells.first().copied().unwrap_or("");
    if corner != "V1" {
        return Err(MrioError::BadHeader(corner.to_string()));
    }

    let mut columns = Vec::with_capacity(header_cells.len().saturating_sub(1));
    for label in &header_cells[1..] {
        match split_label(label) {
            Some((country, tag)) if FINAL_DEMAND_TAGS.contains(&tag) => {
                columns.push(ColumnKind::FinalDemand {
                    country: country.to_string(),
                });
            }
            Some((country, sector)) => {
                columns.push(ColumnKind::Sector {
                    country: country.to_string(),
                    sector: sector.to_string(),
                });
            }
            None => {
                // A bare tag column (e.g. a trailing TOTAL) is treated as
                // final demand with no country; it never aggregates.
                columns.push(ColumnKind::FinalDemand {
                    country: String::new(),
                });
            }
        }
    }

    let expected = columns.len() + 1;
    let mut row_labels = Vec::new();
    let mut flows = Vec::new();
    let mut output: Option<Vec<f64>> = None;

    for (row_idx, line) in lines.enumerate() {
        let cells: Vec<&str> = line.split(',').map(|c| c.trim().trim_matches('"')).collect();
        if cells.len() != expected {
            return Err(MrioError::RaggedRow {
                row: row_idx + 1,
                len: cells.len(),
                expected,
            });
        }
        let label = cells[0];
        match label {
            "OUT" => {
                let mut out_row = Vec::with_capacity(columns.len());
                for (col_idx, raw) in cells[1..].iter().enumerate() {
                    out_row.push(parse_cell(raw, row_idx + 1, col_idx + 1)?);
                }
                output = Some(out_row);
            }
            // Value-added and tax rows do not feed coefficients.
            "VA" | "TLS" => {}
            _ => {
                let (country, sector) = match split_label(label) {
                    Some((c, s)) => (c.to_string(), s.to_string()),
                    None => continue,
                };
                row_labels.push((country, sector));
                for (col_idx, raw) in cells[1..].iter().enumerate() {
                    flows.push(parse_cell(raw, row_idx + 1, col_idx + 1)?);
                }
            }
        }
    }

    let output = output.ok_or(MrioError::MissingOutRow)?;
    Ok(MrioTable {
        row_labels,
        columns,
        flows,
        output,
    })
}

impl MrioTable {
    fn flow(&self, row: usize, col: usize) -> f64 {
        self.flows[row * self.columns.len() + col]
    }

    /// Whether a country appears among the supplying rows.
    pub fn contains_country(&self, country: &str) -> bool {
        self.row_labels.iter().any(|(c, _)| c == country)
    }

    /// Countries appearing in the table, in first-appearance order.
    pub fn countries(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for (country, _) in &self.row_labels {
            if !seen.contains(country) {
                seen.push(country.clone());
            }
        }
        seen
    }

    /// Aggregated technical coefficient matrix for one country.
    ///
    /// `A[i,j] = Z[i,j] / X[j]` per ISIC column (zero when `X[j]` is
    /// zero), aggregated to commodities weighted by column output. Inputs
    /// are summed over all supplying countries; every mapped sector of the
    /// destination country contributes.
    pub fn technical_coefficients(
        &self,
        country: &str,
        map: &SectorMap,
    ) -> Result<TechnicalCoefficientMatrix, MrioError> {
        if !self.row_labels.iter().any(|(c, _)| c == country) {
            return Err(MrioError::UnknownCountry(country.to_string()));
        }

        // Absorbed input value and total output per commodity column.
        let mut input_value = [[0.0f64; COMMODITY_COUNT]; COMMODITY_COUNT];
        let mut column_output = [0.0f64; COMMODITY_COUNT];

        for (col_idx, column) in self.columns.iter().enumerate() {
            let ColumnKind::Sector {
                country: col_country,
                sector: col_sector,
            } = column
            else {
                continue;
            };
            if col_country != country {
                continue;
            }
            let output_commodity = map
                .get(col_sector)
                .ok_or_else(|| MrioError::UnmappedSector(col_sector.clone()))?;
            let x = self.output[col_idx];
            if x <= 0.0 {
                continue;
            }
            column_output[output_commodity.index()] += x;

            for (row_idx, (_, row_sector)) in self.row_labels.iter().enumerate() {
                let input_commodity = map
                    .get(row_sector)
                    .ok_or_else(|| MrioError::UnmappedSector(row_sector.clone()))?;
                input_value[input_commodity.index()][output_commodity.index()] +=
                    self.flow(row_idx, col_idx);
            }
        }

        let mut flat = vec![0.0f64; COMMODITY_COUNT * COMMODITY_COUNT];
        for j in 0..COMMODITY_COUNT {
            if column_output[j] <= 0.0 {
                continue;
            }
            let mut column_sum = 0.0;
            for i in 0..COMMODITY_COUNT {
                let a = input_value[i][j] / column_output[j];
                flat[i * COMMODITY_COUNT + j] = a.max(0.0);
                column_sum += flat[i * COMMODITY_COUNT + j];
            }
            // Degenerate data can push a column to 1; rescale below the
            // profitability bound.
            if column_sum >= MAX_COLUMN_SUM {
                let scale = MAX_COLUMN_SUM / column_sum;
                for i in 0..COMMODITY_COUNT {
                    flat[i * COMMODITY_COUNT + j] *= scale;
                }
            }
        }

        // Entries and column sums are in range by construction here.
        Ok(TechnicalCoefficientMatrix::from_flat(&flat)
            .expect("aggregated coefficients within bounds"))
    }

    /// Bilateral base trade volumes: flows from `from`'s sectors into all
    /// of `to`'s columns (intermediate use and final demand), aggregated
    /// by the supplying sector's commodity.
    pub fn bilateral_volumes(
        &self,
        from: &str,
        to: &str,
        map: &SectorMap,
    ) -> Result<[f64; COMMODITY_COUNT], MrioError> {
        if !self.row_labels.iter().any(|(c, _)| c == from) {
            return Err(MrioError::UnknownCountry(from.to_string()));
        }

        let mut volumes = [0.0f64; COMMODITY_COUNT];
        for (row_idx, (row_country, row_sector)) in self.row_labels.iter().enumerate() {
            if row_country != from {
                continue;
            }
            let commodity = map
                .get(row_sector)
                .ok_or_else(|| MrioError::UnmappedSector(row_sector.clone()))?;
            for (col_idx, column) in self.columns.iter().enumerate() {
                let col_country = match column {
                    ColumnKind::Sector { country, .. } => country,
                    ColumnKind::FinalDemand { country } => country,
                };
                if col_country == to {
                    volumes[commodity.index()] += self.flow(row_idx, col_idx);
                }
            }
        }
        Ok(volumes)
    }
}

/// Overlay MRIO-derived data onto a loaded state: coefficient matrices for
/// every country the table knows, and base trade volumes for every
/// existing relation whose two ends both appear in the table.
///
/// Countries and relations the table does not cover keep their
/// scenario-supplied data.
pub fn apply_mrio(
    state: &mut crate::models::state::SimulationState,
    table: &MrioTable,
    map: &SectorMap,
) -> Result<(), MrioError> {
    for country_id in 0..state.countries.len() {
        let code = state.countries[country_id].code.clone();
        if table.contains_country(&code) {
            state.coefficients[country_id] = table.technical_coefficients(&code, map)?;
        }
    }
    for relation_id in 0..state.trade_relations.len() {
        let (from_code, to_code) = {
            let relation = &state.trade_relations[relation_id];
            (
                state.countries[relation.from_country].code.clone(),
                state.countries[relation.to_country].code.clone(),
            )
        };
        if table.contains_country(&from_code) && table.contains_country(&to_code) {
            state.trade_relations[relation_id].base_volumes =
                table.bilateral_volumes(&from_code, &to_code, map)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two countries (AAA, BBB), two sectors each (A01_02 → Agriculture,
    /// C26 → Electronics), one final-demand column per country.
    fn tiny_icio() -> String {
        [
            "V1,AAA_A01_02,AAA_C26,BBB_A01_02,BBB_C26,AAA_HFCE,BBB_HFCE",
            "AAA_A01_02,10,20,0,5,30,0",
            "AAA_C26,5,10,0,0,20,10",
            "BBB_A01_02,0,0,8,4,0,25",
            "BBB_C26,0,5,2,6,0,15",
            "VA,85,65,90,85,0,0",
            "OUT,100,100,100,100,0,0",
        ]
        .join("\n")
    }

    #[test]
    fn test_parse_shape() {
        let table = parse_icio(&tiny_icio()).unwrap();
        assert_eq!(table.countries(), vec!["AAA".to_string(), "BBB".to_string()]);
    }

    #[test]
    fn test_bad_header_rejected() {
        let csv = tiny_icio().replacen("V1", "XX", 1);
        assert_eq!(
            parse_icio(&csv).unwrap_err(),
            MrioError::BadHeader("XX".to_string())
        );
    }

    #[test]
    fn test_missing_out_row_rejected() {
        let csv: String = tiny_icio()
            .lines()
            .filter(|l| !l.starts_with("OUT"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(parse_icio(&csv).unwrap_err(), MrioError::MissingOutRow);
    }

    #[test]
    fn test_coefficients_z_over_x() {
        let table = parse_icio(&tiny_icio()).unwrap();
        let map = SectorMap::default_icio();
        let a = table.technical_coefficients("AAA", &map).unwrap();
        // AAA agriculture column: inputs 10 (agri) + 5 (elec) over X=100.
        assert!((a.get(Commodity::Agriculture, Commodity::Agriculture) - 0.10).abs() < 1e-12);
        assert!((a.get(Commodity::Electronics, Commodity::Agriculture) - 0.05).abs() < 1e-12);
        // AAA electronics column: agri 20, elec 10 + 5 (from BBB) over 100.
        assert!((a.get(Commodity::Agriculture, Commodity::Electronics) - 0.20).abs() < 1e-12);
        assert!((a.get(Commodity::Electronics, Commodity::Electronics) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_unmapped_sector_rejected() {
        let table = parse_icio(&tiny_icio()).unwrap();
        let map = SectorMap::from_pairs(&[("A01_02", Commodity::Agriculture)]);
        assert!(matches!(
            table.technical_coefficients("AAA", &map),
            Err(MrioError::UnmappedSector(_))
        ));
    }

    #[test]
    fn test_bilateral_volumes() {
        let table = parse_icio(&tiny_icio()).unwrap();
        let map = SectorMap::default_icio();
        let volumes = table.bilateral_volumes("AAA", "BBB", &map).unwrap();
        // AAA agriculture to BBB: 0 + 5 intermediate + 0 final = 5.
        assert!((volumes[Commodity::Agriculture.index()] - 5.0).abs() < 1e-12);
        // AAA electronics to BBB: 0 + 0 intermediate + 10 final = 10.
        assert!((volumes[Commodity::Electronics.index()] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_output_column_zero_coefficients() {
        let csv = [
            "V1,AAA_A01_02,AAA_C26",
            "AAA_A01_02,10,0",
            "AAA_C26,5,0",
            "OUT,100,0",
        ]
        .join("\n");
        let table = parse_icio(&csv).unwrap();
        let map = SectorMap::default_icio();
        let a = table.technical_coefficients("AAA", &map).unwrap();
        assert_eq!(a.get(Commodity::Agriculture, Commodity::Electronics), 0.0);
    }
}
