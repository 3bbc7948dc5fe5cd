//! Loading of the bundled CSV tables
//!
//! Three tables feed the advisor: labelled soil/climate readings (training
//! data), district production records (region filter) and local crop prices
//! (price ceiling). All are read once and then shared read-only.

mod cache;
pub mod columns;

pub use cache::DatasetCache;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{CropRecord, PriceRecord, RegionRecord, SoilSample};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Which optional columns a crop table carries.
///
/// Numeric features are always laid out as nitrogen, phosphorous,
/// potassium, temperature, humidity, then moisture, rainfall and pH when
/// present. The encoded soil type, when present, is appended last.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct FeatureSchema {
    pub has_soil_type: bool,
    pub has_moisture: bool,
    pub has_rainfall: bool,
    pub has_ph: bool,
}

impl FeatureSchema {
    pub fn numeric_names(&self) -> Vec<&'static str> {
        let mut names = vec!["nitrogen", "phosphorous", "potassium", "temperature", "humidity"];
        if self.has_moisture {
            names.push("moisture");
        }
        if self.has_rainfall {
            names.push("rainfall");
        }
        if self.has_ph {
            names.push("ph");
        }
        names
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        let mut names = self.numeric_names();
        if self.has_soil_type {
            names.push("soil_type");
        }
        names
    }

    /// Numeric readings of a sample in schema order
    pub fn numeric_readings(&self, sample: &SoilSample) -> AppResult<Vec<f64>> {
        let mut values = vec![
            sample.nitrogen,
            sample.phosphorous,
            sample.potassium,
            sample.temperature,
            sample.humidity,
        ];
        if self.has_moisture {
            values.push(required(sample.moisture, "moisture")?);
        }
        if self.has_rainfall {
            values.push(required(sample.rainfall, "rainfall")?);
        }
        if self.has_ph {
            values.push(required(sample.ph, "ph")?);
        }
        Ok(values)
    }
}

fn required(value: Option<f64>, field: &str) -> AppResult<f64> {
    value.ok_or_else(|| AppError::validation(field, format!("{} reading is required", field)))
}

/// Labelled soil/climate readings
#[derive(Debug, Clone)]
pub struct CropTable {
    pub schema: FeatureSchema,
    pub records: Vec<CropRecord>,
}

impl CropTable {
    pub fn load(path: &Path) -> AppResult<Self> {
        let file = open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        let label = columns::require(&headers, columns::LABEL)?;
        let mut numeric = vec![
            ("nitrogen", columns::require(&headers, columns::NITROGEN)?),
            ("phosphorous", columns::require(&headers, columns::PHOSPHOROUS)?),
            ("potassium", columns::require(&headers, columns::POTASSIUM)?),
            ("temperature", columns::require(&headers, columns::TEMPERATURE)?),
            ("humidity", columns::require(&headers, columns::HUMIDITY)?),
        ];
        let soil = columns::find(&headers, columns::SOIL_TYPE);
        let moisture = columns::find(&headers, columns::MOISTURE);
        let rainfall = columns::find(&headers, columns::RAINFALL);
        let ph = columns::find(&headers, columns::PH);
        let price = columns::find(&headers, columns::PRICE);

        numeric.extend(moisture.map(|i| ("moisture", i)));
        numeric.extend(rainfall.map(|i| ("rainfall", i)));
        numeric.extend(ph.map(|i| ("ph", i)));

        let schema = FeatureSchema {
            has_soil_type: soil.is_some(),
            has_moisture: moisture.is_some(),
            has_rainfall: rainfall.is_some(),
            has_ph: ph.is_some(),
        };

        let mut records = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            let row = row?;
            let line = i + 1;
            let features = numeric
                .iter()
                .map(|(name, idx)| parse_number(&row, *idx, name, line))
                .collect::<AppResult<Vec<f64>>>()?;
            let name = cell(&row, label);
            if name.is_empty() {
                return Err(AppError::Dataset(format!("row {}: empty crop label", line)));
            }
            let soil_type = match soil {
                Some(idx) => {
                    let value = cell(&row, idx);
                    if value.is_empty() {
                        return Err(AppError::Dataset(format!("row {}: empty soil type", line)));
                    }
                    Some(value.to_string())
                }
                None => None,
            };
            let price = match price {
                Some(idx) => parse_decimal(cell(&row, idx)),
                None => None,
            };
            records.push(CropRecord {
                label: name.to_string(),
                soil_type,
                features,
                price,
            });
        }

        Ok(Self { schema, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mean price per crop label, for tables that carry a price column
    pub fn mean_prices(&self) -> HashMap<String, Decimal> {
        let mut sums: HashMap<String, (Decimal, u32)> = HashMap::new();
        for record in &self.records {
            if let Some(price) = record.price {
                let entry = sums
                    .entry(record.label.to_lowercase())
                    .or_insert((Decimal::ZERO, 0));
                entry.0 += price;
                entry.1 += 1;
            }
        }
        sums.into_iter()
            .map(|(crop, (sum, n))| (crop, sum / Decimal::from(n)))
            .collect()
    }
}

/// District production records
#[derive(Debug, Clone)]
pub struct RegionTable {
    pub records: Vec<RegionRecord>,
}

impl RegionTable {
    pub fn load(path: &Path) -> AppResult<Self> {
        let file = open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        let state = columns::require(&headers, columns::STATE)?;
        let district = columns::require(&headers, columns::DISTRICT)?;
        let season = columns::require(&headers, columns::SEASON)?;
        let crop = columns::require(&headers, columns::CROP)?;
        let year = columns::find(&headers, columns::YEAR);
        let area = columns::find(&headers, columns::AREA);
        let production = columns::find(&headers, columns::PRODUCTION);

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row?;
            // Production files mark missing figures with "NA" or leave them blank
            records.push(RegionRecord {
                state: cell(&row, state).to_string(),
                district: cell(&row, district).to_string(),
                season: cell(&row, season).to_string(),
                crop: cell(&row, crop).to_string(),
                year: year.and_then(|i| cell(&row, i).parse().ok()),
                area: area.and_then(|i| cell(&row, i).parse().ok()),
                production: production.and_then(|i| cell(&row, i).parse().ok()),
            });
        }

        Ok(Self { records })
    }
}

/// Local crop price table
#[derive(Debug, Clone)]
pub struct PriceTable {
    pub records: Vec<PriceRecord>,
}

impl PriceTable {
    pub fn load(path: &Path) -> AppResult<Self> {
        let file = open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        let crop = columns::require(&headers, columns::CROP)?;
        let price = columns::require(&headers, columns::PRICE)?;

        let mut records = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            let row = row?;
            let value = parse_decimal(cell(&row, price)).ok_or_else(|| {
                AppError::Dataset(format!("row {}: price is not a number", i + 1))
            })?;
            records.push(PriceRecord {
                crop: cell(&row, crop).to_string(),
                price: value,
            });
        }

        Ok(Self { records })
    }

    /// Price per crop (lowercased name); later rows override earlier ones
    pub fn price_map(&self) -> HashMap<String, Decimal> {
        self.records
            .iter()
            .map(|r| (r.crop.trim().to_lowercase(), r.price))
            .collect()
    }
}

fn open(path: &Path) -> AppResult<std::fs::File> {
    std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AppError::DatasetUnavailable {
            path: path.display().to_string(),
        },
        _ => AppError::Dataset(format!("{}: {}", path.display(), e)),
    })
}

fn cell(row: &csv::StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("").trim()
}

fn parse_number(row: &csv::StringRecord, idx: usize, name: &str, line: usize) -> AppResult<f64> {
    let raw = cell(row, idx);
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            AppError::Dataset(format!("row {}: {} is not a number: {:?}", line, name, raw))
        })
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FERTILIZER_CSV: &str = "\
Temparature,Humidity ,Moisture,Soil Type,Crop Type,Nitrogen,Potassium,Phosphorous
26,52,38,Sandy,Maize,37,0,0
29,52,45,Loamy,Sugarcane,12,0,36
34,65,62,Black,Cotton,7,9,30
";

    const RECOMMENDATION_CSV: &str = "\
N,P,K,temperature,humidity,ph,rainfall,label
90,42,43,20.87,82.00,6.50,202.93,rice
85,58,41,21.77,80.31,7.03,226.65,rice
";

    #[test]
    fn reads_fertilizer_layout() {
        let table = CropTable::from_reader(FERTILIZER_CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.schema.has_soil_type);
        assert!(table.schema.has_moisture);
        assert!(!table.schema.has_rainfall);
        let first = &table.records[0];
        assert_eq!(first.label, "Maize");
        assert_eq!(first.soil_type.as_deref(), Some("Sandy"));
        // nitrogen, phosphorous, potassium, temperature, humidity, moisture
        assert_eq!(first.features, vec![37.0, 0.0, 0.0, 26.0, 52.0, 38.0]);
    }

    #[test]
    fn reads_recommendation_layout() {
        let table = CropTable::from_reader(RECOMMENDATION_CSV.as_bytes()).unwrap();
        assert!(!table.schema.has_soil_type);
        assert_eq!(
            table.schema.feature_names(),
            vec!["nitrogen", "phosphorous", "potassium", "temperature", "humidity", "rainfall", "ph"]
        );
        assert_eq!(table.records[0].features[5], 202.93);
        assert_eq!(table.records[0].features[6], 6.50);
    }

    #[test]
    fn rejects_non_numeric_reading() {
        let csv = "N,P,K,temperature,humidity,label\n1,2,x,4,5,rice\n";
        let err = CropTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = CropTable::load(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, AppError::DatasetUnavailable { .. }));
    }

    #[test]
    fn sample_missing_required_reading() {
        let table = CropTable::from_reader(RECOMMENDATION_CSV.as_bytes()).unwrap();
        let sample = SoilSample::new(90.0, 42.0, 43.0, 21.0, 80.0).with_ph(6.5);
        let err = table.schema.numeric_readings(&sample).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "rainfall"));
    }

    #[test]
    fn region_rows_tolerate_missing_production() {
        let csv = "\
State_Name,District_Name,Crop_Year,Season,Crop,Area,Production
Andaman and Nicobar Islands,NICOBARS,2000,Kharif     ,Arecanut,1254,2000
Andaman and Nicobar Islands,NICOBARS,2000,Whole Year ,Banana,176,NA
";
        let table = RegionTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].season, "Kharif");
        assert_eq!(table.records[1].production, None);
        assert_eq!(table.records[1].year, Some(2000));
    }

    #[test]
    fn price_table_and_mean_prices() {
        let prices = PriceTable::from_reader("crop,price\nRice,2040\nMaize,1870.5\n".as_bytes())
            .unwrap()
            .price_map();
        assert_eq!(prices["maize"], Decimal::from_str("1870.5").unwrap());

        let csv = "N,P,K,temperature,humidity,label,price\n1,2,3,4,5,rice,2000\n1,2,3,4,5,rice,2200\n";
        let table = CropTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.mean_prices()["rice"], Decimal::from(2100));
    }
}
