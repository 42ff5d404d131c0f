//! Satellite products the model is trained on.

use chrono::NaiveDate;
use pm25_common::DateRange;
use serde::{Deserialize, Serialize};

/// A satellite product exported for the area of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SatelliteSource {
    /// MODIS MAIAC aerosol optical depth (MCD19A2), tile h29v07
    Modis,
    /// ERA5-Land daily aggregated meteorology
    Era5,
}

impl SatelliteSource {
    /// Merge order: MODIS is the primary grid.
    pub const ALL: [SatelliteSource; 2] = [SatelliteSource::Modis, SatelliteSource::Era5];

    /// Filename prefix of exported rasters.
    pub fn prefix(&self) -> &'static str {
        match self {
            SatelliteSource::Modis => "MODIS",
            SatelliteSource::Era5 => "ERA5",
        }
    }

    /// Earth Engine image collection id.
    pub fn collection(&self) -> &'static str {
        match self {
            SatelliteSource::Modis => "MODIS/061/MCD19A2_GRANULES",
            SatelliteSource::Era5 => "ECMWF/ERA5_LAND/DAILY_AGGR",
        }
    }

    pub fn bands(&self) -> &'static [&'static str] {
        match self {
            SatelliteSource::Modis => &["Optical_Depth_047", "Optical_Depth_055"],
            SatelliteSource::Era5 => &[
                "u_component_of_wind_10m",
                "v_component_of_wind_10m",
                "temperature_2m",
                "temperature_2m_min",
                "temperature_2m_max",
                "total_precipitation_sum",
                "surface_pressure",
            ],
        }
    }

    /// Export resolution in metres.
    pub fn scale_m(&self) -> u32 {
        match self {
            SatelliteSource::Modis => 1000,
            SatelliteSource::Era5 => 31000,
        }
    }

    /// Substring every `system:index` must contain, if any.
    pub fn index_filter(&self) -> Option<&'static str> {
        match self {
            SatelliteSource::Modis => Some("h29v07"),
            SatelliteSource::Era5 => None,
        }
    }

    /// Days to export for a requested range.
    ///
    /// MODIS composites every day of the range, end included. ERA5 follows
    /// the collection's half-open date filter, but always covers the start
    /// day so the pipeline's primary date exists for both sources.
    pub fn export_days(&self, range: &DateRange) -> Vec<NaiveDate> {
        match self {
            SatelliteSource::Modis => range.days().collect(),
            SatelliteSource::Era5 => {
                let days: Vec<NaiveDate> = range.days().filter(|d| *d < range.end).collect();
                if days.is_empty() {
                    vec![range.start]
                } else {
                    days
                }
            }
        }
    }

    /// Export name for one day, e.g. `MODIS_20240305`.
    pub fn export_name(&self, date: NaiveDate) -> String {
        format!("{}_{}", self.prefix(), date.format("%Y%m%d"))
    }

    /// Object name the export lands at in the bucket.
    pub fn object_name(&self, date: NaiveDate) -> String {
        format!("{}.tif", self.export_name(date))
    }
}

impl std::fmt::Display for SatelliteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::parse(start, end).unwrap()
    }

    #[test]
    fn test_object_names() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(SatelliteSource::Modis.object_name(date), "MODIS_20240305.tif");
        assert_eq!(SatelliteSource::Era5.object_name(date), "ERA5_20240305.tif");
    }

    #[test]
    fn test_band_lists() {
        assert_eq!(SatelliteSource::Modis.bands().len(), 2);
        assert_eq!(SatelliteSource::Era5.bands().len(), 7);
        assert_eq!(SatelliteSource::Era5.bands()[6], "surface_pressure");
    }

    #[test]
    fn test_export_days() {
        let r = range("2024-03-05", "2024-03-07");
        assert_eq!(SatelliteSource::Modis.export_days(&r).len(), 3);
        assert_eq!(SatelliteSource::Era5.export_days(&r).len(), 2);

        let single = range("2024-03-05", "2024-03-05");
        assert_eq!(SatelliteSource::Modis.export_days(&single), vec![single.start]);
        assert_eq!(SatelliteSource::Era5.export_days(&single), vec![single.start]);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&SatelliteSource::Era5).unwrap(), "\"ERA5\"");
    }
}
