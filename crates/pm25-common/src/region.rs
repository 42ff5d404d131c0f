//! Fixed area of interest for satellite exports.

use serde::Serialize;

/// A closed polygon in EPSG:4326 (lon, lat) order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    pub name: &'static str,
    pub ring: &'static [[f64; 2]],
}

/// Bounding polygon of the Philippines used for every export.
pub const PHILIPPINES: Region = Region {
    name: "philippines",
    ring: &[
        [116.71687839753203, 18.744929081691417],
        [116.71687839753203, 5.019622515938524],
        [126.91219089753203, 5.019622515938524],
        [126.91219089753203, 18.744929081691417],
    ],
};

impl Region {
    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub fn bbox(&self) -> [f64; 4] {
        let mut bbox = [f64::MAX, f64::MAX, f64::MIN, f64::MIN];
        for [lon, lat] in self.ring {
            bbox[0] = bbox[0].min(*lon);
            bbox[1] = bbox[1].min(*lat);
            bbox[2] = bbox[2].max(*lon);
            bbox[3] = bbox[3].max(*lat);
        }
        bbox
    }

    /// GeoJSON polygon geometry.
    pub fn to_geojson(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "Polygon",
            "coordinates": [self.ring],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_philippines_bbox() {
        let [min_lon, min_lat, max_lon, max_lat] = PHILIPPINES.bbox();
        assert!(min_lon < max_lon);
        assert!(min_lat < max_lat);
        assert_eq!(min_lat, 5.019622515938524);
        assert_eq!(max_lon, 126.91219089753203);
    }

    #[test]
    fn test_geojson_shape() {
        let geojson = PHILIPPINES.to_geojson();
        assert_eq!(geojson["type"], "Polygon");
        assert_eq!(geojson["coordinates"][0].as_array().unwrap().len(), 4);
    }
}
