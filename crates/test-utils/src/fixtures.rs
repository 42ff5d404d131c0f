//! Common test fixtures for pm25-map tests.
//!
//! This module provides pre-defined test data and a small builder for
//! writing synthetic GeoTIFFs, so raster tests never depend on downloaded
//! satellite exports.

use std::path::{Path, PathBuf};

use gdal::raster::{Buffer, GdalType};
use gdal::spatial_ref::SpatialRef;
use gdal::{DriverManager, Metadata};

/// Common grid definitions for testing.
pub mod grid {
    /// Grid specification for testing.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub width: usize,
        pub height: usize,
        pub min_lon: f64,
        pub max_lat: f64,
        /// Pixel size in degrees (square pixels).
        pub resolution: f64,
    }

    /// MODIS-like grid over Luzon (1 km, clipped for tests)
    pub const MODIS_TEST: GridSpec = GridSpec {
        width: 100,
        height: 100,
        min_lon: 120.0,
        max_lat: 18.0,
        resolution: 0.01,
    };

    /// ERA5-like coarse grid over the same extent
    pub const ERA5_TEST: GridSpec = GridSpec {
        width: 50,
        height: 50,
        min_lon: 120.0,
        max_lat: 18.0,
        resolution: 0.02,
    };

    /// Simple 2x2 test grid
    pub const SIMPLE_2X2: GridSpec = GridSpec {
        width: 2,
        height: 2,
        min_lon: 0.0,
        max_lat: 2.0,
        resolution: 1.0,
    };

    impl GridSpec {
        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.width * self.height
        }

        /// Returns the GDAL geotransform of a north-up grid.
        pub fn geo_transform(&self) -> [f64; 6] {
            [self.min_lon, self.resolution, 0.0, self.max_lat, 0.0, -self.resolution]
        }
    }
}

/// Common dates for testing.
pub mod dates {
    pub const START: &str = "2024-03-05";
    pub const END: &str = "2024-03-06";
    /// `START` as it appears in export filenames
    pub const START_COMPACT: &str = "20240305";
}

/// Band descriptions as they appear in the satellite exports.
pub mod bands {
    pub const MODIS: [&str; 2] = ["Optical_Depth_047", "Optical_Depth_055"];

    pub const ERA5: [&str; 7] = [
        "u_component_of_wind_10m",
        "v_component_of_wind_10m",
        "temperature_2m",
        "temperature_2m_min",
        "temperature_2m_max",
        "total_precipitation_sum",
        "surface_pressure",
    ];
}

/// Pixel type used when writing a [`RasterFixture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    Int16,
    Float32,
    Float64,
}

/// Builder for synthetic GeoTIFF files.
///
/// # Example
///
/// ```ignore
/// use test_utils::{grid, RasterFixture};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = RasterFixture::new(grid::SIMPLE_2X2)
///     .band("aod", vec![1.0, 2.0, 3.0, 4.0])
///     .write(dir.path().join("aod.tif"));
/// ```
#[derive(Debug, Clone)]
pub struct RasterFixture {
    pub spec: grid::GridSpec,
    pub epsg: Option<u32>,
    pub no_data: Option<f64>,
    pub pixel_type: PixelType,
    pub bands: Vec<(String, Vec<f64>)>,
}

impl RasterFixture {
    /// A Float64, EPSG:4326 fixture with no bands.
    pub fn new(spec: grid::GridSpec) -> Self {
        Self {
            spec,
            epsg: Some(4326),
            no_data: None,
            pixel_type: PixelType::Float64,
            bands: Vec::new(),
        }
    }

    /// Appends a band. Panics if `data` does not cover the grid.
    pub fn band(mut self, description: &str, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), self.spec.size(), "band data must cover the grid");
        self.bands.push((description.to_string(), data));
        self
    }

    pub fn epsg(mut self, epsg: Option<u32>) -> Self {
        self.epsg = epsg;
        self
    }

    pub fn no_data(mut self, no_data: f64) -> Self {
        self.no_data = Some(no_data);
        self
    }

    pub fn pixel_type(mut self, pixel_type: PixelType) -> Self {
        self.pixel_type = pixel_type;
        self
    }

    /// Writes the fixture as a GeoTIFF and returns its path.
    ///
    /// Panics on any GDAL error; this is test scaffolding.
    pub fn write(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match self.pixel_type {
            PixelType::Int16 => self.write_typed(path, |v| v as i16),
            PixelType::Float32 => self.write_typed(path, |v| v as f32),
            PixelType::Float64 => self.write_typed(path, |v| v),
        }
        path.to_path_buf()
    }

    fn write_typed<T: GdalType + Copy>(&self, path: &Path, convert: impl Fn(f64) -> T) {
        let (width, height) = (self.spec.width, self.spec.height);
        let driver = DriverManager::get_driver_by_name("GTiff").expect("GTiff driver");
        let mut ds = driver
            .create_with_band_type::<T, _>(
                path,
                width as usize,
                height as usize,
                self.bands.len(),
            )
            .expect("create fixture");

        ds.set_geo_transform(&self.spec.geo_transform())
            .expect("set geotransform");
        if let Some(epsg) = self.epsg {
            let srs = SpatialRef::from_epsg(epsg).expect("EPSG code");
            ds.set_spatial_ref(&srs).expect("set spatial ref");
        }

        for (i, (description, data)) in self.bands.iter().enumerate() {
            let mut band = ds.rasterband(i + 1).expect("fixture band");
            let mut buffer = Buffer::new((width, height), data.iter().map(|v| convert(*v)).collect());
            band.write((0, 0), (width, height), &mut buffer)
                .expect("write band");
            band.set_description(description).expect("set description");
            if let Some(no_data) = self.no_data {
                band.set_no_data_value(Some(no_data)).expect("set no-data");
            }
        }
    }
}

/// MODIS-shaped fixture: two AOD bands on [`grid::MODIS_TEST`].
pub fn modis_fixture() -> RasterFixture {
    let spec = grid::MODIS_TEST;
    let mut fixture = RasterFixture::new(spec).pixel_type(PixelType::Float32);
    for (i, name) in bands::MODIS.iter().enumerate() {
        fixture = fixture.band(name, crate::create_aod_grid(spec.width, spec.height, i as f64));
    }
    fixture
}

/// ERA5-shaped fixture: three meteorological bands on [`grid::ERA5_TEST`].
pub fn era5_fixture() -> RasterFixture {
    let spec = grid::ERA5_TEST;
    RasterFixture::new(spec)
        .pixel_type(PixelType::Float32)
        .band(bands::ERA5[0], crate::create_index_grid(spec.width, spec.height))
        .band(bands::ERA5[2], crate::create_temperature_grid(spec.width, spec.height))
        .band(bands::ERA5[6], crate::create_constant_grid(spec.width, spec.height, 101_325.0))
}
