//! Integration tests: merge a MODIS-shaped and an ERA5-shaped GeoTIFF.
//!
//! The fixtures are written with GDAL into a temp dir:
//! 1. primary: 100x100, 2 bands, EPSG:4326
//! 2. secondary: 50x50, 3 bands, coarser pixels over the same extent
//!
//! and the merged output is inspected with the crate's own readers.

use raster::{describe, merge_rasters, read_band, read_multiband, GridShape, MultibandOptions};
use test_utils::{bands, create_aod_grid, era5_fixture, grid, modis_fixture, RasterFixture};

struct Inputs {
    _dir: tempfile::TempDir,
    primary: std::path::PathBuf,
    secondary: std::path::PathBuf,
    output: std::path::PathBuf,
}

fn inputs() -> Inputs {
    let dir = tempfile::tempdir().unwrap();
    let primary = modis_fixture().write(dir.path().join("MODIS_20240305.tif"));
    let secondary = era5_fixture().write(dir.path().join("ERA5_20240305.tif"));
    let output = dir.path().join("merged.tif");
    Inputs {
        _dir: dir,
        primary,
        secondary,
        output,
    }
}

#[test]
fn test_merge_band_count_and_shape() {
    let inputs = inputs();
    let shape = merge_rasters(&inputs.primary, &inputs.secondary, &inputs.output, None).unwrap();
    assert_eq!(shape, GridShape::new(100, 100));

    let info = describe(&inputs.output).unwrap();
    assert_eq!(info.band_count, 5);
    assert_eq!(info.shape, GridShape::new(100, 100));
}

#[test]
fn test_merge_keeps_primary_georeferencing_and_descriptions() {
    let inputs = inputs();
    merge_rasters(&inputs.primary, &inputs.secondary, &inputs.output, None).unwrap();

    let primary = describe(&inputs.primary).unwrap();
    let merged = describe(&inputs.output).unwrap();
    assert_eq!(merged.geo_transform, primary.geo_transform);
    assert_eq!(merged.projection, primary.projection);
    assert_eq!(
        merged.descriptions,
        vec![
            bands::MODIS[0],
            bands::MODIS[1],
            bands::ERA5[0],
            bands::ERA5[2],
            bands::ERA5[6],
        ]
    );
}

#[test]
fn test_secondary_resampled_nearest() {
    let inputs = inputs();
    merge_rasters(&inputs.primary, &inputs.secondary, &inputs.output, None).unwrap();

    // ERA5 band 1 holds col * 1000 + row on the 50x50 grid; every 2x2 block
    // of the 100x100 output repeats one source cell.
    let table = read_multiband(&inputs.output, &MultibandOptions::default()).unwrap();
    let wind = table.column(bands::ERA5[0]).unwrap();
    for (row, col) in [(0, 0), (1, 1), (2, 3), (57, 98), (99, 99)] {
        let expected = ((col / 2) * 1000 + row / 2) as f64;
        assert_eq!(wind[row * 100 + col], expected, "row {} col {}", row, col);
    }
}

#[test]
fn test_primary_bands_copied_unchanged() {
    let inputs = inputs();
    merge_rasters(&inputs.primary, &inputs.secondary, &inputs.output, None).unwrap();

    let options = MultibandOptions::default();
    let primary = read_multiband(&inputs.primary, &options).unwrap();
    let merged = read_multiband(&inputs.output, &options).unwrap();
    for (i, name) in bands::MODIS.iter().enumerate() {
        let expected: Vec<f64> = create_aod_grid(100, 100, i as f64)
            .into_iter()
            .map(|v| v as f32 as f64)
            .collect();
        assert_eq!(merged.column(name).unwrap(), primary.column(name).unwrap(), "{}", name);
        assert_eq!(merged.column(name).unwrap(), &expected[..], "{}", name);
    }
}

#[test]
fn test_multiband_coordinates_follow_band_one_grid() {
    let inputs = inputs();
    merge_rasters(&inputs.primary, &inputs.secondary, &inputs.output, None).unwrap();

    let table = read_multiband(&inputs.output, &MultibandOptions::default()).unwrap();
    let band1 = read_band(&inputs.output, 1, None, None).unwrap();
    assert_eq!(table.len(), 100 * 100);
    assert_eq!(band1.pixel, table.index);
    assert_eq!(table.longitude, band1.longitude);
    assert_eq!(table.latitude, band1.latitude);

    let info = describe(&inputs.output).unwrap();
    let (xs, ys) = info.geo_transform.pixel_centers(info.shape);
    assert_eq!(table.longitude, xs);
    assert_eq!(table.latitude, ys);
    assert_eq!(info.geo_transform.0, grid::MODIS_TEST.geo_transform());
}

#[test]
fn test_merge_is_idempotent() {
    let inputs = inputs();
    let second = inputs.output.with_file_name("merged_again.tif");
    merge_rasters(&inputs.primary, &inputs.secondary, &inputs.output, None).unwrap();
    merge_rasters(&inputs.primary, &inputs.secondary, &second, None).unwrap();

    let options = MultibandOptions::default();
    let a = read_multiband(&inputs.output, &options).unwrap();
    let b = read_multiband(&second, &options).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_merge_shape_override() {
    let inputs = inputs();
    let shape = merge_rasters(
        &inputs.primary,
        &inputs.secondary,
        &inputs.output,
        Some(GridShape::new(20, 25)),
    )
    .unwrap();
    assert_eq!(shape, GridShape::new(20, 25));

    let merged = describe(&inputs.output).unwrap();
    assert_eq!(merged.shape, GridShape::new(20, 25));
    assert_eq!(merged.geo_transform, describe(&inputs.primary).unwrap().geo_transform);
}

#[test]
fn test_merge_with_mismatched_crs_still_uses_primary() {
    let inputs = inputs();
    let secondary = era5_fixture()
        .epsg(Some(3857))
        .write(inputs.secondary.with_file_name("era5_mercator.tif"));
    merge_rasters(&inputs.primary, &secondary, &inputs.output, None).unwrap();

    let merged = describe(&inputs.output).unwrap();
    assert_eq!(merged.projection, describe(&inputs.primary).unwrap().projection);
    assert_eq!(merged.band_count, 5);
}

#[test]
fn test_merged_band_rows() {
    let inputs = inputs();
    merge_rasters(&inputs.primary, &inputs.secondary, &inputs.output, None).unwrap();

    for band in 1..=5 {
        let table = read_band(&inputs.output, band, Some(-9999.0), None).unwrap();
        assert_eq!(table.len(), 100 * 100);
    }
}

#[test]
fn test_merge_missing_input() {
    let inputs = inputs();
    let missing = inputs.primary.with_file_name("does_not_exist.tif");
    let err = merge_rasters(&missing, &inputs.secondary, &inputs.output, None).unwrap_err();
    assert_eq!(err.kind(), "data_read");
}

#[test]
fn test_merge_int16_primary_keeps_pixel_type() {
    let dir = tempfile::tempdir().unwrap();
    let spec = grid::SIMPLE_2X2;
    let primary = RasterFixture::new(spec)
        .pixel_type(test_utils::PixelType::Int16)
        .band("aod", vec![1.0, 2.0, 3.0, 4.0])
        .write(dir.path().join("a.tif"));
    let secondary = RasterFixture::new(spec)
        .band("t2m", vec![0.4, 1.6, 2.5, 3.9])
        .write(dir.path().join("b.tif"));
    let output = dir.path().join("out.tif");
    merge_rasters(&primary, &secondary, &output, None).unwrap();

    // Float64 secondary is stored in the primary's Int16 type
    let t2m = read_band(&output, 2, None, None).unwrap();
    assert!(t2m.value.iter().all(|v| v.fract() == 0.0));
}

#[test]
fn test_merge_float64_primary_keeps_values() {
    let dir = tempfile::tempdir().unwrap();
    let spec = grid::SIMPLE_2X2;
    let primary = RasterFixture::new(spec)
        .pixel_type(test_utils::PixelType::Float64)
        .band("aod", vec![0.125, 2.0, 3.000001, 4.5])
        .write(dir.path().join("a.tif"));
    let secondary = RasterFixture::new(spec)
        .pixel_type(test_utils::PixelType::Int16)
        .band("t2m", vec![1.0, 2.0, 3.0, 4.0])
        .write(dir.path().join("b.tif"));
    let output = dir.path().join("out.tif");
    merge_rasters(&primary, &secondary, &output, None).unwrap();

    // 3.000001 does not survive a narrower type
    let aod = read_band(&output, 1, None, None).unwrap();
    assert_eq!(aod.value, vec![0.125, 2.0, 3.000001, 4.5]);
}
