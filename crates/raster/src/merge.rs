//! Stack a secondary raster onto a primary raster's grid.

use std::path::Path;

use gdal::errors::GdalError;
use gdal::raster::{GdalDataType, GdalType, ResampleAlg};
use gdal::{Dataset, DriverManager, Metadata};
use pm25_common::{Pm25Error, Pm25Result};
use tracing::{info, instrument, warn};

use crate::dataset;
use crate::geotransform::{GeoTransform, GridShape};

/// Merge two rasters into one GeoTIFF at `output`.
///
/// The output takes the primary raster's grid: its shape (unless `shape`
/// overrides it), CRS, geotransform and band-1 pixel type. Primary bands come
/// first, followed by the secondary bands read at the target shape with
/// nearest-neighbour resampling. The secondary's georeferencing is discarded;
/// no reprojection happens. Band descriptions follow the same order.
///
/// Returns the target shape.
#[instrument(skip_all, fields(
    primary = %primary.as_ref().display(),
    secondary = %secondary.as_ref().display(),
    output = %output.as_ref().display(),
))]
pub fn merge_rasters(
    primary: impl AsRef<Path>,
    secondary: impl AsRef<Path>,
    output: impl AsRef<Path>,
    shape: Option<GridShape>,
) -> Pm25Result<GridShape> {
    let (primary, secondary, output) = (primary.as_ref(), secondary.as_ref(), output.as_ref());

    let src1 = dataset::open(primary)?;
    let src2 = dataset::open(secondary)?;

    let target = shape.unwrap_or_else(|| dataset::shape_of(&src1));
    if target.is_empty() {
        return Err(Pm25Error::data(format!(
            "target shape {}x{} is empty",
            target.height, target.width
        )));
    }

    let n1 = dataset::band_count(&src1);
    let n2 = dataset::band_count(&src2);
    if n1 == 0 || n2 == 0 {
        return Err(Pm25Error::data(format!(
            "cannot merge rasters without bands ({} has {}, {} has {})",
            primary.display(),
            n1,
            secondary.display(),
            n2
        )));
    }

    let mut descriptions = dataset::band_descriptions(&src1, primary)?;
    descriptions.extend(dataset::band_descriptions(&src2, secondary)?);

    let projection = src1.projection();
    let secondary_projection = src2.projection();
    if !projection.is_empty() && !secondary_projection.is_empty() && projection != secondary_projection {
        warn!("CRS of secondary raster differs from primary; bands are resampled, not reprojected");
    }

    let layout = OutputLayout {
        shape: target,
        geo_transform: dataset::geo_transform(&src1, primary)?,
        projection,
        descriptions,
        no_data: band(&src1, 1, primary)?.no_data_value(),
    };

    let pixel_type = band(&src1, 1, primary)?.band_type();
    write_as(pixel_type, &src1, &src2, output, &layout)?;

    info!(
        height = target.height,
        width = target.width,
        bands = n1 + n2,
        pixel_type = ?pixel_type,
        "Merged rasters"
    );
    Ok(target)
}

/// Profile of the merged output, taken from the primary raster.
struct OutputLayout {
    shape: GridShape,
    geo_transform: GeoTransform,
    projection: String,
    descriptions: Vec<String>,
    no_data: Option<f64>,
}

fn band<'a>(ds: &'a Dataset, n: usize, path: &Path) -> Pm25Result<gdal::raster::RasterBand<'a>> {
    ds.rasterband(n)
        .map_err(|e| Pm25Error::data(format!("{} band {}: {}", path.display(), n, e)))
}

/// Write the merged raster in `pixel_type`. Types without a typed buffer
/// are rejected rather than widened.
fn write_as(
    pixel_type: GdalDataType,
    src1: &Dataset,
    src2: &Dataset,
    output: &Path,
    layout: &OutputLayout,
) -> Pm25Result<()> {
    match pixel_type {
        GdalDataType::UInt8 => write_merged::<u8>(src1, src2, output, layout),
        GdalDataType::UInt16 => write_merged::<u16>(src1, src2, output, layout),
        GdalDataType::Int16 => write_merged::<i16>(src1, src2, output, layout),
        GdalDataType::UInt32 => write_merged::<u32>(src1, src2, output, layout),
        GdalDataType::Int32 => write_merged::<i32>(src1, src2, output, layout),
        GdalDataType::Float32 => write_merged::<f32>(src1, src2, output, layout),
        GdalDataType::Float64 => write_merged::<f64>(src1, src2, output, layout),
        other => Err(Pm25Error::data(format!(
            "unsupported pixel type {:?} in primary raster",
            other
        ))),
    }
}

fn write_merged<T: GdalType + Copy>(
    src1: &Dataset,
    src2: &Dataset,
    output: &Path,
    layout: &OutputLayout,
) -> Pm25Result<()> {
    let write_err = |e: GdalError| Pm25Error::RasterWriteError(format!("{}: {}", output.display(), e));
    let GridShape { height, width } = layout.shape;

    let driver = DriverManager::get_driver_by_name("GTiff").map_err(write_err)?;
    let mut dst = driver
        .create_with_band_type::<T, _>(
            output,
            width,
            height,
            layout.descriptions.len(),
        )
        .map_err(write_err)?;

    if !layout.projection.is_empty() {
        dst.set_projection(&layout.projection).map_err(write_err)?;
    }
    dst.set_geo_transform(&layout.geo_transform.0).map_err(write_err)?;

    let sources = [src1, src2];
    let mut out_index = 1usize;
    for src in sources {
        for n in 1..=dataset::band_count(src) {
            let (src_width, src_height) = src.raster_size();
            let mut buffer = src
                .rasterband(n)
                .and_then(|b| {
                    b.read_as::<T>(
                        (0, 0),
                        (src_width, src_height),
                        (width, height),
                        Some(ResampleAlg::NearestNeighbour),
                    )
                })
                .map_err(|e| Pm25Error::data_read(format!("band {}: {}", n, e)))?;

            let mut out_band = dst.rasterband(out_index).map_err(write_err)?;
            out_band
                .write((0, 0), (width, height), &mut buffer)
                .map_err(write_err)?;
            out_band
                .set_description(&layout.descriptions[out_index - 1])
                .map_err(write_err)?;
            if let Some(no_data) = layout.no_data {
                out_band.set_no_data_value(Some(no_data)).map_err(write_err)?;
            }
            out_index += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{era5_fixture, grid, RasterFixture};

    #[test]
    fn test_unsupported_pixel_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let primary = RasterFixture::new(grid::SIMPLE_2X2)
            .band("aod", vec![1.0, 2.0, 3.0, 4.0])
            .write(dir.path().join("a.tif"));
        let secondary = era5_fixture().write(dir.path().join("b.tif"));
        let output = dir.path().join("out.tif");

        let src1 = dataset::open(&primary).unwrap();
        let src2 = dataset::open(&secondary).unwrap();
        let layout = OutputLayout {
            shape: GridShape::new(2, 2),
            geo_transform: dataset::geo_transform(&src1, &primary).unwrap(),
            projection: src1.projection(),
            descriptions: vec!["aod".to_string(); 4],
            no_data: None,
        };

        let err = write_as(GdalDataType::Unknown, &src1, &src2, &output, &layout).unwrap_err();
        assert_eq!(err.kind(), "data");
        assert!(err.to_string().contains("Unknown"));
        assert!(!output.exists());
    }
}
