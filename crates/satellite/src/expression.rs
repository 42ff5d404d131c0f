//! Earth Engine REST expression graphs.
//!
//! Expressions are trees of function invocations encoded as JSON; every
//! node here is inlined under a single root value.

use chrono::NaiveDate;
use pm25_common::Region;
use serde_json::{json, Value};

use crate::sources::SatelliteSource;

fn invoke(function: &str, arguments: Value) -> Value {
    json!({
        "functionInvocationValue": {
            "functionName": function,
            "arguments": arguments,
        }
    })
}

fn constant(value: impl Into<Value>) -> Value {
    json!({ "constantValue": value.into() })
}

fn polygon(region: &Region) -> Value {
    invoke(
        "GeometryConstructors.Polygon",
        json!({
            "coordinates": constant(json!([region.ring])),
            "geodesic": constant(false),
        }),
    )
}

fn filter(collection: Value, predicate: Value) -> Value {
    invoke(
        "Collection.filter",
        json!({ "collection": collection, "filter": predicate }),
    )
}

/// Daily mean image of `source` over `region`, clipped and reprojected to
/// the source's export scale.
pub fn daily_mean(source: SatelliteSource, region: &Region, date: NaiveDate) -> Value {
    let geometry = polygon(region);
    let next = date.succ_opt().unwrap_or(date);

    let mut collection = invoke(
        "ImageCollection.load",
        json!({ "id": constant(source.collection()) }),
    );

    if let Some(needle) = source.index_filter() {
        collection = filter(
            collection,
            invoke(
                "Filter.stringContains",
                json!({
                    "leftField": constant("system:index"),
                    "rightValue": constant(needle),
                }),
            ),
        );
    }

    collection = filter(
        collection,
        invoke(
            "Filter.intersects",
            json!({
                "leftField": constant(".all"),
                "rightValue": geometry.clone(),
            }),
        ),
    );

    collection = filter(
        collection,
        invoke(
            "Filter.dateRangeContains",
            json!({
                "leftValue": invoke(
                    "DateRange",
                    json!({
                        "start": constant(date.to_string()),
                        "end": constant(next.to_string()),
                    }),
                ),
                "rightField": constant("system:time_start"),
            }),
        ),
    );

    let mean = invoke("reduce.mean", json!({ "collection": collection }));
    let selected = invoke(
        "Image.select",
        json!({
            "input": mean,
            "bandSelectors": constant(json!(source.bands())),
        }),
    );
    let reprojected = invoke(
        "Image.reproject",
        json!({
            "image": selected,
            "crs": invoke("Projection", json!({ "crs": constant("EPSG:4326") })),
            "scale": constant(source.scale_m()),
        }),
    );
    let clipped = invoke(
        "Image.clip",
        json!({ "input": reprojected, "geometry": geometry }),
    );

    json!({ "result": "0", "values": { "0": clipped } })
}
