use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeListArray,
    ListArray, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{Listing, ListingCollection, split_location};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listing collection from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one row per listing, `images` as a list of strings
/// * `.json`    – `[{ "id": ..., "make": ..., "price": ..., ... }, ...]`
/// * `.csv`     – header row; `images` as semicolon-separated paths
///
/// Rows that carry a `location` of the form `"City, District"` instead of
/// separate `city`/`district` fields are split on load.
pub fn load_file(path: &Path) -> Result<ListingCollection> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let listings = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    Ok(ListingCollection::from_listings(listings))
}

/// Fill `city`/`district` from a combined location when they are missing.
fn apply_location(listing: &mut Listing, location: Option<&str>) {
    let Some(location) = location.filter(|l| !l.trim().is_empty()) else {
        return;
    };
    let (city, district) = split_location(location);
    if listing.city.is_empty() {
        listing.city = city;
    }
    if listing.district.is_empty() {
        listing.district = district;
    }
}

fn check_listing(listing: &Listing, row: usize) -> Result<()> {
    if listing.id.trim().is_empty() {
        bail!("Row {row}: listing has an empty id");
    }
    if !listing.price.is_finite() || listing.price < 0.0 {
        bail!("Row {row}: invalid price {}", listing.price);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct JsonRecord {
    #[serde(flatten)]
    listing: Listing,
    #[serde(default)]
    location: Option<String>,
}

/// Expected JSON schema (records-oriented, as returned by the listings API):
///
/// ```json
/// [
///   {
///     "id": "b7f0…", "title": "Toyota Aqua 2015", "make": "Toyota",
///     "model": "Aqua", "type": "Car", "price": 6500000, "year": 2015,
///     "location": "Nugegoda, Colombo"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Listing>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let records: Vec<JsonRecord> = serde_json::from_str(&text).context("parsing JSON listings")?;

    records
        .into_iter()
        .enumerate()
        .map(|(i, rec)| {
            let mut listing = rec.listing;
            apply_location(&mut listing, rec.location.as_deref());
            check_listing(&listing, i)?;
            Ok(listing)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvRecord {
    id: String,
    #[serde(default)]
    title: String,
    make: String,
    model: String,
    #[serde(rename = "type", alias = "category")]
    listing_type: String,
    #[serde(default)]
    condition: String,
    #[serde(default)]
    transmission: String,
    #[serde(default, alias = "fuel_type")]
    fuel_type: String,
    #[serde(default)]
    district: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    location: String,
    price: f64,
    year: i32,
    #[serde(default)]
    mileage: u64,
    #[serde(default)]
    images: String,
    #[serde(default, alias = "seller_name")]
    seller_name: String,
    #[serde(default, alias = "created_at")]
    posted_date: String,
}

/// CSV layout: header row with column names matching the JSON fields.
/// `images` holds semicolon-separated paths: `"a.jpg;b.jpg"`.
fn load_csv(path: &Path) -> Result<Vec<Listing>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let mut listings = Vec::new();

    for (row_no, result) in reader.deserialize::<CsvRecord>().enumerate() {
        let rec = result.with_context(|| format!("CSV row {row_no}"))?;
        let mut listing = Listing {
            id: rec.id,
            title: rec.title,
            make: rec.make,
            model: rec.model,
            listing_type: rec.listing_type,
            condition: rec.condition,
            transmission: rec.transmission,
            fuel_type: rec.fuel_type,
            district: rec.district,
            city: rec.city,
            price: rec.price,
            year: rec.year,
            mileage: rec.mileage,
            images: split_semicolons(&rec.images),
            seller_name: rec.seller_name,
            posted_date: rec.posted_date,
        };
        apply_location(&mut listing, Some(&rec.location));
        check_listing(&listing, row_no)?;
        listings.push(listing);
    }

    Ok(listings)
}

fn split_semicolons(s: &str) -> Vec<String> {
    s.split(';')
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of listings.
///
/// Required columns: `id`, `make`, `model`, `type` (or `category`), `price`,
/// `year`. Optional string columns default to empty; `images` may be a
/// List<Utf8> or a semicolon-separated Utf8 column.
fn load_parquet(path: &Path) -> Result<Vec<Listing>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut listings = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = Columns::locate(&batch)?;

        for row in 0..batch.num_rows() {
            let offset = listings.len();
            let mut listing = Listing {
                id: required_string(&batch, columns.id, row)
                    .with_context(|| format!("Row {offset}: failed to read 'id'"))?,
                title: optional_string(&batch, columns.title, row),
                make: required_string(&batch, columns.make, row)
                    .with_context(|| format!("Row {offset}: failed to read 'make'"))?,
                model: required_string(&batch, columns.model, row)
                    .with_context(|| format!("Row {offset}: failed to read 'model'"))?,
                listing_type: required_string(&batch, columns.listing_type, row)
                    .with_context(|| format!("Row {offset}: failed to read 'type'"))?,
                condition: optional_string(&batch, columns.condition, row),
                transmission: optional_string(&batch, columns.transmission, row),
                fuel_type: optional_string(&batch, columns.fuel_type, row),
                district: optional_string(&batch, columns.district, row),
                city: optional_string(&batch, columns.city, row),
                price: extract_f64(batch.column(columns.price), row)
                    .with_context(|| format!("Row {offset}: failed to read 'price'"))?,
                year: i32::try_from(
                    extract_i64(batch.column(columns.year), row)
                        .with_context(|| format!("Row {offset}: failed to read 'year'"))?,
                )
                .with_context(|| format!("Row {offset}: year out of range"))?,
                mileage: match columns.mileage {
                    Some(idx) => extract_i64(batch.column(idx), row)
                        .map(|m| m.max(0) as u64)
                        .unwrap_or(0),
                    None => 0,
                },
                images: match columns.images {
                    Some(idx) => extract_string_list(batch.column(idx), row)
                        .with_context(|| format!("Row {offset}: failed to read 'images'"))?,
                    None => Vec::new(),
                },
                seller_name: optional_string(&batch, columns.seller_name, row),
                posted_date: optional_string(&batch, columns.posted_date, row),
            };
            let location = optional_string(&batch, columns.location, row);
            apply_location(&mut listing, Some(&location));
            check_listing(&listing, offset)?;
            listings.push(listing);
        }
    }

    Ok(listings)
}

/// Column positions within one record batch.
struct Columns {
    id: usize,
    make: usize,
    model: usize,
    listing_type: usize,
    price: usize,
    year: usize,
    title: Option<usize>,
    condition: Option<usize>,
    transmission: Option<usize>,
    fuel_type: Option<usize>,
    district: Option<usize>,
    city: Option<usize>,
    location: Option<usize>,
    mileage: Option<usize>,
    images: Option<usize>,
    seller_name: Option<usize>,
    posted_date: Option<usize>,
}

impl Columns {
    fn locate(batch: &RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        let find = |names: &[&str]| names.iter().find_map(|n| schema.index_of(n).ok());
        let require = |names: &[&str]| {
            find(names).with_context(|| format!("Parquet file missing '{}' column", names[0]))
        };

        Ok(Columns {
            id: require(&["id"])?,
            make: require(&["make"])?,
            model: require(&["model"])?,
            listing_type: require(&["type", "category"])?,
            price: require(&["price"])?,
            year: require(&["year"])?,
            title: find(&["title"]),
            condition: find(&["condition"]),
            transmission: find(&["transmission"]),
            fuel_type: find(&["fuelType", "fuel_type"]),
            district: find(&["district"]),
            city: find(&["city"]),
            location: find(&["location"]),
            mileage: find(&["mileage"]),
            images: find(&["images"]),
            seller_name: find(&["sellerName", "seller_name"]),
            posted_date: find(&["postedDate", "created_at"]),
        })
    }
}

// -- Parquet / Arrow helpers --

fn required_string(batch: &RecordBatch, idx: usize, row: usize) -> Result<String> {
    extract_string(batch.column(idx), row)?.context("null value in required column")
}

fn optional_string(batch: &RecordBatch, idx: Option<usize>, row: usize) -> String {
    idx.and_then(|i| extract_string(batch.column(i), row).ok().flatten())
        .unwrap_or_default()
}

/// Read a Utf8 / LargeUtf8 cell. `Ok(None)` for a null cell.
fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Utf8 => Ok(Some(col.as_string::<i32>().value(row).to_string())),
        DataType::LargeUtf8 => Ok(Some(col.as_string::<i64>().value(row).to_string())),
        other => bail!("Expected string column, got {other:?}"),
    }
}

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        Ok(arr.value(row) as f64)
    } else {
        extract_i64(col, row).map(|v| v as f64)
    }
}

fn extract_i64(col: &Arc<dyn Array>, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value in integer column");
    }
    if let Some(arr) = col.as_any().downcast_ref::<Int64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = col.as_any().downcast_ref::<Int32Array>() {
        Ok(arr.value(row) as i64)
    } else {
        bail!("Expected Int32 or Int64 column, got {:?}", col.data_type())
    }
}

/// Extract image paths from a List<Utf8>, LargeList<Utf8> or a
/// semicolon-separated Utf8 cell.
fn extract_string_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<String>> {
    if col.is_null(row) {
        return Ok(Vec::new());
    }

    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        DataType::Utf8 | DataType::LargeUtf8 => {
            let cell = extract_string(col, row)?.unwrap_or_default();
            return Ok(split_semicolons(&cell));
        }
        other => bail!("Expected List or Utf8 column, got {other:?}"),
    };

    let strings = values_array
        .as_any()
        .downcast_ref::<StringArray>()
        .with_context(|| {
            format!(
                "List inner type is {:?}, expected Utf8",
                values_array.data_type()
            )
        })?;
    Ok(strings.iter().flatten().map(str::to_string).collect())
}
