use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use super::error::DataError;
use super::model::{Listing, ListingDataset, RoomType, VerificationStatus};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Columns that must appear in the header row. `name` is optional (used only
/// for hover text); everything else is part of the schema contract.
const REQUIRED_COLUMNS: [&str; 16] = [
    "id",
    "city",
    "neighbourhood",
    "room_type",
    "property_type",
    "price",
    "accommodates",
    "bathrooms",
    "bedrooms",
    "beds",
    "number_of_reviews",
    "cleaning_fee",
    "host_identity_verified",
    "host_response_rate",
    "latitude",
    "longitude",
];

/// Load a listings dataset from a CSV file.
///
/// Pure function of the file contents. The load-once contract is explicit at
/// the call site: `main` loads at startup and the app holds the result
/// behind an `Arc`, never mutating it (see [`crate::state::AppState`]).
pub fn load_listings(path: &Path) -> Result<ListingDataset, DataError> {
    let run = || -> Result<ListingDataset> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        parse_listings(file).with_context(|| format!("reading {}", path.display()))
    };
    run().map_err(|e| DataError::DataUnavailable(format!("{e:#}")))
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Raw CSV row as serde sees it. Empty cells deserialize to `None` for the
/// `Option` fields and fail for the required ones.
#[derive(Debug, Deserialize)]
struct RawListing {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    city: String,
    neighbourhood: Option<String>,
    room_type: String,
    property_type: String,
    price: f64,
    accommodates: u32,
    bathrooms: Option<f64>,
    bedrooms: Option<f64>,
    beds: Option<f64>,
    number_of_reviews: u32,
    cleaning_fee: String,
    host_identity_verified: String,
    host_response_rate: Option<String>,
    latitude: f64,
    longitude: f64,
}

fn parse_listings<R: Read>(reader: R) -> Result<ListingDataset> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers().context("reading CSV header")?.clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            bail!("CSV missing '{col}' column");
        }
    }

    let mut listings = Vec::new();
    for (row_no, result) in rdr.deserialize::<RawListing>().enumerate() {
        let raw = result.with_context(|| format!("CSV row {row_no}"))?;
        listings.push(convert(raw, row_no)?);
    }

    if listings.is_empty() {
        bail!("CSV contains no data rows");
    }

    Ok(ListingDataset::from_listings(listings))
}

/// Validate a raw row and convert it to a typed [`Listing`].
///
/// Required numerics must be finite and within their documented domain;
/// optional numerics treat non-finite values like empty cells.
fn convert(raw: RawListing, row: usize) -> Result<Listing> {
    if raw.city.is_empty() {
        bail!("CSV row {row}: empty 'city'");
    }
    if raw.property_type.is_empty() {
        bail!("CSV row {row}: empty 'property_type'");
    }

    let room_type = RoomType::parse(&raw.room_type)
        .with_context(|| format!("CSV row {row}: unknown room type '{}'", raw.room_type))?;

    if !raw.price.is_finite() || raw.price < 0.0 {
        bail!("CSV row {row}: price {} out of range", raw.price);
    }
    if raw.accommodates == 0 {
        bail!("CSV row {row}: accommodates must be positive");
    }
    if !raw.latitude.is_finite() || !raw.longitude.is_finite() {
        bail!("CSV row {row}: non-finite coordinates");
    }

    let cleaning_fee = parse_bool(&raw.cleaning_fee)
        .with_context(|| format!("CSV row {row}: bad cleaning_fee '{}'", raw.cleaning_fee))?;

    Ok(Listing {
        id: raw.id,
        name: raw.name.filter(|s| !s.is_empty()),
        city: raw.city,
        neighbourhood: raw.neighbourhood,
        room_type,
        property_type: raw.property_type,
        price: raw.price,
        accommodates: raw.accommodates,
        bathrooms: optional_count(raw.bathrooms, row, "bathrooms")?,
        bedrooms: optional_count(raw.bedrooms, row, "bedrooms")?,
        beds: optional_count(raw.beds, row, "beds")?,
        number_of_reviews: raw.number_of_reviews,
        cleaning_fee,
        host_identity_verified: VerificationStatus::from_token(&raw.host_identity_verified),
        host_response_rate: raw.host_response_rate.filter(|s| !s.is_empty()),
        latitude: raw.latitude,
        longitude: raw.longitude,
    })
}

fn parse_bool(token: &str) -> Option<bool> {
    match token.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "1" => Some(true),
        "f" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn optional_count(value: Option<f64>, row: usize, col: &str) -> Result<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() => Ok(None),
        Some(v) if v < 0.0 => bail!("CSV row {row}: negative {col} {v}"),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,name,city,neighbourhood,room_type,property_type,price,accommodates,bathrooms,bedrooms,beds,number_of_reviews,cleaning_fee,host_identity_verified,host_response_rate,latitude,longitude";

    fn csv_with_rows(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    fn sample_csv() -> String {
        csv_with_rows(&[
            "1,Cozy loft,NYC,Harlem,Entire home/apt,Apartment,120.0,4,1.0,2.0,2.0,35,t,t,100%,40.81,-73.95",
            "2,,NYC,Chelsea,Private room,Apartment,75.5,2,1.0,,1.0,12,f,f,90%,40.74,-74.00",
            "3,Sunny flat,SF,Mission,Shared room,House,60.0,1,0.5,1.0,1.0,0,t,t,,37.76,-122.41",
        ])
    }

    #[test]
    fn test_parse_valid_csv() {
        let ds = parse_listings(sample_csv().as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);

        let first = &ds.listings[0];
        assert_eq!(first.id, 1);
        assert_eq!(first.name.as_deref(), Some("Cozy loft"));
        assert_eq!(first.room_type, RoomType::EntireHomeApt);
        assert_eq!(first.price, 120.0);
        assert!(first.cleaning_fee);
        assert_eq!(
            first.host_identity_verified,
            VerificationStatus::Verified
        );

        // Empty cells become None for the nullable columns.
        let second = &ds.listings[1];
        assert_eq!(second.name, None);
        assert_eq!(second.bedrooms, None);
        assert_eq!(ds.listings[2].host_response_rate, None);

        // Derived lookup state reflects the rows.
        assert_eq!(ds.cities, vec!["NYC".to_string(), "SF".to_string()]);
        assert_eq!(ds.ranges.price.min, 60.0);
        assert_eq!(ds.ranges.price.max, 120.0);
    }

    #[test]
    fn test_missing_file_is_data_unavailable() {
        let err = load_listings(Path::new("/nonexistent/listings.csv")).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable(_)));
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "id,name,city\n1,Loft,NYC";
        let err = parse_listings(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("missing 'neighbourhood'"));
    }

    #[test]
    fn test_non_parseable_numeric_field() {
        let csv = csv_with_rows(&[
            "1,Loft,NYC,Harlem,Entire home/apt,Apartment,not-a-number,4,1.0,2.0,2.0,35,t,t,100%,40.81,-73.95",
        ]);
        assert!(parse_listings(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_unknown_room_type_rejected() {
        let csv = csv_with_rows(&[
            "1,Loft,NYC,Harlem,Penthouse,Apartment,120.0,4,1.0,2.0,2.0,35,t,t,100%,40.81,-73.95",
        ]);
        let err = parse_listings(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("unknown room type"));
    }

    #[test]
    fn test_header_only_csv_rejected() {
        let err = parse_listings(HEADER.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("no data rows"));
    }

    #[test]
    fn test_negative_price_rejected() {
        let csv = csv_with_rows(&[
            "1,Loft,NYC,Harlem,Entire home/apt,Apartment,-5.0,4,1.0,2.0,2.0,35,t,t,100%,40.81,-73.95",
        ]);
        assert!(parse_listings(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_loading_twice_yields_identical_tables() {
        let path = std::env::temp_dir().join(format!(
            "listing-lens-loader-test-{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, sample_csv()).unwrap();

        let a = load_listings(&path).unwrap();
        let b = load_listings(&path).unwrap();
        assert_eq!(a, b);

        std::fs::remove_file(&path).ok();
    }
}
