use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// RoomType – the three-level room category
// ---------------------------------------------------------------------------

/// Room category of a listing. The dataset encodes exactly these three
/// values; anything else in the `room_type` column is malformed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomType {
    EntireHomeApt,
    PrivateRoom,
    SharedRoom,
}

impl RoomType {
    pub const ALL: [RoomType; 3] = [
        RoomType::EntireHomeApt,
        RoomType::PrivateRoom,
        RoomType::SharedRoom,
    ];

    /// The token used in the CSV and shown in the UI.
    pub fn label(self) -> &'static str {
        match self {
            RoomType::EntireHomeApt => "Entire home/apt",
            RoomType::PrivateRoom => "Private room",
            RoomType::SharedRoom => "Shared room",
        }
    }

    /// Parse the CSV token. Exact match only.
    pub fn parse(token: &str) -> Option<RoomType> {
        RoomType::ALL.into_iter().find(|rt| rt.label() == token)
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// VerificationStatus – host identity verification flag
// ---------------------------------------------------------------------------

/// Host identity verification, decoded from the dataset's string token.
///
/// Mapping: `"t"` → `Verified`, `"f"` → `NotVerified`, any other token →
/// `Unknown`. The mapping is exact; no substring sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationStatus {
    Verified,
    NotVerified,
    Unknown,
}

impl VerificationStatus {
    pub const ALL: [VerificationStatus; 3] = [
        VerificationStatus::Verified,
        VerificationStatus::NotVerified,
        VerificationStatus::Unknown,
    ];

    pub fn from_token(token: &str) -> VerificationStatus {
        match token.trim() {
            "t" => VerificationStatus::Verified,
            "f" => VerificationStatus::NotVerified,
            _ => VerificationStatus::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VerificationStatus::Verified => "Verified",
            VerificationStatus::NotVerified => "Not verified",
            VerificationStatus::Unknown => "Unknown",
        }
    }

    /// Position in [`VerificationStatus::ALL`], used to index tally arrays.
    pub fn index(self) -> usize {
        match self {
            VerificationStatus::Verified => 0,
            VerificationStatus::NotVerified => 1,
            VerificationStatus::Unknown => 2,
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Listing – one row of the dataset
// ---------------------------------------------------------------------------

/// A single Airbnb listing (one CSV row), fully typed.
///
/// Optional fields are genuinely nullable in the source data; a row with a
/// missing value in a filtered column never satisfies that filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: u64,
    pub name: Option<String>,
    pub city: String,
    pub neighbourhood: Option<String>,
    pub room_type: RoomType,
    pub property_type: String,
    pub price: f64,
    pub accommodates: u32,
    pub bathrooms: Option<f64>,
    pub bedrooms: Option<f64>,
    pub beds: Option<f64>,
    pub number_of_reviews: u32,
    pub cleaning_fee: bool,
    pub host_identity_verified: VerificationStatus,
    pub host_response_rate: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

// ---------------------------------------------------------------------------
// ValueRange – observed min/max of a numeric column
// ---------------------------------------------------------------------------

/// Observed `[min, max]` of a numeric column, used to clamp slider bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    fn empty() -> ValueRange {
        ValueRange {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn observe(&mut self, v: f64) {
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    /// Collapse a range that never observed a value to `[0, 0]`.
    fn normalized(self) -> ValueRange {
        if self.min > self.max {
            ValueRange { min: 0.0, max: 0.0 }
        } else {
            self
        }
    }
}

/// Observed ranges for every numeric column the UI exposes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedRanges {
    pub price: ValueRange,
    pub accommodates: ValueRange,
    pub bathrooms: ValueRange,
    pub bedrooms: ValueRange,
    pub beds: ValueRange,
    pub reviews: ValueRange,
}

// ---------------------------------------------------------------------------
// Tallies – whole-dataset counts for the composition charts
// ---------------------------------------------------------------------------

/// Whole-dataset counts, derived once at load time. These feed the pie
/// charts and the host-verification chart, which (like the rest of the
/// composition panels) ignore the sidebar filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Tallies {
    pub with_cleaning_fee: usize,
    pub without_cleaning_fee: usize,
    /// Count per room type, indexed in [`RoomType::ALL`] order.
    pub room_types: [usize; 3],
    /// Per-city host counts, indexed in [`VerificationStatus::ALL`] order.
    pub verification_by_city: BTreeMap<String, [usize; 3]>,
}

// ---------------------------------------------------------------------------
// ListingDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset plus derived lookup state. Built once per load
/// and never mutated afterwards; every component receives it by reference.
#[derive(Debug, PartialEq)]
pub struct ListingDataset {
    /// All listings, in file order.
    pub listings: Vec<Listing>,
    /// Sorted unique cities.
    pub cities: Vec<String>,
    /// Sorted unique neighbourhoods per city.
    pub neighbourhoods: BTreeMap<String, Vec<String>>,
    /// Sorted unique property types.
    pub property_types: Vec<String>,
    /// Sorted unique host response rate tokens.
    pub response_rates: Vec<String>,
    /// Observed numeric bounds (slider clamps).
    pub ranges: ObservedRanges,
    /// Whole-dataset composition counts.
    pub tallies: Tallies,
}

impl ListingDataset {
    /// Build the derived indices from the parsed rows in one pass.
    pub fn from_listings(listings: Vec<Listing>) -> ListingDataset {
        let mut cities: Vec<String> = Vec::new();
        let mut neighbourhoods: BTreeMap<String, std::collections::BTreeSet<String>> =
            BTreeMap::new();
        let mut property_types: Vec<String> = Vec::new();
        let mut response_rates: Vec<String> = Vec::new();

        let mut ranges = ObservedRanges {
            price: ValueRange::empty(),
            accommodates: ValueRange::empty(),
            bathrooms: ValueRange::empty(),
            bedrooms: ValueRange::empty(),
            beds: ValueRange::empty(),
            reviews: ValueRange::empty(),
        };

        let mut tallies = Tallies {
            with_cleaning_fee: 0,
            without_cleaning_fee: 0,
            room_types: [0; 3],
            verification_by_city: BTreeMap::new(),
        };

        for l in &listings {
            if !cities.contains(&l.city) {
                cities.push(l.city.clone());
            }
            if let Some(n) = &l.neighbourhood {
                neighbourhoods
                    .entry(l.city.clone())
                    .or_default()
                    .insert(n.clone());
            }
            if !property_types.contains(&l.property_type) {
                property_types.push(l.property_type.clone());
            }
            if let Some(r) = &l.host_response_rate {
                if !response_rates.contains(r) {
                    response_rates.push(r.clone());
                }
            }

            ranges.price.observe(l.price);
            ranges.accommodates.observe(l.accommodates as f64);
            ranges.reviews.observe(l.number_of_reviews as f64);
            if let Some(v) = l.bathrooms {
                ranges.bathrooms.observe(v);
            }
            if let Some(v) = l.bedrooms {
                ranges.bedrooms.observe(v);
            }
            if let Some(v) = l.beds {
                ranges.beds.observe(v);
            }

            if l.cleaning_fee {
                tallies.with_cleaning_fee += 1;
            } else {
                tallies.without_cleaning_fee += 1;
            }
            let rt_idx = RoomType::ALL
                .iter()
                .position(|rt| *rt == l.room_type)
                .unwrap_or(0);
            tallies.room_types[rt_idx] += 1;
            tallies
                .verification_by_city
                .entry(l.city.clone())
                .or_insert([0; 3])[l.host_identity_verified.index()] += 1;
        }

        cities.sort();
        property_types.sort();
        response_rates.sort();

        ranges.price = ranges.price.normalized();
        ranges.accommodates = ranges.accommodates.normalized();
        ranges.bathrooms = ranges.bathrooms.normalized();
        ranges.bedrooms = ranges.bedrooms.normalized();
        ranges.beds = ranges.beds.normalized();
        ranges.reviews = ranges.reviews.normalized();

        ListingDataset {
            listings,
            cities,
            neighbourhoods: neighbourhoods
                .into_iter()
                .map(|(city, set)| (city, set.into_iter().collect()))
                .collect(),
            property_types,
            response_rates,
            ranges,
            tallies,
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Sorted neighbourhoods of a city (empty slice if the city is unknown).
    pub fn neighbourhoods_of(&self, city: &str) -> &[String] {
        self.neighbourhoods
            .get(city)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}
