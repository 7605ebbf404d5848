//! Writes a demo `listings.csv` plus the matching `price_model.json`.
//!
//! Prices are drawn from the written model's own weights plus noise, so the
//! dashboard's prediction panel produces numbers in the right ballpark for
//! the generated data.

use std::collections::BTreeMap;

use serde_json::json;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn range_u32(&mut self, low: u32, high: u32) -> u32 {
        low + (self.next_u64() % (high - low + 1) as u64) as u32
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct City {
    name: &'static str,
    lat: f64,
    lon: f64,
    weight: f64,
    neighbourhoods: &'static [(&'static str, f64)],
}

const CITIES: [City; 6] = [
    City {
        name: "Boston",
        lat: 42.36,
        lon: -71.06,
        weight: 10.0,
        neighbourhoods: &[("Back Bay", 25.0), ("Fenway", 10.0), ("Dorchester", -5.0)],
    },
    City {
        name: "Chicago",
        lat: 41.88,
        lon: -87.63,
        weight: -5.0,
        neighbourhoods: &[("Lincoln Park", 15.0), ("Logan Square", 5.0), ("Hyde Park", 0.0)],
    },
    City {
        name: "DC",
        lat: 38.91,
        lon: -77.04,
        weight: 5.0,
        neighbourhoods: &[("Georgetown", 30.0), ("Capitol Hill", 12.0), ("Shaw", 4.0)],
    },
    City {
        name: "LA",
        lat: 34.05,
        lon: -118.24,
        weight: 15.0,
        neighbourhoods: &[("Venice", 28.0), ("Silver Lake", 10.0), ("Koreatown", -2.0)],
    },
    City {
        name: "NYC",
        lat: 40.71,
        lon: -74.01,
        weight: 35.0,
        neighbourhoods: &[
            ("Chelsea", 40.0),
            ("Harlem", 8.0),
            ("Williamsburg", 22.0),
            ("Astoria", 5.0),
        ],
    },
    City {
        name: "SF",
        lat: 37.77,
        lon: -122.42,
        weight: 30.0,
        neighbourhoods: &[("Mission", 18.0), ("Castro", 20.0), ("Sunset", 6.0)],
    },
];

const ROOM_TYPES: [(&str, f64); 3] = [
    ("Entire home/apt", 55.0),
    ("Private room", 20.0),
    ("Shared room", 5.0),
];

const PROPERTY_TYPES: [(&str, f64); 4] = [
    ("Apartment", 0.0),
    ("House", 12.0),
    ("Condominium", 8.0),
    ("Loft", 15.0),
];

const RESPONSE_RATES: [(&str, f64); 4] =
    [("100%", 6.0), ("90%", 3.0), ("80%", 0.0), ("50%", -4.0)];

const INTERCEPT: f64 = 30.0;
const W_ACCOMMODATES: f64 = 14.0;
const W_BATHROOMS: f64 = 10.0;
const W_BEDROOMS: f64 = 18.0;
const W_BEDS: f64 = 6.0;

fn main() {
    let mut rng = SimpleRng::new(42);

    let mut wtr = csv::Writer::from_path("listings.csv").expect("create listings.csv");
    wtr.write_record([
        "id",
        "name",
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
    ])
    .expect("write header");

    let mut id: u64 = 0;
    for city in &CITIES {
        for _ in 0..120 {
            id += 1;

            let (neighbourhood, n_weight) = *rng.pick(city.neighbourhoods);
            let (room_type, rt_weight) = *rng.pick(&ROOM_TYPES);
            let (property_type, pt_weight) = *rng.pick(&PROPERTY_TYPES);
            let (response_rate, rr_weight) = *rng.pick(&RESPONSE_RATES);

            let accommodates = rng.range_u32(1, 8);
            let bedrooms = rng.range_u32(0, 4) as f64;
            let beds = (bedrooms + rng.range_u32(0, 2) as f64).max(1.0);
            let bathrooms = 0.5 + 0.5 * rng.range_u32(1, 5) as f64;
            let reviews = (rng.next_f64().powi(2) * 350.0) as u32;
            let cleaning_fee = rng.next_f64() < 0.65;
            let verified = rng.next_f64() < 0.7;

            let price = (INTERCEPT
                + W_ACCOMMODATES * accommodates as f64
                + W_BATHROOMS * bathrooms
                + W_BEDROOMS * bedrooms
                + W_BEDS * beds
                + city.weight
                + n_weight
                + rt_weight
                + pt_weight
                + rr_weight
                + rng.gauss(0.0, 12.0))
            .max(10.0);

            let latitude = city.lat + rng.gauss(0.0, 0.03);
            let longitude = city.lon + rng.gauss(0.0, 0.03);

            // Leave a few nullable cells empty so the dashboard exercises
            // its missing-value paths.
            let bedrooms_cell = if rng.next_f64() < 0.03 {
                String::new()
            } else {
                format!("{bedrooms}")
            };

            wtr.write_record([
                id.to_string(),
                format!("{room_type} in {neighbourhood}"),
                city.name.to_string(),
                neighbourhood.to_string(),
                room_type.to_string(),
                property_type.to_string(),
                format!("{price:.2}"),
                accommodates.to_string(),
                format!("{bathrooms}"),
                bedrooms_cell,
                format!("{beds}"),
                reviews.to_string(),
                if cleaning_fee { "t" } else { "f" }.to_string(),
                if verified { "t" } else { "f" }.to_string(),
                response_rate.to_string(),
                format!("{latitude:.5}"),
                format!("{longitude:.5}"),
            ])
            .expect("write row");
        }
    }
    wtr.flush().expect("flush listings.csv");

    let weights = |pairs: &[(&str, f64)]| -> BTreeMap<String, f64> {
        pairs.iter().map(|&(k, w)| (k.to_string(), w)).collect()
    };
    let city_weights: BTreeMap<String, f64> = CITIES
        .iter()
        .map(|c| (c.name.to_string(), c.weight))
        .collect();
    let neighbourhood_weights: BTreeMap<String, f64> = CITIES
        .iter()
        .flat_map(|c| c.neighbourhoods.iter())
        .map(|&(n, w)| (n.to_string(), w))
        .collect();

    let model = json!({
        "intercept": INTERCEPT,
        "numeric": {
            "accommodates": W_ACCOMMODATES,
            "bathrooms": W_BATHROOMS,
            "bedrooms": W_BEDROOMS,
            "beds": W_BEDS,
        },
        "categorical": {
            "city": city_weights,
            "neighbourhood": neighbourhood_weights,
            "room_type": weights(&ROOM_TYPES),
            "property_type": weights(&PROPERTY_TYPES),
            "host_response_rate": weights(&RESPONSE_RATES),
        },
    });
    std::fs::write(
        "price_model.json",
        serde_json::to_string_pretty(&model).expect("serialize model"),
    )
    .expect("write price_model.json");

    println!("Wrote {id} listings to listings.csv and weights to price_model.json");
}
