use std::sync::Arc;

use arrow::array::{Float64Array, Int32Array, Int64Array, ListBuilder, StringArray, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use rusty_wheels::data::category::CategoryKey;
use rusty_wheels::data::model::{CONDITIONS, DISTRICTS, FUEL_TYPES, TRANSMISSIONS};
use rusty_wheels::data::taxonomy::Taxonomy;

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

/// (form label, taxonomy category, base price in rupees)
const KINDS: [(&str, CategoryKey, f64); 7] = [
    ("Car", CategoryKey::Cars, 6_000_000.0),
    ("SUV/Jeep", CategoryKey::Suvs, 14_000_000.0),
    ("Van", CategoryKey::Vans, 8_000_000.0),
    ("Pickup/Double Cab", CategoryKey::Pickups, 11_000_000.0),
    ("Three Wheel", CategoryKey::ThreeWheel, 1_400_000.0),
    ("Motorcycle", CategoryKey::Motorbikes, 450_000.0),
    ("Lorry/Tipper", CategoryKey::Lorries, 9_000_000.0),
];

const SELLERS: [&str; 5] = ["Nimal Perera", "Kasun Silva", "Ayesha Fernando", "Ruwan Jayasinghe", "Dilani Wickramasinghe"];

struct Row {
    id: String,
    title: String,
    make: String,
    model: String,
    listing_type: String,
    condition: String,
    transmission: String,
    fuel_type: String,
    district: String,
    price: f64,
    year: i32,
    mileage: i64,
    seller: String,
    posted: String,
}

fn main() {
    let taxonomy = Taxonomy::builtin().expect("built-in taxonomy");
    let mut rng = SimpleRng::new(42);
    let n_rows = 240;

    let mut rows = Vec::with_capacity(n_rows);
    while rows.len() < n_rows {
        let &(label, category, base_price) = rng.pick(&KINDS);
        let makes: Vec<&str> = taxonomy
            .makes(category)
            .into_iter()
            .filter(|m| !taxonomy.models(category, m).is_empty())
            .collect();
        if makes.is_empty() {
            continue;
        }
        let make = *rng.pick(&makes);
        let model = rng.pick(taxonomy.models(category, make)).clone();

        let year = 1995 + rng.below(31) as i32;
        let age = (2026 - year).max(0) as f64;
        let depreciation = (1.0 - 0.04 * age).max(0.15);
        let price = (base_price * depreciation * (0.7 + 0.6 * rng.next_f64()) / 10_000.0).round() * 10_000.0;
        let condition = if year >= 2024 {
            CONDITIONS[0]
        } else {
            *rng.pick(&CONDITIONS[1..])
        };
        let id = rows.len() + 1;

        rows.push(Row {
            id: format!("L{id:05}"),
            title: format!("{make} {model} {year}"),
            make: make.to_string(),
            model,
            listing_type: label.to_string(),
            condition: condition.to_string(),
            transmission: rng.pick(&TRANSMISSIONS).to_string(),
            fuel_type: rng.pick(&FUEL_TYPES).to_string(),
            district: rng.pick(&DISTRICTS).to_string(),
            price,
            year,
            mileage: (age * 9_000.0 * (0.5 + rng.next_f64())) as i64,
            seller: rng.pick(&SELLERS).to_string(),
            posted: format!("2026-{:02}-{:02}", 1 + rng.below(9), 1 + rng.below(28)),
        });
    }

    let strings = |f: fn(&Row) -> &str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());

    let mut images = ListBuilder::new(StringBuilder::new());
    for _ in &rows {
        images.append(true);
    }

    let list_of_utf8 = DataType::List(Arc::new(Field::new("item", DataType::Utf8, true)));
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("title", DataType::Utf8, false),
        Field::new("make", DataType::Utf8, false),
        Field::new("model", DataType::Utf8, false),
        Field::new("type", DataType::Utf8, false),
        Field::new("condition", DataType::Utf8, false),
        Field::new("transmission", DataType::Utf8, false),
        Field::new("fuelType", DataType::Utf8, false),
        Field::new("district", DataType::Utf8, false),
        Field::new("price", DataType::Float64, false),
        Field::new("year", DataType::Int32, false),
        Field::new("mileage", DataType::Int64, false),
        Field::new("images", list_of_utf8, true),
        Field::new("sellerName", DataType::Utf8, false),
        Field::new("postedDate", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(strings(|r| &r.id)),
            Arc::new(strings(|r| &r.title)),
            Arc::new(strings(|r| &r.make)),
            Arc::new(strings(|r| &r.model)),
            Arc::new(strings(|r| &r.listing_type)),
            Arc::new(strings(|r| &r.condition)),
            Arc::new(strings(|r| &r.transmission)),
            Arc::new(strings(|r| &r.fuel_type)),
            Arc::new(strings(|r| &r.district)),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.price).collect::<Vec<_>>())),
            Arc::new(Int32Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.mileage).collect::<Vec<_>>())),
            Arc::new(images.finish()),
            Arc::new(strings(|r| &r.seller)),
            Arc::new(strings(|r| &r.posted)),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let output_path = "sample_listings.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {} listings to {output_path}", rows.len());
}
