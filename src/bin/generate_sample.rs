use anyhow::{Context, Result};
use panda_explorer::data::export::to_csv_bytes;
use panda_explorer::{CellValue, Column, Table};
use serde_json::{Map, Value as JsonValue};

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// People with an age, a city, a department, an income loosely tied to age,
/// and roughly 3% of cells left empty.
fn build_table(rows: usize, rng: &mut SimpleRng) -> Result<Table> {
    let cities = ["NY", "LA", "Chicago", "Houston", "Phoenix"];
    let departments = ["Sales", "Engineering", "Support"];

    let mut age = Vec::with_capacity(rows);
    let mut city = Vec::with_capacity(rows);
    let mut department = Vec::with_capacity(rows);
    let mut income = Vec::with_capacity(rows);
    let mut score = Vec::with_capacity(rows);

    let gap = |rng: &mut SimpleRng, v: CellValue| if rng.next_f64() < 0.03 { CellValue::Null } else { v };

    for _ in 0..rows {
        let a = rng.gauss(40.0, 12.0).clamp(18.0, 80.0).round();
        let inc = (25_000.0 + a * 900.0 + rng.gauss(0.0, 8_000.0)).round();
        let sc = (rng.gauss(70.0, 10.0) * 10.0).round() / 10.0;

        let c = rng.pick(&cities).to_string();
        let d = rng.pick(&departments).to_string();

        age.push(gap(rng, CellValue::Integer(a as i64)));
        city.push(gap(rng, CellValue::String(c)));
        department.push(CellValue::String(d));
        income.push(gap(rng, CellValue::Float(inc)));
        score.push(gap(rng, CellValue::Float(sc)));
    }

    Table::new(vec![
        Column::new("age", age),
        Column::new("city", city),
        Column::new("department", department),
        Column::new("income", income),
        Column::new("score", score),
    ])
    .context("assembling sample table")
}

/// Records-oriented JSON (`[{column: value}, …]`).
fn to_json_records(table: &Table) -> JsonValue {
    let names = table.column_names();
    let records = (0..table.row_count())
        .map(|r| {
            let obj: Map<String, JsonValue> = names
                .iter()
                .zip(table.row(r))
                .map(|(name, cell)| {
                    let value = match cell {
                        CellValue::Integer(i) => JsonValue::from(*i),
                        CellValue::Float(f) => JsonValue::from(*f),
                        CellValue::Bool(b) => JsonValue::from(*b),
                        CellValue::String(s) | CellValue::Date(s) => JsonValue::from(s.as_str()),
                        CellValue::Null => JsonValue::Null,
                    };
                    (name.clone(), value)
                })
                .collect();
            JsonValue::Object(obj)
        })
        .collect();
    JsonValue::Array(records)
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);
    let table = build_table(500, &mut rng)?;

    let csv = to_csv_bytes(&table).context("serialising CSV")?;
    std::fs::write("sample.csv", csv).context("writing sample.csv")?;
    let json = serde_json::to_vec_pretty(&to_json_records(&table)).context("serialising JSON")?;
    std::fs::write("sample.json", json).context("writing sample.json")?;

    println!(
        "Wrote {} rows × {} columns to sample.csv and sample.json",
        table.row_count(),
        table.column_count()
    );
    Ok(())
}
