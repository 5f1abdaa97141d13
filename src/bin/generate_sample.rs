//! Writes `sample_data.csv`: a small sales table with a few empty cells and
//! repeated rows, for trying out the cleaning and aggregation tools.

use anyhow::{Context, Result};

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let regions = ["North", "South", "East", "West"];
    let products = ["Widget", "Gadget", "Gizmo"];
    let base_price = |product: &str| match product {
        "Widget" => 2.5,
        "Gadget" => 12.0,
        _ => 7.25,
    };

    let mut records: Vec<[String; 5]> = Vec::new();
    for id in 1..=60 {
        let region = rng.pick(&regions);
        let product = rng.pick(&products);
        let units = 1 + rng.next_u64() % 40;
        let price = base_price(product) * (0.9 + 0.2 * rng.next_f64());
        // Roughly one row in twelve is missing its price.
        let price = if rng.next_f64() < 0.08 {
            String::new()
        } else {
            format!("{price:.2}")
        };
        records.push([
            id.to_string(),
            region.to_string(),
            product.to_string(),
            units.to_string(),
            price,
        ]);
    }
    // Exact duplicates for the "Remove Duplicates" action.
    for i in [3, 17, 42] {
        records.push(records[i].clone());
    }

    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(["id", "region", "product", "units", "price"])?;
    for record in &records {
        writer.write_record(record)?;
    }
    writer.flush()?;

    println!("Wrote {} rows to {output_path}", records.len());
    Ok(())
}
