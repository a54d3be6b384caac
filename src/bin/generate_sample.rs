//! Writes a deterministic sample trade dataset to `data/`, one CSV per
//! reporter, using the verbose raw headers the loader renames away.

use std::path::Path;

/// Raw source-style header; the loader only cares about column positions.
const HEADER: [&str; 8] = [
    "Reporter Name",
    "Reporter Code",
    "Partner Name",
    "Partner Code",
    "Year",
    "Export (US$)",
    "Import (US$)",
    "Trade Balance (US$)",
];

const REPORTERS: [(&str, &str); 5] = [
    ("Malaysia", "MYS"),
    ("Indonesia", "IDN"),
    ("Singapore", "SGP"),
    ("Thailand", "THA"),
    ("Vietnam", "VNM"),
];

const PARTNERS: [(&str, &str); 18] = [
    ("China", "CHN"),
    ("United States", "USA"),
    ("Japan", "JPN"),
    ("South Korea", "KOR"),
    ("India", "IND"),
    ("Germany", "DEU"),
    ("Australia", "AUS"),
    ("United Kingdom", "GBR"),
    ("Netherlands", "NLD"),
    ("France", "FRA"),
    ("Saudi Arabia", "SAU"),
    ("United Arab Emirates", "ARE"),
    ("Brazil", "BRA"),
    ("Mexico", "MEX"),
    ("Canada", "CAN"),
    ("Italy", "ITA"),
    ("Spain", "ESP"),
    ("Turkey", "TUR"),
];

const YEARS: std::ops::RangeInclusive<i32> = 2015..=2022;

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
}

/// Trade value in USD for one flow: partner-rank base scale, mild yearly
/// growth, multiplicative noise. Clamped at zero.
fn flow_value(rng: &mut SimpleRng, partner_rank: usize, year: i32, bias: f64) -> f64 {
    let base = 40.0e9 / (1.0 + partner_rank as f64);
    let growth = 1.0 + 0.04 * (year - 2015) as f64;
    let noise = rng.gauss(1.0, 0.15);
    (base * growth * bias * noise).max(0.0)
}

fn main() {
    let out_dir = Path::new("data");
    std::fs::create_dir_all(out_dir).expect("creating data directory");

    let mut rng = SimpleRng::new(42);
    let mut total_rows = 0usize;

    for (reporter, reporter_code) in REPORTERS {
        let path = out_dir.join(format!(
            "{}_trade.csv",
            reporter.to_ascii_lowercase().replace(' ', "_")
        ));
        let mut writer = csv::Writer::from_path(&path).expect("creating CSV file");
        writer.write_record(HEADER).expect("writing header");

        for year in YEARS {
            for (rank, (partner, partner_code)) in PARTNERS.iter().enumerate() {
                let export = flow_value(&mut rng, rank, year, 1.05);
                let import = flow_value(&mut rng, rank, year, 0.95);

                // A sprinkling of blank cells so the cleaning path has
                // something to drop.
                let export_field = if rng.next_f64() < 0.01 {
                    String::new()
                } else {
                    format!("{export:.0}")
                };

                let year_field = year.to_string();
                let import_field = format!("{import:.0}");
                let balance_field = format!("{:.0}", export - import);
                writer
                    .write_record([
                        reporter,
                        reporter_code,
                        partner,
                        partner_code,
                        year_field.as_str(),
                        export_field.as_str(),
                        import_field.as_str(),
                        balance_field.as_str(),
                    ])
                    .expect("writing row");
                total_rows += 1;
            }
        }
        writer.flush().expect("flushing CSV");
        println!("Wrote {}", path.display());
    }

    println!(
        "Wrote {total_rows} rows across {} reporters into {}",
        REPORTERS.len(),
        out_dir.display()
    );
}
