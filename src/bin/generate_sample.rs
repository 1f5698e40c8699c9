use std::path::PathBuf;

use anyhow::{Context, Result};

/// (country, region, income group, base life expectancy, base CO2)
const COUNTRIES: &[(&str, &str, &str, f64, f64)] = &[
    ("India", "South Asia", "Lower middle income", 63.0, 1.0),
    ("Bangladesh", "South Asia", "Lower middle income", 65.0, 0.3),
    ("Nepal", "South Asia", "Lower middle income", 64.0, 0.2),
    ("Germany", "Europe & Central Asia", "High income", 78.5, 9.8),
    ("Poland", "Europe & Central Asia", "High income", 74.5, 8.0),
    ("Kazakhstan", "Europe & Central Asia", "Upper middle income", 66.0, 12.0),
    ("Kenya", "Sub-Saharan Africa", "Lower middle income", 53.0, 0.3),
    ("Niger", "Sub-Saharan Africa", "Low income", 51.0, 0.1),
    ("South Africa", "Sub-Saharan Africa", "Upper middle income", 55.0, 8.5),
    ("Brazil", "Latin America & Caribbean", "Upper middle income", 71.0, 2.0),
    ("Chile", "Latin America & Caribbean", "High income", 77.0, 3.8),
    ("Japan", "East Asia & Pacific", "High income", 81.5, 9.3),
    ("Vietnam", "East Asia & Pacific", "Lower middle income", 72.5, 1.2),
    ("Egypt", "Middle East & North Africa", "Lower middle income", 68.5, 2.2),
    ("Canada", "North America", "High income", 79.5, 16.0),
];

const HEADER: [&str; 14] = [
    "Country Name",
    "Country Code",
    "Region",
    "IncomeGroup",
    "Year",
    "Life Expectancy World Bank",
    "Prevelance of Undernourishment",
    "CO2",
    "Health Expenditure %",
    "Education Expenditure %",
    "Unemployment",
    "Corruption",
    "Communicable",
    "NonCommunicable",
];

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform in [0, 1).
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform.
    fn gauss(&mut self, mean: f64, std: f64) -> f64 {
        let u1 = self.uniform().max(f64::MIN_POSITIVE);
        let u2 = self.uniform();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        mean + std * z
    }
}

fn country_code(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase()
}

fn main() -> Result<()> {
    env_logger::init();

    let out = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_indicators.csv"));

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&out)
        .with_context(|| format!("creating {}", out.display()))?;
    writer.write_record(HEADER).context("writing header")?;

    let mut rows = 0usize;
    for &(country, region, income, base_life, base_co2) in COUNTRIES {
        let code = country_code(country);
        for year in 2001..=2019 {
            let t = f64::from(year - 2001);
            let life = base_life + 0.25 * t + rng.gauss(0.0, 0.3);
            let undernourishment = (30.0 - (base_life - 50.0) * 0.8 - 0.3 * t + rng.gauss(0.0, 1.0)).max(2.5);
            let co2 = (base_co2 * (1.0 + 0.01 * t) + rng.gauss(0.0, 0.05 * base_co2)).max(0.01);
            let health = (base_life / 10.0 - 3.0 + rng.gauss(0.0, 0.4)).max(1.0);
            let education = (2.5 + base_life / 40.0 + rng.gauss(0.0, 0.5)).max(1.0);
            let unemployment = (6.0 + rng.gauss(0.0, 2.0)).max(0.5);
            let communicable = (90.0 - base_life + rng.gauss(0.0, 2.0)).max(1.0);
            let non_communicable = (base_life - 10.0 + rng.gauss(0.0, 2.0)).max(1.0);

            // Corruption is published irregularly; leave gaps as the real
            // data does.
            let corruption = if rng.uniform() < 0.15 {
                "n/a".to_string()
            } else {
                format!("{:.1}", (base_life - 40.0 + rng.gauss(0.0, 3.0)).clamp(5.0, 95.0))
            };

            writer
                .write_record([
                    country.to_string(),
                    code.clone(),
                    region.to_string(),
                    income.to_string(),
                    year.to_string(),
                    format!("{life:.2}"),
                    format!("{undernourishment:.1}"),
                    format!("{co2:.3}"),
                    format!("{health:.2}"),
                    format!("{education:.2}"),
                    format!("{unemployment:.2}"),
                    corruption,
                    format!("{communicable:.2}"),
                    format!("{non_communicable:.2}"),
                ])
                .with_context(|| format!("writing {country} {year}"))?;
            rows += 1;
        }
    }

    writer.flush().context("flushing CSV")?;
    log::info!("Wrote {rows} rows to {}", out.display());
    println!("Wrote {rows} rows to {}", out.display());
    Ok(())
}
