//! Writes a synthetic `results/` directory: one voltage sweep and one `_Iin`
//! input-current sweep for each of the 27 PVT corners.
//!
//! Usage: `generate_sample [OUTPUT_DIR]` (defaults to `results`).

use std::path::{Path, PathBuf};

const PROCESSES: [(&str, f64); 3] = [("ss", 0.26), ("tt", 0.20), ("ff", 0.15)];
const OFFSETS: [(&str, f64); 3] = [("01", 0.9), ("0", 1.0), ("10", 1.1)];
const TEMPERATURES: [u32; 3] = [0, 27, 50];
const TARGETS: [f64; 3] = [40e-6, 45e-6, 50e-6];

/// Small deterministic noise source (splitmix64).
struct Noise {
    state: u64,
}

impl Noise {
    fn new(seed: u64) -> Self {
        Noise { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[-amplitude, amplitude)`.
    fn jitter(&mut self, amplitude: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        (unit * 2.0 - 1.0) * amplitude
    }
}

/// Output current of the mirror at output voltage `v` for input `iin`.
fn mirror_current(iin: f64, v: f64, v_sat: f64, vdd: f64) -> f64 {
    let channel_modulation = 1.0 + 0.03 * v / vdd;
    iin * (1.0 - (-v / v_sat).exp()) * channel_modulation
}

fn write_table(path: &Path, header: [&str; 3], rows: &[[f64; 3]]) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row.iter().map(|v| format!("{v:e}")))?;
    }
    writer.flush()?;
    Ok(())
}

fn main() {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("results"));
    std::fs::create_dir_all(&out_dir).expect("Failed to create output directory");

    let mut noise = Noise::new(42);
    let mut written = 0;

    for (process, v_sat_nominal) in PROCESSES {
        for (offset, vdd) in OFFSETS {
            for temperature in TEMPERATURES {
                let stem = format!("{process}_{offset}_{temperature}");
                let v_sat = v_sat_nominal * (1.0 + 0.002 * (temperature as f64 - 27.0)) / vdd;

                // Voltage sweep: three stacked experiments, 0 → VDD in 10 mV steps.
                let steps = (vdd * 100.0).round() as usize;
                let mut rows = Vec::with_capacity(3 * (steps + 1));
                for target in TARGETS {
                    for i in 0..=steps {
                        let v = i as f64 * 0.01;
                        let id = mirror_current(target, v, v_sat, vdd) + noise.jitter(5e-9);
                        rows.push([v, v, id]);
                    }
                }
                write_table(&out_dir.join(&stem), ["v(out)", "v(out)", "id(m1a)"], &rows)
                    .expect("Failed to write voltage sweep");

                // Input current sweep: 0 → 140 µA, 1400 samples.
                let mismatch = 0.004 * (temperature as f64 / 27.0) + 0.01 * (1.1 - vdd);
                let rows: Vec<[f64; 3]> = (0..1400)
                    .map(|i| {
                        let iin = i as f64 * 0.1e-6;
                        let id = iin * (1.0 - mismatch) - 2e-8 * (iin / 140e-6).powi(2)
                            + noise.jitter(2e-9);
                        [iin, iin, id]
                    })
                    .collect();
                write_table(
                    &out_dir.join(format!("{stem}_Iin")),
                    ["i(iin)", "i(iin)", "id(m1a)"],
                    &rows,
                )
                .expect("Failed to write input current sweep");

                written += 2;
            }
        }
    }

    println!("Wrote {written} result files to {}", out_dir.display());
}
