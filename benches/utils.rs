use std::collections::HashMap;
use std::fmt::{Debug, Display};

use rand::{rngs::StdRng, Rng, SeedableRng};

pub fn random_keys(n: usize, seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random()).collect()
}

pub fn mean(xs: &[u128]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<u128>() as f64 / xs.len() as f64
}

pub fn print_table<N>(result: &HashMap<String, HashMap<String, N>>, rows: &[&str], columns: &[&str])
where
    N: Display + Debug + Default,
{
    let cell_w = 15;
    let df = N::default();
    let divider = "-".repeat(columns.len() * (cell_w + 2) + 1);

    println!("{divider}");
    let mut header = String::from("| ");
    for c in columns {
        header.push_str(&format!("{c:<cell_w$}| "));
    }
    println!("{header}");
    println!("{divider}");

    for hr in rows {
        let Some(r) = result.get(*hr) else { continue };
        let mut row = format!("| {hr:<cell_w$}| ");

        for c in columns.iter().skip(1) {
            let cell = r.get(*c).unwrap_or(&df);
            row.push_str(&format!("{:<cell_w$.2}| ", cell));
        }

        println!("{row}");
    }

    println!("{divider}");
}
