use clap::Parser;
use dense_hash::DenseHashMap;
use dense_hash::PrehashMap;
use dense_hash::hash_key;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "initial_capacity", default_value_t = 16)]
    initial_capacity: usize,

    #[arg(short = 'n', long = "entries", default_value_t = 1000)]
    entries: usize,

    /// Fraction of operations after the initial fill that remove a key.
    #[arg(short = 'r', long = "remove_ratio", default_value_t = 0.3)]
    remove_ratio: f64,

    #[arg(short = 's', long = "seed", default_value_t = 0x5EED)]
    seed: u64,
}

fn main() {
    let args = Args::parse();
    let mut rng = SmallRng::seed_from_u64(args.seed);

    println!(
        "Creating DenseHashMap with initial capacity: {}",
        args.initial_capacity
    );
    let mut map: DenseHashMap<u64, u32> = DenseHashMap::new(args.initial_capacity);
    println!("Actual capacity: {}", map.capacity());

    let mut duplicates = 0;
    for i in 0..args.entries {
        if !map.insert(rng.random_range(0..args.entries as u64 * 4), i as u32) {
            duplicates += 1;
        }
    }
    println!(
        "Inserted {} entries ({} duplicates rejected), capacity {}",
        map.len(),
        duplicates,
        map.capacity()
    );

    for _ in 0..args.entries {
        let key = rng.random_range(0..args.entries as u64 * 4);
        if rng.random_bool(args.remove_ratio) {
            map.remove(&key);
        } else {
            map.insert(key, 0);
        }
    }
    println!("After churn: {} entries", map.len());
    println!("Probe histogram: {:?}", map.probe_histogram());
    map.debug_stats().print();

    let mut prehashed: PrehashMap<u32> = PrehashMap::new(args.initial_capacity);
    for (key, value) in map.iter() {
        prehashed.insert(hash_key(&key), value);
    }
    println!();
    println!(
        "PrehashMap built from the same keys: {} entries",
        prehashed.len()
    );
    prehashed.debug_stats().print();
}
