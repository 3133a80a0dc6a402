use std::hash::BuildHasher;

use clap::Parser;
use tombstone_hash::ProbeTable;
use tombstone_hash::hash::BuildMixHasher;
use tombstone_hash::hash_table::Entry;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Remove and re-insert this many entries after filling, to show how
    /// tombstones accumulate.
    #[arg(short = 'r', long = "churn", default_value_t = 0)]
    churn: usize,
}

fn main() {
    let args = Args::parse();
    let builder = BuildMixHasher::default();

    println!(
        "Creating ProbeTable with target capacity: {}",
        args.target_capacity
    );

    let mut table: ProbeTable<u64> =
        ProbeTable::with_capacity(args.target_capacity.max(1).next_power_of_two());
    let capacity = table.capacity();
    println!("Actual capacity: {}", capacity);
    println!("Filling table with u64 values up to the load limit...");

    let num_values = capacity / 2;
    for value in 0..num_values as u64 {
        match table.entry(builder.hash_one(value), |&v| v == value) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(_) => {
                panic!("Value already exists in table: {}", value);
            }
        }
    }

    println!("Inserted {} values into table", table.len());
    table.probe_histogram().print();
    table.debug_stats().print();

    if args.churn > 0 {
        println!("Churning {} entries...", args.churn);
        let mut oldest = 0u64;
        let mut next = num_values as u64;
        for _ in 0..args.churn {
            table.remove(builder.hash_one(oldest), |&v| v == oldest);
            table.insert(builder.hash_one(next), next, |&v| v == next);
            oldest += 1;
            next += 1;
        }

        println!(
            "After churn: {} values, {} tombstones, capacity {}",
            table.len(),
            table.tombstones(),
            table.capacity()
        );
        table.probe_histogram().print();
        table.debug_stats().print();
    }
}
