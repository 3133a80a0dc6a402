use core::hash::Hash;
use core::hash::Hasher;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::hash_table::Entry as HashbrownEntry;
use hashbrown::hash_table::HashTable as HashbrownHashTable;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use siphasher::sip::SipHasher;
use tombstone_hash::LinkedProbeTable;
use tombstone_hash::ProbeTable;
use tombstone_hash::hash_table::Entry as ProbeEntry;

trait KeyValuePair: Clone {
    fn new(key: u64) -> Self;

    fn hash_key(&self) -> u64;
    fn eq_key(&self, other: &Self) -> bool;
}

#[derive(Clone)]
struct TestItem {
    key: String,
    _value: u64,
}

impl KeyValuePair for TestItem {
    fn new(key: u64) -> Self {
        black_box(Self {
            key: format!("key_{:016X}", key),
            _value: key,
        })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[derive(Clone)]
struct SmallTestItem {
    key: u64,
}

impl KeyValuePair for SmallTestItem {
    fn new(key: u64) -> Self {
        black_box(Self { key })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

#[derive(Clone, Copy)]
enum Operation {
    Insert,
    Remove,
    Find,
}

fn random_items<T: KeyValuePair>(count: usize) -> Vec<(u64, T)> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| {
            let item = T::new(rng.try_next_u64().unwrap());
            (item.hash_key(), item)
        })
        .collect()
}

fn sequential_items<T: KeyValuePair>(count: usize) -> Vec<(u64, T)> {
    (0..count as u64)
        .map(|key| {
            let item = T::new(key);
            (item.hash_key(), item)
        })
        .collect()
}

fn shuffled<T: Clone>(items: &[T]) -> Vec<T> {
    let mut items = items.to_vec();
    items.shuffle(&mut SmallRng::from_os_rng());
    items
}

fn bench_insert_random<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "insert_random_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let hash_and_item = random_items::<TestItem>(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("tombstone_hash/{size}"), |b| {
            b.iter_batched(
                || shuffled(&hash_and_item),
                |hash_and_item| {
                    let mut table = ProbeTable::<TestItem>::new();
                    for (hash, item) in hash_and_item {
                        match table.entry(hash, |v| v.eq_key(&item)) {
                            ProbeEntry::Vacant(entry) => {
                                black_box(entry.insert(item));
                            }
                            ProbeEntry::Occupied(_) => unreachable!(),
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("tombstone_hash_linked/{size}"), |b| {
            b.iter_batched(
                || shuffled(&hash_and_item),
                |hash_and_item| {
                    let mut table = LinkedProbeTable::<TestItem>::new();
                    for (hash, item) in hash_and_item {
                        let probe = item.clone();
                        black_box(table.insert(hash, item, |v| v.eq_key(&probe)));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || shuffled(&hash_and_item),
                |hash_and_item| {
                    let mut table = HashbrownHashTable::<TestItem>::with_capacity(0);
                    for (hash, item) in hash_and_item {
                        match table.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
                            HashbrownEntry::Vacant(entry) => {
                                black_box(entry.insert(item));
                            }
                            HashbrownEntry::Occupied(_) => unreachable!(),
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "find_hit_miss_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let present = sequential_items::<TestItem>(size);
        let lookups = shuffled(&sequential_items::<TestItem>(size * 2));

        let mut table = ProbeTable::<TestItem>::new();
        let mut hashbrown = HashbrownHashTable::<TestItem>::with_capacity(0);
        for (hash, item) in present.iter().cloned() {
            let probe = item.clone();
            table.insert(hash, item.clone(), |v| v.eq_key(&probe));
            hashbrown.insert_unique(hash, item, |v| v.hash_key());
        }

        group.throughput(Throughput::Elements(lookups.len() as u64));
        group.bench_function(format!("tombstone_hash/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in &lookups {
                    black_box(table.find(*hash, |v| v.eq_key(item)));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in &lookups {
                    black_box(hashbrown.find(*hash, |v| v.eq_key(item)));
                }
            })
        });
    }

    group.finish();
}

fn bench_churn<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("churn_{}", core::any::type_name::<TestItem>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let insertions_and_removals = sequential_items::<TestItem>(size)
            .into_iter()
            .flat_map(|pair| [pair.clone(), pair])
            .collect::<Vec<_>>();

        group.throughput(Throughput::Elements(insertions_and_removals.len() as u64));
        group.bench_function(format!("tombstone_hash/{size}"), |b| {
            b.iter_batched(
                || shuffled(&insertions_and_removals),
                |hash_and_item| {
                    let mut table = ProbeTable::<TestItem>::new();
                    for (hash, item) in hash_and_item {
                        match table.entry(hash, |v| v.eq_key(&item)) {
                            ProbeEntry::Vacant(entry) => {
                                entry.insert(item);
                            }
                            ProbeEntry::Occupied(entry) => {
                                black_box(entry.remove());
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || shuffled(&insertions_and_removals),
                |hash_and_item| {
                    let mut table = HashbrownHashTable::<TestItem>::with_capacity(0);
                    for (hash, item) in hash_and_item {
                        match table.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
                            HashbrownEntry::Vacant(entry) => {
                                black_box(entry.insert(item));
                            }
                            HashbrownEntry::Occupied(entry) => {
                                black_box(entry.remove().0);
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_mixed_zipf<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    const KEY_SPACE_MULTIPLIER: f32 = 2.0;

    let mut group = c.benchmark_group(format!(
        "mixed_zipf_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let mut rng = SmallRng::from_os_rng();
        let op_distr = Zipf::new(3.0, 1.0).unwrap();
        let operations = (0..size * 3)
            .map(|_| {
                let op_choice: f64 = rng.sample(op_distr);
                if op_choice <= 1.0 {
                    Operation::Find
                } else if op_choice <= 2.0 {
                    Operation::Insert
                } else {
                    Operation::Remove
                }
            })
            .collect::<Vec<Operation>>();

        let insert_distr = Zipf::new(size as f32 - 1.0, 1.0).unwrap();
        let find_remove_distr = Zipf::new(size as f32 * KEY_SPACE_MULTIPLIER - 1.0, 1.0).unwrap();

        group.throughput(Throughput::Elements(operations.len() as u64));
        group.bench_function(format!("tombstone_hash/{size}"), |b| {
            b.iter_batched(
                || shuffled(&operations),
                |operations| {
                    let mut table = ProbeTable::<TestItem>::new();
                    for operation in operations {
                        match operation {
                            Operation::Insert => {
                                let item = TestItem::new(rng.sample(insert_distr) as u64);
                                let hash = item.hash_key();
                                match table.entry(hash, |v| v.eq_key(&item)) {
                                    ProbeEntry::Vacant(entry) => {
                                        black_box(entry.insert(item));
                                    }
                                    ProbeEntry::Occupied(mut occupied) => {
                                        *occupied.get_mut() = item;
                                    }
                                }
                            }
                            Operation::Remove => {
                                let item = TestItem::new(rng.sample(find_remove_distr) as u64);
                                let hash = item.hash_key();
                                black_box(table.remove(hash, |v| v.eq_key(&item)));
                            }
                            Operation::Find => {
                                let item = TestItem::new(rng.sample(find_remove_distr) as u64);
                                let hash = item.hash_key();
                                black_box(table.find(hash, |v| v.eq_key(&item)));
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || shuffled(&operations),
                |operations| {
                    let mut table = HashbrownHashTable::<TestItem>::with_capacity(0);
                    for operation in operations {
                        match operation {
                            Operation::Insert => {
                                let item = TestItem::new(rng.sample(insert_distr) as u64);
                                let hash = item.hash_key();
                                match table.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
                                    HashbrownEntry::Vacant(entry) => {
                                        black_box(entry.insert(item));
                                    }
                                    HashbrownEntry::Occupied(mut occupied) => {
                                        *occupied.get_mut() = item;
                                    }
                                }
                            }
                            Operation::Remove => {
                                let item = TestItem::new(rng.sample(find_remove_distr) as u64);
                                let hash = item.hash_key();
                                let result = match table.find_entry(hash, |v| v.eq_key(&item)) {
                                    Ok(entry) => Some(entry.remove().0),
                                    Err(_) => None,
                                };
                                black_box(result);
                            }
                            Operation::Find => {
                                let item = TestItem::new(rng.sample(find_remove_distr) as u64);
                                let hash = item.hash_key();
                                black_box(table.find(hash, |v| v.eq_key(&item)));
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_iteration<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "iteration_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let mut table = ProbeTable::<TestItem>::new();
        let mut linked = LinkedProbeTable::<TestItem>::new();
        let mut hashbrown = HashbrownHashTable::<TestItem>::with_capacity(0);
        for (hash, item) in random_items::<TestItem>(size) {
            let probe = item.clone();
            table.insert(hash, item.clone(), |v| v.eq_key(&probe));
            linked.insert(hash, item.clone(), |v| v.eq_key(&probe));
            hashbrown.insert_unique(hash, item, |v| v.hash_key());
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("tombstone_hash/{size}"), |b| {
            b.iter(|| {
                for item in table.iter() {
                    black_box(item);
                }
            })
        });

        group.bench_function(format!("tombstone_hash_linked/{size}"), |b| {
            b.iter(|| {
                for item in linked.iter() {
                    black_box(item);
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for item in hashbrown.iter() {
                    black_box(item);
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<SmallTestItem, 4>,
    bench_insert_random::<TestItem, 3>,
    bench_find_hit_miss::<SmallTestItem, 4>,
    bench_find_hit_miss::<TestItem, 3>,
    bench_churn::<SmallTestItem, 4>,
    bench_churn::<TestItem, 3>,
    bench_mixed_zipf::<SmallTestItem, 4>,
    bench_mixed_zipf::<TestItem, 3>,
    bench_iteration::<SmallTestItem, 4>,
    bench_iteration::<TestItem, 3>,
);

criterion_main!(benches);
