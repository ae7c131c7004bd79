use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use structure_loot::{
    ContainerKind, DrawContext, ExternalItemRegistry, LootItem, LootTable, LootTableRegistry,
    WeightedSampler, placer,
};

fn gen_pairs(n: usize) -> Vec<(usize, f64)> {
    let mut rng = Pcg32::seed_from_u64(777);
    (0..n).map(|i| (i, 0.1 + rng.random::<f64>())).collect()
}

fn bench_sampler_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler_build");
    for &n in &[2usize, 8, 64, 256, 1024] {
        let pairs = gen_pairs(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("from_pairs_n={n}"), |b| {
            b.iter(|| black_box(WeightedSampler::from_pairs(black_box(pairs.clone()))).unwrap());
        });
    }
    group.finish();
}

fn bench_sampler_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler_sample");
    const DRAWS_PER_ITER: usize = 1024;

    for &n in &[2usize, 8, 64, 256, 1024] {
        let sampler = WeightedSampler::from_pairs(gen_pairs(n)).unwrap();
        group.throughput(Throughput::Elements(DRAWS_PER_ITER as u64));

        group.bench_function(format!("sample_n={n}"), |b| {
            b.iter_batched_ref(
                || Pcg32::seed_from_u64(999),
                |rng| {
                    let mut s = 0usize;
                    for _ in 0..DRAWS_PER_ITER {
                        s ^= sampler.sample(rng).copied().unwrap_or(0);
                    }
                    black_box(s)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn chest_tables() -> LootTableRegistry {
    let mut tables = LootTableRegistry::in_memory();
    let ores = LootTable::builder("ores")
        .rolls(2)
        .replacement(false)
        .item(LootItem::simple("IRON_INGOT").with_weight(3).with_amount_str("[1:3]"))
        .item(LootItem::simple("GOLD_INGOT"))
        .build()
        .unwrap();
    let chest = LootTable::builder("chest")
        .rolls(6)
        .item(LootItem::simple("BREAD").with_weight(6).with_amount_str("[2:5]"))
        .item(LootItem::simple("ARROW").with_weight(4).with_amount_str("[4:16]"))
        .item(LootItem::table("ores").with_weight(2))
        .build()
        .unwrap();
    tables.insert(ores);
    tables.insert(chest);
    tables
}

fn bench_table_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_fill");
    let mut tables = chest_tables();
    let externals = ExternalItemRegistry::new();
    let chest = tables.get("chest").unwrap();

    group.bench_function("draw_all", |b| {
        b.iter_batched_ref(
            || Pcg32::seed_from_u64(1001),
            |rng| {
                let mut ctx = DrawContext::new(&mut tables, &externals);
                black_box(chest.draw_all(&mut ctx, None, rng).unwrap())
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("draw_and_place", |b| {
        b.iter_batched_ref(
            || (Pcg32::seed_from_u64(1003), ContainerKind::Chest.default_inventory()),
            |(rng, inventory)| {
                let mut ctx = DrawContext::new(&mut tables, &externals);
                let stacks = chest.draw_all(&mut ctx, None, rng).unwrap();
                placer::place(&stacks, inventory, rng);
                black_box(inventory.size())
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(loot, bench_sampler_build, bench_sampler_sample, bench_table_fill);
criterion_main!(loot);
