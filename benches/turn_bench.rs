//! Turn resolution throughput: pure previews and full resolve-and-retire turns.
//!
//! Run with: `cargo bench --bench turn`

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use escouade::combat::{
    preview_turn, resolve_bonuses, resolve_turn, BossContext, DynamicBonusState, FusionMap, Rng,
    SynergyLevels, TroopInstance, TroopPools, TurnContext, UnlockedBonuses,
};
use escouade::data::Catalog;

fn squad(catalog: &Catalog, rng: &mut Rng) -> Vec<TroopInstance> {
    ["Épéiste", "Lancier", "Mage", "Paladin", "Archer"]
        .iter()
        .filter_map(|name| catalog.unit(name))
        .map(|unit| TroopInstance {
            id: rng.uuid(),
            unit: unit.clone(),
        })
        .collect()
}

fn bench_turns(c: &mut Criterion) {
    let catalog = Catalog::builtin();
    let mut rng = Rng::new(42);
    let troops = squad(&catalog, &mut rng);
    let unlocked = UnlockedBonuses::from([
        ("force_brute".to_string(), 2),
        ("position_quatre".to_string(), 1),
        ("fusion_feu_terre".to_string(), 1),
    ]);
    let bonuses = resolve_bonuses(&unlocked, &DynamicBonusState::default(), &catalog.bonuses);
    let fusion = FusionMap::from_unlocked(&unlocked, &catalog.bonuses);
    let levels = SynergyLevels::new();
    let ctx = TurnContext {
        bonuses: &bonuses,
        fusion: &fusion,
        synergies: &catalog.synergies,
        synergy_levels: &levels,
        boss: BossContext::NONE,
    };

    let mut group = c.benchmark_group("turn");
    group.throughput(Throughput::Elements(1));

    group.bench_function("preview", |b| {
        let refs: Vec<&TroopInstance> = troops.iter().collect();
        b.iter(|| black_box(preview_turn(black_box(&refs), &ctx)));
    });

    let owned: BTreeMap<String, u32> = catalog
        .units
        .iter()
        .map(|unit| (unit.name.clone(), 3))
        .collect();
    group.bench_function("resolve", |b| {
        b.iter_batched(
            || {
                let mut rng = Rng::new(7);
                let mut pools = TroopPools::from_owned(&owned, &catalog, &mut rng);
                pools.replenish(&mut rng);
                let ids: Vec<_> = pools.combat_pool.iter().take(5).map(|t| t.id).collect();
                for id in ids {
                    let _ = pools.select(id);
                }
                pools
            },
            |mut pools| black_box(resolve_turn(&mut pools, &ctx)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_turns);
criterion_main!(benches);
