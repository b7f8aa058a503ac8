use criterion::{black_box, criterion_group, criterion_main, Criterion};
use orrery_data::ecs::{ComponentManager, Entity, EntityAllocator};

#[derive(Debug, Clone, Copy, Default)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

fn bench_manager(c: &mut Criterion) {
    let mut allocator = EntityAllocator::new();
    let entities: Vec<Entity> = (0..10_000).map(|_| allocator.allocate()).collect();

    let mut manager = ComponentManager::<Position>::with_capacity(entities.len());
    for &entity in &entities {
        let slot = manager.create(entity);
        manager.get_mut(slot).x = 1.0;
    }

    let mut group = c.benchmark_group("ComponentManager");

    group.bench_function("Dense iteration (10k)", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for i in 0..manager.len() {
                sum += manager[i].x;
            }
            black_box(sum);
        });
    });

    group.bench_function("Entity lookup (10k)", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for &entity in &entities {
                if let Some(position) = manager.get_by_entity(entity) {
                    sum += position.y;
                }
            }
            black_box(sum);
        });
    });

    group.bench_function("Create + swap-remove churn (1k)", |b| {
        b.iter(|| {
            let mut allocator = EntityAllocator::new();
            let mut manager = ComponentManager::<Position>::with_capacity(1_000);
            let churn: Vec<Entity> = (0..1_000).map(|_| allocator.allocate()).collect();
            for &entity in &churn {
                manager.create(entity);
            }
            for &entity in churn.iter().step_by(2) {
                manager.remove(entity);
            }
            black_box(manager.len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_manager);
criterion_main!(benches);
