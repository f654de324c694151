//! Throughput of single A* searches on an open grid.
//!
//! Run with: cargo bench --package tilewalk-world --bench pathfinder

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tilewalk_core::CellCoord;
use tilewalk_world::{Grid, Pathfinder};

fn bench_open_grid(c: &mut Criterion) {
    let grid = Grid::new(40, 40);
    let start = CellCoord::new(0, 0);
    let mut group = c.benchmark_group("find_path_40x40");

    for goal in [CellCoord::new(39, 39), CellCoord::new(10, 10)] {
        let mut pathfinder = Pathfinder::new();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("to_{}_{}", goal.column(), goal.row())),
            &goal,
            |b, goal| {
                b.iter(|| {
                    let path = pathfinder.find_path(black_box(&grid), start, *goal);
                    black_box(path)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_open_grid);
criterion_main!(benches);
