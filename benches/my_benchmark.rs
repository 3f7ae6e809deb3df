use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use flatdb::{Condition, Database, MemoryStorage, ReadCache, Value};
use std::hint::black_box;

fn setup_populated_db(n: usize, invalidate_on_write: bool) -> Database<MemoryStorage> {
    let mut db = Database::new(MemoryStorage::new(), ReadCache::new(invalidate_on_write));

    db.execute("create_table users name:str age:int active:bool")
        .unwrap();

    for i in 0..n {
        let values = vec![
            Value::from(format!("user{i}").as_str()),
            Value::Int((i % 100) as i64),
            Value::Bool(i % 2 == 0),
        ];
        db.insert_row("users", values).unwrap();
    }
    db
}

fn bench_insert_command(c: &mut Criterion) {
    let mut group = c.benchmark_group("Insert_Command_Pipeline");
    group.bench_function("insert_single_row", |b| {
        let mut db = Database::new(MemoryStorage::new(), ReadCache::default());
        db.execute("create_table tests v:int").unwrap();
        b.iter(|| {
            db.execute(black_box("insert into tests values (42)"))
                .unwrap();
        });
    });
    group.finish();
}

fn bench_select_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Select_Where_Performance");
    let condition = Condition::single("age", Value::Int(42));

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::new("uncached", n), n, |b, &n| {
            // invalidating after a no-op update keeps every iteration a cache miss
            let mut db = setup_populated_db(n, true);
            b.iter(|| {
                db.update_rows(
                    "users",
                    &Condition::single("age", Value::Int(1000)),
                    &Condition::single("age", Value::Int(1000)),
                )
                .unwrap();
                let res = db.select_rows("users", Some(&condition)).unwrap();
                black_box(res);
            });
        });

        group.bench_with_input(BenchmarkId::new("cached", n), n, |b, &n| {
            let mut db = setup_populated_db(n, false);
            b.iter(|| {
                let res = db.select_rows("users", Some(&condition)).unwrap();
                black_box(res);
            });
        });
    }
    group.finish();
}

fn bench_update_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("Update_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter_with_setup(
                || setup_populated_db(n, true),
                |mut db| {
                    db.execute("update users set age = 99 where active = true")
                        .unwrap();
                    black_box(db);
                },
            );
        });
    }
    group.finish();
}

fn bench_delete_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("Delete_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter_with_setup(
                || setup_populated_db(n, true),
                |mut db| {
                    db.execute("delete from users where age = 90").unwrap();
                    black_box(db);
                },
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_insert_command,
    bench_select_scaling,
    bench_update_performance,
    bench_delete_performance
);
criterion_main!(benches);
