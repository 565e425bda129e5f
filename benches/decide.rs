use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;
use synctools_strategy::core::{AclData, FileStat, Grant, OperationKind};
use synctools_strategy::{SelectedStrategies, Strategy, SyncPlanner, SyncPolicy};

fn stat(key: &str, size: u64, offset: i64) -> FileStat {
    let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(offset);
    FileStat::new(format!("/data/{key}"), format!("bucket/{key}"), size, time, OperationKind::Upload)
        .with_acl(AclData::new(
            "owner",
            vec![
                Grant::user("owner", "FULL_CONTROL"),
                Grant::group("http://acs.amazonaws.com/groups/global/AllUsers", "READ"),
                Grant::user("reader", "READ"),
            ],
        ))
}

fn bench_decide(c: &mut Criterion) {
    let strategy = Strategy::new(SyncPolicy::SizeAndLastModified).with_acl(true);
    let src = stat("a", 100, 0);
    let dest = stat("a", 100, 10);

    c.bench_function("size_and_last_modified_with_acl", |b| {
        b.iter(|| strategy.determine_should_sync(black_box(Some(&src)), black_box(Some(&dest))))
    });
}

fn bench_plan(c: &mut Criterion) {
    let source: HashMap<String, FileStat> = (0..10_000)
        .map(|i| {
            let key = format!("dir/file_{i}.bin");
            let file = stat(&key, i, 0);
            (key, file)
        })
        .collect();
    let dest: HashMap<String, FileStat> = (0..10_000)
        .step_by(2)
        .map(|i| {
            let key = format!("dir/file_{i}.bin");
            let file = stat(&key, i + (i % 3), 0);
            (key, file)
        })
        .collect();

    let planner = SyncPlanner::new(SelectedStrategies::defaults(true));
    c.bench_function("plan_10k_files", |b| {
        b.iter(|| planner.plan(black_box(&source), black_box(&dest)))
    });
}

criterion_group!(benches, bench_decide, bench_plan);
criterion_main!(benches);
