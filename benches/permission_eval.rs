use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use school_rbac::{
    has_permission, AccessControl, EvaluationMode, PermissionEvaluator, PermissionRule, RoleSet,
    RouteRequest,
};

/// Rule matrix with a few hundred rows, roughly a large school's setup
fn create_rule_matrix(size: usize) -> Vec<PermissionRule> {
    let roles = ["GURU", "WALI_KELAS", "SISWA", "TU", "KEPALA_SEKOLAH"];
    let actions = ["view", "create", "update", "delete", "tab:siswa"];

    (0..size)
        .map(|i| {
            PermissionRule::new(
                roles[i % roles.len()],
                format!("modul_{}.sub_{}", i % 40, i % 7),
                actions[i % actions.len()],
                i % 11 != 0,
            )
        })
        .chain([
            PermissionRule::allow("GURU", "master", "view"),
            PermissionRule::allow("GURU", "jurnal", "*"),
        ])
        .collect()
}

/// Benchmark the plain decision function
fn bench_has_permission(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_permission");

    for size in [10, 100, 1_000] {
        let rules = create_rule_matrix(size);
        group.throughput(Throughput::Elements(1));

        group.bench_with_input(BenchmarkId::new("hit", size), &rules, |b, rules| {
            b.iter(|| black_box(has_permission(rules, "master.siswa", "view", false)));
        });

        group.bench_with_input(BenchmarkId::new("miss", size), &rules, |b, rules| {
            b.iter(|| black_box(has_permission(rules, "keuangan.spp", "delete", false)));
        });
    }

    group.finish();
}

/// Benchmark role-aware evaluation in each mode
fn bench_evaluator_modes(c: &mut Criterion) {
    let rules = create_rule_matrix(500);
    let roles = RoleSet::parse("GURU|WALI_KELAS");

    let mut group = c.benchmark_group("evaluator_modes");

    for mode in [
        EvaluationMode::AnyAllow,
        EvaluationMode::DenyOverrides,
        EvaluationMode::MostSpecific,
    ] {
        let evaluator = PermissionEvaluator::new(mode);
        group.bench_function(mode.as_str(), |b| {
            b.iter(|| black_box(evaluator.decide(&roles, &rules, "modul_3.sub_3", "view")));
        });
    }

    group.finish();
}

/// Benchmark the guard with and without the decision cache
fn bench_guard(c: &mut Criterion) {
    let mut group = c.benchmark_group("guard_authorize");

    for capacity in [0, 1024] {
        let mut builder = AccessControl::builder().cache_capacity(capacity);
        for rule in create_rule_matrix(500) {
            builder = builder.rule(rule);
        }
        let access = builder.build().expect("valid rule matrix");
        let request = RouteRequest::page("/master/siswa");

        group.bench_with_input(
            BenchmarkId::new("cache_capacity", capacity),
            &capacity,
            |b, _| {
                b.iter(|| black_box(access.authorize("guru|wali_kelas", &request).is_ok()));
            },
        );
    }

    group.finish();
}

/// Benchmark role string parsing
fn bench_role_parse(c: &mut Criterion) {
    c.bench_function("role_parse", |b| {
        b.iter(|| black_box(RoleSet::parse(" guru | wali_kelas, GURU ,kepala_sekolah ")));
    });
}

criterion_group!(
    benches,
    bench_has_permission,
    bench_evaluator_modes,
    bench_guard,
    bench_role_parse
);
criterion_main!(benches);
