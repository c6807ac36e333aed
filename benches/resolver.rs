//! Criterion benchmarks for the resolver
//!
//! These benchmarks measure resolution cost over catalogs of increasing
//! size, with and without the generation-keyed cache in play.

use std::collections::BTreeMap;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;

use strata::catalog::{Catalog, Image, OsDescriptor, ProviderKind, Release};
use strata::topology::{ClusterClassDefaults, ClusterTopology, MachinePoolSpec};
use strata::{construct_query, OsConstraint, Query, ReleaseVersion, Resolver};

// =============================================================================
// Test Fixtures
// =============================================================================

const OS_NAMES: &[&str] = &["ubuntu", "rhel", "rockylinux"];
const OS_VERSIONS: &[&str] = &["20.04", "22.04", "9.2"];
const ARCHES: &[&str] = &["amd64", "arm64"];

fn populated_catalog(releases: usize, images_per_release: usize) -> Arc<Catalog> {
    let mut rng = StdRng::seed_from_u64(7);
    let catalog = Arc::new(Catalog::new());

    for minor in 0..releases {
        let version = format!("v1.{minor}.0");
        let name = version.clone();
        catalog.add_release(Release::new(
            &name,
            ReleaseVersion::parse(&version).unwrap(),
        ));

        for i in 0..images_per_release {
            let os = OsDescriptor::new(
                *OS_NAMES.choose(&mut rng).unwrap(),
                *OS_VERSIONS.choose(&mut rng).unwrap(),
                *ARCHES.choose(&mut rng).unwrap(),
            );
            catalog.add_image(Image::new(
                format!("{name}-image-{i}"),
                ProviderKind::Aws,
                os,
                format!("ami-{name}-{i}"),
                &name,
            ));
        }
    }

    let default = format!("v1.{}.0", releases - 1);
    catalog.set_default_release(default);
    catalog
}

fn constrained_query() -> Query {
    let topology = ClusterTopology {
        control_plane: MachinePoolSpec::with_os(OsConstraint::new(
            Some("ubuntu"),
            Some("22.04"),
            Some("amd64"),
        )),
        workers: BTreeMap::from([
            ("md-0".to_string(), MachinePoolSpec::unconstrained()),
            (
                "md-1".to_string(),
                MachinePoolSpec::with_os(OsConstraint::new(None, None, Some("arm64"))),
            ),
        ]),
    };
    construct_query(
        "default",
        ProviderKind::Aws,
        &topology,
        &ClusterClassDefaults::default(),
    )
    .unwrap()
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_resolve_uncached(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_uncached");
    for releases in [10, 50, 200] {
        let catalog = populated_catalog(releases, 8);
        let query = constrained_query();
        group.throughput(Throughput::Elements(releases as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(releases),
            &releases,
            |b, _| {
                b.iter_batched(
                    // A fresh resolver each iteration defeats the cache
                    || Resolver::new(Arc::clone(&catalog)),
                    |resolver| black_box(resolver.resolve(black_box(&query)).unwrap()),
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

fn bench_resolve_cached(c: &mut Criterion) {
    let catalog = populated_catalog(200, 8);
    let resolver = Resolver::new(catalog);
    let query = constrained_query();
    // Warm the cache once, then measure hits
    resolver.resolve(&query).unwrap();

    c.bench_function("resolve_cached", |b| {
        b.iter(|| black_box(resolver.resolve(black_box(&query)).unwrap()));
    });
}

fn bench_catalog_ingestion(c: &mut Criterion) {
    c.bench_function("catalog_add_release", |b| {
        let catalog = Catalog::new();
        let version = ReleaseVersion::parse("v1.24.2").unwrap();
        b.iter(|| {
            catalog.add_release(black_box(Release::new("v1.24.2", version.clone())));
        });
    });
}

criterion_group!(
    benches,
    bench_resolve_uncached,
    bench_resolve_cached,
    bench_catalog_ingestion
);
criterion_main!(benches);
