use stress_test::{
    stress_test_object_maps, stress_test_predicates, stress_test_scaling, stress_test_upsert,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("collex=info,collex_core=info")),
        )
        .init();

    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            UPSERT STRESS TESTS                             ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // Test 1: heavy collisions, first record wins
    let stats = stress_test_upsert(10_000, 100, false);
    stats.print();

    // Test 2: heavy collisions, last record wins
    let stats = stress_test_upsert(10_000, 100, true);
    stats.print();

    // Test 3: mostly fresh keys
    let stats = stress_test_upsert(100_000, 1_000_000, false);
    stats.print();

    // Test 4: predicate queries over the resident set
    let stats = stress_test_predicates(50_000, 5_000, 200);
    stats.print();

    // Test 5: object map conversions
    let stats = stress_test_object_maps(20_000);
    stats.print();

    // Test 6: scaling analysis
    stress_test_scaling(5);

    println!("\n✓ All stress tests completed successfully!");
}
