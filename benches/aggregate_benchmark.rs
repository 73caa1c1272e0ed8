use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hotel_management::{aggregate_guest_details, Guest, Plan, Reservation, ReservationStatus};
use rand::{seq::SliceRandom, thread_rng, Rng};
use rust_decimal::Decimal;

// Composite guest views over a property-sized data set
pub fn aggregate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("guest_detail_aggregation");

    for guest_count in [100, 1_000, 10_000].iter() {
        let mut rng = thread_rng();

        let guests: Vec<Guest> = (0..*guest_count)
            .map(|i| {
                Guest::new(format!("guest{}", i), format!("GUEST{}", i), format!("090{:08}", i))
                    .with_id(format!("g{}", i))
            })
            .collect();
        let plans: Vec<Plan> = (0..20)
            .map(|i| {
                Plan::new(format!("plan{}", i), Decimal::new(8000 + i * 500, 0))
                    .with_id(format!("p{}", i))
            })
            .collect();

        let created_at = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let check_in = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        // Roughly three reservations per guest, some pointing at unknown guests
        let reservations: Vec<Reservation> = (0..guest_count * 3)
            .map(|i| {
                let guest_id = format!("g{}", rng.gen_range(0..guest_count + guest_count / 10));
                let plan = plans.choose(&mut rng).unwrap();
                let status = *ReservationStatus::ALL.choose(&mut rng).unwrap();
                Reservation::provisional(
                    format!("r{}", i),
                    guest_id,
                    plan.id.clone(),
                    check_in,
                    rng.gen_range(0..7),
                    plan.price,
                    created_at,
                )
                .with_status(status)
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(guest_count),
            guest_count,
            |b, _| {
                b.iter(|| {
                    black_box(aggregate_guest_details(
                        guests.clone(),
                        &plans,
                        &reservations,
                    ))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, aggregate_benchmark);
criterion_main!(benches);
