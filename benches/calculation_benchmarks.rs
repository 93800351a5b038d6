//! Performance benchmarks for the Statutory Calculation Engine.
//!
//! Each calculator is a pure function, so these measure the arithmetic and
//! audit-trace construction with no I/O in the loop:
//! - Single calculation per calculator: < 50μs mean
//! - Batch of 1000 mixed calculations: < 50ms mean
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use statutory_engine::calculation::{
    CommissionInput, CommissionPolicy, LeaveType, NoticePeriodInput, NoticeType, PensionBasis,
    PensionInput, ProRataBasis, ProRataInput, RedundancyInput, SalaryFrequency,
    StatutoryPayInput, TaxRegion, TermTimeInput, WeeklyEarnings, calculate_commission,
    calculate_notice_period, calculate_pension, calculate_pro_rata, calculate_redundancy,
    calculate_statutory_pay, calculate_term_time,
};
use statutory_engine::config::ConfigLoader;

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/uk").expect("Failed to load config")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn pro_rata_input(actual_hours: i64) -> ProRataInput {
    ProRataInput {
        full_time_salary: Decimal::from(32_000),
        frequency: SalaryFrequency::Yearly,
        full_time_hours: Decimal::from(40),
        basis: ProRataBasis::Hours {
            actual_hours: Decimal::from(actual_hours),
        },
        tax_region: TaxRegion::RestOfUk,
    }
}

fn redundancy_input(years_of_service: u32) -> RedundancyInput {
    RedundancyInput {
        age: 60,
        years_of_service,
        weekly_wage: Decimal::from(650),
        actual_hours: Decimal::from(30),
        full_time_hours: Decimal::new(375, 1),
    }
}

/// Benchmark: one call of every calculator.
///
/// Target: < 50μs mean each
fn bench_single_calculations(c: &mut Criterion) {
    let config = load_config();
    let year = config.default_tax_year().unwrap();
    let today = date(2025, 10, 1);

    let commission = CommissionInput {
        full_time_target: Decimal::from(10_000),
        actual_sales: Decimal::from(6_000),
        full_time_hours: Decimal::from(40),
        part_time_hours: Decimal::from(20),
        commission_rate: Decimal::from(10),
        policy: CommissionPolicy::Strict,
        second_tier_rate: None,
        second_tier_threshold: None,
        tax_rate: Some(Decimal::from(20)),
    };
    let notice = NoticePeriodInput {
        notice_type: NoticeType::Dismissal,
        start_date: Some(date(2015, 1, 5)),
        end_date: Some(date(2025, 9, 30)),
        weekly_hours: Some(Decimal::new(375, 1)),
        weekly_wage: Some(Decimal::from(700)),
        hourly_rate: None,
        contractual_notice: None,
    };
    let maternity = StatutoryPayInput {
        leave_type: LeaveType::Maternity,
        childbirth_date: date(2025, 12, 1),
        employment_start_date: date(2020, 1, 6),
        earnings: WeeklyEarnings::Fixed {
            weekly_amount: Decimal::from(500),
        },
        paternity_weeks: None,
    };
    let pension = PensionInput {
        annual_salary: Decimal::from(30_000),
        weekly_hours: Decimal::new(375, 1),
        age: 35,
        employee_rate: Decimal::from(5),
        employer_rate: Decimal::from(3),
        basis: PensionBasis::Qualifying,
    };
    let term_time = TermTimeInput {
        fte_annual_salary: Decimal::from(30_000),
        contracted_weekly_hours: Decimal::from(20),
        full_time_weekly_hours: Decimal::new(375, 1),
        term_weeks_worked: Decimal::from(39),
        paid_holiday_weeks: Decimal::new(56, 1),
        bank_holiday_weeks: Decimal::ZERO,
        payment_schedule: Default::default(),
        daily_divisor: Default::default(),
    };
    let pro_rata = pro_rata_input(30);
    let redundancy = redundancy_input(15);

    let mut group = c.benchmark_group("single_calculation");

    group.bench_function("pro_rata", |b| {
        b.iter(|| calculate_pro_rata(black_box(&pro_rata), year))
    });
    group.bench_function("commission", |b| {
        b.iter(|| calculate_commission(black_box(&commission)))
    });
    group.bench_function("notice_period", |b| {
        b.iter(|| calculate_notice_period(black_box(&notice), today))
    });
    group.bench_function("statutory_pay", |b| {
        b.iter(|| calculate_statutory_pay(black_box(&maternity), year))
    });
    group.bench_function("pension", |b| {
        b.iter(|| calculate_pension(black_box(&pension), year))
    });
    group.bench_function("redundancy", |b| {
        b.iter(|| calculate_redundancy(black_box(&redundancy), year))
    });
    group.bench_function("term_time", |b| {
        b.iter(|| calculate_term_time(black_box(&term_time)))
    });

    group.finish();
}

/// Benchmark: a batch of 1000 pro-rata conversions with varying hours.
///
/// Target: < 50ms mean
fn bench_batch_1000(c: &mut Criterion) {
    let config = load_config();
    let year = config.default_tax_year().unwrap();

    let inputs: Vec<ProRataInput> = (0..1000).map(|i| pro_rata_input(1 + i % 40)).collect();

    let mut group = c.benchmark_group("batch_processing");
    group.throughput(Throughput::Elements(1000));
    group.sample_size(10);

    group.bench_function("pro_rata_1000", |b| {
        b.iter(|| {
            let results: Vec<_> = inputs
                .iter()
                .map(|input| calculate_pro_rata(input, year))
                .collect();
            black_box(results)
        })
    });

    group.finish();
}

/// Benchmark: redundancy cost as years of service grow.
fn bench_redundancy_scaling(c: &mut Criterion) {
    let config = load_config();
    let year = config.default_tax_year().unwrap();

    let mut group = c.benchmark_group("redundancy_scaling");

    for years in [2u32, 5, 10, 20, 40].iter() {
        let input = redundancy_input(*years);
        group.throughput(Throughput::Elements(u64::from(*years)));
        group.bench_with_input(BenchmarkId::new("years", years), years, |b, _| {
            b.iter(|| black_box(calculate_redundancy(&input, year)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_calculations,
    bench_batch_1000,
    bench_redundancy_scaling,
);
criterion_main!(benches);
