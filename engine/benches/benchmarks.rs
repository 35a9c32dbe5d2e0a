//! Performance benchmarks for stacks-engine

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stacks_engine::{
    Library, LoanRequest, NewBook, NewMember, Policy, ReservationRequest, SearchQuery,
};

fn stocked_library(books: i64, members: i64) -> Library {
    let mut library = Library::new(Policy::default());
    for id in 1..=books {
        library
            .add_book(NewBook {
                book_id: Some(id),
                title: Some(format!("Title {id}")),
                author: Some(format!("Author {}", id % 50)),
                isbn: None,
            })
            .unwrap();
    }
    for id in 1..=members {
        library
            .create_member(NewMember::new(id, format!("Member {id}"), 30))
            .unwrap();
    }
    library
}

fn bench_lending(c: &mut Criterion) {
    let mut group = c.benchmark_group("lending");
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    group.bench_function("borrow_and_return", |b| {
        let mut library = stocked_library(100, 100);
        b.iter(|| {
            library
                .borrow(black_box(LoanRequest::new(1, 1)), now)
                .unwrap();
            library
                .return_book(black_box(LoanRequest::new(1, 1)), now)
                .unwrap();
        })
    });

    for loans in [10i64, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("overdue", loans), &loans, |b, &loans| {
            let mut library = stocked_library(loans, loans);
            for id in 1..=loans {
                library.borrow(LoanRequest::new(id, id), now).unwrap();
            }
            let later = now + chrono::Duration::days(30);
            b.iter(|| library.overdue(black_box(later)).unwrap())
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [100i64, 1000, 10000] {
        let library = stocked_library(size, 0);
        let query = SearchQuery {
            q: Some("author 7".into()),
            sort_by: Some("popularity".into()),
            sort_order: Some("desc".into()),
            ..SearchQuery::default()
        };
        group.bench_with_input(BenchmarkId::new("text_query", size), &size, |b, _| {
            b.iter(|| library.search_books(black_box(&query)).unwrap())
        });
    }

    group.finish();
}

fn bench_reservations(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    c.bench_function("reserve_queued", |b| {
        let mut library = stocked_library(1, 10_001);
        library.borrow(LoanRequest::new(10_001, 1), now).unwrap();
        let mut member = 1;
        b.iter(|| {
            member = member % 10_000 + 1;
            library
                .create_reservation(black_box(ReservationRequest::new(member, 1)), now)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_lending, bench_search, bench_reservations);
criterion_main!(benches);
