// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end scans over a scripted block source

mod helpers;

use std::sync::Arc;

use bigdecimal::BigDecimal;
use deltascan::{
    BalanceChangeAggregator, BalanceChangeScanner, BalanceDirection, MaxConcurrency,
    ProviderError, ScanError, WindowSize,
};
use helpers::{addr, block, exhausted, transfer, MockBlockSource};

fn scanner(source: MockBlockSource, window: u64, limit: usize) -> BalanceChangeScanner {
    BalanceChangeScanner::new(
        Arc::new(source),
        WindowSize::new(window),
        MaxConcurrency::new(limit),
    )
}

#[tokio::test]
async fn sender_with_largest_outflow_wins() {
    let (x, y, z) = (addr(0x0a), addr(0x0b), addr(0x0c));
    let source = MockBlockSource::new(1_000)
        .with_block(block(1_000, vec![transfer(x, y, 70)]))
        .with_block(block(999, vec![transfer(x, z, 30)]));

    let report = scanner(source, 2, 5)
        .find_address_with_largest_balance_change()
        .await
        .unwrap();

    assert_eq!(report.latest_block, 1_000);
    assert_eq!(report.requested, vec![1_000, 999]);
    assert_eq!(report.aggregated_blocks, 2);
    assert!(report.is_complete());
    assert_eq!(report.largest.address, Some(x));
    assert_eq!(report.largest.change.wei(), "100");
    assert_eq!(report.largest.direction, BalanceDirection::Decrease);
}

#[tokio::test]
async fn intermediate_receiver_keeps_its_net_inflow() {
    let (x, y, z) = (addr(0x0a), addr(0x0b), addr(0x0c));
    let blocks = vec![
        block(1_000, vec![transfer(x, y, 100)]),
        block(999, vec![transfer(y, z, 30)]),
    ];

    let ledger = BalanceChangeAggregator::build_ledger(&blocks);
    assert_eq!(ledger.net_change(&x), Some(&BigDecimal::from(-100)));
    assert_eq!(ledger.net_change(&y), Some(&BigDecimal::from(70)));
    assert_eq!(ledger.net_change(&z), Some(&BigDecimal::from(30)));

    let source = blocks
        .into_iter()
        .fold(MockBlockSource::new(1_000), MockBlockSource::with_block);
    let report = scanner(source, 2, 5)
        .find_address_with_largest_balance_change()
        .await
        .unwrap();

    assert_eq!(report.largest.address, Some(x));
    assert_eq!(report.largest.change.wei(), "100");
    assert_eq!(report.largest.direction, BalanceDirection::Decrease);
}

#[tokio::test]
async fn failed_block_is_left_out_and_reported() {
    let (a, b) = (addr(0x01), addr(0x02));
    let source = MockBlockSource::new(50)
        .with_block(block(50, vec![transfer(a, b, 10)]))
        .with_block(block(49, vec![transfer(a, b, 10)]))
        .with_block(block(48, vec![transfer(b, a, 1_000)]))
        .with_block(block(47, vec![transfer(a, b, 10)]))
        .with_block(block(46, vec![transfer(a, b, 10)]))
        .with_failure(48, exhausted);

    let report = scanner(source, 5, 2)
        .find_address_with_largest_balance_change()
        .await
        .unwrap();

    assert_eq!(report.requested, vec![50, 49, 48, 47, 46]);
    assert_eq!(report.aggregated_blocks, 4);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].block_number, 48);
    assert!(matches!(
        report.failures[0].error,
        ProviderError::RetriesExhausted { .. }
    ));
    assert_eq!(report.failures[0].error.attempts(), 3);
    assert!(report.failures[0].error.to_string().contains("503"));
    assert_eq!(report.largest.address, Some(a));
    assert_eq!(report.largest.change.wei(), "40");
}

#[tokio::test]
async fn window_is_clamped_at_genesis() {
    let source = MockBlockSource::new(3);

    let report = scanner(source, 100, 5)
        .find_address_with_largest_balance_change()
        .await
        .unwrap();

    assert_eq!(report.requested, vec![3, 2, 1]);
}

#[tokio::test]
async fn empty_window_is_an_empty_result() {
    let source = Arc::new(MockBlockSource::new(1_000));
    let scanner = BalanceChangeScanner::new(
        source.clone(),
        WindowSize::new(0),
        MaxConcurrency::default(),
    );

    let report = scanner
        .find_address_with_largest_balance_change()
        .await
        .unwrap();

    assert!(report.requested.is_empty());
    assert!(report.largest.is_empty());
    assert!(report.largest.change.is_zero());
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn all_blocks_failing_is_an_empty_result() {
    let source = MockBlockSource::new(2)
        .with_failure(2, exhausted)
        .with_failure(1, exhausted);

    let report = scanner(source, 10, 5)
        .find_address_with_largest_balance_change()
        .await
        .unwrap();

    assert_eq!(report.aggregated_blocks, 0);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.largest.address, None);
    assert_eq!(report.largest.direction, BalanceDirection::None);
}

#[tokio::test]
async fn unreachable_tip_aborts_the_scan() {
    let source = MockBlockSource::new(0).with_failing_tip(|| ProviderError::http_status(503));

    let err = scanner(source, 10, 5)
        .find_address_with_largest_balance_change()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ScanError::LatestBlockNumber {
            source: ProviderError::HttpStatus { status: 503 }
        }
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tie_break_follows_window_order() {
    let (p, q) = (addr(0x11), addr(0x22));

    for _ in 0..10 {
        // Equal magnitudes everywhere; q sends from the tip block
        let source = MockBlockSource::new(10)
            .with_block(block(10, vec![transfer(q, addr(0x33), 5)]))
            .with_block(block(9, vec![transfer(p, addr(0x44), 5)]));

        let report = scanner(source, 2, 2)
            .find_address_with_largest_balance_change()
            .await
            .unwrap();
        assert_eq!(report.largest.address, Some(q));
    }
}

#[tokio::test]
async fn repeated_scans_are_identical() {
    let (a, b, c) = (addr(0x01), addr(0x02), addr(0x03));
    let build = || {
        MockBlockSource::new(20)
            .with_block(block(20, vec![transfer(a, b, 3), transfer(b, c, 3)]))
            .with_block(block(19, vec![transfer(c, a, 9)]))
    };

    let first = scanner(build(), 2, 1)
        .find_address_with_largest_balance_change()
        .await
        .unwrap();
    let second = scanner(build(), 2, 5)
        .find_address_with_largest_balance_change()
        .await
        .unwrap();

    assert_eq!(first.largest, second.largest);
    // a and c both moved 6 wei; a was touched first
    assert_eq!(first.largest.address, Some(a));
    assert_eq!(first.largest.change.wei(), "6");
    assert_eq!(first.largest.direction, BalanceDirection::Increase);
}
