//! Shared fixtures for integration tests.

#![allow(dead_code)]

use fintracker::models::{CommonPayment, UserAllocation, UserBalance, UserId};
use fintracker::money::EPSILON;

pub fn alloc(id: i64, name: &str, income: f64, alloc_quota: f64) -> UserAllocation {
    UserAllocation {
        user_id: UserId::from(id),
        name: name.into(),
        income,
        alloc_quota,
    }
}

pub fn paid(id: i64, amount: f64) -> CommonPayment {
    CommonPayment {
        user_id: UserId::from(id),
        name: None,
        amount,
    }
}

pub fn paid_named(id: i64, name: &str, amount: f64) -> CommonPayment {
    CommonPayment {
        user_id: UserId::from(id),
        name: Some(name.into()),
        amount,
    }
}

/// A balance with only a net position, for exercising transfer matching.
pub fn net(id: i64, name: &str, net: f64) -> UserBalance {
    UserBalance {
        user_id: UserId::from(id),
        name: name.into(),
        income: 0.0,
        alloc_quota: 0.0,
        paid_common: 0.0,
        net,
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= EPSILON,
        "expected {expected}, got {actual}"
    );
}
