//! Test helpers for composing CLI input files.

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use courier_core::test_support::{
    candidate, courier, date, delivery_with_stops, manager, product, stop, vehicle, window,
};
use courier_core::{CandidateDelivery, StoreSnapshot, UserId, VehicleId};
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;

/// Temporary directory holding the files of one test.
pub(super) struct Workspace {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        Self { _tmp: tmp, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write_json(&self, name: &str, value: &Value) -> Utf8PathBuf {
        let payload = serde_json::to_vec_pretty(value).expect("serialise fixture");
        self.write_raw(name, &payload)
    }

    pub(super) fn write_raw(&self, name: &str, contents: &[u8]) -> Utf8PathBuf {
        let path = self.path(name);
        std::fs::write(path.as_std_path(), contents).expect("write fixture");
        path
    }
}

pub(super) fn today() -> NaiveDate {
    date(2030, 3, 1)
}

pub(super) fn delivery_day() -> NaiveDate {
    date(2030, 3, 10)
}

/// Couriers 2 and 3, manager 4, a 100 kg van and a 10 kg product.
pub(super) fn fleet() -> StoreSnapshot {
    StoreSnapshot {
        users: vec![courier(2), courier(3), manager(4)],
        vehicles: vec![vehicle(1, Decimal::ONE_HUNDRED, Decimal::from(15))],
        products: vec![product(
            1,
            Decimal::TEN,
            Decimal::TEN,
            Decimal::TEN,
            Decimal::TEN,
        )],
        deliveries: Vec::new(),
    }
}

/// `fleet` with 60 kg already planned on the van from 10:00 to 14:00.
pub(super) fn loaded_fleet() -> StoreSnapshot {
    let mut snapshot = fleet();
    snapshot.deliveries.push(delivery_with_stops(
        10,
        UserId(3),
        VehicleId(1),
        delivery_day(),
        window(10, 14),
        vec![stop(1, &[(1, 6)])],
    ));
    snapshot
}

/// Courier 2 on the van, delivering `units` of product 1.
pub(super) fn assigned_candidate(on: NaiveDate, units: u32) -> CandidateDelivery {
    candidate(on, 12, 16, vec![stop(1, &[(1, units)])])
        .with_courier(UserId(2))
        .with_vehicle(VehicleId(1))
}

pub(super) fn stdout_json(buffer: &[u8]) -> Value {
    serde_json::from_slice(buffer).expect("output should be JSON")
}
