//! Integration test harness for the slotlock workspace. All tests live
//! under `tests/`; build the program with `cargo-build-sbf` first so the
//! fixture can load the real binary.
