//! Plugin driver regression test
//!
//! Blocking and queued dispatch, dropped-frame accounting, live mode
//! switches and client writes through the driver.
//!
//! Run with:
//! ```
//! cargo test -p roistat-plugin --test driver_reg
//! ```

use parking_lot::Mutex;
use roistat_core::Frame;
use roistat_plugin::{Param, ParamEvent, PluginDriver, RoiStatConfig};
use roistat_test::{RegParams, ramp_frame_2d};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::sync::mpsc::channel;

fn frame() -> Frame {
    // 4x4 ramp, value = x + 4y
    ramp_frame_2d(4, 4, |x, y| (x + 4 * y) as u16).unwrap()
}

fn enable_full_frame(driver: &PluginDriver, roi: usize) {
    driver.write_int32(roi, Param::Use, 1).unwrap();
    driver.write_int32(roi, Param::Dim0Size, 4).unwrap();
    driver.write_int32(roi, Param::Dim1Size, 4).unwrap();
}

#[test]
fn driver_reg_blocking() {
    let mut rp = RegParams::new("driver_blocking");

    let driver = PluginDriver::new(RoiStatConfig {
        blocking_callbacks: true,
        max_rois: 2,
        ..Default::default()
    })
    .unwrap();
    enable_full_frame(&driver, 1);
    driver.push_frame(frame()).unwrap();

    rp.compare_values(0.0, driver.read_float64(1, Param::MinValue).unwrap(), 0.0);
    rp.compare_values(15.0, driver.read_float64(1, Param::MaxValue).unwrap(), 0.0);
    rp.compare_values(7.5, driver.read_float64(1, Param::MeanValue).unwrap(), 0.0);
    rp.compare_values(120.0, driver.read_float64(1, Param::Total).unwrap(), 0.0);
    rp.compare_values(1.0, driver.read_int32(0, Param::ArrayCounter).unwrap() as f64, 0.0);

    driver.write_int32(1, Param::Reset, 1).unwrap();
    rp.compare_values(0.0, driver.read_float64(1, Param::Total).unwrap(), 0.0);

    assert!(rp.cleanup(), "driver_reg blocking tests failed");
}

#[test]
fn driver_reg_queued() {
    let mut rp = RegParams::new("driver_queued");

    let mut driver = PluginDriver::new(RoiStatConfig {
        queue_size: 16,
        max_rois: 1,
        ..Default::default()
    })
    .unwrap();
    enable_full_frame(&driver, 0);
    for _ in 0..5 {
        driver.push_frame(frame()).unwrap();
    }
    driver.shutdown();

    rp.compare_values(5.0, driver.read_int32(0, Param::ArrayCounter).unwrap() as f64, 0.0);
    rp.compare_values(0.0, driver.read_int32(0, Param::DroppedArrays).unwrap() as f64, 0.0);
    rp.compare_values(7.5, driver.read_float64(0, Param::MeanValue).unwrap(), 0.0);

    assert!(rp.cleanup(), "driver_reg queued tests failed");
}

#[test]
fn driver_reg_dropped_frames() {
    let mut rp = RegParams::new("driver_dropped");

    let mut driver = PluginDriver::new(RoiStatConfig {
        queue_size: 1,
        max_rois: 1,
        ..Default::default()
    })
    .unwrap();
    enable_full_frame(&driver, 0);
    driver.write_int32(0, Param::ArrayCallbacks, 1).unwrap();

    // The consumer holds the processing thread until released
    let (started_tx, started_rx) = channel::<()>();
    let (release_tx, release_rx) = channel::<()>();
    let started_tx = Mutex::new(started_tx);
    let release_rx = Mutex::new(release_rx);
    driver.register_array_callback(move |_: &Frame| {
        let _ = started_tx.lock().send(());
        let _ = release_rx.lock().recv();
    });

    driver.push_frame(frame()).unwrap();
    started_rx.recv().unwrap();
    // thread busy: one frame fits in the queue, the rest are dropped
    for _ in 0..3 {
        driver.push_frame(frame()).unwrap();
    }
    rp.compare_values(2.0, driver.read_int32(0, Param::DroppedArrays).unwrap() as f64, 0.0);

    release_tx.send(()).unwrap();
    release_tx.send(()).unwrap();
    driver.shutdown();

    rp.compare_values(2.0, driver.read_int32(0, Param::ArrayCounter).unwrap() as f64, 0.0);
    rp.compare_values(2.0, driver.read_int32(0, Param::DroppedArrays).unwrap() as f64, 0.0);

    assert!(rp.cleanup(), "driver_reg dropped tests failed");
}

#[test]
fn driver_reg_mode_switch() {
    let mut rp = RegParams::new("driver_mode_switch");

    let driver = PluginDriver::new(RoiStatConfig::default()).unwrap();
    enable_full_frame(&driver, 0);
    driver.write_int32(0, Param::BlockingCallbacks, 1).unwrap();
    driver.push_frame(frame()).unwrap();
    // processed before push_frame returned
    rp.compare_values(1.0, driver.read_int32(0, Param::ArrayCounter).unwrap() as f64, 0.0);
    rp.compare_values(120.0, driver.read_float64(0, Param::Total).unwrap(), 0.0);

    driver.write_int32(0, Param::EnableCallbacks, 0).unwrap();
    driver.push_frame(frame()).unwrap();
    rp.compare_values(1.0, driver.read_int32(0, Param::ArrayCounter).unwrap() as f64, 0.0);

    assert!(rp.cleanup(), "driver_reg mode switch tests failed");
}

#[test]
fn driver_reg_notifications() {
    let driver = PluginDriver::new(RoiStatConfig {
        blocking_callbacks: true,
        max_rois: 2,
        ..Default::default()
    })
    .unwrap();
    enable_full_frame(&driver, 1);

    let events = Arc::new(Mutex::new(Vec::<ParamEvent>::new()));
    let sink = Arc::clone(&events);
    driver
        .params()
        .lock()
        .subscribe(move |e| sink.lock().push(e.clone()));

    driver.push_frame(frame()).unwrap();

    let events = events.lock();
    let mean = events
        .iter()
        .find(|e| e.addr == 1 && e.param == Param::MeanValue)
        .map(|e| e.value.clone());
    assert_eq!(mean, Some(roistat_plugin::ParamValue::Double(7.5)));
    assert!(
        events
            .iter()
            .any(|e| e.addr == 0 && e.param == Param::ArrayCounter)
    );
    assert!(!events.iter().any(|e| e.addr == 0 && e.param == Param::MeanValue));
}

#[test]
fn driver_reg_string_and_double_writes() {
    let driver = PluginDriver::new(RoiStatConfig::default()).unwrap();
    driver.write_octet(0, Param::Name, "beam centre").unwrap();
    assert_eq!(driver.read_octet(0, Param::Name).unwrap(), "beam centre");
    driver.write_float64(0, Param::Total, 2.5).unwrap();
    assert_eq!(driver.read_float64(0, Param::Total).unwrap(), 2.5);
    assert!(driver.write_float64(0, Param::Use, 1.0).is_err());
    assert!(driver.write_int32(99, Param::Use, 1).is_err());
}

#[test]
fn driver_reg_consumer_writes_back() {
    let mut rp = RegParams::new("driver_consumer_writes_back");

    let driver = Arc::new(
        PluginDriver::new(RoiStatConfig {
            blocking_callbacks: true,
            max_rois: 2,
            ..Default::default()
        })
        .unwrap(),
    );
    enable_full_frame(&driver, 0);
    enable_full_frame(&driver, 1);
    driver.write_int32(0, Param::ArrayCallbacks, 1).unwrap();

    // The first forwarded copy disables region 1 while the frame is in flight
    let forwarded = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&forwarded);
    let handle: Weak<PluginDriver> = Arc::downgrade(&driver);
    driver.register_array_callback(move |_: &Frame| {
        if count.fetch_add(1, Ordering::SeqCst) == 0 {
            if let Some(driver) = handle.upgrade() {
                driver.write_int32(1, Param::Use, 0).unwrap();
            }
        }
    });

    driver.push_frame(frame()).unwrap();

    rp.compare_values(1.0, forwarded.load(Ordering::SeqCst) as f64, 0.0);
    rp.compare_values(0.0, driver.read_int32(1, Param::Use).unwrap() as f64, 0.0);
    rp.compare_values(120.0, driver.read_float64(0, Param::Total).unwrap(), 0.0);
    rp.compare_values(0.0, driver.read_float64(1, Param::Total).unwrap(), 0.0);

    assert!(rp.cleanup(), "driver_reg consumer write-back tests failed");
}
