//! End-to-end contract tests: every builtin executed against the mock
//! context, with the fail-safe semantics the contract promises.

use embassy_futures::block_on;

use loggervm::adapters::{
    MockAnalog, MockClock, MockConsole, MockDigital, MockSensorBus, MockTableStore,
};
use loggervm::domain::{CellValue, Column, ColumnFormat, SamplePeriod, TableDef};
use loggervm::ports::sensor_bus::SensorBusError;
use loggervm::ports::table_store::TableStoreError;
use loggervm::ports::{AnalogError, BusAddress, ClockPort, DigitalError};
use loggervm::{BuiltinCall, BuiltinError, BuiltinValue, HostBuiltins, ADC_READ_FAILED};

type MockHost =
    HostBuiltins<MockAnalog, MockDigital, MockSensorBus, MockConsole, MockClock, MockTableStore>;

/// A context with one converter (4 channels), 8 output channels, and a
/// 4-reading sensor at bus address 0.
fn mock_host() -> MockHost {
    let mut analog = MockAnalog::new(1, 4);
    analog.set_reading(0, 2, 512);

    let mut bus = MockSensorBus::new();
    bus.attach(
        BusAddress::try_new(0).unwrap(),
        &[21.5, 60.2, 1013.1, -4.0],
    );

    HostBuiltins::new(
        analog,
        MockDigital::new(8),
        bus,
        MockConsole::new(),
        MockClock::new(),
        MockTableStore::new(),
    )
}

fn env_table() -> TableDef {
    let mut def = TableDef::new("env", SamplePeriod::Seconds(10));
    def.push_column(Column::new("temp", ColumnFormat::Float))
        .unwrap();
    def.push_column(Column::new("n", ColumnFormat::Int32))
        .unwrap();
    def
}

// ============================================================================
// Math builtins
// ============================================================================

#[test]
fn math_builtins_compute() {
    let mut host = mock_host();
    let cases = [
        (BuiltinCall::Sin(0.0), 0.0),
        (BuiltinCall::Cos(0.0), 1.0),
        (BuiltinCall::Sqrt(9.0), 3.0),
        (BuiltinCall::Exp(0.0), 1.0),
        (BuiltinCall::Tanh(0.0), 0.0),
        (BuiltinCall::Atan(1.0), core::f32::consts::FRAC_PI_4),
    ];
    for (call, expected) in cases {
        let Ok(BuiltinValue::Float(got)) = block_on(host.execute(call)) else {
            panic!("math builtin did not return a float");
        };
        assert!((got - expected).abs() < 1e-6, "got {got}, want {expected}");
    }
}

#[test]
fn math_domain_errors_yield_nan_not_faults() {
    let mut host = mock_host();
    let cases = [
        BuiltinCall::Sqrt(-1.0),
        BuiltinCall::Asin(2.0),
        BuiltinCall::Acos(-1.5),
        BuiltinCall::Acosh(0.5),
        BuiltinCall::Atanh(2.0),
    ];
    for call in cases {
        match block_on(host.execute(call)) {
            Ok(BuiltinValue::Float(v)) => assert!(v.is_nan()),
            other => panic!("expected a NaN result, got {other:?}"),
        }
    }
}

// ============================================================================
// print
// ============================================================================

#[test]
fn print_emits_text_verbatim() {
    let mut host = mock_host();
    block_on(host.execute(BuiltinCall::Print("reading %f\n"))).unwrap();
    block_on(host.execute(BuiltinCall::Print("done"))).unwrap();

    let (_, _, _, console, _, _) = host.into_ports();
    // Format directives pass through untouched; interpolation is not
    // part of the contract
    assert_eq!(console.output(), "reading %f\ndone");
}

// ============================================================================
// getADC
// ============================================================================

#[test]
fn adc_reads_scripted_value() {
    let mut host = mock_host();
    let result = block_on(host.execute(BuiltinCall::GetAdc { port: 0, channel: 2 }));
    assert_eq!(result, Ok(BuiltinValue::Int(512)));
}

#[test]
fn adc_out_of_range_returns_sentinel_not_fault() {
    let mut host = mock_host();
    for (port, channel) in [(5, 0), (0, 99), (-1, 0), (0, -3), (300, 0)] {
        let result = block_on(host.execute(BuiltinCall::GetAdc { port, channel }));
        assert_eq!(result, Ok(BuiltinValue::Int(ADC_READ_FAILED)));
    }
    // The context is still usable afterwards
    let result = block_on(host.execute(BuiltinCall::GetAdc { port: 0, channel: 2 }));
    assert_eq!(result, Ok(BuiltinValue::Int(512)));
}

#[test]
fn adc_hardware_failure_returns_sentinel() {
    let mut analog = MockAnalog::new(1, 4);
    analog.fail_next(AnalogError::ReadFailed);
    let mut host = HostBuiltins::new(
        analog,
        MockDigital::new(8),
        MockSensorBus::new(),
        MockConsole::new(),
        MockClock::new(),
        MockTableStore::new(),
    );
    let result = block_on(host.execute(BuiltinCall::GetAdc { port: 0, channel: 0 }));
    assert_eq!(result, Ok(BuiltinValue::Int(ADC_READ_FAILED)));
}

// ============================================================================
// setPin
// ============================================================================

#[test]
fn set_pin_drives_output() {
    let mut host = mock_host();
    block_on(host.execute(BuiltinCall::SetPin { channel: 3, level: 1 })).unwrap();
    block_on(host.execute(BuiltinCall::SetPin { channel: 3, level: 0 })).unwrap();
    // Any nonzero level is high
    block_on(host.execute(BuiltinCall::SetPin { channel: 5, level: -7 })).unwrap();

    let (_, digital, _, _, _, _) = host.into_ports();
    assert_eq!(
        digital.transitions(),
        &[(3, true), (3, false), (5, true)]
    );
    assert_eq!(digital.last_level(3), Some(false));
    assert_eq!(digital.last_level(5), Some(true));
    assert_eq!(digital.last_level(0), None);
}

#[test]
fn set_pin_invalid_channel_is_recoverable() {
    let mut host = mock_host();
    for channel in [8, -1, 4000] {
        let result = block_on(host.execute(BuiltinCall::SetPin { channel, level: 1 }));
        assert_eq!(
            result,
            Err(BuiltinError::Digital(DigitalError::InvalidChannel))
        );
    }
    // The rejection did not poison the context
    assert!(block_on(host.execute(BuiltinCall::SetPin { channel: 0, level: 1 })).is_ok());
}

// ============================================================================
// SDI12SingleMeasurement
// ============================================================================

#[test]
fn measurement_fills_requested_count() {
    let mut host = mock_host();
    let mut readings = [9.0f32; 8];
    block_on(host.execute(BuiltinCall::Sdi12SingleMeasurement {
        addr: 0,
        dst: &mut readings,
        count: 4,
    }))
    .unwrap();
    assert_eq!(&readings[..4], &[21.5, 60.2, 1013.1, -4.0]);
    // Elements past `count` are never written
    assert_eq!(&readings[4..], &[9.0; 4]);
}

#[test]
fn measurement_never_writes_past_count_or_buffer() {
    let mut host = mock_host();

    // count larger than the buffer: capped at the buffer
    let mut short = [9.0f32; 2];
    block_on(host.execute(BuiltinCall::Sdi12SingleMeasurement {
        addr: 0,
        dst: &mut short,
        count: 100,
    }))
    .unwrap();
    assert_eq!(short, [21.5, 60.2]);
    // The bus itself was only ever asked for the capped window
    let (_, _, bus, _, _, _) = host_parts(&mut host);
    assert_eq!(bus.last_request(), Some((BusAddress::try_new(0).unwrap(), 2)));

    // negative count: nothing written at all
    let mut untouched = [9.0f32; 4];
    block_on(host.execute(BuiltinCall::Sdi12SingleMeasurement {
        addr: 0,
        dst: &mut untouched,
        count: -3,
    }))
    .unwrap();
    assert_eq!(untouched, [9.0; 4]);
}

#[test]
fn measurement_invalid_address_leaves_buffer_untouched() {
    let mut host = mock_host();
    let mut readings = [9.0f32; 4];
    for addr in [10, -1, 128] {
        let result = block_on(host.execute(BuiltinCall::Sdi12SingleMeasurement {
            addr,
            dst: &mut readings,
            count: 4,
        }));
        assert_eq!(
            result,
            Err(BuiltinError::SensorBus(SensorBusError::InvalidAddress))
        );
        assert_eq!(readings, [9.0; 4]);
    }
}

#[test]
fn measurement_timeout_zero_fills_and_reports() {
    let mut host = mock_host();

    // First call times out: the requested window is zero-filled, the
    // rest of the buffer stays untouched
    let mut readings = [9.0f32; 6];
    let (_, _, bus, _, _, _) = host_parts(&mut host);
    bus.fail_next(SensorBusError::Timeout);
    let result = block_on(host.execute(BuiltinCall::Sdi12SingleMeasurement {
        addr: 0,
        dst: &mut readings,
        count: 4,
    }));
    assert_eq!(result, Err(BuiltinError::SensorBus(SensorBusError::Timeout)));
    assert_eq!(&readings[..4], &[0.0; 4]);
    assert_eq!(&readings[4..], &[9.0; 2]);

    // The failure was one measurement, not the bus: the next call works
    let mut retry = [0.0f32; 4];
    block_on(host.execute(BuiltinCall::Sdi12SingleMeasurement {
        addr: 0,
        dst: &mut retry,
        count: 4,
    }))
    .unwrap();
    assert_eq!(retry, [21.5, 60.2, 1013.1, -4.0]);
}

#[test]
fn measurement_no_sensor_reports_no_response() {
    let mut host = mock_host();
    let mut readings = [9.0f32; 2];
    let result = block_on(host.execute(BuiltinCall::Sdi12SingleMeasurement {
        addr: 7,
        dst: &mut readings,
        count: 2,
    }));
    assert_eq!(
        result,
        Err(BuiltinError::SensorBus(SensorBusError::NoResponse))
    );
    // Defined contents even after a failed cycle
    assert_eq!(readings, [0.0; 2]);
}

// ============================================================================
// delay / waitNextMeasure
// ============================================================================

#[test]
fn delay_zero_returns_immediately() {
    let mut host = mock_host();
    block_on(host.execute(BuiltinCall::Delay { ms: 0 })).unwrap();
    block_on(host.execute(BuiltinCall::Delay { ms: -100 })).unwrap();

    let (_, _, _, _, clock, _) = host.into_ports();
    assert_eq!(clock.sleeps(), &[] as &[u64]);
    assert_eq!(clock.now_ms(), 0);
}

#[test]
fn delay_suspends_for_duration() {
    let mut host = mock_host();
    block_on(host.execute(BuiltinCall::Delay { ms: 250 })).unwrap();
    block_on(host.execute(BuiltinCall::Delay { ms: 50 })).unwrap();

    let (_, _, _, _, clock, _) = host.into_ports();
    assert_eq!(clock.sleeps(), &[250, 50]);
    assert_eq!(clock.now_ms(), 300);
}

#[test]
fn wait_next_measure_without_tables_reports_no_cycle() {
    let mut host = mock_host();
    let result = block_on(host.execute(BuiltinCall::WaitNextMeasure));
    assert_eq!(result, Err(BuiltinError::NoMeasurementCycle));
}

#[test]
fn wait_next_measure_lands_on_period_boundaries() {
    let mut host = mock_host();
    host.register_table(&env_table()).unwrap();

    block_on(host.execute(BuiltinCall::WaitNextMeasure)).unwrap();
    assert_eq!(host.now_ms(), 10_000);

    // A second wait moves to the following boundary, not the same one
    block_on(host.execute(BuiltinCall::WaitNextMeasure)).unwrap();
    assert_eq!(host.now_ms(), 20_000);

    // Work between cycles is absorbed by the next wait
    block_on(host.execute(BuiltinCall::Delay { ms: 3_500 })).unwrap();
    let (_, _, _, _, clock, _) = host_parts(&mut host);
    clock.advance(500);
    block_on(host.execute(BuiltinCall::WaitNextMeasure)).unwrap();
    assert_eq!(host.now_ms(), 30_000);
}

#[test]
fn wait_next_measure_from_mid_cycle() {
    // The context can come up mid-cycle (e.g. after a watchdog reset);
    // the wait still lands on the next absolute boundary
    let mut host = HostBuiltins::new(
        MockAnalog::new(1, 4),
        MockDigital::new(8),
        MockSensorBus::new(),
        MockConsole::new(),
        MockClock::at(12_345),
        MockTableStore::new(),
    );
    host.register_table(&env_table()).unwrap();

    block_on(host.execute(BuiltinCall::WaitNextMeasure)).unwrap();
    assert_eq!(host.now_ms(), 20_000);
}

#[test]
fn wait_next_measure_uses_earliest_table() {
    let mut host = mock_host();
    host.register_table(&env_table()).unwrap();

    let mut hourly = TableDef::new("daily_summary", SamplePeriod::Hours(1));
    hourly
        .push_column(Column::new("mean", ColumnFormat::Float))
        .unwrap();
    host.register_table(&hourly).unwrap();

    block_on(host.execute(BuiltinCall::WaitNextMeasure)).unwrap();
    assert_eq!(host.now_ms(), 10_000);
}

// ============================================================================
// saveTable
// ============================================================================

#[test]
fn save_table_commits_staged_rows() {
    let mut host = mock_host();
    let id = host.register_table(&env_table()).unwrap();
    host.stage_row(id, &[CellValue::Float(21.5), CellValue::Int(1)])
        .unwrap();
    host.stage_row(id, &[CellValue::Float(21.7), CellValue::Int(2)])
        .unwrap();
    assert_eq!(host.store_stats().staged_rows, 2);

    block_on(host.execute(BuiltinCall::SaveTable)).unwrap();

    let stats = host.store_stats();
    assert_eq!(stats.staged_rows, 0);
    assert_eq!(stats.committed_rows, 2);
}

#[test]
fn save_table_storage_failure_is_reported_not_fatal() {
    let mut host = mock_host();
    let id = host.register_table(&env_table()).unwrap();
    host.stage_row(id, &[CellValue::Float(21.5), CellValue::Int(1)])
        .unwrap();

    let (_, _, _, _, _, store) = host_parts(&mut host);
    store.fail_next_commit(TableStoreError::StorageFull);
    let result = block_on(host.execute(BuiltinCall::SaveTable));
    assert_eq!(
        result,
        Err(BuiltinError::TableStore(TableStoreError::StorageFull))
    );

    // The row survived the failed commit; a retry persists it
    assert_eq!(host.store_stats().staged_rows, 1);
    block_on(host.execute(BuiltinCall::SaveTable)).unwrap();
    assert_eq!(host.store_stats().committed_rows, 1);
}

// ============================================================================
// helpers
// ============================================================================

/// Mutable access to every mock port of a context under test.
fn host_parts(
    host: &mut MockHost,
) -> (
    &mut MockAnalog,
    &mut MockDigital,
    &mut MockSensorBus,
    &mut MockConsole,
    &mut MockClock,
    &mut MockTableStore,
) {
    host.ports_mut()
}
