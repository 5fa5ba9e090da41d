//! Builtin Runtime Host Shell
//!
//! This binary runs on your PC and provides an interactive shell to
//! exercise the datalogger builtin contract against the host adapters,
//! with a mock analog frontend and a mock sensor bus standing in for
//! the hardware.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin loggervm_host
//! ```
//!
//! ## Commands
//!
//! - `sigs` - List the builtin symbol table
//! - `sig <name>` - Show one builtin signature
//! - `check <name> <type...>` - Type-check a call site (types: char, int,
//!   float, char[], int[], float[])
//! - `call <name> <args...>` - Execute a builtin
//! - `table <name> <period> <col:fmt...>` - Register a table
//!   (period like `10s`, `5m`, `2h`; fmt is `int` or `float`)
//! - `tables` - Show table store statistics
//! - `stage <id> <values...>` - Stage a row (values with `.` are floats)
//! - `help` - Show help
//! - `exit` - Exit shell
//!
//! ## Examples
//!
//! ```bash
//! call sin 1.5708                 # 1.0
//! call sqrt -1                    # NaN, not a fault
//! call getADC 0 2                 # scripted mock reading
//! call getADC 0 99                # -1 sentinel
//! call SDI12SingleMeasurement 0 4 # four readings from the mock bus
//! table env 10s temp:float n:int
//! stage 0 21.5 3
//! call saveTable
//! ```

use std::io::{self, Write};

use embassy_futures::block_on;

use loggervm::adapters::{MemTableStore, MockAnalog, MockDigital, MockSensorBus, StdClock, StdConsole};
use loggervm::builtin_table::{self, ReturnType, BUILTINS};
use loggervm::dispatch::{BuiltinCall, BuiltinValue, HostBuiltins};
use loggervm::domain::{CellValue, Column, ColumnFormat, SamplePeriod, TableDef, ValueType};
use loggervm::ports::table_store::TableId;
use loggervm::ports::BusAddress;

type Host =
    HostBuiltins<MockAnalog, MockDigital, MockSensorBus, StdConsole, StdClock, MemTableStore>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let mut host = build_host();

    println!("loggervm host shell - 'help' for commands, 'exit' to quit");
    println!("Mock frontend: ADC port 0 channels 0-3, bus sensors at addresses 0 and 3");

    let stdin = io::stdin();
    loop {
        print!("loggervm> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = parts.split_first() else {
            continue;
        };

        match command {
            "help" => print_help(),
            "exit" | "quit" => break,
            "sigs" => print_signatures(),
            "sig" => match rest.first().and_then(|name| builtin_table::lookup(name)) {
                Some(sig) => println!("  {}", format_signature(sig)),
                None => println!("unknown builtin"),
            },
            "check" => check_command(rest),
            "call" => call_command(&mut host, rest),
            "table" => table_command(&mut host, rest),
            "tables" => tables_command(&host),
            "stage" => stage_command(&mut host, rest),
            _ => println!("unknown command '{command}' - try 'help'"),
        }
    }

    Ok(())
}

/// Assemble the shell's context: std console/clock/store, mock hardware.
fn build_host() -> Host {
    let mut analog = MockAnalog::new(1, 4);
    analog.set_reading(0, 0, 57);
    analog.set_reading(0, 1, 1023);
    analog.set_reading(0, 2, 512);

    let mut bus = MockSensorBus::new();
    if let Some(addr) = BusAddress::try_new(0) {
        bus.attach(addr, &[21.5, 60.2, 1013.1, 0.0]);
    }
    if let Some(addr) = BusAddress::try_new(3) {
        bus.attach(addr, &[7.25]);
    }

    HostBuiltins::new(
        analog,
        MockDigital::new(8),
        bus,
        StdConsole,
        StdClock::new(),
        MemTableStore::new(),
    )
}

fn print_help() {
    println!("Commands:");
    println!("  sigs                          list the builtin symbol table");
    println!("  sig <name>                    show one signature");
    println!("  check <name> <type...>        type-check a call site");
    println!("  call <name> <args...>         execute a builtin");
    println!("  table <name> <period> <c:f..> register a table (10s/5m/2h, int|float)");
    println!("  tables                        table store statistics");
    println!("  stage <id> <values...>        stage a row ('.' means float)");
    println!("  exit                          quit");
}

fn print_signatures() {
    for (slot, sig) in BUILTINS.iter().enumerate() {
        println!(
            "  [{:2}] @0x{:05X} {}",
            slot,
            builtin_table::address_of(slot),
            format_signature(sig)
        );
    }
}

fn format_signature(sig: &loggervm::BuiltinSignature) -> String {
    let params: Vec<&str> = sig.params.iter().map(|p| p.as_str()).collect();
    let ret = match sig.ret {
        ReturnType::Void => "void",
        ReturnType::Scalar(t) => t.as_str(),
    };
    format!("{}({}) -> {}", sig.name, params.join(", "), ret)
}

fn parse_type(token: &str) -> Option<ValueType> {
    match token {
        "char" => Some(ValueType::Char),
        "int" => Some(ValueType::Int),
        "float" => Some(ValueType::Float),
        "char[]" => Some(ValueType::CharArray),
        "int[]" => Some(ValueType::IntArray),
        "float[]" => Some(ValueType::FloatArray),
        _ => None,
    }
}

fn check_command(rest: &[&str]) {
    let Some((&name, type_tokens)) = rest.split_first() else {
        println!("usage: check <name> <type...>");
        return;
    };
    let mut types = Vec::new();
    for token in type_tokens {
        match parse_type(token) {
            Some(t) => types.push(t),
            None => {
                println!("unknown type '{token}'");
                return;
            }
        }
    }
    match builtin_table::check_call(name, &types) {
        Ok(ReturnType::Void) => println!("ok: call type-checks, returns void"),
        Ok(ReturnType::Scalar(t)) => println!("ok: call type-checks, returns {}", t.as_str()),
        Err(e) => println!("rejected: {e:?}"),
    }
}

/// Math builtins take one float; resolve the constructor by name.
fn math_call(name: &str, x: f32) -> Option<BuiltinCall<'static>> {
    let call = match name {
        "sin" => BuiltinCall::Sin(x),
        "cos" => BuiltinCall::Cos(x),
        "tan" => BuiltinCall::Tan(x),
        "asin" => BuiltinCall::Asin(x),
        "acos" => BuiltinCall::Acos(x),
        "atan" => BuiltinCall::Atan(x),
        "sinh" => BuiltinCall::Sinh(x),
        "cosh" => BuiltinCall::Cosh(x),
        "tanh" => BuiltinCall::Tanh(x),
        "asinh" => BuiltinCall::Asinh(x),
        "acosh" => BuiltinCall::Acosh(x),
        "atanh" => BuiltinCall::Atanh(x),
        "sqrt" => BuiltinCall::Sqrt(x),
        "exp" => BuiltinCall::Exp(x),
        _ => return None,
    };
    Some(call)
}

fn call_command(host: &mut Host, rest: &[&str]) {
    let Some((&name, args)) = rest.split_first() else {
        println!("usage: call <name> <args...>");
        return;
    };
    if builtin_table::lookup(name).is_none() {
        println!("unknown builtin '{name}'");
        return;
    }

    match name {
        "print" => {
            let text = args.join(" ");
            match block_on(host.execute(BuiltinCall::Print(&text))) {
                Ok(_) => println!(), // terminate the emitted line
                Err(e) => println!("error: {e:?}"),
            }
        }
        "getADC" => {
            let (Some(port), Some(channel)) = (parse_int(args, 0), parse_int(args, 1)) else {
                println!("usage: call getADC <port> <channel>");
                return;
            };
            report(host, BuiltinCall::GetAdc { port, channel });
        }
        "setPin" => {
            let (Some(channel), Some(level)) = (parse_int(args, 0), parse_int(args, 1)) else {
                println!("usage: call setPin <channel> <level>");
                return;
            };
            report(host, BuiltinCall::SetPin { channel, level });
        }
        "SDI12SingleMeasurement" => {
            let (Some(addr), Some(count)) = (parse_int(args, 0), parse_int(args, 1)) else {
                println!("usage: call SDI12SingleMeasurement <addr> <count>");
                return;
            };
            let mut readings = [0.0f32; 32];
            let call = BuiltinCall::Sdi12SingleMeasurement {
                addr,
                dst: &mut readings,
                count,
            };
            match block_on(host.execute(call)) {
                Ok(_) => {
                    let n = count.clamp(0, 32) as usize;
                    println!("readings: {:?}", &readings[..n]);
                }
                Err(e) => println!("error: {e:?}"),
            }
        }
        "delay" => {
            let Some(ms) = parse_int(args, 0) else {
                println!("usage: call delay <ms>");
                return;
            };
            report(host, BuiltinCall::Delay { ms });
        }
        "waitNextMeasure" => report(host, BuiltinCall::WaitNextMeasure),
        "saveTable" => report(host, BuiltinCall::SaveTable),
        // Remaining builtins are the single-float math intrinsics
        _ => {
            let Some(x) = args.first().and_then(|a| a.parse::<f32>().ok()) else {
                println!("usage: call {name} <x>");
                return;
            };
            match math_call(name, x) {
                Some(call) => report(host, call),
                None => println!("unknown builtin '{name}'"),
            }
        }
    }
}

fn report(host: &mut Host, call: BuiltinCall<'_>) {
    match block_on(host.execute(call)) {
        Ok(BuiltinValue::Void) => println!("ok"),
        Ok(BuiltinValue::Int(v)) => println!("= {v}"),
        Ok(BuiltinValue::Float(v)) => println!("= {v}"),
        Err(e) => println!("error: {e:?}"),
    }
}

fn parse_int(args: &[&str], index: usize) -> Option<i32> {
    args.get(index).and_then(|a| a.parse::<i32>().ok())
}

fn table_command(host: &mut Host, rest: &[&str]) {
    if rest.len() < 3 {
        println!("usage: table <name> <period> <col:fmt...>");
        return;
    }
    let Some(period) = parse_period(rest[1]) else {
        println!("bad period '{}' (try 10s, 5m, 2h)", rest[1]);
        return;
    };
    let mut def = TableDef::new(rest[0], period);
    for spec in &rest[2..] {
        let Some((col_name, fmt)) = spec.split_once(':') else {
            println!("bad column '{spec}' (try temp:float)");
            return;
        };
        let format = match fmt {
            "int" => ColumnFormat::Int32,
            "float" => ColumnFormat::Float,
            _ => {
                println!("bad column format '{fmt}' (int or float)");
                return;
            }
        };
        if let Err(e) = def.push_column(Column::new(col_name, format)) {
            println!("error: {e:?}");
            return;
        }
    }
    match host.register_table(&def) {
        Ok(id) => println!("registered '{}' as table {}", def.name(), id.0),
        Err(e) => println!("error: {e:?}"),
    }
}

fn parse_period(token: &str) -> Option<SamplePeriod> {
    if !token.is_ascii() {
        return None;
    }
    let (digits, unit) = token.split_at(token.len().checked_sub(1)?);
    let value: u8 = digits.parse().ok()?;
    let period = match unit {
        "s" => SamplePeriod::seconds(value),
        "m" => SamplePeriod::minutes(value),
        "h" => SamplePeriod::hours(value),
        _ => return None,
    };
    period.ok()
}

fn tables_command(host: &Host) {
    let stats = host.store_stats();
    println!("tables:    {}", stats.tables);
    println!("staged:    {}", stats.staged_rows);
    println!("committed: {}", stats.committed_rows);
    match host.schedule().next_due_ms(host.now_ms()) {
        Some(due) => println!("next measurement cycle at {due} ms since boot"),
        None => println!("no measurement cycle (no tables registered)"),
    }
}

fn stage_command(host: &mut Host, rest: &[&str]) {
    let Some((&id, value_tokens)) = rest.split_first() else {
        println!("usage: stage <id> <values...>");
        return;
    };
    let Ok(id) = id.parse::<u8>() else {
        println!("bad table id '{id}'");
        return;
    };
    let mut row = Vec::new();
    for token in value_tokens {
        let cell = if token.contains('.') {
            token.parse::<f32>().ok().map(CellValue::Float)
        } else {
            token.parse::<i32>().ok().map(CellValue::Int)
        };
        match cell {
            Some(cell) => row.push(cell),
            None => {
                println!("bad value '{token}'");
                return;
            }
        }
    }
    match host.stage_row(TableId(id), &row) {
        Ok(()) => println!("staged {} cells", row.len()),
        Err(e) => println!("error: {e:?}"),
    }
}
