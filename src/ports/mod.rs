//! Ports (interfaces) defining the boundaries of the runtime
//!
//! Ports are traits that define how the builtin runtime touches the
//! outside world. They keep the dispatch logic independent of hardware,
//! so the whole call contract runs against mock adapters in tests.
//!
//! # Hexagonal Architecture
//!
//! In hexagonal architecture, ports define the "holes" in the hexagon
//! where adapters plug in:
//!
//! - **AnalogPort**: how analog channels are read (on-chip ADC, mock)
//! - **DigitalPort**: how output pins are driven (GPIO, mock)
//! - **SensorBusPort**: how bus measurements are triggered (UART, mock)
//! - **ConsolePort**: where program text goes (stdout, USB CDC, mock)
//! - **ClockPort**: how time passes and contexts suspend
//! - **TableStorePort**: where committed table rows live (flash, mock)

pub mod analog;
pub mod clock;
pub mod console;
pub mod digital;
pub mod sensor_bus;
pub mod table_store;

pub use analog::{AnalogError, AnalogPort};
pub use clock::ClockPort;
pub use console::{ConsoleError, ConsolePort};
pub use digital::{DigitalError, DigitalPort};
pub use sensor_bus::{BusAddress, SensorBusConfig, SensorBusError, SensorBusPort};
pub use table_store::{TableId, TableStoreError, TableStorePort, TableStoreStats};
