//! In-store devices: sensors that report events and appliances that also
//! accept commands.

pub mod device;

pub use device::{
    ApplianceType, CommandHandler, CreateDevice, Device, DeviceKind, DeviceView, EventHandler,
    SensorType,
};
