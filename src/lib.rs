use std::env;

pub mod bridge;
pub mod device;
pub mod error;

pub use bridge::handle::{spawn_bridge, BridgeConfig, BridgeHandle};
pub use device::capability::DeviceCapability;
pub use device::types::{BreathTestResult, ConnectionEvent, ConnectionState, DeviceIdentity};
pub use error::BridgeError;

pub fn init_logging() {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339(std::time::SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stderr());

    if let Ok(log_file) = env::var("LOG_FILE") {
        dispatch = dispatch.chain(
            fern::log_file(log_file).expect("Failed to open LOG_FILE")
        );
    }

    dispatch.apply().expect("Failed to initialize logger");
}
