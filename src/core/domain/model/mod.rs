pub mod channel;
pub mod client_config;
pub mod device;
pub mod entity;
pub mod group;
pub mod historic_data;
pub mod node;
pub mod prtg_connection;
pub mod registry;
pub mod sensor;
pub mod status;
