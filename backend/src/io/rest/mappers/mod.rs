pub mod alert_mapper;

pub use alert_mapper::AlertMapper;
