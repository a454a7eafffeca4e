pub mod alert;
pub mod alert_configuration;
pub mod alert_definition;
