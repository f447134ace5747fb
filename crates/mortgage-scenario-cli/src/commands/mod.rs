pub mod quick;
pub mod scenario;
