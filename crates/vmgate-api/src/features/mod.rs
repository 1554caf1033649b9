pub mod authorization;
pub mod custom_attributes;
pub mod instance_actions;
pub mod instance_management;
pub mod load_balancers;
pub mod observability;
pub mod tasks;
