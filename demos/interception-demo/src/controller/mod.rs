mod demo_controller;
mod rest_demo_controller;

pub use demo_controller::DemoController;
pub use rest_demo_controller::RestDemoController;
