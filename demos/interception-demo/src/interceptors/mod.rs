mod demo_interceptor;

pub use demo_interceptor::DemoInterceptor;
