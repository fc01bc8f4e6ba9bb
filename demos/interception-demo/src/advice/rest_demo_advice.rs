use mvc_web::prelude::*;

/// 为每次处理器调用向模型添加一个属性
///
/// REST 处理器不使用模型，视图模板也没有引用这个属性，所以它不会出现在任何响应里
pub struct RestDemoAdvice;

impl RestDemoAdvice {
    pub const ATTRIBUTE: &'static str = "injectedByRestAdvice";
}

impl ControllerAdvice for RestDemoAdvice {
    fn name(&self) -> &str {
        "RestDemoAdvice"
    }

    fn model_attributes(&self, model: &mut Model) -> Result<(), WebError> {
        tracing::info!("I am the restadvice - but i have no real outcome, as this field does not exist");
        model.insert(Self::ATTRIBUTE, "injectedByAdvice")
    }
}
