use std::fmt::Debug;

use selector::{Bindable, Namespace, Target};

pub trait Optimizer: Debug {
    fn name(&self) -> &'static str;

    fn learning_rate(&self) -> f64;

    /// Next value of `weight` given its gradient, at learning rate `lr`.
    fn step(&self, weight: f64, gradient: f64, lr: f64) -> f64;
}

/// Parameters every optimizer shares.
#[derive(Debug, Clone, PartialEq, Bindable)]
pub struct OptimizerBase {
    /// Learning rate
    #[bindable(default = "0.01")]
    pub lr: f64,
    /// L2 penalty
    #[bindable(default)]
    pub weight_decay: f64,
    pub device: String,
}

impl OptimizerBase {
    fn gradient(&self, weight: f64, gradient: f64) -> f64 {
        gradient + self.weight_decay * weight
    }
}

#[derive(Debug, Clone, PartialEq, Bindable)]
pub struct Sgd {
    #[bindable(flatten)]
    pub base: OptimizerBase,
    #[bindable(default = 0.0)]
    pub momentum: f64,
    /// Use Nesterov momentum
    #[bindable(default)]
    pub nesterov: bool,
}

impl Optimizer for Sgd {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn learning_rate(&self) -> f64 {
        self.base.lr
    }

    fn step(&self, weight: f64, gradient: f64, lr: f64) -> f64 {
        let gradient = self.base.gradient(weight, gradient);
        let velocity = if self.nesterov {
            gradient * (1.0 + self.momentum)
        } else {
            gradient
        };
        weight - lr * velocity
    }
}

#[derive(Debug, Clone, PartialEq, Bindable)]
pub struct Adam {
    #[bindable(flatten)]
    pub base: OptimizerBase,
    /// Learning rate
    #[bindable(default = "0.001")]
    pub lr: f64,
    #[bindable(default = "0.9")]
    pub beta1: f64,
    #[bindable(default = "0.999")]
    pub beta2: f64,
    pub amsgrad: Option<bool>,
}

impl Optimizer for Adam {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn learning_rate(&self) -> f64 {
        self.lr
    }

    // First step from zeroed moments
    fn step(&self, weight: f64, gradient: f64, lr: f64) -> f64 {
        let gradient = self.base.gradient(weight, gradient);
        let m = (1.0 - self.beta1) * gradient;
        let v = (1.0 - self.beta2) * gradient * gradient;
        let m_hat = m / (1.0 - self.beta1);
        let v_hat = v / (1.0 - self.beta2);
        weight - lr * m_hat / (v_hat.sqrt() + 1e-8)
    }
}

/// Every optimizer, plus the shared base which is not an optimizer itself.
pub fn namespace() -> Namespace {
    let mut namespace = Namespace::new("optimizers");
    namespace
        .add(Target::<Sgd>::of())
        .implements(|o| Box::new(o) as Box<dyn Optimizer>);
    namespace
        .add(Target::<Adam>::of())
        .implements(|o| Box::new(o) as Box<dyn Optimizer>);
    namespace.add(Target::<OptimizerBase>::of());
    namespace
}
