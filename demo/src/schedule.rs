use selector::{Signature, Target};

#[derive(Debug, Clone, PartialEq)]
pub struct StepLr {
    pub step_size: u32,
    pub gamma: f64,
    pub milestones: Vec<u32>,
}

impl StepLr {
    pub fn lr_at(&self, base_lr: f64, epoch: u32) -> f64 {
        let decays = if self.milestones.is_empty() {
            epoch / self.step_size.max(1)
        } else {
            self.milestones.iter().filter(|&&m| epoch >= m).count() as u32
        };
        base_lr * self.gamma.powi(decays as i32)
    }
}

pub fn step_lr() -> selector::Result<Target<StepLr>> {
    let signature = Signature::from_toml_str(include_str!("../signatures/step_lr.toml"))?;
    Ok(Target::new("StepLr", signature, |args| {
        Ok(StepLr {
            step_size: args.get("step_size")?,
            gamma: args.get("gamma")?,
            milestones: args.get_or("milestones", Vec::new())?,
        })
    }))
}
