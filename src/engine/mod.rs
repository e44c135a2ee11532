pub mod answers;
pub mod builder;
pub mod mastery;
pub mod progression;
pub mod review;
pub mod skills;
pub mod template_engine;

pub use mastery::AttemptContext;
pub use skills::{FixPack, SkillId, SkillStat};
pub use template_engine::TemplateEngine;
