//! Effect decomposition, mediation and hypothesis decisions.

pub mod decomposer;
pub mod hypotheses;
pub mod mediation;

pub use self::decomposer::{decompose, EffectPlan, EffectRecord, RouteEffect};
pub use self::hypotheses::{hypothesis_table, Decision, Direction, HypothesisResult};
pub use self::mediation::{MediationClassifier, MediationType, MediationVerdict};
