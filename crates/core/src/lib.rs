pub mod config;
pub mod domain;
pub mod personas;
pub mod scoring;

pub use domain::message::{InboundEmail, InboxRole};
pub use domain::outcome::EventOutcome;
pub use domain::session::{DemoSession, NewSession, SessionPhase};
pub use personas::{BuyerPersona, DemoCast, SellerPersona};
pub use scoring::{
    BuyerProfile, FitReport, FitScorer, MissingField, Recommendation, ScoringConfig,
    SellerCriteria, SignalKind, SignalScore, SignalWeights,
};
