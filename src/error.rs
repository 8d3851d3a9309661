use derive_more::{Display, Error};

/// Fatal conditions that abort processing of the current tick batch. The
/// soft-failure classes (missing quote, insufficient funds, invalid trade,
/// persistence) never reach here — they are logged via `log::warn!` and
/// leave the affected order pending or cancelled instead, per the engine's
/// propagation policy.
#[derive(Debug, Display, Error)]
pub enum EngineError {
    #[display(fmt = "invariant violation: {detail}")]
    InvariantViolation { detail: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
