use thiserror::Error;

pub mod todo;
pub mod user;

#[cfg(test)]
pub mod test_util;

/// Failures a driven port can report that the domain reacts to differently
#[derive(Error, Debug)]
pub enum DrivenPortError {
    #[error("a communication failure occurred: {0}")]
    CommsFailure(#[from] anyhow::Error),
    #[error("the data conflicts with an existing record")]
    Conflict,
}
