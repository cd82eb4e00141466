pub type MattingResult<T> = Result<T, MattingError>;

#[derive(thiserror::Error, Debug)]
pub enum MattingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("predictor contract violation: {0}")]
    Contract(String),

    #[error(transparent)]
    Predictor(#[from] anyhow::Error),
}

impl MattingError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(MattingError::invalid_input("x")
            .to_string()
            .contains("invalid input:"));
        assert!(MattingError::config("x")
            .to_string()
            .contains("configuration error:"));
        assert!(MattingError::contract("x")
            .to_string()
            .contains("predictor contract violation:"));
    }

    #[test]
    fn predictor_errors_pass_through_unchanged() {
        let err = MattingError::from(anyhow::anyhow!("gpu fell over"));
        assert_eq!(err.to_string(), "gpu fell over");
        assert!(matches!(err, MattingError::Predictor(_)));
    }
}
