pub type QuizResult<T> = Result<T, QuizError>;

#[derive(thiserror::Error, Debug)]
pub enum QuizError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("external service error: {0}")]
    ExternalService(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QuizError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn external_service(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn asset_not_found(msg: impl Into<String>) -> Self {
        Self::AssetNotFound(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            QuizError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            QuizError::invalid_input("x")
                .to_string()
                .contains("invalid input:")
        );
        assert!(
            QuizError::external_service("x")
                .to_string()
                .contains("external service error:")
        );
        assert!(QuizError::render("x").to_string().contains("render error:"));
        assert!(
            QuizError::asset_not_found("x")
                .to_string()
                .contains("asset not found:")
        );
        assert!(
            QuizError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = QuizError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
