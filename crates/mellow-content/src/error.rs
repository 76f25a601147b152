use thiserror::Error;

/// Content-side failures around the transform channel. Transformer-reported
/// errors arrive as plain strings in the reply and are rendered verbatim;
/// these cover the channel itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// The message channel to the background worker could not deliver.
    #[error("Extension connection error: {0}")]
    Connection(String),
    /// The reply carried neither a suggestion nor an error.
    #[error("Received invalid response from analysis.")]
    MalformedReply,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_carries_the_delivery_detail() {
        let err = ContentError::Connection("could not establish connection".to_string());
        assert_eq!(
            err.to_string(),
            "Extension connection error: could not establish connection"
        );
    }
}
