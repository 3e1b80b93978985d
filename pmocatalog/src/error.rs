//! Types d'erreurs de l'itération du catalogue et du réordonnancement

use thiserror::Error;

/// Type Result pour les opérations sur le catalogue
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Erreurs des itérateurs du catalogue et du moteur de réordonnancement
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Une requête de page a échoué ; le curseur n'a pas bougé et l'appelant
    /// peut rappeler `next` pour réessayer la même page.
    #[error("Failed to fetch page at offset {offset}: {source}")]
    FetchFailure {
        offset: usize,
        #[source]
        source: anyhow::Error,
    },

    /// Le moteur de réordonnancement a reçu des indices hors limites ou répétés.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

impl CatalogError {
    pub fn fetch_failure(offset: usize, source: anyhow::Error) -> Self {
        CatalogError::FetchFailure { offset, source }
    }

    /// Vrai pour les erreurs dont on se remet en rappelant
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::FetchFailure { .. })
    }
}
