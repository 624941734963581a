use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    /// The store rejected the operation due to access-control configuration.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[cfg(feature = "mongodb")]
    #[error("Database error: {0}")]
    Database(mongodb::error::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON serialization error: {0}")]
    BsonSerialization(#[from] bson::ser::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON deserialization error: {0}")]
    BsonDeserialization(#[from] bson::de::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PersistError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, PersistError::PermissionDenied(_))
    }
}

// Authentication failures and `Unauthorized` command rejections carry the
// access-control taxonomy; everything else stays a generic database error.
#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for PersistError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match err.kind.as_ref() {
            ErrorKind::Authentication { message, .. } => {
                PersistError::PermissionDenied(message.clone())
            }
            ErrorKind::Command(c) if c.code == 13 || c.code_name == "Unauthorized" => {
                PersistError::PermissionDenied(c.message.clone())
            }
            _ => PersistError::Database(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
