//! Session errors and validation messages

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("Order {0} could not be found")]
    OrderNotFound(String),
    #[error("Invitation {0} could not be found")]
    InvitationNotFound(String),
    #[error("Requirements for invitation {0} could not be found")]
    RequirementsNotFound(String),
    #[error("Field path `{0}` does not address a field")]
    InvalidPath(String),
    #[error("Section `{0}` does not hold a collection of entries")]
    NotACollection(String),
    #[error("A message for this session is already in flight")]
    Busy,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// A single failed rule. The display string is the message shown next to the field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("The {field} field is required.")]
    Required { field: String },
    #[error("The {field} field is required unless {other} is set.")]
    RequiredUnless { field: String, other: String },
    #[error("The {field} field may not be greater than {max} characters.")]
    TooLong { field: String, max: u32 },
    #[error("The {field} field is not a valid date.")]
    NotADate { field: String },
    #[error("The {field} field must be a date after or equal to {other}.")]
    BeforeOther { field: String, other: String },
    #[error("The selected {field} is invalid.")]
    NotAllowed { field: String },
    #[error("The {field} field must be true or false.")]
    NotBoolean { field: String },
}
