//! Portfolio core: pure collection-view state machine, records and filtering.
mod deferred;
mod effect;
mod filter;
mod msg;
mod record;
mod state;
mod update;
mod validation;
mod view_model;

pub use deferred::{DeferredQuery, QUERY_DEBOUNCE};
pub use effect::Effect;
pub use filter::{categories, derive, FilterState, ALL_CATEGORIES};
pub use msg::Msg;
pub use record::{
    Certificate, CollectionDetails, ContentRecord, Document, DocumentKind, Draft, Experience,
    ExperienceDetails, NewDocument, Project, ProjectDetails, Record, CERTIFICATES, DOCUMENTS,
    EXPERIENCE, PROJECTS,
};
pub use state::{CollectionState, LoadGeneration, LoadPhase, LoadSource};
pub use update::update;
pub use validation::{
    is_valid_email, ContactForm, Credentials, ValidationError, ValidationErrors,
    MIN_PASSWORD_LEN,
};
pub use view_model::CollectionView;
