//! User-facing sequences of backend calls.
//!
//! - [`submit`]: create a CV, attach entries, join the directory.
//! - [`profile`]: a profile plus its CV, tolerating a missing CV.
//! - [`search`]: the directory search result set.

pub mod profile;
pub mod search;
pub mod submit;

pub use profile::{ProfileLoadError, ProfileView, load_own_profile, load_profile};
pub use search::{SearchStatus, SearchView};
pub use submit::{Stage, SubmitError, SubmitReceipt, Submitter};
