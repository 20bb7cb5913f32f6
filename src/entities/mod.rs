//! Domain records shown in the board's list views

pub mod candidate;
pub mod feedback;
pub mod job;
pub mod profile;
pub mod resume;

pub use candidate::{Candidate, CandidateStatus, MatchTier, StatusUpdate};
pub use feedback::{ContactForm, Feedback};
pub use job::{JobForm, JobPosting};
pub use profile::{ProfileForm, UserProfile};
pub use resume::{FileKind, ResumeFile, ResumeUpload};
