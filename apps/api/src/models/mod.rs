pub mod candidate;
pub mod criteria;

pub use candidate::CandidateRecord;
pub use criteria::CriteriaSet;
