//! The scheduling policies
//!
//! The atomic policies each own one ready queue. The multilevel ones own a
//! list of atomic policies and move processes between them.
//!

mod fcfs;
pub use fcfs::Fcfs;

mod sjf;
pub use sjf::Sjf;

mod srtf;
pub use srtf::Srtf;

mod priority;
pub use priority::{PriorityNp, PriorityP};

mod round_robin;
pub use round_robin::RoundRobin;

mod mlq;
pub use mlq::Mlq;

mod mlfq;
pub use mlfq::Mlfq;

mod policy;
pub use policy::{AtomicPolicy, Policy};
