//! Operator implementations. Each operator is an `XxxOp` observable built by
//! the matching [`ObservableExt`](crate::observable::ObservableExt) method.

pub mod combine_latest;
pub mod concat;
pub mod filter;
pub mod flat_map;
pub mod map;
pub mod materialize;
pub mod merge;
pub mod observe_on;
pub mod ref_count;
pub mod scan;
pub mod subscribe_on;
pub mod take;
pub mod zip;

pub use combine_latest::CombineLatestOp;
pub use concat::ConcatOp;
pub use filter::{FilterOp, FilterWithErrOp};
pub use flat_map::{FlatMapOp, FlatMapSelector, IdentitySelector, PlainSelector, ResultSelector};
pub use map::{MapErrOp, MapOp};
pub use materialize::{DematerializeOp, MaterializeOp};
pub use merge::MergeOp;
pub use observe_on::ObserveOnOp;
pub use ref_count::RefCount;
pub use scan::{ScanFirstOp, ScanOp};
pub use subscribe_on::SubscribeOnOp;
pub use take::TakeOp;
pub use zip::ZipOp;
