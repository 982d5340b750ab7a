pub mod label;
pub mod ordered;
pub mod query;
pub mod record;
pub mod report;
pub mod transaction;

pub use label::{Label, LabelSet, OTHER_LABEL};
pub use ordered::OrderedMap;
pub use query::{Granularity, LabelFilter, SeriesView};
pub use record::{NewRecord, NewTransactionForm, RawRecord};
pub use report::{
    ActivityProfile, AggregationResult, AnalysisReport, CategoryBreakdown, CategoryReport,
    CategoryShare, CategorySplit, DashboardStatus, DashboardSummary, LabelList, Metrics,
    PeriodSummary, RecordListing, SeriesMetadata, TimeRangeView, TransactionView,
};
pub use transaction::{Transaction, TransactionKind};
