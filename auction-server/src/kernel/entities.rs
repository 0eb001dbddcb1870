use std::fmt::{
    Display,
    Formatter,
};

/// Monetary amounts are integral units of the platform currency.
pub type Amount = u64;

/// Opaque handle into the inspection document store. The server passes it
/// through to clients and never dereferences it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InspectionReportRef(pub String);

impl Display for InspectionReportRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
