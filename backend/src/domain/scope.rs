//! Role-scoped query filters.
//!
//! A [`LogScope`] is the authoritative predicate determining which daily
//! logs a caller may read. It is always derived from the principal via
//! [`LogScope::for_principal`]; handlers never hand a caller-supplied
//! filter to the repository directly, which is what keeps a factory
//! employee from broadening their own scope.

use chrono::NaiveDate;

use super::{DailyLog, FactoryId, Principal, Role, Username};

/// Inclusive date range; either bound may be omitted independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        if self.start.is_some_and(|start| date < start) {
            return false;
        }
        if self.end.is_some_and(|end| date > end) {
            return false;
        }
        true
    }

    /// Whether both bounds are absent.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Caller-supplied filter input, before the role rule is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeRequest {
    /// Requested factory; honoured only for headquarters callers.
    pub factory_id: Option<FactoryId>,
    /// Narrow to records the caller created.
    pub created_by_me: bool,
    pub date_range: DateRange,
}

/// The effective query scope after the role rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogScope {
    pub factory_id: Option<FactoryId>,
    pub created_by: Option<Username>,
    pub date_range: DateRange,
}

impl LogScope {
    /// Derive the authoritative scope for a caller.
    ///
    /// A factory employee's scope is pinned to their own factory; any
    /// requested `factory_id` is overridden, not validated. Headquarters
    /// may scope to the requested factory or stay unscoped.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{
    ///     FactoryId, LogScope, Principal, Role, ScopeRequest, Username,
    /// };
    ///
    /// let own = FactoryId::new("wakene_food").unwrap();
    /// let employee = Principal::try_new(
    ///     Username::new("alice").unwrap(),
    ///     Role::FactoryEmployee,
    ///     Some(own.clone()),
    /// )
    /// .unwrap();
    /// let request = ScopeRequest {
    ///     factory_id: Some(FactoryId::new("amen_water").unwrap()),
    ///     ..ScopeRequest::default()
    /// };
    /// let scope = LogScope::for_principal(&employee, request);
    /// assert_eq!(scope.factory_id, Some(own));
    /// ```
    pub fn for_principal(principal: &Principal, request: ScopeRequest) -> Self {
        let factory_id = match principal.role() {
            Role::FactoryEmployee => principal.factory_id().cloned(),
            Role::Headquarters => request.factory_id,
        };
        let created_by = request
            .created_by_me
            .then(|| principal.username().clone());
        Self {
            factory_id,
            created_by,
            date_range: request.date_range,
        }
    }

    /// Whether a record falls inside this scope.
    ///
    /// Kept in the domain so every adapter applies identical semantics.
    pub fn matches(&self, log: &DailyLog) -> bool {
        if self
            .factory_id
            .as_ref()
            .is_some_and(|factory| factory != &log.factory_id)
        {
            return false;
        }
        if self
            .created_by
            .as_ref()
            .is_some_and(|creator| creator != &log.created_by)
        {
            return false;
        }
        self.date_range.contains(log.date)
    }
}
