use crate::domain::order::OrderId;

/// Extension point applied to the requested order id before lookup.
///
/// Any `Fn(OrderId) -> OrderId` closure works as a filter.
pub trait OrderIdFilter: Send + Sync {
    fn apply(&self, id: OrderId) -> OrderId;
}

/// Default filter: leaves the id untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFilter;

impl OrderIdFilter for IdentityFilter {
    fn apply(&self, id: OrderId) -> OrderId {
        id
    }
}

impl<F> OrderIdFilter for F
where
    F: Fn(OrderId) -> OrderId + Send + Sync,
{
    fn apply(&self, id: OrderId) -> OrderId {
        self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_filter() {
        assert_eq!(IdentityFilter.apply(OrderId(42)), OrderId(42));
    }

    #[test]
    fn test_closure_filter() {
        let offset = |id: OrderId| OrderId(id.value() + 1000);
        assert_eq!(offset.apply(OrderId(42)), OrderId(1042));
    }
}
