/// Aggregation vs projection decision from the `aggregate` parameter.
pub mod query_kind;
/// Ordered rule tables assigning each parameter key its role in the query.
pub mod roles;
