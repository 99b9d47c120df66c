use sea_orm::{
    EntityTrait, QueryTrait, Select,
    sea_query::{
        ColumnRef, Condition, ConditionalStatement, Expr, IntoCondition, Order, OrderedStatement,
        SelectStatement,
    },
};

/// The query operations the translator emits.
///
/// Implemented for a bare sea-query [`SelectStatement`] and for Sea-ORM's
/// [`Select<E>`], so compiled requests can be layered onto `Entity::find()`.
pub trait QueryTarget {
    /// AND a condition onto the query.
    fn add_condition<C: IntoCondition>(&mut self, condition: C);

    /// AND an OR-combined group onto the query as one unit.
    fn add_any(&mut self, group: Condition) {
        self.add_condition(group);
    }

    /// AND a set-membership test onto the query.
    fn add_membership(&mut self, column: ColumnRef, values: Vec<String>, negated: bool) {
        let expr = if negated {
            Expr::col(column).is_not_in(values)
        } else {
            Expr::col(column).is_in(values)
        };
        self.add_condition(expr);
    }

    fn add_sort(&mut self, column: ColumnRef, order: Order);

    fn add_limit_offset(&mut self, limit: u64, offset: u64);
}

impl QueryTarget for SelectStatement {
    fn add_condition<C: IntoCondition>(&mut self, condition: C) {
        self.cond_where(condition);
    }

    fn add_sort(&mut self, column: ColumnRef, order: Order) {
        self.order_by(column, order);
    }

    fn add_limit_offset(&mut self, limit: u64, offset: u64) {
        self.limit(limit).offset(offset);
    }
}

impl<E: EntityTrait> QueryTarget for Select<E> {
    fn add_condition<C: IntoCondition>(&mut self, condition: C) {
        self.query().add_condition(condition);
    }

    fn add_sort(&mut self, column: ColumnRef, order: Order) {
        self.query().add_sort(column, order);
    }

    fn add_limit_offset(&mut self, limit: u64, offset: u64) {
        self.query().add_limit_offset(limit, offset);
    }
}
