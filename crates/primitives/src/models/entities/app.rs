use diesel::{Identifiable, Queryable};

/// Tenant record. Every user role, token and ledger row is scoped to one app.
#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = crate::schema::apps)]
pub struct App {
    pub id: i32,
    pub name: String,
    pub secret: String,
}
